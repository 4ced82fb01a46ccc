//! gwc のアダプター（Outbound ポートの実装）

pub mod attachment;
pub mod config;
pub mod http_catalog;
pub mod http_option_store;
pub mod http_task_log;
pub(crate) mod memory_option_store;
pub mod sigint_checker;
pub mod sse_chat_stream;
pub mod stdout_renderer;
pub(crate) mod stub_chat_stream;

pub use attachment::resolve_image;
pub use config::{apply_overrides, load_console_config, ConsoleConfig};
pub use http_catalog::HttpCatalog;
pub use http_option_store::HttpOptionStore;
pub use http_task_log::HttpTaskLog;
#[cfg(test)]
pub(crate) use memory_option_store::MemoryOptionStore;
pub use sigint_checker::{NoopInterruptChecker, SigintChecker};
pub use sse_chat_stream::SseChatStream;
pub use stdout_renderer::StdoutRenderer;
#[cfg(test)]
pub(crate) use stub_chat_stream::StubChatStream;
