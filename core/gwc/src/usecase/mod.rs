//! ユースケース層（ports の trait だけに依存する）

pub mod catalog;
pub mod chat;
pub mod relay;
pub mod settings_form;
pub mod task_log;

pub use catalog::CatalogUseCase;
pub use chat::{ChatIo, ChatUseCase};
#[cfg(test)]
pub(crate) use relay::ChatRelay;
pub use settings_form::SettingsUseCase;
#[cfg(test)]
pub(crate) use settings_form::{SaveOutcome, SettingsForm};
pub use task_log::TaskLogUseCase;
