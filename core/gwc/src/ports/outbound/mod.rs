//! Outbound ポート: usecase がゲートウェイ・端末・シグナルに触れるための trait

pub mod catalog;
pub mod chat_stream;
pub mod interrupt_checker;
pub mod option_store;
pub mod task_log;
pub mod transcript_observer;

pub use catalog::Catalog;
pub use chat_stream::{ChatStream, StreamSession};
pub use interrupt_checker::InterruptChecker;
pub use option_store::OptionStore;
pub use task_log::TaskLog;
pub use transcript_observer::{TranscriptChange, TranscriptObserver};
