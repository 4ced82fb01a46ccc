//! gwc 固有のドメイン型（型と不変条件）

pub mod chat_request;
pub mod command;
pub mod message;
pub mod playground;
pub mod settings;
pub mod stream_event;
pub mod task;
pub mod transcript;

pub use chat_request::ChatRequest;
pub use command::{ChatOverrides, GwcCommand};
pub use message::{Attachment, MessageId, MessageStatus, Role, TerminalStatus};
pub use playground::PlaygroundConfig;
pub use settings::{FieldKind, OptionEntry, OptionSnapshot, OptionValue, SettingsPanel};
pub use stream_event::StreamEvent;
pub use task::{TaskQuery, TaskRecord, TaskScope};
pub use transcript::Transcript;
