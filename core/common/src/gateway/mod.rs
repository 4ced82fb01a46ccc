//! ゲートウェイ REST 境界
//!
//! 全 JSON 応答は `{success, message, data}` のエンベロープで返る。

pub mod client;
pub mod envelope;

pub use client::GatewayClient;
pub use envelope::{decode_envelope, error_message_from_body, ApiEnvelope};
