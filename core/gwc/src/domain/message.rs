//! チャットメッセージのドメイン型

use serde::{Deserialize, Serialize};

/// 発話者
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// assistant メッセージの状態
///
/// Loading → Incomplete → (Complete | Error)。終端に入ったら二度と変わらない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    /// 応答待ち（まだ 1 文字も届いていない）
    Loading,
    /// 受信途中
    Incomplete,
    Complete,
    Error,
}

impl MessageStatus {
    /// まだ追記され得る状態か
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Loading | Self::Incomplete)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Incomplete => "incomplete",
            Self::Complete => "complete",
            Self::Error => "error",
        }
    }
}

/// 終端状態（complete() に渡せる値だけ）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalStatus {
    Complete,
    Error,
}

impl From<TerminalStatus> for MessageStatus {
    fn from(s: TerminalStatus) -> Self {
        match s {
            TerminalStatus::Complete => MessageStatus::Complete,
            TerminalStatus::Error => MessageStatus::Error,
        }
    }
}

/// トランスクリプト内で単調増加する ID。clear 後も再利用しない
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(u64);

impl MessageId {
    pub(crate) fn new(n: u64) -> Self {
        Self(n)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// ユーザーメッセージの添付（画像）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attachment {
    /// http(s) URL または data URL
    ImageUrl(String),
}

/// トランスクリプトの 1 要素
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    /// 作成時刻（Unix ms）。不変
    pub created_at_ms: u64,
    /// assistant のみ Some。user / system は None で追加後は不変
    pub status: Option<MessageStatus>,
    pub attachment: Option<Attachment>,
}

impl ChatMessage {
    pub fn is_pending(&self) -> bool {
        self.status.is_some_and(|s| s.is_pending())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(MessageStatus::Loading.is_pending());
        assert!(MessageStatus::Incomplete.is_pending());
        assert!(!MessageStatus::Complete.is_pending());
        assert!(!MessageStatus::Error.is_pending());
    }

    #[test]
    fn test_terminal_status_into_message_status() {
        assert_eq!(MessageStatus::from(TerminalStatus::Complete), MessageStatus::Complete);
        assert_eq!(MessageStatus::from(TerminalStatus::Error), MessageStatus::Error);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
        assert_eq!(serde_json::to_string(&Role::System).unwrap(), "\"system\"");
    }
}
