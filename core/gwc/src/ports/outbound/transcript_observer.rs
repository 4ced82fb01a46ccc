//! トランスクリプト変更の購読 Outbound ポート
//!
//! リレーは変更のたびに通知するだけで、表示方法は知らない。通知失敗は best-effort（ログのみ）。

use crate::domain::{MessageId, Transcript};

/// 何が変わったか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptChange {
    Appended(MessageId),
    Updated(MessageId),
    Cleared,
}

pub trait TranscriptObserver: Send {
    /// 変更後のトランスクリプトを受け取る
    fn on_change(&mut self, transcript: &Transcript, change: TranscriptChange) -> anyhow::Result<()>;
}
