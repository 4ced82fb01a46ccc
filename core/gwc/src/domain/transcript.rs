//! トランスクリプト（プレイグラウンドに表示するメッセージ列）
//!
//! 不変条件:
//! - 追記のみ。書き換えできるのは末尾要素だけで、それも Loading / Incomplete の間に限る
//! - Loading / Incomplete のメッセージは高々 1 件で、存在するなら末尾
//! - Complete / Error になったメッセージは二度と変更されない

use super::message::{Attachment, ChatMessage, MessageId, MessageStatus, Role, TerminalStatus};

#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    next_id: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn get(&self, id: MessageId) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// 末尾の受信途中メッセージ
    pub fn pending(&self) -> Option<&ChatMessage> {
        self.last().filter(|m| m.is_pending())
    }

    fn push(
        &mut self,
        role: Role,
        content: String,
        status: Option<MessageStatus>,
        attachment: Option<Attachment>,
        now_ms: u64,
    ) -> MessageId {
        self.next_id += 1;
        let id = MessageId::new(self.next_id);
        self.messages.push(ChatMessage {
            id,
            role,
            content,
            created_at_ms: now_ms,
            status,
            attachment,
        });
        id
    }

    /// user メッセージを追加（status なし・以後不変）
    pub fn push_user(
        &mut self,
        content: impl Into<String>,
        attachment: Option<Attachment>,
        now_ms: u64,
    ) -> MessageId {
        self.push(Role::User, content.into(), None, attachment, now_ms)
    }

    /// 応答待ちの assistant プレースホルダを追加
    pub fn push_assistant_placeholder(&mut self, now_ms: u64) -> MessageId {
        self.push(
            Role::Assistant,
            String::new(),
            Some(MessageStatus::Loading),
            None,
            now_ms,
        )
    }

    /// 末尾が受信途中なら text を追記して Incomplete にする。それ以外は何もしない
    pub fn append_to_pending(&mut self, text: &str) -> Option<MessageId> {
        let last = self.messages.last_mut().filter(|m| m.is_pending())?;
        last.content.push_str(text);
        last.status = Some(MessageStatus::Incomplete);
        Some(last.id)
    }

    /// 末尾が受信途中なら終端状態にする。既に終端（または status なし）なら何もしない
    pub fn finish_pending(&mut self, status: TerminalStatus) -> Option<MessageId> {
        let last = self.messages.last_mut().filter(|m| m.is_pending())?;
        last.status = Some(status.into());
        Some(last.id)
    }

    /// 全消去。ID の採番は続きから
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 受信途中のメッセージが高々 1 件で、あるなら末尾
    fn assert_pending_invariant(t: &Transcript) {
        let pending: Vec<usize> = t
            .messages()
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_pending())
            .map(|(i, _)| i)
            .collect();
        assert!(pending.len() <= 1, "more than one pending: {:?}", pending);
        if let Some(&i) = pending.first() {
            assert_eq!(i, t.len() - 1, "pending message is not last");
        }
    }

    #[test]
    fn test_ids_are_monotonic_and_not_reused_after_clear() {
        let mut t = Transcript::new();
        let a = t.push_user("hi", None, 1);
        let b = t.push_assistant_placeholder(2);
        assert!(b > a);
        t.clear();
        let c = t.push_user("again", None, 3);
        assert!(c > b);
    }

    #[test]
    fn test_append_and_finish_pending() {
        let mut t = Transcript::new();
        t.push_user("hi", None, 1);
        let id = t.push_assistant_placeholder(2);
        assert_pending_invariant(&t);

        assert_eq!(t.append_to_pending("Hel"), Some(id));
        assert_eq!(t.append_to_pending("lo"), Some(id));
        assert_eq!(t.last().unwrap().status, Some(MessageStatus::Incomplete));
        assert_pending_invariant(&t);

        assert_eq!(t.finish_pending(TerminalStatus::Complete), Some(id));
        assert_eq!(t.last().unwrap().content, "Hello");
        assert_eq!(t.last().unwrap().status, Some(MessageStatus::Complete));
        assert!(t.pending().is_none());
        assert_pending_invariant(&t);
    }

    #[test]
    fn test_terminal_message_is_frozen() {
        let mut t = Transcript::new();
        t.push_assistant_placeholder(1);
        t.finish_pending(TerminalStatus::Error);
        assert_eq!(t.append_to_pending("late"), None);
        assert_eq!(t.finish_pending(TerminalStatus::Complete), None);
        let last = t.last().unwrap();
        assert_eq!(last.content, "");
        assert_eq!(last.status, Some(MessageStatus::Error));
    }

    #[test]
    fn test_user_message_is_never_mutated() {
        let mut t = Transcript::new();
        t.push_user("question", None, 1);
        assert_eq!(t.append_to_pending("x"), None);
        assert_eq!(t.finish_pending(TerminalStatus::Complete), None);
        assert_eq!(t.last().unwrap().content, "question");
        assert_eq!(t.last().unwrap().status, None);
    }

    #[test]
    fn test_operations_on_empty_transcript_are_noops() {
        let mut t = Transcript::new();
        assert_eq!(t.append_to_pending("x"), None);
        assert_eq!(t.finish_pending(TerminalStatus::Complete), None);
        assert!(t.is_empty());
    }

    #[test]
    fn test_created_at_is_kept() {
        let mut t = Transcript::new();
        let id = t.push_assistant_placeholder(1234);
        t.append_to_pending("a");
        assert_eq!(t.get(id).unwrap().created_at_ms, 1234);
    }
}
