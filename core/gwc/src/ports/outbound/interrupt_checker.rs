//! Ctrl+C（SIGINT）等による割り込みを検知する Outbound ポート
//!
//! ストリーミング中にユーザーが中断した場合、購読をキャンセルして応答を確定させるために使用する。

/// 割り込みが要求されたかどうかを返す能力
pub trait InterruptChecker: Send + Sync {
    fn is_interrupted(&self) -> bool;
    /// 次の送信に備えてフラグを下ろす
    fn reset(&self) {}
}
