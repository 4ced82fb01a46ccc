//! ストリームセッションが流すイベント
//!
//! 終了トリガは Done / Error / ConnectionClosed の 3 種で、どれか 1 つが先に来た時点で確定する。

/// 1 セッション分のイベント列の要素
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// 本文の増分
    Delta(String),
    /// `[DONE]` もしくは choices が空のペイロード
    Done,
    /// サーバーからのエラーイベント（本文として表示してから Error で確定）
    Error(String),
    /// 明示的な終了なしに接続が閉じた（暗黙の正常終了）
    ConnectionClosed,
}

impl StreamEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Delta(_))
    }

    /// ログ用の種別名
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Delta(_) => "delta",
            Self::Done => "done",
            Self::Error(_) => "error",
            Self::ConnectionClosed => "closed",
        }
    }
}
