//! チャットストリーム Outbound ポート
//!
//! 1 回の送信 = 1 セッション。セッションは StreamEvent のイテレータとして購読し、
//! CancelToken で外から打ち切れる。打ち切られたら ConnectionClosed を 1 回流して終わる。

use crate::domain::{ChatRequest, StreamEvent};
use common::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// セッション購読のキャンセル用ハンドル（複製可）
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// 1 応答分のイベント購読。接続を所有し、drop / close で解放する
pub struct StreamSession {
    events: Box<dyn Iterator<Item = StreamEvent> + Send>,
    cancel: CancelToken,
    closed: bool,
}

impl StreamSession {
    pub fn new(events: Box<dyn Iterator<Item = StreamEvent> + Send>) -> Self {
        Self {
            events,
            cancel: CancelToken::new(),
            closed: false,
        }
    }

    /// 固定のイベント列から作る（接続確立前に失敗した場合やテスト用）
    pub fn from_events(events: Vec<StreamEvent>) -> Self {
        Self::new(Box::new(events.into_iter()))
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// 接続を解放する
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.closed {
            self.closed = true;
            self.events = Box::new(std::iter::empty());
        }
    }
}

impl Iterator for StreamSession {
    type Item = StreamEvent;

    fn next(&mut self) -> Option<StreamEvent> {
        if self.closed {
            return None;
        }
        if self.cancel.is_cancelled() {
            self.release();
            return Some(StreamEvent::ConnectionClosed);
        }
        let event = self.events.next();
        if event.is_none() {
            self.release();
        }
        event
    }
}

/// チャット送信を 1 セッションとして開く
pub trait ChatStream: Send + Sync {
    /// HTTP の失敗はセッション内の Error イベントとして返す。Err はローカルな失敗（ペイロード生成など）のみ
    fn open(&self, request: &ChatRequest) -> Result<StreamSession, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_yields_events_then_none() {
        let mut s = StreamSession::from_events(vec![StreamEvent::Delta("a".into()), StreamEvent::Done]);
        assert_eq!(s.next(), Some(StreamEvent::Delta("a".into())));
        assert_eq!(s.next(), Some(StreamEvent::Done));
        assert_eq!(s.next(), None);
        assert_eq!(s.next(), None);
    }

    #[test]
    fn test_cancel_yields_connection_closed_once() {
        let mut s = StreamSession::from_events(vec![
            StreamEvent::Delta("a".into()),
            StreamEvent::Delta("b".into()),
        ]);
        let token = s.cancel_token();
        assert_eq!(s.next(), Some(StreamEvent::Delta("a".into())));
        token.cancel();
        assert_eq!(s.next(), Some(StreamEvent::ConnectionClosed));
        assert_eq!(s.next(), None);
    }
}
