//! テスト用: 台本どおりのイベント列を返す ChatStream 実装

#[cfg(test)]
mod stub {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use common::error::Error;

    use crate::domain::{ChatRequest, StreamEvent};
    use crate::ports::outbound::{ChatStream, StreamSession};

    /// open のたびに台本を 1 本ずつ消費し、受け取ったリクエストを記録する
    pub struct StubChatStream {
        scripts: Mutex<VecDeque<Vec<StreamEvent>>>,
        requests: Mutex<Vec<ChatRequest>>,
        fail_open: Option<String>,
    }

    impl StubChatStream {
        pub fn new(scripts: Vec<Vec<StreamEvent>>) -> Self {
            Self {
                scripts: Mutex::new(scripts.into()),
                requests: Mutex::new(Vec::new()),
                fail_open: None,
            }
        }

        pub fn deltas_then_done(deltas: &[&str]) -> Self {
            let mut events: Vec<StreamEvent> =
                deltas.iter().map(|d| StreamEvent::Delta(d.to_string())).collect();
            events.push(StreamEvent::Done);
            Self::new(vec![events])
        }

        /// open 自体がローカルに失敗する
        pub fn failing(message: &str) -> Self {
            Self {
                fail_open: Some(message.to_string()),
                ..Self::new(Vec::new())
            }
        }

        pub fn requests(&self) -> Vec<ChatRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl ChatStream for StubChatStream {
        fn open(&self, request: &ChatRequest) -> Result<StreamSession, Error> {
            if let Some(msg) = &self.fail_open {
                return Err(Error::system(msg.clone()));
            }
            self.requests.lock().unwrap().push(request.clone());
            let events = self.scripts.lock().unwrap().pop_front().unwrap_or_default();
            Ok(StreamSession::from_events(events))
        }
    }
}

#[cfg(test)]
pub use stub::StubChatStream;
