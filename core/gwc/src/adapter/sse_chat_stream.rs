//! `/pg/chat/completions` を SSE で購読する ChatStream 実装
//!
//! フレーム → StreamEvent の対応は map_frame に閉じ込め、HTTP なしでテストできるようにしている。

use std::io::{BufRead, BufReader};
use std::sync::Arc;

use common::error::Error;
use common::gateway::GatewayClient;
use common::ports::outbound::{Log, LogLevel, LogRecord};
use common::sse::{SseDecoder, SseFrame};
use serde_json::Value;

use crate::domain::{ChatRequest, StreamEvent};
use crate::ports::outbound::{ChatStream, StreamSession};

pub const CHAT_COMPLETIONS_PATH: &str = "/pg/chat/completions";

/// 1 フレームの解釈結果
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    Event(StreamEvent),
    /// 解釈できないフレーム。購読は続ける
    Skip(String),
}

/// SSE フレームを StreamEvent に変換する
///
/// * `event: error` → Error(data)
/// * data が `[DONE]` → Done
/// * JSON の `error` フィールド → Error(error.message)
/// * `choices` が空 → Done
/// * `choices[0].delta.content` → Delta（空文字は Skip）
pub fn map_frame(frame: &SseFrame) -> FrameOutcome {
    if frame.event_name() == "error" {
        return FrameOutcome::Event(StreamEvent::Error(frame.data.clone()));
    }
    let data = frame.data.trim();
    if data == "[DONE]" {
        return FrameOutcome::Event(StreamEvent::Done);
    }
    let v: Value = match serde_json::from_str(data) {
        Ok(v) => v,
        Err(e) => return FrameOutcome::Skip(format!("unparsable data: {}", e)),
    };
    if let Some(err) = v.get("error").filter(|e| !e.is_null()) {
        let msg = err
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .or_else(|| err.as_str().map(str::to_string))
            .unwrap_or_else(|| err.to_string());
        return FrameOutcome::Event(StreamEvent::Error(msg));
    }
    let Some(choices) = v.get("choices").and_then(|c| c.as_array()) else {
        return FrameOutcome::Skip("no choices".to_string());
    };
    let Some(first) = choices.first() else {
        return FrameOutcome::Event(StreamEvent::Done);
    };
    match first
        .get("delta")
        .and_then(|d| d.get("content"))
        .and_then(|c| c.as_str())
    {
        Some(text) if !text.is_empty() => FrameOutcome::Event(StreamEvent::Delta(text.to_string())),
        _ => FrameOutcome::Skip("empty delta".to_string()),
    }
}

/// SSE バイト列を StreamEvent 列に変換するイテレータ
///
/// 終端イベント（Done / Error）の後は何も出さない。終端なしに EOF に達したら ConnectionClosed を 1 回、
/// 読み取りエラーなら Error を 1 回出す。
pub struct SseEvents<R: BufRead> {
    frames: SseDecoder<R>,
    logger: Arc<dyn Log>,
    finished: bool,
}

impl<R: BufRead> SseEvents<R> {
    pub fn new(reader: R, logger: Arc<dyn Log>) -> Self {
        Self {
            frames: SseDecoder::new(reader),
            logger,
            finished: false,
        }
    }

    fn log_skip(&self, reason: &str) {
        let _ = self.logger.log(
            &LogRecord::new(LogLevel::Debug, "sse frame skipped")
                .layer("adapter")
                .kind("sse")
                .field("reason", reason),
        );
    }
}

impl<R: BufRead> Iterator for SseEvents<R> {
    type Item = StreamEvent;

    fn next(&mut self) -> Option<StreamEvent> {
        if self.finished {
            return None;
        }
        loop {
            match self.frames.next() {
                None => {
                    self.finished = true;
                    return Some(StreamEvent::ConnectionClosed);
                }
                Some(Err(e)) => {
                    let _ = self.logger.log(
                        &LogRecord::new(LogLevel::Warn, "sse read failed")
                            .layer("adapter")
                            .kind("sse")
                            .field("error", e.to_string()),
                    );
                    self.finished = true;
                    return Some(StreamEvent::Error(e.to_string()));
                }
                Some(Ok(frame)) => match map_frame(&frame) {
                    FrameOutcome::Event(ev) => {
                        if ev.is_terminal() {
                            self.finished = true;
                        }
                        return Some(ev);
                    }
                    FrameOutcome::Skip(reason) => self.log_skip(&reason),
                },
            }
        }
    }
}

/// ゲートウェイへの SSE 購読
pub struct SseChatStream {
    client: GatewayClient,
    logger: Arc<dyn Log>,
}

impl SseChatStream {
    pub fn new(client: GatewayClient, logger: Arc<dyn Log>) -> Self {
        Self { client, logger }
    }
}

impl ChatStream for SseChatStream {
    fn open(&self, request: &ChatRequest) -> Result<StreamSession, Error> {
        match self.client.post_event_stream(CHAT_COMPLETIONS_PATH, request) {
            Ok(response) => {
                let events = SseEvents::new(BufReader::new(response), Arc::clone(&self.logger));
                Ok(StreamSession::new(Box::new(events)))
            }
            Err(e) => {
                let _ = self.logger.log(
                    &LogRecord::new(LogLevel::Warn, "chat stream request failed")
                        .layer("adapter")
                        .kind("http")
                        .field("error", e.to_string()),
                );
                Ok(StreamSession::from_events(vec![StreamEvent::Error(e.to_string())]))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::adapter::NoopLog;
    use std::io::{Cursor, Read};

    fn frame(event: Option<&str>, data: &str) -> SseFrame {
        SseFrame {
            event: event.map(str::to_string),
            data: data.to_string(),
        }
    }

    fn events(body: &str) -> Vec<StreamEvent> {
        SseEvents::new(Cursor::new(body.as_bytes().to_vec()), Arc::new(NoopLog)).collect()
    }

    #[test]
    fn test_map_frame_delta() {
        let f = frame(None, r#"{"choices":[{"delta":{"content":"Hel"}}]}"#);
        assert_eq!(map_frame(&f), FrameOutcome::Event(StreamEvent::Delta("Hel".into())));
    }

    #[test]
    fn test_map_frame_done_marker_and_empty_choices() {
        assert_eq!(map_frame(&frame(None, "[DONE]")), FrameOutcome::Event(StreamEvent::Done));
        assert_eq!(
            map_frame(&frame(None, r#"{"choices":[]}"#)),
            FrameOutcome::Event(StreamEvent::Done)
        );
    }

    #[test]
    fn test_map_frame_errors() {
        assert_eq!(
            map_frame(&frame(Some("error"), "quota exceeded")),
            FrameOutcome::Event(StreamEvent::Error("quota exceeded".into()))
        );
        assert_eq!(
            map_frame(&frame(None, r#"{"error":{"message":"bad model","type":"invalid"}}"#)),
            FrameOutcome::Event(StreamEvent::Error("bad model".into()))
        );
    }

    #[test]
    fn test_map_frame_skips_noise() {
        assert!(matches!(map_frame(&frame(None, "not json")), FrameOutcome::Skip(_)));
        assert!(matches!(
            map_frame(&frame(None, r#"{"choices":[{"delta":{"role":"assistant"}}]}"#)),
            FrameOutcome::Skip(_)
        ));
        assert!(matches!(
            map_frame(&frame(None, r#"{"choices":[{"delta":{"content":""}}]}"#)),
            FrameOutcome::Skip(_)
        ));
    }

    #[test]
    fn test_events_stop_after_done() {
        let body = "data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n\n\
                    data: garbage\n\n\
                    data: {\"choices\":[{\"delta\":{\"content\":\"b\"}}]}\n\n\
                    data: [DONE]\n\n\
                    data: {\"choices\":[{\"delta\":{\"content\":\"late\"}}]}\n\n";
        assert_eq!(
            events(body),
            vec![
                StreamEvent::Delta("a".into()),
                StreamEvent::Delta("b".into()),
                StreamEvent::Done,
            ]
        );
    }

    #[test]
    fn test_events_eof_without_terminal_is_connection_closed() {
        let body = "data: {\"choices\":[{\"delta\":{\"content\":\"partial\"}}]}\n\n";
        assert_eq!(
            events(body),
            vec![StreamEvent::Delta("partial".into()), StreamEvent::ConnectionClosed]
        );
    }

    #[test]
    fn test_events_error_event_is_terminal() {
        let body = "event: error\ndata: upstream timeout\n\ndata: [DONE]\n\n";
        assert_eq!(events(body), vec![StreamEvent::Error("upstream timeout".into())]);
    }

    struct ResetAfter(Cursor<Vec<u8>>);
    impl Read for ResetAfter {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            match self.0.read(buf)? {
                0 => Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
                n => Ok(n),
            }
        }
    }

    #[test]
    fn test_events_read_failure_is_error() {
        let body = "data: {\"choices\":[{\"delta\":{\"content\":\"x\"}}]}\n\n";
        let reader = std::io::BufReader::new(ResetAfter(Cursor::new(body.as_bytes().to_vec())));
        let evs: Vec<StreamEvent> = SseEvents::new(reader, Arc::new(NoopLog)).collect();
        assert_eq!(evs.len(), 2);
        assert_eq!(evs[0], StreamEvent::Delta("x".into()));
        assert!(matches!(evs[1], StreamEvent::Error(ref m) if m.contains("reset")));
    }

    #[test]
    fn test_open_unreachable_yields_single_error_event() {
        let client = GatewayClient::new("http://127.0.0.1:9", None).unwrap();
        let stream = SseChatStream::new(client, Arc::new(NoopLog));
        let req = ChatRequest::from_transcript(
            &crate::domain::PlaygroundConfig::default(),
            &crate::domain::Transcript::new(),
        );
        let evs: Vec<StreamEvent> = stream.open(&req).unwrap().collect();
        assert_eq!(evs.len(), 1);
        assert!(matches!(evs[0], StreamEvent::Error(_)));
    }
}
