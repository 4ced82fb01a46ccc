//! Server-Sent Events のデコーダ
//!
//! 行単位で読み、空行でフレームを確定する。`event:` / `data:` 以外のフィールド（id, retry）と
//! `:` で始まるコメント行は無視する。複数の data 行は `\n` で連結する。

use crate::error::Error;
use std::io::BufRead;

/// 1 つの SSE フレーム
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    /// `event:` の値（未指定なら None = "message"）
    pub event: Option<String>,
    pub data: String,
}

impl SseFrame {
    /// event 名（未指定は "message"）
    pub fn event_name(&self) -> &str {
        self.event.as_deref().unwrap_or("message")
    }
}

/// BufRead から SseFrame を順に取り出すイテレータ
///
/// 読み取りエラーは `Err` を 1 回返して終了する。EOF で未確定のフレームがあれば最後に返す。
pub struct SseDecoder<R: BufRead> {
    reader: R,
    event: Option<String>,
    data_lines: Vec<String>,
    finished: bool,
}

impl<R: BufRead> SseDecoder<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            event: None,
            data_lines: Vec::new(),
            finished: false,
        }
    }

    fn take_frame(&mut self) -> Option<SseFrame> {
        if self.event.is_none() && self.data_lines.is_empty() {
            return None;
        }
        let frame = SseFrame {
            event: self.event.take(),
            data: self.data_lines.join("\n"),
        };
        self.data_lines.clear();
        Some(frame)
    }

    fn apply_line(&mut self, line: &str) {
        if line.starts_with(':') {
            return;
        }
        let (field, value) = match line.split_once(':') {
            Some((f, v)) => (f, v.strip_prefix(' ').unwrap_or(v)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data_lines.push(value.to_string()),
            _ => {}
        }
    }
}

impl<R: BufRead> Iterator for SseDecoder<R> {
    type Item = Result<SseFrame, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let mut buf = String::new();
        loop {
            buf.clear();
            match self.reader.read_line(&mut buf) {
                Ok(0) => {
                    self.finished = true;
                    return self.take_frame().map(Ok);
                }
                Ok(_) => {
                    let line = buf.trim_end_matches(['\n', '\r']);
                    if line.is_empty() {
                        if let Some(frame) = self.take_frame() {
                            return Some(Ok(frame));
                        }
                        continue;
                    }
                    self.apply_line(line);
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(Error::http(format!("Failed to read stream: {}", e))));
                }
            }
        }
    }
}
