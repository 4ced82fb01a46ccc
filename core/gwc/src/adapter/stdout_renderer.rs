//! トランスクリプト変更を端末に描画する TranscriptObserver 実装
//!
//! assistant の本文は差分だけを書き足す。終端したら改行し、エラーなら印を付ける。

use std::io::{self, Write};

use anyhow::Context;

use crate::domain::{MessageId, MessageStatus, Role, Transcript};
use crate::ports::outbound::{TranscriptChange, TranscriptObserver};

pub struct StdoutRenderer<W: Write + Send> {
    out: W,
    /// 描画中の assistant メッセージと書き出し済みバイト数
    current: Option<(MessageId, usize)>,
}

impl StdoutRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> StdoutRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, current: None }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn render_update(&mut self, transcript: &Transcript, id: MessageId) -> anyhow::Result<()> {
        let Some(msg) = transcript.get(id) else {
            return Ok(());
        };
        if msg.role != Role::Assistant {
            return Ok(());
        }
        let written = match self.current {
            Some((cur, n)) if cur == id => n,
            _ => 0,
        };
        if let Some(suffix) = msg.content.get(written..) {
            self.out.write_all(suffix.as_bytes())?;
        }
        self.current = Some((id, msg.content.len()));
        match msg.status {
            Some(MessageStatus::Complete) => {
                writeln!(self.out)?;
                self.current = None;
            }
            Some(MessageStatus::Error) => {
                writeln!(self.out)?;
                writeln!(self.out, "[reply failed]")?;
                self.current = None;
            }
            _ => {}
        }
        self.out.flush().context("Failed to flush output")
    }
}

impl<W: Write + Send> TranscriptObserver for StdoutRenderer<W> {
    fn on_change(&mut self, transcript: &Transcript, change: TranscriptChange) -> anyhow::Result<()> {
        match change {
            TranscriptChange::Updated(id) => self.render_update(transcript, id),
            TranscriptChange::Cleared => {
                self.current = None;
                writeln!(self.out, "(transcript cleared)")?;
                Ok(())
            }
            // user 入力は端末に既に出ている。プレースホルダは最初の差分で描く
            TranscriptChange::Appended(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TerminalStatus;

    #[test]
    fn test_prints_deltas_incrementally_and_newline_on_complete() {
        let mut t = Transcript::new();
        let mut r = StdoutRenderer::new(Vec::new());
        t.push_user("hi", None, 0);
        let id = t.push_assistant_placeholder(0);
        r.on_change(&t, TranscriptChange::Appended(id)).unwrap();
        t.append_to_pending("Hel");
        r.on_change(&t, TranscriptChange::Updated(id)).unwrap();
        t.append_to_pending("lo");
        r.on_change(&t, TranscriptChange::Updated(id)).unwrap();
        t.finish_pending(TerminalStatus::Complete);
        r.on_change(&t, TranscriptChange::Updated(id)).unwrap();
        assert_eq!(String::from_utf8(r.into_inner()).unwrap(), "Hello\n");
    }

    #[test]
    fn test_error_reply_is_marked() {
        let mut t = Transcript::new();
        let mut r = StdoutRenderer::new(Vec::new());
        let id = t.push_assistant_placeholder(0);
        t.append_to_pending("boom");
        r.on_change(&t, TranscriptChange::Updated(id)).unwrap();
        t.finish_pending(TerminalStatus::Error);
        r.on_change(&t, TranscriptChange::Updated(id)).unwrap();
        assert_eq!(String::from_utf8(r.into_inner()).unwrap(), "boom\n[reply failed]\n");
    }

    #[test]
    fn test_update_for_missing_message_is_ignored() {
        let mut t = Transcript::new();
        let id = t.push_assistant_placeholder(0);
        t.clear();
        let mut r = StdoutRenderer::new(Vec::new());
        r.on_change(&t, TranscriptChange::Updated(id)).unwrap();
        assert!(r.into_inner().is_empty());
    }
}
