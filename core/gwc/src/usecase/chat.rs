//! chat コマンドのユースケース（ワンショットと対話モード）

use std::io::{BufRead, Write};
use std::sync::Arc;

use common::error::Error;
use common::ports::outbound::{Clock, FileSystem, Log};

use crate::adapter::{apply_overrides, resolve_image};
use crate::domain::{Attachment, ChatOverrides, MessageStatus, PlaygroundConfig};
use crate::ports::outbound::{ChatStream, InterruptChecker, TranscriptObserver};
use crate::usecase::relay::ChatRelay;

/// 対話モードのコマンド
#[derive(Debug, Clone, PartialEq, Eq)]
enum ReplInput {
    Message(String),
    Clear,
    Exit,
    Image(String),
    Help,
    Empty,
    Unknown(String),
}

fn parse_repl_line(line: &str) -> ReplInput {
    let t = line.trim();
    if t.is_empty() {
        return ReplInput::Empty;
    }
    if !t.starts_with('/') {
        return ReplInput::Message(t.to_string());
    }
    let (cmd, rest) = t.split_once(char::is_whitespace).unwrap_or((t, ""));
    match cmd {
        "/clear" => ReplInput::Clear,
        "/exit" | "/quit" => ReplInput::Exit,
        "/image" => ReplInput::Image(rest.trim().to_string()),
        "/help" => ReplInput::Help,
        other => ReplInput::Unknown(other.to_string()),
    }
}

const REPL_HELP: &str =
    "commands: /image <path|url> attach to next message (empty line sends it alone), /clear, /exit";

/// chat の入出力先
pub struct ChatIo<'a> {
    pub input: &'a mut dyn BufRead,
    /// プロンプト・案内・エラーの出力先（応答本文は observer が描く）
    pub console: &'a mut dyn Write,
    pub observer: Box<dyn TranscriptObserver>,
}

pub struct ChatUseCase {
    base: PlaygroundConfig,
    stream: Arc<dyn ChatStream>,
    clock: Arc<dyn Clock>,
    fs: Arc<dyn FileSystem>,
    interrupt: Arc<dyn InterruptChecker>,
    logger: Arc<dyn Log>,
}

impl ChatUseCase {
    pub fn new(
        base: PlaygroundConfig,
        stream: Arc<dyn ChatStream>,
        clock: Arc<dyn Clock>,
        fs: Arc<dyn FileSystem>,
        interrupt: Arc<dyn InterruptChecker>,
        logger: Arc<dyn Log>,
    ) -> Self {
        Self {
            base,
            stream,
            clock,
            fs,
            interrupt,
            logger,
        }
    }

    fn relay(&self, overrides: &ChatOverrides) -> Result<ChatRelay, Error> {
        let config = apply_overrides(self.base.clone(), overrides)?;
        Ok(ChatRelay::new(
            config,
            Arc::clone(&self.stream),
            Arc::clone(&self.clock),
            Arc::clone(&self.logger),
        ))
    }

    fn attachment(&self, image: Option<&str>) -> Result<Option<Attachment>, Error> {
        image.map(|path| resolve_image(self.fs.as_ref(), path)).transpose()
    }

    /// 1 往復。応答の最終状態を返す
    fn exchange(
        &self,
        relay: &mut ChatRelay,
        text: &str,
        attachment: Option<Attachment>,
    ) -> Result<Option<MessageStatus>, Error> {
        // プロンプト待ちの間に押された Ctrl+C は、この応答の中断として扱わない
        self.interrupt.reset();
        let reply = relay.submit(text, attachment)?;
        Ok(relay.drive(reply, self.interrupt.as_ref()))
    }

    /// 引数のメッセージを 1 回送って終わる。応答がエラーなら 1
    pub fn run_once(
        &self,
        overrides: &ChatOverrides,
        image: Option<&str>,
        message: &str,
        observer: Box<dyn TranscriptObserver>,
    ) -> Result<i32, Error> {
        let mut relay = self.relay(overrides)?;
        relay.add_observer(observer);
        let attachment = self.attachment(image)?;
        match self.exchange(&mut relay, message, attachment)? {
            Some(MessageStatus::Error) => Ok(1),
            _ => Ok(0),
        }
    }

    /// 対話モード。EOF か /exit で終わる
    pub fn run_repl(
        &self,
        overrides: &ChatOverrides,
        image: Option<&str>,
        io: ChatIo<'_>,
    ) -> Result<i32, Error> {
        let ChatIo {
            input,
            console,
            observer,
        } = io;
        let mut relay = self.relay(overrides)?;
        relay.add_observer(observer);
        let mut pending_image = self.attachment(image)?;

        writeln!(
            console,
            "model {} / group {} ({})",
            relay.config().model,
            relay.config().group,
            REPL_HELP
        )?;
        let mut line = String::new();
        loop {
            write!(console, "> ")?;
            console.flush()?;
            line.clear();
            if input.read_line(&mut line)? == 0 {
                writeln!(console)?;
                break;
            }
            match parse_repl_line(&line) {
                // 画像だけを送る
                ReplInput::Empty if pending_image.is_some() => {
                    let attachment = pending_image.take();
                    if let Err(e) = self.exchange(&mut relay, "", attachment) {
                        writeln!(console, "gwc: {}", e)?;
                    }
                }
                ReplInput::Empty => {}
                ReplInput::Exit => break,
                ReplInput::Help => writeln!(console, "{}", REPL_HELP)?,
                ReplInput::Clear => {
                    relay.clear();
                    pending_image = None;
                }
                ReplInput::Unknown(cmd) => {
                    writeln!(console, "unknown command {} ({})", cmd, REPL_HELP)?
                }
                ReplInput::Image(path) => match resolve_image(self.fs.as_ref(), &path) {
                    Ok(a) => {
                        pending_image = Some(a);
                        writeln!(console, "(image attached to next message)")?;
                    }
                    Err(e) => writeln!(console, "gwc: {}", e)?,
                },
                ReplInput::Message(text) => {
                    let attachment = pending_image.take();
                    if let Err(e) = self.exchange(&mut relay, &text, attachment) {
                        writeln!(console, "gwc: {}", e)?;
                    }
                }
            }
        }
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_repl_line() {
        assert_eq!(parse_repl_line("  hello there \n"), ReplInput::Message("hello there".into()));
        assert_eq!(parse_repl_line("\n"), ReplInput::Empty);
        assert_eq!(parse_repl_line("/clear\n"), ReplInput::Clear);
        assert_eq!(parse_repl_line("/quit"), ReplInput::Exit);
        assert_eq!(parse_repl_line("/image  cat.png "), ReplInput::Image("cat.png".into()));
        assert_eq!(parse_repl_line("/nope"), ReplInput::Unknown("/nope".into()));
    }
}
