//! ChatUseCase のテスト（対話モード・ワンショットを StubChatStream で通す）

use std::io::{self, Cursor, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use common::adapter::{NoopLog, StdClock, StdFileSystem};

use crate::adapter::{StdoutRenderer, StubChatStream};
use crate::domain::chat_request::{ContentPart, ImageUrl, MessageContent};
use crate::domain::{ChatOverrides, PlaygroundConfig, Role, StreamEvent};
use crate::ports::outbound::InterruptChecker;
use crate::usecase::{ChatIo, ChatUseCase};

const CAT_URL: &str = "https://example.com/cat.png";

/// observer に渡した後も中身を読めるバッファ
#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Default)]
struct FlagInterrupt(AtomicBool);

impl InterruptChecker for FlagInterrupt {
    fn is_interrupted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
    fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

fn use_case(stream: Arc<StubChatStream>, interrupt: Arc<FlagInterrupt>) -> ChatUseCase {
    ChatUseCase::new(
        PlaygroundConfig::default(),
        stream,
        Arc::new(StdClock),
        Arc::new(StdFileSystem),
        interrupt,
        Arc::new(NoopLog),
    )
}

/// 対話モードを input で回し、(描画された応答, コンソール出力) を返す
fn run_repl(uc: &ChatUseCase, input: &str) -> (String, String) {
    let rendered = SharedBuf::default();
    let mut input = Cursor::new(input.as_bytes());
    let mut console = Vec::new();
    let code = uc
        .run_repl(
            &ChatOverrides::default(),
            None,
            ChatIo {
                input: &mut input,
                console: &mut console,
                observer: Box::new(StdoutRenderer::new(rendered.clone())),
            },
        )
        .unwrap();
    assert_eq!(code, 0);
    (rendered.text(), String::from_utf8(console).unwrap())
}

fn last_user_content(stream: &StubChatStream) -> MessageContent {
    let requests = stream.requests();
    let last = requests.last().unwrap();
    let user = last.messages.iter().rev().find(|m| m.role == Role::User).unwrap();
    user.content.clone()
}

#[test]
fn test_ctrl_c_at_prompt_does_not_cancel_next_reply() {
    let stream = Arc::new(StubChatStream::new(vec![vec![
        StreamEvent::Delta("Hello".into()),
        StreamEvent::Done,
    ]]));
    let interrupt = Arc::new(FlagInterrupt::default());
    // 送信前（プロンプト待ち）に Ctrl+C が押されていた
    interrupt.0.store(true, Ordering::SeqCst);
    let uc = use_case(Arc::clone(&stream), Arc::clone(&interrupt));

    let (rendered, _) = run_repl(&uc, "Hi\n");
    assert_eq!(rendered, "Hello\n");
    assert!(!interrupt.is_interrupted());
}

#[test]
fn test_empty_line_sends_pending_image_alone() {
    let stream = Arc::new(StubChatStream::deltas_then_done(&["a cat"]));
    let uc = use_case(Arc::clone(&stream), Arc::new(FlagInterrupt::default()));

    let (rendered, console) = run_repl(&uc, &format!("/image {}\n\n", CAT_URL));
    assert!(console.contains("(image attached to next message)"));
    assert_eq!(rendered, "a cat\n");
    assert_eq!(stream.requests().len(), 1);
    assert_eq!(
        last_user_content(&stream),
        MessageContent::Parts(vec![ContentPart::ImageUrl {
            image_url: ImageUrl { url: CAT_URL.into() }
        }])
    );
}

#[test]
fn test_empty_line_without_image_sends_nothing() {
    let stream = Arc::new(StubChatStream::deltas_then_done(&["unused"]));
    let uc = use_case(Arc::clone(&stream), Arc::new(FlagInterrupt::default()));

    let (rendered, _) = run_repl(&uc, "\n   \n");
    assert_eq!(rendered, "");
    assert!(stream.requests().is_empty());
}

#[test]
fn test_run_once_sends_image_without_text() {
    let stream = Arc::new(StubChatStream::deltas_then_done(&["a cat"]));
    let uc = use_case(Arc::clone(&stream), Arc::new(FlagInterrupt::default()));
    let rendered = SharedBuf::default();

    let code = uc
        .run_once(
            &ChatOverrides::default(),
            Some(CAT_URL),
            "",
            Box::new(StdoutRenderer::new(rendered.clone())),
        )
        .unwrap();
    assert_eq!(code, 0);
    assert_eq!(rendered.text(), "a cat\n");
    assert!(matches!(last_user_content(&stream), MessageContent::Parts(parts) if parts.len() == 1));
}
