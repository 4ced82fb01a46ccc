//! ストリーミングチャットリレー
//!
//! サーバーから届くイベント列をトランスクリプトの変更に畳み込む。
//! 1 セッションにつき終端遷移は高々 1 回で、先に届いた終了トリガが勝つ。

use std::ops::ControlFlow;
use std::sync::Arc;

use common::error::Error;
use common::ports::outbound::{Clock, Log, LogLevel, LogRecord};

use crate::domain::{
    Attachment, ChatRequest, MessageId, MessageStatus, PlaygroundConfig, StreamEvent,
    TerminalStatus, Transcript,
};
use crate::ports::outbound::{
    ChatStream, InterruptChecker, StreamSession, TranscriptChange, TranscriptObserver,
};

/// submit が返す、応答 1 件分のハンドル
pub struct PendingReply {
    message_id: MessageId,
    session: StreamSession,
}

impl PendingReply {
    /// この応答を受け取る assistant メッセージ
    #[cfg(test)]
    pub fn message_id(&self) -> MessageId {
        self.message_id
    }
}

/// トランスクリプトを所有し、送信とストリーム受信を仲介する
pub struct ChatRelay {
    transcript: Transcript,
    config: PlaygroundConfig,
    stream: Arc<dyn ChatStream>,
    clock: Arc<dyn Clock>,
    logger: Arc<dyn Log>,
    observers: Vec<Box<dyn TranscriptObserver>>,
}

impl ChatRelay {
    pub fn new(
        config: PlaygroundConfig,
        stream: Arc<dyn ChatStream>,
        clock: Arc<dyn Clock>,
        logger: Arc<dyn Log>,
    ) -> Self {
        Self {
            transcript: Transcript::new(),
            config,
            stream,
            clock,
            logger,
            observers: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn config(&self) -> &PlaygroundConfig {
        &self.config
    }

    pub fn add_observer(&mut self, observer: Box<dyn TranscriptObserver>) {
        self.observers.push(observer);
    }

    fn notify(&mut self, change: TranscriptChange) {
        for (i, obs) in self.observers.iter_mut().enumerate() {
            if let Err(e) = obs.on_change(&self.transcript, change) {
                let _ = self.logger.log(
                    &LogRecord::new(LogLevel::Warn, "transcript observer failed")
                        .layer("usecase")
                        .kind("relay")
                        .field("observer", i)
                        .field("error", e.to_string()),
                );
            }
        }
    }

    /// ユーザーメッセージを送信し、応答用のセッションを開く
    ///
    /// * 本文が空でよいのは添付があるときだけ
    /// * 直前の応答がまだ受信途中なら `Error::Busy`（重ねて送らない）
    pub fn submit(
        &mut self,
        user_text: &str,
        attachment: Option<Attachment>,
    ) -> Result<PendingReply, Error> {
        if user_text.trim().is_empty() && attachment.is_none() {
            return Err(Error::invalid_argument("message is empty"));
        }
        if let Some(pending) = self.transcript.pending() {
            return Err(Error::busy(format!(
                "reply #{} is still streaming; wait for it to finish or clear the transcript",
                pending.id
            )));
        }

        let now = self.clock.now_ms();
        let user_id = self.transcript.push_user(user_text, attachment, now);
        self.notify(TranscriptChange::Appended(user_id));
        let reply_id = self.transcript.push_assistant_placeholder(now);
        self.notify(TranscriptChange::Appended(reply_id));

        let request = ChatRequest::from_transcript(&self.config, &self.transcript);
        let _ = self.logger.log(
            &LogRecord::new(LogLevel::Info, "stream session opened")
                .layer("usecase")
                .kind("relay")
                .field("message_id", reply_id.value())
                .field("model", request.model.clone())
                .field("group", request.group.clone())
                .field("messages", request.messages.len()),
        );

        match self.stream.open(&request) {
            Ok(session) => Ok(PendingReply {
                message_id: reply_id,
                session,
            }),
            Err(e) => {
                self.on_delta(&e.to_string());
                self.complete(TerminalStatus::Error);
                Err(e)
            }
        }
    }

    /// 末尾が受信途中なら text を追記する。終端済みなら黙って捨てる
    pub fn on_delta(&mut self, text: &str) {
        if let Some(id) = self.transcript.append_to_pending(text) {
            self.notify(TranscriptChange::Updated(id));
        }
    }

    /// 末尾を終端状態にする。既に終端なら何もしない（冪等）
    pub fn complete(&mut self, status: TerminalStatus) {
        if let Some(id) = self.transcript.finish_pending(status) {
            self.notify(TranscriptChange::Updated(id));
        }
    }

    /// トランスクリプトを空にする。受信中のセッションは止めない（以後のイベントは捨てられる）
    pub fn clear(&mut self) {
        self.transcript.clear();
        self.notify(TranscriptChange::Cleared);
    }

    /// セッション由来のイベントを 1 つ適用する
    ///
    /// イベントが効くのは、末尾がそのセッションのプレースホルダである間だけ。
    /// 終了トリガなら Break を返す。
    pub fn apply(&mut self, reply_id: MessageId, event: StreamEvent) -> ControlFlow<()> {
        let bound = self.transcript.last().is_some_and(|m| m.id == reply_id);
        if !bound {
            let _ = self.logger.log(
                &LogRecord::new(LogLevel::Debug, "late stream event dropped")
                    .layer("usecase")
                    .kind("relay")
                    .field("message_id", reply_id.value())
                    .field("event", event.kind_name()),
            );
            return if event.is_terminal() {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            };
        }
        match event {
            StreamEvent::Delta(text) => {
                self.on_delta(&text);
                ControlFlow::Continue(())
            }
            StreamEvent::Done | StreamEvent::ConnectionClosed => {
                self.complete(TerminalStatus::Complete);
                ControlFlow::Break(())
            }
            StreamEvent::Error(text) => {
                self.on_delta(&text);
                self.complete(TerminalStatus::Error);
                ControlFlow::Break(())
            }
        }
    }

    /// セッションを最後まで消費する（1 セッション 1 ループ）
    ///
    /// 購読が終端イベントなしに尽きたら ConnectionClosed 扱い。割り込みを検知したら購読をキャンセルする。
    /// 戻り値は応答メッセージの最終状態（クリア済みなら None）。
    pub fn drive(
        &mut self,
        reply: PendingReply,
        interrupt: &dyn InterruptChecker,
    ) -> Option<MessageStatus> {
        let PendingReply {
            message_id,
            mut session,
        } = reply;
        let cancel = session.cancel_token();
        let mut deltas = 0usize;
        let trigger = loop {
            if interrupt.is_interrupted() {
                cancel.cancel();
            }
            let event = session.next().unwrap_or(StreamEvent::ConnectionClosed);
            let kind = event.kind_name();
            if matches!(event, StreamEvent::Delta(_)) {
                deltas += 1;
            }
            if self.apply(message_id, event).is_break() {
                break if cancel.is_cancelled() { "interrupted" } else { kind };
            }
        };
        session.close();
        interrupt.reset();

        let status = self.transcript.get(message_id).and_then(|m| m.status);
        let _ = self.logger.log(
            &LogRecord::new(
                if status == Some(MessageStatus::Error) {
                    LogLevel::Warn
                } else {
                    LogLevel::Info
                },
                "stream session terminated",
            )
            .layer("usecase")
            .kind("relay")
            .field("message_id", message_id.value())
            .field("trigger", trigger)
            .field("deltas", deltas)
            .field("status", status.map(|s| s.as_str()).unwrap_or("cleared")),
        );
        status
    }
}
