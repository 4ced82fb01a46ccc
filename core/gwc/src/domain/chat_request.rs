//! `/pg/chat/completions` に送るペイロード

use super::message::{Attachment, MessageStatus, Role};
use super::playground::PlaygroundConfig;
use super::transcript::Transcript;
use serde::Serialize;

/// 1 メッセージの本文。添付があれば content parts 配列にする
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestMessage {
    pub role: Role,
    pub content: MessageContent,
}

/// チャット送信ペイロード
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub messages: Vec<RequestMessage>,
    pub stream: bool,
    pub model: String,
    pub group: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl ChatRequest {
    /// トランスクリプトからペイロードを組み立てる
    ///
    /// * system プロンプトが空でなければ先頭に付ける
    /// * user は常に含める。assistant は Complete のものだけ（エラー応答と受信中のプレースホルダは送らない）
    pub fn from_transcript(config: &PlaygroundConfig, transcript: &Transcript) -> Self {
        let mut messages = Vec::with_capacity(transcript.len() + 1);
        if !config.system_prompt.trim().is_empty() {
            messages.push(RequestMessage {
                role: Role::System,
                content: MessageContent::Text(config.system_prompt.clone()),
            });
        }
        for m in transcript.messages() {
            let include = match m.role {
                Role::Assistant => m.status == Some(MessageStatus::Complete),
                Role::User | Role::System => true,
            };
            if !include {
                continue;
            }
            let content = match &m.attachment {
                None => MessageContent::Text(m.content.clone()),
                Some(Attachment::ImageUrl(url)) => {
                    let mut parts = Vec::with_capacity(2);
                    if !m.content.is_empty() {
                        parts.push(ContentPart::Text {
                            text: m.content.clone(),
                        });
                    }
                    parts.push(ContentPart::ImageUrl {
                        image_url: ImageUrl { url: url.clone() },
                    });
                    MessageContent::Parts(parts)
                }
            };
            messages.push(RequestMessage {
                role: m.role,
                content,
            });
        }
        Self {
            messages,
            stream: true,
            model: config.model.to_string(),
            group: config.group.to_string(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}
