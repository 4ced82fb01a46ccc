//! プレイグラウンドの送信パラメータ

use common::domain::{GroupName, ModelName};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_GROUP: &str = "default";
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// チャット送信時に毎回ペイロードへ載せる設定
#[derive(Debug, Clone, PartialEq)]
pub struct PlaygroundConfig {
    pub model: ModelName,
    pub group: GroupName,
    pub max_tokens: u32,
    pub temperature: f64,
    /// 空文字なら system メッセージを付けない
    pub system_prompt: String,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            model: ModelName::new(DEFAULT_MODEL),
            group: GroupName::new(DEFAULT_GROUP),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            system_prompt: String::new(),
        }
    }
}
