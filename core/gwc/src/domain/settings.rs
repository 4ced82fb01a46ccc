//! 設定パネルのドメイン型
//!
//! オプションストアは全値を文字列で運ぶ。bool は "true" / "false"、構造化値は JSON 文字列。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// オプションストアの 1 エントリ（ワイヤ形式）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionEntry {
    pub key: String,
    pub value: String,
}

impl OptionEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// フォーム上の値
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Text(String),
    Bool(bool),
}

impl OptionValue {
    /// ストアへ書く文字列。bool は必ず "true" / "false"
    pub fn encode(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Bool(b) => if *b { "true" } else { "false" }.to_string(),
        }
    }
}

impl std::fmt::Display for OptionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encode())
    }
}

/// キー → 値のスナップショット
pub type OptionSnapshot = BTreeMap<String, OptionValue>;

/// フィールドの種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Number,
    Bool,
    /// JSON 文字列。読み込み時に整形し、保存前に妥当性を検査する
    Json,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Bool => "bool",
            Self::Json => "json",
        }
    }

    /// ストアの生文字列をフォーム値へ
    pub fn decode(&self, raw: &str) -> OptionValue {
        match self {
            Self::Bool => OptionValue::Bool(raw == "true"),
            Self::Json => OptionValue::Text(pretty_json(raw)),
            Self::Number => OptionValue::Text(raw.to_string()),
        }
    }

    /// 未設定キーの初期値
    pub fn empty_value(&self) -> OptionValue {
        match self {
            Self::Bool => OptionValue::Bool(false),
            Self::Number | Self::Json => OptionValue::Text(String::new()),
        }
    }
}

/// JSON 文字列を 2 スペースで整形する。パースできなければそのまま返す
pub fn pretty_json(raw: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(v) => serde_json::to_string_pretty(&v).unwrap_or_else(|_| raw.to_string()),
        Err(_) => raw.to_string(),
    }
}

/// JSON として妥当か（空文字は「未設定」として許す）
pub fn check_json(raw: &str) -> Result<(), String> {
    if raw.trim().is_empty() {
        return Ok(());
    }
    serde_json::from_str::<serde_json::Value>(raw)
        .map(|_| ())
        .map_err(|e| e.to_string())
}

/// 1 フィールドの定義
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub kind: FieldKind,
    pub label: &'static str,
}

impl FieldSpec {
    const fn new(key: &'static str, kind: FieldKind, label: &'static str) -> Self {
        Self { key, kind, label }
    }
}

const CLAUDE_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("claude.model_headers_settings", FieldKind::Json, "Per-model request header overrides"),
    FieldSpec::new("claude.default_max_tokens", FieldKind::Json, "Default max_tokens per model"),
    FieldSpec::new("claude.thinking_adapter_enabled", FieldKind::Bool, "Enable -thinking model suffix adapter"),
    FieldSpec::new(
        "claude.thinking_adapter_budget_tokens_percentage",
        FieldKind::Number,
        "Thinking budget as a fraction of max_tokens",
    ),
];

const GEMINI_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("gemini.safety_settings", FieldKind::Json, "Safety settings per category"),
    FieldSpec::new("gemini.version_settings", FieldKind::Json, "API version per model"),
    FieldSpec::new("gemini.supported_imagine_models", FieldKind::Json, "Models allowed to return images"),
    FieldSpec::new("gemini.thinking_adapter_enabled", FieldKind::Bool, "Enable -thinking model suffix adapter"),
    FieldSpec::new(
        "gemini.thinking_adapter_budget_tokens_percentage",
        FieldKind::Number,
        "Thinking budget as a fraction of max_tokens",
    ),
];

/// 設定パネル（オプションキーの部分集合）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsPanel {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl SettingsPanel {
    pub const NAMES: &'static [&'static str] = &["claude", "gemini"];

    pub fn claude() -> Self {
        Self {
            name: "claude",
            fields: CLAUDE_FIELDS,
        }
    }

    pub fn gemini() -> Self {
        Self {
            name: "gemini",
            fields: GEMINI_FIELDS,
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "claude" => Some(Self::claude()),
            "gemini" => Some(Self::gemini()),
            _ => None,
        }
    }

    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_encoding_is_exact() {
        assert_eq!(OptionValue::Bool(true).encode(), "true");
        assert_eq!(OptionValue::Bool(false).encode(), "false");
    }

    #[test]
    fn test_bool_decoding_by_equality() {
        assert_eq!(FieldKind::Bool.decode("true"), OptionValue::Bool(true));
        assert_eq!(FieldKind::Bool.decode("TRUE"), OptionValue::Bool(false));
        assert_eq!(FieldKind::Bool.decode(""), OptionValue::Bool(false));
    }

    #[test]
    fn test_json_decoding_pretty_prints() {
        let v = FieldKind::Json.decode(r#"{"a":1}"#);
        assert_eq!(v, OptionValue::Text("{\n  \"a\": 1\n}".to_string()));
    }

    #[test]
    fn test_json_decoding_keeps_invalid_text() {
        assert_eq!(
            FieldKind::Json.decode("{not json"),
            OptionValue::Text("{not json".to_string())
        );
    }

    #[test]
    fn test_check_json() {
        assert!(check_json("{not json").is_err());
        assert!(check_json("[1, 2]").is_ok());
        assert!(check_json("  ").is_ok());
    }

    #[test]
    fn test_panels_by_name() {
        for name in SettingsPanel::NAMES {
            let panel = SettingsPanel::by_name(name).unwrap();
            assert_eq!(&panel.name, name);
            assert!(panel.fields.iter().all(|f| f.key.starts_with(name)));
        }
        assert!(SettingsPanel::by_name("openai").is_none());
        assert_eq!(
            SettingsPanel::gemini().field("gemini.safety_settings").unwrap().kind,
            FieldKind::Json
        );
    }
}
