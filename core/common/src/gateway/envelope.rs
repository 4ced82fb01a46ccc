//! API エンベロープ `{success, message, data}` のデコード
//!
//! HTTP 層（reqwest）と切り離し、ステータスコードと本文だけで判定できるようにしてある。

use crate::error::Error;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// ゲートウェイ API の共通エンベロープ
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// data を取り出す。success なのに data が無い場合もエラー
    pub fn into_data(self) -> Result<T, Error> {
        self.data
            .ok_or_else(|| Error::api("response has no data field"))
    }

    /// data を取り出す。無ければ（null 含む）既定値
    pub fn into_data_or_default(self) -> T
    where
        T: Default,
    {
        self.data.unwrap_or_default()
    }
}

/// エラー本文から人間向けメッセージを取り出す
///
/// `{message}`（エンベロープ）と `{error: {message}}`（OpenAI 互換）の両方に対応。
pub fn error_message_from_body(body: &str) -> Option<String> {
    let v: Value = serde_json::from_str(body).ok()?;
    v["error"]["message"]
        .as_str()
        .or_else(|| v["message"].as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// ステータスと本文からエンベロープを復元し、失敗を Error に変換する
///
/// * 非 2xx → `Error::Http`
/// * `success: false` → `Error::Api(message)`
pub fn decode_envelope<T: DeserializeOwned>(status: u16, body: &str) -> Result<ApiEnvelope<T>, Error> {
    if !(200..300).contains(&status) {
        let msg = error_message_from_body(body).unwrap_or_else(|| body.trim().to_string());
        return Err(Error::http(format!("HTTP {}: {}", status, msg)));
    }
    let envelope: ApiEnvelope<T> = serde_json::from_str(body)
        .map_err(|e| Error::json(format!("Failed to parse response JSON: {}", e)))?;
    if !envelope.success {
        let msg = if envelope.message.is_empty() {
            "request failed".to_string()
        } else {
            envelope.message.clone()
        };
        return Err(Error::api(msg));
    }
    Ok(envelope)
}
