//! ゲートウェイ HTTP クライアント（blocking reqwest）
//!
//! 認証はしない。アクセストークンが与えられていれば Authorization ヘッダで中継するだけ。

use crate::error::Error;
use crate::gateway::envelope::{decode_envelope, error_message_from_body};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// JSON API 1 回あたりの上限。ストリームには適用しない
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// ゲートウェイ API クライアント
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl GatewayClient {
    /// 新しいクライアントを作成
    ///
    /// * `base_url` - 末尾の `/` は取り除く
    /// * `token` - Authorization: Bearer に載せるトークン（None なら付けない）
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self, Error> {
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self.http.request(method, self.url(path));
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    fn send_json(&self, builder: RequestBuilder, what: &str) -> Result<(u16, String), Error> {
        let response = builder
            .timeout(REQUEST_TIMEOUT)
            .send()
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e)).with_context(what))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| Error::http(format!("Failed to read response: {}", e)).with_context(what))?;
        Ok((status, body))
    }

    /// GET して data を取り出す。data が null / 欠落なら既定値（一覧系 API 用）
    pub fn get_data_or_default<T: DeserializeOwned + Default>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, Error> {
        let what = format!("GET {}", path);
        let (status, body) = self.send_json(self.request(Method::GET, path).query(query), &what)?;
        decode_envelope::<T>(status, &body)
            .map(|env| env.into_data_or_default())
            .map_err(|e| e.with_context(&what))
    }

    /// PUT で JSON を送り、success を確認する
    pub fn put_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), Error> {
        let what = format!("PUT {}", path);
        let (status, text) = self.send_json(self.request(Method::PUT, path).json(body), &what)?;
        decode_envelope::<Value>(status, &text)
            .map(|_| ())
            .map_err(|e| e.with_context(&what))
    }

    /// POST して event-stream 応答を開く（タイムアウトなし）
    ///
    /// 非 2xx の場合は本文を読み切って `Error::Http` にする。
    pub fn post_event_stream<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, Error> {
        let what = format!("POST {}", path);
        let response = self
            .request(Method::POST, path)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(body)
            .send()
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e)).with_context(&what))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            let msg = error_message_from_body(&text).unwrap_or_else(|| text.trim().to_string());
            return Err(Error::http(format!("HTTP {}: {}", status.as_u16(), msg)));
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let c = GatewayClient::new("http://gw.example.com/", None).unwrap();
        assert_eq!(c.base_url(), "http://gw.example.com");
        assert_eq!(c.url("/api/option/"), "http://gw.example.com/api/option/");
        assert_eq!(c.url("pg/chat/completions"), "http://gw.example.com/pg/chat/completions");
    }

    #[test]
    fn test_unreachable_host_is_http_error() {
        // 予約済みポート 9 (discard) へ。接続拒否で即失敗する想定
        let c = GatewayClient::new("http://127.0.0.1:9", None).unwrap();
        let err = c.get_data_or_default::<Vec<String>>("/api/user/models", &[]).unwrap_err();
        assert!(matches!(err, Error::Http(_)));
        assert!(err.to_string().starts_with("GET /api/user/models"));
    }
}
