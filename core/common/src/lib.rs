//! gwc 共通ライブラリ
//!
//! ゲートウェイの REST/SSE 境界に触れる部品と、ログ・設定解決などの横断的な機能を提供します。

/// エラーハンドリング
pub mod error;

/// ドメイン型（Newtype）
pub mod domain;

/// Outbound ポート
pub mod ports;

/// 標準アダプター
pub mod adapter;

/// ゲートウェイ HTTP クライアントとエンベロープ
pub mod gateway;

/// Server-Sent Events のデコーダ
pub mod sse;

/// 回数上限付きリトライ
pub mod retry;
