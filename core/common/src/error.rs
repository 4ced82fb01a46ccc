//! エラーハンドリング
//!
//! 全コマンド共通のエラー型。終了コードは sysexits に合わせる。

use thiserror::Error as ThisError;

/// 共通エラー型
#[derive(Debug, ThisError)]
pub enum Error {
    /// 引数不正（usage を表示する）
    #[error("{0}")]
    InvalidArgs(String),
    /// HTTP 通信失敗・非 2xx 応答
    #[error("{0}")]
    Http(String),
    /// API エンベロープの success: false
    #[error("API error: {0}")]
    Api(String),
    /// JSON のパース・シリアライズ失敗
    #[error("{0}")]
    Json(String),
    /// ファイル I/O
    #[error("{0}")]
    Io(String),
    /// 環境変数・設定ディレクトリの解決失敗
    #[error("{0}")]
    Env(String),
    /// フォーム検証エラー（ネットワークには到達しない）
    #[error("validation failed: {0}")]
    Validation(String),
    /// 応答ストリーミング中のため受け付けない
    #[error("{0}")]
    Busy(String),
    /// その他のシステムエラー
    #[error("{0}")]
    System(String),
}

impl Error {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgs(msg.into())
    }

    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }

    pub fn json(msg: impl Into<String>) -> Self {
        Self::Json(msg.into())
    }

    pub fn io_msg(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    pub fn env(msg: impl Into<String>) -> Self {
        Self::Env(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn busy(msg: impl Into<String>) -> Self {
        Self::Busy(msg.into())
    }

    pub fn system(msg: impl Into<String>) -> Self {
        Self::System(msg.into())
    }

    /// 終了コード（sysexits.h 準拠）
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgs(_) => 64,
            Self::Validation(_) => 65,
            Self::System(_) => 70,
            Self::Http(_) | Self::Api(_) | Self::Json(_) | Self::Io(_) => 74,
            Self::Busy(_) => 75,
            Self::Env(_) => 78,
        }
    }

    /// usage を併せて表示すべきエラーか
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::InvalidArgs(_))
    }

    /// メッセージの前に文脈を付ける（種別は保持）
    pub fn with_context(self, ctx: impl AsRef<str>) -> Self {
        let ctx = ctx.as_ref();
        match self {
            Self::InvalidArgs(m) => Self::InvalidArgs(format!("{}: {}", ctx, m)),
            Self::Http(m) => Self::Http(format!("{}: {}", ctx, m)),
            Self::Api(m) => Self::Api(format!("{}: {}", ctx, m)),
            Self::Json(m) => Self::Json(format!("{}: {}", ctx, m)),
            Self::Io(m) => Self::Io(format!("{}: {}", ctx, m)),
            Self::Env(m) => Self::Env(format!("{}: {}", ctx, m)),
            Self::Validation(m) => Self::Validation(format!("{}: {}", ctx, m)),
            Self::Busy(m) => Self::Busy(format!("{}: {}", ctx, m)),
            Self::System(m) => Self::System(format!("{}: {}", ctx, m)),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}
