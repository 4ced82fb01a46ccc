//! オプションストア Outbound ポート
//!
//! 値は常に文字列。並行書き込みのため Sync を要求する。

use crate::domain::OptionEntry;
use common::error::Error;

/// `GET /api/option/` と `PUT /api/option/`
pub trait OptionStore: Send + Sync {
    /// 全オプションのスナップショット
    fn load_all(&self) -> Result<Vec<OptionEntry>, Error>;
    /// 1 キーを書く
    fn put(&self, key: &str, value: &str) -> Result<(), Error>;
}
