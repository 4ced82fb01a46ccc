//! カタログ（選択肢の元データ）Outbound ポート

use common::error::Error;
use std::collections::BTreeMap;

/// `/api/user/models` と `/api/user/self/groups`
pub trait Catalog: Send + Sync {
    /// 呼び出し元が使えるモデル名
    fn models(&self) -> Result<Vec<String>, Error>;
    /// 許可されたグループ（キー → 説明）
    fn groups(&self) -> Result<BTreeMap<String, String>, Error>;
}
