//! モデル・グループ一覧を取得する Catalog 実装

use std::collections::BTreeMap;

use common::error::Error;
use common::gateway::GatewayClient;
use serde_json::Value;

use crate::ports::outbound::Catalog;

pub const MODELS_PATH: &str = "/api/user/models";
pub const GROUPS_PATH: &str = "/api/user/self/groups";

pub struct HttpCatalog {
    client: GatewayClient,
}

impl HttpCatalog {
    pub fn new(client: GatewayClient) -> Self {
        Self { client }
    }
}

/// グループの説明。文字列ならそのまま、オブジェクトなら desc を使う
fn group_description(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Object(m) => m
            .get("desc")
            .and_then(|d| d.as_str())
            .map(str::to_string)
            .unwrap_or_default(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl Catalog for HttpCatalog {
    fn models(&self) -> Result<Vec<String>, Error> {
        self.client.get_data_or_default(MODELS_PATH, &[])
    }

    fn groups(&self) -> Result<BTreeMap<String, String>, Error> {
        let raw: BTreeMap<String, Value> = self.client.get_data_or_default(GROUPS_PATH, &[])?;
        Ok(raw
            .iter()
            .map(|(k, v)| (k.clone(), group_description(v)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_group_description_accepts_string_and_object() {
        assert_eq!(group_description(&json!("Default group")), "Default group");
        assert_eq!(group_description(&json!({"desc": "VIP", "ratio": 1.5})), "VIP");
        assert_eq!(group_description(&json!(null)), "");
    }
}
