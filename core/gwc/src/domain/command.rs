//! gwc のコマンド（CLI 解析結果を usecase に渡す形）

use super::task::{TaskQuery, TaskScope};
use common::domain::{GroupName, ModelName};

/// chat サブコマンドの上書き指定（None は設定ファイルの値を使う）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatOverrides {
    pub model: Option<ModelName>,
    pub group: Option<GroupName>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    pub system: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GwcCommand {
    Help,
    /// message が None なら対話モード
    Chat {
        overrides: ChatOverrides,
        image: Option<String>,
        message: Option<String>,
    },
    Models,
    Groups,
    Tasks {
        scope: TaskScope,
        query: TaskQuery,
    },
    SettingsShow {
        panel: String,
    },
    SettingsSet {
        panel: String,
        assignments: Vec<(String, String)>,
    },
}

impl GwcCommand {
    /// ログ用の名前
    pub fn name(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Chat { .. } => "chat",
            Self::Models => "models",
            Self::Groups => "groups",
            Self::Tasks { .. } => "tasks",
            Self::SettingsShow { .. } => "settings-show",
            Self::SettingsSet { .. } => "settings-set",
        }
    }
}
