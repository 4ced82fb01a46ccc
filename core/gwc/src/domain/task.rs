//! タスクログ（非同期タスクの実行記録）

use serde::{Deserialize, Deserializer};

/// 一覧の対象範囲
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskScope {
    /// 全ユーザー分（管理者）: /api/task/
    All,
    /// 自分の分: /api/task/self
    Mine,
}

impl TaskScope {
    pub fn path(&self) -> &'static str {
        match self {
            Self::All => "/api/task/",
            Self::Mine => "/api/task/self",
        }
    }
}

/// 一覧の絞り込み条件（未指定は送らない）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    /// ページ番号（1 始まり）
    pub page: Option<u32>,
    pub channel_id: Option<String>,
    pub task_id: Option<String>,
    /// Unix 秒
    pub start_timestamp: Option<i64>,
    /// Unix 秒
    pub end_timestamp: Option<i64>,
}

impl TaskQuery {
    /// クエリ文字列のペア（p, channel_id, task_id, start_timestamp, end_timestamp の順）
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(p) = self.page {
            pairs.push(("p", p.to_string()));
        }
        if let Some(c) = self.channel_id.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("channel_id", c.to_string()));
        }
        if let Some(t) = self.task_id.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("task_id", t.to_string()));
        }
        if let Some(s) = self.start_timestamp {
            pairs.push(("start_timestamp", s.to_string()));
        }
        if let Some(e) = self.end_timestamp {
            pairs.push(("end_timestamp", e.to_string()));
        }
        pairs
    }
}

/// タスクの状態
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    NotStart,
    Submitted,
    Queued,
    InProgress,
    Failure,
    Success,
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStart => "not_start",
            Self::Submitted => "submitted",
            Self::Queued => "queued",
            Self::InProgress => "in_progress",
            Self::Failure => "failure",
            Self::Success => "success",
            Self::Unknown => "unknown",
        }
    }
}

fn status_or_unknown<'de, D: Deserializer<'de>>(d: D) -> Result<TaskStatus, D::Error> {
    Ok(Option::<TaskStatus>::deserialize(d)?.unwrap_or(TaskStatus::Unknown))
}

/// タスク 1 件
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaskRecord {
    pub id: i64,
    #[serde(default)]
    pub task_id: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub action: String,
    #[serde(default = "unknown_status", deserialize_with = "status_or_unknown")]
    pub status: TaskStatus,
    #[serde(default)]
    pub channel_id: i64,
    #[serde(default)]
    pub user_id: i64,
    #[serde(default)]
    pub quota: i64,
    /// 例: "45%"
    #[serde(default)]
    pub progress: String,
    #[serde(default)]
    pub fail_reason: String,
    #[serde(default)]
    pub submit_time: i64,
    #[serde(default)]
    pub start_time: i64,
    #[serde(default)]
    pub finish_time: i64,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

fn unknown_status() -> TaskStatus {
    TaskStatus::Unknown
}

impl TaskRecord {
    /// 実行時間（秒）。開始・終了の両方が記録されているときのみ
    pub fn duration_secs(&self) -> Option<i64> {
        (self.start_time > 0 && self.finish_time >= self.start_time)
            .then(|| self.finish_time - self.start_time)
    }
}
