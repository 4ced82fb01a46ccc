//! タスクログ Outbound ポート

use crate::domain::{TaskQuery, TaskRecord, TaskScope};
use common::error::Error;

pub trait TaskLog: Send + Sync {
    /// 1 ページ分のタスク
    fn list(&self, scope: TaskScope, query: &TaskQuery) -> Result<Vec<TaskRecord>, Error>;
}
