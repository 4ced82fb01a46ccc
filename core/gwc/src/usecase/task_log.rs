//! タスクログ一覧のユースケース

use std::fmt::Display;
use std::io::Write;
use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone};
use common::error::Error;

use crate::domain::{TaskQuery, TaskRecord, TaskScope};
use crate::ports::outbound::TaskLog;

pub struct TaskLogUseCase {
    tasks: Arc<dyn TaskLog>,
}

/// Unix 秒を表示用にする。0 は未記録
fn format_ts<Tz: TimeZone>(secs: i64, tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    if secs <= 0 {
        return "-".to_string();
    }
    DateTime::from_timestamp(secs, 0)
        .map(|t| t.with_timezone(tz).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| secs.to_string())
}

fn format_duration(record: &TaskRecord) -> String {
    match record.duration_secs() {
        Some(s) if s >= 60 => format!("{}m{:02}s", s / 60, s % 60),
        Some(s) => format!("{}s", s),
        None => "-".to_string(),
    }
}

fn dash_if_empty(s: &str) -> &str {
    if s.is_empty() {
        "-"
    } else {
        s
    }
}

/// タスクを 1 行 1 件の表にする
pub fn render_table<Tz: TimeZone>(
    out: &mut dyn Write,
    records: &[TaskRecord],
    tz: &Tz,
) -> Result<(), Error>
where
    Tz::Offset: Display,
{
    writeln!(
        out,
        "{:<6} {:<24} {:<10} {:<12} {:<12} {:<8} {:<19} {:<8} {}",
        "ID", "TASK_ID", "PLATFORM", "ACTION", "STATUS", "PROGRESS", "SUBMITTED", "DURATION", "FAIL_REASON"
    )?;
    for r in records {
        writeln!(
            out,
            "{:<6} {:<24} {:<10} {:<12} {:<12} {:<8} {:<19} {:<8} {}",
            r.id,
            dash_if_empty(&r.task_id),
            dash_if_empty(&r.platform),
            dash_if_empty(&r.action),
            r.status.as_str(),
            dash_if_empty(&r.progress),
            format_ts(r.submit_time, tz),
            format_duration(r),
            r.fail_reason
        )?;
    }
    Ok(())
}

impl TaskLogUseCase {
    pub fn new(tasks: Arc<dyn TaskLog>) -> Self {
        Self { tasks }
    }

    pub fn list(&self, scope: TaskScope, query: &TaskQuery, out: &mut dyn Write) -> Result<i32, Error> {
        let records = self.tasks.list(scope, query)?;
        if records.is_empty() {
            writeln!(out, "no tasks")?;
            return Ok(0);
        }
        render_table(out, &records, &Local)?;
        Ok(0)
    }
}
