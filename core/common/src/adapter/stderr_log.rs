//! 人間向けログ（LogRecord → stderr への要点のみ出力）
//!
//! --verbose 時だけ配線する。fields の全量は出さず要点のみ（巨大化防止）。

use crate::error::Error;
use crate::ports::outbound::{Log, LogLevel, LogRecord};

const FIELDS_SUMMARY_MAX: usize = 400;

/// fields の要点だけを短い文字列にする
fn fields_summary(record: &LogRecord) -> String {
    let Some(fields) = record.fields.as_ref().filter(|f| !f.is_empty()) else {
        return String::new();
    };
    let s = serde_json::to_string(fields).unwrap_or_default();
    if s.chars().count() <= FIELDS_SUMMARY_MAX {
        return s;
    }
    let truncated = s.chars().take(FIELDS_SUMMARY_MAX).collect::<String>();
    format!("{}... (len={})", truncated, s.len())
}

/// 1 行に整形する（テスト用に分離）
pub(crate) fn format_line(record: &LogRecord) -> String {
    let mut line = format!("[{}] {}", record.level.as_str(), record.message);
    if let Some(kind) = &record.kind {
        line = format!("{} ({})", line, kind);
    }
    let summary = fields_summary(record);
    if !summary.is_empty() {
        line.push(' ');
        line.push_str(&summary);
    }
    line
}

/// 人間向けに stderr へ出力する Log 実装
pub struct StderrLog {
    max_level: LogLevel,
}

impl StderrLog {
    /// max_level より詳細なレコード（Debug など）は捨てる
    pub fn new(max_level: LogLevel) -> Self {
        Self { max_level }
    }
}

impl Default for StderrLog {
    fn default() -> Self {
        Self::new(LogLevel::Debug)
    }
}

impl Log for StderrLog {
    fn log(&self, record: &LogRecord) -> Result<(), Error> {
        if record.level > self.max_level {
            return Ok(());
        }
        eprintln!("{}", format_line(record));
        Ok(())
    }
}
