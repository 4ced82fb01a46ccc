//! カタログ（モデル・グループ一覧）のユースケース
//!
//! 自動読み込みは with_retry で最大 2 回まで。失敗は 1 度だけ呼び出し元に返す。

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;

use common::error::Error;
use common::ports::outbound::{Log, LogLevel, LogRecord};
use common::retry::{with_retry, DEFAULT_MAX_ATTEMPTS};

use crate::ports::outbound::Catalog;

pub struct CatalogUseCase {
    catalog: Arc<dyn Catalog>,
    logger: Arc<dyn Log>,
}

impl CatalogUseCase {
    pub fn new(catalog: Arc<dyn Catalog>, logger: Arc<dyn Log>) -> Self {
        Self { catalog, logger }
    }

    fn log_failure(&self, what: &str, attempt: u32, e: &Error) {
        let _ = self.logger.log(
            &LogRecord::new(LogLevel::Warn, format!("{} load failed", what))
                .layer("usecase")
                .kind("catalog")
                .field("attempt", attempt)
                .field("max_attempts", DEFAULT_MAX_ATTEMPTS)
                .field("error", e.to_string()),
        );
    }

    pub fn models(&self) -> Result<Vec<String>, Error> {
        with_retry(
            DEFAULT_MAX_ATTEMPTS,
            || self.catalog.models(),
            |attempt, e| self.log_failure("models", attempt, e),
        )
    }

    pub fn groups(&self) -> Result<BTreeMap<String, String>, Error> {
        with_retry(
            DEFAULT_MAX_ATTEMPTS,
            || self.catalog.groups(),
            |attempt, e| self.log_failure("groups", attempt, e),
        )
    }

    pub fn print_models(&self, out: &mut dyn Write) -> Result<i32, Error> {
        for m in self.models()? {
            writeln!(out, "{}", m)?;
        }
        Ok(0)
    }

    pub fn print_groups(&self, out: &mut dyn Write) -> Result<i32, Error> {
        let groups = self.groups()?;
        let width = groups.keys().map(|k| k.len()).max().unwrap_or(0);
        for (name, desc) in &groups {
            if desc.is_empty() {
                writeln!(out, "{}", name)?;
            } else {
                writeln!(out, "{:<width$}  {}", name, desc, width = width)?;
            }
        }
        Ok(0)
    }
}
