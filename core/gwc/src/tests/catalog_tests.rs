//! CatalogUseCase のテスト（試行回数の上限）

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use common::adapter::NoopLog;
use common::error::Error;

use crate::ports::outbound::Catalog;
use crate::usecase::CatalogUseCase;

/// 最初の `failures` 回だけ失敗する
struct FlakyCatalog {
    failures: u32,
    calls: AtomicU32,
}

impl FlakyCatalog {
    fn new(failures: u32) -> Self {
        Self {
            failures,
            calls: AtomicU32::new(0),
        }
    }

    fn attempt(&self) -> Result<(), Error> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if n <= self.failures {
            Err(Error::http(format!("HTTP 502: attempt {}", n)))
        } else {
            Ok(())
        }
    }
}

impl Catalog for FlakyCatalog {
    fn models(&self) -> Result<Vec<String>, Error> {
        self.attempt()?;
        Ok(vec!["gpt-4o-mini".into(), "claude-3-5-sonnet".into()])
    }

    fn groups(&self) -> Result<BTreeMap<String, String>, Error> {
        self.attempt()?;
        Ok(BTreeMap::from([
            ("default".to_string(), "Default group".to_string()),
            ("vip".to_string(), String::new()),
        ]))
    }
}

#[test]
fn test_second_attempt_succeeds() {
    let catalog = Arc::new(FlakyCatalog::new(1));
    let uc = CatalogUseCase::new(Arc::clone(&catalog) as Arc<dyn Catalog>, Arc::new(NoopLog));
    assert_eq!(uc.models().unwrap().len(), 2);
    assert_eq!(catalog.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_gives_up_after_two_attempts() {
    let catalog = Arc::new(FlakyCatalog::new(u32::MAX));
    let uc = CatalogUseCase::new(Arc::clone(&catalog) as Arc<dyn Catalog>, Arc::new(NoopLog));
    let err = uc.groups().unwrap_err();
    assert_eq!(err.to_string(), "HTTP 502: attempt 2");
    assert_eq!(catalog.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_print_groups_aligns_descriptions() {
    let uc = CatalogUseCase::new(Arc::new(FlakyCatalog::new(0)), Arc::new(NoopLog));
    let mut out = Vec::new();
    uc.print_groups(&mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "default  Default group\nvip\n");
}
