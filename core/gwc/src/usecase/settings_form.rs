//! 設定パネルのフォーム（作業コピーと保存済みコピーの差分保存）
//!
//! 読み込み時に作業コピー（working）と保存済みコピー（pristine）を別々に持つ。
//! 保存は差分キーごとに 1 回ずつ並行に PUT し、失敗してもロールバックしない。

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;

use common::error::Error;
use common::ports::outbound::{Log, LogLevel, LogRecord};

use crate::domain::settings::check_json;
use crate::domain::{FieldKind, OptionEntry, OptionSnapshot, OptionValue, SettingsPanel};
use crate::ports::outbound::OptionStore;

/// save の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// 差分なし。通信もしていない
    NothingChanged,
    /// 全キーの書き込みに成功し、スナップショットを読み直した
    Saved { keys: Vec<String> },
    /// 一部のキーが失敗した。成功したキーはサーバー側に反映済み
    PartialFailure {
        succeeded: Vec<String>,
        failed: Vec<(String, String)>,
    },
}

pub struct SettingsForm {
    panel: SettingsPanel,
    pristine: OptionSnapshot,
    working: OptionSnapshot,
}

fn snapshot_of(panel: &SettingsPanel, entries: &[OptionEntry]) -> OptionSnapshot {
    let raw: BTreeMap<&str, &str> = entries
        .iter()
        .map(|e| (e.key.as_str(), e.value.as_str()))
        .collect();
    panel
        .fields
        .iter()
        .map(|f| {
            let value = match raw.get(f.key) {
                Some(v) => f.kind.decode(v),
                None => f.kind.empty_value(),
            };
            (f.key.to_string(), value)
        })
        .collect()
}

impl SettingsForm {
    /// ストアの全オプションからパネルのキーだけを取り出す
    pub fn load(panel: SettingsPanel, entries: &[OptionEntry]) -> Self {
        let pristine = snapshot_of(&panel, entries);
        let working = pristine.clone();
        Self {
            panel,
            pristine,
            working,
        }
    }

    pub fn panel(&self) -> &SettingsPanel {
        &self.panel
    }

    pub fn working(&self) -> &OptionSnapshot {
        &self.working
    }

    #[cfg(test)]
    pub fn pristine(&self) -> &OptionSnapshot {
        &self.pristine
    }

    fn kind_of(&self, key: &str) -> Result<FieldKind, Error> {
        self.panel.field(key).map(|f| f.kind).ok_or_else(|| {
            let keys: Vec<&str> = self.panel.fields.iter().map(|f| f.key).collect();
            Error::invalid_argument(format!(
                "unknown key '{}' for panel {} (keys: {})",
                key,
                self.panel.name,
                keys.join(", ")
            ))
        })
    }

    /// 作業コピーを編集する
    pub fn set(&mut self, key: &str, raw: &str) -> Result<(), Error> {
        let value = match self.kind_of(key)? {
            FieldKind::Bool => match raw.trim() {
                "true" => OptionValue::Bool(true),
                "false" => OptionValue::Bool(false),
                other => {
                    return Err(Error::invalid_argument(format!(
                        "{} expects true or false (got '{}')",
                        key, other
                    )))
                }
            },
            FieldKind::Number => {
                let t = raw.trim();
                if !t.is_empty() && t.parse::<f64>().is_err() {
                    return Err(Error::invalid_argument(format!(
                        "{} expects a number (got '{}')",
                        key, t
                    )));
                }
                OptionValue::Text(t.to_string())
            }
            FieldKind::Json => OptionValue::Text(raw.to_string()),
        };
        self.working.insert(key.to_string(), value);
        Ok(())
    }

    /// フィールドから離れたときの検査（JSON フィールドのみ）
    pub fn blur(&self, key: &str) -> Result<(), Error> {
        if self.kind_of(key)? != FieldKind::Json {
            return Ok(());
        }
        let raw = self.working.get(key).map(|v| v.encode()).unwrap_or_default();
        check_json(&raw)
            .map_err(|reason| Error::validation(format!("{} is not valid JSON: {}", key, reason)))
    }

    /// 保存前の検査。JSON として壊れた値が 1 つでもあれば保存させない
    pub fn validate(&self) -> Result<(), Error> {
        let bad: Vec<String> = self
            .panel
            .fields
            .iter()
            .filter(|f| f.kind == FieldKind::Json)
            .filter_map(|f| {
                let raw = self.working.get(f.key)?.encode();
                check_json(&raw)
                    .err()
                    .map(|reason| format!("{} ({})", f.key, reason))
            })
            .collect();
        if bad.is_empty() {
            Ok(())
        } else {
            Err(Error::validation(format!("invalid JSON in {}", bad.join(", "))))
        }
    }

    /// pristine と値が異なるキー（構造的な比較）
    pub fn changed_keys(&self) -> Vec<String> {
        self.working
            .iter()
            .filter(|(k, v)| self.pristine.get(*k) != Some(*v))
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// 差分キーを書き込む
    ///
    /// 全部成功したらストアから読み直して両コピーを置き換える。一部失敗なら成功分だけ pristine に反映する。
    pub fn save(&mut self, store: &dyn OptionStore, logger: &dyn Log) -> Result<SaveOutcome, Error> {
        self.validate()?;
        let changed = self.changed_keys();
        if changed.is_empty() {
            return Ok(SaveOutcome::NothingChanged);
        }

        let writes: Vec<(String, String)> = changed
            .iter()
            .filter_map(|k| self.working.get(k).map(|v| (k.clone(), v.encode())))
            .collect();
        let results: Vec<(String, Result<(), Error>)> = std::thread::scope(|s| {
            let handles: Vec<_> = writes
                .iter()
                .map(|(k, v)| (k, s.spawn(move || store.put(k, v))))
                .collect();
            handles
                .into_iter()
                .map(|(k, h)| {
                    let r = h
                        .join()
                        .unwrap_or_else(|_| Err(Error::system("option writer panicked")));
                    (k.clone(), r)
                })
                .collect()
        });

        let mut succeeded = Vec::new();
        let mut failed = Vec::new();
        for (key, result) in results {
            match result {
                Ok(()) => {
                    if let Some(v) = self.working.get(&key) {
                        self.pristine.insert(key.clone(), v.clone());
                    }
                    succeeded.push(key);
                }
                Err(e) => {
                    let _ = logger.log(
                        &LogRecord::new(LogLevel::Warn, "option write failed")
                            .layer("usecase")
                            .kind("settings")
                            .field("key", key.clone())
                            .field("error", e.to_string()),
                    );
                    failed.push((key, e.to_string()));
                }
            }
        }
        let _ = logger.log(
            &LogRecord::new(LogLevel::Info, "settings saved")
                .layer("usecase")
                .kind("settings")
                .field("panel", self.panel.name)
                .field("changed", changed.clone())
                .field("failed", failed.len()),
        );

        if !failed.is_empty() {
            return Ok(SaveOutcome::PartialFailure { succeeded, failed });
        }
        let fresh = store.load_all().map_err(|e| e.with_context("reload options"))?;
        *self = Self::load(self.panel.clone(), &fresh);
        Ok(SaveOutcome::Saved { keys: succeeded })
    }
}

/// `settings show` / `settings set` のユースケース
pub struct SettingsUseCase {
    store: Arc<dyn OptionStore>,
    logger: Arc<dyn Log>,
}

fn panel_by_name(name: &str) -> Result<SettingsPanel, Error> {
    SettingsPanel::by_name(name).ok_or_else(|| {
        Error::invalid_argument(format!(
            "unknown settings panel '{}' (panels: {})",
            name,
            SettingsPanel::NAMES.join(", ")
        ))
    })
}

fn write_form(out: &mut dyn Write, form: &SettingsForm) -> Result<(), Error> {
    writeln!(out, "[{}]", form.panel().name)?;
    for f in form.panel().fields {
        let value = form.working().get(f.key).map(|v| v.encode()).unwrap_or_default();
        writeln!(out, "{} ({}) # {}", f.key, f.kind.as_str(), f.label)?;
        if value.is_empty() {
            writeln!(out, "  (unset)")?;
        }
        for line in value.lines() {
            writeln!(out, "  {}", line)?;
        }
    }
    Ok(())
}

impl SettingsUseCase {
    pub fn new(store: Arc<dyn OptionStore>, logger: Arc<dyn Log>) -> Self {
        Self { store, logger }
    }

    fn load_form(&self, panel: &str) -> Result<SettingsForm, Error> {
        let panel = panel_by_name(panel)?;
        let entries = self.store.load_all()?;
        Ok(SettingsForm::load(panel, &entries))
    }

    pub fn show(&self, panel: &str, out: &mut dyn Write) -> Result<i32, Error> {
        let form = self.load_form(panel)?;
        write_form(out, &form)?;
        Ok(0)
    }

    /// key=value を順に適用して保存する。1 つでも書き込みに失敗したらエラー
    pub fn set(
        &self,
        panel: &str,
        assignments: &[(String, String)],
        out: &mut dyn Write,
    ) -> Result<i32, Error> {
        let mut form = self.load_form(panel)?;
        for (key, value) in assignments {
            form.set(key, value)?;
            form.blur(key)?;
        }
        match form.save(self.store.as_ref(), self.logger.as_ref())? {
            SaveOutcome::NothingChanged => {
                writeln!(out, "nothing changed")?;
                Ok(0)
            }
            SaveOutcome::Saved { keys } => {
                writeln!(out, "saved: {}", keys.join(", "))?;
                Ok(0)
            }
            SaveOutcome::PartialFailure { succeeded, failed } => {
                if !succeeded.is_empty() {
                    writeln!(out, "saved: {}", succeeded.join(", "))?;
                }
                let detail: Vec<String> = failed.iter().map(|(k, e)| format!("{} ({})", k, e)).collect();
                Err(Error::api(format!(
                    "{} of {} keys failed: {}",
                    failed.len(),
                    failed.len() + succeeded.len(),
                    detail.join("; ")
                )))
            }
        }
    }
}
