//! 設定ファイル `<home>/config/console.json` の読み込み（adapter 層）
//!
//! ファイルは任意。無ければ既定値で動く。環境変数 GWC_BASE_URL が base_url より優先する。

use common::domain::{GroupName, HomeDir, ModelName};
use common::error::Error;
use common::gateway::client::DEFAULT_BASE_URL;
use common::ports::outbound::{EnvResolver, FileSystem};
use serde::Deserialize;

use crate::domain::{ChatOverrides, PlaygroundConfig};

/// トークンを読む環境変数の既定名
pub const DEFAULT_TOKEN_ENV: &str = "GWC_ACCESS_TOKEN";

/// 解決済みの設定
#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleConfig {
    pub base_url: String,
    /// Authorization: Bearer に載せるトークン（読み取ったものを中継するだけ）
    pub token: Option<String>,
    pub playground: PlaygroundConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    base_url: Option<String>,
    token_env: Option<String>,
    #[serde(default)]
    playground: RawPlayground,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPlayground {
    model: Option<String>,
    group: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f64>,
    system_prompt: Option<String>,
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_raw(content: &str) -> Result<RawConfig, Error> {
    serde_json::from_str(content).map_err(|e| Error::env(format!("invalid console.json: {}", e)))
}

/// 温度は 0.0〜2.0
pub fn check_temperature(t: f64) -> Result<f64, Error> {
    if (0.0..=2.0).contains(&t) {
        Ok(t)
    } else {
        Err(Error::invalid_argument(format!(
            "temperature must be between 0 and 2 (got {})",
            t
        )))
    }
}

pub fn check_max_tokens(n: u32) -> Result<u32, Error> {
    if n == 0 {
        Err(Error::invalid_argument("max_tokens must be positive"))
    } else {
        Ok(n)
    }
}

/// 設定を解決する
pub fn load_console_config(
    home: &HomeDir,
    fs: &dyn FileSystem,
    env: &dyn EnvResolver,
) -> Result<ConsoleConfig, Error> {
    let path = home.config_file();
    let raw = if fs.exists(&path) {
        parse_raw(&fs.read_to_string(&path)?)
            .map_err(|e| e.with_context(path.display().to_string()))?
    } else {
        RawConfig::default()
    };

    let base_url = env
        .base_url_override()
        .or(non_empty(raw.base_url))
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let token_env = non_empty(raw.token_env).unwrap_or_else(|| DEFAULT_TOKEN_ENV.to_string());
    let token = env.var(&token_env);

    let defaults = PlaygroundConfig::default();
    let pg = raw.playground;
    let playground = PlaygroundConfig {
        model: non_empty(pg.model).map(ModelName::new).unwrap_or(defaults.model),
        group: non_empty(pg.group).map(GroupName::new).unwrap_or(defaults.group),
        max_tokens: pg
            .max_tokens
            .map(check_max_tokens)
            .transpose()
            .map_err(|e| e.with_context("console.json"))?
            .unwrap_or(defaults.max_tokens),
        temperature: pg
            .temperature
            .map(check_temperature)
            .transpose()
            .map_err(|e| e.with_context("console.json"))?
            .unwrap_or(defaults.temperature),
        system_prompt: pg.system_prompt.unwrap_or(defaults.system_prompt),
    };

    Ok(ConsoleConfig {
        base_url,
        token,
        playground,
    })
}

/// コマンドラインの上書きを適用する
pub fn apply_overrides(
    mut config: PlaygroundConfig,
    overrides: &ChatOverrides,
) -> Result<PlaygroundConfig, Error> {
    if let Some(m) = &overrides.model {
        config.model = m.clone();
    }
    if let Some(g) = &overrides.group {
        config.group = g.clone();
    }
    if let Some(n) = overrides.max_tokens {
        config.max_tokens = check_max_tokens(n)?;
    }
    if let Some(t) = overrides.temperature {
        config.temperature = check_temperature(t)?;
    }
    if let Some(s) = &overrides.system {
        config.system_prompt = s.clone();
    }
    Ok(config)
}
