use chrono::{Local, NaiveDate, NaiveDateTime, TimeZone};
use clap::builder::ArgAction;
use clap::error::ErrorKind;
use clap::value_parser;
use clap_complete::Shell;
use common::domain::{GroupName, ModelName};
use common::error::Error;

use crate::domain::{ChatOverrides, GwcCommand, SettingsPanel, TaskQuery, TaskScope};

/// 解析結果: 通常のコマンド / 補完スクリプト生成 / clap が描いたヘルプ
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Command { command: GwcCommand, verbose: bool },
    GenerateCompletion(Shell),
    /// サブコマンドの --help（clap が整形済み）
    HelpText(String),
}

fn chat_command() -> clap::Command {
    clap::Command::new("chat")
        .about("Chat with a model through the playground endpoint (interactive when no message is given)")
        .arg(
            clap::Arg::new("model")
                .short('m')
                .long("model")
                .value_name("model")
                .help("Model name (e.g. gpt-4o-mini, claude-3-5-sonnet)")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("group")
                .short('g')
                .long("group")
                .value_name("group")
                .help("Billing group to route through")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("max-tokens")
                .long("max-tokens")
                .value_name("n")
                .help("Maximum tokens in the reply")
                .value_parser(value_parser!(u32))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("temperature")
                .long("temperature")
                .value_name("t")
                .help("Sampling temperature (0 to 2)")
                .value_parser(value_parser!(f64))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("system")
                .short('S')
                .long("system")
                .value_name("prompt")
                .help("System prompt sent before the conversation")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("image")
                .long("image")
                .value_name("path|url")
                .help("Attach an image (local png/jpg/gif/webp file or URL) to the first message")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("message")
                .index(1)
                .help("Message words. Omit to start an interactive session")
                .num_args(0..)
                .trailing_var_arg(true),
        )
}

fn tasks_command() -> clap::Command {
    clap::Command::new("tasks")
        .about("List asynchronous task records")
        .arg(
            clap::Arg::new("self")
                .long("self")
                .help("Only the caller's own tasks (/api/task/self)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("page")
                .short('p')
                .long("page")
                .value_name("page")
                .help("Page number (starts at 1)")
                .value_parser(value_parser!(u32).range(1..))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("channel-id")
                .long("channel-id")
                .value_name("id")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("task-id")
                .long("task-id")
                .value_name("id")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("since")
                .long("since")
                .value_name("time")
                .help("Start of range: unix seconds, YYYY-MM-DD or \"YYYY-MM-DD HH:MM:SS\" (local time)")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("until")
                .long("until")
                .value_name("time")
                .help("End of range (same formats as --since)")
                .num_args(1),
        )
}

fn panel_arg() -> clap::Arg {
    clap::Arg::new("panel")
        .index(1)
        .required(true)
        .value_name("panel")
        .value_parser(clap::builder::PossibleValuesParser::new(SettingsPanel::NAMES.iter().copied()))
        .help("Settings panel")
}

fn settings_command() -> clap::Command {
    clap::Command::new("settings")
        .about("Show or edit gateway option panels")
        .subcommand_required(true)
        .subcommand(
            clap::Command::new("show")
                .about("Show the current values of a panel")
                .arg(panel_arg()),
        )
        .subcommand(
            clap::Command::new("set")
                .about("Change values and save only the keys that differ")
                .arg(panel_arg())
                .arg(
                    clap::Arg::new("assignments")
                        .index(2)
                        .required(true)
                        .value_name("key=value")
                        .num_args(1..),
                ),
        )
}

pub(crate) fn build_clap_command() -> clap::Command {
    clap::Command::new("gwc")
        .about("Terminal console for the AI API gateway")
        .disable_help_subcommand(true)
        .arg(
            clap::Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Also print debug logs to stderr")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            clap::Arg::new("generate")
                .long("generate")
                .value_name("shell")
                .help("Generate shell completion script")
                .value_parser(value_parser!(Shell))
                .num_args(1),
        )
        .subcommand(chat_command())
        .subcommand(clap::Command::new("models").about("List models available to the caller"))
        .subcommand(clap::Command::new("groups").about("List groups the caller may use"))
        .subcommand(tasks_command())
        .subcommand(settings_command())
}

/// `--since` / `--until` の値を Unix 秒にする
pub fn parse_timestamp(s: &str) -> Result<i64, Error> {
    let s = s.trim();
    if let Ok(n) = s.parse::<i64>() {
        return Ok(n);
    }
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| Error::invalid_argument(format!("cannot parse time '{}'", s)))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|t| t.timestamp())
        .ok_or_else(|| Error::invalid_argument(format!("time '{}' does not exist locally", s)))
}

/// `key=value` を分解する
pub fn parse_assignment(s: &str) -> Result<(String, String), Error> {
    match s.split_once('=') {
        Some((k, v)) if !k.trim().is_empty() => Ok((k.trim().to_string(), v.to_string())),
        _ => Err(Error::invalid_argument(format!(
            "expected key=value, got '{}'",
            s
        ))),
    }
}

fn matches_to_chat(m: &clap::ArgMatches) -> GwcCommand {
    let overrides = ChatOverrides {
        model: m.get_one::<String>("model").map(|s| ModelName::new(s.clone())),
        group: m.get_one::<String>("group").map(|s| GroupName::new(s.clone())),
        max_tokens: m.get_one::<u32>("max-tokens").copied(),
        temperature: m.get_one::<f64>("temperature").copied(),
        system: m.get_one::<String>("system").cloned(),
    };
    let words: Vec<String> = m
        .get_many::<String>("message")
        .map(|i| i.cloned().collect())
        .unwrap_or_default();
    let message = Some(words.join(" ")).filter(|s| !s.trim().is_empty());
    GwcCommand::Chat {
        overrides,
        image: m.get_one::<String>("image").cloned(),
        message,
    }
}

fn matches_to_tasks(m: &clap::ArgMatches) -> Result<GwcCommand, Error> {
    let scope = if m.get_flag("self") {
        TaskScope::Mine
    } else {
        TaskScope::All
    };
    let start_timestamp = m
        .get_one::<String>("since")
        .map(|s| parse_timestamp(s))
        .transpose()?;
    let end_timestamp = m
        .get_one::<String>("until")
        .map(|s| parse_timestamp(s))
        .transpose()?;
    if let (Some(a), Some(b)) = (start_timestamp, end_timestamp) {
        if b < a {
            return Err(Error::invalid_argument("--until is earlier than --since"));
        }
    }
    Ok(GwcCommand::Tasks {
        scope,
        query: TaskQuery {
            page: m.get_one::<u32>("page").copied(),
            channel_id: m.get_one::<String>("channel-id").cloned(),
            task_id: m.get_one::<String>("task-id").cloned(),
            start_timestamp,
            end_timestamp,
        },
    })
}

fn matches_to_settings(m: &clap::ArgMatches) -> Result<GwcCommand, Error> {
    match m.subcommand() {
        Some(("show", sub)) => Ok(GwcCommand::SettingsShow {
            panel: sub.get_one::<String>("panel").cloned().unwrap_or_default(),
        }),
        Some(("set", sub)) => {
            let assignments = sub
                .get_many::<String>("assignments")
                .into_iter()
                .flatten()
                .map(|s| parse_assignment(s))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(GwcCommand::SettingsSet {
                panel: sub.get_one::<String>("panel").cloned().unwrap_or_default(),
                assignments,
            })
        }
        _ => Err(Error::invalid_argument("settings requires show or set")),
    }
}

fn matches_to_outcome(matches: &clap::ArgMatches) -> Result<ParseOutcome, Error> {
    if let Some(&shell) = matches.get_one::<Shell>("generate") {
        return Ok(ParseOutcome::GenerateCompletion(shell));
    }
    let verbose = matches.get_flag("verbose");
    let command = match matches.subcommand() {
        Some(("chat", m)) => matches_to_chat(m),
        Some(("models", _)) => GwcCommand::Models,
        Some(("groups", _)) => GwcCommand::Groups,
        Some(("tasks", m)) => matches_to_tasks(m)?,
        Some(("settings", m)) => matches_to_settings(m)?,
        _ => GwcCommand::Help,
    };
    Ok(ParseOutcome::Command { command, verbose })
}

fn to_error(e: clap::Error) -> Result<ParseOutcome, Error> {
    match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            Ok(ParseOutcome::HelpText(e.render().to_string()))
        }
        _ => Err(Error::invalid_argument(e.render().to_string().trim_end().to_string())),
    }
}

/// コマンドラインを解析する
pub fn parse_args() -> Result<ParseOutcome, Error> {
    match build_clap_command().try_get_matches() {
        Ok(m) => matches_to_outcome(&m),
        Err(e) => to_error(e),
    }
}

/// テスト用: 引数スライスから解析する
#[cfg(test)]
pub fn parse_args_from(args: &[&str]) -> Result<ParseOutcome, Error> {
    match build_clap_command().try_get_matches_from(args) {
        Ok(m) => matches_to_outcome(&m),
        Err(e) => to_error(e),
    }
}

/// 補完スクリプトを標準出力に出力する
pub fn print_completion(shell: Shell) {
    let mut cmd = build_clap_command();
    clap_complete::generate(shell, &mut cmd, "gwc", &mut std::io::stdout());
}

/// トップレベルのヘルプ
pub fn help_text() -> String {
    build_clap_command().render_long_help().to_string()
}
