//! コマンドライン解析（clap）

mod args;

pub use args::{help_text, parse_args, print_completion, ParseOutcome};
#[cfg(test)]
pub use args::parse_args_from;
