mod adapter;
mod cli;
mod domain;
mod ports;
mod usecase;
mod wiring;

#[cfg(test)]
mod tests;

use std::io::{self, IsTerminal, Read};
use std::process;

use cli::{help_text, parse_args, print_completion, ParseOutcome};
use common::error::Error;
use common::ports::outbound::{LogLevel, LogRecord};
use domain::GwcCommand;
use ports::inbound::UseCaseRunner;
use usecase::ChatIo;
use wiring::{wire_gwc, App};

use crate::adapter::StdoutRenderer;

/// GwcCommand をディスパッチする Runner（match は main レイヤーに集約）
struct Runner {
    app: App,
}

impl Runner {
    fn dispatch(&self, cmd: GwcCommand) -> Result<i32, Error> {
        let mut stdout = io::stdout();
        match cmd {
            GwcCommand::Help => {
                println!("{}", help_text());
                Ok(0)
            }
            GwcCommand::Chat {
                overrides,
                image,
                message: Some(message),
            } => self.app.chat.run_once(
                &overrides,
                image.as_deref(),
                &message,
                Box::new(StdoutRenderer::stdout()),
            ),
            GwcCommand::Chat {
                overrides,
                image,
                message: None,
            } => {
                if !io::stdin().is_terminal() {
                    let mut text = String::new();
                    io::stdin().read_to_string(&mut text)?;
                    if text.trim().is_empty() && image.is_none() {
                        return Err(Error::invalid_argument("no message given on the command line or stdin"));
                    }
                    return self.app.chat.run_once(
                        &overrides,
                        image.as_deref(),
                        text.trim(),
                        Box::new(StdoutRenderer::stdout()),
                    );
                }
                let stdin = io::stdin();
                let mut input = stdin.lock();
                let mut console = io::stderr();
                self.app.chat.run_repl(
                    &overrides,
                    image.as_deref(),
                    ChatIo {
                        input: &mut input,
                        console: &mut console,
                        observer: Box::new(StdoutRenderer::stdout()),
                    },
                )
            }
            GwcCommand::Models => self.app.catalog.print_models(&mut stdout),
            GwcCommand::Groups => self.app.catalog.print_groups(&mut stdout),
            GwcCommand::Tasks { scope, query } => self.app.tasks.list(scope, &query, &mut stdout),
            GwcCommand::SettingsShow { panel } => self.app.settings.show(&panel, &mut stdout),
            GwcCommand::SettingsSet { panel, assignments } => {
                self.app.settings.set(&panel, &assignments, &mut stdout)
            }
        }
    }
}

impl UseCaseRunner for Runner {
    fn run(&self, cmd: GwcCommand) -> Result<i32, Error> {
        let command_name = cmd.name();
        let _ = self.app.logger.log(
            &LogRecord::new(LogLevel::Info, "command started")
                .layer("cli")
                .kind("lifecycle")
                .field("command", command_name),
        );
        let result = self.dispatch(cmd);
        let code = match &result {
            Ok(code) => *code,
            Err(e) => e.exit_code(),
        };
        let _ = self.app.logger.log(
            &LogRecord::new(LogLevel::Info, "command finished")
                .layer("cli")
                .kind("lifecycle")
                .field("command", command_name)
                .field("exit_code", code),
        );
        if let Err(ref e) = result {
            let _ = self.app.logger.log(
                &LogRecord::new(LogLevel::Error, e.to_string())
                    .layer("cli")
                    .kind("error"),
            );
        }
        result
    }
}

fn main() {
    let exit_code = match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("gwc: {}", e);
            if e.is_usage() {
                print_usage();
            }
            e.exit_code()
        }
    };
    process::exit(exit_code);
}

pub fn run() -> Result<i32, Error> {
    let (command, verbose) = match parse_args()? {
        ParseOutcome::Command { command, verbose } => (command, verbose),
        ParseOutcome::GenerateCompletion(shell) => {
            print_completion(shell);
            return Ok(0);
        }
        ParseOutcome::HelpText(text) => {
            print!("{}", text);
            return Ok(0);
        }
    };
    let app = wire_gwc(verbose)?;
    let runner = Runner { app };
    runner.run(command)
}

fn print_usage() {
    eprintln!("Usage: gwc [-v] <chat|models|groups|tasks|settings> [options]  (gwc --help for details)");
}
