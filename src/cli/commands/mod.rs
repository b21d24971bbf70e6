//! CLI command implementations

mod pipeline;
mod pretrain;
mod train;
mod validate;


use crate::cli::LogLevel;
use crate::config::{Cli, Command};

/// Execute a CLI command based on the parsed arguments
pub fn run_command(cli: Cli) -> Result<(), String> {
    let log_level = LogLevel::from_flags(cli.verbose, cli.quiet);

    match cli.command {
        Command::Pretrain(args) => pretrain::run_pretrain(args, log_level),
        Command::Train(args) => train::run_train(args, log_level),
        Command::Pipeline(args) => pipeline::run_pipeline(args, log_level),
        Command::Validate(args) => validate::run_validate(args, log_level),
    }
}
