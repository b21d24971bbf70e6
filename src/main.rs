//! layoutgan CLI
//!
//! # Usage
//!
//! ```bash
//! # Adversarial pretraining only
//! layoutgan pretrain run.yaml
//!
//! # Combined training, warm-started from pretrained weights
//! layoutgan train run.yaml --init-generator out/best_generator_pretrained.json \
//!     --init-discriminator out/best_discriminator_pretrained.json
//!
//! # Both loops in sequence
//! layoutgan pipeline run.yaml --epochs 20
//!
//! # Validate config
//! layoutgan validate run.yaml
//! ```

use clap::Parser;
use layoutgan::cli::{init_logging, run_command, Cli, LogLevel};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(LogLevel::from_flags(cli.verbose, cli.quiet));

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
