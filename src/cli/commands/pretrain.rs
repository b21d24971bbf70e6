//! Pretrain command implementation

use crate::cli::LogLevel;
use crate::config::{apply_overrides, load_config, run_pretrain as pretrain_from_spec, RunArgs};

pub fn run_pretrain(args: RunArgs, level: LogLevel) -> Result<(), String> {
    log::info!("layoutgan: pretraining from {}", args.config.display());

    let mut spec = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;
    apply_overrides(&mut spec, &args).map_err(|e| format!("Config error: {e}"))?;

    let report = pretrain_from_spec(&spec).map_err(|e| format!("Pretraining error: {e}"))?;

    log::info!(
        "Pretraining complete after {} epochs (best G {:.4}, best D {:.4})",
        report.epochs_run,
        report.best_generator_loss,
        report.best_discriminator_loss
    );
    if level == LogLevel::Verbose {
        log::debug!(
            "  Generator weights: {}",
            report.generator_checkpoint.display()
        );
        log::debug!(
            "  Discriminator weights: {}",
            report.discriminator_checkpoint.display()
        );
    }
    Ok(())
}
