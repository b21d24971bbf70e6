//! Train command implementation

use crate::cli::LogLevel;
use crate::config::{apply_overrides, load_config, run_combined, TrainArgs, WarmStart};

pub fn run_train(args: TrainArgs, level: LogLevel) -> Result<(), String> {
    log::info!("layoutgan: training from {}", args.run.config.display());

    let mut spec = load_config(&args.run.config).map_err(|e| format!("Config error: {e}"))?;
    apply_overrides(&mut spec, &args.run).map_err(|e| format!("Config error: {e}"))?;

    let warm = WarmStart {
        generator: args.init_generator,
        discriminator: args.init_discriminator,
        checkpoint: args.resume,
    };
    let report = run_combined(&spec, &warm).map_err(|e| format!("Training error: {e}"))?;

    match report.best_epoch {
        Some(epoch) => log::info!(
            "Training complete: best val accuracy {:.2}% at epoch {}",
            report.best_val_accuracy,
            epoch
        ),
        None => log::info!("Training complete: no epoch improved on the baseline"),
    }
    if report.early_stopped {
        log::info!("  Stopped early after {} epochs", report.epochs_run);
    }
    if level == LogLevel::Verbose {
        log::debug!("  Metrics: {}", report.metrics_path.display());
        log::debug!("  Checkpoint: {}", report.checkpoint_path.display());
    }
    Ok(())
}
