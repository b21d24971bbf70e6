//! Pipeline command implementation

use crate::cli::LogLevel;
use crate::config::{apply_overrides, load_config, run_pipeline as pipeline_from_spec, RunArgs};

pub fn run_pipeline(args: RunArgs, level: LogLevel) -> Result<(), String> {
    log::info!("layoutgan: pipeline from {}", args.config.display());

    let mut spec = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;
    apply_overrides(&mut spec, &args).map_err(|e| format!("Config error: {e}"))?;

    let report = pipeline_from_spec(&spec).map_err(|e| format!("Pipeline error: {e}"))?;

    log::info!(
        "Pipeline complete: {} pretraining epochs, {} combined epochs, best val accuracy {:.2}%",
        report.pretrain.epochs_run,
        report.combined.epochs_run,
        report.combined.best_val_accuracy
    );
    if level == LogLevel::Verbose {
        log::debug!(
            "  Checkpoint: {}",
            report.combined.checkpoint_path.display()
        );
    }
    Ok(())
}
