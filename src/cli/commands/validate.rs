//! Validate command implementation

use crate::cli::LogLevel;
use crate::config::{parse_config, validate_config, RunSpec, ValidateArgs};

/// Format data configuration as a string
pub fn format_data_info(spec: &RunSpec) -> String {
    let data = &spec.data;
    let mut lines = Vec::new();
    match data.demo {
        Some(demo) => lines.push(format!(
            "  Demo data: {} train / {} val / {} test graphs",
            demo.train, demo.val, demo.test
        )),
        None => {
            let splits = [("Train", &data.train), ("Val", &data.val), ("Test", &data.test)];
            for (split, path) in splits {
                if let Some(path) = path {
                    lines.push(format!("  {split} data: {}", path.display()));
                }
            }
        }
    }
    lines.push(format!("  Batch size: {}", data.batch_size));
    lines.push(format!("  Max nodes: {}", data.max_nodes));
    lines.join("\n")
}

/// Format optimizer configuration as a string
pub fn format_optimizer_info(spec: &RunSpec) -> String {
    let opts = &spec.optimizers;
    [
        ("Generator", &opts.generator),
        ("Discriminator", &opts.discriminator),
        ("Classifier", &opts.classifier),
    ]
    .iter()
    .map(|(network, optim)| format!("  {network}: {} (lr={})", optim.name, optim.lr))
    .collect::<Vec<_>>()
    .join("\n")
}

/// Format loop settings as a string
pub fn format_training_info(spec: &RunSpec) -> String {
    [
        format!(
            "  Pretrain: {} epochs, penalty {}, patience {}",
            spec.pretrain.epochs, spec.pretrain.penalty_weight, spec.pretrain.patience
        ),
        format!(
            "  Train: {} epochs, penalty {}, alpha {}, {} noise draws, patience {}",
            spec.train.epochs,
            spec.train.penalty_weight,
            spec.train.alpha,
            spec.train.num_z_samples,
            spec.train.patience
        ),
        format!("  Output dir: {}", spec.output_dir.display()),
    ]
    .join("\n")
}

pub fn run_validate(args: ValidateArgs, level: LogLevel) -> Result<(), String> {
    log::info!("Validating config: {}", args.config.display());

    let spec = parse_config(&args.config).map_err(|e| format!("Config error: {e}"))?;
    validate_config(&spec).map_err(|e| format!("Validation failed: {e}"))?;

    log::info!("Configuration is valid");
    if args.detailed || level == LogLevel::Verbose {
        log::info!("Data:\n{}", format_data_info(&spec));
        log::info!("Optimizers:\n{}", format_optimizer_info(&spec));
        log::info!("Training:\n{}", format_training_info(&spec));
    }
    Ok(())
}
