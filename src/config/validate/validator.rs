//! Configuration validation logic

use super::error::ValidationError;
use crate::config::schema::{OptimSpec, RunSpec, SchedulerSpec};
use std::path::PathBuf;

const VALID_OPTIMIZERS: [&str; 3] = ["adam", "adamw", "sgd"];

/// Validate a run specification
///
/// Checks:
/// - Data sources exist (or a demo block is given)
/// - Numeric values are in valid ranges
/// - Optimizer and scheduler settings are usable
pub fn validate_config(spec: &RunSpec) -> Result<(), ValidationError> {
    let data = &spec.data;
    match data.demo {
        Some(demo) => {
            if demo.train == 0 {
                return Err(ValidationError::EmptyDemoSplit);
            }
        }
        None => {
            check_path("train", &data.train)?;
            check_path("val", &data.val)?;
            check_path("test", &data.test)?;
        }
    }

    if data.batch_size == 0 {
        return Err(ValidationError::InvalidBatchSize(data.batch_size));
    }
    if data.max_nodes == 0 {
        return Err(ValidationError::InvalidMaxNodes(data.max_nodes));
    }

    let model = &spec.model;
    for (name, value) in [
        ("noise_dim", model.noise_dim),
        ("hidden_dim", model.hidden_dim),
        ("image_size", model.image_size),
    ] {
        if value == 0 {
            return Err(ValidationError::InvalidDimension { name, value });
        }
    }
    for (name, value) in [("sigma", model.sigma), ("extent", model.extent)] {
        if !(value > 0.0 && value.is_finite()) {
            return Err(ValidationError::InvalidRenderer { name, value });
        }
    }

    let opts = &spec.optimizers;
    let schedules = &spec.schedulers;
    for (network, optim, schedule) in [
        ("generator", &opts.generator, &schedules.generator),
        ("discriminator", &opts.discriminator, &schedules.discriminator),
        ("classifier", &opts.classifier, &schedules.classifier),
    ] {
        check_optimizer(network, optim)?;
        check_scheduler(network, schedule)?;
    }

    let pretrain = &spec.pretrain;
    if pretrain.epochs == 0 {
        return Err(ValidationError::InvalidEpochs { stage: "pretrain" });
    }
    if pretrain.patience == 0 {
        return Err(ValidationError::InvalidPatience { stage: "pretrain" });
    }

    let train = &spec.train;
    if train.epochs == 0 {
        return Err(ValidationError::InvalidEpochs { stage: "train" });
    }
    if train.patience == 0 {
        return Err(ValidationError::InvalidPatience { stage: "train" });
    }
    if train.num_z_samples == 0 {
        return Err(ValidationError::InvalidNoiseSamples {
            name: "num_z_samples",
        });
    }
    if train.eval_z_samples == 0 {
        return Err(ValidationError::InvalidNoiseSamples {
            name: "eval_z_samples",
        });
    }

    for (name, value) in [
        ("pretrain.penalty_weight", pretrain.penalty_weight),
        ("pretrain.reconstruction_weight", pretrain.reconstruction_weight),
        ("train.penalty_weight", train.penalty_weight),
        ("train.alpha", train.alpha),
    ] {
        if !(value >= 0.0 && value.is_finite()) {
            return Err(ValidationError::InvalidWeight { name, value });
        }
    }

    Ok(())
}

fn check_path(split: &'static str, path: &Option<PathBuf>) -> Result<(), ValidationError> {
    match path {
        None => Err(ValidationError::MissingDataPath(split)),
        Some(p) if !p.exists() => Err(ValidationError::DataPathNotFound(p.display().to_string())),
        Some(_) => Ok(()),
    }
}

fn check_optimizer(network: &'static str, spec: &OptimSpec) -> Result<(), ValidationError> {
    if !(spec.lr > 0.0 && spec.lr <= 1.0) {
        return Err(ValidationError::InvalidLearningRate {
            network,
            lr: spec.lr,
        });
    }
    if !VALID_OPTIMIZERS.contains(&spec.name.to_lowercase().as_str()) {
        return Err(ValidationError::InvalidOptimizer {
            network,
            name: spec.name.clone(),
        });
    }
    Ok(())
}

fn check_scheduler(network: &'static str, spec: &SchedulerSpec) -> Result<(), ValidationError> {
    let reason = match *spec {
        SchedulerSpec::Step { step_size: 0, .. } => Some("step_size must be > 0".to_string()),
        SchedulerSpec::Step { gamma, .. } if !(gamma > 0.0 && gamma <= 1.0) => {
            Some(format!("gamma {gamma} must be in (0.0, 1.0]"))
        }
        SchedulerSpec::Cosine { t_max: 0, .. } => Some("t_max must be > 0".to_string()),
        SchedulerSpec::Cosine { lr_min, .. } if lr_min < 0.0 => {
            Some(format!("lr_min {lr_min} must be >= 0.0"))
        }
        _ => None,
    };
    match reason {
        Some(reason) => Err(ValidationError::InvalidScheduler { network, reason }),
        None => Ok(()),
    }
}
