//! Run the training loops from a validated specification

use super::builder::{build_loaders, build_players, Players};
use super::schema::RunSpec;
use crate::error::Result;
use crate::io::{load_checkpoint, load_network};
use crate::train::{
    pretrain, CombinedReport, CombinedTrainer, MeanGapWasserstein, PretrainReport, Splits,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};

/// Weights to load before the combined loop starts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WarmStart {
    pub generator: Option<PathBuf>,
    pub discriminator: Option<PathBuf>,
    /// Full combined-loop checkpoint, applied after the per-network files
    pub checkpoint: Option<PathBuf>,
}

/// Result of `pipeline`: both loops in order
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub pretrain: PretrainReport,
    pub combined: CombinedReport,
}

/// Adversarial pretraining on the training split
pub fn run_pretrain(spec: &RunSpec) -> Result<PretrainReport> {
    let Players {
        mut generator,
        mut critic,
        renderer,
        ..
    } = build_players(spec)?;
    let mut loaders = build_loaders(spec)?;
    let mut rng = StdRng::seed_from_u64(spec.seed);
    log::info!(
        "pretraining for {} epochs, output in {}",
        spec.pretrain.epochs,
        spec.output_dir.display()
    );
    pretrain(
        &mut generator,
        &mut critic,
        &renderer,
        &mut loaders.train,
        &MeanGapWasserstein,
        &spec.pretrain_config(),
        &mut rng,
    )
}

/// Combined training, optionally warm-started
pub fn run_combined(spec: &RunSpec, warm: &WarmStart) -> Result<CombinedReport> {
    let Players {
        mut generator,
        mut critic,
        classifier,
        renderer,
    } = build_players(spec)?;

    if let Some(path) = &warm.generator {
        let state = load_network(&mut *generator.net, path)?;
        log::info!(
            "generator initialised from {} ({})",
            path.display(),
            state.metadata.saved_at
        );
    }
    if let Some(path) = &warm.discriminator {
        let state = load_network(&mut *critic.net, path)?;
        log::info!(
            "discriminator initialised from {} ({})",
            path.display(),
            state.metadata.saved_at
        );
    }

    let mut trainer = CombinedTrainer::new(
        generator,
        critic,
        classifier,
        Box::new(renderer),
        spec.combined_config(),
        spec.seed,
    );
    if let Some(path) = &warm.checkpoint {
        let checkpoint = load_checkpoint(path)?;
        trainer.restore(&checkpoint, path)?;
        log::info!(
            "resumed from {} (epoch {})",
            path.display(),
            checkpoint.epoch
        );
    }

    let mut loaders = build_loaders(spec)?;
    log::info!(
        "combined training for {} epochs, output in {}",
        spec.train.epochs,
        spec.output_dir.display()
    );
    trainer.train(Splits {
        train: &mut loaders.train,
        val: &mut loaders.val,
        test: &mut loaders.test,
    })
}

fn existing(path: &Path) -> Option<PathBuf> {
    path.exists().then(|| path.to_path_buf())
}

/// Pretrain, then run the combined loop from the best pretrained weights
pub fn run_pipeline(spec: &RunSpec) -> Result<PipelineReport> {
    let pretrain = run_pretrain(spec)?;
    let warm = WarmStart {
        generator: existing(&pretrain.generator_checkpoint),
        discriminator: existing(&pretrain.discriminator_checkpoint),
        checkpoint: None,
    };
    if warm.generator.is_none() || warm.discriminator.is_none() {
        log::warn!("no pretrained checkpoint for one of the networks; starting it from scratch");
    }
    let combined = run_combined(spec, &warm)?;
    Ok(PipelineReport { pretrain, combined })
}
