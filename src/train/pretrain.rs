//! Adversarial pretraining of the generator and critic
//!
//! Each network has its own early-stopping state on its average epoch loss.
//! A network that runs out of patience is frozen for the rest of the run;
//! the loop ends once both are frozen or the epochs are exhausted.

use super::csv_log::{MetricsLog, PretrainRow};
use super::early_stopping::EarlyStopping;
use super::loss::{gradient_penalty, LossFn, MSELoss, WassersteinLoss};
use super::metrics::discriminator_hits;
use super::noise::sample_noise;
use super::player::Player;
use super::snapshot::SnapshotWriter;
use crate::autograd::{add, backward, scale};
use crate::data::GraphLoader;
use crate::io::save_network;
use crate::nn::{Critic, Generator, Renderer};
use crate::{Error, Result};
use rand::Rng;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

pub const PRETRAIN_METRICS_FILE: &str = "metrics_gan.csv";
pub const BEST_GENERATOR_FILE: &str = "best_generator_pretrained.json";
pub const BEST_DISCRIMINATOR_FILE: &str = "best_discriminator_pretrained.json";
pub const PRETRAIN_SNAPSHOT_DIR: &str = "gan_pretrain_generated_images";

/// Pretraining hyperparameters
#[derive(Debug, Clone)]
pub struct PretrainConfig {
    pub epochs: usize,
    /// Gradient penalty weight
    pub penalty_weight: f32,
    /// Weight of the MSE between generated and real layouts
    pub reconstruction_weight: f32,
    pub patience: usize,
    /// Snapshot every n-th batch; 0 disables
    pub snapshot_every: usize,
    pub snapshot_count: usize,
    pub output_dir: PathBuf,
}

impl Default for PretrainConfig {
    fn default() -> Self {
        Self {
            epochs: 100,
            penalty_weight: 1.0,
            reconstruction_weight: 100.0,
            patience: 20,
            snapshot_every: 30,
            snapshot_count: 3,
            output_dir: PathBuf::from("."),
        }
    }
}

/// Summary of a pretraining run
#[derive(Debug, Clone, PartialEq)]
pub struct PretrainReport {
    pub epochs_run: usize,
    pub generator_frozen: bool,
    pub discriminator_frozen: bool,
    pub best_generator_loss: f32,
    pub best_discriminator_loss: f32,
    pub generator_checkpoint: PathBuf,
    pub discriminator_checkpoint: PathBuf,
}

#[derive(Default)]
struct EpochTotals {
    generator: f32,
    reconstruction: f32,
    discriminator: f32,
    correct: usize,
    scored: usize,
}

/// Train generator and critic adversarially on `loader`
///
/// Writes `metrics_gan.csv` (one row per epoch), the best weights of each
/// network on a new minimum of its average loss, and periodic snapshots.
pub fn pretrain(
    generator: &mut Player<dyn Generator>,
    critic: &mut Player<dyn Critic>,
    renderer: &dyn Renderer,
    loader: &mut dyn GraphLoader,
    loss: &dyn WassersteinLoss,
    config: &PretrainConfig,
    rng: &mut impl Rng,
) -> Result<PretrainReport> {
    let out = &config.output_dir;
    fs::create_dir_all(out).map_err(|e| Error::io(format!("creating {}", out.display()), e))?;
    let mut metrics = MetricsLog::<PretrainRow>::create(out.join(PRETRAIN_METRICS_FILE))?;
    let snapshots = SnapshotWriter::new(
        out.join(PRETRAIN_SNAPSHOT_DIR),
        config.snapshot_every,
        config.snapshot_count,
    )?;
    let generator_path = out.join(BEST_GENERATOR_FILE);
    let critic_path = out.join(BEST_DISCRIMINATOR_FILE);

    let mut generator_stop = EarlyStopping::minimize(config.patience);
    let mut critic_stop = EarlyStopping::minimize(config.patience);
    let (mut generator_frozen, mut critic_frozen) = (false, false);
    let mut epochs_run = 0;

    for epoch in 1..=config.epochs {
        if generator_frozen && critic_frozen {
            log::warn!("generator and discriminator both frozen; ending pretraining");
            break;
        }
        let epoch_start = Instant::now();
        generator.net.set_training(true);
        critic.net.set_training(true);

        let batches = loader.batches()?;
        if batches.is_empty() {
            return Err(Error::EmptyLoader("pretrain".to_string()));
        }
        let mut totals = EpochTotals::default();

        for (batch_idx, batch) in batches.iter().enumerate() {
            let batch_start = Instant::now();
            let shape = batch.shape;
            let num_nodes = batch.num_nodes();
            let (layouts, adjacency) = (&batch.layouts, &batch.adjacency);
            let net = &generator.net;
            let noise = sample_noise(shape.batch_size, net.noise_dim(), rng);
            let generated = net.generate(&noise, layouts, adjacency, &num_nodes, shape);
            let fake = generated.detach();

            let real_scores = critic.net.score(&batch.layouts, &batch.adjacency, shape);
            let fake_scores = critic.net.score(&fake, &batch.adjacency, shape);

            if !critic_frozen {
                let penalty = gradient_penalty(
                    &*critic.net,
                    &batch.layouts,
                    &fake,
                    &batch.adjacency,
                    &batch.adjacency,
                    shape,
                    config.penalty_weight,
                    rng,
                );
                let critic_loss = add(&loss.critic_loss(&real_scores, &fake_scores), &penalty);
                critic.zero_grad();
                backward(&critic_loss, None);
                critic.step();
                totals.discriminator += critic_loss.item();
            }

            let (correct, scored) =
                discriminator_hits(&real_scores.to_vec(), &fake_scores.to_vec());
            totals.correct += correct;
            totals.scored += scored;

            if !generator_frozen {
                let adversarial =
                    loss.generator_loss(&critic.net.score(&generated, &batch.adjacency, shape));
                let reconstruction = MSELoss.forward(&generated, &batch.layouts);
                let generator_loss = add(
                    &adversarial,
                    &scale(&reconstruction, config.reconstruction_weight),
                );
                generator.zero_grad();
                backward(&generator_loss, None);
                generator.step();
                totals.generator += generator_loss.item();
                totals.reconstruction += reconstruction.item();
            }

            if snapshots.is_due(batch_idx) {
                snapshots.write(
                    renderer,
                    &fake,
                    &batch.adjacency,
                    &num_nodes,
                    shape,
                    epoch,
                    batch_idx,
                )?;
            }
            log::debug!(
                "batch {}/{} processed in {:.2?}",
                batch_idx + 1,
                batches.len(),
                batch_start.elapsed()
            );
        }

        let n = batches.len() as f32;
        let row = PretrainRow {
            epoch,
            generator_loss: totals.generator / n,
            reconstruction_loss: totals.reconstruction / n,
            discriminator_loss: totals.discriminator / n,
            discriminator_accuracy: if totals.scored > 0 {
                100.0 * totals.correct as f32 / totals.scored as f32
            } else {
                0.0
            },
        };
        metrics.append(&row)?;
        epochs_run = epoch;
        log::info!(
            "epoch {epoch}/{} in {:.2?}: G {:.4}, recon {:.4}, D {:.4}, D accuracy {:.2}%",
            config.epochs,
            epoch_start.elapsed(),
            row.generator_loss,
            row.reconstruction_loss,
            row.discriminator_loss,
            row.discriminator_accuracy
        );

        if !generator_frozen {
            if generator_stop.update(row.generator_loss) {
                save_network(&*generator.net, "generator", "generator", &generator_path)?;
                log::info!("best generator saved (loss {:.4})", row.generator_loss);
            } else if generator_stop.should_stop() {
                generator_frozen = true;
                log::warn!(
                    "generator frozen after {} epochs without improvement",
                    config.patience
                );
            }
        }
        if !critic_frozen {
            if critic_stop.update(row.discriminator_loss) {
                save_network(&*critic.net, "discriminator", "critic", &critic_path)?;
                log::info!(
                    "best discriminator saved (loss {:.4})",
                    row.discriminator_loss
                );
            } else if critic_stop.should_stop() {
                critic_frozen = true;
                log::warn!(
                    "discriminator frozen after {} epochs without improvement",
                    config.patience
                );
            }
        }
    }

    Ok(PretrainReport {
        epochs_run,
        generator_frozen,
        discriminator_frozen: critic_frozen,
        best_generator_loss: generator_stop.best(),
        best_discriminator_loss: critic_stop.best(),
        generator_checkpoint: generator_path,
        discriminator_checkpoint: critic_path,
    })
}
