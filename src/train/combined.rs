//! Joint training of generator, critic and classifier
//!
//! Every batch runs three updates in a fixed order:
//!
//! 1. critic: real scores against fake scores averaged over `num_z_samples`
//!    noise draws, plus the gradient penalty on the last draw
//! 2. generator: adversarial loss plus `alpha` times the classification loss
//!    of the rendered layouts, both averaged over fresh noise draws
//! 3. classifier: the averaged classification loss already computed in step 2
//!
//! Each network zeroes its gradients right before its own backward pass, so
//! gradients left on it by another network's backward never reach its
//! optimizer.

use super::csv_log::{CombinedRow, MetricsLog};
use super::early_stopping::EarlyStopping;
use super::evaluate::{evaluate, EvalResult};
use super::loss::{gradient_penalty, CrossEntropyLoss, LossFn, MeanGapWasserstein, WassersteinLoss};
use super::metrics::{argmax_rows, ClassificationTally};
use super::noise::sample_noise;
use super::player::Player;
use super::snapshot::SnapshotWriter;
use crate::autograd::{add, backward, mean_of, no_grad, scale};
use crate::data::{GraphBatch, GraphLoader, NUM_CLASSES};
use crate::io::{save_checkpoint, ModelMetadata, ModelState, TrainingCheckpoint};
use crate::nn::{Classifier, Critic, Generator, Renderer};
use crate::{Error, Result, Tensor};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub const COMBINED_METRICS_FILE: &str = "metrics_combined_train.csv";
pub const BEST_MODEL_FILE: &str = "best_model.json";
pub const METRICS_BACKUP_FILE: &str = "metrics_backup.json";
pub const COMBINED_SNAPSHOT_DIR: &str = "generated_images";

/// Combined-loop hyperparameters
#[derive(Debug, Clone)]
pub struct CombinedConfig {
    pub epochs: usize,
    /// Epochs without a new best validation accuracy before stopping
    pub patience: usize,
    pub penalty_weight: f32,
    /// Weight of the classification loss in the generator objective
    pub alpha: f32,
    /// Noise draws per training step
    pub num_z_samples: usize,
    /// Noise draws per evaluation batch
    pub eval_z_samples: usize,
    /// Snapshot every n-th batch; 0 disables
    pub snapshot_every: usize,
    pub snapshot_count: usize,
    pub output_dir: PathBuf,
}

impl Default for CombinedConfig {
    fn default() -> Self {
        Self {
            epochs: 100,
            patience: 10,
            penalty_weight: 5.0,
            alpha: 30.0,
            num_z_samples: 10,
            eval_z_samples: 5,
            snapshot_every: 10,
            snapshot_count: 3,
            output_dir: PathBuf::from("."),
        }
    }
}

/// Loaders for the three splits
pub struct Splits<'a> {
    pub train: &'a mut dyn GraphLoader,
    pub val: &'a mut dyn GraphLoader,
    pub test: &'a mut dyn GraphLoader,
}

/// Result of one training step
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub critic_loss: f32,
    pub generator_loss: f32,
    pub classifier_loss: f32,
    /// Argmax of the last noise draw's logits
    pub predictions: Vec<usize>,
    /// Last generated layout, detached
    pub layout: Tensor,
}

/// Summary of a combined run
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedReport {
    /// Training epochs completed (the baseline is not counted)
    pub epochs_run: usize,
    pub early_stopped: bool,
    pub best_val_accuracy: f32,
    /// Epoch of the saved checkpoint, if any improved on 0
    pub best_epoch: Option<usize>,
    pub metrics_path: PathBuf,
    pub checkpoint_path: PathBuf,
}

/// Graph of the critic update
struct CriticPass {
    loss: Tensor,
}

/// Graph shared by the generator and classifier updates; dropped after both
struct GeneratorPass {
    generator_loss: Tensor,
    classification_loss: Tensor,
    last_logits: Tensor,
    last_layout: Tensor,
}

/// Owns the three players and drives the combined loop
pub struct CombinedTrainer {
    pub generator: Player<dyn Generator>,
    pub critic: Player<dyn Critic>,
    pub classifier: Player<dyn Classifier>,
    pub renderer: Box<dyn Renderer>,
    loss: Box<dyn WassersteinLoss>,
    config: CombinedConfig,
    rng: StdRng,
}

impl CombinedTrainer {
    pub fn new(
        generator: Player<dyn Generator>,
        critic: Player<dyn Critic>,
        classifier: Player<dyn Classifier>,
        renderer: Box<dyn Renderer>,
        config: CombinedConfig,
        seed: u64,
    ) -> Self {
        Self {
            generator,
            critic,
            classifier,
            renderer,
            loss: Box::new(MeanGapWasserstein),
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Replace the default Wasserstein objective
    pub fn with_loss(mut self, loss: Box<dyn WassersteinLoss>) -> Self {
        self.loss = loss;
        self
    }

    pub fn config(&self) -> &CombinedConfig {
        &self.config
    }

    fn draws(&self) -> usize {
        self.config.num_z_samples.max(1)
    }

    fn critic_pass(&mut self, batch: &GraphBatch, num_nodes: &[usize]) -> CriticPass {
        let shape = batch.shape;
        let (layouts, adjacency) = (&batch.layouts, &batch.adjacency);
        let real_scores = self.critic.net.score(layouts, adjacency, shape);

        let generator = &self.generator.net;
        let mut fake_scores = Vec::with_capacity(self.draws());
        let mut last_fake = None;
        for _ in 0..self.draws() {
            let noise = sample_noise(shape.batch_size, generator.noise_dim(), &mut self.rng);
            let fake = no_grad(|| generator.generate(&noise, layouts, adjacency, num_nodes, shape));
            fake_scores.push(self.critic.net.score(&fake, adjacency, shape));
            last_fake = Some(fake);
        }
        let last_fake = last_fake.unwrap_or_else(|| layouts.detach());

        let penalty = gradient_penalty(
            &*self.critic.net,
            layouts,
            &last_fake,
            adjacency,
            adjacency,
            shape,
            self.config.penalty_weight,
            &mut self.rng,
        );
        let adversarial = self.loss.critic_loss(&real_scores, &mean_of(&fake_scores));
        CriticPass {
            loss: add(&adversarial, &penalty),
        }
    }

    fn generator_pass(&mut self, batch: &GraphBatch, num_nodes: &[usize]) -> GeneratorPass {
        let shape = batch.shape;
        let (layouts, adjacency) = (&batch.layouts, &batch.adjacency);
        let targets = CrossEntropyLoss::targets(&batch.labels);
        let criterion = CrossEntropyLoss::new(NUM_CLASSES);

        let mut adversarial = Vec::with_capacity(self.draws());
        let mut classification = Vec::with_capacity(self.draws());
        let generator = &self.generator.net;
        let mut last = None;
        for _ in 0..self.draws() {
            let noise = sample_noise(shape.batch_size, generator.noise_dim(), &mut self.rng);
            let layout = generator.generate(&noise, layouts, adjacency, num_nodes, shape);
            let scores = self.critic.net.score(&layout, adjacency, shape);
            adversarial.push(self.loss.generator_loss(&scores));

            let images = self.renderer.render(&layout, adjacency, num_nodes, shape);
            let logits = self.classifier.net.classify(&images, shape.batch_size);
            classification.push(criterion.forward(&logits, &targets));
            last = Some((logits, layout));
        }
        let (last_logits, last_layout) = last.unwrap_or_else(|| {
            (
                Tensor::zeros(shape.batch_size * NUM_CLASSES, false),
                layouts.detach(),
            )
        });

        let mean_adversarial = mean_of(&adversarial);
        let classification_loss = mean_of(&classification);
        let weighted = scale(&classification_loss, self.config.alpha);
        GeneratorPass {
            generator_loss: add(&mean_adversarial, &weighted),
            classification_loss,
            last_logits,
            last_layout: last_layout.detach(),
        }
    }

    /// Run the critic, generator and classifier updates on one batch
    pub fn train_step(&mut self, batch: &GraphBatch) -> Result<StepOutcome> {
        batch.validate()?;
        let num_nodes = batch.num_nodes();

        let critic_pass = self.critic_pass(batch, &num_nodes);
        self.critic.zero_grad();
        backward(&critic_pass.loss, None);
        self.critic.step();

        let pass = self.generator_pass(batch, &num_nodes);
        self.generator.zero_grad();
        backward(&pass.generator_loss, None);
        self.generator.step();

        self.classifier.zero_grad();
        backward(&pass.classification_loss, None);
        self.classifier.step();

        Ok(StepOutcome {
            critic_loss: critic_pass.loss.item(),
            generator_loss: pass.generator_loss.item(),
            classifier_loss: pass.classification_loss.item(),
            predictions: argmax_rows(&pass.last_logits.to_vec(), batch.len(), NUM_CLASSES),
            layout: pass.last_layout,
        })
    }

    /// Accuracy and F1 of generator → renderer → classifier on one split
    pub fn evaluate(&mut self, loader: &mut dyn GraphLoader) -> Result<EvalResult> {
        evaluate(
            &mut *self.generator.net,
            &mut *self.classifier.net,
            &*self.renderer,
            loader,
            self.config.eval_z_samples,
            &mut self.rng,
        )
    }

    fn set_training(&mut self, training: bool) {
        self.generator.net.set_training(training);
        self.critic.net.set_training(training);
        self.classifier.net.set_training(training);
    }

    /// Snapshot of all three networks and optimizers
    pub fn checkpoint(
        &self,
        epoch: usize,
        val_accuracy: f32,
        test_accuracy: f32,
    ) -> TrainingCheckpoint {
        TrainingCheckpoint {
            epoch,
            val_accuracy,
            test_accuracy,
            generator: ModelState::capture(
                &*self.generator.net,
                ModelMetadata::new("generator", "generator"),
            ),
            discriminator: ModelState::capture(
                &*self.critic.net,
                ModelMetadata::new("discriminator", "critic"),
            ),
            classifier: ModelState::capture(
                &*self.classifier.net,
                ModelMetadata::new("classifier", "classifier"),
            ),
            generator_optimizer: self.generator.optimizer.state(),
            discriminator_optimizer: self.critic.optimizer.state(),
            classifier_optimizer: self.classifier.optimizer.state(),
        }
    }

    /// Restore networks and optimizers from a checkpoint
    pub fn restore(&mut self, checkpoint: &TrainingCheckpoint, source: &Path) -> Result<()> {
        let mismatch = |network: &str| {
            let source = source.to_path_buf();
            let network = network.to_string();
            move |message: String| Error::CheckpointMismatch {
                path: source,
                network,
                message,
            }
        };
        checkpoint
            .generator
            .restore(&mut *self.generator.net)
            .map_err(mismatch("generator"))?;
        checkpoint
            .discriminator
            .restore(&mut *self.critic.net)
            .map_err(mismatch("discriminator"))?;
        checkpoint
            .classifier
            .restore(&mut *self.classifier.net)
            .map_err(mismatch("classifier"))?;
        self.generator
            .optimizer
            .load_state(&checkpoint.generator_optimizer)?;
        self.critic
            .optimizer
            .load_state(&checkpoint.discriminator_optimizer)?;
        self.classifier
            .optimizer
            .load_state(&checkpoint.classifier_optimizer)?;
        Ok(())
    }

    /// Run the full loop: baseline evaluation, epochs, checkpoints, backup
    pub fn train(&mut self, splits: Splits<'_>) -> Result<CombinedReport> {
        let out = self.config.output_dir.clone();
        fs::create_dir_all(&out).map_err(|e| Error::io(format!("creating {}", out.display()), e))?;
        let mut metrics = MetricsLog::<CombinedRow>::create(out.join(COMBINED_METRICS_FILE))?;
        let snapshots = SnapshotWriter::new(
            out.join(COMBINED_SNAPSHOT_DIR),
            self.config.snapshot_every,
            self.config.snapshot_count,
        )?;
        let checkpoint_path = out.join(BEST_MODEL_FILE);

        log::info!("evaluating initial model");
        let train0 = self.evaluate(&mut *splits.train)?;
        let val0 = self.evaluate(&mut *splits.val)?;
        let test0 = self.evaluate(&mut *splits.test)?;
        metrics.append(&CombinedRow {
            epoch: 0,
            generator_loss: None,
            discriminator_loss: None,
            classifier_loss: None,
            train_accuracy: train0.accuracy,
            train_f1: train0.f1,
            val_accuracy: val0.accuracy,
            val_f1: val0.f1,
            test_accuracy: test0.accuracy,
            test_f1: test0.f1,
        })?;
        log::info!(
            "initial model: train {:.2}% / F1 {:.4}, val {:.2}% / F1 {:.4}, test {:.2}% / F1 {:.4}",
            train0.accuracy,
            train0.f1,
            val0.accuracy,
            val0.f1,
            test0.accuracy,
            test0.f1
        );

        let mut stop = EarlyStopping::maximize(self.config.patience).with_best(0.0);
        let mut best_epoch = None;
        let mut epochs_run = 0;
        let mut early_stopped = false;

        for epoch in 1..=self.config.epochs {
            let epoch_start = Instant::now();
            self.set_training(true);
            let batches = splits.train.batches()?;
            if batches.is_empty() {
                return Err(Error::EmptyLoader("train".to_string()));
            }

            let (mut g_total, mut d_total, mut c_total) = (0.0f32, 0.0f32, 0.0f32);
            let mut tally = ClassificationTally::new();
            for (batch_idx, batch) in batches.iter().enumerate() {
                let batch_start = Instant::now();
                let step = self.train_step(batch)?;
                d_total += step.critic_loss;
                g_total += step.generator_loss;
                c_total += step.classifier_loss;
                tally.record(&step.predictions, &batch.labels);

                if snapshots.is_due(batch_idx) {
                    snapshots.write(
                        &*self.renderer,
                        &step.layout,
                        &batch.adjacency,
                        &batch.num_nodes(),
                        batch.shape,
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
            let val = self.evaluate(&mut *splits.val)?;
            let test = self.evaluate(&mut *splits.test)?;

            self.generator.advance_schedule();
            self.critic.advance_schedule();
            self.classifier.advance_schedule();

            let row = CombinedRow {
                epoch,
                generator_loss: Some(g_total / n),
                discriminator_loss: Some(d_total / n),
                classifier_loss: Some(c_total / n),
                train_accuracy: tally.accuracy(),
                train_f1: tally.mean_f1(),
                val_accuracy: val.accuracy,
                val_f1: val.f1,
                test_accuracy: test.accuracy,
                test_f1: test.f1,
            };
            metrics.append(&row)?;
            epochs_run = epoch;
            log::info!(
                "epoch {epoch}/{} in {:.2?}: G {:.4}, D {:.4}, C {:.4}; lr {:.2e}/{:.2e}/{:.2e}",
                self.config.epochs,
                epoch_start.elapsed(),
                g_total / n,
                d_total / n,
                c_total / n,
                self.generator.lr(),
                self.critic.lr(),
                self.classifier.lr()
            );
            log::info!(
                "train {:.2}% / F1 {:.4}, val {:.2}% / F1 {:.4}, test {:.2}% / F1 {:.4}",
                row.train_accuracy,
                row.train_f1,
                val.accuracy,
                val.f1,
                test.accuracy,
                test.f1
            );

            if stop.update(val.accuracy) {
                save_checkpoint(
                    &self.checkpoint(epoch, val.accuracy, test.accuracy),
                    &checkpoint_path,
                )?;
                best_epoch = Some(epoch);
                log::info!(
                    "best model saved with validation accuracy {:.2}%",
                    val.accuracy
                );
            } else {
                log::info!(
                    "epochs without improvement: {}",
                    stop.epochs_without_improvement()
                );
                if stop.should_stop() {
                    log::warn!(
                        "early stopping: no improvement for {} consecutive epochs",
                        self.config.patience
                    );
                    early_stopped = true;
                    break;
                }
            }
        }

        let backed_up = metrics.write_backup(out.join(METRICS_BACKUP_FILE))?;
        log::debug!("backed up {backed_up} metric rows");

        Ok(CombinedReport {
            epochs_run,
            early_stopped,
            best_val_accuracy: stop.best(),
            best_epoch,
            metrics_path: metrics.path().to_path_buf(),
            checkpoint_path,
        })
    }
}
