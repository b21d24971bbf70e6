//! Training loops, losses and metrics
//!
//! - [`pretrain`]: generator and critic only, each with its own early stopping
//! - [`CombinedTrainer`]: generator, critic and classifier per batch, early
//!   stopping on validation accuracy
//! - [`evaluate`]: held-out accuracy / F1 with logits averaged over noise draws

mod combined;
mod csv_log;
mod early_stopping;
mod evaluate;
mod loss;
mod metrics;
mod noise;
mod player;
mod pretrain;
mod snapshot;

#[cfg(test)]
mod tests;

pub use combined::{
    CombinedConfig, CombinedReport, CombinedTrainer, Splits, StepOutcome, BEST_MODEL_FILE,
    COMBINED_METRICS_FILE, COMBINED_SNAPSHOT_DIR, METRICS_BACKUP_FILE,
};
pub use csv_log::{CombinedRow, MetricsLog, MetricsRow, PretrainRow};
pub use early_stopping::{EarlyStopping, Mode};
pub use evaluate::{evaluate, EvalResult};
pub use loss::{
    gradient_penalty, CrossEntropyLoss, LossFn, MSELoss, MeanGapWasserstein, WassersteinLoss,
    DEFAULT_PENALTY_WEIGHT,
};
pub use metrics::{
    argmax_rows, discriminator_hits, precision_recall_f1, BinaryScores, ClassificationTally,
};
pub use noise::sample_noise;
pub use player::Player;
pub use pretrain::{
    pretrain, PretrainConfig, PretrainReport, BEST_DISCRIMINATOR_FILE, BEST_GENERATOR_FILE,
    PRETRAIN_METRICS_FILE, PRETRAIN_SNAPSHOT_DIR,
};
pub use snapshot::{snapshot_file_name, SnapshotWriter};
