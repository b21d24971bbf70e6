//! Validation error types

/// Validation error type
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("data.{0} is required unless data.demo is set")]
    MissingDataPath(&'static str),

    #[error("Data path does not exist: {0}")]
    DataPathNotFound(String),

    #[error("Demo training split cannot be empty")]
    EmptyDemoSplit,

    #[error("Invalid batch size: {0} (must be > 0)")]
    InvalidBatchSize(usize),

    #[error("Invalid max_nodes: {0} (must be > 0)")]
    InvalidMaxNodes(usize),

    #[error("Invalid model dimension {name}: {value} (must be > 0)")]
    InvalidDimension { name: &'static str, value: usize },

    #[error("Invalid renderer {name}: {value} (must be > 0.0)")]
    InvalidRenderer { name: &'static str, value: f32 },

    #[error("Invalid {network} learning rate: {lr} (must be > 0.0 and <= 1.0)")]
    InvalidLearningRate { network: &'static str, lr: f32 },

    #[error("Invalid {network} optimizer: {name} (must be one of: adam, adamw, sgd)")]
    InvalidOptimizer { network: &'static str, name: String },

    #[error("Invalid {network} scheduler: {reason}")]
    InvalidScheduler {
        network: &'static str,
        reason: String,
    },

    #[error("Invalid {stage} epochs: 0 (must be > 0)")]
    InvalidEpochs { stage: &'static str },

    #[error("Invalid {stage} patience: 0 (must be > 0)")]
    InvalidPatience { stage: &'static str },

    #[error("Invalid {name}: {value} (must be >= 0.0 and finite)")]
    InvalidWeight { name: &'static str, value: f32 },

    #[error("Invalid {name}: 0 (at least one noise draw is required)")]
    InvalidNoiseSamples { name: &'static str },
}
