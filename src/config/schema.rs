//! YAML schema definitions for declarative run configuration

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Deserialize a bool from either a YAML boolean (`true`) or a quoted string (`"true"`).
fn deserialize_bool_lenient<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        Str(String),
    }

    match BoolOrString::deserialize(deserializer)? {
        BoolOrString::Bool(b) => Ok(b),
        BoolOrString::Str(s) => match s.to_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected 'true' or 'false', got '{other}'"
            ))),
        },
    }
}

/// Complete run specification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSpec {
    /// Dataset sources and batching
    #[serde(default)]
    pub data: DataSpec,

    /// Network and renderer shapes
    #[serde(default)]
    pub model: ModelSpec,

    /// One optimizer per network
    #[serde(default)]
    pub optimizers: NetworkOptimizers,

    /// One learning-rate schedule per network
    #[serde(default)]
    pub schedulers: NetworkSchedulers,

    /// Adversarial pretraining hyperparameters
    #[serde(default)]
    pub pretrain: PretrainParams,

    /// Combined-loop hyperparameters
    #[serde(default)]
    pub train: CombinedParams,

    /// Directory receiving metrics, checkpoints and snapshots
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Seed for weight init, noise and shuffling
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for RunSpec {
    fn default() -> Self {
        Self {
            data: DataSpec::default(),
            model: ModelSpec::default(),
            optimizers: NetworkOptimizers::default(),
            schedulers: NetworkSchedulers::default(),
            pretrain: PretrainParams::default(),
            train: CombinedParams::default(),
            output_dir: default_output_dir(),
            seed: default_seed(),
        }
    }
}

/// Data configuration
///
/// Either JSON files for the three splits or a `demo` block generating
/// synthetic ring/star graphs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub train: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub val: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<PathBuf>,

    /// Synthetic split sizes, used instead of files when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo: Option<DemoSpec>,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Graphs are zero-padded to this many nodes
    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,

    /// Reshuffle the training split every epoch
    #[serde(
        default = "default_true",
        deserialize_with = "deserialize_bool_lenient"
    )]
    pub shuffle: bool,
}

impl Default for DataSpec {
    fn default() -> Self {
        Self {
            train: None,
            val: None,
            test: None,
            demo: None,
            batch_size: default_batch_size(),
            max_nodes: default_max_nodes(),
            shuffle: true,
        }
    }
}

/// Synthetic split sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoSpec {
    #[serde(default = "default_demo_train")]
    pub train: usize,
    #[serde(default = "default_demo_eval")]
    pub val: usize,
    #[serde(default = "default_demo_eval")]
    pub test: usize,
}

impl Default for DemoSpec {
    fn default() -> Self {
        Self {
            train: default_demo_train(),
            val: default_demo_eval(),
            test: default_demo_eval(),
        }
    }
}

/// Network and renderer shapes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSpec {
    #[serde(default = "default_noise_dim")]
    pub noise_dim: usize,

    #[serde(default = "default_hidden_dim")]
    pub hidden_dim: usize,

    /// Side length of rendered layout images
    #[serde(default = "default_image_size")]
    pub image_size: usize,

    /// Gaussian splat width in pixels
    #[serde(default = "default_sigma")]
    pub sigma: f32,

    /// Half-width of the coordinate window mapped onto the image
    #[serde(default = "default_extent")]
    pub extent: f32,
}

impl Default for ModelSpec {
    fn default() -> Self {
        Self {
            noise_dim: default_noise_dim(),
            hidden_dim: default_hidden_dim(),
            image_size: default_image_size(),
            sigma: default_sigma(),
            extent: default_extent(),
        }
    }
}

/// Optimizer specification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimSpec {
    /// Optimizer name: "adam" | "adamw" | "sgd"
    pub name: String,

    /// Learning rate
    pub lr: f32,

    /// Optimizer-specific parameters (beta1, beta2, momentum, etc.)
    #[serde(flatten)]
    pub params: HashMap<String, serde_json::Value>,
}

impl OptimSpec {
    pub fn adam(lr: f32) -> Self {
        Self {
            name: "adam".to_string(),
            lr,
            params: HashMap::new(),
        }
    }
}

impl Default for OptimSpec {
    fn default() -> Self {
        Self::adam(1e-4)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkOptimizers {
    #[serde(default)]
    pub generator: OptimSpec,
    #[serde(default)]
    pub discriminator: OptimSpec,
    #[serde(default)]
    pub classifier: OptimSpec,
}

/// Learning-rate schedule, stepped once per combined-loop epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "lowercase")]
pub enum SchedulerSpec {
    /// Multiply the rate by `gamma` every `step_size` epochs
    Step {
        #[serde(default = "default_step_size")]
        step_size: usize,
        #[serde(default = "default_gamma")]
        gamma: f32,
    },
    /// Cosine decay to `lr_min` over `t_max` epochs
    Cosine {
        t_max: usize,
        #[serde(default)]
        lr_min: f32,
    },
    Constant,
}

impl Default for SchedulerSpec {
    fn default() -> Self {
        Self::Step {
            step_size: default_step_size(),
            gamma: default_gamma(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkSchedulers {
    #[serde(default)]
    pub generator: SchedulerSpec,
    #[serde(default)]
    pub discriminator: SchedulerSpec,
    #[serde(default)]
    pub classifier: SchedulerSpec,
}

/// Pretraining hyperparameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PretrainParams {
    #[serde(default = "default_epochs")]
    pub epochs: usize,
    #[serde(default = "default_pretrain_penalty")]
    pub penalty_weight: f32,
    #[serde(default = "default_reconstruction_weight")]
    pub reconstruction_weight: f32,
    #[serde(default = "default_pretrain_patience")]
    pub patience: usize,
    #[serde(default = "default_pretrain_snapshot_every")]
    pub snapshot_every: usize,
    #[serde(default = "default_snapshot_count")]
    pub snapshot_count: usize,
}

impl Default for PretrainParams {
    fn default() -> Self {
        Self {
            epochs: default_epochs(),
            penalty_weight: default_pretrain_penalty(),
            reconstruction_weight: default_reconstruction_weight(),
            patience: default_pretrain_patience(),
            snapshot_every: default_pretrain_snapshot_every(),
            snapshot_count: default_snapshot_count(),
        }
    }
}

/// Combined-loop hyperparameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedParams {
    #[serde(default = "default_epochs")]
    pub epochs: usize,
    #[serde(default = "default_combined_patience")]
    pub patience: usize,
    #[serde(default = "default_combined_penalty")]
    pub penalty_weight: f32,
    /// Classification weight in the generator objective
    #[serde(default = "default_alpha")]
    pub alpha: f32,
    #[serde(default = "default_num_z_samples")]
    pub num_z_samples: usize,
    #[serde(default = "default_eval_z_samples")]
    pub eval_z_samples: usize,
    #[serde(default = "default_combined_snapshot_every")]
    pub snapshot_every: usize,
    #[serde(default = "default_snapshot_count")]
    pub snapshot_count: usize,
}

impl Default for CombinedParams {
    fn default() -> Self {
        Self {
            epochs: default_epochs(),
            patience: default_combined_patience(),
            penalty_weight: default_combined_penalty(),
            alpha: default_alpha(),
            num_z_samples: default_num_z_samples(),
            eval_z_samples: default_eval_z_samples(),
            snapshot_every: default_combined_snapshot_every(),
            snapshot_count: default_snapshot_count(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./output")
}

fn default_seed() -> u64 {
    42
}

fn default_batch_size() -> usize {
    8
}

fn default_max_nodes() -> usize {
    10
}

fn default_demo_train() -> usize {
    64
}

fn default_demo_eval() -> usize {
    16
}

fn default_noise_dim() -> usize {
    128
}

fn default_hidden_dim() -> usize {
    64
}

fn default_image_size() -> usize {
    16
}

fn default_sigma() -> f32 {
    1.0
}

fn default_extent() -> f32 {
    1.5
}

fn default_step_size() -> usize {
    30
}

fn default_gamma() -> f32 {
    0.1
}

fn default_epochs() -> usize {
    100
}

fn default_pretrain_penalty() -> f32 {
    1.0
}

fn default_reconstruction_weight() -> f32 {
    100.0
}

fn default_pretrain_patience() -> usize {
    20
}

fn default_pretrain_snapshot_every() -> usize {
    30
}

fn default_snapshot_count() -> usize {
    3
}

fn default_combined_patience() -> usize {
    10
}

fn default_combined_penalty() -> f32 {
    5.0
}

fn default_alpha() -> f32 {
    30.0
}

fn default_num_z_samples() -> usize {
    10
}

fn default_eval_z_samples() -> usize {
    5
}

fn default_combined_snapshot_every() -> usize {
    10
}
