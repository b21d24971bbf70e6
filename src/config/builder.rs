//! Build training components from configuration

use super::schema::{OptimSpec, RunSpec, SchedulerSpec};
use crate::data::{BatchLoader, GraphDataset, COORD_DIM};
use crate::error::{Error, Result};
use crate::nn::{
    Classifier, Critic, Generator, MlpClassifier, MlpCritic, MlpGenerator, SplatRenderer,
};
use crate::optim::{
    Adam, AdamW, ConstantLR, CosineAnnealingLR, LRScheduler, Optimizer, StepDecayLR, SGD,
};
use crate::train::{CombinedConfig, Player, PretrainConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;

// Optimizer parameter field name constants
const PARAM_MOMENTUM: &str = "momentum";
const PARAM_BETA1: &str = "beta1";
const PARAM_BETA2: &str = "beta2";
const PARAM_EPS: &str = "eps";
const PARAM_WEIGHT_DECAY: &str = "weight_decay";

fn param_or(spec: &OptimSpec, key: &str, default: f64) -> f32 {
    let value = spec.params.get(key).and_then(serde_json::Value::as_f64);
    value.unwrap_or(default) as f32
}

/// Build optimizer from configuration
pub fn build_optimizer(spec: &OptimSpec) -> Result<Box<dyn Optimizer>> {
    match spec.name.to_lowercase().as_str() {
        "sgd" => {
            let momentum = param_or(spec, PARAM_MOMENTUM, 0.0);
            Ok(Box::new(SGD::new(spec.lr, momentum)))
        }
        "adam" => {
            let beta1 = param_or(spec, PARAM_BETA1, 0.9);
            let beta2 = param_or(spec, PARAM_BETA2, 0.999);
            let eps = param_or(spec, PARAM_EPS, 1e-8);
            Ok(Box::new(Adam::new(spec.lr, beta1, beta2, eps)))
        }
        "adamw" => {
            let beta1 = param_or(spec, PARAM_BETA1, 0.9);
            let beta2 = param_or(spec, PARAM_BETA2, 0.999);
            let eps = param_or(spec, PARAM_EPS, 1e-8);
            let weight_decay = param_or(spec, PARAM_WEIGHT_DECAY, 0.01);
            Ok(Box::new(AdamW::new(spec.lr, beta1, beta2, eps, weight_decay)))
        }
        name => Err(Error::ConfigError(format!(
            "Unknown optimizer: {name}. Supported: sgd, adam, adamw"
        ))),
    }
}

/// Build the per-epoch schedule starting from `lr`
pub fn build_scheduler(spec: &SchedulerSpec, lr: f32) -> Box<dyn LRScheduler> {
    match *spec {
        SchedulerSpec::Step { step_size, gamma } => {
            Box::new(StepDecayLR::new(lr, step_size, gamma))
        }
        SchedulerSpec::Cosine { t_max, lr_min } => {
            Box::new(CosineAnnealingLR::new(lr, t_max, lr_min))
        }
        SchedulerSpec::Constant => Box::new(ConstantLR::new(lr)),
    }
}

/// Freshly initialised networks with their optimizers and schedules
pub struct Players {
    pub generator: Player<dyn Generator>,
    pub critic: Player<dyn Critic>,
    pub classifier: Player<dyn Classifier>,
    pub renderer: SplatRenderer,
}

/// Initialise all three networks from `seed`
pub fn build_players(spec: &RunSpec) -> Result<Players> {
    let mut rng = StdRng::seed_from_u64(spec.seed);
    let model = &spec.model;
    let max_nodes = spec.data.max_nodes;

    let generator: Box<dyn Generator> = Box::new(MlpGenerator::new(
        max_nodes,
        COORD_DIM,
        model.noise_dim,
        model.hidden_dim,
        &mut rng,
    ));
    let critic: Box<dyn Critic> =
        Box::new(MlpCritic::new(max_nodes, COORD_DIM, model.hidden_dim, &mut rng));
    let classifier: Box<dyn Classifier> =
        Box::new(MlpClassifier::new(model.image_size, model.hidden_dim, &mut rng));

    let opts = &spec.optimizers;
    let schedules = &spec.schedulers;
    Ok(Players {
        generator: Player::new(
            generator,
            build_optimizer(&opts.generator)?,
            build_scheduler(&schedules.generator, opts.generator.lr),
        ),
        critic: Player::new(
            critic,
            build_optimizer(&opts.discriminator)?,
            build_scheduler(&schedules.discriminator, opts.discriminator.lr),
        ),
        classifier: Player::new(
            classifier,
            build_optimizer(&opts.classifier)?,
            build_scheduler(&schedules.classifier, opts.classifier.lr),
        ),
        renderer: SplatRenderer::new(model.image_size, model.sigma, model.extent),
    })
}

/// Train, validation and test loaders
pub struct Loaders {
    pub train: BatchLoader,
    pub val: BatchLoader,
    pub test: BatchLoader,
}

/// Load the three splits from JSON, or generate them when `data.demo` is set
pub fn build_loaders(spec: &RunSpec) -> Result<Loaders> {
    let data = &spec.data;
    let (train, val, test) = match data.demo {
        Some(demo) => (
            GraphDataset::synthetic(demo.train, data.max_nodes, spec.seed),
            GraphDataset::synthetic(demo.val, data.max_nodes, spec.seed.wrapping_add(1)),
            GraphDataset::synthetic(demo.test, data.max_nodes, spec.seed.wrapping_add(2)),
        ),
        None => {
            let load = |path: &Option<std::path::PathBuf>, split: &str| match path {
                Some(p) => GraphDataset::from_json_file(p, data.max_nodes),
                None => Err(Error::ConfigError(format!(
                    "data.{split} is required without data.demo"
                ))),
            };
            (
                load(&data.train, "train")?,
                load(&data.val, "val")?,
                load(&data.test, "test")?,
            )
        }
    };
    Ok(Loaders {
        train: BatchLoader::new(train, data.batch_size, data.shuffle, spec.seed),
        val: BatchLoader::new(val, data.batch_size, false, spec.seed),
        test: BatchLoader::new(test, data.batch_size, false, spec.seed),
    })
}

impl RunSpec {
    pub fn pretrain_config(&self) -> PretrainConfig {
        let p = &self.pretrain;
        PretrainConfig {
            epochs: p.epochs,
            penalty_weight: p.penalty_weight,
            reconstruction_weight: p.reconstruction_weight,
            patience: p.patience,
            snapshot_every: p.snapshot_every,
            snapshot_count: p.snapshot_count,
            output_dir: self.output_dir.clone(),
        }
    }

    pub fn combined_config(&self) -> CombinedConfig {
        let t = &self.train;
        CombinedConfig {
            epochs: t.epochs,
            patience: t.patience,
            penalty_weight: t.penalty_weight,
            alpha: t.alpha,
            num_z_samples: t.num_z_samples,
            eval_z_samples: t.eval_z_samples,
            snapshot_every: t.snapshot_every,
            snapshot_count: t.snapshot_count,
            output_dir: self.output_dir.clone(),
        }
    }
}
