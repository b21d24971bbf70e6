//! JSON checkpoints for single networks and full training state

use super::model::{ModelMetadata, ModelState};
use crate::nn::Module;
use crate::optim::OptimizerState;
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Everything needed to resume the combined loop from its best epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingCheckpoint {
    /// 1-based epoch that produced this checkpoint
    pub epoch: usize,
    pub val_accuracy: f32,
    pub test_accuracy: f32,
    pub generator: ModelState,
    pub discriminator: ModelState,
    pub classifier: ModelState,
    pub generator_optimizer: OptimizerState,
    pub discriminator_optimizer: OptimizerState,
    pub classifier_optimizer: OptimizerState,
}

/// Serialize `value` as pretty JSON
pub fn write_json<T: Serialize>(value: &T, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| Error::Serialization(format!("JSON serialization failed: {e}")))?;
    fs::write(path, json).map_err(|e| Error::io(format!("writing {}", path.display()), e))
}

/// Deserialize a JSON file
pub fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| Error::io(format!("reading {}", path.display()), e))?;
    serde_json::from_str(&content).map_err(|e| {
        let message = format!("{}: JSON deserialization failed: {e}", path.display());
        Error::Serialization(message)
    })
}

/// Save one network's weights
pub fn save_network<M: Module + ?Sized>(
    network: &M,
    name: &str,
    architecture: &str,
    path: impl AsRef<Path>,
) -> Result<()> {
    write_json(
        &ModelState::capture(network, ModelMetadata::new(name, architecture)),
        path,
    )
}

/// Load weights saved by [`save_network`] into `network`
pub fn load_network<M: Module + ?Sized>(
    network: &mut M,
    path: impl AsRef<Path>,
) -> Result<ModelState> {
    let path = path.as_ref();
    let state: ModelState = read_json(path)?;
    state
        .restore(network)
        .map_err(|message| Error::CheckpointMismatch {
            path: path.to_path_buf(),
            network: state.metadata.name.clone(),
            message,
        })?;
    Ok(state)
}

pub fn save_checkpoint(checkpoint: &TrainingCheckpoint, path: impl AsRef<Path>) -> Result<()> {
    write_json(checkpoint, path)
}

pub fn load_checkpoint(path: impl AsRef<Path>) -> Result<TrainingCheckpoint> {
    read_json(path)
}
