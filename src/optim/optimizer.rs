//! Optimizer trait and serializable optimizer state

use crate::{Error, Result, Tensor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Snapshot of an optimizer for checkpointing
///
/// `buffers` maps a buffer name ("m", "v", "velocity") to one optional
/// buffer per parameter, in parameter order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerState {
    pub name: String,
    pub lr: f32,
    pub step_count: u64,
    #[serde(default)]
    pub buffers: BTreeMap<String, Vec<Option<Vec<f32>>>>,
}

impl OptimizerState {
    pub(crate) fn check_name(&self, expected: &str) -> Result<()> {
        if self.name == expected {
            Ok(())
        } else {
            Err(Error::Serialization(format!(
                "optimizer state is for '{}', cannot load into '{expected}'",
                self.name
            )))
        }
    }
}

/// Trait for optimization algorithms
///
/// Parameters are borrowed from the network that owns them; the position of
/// each parameter in the slice identifies its moment buffers, so callers must
/// pass parameters in a stable order.
pub trait Optimizer {
    /// Perform one update on the referenced parameters
    fn step_refs(&mut self, params: &mut [&mut Tensor]);

    /// Zero gradients on referenced parameters
    fn zero_grad_refs(&mut self, params: &mut [&mut Tensor]) {
        for param in params.iter_mut() {
            param.zero_grad();
        }
    }

    /// Get learning rate
    fn lr(&self) -> f32;

    /// Set learning rate
    fn set_lr(&mut self, lr: f32);

    /// Number of completed steps
    fn step_count(&self) -> u64;

    /// Capture state for a checkpoint
    fn state(&self) -> OptimizerState;

    /// Restore state captured by [`Optimizer::state`]
    fn load_state(&mut self, state: &OptimizerState) -> Result<()>;
}

pub(crate) fn to_buffers(bufs: &[Option<ndarray::Array1<f32>>]) -> Vec<Option<Vec<f32>>> {
    bufs.iter()
        .map(|b| b.as_ref().map(|a| a.to_vec()))
        .collect()
}

pub(crate) fn from_buffers(
    state: &OptimizerState,
    key: &str,
) -> Vec<Option<ndarray::Array1<f32>>> {
    state
        .buffers
        .get(key)
        .map(|bufs| {
            bufs.iter()
                .map(|b| b.as_ref().map(|v| ndarray::Array1::from(v.clone())))
                .collect()
        })
        .unwrap_or_default()
}
