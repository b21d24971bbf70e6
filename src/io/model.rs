//! Model state for serialization

use crate::nn::Module;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Model metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Network role ("generator", "discriminator", "classifier")
    pub name: String,

    /// Architecture tag (e.g., "mlp_generator")
    pub architecture: String,

    /// Crate version that wrote the state
    pub version: String,

    /// RFC 3339 time of writing
    pub saved_at: String,

    /// Custom metadata fields
    #[serde(default)]
    pub custom: HashMap<String, serde_json::Value>,
}

impl ModelMetadata {
    /// Create new metadata stamped with the current time
    pub fn new(name: impl Into<String>, architecture: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            architecture: architecture.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            saved_at: chrono::Utc::now().to_rfc3339(),
            custom: HashMap::new(),
        }
    }

    /// Add custom metadata field
    pub fn with_custom(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.custom.insert(key.into(), value);
        self
    }
}

/// Information about a model parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterInfo {
    /// Parameter name (e.g., "out.weight")
    pub name: String,

    /// Parameter shape
    pub shape: Vec<usize>,

    /// Data type
    pub dtype: String,

    /// Whether this parameter requires gradients
    pub requires_grad: bool,
}

/// Serializable network weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelState {
    pub metadata: ModelMetadata,

    /// Parameter information, in the network's parameter order
    pub parameters: Vec<ParameterInfo>,

    /// Flattened parameter data
    pub data: Vec<f32>,
}

impl ModelState {
    /// Capture the current weights of a network
    pub fn capture<M: Module + ?Sized>(network: &M, metadata: ModelMetadata) -> Self {
        let mut data = Vec::new();
        let parameters = network
            .named_parameters()
            .into_iter()
            .map(|(name, tensor)| {
                data.extend(tensor.data().iter().copied());
                ParameterInfo {
                    name,
                    shape: vec![tensor.len()],
                    dtype: "f32".to_string(),
                    requires_grad: tensor.requires_grad(),
                }
            })
            .collect();

        Self {
            metadata,
            parameters,
            data,
        }
    }

    /// Copy the stored weights into `network`
    ///
    /// Names and sizes must match the network's parameters one to one; on
    /// mismatch nothing is written and the reason is returned.
    pub fn restore<M: Module + ?Sized>(&self, network: &mut M) -> std::result::Result<(), String> {
        let expected: Vec<(String, usize)> = network
            .named_parameters()
            .into_iter()
            .map(|(name, t)| (name, t.len()))
            .collect();
        if expected.len() != self.parameters.len() {
            return Err(format!(
                "expected {} parameters, checkpoint has {}",
                expected.len(),
                self.parameters.len()
            ));
        }
        for ((name, len), info) in expected.iter().zip(&self.parameters) {
            let size: usize = info.shape.iter().product();
            if *name != info.name || *len != size {
                return Err(format!(
                    "parameter '{name}' ({len} values) does not match '{}' ({size} values)",
                    info.name
                ));
            }
        }
        let total: usize = expected.iter().map(|(_, len)| len).sum();
        if total != self.data.len() {
            let found = self.data.len();
            return Err(format!("expected {total} values, checkpoint has {found}"));
        }

        let mut offset = 0;
        for param in network.parameters_mut() {
            let len = param.len();
            let values = ndarray::Array1::from(self.data[offset..offset + len].to_vec());
            *param.data_mut() = values;
            param.zero_grad();
            offset += len;
        }
        Ok(())
    }
}
