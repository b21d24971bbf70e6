//! Checkpoint persistence
//!
//! Network weights are stored as a [`ModelState`]: metadata, one
//! [`ParameterInfo`] per parameter and the flattened data. The combined loop
//! bundles three model states and three optimizer states into one
//! [`TrainingCheckpoint`].

mod checkpoint;
mod model;

pub use checkpoint::{
    load_checkpoint, load_network, read_json, save_checkpoint, save_network, write_json,
    TrainingCheckpoint,
};
pub use model::{ModelMetadata, ModelState, ParameterInfo};
