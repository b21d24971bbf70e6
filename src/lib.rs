//! layoutgan: conditional WGAN-GP training for graph layouts
//!
//! A generator proposes node coordinates for a graph, a critic scores
//! layouts with a gradient-penalised Wasserstein objective, and a classifier
//! labels rendered layout images. The generator is trained against both, so
//! its layouts stay realistic while making the graph's class recognisable.
//!
//! # Modules
//!
//! - [`autograd`]: reverse-mode engine over `ndarray` vectors
//! - [`data`]: padded graph batches, JSON/synthetic datasets, loaders
//! - [`nn`]: network and renderer contracts plus reference MLPs
//! - [`optim`]: Adam, AdamW, SGD and learning-rate schedules
//! - [`train`]: losses, metrics, pretraining and the combined loop
//! - [`io`]: JSON checkpoints
//! - [`config`]: YAML run specification and validation
//! - [`cli`]: command handlers for the `layoutgan` binary
//!
//! # Example
//!
//! ```no_run
//! use layoutgan::config::{load_config, run_pipeline};
//!
//! let spec = load_config("run.yaml")?;
//! let report = run_pipeline(&spec)?;
//! println!("best val accuracy {:.2}%", report.combined.best_val_accuracy);
//! # Ok::<(), layoutgan::Error>(())
//! ```

pub mod autograd;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod io;
pub mod nn;
pub mod optim;
pub mod train;

pub use autograd::Tensor;
pub use error::{Error, Result};
