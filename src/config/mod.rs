//! Declarative YAML configuration
//!
//! A single [`RunSpec`] describes data, networks, optimizers, schedules and
//! both training loops. The CLI types live here too so that commands can be
//! parsed, overridden and validated in one place.

mod builder;
mod cli;
mod loader;
mod run;
mod schema;
mod validate;

pub use builder::{build_loaders, build_optimizer, build_players, build_scheduler, Loaders, Players};
pub use cli::{Cli, Command, RunArgs, TrainArgs, ValidateArgs};
pub use loader::{apply_overrides, load_config, parse_config};
pub use run::{run_combined, run_pipeline, run_pretrain, PipelineReport, WarmStart};
pub use schema::{
    CombinedParams, DataSpec, DemoSpec, ModelSpec, NetworkOptimizers, NetworkSchedulers,
    OptimSpec, PretrainParams, RunSpec, SchedulerSpec,
};
pub use validate::{validate_config, ValidationError};
