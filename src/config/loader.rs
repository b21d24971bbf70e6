//! Load a run specification from YAML and apply command-line overrides

use super::cli::RunArgs;
use super::schema::RunSpec;
use super::validate::validate_config;
use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

/// Read, parse and validate a YAML run specification
pub fn load_config<P: AsRef<Path>>(config_path: P) -> Result<RunSpec> {
    let spec = parse_config(config_path)?;
    validate_config(&spec).map_err(|e| Error::ConfigError(format!("Invalid config: {e}")))?;
    Ok(spec)
}

/// Read and parse without validation
pub fn parse_config<P: AsRef<Path>>(config_path: P) -> Result<RunSpec> {
    let yaml_content = fs::read_to_string(config_path.as_ref()).map_err(|e| {
        Error::ConfigError(format!(
            "Failed to read config file {}: {}",
            config_path.as_ref().display(),
            e
        ))
    })?;

    serde_yaml::from_str(&yaml_content)
        .map_err(|e| Error::ConfigError(format!("Failed to parse YAML config: {e}")))
}

/// Apply command-line overrides, then re-validate
pub fn apply_overrides(spec: &mut RunSpec, args: &RunArgs) -> Result<()> {
    if let Some(epochs) = args.epochs {
        spec.pretrain.epochs = epochs;
        spec.train.epochs = epochs;
    }
    if let Some(dir) = &args.output_dir {
        spec.output_dir = dir.clone();
    }
    if let Some(seed) = args.seed {
        spec.seed = seed;
    }
    validate_config(spec).map_err(|e| Error::ConfigError(format!("Invalid override: {e}")))
}
