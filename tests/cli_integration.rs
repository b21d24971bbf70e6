//! Config files and CLI commands

use clap::Parser;
use layoutgan::cli::{run_command, Cli};
use layoutgan::config::{load_config, validate_config};
use layoutgan::train::{
    BEST_DISCRIMINATOR_FILE, BEST_GENERATOR_FILE, COMBINED_METRICS_FILE, PRETRAIN_METRICS_FILE,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const TINY_RUN: &str = r"
data:
  demo:
    train: 8
    val: 4
    test: 4
  batch_size: 4
  max_nodes: 6
model:
  noise_dim: 4
  hidden_dim: 8
  image_size: 8
pretrain:
  epochs: 1
  snapshot_every: 0
train:
  epochs: 1
  num_z_samples: 2
  eval_z_samples: 1
  snapshot_every: 0
seed: 11
";

fn write_config(dir: &Path, yaml: &str) -> PathBuf {
    let path = dir.join("run.yaml");
    fs::write(&path, yaml).expect("write config");
    path
}

fn run(args: &[&str]) -> Result<(), String> {
    run_command(Cli::try_parse_from(args).map_err(|e| e.to_string())?)
}

#[test]
fn shipped_demo_config_is_valid() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("configs/demo.yaml");
    let spec = load_config(&path).unwrap_or_else(|e| panic!("Failed to load demo.yaml: {e}"));
    validate_config(&spec).expect("demo.yaml validates");
    assert_eq!(spec.model.noise_dim, 128);
    assert_eq!(spec.pretrain.penalty_weight, 1.0);
    assert_eq!(spec.train.penalty_weight, 5.0);
}

#[test]
fn validate_command_accepts_and_rejects() {
    let dir = TempDir::new().expect("tempdir");
    let good = write_config(dir.path(), TINY_RUN);
    let good = good.to_str().expect("utf-8 path");
    run(&["layoutgan", "-q", "validate", good]).expect("valid config");

    let bad_dir = TempDir::new().expect("tempdir");
    let bad = write_config(bad_dir.path(), "data:\n  batch_size: 4\n");
    let bad = bad.to_str().expect("utf-8 path");
    let err = run(&["layoutgan", "-q", "validate", bad]).expect_err("no data source");
    assert!(err.contains("data.train"));
}

#[test]
fn pipeline_command_runs_both_loops() {
    let dir = TempDir::new().expect("tempdir");
    let config = write_config(dir.path(), TINY_RUN);
    let out = dir.path().join("out");
    run(&[
        "layoutgan",
        "-q",
        "pipeline",
        config.to_str().expect("utf-8 path"),
        "--output-dir",
        out.to_str().expect("utf-8 path"),
    ])
    .expect("pipeline should succeed");

    assert!(out.join(PRETRAIN_METRICS_FILE).exists());
    assert!(out.join(BEST_GENERATOR_FILE).exists());
    assert!(out.join(BEST_DISCRIMINATOR_FILE).exists());
    let combined = fs::read_to_string(out.join(COMBINED_METRICS_FILE)).expect("combined metrics");
    assert_eq!(combined.lines().count(), 1 + 2);
}

#[test]
fn train_command_warm_starts_from_pretrained_weights() {
    let dir = TempDir::new().expect("tempdir");
    let config = write_config(dir.path(), TINY_RUN);
    let config = config.to_str().expect("utf-8 path");
    let pre = dir.path().join("pre");
    let pre_str = pre.to_str().expect("utf-8 path");
    run(&[
        "layoutgan",
        "-q",
        "pretrain",
        config,
        "--output-dir",
        pre_str,
    ])
    .expect("pretraining should succeed");

    let generator = pre.join(BEST_GENERATOR_FILE);
    let discriminator = pre.join(BEST_DISCRIMINATOR_FILE);
    let out = dir.path().join("train");
    run(&[
        "layoutgan",
        "-q",
        "train",
        config,
        "--output-dir",
        out.to_str().expect("utf-8 path"),
        "--epochs",
        "2",
        "--init-generator",
        generator.to_str().expect("utf-8 path"),
        "--init-discriminator",
        discriminator.to_str().expect("utf-8 path"),
    ])
    .expect("training should succeed");

    let combined = fs::read_to_string(out.join(COMBINED_METRICS_FILE)).expect("combined metrics");
    assert_eq!(combined.lines().count(), 1 + 3);
}

#[test]
fn train_command_rejects_mismatched_weights() {
    let dir = TempDir::new().expect("tempdir");
    let config = write_config(dir.path(), TINY_RUN);
    let config = config.to_str().expect("utf-8 path");
    let pre = dir.path().join("pre");
    run(&[
        "layoutgan",
        "-q",
        "pretrain",
        config,
        "--output-dir",
        pre.to_str().expect("utf-8"),
    ])
    .expect("pretraining should succeed");

    // the discriminator file cannot initialise the generator
    let err = run(&[
        "layoutgan",
        "-q",
        "train",
        config,
        "--init-generator",
        pre.join(BEST_DISCRIMINATOR_FILE).to_str().expect("utf-8"),
    ])
    .expect_err("wrong network");
    assert!(err.starts_with("Training error"));
}
