//! Command-line interface types

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// layoutgan: conditional WGAN-GP training for graph layouts
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "layoutgan")]
#[command(version)]
#[command(about = "Adversarial layout generation with a jointly trained layout classifier")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Adversarial pretraining of generator and discriminator
    Pretrain(RunArgs),

    /// Combined generator / discriminator / classifier training
    Train(TrainArgs),

    /// Pretrain, warm-start from the best pretrained weights, then train
    Pipeline(RunArgs),

    /// Validate a configuration file without training
    Validate(ValidateArgs),
}

/// Config path plus the overrides shared by every training command
#[derive(Args, Debug, Clone, PartialEq)]
pub struct RunArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Override number of epochs (both loops)
    #[arg(short, long)]
    pub epochs: Option<usize>,

    /// Override output directory
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for the train command
#[derive(Args, Debug, Clone, PartialEq)]
pub struct TrainArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Generator weights saved by pretraining
    #[arg(long, value_name = "PATH")]
    pub init_generator: Option<PathBuf>,

    /// Discriminator weights saved by pretraining
    #[arg(long, value_name = "PATH")]
    pub init_discriminator: Option<PathBuf>,

    /// Resume networks and optimizer state from a combined-loop checkpoint
    #[arg(short, long, value_name = "PATH")]
    pub resume: Option<PathBuf>,
}

/// Arguments for the validate command
#[derive(Args, Debug, Clone, PartialEq)]
pub struct ValidateArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Print the resolved configuration
    #[arg(short, long)]
    pub detailed: bool,
}
