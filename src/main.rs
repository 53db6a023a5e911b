use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use boardnet::{ConfigOverrides, RunConfig, TaskKind};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train the board orientation classifier
    Orientation(RunArgs),
    /// Train the full-board (FEN) recognizer
    Board(RunArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// TOML file layered over the task defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Training image folder (the whole pool for random_split)
    #[arg(long)]
    train_source: Option<PathBuf>,

    /// Held-out image folder
    #[arg(long)]
    test_source: Option<PathBuf>,

    /// Directory receiving the checkpoint and plot
    #[arg(short, long)]
    outdir: Option<PathBuf>,

    #[arg(long)]
    total_steps: Option<usize>,

    #[arg(long)]
    batch_size: Option<usize>,

    /// Peak learning rate of the one-cycle schedule
    #[arg(long)]
    max_lr: Option<f64>,

    #[arg(long)]
    train_test_split: Option<f64>,

    /// Fraction of the steps spent warming up to the peak rate
    #[arg(long)]
    warmup_fraction: Option<f64>,

    /// Cap on examples loaded from the training source
    #[arg(long)]
    max_data: Option<usize>,

    #[arg(long)]
    rotate_probability: Option<f64>,

    #[arg(long)]
    loss_report_every: Option<usize>,

    #[arg(long)]
    eval_every: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    /// Checkpoint to initialize parameters from
    #[arg(long)]
    checkpoint: Option<PathBuf>,

    /// NetworkSpec JSON replacing the default architecture
    #[arg(long)]
    architecture: Option<PathBuf>,
}

impl RunArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            train_source: self.train_source.clone(),
            test_source: self.test_source.clone(),
            outdir: self.outdir.clone(),
            total_steps: self.total_steps,
            batch_size: self.batch_size,
            max_lr: self.max_lr,
            train_test_split: self.train_test_split,
            warmup_fraction: self.warmup_fraction,
            max_data: self.max_data,
            rotate_probability: self.rotate_probability,
            loss_report_every: self.loss_report_every,
            eval_every: self.eval_every,
            seed: self.seed,
            checkpoint: self.checkpoint.clone(),
            architecture: self.architecture.clone(),
            ..Default::default()
        }
    }

    fn resolve(&self, task: TaskKind) -> Result<RunConfig> {
        let mut layers = ConfigOverrides::default();
        if let Some(path) = &self.config {
            let file = ConfigOverrides::load_toml(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            layers = layers.merge(file);
        }
        layers = layers.merge(self.overrides());

        let mut config = RunConfig::for_task(task);
        config.apply(layers);
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    let (task, args) = match &cli.command {
        Command::Orientation(args) => (TaskKind::Orientation, args),
        Command::Board(args) => (TaskKind::Board, args),
    };
    let config = args.resolve(task)?;

    let paths = boardnet::execute(&config)
        .with_context(|| format!("{} training run failed", task))?;
    info!("Checkpoint: {}", paths.checkpoint.display());
    info!("Curves: {}", paths.plot.display());
    Ok(())
}
