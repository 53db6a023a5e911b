//! End-to-end run: load data, build the model, train, report.

use std::sync::mpsc;
use std::sync::Arc;

use chrono::Local;
use tracing::{info, warn};

use crate::config::{Device, RunConfig};
use crate::data::{
    random_split, test_size, DataLoader, Dataset, FenImageDataset, OrientationDataset, PartitionStrategy, SharedDataset,
};
use crate::error::{Result, TrainError};
use crate::network::{Network, NetworkSpec, NetworkState};
use crate::optim::one_cycle::{OneCycle, OneCyclePolicy};
use crate::report::{run_timestamp, ReportPaths, RunReporter};
use crate::task::kind::TaskKind;
use crate::train::{RunAborted, RunOutcome, SessionParts, TrainEvent, TrainingSession};

/// Runs one training job described by `config` and writes its artifacts.
pub fn execute(config: &RunConfig) -> Result<ReportPaths> {
    execute_with_progress(config, None)
}

/// Like [`execute`], also streaming loss reports and evaluations to `progress_tx`.
pub fn execute_with_progress(
    config: &RunConfig,
    progress_tx: Option<mpsc::Sender<TrainEvent>>,
) -> Result<ReportPaths> {
    config.validate()?;
    let started_at = run_timestamp(&Local::now());
    info!(task = %config.task, started_at = %started_at, "starting run");
    match config.device {
        Device::Cpu => info!("Using CPU"),
    }

    let (train_set, test_set) = load_partitions(config)?;
    info!(train = train_set.len(), test = test_set.len(), partition = ?config.partition, "datasets loaded");

    let train_loader = DataLoader::new(train_set, config.batch_size, true, true, config.seed);
    let test_loader = DataLoader::new(test_set, config.batch_size, false, true, config.seed);

    let model = build_model(config)?;
    info!(parameters = model.num_parameters(), layers = model.layers.len(), "model ready");

    let optimizer = config.optimizer.build(config.max_lr);
    let policy = OneCyclePolicy::new(config.max_lr, config.total_steps, config.warmup_fraction);
    let schedule = OneCycle::new(optimizer, policy)?;

    let mut loop_config = config.loop_config();
    loop_config.progress_tx = progress_tx;

    let session = TrainingSession::new(SessionParts {
        model,
        criterion: config.loss.criterion(),
        correctness: config.task.correctness(),
        schedule,
        train_loader,
        test_loader,
        config: loop_config,
    });

    let reporter = RunReporter::new(&config.outdir, config.task, started_at);
    conclude(&reporter, session.run())
}

/// Reports a finished run. An aborted run always returns its own error;
/// persisting its partial results is best effort.
fn conclude(
    reporter: &RunReporter,
    result: std::result::Result<RunOutcome<NetworkState>, RunAborted<NetworkState>>,
) -> Result<ReportPaths> {
    match result {
        Ok(outcome) => reporter.report(outcome.best.as_ref(), &outcome.history),
        Err(aborted) => {
            warn!(steps = aborted.partial.steps, error = %aborted.error, "run aborted");
            if let Some(best) = aborted.partial.best.as_ref() {
                match reporter.report(Some(best), &aborted.partial.history) {
                    Ok(paths) => info!(path = %paths.checkpoint.display(), "persisted the best snapshot so far"),
                    Err(e) => warn!(error = %e, "could not persist partial results"),
                }
            }
            Err(aborted.error)
        }
    }
}

/// Train and test datasets according to the configured partition strategy.
fn load_partitions(config: &RunConfig) -> Result<(SharedDataset, SharedDataset)> {
    match config.partition {
        PartitionStrategy::FractionOfTrain => {
            let test_source = config.test_source.as_deref()
                .ok_or_else(|| TrainError::config("the fraction_of_train partition needs a test_source"))?;
            let train = open_source(config, &config.train_source, config.max_data, config.seed)?;
            let cap = test_size(train.len(), config.train_test_split);
            if cap == 0 {
                return Err(TrainError::config(format!(
                    "{} training samples at split {} leave no room for test samples",
                    train.len(),
                    config.train_test_split
                )));
            }
            let test = open_source(config, test_source, Some(cap), config.seed.wrapping_add(1))?;
            Ok((train, test))
        }
        PartitionStrategy::RandomSplit => {
            let pool = open_source(config, &config.train_source, config.max_data, config.seed)?;
            let (train, test) = random_split(pool, config.train_test_split, config.seed);
            Ok((Arc::new(train), Arc::new(test)))
        }
    }
}

fn open_source(
    config: &RunConfig,
    dir: &std::path::Path,
    max: Option<usize>,
    seed: u64,
) -> Result<SharedDataset> {
    let (w, h) = (config.image_width, config.image_height);
    Ok(match config.task {
        TaskKind::Orientation => {
            let data = OrientationDataset::open(dir, max, config.rotate_probability, w, h, seed)?;
            info!(source = %dir.display(), samples = data.len(), rotated = data.rotated_count(), "opened orientation images");
            Arc::new(data)
        }
        TaskKind::Board => {
            let data = FenImageDataset::open(dir, max, w, h)?;
            info!(source = %dir.display(), samples = data.len(), "opened board images");
            Arc::new(data)
        }
    })
}

fn build_model(config: &RunConfig) -> Result<Network> {
    let spec = match &config.architecture {
        Some(path) => NetworkSpec::load_json(path)?,
        None => config.task.default_spec(config.input_size()),
    };
    if spec.input_size() != Some(config.input_size()) || spec.output_size() != Some(config.task.output_size()) {
        return Err(TrainError::config(format!(
            "architecture '{}' maps {:?} inputs to {:?} outputs; the {} task needs {} to {}",
            spec.name,
            spec.input_size(),
            spec.output_size(),
            config.task,
            config.input_size(),
            config.task.output_size()
        )));
    }

    let mut model = Network::from_spec(&spec, config.seed)?;
    if let Some(checkpoint) = &config.checkpoint {
        model.load_checkpoint(checkpoint)?;
        info!(path = %checkpoint.display(), "resumed from checkpoint");
    }
    Ok(model)
}
