use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use tracing::info;

use crate::error::{Result, TrainError};
use crate::network::state::NetworkState;
use crate::report::plot::render_curves;
use crate::task::kind::TaskKind;
use crate::train::best::Snapshot;
use crate::train::history::CurveHistory;

/// Start-of-run timestamp embedded in artifact names.
pub fn run_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%Y-%m-%d-%H-%M-%S").to_string()
}

/// `best_model_{artifact}_{accuracy:.3}_{started_at}.json`
pub fn checkpoint_file_name(artifact: &str, accuracy: f64, started_at: &str) -> String {
    format!("best_model_{}_{:.3}_{}.json", artifact, accuracy, started_at)
}

/// Files written by [`RunReporter::report`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub checkpoint: PathBuf,
    /// Always the checkpoint path with `.png` appended.
    pub plot: PathBuf,
}

/// Persists the best snapshot and the curve plot of one run.
pub struct RunReporter {
    outdir: PathBuf,
    task: TaskKind,
    started_at: String,
}

impl RunReporter {
    pub fn new(outdir: impl Into<PathBuf>, task: TaskKind, started_at: impl Into<String>) -> Self {
        RunReporter { outdir: outdir.into(), task, started_at: started_at.into() }
    }

    pub fn outdir(&self) -> &Path {
        &self.outdir
    }

    /// Paths the artifacts of a snapshot with `accuracy` would be written to.
    pub fn paths_for(&self, accuracy: f64) -> ReportPaths {
        let name = checkpoint_file_name(self.task.artifact_name(), accuracy, &self.started_at);
        let checkpoint = self.outdir.join(&name);
        let plot = self.outdir.join(format!("{}.png", name));
        ReportPaths { checkpoint, plot }
    }

    /// Writes the checkpoint and the plot, creating the output directory.
    ///
    /// A run that never produced a snapshot has nothing to persist and is
    /// reported as an error.
    pub fn report(&self, best: Option<&Snapshot<NetworkState>>, history: &CurveHistory) -> Result<ReportPaths> {
        let best = best.ok_or_else(|| {
            TrainError::report(format!(
                "no best snapshot to persist after {} evaluations; the run ended before its first evaluation",
                history.len()
            ))
        })?;

        std::fs::create_dir_all(&self.outdir).map_err(|e| {
            TrainError::report(format!("cannot create output directory {}: {}", self.outdir.display(), e))
        })?;

        let paths = self.paths_for(best.accuracy);
        best.state.save_json(&paths.checkpoint)?;
        info!(path = %paths.checkpoint.display(), accuracy = best.accuracy, step = best.step, "saved best model");

        render_curves(history, &paths.plot)?;
        info!(path = %paths.plot.display(), evaluations = history.len(), "saved curve plot");
        Ok(paths)
    }
}
