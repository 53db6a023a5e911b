use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::fen::{FenDecoder, BOARD_TENSOR_LEN};
use crate::network::spec::NetworkSpec;
use crate::task::correctness::{Correctness, DecodedMatch, MarginMatch};

/// The two supervised problems the engine trains.
///
/// A task only contributes a correctness predicate, an output shape and a
/// default architecture; the training loop itself is shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Predicts whether a board image is drawn from white's (0) or black's (1) side.
    Orientation,
    /// Predicts the occupant of all 64 squares.
    Board,
}

impl TaskKind {
    /// Stem used in checkpoint file names.
    pub fn artifact_name(self) -> &'static str {
        match self {
            TaskKind::Orientation => "orientation",
            TaskKind::Board => "fen",
        }
    }

    pub fn output_size(self) -> usize {
        match self {
            TaskKind::Orientation => 1,
            TaskKind::Board => BOARD_TENSOR_LEN,
        }
    }

    pub fn correctness(self) -> Box<dyn Correctness> {
        match self {
            TaskKind::Orientation => Box::new(MarginMatch::default()),
            TaskKind::Board => Box::new(DecodedMatch { decoder: FenDecoder }),
        }
    }

    /// Architecture used when no spec file is configured.
    pub fn default_spec(self, input_size: usize) -> NetworkSpec {
        match self {
            TaskKind::Orientation => {
                NetworkSpec::mlp("orientation-mlp", input_size, &[(128, 0.1), (32, 0.0)], self.output_size())
            }
            TaskKind::Board => {
                NetworkSpec::mlp("board-mlp", input_size, &[(512, 0.1)], self.output_size())
            }
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Orientation => f.write_str("orientation"),
            TaskKind::Board => f.write_str("board"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_specs_fit_task_outputs() {
        for task in [TaskKind::Orientation, TaskKind::Board] {
            let spec = task.default_spec(64);
            assert!(spec.validate().is_ok());
            assert_eq!(spec.output_size(), Some(task.output_size()));
        }
    }

    #[test]
    fn artifact_names_follow_task() {
        assert_eq!(TaskKind::Orientation.artifact_name(), "orientation");
        assert_eq!(TaskKind::Board.artifact_name(), "fen");
    }
}
