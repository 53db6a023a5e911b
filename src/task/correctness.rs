//! Per-example correctness predicates used by the evaluator.

use crate::board::fen::Decoder;
use crate::error::{Result, TrainError};

/// Decides whether one model output matches its target closely enough to
/// count as correct.
pub trait Correctness {
    fn is_correct(&self, output: &[f64], target: &[f64]) -> Result<bool>;
}

/// Correct iff every element satisfies `|output - target| < margin`.
#[derive(Debug, Clone, Copy)]
pub struct MarginMatch {
    pub margin: f64,
}

impl Default for MarginMatch {
    fn default() -> Self {
        MarginMatch { margin: 0.5 }
    }
}

impl Correctness for MarginMatch {
    fn is_correct(&self, output: &[f64], target: &[f64]) -> Result<bool> {
        if output.len() != target.len() {
            return Err(TrainError::model(format!(
                "output has {} values but target has {}", output.len(), target.len()
            )));
        }
        Ok(output.iter().zip(target).all(|(o, t)| (o - t).abs() < self.margin))
    }
}

/// Correct iff the decoded output equals the decoded target exactly.
/// There is no partial credit for individual squares.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodedMatch<D> {
    pub decoder: D,
}

impl<D: Decoder> Correctness for DecodedMatch<D> {
    fn is_correct(&self, output: &[f64], target: &[f64]) -> Result<bool> {
        Ok(self.decoder.decode(output)? == self.decoder.decode(target)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::fen::{encode_placement, FenDecoder, SQUARE_CLASSES};

    #[test]
    fn margin_rule_on_orientation_scores() {
        let rule = MarginMatch::default();
        assert!(rule.is_correct(&[0.3], &[0.0]).unwrap());
        assert!(!rule.is_correct(&[0.7], &[0.0]).unwrap());
        assert!(!rule.is_correct(&[0.5], &[0.0]).unwrap());
        assert!(rule.is_correct(&[0.9], &[1.0]).unwrap());
    }

    #[test]
    fn margin_rule_rejects_shape_mismatch() {
        assert!(MarginMatch::default().is_correct(&[0.1, 0.2], &[0.0]).is_err());
    }

    #[test]
    fn one_wrong_square_is_never_correct() {
        let rule = DecodedMatch { decoder: FenDecoder };
        let target = encode_placement("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR").unwrap();
        assert!(rule.is_correct(&target, &target).unwrap());

        // Swap the occupant of e2 (rank 2 row index 6, file 4) from P to empty.
        let mut output = target.clone();
        let e2 = (6 * 8 + 4) * SQUARE_CLASSES.len();
        output[e2 + 1] = 0.0;
        output[e2] = 1.0;
        assert!(!rule.is_correct(&output, &target).unwrap());
    }

    #[test]
    fn soft_outputs_match_when_argmax_agrees() {
        let rule = DecodedMatch { decoder: FenDecoder };
        let target = encode_placement("8/8/8/4k3/8/8/8/4K3").unwrap();
        let output: Vec<f64> = target.iter().map(|&v| 0.2 + 0.6 * v).collect();
        assert!(rule.is_correct(&output, &target).unwrap());
    }
}
