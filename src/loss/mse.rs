use crate::loss::criterion::Criterion;

pub struct MseLoss;

impl Criterion for MseLoss {
    /// Scalar MSE: mean((predicted - expected)²)
    fn loss(&self, predicted: &[f64], expected: &[f64]) -> f64 {
        let n = predicted.len() as f64;
        predicted.iter().zip(expected.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>() / n
    }

    /// Per-output gradient: 2·(predicted - expected) / n
    fn gradient(&self, predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        let n = predicted.len() as f64;
        predicted.iter().zip(expected.iter())
            .map(|(a, b)| 2.0 * (a - b) / n)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mse_of_known_vectors() {
        let loss = MseLoss.loss(&[1.0, 3.0], &[0.0, 1.0]);
        assert!((loss - 2.5).abs() < 1e-12);
        assert_eq!(MseLoss.gradient(&[1.0, 3.0], &[0.0, 1.0]), vec![1.0, 2.0]);
    }

    #[test]
    fn batch_loss_is_mean_of_examples() {
        let p = vec![vec![1.0], vec![0.0]];
        let e = vec![vec![0.0], vec![0.0]];
        assert!((MseLoss.batch_loss(&p, &e) - 0.5).abs() < 1e-12);
    }
}
