use crate::loss::criterion::Criterion;

pub struct HuberLoss;

// Fixed δ = 1.0 keeps `LossType::Huber` a unit variant.
const DELTA: f64 = 1.0;

impl Criterion for HuberLoss {
    /// Scalar Huber: mean(h(predicted − expected))
    /// where h(x) = 0.5·x²  if |x| ≤ δ
    ///              δ·(|x| − 0.5·δ)  otherwise
    fn loss(&self, predicted: &[f64], expected: &[f64]) -> f64 {
        let n = predicted.len() as f64;
        predicted.iter().zip(expected.iter())
            .map(|(p, y)| {
                let x = p - y;
                if x.abs() <= DELTA {
                    0.5 * x * x
                } else {
                    DELTA * (x.abs() - 0.5 * DELTA)
                }
            })
            .sum::<f64>() / n
    }

    /// Per-output gradient: x/n  if |x| ≤ δ,  else δ·sign(x)/n
    fn gradient(&self, predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        let n = predicted.len() as f64;
        predicted.iter().zip(expected.iter())
            .map(|(p, y)| {
                let x = p - y;
                let g = if x.abs() <= DELTA { x } else { DELTA * x.signum() };
                g / n
            })
            .collect()
    }
}
