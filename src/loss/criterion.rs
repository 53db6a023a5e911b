/// A differentiable per-example loss `(output, target) → scalar`.
pub trait Criterion {
    fn loss(&self, predicted: &[f64], expected: &[f64]) -> f64;

    /// `∂loss/∂predicted` for one example.
    fn gradient(&self, predicted: &[f64], expected: &[f64]) -> Vec<f64>;

    /// Mean per-example loss over a batch of outputs.
    fn batch_loss(&self, predicted: &[Vec<f64>], expected: &[Vec<f64>]) -> f64 {
        if predicted.is_empty() {
            return 0.0;
        }
        let total: f64 = predicted.iter().zip(expected)
            .map(|(p, e)| self.loss(p, e))
            .sum();
        total / predicted.len() as f64
    }
}
