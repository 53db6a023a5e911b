use crate::error::Result;
use crate::math::matrix::Matrix;

/// A trainable parameter tensor paired with its accumulated gradient.
pub struct Param<'a> {
    pub value: &'a mut Matrix,
    pub grad: &'a Matrix,
}

/// The narrow interface the training engine needs from a model.
///
/// The engine never looks inside a model. It only switches modes, runs
/// forward/backward passes, hands parameters to an optimizer and takes
/// value snapshots.
pub trait Model {
    /// Owned copy of every parameter value. Capturing one must never alias
    /// the live model.
    type State: Clone;

    /// Forward pass that records whatever `backward` needs.
    fn forward(&mut self, input: &[f64]) -> Vec<f64>;

    /// Forward pass with no recorded state and frozen-mode behaviour.
    fn infer(&self, input: &[f64]) -> Vec<f64>;

    /// Accumulates parameter gradients for the last `forward` call.
    fn backward(&mut self, grad_output: &[f64]);

    fn zero_grad(&mut self);

    /// Parameters in a stable order, so optimizers can key state by index.
    fn parameters(&mut self) -> Vec<Param<'_>>;

    fn is_training(&self) -> bool;

    fn set_training(&mut self, training: bool);

    fn snapshot(&self) -> Self::State;

    fn restore(&mut self, state: &Self::State) -> Result<()>;
}
