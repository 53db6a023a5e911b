use rand::Rng;

use crate::{activation::activation::ActivationFunction, math::matrix::Matrix};

/// Fully connected layer `a = σ(x · W + b)` with optional inverted dropout.
///
/// Gradients accumulate across calls to [`Layer::backward`] until
/// [`Layer::zero_grad`] is called, so a mini-batch is processed one sample
/// at a time.
#[derive(Debug, Clone)]
pub struct Layer {
    pub size: usize,
    pub input_size: usize,
    pub weights: Matrix,
    pub biases: Matrix,
    pub weights_grad: Matrix,
    pub biases_grad: Matrix,
    pub activator: ActivationFunction,
    /// Probability of zeroing an output unit in trainable mode.
    pub dropout: f64,
    input: Vec<f64>,
    pre_activation: Vec<f64>,
    // Per-unit scale: 0 for dropped units, 1/(1-p) for kept ones.
    mask: Option<Vec<f64>>,
}

impl Layer {
    pub fn new<R: Rng + ?Sized>(
        size: usize,
        input_size: usize,
        activation: ActivationFunction,
        dropout: f64,
        rng: &mut R,
    ) -> Layer {
        let weights = if activation.prefers_he_init() {
            Matrix::he(input_size, size, rng)
        } else {
            Matrix::xavier(input_size, size, rng)
        };
        Layer {
            size,
            input_size,
            weights_grad: Matrix::zeros_like(&weights),
            weights,
            biases: Matrix::zeros(1, size),
            biases_grad: Matrix::zeros(1, size),
            activator: activation,
            dropout,
            input: Vec::new(),
            pre_activation: Vec::new(),
            mask: None,
        }
    }

    fn affine(&self, input: &[f64]) -> Vec<f64> {
        let mut z = self.weights.left_mul(input);
        for (zi, b) in z.iter_mut().zip(&self.biases.data) {
            *zi += b;
        }
        z
    }

    /// Pure forward pass: no caching, no dropout.
    pub fn infer(&self, input: &[f64]) -> Vec<f64> {
        self.affine(input).into_iter().map(|z| self.activator.function(z)).collect()
    }

    /// Forward pass that caches what `backward` needs. Dropout is applied
    /// only when an RNG is supplied, which the network does in trainable mode.
    pub fn forward<R: Rng + ?Sized>(&mut self, input: &[f64], rng: Option<&mut R>) -> Vec<f64> {
        let z = self.affine(input);
        let mut a: Vec<f64> = z.iter().map(|&x| self.activator.function(x)).collect();

        self.mask = match rng {
            Some(rng) if self.dropout > 0.0 => {
                let keep = 1.0 - self.dropout;
                let mask: Vec<f64> = (0..self.size)
                    .map(|_| if rng.gen::<f64>() < keep { 1.0 / keep } else { 0.0 })
                    .collect();
                for (ai, m) in a.iter_mut().zip(&mask) {
                    *ai *= m;
                }
                Some(mask)
            }
            _ => None,
        };

        self.input = input.to_vec();
        self.pre_activation = z;
        a
    }

    /// Accumulates parameter gradients for the last `forward` call and
    /// returns `∂L/∂x` for the previous layer.
    ///
    /// `grad_output` is `∂L/∂a` for this layer's output.
    pub fn backward(&mut self, grad_output: &[f64]) -> Vec<f64> {
        assert_eq!(grad_output.len(), self.size, "gradient length does not match layer size");
        assert_eq!(self.pre_activation.len(), self.size, "backward called before forward");

        // δ = ∂L/∂a ⊙ mask ⊙ σ'(z)
        let delta: Vec<f64> = grad_output
            .iter()
            .enumerate()
            .map(|(j, g)| {
                let m = self.mask.as_ref().map_or(1.0, |mask| mask[j]);
                g * m * self.activator.derivative(self.pre_activation[j])
            })
            .collect();

        self.weights_grad.add_outer(&self.input, &delta);
        self.biases_grad.add_assign_slice(&delta);

        self.weights.mul_transposed(&delta)
    }

    pub fn zero_grad(&mut self) {
        self.weights_grad.fill(0.0);
        self.biases_grad.fill(0.0);
    }
}
