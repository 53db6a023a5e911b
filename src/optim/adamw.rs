use crate::network::model::Param;
use crate::optim::optimizer::Optimizer;

/// Adam with decoupled weight decay.
pub struct AdamW {
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
    pub weight_decay: f64,
    step_count: u64,
    // First and second moment estimates, one pair per parameter tensor.
    moments: Vec<(Vec<f64>, Vec<f64>)>,
}

impl AdamW {
    pub fn new(learning_rate: f64) -> AdamW {
        AdamW {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            weight_decay: 0.01,
            step_count: 0,
            moments: Vec::new(),
        }
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }
}

impl Optimizer for AdamW {
    fn step(&mut self, params: Vec<Param<'_>>) {
        if self.moments.is_empty() {
            self.moments = params.iter()
                .map(|p| {
                    let n = p.value.data.len();
                    (vec![0.0; n], vec![0.0; n])
                })
                .collect();
        }
        assert_eq!(self.moments.len(), params.len(), "parameter set changed between steps");

        self.step_count += 1;
        let lr = self.learning_rate;
        let t = self.step_count as f64;
        let bias1 = 1.0 - self.beta1.powf(t);
        let bias2 = 1.0 - self.beta2.powf(t);

        for (param, (m, v)) in params.into_iter().zip(self.moments.iter_mut()) {
            let grads = &param.grad.data;
            for (i, w) in param.value.data.iter_mut().enumerate() {
                let g = grads[i];
                m[i] = self.beta1 * m[i] + (1.0 - self.beta1) * g;
                v[i] = self.beta2 * v[i] + (1.0 - self.beta2) * g * g;

                let m_hat = m[i] / bias1;
                let v_hat = v[i] / bias2;

                *w *= 1.0 - lr * self.weight_decay;
                *w -= lr * m_hat / (v_hat.sqrt() + self.epsilon);
            }
        }
    }

    fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    fn set_learning_rate(&mut self, lr: f64) {
        self.learning_rate = lr;
    }

    fn momentum(&self) -> f64 {
        self.beta1
    }

    fn set_momentum(&mut self, momentum: f64) {
        self.beta1 = momentum;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::matrix::Matrix;

    #[test]
    fn first_step_moves_by_learning_rate() {
        // With bias correction the first update is lr · sign(g).
        let mut value = Matrix::from_vec(1, 2, vec![1.0, -1.0]);
        let grad = Matrix::from_vec(1, 2, vec![0.3, -0.2]);
        let mut opt = AdamW::new(0.01);
        opt.weight_decay = 0.0;

        opt.step(vec![Param { value: &mut value, grad: &grad }]);

        assert!((value.data[0] - 0.99).abs() < 1e-6);
        assert!((value.data[1] + 0.99).abs() < 1e-6);
        assert_eq!(opt.step_count(), 1);
    }

    #[test]
    fn weight_decay_shrinks_with_zero_gradient() {
        let mut value = Matrix::from_vec(1, 1, vec![2.0]);
        let grad = Matrix::zeros(1, 1);
        let mut opt = AdamW::new(0.1);

        opt.step(vec![Param { value: &mut value, grad: &grad }]);

        // 2 · (1 - 0.1 · 0.01)
        assert!((value.data[0] - 1.998).abs() < 1e-9);
    }

    #[test]
    fn step_count_past_i32_range() {
        let mut value = Matrix::from_vec(1, 1, vec![1.0]);
        let grad = Matrix::from_vec(1, 1, vec![0.5]);
        let mut opt = AdamW::new(0.01);
        opt.step_count = i32::MAX as u64;

        opt.step(vec![Param { value: &mut value, grad: &grad }]);

        assert_eq!(opt.step_count(), i32::MAX as u64 + 1);
        assert!(value.data[0].is_finite());
        assert!(value.data[0] < 1.0);
    }
}
