use crate::network::model::Param;
use crate::optim::optimizer::Optimizer;

/// Stochastic gradient descent with heavy-ball momentum.
pub struct Sgd {
    pub learning_rate: f64,
    pub momentum: f64,
    velocity: Vec<Vec<f64>>,
}

impl Sgd {
    pub fn new(learning_rate: f64, momentum: f64) -> Sgd {
        Sgd { learning_rate, momentum, velocity: Vec::new() }
    }
}

impl Optimizer for Sgd {
    fn step(&mut self, params: Vec<Param<'_>>) {
        let first_step = self.velocity.is_empty();
        if first_step {
            self.velocity = params.iter().map(|p| vec![0.0; p.value.data.len()]).collect();
        }
        assert_eq!(self.velocity.len(), params.len(), "parameter set changed between steps");

        for (param, buf) in params.into_iter().zip(self.velocity.iter_mut()) {
            for ((w, &g), v) in param.value.data.iter_mut().zip(&param.grad.data).zip(buf.iter_mut()) {
                // The first step seeds the buffer with the raw gradient.
                *v = if first_step { g } else { self.momentum * *v + g };
                *w -= self.learning_rate * *v;
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
        self.momentum
    }

    fn set_momentum(&mut self, momentum: f64) {
        self.momentum = momentum;
    }
}
