//! Optimizers for online parameter updates.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sparse weights keyed by feature name.
pub type Weights = BTreeMap<String, f64>;

/// Trait for gradient-based optimizers.
///
/// Optimizers are responsible for updating model parameters from computed
/// gradients; models compute the gradients and never apply them directly.
pub trait Optimizer {
    /// Performs an optimization step and returns the updated weights.
    ///
    /// Weights without a gradient are carried over unchanged; gradients for
    /// unknown weights start from `0`.
    fn step(&self, params: &Weights, gradients: &Weights) -> Weights;
}

/// Stochastic Gradient Descent (SGD) optimizer.
///
/// ```text
/// θ ← θ - η · ∇L(θ)
/// ```
/// where `η` is the learning rate.
///
/// # Example
/// ```
/// use streamlearn::optimizer::{Optimizer, Weights, SGD};
///
/// let sgd = SGD::new(0.5);
/// let params = Weights::from([("x".to_string(), 1.0)]);
/// let grads = Weights::from([("x".to_string(), 2.0)]);
/// assert_eq!(sgd.step(&params, &grads)["x"], 0.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SGD {
    lr: f64,
}

impl SGD {
    /// Creates a new SGD optimizer with the specified learning rate.
    pub fn new(lr: f64) -> Self {
        Self { lr }
    }

    /// Returns the current learning rate.
    pub fn learning_rate(&self) -> f64 {
        self.lr
    }
}

impl Optimizer for SGD {
    fn step(&self, params: &Weights, gradients: &Weights) -> Weights {
        let mut updated = params.clone();
        for (name, grad) in gradients {
            *updated.entry(name.clone()).or_insert(0.0) -= self.lr * grad;
        }
        updated
    }
}
