//! Differentiable loss functions for online model updates.
//!
//! A loss is evaluated on a single `(y_true, y_pred)` pair. Models only need
//! the gradient w.r.t. the prediction; the loss value itself is used for
//! logging and metrics.

use serde::{Deserialize, Serialize};

/// A loss on one sample.
pub trait Loss {
    /// Loss value for one sample.
    fn loss(&self, y_true: f64, y_pred: f64) -> f64;

    /// Gradient of the loss w.r.t. the prediction: ∂L/∂y_pred.
    fn gradient(&self, y_true: f64, y_pred: f64) -> f64;
}

/// Squared error: `L = (y_pred - y_true)^2`
///
/// Gradient w.r.t. prediction: `2 * (y_pred - y_true)`
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Squared;

impl Loss for Squared {
    fn loss(&self, y_true: f64, y_pred: f64) -> f64 {
        (y_pred - y_true).powi(2)
    }

    fn gradient(&self, y_true: f64, y_pred: f64) -> f64 {
        2.0 * (y_pred - y_true)
    }
}

/// Absolute error: `L = |y_pred - y_true|`
///
/// Gradient w.r.t. prediction: `sign(y_pred - y_true)` (subgradient `0` at zero).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Absolute;

impl Loss for Absolute {
    fn loss(&self, y_true: f64, y_pred: f64) -> f64 {
        (y_pred - y_true).abs()
    }

    fn gradient(&self, y_true: f64, y_pred: f64) -> f64 {
        let diff = y_pred - y_true;
        if diff > 0.0 {
            1.0
        } else if diff < 0.0 {
            -1.0
        } else {
            0.0
        }
    }
}

/// Huber loss: quadratic within `epsilon` of the target, linear outside.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Huber {
    pub epsilon: f64,
}

impl Default for Huber {
    fn default() -> Self {
        Self { epsilon: 0.1 }
    }
}

impl Loss for Huber {
    fn loss(&self, y_true: f64, y_pred: f64) -> f64 {
        let r = (y_pred - y_true).abs();
        if r <= self.epsilon {
            0.5 * r * r
        } else {
            self.epsilon * (r - 0.5 * self.epsilon)
        }
    }

    fn gradient(&self, y_true: f64, y_pred: f64) -> f64 {
        let r = y_pred - y_true;
        if r.abs() <= self.epsilon {
            r
        } else {
            self.epsilon * r.signum()
        }
    }
}

/// Binary cross-entropy on logits (numerically stable).
///
/// `y_true` is `0` or `1` and `y_pred` is the raw score `z`:
/// `L = max(z, 0) - z * t + log(1 + exp(-|z|))`
///
/// Gradient w.r.t. the logit: `σ(z) - t`
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Log;

impl Loss for Log {
    fn loss(&self, y_true: f64, y_pred: f64) -> f64 {
        y_pred.max(0.0) - y_pred * y_true + (-y_pred.abs()).exp().ln_1p()
    }

    fn gradient(&self, y_true: f64, y_pred: f64) -> f64 {
        sigmoid(y_pred) - y_true
    }
}

/// Logistic function, clamped to avoid overflow in `exp`.
pub fn sigmoid(z: f64) -> f64 {
    let z = z.clamp(-500.0, 500.0);
    1.0 / (1.0 + (-z).exp())
}

/// Regression loss selectable from configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum RegressionLoss {
    #[default]
    Squared,
    Absolute,
    Huber { epsilon: f64 },
}

impl Loss for RegressionLoss {
    fn loss(&self, y_true: f64, y_pred: f64) -> f64 {
        match *self {
            RegressionLoss::Squared => Squared.loss(y_true, y_pred),
            RegressionLoss::Absolute => Absolute.loss(y_true, y_pred),
            RegressionLoss::Huber { epsilon } => Huber { epsilon }.loss(y_true, y_pred),
        }
    }

    fn gradient(&self, y_true: f64, y_pred: f64) -> f64 {
        match *self {
            RegressionLoss::Squared => Squared.gradient(y_true, y_pred),
            RegressionLoss::Absolute => Absolute.gradient(y_true, y_pred),
            RegressionLoss::Huber { epsilon } => Huber { epsilon }.gradient(y_true, y_pred),
        }
    }
}

/// Binary classification loss selectable from configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum BinaryLoss {
    #[default]
    Log,
}

impl Loss for BinaryLoss {
    fn loss(&self, y_true: f64, y_pred: f64) -> f64 {
        match self {
            BinaryLoss::Log => Log.loss(y_true, y_pred),
        }
    }

    fn gradient(&self, y_true: f64, y_pred: f64) -> f64 {
        match self {
            BinaryLoss::Log => Log.gradient(y_true, y_pred),
        }
    }
}
