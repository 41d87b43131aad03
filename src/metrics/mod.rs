//! Online evaluation metrics.
//!
//! Metrics are updated one `(y_true, y_pred)` pair at a time and can be
//! queried at any point of the stream.

use crate::error::PipelineError;
use crate::features::{Label, Output};
use crate::stats::{Mean, Univariate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A metric updated one sample at a time.
pub trait Metric {
    /// Incorporates one ground truth and the matching pipeline output.
    fn update(&mut self, y_true: &Label, y_pred: &Output) -> Result<(), PipelineError>;

    /// Current value.
    fn get(&self) -> f64;

    fn name(&self) -> &'static str;

    /// Whether larger values mean a better model.
    fn bigger_is_better(&self) -> bool {
        false
    }

    /// One-line summary such as `MAE: 1.234567`.
    fn report(&self) -> String {
        format!("{}: {:.6}", self.name(), self.get())
    }
}

fn regression_pair(
    metric: &'static str,
    y_true: &Label,
    y_pred: &Output,
) -> Result<(f64, f64), PipelineError> {
    let t = y_true.as_numeric().ok_or_else(|| PipelineError::InvalidLabel {
        expected: "numeric label",
        got: y_true.kind(),
    })?;
    let p = y_pred
        .as_value()
        .ok_or_else(|| PipelineError::UnsupportedOperation {
            stage: metric.to_string(),
            operation: "score a non-numeric prediction",
        })?;
    Ok((t, p))
}

/// Mean absolute error.
///
/// `MAE = mean(|y_true - y_pred|)`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MAE {
    mean: Mean,
}

impl MAE {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Metric for MAE {
    fn update(&mut self, y_true: &Label, y_pred: &Output) -> Result<(), PipelineError> {
        let (t, p) = regression_pair(self.name(), y_true, y_pred)?;
        self.mean.update((t - p).abs());
        Ok(())
    }

    fn get(&self) -> f64 {
        self.mean.get()
    }

    fn name(&self) -> &'static str {
        "MAE"
    }
}

/// Mean squared error.
///
/// `MSE = mean((y_true - y_pred)^2)`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MSE {
    mean: Mean,
}

impl MSE {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Metric for MSE {
    fn update(&mut self, y_true: &Label, y_pred: &Output) -> Result<(), PipelineError> {
        let (t, p) = regression_pair(self.name(), y_true, y_pred)?;
        self.mean.update((t - p).powi(2));
        Ok(())
    }

    fn get(&self) -> f64 {
        self.mean.get()
    }

    fn name(&self) -> &'static str {
        "MSE"
    }
}

/// Root mean squared error, in the units of the target.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RMSE {
    mse: MSE,
}

impl RMSE {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Metric for RMSE {
    fn update(&mut self, y_true: &Label, y_pred: &Output) -> Result<(), PipelineError> {
        self.mse.update(y_true, y_pred)
    }

    fn get(&self) -> f64 {
        self.mse.get().sqrt()
    }

    fn name(&self) -> &'static str {
        "RMSE"
    }
}

/// Share of correctly predicted classes.
///
/// A classifier that has not seen any class yet predicts nothing, which
/// counts as a miss.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Accuracy {
    mean: Mean,
}

impl Accuracy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Metric for Accuracy {
    fn update(&mut self, y_true: &Label, y_pred: &Output) -> Result<(), PipelineError> {
        let t = y_true.as_class().ok_or_else(|| PipelineError::InvalidLabel {
            expected: "class label",
            got: y_true.kind(),
        })?;
        let hit = match y_pred {
            Output::Class(p) => p.as_ref() == Some(t),
            _ => {
                return Err(PipelineError::UnsupportedOperation {
                    stage: self.name().to_string(),
                    operation: "score a non-class prediction",
                })
            }
        };
        self.mean.update(if hit { 1.0 } else { 0.0 });
        Ok(())
    }

    fn get(&self) -> f64 {
        self.mean.get()
    }

    fn name(&self) -> &'static str {
        "Accuracy"
    }

    fn bigger_is_better(&self) -> bool {
        true
    }
}

impl fmt::Display for MAE {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.report())
    }
}

impl fmt::Display for MSE {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.report())
    }
}

impl fmt::Display for RMSE {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.report())
    }
}

impl fmt::Display for Accuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.report())
    }
}
