//! Standard Scaler (online z-score normalization).
//!
//! Transforms features by removing the running mean and scaling to unit
//! variance:
//! ```text
//! z = (x - u) / s
//! ```
//! where `u` and `s` are the mean and population standard deviation of every
//! value seen so far for that feature.
//!
//! # Example
//! ```
//! use streamlearn::features::features;
//! use streamlearn::preprocessing::StandardScaler;
//! use streamlearn::stage::Transformer;
//!
//! let mut scaler = StandardScaler::new();
//! for v in [1.0, 2.0, 3.0] {
//!     scaler.learn_one(&features([("x", v)])).unwrap();
//! }
//! assert_eq!(scaler.means()["x"], 2.0);
//! ```

use crate::error::PipelineError;
use crate::features::{FeatureMap, FeatureValue};
use crate::preprocessing::safe_div;
use crate::stage::{impl_into_stage, Transformer};
use crate::stats::{Univariate, Var};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration for StandardScaler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandardScalerConfig {
    /// If true, scale the data to unit variance. Otherwise only centre it.
    pub with_std: bool,
}

impl Default for StandardScalerConfig {
    fn default() -> Self {
        Self { with_std: true }
    }
}

/// Online StandardScaler.
///
/// Numeric features are scaled; every other feature passes through
/// unchanged. A numeric feature never seen during learning scales to `0`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StandardScaler {
    config: StandardScalerConfig,
    vars: BTreeMap<String, Var>,
}

impl StandardScaler {
    /// Create a new StandardScaler with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: StandardScalerConfig) -> Self {
        Self {
            config,
            vars: BTreeMap::new(),
        }
    }

    /// Set whether to scale data to unit variance.
    pub fn with_std(mut self, with_std: bool) -> Self {
        self.config.with_std = with_std;
        self
    }

    pub fn config(&self) -> &StandardScalerConfig {
        &self.config
    }

    /// Running mean of every numeric feature seen so far.
    pub fn means(&self) -> BTreeMap<String, f64> {
        self.vars
            .iter()
            .map(|(k, v)| (k.clone(), v.mean()))
            .collect()
    }

    /// Running population variance of every numeric feature seen so far.
    pub fn variances(&self) -> BTreeMap<String, f64> {
        self.vars.iter().map(|(k, v)| (k.clone(), v.get())).collect()
    }

    /// Number of distinct numeric features seen.
    pub fn n_features(&self) -> usize {
        self.vars.len()
    }
}

impl Transformer for StandardScaler {
    fn learn_one(&mut self, x: &FeatureMap) -> Result<(), PipelineError> {
        for (name, value) in x {
            if let Some(v) = value.as_number() {
                self.vars
                    .entry(name.clone())
                    .or_insert_with(|| Var::new(0))
                    .update(v);
            }
        }
        Ok(())
    }

    fn transform_one(&self, x: &FeatureMap) -> Result<FeatureMap, PipelineError> {
        let scaled = x
            .iter()
            .map(|(name, value)| {
                let out = match value.as_number() {
                    Some(v) => {
                        let (mean, var) = self
                            .vars
                            .get(name)
                            .map(|s| (s.mean(), s.get()))
                            .unwrap_or((0.0, 0.0));
                        let centred = v - mean;
                        let z = if self.config.with_std {
                            safe_div(centred, var.sqrt())
                        } else {
                            centred
                        };
                        FeatureValue::Number(z)
                    }
                    None => value.clone(),
                };
                (name.clone(), out)
            })
            .collect();
        Ok(scaled)
    }
}

impl_into_stage!(Transformer: StandardScaler);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::features;

    fn fitted(values: &[f64]) -> StandardScaler {
        let mut scaler = StandardScaler::new();
        for &v in values {
            scaler.learn_one(&features([("x", v)])).unwrap();
        }
        scaler
    }

    #[test]
    fn test_standard_scaler_running_mean() {
        let scaler = fitted(&[0.0, 0.0, 1.0]);
        let mean = scaler.means()["x"];
        assert!((mean - 1.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_standard_scaler_transform() {
        let scaler = fitted(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        // mean 5, population std 2
        let out = scaler.transform_one(&features([("x", 9.0)])).unwrap();
        assert!((out["x"].as_number().unwrap() - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_standard_scaler_constant_feature() {
        let scaler = fitted(&[5.0, 5.0, 5.0]);
        let out = scaler.transform_one(&features([("x", 5.0)])).unwrap();
        assert_eq!(out["x"], FeatureValue::Number(0.0));
    }

    #[test]
    fn test_standard_scaler_without_std() {
        let mut scaler = StandardScaler::new().with_std(false);
        scaler.learn_one(&features([("x", 1.0)])).unwrap();
        scaler.learn_one(&features([("x", 3.0)])).unwrap();
        let out = scaler.transform_one(&features([("x", 10.0)])).unwrap();
        assert_eq!(out["x"], FeatureValue::Number(8.0));
    }

    #[test]
    fn test_standard_scaler_passes_text_through() {
        let scaler = fitted(&[1.0, 2.0]);
        let mut x = features([("x", 1.0)]);
        x.insert("city".to_string(), FeatureValue::from("Paris"));
        let out = scaler.transform_one(&x).unwrap();
        assert_eq!(out["city"], FeatureValue::from("Paris"));
        assert_eq!(scaler.n_features(), 1);
    }

    #[test]
    fn test_standard_scaler_unseen_feature() {
        let scaler = fitted(&[1.0, 2.0]);
        let out = scaler.transform_one(&features([("y", 42.0)])).unwrap();
        assert_eq!(out["y"], FeatureValue::Number(0.0));
    }

    #[test]
    fn test_standard_scaler_transform_does_not_learn() {
        let scaler = fitted(&[1.0]);
        scaler.transform_one(&features([("x", 100.0)])).unwrap();
        assert_eq!(scaler.means()["x"], 1.0);
    }

    #[test]
    fn test_standard_scaler_config_from_json() {
        let config: StandardScalerConfig = serde_json::from_str(r#"{"with_std": false}"#).unwrap();
        let scaler = StandardScaler::from_config(config);
        assert!(!scaler.config().with_std);
    }
}
