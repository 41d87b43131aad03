//! Polynomial feature generation.
//!
//! Generates polynomial and interaction features from the numeric features of
//! a sample.

use crate::error::PipelineError;
use crate::features::{FeatureMap, FeatureValue};
use crate::stage::{impl_into_stage, Transformer};
use serde::{Deserialize, Serialize};

/// PolynomialExtender for generating polynomial and interaction features.
///
/// Generates all products of the numeric features with degree less than or
/// equal to the specified degree. For a sample `{a, b}` the degree-2 output
/// is `{a, b, a*a, a*b, b*b}`. Names of the factors are joined with `*` in
/// lexicographic order. Non-numeric features pass through unchanged.
///
/// The extender is stateless: the expansion only depends on the sample.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PolynomialExtender {
    /// Maximum degree of polynomial features.
    degree: usize,
    /// If true, only produce products of distinct features.
    interaction_only: bool,
    /// If true, include a constant `bias` feature equal to 1.
    include_bias: bool,
}

impl Default for PolynomialExtender {
    fn default() -> Self {
        Self::new()
    }
}

impl PolynomialExtender {
    /// Create a new PolynomialExtender with default settings (degree=2).
    pub fn new() -> Self {
        Self {
            degree: 2,
            interaction_only: false,
            include_bias: false,
        }
    }

    /// Set the maximum degree of polynomial features.
    pub fn with_degree(mut self, degree: usize) -> Result<Self, PipelineError> {
        if degree == 0 {
            return Err(PipelineError::InvalidParameter(
                "PolynomialExtender degree must be at least 1".to_string(),
            ));
        }
        self.degree = degree;
        Ok(self)
    }

    /// Set whether to only produce interaction features.
    pub fn with_interaction_only(mut self, interaction_only: bool) -> Self {
        self.interaction_only = interaction_only;
        self
    }

    /// Set whether to include a constant bias feature.
    pub fn with_include_bias(mut self, include_bias: bool) -> Self {
        self.include_bias = include_bias;
        self
    }

    /// Appends every index combination of length `1..=degree` starting at
    /// `start` to `out`.
    fn combinations(
        &self,
        n: usize,
        start: usize,
        current: &mut Vec<usize>,
        out: &mut Vec<Vec<usize>>,
    ) {
        if !current.is_empty() {
            out.push(current.clone());
        }
        if current.len() == self.degree {
            return;
        }
        for i in start..n {
            current.push(i);
            let next = if self.interaction_only { i + 1 } else { i };
            self.combinations(n, next, current, out);
            current.pop();
        }
    }
}

impl Transformer for PolynomialExtender {
    fn transform_one(&self, x: &FeatureMap) -> Result<FeatureMap, PipelineError> {
        let numeric: Vec<(&String, f64)> = x
            .iter()
            .filter_map(|(k, v)| v.as_number().map(|n| (k, n)))
            .collect();

        let mut combos = Vec::new();
        self.combinations(numeric.len(), 0, &mut Vec::new(), &mut combos);

        let mut out: FeatureMap = x
            .iter()
            .filter(|(_, v)| v.as_number().is_none())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        if self.include_bias {
            out.insert("bias".to_string(), FeatureValue::Number(1.0));
        }
        for combo in combos {
            let name = combo
                .iter()
                .map(|&i| numeric[i].0.as_str())
                .collect::<Vec<_>>()
                .join("*");
            let value = combo.iter().map(|&i| numeric[i].1).product();
            out.insert(name, FeatureValue::Number(value));
        }
        Ok(out)
    }
}

impl_into_stage!(Transformer: PolynomialExtender);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::features;

    #[test]
    fn test_polynomial_degree_2() {
        let poly = PolynomialExtender::new();
        let out = poly
            .transform_one(&features([("a", 2.0), ("b", 3.0)]))
            .unwrap();

        let keys: Vec<&str> = out.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "a*a", "a*b", "b", "b*b"]);
        assert_eq!(out["a*b"], FeatureValue::Number(6.0));
        assert_eq!(out["b*b"], FeatureValue::Number(9.0));
    }

    #[test]
    fn test_polynomial_interaction_only_with_bias() {
        let poly = PolynomialExtender::new()
            .with_interaction_only(true)
            .with_include_bias(true);
        let out = poly
            .transform_one(&features([("a", 2.0), ("b", 3.0)]))
            .unwrap();

        assert_eq!(out.len(), 4);
        assert_eq!(out["bias"], FeatureValue::Number(1.0));
        assert_eq!(out["a*b"], FeatureValue::Number(6.0));
        assert!(!out.contains_key("a*a"));
    }

    #[test]
    fn test_polynomial_degree_3_single_feature() {
        let poly = PolynomialExtender::new().with_degree(3).unwrap();
        let out = poly.transform_one(&features([("x", 2.0)])).unwrap();
        assert_eq!(out["x*x*x"], FeatureValue::Number(8.0));
    }

    #[test]
    fn test_polynomial_keeps_text() {
        let mut x = features([("a", 2.0)]);
        x.insert("city".to_string(), FeatureValue::from("Oslo"));
        let out = PolynomialExtender::new().transform_one(&x).unwrap();
        assert_eq!(out["city"], FeatureValue::from("Oslo"));
        assert_eq!(out["a*a"], FeatureValue::Number(4.0));
    }

    #[test]
    fn test_polynomial_invalid_degree() {
        assert!(matches!(
            PolynomialExtender::new().with_degree(0),
            Err(PipelineError::InvalidParameter(_))
        ));
    }
}
