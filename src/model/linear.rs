//! Linear models trained with online stochastic gradient descent.

use crate::error::PipelineError;
use crate::features::{ClassLabel, ClassProba, FeatureMap, FeatureValue};
use crate::loss::{sigmoid, BinaryLoss, Loss, RegressionLoss};
use crate::optimizer::{Optimizer, Weights, SGD};
use crate::stage::{impl_into_stage, Classifier, Regressor};
use serde::{Deserialize, Serialize};

/// Weights and intercept of a linear model.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearParams {
    pub weights: Weights,
    pub intercept: f64,
}

impl LinearParams {
    /// Raw score `w·x + b`. Features without a weight contribute nothing.
    pub fn decision(&self, x: &FeatureMap) -> Result<f64, PipelineError> {
        let mut z = self.intercept;
        for (name, value) in x {
            let v = numeric(name, value)?;
            z += self.weights.get(name).copied().unwrap_or(0.0) * v;
        }
        Ok(z)
    }

    /// Applies one SGD step given the loss gradient w.r.t. the raw score.
    fn update(
        &mut self,
        x: &FeatureMap,
        g: f64,
        l2: f64,
        optimizer: &SGD,
        intercept_lr: f64,
    ) -> Result<(), PipelineError> {
        let mut gradients = Weights::new();
        for (name, value) in x {
            let v = numeric(name, value)?;
            let w = self.weights.get(name).copied().unwrap_or(0.0);
            gradients.insert(name.clone(), g * v + l2 * w);
        }
        self.weights = optimizer.step(&self.weights, &gradients);
        self.intercept -= intercept_lr * g;
        Ok(())
    }
}

fn numeric(name: &str, value: &FeatureValue) -> Result<f64, PipelineError> {
    value
        .to_numeric()
        .ok_or_else(|| PipelineError::NonNumericFeature(name.to_string()))
}

/// Bounds `g` to `[-bound, bound]`. A bound that is not a positive number,
/// as can come out of a hand-edited saved model, disables clipping.
fn clip(g: f64, bound: f64) -> f64 {
    if bound > 0.0 {
        g.clamp(-bound, bound)
    } else {
        g
    }
}

fn check_rate(name: &str, value: f64, allow_zero: bool) -> Result<(), PipelineError> {
    let ok = value.is_finite() && (value > 0.0 || (allow_zero && value == 0.0));
    if ok {
        Ok(())
    } else {
        Err(PipelineError::InvalidParameter(format!(
            "{} must be {}, got {}",
            name,
            if allow_zero { ">= 0" } else { "> 0" },
            value
        )))
    }
}

/// Configuration for [`LinearRegression`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressionConfig {
    /// Step size for the weights.
    pub learning_rate: f64,
    /// Step size for the intercept; `0` freezes it.
    pub intercept_lr: f64,
    /// L2 penalty on the weights of the features present in a sample.
    pub l2: f64,
    pub loss: RegressionLoss,
    /// Absolute bound on the loss gradient.
    pub clip_gradient: f64,
}

impl Default for LinearRegressionConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            intercept_lr: 0.01,
            l2: 0.0,
            loss: RegressionLoss::Squared,
            clip_gradient: 1e12,
        }
    }
}

impl LinearRegressionConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        check_rate("learning_rate", self.learning_rate, false)?;
        check_rate("intercept_lr", self.intercept_lr, true)?;
        check_rate("l2", self.l2, true)?;
        check_rate("clip_gradient", self.clip_gradient, false)?;
        if let RegressionLoss::Huber { epsilon } = self.loss {
            check_rate("huber epsilon", epsilon, false)?;
        }
        Ok(())
    }
}

/// Online linear regression.
///
/// Each labelled sample triggers one SGD step on `y = w·x + b`:
///
/// ```text
/// g   = clip(∂L/∂ŷ)
/// w_i ← w_i - lr · (g · x_i + l2 · w_i)
/// b   ← b - intercept_lr · g
/// ```
///
/// # Example
/// ```
/// use streamlearn::features::features;
/// use streamlearn::model::LinearRegression;
/// use streamlearn::stage::Regressor;
///
/// let mut model = LinearRegression::new();
/// for _ in 0..200 {
///     model.learn_one(&features([("x", 1.0)]), 3.0).unwrap();
/// }
/// let y = model.predict_one(&features([("x", 1.0)])).unwrap();
/// assert!((y - 3.0).abs() < 0.1);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LinearRegression {
    config: LinearRegressionConfig,
    optimizer: SGD,
    params: LinearParams,
}

impl LinearRegression {
    /// Model with default hyperparameters.
    pub fn new() -> Self {
        let config = LinearRegressionConfig::default();
        Self {
            optimizer: SGD::new(config.learning_rate),
            config,
            params: LinearParams::default(),
        }
    }

    pub fn from_config(config: LinearRegressionConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self {
            optimizer: SGD::new(config.learning_rate),
            config,
            params: LinearParams::default(),
        })
    }

    pub fn config(&self) -> &LinearRegressionConfig {
        &self.config
    }

    pub fn params(&self) -> &LinearParams {
        &self.params
    }

    pub fn weights(&self) -> &Weights {
        &self.params.weights
    }

    pub fn intercept(&self) -> f64 {
        self.params.intercept
    }
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl Regressor for LinearRegression {
    fn learn_one(&mut self, x: &FeatureMap, y: f64) -> Result<(), PipelineError> {
        let y_pred = self.params.decision(x)?;
        let g = clip(self.config.loss.gradient(y, y_pred), self.config.clip_gradient);
        self.params.update(
            x,
            g,
            self.config.l2,
            &self.optimizer,
            self.config.intercept_lr,
        )
    }

    fn predict_one(&self, x: &FeatureMap) -> Result<f64, PipelineError> {
        self.params.decision(x)
    }
}

/// Configuration for [`LogisticRegression`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegressionConfig {
    pub learning_rate: f64,
    pub intercept_lr: f64,
    pub l2: f64,
    pub loss: BinaryLoss,
    /// Labels equal to this one are the positive class.
    pub positive_class: ClassLabel,
    pub clip_gradient: f64,
}

impl Default for LogisticRegressionConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            intercept_lr: 0.01,
            l2: 0.0,
            loss: BinaryLoss::Log,
            positive_class: ClassLabel::Bool(true),
            clip_gradient: 1e12,
        }
    }
}

impl LogisticRegressionConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        check_rate("learning_rate", self.learning_rate, false)?;
        check_rate("intercept_lr", self.intercept_lr, true)?;
        check_rate("l2", self.l2, true)?;
        check_rate("clip_gradient", self.clip_gradient, false)
    }
}

/// Online binary logistic regression.
///
/// Predicts `P(positive_class) = σ(w·x + b)`. The remaining mass goes to the
/// first other label seen while learning. With a boolean positive class the
/// opposite boolean is reported before any negative label arrives, so the
/// default model answers for both `Bool(false)` and `Bool(true)` from the
/// start.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogisticRegression {
    config: LogisticRegressionConfig,
    optimizer: SGD,
    params: LinearParams,
    #[serde(default)]
    negative_class: Option<ClassLabel>,
}

impl LogisticRegression {
    pub fn new() -> Self {
        let config = LogisticRegressionConfig::default();
        Self {
            optimizer: SGD::new(config.learning_rate),
            config,
            params: LinearParams::default(),
            negative_class: None,
        }
    }

    pub fn from_config(config: LogisticRegressionConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self {
            optimizer: SGD::new(config.learning_rate),
            config,
            params: LinearParams::default(),
            negative_class: None,
        })
    }

    pub fn config(&self) -> &LogisticRegressionConfig {
        &self.config
    }

    pub fn params(&self) -> &LinearParams {
        &self.params
    }

    pub fn weights(&self) -> &Weights {
        &self.params.weights
    }

    pub fn intercept(&self) -> f64 {
        self.params.intercept
    }

    /// Label that receives `1 - P(positive_class)`, if one is known yet.
    pub fn negative_label(&self) -> Option<ClassLabel> {
        match (&self.negative_class, &self.config.positive_class) {
            (Some(negative), _) => Some(negative.clone()),
            (None, ClassLabel::Bool(b)) => Some(ClassLabel::Bool(!b)),
            (None, _) => None,
        }
    }
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for LogisticRegression {
    fn learn_one(&mut self, x: &FeatureMap, y: &ClassLabel) -> Result<(), PipelineError> {
        let target = if *y == self.config.positive_class {
            1.0
        } else {
            if self.negative_class.is_none() {
                self.negative_class = Some(y.clone());
            }
            0.0
        };
        let z = self.params.decision(x)?;
        let g = clip(self.config.loss.gradient(target, z), self.config.clip_gradient);
        self.params.update(
            x,
            g,
            self.config.l2,
            &self.optimizer,
            self.config.intercept_lr,
        )
    }

    fn predict_proba_one(&self, x: &FeatureMap) -> Result<ClassProba, PipelineError> {
        let p = sigmoid(self.params.decision(x)?);
        let mut proba = ClassProba::new();
        if let Some(negative) = self.negative_label() {
            proba.insert(negative, 1.0 - p);
        }
        proba.insert(self.config.positive_class.clone(), p);
        Ok(proba)
    }
}

impl_into_stage!(Regressor: LinearRegression);
impl_into_stage!(Classifier: LogisticRegression);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::features;

    #[test]
    fn test_predict_before_learning_is_zero() {
        let model = LinearRegression::new();
        let y = model.predict_one(&features([("x", 5.0)])).unwrap();
        assert_eq!(y, 0.0);
        assert!(model.weights().is_empty());
    }

    #[test]
    fn test_single_sgd_step() {
        let mut model = LinearRegression::from_config(LinearRegressionConfig {
            learning_rate: 0.1,
            intercept_lr: 0.1,
            ..Default::default()
        })
        .unwrap();

        // y_pred = 0, g = 2 * (0 - 1) = -2
        model.learn_one(&features([("x", 2.0)]), 1.0).unwrap();

        assert!((model.weights()["x"] - 0.4).abs() < 1e-12);
        assert!((model.intercept() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_learns_linear_relation() {
        let mut model = LinearRegression::from_config(LinearRegressionConfig {
            learning_rate: 0.05,
            intercept_lr: 0.05,
            ..Default::default()
        })
        .unwrap();

        for i in 0..2000 {
            let x = (i % 10) as f64 / 10.0;
            model.learn_one(&features([("x", x)]), 2.0 * x + 1.0).unwrap();
        }

        let y = model.predict_one(&features([("x", 0.5)])).unwrap();
        assert!((y - 2.0).abs() < 0.05);
    }

    #[test]
    fn test_l2_shrinks_weights() {
        let config = LinearRegressionConfig {
            learning_rate: 0.05,
            ..Default::default()
        };
        let mut plain = LinearRegression::from_config(config.clone()).unwrap();
        let mut ridge = LinearRegression::from_config(LinearRegressionConfig {
            l2: 0.5,
            ..config
        })
        .unwrap();

        for _ in 0..200 {
            let x = features([("x", 1.0)]);
            plain.learn_one(&x, 4.0).unwrap();
            ridge.learn_one(&x, 4.0).unwrap();
        }
        assert!(ridge.weights()["x"] < plain.weights()["x"]);
    }

    #[test]
    fn test_huber_gradient_is_bounded() {
        let mut model = LinearRegression::from_config(LinearRegressionConfig {
            learning_rate: 1.0,
            intercept_lr: 0.0,
            loss: RegressionLoss::Huber { epsilon: 0.5 },
            ..Default::default()
        })
        .unwrap();

        model.learn_one(&features([("x", 1.0)]), 100.0).unwrap();
        assert_eq!(model.weights()["x"], 0.5);
        assert_eq!(model.intercept(), 0.0);
    }

    #[test]
    fn test_gradient_clipping() {
        let mut model = LinearRegression::from_config(LinearRegressionConfig {
            learning_rate: 1.0,
            clip_gradient: 1.0,
            ..Default::default()
        })
        .unwrap();

        model.learn_one(&features([("x", 1.0)]), 1000.0).unwrap();
        assert_eq!(model.weights()["x"], 1.0);
    }

    #[test]
    fn test_bool_feature_counts_as_number() {
        let mut model = LinearRegression::new();
        model.learn_one(&features([("flag", true)]), 1.0).unwrap();
        assert!(model.weights()["flag"] > 0.0);
    }

    #[test]
    fn test_text_feature_rejected() {
        let mut model = LinearRegression::new();
        let err = model
            .learn_one(&features([("city", "Paris")]), 1.0)
            .unwrap_err();
        assert!(matches!(err, PipelineError::NonNumericFeature(name) if name == "city"));
        assert!(model.weights().is_empty());
    }

    #[test]
    fn test_invalid_config() {
        let result = LinearRegression::from_config(LinearRegressionConfig {
            learning_rate: 0.0,
            ..Default::default()
        });
        assert!(matches!(result, Err(PipelineError::InvalidParameter(_))));

        let result = LogisticRegression::from_config(LogisticRegressionConfig {
            l2: -1.0,
            ..Default::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_logistic_untrained_is_uniform() {
        let model = LogisticRegression::new();
        let proba = model.predict_proba_one(&features([("x", 3.0)])).unwrap();
        assert_eq!(proba.len(), 2);
        assert_eq!(proba[&ClassLabel::Bool(true)], 0.5);
        assert_eq!(proba[&ClassLabel::Bool(false)], 0.5);
    }

    #[test]
    fn test_logistic_separates_classes() {
        let mut model = LogisticRegression::from_config(LogisticRegressionConfig {
            learning_rate: 0.5,
            ..Default::default()
        })
        .unwrap();

        for _ in 0..200 {
            model.learn_one(&features([("x", 1.0)]), &ClassLabel::Bool(true)).unwrap();
            model.learn_one(&features([("x", -1.0)]), &ClassLabel::Bool(false)).unwrap();
        }

        let pos = model.predict_proba_one(&features([("x", 1.0)])).unwrap();
        assert!(pos[&ClassLabel::Bool(true)] > 0.9);
        assert_eq!(
            model.predict_one(&features([("x", -1.0)])).unwrap(),
            Some(ClassLabel::Bool(false))
        );
    }

    #[test]
    fn test_logistic_custom_positive_class() {
        let mut model = LogisticRegression::from_config(LogisticRegressionConfig {
            learning_rate: 0.5,
            positive_class: ClassLabel::from("spam"),
            ..Default::default()
        })
        .unwrap();

        for _ in 0..100 {
            model.learn_one(&features([("x", 1.0)]), &ClassLabel::from("spam")).unwrap();
            model.learn_one(&features([("x", -1.0)]), &ClassLabel::from("ham")).unwrap();
        }

        let proba = model.predict_proba_one(&features([("x", 1.0)])).unwrap();
        assert_eq!(proba.len(), 2);
        assert!(proba[&ClassLabel::from("spam")] > 0.5);
        let total: f64 = proba.values().sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert_eq!(
            model.predict_one(&features([("x", -1.0)])).unwrap(),
            Some(ClassLabel::from("ham"))
        );
    }

    #[test]
    fn test_logistic_text_positive_before_any_negative() {
        let mut model = LogisticRegression::from_config(LogisticRegressionConfig {
            positive_class: ClassLabel::from("spam"),
            ..Default::default()
        })
        .unwrap();

        let proba = model.predict_proba_one(&features([("x", 1.0)])).unwrap();
        assert_eq!(proba.len(), 1);
        assert_eq!(proba[&ClassLabel::from("spam")], 0.5);
        assert!(model.negative_label().is_none());

        model.learn_one(&features([("x", 1.0)]), &ClassLabel::from("ham")).unwrap();
        assert_eq!(model.negative_label(), Some(ClassLabel::from("ham")));
    }

    #[test]
    fn test_false_positive_class_reports_true_as_negative() {
        let model = LogisticRegression::from_config(LogisticRegressionConfig {
            positive_class: ClassLabel::Bool(false),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(model.negative_label(), Some(ClassLabel::Bool(true)));
    }

    #[test]
    fn test_non_positive_clip_bound_disables_clipping() {
        let mut model = LinearRegression::from_config(LinearRegressionConfig {
            learning_rate: 1.0,
            intercept_lr: 0.0,
            ..Default::default()
        })
        .unwrap();
        // Bounds that validation rejects but a loaded model can still carry.
        for bound in [f64::NAN, 0.0, -1.0] {
            model.config.clip_gradient = bound;
            model.params = LinearParams::default();
            model.learn_one(&features([("x", 1.0)]), 3.0).unwrap();
            assert_eq!(model.weights()["x"], 6.0);
        }

        let mut classifier = LogisticRegression::new();
        classifier.config.clip_gradient = f64::NAN;
        classifier
            .learn_one(&features([("x", 1.0)]), &ClassLabel::Bool(true))
            .unwrap();
        assert!(classifier.weights()["x"] > 0.0);
    }

    #[test]
    fn test_clip_bound_from_saved_model() {
        let mut model = LinearRegression::new();
        model.config.clip_gradient = -5.0;
        let json = serde_json::to_string(&model).unwrap();
        let mut loaded: LinearRegression = serde_json::from_str(&json).unwrap();
        loaded.learn_one(&features([("x", 1.0)]), 1.0).unwrap();
        assert!(loaded.weights()["x"] > 0.0);
    }
}
