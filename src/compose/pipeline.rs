//! Sequential pipeline with dual-path update dispatch.
//!
//! A pipeline chains stages so that the output of one stage becomes the input
//! of the next. Every stage but the last must be a transformer; the last one
//! may be a transformer, a regressor or a classifier.
//!
//! The two entry points touch different stages:
//!
//! | Call | Non-final stages | Final stage |
//! |------|------------------|-------------|
//! | [`Pipeline::produce`] | transform, then learn from the same input | transform / predict, no update |
//! | [`Pipeline::fit`] | transform only | learn from the sample and its label |
//!
//! Unlabelled samples usually arrive long before their labels, so every
//! prediction request doubles as training data for the unsupervised stages,
//! while the supervised final stage only moves when ground truth shows up.
//!
//! # Example
//! ```
//! use streamlearn::compose::Pipeline;
//! use streamlearn::features::features;
//! use streamlearn::model::LinearRegression;
//! use streamlearn::preprocessing::StandardScaler;
//!
//! let mut model = Pipeline::new()
//!     .append(StandardScaler::new())?
//!     .append(LinearRegression::new())?;
//!
//! let x = features([("x", 10.0)]);
//! let y_pred = model.predict_one(&x)?;
//! model.learn_one(&x, &12.0.into())?;
//! # assert_eq!(y_pred, 0.0);
//! # Ok::<(), streamlearn::PipelineError>(())
//! ```

use crate::compose::union::TransformerUnion;
use crate::error::PipelineError;
use crate::features::{ClassLabel, ClassProba, FeatureMap, Label, Output};
use crate::stage::{impl_into_stage, Stage, StageKind, Transformer};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, trace};

/// Configuration for [`Pipeline`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// If true, non-final stages learn from every sample passed to
    /// [`Pipeline::produce`]. If false, `produce` is pure inference.
    pub learn_on_produce: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            learn_on_produce: true,
        }
    }
}

/// An ordered chain of stages.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Stage>,
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Build a pipeline from stages in order.
    ///
    /// # Errors
    /// [`PipelineError::InvalidComposition`] if a non-transformer appears
    /// anywhere but the last position.
    pub fn from_stages(stages: Vec<Stage>) -> Result<Self, PipelineError> {
        stages
            .into_iter()
            .try_fold(Self::new(), |pipeline, stage| pipeline.append(stage))
    }

    /// Append a stage at the end.
    ///
    /// # Errors
    /// [`PipelineError::InvalidComposition`] if the current final stage is not
    /// a transformer, since it would stop being final.
    pub fn append(mut self, stage: impl Into<Stage>) -> Result<Self, PipelineError> {
        let stage = stage.into();
        if let Some(last) = self.stages.last() {
            if !last.is_transformer() {
                return Err(PipelineError::InvalidComposition(format!(
                    "cannot append {} after {}: a {} must be the final stage",
                    stage.name(),
                    last.name(),
                    last.kind()
                )));
            }
        }
        self.stages.push(stage);
        Ok(self)
    }

    /// Append every stage of another pipeline, in order.
    pub fn extend(self, other: Pipeline) -> Result<Self, PipelineError> {
        other
            .stages
            .into_iter()
            .try_fold(self, |pipeline, stage| pipeline.append(stage))
    }

    /// Append a [`TransformerUnion`] of two transformers.
    pub fn parallel(
        self,
        a: impl Into<Stage>,
        b: impl Into<Stage>,
    ) -> Result<Self, PipelineError> {
        let union = TransformerUnion::of(a, b)?;
        self.append(union)
    }

    /// Turn a pipeline made only of transformers into a single transformer,
    /// so it can be nested in a union or another pipeline.
    pub fn into_transformer(self) -> Result<TransformerChain, PipelineError> {
        if let Some(stage) = self.stages.iter().find(|s| !s.is_transformer()) {
            return Err(PipelineError::InvalidComposition(format!(
                "{} is a {}, only pipelines of transformers can be used as a transformer",
                stage.name(),
                stage.kind()
            )));
        }
        Ok(TransformerChain { pipeline: self })
    }

    /// Get the number of stages in the pipeline.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Check if the pipeline is empty.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Get stage names for debugging.
    pub fn step_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(Stage::name).collect()
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Capability of the final stage.
    pub fn final_kind(&self) -> Option<StageKind> {
        self.stages.last().map(Stage::kind)
    }

    /// First stage of the given concrete type.
    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.stages.iter().find_map(Stage::downcast_ref::<T>)
    }

    /// First stage of the given concrete type, mutably.
    pub fn get_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.stages.iter_mut().find_map(Stage::downcast_mut::<T>)
    }

    /// Run one sample through the pipeline (inference path).
    ///
    /// Non-final stages transform their input and then learn from it (unless
    /// `learn_on_produce` is off), so a sample is never transformed with
    /// statistics that already include it. The final stage only transforms
    /// or predicts.
    pub fn produce(&mut self, x: &FeatureMap) -> Result<Output, PipelineError> {
        let learn = self.config.learn_on_produce;
        let (upstream, last) = self.split_last_mut()?;
        debug!(
            operation = "produce",
            stages = upstream.len() + 1,
            learn,
            "dispatching sample"
        );
        let xt = forward(upstream, x, learn)?;
        match last {
            Stage::Transformer(t) => Ok(Output::Features(t.transform_one(&xt)?)),
            Stage::Regressor(r) => Ok(Output::Value(r.predict_one(&xt)?)),
            Stage::Classifier(c) => Ok(Output::Class(c.predict_one(&xt)?)),
        }
    }

    /// Learn from one labelled sample (supervised path).
    ///
    /// Non-final stages only transform; the final stage learns. A final
    /// transformer performs its unsupervised update and ignores the label.
    ///
    /// # Errors
    /// [`PipelineError::InvalidLabel`] if the label kind does not match the
    /// final stage (numeric for regressors, class for classifiers).
    pub fn fit(&mut self, x: &FeatureMap, y: &Label) -> Result<(), PipelineError> {
        let (upstream, last) = self.split_last_mut()?;
        debug!(
            operation = "fit",
            stages = upstream.len() + 1,
            "dispatching sample"
        );
        let xt = forward(upstream, x, false)?;
        match last {
            Stage::Transformer(t) => t.learn_one(&xt),
            Stage::Regressor(r) => {
                let target = y.as_numeric().ok_or_else(|| PipelineError::InvalidLabel {
                    expected: "numeric label",
                    got: y.kind(),
                })?;
                r.learn_one(&xt, target)
            }
            Stage::Classifier(c) => {
                let class = y.as_class().ok_or_else(|| PipelineError::InvalidLabel {
                    expected: "class label",
                    got: y.kind(),
                })?;
                c.learn_one(&xt, class)
            }
        }
    }

    /// Alias of [`Pipeline::fit`].
    pub fn learn_one(&mut self, x: &FeatureMap, y: &Label) -> Result<(), PipelineError> {
        self.fit(x, y)
    }

    /// [`Pipeline::produce`] for pipelines ending with a transformer.
    pub fn transform_one(&mut self, x: &FeatureMap) -> Result<FeatureMap, PipelineError> {
        self.require_final(StageKind::Transformer, "transform_one")?;
        match self.produce(x)? {
            Output::Features(out) => Ok(out),
            _ => Err(self.unsupported("transform_one")),
        }
    }

    /// [`Pipeline::produce`] for pipelines ending with a regressor.
    pub fn predict_one(&mut self, x: &FeatureMap) -> Result<f64, PipelineError> {
        self.require_final(StageKind::Regressor, "predict_one")?;
        match self.produce(x)? {
            Output::Value(y) => Ok(y),
            _ => Err(self.unsupported("predict_one")),
        }
    }

    /// [`Pipeline::produce`] for pipelines ending with a classifier.
    pub fn predict_class_one(
        &mut self,
        x: &FeatureMap,
    ) -> Result<Option<ClassLabel>, PipelineError> {
        self.require_final(StageKind::Classifier, "predict_class_one")?;
        match self.produce(x)? {
            Output::Class(c) => Ok(c),
            _ => Err(self.unsupported("predict_class_one")),
        }
    }

    /// Class probabilities; same update rules as [`Pipeline::produce`].
    pub fn predict_proba_one(&mut self, x: &FeatureMap) -> Result<ClassProba, PipelineError> {
        self.require_final(StageKind::Classifier, "predict_proba_one")?;
        let learn = self.config.learn_on_produce;
        let (upstream, last) = self.split_last_mut()?;
        debug!(
            operation = "predict_proba_one",
            stages = upstream.len() + 1,
            learn,
            "dispatching sample"
        );
        let xt = forward(upstream, x, learn)?;
        match last {
            Stage::Classifier(c) => c.predict_proba_one(&xt),
            other => Err(PipelineError::UnsupportedOperation {
                stage: other.name().to_string(),
                operation: "predict_proba_one",
            }),
        }
    }

    fn split_last_mut(&mut self) -> Result<(&mut [Stage], &mut Stage), PipelineError> {
        self.stages
            .split_last_mut()
            .map(|(last, upstream)| (upstream, last))
            .ok_or(PipelineError::EmptyPipeline)
    }

    /// Rejects a typed call before any stage is touched.
    fn require_final(&self, kind: StageKind, operation: &'static str) -> Result<(), PipelineError> {
        let last = self.stages.last().ok_or(PipelineError::EmptyPipeline)?;
        if last.kind() != kind {
            return Err(self.unsupported(operation));
        }
        Ok(())
    }

    fn unsupported(&self, operation: &'static str) -> PipelineError {
        PipelineError::UnsupportedOperation {
            stage: self.stages.last().map(Stage::name).unwrap_or("<empty>").to_string(),
            operation,
        }
    }
}

/// Pushes a sample through non-final stages. Each stage transforms its input
/// with its current parameters and then, if `learn` is set, learns from that
/// same input.
fn forward(
    upstream: &mut [Stage],
    x: &FeatureMap,
    learn: bool,
) -> Result<FeatureMap, PipelineError> {
    let mut current = x.clone();
    for stage in upstream.iter_mut() {
        let t = match stage {
            Stage::Transformer(t) => t,
            other => {
                return Err(PipelineError::InvalidComposition(format!(
                    "{} is a {} in a non-final position",
                    other.name(),
                    other.kind()
                )))
            }
        };
        let next = t.transform_one(&current)?;
        if learn {
            t.learn_one(&current)?;
        }
        current = next;
        trace!(stage = t.name(), learned = learn, features = current.len(), "stage done");
    }
    Ok(current)
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.step_names().join(" | "))
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.step_names())
            .field("config", &self.config)
            .finish()
    }
}

/// A pipeline of transformers acting as a single transformer.
///
/// Learning walks the chain like the inference path of a pipeline: each
/// stage transforms its input for the next stage, then learns from it.
pub struct TransformerChain {
    pipeline: Pipeline,
}

impl TransformerChain {
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }
}

impl Transformer for TransformerChain {
    fn learn_one(&mut self, x: &FeatureMap) -> Result<(), PipelineError> {
        forward(&mut self.pipeline.stages, x, true).map(|_| ())
    }

    fn transform_one(&self, x: &FeatureMap) -> Result<FeatureMap, PipelineError> {
        let mut current = x.clone();
        for stage in &self.pipeline.stages {
            if let Stage::Transformer(t) = stage {
                current = t.transform_one(&current)?;
            }
        }
        Ok(current)
    }
}

impl_into_stage!(Transformer: TransformerChain);
