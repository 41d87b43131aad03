//! Stage capabilities and the tagged [`Stage`] variant stored by pipelines.
//!
//! A stage exposes exactly one capability set:
//! - [`Transformer`]: maps features to features and learns without labels.
//! - [`Regressor`]: learns from a numeric label and predicts a number.
//! - [`Classifier`]: learns from a class label and predicts class probabilities.
//!
//! Pipelines check capabilities when stages are composed, never when samples
//! flow through, so a malformed pipeline cannot be built in the first place.

use crate::error::PipelineError;
use crate::features::{ClassLabel, ClassProba, FeatureMap};
use std::any::{type_name, Any};
use std::fmt;

/// Downcasting support for stages stored as trait objects.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Extracts the bare struct name from a full type path.
///
/// `"streamlearn::preprocessing::scaling::standard::StandardScaler"` becomes
/// `"StandardScaler"`; generic arguments are dropped.
pub(crate) fn short_type_name(full_name: &'static str) -> &'static str {
    let before_generic = match full_name.find('<') {
        Some(pos) => &full_name[..pos],
        None => full_name,
    };
    match before_generic.rfind("::") {
        Some(pos) => &before_generic[pos + 2..],
        None => before_generic,
    }
}

/// A stage that maps a feature map to a new feature map.
///
/// `learn_one` is the unsupervised update: it receives the same input that
/// `transform_one` sees and adjusts running statistics. Stateless
/// transformers keep the default no-op.
pub trait Transformer: AsAny + Send {
    /// Transforms one sample using the current parameters.
    fn transform_one(&self, x: &FeatureMap) -> Result<FeatureMap, PipelineError>;

    /// Updates internal parameters from one unlabelled sample.
    fn learn_one(&mut self, _x: &FeatureMap) -> Result<(), PipelineError> {
        Ok(())
    }

    /// Human-readable name.
    fn name(&self) -> &'static str {
        short_type_name(type_name::<Self>())
    }
}

/// A final stage that predicts a real number.
pub trait Regressor: AsAny + Send {
    /// Updates the model with one labelled sample.
    fn learn_one(&mut self, x: &FeatureMap, y: f64) -> Result<(), PipelineError>;

    /// Predicts the target of one sample.
    fn predict_one(&self, x: &FeatureMap) -> Result<f64, PipelineError>;

    /// Human-readable name.
    fn name(&self) -> &'static str {
        short_type_name(type_name::<Self>())
    }
}

/// A final stage that predicts a class.
pub trait Classifier: AsAny + Send {
    /// Updates the model with one labelled sample.
    fn learn_one(&mut self, x: &FeatureMap, y: &ClassLabel) -> Result<(), PipelineError>;

    /// Probability of every class known to the model.
    fn predict_proba_one(&self, x: &FeatureMap) -> Result<ClassProba, PipelineError>;

    /// Most likely class; ties go to the smallest label. `None` when no class
    /// is known yet.
    fn predict_one(&self, x: &FeatureMap) -> Result<Option<ClassLabel>, PipelineError> {
        let proba = self.predict_proba_one(x)?;
        let mut best: Option<(&ClassLabel, f64)> = None;
        for (label, &p) in &proba {
            match best {
                Some((_, best_p)) if p <= best_p => {}
                _ => best = Some((label, p)),
            }
        }
        Ok(best.map(|(label, _)| label.clone()))
    }

    /// Human-readable name.
    fn name(&self) -> &'static str {
        short_type_name(type_name::<Self>())
    }
}

/// The capability set of a stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageKind {
    Transformer,
    Regressor,
    Classifier,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageKind::Transformer => write!(f, "transformer"),
            StageKind::Regressor => write!(f, "regressor"),
            StageKind::Classifier => write!(f, "classifier"),
        }
    }
}

/// One unit of a pipeline, tagged with its capability set.
pub enum Stage {
    Transformer(Box<dyn Transformer>),
    Regressor(Box<dyn Regressor>),
    Classifier(Box<dyn Classifier>),
}

impl Stage {
    /// Wraps a transformer.
    pub fn transformer<T: Transformer + 'static>(t: T) -> Self {
        Stage::Transformer(Box::new(t))
    }

    /// Wraps a regressor.
    pub fn regressor<R: Regressor + 'static>(r: R) -> Self {
        Stage::Regressor(Box::new(r))
    }

    /// Wraps a classifier.
    pub fn classifier<C: Classifier + 'static>(c: C) -> Self {
        Stage::Classifier(Box::new(c))
    }

    pub fn kind(&self) -> StageKind {
        match self {
            Stage::Transformer(_) => StageKind::Transformer,
            Stage::Regressor(_) => StageKind::Regressor,
            Stage::Classifier(_) => StageKind::Classifier,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Transformer(t) => t.name(),
            Stage::Regressor(r) => r.name(),
            Stage::Classifier(c) => c.name(),
        }
    }

    pub fn is_transformer(&self) -> bool {
        matches!(self, Stage::Transformer(_))
    }

    /// Borrows the concrete stage type, if it matches.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        // Deref the box first so the vtable picks the concrete type.
        let any = match self {
            Stage::Transformer(t) => (**t).as_any(),
            Stage::Regressor(r) => (**r).as_any(),
            Stage::Classifier(c) => (**c).as_any(),
        };
        any.downcast_ref::<T>()
    }

    /// Mutably borrows the concrete stage type, if it matches.
    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        let any = match self {
            Stage::Transformer(t) => (**t).as_any_mut(),
            Stage::Regressor(r) => (**r).as_any_mut(),
            Stage::Classifier(c) => (**c).as_any_mut(),
        };
        any.downcast_mut::<T>()
    }

    /// Unwraps the transformer or reports which capability is missing.
    pub fn into_transformer(self) -> Result<Box<dyn Transformer>, PipelineError> {
        match self {
            Stage::Transformer(t) => Ok(t),
            other => Err(PipelineError::InvalidComposition(format!(
                "{} is a {}, expected a transformer",
                other.name(),
                other.kind()
            ))),
        }
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Stage::{:?}({})", self.kind(), self.name())
    }
}

/// Implements `From<T> for Stage` for concrete stage types.
macro_rules! impl_into_stage {
    ($variant:ident: $($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for $crate::stage::Stage {
                fn from(stage: $ty) -> Self {
                    $crate::stage::Stage::$variant(Box::new(stage))
                }
            }
        )+
    };
}

pub(crate) use impl_into_stage;
