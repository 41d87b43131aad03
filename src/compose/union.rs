//! Parallel composition of transformers.

use crate::error::PipelineError;
use crate::features::FeatureMap;
use crate::stage::{impl_into_stage, Stage, Transformer};
use tracing::warn;

/// Runs several transformers on the same input and merges their outputs.
///
/// Every child sees the identical feature map, both when transforming and
/// when learning. Outputs are merged by key union in child order. Children
/// are expected to emit distinct keys; when two children emit the same key
/// the later child wins and a warning is logged.
///
/// # Example
/// ```
/// use streamlearn::compose::{Select, TransformerUnion};
/// use streamlearn::features::features;
/// use streamlearn::stage::Transformer;
///
/// let union = TransformerUnion::of(Select::new(["a"]), Select::new(["b"])).unwrap();
/// let out = union.transform_one(&features([("a", 1.0), ("b", 2.0), ("c", 3.0)])).unwrap();
/// assert_eq!(out.len(), 2);
/// ```
pub struct TransformerUnion {
    children: Vec<Box<dyn Transformer>>,
}

impl TransformerUnion {
    /// Builds a union; every stage must be a transformer.
    pub fn new(stages: Vec<Stage>) -> Result<Self, PipelineError> {
        if stages.is_empty() {
            return Err(PipelineError::InvalidComposition(
                "TransformerUnion needs at least one transformer".to_string(),
            ));
        }
        let children = stages
            .into_iter()
            .map(Stage::into_transformer)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { children })
    }

    /// Union of two stages.
    pub fn of(a: impl Into<Stage>, b: impl Into<Stage>) -> Result<Self, PipelineError> {
        Self::new(vec![a.into(), b.into()])
    }

    /// Adds another child.
    pub fn add(mut self, stage: impl Into<Stage>) -> Result<Self, PipelineError> {
        self.children.push(stage.into().into_transformer()?);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Names of the children, in merge order.
    pub fn names(&self) -> Vec<&'static str> {
        self.children.iter().map(|c| c.name()).collect()
    }

    /// First child of the given concrete type.
    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.children
            .iter()
            .find_map(|c| (**c).as_any().downcast_ref::<T>())
    }
}

impl Transformer for TransformerUnion {
    fn learn_one(&mut self, x: &FeatureMap) -> Result<(), PipelineError> {
        for child in self.children.iter_mut() {
            child.learn_one(x)?;
        }
        Ok(())
    }

    fn transform_one(&self, x: &FeatureMap) -> Result<FeatureMap, PipelineError> {
        let mut merged = FeatureMap::new();
        for child in &self.children {
            for (key, value) in child.transform_one(x)? {
                if merged.contains_key(&key) {
                    warn!(
                        feature = %key,
                        child = child.name(),
                        "union children emitted the same feature, keeping the later one"
                    );
                }
                merged.insert(key, value);
            }
        }
        Ok(merged)
    }
}

impl_into_stage!(Transformer: TransformerUnion);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::{FuncTransformer, Select};
    use crate::features::{features, FeatureValue};
    use crate::model::LinearRegression;
    use crate::preprocessing::{MaxAbsScaler, StandardScaler};

    #[test]
    fn test_union_merges_disjoint_outputs() {
        let left = FuncTransformer::new(|x: &FeatureMap| {
            features([("sum", x.values().filter_map(FeatureValue::as_number).sum::<f64>())])
        });
        let right = Select::new(["a"]);
        let union = TransformerUnion::of(left, right).unwrap();

        let x = features([("a", 1.0), ("b", 2.0)]);
        let out = union.transform_one(&x).unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out["sum"], FeatureValue::Number(3.0));
        assert_eq!(out["a"], FeatureValue::Number(1.0));
    }

    #[test]
    fn test_union_values_match_children() {
        let mut scaler = StandardScaler::new();
        let mut union = TransformerUnion::of(StandardScaler::new(), Select::new(["raw"]))
            .unwrap();
        for v in [1.0, 2.0, 6.0] {
            let x = features([("x", v)]);
            scaler.learn_one(&x).unwrap();
            union.learn_one(&x).unwrap();
        }

        let x = features([("x", 4.0), ("raw", 7.0)]);
        let expected = scaler.transform_one(&features([("x", 4.0)])).unwrap();
        let out = union.transform_one(&x).unwrap();
        assert_eq!(out["x"], expected["x"]);
        assert_eq!(out["raw"], FeatureValue::Number(7.0));
    }

    #[test]
    fn test_union_learn_updates_every_child() {
        let mut union = TransformerUnion::of(StandardScaler::new(), MaxAbsScaler::new()).unwrap();
        union.learn_one(&features([("x", -3.0)])).unwrap();

        assert_eq!(union.get::<StandardScaler>().unwrap().means()["x"], -3.0);
        assert_eq!(union.get::<MaxAbsScaler>().unwrap().max_abs("x"), Some(3.0));
    }

    #[test]
    fn test_union_collision_later_child_wins() {
        let first = FuncTransformer::new(|_: &FeatureMap| features([("k", 1.0)]));
        let second = FuncTransformer::new(|_: &FeatureMap| features([("k", 2.0)]));
        let union = TransformerUnion::of(first, second).unwrap();

        let out = union.transform_one(&FeatureMap::new()).unwrap();
        assert_eq!(out["k"], FeatureValue::Number(2.0));
    }

    #[test]
    fn test_union_rejects_regressor() {
        let result = TransformerUnion::of(StandardScaler::new(), LinearRegression::new());
        assert!(matches!(
            result,
            Err(PipelineError::InvalidComposition(_))
        ));
    }

    #[test]
    fn test_union_rejects_empty() {
        assert!(TransformerUnion::new(Vec::new()).is_err());
    }

    #[test]
    fn test_union_add_and_names() {
        let union = TransformerUnion::of(StandardScaler::new(), MaxAbsScaler::new())
            .unwrap()
            .add(Select::new(["a"]))
            .unwrap();
        assert_eq!(union.len(), 3);
        assert_eq!(
            union.names(),
            vec!["StandardScaler", "MaxAbsScaler", "Select"]
        );
    }
}
