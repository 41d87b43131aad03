//! Online group-by aggregation.
//!
//! Keeps one running statistic of the `on` feature per distinct combination
//! of the `by` features, and emits the statistic of the incoming sample's
//! group as a single new feature.

use crate::error::PipelineError;
use crate::features::{FeatureMap, FeatureValue};
use crate::stage::{impl_into_stage, Transformer};
use crate::stats::{Count, Max, Mean, Min, Sum, Univariate, Var};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Statistic computed by [`Agg`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggStat {
    Mean,
    Sum,
    Count,
    Var,
    Min,
    Max,
}

impl fmt::Display for AggStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AggStat::Mean => "mean",
            AggStat::Sum => "sum",
            AggStat::Count => "count",
            AggStat::Var => "var",
            AggStat::Min => "min",
            AggStat::Max => "max",
        };
        write!(f, "{}", name)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
enum Running {
    Mean(Mean),
    Sum(Sum),
    Count(Count),
    Var(Var),
    Min(Min),
    Max(Max),
}

impl Running {
    fn new(how: AggStat) -> Self {
        match how {
            AggStat::Mean => Running::Mean(Mean::new()),
            AggStat::Sum => Running::Sum(Sum::new()),
            AggStat::Count => Running::Count(Count::new()),
            AggStat::Var => Running::Var(Var::default()),
            AggStat::Min => Running::Min(Min::new()),
            AggStat::Max => Running::Max(Max::new()),
        }
    }
}

impl Univariate for Running {
    fn update(&mut self, x: f64) {
        match self {
            Running::Mean(s) => s.update(x),
            Running::Sum(s) => s.update(x),
            Running::Count(s) => s.update(x),
            Running::Var(s) => s.update(x),
            Running::Min(s) => s.update(x),
            Running::Max(s) => s.update(x),
        }
    }

    fn get(&self) -> f64 {
        match self {
            Running::Mean(s) => s.get(),
            Running::Sum(s) => s.get(),
            Running::Count(s) => s.get(),
            Running::Var(s) => s.get(),
            Running::Min(s) => s.get(),
            Running::Max(s) => s.get(),
        }
    }
}

/// Running aggregate of `on`, grouped by the values of `by`.
///
/// The output feature is named `<on>_<how>_by_<by...>`, with several `by`
/// features joined by `_and_`. Without `by` features the aggregate is global
/// and named `<on>_<how>`.
///
/// A sample missing one of the `by` features yields an empty output. A group
/// that has not been seen yet yields `0`.
///
/// # Example
/// ```
/// use streamlearn::feature_extraction::{Agg, AggStat};
/// use streamlearn::features::{features, FeatureValue};
/// use streamlearn::stage::Transformer;
///
/// let mut agg = Agg::new("price", ["shop"], AggStat::Mean);
/// for price in [2.0, 4.0] {
///     let x = features([("shop", FeatureValue::from("a")), ("price", FeatureValue::from(price))]);
///     agg.learn_one(&x).unwrap();
/// }
///
/// let out = agg.transform_one(&features([("shop", "a")])).unwrap();
/// assert_eq!(out["price_mean_by_shop"].as_number(), Some(3.0));
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Agg {
    on: String,
    by: Vec<String>,
    how: AggStat,
    feature_name: String,
    groups: BTreeMap<Vec<String>, Running>,
}

impl Agg {
    pub fn new<I, S>(on: impl Into<String>, by: I, how: AggStat) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let on = on.into();
        let by: Vec<String> = by.into_iter().map(Into::into).collect();
        let feature_name = if by.is_empty() {
            format!("{}_{}", on, how)
        } else {
            format!("{}_{}_by_{}", on, how, by.join("_and_"))
        };
        Self {
            on,
            by,
            how,
            feature_name,
            groups: BTreeMap::new(),
        }
    }

    /// Name of the emitted feature.
    pub fn feature_name(&self) -> &str {
        &self.feature_name
    }

    pub fn how(&self) -> AggStat {
        self.how
    }

    /// Number of groups seen so far.
    pub fn n_groups(&self) -> usize {
        self.groups.len()
    }

    /// Current statistic of a group, given the `by` values in order.
    pub fn get(&self, group: &[&str]) -> Option<f64> {
        let key: Vec<String> = group.iter().map(|s| s.to_string()).collect();
        self.groups.get(&key).map(Univariate::get)
    }

    fn group_key(&self, x: &FeatureMap) -> Option<Vec<String>> {
        self.by
            .iter()
            .map(|name| x.get(name).map(FeatureValue::to_string))
            .collect()
    }
}

impl Transformer for Agg {
    fn learn_one(&mut self, x: &FeatureMap) -> Result<(), PipelineError> {
        let value = match x.get(&self.on) {
            Some(value) => value
                .to_numeric()
                .ok_or_else(|| PipelineError::NonNumericFeature(self.on.clone()))?,
            None => return Ok(()),
        };
        if let Some(key) = self.group_key(x) {
            let how = self.how;
            self.groups
                .entry(key)
                .or_insert_with(|| Running::new(how))
                .update(value);
        }
        Ok(())
    }

    fn transform_one(&self, x: &FeatureMap) -> Result<FeatureMap, PipelineError> {
        let mut out = FeatureMap::new();
        if let Some(key) = self.group_key(x) {
            let stat = self.groups.get(&key).map_or(0.0, Univariate::get);
            out.insert(self.feature_name.clone(), FeatureValue::Number(stat));
        }
        Ok(out)
    }
}

impl_into_stage!(Transformer: Agg);

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(shop: &str, day: &str, price: f64) -> FeatureMap {
        let mut x = FeatureMap::new();
        x.insert("shop".to_string(), FeatureValue::from(shop));
        x.insert("day".to_string(), FeatureValue::from(day));
        x.insert("price".to_string(), FeatureValue::Number(price));
        x
    }

    #[test]
    fn test_feature_name() {
        assert_eq!(
            Agg::new("price", ["shop", "day"], AggStat::Sum).feature_name(),
            "price_sum_by_shop_and_day"
        );
        assert_eq!(
            Agg::new("price", Vec::<String>::new(), AggStat::Max).feature_name(),
            "price_max"
        );
    }

    #[test]
    fn test_mean_by_group() {
        let mut agg = Agg::new("price", ["shop"], AggStat::Mean);
        for (shop, price) in [("a", 1.0), ("a", 3.0), ("b", 10.0)] {
            agg.learn_one(&sample(shop, "mon", price)).unwrap();
        }

        assert_eq!(agg.n_groups(), 2);
        assert_eq!(agg.get(&["a"]), Some(2.0));
        let out = agg.transform_one(&sample("b", "tue", 0.0)).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out["price_mean_by_shop"], FeatureValue::Number(10.0));
    }

    #[test]
    fn test_multiple_by_features() {
        let mut agg = Agg::new("price", ["shop", "day"], AggStat::Count);
        agg.learn_one(&sample("a", "mon", 1.0)).unwrap();
        agg.learn_one(&sample("a", "mon", 2.0)).unwrap();
        agg.learn_one(&sample("a", "tue", 2.0)).unwrap();

        assert_eq!(agg.get(&["a", "mon"]), Some(2.0));
        assert_eq!(agg.get(&["a", "tue"]), Some(1.0));
    }

    #[test]
    fn test_unseen_group_is_zero() {
        let agg = Agg::new("price", ["shop"], AggStat::Min);
        let out = agg.transform_one(&sample("z", "mon", 5.0)).unwrap();
        assert_eq!(out["price_min_by_shop"], FeatureValue::Number(0.0));
    }

    #[test]
    fn test_missing_by_feature_gives_empty_output() {
        let mut agg = Agg::new("price", ["shop"], AggStat::Sum);
        let mut x = FeatureMap::new();
        x.insert("price".to_string(), FeatureValue::Number(1.0));

        agg.learn_one(&x).unwrap();
        assert_eq!(agg.n_groups(), 0);
        assert!(agg.transform_one(&x).unwrap().is_empty());
    }

    #[test]
    fn test_text_target_rejected() {
        let mut agg = Agg::new("shop", ["day"], AggStat::Mean);
        let err = agg.learn_one(&sample("a", "mon", 1.0)).unwrap_err();
        assert!(matches!(err, PipelineError::NonNumericFeature(_)));
    }
}
