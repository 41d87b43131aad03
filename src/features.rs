//! Sample representation: feature maps, labels and stage outputs.
//!
//! Online learning works on one sample at a time. A sample is a [`FeatureMap`]
//! (feature name → heterogeneous value) plus, when ground truth is available,
//! a [`Label`].

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single feature value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FeatureValue {
    /// Numeric feature.
    Number(f64),
    /// Categorical or free-form text feature.
    Text(String),
    /// Date and time without timezone.
    Timestamp(NaiveDateTime),
    /// Boolean flag.
    Bool(bool),
}

impl FeatureValue {
    /// Returns the value if this is a `Number`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FeatureValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the text if this is a `Text`.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FeatureValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the timestamp if this is a `Timestamp`.
    pub fn as_timestamp(&self) -> Option<&NaiveDateTime> {
        match self {
            FeatureValue::Timestamp(ts) => Some(ts),
            _ => None,
        }
    }

    /// Numeric view used by linear models: numbers as-is, booleans as 0/1.
    pub fn to_numeric(&self) -> Option<f64> {
        match self {
            FeatureValue::Number(v) => Some(*v),
            FeatureValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Whether the value is categorical (text or boolean).
    pub fn is_categorical(&self) -> bool {
        matches!(self, FeatureValue::Text(_) | FeatureValue::Bool(_))
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            FeatureValue::Number(_) => "number",
            FeatureValue::Text(_) => "text",
            FeatureValue::Timestamp(_) => "timestamp",
            FeatureValue::Bool(_) => "bool",
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Number(v) => write!(f, "{}", v),
            FeatureValue::Text(s) => write!(f, "{}", s),
            FeatureValue::Timestamp(ts) => write!(f, "{}", ts),
            FeatureValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<f64> for FeatureValue {
    fn from(v: f64) -> Self {
        FeatureValue::Number(v)
    }
}

impl From<i64> for FeatureValue {
    fn from(v: i64) -> Self {
        FeatureValue::Number(v as f64)
    }
}

impl From<bool> for FeatureValue {
    fn from(v: bool) -> Self {
        FeatureValue::Bool(v)
    }
}

impl From<&str> for FeatureValue {
    fn from(v: &str) -> Self {
        FeatureValue::Text(v.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(v: String) -> Self {
        FeatureValue::Text(v)
    }
}

impl From<NaiveDateTime> for FeatureValue {
    fn from(v: NaiveDateTime) -> Self {
        FeatureValue::Timestamp(v)
    }
}

/// Named features of one sample.
///
/// Key order carries no meaning; a `BTreeMap` keeps iteration deterministic.
pub type FeatureMap = BTreeMap<String, FeatureValue>;

/// Builds a [`FeatureMap`] from `(name, value)` pairs.
///
/// ```
/// use streamlearn::features::{features, FeatureValue};
///
/// let x = features([("x", 10.0), ("y", 2.0)]);
/// assert_eq!(x["x"], FeatureValue::Number(10.0));
/// ```
pub fn features<K, V, I>(pairs: I) -> FeatureMap
where
    K: Into<String>,
    V: Into<FeatureValue>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Class label for classification targets.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClassLabel {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassLabel::Bool(b) => write!(f, "{}", b),
            ClassLabel::Int(i) => write!(f, "{}", i),
            ClassLabel::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for ClassLabel {
    fn from(v: bool) -> Self {
        ClassLabel::Bool(v)
    }
}

impl From<i64> for ClassLabel {
    fn from(v: i64) -> Self {
        ClassLabel::Int(v)
    }
}

impl From<&str> for ClassLabel {
    fn from(v: &str) -> Self {
        ClassLabel::Text(v.to_string())
    }
}

/// Ground truth for one sample.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Label {
    /// Regression target.
    Numeric(f64),
    /// Classification target.
    Class(ClassLabel),
}

impl Label {
    /// Returns the regression target, if any.
    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            Label::Numeric(v) => Some(*v),
            Label::Class(_) => None,
        }
    }

    /// Returns the class, if any.
    pub fn as_class(&self) -> Option<&ClassLabel> {
        match self {
            Label::Numeric(_) => None,
            Label::Class(c) => Some(c),
        }
    }

    pub(crate) fn kind(&self) -> String {
        match self {
            Label::Numeric(v) => format!("numeric label {}", v),
            Label::Class(c) => format!("class label '{}'", c),
        }
    }
}

impl From<f64> for Label {
    fn from(v: f64) -> Self {
        Label::Numeric(v)
    }
}

impl From<bool> for Label {
    fn from(v: bool) -> Self {
        Label::Class(ClassLabel::Bool(v))
    }
}

impl From<&str> for Label {
    fn from(v: &str) -> Self {
        Label::Class(ClassLabel::Text(v.to_string()))
    }
}

impl From<ClassLabel> for Label {
    fn from(v: ClassLabel) -> Self {
        Label::Class(v)
    }
}

/// Probability of each known class.
pub type ClassProba = BTreeMap<ClassLabel, f64>;

/// What a pipeline produces for one sample.
#[derive(Clone, Debug, PartialEq)]
pub enum Output {
    /// Final stage is a transformer.
    Features(FeatureMap),
    /// Final stage is a regressor.
    Value(f64),
    /// Final stage is a classifier; `None` until a class has been seen.
    Class(Option<ClassLabel>),
}

impl Output {
    /// Returns the regression output, if any.
    pub fn as_value(&self) -> Option<f64> {
        match self {
            Output::Value(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the predicted class, if any.
    pub fn as_class(&self) -> Option<&ClassLabel> {
        match self {
            Output::Class(c) => c.as_ref(),
            _ => None,
        }
    }

    /// Returns the transformed features, if any.
    pub fn as_features(&self) -> Option<&FeatureMap> {
        match self {
            Output::Features(x) => Some(x),
            _ => None,
        }
    }
}
