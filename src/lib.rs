//! # streamlearn
//!
//! Online machine learning pipelines that learn from one sample at a time.
//!
//! A [`Pipeline`] chains [`Stage`]s: any number of transformers followed by
//! a final transformer, regressor or classifier. Samples are plain feature
//! maps (`name → value`), so features may come and go along the stream.
//!
//! Learning is split across two calls:
//! - [`Pipeline::produce`] updates the unsupervised stages with the incoming
//!   sample and returns the final stage's output.
//! - [`Pipeline::fit`] updates the final stage once the label is known.
//!
//! ```
//! use streamlearn::prelude::*;
//!
//! let mut model = Pipeline::new()
//!     .parallel(
//!         StandardScaler::new(),
//!         Agg::new("temperature", ["hour"], AggStat::Mean),
//!     )?
//!     .append(LinearRegression::new())?;
//!
//! let x = features([("temperature", 21.0), ("hour", 8.0)]);
//! let y_pred = model.predict_one(&x)?;
//! model.fit(&x, &Label::Numeric(4.0))?;
//! # assert_eq!(y_pred, 0.0);
//! # Ok::<(), streamlearn::PipelineError>(())
//! ```

pub mod compose;
pub mod error;
pub mod evaluate;
pub mod feature_extraction;
pub mod features;
pub mod loss;
pub mod metrics;
pub mod model;
pub mod optimizer;
pub mod preprocessing;
pub mod serialization;
pub mod stage;
pub mod stats;
pub mod stream;

pub use compose::{Pipeline, PipelineConfig, TransformerUnion};
pub use error::PipelineError;
pub use features::{ClassLabel, FeatureMap, FeatureValue, Label, Output};
pub use stage::{Classifier, Regressor, Stage, StageKind, Transformer};

/// Commonly used types, for glob import.
pub mod prelude {
    pub use crate::compose::{
        Discard, FuncTransformer, Pipeline, PipelineConfig, Select, TransformerUnion,
    };
    pub use crate::error::PipelineError;
    pub use crate::evaluate::progressive_val_score;
    pub use crate::feature_extraction::{Agg, AggStat};
    pub use crate::features::{features, ClassLabel, FeatureMap, FeatureValue, Label, Output};
    pub use crate::metrics::{Accuracy, Metric, MAE, MSE, RMSE};
    pub use crate::model::{LinearRegression, LogisticRegression};
    pub use crate::preprocessing::{
        MaxAbsScaler, MinMaxScaler, Normalizer, OneHotEncoder, PolynomialExtender,
        StandardScaler,
    };
    pub use crate::stage::{Classifier, Regressor, Stage, Transformer};
    pub use crate::stream::{iter_csv, iter_csv_path, Converter, CsvOptions};
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn test_produce_updates_scaler_but_not_model() {
        let mut pipeline = Pipeline::new()
            .append(StandardScaler::new())
            .unwrap()
            .append(LinearRegression::new())
            .unwrap();

        let out = pipeline.produce(&features([("x", 10.0)])).unwrap();

        assert_eq!(out, Output::Value(0.0));
        assert_eq!(pipeline.get::<StandardScaler>().unwrap().means()["x"], 10.0);
        let lin = pipeline.get::<LinearRegression>().unwrap();
        assert!(lin.weights().is_empty());
        assert_eq!(lin.intercept(), 0.0);
    }

    #[test]
    fn test_csv_to_progressive_validation() {
        let data = "\
hour,temperature,bikes
8,12.5,10
9,13.0,14
8,12.0,11
18,20.5,30
9,14.0,15
18,19.0,28
";
        let options = CsvOptions::new()
            .target("bikes")
            .converter("hour", Converter::Int)
            .converter("temperature", Converter::Float)
            .converter("bikes", Converter::Float);

        let mut pipeline = Pipeline::new()
            .parallel(
                Agg::new("temperature", Vec::<String>::new(), AggStat::Mean),
                StandardScaler::new(),
            )
            .unwrap()
            .append(LinearRegression::new())
            .unwrap();
        let mut mae = MAE::new();

        let stream = iter_csv(data.as_bytes(), options).unwrap();
        let score = progressive_val_score(stream, &mut pipeline, &mut mae, 2).unwrap();

        assert!(score > 0.0);
        let union = pipeline.get::<TransformerUnion>().unwrap();
        let mean_temperature = union.get::<Agg>().unwrap().get(&[]).unwrap();
        assert!((mean_temperature - 91.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_capabilities_checked_when_composing() {
        let result = Pipeline::new()
            .append(LogisticRegression::new())
            .unwrap()
            .append(OneHotEncoder::new());
        assert!(matches!(result, Err(PipelineError::InvalidComposition(_))));
    }
}
