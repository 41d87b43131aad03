//! Persistence of learned stage parameters and configurations.
//!
//! Stages keep only plain data (maps of running statistics and weights), so
//! every stage type that derives serde can be snapshotted mid-stream and
//! resumed later. Binary snapshots use `bincode`; configurations are
//! exchanged as JSON.

use crate::error::PipelineError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fs;
use std::path::Path;

/// A trait for parameter representations that can be serialized to and from bytes.
pub trait SerializableParams: Sized {
    /// The error type returned during (de)serialization.
    type Error: Error + Send + Sync + 'static;

    /// Serialize the parameters into a byte buffer.
    fn to_bytes(&self) -> Result<Vec<u8>, Self::Error>;

    /// Deserialize the parameters from a byte buffer.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Self::Error>;
}

impl<T> SerializableParams for T
where
    T: Serialize + DeserializeOwned,
{
    type Error = bincode::Error;

    fn to_bytes(&self) -> Result<Vec<u8>, Self::Error> {
        bincode::serialize(self)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, Self::Error> {
        bincode::deserialize(bytes)
    }
}

/// Writes a binary snapshot of `params` to `path`.
pub fn save_params<T: SerializableParams<Error = bincode::Error>>(
    params: &T,
    path: impl AsRef<Path>,
) -> Result<(), PipelineError> {
    let bytes = params.to_bytes()?;
    fs::write(path, bytes)?;
    Ok(())
}

/// Reads a binary snapshot written by [`save_params`].
pub fn load_params<T: SerializableParams<Error = bincode::Error>>(
    path: impl AsRef<Path>,
) -> Result<T, PipelineError> {
    let bytes = fs::read(path)?;
    Ok(T::from_bytes(&bytes)?)
}

/// Parses a configuration from JSON.
pub fn config_from_json<T: DeserializeOwned>(json: &str) -> Result<T, PipelineError> {
    Ok(serde_json::from_str(json)?)
}

/// Renders a configuration as pretty-printed JSON.
pub fn config_to_json<T: Serialize>(config: &T) -> Result<String, PipelineError> {
    Ok(serde_json::to_string_pretty(config)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::PipelineConfig;
    use crate::features::features;
    use crate::model::{LinearRegression, LinearRegressionConfig};
    use crate::preprocessing::StandardScaler;
    use crate::stage::{Regressor, Transformer};

    #[test]
    fn test_scaler_snapshot_roundtrip() {
        let mut scaler = StandardScaler::new();
        for v in [1.0, 2.0, 4.0] {
            scaler.learn_one(&features([("x", v)])).unwrap();
        }

        let restored = StandardScaler::from_bytes(&scaler.to_bytes().unwrap()).unwrap();

        let x = features([("x", 3.0)]);
        assert_eq!(
            scaler.transform_one(&x).unwrap(),
            restored.transform_one(&x).unwrap()
        );
    }

    #[test]
    fn test_save_and_resume_model() {
        let mut model = LinearRegression::new();
        for _ in 0..10 {
            model.learn_one(&features([("x", 1.0)]), 2.0).unwrap();
        }

        let path = std::env::temp_dir().join("streamlearn_linear_regression.bin");
        save_params(&model, &path).unwrap();
        let mut loaded: LinearRegression = load_params(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.params(), model.params());

        // Learning continues from the snapshot.
        let x = features([("x", 1.0)]);
        model.learn_one(&x, 2.0).unwrap();
        loaded.learn_one(&x, 2.0).unwrap();
        assert_eq!(
            loaded.predict_one(&x).unwrap(),
            model.predict_one(&x).unwrap()
        );
    }

    #[test]
    fn test_load_missing_file() {
        let result: Result<LinearRegression, _> = load_params("/nonexistent/streamlearn.bin");
        assert!(matches!(result, Err(PipelineError::Io(_))));
    }

    #[test]
    fn test_corrupted_bytes() {
        let result = LinearRegression::from_bytes(&[1, 2, 3]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_json_roundtrip() {
        let config = LinearRegressionConfig {
            learning_rate: 0.05,
            ..Default::default()
        };
        let json = config_to_json(&config).unwrap();
        let parsed: LinearRegressionConfig = config_from_json(&json).unwrap();
        assert_eq!(parsed, config);

        let pipeline: PipelineConfig =
            config_from_json(r#"{"learn_on_produce": false}"#).unwrap();
        assert!(!pipeline.learn_on_produce);
    }

    #[test]
    fn test_invalid_json_config() {
        let result: Result<PipelineConfig, _> = config_from_json("{not json");
        assert!(matches!(result, Err(PipelineError::SerializationError(_))));
    }
}
