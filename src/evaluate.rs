//! Progressive validation of a pipeline over a stream.

use crate::compose::Pipeline;
use crate::error::PipelineError;
use crate::metrics::Metric;
use crate::stream::Sample;
use tracing::info;

/// Scores a pipeline on a stream, predicting each sample before learning it.
///
/// For every sample the pipeline first `produce`s an output (which also
/// updates the transformers), the metric is updated against the label, and
/// only then the pipeline `fit`s the labelled sample. Every prediction is
/// therefore made on a sample the final stage has not seen yet.
///
/// Unlabelled samples are produced but neither scored nor fitted.
/// `print_every` logs the running score every that many labelled samples;
/// `0` disables progress logs.
///
/// Returns the final value of the metric.
///
/// # Example
/// ```
/// use streamlearn::compose::Pipeline;
/// use streamlearn::evaluate::progressive_val_score;
/// use streamlearn::features::{features, Label};
/// use streamlearn::metrics::{Metric, MAE};
/// use streamlearn::model::LinearRegression;
/// use streamlearn::preprocessing::StandardScaler;
///
/// let mut pipeline = Pipeline::new()
///     .append(StandardScaler::new())?
///     .append(LinearRegression::new())?;
/// let stream = (0..100).map(|i| Ok((features([("x", i as f64)]), Some(Label::Numeric(1.0)))));
///
/// let mut mae = MAE::new();
/// let score = progressive_val_score(stream, &mut pipeline, &mut mae, 0)?;
/// assert_eq!(score, mae.get());
/// # Ok::<(), streamlearn::PipelineError>(())
/// ```
pub fn progressive_val_score<I, M>(
    stream: I,
    pipeline: &mut Pipeline,
    metric: &mut M,
    print_every: usize,
) -> Result<f64, PipelineError>
where
    I: IntoIterator<Item = Sample>,
    M: Metric + ?Sized,
{
    let mut n_labelled = 0usize;
    for sample in stream {
        let (x, y) = sample?;
        let y_pred = pipeline.produce(&x)?;
        let Some(y) = y else {
            continue;
        };
        metric.update(&y, &y_pred)?;
        pipeline.fit(&x, &y)?;

        n_labelled += 1;
        if print_every > 0 && n_labelled % print_every == 0 {
            info!(samples = n_labelled, "{}", metric.report());
        }
    }
    info!(samples = n_labelled, pipeline = %pipeline, "finished: {}", metric.report());
    Ok(metric.get())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::Select;
    use crate::features::{features, ClassLabel, Label};
    use crate::metrics::{Accuracy, MAE};
    use crate::model::{LinearRegression, LogisticRegression, LogisticRegressionConfig};
    use crate::preprocessing::StandardScaler;

    fn labelled(x: f64, y: f64) -> Sample {
        Ok((features([("x", x)]), Some(Label::Numeric(y))))
    }

    #[test]
    fn test_first_prediction_is_made_before_learning() {
        let mut pipeline = Pipeline::new().append(LinearRegression::new()).unwrap();
        let mut mae = MAE::new();

        // The untrained model predicts 0, so the error is the label itself.
        let score =
            progressive_val_score(vec![labelled(1.0, 5.0)], &mut pipeline, &mut mae, 0).unwrap();

        assert_eq!(score, 5.0);
        assert!(pipeline.get::<LinearRegression>().unwrap().intercept() > 0.0);
    }

    #[test]
    fn test_error_decreases_on_learnable_stream() {
        let stream = |n: usize| (0..n).map(|i| labelled((i % 5) as f64, 3.0 * (i % 5) as f64));

        let mut pipeline = Pipeline::new()
            .append(StandardScaler::new())
            .unwrap()
            .append(LinearRegression::new())
            .unwrap();
        let mut early = MAE::new();
        progressive_val_score(stream(20), &mut pipeline, &mut early, 0).unwrap();

        let mut late = MAE::new();
        progressive_val_score(stream(500), &mut pipeline, &mut late, 100).unwrap();

        assert!(late.get() < early.get());
    }

    #[test]
    fn test_unlabelled_samples_are_not_scored() {
        let stream = vec![
            Ok((features([("x", 1.0)]), None)),
            labelled(2.0, 1.0),
        ];
        let mut pipeline = Pipeline::new()
            .append(StandardScaler::new())
            .unwrap()
            .append(LinearRegression::new())
            .unwrap();
        let mut mae = MAE::new();

        progressive_val_score(stream, &mut pipeline, &mut mae, 1).unwrap();

        let scaler = pipeline.get::<StandardScaler>().unwrap();
        assert_eq!(scaler.means()["x"], 1.5);
        assert_eq!(mae.get(), 1.0);
    }

    #[test]
    fn test_stream_error_is_propagated() {
        let stream: Vec<Sample> = vec![Err(PipelineError::Csv("broken row".to_string()))];
        let mut pipeline = Pipeline::new().append(LinearRegression::new()).unwrap();
        let result = progressive_val_score(stream, &mut pipeline, &mut MAE::new(), 0);
        assert!(matches!(result, Err(PipelineError::Csv(_))));
    }

    #[test]
    fn test_metric_mismatch_is_reported() {
        let mut pipeline = Pipeline::new().append(LogisticRegression::new()).unwrap();
        let mut accuracy = Accuracy::new();
        let result = progressive_val_score(
            vec![labelled(1.0, 1.0)],
            &mut pipeline,
            &mut accuracy,
            0,
        );
        assert!(matches!(result, Err(PipelineError::InvalidLabel { .. })));
    }

    #[test]
    fn test_text_labels_scored_with_configured_positive_class() {
        let stream = (0..400).map(|i| {
            let (x, y) = if i % 2 == 0 { (1.0, "spam") } else { (-1.0, "ham") };
            Ok((features([("x", x)]), Some(Label::from(y))))
        });
        let mut pipeline = Pipeline::new()
            .append(Select::new(["x"]))
            .unwrap()
            .append(
                LogisticRegression::from_config(LogisticRegressionConfig {
                    learning_rate: 0.5,
                    positive_class: ClassLabel::from("spam"),
                    ..Default::default()
                })
                .unwrap(),
            )
            .unwrap();
        let mut accuracy = Accuracy::new();

        let score = progressive_val_score(stream, &mut pipeline, &mut accuracy, 0).unwrap();

        assert!(score > 0.9);
        let proba = pipeline.predict_proba_one(&features([("x", -1.0)])).unwrap();
        assert!(proba[&ClassLabel::from("ham")] > 0.5);
        assert!(!proba.contains_key(&ClassLabel::Bool(true)));
    }
}
