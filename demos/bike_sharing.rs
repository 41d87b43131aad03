//! Bike availability forecasting on a CSV stream.
//!
//! Reads station snapshots one row at a time, derives the hour of day from
//! the timestamp, aggregates temperature per station and fits an online
//! linear regression with progressive validation.
//!
//! Run with `RUST_LOG=debug` to see per-sample pipeline dispatch.

use chrono::Timelike;
use std::error::Error;
use streamlearn::model::LinearRegressionConfig;
use streamlearn::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

const SNAPSHOTS: &str = "\
moment,station,clouds,humidity,pressure,temperature,wind,bikes
2016-04-01 00:00:07,metro-canal-du-midi,75,81,1017.0,6.54,9.3,1
2016-04-01 00:00:07,place-des-carmes,75,81,1017.0,6.54,9.3,4
2016-04-01 00:00:07,place-esquirol,75,81,1017.0,6.54,9.3,5
2016-04-01 01:00:07,metro-canal-du-midi,75,84,1017.0,6.05,8.1,1
2016-04-01 01:00:07,place-des-carmes,75,84,1017.0,6.05,8.1,5
2016-04-01 01:00:07,place-esquirol,75,84,1017.0,6.05,8.1,6
2016-04-01 06:00:07,metro-canal-du-midi,40,89,1018.0,5.41,5.7,3
2016-04-01 06:00:07,place-des-carmes,40,89,1018.0,5.41,5.7,7
2016-04-01 06:00:07,place-esquirol,40,89,1018.0,5.41,5.7,8
2016-04-01 08:00:07,metro-canal-du-midi,20,80,1019.0,8.20,4.6,9
2016-04-01 08:00:07,place-des-carmes,20,80,1019.0,8.20,4.6,2
2016-04-01 08:00:07,place-esquirol,20,80,1019.0,8.20,4.6,3
2016-04-01 12:00:07,metro-canal-du-midi,20,55,1019.0,15.10,6.2,12
2016-04-01 12:00:07,place-des-carmes,20,55,1019.0,15.10,6.2,6
2016-04-01 12:00:07,place-esquirol,20,55,1019.0,15.10,6.2,4
2016-04-01 18:00:07,metro-canal-du-midi,0,48,1018.0,17.30,7.7,4
2016-04-01 18:00:07,place-des-carmes,0,48,1018.0,17.30,7.7,14
2016-04-01 18:00:07,place-esquirol,0,48,1018.0,17.30,7.7,
2016-04-01 22:00:07,metro-canal-du-midi,10,66,1018.0,11.90,5.1,2
2016-04-01 22:00:07,place-des-carmes,10,66,1018.0,11.90,5.1,9
2016-04-01 22:00:07,place-esquirol,10,66,1018.0,11.90,5.1,11
";

/// Hour of day of the `moment` timestamp.
fn hour_of_day() -> FuncTransformer {
    FuncTransformer::try_new(|x: &FeatureMap| {
        let moment = x
            .get("moment")
            .and_then(FeatureValue::as_timestamp)
            .ok_or_else(|| PipelineError::InvalidParameter("missing 'moment'".to_string()))?;
        Ok(features([("hour", moment.hour() as f64)]))
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let options = CsvOptions::new()
        .target("bikes")
        .converter("bikes", Converter::Int)
        .converter("clouds", Converter::Int)
        .converter("humidity", Converter::Int)
        .converter("pressure", Converter::Float)
        .converter("temperature", Converter::Float)
        .converter("wind", Converter::Float)
        .parse_date("moment", "%Y-%m-%d %H:%M:%S");

    let features_union = TransformerUnion::of(
        Select::new(["clouds", "humidity", "pressure", "temperature", "wind"]),
        hour_of_day(),
    )?
    .add(Agg::new("temperature", ["station"], AggStat::Mean))?;

    let model = LinearRegression::from_config(LinearRegressionConfig {
        learning_rate: 0.05,
        ..Default::default()
    })?;

    let mut pipeline = Pipeline::new()
        .append(features_union)?
        .append(StandardScaler::new())?
        .append(model)?;
    info!(pipeline = %pipeline, "built pipeline");

    let stream = iter_csv(SNAPSHOTS.as_bytes(), options)?;
    let mut mae = MAE::new();
    progressive_val_score(stream, &mut pipeline, &mut mae, 5)?;

    println!("{}", mae);
    Ok(())
}
