//! Spam filtering with parallel feature branches.
//!
//! One branch one-hot encodes the sender domain, the other scales the
//! numeric message statistics through a nested sub-pipeline. Predictions
//! are requested for every message, labels arrive for only some of them.

use std::error::Error;
use streamlearn::model::LogisticRegressionConfig;
use streamlearn::prelude::*;
use tracing_subscriber::EnvFilter;

struct Message {
    domain: &'static str,
    links: f64,
    length: f64,
    spam: Option<bool>,
}

const INBOX: &[Message] = &[
    Message { domain: "bank.example", links: 0.0, length: 420.0, spam: Some(false) },
    Message { domain: "prizes.example", links: 7.0, length: 80.0, spam: Some(true) },
    Message { domain: "work.example", links: 1.0, length: 650.0, spam: Some(false) },
    Message { domain: "prizes.example", links: 9.0, length: 60.0, spam: None },
    Message { domain: "pharmacy.example", links: 5.0, length: 120.0, spam: Some(true) },
    Message { domain: "work.example", links: 0.0, length: 300.0, spam: Some(false) },
    Message { domain: "prizes.example", links: 6.0, length: 95.0, spam: Some(true) },
    Message { domain: "bank.example", links: 1.0, length: 510.0, spam: None },
    Message { domain: "pharmacy.example", links: 8.0, length: 70.0, spam: Some(true) },
    Message { domain: "work.example", links: 2.0, length: 720.0, spam: Some(false) },
];

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let numeric = Pipeline::new()
        .append(Select::new(["links", "length"]))?
        .append(StandardScaler::new())?
        .into_transformer()?;
    let domain = Pipeline::new()
        .append(Select::new(["domain"]))?
        .append(OneHotEncoder::new())?
        .into_transformer()?;

    let mut pipeline = Pipeline::new()
        .parallel(numeric, domain)?
        .append(LogisticRegression::from_config(LogisticRegressionConfig {
            learning_rate: 0.5,
            ..Default::default()
        })?)?;
    println!("{}", pipeline);

    let mut accuracy = Accuracy::new();
    for epoch in 0..5 {
        for message in INBOX {
            let x = features([
                ("domain", FeatureValue::from(message.domain)),
                ("links", FeatureValue::from(message.links)),
                ("length", FeatureValue::from(message.length)),
            ]);
            let y_pred = pipeline.produce(&x)?;
            if let Some(spam) = message.spam {
                let y = Label::from(spam);
                accuracy.update(&y, &y_pred)?;
                pipeline.fit(&x, &y)?;
            }
        }
        println!("epoch {}: {}", epoch, accuracy);
    }

    let suspicious = features([
        ("domain", FeatureValue::from("prizes.example")),
        ("links", FeatureValue::from(4.0)),
        ("length", FeatureValue::from(100.0)),
    ]);
    let proba = pipeline.predict_proba_one(&suspicious)?;
    println!("P(spam) = {:.3}", proba[&ClassLabel::Bool(true)]);
    Ok(())
}
