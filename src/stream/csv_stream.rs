//! Streaming samples out of CSV data.

use crate::error::PipelineError;
use crate::features::{ClassLabel, FeatureMap, FeatureValue, Label};
use crate::stream::Sample;
use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecordsIntoIter, Trim};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// How a CSV field is turned into a value.
///
/// On the target column `Float` and `Int` give regression labels, while
/// `IntClass` gives integer class labels such as digit or category codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Converter {
    Float,
    Int,
    /// Integer codes standing for categories.
    IntClass,
    Bool,
    Text,
}

/// Options for [`iter_csv`].
///
/// Fields are read as text unless a converter or a date format is set for
/// their column. Empty fields are left out of the feature map.
///
/// # Example
/// ```
/// use streamlearn::stream::{Converter, CsvOptions};
///
/// let options = CsvOptions::new()
///     .target("bikes")
///     .converter("bikes", Converter::Int)
///     .converter("temperature", Converter::Float)
///     .parse_date("moment", "%Y-%m-%d %H:%M:%S")
///     .drop(["station"])
///     .limit(1000);
/// assert_eq!(options.target_column(), Some("bikes"));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CsvOptions {
    target: Option<String>,
    converters: BTreeMap<String, Converter>,
    parse_dates: BTreeMap<String, String>,
    drop: BTreeSet<String>,
    limit: Option<usize>,
    delimiter: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            target: None,
            converters: BTreeMap::new(),
            parse_dates: BTreeMap::new(),
            drop: BTreeSet::new(),
            limit: None,
            delimiter: b',',
        }
    }
}

impl CsvOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Column holding the label; it is removed from the features.
    pub fn target(mut self, column: impl Into<String>) -> Self {
        self.target = Some(column.into());
        self
    }

    pub fn converter(mut self, column: impl Into<String>, converter: Converter) -> Self {
        self.converters.insert(column.into(), converter);
        self
    }

    /// Parses a column with a chrono format string. Date-only formats give
    /// timestamps at midnight.
    pub fn parse_date(mut self, column: impl Into<String>, format: impl Into<String>) -> Self {
        self.parse_dates.insert(column.into(), format.into());
        self
    }

    /// Columns to skip entirely.
    pub fn drop<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.drop.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Maximum number of rows to yield.
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn target_column(&self) -> Option<&str> {
        self.target.as_deref()
    }

    fn convert_feature(&self, column: &str, raw: &str) -> Result<FeatureValue, PipelineError> {
        if let Some(format) = self.parse_dates.get(column) {
            return parse_timestamp(column, raw, format).map(FeatureValue::Timestamp);
        }
        match self.converters.get(column) {
            Some(Converter::Float) => parse_float(column, raw).map(FeatureValue::Number),
            Some(Converter::Int) => parse_int(column, raw).map(|v| FeatureValue::Number(v as f64)),
            Some(Converter::IntClass) => {
                parse_int(column, raw).map(|v| FeatureValue::Text(v.to_string()))
            }
            Some(Converter::Bool) => parse_bool(column, raw).map(FeatureValue::Bool),
            Some(Converter::Text) | None => Ok(FeatureValue::Text(raw.to_string())),
        }
    }

    fn convert_label(&self, column: &str, raw: &str) -> Result<Label, PipelineError> {
        match self.converters.get(column) {
            Some(Converter::Float) => parse_float(column, raw).map(Label::Numeric),
            Some(Converter::Int) => parse_int(column, raw).map(|v| Label::Numeric(v as f64)),
            Some(Converter::IntClass) => {
                parse_int(column, raw).map(|v| Label::Class(ClassLabel::Int(v)))
            }
            Some(Converter::Bool) => parse_bool(column, raw).map(Label::from),
            Some(Converter::Text) | None => Ok(Label::Class(ClassLabel::Text(raw.to_string()))),
        }
    }
}

fn parse_error(column: &str, value: &str, message: impl ToString) -> PipelineError {
    PipelineError::Parse {
        column: column.to_string(),
        value: value.to_string(),
        message: message.to_string(),
    }
}

fn parse_float(column: &str, raw: &str) -> Result<f64, PipelineError> {
    raw.parse::<f64>().map_err(|e| parse_error(column, raw, e))
}

fn parse_int(column: &str, raw: &str) -> Result<i64, PipelineError> {
    raw.parse::<i64>().map_err(|e| parse_error(column, raw, e))
}

fn parse_bool(column: &str, raw: &str) -> Result<bool, PipelineError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(parse_error(column, raw, "not a boolean")),
    }
}

fn parse_timestamp(column: &str, raw: &str, format: &str) -> Result<NaiveDateTime, PipelineError> {
    match NaiveDateTime::parse_from_str(raw, format) {
        Ok(ts) => Ok(ts),
        Err(err) => NaiveDate::parse_from_str(raw, format)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or_else(|| parse_error(column, raw, err)),
    }
}

/// Iterator over the rows of a CSV source.
///
/// Yields `Err` for a malformed row and keeps going; callers decide whether
/// to stop.
pub struct CsvStream<R: Read> {
    records: StringRecordsIntoIter<R>,
    headers: Vec<String>,
    options: CsvOptions,
    emitted: usize,
}

impl<R: Read> CsvStream<R> {
    /// Column names from the header row.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    fn parse_record(&self, record: &csv::StringRecord) -> Sample {
        let mut x = FeatureMap::new();
        let mut y = None;
        for (column, raw) in self.headers.iter().zip(record.iter()) {
            if raw.is_empty() || self.options.drop.contains(column) {
                continue;
            }
            if self.options.target.as_deref() == Some(column.as_str()) {
                y = Some(self.options.convert_label(column, raw)?);
            } else {
                x.insert(column.clone(), self.options.convert_feature(column, raw)?);
            }
        }
        Ok((x, y))
    }
}

impl<R: Read> Iterator for CsvStream<R> {
    type Item = Sample;

    fn next(&mut self) -> Option<Self::Item> {
        if self.options.limit.is_some_and(|limit| self.emitted >= limit) {
            return None;
        }
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(err) => return Some(Err(err.into())),
        };
        self.emitted += 1;
        Some(self.parse_record(&record))
    }
}

/// Streams samples from any CSV reader. The first row must be a header.
///
/// # Example
/// ```
/// use streamlearn::features::Label;
/// use streamlearn::stream::{iter_csv, Converter, CsvOptions};
///
/// let data = "x,y\n1.5,3\n2.5,5\n";
/// let options = CsvOptions::new()
///     .target("y")
///     .converter("x", Converter::Float)
///     .converter("y", Converter::Float);
///
/// let rows: Vec<_> = iter_csv(data.as_bytes(), options)
///     .unwrap()
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(rows.len(), 2);
/// assert_eq!(rows[1].1, Some(Label::Numeric(5.0)));
/// ```
pub fn iter_csv<R: Read>(reader: R, options: CsvOptions) -> Result<CsvStream<R>, PipelineError> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .trim(Trim::All)
        .from_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(String::from).collect();

    if let Some(target) = &options.target {
        if !headers.contains(target) {
            return Err(PipelineError::InvalidParameter(format!(
                "target column '{}' not found in CSV header",
                target
            )));
        }
    }
    debug!(columns = headers.len(), target = ?options.target, "opened CSV stream");

    Ok(CsvStream {
        records: rdr.into_records(),
        headers,
        options,
        emitted: 0,
    })
}

/// Streams samples from a CSV file.
pub fn iter_csv_path(
    path: impl AsRef<Path>,
    options: CsvOptions,
) -> Result<CsvStream<File>, PipelineError> {
    let file = File::open(path)?;
    iter_csv(file, options)
}
