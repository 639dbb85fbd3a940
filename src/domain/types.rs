//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - deserialized straight from a YAML fit configuration
//! - used in-memory while building the XY container
//! - exported to JSON/CSV

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;

use crate::error::ContainerError;

/// Data axis of an XY dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub const ALL: [Axis; 2] = [Axis::X, Axis::Y];

    /// Numeric axis id (`0` for x, `1` for y).
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for Axis {
    type Err = ContainerError;

    /// Accepts `x`/`y` (any case) as well as the numeric ids `0`/`1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" | "0" => Ok(Axis::X),
            "y" | "1" => Ok(Axis::Y),
            _ => Err(ContainerError::UnknownAxis(s.to_string())),
        }
    }
}

/// An error value as written in a configuration file.
///
/// A scalar applies to every data point; a sequence applies pointwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ErrorValue {
    Scalar(f64),
    Pointwise(Vec<f64>),
}

impl ErrorValue {
    fn from_yaml(value: &Value) -> Result<Self, String> {
        match value {
            Value::Number(n) => n
                .as_f64()
                .map(ErrorValue::Scalar)
                .ok_or_else(|| format!("{n} is not representable as a float")),
            Value::Sequence(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    item.as_f64()
                        .ok_or_else(|| format!("item {i} is not a number (found {})", describe(item)))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(ErrorValue::Pointwise),
            other => Err(format!("expected a number or a list of numbers, found {}", describe(other))),
        }
    }
}

impl<'de> Deserialize<'de> for ErrorValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        ErrorValue::from_yaml(&value).map_err(D::Error::custom)
    }
}

impl From<f64> for ErrorValue {
    fn from(value: f64) -> Self {
        ErrorValue::Scalar(value)
    }
}

impl From<Vec<f64>> for ErrorValue {
    fn from(value: Vec<f64>) -> Self {
        ErrorValue::Pointwise(value)
    }
}

/// A fully specified simple uncertainty source. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorSourceDef {
    #[serde(alias = "err_val")]
    pub error_value: ErrorValue,
    /// Correlation coefficient between any two distinct data points.
    #[serde(default, alias = "correlation")]
    pub correlation_coefficient: f64,
    /// If set, `error_value` is a fraction of the absolute data value.
    #[serde(default)]
    pub relative: bool,
    #[serde(default)]
    pub name: Option<String>,
    /// Set to `false` to keep a correlated source out of the `G` matrix of
    /// `XyContainer::split_errors`.
    #[serde(default = "default_splittable")]
    pub splittable: bool,
}

fn default_splittable() -> bool {
    true
}

impl ErrorSourceDef {
    pub fn uncorrelated(error_value: ErrorValue) -> Self {
        Self {
            error_value,
            correlation_coefficient: 0.0,
            relative: false,
            name: None,
            splittable: true,
        }
    }
}

/// The value of an `x_errors` / `y_errors` key.
///
/// A list of numbers is the pointwise form, a list of mappings the
/// multi-source form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ErrorInput {
    Scalar(f64),
    Pointwise(Vec<f64>),
    Source(ErrorSourceDef),
    Sources(Vec<ErrorSourceDef>),
}

impl ErrorInput {
    /// Normalize every accepted form into a list of sources.
    pub fn sources(&self) -> Vec<ErrorSourceDef> {
        match self {
            ErrorInput::Scalar(v) => vec![ErrorSourceDef::uncorrelated(ErrorValue::Scalar(*v))],
            ErrorInput::Pointwise(v) => vec![ErrorSourceDef::uncorrelated(ErrorValue::Pointwise(v.clone()))],
            ErrorInput::Source(def) => vec![def.clone()],
            ErrorInput::Sources(defs) => defs.clone(),
        }
    }

    fn from_yaml(value: &Value) -> Result<Self, String> {
        match value {
            Value::Sequence(items) if items.iter().any(Value::is_mapping) => items
                .iter()
                .enumerate()
                .map(|(i, item)| source_from_yaml(item).map_err(|e| format!("source {i}: {e}")))
                .collect::<Result<Vec<_>, _>>()
                .map(ErrorInput::Sources),
            Value::Number(_) | Value::Sequence(_) => match ErrorValue::from_yaml(value)? {
                ErrorValue::Scalar(v) => Ok(ErrorInput::Scalar(v)),
                ErrorValue::Pointwise(v) => Ok(ErrorInput::Pointwise(v)),
            },
            Value::Mapping(_) => source_from_yaml(value).map(ErrorInput::Source),
            other => Err(format!(
                "expected a number, a list of numbers, an error source mapping or a list of \
                 error source mappings, found {}",
                describe(other)
            )),
        }
    }
}

impl<'de> Deserialize<'de> for ErrorInput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        ErrorInput::from_yaml(&value).map_err(D::Error::custom)
    }
}

fn source_from_yaml(value: &Value) -> Result<ErrorSourceDef, String> {
    if !value.is_mapping() {
        return Err(format!("expected an error source mapping, found {}", describe(value)));
    }
    serde_yaml::from_value(value.clone()).map_err(|e| e.to_string())
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean `{b}`"),
        Value::Number(n) => format!("number `{n}`"),
        Value::String(s) => format!("string `{s}`"),
        Value::Sequence(_) => "a list".to_string(),
        Value::Mapping(_) => "a mapping".to_string(),
        Value::Tagged(tagged) => format!("tagged value `{}`", tagged.tag),
    }
}

fn x_errors_field<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<ErrorInput>, D::Error> {
    errors_field(deserializer, "x_errors")
}

fn y_errors_field<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<ErrorInput>, D::Error> {
    errors_field(deserializer, "y_errors")
}

/// Parse an `x_errors` / `y_errors` value; errors name the key.
fn errors_field<'de, D: Deserializer<'de>>(deserializer: D, key: &str) -> Result<Option<ErrorInput>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    ErrorInput::from_yaml(&value)
        .map(Some)
        .map_err(|e| D::Error::custom(format!("invalid `{key}`: {e}")))
}

/// Interpretation of a user supplied error matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatrixType {
    #[serde(alias = "cov")]
    Covariance,
    #[serde(alias = "cor")]
    Correlation,
}

impl FromStr for MatrixType {
    type Err = ContainerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cov" | "covariance" => Ok(MatrixType::Covariance),
            "cor" | "correlation" => Ok(MatrixType::Correlation),
            _ => Err(ContainerError::UnknownMatrixType(s.to_string())),
        }
    }
}

/// Kind of an error entry stored in the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Simple,
    Matrix,
}

/// A fit configuration as written on disk.
///
/// ```yaml
/// x_data: [1.0, 2.0, 3.0, 4.0]
/// x_errors: [0.05, 0.10, 0.15, 0.20]   # optional
/// y_data: [2.3, 4.2, 7.5, 9.4]
/// y_errors: 0.4
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitConfigFile {
    /// Container type; only `xy` is understood.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_label: Option<String>,

    pub x_data: Vec<f64>,
    #[serde(default, deserialize_with = "x_errors_field", skip_serializing_if = "Option::is_none")]
    pub x_errors: Option<ErrorInput>,
    pub y_data: Vec<f64>,
    /// Required; a missing key is reported as `ConfigError::MissingYErrors`.
    #[serde(default, deserialize_with = "y_errors_field", skip_serializing_if = "Option::is_none")]
    pub y_errors: Option<ErrorInput>,

    /// Keys this crate does not interpret (e.g. model function settings).
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl FitConfigFile {
    pub fn data(&self, axis: Axis) -> &[f64] {
        match axis {
            Axis::X => &self.x_data,
            Axis::Y => &self.y_data,
        }
    }

    pub fn errors(&self, axis: Axis) -> Option<&ErrorInput> {
        match axis {
            Axis::X => self.x_errors.as_ref(),
            Axis::Y => self.y_errors.as_ref(),
        }
    }

    pub fn size(&self) -> usize {
        self.x_data.len()
    }
}

/// Summary of a single error source (for reports and exports).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorSourceSummary {
    pub name: String,
    pub axis: Axis,
    pub kind: ErrorKind,
    pub correlation: Option<f64>,
    pub relative: bool,
    pub enabled: bool,
}

/// One data point with its total absolute uncertainties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPoint {
    pub x: f64,
    pub x_err: f64,
    pub y: f64,
    pub y_err: f64,
}

/// A saved resolved dataset (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedFile {
    pub tool: String,
    pub generated: chrono::DateTime<chrono::Utc>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub x_label: Option<String>,
    #[serde(default)]
    pub y_label: Option<String>,
    pub points: Vec<ResolvedPoint>,
    pub x_cov_mat: Vec<Vec<f64>>,
    pub y_cov_mat: Vec<Vec<f64>>,
    pub sources: Vec<ErrorSourceSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_parses_names_and_ids() {
        assert_eq!("x".parse::<Axis>().unwrap(), Axis::X);
        assert_eq!("Y".parse::<Axis>().unwrap(), Axis::Y);
        assert_eq!("0".parse::<Axis>().unwrap(), Axis::X);
        assert_eq!("1".parse::<Axis>().unwrap(), Axis::Y);
        assert!(matches!("z".parse::<Axis>(), Err(ContainerError::UnknownAxis(_))));
    }

    #[test]
    fn error_input_forms_deserialize() {
        let scalar: ErrorInput = serde_yaml::from_str("0.4").unwrap();
        assert_eq!(scalar, ErrorInput::Scalar(0.4));

        let int_scalar: ErrorInput = serde_yaml::from_str("1").unwrap();
        assert_eq!(int_scalar, ErrorInput::Scalar(1.0));

        let list: ErrorInput = serde_yaml::from_str("[0.05, 0.10]").unwrap();
        assert_eq!(list, ErrorInput::Pointwise(vec![0.05, 0.10]));

        let source: ErrorInput =
            serde_yaml::from_str("{error_value: 0.1, correlation_coefficient: 0.5, name: cal}").unwrap();
        let ErrorInput::Source(def) = source else {
            panic!("expected a single source");
        };
        assert_eq!(def.error_value, ErrorValue::Scalar(0.1));
        assert_eq!(def.correlation_coefficient, 0.5);
        assert!(!def.relative);
        assert_eq!(def.name.as_deref(), Some("cal"));

        let sources: ErrorInput =
            serde_yaml::from_str("[{error_value: [0.1, 0.2]}, {error_value: 0.05, relative: true}]").unwrap();
        let ErrorInput::Sources(defs) = sources else {
            panic!("expected a source list");
        };
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].error_value, ErrorValue::Pointwise(vec![0.1, 0.2]));
        assert!(defs[1].relative);
        assert!(defs[1].splittable);
    }

    #[test]
    fn misspelled_source_keys_are_rejected() {
        let err = serde_yaml::from_str::<ErrorInput>("{error_value: 0.1, corelation_coefficient: 0.9}").unwrap_err();
        assert!(err.to_string().contains("unknown field `corelation_coefficient`"), "{err}");

        let err = serde_yaml::from_str::<ErrorInput>("[{error_value: 0.1}, {error_value: 0.2, relatve: true}]")
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("source 1"), "{message}");
        assert!(message.contains("relatve"), "{message}");
    }

    #[test]
    fn malformed_error_lists_name_the_offending_item() {
        let err = serde_yaml::from_str::<ErrorInput>("[0.1, oops]").unwrap_err();
        assert!(err.to_string().contains("item 1 is not a number (found string `oops`)"), "{err}");

        let err = serde_yaml::from_str::<ErrorInput>("true").unwrap_err();
        assert!(err.to_string().contains("found boolean `true`"), "{err}");
    }

    #[test]
    fn splittable_key_is_read() {
        let source: ErrorInput =
            serde_yaml::from_str("{error_value: 0.1, correlation_coefficient: 0.5, splittable: false}").unwrap();
        let ErrorInput::Source(def) = source else {
            panic!("expected a single source");
        };
        assert!(!def.splittable);
    }

    #[test]
    fn matrix_type_accepts_short_names() {
        assert_eq!("cov".parse::<MatrixType>().unwrap(), MatrixType::Covariance);
        assert_eq!("Correlation".parse::<MatrixType>().unwrap(), MatrixType::Correlation);
        assert!("diag".parse::<MatrixType>().is_err());
    }
}
