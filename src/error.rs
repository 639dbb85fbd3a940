//! Error types.
//!
//! The library reports typed errors (`ConfigError`, `ContainerError`); the
//! binary folds them into an `AppError` that carries the process exit code.
//!
//! Exit codes:
//! - `2`: the input could not be read or parsed
//! - `3`: the input parsed but describes an invalid dataset
//! - `4`: an output could not be written

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::Axis;

/// Errors raised while building or mutating an XY container.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContainerError {
    #[error("No axis with id '{0}' (expected one of: x, y, 0, 1)")]
    UnknownAxis(String),

    #[error("Unknown matrix type '{0}' (expected one of: cov, covariance, cor, correlation)")]
    UnknownMatrixType(String),

    #[error("x_data and y_data must have the same length (got {x} and {y})")]
    DataLengthMismatch { x: usize, y: usize },

    #[error("{axis} data must contain at least one point")]
    EmptyData { axis: Axis },

    #[error("New {axis} data has length {got}, expected {expected}")]
    ResizeNotAllowed { axis: Axis, expected: usize, got: usize },

    #[error("Non-finite {axis} data value at index {index}")]
    NonFiniteData { axis: Axis, index: usize },

    #[error("{axis} errors have length {got}, expected {expected} (one per data point)")]
    ErrorLengthMismatch { axis: Axis, expected: usize, got: usize },

    #[error("Invalid {axis} error value {value} at index {index} (must be finite and >= 0)")]
    InvalidErrorValue { axis: Axis, index: usize, value: f64 },

    #[error("Invalid correlation coefficient {value} for {axis} errors (must be within [0, 1])")]
    InvalidCorrelation { axis: Axis, value: f64 },

    #[error("An error source named '{0}' already exists")]
    DuplicateErrorName(String),

    #[error("No error source named '{0}'")]
    UnknownErrorName(String),

    #[error("Invalid error name pattern '{pattern}': {message}")]
    InvalidNamePattern { pattern: String, message: String },

    #[error("Error matrix for {axis} has shape {rows}x{cols}, expected {expected}x{expected}")]
    MatrixShape { axis: Axis, rows: usize, cols: usize, expected: usize },

    #[error("Error matrix for {axis} is not symmetric")]
    MatrixNotSymmetric { axis: Axis },

    #[error("Error matrix for {axis} contains non-finite entries")]
    MatrixNotFinite { axis: Axis },

    #[error("Correlation matrix for {axis} must have ones on the diagonal and entries within [-1, 1]")]
    InvalidCorrelationMatrix { axis: Axis },

    #[error("A correlation matrix for {axis} requires pointwise error values")]
    MissingErrorValues { axis: Axis },
}

/// Errors raised while loading a fit configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read fit configuration '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid fit configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Unsupported container type '{0}' (only 'xy' is supported)")]
    UnsupportedType(String),

    #[error("Missing required key: `y_errors`")]
    MissingYErrors,

    #[error(transparent)]
    Invalid(#[from] ContainerError),
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        let exit_code = match &err {
            ConfigError::Io { .. } | ConfigError::Parse(_) => 2,
            ConfigError::UnsupportedType(_) | ConfigError::MissingYErrors | ConfigError::Invalid(_) => 3,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl From<ContainerError> for AppError {
    fn from(err: ContainerError) -> Self {
        AppError::new(3, err.to_string())
    }
}
