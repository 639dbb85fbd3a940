//! Uncertainty sources attached to one axis of an XY container.
//!
//! Error values are stored as given (possibly relative) and turned into
//! absolute values against the current reference data on every query, so a
//! relative error keeps following the data when it is replaced.

use nalgebra::DMatrix;
use regex::Regex;

use crate::domain::{Axis, ErrorKind, ErrorSourceSummary, MatrixType};
use crate::error::ContainerError;
use crate::math::{
    absolute_errors, cov_from_cor, errors_from_cov, scale_by_reference, simple_cor_component, simple_cov_mat,
    simple_uncor_cov_mat,
};

/// A Gaussian uncertainty source.
#[derive(Debug, Clone, PartialEq)]
pub enum GaussianError {
    /// Pointwise errors with a uniform correlation coefficient between points.
    Simple {
        err_val: Vec<f64>,
        corr_coeff: f64,
        relative: bool,
    },
    /// A full covariance (or correlation + pointwise errors) matrix.
    Matrix {
        matrix: DMatrix<f64>,
        matrix_type: MatrixType,
        err_val: Option<Vec<f64>>,
        relative: bool,
    },
}

impl GaussianError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GaussianError::Simple { .. } => ErrorKind::Simple,
            GaussianError::Matrix { .. } => ErrorKind::Matrix,
        }
    }

    /// Correlation coefficient (simple errors only).
    pub fn correlation(&self) -> Option<f64> {
        match self {
            GaussianError::Simple { corr_coeff, .. } => Some(*corr_coeff),
            GaussianError::Matrix { .. } => None,
        }
    }

    pub fn relative(&self) -> bool {
        match self {
            GaussianError::Simple { relative, .. } | GaussianError::Matrix { relative, .. } => *relative,
        }
    }

    /// Absolute covariance matrix for the given reference data.
    pub fn cov_mat(&self, reference: &[f64]) -> DMatrix<f64> {
        match self {
            GaussianError::Simple {
                err_val,
                corr_coeff,
                relative,
            } => simple_cov_mat(&absolute_errors(err_val, *relative, reference), *corr_coeff),
            GaussianError::Matrix {
                matrix,
                matrix_type: MatrixType::Covariance,
                relative,
                ..
            } => {
                if *relative {
                    scale_by_reference(matrix, reference)
                } else {
                    matrix.clone()
                }
            }
            GaussianError::Matrix {
                matrix,
                matrix_type: MatrixType::Correlation,
                err_val,
                relative,
            } => {
                // Presence of `err_val` is enforced when the error is added.
                let sigma = err_val
                    .as_deref()
                    .map(|e| absolute_errors(e, *relative, reference))
                    .unwrap_or_else(|| vec![0.0; matrix.nrows()]);
                cov_from_cor(matrix, &sigma)
            }
        }
    }

    /// Absolute pointwise uncertainties for the given reference data.
    pub fn error(&self, reference: &[f64]) -> Vec<f64> {
        match self {
            GaussianError::Simple { err_val, relative, .. } => absolute_errors(err_val, *relative, reference),
            GaussianError::Matrix { .. } => errors_from_cov(&self.cov_mat(reference)),
        }
    }

    /// Part of the covariance that is not fully correlated.
    ///
    /// Matrix errors cannot be decomposed and count as uncorrelated as a whole.
    pub fn cov_mat_uncor(&self, reference: &[f64]) -> DMatrix<f64> {
        match self {
            GaussianError::Simple {
                err_val,
                corr_coeff,
                relative,
            } => simple_uncor_cov_mat(&absolute_errors(err_val, *relative, reference), *corr_coeff),
            GaussianError::Matrix { .. } => self.cov_mat(reference),
        }
    }

    /// Fully correlated shift vector of a simple error (`None` for matrices).
    pub fn error_cor(&self, reference: &[f64]) -> Option<Vec<f64>> {
        match self {
            GaussianError::Simple {
                err_val,
                corr_coeff,
                relative,
            } => Some(simple_cor_component(
                &absolute_errors(err_val, *relative, reference),
                *corr_coeff,
            )),
            GaussianError::Matrix { .. } => None,
        }
    }
}

/// A named error source registered in a container.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorEntry {
    pub name: String,
    pub axis: Axis,
    pub enabled: bool,
    /// Whether the fully correlated part can be separated out (see `split_errors`).
    pub splittable: bool,
    pub error: GaussianError,
}

impl ErrorEntry {
    pub fn summary(&self) -> ErrorSourceSummary {
        ErrorSourceSummary {
            name: self.name.clone(),
            axis: self.axis,
            kind: self.error.kind(),
            correlation: self.error.correlation(),
            relative: self.error.relative(),
            enabled: self.enabled,
        }
    }
}

/// Criteria for `XyContainer::matching_errors`. Unset fields match anything.
#[derive(Debug, Clone, Default)]
pub struct ErrorMatch {
    /// Exact name.
    pub name: Option<String>,
    /// Regular expression anchored at the start of the name.
    pub name_pattern: Option<Regex>,
    pub axis: Option<Axis>,
    pub kind: Option<ErrorKind>,
    pub enabled: Option<bool>,
    /// Only simple errors can match this; `true` means `ρ > 0`.
    pub correlated: Option<bool>,
    pub splittable: Option<bool>,
}

impl ErrorMatch {
    pub fn axis(axis: Axis) -> Self {
        Self {
            axis: Some(axis),
            ..Self::default()
        }
    }

    pub fn name_pattern(pattern: &str) -> Result<Self, ContainerError> {
        let regex = Regex::new(&format!("^(?:{pattern})")).map_err(|e| ContainerError::InvalidNamePattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            name_pattern: Some(regex),
            ..Self::default()
        })
    }

    pub fn matches(&self, entry: &ErrorEntry) -> bool {
        if let Some(name) = &self.name {
            if &entry.name != name {
                return false;
            }
        }
        if let Some(pattern) = &self.name_pattern {
            if !pattern.is_match(&entry.name) {
                return false;
            }
        }
        if self.axis.is_some_and(|a| a != entry.axis) {
            return false;
        }
        if self.kind.is_some_and(|k| k != entry.error.kind()) {
            return false;
        }
        if self.enabled.is_some_and(|e| e != entry.enabled) {
            return false;
        }
        if self.splittable.is_some_and(|s| s != entry.splittable) {
            return false;
        }
        if let Some(correlated) = self.correlated {
            match entry.error.correlation() {
                Some(rho) => {
                    if (rho > 0.0) != correlated {
                        return false;
                    }
                }
                None => return false,
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_simple_error_tracks_reference() {
        let err = GaussianError::Simple {
            err_val: vec![0.1, 0.1],
            corr_coeff: 0.0,
            relative: true,
        };
        let e1 = err.error(&[10.0, 20.0]);
        let e2 = err.error(&[1.0, -2.0]);
        assert!((e1[0] - 1.0).abs() < 1e-12 && (e1[1] - 2.0).abs() < 1e-12);
        assert!((e2[0] - 0.1).abs() < 1e-12 && (e2[1] - 0.2).abs() < 1e-12);
    }

    #[test]
    fn correlation_matrix_error_uses_err_val() {
        let err = GaussianError::Matrix {
            matrix: DMatrix::from_row_slice(2, 2, &[1.0, 0.5, 0.5, 1.0]),
            matrix_type: MatrixType::Correlation,
            err_val: Some(vec![2.0, 4.0]),
            relative: false,
        };
        let cov = err.cov_mat(&[0.0, 0.0]);
        assert!((cov[(0, 0)] - 4.0).abs() < 1e-12);
        assert!((cov[(0, 1)] - 4.0).abs() < 1e-12);
        assert!((cov[(1, 1)] - 16.0).abs() < 1e-12);
        assert_eq!(err.error(&[0.0, 0.0]), vec![2.0, 4.0]);
        assert!(err.error_cor(&[0.0, 0.0]).is_none());
    }

    #[test]
    fn match_on_correlation_skips_matrix_errors() {
        let simple = ErrorEntry {
            name: "a".to_string(),
            axis: Axis::Y,
            enabled: true,
            splittable: true,
            error: GaussianError::Simple {
                err_val: vec![0.1],
                corr_coeff: 0.5,
                relative: false,
            },
        };
        let matrix = ErrorEntry {
            name: "b".to_string(),
            axis: Axis::Y,
            enabled: true,
            splittable: false,
            error: GaussianError::Matrix {
                matrix: DMatrix::from_element(1, 1, 0.01),
                matrix_type: MatrixType::Covariance,
                err_val: None,
                relative: false,
            },
        };
        let criteria = ErrorMatch {
            correlated: Some(true),
            ..ErrorMatch::default()
        };
        assert!(criteria.matches(&simple));
        assert!(!criteria.matches(&matrix));
        assert!(ErrorMatch::axis(Axis::Y).matches(&matrix));
        assert!(!ErrorMatch::axis(Axis::X).matches(&matrix));
    }
}
