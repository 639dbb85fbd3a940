//! XY data container: paired `x`/`y` samples plus named uncertainty sources.
//!
//! The total uncertainty of an axis is the sum of the covariance matrices of
//! all *enabled* sources on that axis. Nothing here fits a model; the container
//! only describes the data and its errors.

use nalgebra::DMatrix;
use tracing::debug;

use crate::container::error_source::{ErrorEntry, ErrorMatch, GaussianError};
use crate::domain::{Axis, ErrorSourceSummary, ErrorValue, FitConfigFile, MatrixType, ResolvedPoint};
use crate::error::ContainerError;
use crate::math::{broadcast_checked, cor_from_cov, errors_from_cov, is_symmetric};

/// Total uncertainty of one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct TotalError {
    pub cov_mat: DMatrix<f64>,
}

impl TotalError {
    /// Pointwise total uncertainties.
    pub fn error(&self) -> Vec<f64> {
        errors_from_cov(&self.cov_mat)
    }

    pub fn cor_mat(&self) -> DMatrix<f64> {
        cor_from_cov(&self.cov_mat)
    }

    /// `None` if the covariance matrix is singular (e.g. an axis without errors).
    pub fn cov_mat_inverse(&self) -> Option<DMatrix<f64>> {
        self.cov_mat.clone().try_inverse()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct XyContainer {
    x: Vec<f64>,
    y: Vec<f64>,
    errors: Vec<ErrorEntry>,
    next_id: usize,
}

impl XyContainer {
    /// Create a container without any uncertainty sources.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self, ContainerError> {
        if x.len() != y.len() {
            return Err(ContainerError::DataLengthMismatch { x: x.len(), y: y.len() });
        }
        if x.is_empty() {
            return Err(ContainerError::EmptyData { axis: Axis::X });
        }
        check_finite(&x, Axis::X)?;
        check_finite(&y, Axis::Y)?;

        Ok(Self {
            x,
            y,
            errors: Vec::new(),
            next_id: 0,
        })
    }

    /// Build a container from a fit configuration, registering every declared
    /// error source in file order (`x_errors` first).
    pub fn from_config(config: &FitConfigFile) -> Result<Self, ContainerError> {
        let mut container = Self::new(config.x_data.clone(), config.y_data.clone())?;
        for axis in Axis::ALL {
            let Some(input) = config.errors(axis) else {
                continue;
            };
            for def in input.sources() {
                container.add_simple_error(
                    axis,
                    &def.error_value,
                    def.name.as_deref(),
                    def.correlation_coefficient,
                    def.relative,
                    def.splittable,
                )?;
            }
        }
        Ok(container)
    }

    /// Number of data points.
    pub fn size(&self) -> usize {
        self.x.len()
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn data(&self, axis: Axis) -> &[f64] {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
        }
    }

    /// Replace the data of one axis. The number of points cannot change.
    pub fn set_data(&mut self, axis: Axis, values: Vec<f64>) -> Result<(), ContainerError> {
        if values.len() != self.size() {
            return Err(ContainerError::ResizeNotAllowed {
                axis,
                expected: self.size(),
                got: values.len(),
            });
        }
        check_finite(&values, axis)?;
        match axis {
            Axis::X => self.x = values,
            Axis::Y => self.y = values,
        }
        Ok(())
    }

    pub fn set_x(&mut self, values: Vec<f64>) -> Result<(), ContainerError> {
        self.set_data(Axis::X, values)
    }

    pub fn set_y(&mut self, values: Vec<f64>) -> Result<(), ContainerError> {
        self.set_data(Axis::Y, values)
    }

    pub fn x_range(&self) -> (f64, f64) {
        min_max(&self.x)
    }

    pub fn y_range(&self) -> (f64, f64) {
        min_max(&self.y)
    }

    /// Add a simple uncertainty source and return its name.
    ///
    /// A scalar `value` applies to every point. If `relative` is set, the
    /// value is a fraction of `|data|`. The correlated part is separated by
    /// `split_errors` only if `splittable` is set and `ρ != 0`.
    pub fn add_simple_error(
        &mut self,
        axis: Axis,
        value: &ErrorValue,
        name: Option<&str>,
        correlation: f64,
        relative: bool,
        splittable: bool,
    ) -> Result<String, ContainerError> {
        let err_val = broadcast_checked(value, self.size(), axis)?;
        if !(0.0..=1.0).contains(&correlation) {
            return Err(ContainerError::InvalidCorrelation { axis, value: correlation });
        }

        let error = GaussianError::Simple {
            err_val,
            corr_coeff: correlation,
            relative,
        };
        self.push_error(axis, name, error, splittable && correlation != 0.0)
    }

    /// Add a matrix uncertainty source and return its name.
    ///
    /// A correlation matrix needs `err_val`; for a covariance matrix `err_val`
    /// is ignored. Matrix sources are never splittable.
    pub fn add_matrix_error(
        &mut self,
        axis: Axis,
        matrix: DMatrix<f64>,
        matrix_type: MatrixType,
        name: Option<&str>,
        err_val: Option<&ErrorValue>,
        relative: bool,
    ) -> Result<String, ContainerError> {
        let n = self.size();
        if matrix.nrows() != n || matrix.ncols() != n {
            return Err(ContainerError::MatrixShape {
                axis,
                rows: matrix.nrows(),
                cols: matrix.ncols(),
                expected: n,
            });
        }
        if matrix.iter().any(|v| !v.is_finite()) {
            return Err(ContainerError::MatrixNotFinite { axis });
        }
        if !is_symmetric(&matrix) {
            return Err(ContainerError::MatrixNotSymmetric { axis });
        }

        let err_val = match matrix_type {
            MatrixType::Covariance => {
                if let Some(index) = matrix.diagonal().iter().position(|v| *v < 0.0) {
                    return Err(ContainerError::InvalidErrorValue {
                        axis,
                        index,
                        value: matrix[(index, index)],
                    });
                }
                if err_val.is_some() {
                    debug!(%axis, "ignoring pointwise errors given with a covariance matrix");
                }
                None
            }
            MatrixType::Correlation => {
                let valid_diag = matrix.diagonal().iter().all(|v| (v - 1.0).abs() < 1e-9);
                let valid_range = matrix.iter().all(|v| (-1.0..=1.0).contains(v));
                if !valid_diag || !valid_range {
                    return Err(ContainerError::InvalidCorrelationMatrix { axis });
                }
                let value = err_val.ok_or(ContainerError::MissingErrorValues { axis })?;
                Some(broadcast_checked(value, n, axis)?)
            }
        };

        let error = GaussianError::Matrix {
            matrix,
            matrix_type,
            err_val,
            relative,
        };
        self.push_error(axis, name, error, false)
    }

    /// Exclude a source from the total uncertainty until re-enabled.
    pub fn disable_error(&mut self, name: &str) -> Result<(), ContainerError> {
        self.set_error_enabled(name, false)
    }

    pub fn enable_error(&mut self, name: &str) -> Result<(), ContainerError> {
        self.set_error_enabled(name, true)
    }

    /// Look up a source by name.
    pub fn error(&self, name: &str) -> Option<&ErrorEntry> {
        self.errors.iter().find(|e| e.name == name)
    }

    /// All registered sources, in insertion order.
    pub fn errors(&self) -> &[ErrorEntry] {
        &self.errors
    }

    pub fn matching_errors(&self, criteria: &ErrorMatch) -> Vec<&ErrorEntry> {
        self.errors.iter().filter(|e| criteria.matches(e)).collect()
    }

    pub fn error_summaries(&self) -> Vec<ErrorSourceSummary> {
        self.errors.iter().map(ErrorEntry::summary).collect()
    }

    /// Sum of the covariance matrices of all enabled sources on `axis`.
    pub fn total_error(&self, axis: Axis) -> TotalError {
        let n = self.size();
        let reference = self.data(axis);
        let cov_mat = self
            .enabled_on(axis)
            .fold(DMatrix::<f64>::zeros(n, n), |acc, e| acc + e.error.cov_mat(reference));
        TotalError { cov_mat }
    }

    pub fn x_err(&self) -> Vec<f64> {
        self.total_error(Axis::X).error()
    }

    pub fn y_err(&self) -> Vec<f64> {
        self.total_error(Axis::Y).error()
    }

    pub fn x_cov_mat(&self) -> DMatrix<f64> {
        self.total_error(Axis::X).cov_mat
    }

    pub fn y_cov_mat(&self) -> DMatrix<f64> {
        self.total_error(Axis::Y).cov_mat
    }

    /// Separate the fully correlated parts of the errors on `axis`.
    ///
    /// Returns `(G, U)` with the total covariance `V = Gᵀ G + U`. Row `k` of `G`
    /// is the shift of every data point caused by the `k`-th splittable
    /// source; `U` holds everything else.
    pub fn split_errors(&self, axis: Axis) -> (DMatrix<f64>, DMatrix<f64>) {
        let n = self.size();
        let reference = self.data(axis);

        let mut rows: Vec<Vec<f64>> = Vec::new();
        let mut uncor = DMatrix::<f64>::zeros(n, n);
        for entry in self.enabled_on(axis) {
            match entry.error.error_cor(reference) {
                Some(shift) if entry.splittable => {
                    rows.push(shift);
                    uncor += entry.error.cov_mat_uncor(reference);
                }
                _ => uncor += entry.error.cov_mat(reference),
            }
        }

        let g = DMatrix::from_fn(rows.len(), n, |k, i| rows[k][i]);
        (g, uncor)
    }

    pub fn has_errors(&self, axis: Axis) -> bool {
        self.errors.iter().any(|e| e.axis == axis)
    }

    pub fn has_x_errors(&self) -> bool {
        self.has_errors(Axis::X)
    }

    pub fn has_y_errors(&self) -> bool {
        self.has_errors(Axis::Y)
    }

    /// At least one x source is not fully correlated.
    pub fn has_uncor_x_errors(&self) -> bool {
        self.errors
            .iter()
            .any(|e| e.axis == Axis::X && e.error.correlation() != Some(1.0))
    }

    /// Data points paired with their total pointwise uncertainties.
    pub fn resolved_points(&self) -> Vec<ResolvedPoint> {
        let x_err = self.x_err();
        let y_err = self.y_err();
        (0..self.size())
            .map(|i| ResolvedPoint {
                x: self.x[i],
                x_err: x_err[i],
                y: self.y[i],
                y_err: y_err[i],
            })
            .collect()
    }

    fn enabled_on(&self, axis: Axis) -> impl Iterator<Item = &ErrorEntry> {
        self.errors.iter().filter(move |e| e.enabled && e.axis == axis)
    }

    fn push_error(
        &mut self,
        axis: Axis,
        name: Option<&str>,
        error: GaussianError,
        splittable: bool,
    ) -> Result<String, ContainerError> {
        let name = match name {
            Some(name) => {
                if self.error(name).is_some() {
                    return Err(ContainerError::DuplicateErrorName(name.to_string()));
                }
                name.to_string()
            }
            None => self.generate_name(axis),
        };
        self.next_id += 1;

        debug!(
            name = %name,
            %axis,
            kind = ?error.kind(),
            correlation = ?error.correlation(),
            relative = error.relative(),
            "registered error source"
        );
        self.errors.push(ErrorEntry {
            name: name.clone(),
            axis,
            enabled: true,
            splittable,
            error,
        });
        Ok(name)
    }

    fn generate_name(&self, axis: Axis) -> String {
        let mut id = self.next_id;
        loop {
            let candidate = format!("{axis}_error_{id}");
            if self.error(&candidate).is_none() {
                return candidate;
            }
            id += 1;
        }
    }

    fn set_error_enabled(&mut self, name: &str, enabled: bool) -> Result<(), ContainerError> {
        let entry = self
            .errors
            .iter_mut()
            .find(|e| e.name == name)
            .ok_or_else(|| ContainerError::UnknownErrorName(name.to_string()))?;
        entry.enabled = enabled;
        debug!(name, enabled, "toggled error source");
        Ok(())
    }
}

fn check_finite(values: &[f64], axis: Axis) -> Result<(), ContainerError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(ContainerError::NonFiniteData { axis, index }),
        None => Ok(()),
    }
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}
