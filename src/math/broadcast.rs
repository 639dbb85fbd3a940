//! Scalar-or-sequence broadcasting for error declarations.
//!
//! A scalar error `s` declared for `n` data points is the same as the
//! sequence `[s; n]`. A sequence must already have one entry per point.

use crate::domain::{Axis, ErrorValue};
use crate::error::ContainerError;

/// Expand an error value to one entry per data point.
pub fn broadcast(value: &ErrorValue, n: usize, axis: Axis) -> Result<Vec<f64>, ContainerError> {
    match value {
        ErrorValue::Scalar(s) => Ok(vec![*s; n]),
        ErrorValue::Pointwise(v) if v.len() == n => Ok(v.clone()),
        ErrorValue::Pointwise(v) => Err(ContainerError::ErrorLengthMismatch {
            axis,
            expected: n,
            got: v.len(),
        }),
    }
}

/// Broadcast and check that every entry is a usable uncertainty.
pub fn broadcast_checked(value: &ErrorValue, n: usize, axis: Axis) -> Result<Vec<f64>, ContainerError> {
    let out = broadcast(value, n, axis)?;
    check_error_values(&out, axis)?;
    Ok(out)
}

/// Errors must be finite and non-negative.
pub fn check_error_values(values: &[f64], axis: Axis) -> Result<(), ContainerError> {
    match values.iter().position(|v| !v.is_finite() || *v < 0.0) {
        Some(index) => Err(ContainerError::InvalidErrorValue {
            axis,
            index,
            value: values[index],
        }),
        None => Ok(()),
    }
}

/// Turn (possibly relative) error values into absolute ones.
pub fn absolute_errors(values: &[f64], relative: bool, reference: &[f64]) -> Vec<f64> {
    if !relative {
        return values.to_vec();
    }
    values.iter().zip(reference).map(|(e, r)| e * r.abs()).collect()
}

/// Elementwise `sqrt(a² + b²)`.
pub fn add_in_quadrature(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| x.hypot(*y)).collect()
}
