//! Covariance and correlation matrix helpers.
//!
//! All matrices are dense `n x n` (`n` = number of data points), which is fine
//! for the dataset sizes a fit configuration file holds.

use nalgebra::{DMatrix, DVector};

/// Covariance matrix of a simple error with a uniform correlation coefficient:
///
/// ```text
/// V_ii = σ_i²
/// V_ij = ρ σ_i σ_j   (i != j)
/// ```
pub fn simple_cov_mat(sigma: &[f64], rho: f64) -> DMatrix<f64> {
    let n = sigma.len();
    DMatrix::from_fn(n, n, |i, j| {
        if i == j {
            sigma[i] * sigma[i]
        } else {
            rho * sigma[i] * sigma[j]
        }
    })
}

/// Uncorrelated part of a simple error: `(1 - ρ) diag(σ²)`.
pub fn simple_uncor_cov_mat(sigma: &[f64], rho: f64) -> DMatrix<f64> {
    let diag = DVector::from_iterator(sigma.len(), sigma.iter().map(|s| (1.0 - rho) * s * s));
    DMatrix::from_diagonal(&diag)
}

/// Fully correlated component of a simple error: `sqrt(ρ) σ`.
pub fn simple_cor_component(sigma: &[f64], rho: f64) -> Vec<f64> {
    let scale = rho.sqrt();
    sigma.iter().map(|s| scale * s).collect()
}

/// `V_ij = C_ij σ_i σ_j`.
pub fn cov_from_cor(cor: &DMatrix<f64>, sigma: &[f64]) -> DMatrix<f64> {
    DMatrix::from_fn(cor.nrows(), cor.ncols(), |i, j| cor[(i, j)] * sigma[i] * sigma[j])
}

/// Scale every entry by `|r_i| |r_j|` (relative → absolute covariance).
pub fn scale_by_reference(mat: &DMatrix<f64>, reference: &[f64]) -> DMatrix<f64> {
    DMatrix::from_fn(mat.nrows(), mat.ncols(), |i, j| {
        mat[(i, j)] * reference[i].abs() * reference[j].abs()
    })
}

/// Pointwise uncertainties: square root of the diagonal.
pub fn errors_from_cov(cov: &DMatrix<f64>) -> Vec<f64> {
    cov.diagonal().iter().map(|v| v.max(0.0).sqrt()).collect()
}

/// Correlation matrix of a covariance matrix.
///
/// Points with zero uncertainty have no defined correlation; their rows and
/// columns are set to zero, with `1` on the diagonal.
pub fn cor_from_cov(cov: &DMatrix<f64>) -> DMatrix<f64> {
    let sigma = errors_from_cov(cov);
    DMatrix::from_fn(cov.nrows(), cov.ncols(), |i, j| {
        if i == j {
            1.0
        } else if sigma[i] > 0.0 && sigma[j] > 0.0 {
            cov[(i, j)] / (sigma[i] * sigma[j])
        } else {
            0.0
        }
    })
}

/// Symmetry check with a relative tolerance.
pub fn is_symmetric(mat: &DMatrix<f64>) -> bool {
    if !mat.is_square() {
        return false;
    }
    let n = mat.nrows();
    for i in 0..n {
        for j in (i + 1)..n {
            let a = mat[(i, j)];
            let b = mat[(j, i)];
            let tol = 1e-12 * a.abs().max(b.abs()).max(1.0);
            if (a - b).abs() > tol {
                return false;
            }
        }
    }
    true
}

/// Convert a matrix into row-major nested vectors (for JSON output).
pub fn to_rows(mat: &DMatrix<f64>) -> Vec<Vec<f64>> {
    mat.row_iter().map(|row| row.iter().copied().collect()).collect()
}
