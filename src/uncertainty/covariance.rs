//! # Covariance Matrix Calculations
//!
//! Covariance and standard errors from the Jacobian at a least-squares
//! solution.

use crate::error::{ModelExpError, Result};
use crate::utils::{nalgebra_to_ndarray, ndarray_to_nalgebra};
use ndarray::{Array1, Array2};

/// Covariance matrix estimate from the Jacobian at the solution
///
///   covar = inv(J^T J) * chisqr / (m - n)
///
/// Requires more residuals than parameters and a non-singular `J^T J`.
pub fn calculate_covariance(jacobian: &Array2<f64>, chisqr: f64) -> Result<Array2<f64>> {
    let (m, n) = jacobian.dim();
    if m <= n {
        return Err(ModelExpError::DimensionMismatch(format!(
            "covariance needs more residuals ({}) than parameters ({})",
            m, n
        )));
    }

    let j = ndarray_to_nalgebra(jacobian);
    let jtj = j.transpose() * &j;
    let inverse = jtj.try_inverse().ok_or(ModelExpError::SingularMatrix)?;

    let redchi = chisqr / (m - n) as f64;
    Ok(nalgebra_to_ndarray(&(inverse * redchi)))
}

/// Calculate correlation matrix from covariance matrix.
///
///   correl[i,j] = covar[i,j] / sqrt(covar[i,i] * covar[j,j])
pub fn calculate_correlation(covar: &Array2<f64>) -> Array2<f64> {
    let n = covar.nrows();
    Array2::from_shape_fn((n, n), |(i, j)| {
        if i == j {
            return 1.0;
        }
        let denom = (covar[[i, i]] * covar[[j, j]]).sqrt();
        if denom > 0.0 {
            covar[[i, j]] / denom
        } else {
            0.0
        }
    })
}

/// Square roots of the diagonal; negative or non-finite variances give `None`
pub fn standard_errors_from_covariance(covar: &Array2<f64>) -> Vec<Option<f64>> {
    covar
        .diag()
        .iter()
        .map(|&v| if v >= 0.0 && v.is_finite() { Some(v.sqrt()) } else { None })
        .collect()
}

/// Covariance of external parameters from the internal-space estimate
///
/// `scale[i]` is `d external / d internal` of parameter `i`.
pub fn scale_covariance(covar: &Array2<f64>, scale: &Array1<f64>) -> Array2<f64> {
    let n = covar.nrows();
    Array2::from_shape_fn((n, n), |(i, j)| covar[[i, j]] * scale[i] * scale[j])
}
