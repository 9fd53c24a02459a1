//! Step calculation for the Levenberg-Marquardt algorithm.
//!
//! This module provides functionality for computing the Levenberg-Marquardt step,
//! which combines the Gauss-Newton and gradient descent steps.

use super::config::DecompositionMethod;
use crate::utils::matrix_convert::{
    nalgebra_vec_to_ndarray, ndarray_to_nalgebra, ndarray_vec_to_nalgebra,
};
use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};

/// Result of a Levenberg-Marquardt step calculation.
#[derive(Debug, Clone)]
pub struct StepResult {
    /// The calculated step vector
    pub step: Array1<f64>,

    /// The reduction in cost predicted by the linearized model
    pub predicted_reduction: f64,
}

impl StepResult {
    /// Ratio of the actual to the predicted cost reduction
    ///
    /// Zero when the linear model predicts no reduction.
    pub fn gain_ratio(&self, actual_reduction: f64) -> f64 {
        if self.predicted_reduction > 0.0 {
            actual_reduction / self.predicted_reduction
        } else {
            0.0
        }
    }
}

/// Handles step calculation for the Levenberg-Marquardt algorithm.
pub struct LmStep;

impl LmStep {
    /// Calculates the Levenberg-Marquardt step.
    ///
    /// Solves `(J^T J + λ I) δ = -J^T r`. Returns `None` if the damped system
    /// is singular.
    ///
    /// # Arguments
    ///
    /// * `jacobian` - The Jacobian matrix at the current position
    /// * `residuals` - The residuals at the current position
    /// * `lambda` - The damping parameter
    /// * `method` - The method to use for matrix decomposition
    pub fn calculate_step(
        jacobian: &Array2<f64>,
        residuals: &Array1<f64>,
        lambda: f64,
        method: DecompositionMethod,
    ) -> Option<StepResult> {
        let j_t_j = jacobian.t().dot(jacobian);
        let j_t_r = jacobian.t().dot(residuals);

        let mut a = ndarray_to_nalgebra(&j_t_j);
        for i in 0..a.nrows() {
            a[(i, i)] += lambda;
        }
        let b = -ndarray_vec_to_nalgebra(&j_t_r);

        let solution = match method {
            DecompositionMethod::Cholesky => Self::solve_cholesky(a, &b),
            DecompositionMethod::Lu => Self::solve_lu(a, &b),
            DecompositionMethod::Auto => {
                Self::solve_cholesky(a.clone(), &b).or_else(|| Self::solve_lu(a, &b))
            }
        }?;

        let step = nalgebra_vec_to_ndarray(&solution);
        if step.iter().any(|s| !s.is_finite()) {
            return None;
        }

        let predicted_reduction = Self::predicted_reduction(&j_t_j, &j_t_r, &step);

        Some(StepResult {
            step,
            predicted_reduction,
        })
    }

    fn solve_cholesky(a: DMatrix<f64>, b: &DVector<f64>) -> Option<DVector<f64>> {
        a.cholesky().map(|chol| chol.solve(b))
    }

    fn solve_lu(a: DMatrix<f64>, b: &DVector<f64>) -> Option<DVector<f64>> {
        a.lu().solve(b)
    }

    /// Reduction of `||r + J δ||^2` relative to `||r||^2`.
    fn predicted_reduction(j_t_j: &Array2<f64>, j_t_r: &Array1<f64>, step: &Array1<f64>) -> f64 {
        -2.0 * step.dot(j_t_r) - step.dot(&j_t_j.dot(step))
    }
}
