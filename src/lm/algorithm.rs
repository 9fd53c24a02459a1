//! Implementation of the Levenberg-Marquardt algorithm.
//!
//! This module contains the core implementation of the Levenberg-Marquardt
//! algorithm for nonlinear least-squares optimization.

use log::{debug, trace};
use ndarray::{Array1, Array2};
use std::fmt;

use crate::error::{ModelExpError, Result};
use crate::problem::Problem;

use super::config::{DecompositionMethod, LmConfig};
use super::convergence::{ConvergenceCriteria, ConvergenceStatus};
use super::step::LmStep;

/// Result of the Levenberg-Marquardt optimization.
#[derive(Debug, Clone)]
pub struct LmResult {
    /// Optimized parameter values
    pub params: Array1<f64>,

    /// Residuals at the solution
    pub residuals: Array1<f64>,

    /// Sum of squared residuals
    pub cost: f64,

    /// Number of iterations performed
    pub iterations: usize,

    /// Number of function evaluations
    pub func_evals: usize,

    /// Whether the optimization succeeded
    pub success: bool,

    /// Why the solver stopped
    pub status: ConvergenceStatus,

    /// A message describing the result
    pub message: String,

    /// The Jacobian matrix at the solution (if requested)
    pub jacobian: Option<Array2<f64>>,
}

impl fmt::Display for LmResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Optimization Result:")?;
        writeln!(f, "  Success: {}", self.success)?;
        writeln!(f, "  Message: {}", self.message)?;
        writeln!(f, "  Cost: {:.6e}", self.cost)?;
        writeln!(f, "  Iterations: {}", self.iterations)?;
        writeln!(f, "  Function evaluations: {}", self.func_evals)?;
        writeln!(f, "  Parameters: {:?}", self.params)?;
        Ok(())
    }
}

/// The Levenberg-Marquardt optimizer.
#[derive(Debug, Clone, Default)]
pub struct LevenbergMarquardt {
    /// Configuration options
    config: LmConfig,
}

impl LevenbergMarquardt {
    /// Create a new Levenberg-Marquardt optimizer with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new Levenberg-Marquardt optimizer with the given configuration.
    pub fn with_config(config: LmConfig) -> Self {
        Self { config }
    }

    /// Create a new Levenberg-Marquardt optimizer with default configuration.
    pub fn with_default_config() -> Self {
        Self::default()
    }

    pub fn config(&self) -> &LmConfig {
        &self.config
    }

    /// Set the maximum number of iterations.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    /// Set the tolerance for change in residual norm.
    pub fn with_ftol(mut self, ftol: f64) -> Self {
        self.config.ftol = ftol;
        self
    }

    /// Set the tolerance for change in parameter values.
    pub fn with_xtol(mut self, xtol: f64) -> Self {
        self.config.xtol = xtol;
        self
    }

    /// Set the tolerance for gradient norm.
    pub fn with_gtol(mut self, gtol: f64) -> Self {
        self.config.gtol = gtol;
        self
    }

    /// Set the initial value for the damping parameter.
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.config.initial_lambda = lambda;
        self
    }

    /// Set the factor by which to increase lambda.
    pub fn with_lambda_up_factor(mut self, factor: f64) -> Self {
        self.config.lambda_up_factor = factor;
        self
    }

    /// Set the factor by which to decrease lambda.
    pub fn with_lambda_down_factor(mut self, factor: f64) -> Self {
        self.config.lambda_down_factor = factor;
        self
    }

    /// Set the method used for solving the linear system.
    pub fn with_decomposition_method(mut self, method: DecompositionMethod) -> Self {
        self.config.decomposition_method = method;
        self
    }

    /// Set whether to calculate and return the Jacobian at the solution.
    pub fn with_calc_jacobian(mut self, calc_jacobian: bool) -> Self {
        self.config.calc_jacobian = calc_jacobian;
        self
    }

    /// Minimize the sum of squared residuals for the given problem.
    ///
    /// A trial step whose residuals cannot be evaluated because the trial
    /// point lies outside the residual's numeric domain is rejected like a
    /// step that increases the cost. Any other evaluation error aborts.
    ///
    /// # Arguments
    ///
    /// * `problem` - The problem to solve
    /// * `initial_params` - Initial guess for the parameter values
    pub fn minimize<P: Problem + ?Sized>(
        &self,
        problem: &P,
        initial_params: Array1<f64>,
    ) -> Result<LmResult> {
        let n_params = problem.parameter_count();
        if initial_params.len() != n_params {
            return Err(ModelExpError::DimensionMismatch(format!(
                "Expected {} parameters, got {}",
                n_params,
                initial_params.len()
            )));
        }

        let criteria = ConvergenceCriteria::from(&self.config);
        let mut params = initial_params;
        let mut lambda = self.config.initial_lambda;

        let mut residuals = problem.eval(&params)?;
        let mut cost = sum_of_squares(&residuals);
        let mut func_evals = 1;

        if !cost.is_finite() {
            return Err(ModelExpError::FitFailed(
                "Initial cost is not finite".to_string(),
            ));
        }

        let mut iterations = 0;

        let status = 'outer: loop {
            let jacobian = problem.jacobian(&params)?;
            if !problem.has_custom_jacobian() {
                func_evals += n_params + 1;
            }

            let gradient_norm = l2_norm(&jacobian.t().dot(&residuals));
            debug!(
                "LM iteration {}: cost = {:.6e}, |g| = {:.3e}, lambda = {:.1e}",
                iterations, cost, gradient_norm, lambda
            );

            if criteria.gradient_converged(gradient_norm) {
                break ConvergenceStatus::GradientConvergence;
            }
            if iterations >= self.config.max_iterations {
                break ConvergenceStatus::MaxIterationsReached;
            }

            // Raise lambda until a step decreases the cost
            loop {
                let step = match LmStep::calculate_step(
                    &jacobian,
                    &residuals,
                    lambda,
                    self.config.decomposition_method,
                ) {
                    Some(step) => step,
                    None => {
                        trace!("Singular damped system at lambda = {:.1e}", lambda);
                        lambda *= self.config.lambda_up_factor;
                        if lambda > self.config.max_lambda {
                            break 'outer ConvergenceStatus::NumericalError;
                        }
                        continue;
                    }
                };

                let new_params = &params + &step.step;
                func_evals += 1;
                let new_residuals = match problem.eval(&new_params) {
                    Ok(r) => Some(r),
                    Err(ModelExpError::NumericDomain(msg)) => {
                        trace!("Trial step left the residual domain: {}", msg);
                        None
                    }
                    Err(e) => return Err(e),
                };
                let new_cost = new_residuals
                    .as_ref()
                    .map(sum_of_squares)
                    .unwrap_or(f64::INFINITY);

                if let (Some(new_residuals), true) = (new_residuals, new_cost < cost) {
                    iterations += 1;
                    let outcome = criteria.check(
                        &params,
                        &new_params,
                        cost,
                        new_cost,
                        gradient_norm,
                        iterations,
                    );

                    let gain = step.gain_ratio(cost - new_cost);
                    trace!("Accepted step with gain ratio {:.3}", gain);
                    if gain > GAIN_THRESHOLD {
                        lambda = (lambda * self.config.lambda_down_factor).max(self.config.min_lambda);
                    }

                    params = new_params;
                    residuals = new_residuals;
                    cost = new_cost;

                    match outcome {
                        ConvergenceStatus::Running => continue 'outer,
                        // Re-check the gradient at the accepted point
                        ConvergenceStatus::MaxIterationsReached => continue 'outer,
                        other => break 'outer other,
                    }
                }

                // A rejected step that is already below xtol means we are at
                // the minimum to working precision.
                if ConvergenceCriteria::relative_step(&params, &new_params) < criteria.xtol {
                    break 'outer ConvergenceStatus::ParameterConvergence;
                }

                lambda *= self.config.lambda_up_factor;
                if lambda > self.config.max_lambda {
                    break 'outer ConvergenceStatus::DampingExhausted;
                }
            }
        };

        let jacobian = if self.config.calc_jacobian {
            Some(problem.jacobian(&params)?)
        } else {
            None
        };

        Ok(LmResult {
            params,
            residuals,
            cost,
            iterations,
            func_evals,
            success: status.is_converged(),
            status,
            message: status.description().to_string(),
            jacobian,
        })
    }
}

/// Accepted steps below this gain ratio leave the damping unchanged
const GAIN_THRESHOLD: f64 = 0.25;

fn sum_of_squares(residuals: &Array1<f64>) -> f64 {
    residuals.iter().map(|r| r * r).sum()
}

fn l2_norm(v: &Array1<f64>) -> f64 {
    sum_of_squares(v).sqrt()
}
