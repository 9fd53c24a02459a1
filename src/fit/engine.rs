use crate::container::ModelContainer;
use crate::data::DataContainer;
use crate::error::{ModelExpError, Result};
use crate::experiment::Experiment;
use crate::fit::history::FitHistory;
use crate::fit::problem::FitProblem;
use crate::fit::report::FitReport;
use crate::lm::{LevenbergMarquardt, LmConfig, LmResult};
use crate::parameters::ParameterSet;
use ndarray::Array2;
use crate::problem::Problem;
use crate::uncertainty::{
    calculate_correlation, calculate_covariance, scale_covariance, standard_errors_from_covariance,
};
use log::{debug, info, warn};

/// Runs Levenberg-Marquardt fits and keeps their history
#[derive(Debug, Clone, Default)]
pub struct FitEngine {
    config: LmConfig,
    history: FitHistory,
}

impl FitEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LmConfig) -> Self {
        Self {
            config,
            history: FitHistory::new(),
        }
    }

    pub fn config(&self) -> &LmConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: LmConfig) {
        self.config = config;
    }

    pub fn history(&self) -> &FitHistory {
        &self.history
    }

    /// Fit the varying parameters of `model` to `data`
    ///
    /// On success the fitted values and standard errors are written into the
    /// model, its sets are recomputed and the new state is appended to the
    /// history. Errors found before the solver starts keep their kind; a
    /// solver that fails to converge gives [`ModelExpError::FitFailed`]. In
    /// both cases the parameters keep their pre-fit values.
    pub fn fit(
        &mut self,
        experiment: &dyn Experiment,
        data: &DataContainer,
        model: &mut ModelContainer,
    ) -> Result<FitReport> {
        let before = model.parameters().snapshot();
        let (fitted, report) = self.solve(experiment, data, model)?;

        model.restore_parameters(&fitted);
        if let Err(e) = model.calc_model() {
            warn!("recomputing the fitted model failed, restoring pre-fit parameters: {}", e);
            model.restore_parameters(&before);
            return Err(e);
        }

        self.history.record(before, fitted);
        info!(
            "fit of '{}' finished after {} iterations: chisqr = {:.6e}, redchi = {:.6e}",
            model.name(),
            report.iterations,
            report.chisqr,
            report.redchi
        );
        Ok(report)
    }

    fn solve(
        &self,
        experiment: &dyn Experiment,
        data: &DataContainer,
        model: &ModelContainer,
    ) -> Result<(ParameterSet, FitReport)> {
        let problem = FitProblem::new(experiment, data, model)?;
        let x0 = problem.initial_internal()?;

        // surfaces shape and domain errors at the starting point
        let initial = problem.eval(&x0)?;
        debug!(
            "fitting {} parameters to {} points, initial cost {:.6e}",
            problem.parameter_count(),
            initial.len(),
            initial.iter().map(|r| r * r).sum::<f64>()
        );

        let solver = LevenbergMarquardt::with_config(self.config.clone());
        let result = match solver.minimize(&problem, x0) {
            Ok(result) if result.success => result,
            Ok(result) => {
                warn!("fit did not converge: {}", result.message);
                return Err(ModelExpError::FitFailed(result.message));
            }
            Err(e) => {
                warn!("fit aborted: {}", e);
                return Err(ModelExpError::FitFailed(e.to_string()));
            }
        };

        let mut fitted = problem.apply(&result.params)?;
        let covar = external_covariance(&problem, &result);
        let stderr = match &covar {
            Some(covar) => standard_errors_from_covariance(covar),
            None => vec![None; problem.parameter_count()],
        };
        for (name, e) in problem.names().iter().zip(&stderr) {
            fitted.get_mut(name)?.set_stderr(*e);
        }

        let npoints = result.residuals.len();
        let nvarys = problem.parameter_count();
        let report = FitReport {
            success: result.success,
            message: result.message.clone(),
            iterations: result.iterations,
            nfev: result.func_evals,
            chisqr: result.cost,
            redchi: if npoints > nvarys {
                result.cost / (npoints - nvarys) as f64
            } else {
                f64::NAN
            },
            npoints,
            names: problem.names().to_vec(),
            values: problem
                .names()
                .iter()
                .map(|n| fitted.value(n))
                .collect::<std::result::Result<Vec<f64>, _>>()?,
            stderr,
            correl: covar.as_ref().map(|c| {
                calculate_correlation(c)
                    .outer_iter()
                    .map(|row| row.to_vec())
                    .collect()
            }),
        };
        Ok((fitted, report))
    }

    /// Restore the previous history state; `false` at the oldest state
    pub fn step_back(&mut self, model: &mut ModelContainer) -> Result<bool> {
        match self.history.step_back() {
            Some(snapshot) => {
                model.restore_parameters(snapshot);
                model.calc_model()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Restore the next history state; `false` at the newest state
    pub fn step_forward(&mut self, model: &mut ModelContainer) -> Result<bool> {
        match self.history.step_forward() {
            Some(snapshot) => {
                model.restore_parameters(snapshot);
                model.calc_model()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Covariance of the varying parameters in external coordinates
fn external_covariance(problem: &FitProblem<'_>, result: &LmResult) -> Option<Array2<f64>> {
    let jacobian = result.jacobian.as_ref()?;
    match calculate_covariance(jacobian, result.cost) {
        Ok(covar) => Some(scale_covariance(&covar, &problem.derivative_scale(&result.params))),
        Err(e) => {
            debug!("no standard errors: {}", e);
            None
        }
    }
}
