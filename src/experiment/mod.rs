//! Experiments: residual definitions and dataset contracts.
//!
//! An [`Experiment`] decides how many datasets it expects, which parameters
//! are replicated per dataset, which domain a model uses before data is bound
//! and how data and model are compared.

mod ranges;
mod reflectometry;
mod sas;

pub use ranges::{min_max_domain_data, min_max_domain_model, min_max_value_data, min_max_value_model};
pub use reflectometry::SimultaneousXrrNr;
pub use sas::Sas;

use crate::data::{DataContainer, Dataset};
use crate::error::{ModelExpError, Result};
use crate::model::ModelOutput;
use ndarray::{Array1, Zip};

/// How one dataset's residuals are computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResidualKind {
    /// `(ln I_data - ln I_model) * I_data / sigma`
    #[default]
    LogWeighted,
    /// `(I_data - I_model) / sigma`
    Linear,
}

impl ResidualKind {
    /// Residuals for aligned data and model values
    pub fn residual(&self, data: &Dataset, model: &Array1<f64>) -> Result<Array1<f64>> {
        let mut out = Array1::zeros(data.len());
        let mut failure = None;

        Zip::from(&mut out)
            .and(data.values())
            .and(data.errors())
            .and(model)
            .for_each(|r, &d, &sigma, &m| {
                if failure.is_some() {
                    return;
                }
                if sigma <= 0.0 {
                    failure = Some(format!("non-positive error {} in '{}'", sigma, data.suffix()));
                    return;
                }
                *r = match self {
                    ResidualKind::Linear => (d - m) / sigma,
                    ResidualKind::LogWeighted => {
                        if d <= 0.0 || m <= 0.0 {
                            failure = Some(format!(
                                "log residual needs positive intensities, got data {} model {} in '{}'",
                                d,
                                m,
                                data.suffix()
                            ));
                            return;
                        }
                        (d.ln() - m.ln()) * d / sigma
                    }
                };
            });

        match failure {
            Some(message) => Err(ModelExpError::NumericDomain(message)),
            None => Ok(out),
        }
    }
}

/// Axis captions used by displays and the export header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisLabels {
    pub domain: String,
    pub value: String,
    pub error: String,
    pub model: String,
}

/// A kind of measurement that models are fit against
pub trait Experiment: Send + Sync {
    fn name(&self) -> &str;

    /// Labels of the expected datasets; empty for single-dataset experiments
    fn dataset_labels(&self) -> Vec<String> {
        Vec::new()
    }

    /// Base names replicated once per dataset label
    fn dataset_specific_params(&self) -> Vec<String> {
        Vec::new()
    }

    /// Required number of datasets, `None` if any number works
    fn expected_datasets(&self) -> Option<usize> {
        None
    }

    /// Domain used for model evaluation before data is bound
    fn default_domain(&self) -> Array1<f64>;

    fn residual_kind(&self) -> ResidualKind;

    fn axis_labels(&self) -> AxisLabels;

    /// Residuals of one dataset against its model output
    fn residual(&self, data: &Dataset, model: &ModelOutput) -> Result<Array1<f64>> {
        check_alignment(data, model)?;
        self.residual_kind().residual(data, &model.values)
    }
}

/// Check that a model output was computed on the dataset's domain
pub fn check_alignment(data: &Dataset, model: &ModelOutput) -> Result<()> {
    if data.len() != model.len() {
        return Err(ModelExpError::ShapeMismatch(format!(
            "dataset '{}' has {} points, model {}",
            data.suffix(),
            data.len(),
            model.len()
        )));
    }
    let aligned = data
        .domain()
        .iter()
        .zip(model.domain.iter())
        .all(|(a, b)| (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1e-300));
    if !aligned {
        return Err(ModelExpError::ShapeMismatch(format!(
            "model domain differs from the domain of dataset '{}'",
            data.suffix()
        )));
    }
    Ok(())
}

/// Residual vector over all datasets in registration order
///
/// Every dataset is checked for alignment before any residual is computed.
pub fn residuals(
    experiment: &dyn Experiment,
    data: &DataContainer,
    outputs: &[ModelOutput],
) -> Result<Array1<f64>> {
    if let Some(expected) = experiment.expected_datasets() {
        if data.n_datasets() != expected {
            return Err(ModelExpError::ShapeMismatch(format!(
                "{} expects {} datasets, got {}",
                experiment.name(),
                expected,
                data.n_datasets()
            )));
        }
    }
    if outputs.len() != data.n_datasets() {
        return Err(ModelExpError::ShapeMismatch(format!(
            "{} model sets for {} datasets",
            outputs.len(),
            data.n_datasets()
        )));
    }
    for (dataset, output) in data.iter().zip(outputs) {
        check_alignment(dataset, output)?;
    }

    let mut all = Vec::with_capacity(data.total_points());
    for (dataset, output) in data.iter().zip(outputs) {
        all.extend(experiment.residual(dataset, output)?.iter().copied());
    }
    Ok(Array1::from(all))
}
