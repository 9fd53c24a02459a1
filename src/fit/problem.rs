use crate::container::ModelContainer;
use crate::data::DataContainer;
use crate::error::{ModelExpError, Result};
use crate::experiment::{residuals, Experiment};
use crate::parameters::{BoundsTransform, ParameterSet};
use crate::problem::Problem;
use ndarray::Array1;

/// Least-squares problem over the varying parameters of a model
///
/// The optimizer works on bounds-transformed internal values. Every
/// evaluation writes them into a copy of the live parameters, so the
/// container is never modified while the solver runs.
pub(crate) struct FitProblem<'a> {
    experiment: &'a dyn Experiment,
    data: &'a DataContainer,
    model: &'a ModelContainer,
    template: ParameterSet,
    names: Vec<String>,
    transforms: Vec<BoundsTransform>,
}

impl<'a> FitProblem<'a> {
    pub fn new(
        experiment: &'a dyn Experiment,
        data: &'a DataContainer,
        model: &'a ModelContainer,
    ) -> Result<Self> {
        let varying = model.varying_parameters();
        if varying.is_empty() {
            return Err(ModelExpError::Configuration(
                "no varying parameters to fit".to_string(),
            ));
        }

        let names = varying.iter().map(|p| p.name().to_string()).collect();
        let transforms = varying.iter().map(|p| p.bounds_transform()).collect();

        Ok(Self {
            experiment,
            data,
            model,
            template: model.parameters().snapshot(),
            names,
            transforms,
        })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Internal start vector from the current parameter values
    pub fn initial_internal(&self) -> Result<Array1<f64>> {
        self.names
            .iter()
            .map(|name| Ok(self.template.get(name)?.to_internal()?))
            .collect::<Result<Vec<f64>>>()
            .map(Array1::from)
    }

    /// Copy of the live parameters with `internal` written into the varying ones
    pub fn apply(&self, internal: &Array1<f64>) -> Result<ParameterSet> {
        let mut params = self.template.clone();
        for ((name, transform), &x) in self.names.iter().zip(&self.transforms).zip(internal) {
            let value = transform.to_external(x);
            if !value.is_finite() {
                return Err(ModelExpError::NumericDomain(format!(
                    "non-finite trial value for '{}'",
                    name
                )));
            }
            params.set_value(name, value)?;
        }
        Ok(params)
    }

    /// `d external / d internal` per varying parameter
    pub fn derivative_scale(&self, internal: &Array1<f64>) -> Array1<f64> {
        self.transforms
            .iter()
            .zip(internal)
            .map(|(t, &x)| t.external_derivative(x))
            .collect()
    }
}

impl Problem for FitProblem<'_> {
    fn eval(&self, params: &Array1<f64>) -> Result<Array1<f64>> {
        let trial = self.apply(params)?;
        let outputs = self.model.evaluate(&trial)?;
        residuals(self.experiment, self.data, &outputs)
    }

    fn parameter_count(&self) -> usize {
        self.names.len()
    }

    fn residual_count(&self) -> usize {
        self.data.total_points()
    }
}
