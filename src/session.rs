//! An experiment session: data, model and fit in one explicit context.
//!
//! ```text
//! Unconfigured ──set_data──▶ DataBound ──set_model──▶ ModelBound ──set_fit──▶ FitReady
//! ```
//!
//! `set_model` is also allowed before any data is bound; the model is then
//! evaluated on the experiment's default domain. Replacing the model drops
//! the fit engine and its history.

use crate::container::ModelContainer;
use crate::data::DataContainer;
use crate::decorator::ModelDecorator;
use crate::error::{ModelExpError, Result};
use crate::experiment::{self, residuals, Experiment};
use crate::export;
use crate::fit::{FitEngine, FitReport};
use crate::lm::LmConfig;
use crate::model::{ModelComponent, ModelOutput};
use log::debug;
use ndarray::Array1;
use std::path::Path;

/// Configuration stage of a [`Session`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unconfigured,
    DataBound,
    ModelBound,
    FitReady,
}

pub struct Session {
    experiment: Box<dyn Experiment>,
    data: Option<DataContainer>,
    model: Option<ModelContainer>,
    engine: Option<FitEngine>,
}

impl Session {
    pub fn new(experiment: Box<dyn Experiment>) -> Self {
        Self {
            experiment,
            data: None,
            model: None,
            engine: None,
        }
    }

    pub fn experiment(&self) -> &dyn Experiment {
        self.experiment.as_ref()
    }

    pub fn state(&self) -> SessionState {
        match (&self.data, &self.model, &self.engine) {
            (_, _, Some(_)) => SessionState::FitReady,
            (_, Some(_), None) => SessionState::ModelBound,
            (Some(_), None, None) => SessionState::DataBound,
            (None, None, None) => SessionState::Unconfigured,
        }
    }

    /// Bind the measured datasets
    ///
    /// The dataset count must match the experiment. A bound model is moved
    /// onto the new domains and recomputed; if that fails, data and model
    /// stay as they were.
    pub fn set_data(&mut self, data: DataContainer) -> Result<()> {
        if let Some(expected) = self.experiment.expected_datasets() {
            if data.n_datasets() != expected {
                return Err(ModelExpError::ShapeMismatch(format!(
                    "{} expects {} datasets, got {}",
                    self.experiment.name(),
                    expected,
                    data.n_datasets()
                )));
            }
        }
        if data.is_empty() {
            return Err(ModelExpError::Configuration("no datasets given".to_string()));
        }

        if let Some(model) = self.model.as_mut() {
            model.bind_domains(&data)?;
        }
        debug!(
            "bound {} datasets ({} points) to {}",
            data.n_datasets(),
            data.total_points(),
            self.experiment.name()
        );
        self.data = Some(data);
        Ok(())
    }

    /// Compose and bind a model, replacing any previous one
    pub fn set_model(
        &mut self,
        base: Box<dyn ModelComponent>,
        decorators: Vec<Box<dyn ModelDecorator>>,
    ) -> Result<()> {
        let mut model = ModelContainer::new(base, decorators, self.experiment.as_ref())?;
        match &self.data {
            Some(data) => model.bind_domains(data)?,
            None => model.calc_model()?,
        }

        self.model = Some(model);
        self.engine = None;
        Ok(())
    }

    /// Create the fit engine; needs data and model
    pub fn set_fit(&mut self, config: LmConfig) -> Result<()> {
        if self.data.is_none() || self.model.is_none() {
            return Err(ModelExpError::Configuration(
                "set data and model before configuring the fit".to_string(),
            ));
        }
        match self.engine.as_mut() {
            Some(engine) => engine.set_config(config),
            None => self.engine = Some(FitEngine::with_config(config)),
        }
        Ok(())
    }

    pub fn data(&self) -> Option<&DataContainer> {
        self.data.as_ref()
    }

    pub fn model(&self) -> Option<&ModelContainer> {
        self.model.as_ref()
    }

    pub fn engine(&self) -> Option<&FitEngine> {
        self.engine.as_ref()
    }

    fn model_mut(&mut self) -> Result<&mut ModelContainer> {
        self.model
            .as_mut()
            .ok_or_else(|| ModelExpError::Configuration("no model set".to_string()))
    }

    /// Set a parameter and recompute the model
    pub fn set_param(&mut self, name: &str, value: f64, min: f64, max: f64, vary: bool) -> Result<()> {
        let model = self.model_mut()?;
        model.set_param(name, value, min, max, vary)?;
        model.update_model()
    }

    /// Set the copy of `base` for dataset `label` and recompute the model
    pub fn set_param_for(
        &mut self,
        base: &str,
        label: &str,
        value: f64,
        min: f64,
        max: f64,
        vary: bool,
    ) -> Result<()> {
        let model = self.model_mut()?;
        model.set_param_for(base, label, value, min, max, vary)?;
        model.update_model()
    }

    pub fn update_model(&mut self) -> Result<()> {
        self.model_mut()?.update_model()
    }

    fn bound(&self) -> Result<(&DataContainer, &ModelContainer)> {
        match (&self.data, &self.model) {
            (Some(data), Some(model)) => Ok((data, model)),
            _ => Err(ModelExpError::Configuration(
                "data and model must both be set".to_string(),
            )),
        }
    }

    fn outputs(model: &ModelContainer) -> Vec<ModelOutput> {
        model.model_sets().into_iter().cloned().collect()
    }

    /// Residual vector with `x` written into the varying parameters
    ///
    /// `x` holds external values in optimizer order. The live parameters
    /// keep `x` afterwards.
    pub fn residuum(&mut self, x: &Array1<f64>) -> Result<Array1<f64>> {
        self.bound()?;
        let model = self.model_mut()?;

        let names: Vec<String> = model
            .varying_parameters()
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        if names.len() != x.len() {
            return Err(ModelExpError::DimensionMismatch(format!(
                "{} varying parameters, got {} values",
                names.len(),
                x.len()
            )));
        }

        let mut trial = model.parameters().snapshot();
        for (name, &value) in names.iter().zip(x) {
            trial.set_value(name, value)?;
        }
        *model.parameters_mut() = trial;
        model.calc_model()?;

        let (data, model) = self.bound()?;
        residuals(self.experiment.as_ref(), data, &Self::outputs(model))
    }

    /// Run a fit; needs [`Session::set_fit`] first
    pub fn fit(&mut self) -> Result<FitReport> {
        let (Some(data), Some(model), Some(engine)) =
            (self.data.as_ref(), self.model.as_mut(), self.engine.as_mut())
        else {
            return Err(ModelExpError::Configuration(
                "fit is not configured; call set_fit first".to_string(),
            ));
        };
        engine.fit(self.experiment.as_ref(), data, model)
    }

    pub fn step_back(&mut self) -> Result<bool> {
        match (self.engine.as_mut(), self.model.as_mut()) {
            (Some(engine), Some(model)) => engine.step_back(model),
            _ => Ok(false),
        }
    }

    pub fn step_forward(&mut self) -> Result<bool> {
        match (self.engine.as_mut(), self.model.as_mut()) {
            (Some(engine), Some(model)) => engine.step_forward(model),
            _ => Ok(false),
        }
    }

    pub fn min_max_domain_data(&self) -> Option<(f64, f64)> {
        self.data.as_ref().and_then(experiment::min_max_domain_data)
    }

    pub fn min_max_value_data(&self) -> Option<(f64, f64)> {
        self.data.as_ref().and_then(experiment::min_max_value_data)
    }

    pub fn min_max_domain_model(&self) -> Option<(f64, f64)> {
        let outputs = Self::outputs(self.model.as_ref()?);
        experiment::min_max_domain_model(&outputs)
    }

    pub fn min_max_value_model(&self) -> Option<(f64, f64)> {
        let outputs = Self::outputs(self.model.as_ref()?);
        experiment::min_max_value_model(&outputs)
    }

    /// Write data and model sets in the result block format
    pub fn write_results<W: std::io::Write>(&self, writer: &mut W) -> Result<()> {
        let outputs = self.model.as_ref().map(Self::outputs);
        export::write_results(
            writer,
            &self.experiment.axis_labels(),
            self.data.as_ref(),
            outputs.as_deref(),
        )
    }

    pub fn save_results<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let outputs = self.model.as_ref().map(Self::outputs);
        export::save_results(
            path,
            &self.experiment.axis_labels(),
            self.data.as_ref(),
            outputs.as_deref(),
        )
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("experiment", &self.experiment.name())
            .field("state", &self.state())
            .field("model", &self.model)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Dataset, Suffix};
    use crate::experiment::Sas;
    use crate::model::BaseModel;
    use crate::parameters::ParameterSet;
    use ndarray::array;

    fn line() -> Box<dyn ModelComponent> {
        let mut template = ParameterSet::new();
        template.add_param("a", 5.0).unwrap();
        Box::new(BaseModel::new("line", template, |view, x| Ok(x * view.value("a")?)))
    }

    fn data() -> DataContainer {
        vec![Dataset::new(
            array![1.0, 2.0, 3.0],
            array![10.0, 20.0, 30.0],
            array![1.0, 1.0, 1.0],
            Suffix::default(),
        )
        .unwrap()]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_transitions() {
        let mut session = Session::new(Box::new(Sas::new()));
        assert_eq!(session.state(), SessionState::Unconfigured);
        assert!(matches!(
            session.set_fit(LmConfig::default()),
            Err(ModelExpError::Configuration(_))
        ));
        assert!(matches!(session.fit(), Err(ModelExpError::Configuration(_))));

        session.set_data(data()).unwrap();
        assert_eq!(session.state(), SessionState::DataBound);
        assert!(session.set_fit(LmConfig::default()).is_err());

        session.set_model(line(), vec![]).unwrap();
        assert_eq!(session.state(), SessionState::ModelBound);
        assert_eq!(session.model().unwrap().get_model_set(0).unwrap().len(), 3);

        session.set_fit(LmConfig::default()).unwrap();
        assert_eq!(session.state(), SessionState::FitReady);

        session.set_model(line(), vec![]).unwrap();
        assert_eq!(session.state(), SessionState::ModelBound);
    }

    #[test]
    fn test_model_before_data_uses_default_domain() {
        let mut session = Session::new(Box::new(Sas::new()));
        session.set_model(line(), vec![]).unwrap();
        assert_eq!(session.model().unwrap().get_model_set(0).unwrap().len(), 200);

        session.set_data(data()).unwrap();
        assert_eq!(session.model().unwrap().get_model_set(0).unwrap().len(), 3);
        assert_eq!(session.min_max_domain_model(), Some((1.0, 3.0)));
    }

    #[test]
    fn test_residuum_writes_live_parameters() {
        let mut session = Session::new(Box::new(Sas::new()));
        session.set_data(data()).unwrap();
        session.set_model(line(), vec![]).unwrap();

        let r = session.residuum(&array![10.0]).unwrap();
        assert_eq!(r.len(), 3);
        assert!(r.iter().all(|v| v.abs() < 1e-12));
        assert_eq!(session.model().unwrap().param("a").unwrap().value(), 10.0);

        assert!(matches!(
            session.residuum(&array![1.0, 2.0]),
            Err(ModelExpError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_failed_set_data_keeps_previous_state() {
        let mut template = ParameterSet::new();
        template.add_param("a", 1.0).unwrap();
        let limited = BaseModel::new("limited", template, |view, x| {
            if x.iter().any(|&v| v > 1.5) {
                return Err(ModelExpError::Configuration("x out of range".to_string()));
            }
            Ok(x * view.value("a")?)
        });

        let mut session = Session::new(Box::new(Sas::new()));
        session.set_model(Box::new(limited), vec![]).unwrap();
        assert_eq!(session.model().unwrap().get_model_set(0).unwrap().len(), 200);

        let data: DataContainer = vec![Dataset::new(
            array![1.0, 2.0],
            array![1.0, 2.0],
            array![1.0, 1.0],
            Suffix::default(),
        )
        .unwrap()]
        .into_iter()
        .collect();
        assert!(session.set_data(data).is_err());

        assert!(session.data().is_none());
        assert_eq!(session.state(), SessionState::ModelBound);
        assert_eq!(session.model().unwrap().get_model_set(0).unwrap().len(), 200);
    }

    #[test]
    fn test_history_without_engine_is_noop() {
        let mut session = Session::new(Box::new(Sas::new()));
        assert!(!session.step_back().unwrap());
        assert!(!session.step_forward().unwrap());
    }
}
