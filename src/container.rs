//! The composed model pipeline and its live parameter set.
//!
//! A [`ModelContainer`] owns a [`DecoratedModel`], the parameter set it
//! declared and one [`ModelSlot`] per dataset. Parameters that the experiment
//! marks as dataset specific are replaced by one namespaced copy per dataset
//! label (`i0` → `i0_xrr`, `i0_nr`).

use crate::data::{DataContainer, Suffix};
use crate::decorator::{DecoratedModel, ModelDecorator};
use crate::error::{ModelExpError, Result};
use crate::experiment::Experiment;
use crate::model::{DatasetParams, ModelComponent, ModelOutput};
use crate::parameters::{ConstantParameters, Parameter, ParameterSet};
use log::debug;
use ndarray::Array1;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// One model evaluation target: a domain plus the dataset it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSlot {
    pub suffix: Suffix,
    /// Dataset label used to resolve namespaced parameters
    pub label: Option<String>,
    pub domain: Array1<f64>,
    pub output: Option<ModelOutput>,
}

impl ModelSlot {
    fn new(suffix: Suffix, label: Option<String>, domain: Array1<f64>) -> Self {
        Self {
            suffix,
            label,
            domain,
            output: None,
        }
    }

    fn compute(&self, model: &DecoratedModel, params: &ParameterSet) -> Result<ModelOutput> {
        let view = DatasetParams::new(params, self.label.as_deref());
        let mut output = model.calc_model(&view, &self.domain)?;
        output.suffix = self.suffix.clone();
        Ok(output)
    }
}

/// Base model, decorators and the live parameters of one experiment
pub struct ModelContainer {
    model: DecoratedModel,
    params: ParameterSet,
    constants: ConstantParameters,
    dataset_specific: Vec<String>,
    labels: Vec<String>,
    slots: Vec<ModelSlot>,
}

impl ModelContainer {
    /// Compose `base` with `decorators` and declare its parameters
    ///
    /// Parameters are declared exactly once. Dataset-specific base names the
    /// model does not declare are skipped.
    pub fn new(
        base: Box<dyn ModelComponent>,
        decorators: Vec<Box<dyn ModelDecorator>>,
        experiment: &dyn Experiment,
    ) -> Result<Self> {
        let model = DecoratedModel::new(base, decorators)?;

        let mut params = ParameterSet::new();
        let mut constants = ConstantParameters::new();
        model.init_parameters(&mut params, &mut constants)?;

        let labels = experiment.dataset_labels();
        let mut dataset_specific = Vec::new();
        if !labels.is_empty() {
            for base in experiment.dataset_specific_params() {
                if !params.contains(&base) {
                    debug!("model '{}' has no dataset-specific parameter '{}'", model.name(), base);
                    continue;
                }
                params.fan_out(&base, &labels)?;
                dataset_specific.push(base);
            }
        }

        let domain = experiment.default_domain();
        let slots = if labels.is_empty() {
            vec![ModelSlot::new(Suffix::default(), None, domain)]
        } else {
            labels
                .iter()
                .map(|l| ModelSlot::new(Suffix::parse(l), Some(l.clone()), domain.clone()))
                .collect()
        };

        debug!(
            "composed '{}' with [{}]: {} parameters, {} slots",
            model.name(),
            model.decorator_names().join(", "),
            params.len(),
            slots.len()
        );

        Ok(Self {
            model,
            params,
            constants,
            dataset_specific,
            labels,
            slots,
        })
    }

    pub fn model(&self) -> &DecoratedModel {
        &self.model
    }

    pub fn name(&self) -> &str {
        self.model.name()
    }

    /// Use the domains of `data`, one slot per dataset in registration order
    ///
    /// With dataset labels, every dataset suffix must name exactly one label
    /// and each label must be used once. The new slots are calculated before
    /// they replace the current ones; on error the container is unchanged.
    pub fn bind_domains(&mut self, data: &DataContainer) -> Result<()> {
        let labels = self.slot_labels(data)?;
        let mut slots: Vec<ModelSlot> = data
            .iter()
            .zip(labels)
            .map(|(dataset, label)| {
                ModelSlot::new(dataset.suffix().clone(), label, dataset.domain().clone())
            })
            .collect();

        let outputs = self.evaluate_slots(&slots, &self.params)?;
        for (slot, output) in slots.iter_mut().zip(outputs) {
            slot.output = Some(output);
        }
        self.slots = slots;
        Ok(())
    }

    /// Dataset label of every dataset in `data`, matched on its suffix
    fn slot_labels(&self, data: &DataContainer) -> Result<Vec<Option<String>>> {
        if self.labels.is_empty() {
            return Ok(vec![None; data.n_datasets()]);
        }
        if data.n_datasets() != self.labels.len() {
            return Err(ModelExpError::ShapeMismatch(format!(
                "model '{}' has {} dataset labels, got {} datasets",
                self.name(),
                self.labels.len(),
                data.n_datasets()
            )));
        }

        let mut matched: Vec<Option<String>> = Vec::with_capacity(data.n_datasets());
        for dataset in data.iter() {
            let label = dataset.suffix().label();
            if !self.labels.contains(&label) {
                return Err(ModelExpError::Configuration(format!(
                    "dataset '{}' matches none of the labels [{}]",
                    label,
                    self.labels.join(", ")
                )));
            }
            if matched.iter().flatten().any(|l| *l == label) {
                return Err(ModelExpError::Configuration(format!(
                    "dataset label '{}' is used twice",
                    label
                )));
            }
            matched.push(Some(label));
        }
        Ok(matched)
    }

    /// Set value, bounds and vary flag
    ///
    /// An exact name sets that parameter only. A dataset-specific base name
    /// sets all of its copies; either all of them change or none does.
    pub fn set_param(&mut self, name: &str, value: f64, min: f64, max: f64, vary: bool) -> Result<()> {
        if self.params.contains(name) {
            self.params.get_mut(name)?.update(value, min, max, vary)?;
            return Ok(());
        }

        let family: Vec<String> = self
            .params
            .family(name)
            .into_iter()
            .map(|p| p.name().to_string())
            .collect();
        if family.is_empty() {
            return Err(ModelExpError::UnknownParameter(name.to_string()));
        }

        let mut updated = Vec::with_capacity(family.len());
        for member in &family {
            let mut param = self.params.get(member)?.clone();
            param.update(value, min, max, vary)?;
            updated.push(param);
        }
        for param in updated {
            self.params.add(param);
        }
        Ok(())
    }

    /// Set the copy of `base` that belongs to dataset `label`
    pub fn set_param_for(
        &mut self,
        base: &str,
        label: &str,
        value: f64,
        min: f64,
        max: f64,
        vary: bool,
    ) -> Result<()> {
        let name = format!("{}_{}", base, label);
        if !self.params.contains(&name) {
            return Err(ModelExpError::UnknownParameter(name));
        }
        self.set_param(&name, value, min, max, vary)
    }

    /// Parameter by exact name
    pub fn param(&self, name: &str) -> Result<&Parameter> {
        Ok(self.params.get(name)?)
    }

    /// Evaluate every slot on `params` without touching stored outputs
    pub fn evaluate(&self, params: &ParameterSet) -> Result<Vec<ModelOutput>> {
        self.evaluate_slots(&self.slots, params)
    }

    fn evaluate_slots(&self, slots: &[ModelSlot], params: &ParameterSet) -> Result<Vec<ModelOutput>> {
        #[cfg(feature = "parallel")]
        let outputs = slots
            .par_iter()
            .map(|slot| slot.compute(&self.model, params))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let outputs = slots
            .iter()
            .map(|slot| slot.compute(&self.model, params))
            .collect();

        outputs
    }

    /// Recompute and store every slot's output from the live parameters
    pub fn calc_model(&mut self) -> Result<()> {
        let outputs = self.evaluate(&self.params)?;
        for (slot, output) in self.slots.iter_mut().zip(outputs) {
            slot.output = Some(output);
        }
        Ok(())
    }

    pub fn update_model(&mut self) -> Result<()> {
        self.calc_model()
    }

    pub fn n_model_sets(&self) -> usize {
        self.slots.len()
    }

    /// Stored output of slot `index`
    pub fn get_model_set(&self, index: usize) -> Result<&ModelOutput> {
        let slot = self.slots.get(index).ok_or(ModelExpError::DatasetIndex {
            index,
            len: self.slots.len(),
        })?;
        slot.output.as_ref().ok_or_else(|| {
            ModelExpError::Configuration(format!(
                "model set {} has not been calculated yet",
                index
            ))
        })
    }

    /// Stored outputs of all slots; empty until calculated
    pub fn model_sets(&self) -> Vec<&ModelOutput> {
        self.slots.iter().filter_map(|s| s.output.as_ref()).collect()
    }

    pub fn slots(&self) -> &[ModelSlot] {
        &self.slots
    }

    pub fn dataset_labels(&self) -> &[String] {
        &self.labels
    }

    /// Base names replicated per dataset by this container
    pub fn dataset_specific(&self) -> &[String] {
        &self.dataset_specific
    }

    pub fn parameters(&self) -> &ParameterSet {
        &self.params
    }

    pub(crate) fn parameters_mut(&mut self) -> &mut ParameterSet {
        &mut self.params
    }

    /// Replace the live parameters with a snapshot
    pub fn restore_parameters(&mut self, snapshot: &ParameterSet) {
        self.params.restore(snapshot);
    }

    pub fn constant_parameters(&self) -> &ConstantParameters {
        &self.constants
    }

    /// Parameters the optimizer adjusts, in optimizer order
    pub fn varying_parameters(&self) -> Vec<&Parameter> {
        self.params.varying(&self.constants)
    }

    /// Parameters offered to the user for editing; constants are hidden
    pub fn exposed_parameters(&self) -> Vec<&Parameter> {
        self.params
            .iter()
            .filter(|p| !self.constants.contains(p.base_name()))
            .collect()
    }
}

impl std::fmt::Debug for ModelContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelContainer")
            .field("model", &self.model.name())
            .field("decorators", &self.model.decorator_names())
            .field("parameters", &self.params.names())
            .field("slots", &self.slots.len())
            .finish()
    }
}
