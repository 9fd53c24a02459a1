//! Polarized (SANSPOL) magnetic contribution.

use crate::decorator::ModelDecorator;
use crate::error::{ModelExpError, Result};
use crate::model::{ComputationPath, DatasetParams, ModelOutput};
use crate::parameters::{ConstantParameters, Parameter, ParameterSet};

/// Adds `polarization * cross_term` to the base model's magnetic curve
///
/// Injects `sin2alpha` (squared sine of the angle between q and the field)
/// and `polarization`. Both start fixed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Magnetic;

impl Magnetic {
    pub fn new() -> Self {
        Self
    }
}

impl ModelDecorator for Magnetic {
    fn name(&self) -> &str {
        "Magnetic"
    }

    fn computation_path(&self) -> Option<ComputationPath> {
        Some(ComputationPath::Magnetic)
    }

    fn attach(&self, params: &mut ParameterSet, _constants: &mut ConstantParameters) -> Result<()> {
        params.insert_new(Parameter::with_bounds("sin2alpha", 1.0, 0.0, 1.0)?.varying(false))?;
        params.insert_new(Parameter::with_bounds("polarization", 0.0, -1.0, 1.0)?.varying(false))?;
        Ok(())
    }

    fn transform(&self, view: &DatasetParams<'_>, mut output: ModelOutput) -> Result<ModelOutput> {
        let polarization = view.value("polarization")?;
        let cross_term = output.cross_term.as_ref().ok_or_else(|| {
            ModelExpError::Configuration(
                "magnetic decorator needs a model output with a cross term".to_string(),
            )
        })?;
        output.values.scaled_add(polarization, cross_term);
        Ok(output)
    }
}
