//! Gaussian instrumental resolution smearing.

use crate::decorator::ModelDecorator;
use crate::error::Result;
use crate::model::{DatasetParams, ModelOutput};
use crate::parameters::{ConstantParameters, Parameter, ParameterSet};
use ndarray::Array1;
use std::f64::INFINITY;

/// Smears model values with a Gaussian of width `resolution * q`
///
/// The kernel is evaluated on the model's own domain and normalized per
/// point. Only the values are smeared; a cross term passes through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstrumentalResolution;

impl InstrumentalResolution {
    pub fn new() -> Self {
        Self
    }
}

impl ModelDecorator for InstrumentalResolution {
    fn name(&self) -> &str {
        "InstrumentalResolution"
    }

    fn attach(&self, params: &mut ParameterSet, _constants: &mut ConstantParameters) -> Result<()> {
        params.insert_new(Parameter::with_bounds("resolution", 0.0, 0.0, INFINITY)?.varying(false))?;
        Ok(())
    }

    fn transform(&self, view: &DatasetParams<'_>, mut output: ModelOutput) -> Result<ModelOutput> {
        let resolution = view.value("resolution")?;
        if resolution > 0.0 {
            output.values = smear(&output.domain, &output.values, resolution);
        }
        Ok(output)
    }
}

fn smear(domain: &Array1<f64>, values: &Array1<f64>, resolution: f64) -> Array1<f64> {
    Array1::from_iter(domain.iter().zip(values.iter()).map(|(&qi, &vi)| {
        let sigma = resolution * qi.abs();
        if sigma == 0.0 {
            return vi;
        }

        let (weighted, norm) = domain
            .iter()
            .zip(values.iter())
            .fold((0.0, 0.0), |(acc, total), (&qj, &vj)| {
                let w = (-(qj - qi).powi(2) / (2.0 * sigma * sigma)).exp();
                (acc + w * vj, total + w)
            });
        weighted / norm
    }))
}
