//! Axis-range helpers over data and model sets.
//!
//! Each returns `None` when there is nothing to measure.

use crate::data::DataContainer;
use crate::model::ModelOutput;
use ndarray::Array1;

fn min_max<'a, I>(arrays: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = &'a Array1<f64>>,
{
    arrays
        .into_iter()
        .flat_map(|a| a.iter().copied())
        .fold(None, |acc, x| match acc {
            None => Some((x, x)),
            Some((lo, hi)) => Some((lo.min(x), hi.max(x))),
        })
}

pub fn min_max_domain_data(data: &DataContainer) -> Option<(f64, f64)> {
    min_max(data.iter().map(|d| d.domain()))
}

pub fn min_max_value_data(data: &DataContainer) -> Option<(f64, f64)> {
    min_max(data.iter().map(|d| d.values()))
}

pub fn min_max_domain_model(outputs: &[ModelOutput]) -> Option<(f64, f64)> {
    min_max(outputs.iter().map(|o| &o.domain))
}

pub fn min_max_value_model(outputs: &[ModelOutput]) -> Option<(f64, f64)> {
    min_max(outputs.iter().map(|o| &o.values))
}
