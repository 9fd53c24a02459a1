//! Parameter definition and implementation
//!
//! A [`Parameter`] is a named scalar with bounds and a vary flag. Parameters
//! that were fanned out per dataset (e.g. `i0_xrr`) remember the canonical
//! name they were created from.

use crate::parameters::bounds::{Bounds, BoundsError, BoundsTransform};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when working with parameters
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("Bounds error for parameter '{name}': {source}")]
    Bounds { name: String, source: BoundsError },

    #[error("Parameter '{name}' not found")]
    ParameterNotFound { name: String },

    #[error("Parameter '{name}' already exists")]
    DuplicateParameter { name: String },
}

/// A parameter for optimization problems
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Name of the parameter
    name: String,

    /// Canonical name when this parameter is a per-dataset copy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_name: Option<String>,

    /// Current value of the parameter
    value: f64,

    /// Value at creation, used by `reset`
    init_value: f64,

    /// Whether this parameter can be varied during optimization
    vary: bool,

    /// Minimum and maximum bounds for the parameter value
    bounds: Bounds,

    /// Standard error of the parameter (set after fitting)
    #[serde(default)]
    stderr: Option<f64>,
}

impl Parameter {
    /// Create a new unbounded, varying parameter
    ///
    /// # Examples
    ///
    /// ```
    /// use modelexp_rs::parameters::Parameter;
    ///
    /// let param = Parameter::new("i0", 1.0).unwrap();
    /// assert_eq!(param.name(), "i0");
    /// assert_eq!(param.value(), 1.0);
    /// assert!(param.vary());
    /// ```
    pub fn new(name: &str, value: f64) -> Result<Self, ParameterError> {
        Self::with_bounds(name, value, f64::NEG_INFINITY, f64::INFINITY)
    }

    /// Create a new varying parameter with bounds
    ///
    /// Fails when `min > max` or when `value` lies outside `[min, max]`; the
    /// value is never clamped into range.
    pub fn with_bounds(name: &str, value: f64, min: f64, max: f64) -> Result<Self, ParameterError> {
        let bounds = Bounds::new(min, max).map_err(|source| ParameterError::Bounds {
            name: name.to_string(),
            source,
        })?;
        bounds.check(value).map_err(|source| ParameterError::Bounds {
            name: name.to_string(),
            source,
        })?;

        Ok(Self {
            name: name.to_string(),
            base_name: None,
            value,
            init_value: value,
            vary: true,
            bounds,
            stderr: None,
        })
    }

    /// Builder-style vary flag
    pub fn varying(mut self, vary: bool) -> Self {
        self.vary = vary;
        self
    }

    /// Copy of this parameter under a dataset-specific name
    ///
    /// The copy keeps value, bounds and vary flag and records `self`'s
    /// canonical name as its base name.
    pub fn namespaced(&self, label: &str) -> Self {
        let base = self.base_name().to_string();
        Self {
            name: format!("{}_{}", base, label),
            base_name: Some(base),
            ..self.clone()
        }
    }

    /// Get the name of the parameter
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical name, equal to `name()` unless this is a per-dataset copy
    pub fn base_name(&self) -> &str {
        self.base_name.as_deref().unwrap_or(&self.name)
    }

    /// `true` if this parameter is a per-dataset copy
    pub fn is_namespaced(&self) -> bool {
        self.base_name.is_some()
    }

    /// Get the current value of the parameter
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Set the value of the parameter
    ///
    /// Returns an error if the value is not finite or outside bounds.
    pub fn set_value(&mut self, value: f64) -> Result<(), ParameterError> {
        self.bounds.check(value).map_err(|source| ParameterError::Bounds {
            name: self.name.clone(),
            source,
        })?;
        self.value = value;
        Ok(())
    }

    /// Get the initial value of the parameter
    pub fn init_value(&self) -> f64 {
        self.init_value
    }

    /// Reset the parameter to its initial value
    pub fn reset(&mut self) {
        if self.bounds.is_within_bounds(self.init_value) {
            self.value = self.init_value;
        }
        self.stderr = None;
    }

    /// Check if the parameter is varied during optimization
    pub fn vary(&self) -> bool {
        self.vary
    }

    /// Set whether the parameter is varied during optimization
    pub fn set_vary(&mut self, vary: bool) {
        self.vary = vary;
    }

    /// Get the minimum allowed value for the parameter
    pub fn min(&self) -> f64 {
        self.bounds.min
    }

    /// Get the maximum allowed value for the parameter
    pub fn max(&self) -> f64 {
        self.bounds.max
    }

    /// Get the bounds of the parameter
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Set the bounds for the parameter
    ///
    /// Fails if `min > max` or if the current value would fall outside the
    /// new bounds.
    pub fn set_bounds(&mut self, min: f64, max: f64) -> Result<(), ParameterError> {
        let err = |source| ParameterError::Bounds {
            name: self.name.clone(),
            source,
        };
        let bounds = Bounds::new(min, max).map_err(err)?;
        bounds.check(self.value).map_err(err)?;
        self.bounds = bounds;
        Ok(())
    }

    /// Set value, bounds and vary flag together
    ///
    /// Either everything is applied or, on error, nothing is.
    pub fn update(
        &mut self,
        value: f64,
        min: f64,
        max: f64,
        vary: bool,
    ) -> Result<(), ParameterError> {
        let err = |source| ParameterError::Bounds {
            name: self.name.clone(),
            source,
        };
        let bounds = Bounds::new(min, max).map_err(err)?;
        bounds.check(value).map_err(err)?;
        self.bounds = bounds;
        self.value = value;
        self.vary = vary;
        Ok(())
    }

    /// Standard error of the parameter, if a fit has produced one
    pub fn stderr(&self) -> Option<f64> {
        self.stderr
    }

    /// Set the standard error of the parameter
    pub fn set_stderr(&mut self, stderr: Option<f64>) {
        self.stderr = stderr;
    }

    /// Create a bounds transform for this parameter
    pub fn bounds_transform(&self) -> BoundsTransform {
        BoundsTransform::new(self.bounds)
    }

    /// Convert the parameter value to an internal value for the optimizer
    pub fn to_internal(&self) -> Result<f64, ParameterError> {
        self.bounds_transform()
            .to_internal(self.value)
            .map_err(|source| ParameterError::Bounds {
                name: self.name.clone(),
                source,
            })
    }

    /// Convert an internal value from the optimizer to a parameter value
    pub fn from_internal(&self, internal_value: f64) -> f64 {
        self.bounds_transform().to_external(internal_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::{INFINITY, NEG_INFINITY};

    #[test]
    fn test_parameter_creation() {
        let param = Parameter::new("r", 50.0).unwrap();
        assert_eq!(param.name(), "r");
        assert_eq!(param.base_name(), "r");
        assert_eq!(param.value(), 50.0);
        assert_eq!(param.init_value(), 50.0);
        assert!(param.vary());
        assert_eq!(param.min(), NEG_INFINITY);
        assert_eq!(param.max(), INFINITY);
        assert!(param.stderr().is_none());

        let param = Parameter::with_bounds("r", 50.0, 0.0, 100.0)
            .unwrap()
            .varying(false);
        assert_eq!(param.min(), 0.0);
        assert_eq!(param.max(), 100.0);
        assert!(!param.vary());
    }

    #[test]
    fn test_out_of_bounds_is_rejected_not_clamped() {
        assert!(Parameter::with_bounds("r", 150.0, 0.0, 100.0).is_err());
        assert!(Parameter::with_bounds("r", 1.0, 2.0, 0.0).is_err());
        assert!(Parameter::new("r", f64::NAN).is_err());

        let mut param = Parameter::with_bounds("r", 50.0, 0.0, 100.0).unwrap();
        assert!(param.set_value(120.0).is_err());
        assert_eq!(param.value(), 50.0);

        assert!(param.set_bounds(60.0, 100.0).is_err());
        assert_eq!(param.min(), 0.0);

        param.set_bounds(10.0, 60.0).unwrap();
        assert_eq!(param.min(), 10.0);
        assert_eq!(param.value(), 50.0);
    }

    #[test]
    fn test_namespaced_copy() {
        let param = Parameter::with_bounds("i0", 1.0, 0.0, 10.0)
            .unwrap()
            .varying(false);
        let copy = param.namespaced("xrr");
        assert_eq!(copy.name(), "i0_xrr");
        assert_eq!(copy.base_name(), "i0");
        assert!(copy.is_namespaced());
        assert_eq!(copy.value(), 1.0);
        assert_eq!(copy.max(), 10.0);
        assert!(!copy.vary());

        // Namespacing a copy again stays anchored on the canonical name
        let again = copy.namespaced("nr");
        assert_eq!(again.name(), "i0_nr");
        assert_eq!(again.base_name(), "i0");
    }

    #[test]
    fn test_update_is_all_or_nothing() {
        let mut param = Parameter::with_bounds("r", 50.0, 0.0, 100.0).unwrap();
        assert!(param.update(300.0, 0.0, 200.0, false).is_err());
        assert_eq!(param.value(), 50.0);
        assert_eq!(param.max(), 100.0);
        assert!(param.vary());

        param.update(150.0, 10.0, 200.0, false).unwrap();
        assert_eq!(param.value(), 150.0);
        assert_eq!(param.min(), 10.0);
        assert!(!param.vary());
    }

    #[test]
    fn test_parameter_reset() {
        let mut param = Parameter::with_bounds("bg", 1e-3, 0.0, 1.0).unwrap();
        param.set_value(0.5).unwrap();
        param.set_stderr(Some(0.01));
        param.reset();
        assert_eq!(param.value(), 1e-3);
        assert!(param.stderr().is_none());
    }

    #[test]
    fn test_parameter_internal_round_trip() {
        let param = Parameter::with_bounds("r", 40.0, 0.0, 100.0).unwrap();
        let internal = param.to_internal().unwrap();
        assert!((param.from_internal(internal) - 40.0).abs() < 1e-10);

        let param = Parameter::new("a", 5.0).unwrap();
        assert_eq!(param.to_internal().unwrap(), 5.0);
        assert_eq!(param.from_internal(7.0), 7.0);
    }
}
