//! Parameter bounds
//!
//! Bounds of a fit parameter and the Minuit-style transformation that lets
//! the Levenberg-Marquardt solver work on an unbounded internal variable while
//! the physical value stays inside `[min, max]`.

use serde::{Deserialize, Serialize};
use std::f64::{INFINITY, NEG_INFINITY};
use thiserror::Error;

/// Errors that can occur when working with parameter bounds
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoundsError {
    #[error("Invalid bounds: min ({min}) must not exceed max ({max})")]
    InvalidBounds { min: f64, max: f64 },

    #[error("Parameter value {value} is outside bounds: [{min}, {max}]")]
    ValueOutsideBounds { value: f64, min: f64, max: f64 },

    #[error("Non-finite parameter value is not allowed")]
    NonFiniteValue,
}

/// Represents the bounds constraints on a parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Minimum allowed value for the parameter
    pub min: f64,

    /// Maximum allowed value for the parameter
    pub max: f64,
}

// JSON has no infinity, open ends are written as null.
impl Serialize for Bounds {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Bounds", 2)?;
        state.serialize_field("min", &self.has_lower_bound().then_some(self.min))?;
        state.serialize_field("max", &self.has_upper_bound().then_some(self.max))?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for Bounds {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct BoundsHelper {
            #[serde(default)]
            min: Option<f64>,

            #[serde(default)]
            max: Option<f64>,
        }

        let helper = BoundsHelper::deserialize(deserializer)?;
        let min = helper.min.unwrap_or(NEG_INFINITY);
        let max = helper.max.unwrap_or(INFINITY);

        Bounds::new(min, max).map_err(serde::de::Error::custom)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: NEG_INFINITY,
            max: INFINITY,
        }
    }
}

impl Bounds {
    /// Create new bounds with min and max values
    ///
    /// # Examples
    ///
    /// ```
    /// use modelexp_rs::parameters::Bounds;
    ///
    /// let bounds = Bounds::new(0.0, 10.0).unwrap();
    /// assert_eq!(bounds.min, 0.0);
    /// assert_eq!(bounds.max, 10.0);
    /// assert!(Bounds::new(1.0, 0.0).is_err());
    /// ```
    pub fn new(min: f64, max: f64) -> Result<Self, BoundsError> {
        if min.is_nan() || max.is_nan() || min > max {
            return Err(BoundsError::InvalidBounds { min, max });
        }

        Ok(Self { min, max })
    }

    /// Bounds from negative to positive infinity
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Check if a value is within the bounds (inclusive)
    pub fn is_within_bounds(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// `true` if min is finite
    pub fn has_lower_bound(&self) -> bool {
        self.min.is_finite()
    }

    /// `true` if max is finite
    pub fn has_upper_bound(&self) -> bool {
        self.max.is_finite()
    }

    /// Check that `value` is finite and inside the bounds
    pub fn check(&self, value: f64) -> Result<(), BoundsError> {
        if !value.is_finite() {
            return Err(BoundsError::NonFiniteValue);
        }
        if !self.is_within_bounds(value) {
            return Err(BoundsError::ValueOutsideBounds {
                value,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Minuit-style transformation between external (bounded) and internal
/// (unbounded) parameter values
///
/// This allows the optimizer to work with unbounded parameters internally, while the
/// external values are constrained to be within the specified bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsTransform {
    bounds: Bounds,
}

impl BoundsTransform {
    /// Create a new bounds transform
    pub fn new(bounds: Bounds) -> Self {
        Self { bounds }
    }

    /// Transform an internal parameter value to an external value
    pub fn to_external(&self, internal_value: f64) -> f64 {
        let b = self.bounds;
        let external = match (b.has_lower_bound(), b.has_upper_bound()) {
            (false, false) => internal_value,
            (true, false) => b.min - 1.0 + (internal_value * internal_value + 1.0).sqrt(),
            (false, true) => b.max + 1.0 - (internal_value * internal_value + 1.0).sqrt(),
            (true, true) => b.min + (internal_value.sin() + 1.0) * (b.max - b.min) / 2.0,
        };
        // rounding in the transforms can land an ulp outside the bounds
        external.clamp(b.min, b.max)
    }

    /// Transform an external parameter value to an internal value
    ///
    /// Fails if the external value is not finite or lies outside the bounds.
    pub fn to_internal(&self, external_value: f64) -> Result<f64, BoundsError> {
        self.bounds.check(external_value)?;

        let b = self.bounds;
        let internal = match (b.has_lower_bound(), b.has_upper_bound()) {
            (false, false) => external_value,
            (true, false) => ((external_value - b.min + 1.0).powi(2) - 1.0).sqrt(),
            (false, true) => ((b.max - external_value + 1.0).powi(2) - 1.0).sqrt(),
            (true, true) => {
                let range = b.max - b.min;
                if range == 0.0 {
                    0.0
                } else {
                    let scaled = 2.0 * (external_value - b.min) / range - 1.0;
                    scaled.clamp(-1.0, 1.0).asin()
                }
            }
        };

        Ok(internal)
    }

    /// Derivative of the external value with respect to the internal value
    ///
    /// Used to carry internal-space uncertainties over to external values.
    pub fn external_derivative(&self, internal_value: f64) -> f64 {
        let b = self.bounds;
        match (b.has_lower_bound(), b.has_upper_bound()) {
            (false, false) => 1.0,
            (true, false) => internal_value / (internal_value * internal_value + 1.0).sqrt(),
            (false, true) => -internal_value / (internal_value * internal_value + 1.0).sqrt(),
            (true, true) => (b.max - b.min) * internal_value.cos() / 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_creation() {
        let bounds = Bounds::new(0.0, 10.0).unwrap();
        assert_eq!(bounds.min, 0.0);
        assert_eq!(bounds.max, 10.0);

        assert!(Bounds::new(10.0, 0.0).is_err());
        assert!(Bounds::new(f64::NAN, 0.0).is_err());

        let bounds = Bounds::unbounded();
        assert_eq!(bounds.min, NEG_INFINITY);
        assert_eq!(bounds.max, INFINITY);
    }

    #[test]
    fn test_check() {
        let bounds = Bounds::new(0.0, 10.0).unwrap();
        assert!(bounds.check(0.0).is_ok());
        assert!(bounds.check(10.0).is_ok());
        assert_eq!(
            bounds.check(11.0),
            Err(BoundsError::ValueOutsideBounds {
                value: 11.0,
                min: 0.0,
                max: 10.0
            })
        );
        assert_eq!(bounds.check(f64::NAN), Err(BoundsError::NonFiniteValue));
    }

    #[test]
    fn test_transform_round_trip() {
        let cases = [
            Bounds::unbounded(),
            Bounds::new(5.0, INFINITY).unwrap(),
            Bounds::new(NEG_INFINITY, 5.0).unwrap(),
            Bounds::new(0.0, 10.0).unwrap(),
        ];

        for bounds in cases {
            let transform = BoundsTransform::new(bounds);
            for internal in [0.1, 0.5, 1.0] {
                let external = transform.to_external(internal);
                assert!(bounds.is_within_bounds(external));
                let back = transform.to_internal(external).unwrap();
                assert!(
                    (internal - back).abs() < 1e-8,
                    "round trip for {:?} drifted by {}",
                    bounds,
                    (internal - back).abs()
                );
            }
        }
    }

    #[test]
    fn test_external_derivative_matches_finite_difference() {
        let transform = BoundsTransform::new(Bounds::new(0.0, 10.0).unwrap());
        let h = 1e-6;
        let x = 0.3;
        let numeric = (transform.to_external(x + h) - transform.to_external(x - h)) / (2.0 * h);
        assert!((numeric - transform.external_derivative(x)).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_range() {
        let transform = BoundsTransform::new(Bounds::new(2.0, 2.0).unwrap());
        assert_eq!(transform.to_internal(2.0).unwrap(), 0.0);
        assert_eq!(transform.to_external(0.0), 2.0);
    }

    #[test]
    fn test_json_infinite_bounds() {
        let json = serde_json::to_string(&Bounds::new(0.0, INFINITY).unwrap()).unwrap();
        assert_eq!(json, r#"{"min":0.0,"max":null}"#);
        let back: Bounds = serde_json::from_str(&json).unwrap();
        assert_eq!(back.min, 0.0);
        assert_eq!(back.max, INFINITY);
    }
}
