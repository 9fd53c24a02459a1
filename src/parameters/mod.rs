//! # Parameter System
//!
//! Named, bounded fit parameters and the ordered collection models declare
//! them into.
//!
//! ## Core Components
//!
//! - [`Parameter`]: a value with bounds, a vary flag and an optional canonical
//!   name for per-dataset copies
//! - [`ParameterSet`]: ordered collection with typed lookup, snapshots and JSON
//!   persistence
//! - [`ConstantParameters`]: canonical names that never vary
//! - [`Bounds`] and [`BoundsTransform`]: bounds handling during optimization
//!
//! ## Example Usage
//!
//! ```rust
//! use modelexp_rs::parameters::{ConstantParameters, ParameterSet};
//!
//! let mut params = ParameterSet::new();
//! params.add_param_with_bounds("r", 50.0, 0.0, f64::INFINITY).unwrap();
//! params.add_param("bg", 1e-3).unwrap();
//! params.add_param("orderSizeDistribution", 5.0).unwrap();
//!
//! let mut constants = ConstantParameters::new();
//! constants.insert("orderSizeDistribution");
//!
//! let varying: Vec<&str> = params.varying(&constants).iter().map(|p| p.name()).collect();
//! assert_eq!(varying, vec!["r", "bg"]);
//! ```

pub mod bounds;
pub mod constants;
pub mod parameter;
pub mod parameter_set;


pub use bounds::{Bounds, BoundsError, BoundsTransform};
pub use constants::ConstantParameters;
pub use parameter::{Parameter, ParameterError};
pub use parameter_set::ParameterSet;
