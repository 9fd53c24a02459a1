//! # modelexp-rs
//!
//! `modelexp-rs` fits parametric physical models, such as small-angle
//! scattering or reflectometry curves, to measured data with the
//! Levenberg-Marquardt algorithm.
//!
//! The library provides:
//! - A parameter system with bounds, vary flags, constants and per-dataset copies
//! - Models composed with decorators (magnetic contribution, resolution smearing)
//! - Multi-dataset experiments with log-weighted or linear residuals
//! - Fits with standard errors and an undo/redo history
//!
//! ## Basic Usage
//!
//! ```
//! use modelexp_rs::data::{DataContainer, Dataset, Suffix};
//! use modelexp_rs::experiment::Sas;
//! use modelexp_rs::lm::LmConfig;
//! use modelexp_rs::model::BaseModel;
//! use modelexp_rs::parameters::ParameterSet;
//! use modelexp_rs::session::Session;
//! use ndarray::array;
//!
//! let mut template = ParameterSet::new();
//! template.add_param("a", 5.0).unwrap();
//! let line = BaseModel::new("line", template, |view, x| Ok(x * view.value("a")?));
//!
//! let data: DataContainer = vec![Dataset::new(
//!     array![1.0, 2.0, 3.0],
//!     array![10.0, 20.0, 30.0],
//!     array![1.0, 1.0, 1.0],
//!     Suffix::default(),
//! )
//! .unwrap()]
//! .into_iter()
//! .collect();
//!
//! let mut session = Session::new(Box::new(Sas::new()));
//! session.set_data(data).unwrap();
//! session.set_model(Box::new(line), vec![]).unwrap();
//! session.set_fit(LmConfig::default()).unwrap();
//!
//! let report = session.fit().unwrap();
//! assert!(report.success);
//! assert!((report.values[0] - 10.0).abs() < 1e-3);
//! ```

// Public modules
pub mod error;

// Parameter system
pub mod parameters;

// Optimizer
pub mod lm;
pub mod problem;
pub mod uncertainty;
pub mod utils;

// Data, models and experiments
pub mod container;
pub mod data;
pub mod decorator;
pub mod experiment;
pub mod model;
pub mod models;

// Orchestration
pub mod export;
pub mod fit;
pub mod session;

// Re-exports for convenience
pub use container::ModelContainer;
pub use data::{DataContainer, Dataset, Suffix};
pub use decorator::{DecoratedModel, ModelDecorator};
pub use error::{ModelExpError, Result};
pub use experiment::{Experiment, ResidualKind};
pub use fit::{FitEngine, FitReport};
pub use lm::{LevenbergMarquardt, LmConfig};
pub use model::{ModelComponent, ModelOutput};
pub use parameters::{ConstantParameters, Parameter, ParameterSet};
pub use problem::Problem;
pub use session::{Session, SessionState};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
