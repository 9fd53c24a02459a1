//! Levenberg-Marquardt algorithm implementation.
//!
//! This module provides an implementation of the Levenberg-Marquardt algorithm
//! for nonlinear least-squares optimization. The fit engine drives it over the
//! bounds-transformed varying parameters of a model.

pub mod algorithm;
pub mod config;
pub mod convergence;
pub mod step;

pub use algorithm::{LevenbergMarquardt, LmResult};
pub use config::{DecompositionMethod, LmConfig};
pub use convergence::{ConvergenceCriteria, ConvergenceStatus};
pub use step::{LmStep, StepResult};
