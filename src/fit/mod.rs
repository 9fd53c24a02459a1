//! Fit orchestration.
//!
//! [`FitEngine`] maps the varying parameters of a
//! [`ModelContainer`](crate::container::ModelContainer) to a bounds-transformed
//! vector, runs Levenberg-Marquardt over the experiment's residuals and keeps
//! a linear [`FitHistory`] of the results.

mod engine;
mod history;
mod problem;
mod report;

pub use engine::FitEngine;
pub use history::FitHistory;
pub use report::FitReport;
