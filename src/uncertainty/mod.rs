//! # Uncertainty Calculation
//!
//! Standard errors of fitted parameters from the covariance estimate at the
//! solution and the parameter correlations, the way lmfit reports them.

mod covariance;

pub use covariance::{
    calculate_correlation, calculate_covariance, scale_covariance,
    standard_errors_from_covariance,
};
