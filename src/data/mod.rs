//! Experimental data.
//!
//! A [`DataContainer`] holds the measured [`Dataset`]s of one experiment in
//! registration order. Each dataset is identified by a [`Suffix`] and can be
//! loaded from three-column `.xye` files.

pub mod container;
pub mod dataset;
pub mod suffix;
pub mod xye;

pub use container::DataContainer;
pub use dataset::Dataset;
pub use suffix::Suffix;
pub use xye::{load_xye, parse_xye};
