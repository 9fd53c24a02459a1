//! Built-in models and decorators.
//!
//! [`Sphere`] is a reference small-angle scattering model. [`Magnetic`] and
//! [`InstrumentalResolution`] are decorators that can be stacked on any
//! model; `Magnetic` requires a base with a magnetic calculation.

mod magnetic;
mod resolution;
mod sphere;

pub use magnetic::Magnetic;
pub use resolution::InstrumentalResolution;
pub use sphere::Sphere;
