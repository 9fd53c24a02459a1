//! Homogeneous sphere with a log-normal size distribution.
//!
//! Parameters:
//! - `r`: median radius
//! - `sigR`: log-normal width of the radius distribution
//! - `sldSphere`, `sldSolvent`: nuclear scattering length densities
//! - `i0`: intensity scale, `bg`: flat background
//! - `orderSizeDistribution` (constant): Gauss-Hermite order of the size average
//!
//! The magnetic path adds `magSldSphere` and the constant `magSldSolvent`, and
//! reads `sin2alpha` from the magnetic decorator.

use crate::error::{ModelExpError, Result};
use crate::model::{DatasetParams, ModelComponent, ModelOutput, SldProfile};
use crate::parameters::{ConstantParameters, Parameter, ParameterSet};
use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::{array, Array1};
use std::f64::consts::PI;
use std::f64::INFINITY;

/// Sphere form factor model
#[derive(Debug, Clone, Copy, Default)]
pub struct Sphere;

impl Sphere {
    pub fn new() -> Self {
        Self
    }

    /// Radii and normalized weights of the size average
    fn size_distribution(view: &DatasetParams<'_>) -> Result<Vec<(f64, f64)>> {
        let r = view.value("r")?;
        let sig_r = view.value("sigR")?;
        let order = view.value("orderSizeDistribution")?.round();

        if sig_r == 0.0 || order <= 1.0 {
            return Ok(vec![(r, 1.0)]);
        }

        let (nodes, weights) = gauss_hermite(order as usize);
        let norm = PI.sqrt();
        Ok(nodes
            .into_iter()
            .zip(weights)
            .map(|(x, w)| (r * (2f64.sqrt() * sig_r * x).exp(), w / norm))
            .collect())
    }

    /// Size average of `V^2 f^2` at every q
    fn averaged_form_factor(
        view: &DatasetParams<'_>,
        domain: &Array1<f64>,
    ) -> Result<Array1<f64>> {
        let distribution = Self::size_distribution(view)?;
        Ok(domain.mapv(|q| {
            distribution
                .iter()
                .map(|&(radius, w)| w * amplitude(q, radius).powi(2))
                .sum()
        }))
    }

    fn nuclear_profile(view: &DatasetParams<'_>) -> Result<SldProfile> {
        profile(
            "nuclear",
            view.value("r")?,
            view.value("sldSphere")?,
            view.value("sldSolvent")?,
        )
    }
}

impl ModelComponent for Sphere {
    fn name(&self) -> &str {
        "Sphere"
    }

    fn init_parameters(
        &self,
        params: &mut ParameterSet,
        constants: &mut ConstantParameters,
    ) -> Result<()> {
        params.add_param_with_bounds("r", 50.0, 0.0, INFINITY)?;
        params.add_param_with_bounds("sigR", 0.05, 0.0, INFINITY)?;
        params.add_param("sldSphere", 4.5e-5)?;
        params.add(Parameter::new("sldSolvent", 1e-5)?.varying(false));
        params.add_param_with_bounds("i0", 1.0, 0.0, INFINITY)?;
        params.add_param("bg", 1e-6)?;
        params.add(Parameter::new("orderSizeDistribution", 20.0)?.varying(false));
        constants.insert("orderSizeDistribution");
        Ok(())
    }

    fn calc_model(&self, view: &DatasetParams<'_>, domain: &Array1<f64>) -> Result<ModelOutput> {
        let contrast = view.value("sldSphere")? - view.value("sldSolvent")?;
        let i0 = view.value("i0")?;
        let bg = view.value("bg")?;

        let form = Self::averaged_form_factor(view, domain)?;
        let values = form.mapv(|f| i0 * contrast * contrast * f + bg);

        Ok(ModelOutput::new(domain.clone(), values)?.with_profile(Self::nuclear_profile(view)?))
    }

    fn supports_magnetic(&self) -> bool {
        true
    }

    fn init_magnetic_parameters(
        &self,
        params: &mut ParameterSet,
        constants: &mut ConstantParameters,
    ) -> Result<()> {
        params.add_param_with_bounds("magSldSphere", 5e-6, 0.0, INFINITY)?;
        params.add(Parameter::new("magSldSolvent", 0.0)?.varying(false));
        constants.insert("magSldSolvent");
        Ok(())
    }

    fn calc_magnetic_model(
        &self,
        view: &DatasetParams<'_>,
        domain: &Array1<f64>,
    ) -> Result<ModelOutput> {
        let nuclear = view.value("sldSphere")? - view.value("sldSolvent")?;
        let magnetic = view.value("magSldSphere")? - view.value("magSldSolvent")?;
        let sin2alpha = view.value("sin2alpha")?;
        let i0 = view.value("i0")?;
        let bg = view.value("bg")?;

        let form = Self::averaged_form_factor(view, domain)?;
        let values = form.mapv(|f| {
            i0 * (nuclear * nuclear + sin2alpha * magnetic * magnetic) * f + bg
        });
        let cross_term = form.mapv(|f| i0 * 2.0 * sin2alpha * nuclear * magnetic * f);

        let magnetic_profile = profile(
            "magnetic",
            view.value("r")?,
            view.value("magSldSphere")?,
            view.value("magSldSolvent")?,
        )?;

        ModelOutput::new(domain.clone(), values)?
            .with_profile(Self::nuclear_profile(view)?)
            .with_profile(magnetic_profile)
            .with_cross_term(cross_term)
    }
}

/// Scattering amplitude `V(R) * 3 (sin x - x cos x) / x^3`, `x = qR`
fn amplitude(q: f64, radius: f64) -> f64 {
    let volume = 4.0 / 3.0 * PI * radius.powi(3);
    let x = q * radius;
    let shape = if x.abs() < 1e-3 {
        1.0 - x * x / 10.0
    } else {
        3.0 * (x.sin() - x * x.cos()) / x.powi(3)
    };
    volume * shape
}

fn profile(label: &str, radius: f64, inside: f64, outside: f64) -> Result<SldProfile> {
    if radius < 0.0 {
        return Err(ModelExpError::InvalidParameter(format!(
            "negative sphere radius {}",
            radius
        )));
    }
    Ok(SldProfile {
        label: label.to_string(),
        radius: array![0.0, radius, radius, 1.5 * radius],
        sld: array![inside, inside, outside, outside],
    })
}

/// Gauss-Hermite nodes and weights for `∫ exp(-x²) f(x) dx`
///
/// Eigen-decomposition of the symmetric Jacobi matrix (Golub-Welsch).
fn gauss_hermite(n: usize) -> (Vec<f64>, Vec<f64>) {
    let jacobi = DMatrix::from_fn(n, n, |i, j| {
        if i + 1 == j || j + 1 == i {
            (i.max(j) as f64 / 2.0).sqrt()
        } else {
            0.0
        }
    });
    let eigen = SymmetricEigen::new(jacobi);

    let mut pairs: Vec<(f64, f64)> = (0..n)
        .map(|k| {
            let v0 = eigen.eigenvectors[(0, k)];
            (eigen.eigenvalues[k], PI.sqrt() * v0 * v0)
        })
        .collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
    pairs.into_iter().unzip()
}
