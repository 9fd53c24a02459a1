//! A single measured curve.

use crate::data::suffix::Suffix;
use crate::error::{ModelExpError, Result};
use ndarray::Array1;

/// Points removed by [`Dataset::slice_domain`], kept for re-inclusion
#[derive(Debug, Clone, Default, PartialEq)]
struct Masked {
    domain: Vec<f64>,
    values: Vec<f64>,
    errors: Vec<f64>,
}

/// Experimental curve with domain, values and one-sigma errors
///
/// The three arrays always have the same length and the domain is sorted
/// ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    domain: Array1<f64>,
    values: Array1<f64>,
    errors: Array1<f64>,
    suffix: Suffix,
    masked: Masked,
}

impl Dataset {
    /// Build a dataset, sorting the points by domain
    ///
    /// # Examples
    ///
    /// ```
    /// use modelexp_rs::data::{Dataset, Suffix};
    /// use ndarray::array;
    ///
    /// let data = Dataset::new(
    ///     array![0.3, 0.1, 0.2],
    ///     array![3.0, 1.0, 2.0],
    ///     array![0.3, 0.1, 0.2],
    ///     Suffix::default(),
    /// )
    /// .unwrap();
    /// assert_eq!(data.domain(), &array![0.1, 0.2, 0.3]);
    /// assert_eq!(data.values(), &array![1.0, 2.0, 3.0]);
    ///
    /// assert!(Dataset::new(array![1.0, 2.0], array![1.0], array![1.0], Suffix::default()).is_err());
    /// ```
    pub fn new(
        domain: Array1<f64>,
        values: Array1<f64>,
        errors: Array1<f64>,
        suffix: Suffix,
    ) -> Result<Self> {
        if domain.len() != values.len() || domain.len() != errors.len() {
            return Err(ModelExpError::ShapeMismatch(format!(
                "dataset '{}': domain has {} points, values {}, errors {}",
                suffix,
                domain.len(),
                values.len(),
                errors.len()
            )));
        }
        if let Some(x) = domain.iter().find(|x| !x.is_finite()) {
            return Err(ModelExpError::InvalidParameter(format!(
                "dataset '{}': non-finite domain value {}",
                suffix, x
            )));
        }

        let (domain, values, errors) = sorted(
            domain.to_vec(),
            values.to_vec(),
            errors.to_vec(),
        );

        Ok(Self {
            domain,
            values,
            errors,
            suffix,
            masked: Masked::default(),
        })
    }

    pub fn domain(&self) -> &Array1<f64> {
        &self.domain
    }

    pub fn values(&self) -> &Array1<f64> {
        &self.values
    }

    pub fn errors(&self) -> &Array1<f64> {
        &self.errors
    }

    pub fn suffix(&self) -> &Suffix {
        &self.suffix
    }

    pub fn len(&self) -> usize {
        self.domain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domain.is_empty()
    }

    /// Number of points currently excluded by slicing
    pub fn n_masked(&self) -> usize {
        self.masked.domain.len()
    }

    /// Keep only points with `min < x < max`
    ///
    /// Excluded points are cached and can be brought back with
    /// [`restore_masked`](Self::restore_masked). Slicing repeatedly keeps
    /// accumulating the excluded points.
    pub fn slice_domain(&mut self, min: f64, max: f64) {
        let mut kept = Masked::default();
        for i in 0..self.domain.len() {
            let (x, y, e) = (self.domain[i], self.values[i], self.errors[i]);
            let target = if min < x && x < max {
                &mut kept
            } else {
                &mut self.masked
            };
            target.domain.push(x);
            target.values.push(y);
            target.errors.push(e);
        }

        self.domain = Array1::from(kept.domain);
        self.values = Array1::from(kept.values);
        self.errors = Array1::from(kept.errors);
    }

    /// Re-include every point removed by slicing
    pub fn restore_masked(&mut self) {
        if self.masked.domain.is_empty() {
            return;
        }
        let masked = std::mem::take(&mut self.masked);

        let mut domain = self.domain.to_vec();
        let mut values = self.values.to_vec();
        let mut errors = self.errors.to_vec();
        domain.extend(masked.domain);
        values.extend(masked.values);
        errors.extend(masked.errors);

        let (domain, values, errors) = sorted(domain, values, errors);
        self.domain = domain;
        self.values = values;
        self.errors = errors;
    }
}

fn sorted(
    domain: Vec<f64>,
    values: Vec<f64>,
    errors: Vec<f64>,
) -> (Array1<f64>, Array1<f64>, Array1<f64>) {
    let mut order: Vec<usize> = (0..domain.len()).collect();
    order.sort_by(|&a, &b| domain[a].total_cmp(&domain[b]));

    (
        order.iter().map(|&i| domain[i]).collect(),
        order.iter().map(|&i| values[i]).collect(),
        order.iter().map(|&i| errors[i]).collect(),
    )
}
