use crate::experiment::{AxisLabels, Experiment, ResidualKind};
use ndarray::Array1;

/// Small-angle scattering
///
/// [`Sas::new`] is the unpolarized single-dataset experiment,
/// [`Sas::sanspol`] the four-dataset polarized variant with a
/// dataset-specific `polarization`.
#[derive(Debug, Clone)]
pub struct Sas {
    name: String,
    labels: Vec<String>,
    specific: Vec<String>,
    residual_kind: ResidualKind,
}

impl Sas {
    pub fn new() -> Self {
        Self {
            name: "SAS".to_string(),
            labels: Vec::new(),
            specific: Vec::new(),
            residual_kind: ResidualKind::LogWeighted,
        }
    }

    /// Polarized SANS at two detector distances, spin up and down
    pub fn sanspol() -> Self {
        Self {
            name: "SANSPOL".to_string(),
            labels: ["sa_p", "sa_m", "la_p", "la_m"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            specific: vec!["polarization".to_string()],
            residual_kind: ResidualKind::LogWeighted,
        }
    }

    pub fn with_residual_kind(mut self, kind: ResidualKind) -> Self {
        self.residual_kind = kind;
        self
    }
}

impl Default for Sas {
    fn default() -> Self {
        Self::new()
    }
}

impl Experiment for Sas {
    fn name(&self) -> &str {
        &self.name
    }

    fn dataset_labels(&self) -> Vec<String> {
        self.labels.clone()
    }

    fn dataset_specific_params(&self) -> Vec<String> {
        self.specific.clone()
    }

    fn expected_datasets(&self) -> Option<usize> {
        if self.labels.is_empty() {
            None
        } else {
            Some(self.labels.len())
        }
    }

    fn default_domain(&self) -> Array1<f64> {
        Array1::logspace(10.0, -3.0, 0.0, 200)
    }

    fn residual_kind(&self) -> ResidualKind {
        self.residual_kind
    }

    fn axis_labels(&self) -> AxisLabels {
        AxisLabels {
            domain: "q / A-1".to_string(),
            value: "I / cm-1".to_string(),
            error: "sI / cm-1".to_string(),
            model: "Imodel / cm-1".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_domain() {
        let q = Sas::new().default_domain();
        assert_eq!(q.len(), 200);
        assert_relative_eq!(q[0], 1e-3, max_relative = 1e-12);
        assert_relative_eq!(q[199], 1.0, max_relative = 1e-12);
    }

    #[test]
    fn test_sanspol_contract() {
        let sanspol = Sas::sanspol();
        assert_eq!(sanspol.expected_datasets(), Some(4));
        assert_eq!(sanspol.dataset_specific_params(), vec!["polarization"]);
        assert_eq!(Sas::new().expected_datasets(), None);
        assert!(Sas::new().dataset_labels().is_empty());
    }
}
