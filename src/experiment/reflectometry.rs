use crate::experiment::{AxisLabels, Experiment, ResidualKind};
use ndarray::Array1;

const SPECIFIC: [&str; 9] = [
    "dTheta",
    "dWavelength",
    "i0",
    "bg",
    "sldCore",
    "sldShell",
    "sldSubstrate",
    "sldBackground",
    "sldSpacer",
];

/// Simultaneous X-ray and neutron reflectometry on one sample
///
/// Two datasets, `xrr` and `nr`. Instrument and contrast parameters are
/// dataset specific, the structure is shared.
#[derive(Debug, Clone)]
pub struct SimultaneousXrrNr {
    residual_kind: ResidualKind,
}

impl SimultaneousXrrNr {
    pub fn new() -> Self {
        Self {
            residual_kind: ResidualKind::LogWeighted,
        }
    }

    pub fn with_residual_kind(mut self, kind: ResidualKind) -> Self {
        self.residual_kind = kind;
        self
    }
}

impl Default for SimultaneousXrrNr {
    fn default() -> Self {
        Self::new()
    }
}

impl Experiment for SimultaneousXrrNr {
    fn name(&self) -> &str {
        "SimultaneousXrrNr"
    }

    fn dataset_labels(&self) -> Vec<String> {
        vec!["xrr".to_string(), "nr".to_string()]
    }

    fn dataset_specific_params(&self) -> Vec<String> {
        SPECIFIC.iter().map(|s| s.to_string()).collect()
    }

    fn expected_datasets(&self) -> Option<usize> {
        Some(2)
    }

    fn default_domain(&self) -> Array1<f64> {
        Array1::linspace(0.005, 0.3, 300)
    }

    fn residual_kind(&self) -> ResidualKind {
        self.residual_kind
    }

    fn axis_labels(&self) -> AxisLabels {
        AxisLabels {
            domain: "q / A-1".to_string(),
            value: "R".to_string(),
            error: "sR".to_string(),
            model: "Rmodel".to_string(),
        }
    }
}
