use serde::Serialize;
use std::fmt;

const MIN_REPORTED_CORRELATION: f64 = 0.1;

/// Summary of a completed fit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitReport {
    pub success: bool,
    pub message: String,
    pub iterations: usize,
    /// Residual function evaluations
    pub nfev: usize,
    pub chisqr: f64,
    /// `chisqr / (npoints - nvarys)`
    pub redchi: f64,
    pub npoints: usize,
    /// Varying parameter names in optimizer order
    pub names: Vec<String>,
    pub values: Vec<f64>,
    pub stderr: Vec<Option<f64>>,
    /// Correlation matrix in optimizer order; absent without a covariance
    pub correl: Option<Vec<Vec<f64>>>,
}

impl FitReport {
    pub fn nvarys(&self) -> usize {
        self.names.len()
    }

    /// Fitted value and standard error of a varying parameter
    pub fn get(&self, name: &str) -> Option<(f64, Option<f64>)> {
        let i = self.names.iter().position(|n| n == name)?;
        Some((self.values[i], self.stderr[i]))
    }

    /// Correlation between two varying parameters
    pub fn correlation(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.names.iter().position(|n| n == a)?;
        let j = self.names.iter().position(|n| n == b)?;
        self.correl.as_ref().map(|c| c[i][j])
    }
}

impl fmt::Display for FitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[[Fit Statistics]]")?;
        writeln!(f, "    # function evals   = {}", self.nfev)?;
        writeln!(f, "    # data points      = {}", self.npoints)?;
        writeln!(f, "    # variables        = {}", self.nvarys())?;
        writeln!(f, "    chi-square         = {:.6e}", self.chisqr)?;
        writeln!(f, "    reduced chi-square = {:.6e}", self.redchi)?;
        writeln!(f, "    message            = {}", self.message)?;
        writeln!(f, "[[Variables]]")?;
        for ((name, value), stderr) in self.names.iter().zip(&self.values).zip(&self.stderr) {
            match stderr {
                Some(e) => writeln!(f, "    {}: {:.6e} +/- {:.3e}", name, value, e)?,
                None => writeln!(f, "    {}: {:.6e}", name, value)?,
            }
        }

        if let Some(correl) = &self.correl {
            let mut pairs = Vec::new();
            for i in 0..self.names.len() {
                for j in (i + 1)..self.names.len() {
                    if correl[i][j].abs() >= MIN_REPORTED_CORRELATION {
                        pairs.push((i, j, correl[i][j]));
                    }
                }
            }
            if !pairs.is_empty() {
                pairs.sort_by(|a, b| b.2.abs().total_cmp(&a.2.abs()));
                writeln!(
                    f,
                    "[[Correlations]] (unreported correlations are < {:.3})",
                    MIN_REPORTED_CORRELATION
                )?;
                for (i, j, c) in pairs {
                    writeln!(f, "    C({}, {}) = {:+.4}", self.names[i], self.names[j], c)?;
                }
            }
        }
        Ok(())
    }
}
