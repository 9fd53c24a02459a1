use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a dataset, e.g. `["sa", "p"]`
///
/// Displayed with its parts joined by `_`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Suffix(Vec<String>);

impl Suffix {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    /// Split a label such as `"sa_p"` at `_`
    pub fn parse(label: &str) -> Self {
        if label.is_empty() {
            return Self::default();
        }
        Self::new(label.split('_'))
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parts joined with `_`
    pub fn label(&self) -> String {
        self.0.join("_")
    }
}

impl fmt::Display for Suffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl From<&str> for Suffix {
    fn from(label: &str) -> Self {
        Self::parse(label)
    }
}
