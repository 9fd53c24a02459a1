//! Constant parameter names
//!
//! A constant parameter is declared by a model (e.g. the order of a size
//! distribution integration) but is never varied by the optimizer nor exposed
//! as a control, whatever its stored vary flag says.

use std::collections::HashSet;

/// Set of canonical parameter names excluded from fitting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstantParameters {
    names: HashSet<String>,
}

impl ConstantParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `name` as constant. Returns `false` if it already was.
    pub fn insert(&mut self, name: &str) -> bool {
        self.names.insert(name.to_string())
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.names.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.names.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<S: AsRef<str>> FromIterator<S> for ConstantParameters {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(|s| s.as_ref().to_string()).collect(),
        }
    }
}

impl<S: AsRef<str>> Extend<S> for ConstantParameters {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.names
            .extend(iter.into_iter().map(|s| s.as_ref().to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        let mut constants: ConstantParameters =
            ["orderSizeDistribution", "magSldSolvent"].into_iter().collect();
        assert_eq!(constants.len(), 2);
        assert!(constants.contains("magSldSolvent"));
        assert!(!constants.insert("magSldSolvent"));
        assert!(constants.insert("sldSolvent"));
        assert_eq!(
            constants.names(),
            vec!["magSldSolvent", "orderSizeDistribution", "sldSolvent"]
        );
        assert!(constants.remove("sldSolvent"));
        assert!(!constants.contains("sldSolvent"));
    }
}
