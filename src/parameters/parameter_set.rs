//! Ordered parameter collection
//!
//! [`ParameterSet`] keeps parameters in declaration order, which fixes the
//! layout of the optimizer vector, and indexes them by name for lookup.

use crate::error::{ModelExpError, Result};
use crate::parameters::constants::ConstantParameters;
use crate::parameters::parameter::{Parameter, ParameterError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// An ordered collection of named parameters
///
/// Names are unique. Re-adding a name overwrites the entry in place, so the
/// position of a parameter never changes once declared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Parameter>", into = "Vec<Parameter>")]
pub struct ParameterSet {
    params: Vec<Parameter>,
    index: HashMap<String, usize>,
}

impl ParameterSet {
    /// Create a new empty parameter set
    ///
    /// # Examples
    ///
    /// ```
    /// use modelexp_rs::parameters::ParameterSet;
    ///
    /// let params = ParameterSet::new();
    /// assert!(params.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or overwrite a parameter
    ///
    /// # Examples
    ///
    /// ```
    /// use modelexp_rs::parameters::{Parameter, ParameterSet};
    ///
    /// let mut params = ParameterSet::new();
    /// params.add(Parameter::new("r", 50.0).unwrap());
    /// params.add(Parameter::new("bg", 1e-3).unwrap());
    /// params.add(Parameter::new("r", 60.0).unwrap());
    ///
    /// assert_eq!(params.names(), vec!["r", "bg"]);
    /// assert_eq!(params.value("r").unwrap(), 60.0);
    /// ```
    pub fn add(&mut self, param: Parameter) {
        match self.index.get(param.name()) {
            Some(&i) => self.params[i] = param,
            None => {
                self.index.insert(param.name().to_string(), self.params.len());
                self.params.push(param);
            }
        }
    }

    /// Add or overwrite an unbounded parameter
    pub fn add_param(&mut self, name: &str, value: f64) -> std::result::Result<(), ParameterError> {
        self.add(Parameter::new(name, value)?);
        Ok(())
    }

    /// Add or overwrite a bounded parameter
    pub fn add_param_with_bounds(
        &mut self,
        name: &str,
        value: f64,
        min: f64,
        max: f64,
    ) -> std::result::Result<(), ParameterError> {
        self.add(Parameter::with_bounds(name, value, min, max)?);
        Ok(())
    }

    /// Insert a parameter whose name must not exist yet
    pub fn insert_new(&mut self, param: Parameter) -> std::result::Result<(), ParameterError> {
        if self.contains(param.name()) {
            return Err(ParameterError::DuplicateParameter {
                name: param.name().to_string(),
            });
        }
        self.add(param);
        Ok(())
    }

    /// Look up a parameter by name
    pub fn get(&self, name: &str) -> std::result::Result<&Parameter, ParameterError> {
        self.index
            .get(name)
            .map(|&i| &self.params[i])
            .ok_or_else(|| ParameterError::ParameterNotFound {
                name: name.to_string(),
            })
    }

    /// Look up a parameter by name for mutation
    pub fn get_mut(&mut self, name: &str) -> std::result::Result<&mut Parameter, ParameterError> {
        match self.index.get(name) {
            Some(&i) => Ok(&mut self.params[i]),
            None => Err(ParameterError::ParameterNotFound {
                name: name.to_string(),
            }),
        }
    }

    /// Current value of a parameter
    pub fn value(&self, name: &str) -> std::result::Result<f64, ParameterError> {
        self.get(name).map(Parameter::value)
    }

    /// Set the value of an existing parameter
    pub fn set_value(&mut self, name: &str, value: f64) -> std::result::Result<(), ParameterError> {
        self.get_mut(name)?.set_value(value)
    }

    /// Lookup used by per-dataset views
    ///
    /// Returns `base_label` if such a namespaced copy exists, otherwise `base`.
    pub fn resolve(
        &self,
        base: &str,
        label: Option<&str>,
    ) -> std::result::Result<&Parameter, ParameterError> {
        if let Some(label) = label {
            let namespaced = format!("{}_{}", base, label);
            if let Some(&i) = self.index.get(&namespaced) {
                return Ok(&self.params[i]);
            }
        }
        self.get(base)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Remove a parameter, keeping the order of the others
    pub fn remove(&mut self, name: &str) -> Option<Parameter> {
        let i = self.index.remove(name)?;
        let removed = self.params.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Some(removed)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Names in declaration order
    pub fn names(&self) -> Vec<&str> {
        self.params.iter().map(Parameter::name).collect()
    }

    /// Parameters in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter()
    }

    /// Parameters whose canonical name is `base`, in declaration order
    ///
    /// Includes the canonical parameter itself when present.
    pub fn family(&self, base: &str) -> Vec<&Parameter> {
        self.params.iter().filter(|p| p.base_name() == base).collect()
    }

    /// Parameters that the optimizer adjusts
    ///
    /// A parameter varies when its vary flag is set and its canonical name is
    /// not in `constants`. The order is the declaration order.
    pub fn varying(&self, constants: &ConstantParameters) -> Vec<&Parameter> {
        self.params
            .iter()
            .filter(|p| p.vary() && !constants.contains(p.base_name()))
            .collect()
    }

    /// Names of the varying parameters in optimizer order
    pub fn varying_names(&self, constants: &ConstantParameters) -> Vec<String> {
        self.varying(constants)
            .into_iter()
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Replace the canonical parameter `base` by one copy per label
    ///
    /// The copies take the position of `base`, in label order, and start with
    /// its value, bounds and vary flag.
    pub fn fan_out(&mut self, base: &str, labels: &[String]) -> std::result::Result<(), ParameterError> {
        let i = *self
            .index
            .get(base)
            .ok_or_else(|| ParameterError::ParameterNotFound {
                name: base.to_string(),
            })?;
        if labels.is_empty() {
            return Ok(());
        }

        let copies: Vec<Parameter> = labels.iter().map(|l| self.params[i].namespaced(l)).collect();
        if let Some(taken) = copies.iter().find(|c| self.contains(c.name())) {
            return Err(ParameterError::DuplicateParameter {
                name: taken.name().to_string(),
            });
        }

        self.params.splice(i..=i, copies);
        self.rebuild_index();
        Ok(())
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .params
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name().to_string(), i))
            .collect();
    }

    /// Reset all parameters to their initial values
    pub fn reset(&mut self) {
        for param in &mut self.params {
            param.reset();
        }
    }

    /// Deep copy of the current state
    pub fn snapshot(&self) -> ParameterSet {
        self.clone()
    }

    /// Replace values, bounds, vary flags and errors with those of `snapshot`
    pub fn restore(&mut self, snapshot: &ParameterSet) {
        self.clone_from(snapshot);
    }

    /// Serialize to a pretty-printed JSON string
    ///
    /// Infinite bounds are written as `null`.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a parameter set from JSON
    ///
    /// # Examples
    ///
    /// ```
    /// use modelexp_rs::parameters::ParameterSet;
    ///
    /// let json = r#"[
    ///   {"name": "r", "value": 50.0, "init_value": 50.0, "vary": true,
    ///    "bounds": {"min": 0.0, "max": null}}
    /// ]"#;
    /// let params = ParameterSet::from_json(json).unwrap();
    /// assert_eq!(params.value("r").unwrap(), 50.0);
    /// assert!(params.get("r").unwrap().max().is_infinite());
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Save to a JSON file
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Load from a JSON file
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

impl TryFrom<Vec<Parameter>> for ParameterSet {
    type Error = ModelExpError;

    fn try_from(params: Vec<Parameter>) -> Result<Self> {
        let mut set = ParameterSet::new();
        for param in params {
            param.bounds().check(param.value())?;
            set.insert_new(param)?;
        }
        Ok(set)
    }
}

impl From<ParameterSet> for Vec<Parameter> {
    fn from(set: ParameterSet) -> Self {
        set.params
    }
}

impl<'a> IntoIterator for &'a ParameterSet {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}
