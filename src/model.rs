//! Model trait and basic model implementations.
//!
//! A [`ModelComponent`] declares its parameters into a [`ParameterSet`] and
//! computes a curve over a domain from a per-dataset view of those
//! parameters. Implementations are pure: they read the view and the domain
//! and return a fresh [`ModelOutput`].

use crate::data::Suffix;
use crate::error::{ModelExpError, Result};
use crate::parameters::{ConstantParameters, Parameter, ParameterSet};
use ndarray::Array1;

/// Which calculation a composed model runs on its base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComputationPath {
    /// Unpolarized / nuclear calculation
    #[default]
    Standard,
    /// Nuclear and magnetic calculation, including the cross term
    Magnetic,
}

/// A scattering length density profile for display
#[derive(Debug, Clone, PartialEq)]
pub struct SldProfile {
    pub label: String,
    pub radius: Array1<f64>,
    pub sld: Array1<f64>,
}

/// The curve computed for one dataset slot
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOutput {
    pub suffix: Suffix,
    pub domain: Array1<f64>,
    pub values: Array1<f64>,
    pub profiles: Vec<SldProfile>,
    /// Magnetic-nuclear interference term, only on the magnetic path
    pub cross_term: Option<Array1<f64>>,
}

impl ModelOutput {
    /// Create an output, checking that domain and values line up
    pub fn new(domain: Array1<f64>, values: Array1<f64>) -> Result<Self> {
        if domain.len() != values.len() {
            return Err(ModelExpError::ShapeMismatch(format!(
                "model domain has {} points, values {}",
                domain.len(),
                values.len()
            )));
        }
        Ok(Self {
            suffix: Suffix::default(),
            domain,
            values,
            profiles: Vec::new(),
            cross_term: None,
        })
    }

    pub fn with_profile(mut self, profile: SldProfile) -> Self {
        self.profiles.push(profile);
        self
    }

    pub fn with_cross_term(mut self, cross_term: Array1<f64>) -> Result<Self> {
        if cross_term.len() != self.values.len() {
            return Err(ModelExpError::ShapeMismatch(format!(
                "cross term has {} points, values {}",
                cross_term.len(),
                self.values.len()
            )));
        }
        self.cross_term = Some(cross_term);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Read-only view of a parameter set for one dataset
///
/// Lookups of a canonical name resolve to the dataset's namespaced copy
/// (`i0` reads `i0_xrr` for the `xrr` dataset) when one exists.
#[derive(Debug, Clone, Copy)]
pub struct DatasetParams<'a> {
    params: &'a ParameterSet,
    label: Option<&'a str>,
}

impl<'a> DatasetParams<'a> {
    pub fn new(params: &'a ParameterSet, label: Option<&'a str>) -> Self {
        Self { params, label }
    }

    /// View without dataset-specific resolution
    pub fn global(params: &'a ParameterSet) -> Self {
        Self::new(params, None)
    }

    pub fn label(&self) -> Option<&'a str> {
        self.label
    }

    pub fn params(&self) -> &'a ParameterSet {
        self.params
    }

    pub fn get(&self, base: &str) -> Result<&'a Parameter> {
        Ok(self.params.resolve(base, self.label)?)
    }

    pub fn value(&self, base: &str) -> Result<f64> {
        self.get(base).map(Parameter::value)
    }
}

/// A physical model that can be fit to data.
///
/// `init_parameters` is called exactly once per composition. The magnetic
/// methods only need overriding by models that support polarized
/// calculations.
pub trait ModelComponent: Send + Sync {
    fn name(&self) -> &str;

    /// Declare parameters and constant names
    fn init_parameters(
        &self,
        params: &mut ParameterSet,
        constants: &mut ConstantParameters,
    ) -> Result<()>;

    /// Compute the standard curve over `domain`
    fn calc_model(&self, view: &DatasetParams<'_>, domain: &Array1<f64>) -> Result<ModelOutput>;

    fn supports_magnetic(&self) -> bool {
        false
    }

    /// Declare the additional parameters of the magnetic path
    fn init_magnetic_parameters(
        &self,
        _params: &mut ParameterSet,
        _constants: &mut ConstantParameters,
    ) -> Result<()> {
        Err(ModelExpError::Configuration(format!(
            "model '{}' has no magnetic calculation",
            self.name()
        )))
    }

    /// Compute the magnetic curve over `domain`, including the cross term
    fn calc_magnetic_model(
        &self,
        _view: &DatasetParams<'_>,
        _domain: &Array1<f64>,
    ) -> Result<ModelOutput> {
        Err(ModelExpError::Configuration(format!(
            "model '{}' has no magnetic calculation",
            self.name()
        )))
    }

    /// Dispatch on the computation path
    fn calc(
        &self,
        path: ComputationPath,
        view: &DatasetParams<'_>,
        domain: &Array1<f64>,
    ) -> Result<ModelOutput> {
        match path {
            ComputationPath::Standard => self.calc_model(view, domain),
            ComputationPath::Magnetic => self.calc_magnetic_model(view, domain),
        }
    }
}

type EvalFunc = dyn Fn(&DatasetParams<'_>, &Array1<f64>) -> Result<Array1<f64>> + Send + Sync;

/// A model built from a parameter template and a closure
///
/// Useful for user kernels that do not warrant their own type.
///
/// # Examples
///
/// ```
/// use modelexp_rs::model::{BaseModel, DatasetParams, ModelComponent};
/// use modelexp_rs::parameters::{ConstantParameters, ParameterSet};
/// use ndarray::array;
///
/// let mut template = ParameterSet::new();
/// template.add_param("a", 2.0).unwrap();
/// let model = BaseModel::new("line", template, |view, q| Ok(q * view.value("a")?));
///
/// let mut params = ParameterSet::new();
/// let mut constants = ConstantParameters::new();
/// model.init_parameters(&mut params, &mut constants).unwrap();
///
/// let out = model.calc_model(&DatasetParams::global(&params), &array![1.0, 2.0]).unwrap();
/// assert_eq!(out.values, array![2.0, 4.0]);
/// ```
pub struct BaseModel {
    name: String,
    parameters: ParameterSet,
    constants: Vec<String>,
    eval_func: Box<EvalFunc>,
}

impl BaseModel {
    /// Create a new BaseModel with the given parameters and evaluation function
    pub fn new<F>(name: &str, parameters: ParameterSet, eval_func: F) -> Self
    where
        F: Fn(&DatasetParams<'_>, &Array1<f64>) -> Result<Array1<f64>> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            parameters,
            constants: Vec::new(),
            eval_func: Box::new(eval_func),
        }
    }

    /// Mark a declared parameter as constant
    pub fn with_constant(mut self, name: &str) -> Self {
        self.constants.push(name.to_string());
        self
    }
}

impl std::fmt::Debug for BaseModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaseModel")
            .field("name", &self.name)
            .field("parameters", &self.parameters.names())
            .field("constants", &self.constants)
            .finish()
    }
}

impl ModelComponent for BaseModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn init_parameters(
        &self,
        params: &mut ParameterSet,
        constants: &mut ConstantParameters,
    ) -> Result<()> {
        for param in &self.parameters {
            params.add(param.clone());
        }
        for name in &self.constants {
            if !params.contains(name) {
                return Err(ModelExpError::UnknownParameter(name.clone()));
            }
            constants.insert(name);
        }
        Ok(())
    }

    fn calc_model(&self, view: &DatasetParams<'_>, domain: &Array1<f64>) -> Result<ModelOutput> {
        let values = (self.eval_func)(view, domain)?;
        ModelOutput::new(domain.clone(), values)
    }
}
