//! Model decorators and the composed model.
//!
//! A [`ModelDecorator`] injects its own parameters into a model's set and
//! post-processes the model output. [`DecoratedModel`] composes a base model
//! with an ordered list of decorators and fixes the computation path once.

use crate::error::{ModelExpError, Result};
use crate::model::{ComputationPath, DatasetParams, ModelComponent, ModelOutput};
use crate::parameters::{ConstantParameters, ParameterSet};
use ndarray::Array1;

/// Post-processing stage applied to a model's output
pub trait ModelDecorator: Send + Sync {
    fn name(&self) -> &str;

    /// Computation path this decorator needs from the base model, if any
    fn computation_path(&self) -> Option<ComputationPath> {
        None
    }

    /// Inject parameters; names must not exist yet
    fn attach(&self, params: &mut ParameterSet, constants: &mut ConstantParameters) -> Result<()>;

    fn transform(&self, view: &DatasetParams<'_>, output: ModelOutput) -> Result<ModelOutput>;
}

/// Base model plus decorators, applied in list order
pub struct DecoratedModel {
    base: Box<dyn ModelComponent>,
    decorators: Vec<Box<dyn ModelDecorator>>,
    path: ComputationPath,
}

impl DecoratedModel {
    /// Compose `base` with `decorators`
    ///
    /// The magnetic path is selected when any decorator requests it; this
    /// fails with a configuration error if the base model cannot compute it.
    pub fn new(
        base: Box<dyn ModelComponent>,
        decorators: Vec<Box<dyn ModelDecorator>>,
    ) -> Result<Self> {
        let path = if decorators
            .iter()
            .any(|d| d.computation_path() == Some(ComputationPath::Magnetic))
        {
            ComputationPath::Magnetic
        } else {
            ComputationPath::Standard
        };

        if path == ComputationPath::Magnetic && !base.supports_magnetic() {
            return Err(ModelExpError::Configuration(format!(
                "model '{}' does not support the magnetic path requested by its decorators",
                base.name()
            )));
        }

        Ok(Self {
            base,
            decorators,
            path,
        })
    }

    pub fn path(&self) -> ComputationPath {
        self.path
    }

    pub fn base(&self) -> &dyn ModelComponent {
        self.base.as_ref()
    }

    pub fn decorator_names(&self) -> Vec<&str> {
        self.decorators.iter().map(|d| d.name()).collect()
    }
}

impl std::fmt::Debug for DecoratedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let decorators: Vec<&str> = self.decorators.iter().map(|d| d.name()).collect();
        f.debug_struct("DecoratedModel")
            .field("base", &self.base.name())
            .field("decorators", &decorators)
            .field("path", &self.path)
            .finish()
    }
}

impl ModelComponent for DecoratedModel {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn init_parameters(
        &self,
        params: &mut ParameterSet,
        constants: &mut ConstantParameters,
    ) -> Result<()> {
        self.base.init_parameters(params, constants)?;
        if self.path == ComputationPath::Magnetic {
            self.base.init_magnetic_parameters(params, constants)?;
        }
        for decorator in &self.decorators {
            decorator.attach(params, constants)?;
        }
        Ok(())
    }

    fn calc_model(&self, view: &DatasetParams<'_>, domain: &Array1<f64>) -> Result<ModelOutput> {
        let mut output = self.base.calc(self.path, view, domain)?;
        for decorator in &self.decorators {
            output = decorator.transform(view, output)?;
        }
        Ok(output)
    }

    fn supports_magnetic(&self) -> bool {
        self.base.supports_magnetic()
    }
}
