use thiserror::Error;

/// Error types for the modelexp-rs library.
#[derive(Error, Debug)]
pub enum ModelExpError {
    /// An operation was invoked before the state it depends on was configured.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A parameter name was looked up that does not exist.
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    /// A parameter was inserted under a name that is already taken.
    #[error("Duplicate parameter: {0}")]
    DuplicateParameter(String),

    /// Invalid parameter value or bounds.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Domain, value, error or model arrays do not line up.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// A value outside the domain of the residual function, e.g. a
    /// non-positive intensity fed into a logarithm.
    #[error("Numeric domain error: {0}")]
    NumericDomain(String),

    /// The optimizer did not converge or hit a numerical failure.
    #[error("Fit failed: {0}")]
    FitFailed(String),

    /// A dataset or model set index outside the available range.
    #[error("Dataset index {index} out of range (have {len})")]
    DatasetIndex { index: usize, len: usize },

    /// Error indicating a mismatch in vector or matrix dimensions.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Error indicating a singular matrix was encountered.
    #[error("Singular matrix encountered")]
    SingularMatrix,

    /// Malformed line in a data file.
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// I/O error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<crate::parameters::ParameterError> for ModelExpError {
    fn from(err: crate::parameters::ParameterError) -> Self {
        use crate::parameters::ParameterError;
        match err {
            ParameterError::ParameterNotFound { name } => ModelExpError::UnknownParameter(name),
            ParameterError::DuplicateParameter { name } => {
                ModelExpError::DuplicateParameter(name)
            }
            other => ModelExpError::InvalidParameter(other.to_string()),
        }
    }
}

impl From<crate::parameters::BoundsError> for ModelExpError {
    fn from(err: crate::parameters::BoundsError) -> Self {
        ModelExpError::InvalidParameter(err.to_string())
    }
}

/// Result type alias for modelexp-rs operations.
pub type Result<T> = std::result::Result<T, ModelExpError>;
