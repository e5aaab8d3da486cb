//! Error types for the forecasting pipelines and the engine behind them.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors raised by the forecasting engine while fitting or predicting.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Input series is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the requested model.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Model has not been fitted yet.
    #[error("model must be fitted before prediction")]
    FitRequired,

    /// Non-finite values in the series handed to the engine.
    #[error("missing values detected in data")]
    MissingValues,

    /// Numerical failure during estimation or prediction.
    #[error("computation error: {0}")]
    ComputationError(String),
}

/// Category of a pipeline failure.
///
/// Every kind renders to the same `{error, status}` envelope at the HTTP
/// boundary; the kind exists so callers and tests can tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or wrong-typed top-level request fields.
    Shape,
    /// Series too short, non-numeric content, unresolved boundary gaps.
    Constraint,
    /// Missing columns, unparseable dates or amounts.
    Format,
    /// Anything the forecasting engine reported.
    Engine,
}

impl ErrorKind {
    /// Stable lowercase code for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Shape => "shape",
            ErrorKind::Constraint => "constraint",
            ErrorKind::Format => "format",
            ErrorKind::Engine => "engine",
        }
    }
}

/// A request-level failure: a kind plus the human-readable message returned to
/// the client.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct PipelineError {
    kind: ErrorKind,
    message: String,
}

impl PipelineError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn shape(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Shape, message)
    }

    pub fn constraint(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Constraint, message)
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Format, message)
    }

    pub fn engine(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Engine, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<EngineError> for PipelineError {
    fn from(err: EngineError) -> Self {
        PipelineError::engine(err.to_string())
    }
}

/// Result type alias for pipeline operations.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
