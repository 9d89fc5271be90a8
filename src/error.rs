//! Error types.

use thiserror::Error;

/// Render configuration errors. These are fixed by the integrator, not
/// recovered at runtime.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("no render rule defined for node type `{0}`")]
    MissingRule(String),
}

/// Markup engine failures. The pipeline recovers from these by rendering an
/// empty document.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("markup engine failed: {0}")]
    Engine(String),

    #[error("invalid token JSON: {0}")]
    Json(#[from] serde_json::Error),
}
