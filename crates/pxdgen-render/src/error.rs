//! Pipeline error types.

use pxdgen_core::TreeError;
use pxdgen_translate::TranslateError;

/// Errors that abort the generation of one header.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Translate(#[from] TranslateError),

    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
