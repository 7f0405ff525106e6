//! Core error types.

use thiserror::Error;

use crate::graph::DeclId;

/// Errors raised by declaration graph mutation.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A typedef's target may be assigned once only.
    #[error("typedef `{name}` already has a target")]
    DuplicateTypedefAssignment { name: String },

    #[error("declaration {0} is not a typedef")]
    NotATypedef(DeclId),

    #[error("declaration {0} is not a struct, union or enum")]
    NotAnAggregate(DeclId),
}

/// Errors raised while loading a serialized parse tree.
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("invalid parse tree: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
