//! Translation and evaluation error types.

use pxdgen_core::tree::Location;
use pxdgen_core::GraphError;

/// Errors raised while evaluating a constant expression.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("invalid literal `{text}`")]
    InvalidLiteral { text: String },

    /// The expression shape is outside the supported subset.
    #[error("unsupported constant expression: {expr}")]
    UnsupportedExpression { expr: String },

    #[error("operator `{op}` cannot be applied to a {operand} value")]
    TypeMismatch { op: String, operand: &'static str },

    #[error("shift count {count} out of range")]
    ShiftOutOfRange { count: i64 },

    #[error("expected an integral value, found a {found} value")]
    NotIntegral { found: &'static str },
}

/// Errors that abort the translation of one parse tree.
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    /// An identifier names neither a typedef nor a fundamental type.
    #[error("unknown type reference `{name}`{}", at(.location))]
    UnknownTypeReference {
        name: String,
        location: Option<Location>,
    },

    #[error("cannot evaluate enumerator `{enumerator}`: {source}")]
    ConstantEvaluation {
        enumerator: String,
        source: EvalError,
    },

    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    /// A struct or union field whose type could not be resolved.
    #[error("malformed container `{container}`: field `{field}`: {source}")]
    MalformedContainer {
        container: String,
        field: String,
        source: Box<TranslateError>,
    },
}

fn at(location: &Option<Location>) -> String {
    match location {
        Some(loc) => format!(" at {loc}"),
        None => String::new(),
    }
}

/// Result type alias for translation operations.
pub type Result<T> = std::result::Result<T, TranslateError>;
