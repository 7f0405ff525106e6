//! Translation of C parse trees into the pxdgen declaration graph.
//!
//! - [`translate`]: single-pass walk of a [`pxdgen_core::TranslationUnit`]
//! - [`eval`]: enumerator initializer evaluation
//! - [`flatten`]: hoisting of nested aggregate bodies to the top level

pub mod error;
pub mod eval;
pub mod flatten;
pub mod translate;

pub use error::{EvalError, TranslateError};
pub use eval::{evaluate, evaluate_integral, ConstValue};
pub use flatten::{flatten, FlattenStats};
pub use translate::{translate, Translator};
