//! Core data structures for the pxdgen declaration pipeline.
//!
//! Three vocabularies live here, leaves first:
//!
//! - [`fundamental`]: canonicalization of C type-specifier token lists into
//!   one fundamental-type identity
//! - [`tree`]: the external parse-tree vocabulary a C front end hands us
//! - [`graph`]: the normalized declaration graph (arena + stable handles)
//!   that translation builds and rendering consumes

pub mod error;
pub mod fundamental;
pub mod graph;
pub mod tree;

pub use error::{GraphError, TreeError};
pub use fundamental::{canonical_key, is_specifier_sequence, FundamentalType};
pub use graph::decl::{
    Argument, Container, Decl, EnumValue, Enumeration, Field, FieldMode, Function, Typedef,
    Variable,
};
pub use graph::{DeclGraph, DeclId, Module};
pub use tree::{Location, TranslationUnit};
