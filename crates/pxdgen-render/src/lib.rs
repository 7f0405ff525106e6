//! Cython `.pxd` rendering for the pxdgen declaration graph.
//!
//! [`render`] turns a flattened graph into declaration lines;
//! [`pipeline`] chains translation, flattening and rendering per header.

pub mod code;
pub mod declarator;
pub mod error;
pub mod pipeline;
pub mod render;

pub use error::PipelineError;
pub use pipeline::{generate, generate_all, generate_from_path, Generated, HeaderJob, PipelineOptions};
pub use render::{
    render, render_enum_constants, render_extern, render_extern_with, render_with, wrap_extern,
    RenderOptions,
};
