//! Parse tree in, `.pxd` lines out.
//!
//! Each header runs through translate, flatten and render with its own
//! translator, so one failing header leaves the others untouched.

use std::path::{Path, PathBuf};

use pxdgen_core::TranslationUnit;
use pxdgen_translate::{flatten, translate, FlattenStats};
use tracing::debug;

use crate::error::Result;
use crate::render::{render_enum_constants, render_with, wrap_extern, RenderOptions};

/// How generated output is shaped.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Wrap declarations in `cdef extern from "<header>":`.
    pub extern_block: bool,
    pub render: RenderOptions,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            extern_block: true,
            render: RenderOptions::default(),
        }
    }
}

/// One header to generate: its serialized parse tree and include name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderJob {
    pub tree: PathBuf,
    pub header: String,
}

/// The output of one successful run.
#[derive(Debug, Clone)]
pub struct Generated {
    pub header: String,
    /// Rendered `.pxd` lines.
    pub lines: Vec<String>,
    /// `NAME = value` listing of every enumerator.
    pub constants: Vec<String>,
    /// Module items after flattening.
    pub items: usize,
    pub stats: FlattenStats,
}

impl Generated {
    /// The `.pxd` file contents, newline terminated.
    pub fn text(&self) -> String {
        join_lines(&self.lines)
    }

    pub fn constants_text(&self) -> String {
        join_lines(&self.constants)
    }
}

fn join_lines(lines: &[String]) -> String {
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Translate, flatten and render one parse tree.
pub fn generate(unit: &TranslationUnit, header: &str, options: &PipelineOptions) -> Result<Generated> {
    let mut graph = translate(unit)?;
    let stats = flatten(&mut graph);
    debug!(
        header,
        extracted = stats.containers_extracted,
        "flattened nested containers"
    );

    let lines = render_with(&graph, &options.render);
    let lines = if options.extern_block {
        wrap_extern(header, lines)
    } else {
        lines
    };

    Ok(Generated {
        header: header.to_string(),
        lines,
        constants: render_enum_constants(&graph),
        items: graph.module().len(),
        stats,
    })
}

/// Load a JSON parse tree from disk and run [`generate`] on it.
pub fn generate_from_path(path: &Path, header: &str, options: &PipelineOptions) -> Result<Generated> {
    let unit = TranslationUnit::load(path)?;
    generate(&unit, header, options)
}

/// Run every job independently. Results are returned in job order.
pub fn generate_all(jobs: &[HeaderJob], options: &PipelineOptions) -> Vec<Result<Generated>> {
    jobs.iter()
        .map(|job| generate_from_path(&job.tree, &job.header, options))
        .collect()
}
