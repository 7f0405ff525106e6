//! `pxdgen.toml` project configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pxdgen_render::{HeaderJob, PipelineOptions, RenderOptions};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "pxdgen.toml";

/// The top-level configuration for a pxdgen project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PxdgenConfig {
    pub project: ProjectConfig,
    #[serde(default)]
    pub render: RenderConfig,
    /// Headers to generate, in order.
    #[serde(default)]
    pub headers: Vec<HeaderConfig>,
}

/// Project metadata section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    /// Directory `.pxd` files are written to, relative to the config file.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Output shaping shared by every header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Wrap declarations in `cdef extern from "<header>":`.
    #[serde(default = "default_true")]
    pub extern_block: bool,
    /// Also write a `<stem>_constants.txt` enumerator listing.
    #[serde(default)]
    pub emit_constants: bool,
    /// Only render items located in the header itself.
    #[serde(default)]
    pub filter_to_header: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            extern_block: true,
            emit_constants: false,
            filter_to_header: false,
        }
    }
}

fn default_true() -> bool {
    true
}

/// One `[[headers]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderConfig {
    /// Serialized parse tree, relative to the config file.
    pub tree: PathBuf,
    /// Header name used in `cdef extern from`.
    pub header: String,
    #[serde(default)]
    pub extern_name: Option<String>,
}

impl HeaderConfig {
    /// Output module name: the configured one, or `_` plus the header stem.
    pub fn extern_name(&self) -> String {
        match &self.extern_name {
            Some(name) => name.clone(),
            None => format!("_{}", header_stem(&self.header)),
        }
    }

    pub fn job(&self, base_dir: &Path) -> HeaderJob {
        HeaderJob {
            tree: base_dir.join(&self.tree),
            header: self.header.clone(),
        }
    }
}

/// `foo/bar.h` -> `bar`.
pub fn header_stem(header: &str) -> &str {
    Path::new(header)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(header)
}

impl RenderConfig {
    pub fn pipeline_options(&self, header: &str) -> PipelineOptions {
        PipelineOptions {
            extern_block: self.extern_block,
            render: RenderOptions {
                header_filter: self.filter_to_header.then(|| header.to_string()),
            },
        }
    }
}

impl PxdgenConfig {
    /// Search for `pxdgen.toml` starting from `start_dir` and walking up.
    ///
    /// Returns the parsed config and the directory containing it.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(CONFIG_FILE);
            if candidate.is_file() {
                let config = Self::load(&candidate)?;
                return Ok(Some((config, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    #[cfg(test)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing pxdgen.toml")
    }

    /// Generate the default template for `pxdgen init`.
    pub fn template(name: &str) -> String {
        format!(
            r#"[project]
name = "{name}"
output_dir = "pxd"

[render]
extern_block = true
emit_constants = false
filter_to_header = false

# [[headers]]
# tree = "trees/{name}.json"
# header = "{name}.h"
"#
        )
    }
}
