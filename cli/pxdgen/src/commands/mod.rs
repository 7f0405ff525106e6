//! CLI command implementations.

pub mod check;
pub mod generate;
pub mod init;

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::config::{HeaderConfig, PxdgenConfig, RenderConfig};

/// The headers a command should process, and where their paths are rooted.
pub(crate) struct Plan {
    pub base_dir: PathBuf,
    pub output_dir: PathBuf,
    pub render: RenderConfig,
    pub headers: Vec<HeaderConfig>,
}

impl Plan {
    /// A single tree given on the command line; the config, if any, still
    /// supplies render settings.
    pub fn single(
        cwd: &Path,
        config: Option<&PxdgenConfig>,
        tree: &Path,
        header: &str,
    ) -> Self {
        Self {
            base_dir: cwd.to_path_buf(),
            output_dir: cwd.to_path_buf(),
            render: config.map(|c| c.render.clone()).unwrap_or_default(),
            headers: vec![HeaderConfig {
                tree: tree.to_path_buf(),
                header: header.to_string(),
                extern_name: None,
            }],
        }
    }

    pub fn from_config(config: &PxdgenConfig, config_dir: &Path) -> Result<Self> {
        if config.headers.is_empty() {
            bail!("no [[headers]] configured in pxdgen.toml");
        }
        Ok(Self {
            base_dir: config_dir.to_path_buf(),
            output_dir: config_dir.join(&config.project.output_dir),
            render: config.render.clone(),
            headers: config.headers.clone(),
        })
    }
}
