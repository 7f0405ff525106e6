//! `pxdgen init`: write a starter `pxdgen.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::config::{PxdgenConfig, CONFIG_FILE};

/// Create `pxdgen.toml` in `dir`. The project name defaults to the directory
/// name.
pub fn run(dir: &Path, name: Option<&str>) -> Result<PathBuf> {
    let path = dir.join(CONFIG_FILE);
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    let name = match name {
        Some(name) => name.to_string(),
        None => dir
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("pxd")
            .to_string(),
    };

    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    fs::write(&path, PxdgenConfig::template(&name))
        .with_context(|| format!("writing {}", path.display()))?;

    println!("Created {} for project '{name}'", path.display());
    Ok(path)
}
