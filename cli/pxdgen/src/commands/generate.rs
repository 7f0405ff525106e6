//! `pxdgen generate`: write one `.pxd` per configured header.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use pxdgen_render::{generate_from_path, Generated};
use tracing::{error, info};

use super::Plan;
use crate::config::{header_stem, HeaderConfig};

/// Generate every header in the plan. Headers that fail are reported and
/// skipped; the rest are still written.
pub(crate) fn run(plan: &Plan) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(&plan.output_dir)
        .with_context(|| format!("creating {}", plan.output_dir.display()))?;

    let mut written = Vec::new();
    let mut failed = 0usize;
    for header in &plan.headers {
        match emit(plan, header) {
            Ok(paths) => written.extend(paths),
            Err(e) => {
                error!(header = %header.header, "generation failed: {e:#}");
                eprintln!("error: {}: {e:#}", header.header);
                failed += 1;
            }
        }
    }

    for path in &written {
        println!("Wrote {}", path.display());
    }
    if failed > 0 {
        bail!("{failed} of {} header(s) failed", plan.headers.len());
    }
    Ok(written)
}

/// Generate one header and write its files. On failure nothing written for
/// this header is left behind.
fn emit(plan: &Plan, header: &HeaderConfig) -> Result<Vec<PathBuf>> {
    let job = header.job(&plan.base_dir);
    let options = plan.render.pipeline_options(&header.header);
    let generated = generate_from_path(&job.tree, &job.header, &options)?;

    let mut outputs = vec![(
        plan.output_dir.join(format!("{}.pxd", header.extern_name())),
        generated.text(),
    )];
    if plan.render.emit_constants {
        outputs.push((
            constants_path(&plan.output_dir, &generated),
            generated.constants_text(),
        ));
    }

    let mut written = Vec::with_capacity(outputs.len());
    for (path, content) in outputs {
        if let Err(e) = write(&path, &content) {
            for path in &written {
                let _ = fs::remove_file(path);
            }
            return Err(e);
        }
        written.push(path);
    }
    Ok(written)
}

fn constants_path(dir: &Path, generated: &Generated) -> PathBuf {
    dir.join(format!("{}_constants.txt", header_stem(&generated.header)))
}

fn write(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "wrote file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;

    const FOO_TREE: &str = r#"{"file": "foo.h", "children": [
        {"kind": "Enum", "name": "color", "enumerators": [
            {"name": "RED"},
            {"name": "GREEN", "value": {"kind": "Int", "text": "4"}}
        ]},
        {"kind": "Struct", "name": "point", "members": [
            {"kind": "Declaration", "name": "x", "ty": {"kind": "Identifier", "names": ["int"]}},
            {"kind": "Declaration", "name": "y", "ty": {"kind": "Identifier", "names": ["int"]}}
        ]}
    ]}"#;

    fn plan(dir: &Path, headers: Vec<HeaderConfig>, render: RenderConfig) -> Plan {
        Plan {
            base_dir: dir.to_path_buf(),
            output_dir: dir.join("pxd"),
            render,
            headers,
        }
    }

    fn header(tree: &str, name: &str) -> HeaderConfig {
        HeaderConfig {
            tree: PathBuf::from(tree),
            header: name.to_string(),
            extern_name: None,
        }
    }

    #[test]
    fn writes_pxd_named_after_header() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("foo.json"), FOO_TREE).unwrap();

        let written = run(&plan(
            dir.path(),
            vec![header("foo.json", "foo.h")],
            RenderConfig::default(),
        ))
        .unwrap();

        let pxd = dir.path().join("pxd").join("_foo.pxd");
        assert_eq!(written, [pxd.clone()]);
        let text = fs::read_to_string(pxd).unwrap();
        assert!(text.starts_with("cdef extern from \"foo.h\":\n"));
        assert!(text.contains("    cdef enum color:\n        RED\n        GREEN\n"));
        assert!(text.contains("    cdef struct point:\n        int x\n        int y\n"));
    }

    #[test]
    fn emits_constants_listing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("foo.json"), FOO_TREE).unwrap();
        let render = RenderConfig {
            emit_constants: true,
            ..RenderConfig::default()
        };

        run(&plan(dir.path(), vec![header("foo.json", "foo.h")], render)).unwrap();

        let constants =
            fs::read_to_string(dir.path().join("pxd").join("foo_constants.txt")).unwrap();
        assert_eq!(constants, "RED = 0\nGREEN = 4\n");
    }

    #[test]
    fn failing_header_writes_nothing_and_errors() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("foo.json"), FOO_TREE).unwrap();
        fs::write(
            dir.path().join("bad.json"),
            r#"{"file": "bad.h", "children": [
                {"kind": "Declaration", "name": "n", "ty": {"kind": "Identifier", "names": ["size_t"]}}
            ]}"#,
        )
        .unwrap();

        let result = run(&plan(
            dir.path(),
            vec![header("bad.json", "bad.h"), header("foo.json", "foo.h")],
            RenderConfig::default(),
        ));

        assert!(result.is_err());
        assert!(!dir.path().join("pxd").join("_bad.pxd").exists());
        assert!(dir.path().join("pxd").join("_foo.pxd").is_file());
    }

    #[test]
    fn unwritable_output_does_not_stop_other_headers() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("foo.json"), FOO_TREE).unwrap();
        fs::write(dir.path().join("bar.json"), FOO_TREE).unwrap();
        // a directory where the first header's .pxd would go
        fs::create_dir_all(dir.path().join("pxd").join("_foo.pxd")).unwrap();

        let result = run(&plan(
            dir.path(),
            vec![header("foo.json", "foo.h"), header("bar.json", "bar.h")],
            RenderConfig::default(),
        ));

        assert!(result.is_err());
        assert!(dir.path().join("pxd").join("_bar.pxd").is_file());
    }

    #[test]
    fn failed_constants_write_removes_pxd() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("foo.json"), FOO_TREE).unwrap();
        fs::create_dir_all(dir.path().join("pxd").join("foo_constants.txt")).unwrap();
        let render = RenderConfig {
            emit_constants: true,
            ..RenderConfig::default()
        };

        let result = run(&plan(dir.path(), vec![header("foo.json", "foo.h")], render));

        assert!(result.is_err());
        assert!(!dir.path().join("pxd").join("_foo.pxd").exists());
    }
}
