//! `pxdgen check`: run the pipeline without writing files.

use anyhow::{bail, Result};
use pxdgen_render::generate_from_path;

use super::Plan;

/// One line of the check report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CheckSummary {
    pub header: String,
    pub items: usize,
    pub extracted: usize,
    pub lines: usize,
}

/// Translate and flatten every header, returning one summary per success.
/// Fails after reporting if any header fails.
pub(crate) fn run(plan: &Plan) -> Result<Vec<CheckSummary>> {
    let mut summaries = Vec::new();
    let mut failed = 0usize;
    for header in &plan.headers {
        let job = header.job(&plan.base_dir);
        match generate_from_path(&job.tree, &job.header, &plan.render.pipeline_options(&job.header)) {
            Ok(generated) => {
                let summary = CheckSummary {
                    header: generated.header.clone(),
                    items: generated.items,
                    extracted: generated.stats.containers_extracted,
                    lines: generated.lines.len(),
                };
                println!(
                    "ok    {}: {} items, {} nested extracted, {} lines",
                    summary.header, summary.items, summary.extracted, summary.lines
                );
                summaries.push(summary);
            }
            Err(e) => {
                println!("FAIL  {}: {e}", header.header);
                failed += 1;
            }
        }
    }
    if failed > 0 {
        bail!("{failed} of {} header(s) failed", plan.headers.len());
    }
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HeaderConfig, RenderConfig};
    use std::path::PathBuf;

    #[test]
    fn check_reports_extracted_containers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("outer.json"),
            r#"{"file": "outer.h", "children": [
                {"kind": "Struct", "name": "outer", "members": [
                    {"kind": "Declaration", "name": "inner", "ty": {"kind": "Struct", "name": "inner_tag", "members": [
                        {"kind": "Declaration", "name": "v", "ty": {"kind": "Identifier", "names": ["char"]}}
                    ]}}
                ]}
            ]}"#,
        )
        .unwrap();
        let plan = Plan {
            base_dir: dir.path().to_path_buf(),
            output_dir: dir.path().to_path_buf(),
            render: RenderConfig::default(),
            headers: vec![HeaderConfig {
                tree: PathBuf::from("outer.json"),
                header: "outer.h".into(),
                extern_name: None,
            }],
        };

        let summaries = run(&plan).unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].header, "outer.h");
        assert_eq!(summaries[0].extracted, 1);
        assert!(std::fs::read_dir(dir.path()).unwrap().count() == 1);
    }

    #[test]
    fn check_fails_on_missing_tree() {
        let dir = tempfile::tempdir().unwrap();
        let plan = Plan {
            base_dir: dir.path().to_path_buf(),
            output_dir: dir.path().to_path_buf(),
            render: RenderConfig::default(),
            headers: vec![HeaderConfig {
                tree: PathBuf::from("missing.json"),
                header: "missing.h".into(),
                extern_name: None,
            }],
        };
        assert!(run(&plan).is_err());
    }
}
