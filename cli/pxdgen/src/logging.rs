//! Tracing subscriber setup.
//!
//! The filter is read from `PXDGEN_LOG`, falling back to `RUST_LOG`, using the
//! usual `RUST_LOG` syntax (e.g. `debug`, `pxdgen_translate=trace`). With
//! neither set and no `--verbose`, no subscriber is installed.

use tracing_subscriber::EnvFilter;

fn build_filter(verbose: bool) -> Option<EnvFilter> {
    if let Ok(val) = std::env::var("PXDGEN_LOG") {
        return Some(EnvFilter::builder().parse_lossy(val));
    }
    if std::env::var("RUST_LOG").is_ok() {
        return Some(EnvFilter::from_default_env());
    }
    verbose.then(|| EnvFilter::new("debug"))
}

/// Install the global subscriber. Output goes to stderr so generated text on
/// stdout stays clean.
pub fn init_tracing(verbose: bool) {
    let Some(filter) = build_filter(verbose) else {
        return;
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
