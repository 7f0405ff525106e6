//! pxdgen: generate Cython `.pxd` declarations from C parse trees.

mod commands;
mod config;
mod logging;

use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use commands::Plan;
use config::PxdgenConfig;

#[derive(Parser)]
#[command(name = "pxdgen", version, about = "Cython .pxd generator for C headers")]
struct Cli {
    /// Log debug output to stderr (overridden by PXDGEN_LOG / RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

/// Where to take headers from: a config file, or one tree on the command line.
#[derive(Args)]
struct Source {
    /// Path to pxdgen.toml (default: search upward from the current directory)
    #[arg(long)]
    config: Option<PathBuf>,
    /// A single JSON parse tree to process instead of the configured headers
    #[arg(long, requires = "header")]
    tree: Option<PathBuf>,
    /// Header name for --tree, used in `cdef extern from`
    #[arg(long, requires = "tree")]
    header: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a .pxd file for each header
    Generate {
        #[command(flatten)]
        source: Source,
        /// Output directory (default: project output_dir, or the current directory)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Translate and flatten each header without writing anything
    Check {
        #[command(flatten)]
        source: Source,
    },
    /// Create a starter pxdgen.toml in the current directory
    Init {
        /// Project name (default: directory name)
        #[arg(long)]
        name: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("reading current directory")?;

    match cli.command {
        Commands::Generate { source, output } => {
            let mut plan = plan(&cwd, &source)?;
            if let Some(output) = output {
                plan.output_dir = cwd.join(output);
            }
            commands::generate::run(&plan).map(|_| ())
        }
        Commands::Check { source } => {
            let plan = plan(&cwd, &source)?;
            commands::check::run(&plan).map(|_| ())
        }
        Commands::Init { name } => commands::init::run(&cwd, name.as_deref()).map(|_| ()),
    }
}

fn plan(cwd: &Path, source: &Source) -> anyhow::Result<Plan> {
    let loaded = match &source.config {
        Some(path) => {
            let path = cwd.join(path);
            let config = PxdgenConfig::load(&path)?;
            let dir = path.parent().map(Path::to_path_buf).unwrap_or_else(|| cwd.to_path_buf());
            Some((config, dir))
        }
        None => PxdgenConfig::find_and_load(cwd)?,
    };

    match (&source.tree, &source.header, loaded) {
        (Some(tree), Some(header), loaded) => Ok(Plan::single(
            cwd,
            loaded.as_ref().map(|(config, _)| config),
            tree,
            header,
        )),
        (_, _, Some((config, dir))) => Plan::from_config(&config, &dir),
        _ => anyhow::bail!("no pxdgen.toml found (run `pxdgen init`, or pass --tree and --header)"),
    }
}
