//! The yangcheck command-line interface.
//!
//! Loads every given module into one context, validates the set and prints the records at or
//! below the configured level. Exits with 1 when anything was reported.

use std::path::PathBuf;
use std::sync::Arc;
use std::{fs, io, process};

use clap::Parser;
use miette::{Diagnostic, Report};
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::args::YangArgs;
use crate::config::{CheckerConfig, ConfigError, MODPATH_VAR};
use crate::context::Context;
use crate::discovery;
use crate::repository::{FileRepository, Format};

pub mod args;
pub mod output;

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("error {path}: {source}")]
    #[diagnostic(code(yangcheck::cli::read_input))]
    ReadInput {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to scan {0}")]
    #[diagnostic(code(yangcheck::cli::discovery))]
    Discovery(#[from] walkdir::Error),

    #[error("failed to write output")]
    #[diagnostic(code(yangcheck::cli::output))]
    Output(#[from] io::Error),

    #[error("failed to serialize output")]
    #[diagnostic(code(yangcheck::cli::json))]
    Json(#[from] serde_json::Error),
}

/// The main entry point for the CLI.
pub fn run() {
    let args = YangArgs::parse();
    init_tracing(args.debug);

    match execute(&args) {
        Ok(true) => process::exit(0),
        Ok(false) => process::exit(1),
        Err(error) => {
            eprintln!("{:?}", Report::new(error));
            process::exit(1);
        }
    }
}

fn init_tracing(debug: bool) {
    let default = if debug { "yangcheck=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // a subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Runs one check. `Ok(true)` means nothing was reported.
pub fn execute(args: &YangArgs) -> Result<bool, CliError> {
    if args.list_errors {
        output::print_error_catalog()?;
        return Ok(true);
    }

    let config = resolve_config(args)?;
    let modpath = std::env::var(MODPATH_VAR).ok();
    let repository = FileRepository::from_dirs(config.search_path(modpath.as_deref()));
    debug!(dirs = ?repository.dirs(), "module search path");

    let mut ctx = Context::with_grammar(repository, Arc::new(config.grammar()));
    ctx.set_canonical(config.canonical).set_max_level(config.level);

    for file in discovery::expand_inputs(&args.files)? {
        let reference = file.display().to_string();
        let text = fs::read_to_string(&file).map_err(|source| CliError::ReadInput {
            path: reference.clone(),
            source,
        })?;
        if let Err(error) = ctx.add_module(&reference, Format::guess(&text), &text) {
            debug!(%error, "module not added");
        }
    }
    ctx.validate();

    if args.json {
        println!("{}", output::records_to_json(ctx.reported())?);
    } else {
        output::print_records(ctx.reported(), config.print_error_code)?;
    }
    Ok(!ctx.has_reportable())
}

/// Config file first, then command-line overrides.
fn resolve_config(args: &YangArgs) -> Result<CheckerConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => CheckerConfig::load(path)?,
        None => CheckerConfig::default(),
    };
    if let Some(level) = args.level {
        config.level = level;
    }
    config.canonical |= args.canonical;
    config.print_error_code |= args.print_error_code;
    if let Some(path) = &args.path {
        let mut dirs: Vec<PathBuf> = std::env::split_paths(path)
            .filter(|dir| !dir.as_os_str().is_empty())
            .collect();
        dirs.append(&mut config.path);
        config.path = dirs;
    }
    Ok(config)
}
