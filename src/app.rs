//! Top-level application orchestration.
//!
//! `src/main.rs` is a thin wrapper; this module is the real main that:
//! - parses CLI arguments and installs logging
//! - turns flags into a `RunConfig`
//! - runs the pipeline (fetch or load)
//! - prints reports and writes optional exports

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, FetchArgs, InspectArgs, LoadArgs, OutputArgs};
use crate::data::parse_window_bound;
use crate::domain::{QueryParams, RequestWindow, RunConfig, RunSource};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `genseries` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Fetch(args) => handle_run(fetch_config_from_args(&args)?),
        Command::Load(args) => handle_run(load_config_from_args(&args)),
        Command::Inspect(args) => handle_inspect(args),
    }
}

/// Install the stderr subscriber. `RUST_LOG` takes precedence over `-v`.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A second install (tests, embedding) is not an error worth reporting.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

fn handle_run(config: RunConfig) -> Result<(), AppError> {
    let out = pipeline::run(&config)?;
    let rec = &out.reconstruction;

    println!("{}", crate::report::format_run_summary(&out.source, rec));
    println!("{}", crate::report::format_segment_table(&rec.diagnostics));
    let issues = crate::report::format_issues(&rec.diagnostics);
    if !issues.is_empty() {
        println!("{issues}");
    }

    if config.debug {
        let path = crate::debug::write_debug_bundle(
            Path::new("debug"),
            &out.source,
            out.request.as_ref(),
            rec,
        )?;
        println!("Debug bundle: {}", path.display());
    }

    if rec.dataset.is_empty() {
        return Err(AppError::no_data(format!(
            "No rows reconstructed ({} segments, {} failed).",
            rec.diagnostics.segments.len(),
            rec.diagnostics.failed_segments()
        )));
    }

    let head = crate::report::format_rows(rec.dataset.rows(), config.head);
    if !head.is_empty() {
        println!("{head}");
    }

    // Optional exports.
    if let Some(path) = &config.export_csv {
        crate::io::write_dataset_csv(path, &rec.dataset)?;
        info!(path = %path.display(), rows = rec.dataset.len(), "CSV export written");
    }
    if let Some(path) = &config.export_json {
        crate::io::write_dataset_json(path, &rec.dataset, &out.source)?;
        info!(path = %path.display(), rows = rec.dataset.len(), "JSON export written");
    }

    Ok(())
}

fn handle_inspect(args: InspectArgs) -> Result<(), AppError> {
    let file = crate::io::read_dataset_json(&args.dataset)?;
    print!("{}", crate::report::format_dataset_file(&file, args.head));
    Ok(())
}

pub fn fetch_config_from_args(args: &FetchArgs) -> Result<RunConfig, AppError> {
    let window = RequestWindow::new(parse_window_bound(&args.start)?, parse_window_bound(&args.end)?)?;
    let query = QueryParams {
        document_type: args.document_type.clone(),
        process_type: args.process_type.clone(),
        psr_type: args.psr_type.clone(),
        domain: args.domain.clone(),
    };
    Ok(run_config(
        RunSource::Remote { query, window },
        &args.output,
        args.save_raw.clone(),
    ))
}

pub fn load_config_from_args(args: &LoadArgs) -> RunConfig {
    run_config(
        RunSource::File {
            path: args.file.clone(),
        },
        &args.output,
        None,
    )
}

fn run_config(source: RunSource, output: &OutputArgs, save_raw: Option<PathBuf>) -> RunConfig {
    RunConfig {
        source,
        parallel: !output.sequential,
        head: output.head,
        save_raw,
        export_csv: output.export.clone(),
        export_json: output.export_json.clone(),
        debug: output.debug,
    }
}
