//! Command-line parsing for the generation time-series tool.
//!
//! Argument parsing and command dispatch stay separate from the reconstruction core;
//! nothing in here knows about the document format.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "genseries",
    version,
    about = "Rebuild generation time series from transparency-platform documents"
)]
pub struct Cli {
    /// More log output on stderr (-v info, -vv debug). `RUST_LOG` wins when set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Request a window from the provider and rebuild its series.
    Fetch(FetchArgs),
    /// Rebuild the series from a document saved on disk.
    Load(LoadArgs),
    /// Summarize a dataset JSON written by `--export-json`.
    Inspect(InspectArgs),
}

/// Options shared by every command that produces a dataset.
#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    /// Export the dataset to CSV (timestamp,value).
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the dataset plus run metadata to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Number of rows to echo to the terminal.
    #[arg(long, default_value_t = 10)]
    pub head: usize,

    /// Write a markdown debug bundle under ./debug.
    #[arg(long)]
    pub debug: bool,

    /// Process segments one by one instead of on the thread pool.
    #[arg(long)]
    pub sequential: bool,
}

#[derive(Debug, Args, Clone)]
pub struct FetchArgs {
    /// Document type code.
    #[arg(long, default_value = "A75")]
    pub document_type: String,

    /// Process type code.
    #[arg(long, default_value = "A16")]
    pub process_type: String,

    /// Production type code (e.g. B16 for solar). All types when omitted.
    #[arg(long)]
    pub psr_type: Option<String>,

    /// Bidding zone / control area EIC code.
    #[arg(long)]
    pub domain: String,

    /// Window start (YYYY-MM-DD or YYYY-MM-DDTHH:MMZ).
    #[arg(long)]
    pub start: String,

    /// Window end, exclusive (YYYY-MM-DD or YYYY-MM-DDTHH:MMZ).
    #[arg(long)]
    pub end: String,

    /// Keep the raw provider response at this path.
    #[arg(long, value_name = "XML")]
    pub save_raw: Option<PathBuf>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args, Clone)]
pub struct LoadArgs {
    /// Provider document (XML) to read.
    #[arg(long, value_name = "XML")]
    pub file: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Dataset JSON produced by `--export-json`.
    #[arg(long, value_name = "JSON")]
    pub dataset: PathBuf,

    /// Number of rows to echo to the terminal.
    #[arg(long, default_value_t = 10)]
    pub head: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_defaults() {
        let cli = Cli::try_parse_from([
            "genseries",
            "fetch",
            "--domain",
            "10YDE-VE-------2",
            "--start",
            "2015-01-01",
            "--end",
            "2015-01-02",
        ])
        .unwrap();
        let Command::Fetch(args) = cli.command else {
            panic!("expected fetch");
        };
        assert_eq!(args.document_type, "A75");
        assert_eq!(args.process_type, "A16");
        assert_eq!(args.psr_type, None);
        assert_eq!(args.output.head, 10);
        assert!(!args.output.sequential);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn verbosity_is_global() {
        let cli = Cli::try_parse_from(["genseries", "load", "--file", "doc.xml", "-vv", "--sequential"]).unwrap();
        assert_eq!(cli.verbose, 2);
        let Command::Load(args) = cli.command else {
            panic!("expected load");
        };
        assert!(args.output.sequential);
        assert_eq!(args.file, PathBuf::from("doc.xml"));
    }

    #[test]
    fn fetch_requires_domain_and_window() {
        assert!(Cli::try_parse_from(["genseries", "fetch", "--start", "2015-01-01"]).is_err());
    }
}
