//! Shared run pipeline used by the `fetch` and `load` commands.
//!
//! document bytes -> tree -> acknowledgement check -> segment reconstruction
//!
//! The commands differ only in where the bytes come from; everything after that is
//! here so the CLI layer can focus on presentation.

use tracing::info;

use crate::data::{ClientConfig, EntsoeClient, RequestDescriptor, acknowledgement_reason, build_request};
use crate::document::XmlNode;
use crate::domain::{RunConfig, RunSource};
use crate::error::AppError;
use crate::io::{read_document_file, write_raw_document};
use crate::reconstruct::{ReconstructOptions, Reconstruction, reconstruct};

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub source: RunSource,
    /// The provider request, for remote runs.
    pub request: Option<RequestDescriptor>,
    pub reconstruction: Reconstruction,
}

/// Execute the full pipeline for the configured source.
pub fn run(config: &RunConfig) -> Result<RunOutput, AppError> {
    let options = ReconstructOptions {
        parallel: config.parallel,
        ..ReconstructOptions::default()
    };

    match &config.source {
        RunSource::Remote { query, window } => {
            let request = build_request(query, window);
            let client = EntsoeClient::new(ClientConfig::from_env()?)?;
            let bytes = client.fetch(&request)?;
            if let Some(path) = &config.save_raw {
                write_raw_document(path, &bytes)?;
                info!(path = %path.display(), "raw document saved");
            }
            let reconstruction = reconstruct_bytes(&bytes, &options, AppError::remote)?;
            Ok(RunOutput {
                source: config.source.clone(),
                request: Some(request),
                reconstruction,
            })
        }
        RunSource::File { path } => {
            let bytes = read_document_file(path)?;
            let reconstruction = run_from_bytes(&bytes, &options)?;
            Ok(RunOutput {
                source: config.source.clone(),
                request: None,
                reconstruction,
            })
        }
    }
}

/// Reconstruct a document already in memory. Unreadable documents are input errors.
pub fn run_from_bytes(bytes: &[u8], options: &ReconstructOptions) -> Result<Reconstruction, AppError> {
    reconstruct_bytes(bytes, options, AppError::input)
}

fn reconstruct_bytes(
    bytes: &[u8],
    options: &ReconstructOptions,
    malformed: impl Fn(String) -> AppError,
) -> Result<Reconstruction, AppError> {
    let root = XmlNode::parse(bytes).map_err(|e| malformed(format!("Unreadable provider document: {e}")))?;

    if let Some(reason) = acknowledgement_reason(&root) {
        return Err(AppError::no_data(format!("Provider returned no data: {reason}")));
    }

    let reconstruction = reconstruct(&root, options);
    let diag = &reconstruction.diagnostics;
    info!(
        rows = reconstruction.dataset.len(),
        segments = diag.segments.len(),
        failed = diag.failed_segments(),
        empty = diag.skipped_empty,
        "reconstruction finished"
    );
    Ok(reconstruction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<GL_MarketDocument xmlns="urn:iec62325.351:tc57wg16:451-6:generationloaddocument:3:0">
  <TimeSeries>
    <Period>
      <timeInterval><start>2015-01-01T00:00Z</start><end>2015-01-01T01:00Z</end></timeInterval>
      <resolution>PT15M</resolution>
      <Point><position>1</position><quantity>10</quantity></Point>
      <Point><position>2</position><quantity>20</quantity></Point>
      <Point><position>3</position><quantity>30</quantity></Point>
      <Point><position>4</position><quantity>40</quantity></Point>
    </Period>
  </TimeSeries>
</GL_MarketDocument>"#;

    #[test]
    fn bytes_to_dataset() {
        let rec = run_from_bytes(DOC.as_bytes(), &ReconstructOptions::default()).unwrap();
        assert_eq!(rec.dataset.len(), 4);
        assert!(rec.is_complete());
        assert!(rec.diagnostics.warnings.is_empty());
    }

    #[test]
    fn acknowledgement_is_no_data() {
        let ack = b"<Acknowledgement_MarketDocument><Reason><code>999</code><text>No matching data found</text></Reason></Acknowledgement_MarketDocument>";
        let err = run_from_bytes(ack, &ReconstructOptions::default()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.message().contains("No matching data found"));
    }

    #[test]
    fn garbage_is_an_input_error_from_disk() {
        let err = run_from_bytes(b"<GL_MarketDocument><TimeSeries>", &ReconstructOptions::default()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn file_source_runs_end_to_end() {
        let path = std::env::temp_dir().join(format!("genseries_{}_pipeline.xml", std::process::id()));
        std::fs::write(&path, DOC).unwrap();
        let config = RunConfig {
            source: RunSource::File { path: path.clone() },
            parallel: false,
            head: 0,
            save_raw: None,
            export_csv: None,
            export_json: None,
            debug: false,
        };
        let out = run(&config).unwrap();
        assert!(out.request.is_none());
        assert_eq!(out.reconstruction.dataset.len(), 4);
        std::fs::remove_file(&path).ok();

        let missing = RunConfig {
            source: RunSource::File {
                path: PathBuf::from("/definitely/not/here.xml"),
            },
            ..config
        };
        assert_eq!(run(&missing).unwrap_err().exit_code(), 2);
    }
}
