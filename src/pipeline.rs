//! Pipeline orchestration.
//!
//! One run converts one PDF into four artifacts:
//!
//! ```text
//! START -> { PARSE_EXTERNAL || CONVERT_DOCX } -> EXTRACT_AND_RECONCILE -> DONE
//! ```
//!
//! The external parse and the DOCX conversion run concurrently and are
//! joined before reconciliation starts. A conversion failure aborts the run
//! immediately, cancelling the parse, and removes whatever was written; an
//! external parse failure only leaves every table unresolved.

use crate::convert::{ConvertOptions, DocxConverter};
use crate::detect::ensure_pdf;
use crate::error::{Error, Result};
use crate::model::{ArtifactPaths, PageMap, PipelineArtifacts, RunStats};
use crate::parser::{DocxDocument, DocxParser, ExtractOptions};
use crate::service::{parse_to_markdown, DocumentParser, ParseOutcome};
use crate::transcribe::{TranscribeOptions, Transcriber, Transcript};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Default directory for run artifacts.
pub const DEFAULT_OUTPUT_DIR: &str = "uploads";

/// Default bound on the external parse stage.
pub const DEFAULT_PARSE_TIMEOUT: Duration = Duration::from_secs(300);

/// Options for a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Directory receiving the four artifacts
    pub output_dir: PathBuf,

    /// Bound on the whole external parse exchange
    pub parse_timeout: Duration,

    /// PDF to DOCX conversion options
    pub convert: ConvertOptions,

    /// DOCX extraction options
    pub extract: ExtractOptions,

    /// Transcription options
    pub transcribe: TranscribeOptions,
}

impl PipelineOptions {
    /// Create new pipeline options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the artifact directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set the external parse timeout.
    pub fn with_parse_timeout(mut self, timeout: Duration) -> Self {
        self.parse_timeout = timeout;
        self
    }

    /// Set conversion options.
    pub fn with_convert_options(mut self, options: ConvertOptions) -> Self {
        self.convert = options;
        self
    }

    /// Set extraction options.
    pub fn with_extract_options(mut self, options: ExtractOptions) -> Self {
        self.extract = options;
        self
    }

    /// Set transcription options.
    pub fn with_transcribe_options(mut self, options: TranscribeOptions) -> Self {
        self.transcribe = options;
        self
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            parse_timeout: DEFAULT_PARSE_TIMEOUT,
            convert: ConvertOptions::default(),
            extract: ExtractOptions::default(),
            transcribe: TranscribeOptions::default(),
        }
    }
}

/// Extract blocks from a DOCX and transcribe its tables against a page map.
///
/// This is the synchronous tail of a run, also usable on its own for a DOCX
/// that was converted earlier.
pub fn extract_and_transcribe(
    docx: &Path,
    pages: &PageMap,
    source: &str,
    extract: &ExtractOptions,
    transcriber: &Transcriber,
) -> Result<(DocxDocument, Transcript)> {
    let document = DocxParser::new(extract.clone()).open(docx)?;
    let transcript = transcriber.transcribe(document.blocks(), pages, source);
    Ok((document, transcript))
}

/// The ingestion pipeline.
///
/// Adapters are constructed once by the caller and shared across runs.
/// Runs hold no shared mutable state; each writes to paths derived from its
/// source file stem.
pub struct Pipeline {
    converter: Arc<dyn DocxConverter>,
    parser: Arc<dyn DocumentParser>,
    transcriber: Transcriber,
    options: PipelineOptions,
}

impl Pipeline {
    /// Create a pipeline from its adapters.
    pub fn new(
        converter: Arc<dyn DocxConverter>,
        parser: Arc<dyn DocumentParser>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            converter,
            parser,
            transcriber: Transcriber::new(options.transcribe.clone()),
            options,
        }
    }

    /// The pipeline options.
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Run the pipeline for one PDF.
    ///
    /// Returns all four artifact paths or an error; on error no artifact of
    /// this run is left behind.
    pub async fn run(&self, pdf: &Path) -> Result<PipelineArtifacts> {
        {
            let pdf = pdf.to_path_buf();
            tokio::task::spawn_blocking(move || ensure_pdf(&pdf)).await??;
        }

        let stem = pdf
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::Other(format!("No file stem in {}", pdf.display())))?;
        let source = pdf
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| stem.clone());

        tokio::fs::create_dir_all(&self.options.output_dir).await?;
        let paths = PipelineArtifacts::paths_for(&self.options.output_dir, &stem);

        log::info!("Pipeline start: {}", pdf.display());
        match self.execute(pdf, &source, &paths).await {
            Ok(stats) => {
                log::info!(
                    "Pipeline done: {} ({} tables, {} records, {} unresolved)",
                    pdf.display(),
                    stats.table_count,
                    stats.record_count,
                    stats.tables_unresolved
                );
                Ok(paths.into_artifacts(stats))
            }
            Err(e) => {
                log::error!("Pipeline failed for {}: {}", pdf.display(), e);
                remove_partial(&paths).await;
                Err(e)
            }
        }
    }

    async fn execute(&self, pdf: &Path, source: &str, paths: &ArtifactPaths) -> Result<RunStats> {
        let convert = {
            let converter = Arc::clone(&self.converter);
            let pdf = pdf.to_path_buf();
            let docx = paths.docx.clone();
            let options = self.options.convert.clone();
            tokio::task::spawn_blocking(move || {
                log::debug!("Converting with {}", converter.name());
                converter.convert(&pdf, &docx, &options)
            })
        };
        let parse = parse_to_markdown(
            self.parser.as_ref(),
            pdf,
            &paths.markdown,
            self.options.parse_timeout,
        );
        let (docx, parsed) = join_stages(convert, parse).await?;
        log::debug!("Join point reached: DOCX at {}", docx.display());

        if parsed.pages.is_empty() {
            log::warn!(
                "Empty page map for {}; every table will be unresolved",
                source
            );
        }

        let mut stats = RunStats {
            pages_parsed: parsed.pages.len() as u32,
            parse_degraded: parsed.degraded,
            ..RunStats::new()
        };

        let (document, transcript) = {
            let pages = parsed.pages;
            let source = source.to_string();
            let extract = self.options.extract.clone();
            let transcriber = self.transcriber.clone();
            tokio::task::spawn_blocking(move || {
                extract_and_transcribe(&docx, &pages, &source, &extract, &transcriber)
            })
            .await??
        };

        tokio::fs::write(&paths.html, &transcript.html).await?;
        tokio::fs::write(&paths.key_values, transcript.kv_text()?).await?;

        stats.paragraph_count = document.paragraph_count() as u32;
        stats.table_count = document.table_count() as u32;
        stats.tables_skipped = transcript.skipped.len() as u32;
        stats.tables_unresolved = transcript.unresolved_count() as u32;
        stats.record_count = transcript.records.len() as u32;
        Ok(stats)
    }
}

/// Wait for both stages.
///
/// A failed conversion returns at once and drops the in-flight parse. A
/// parse error still waits for the conversion so that nothing writes into
/// the output directory after cleanup.
async fn join_stages<F>(
    mut convert: JoinHandle<Result<PathBuf>>,
    parse: F,
) -> Result<(PathBuf, ParseOutcome)>
where
    F: Future<Output = Result<ParseOutcome>>,
{
    tokio::pin!(parse);
    tokio::select! {
        converted = &mut convert => {
            let docx = converted??;
            Ok((docx, parse.await?))
        }
        parsed = &mut parse => {
            let docx = convert.await??;
            Ok((docx, parsed?))
        }
    }
}

async fn remove_partial(paths: &ArtifactPaths) {
    for path in paths.all() {
        match tokio::fs::remove_file(path).await {
            Ok(()) => log::warn!("Removed partial artifact {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Could not remove {}: {}", path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = PipelineOptions::default();
        assert_eq!(options.output_dir, PathBuf::from("uploads"));
        assert_eq!(options.parse_timeout, Duration::from_secs(300));
        assert_eq!(options.transcribe.header_marker, "대 학");
    }

    #[test]
    fn test_options_builder() {
        let options = PipelineOptions::new()
            .with_output_dir("/tmp/out")
            .with_parse_timeout(Duration::from_secs(5))
            .with_convert_options(ConvertOptions::new().with_end_page(3))
            .with_transcribe_options(TranscribeOptions::new().with_header_marker("학 부"));

        assert_eq!(options.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(options.parse_timeout, Duration::from_secs(5));
        assert_eq!(options.convert.end_page, Some(3));
        assert_eq!(options.transcribe.header_marker, "학 부");
    }
}
