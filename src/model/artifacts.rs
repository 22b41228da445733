//! Pipeline outputs and run statistics.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The four files produced by one pipeline run for one source PDF.
///
/// Ownership passes to the caller, who is responsible for indexing and
/// eventually deleting them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineArtifacts {
    /// Layout-preserving DOCX conversion
    pub docx: PathBuf,

    /// Narrative Markdown from the external parser
    pub markdown: PathBuf,

    /// Human-auditable HTML of the extracted tables
    pub html: PathBuf,

    /// Retrieval-ready key-value text, one record per line
    pub key_values: PathBuf,

    /// Statistics collected during the run
    pub stats: RunStats,
}

impl PipelineArtifacts {
    /// Artifact paths for a source stem inside `dir`.
    pub fn paths_for(dir: &Path, stem: &str) -> ArtifactPaths {
        ArtifactPaths {
            docx: dir.join(format!("{}.docx", stem)),
            markdown: dir.join(format!("{}.md", stem)),
            html: dir.join(format!("{}.html", stem)),
            key_values: dir.join(format!("{}_rag.txt", stem)),
        }
    }

    /// The two files consumed by the downstream indexer.
    pub fn index_inputs(&self) -> (&Path, &Path) {
        (&self.markdown, &self.key_values)
    }
}

/// Planned output locations before a run has produced anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub docx: PathBuf,
    pub markdown: PathBuf,
    pub html: PathBuf,
    pub key_values: PathBuf,
}

impl ArtifactPaths {
    /// All paths, in creation order.
    pub fn all(&self) -> [&Path; 4] {
        [&self.docx, &self.markdown, &self.html, &self.key_values]
    }

    /// Attach statistics to form the final artifact set.
    pub fn into_artifacts(self, stats: RunStats) -> PipelineArtifacts {
        PipelineArtifacts {
            docx: self.docx,
            markdown: self.markdown,
            html: self.html,
            key_values: self.key_values,
            stats,
        }
    }
}

/// Statistics collected during one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Pages returned by the external parser
    pub pages_parsed: u32,

    /// Paragraph blocks extracted from the DOCX body
    pub paragraph_count: u32,

    /// Tables found in the DOCX body
    pub table_count: u32,

    /// Tables skipped as malformed
    pub tables_skipped: u32,

    /// Tables whose page could not be attributed
    pub tables_unresolved: u32,

    /// Key-value records written
    pub record_count: u32,

    /// Whether the external parse degraded to an empty page map
    pub parse_degraded: bool,
}

impl RunStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tables that produced records (found minus skipped).
    pub fn tables_transcribed(&self) -> u32 {
        self.table_count.saturating_sub(self.tables_skipped)
    }
}
