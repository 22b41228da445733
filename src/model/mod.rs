//! Data model shared by the pipeline stages.
//!
//! Everything here is owned by a single pipeline run and discarded once the
//! output files are written; nothing is process-wide state.

mod artifacts;
mod block;
mod page_map;
mod record;
mod table;

pub use artifacts::{ArtifactPaths, PipelineArtifacts, RunStats};
pub use block::{Block, Paragraph};
pub use page_map::{PageMap, ResolvedPage};
pub use record::{KeyValueRecord, RecordMetadata, TABLE_KV};
pub use table::{ExtractedTable, Table, TableRow};

pub(crate) use table::anchors_of;
