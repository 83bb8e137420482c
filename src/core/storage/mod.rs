//! Persistence gateway for the index model.
//!
//! The pipeline hands batches of [`DocumentData`] to a
//! [`PersistenceGateway`]; on startup the model is rebuilt from
//! [`PersistenceGateway::load_index_data`]. Two implementations:
//!
//! - **TantivyStore**: durable, one tantivy document per path
//! - **MemoryStore**: in-process, with write fault injection for tests
//!
//! # Storage Structure
//!
//! ```text
//! {data_dir}/index/
//! ├── meta.json           # tantivy index metadata
//! ├── .managed.json
//! └── [segment files]
//! ```

mod memory;
mod tantivy;

pub use self::memory::MemoryStore;
pub use self::tantivy::{create_schema, TantivyStore};

use crate::core::error::Result;
use crate::core::model::{DocumentFrequency, DocumentIndex};
use crate::core::types::DocumentData;

/// Durable storage for indexed documents
///
/// Writes are all-or-nothing per call: either every document of the
/// batch is committed or none is.
pub trait PersistenceGateway: Send + Sync {
    /// Commit a batch, replacing any stored document with the same path
    fn add_documents(&self, batch: &[DocumentData]) -> Result<()>;

    /// Delete the documents at `paths`; unknown paths are ignored
    fn remove_documents(&self, paths: &[String]) -> Result<()>;

    /// Rebuild the document index and document frequencies
    fn load_index_data(&self) -> Result<(DocumentIndex, DocumentFrequency)>;

    /// Release resources; later writes fail
    fn close(&self) -> Result<()>;
}
