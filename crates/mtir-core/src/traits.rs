use crate::config::Analyzer;
use crate::types::{DocId, Document};

/// The search capability consumed by the pipeline. Implementations own the
/// mapping from collection names to physical indexes; exactly one collection
/// is live under a given name at a time, and `create_collection` for an
/// existing name destroys the previous contents.
pub trait SearchBackend: Send + Sync {
    /// Remove the named collection if it exists.
    fn delete_collection(&self, name: &str) -> anyhow::Result<()>;

    /// Create a fresh, empty collection under `name`, replacing any
    /// existing one.
    fn create_collection(&self, name: &str, analyzer: Analyzer) -> anyhow::Result<()>;

    /// Load every document into the named collection, one field holding the
    /// concatenated sentence text. Returns the number of documents the
    /// collection holds after the load commits.
    fn bulk_upsert(&self, name: &str, documents: &[Document]) -> anyhow::Result<usize>;

    /// Run a full-text query, returning up to `top_n` `(doc_id, score)`
    /// pairs sorted by descending score with ascending doc id breaking ties.
    fn search(&self, name: &str, query_text: &str, top_n: usize)
        -> anyhow::Result<Vec<(DocId, f64)>>;

    /// Every distinct term of the collection's text field, sorted and
    /// deduplicated, for vocabulary-term query derivation.
    fn distinct_terms(&self, name: &str) -> anyhow::Result<Vec<String>>;
}
