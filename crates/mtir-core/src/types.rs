//! Domain types shared by the parser, backends and the pipeline.

use serde::{Deserialize, Serialize};

pub type DocId = String;
pub type QueryId = String;

/// A parsed document: a stable identifier plus its sentences in source
/// order. Sentence order is significant (it drives per-sentence query ids
/// and segment ordering) and the document is immutable once parsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub sentences: Vec<String>,
}

impl Document {
    pub fn new<S: Into<String>>(id: S, sentences: Vec<String>) -> Self {
        Self { id: id.into(), sentences }
    }

    /// The concatenated text of the document, one sentence per line. This is
    /// the field value handed to the search backend.
    pub fn text(&self) -> String {
        self.sentences.join("\n")
    }
}

/// A search query: `"{doc_id}_{sentence_index}"` for sentence queries, an
/// enumeration index for vocabulary-term queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    pub id: QueryId,
    pub text: String,
}

impl Query {
    pub fn new<I: Into<String>, T: Into<String>>(id: I, text: T) -> Self {
        Self { id: id.into(), text: text.into() }
    }
}

/// One ranked search result. `score` is collection- and query-dependent and
/// is not comparable across collections without normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hit {
    pub query_id: QueryId,
    pub doc_id: DocId,
    pub score: f64,
}

impl Hit {
    pub fn new<Q: Into<String>, D: Into<String>>(query_id: Q, doc_id: D, score: f64) -> Self {
        Self { query_id: query_id.into(), doc_id: doc_id.into(), score }
    }
}
