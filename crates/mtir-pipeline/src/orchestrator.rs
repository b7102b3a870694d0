//! Two-phase index/search driver.
//!
//! One orchestrator instance owns one named collection on the backend for
//! the duration of a run. Indexing is destructive and must fully complete
//! before any search is issued; searches then run query by query and the
//! per-query hit lists are flattened preserving contiguity, which the
//! output-file writers rely on.

use anyhow::Result;
use indicatif::ProgressBar;
use tracing::{info, warn};

use mtir_core::config::EvalConfig;
use mtir_core::error::Error;
use mtir_core::traits::SearchBackend;
use mtir_core::types::{Document, Hit, Query};

pub struct RetrievalOrchestrator<'a, B: SearchBackend> {
    backend: &'a B,
    collection: String,
    config: EvalConfig,
}

impl<'a, B: SearchBackend> RetrievalOrchestrator<'a, B> {
    pub fn new(backend: &'a B, collection: impl Into<String>, config: EvalConfig) -> Self {
        Self { backend, collection: collection.into(), config }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Rebuild the collection from `documents`. A count mismatch after the
    /// bulk load means a partial index, which would make every subsequent
    /// search result meaningless, so it is fatal rather than retried.
    pub fn index(&self, documents: &[Document]) -> Result<()> {
        info!(
            collection = %self.collection,
            documents = documents.len(),
            "bulk indexing documents"
        );
        self.backend
            .create_collection(&self.collection, self.config.analyzer)?;
        let indexed = self.backend.bulk_upsert(&self.collection, documents)?;
        if indexed != documents.len() {
            return Err(Error::IndexIntegrity { indexed, expected: documents.len() }.into());
        }
        Ok(())
    }

    /// Execute every query against the collection and flatten the ranked
    /// hit lists in query order. Queries with zero hits are counted and
    /// logged; they are expected in adversarial candidate collections.
    pub fn search_all(&self, queries: &[Query]) -> Result<Vec<Hit>> {
        info!(
            collection = %self.collection,
            queries = queries.len(),
            "running search queries"
        );
        let progress = ProgressBar::new(queries.len() as u64);
        let mut hits = Vec::new();
        let mut no_hit_count = 0usize;
        for query in queries {
            let ranked =
                self.backend
                    .search(&self.collection, &query.text, self.config.result_depth)?;
            if ranked.is_empty() {
                no_hit_count += 1;
            }
            for (doc_id, score) in ranked {
                hits.push(Hit::new(query.id.clone(), doc_id, score));
            }
            progress.inc(1);
        }
        progress.finish_and_clear();
        if no_hit_count > 0 {
            warn!(queries = no_hit_count, "queries with zero search hits");
        }
        Ok(hits)
    }

    pub fn index_and_search(&self, documents: &[Document], queries: &[Query]) -> Result<Vec<Hit>> {
        self.index(documents)?;
        self.search_all(queries)
    }

    /// Derive one query per distinct term of the just-built collection,
    /// with ids assigned by enumeration order.
    pub fn term_queries(&self) -> Result<Vec<Query>> {
        let terms = self.backend.distinct_terms(&self.collection)?;
        Ok(terms
            .into_iter()
            .enumerate()
            .map(|(i, term)| Query::new(i.to_string(), term))
            .collect())
    }
}
