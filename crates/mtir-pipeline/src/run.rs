//! The two-phase evaluation protocol.
//!
//! Phase 1 indexes and searches the reference collection and writes the
//! relevance-judgment file; phase 2 rebuilds the collection from the
//! candidate (machine-translated) documents, searches with the same
//! queries, and writes the ranked-results file. Each phase fully completes
//! before the next starts.

use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};
use tracing::info;

use mtir_core::config::{EvalConfig, QueryMode, RelevanceMode};
use mtir_core::doc_parser::{sentence_queries, ParsedCorpus};
use mtir_core::traits::SearchBackend;
use mtir_core::types::Hit;

use crate::orchestrator::RetrievalOrchestrator;
use crate::qrel::write_qrel;
use crate::res::write_res;

static RUN_COUNTER: AtomicU64 = AtomicU64::new(0);

/// The files an evaluation run leaves behind. They are kept on disk; the
/// caller owns relocation or deletion after the metrics phase.
#[derive(Debug)]
pub struct EvalArtifacts {
    pub qrel_path: PathBuf,
    pub res_path: PathBuf,
}

/// A collection name unique to this run, so overlapping evaluations on the
/// same backend never clobber each other's indexes.
pub fn generated_collection_name() -> String {
    format!(
        "mtir-{}-{}",
        std::process::id(),
        RUN_COUNTER.fetch_add(1, Ordering::Relaxed)
    )
}

pub fn run_evaluation<B: SearchBackend>(
    backend: &B,
    reference: &ParsedCorpus,
    candidate: &ParsedCorpus,
    config: &EvalConfig,
    collection: Option<String>,
) -> Result<EvalArtifacts> {
    config.validate()?;

    let collection = collection.unwrap_or_else(generated_collection_name);
    let orchestrator = RetrievalOrchestrator::new(backend, collection, config.clone());
    let mut queries = sentence_queries(&reference.documents);

    info!(
        mode = ?config.relevance_mode,
        collection = orchestrator.collection(),
        "step 1: generating qrel file from reference documents"
    );
    let reference_hits: Vec<Hit> = if config.relevance_mode == RelevanceMode::Substring {
        // The substring oracle never consults the search engine for
        // judgments; phase 1 needs no index at all.
        Vec::new()
    } else {
        orchestrator.index(&reference.documents)?;
        if config.query_mode == QueryMode::UniqueTerms {
            queries = orchestrator.term_queries()?;
        }
        orchestrator.search_all(&queries)?
    };

    let (mut qrel_file, qrel_path) = keep_temp_file("mtir-qrel-")?;
    write_qrel(
        &queries,
        &reference.documents,
        &reference_hits,
        config,
        &mut qrel_file,
    )?;
    qrel_file.flush()?;
    info!(path = %qrel_path.display(), "qrel file written");

    info!("step 2: generating res file from translated documents");
    let candidate_hits = orchestrator.index_and_search(&candidate.documents, &queries)?;

    let (mut res_file, res_path) = keep_temp_file("mtir-res-")?;
    write_res(&candidate_hits, &mut res_file)?;
    res_file.flush()?;
    info!(path = %res_path.display(), "res file written");

    Ok(EvalArtifacts { qrel_path, res_path })
}

fn keep_temp_file(prefix: &str) -> Result<(std::fs::File, PathBuf)> {
    let file = tempfile::Builder::new()
        .prefix(prefix)
        .suffix(".txt")
        .tempfile()
        .context("failed to create temporary output file")?;
    let (file, path) = file.keep().context("failed to keep temporary output file")?;
    Ok((file, path))
}
