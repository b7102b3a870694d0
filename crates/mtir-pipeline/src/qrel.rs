//! Relevance-judgment (qrel) file writer.
//!
//! TREC qrel format, one line per (query, document) pair:
//! `query_id<TAB>0<TAB>doc_id<TAB>grade`. Every query covers every document
//! exactly once, in document order, whether or not the document was ever
//! retrieved for it.

use std::collections::HashMap;
use std::io::Write;

use anyhow::Result;
use tracing::warn;

use mtir_core::config::{EvalConfig, RelevanceMode};
use mtir_core::types::{Document, Hit, Query};
use mtir_relevance::{normalize, RelevanceBinner};

pub fn write_qrel<W: Write>(
    queries: &[Query],
    documents: &[Document],
    hits: &[Hit],
    config: &EvalConfig,
    out: &mut W,
) -> Result<()> {
    match config.relevance_mode {
        RelevanceMode::Substring => write_substring_qrel(queries, documents, out),
        RelevanceMode::Jenks | RelevanceMode::Percentile => {
            write_scored_qrel(queries, documents, hits, config, out)
        }
    }
}

/// Binary oracle: grade 1 when the literal query text occurs anywhere in
/// the concatenated document text. Independent of the search engine.
fn write_substring_qrel<W: Write>(
    queries: &[Query],
    documents: &[Document],
    out: &mut W,
) -> Result<()> {
    for query in queries {
        for document in documents {
            let grade = u8::from(document.text().contains(&query.text));
            writeln!(out, "{}\t0\t{}\t{}", query.id, document.id, grade)?;
        }
    }
    Ok(())
}

/// Score-derived judgments: per query, the full per-document score vector
/// (0.0 for never-retrieved pairs) is normalized and binned into grades.
fn write_scored_qrel<W: Write>(
    queries: &[Query],
    documents: &[Document],
    hits: &[Hit],
    config: &EvalConfig,
    out: &mut W,
) -> Result<()> {
    let score_lookup: HashMap<(&str, &str), f64> = hits
        .iter()
        .map(|h| ((h.query_id.as_str(), h.doc_id.as_str()), h.score))
        .collect();

    let mut degenerate_queries = 0usize;
    for query in queries {
        let scores: Vec<f64> = documents
            .iter()
            .map(|d| {
                score_lookup
                    .get(&(query.id.as_str(), d.id.as_str()))
                    .copied()
                    .unwrap_or(0.0)
            })
            .collect();

        // A vector with no signal (no hits at all) still gets full
        // coverage: every document at the bottom grade.
        let grades = if scores.iter().all(|&s| s == 0.0) {
            degenerate_queries += 1;
            vec![0; documents.len()]
        } else {
            let normalized = normalize(&scores)?;
            let binner = RelevanceBinner::from_config(&normalized, config)?;
            binner.grades(&normalized)?
        };

        for (grade, document) in grades.iter().zip(documents) {
            writeln!(out, "{}\t0\t{}\t{}", query.id, document.id, grade)?;
        }
    }
    if degenerate_queries > 0 {
        warn!(
            queries = degenerate_queries,
            "queries with all-zero score vectors judged at grade 0"
        );
    }
    Ok(())
}
