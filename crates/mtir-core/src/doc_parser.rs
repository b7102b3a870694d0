//! Document file parsing.
//!
//! Two input formats are supported, chosen by file extension:
//! - SGML (`.sgm`/`.sgml`, the NIST MT convention): `<doc docid="...">`
//!   elements containing `<seg>` sentences. This markup predates XML and is
//!   rarely well-formed, so parsing is a permissive tag scanner rather than
//!   a strict XML parse.
//! - TSV (`.tsv`): two tab-separated columns, `doc_id` and sentence, grouped
//!   by first-seen document order.
//!
//! Files with a missing or unrecognized extension default to SGML.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::Error;
use crate::types::{Document, Query};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocFormat {
    Sgml,
    Tsv,
}

/// The parsed form of one input file: documents in source order plus the
/// total sentence count across all of them.
#[derive(Debug, Clone)]
pub struct ParsedCorpus {
    pub documents: Vec<Document>,
    pub total_sentences: usize,
}

impl ParsedCorpus {
    pub fn log_stats(&self) {
        info!(
            documents = self.documents.len(),
            sentences = self.total_sentences,
            "parsed corpus"
        );
    }
}

/// Determine the input format from the file extension, defaulting to SGML.
pub fn detect_format(path: &Path) -> DocFormat {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("tsv") => DocFormat::Tsv,
        _ => DocFormat::Sgml,
    }
}

/// Parse a document file into an ordered corpus.
pub fn parse(path: &Path) -> anyhow::Result<ParsedCorpus> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Parse(format!("failed to read {}: {e}", path.display())))?;
    let corpus = match detect_format(path) {
        DocFormat::Sgml => parse_sgml(&content),
        DocFormat::Tsv => parse_tsv(&content)?,
    };
    Ok(corpus)
}

/// One query per sentence, with id `"{doc_id}_{sentence_index}"`.
pub fn sentence_queries(documents: &[Document]) -> Vec<Query> {
    let mut queries = Vec::new();
    for doc in documents {
        for (i, sentence) in doc.sentences.iter().enumerate() {
            queries.push(Query::new(format!("{}_{}", doc.id, i), sentence.clone()));
        }
    }
    queries
}

/// Permissive SGML scan: walks `<...>` tags, collecting `<seg>` text into
/// the enclosing `<doc docid="...">`. Documents without segments are
/// dropped. Tag names and attribute keys are case-insensitive.
pub fn parse_sgml(content: &str) -> ParsedCorpus {
    let mut documents = Vec::new();
    let mut total_sentences = 0usize;

    let mut current_id: Option<String> = None;
    let mut current_sentences: Vec<String> = Vec::new();

    let mut pos = 0usize;
    while let Some((inner, tag_end)) = next_tag(content, pos) {
        pos = tag_end;
        let lowered = inner.trim().to_ascii_lowercase();
        if lowered == "/doc" {
            if let Some(id) = current_id.take() {
                if !current_sentences.is_empty() {
                    documents.push(Document::new(id, std::mem::take(&mut current_sentences)));
                }
            }
            current_sentences.clear();
        } else if lowered.starts_with("doc") && !lowered.starts_with("doctype") {
            current_id = attr_value(inner, "docid");
            current_sentences.clear();
        } else if lowered.starts_with("seg") {
            // Text runs to the matching close tag; an unclosed final segment
            // runs to end of input. Segments outside a doc with an id are
            // skipped, not counted.
            let rest = &content[pos..];
            let close = rest
                .to_ascii_lowercase()
                .find("</seg")
                .unwrap_or(rest.len());
            if current_id.is_some() {
                let text = decode_entities(rest[..close].trim());
                total_sentences += 1;
                current_sentences.push(text);
            }
            pos += close;
        }
    }

    ParsedCorpus { documents, total_sentences }
}

/// TSV parse: every line must carry `doc_id<TAB>sentence`; sentences are
/// grouped under their document in first-seen order.
pub fn parse_tsv(content: &str) -> Result<ParsedCorpus, Error> {
    let mut documents: Vec<Document> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut total_sentences = 0usize;

    for (lineno, line) in content.lines().enumerate() {
        let (doc_id, sentence) = line
            .split_once('\t')
            .ok_or_else(|| Error::Parse(format!("tsv line {} has no tab separator", lineno + 1)))?;
        let sentence = sentence.trim_end().to_string();
        total_sentences += 1;
        match index.get(doc_id) {
            Some(&i) => documents[i].sentences.push(sentence),
            None => {
                index.insert(doc_id.to_string(), documents.len());
                documents.push(Document::new(doc_id, vec![sentence]));
            }
        }
    }

    Ok(ParsedCorpus { documents, total_sentences })
}

/// Find the next `<...>` tag at or after `from`. Returns the tag's inner
/// text and the byte offset just past the closing `>`.
fn next_tag(content: &str, from: usize) -> Option<(&str, usize)> {
    let open = content[from..].find('<')? + from;
    let close = content[open..].find('>')? + open;
    Some((&content[open + 1..close], close + 1))
}

/// Extract a (possibly quoted) attribute value from a tag's inner text.
fn attr_value(tag_inner: &str, key: &str) -> Option<String> {
    let lowered = tag_inner.to_ascii_lowercase();
    let key_pos = lowered.find(key)?;
    let after_key = &tag_inner[key_pos + key.len()..];
    let eq = after_key.find('=')?;
    let value = after_key[eq + 1..].trim_start();
    let value = if let Some(stripped) = value.strip_prefix('"') {
        stripped.split('"').next().unwrap_or("")
    } else if let Some(stripped) = value.strip_prefix('\'') {
        stripped.split('\'').next().unwrap_or("")
    } else {
        value.split_whitespace().next().unwrap_or("")
    };
    Some(value.to_string())
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
