use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::Value;
use tantivy::{doc, Index, TantivyDocument};
use tracing::debug;

use mtir_core::config::Analyzer;
use mtir_core::traits::SearchBackend;
use mtir_core::types::{DocId, Document};

use crate::tantivy_utils::{build_schema, register_analyzers, DOC_ID_FIELD, DOC_TEXT_FIELD};

const WRITER_HEAP_BYTES: usize = 50_000_000;

/// File-system backed tantivy search engine. Each collection name maps to
/// one index directory under `root`; creating a collection that already
/// exists wipes its directory first.
pub struct TantivyBackend {
    root: PathBuf,
}

impl TantivyBackend {
    pub fn new<P: Into<PathBuf>>(root: P) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn collection_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn open(&self, name: &str) -> Result<Index> {
        let dir = self.collection_dir(name);
        let index = Index::open_in_dir(&dir)?;
        register_analyzers(&index);
        Ok(index)
    }
}

impl SearchBackend for TantivyBackend {
    fn delete_collection(&self, name: &str) -> Result<()> {
        let dir = self.collection_dir(name);
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
            debug!(collection = name, "deleted collection");
        }
        Ok(())
    }

    fn create_collection(&self, name: &str, analyzer: Analyzer) -> Result<()> {
        self.delete_collection(name)?;
        let dir = self.collection_dir(name);
        fs::create_dir_all(&dir)?;
        let index = Index::create_in_dir(&dir, build_schema(analyzer))?;
        register_analyzers(&index);
        debug!(collection = name, ?analyzer, "created collection");
        Ok(())
    }

    fn bulk_upsert(&self, name: &str, documents: &[Document]) -> Result<usize> {
        let index = self.open(name)?;
        let schema = index.schema();
        let doc_id_field = schema.get_field(DOC_ID_FIELD)?;
        let doc_text_field = schema.get_field(DOC_TEXT_FIELD)?;

        let mut index_writer = index.writer(WRITER_HEAP_BYTES)?;
        for document in documents {
            index_writer.add_document(doc!(
                doc_id_field => document.id.clone(),
                doc_text_field => document.text(),
            ))?;
        }
        index_writer.commit()?;

        let reader = index.reader()?;
        Ok(usize::try_from(reader.searcher().num_docs())?)
    }

    fn search(&self, name: &str, query_text: &str, top_n: usize) -> Result<Vec<(DocId, f64)>> {
        let index = self.open(name)?;
        let schema = index.schema();
        let doc_id_field = schema.get_field(DOC_ID_FIELD)?;
        let doc_text_field = schema.get_field(DOC_TEXT_FIELD)?;

        let reader = index.reader()?;
        let searcher = reader.searcher();
        let query_parser = QueryParser::for_index(&index, vec![doc_text_field]);
        // Lenient parse: raw sentences routinely contain characters the
        // query grammar reserves.
        let (query, _errors) = query_parser.parse_query_lenient(query_text);
        let top_docs = searcher.search(&query, &TopDocs::with_limit(top_n))?;

        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, doc_address) in top_docs {
            let stored: TantivyDocument = searcher.doc(doc_address)?;
            let doc_id = stored
                .get_first(doc_id_field)
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();
            hits.push((doc_id, f64::from(score)));
        }
        // Reproducible ordering: descending score, ascending doc id on ties.
        hits.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        Ok(hits)
    }

    fn distinct_terms(&self, name: &str) -> Result<Vec<String>> {
        let index = self.open(name)?;
        let doc_text_field = index.schema().get_field(DOC_TEXT_FIELD)?;
        let reader = index.reader()?;
        let searcher = reader.searcher();

        let mut terms = BTreeSet::new();
        for segment_reader in searcher.segment_readers() {
            let inverted_index = segment_reader.inverted_index(doc_text_field)?;
            let mut stream = inverted_index.terms().stream()?;
            while stream.advance() {
                if let Ok(term) = std::str::from_utf8(stream.key()) {
                    terms.insert(term.to_string());
                }
            }
        }
        Ok(terms.into_iter().collect())
    }
}

/// Collections live under the backend root; expose it for diagnostics.
impl AsRef<Path> for TantivyBackend {
    fn as_ref(&self) -> &Path {
        &self.root
    }
}
