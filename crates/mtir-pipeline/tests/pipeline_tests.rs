use std::collections::HashMap;
use std::fs;

use mtir_core::config::{Analyzer, EvalConfig, QueryMode, RelevanceMode};
use mtir_core::doc_parser::ParsedCorpus;
use mtir_core::traits::SearchBackend;
use mtir_core::types::{DocId, Document, Hit, Query};
use mtir_pipeline::orchestrator::RetrievalOrchestrator;
use mtir_pipeline::qrel::write_qrel;
use mtir_pipeline::res::write_res;
use mtir_pipeline::run_evaluation;

/// In-memory stand-in for the search capability: canned ranked hits per
/// query text, a configurable indexed-count override for integrity tests.
#[derive(Default)]
struct ScriptedBackend {
    hits_by_query: HashMap<String, Vec<(DocId, f64)>>,
    terms: Vec<String>,
    indexed_count_override: Option<usize>,
}

impl SearchBackend for ScriptedBackend {
    fn delete_collection(&self, _name: &str) -> anyhow::Result<()> {
        Ok(())
    }

    fn create_collection(&self, _name: &str, _analyzer: Analyzer) -> anyhow::Result<()> {
        Ok(())
    }

    fn bulk_upsert(&self, _name: &str, documents: &[Document]) -> anyhow::Result<usize> {
        Ok(self.indexed_count_override.unwrap_or(documents.len()))
    }

    fn search(
        &self,
        _name: &str,
        query_text: &str,
        top_n: usize,
    ) -> anyhow::Result<Vec<(DocId, f64)>> {
        let mut hits = self.hits_by_query.get(query_text).cloned().unwrap_or_default();
        hits.truncate(top_n);
        Ok(hits)
    }

    fn distinct_terms(&self, _name: &str) -> anyhow::Result<Vec<String>> {
        Ok(self.terms.clone())
    }
}

fn corpus(docs: &[(&str, &[&str])]) -> ParsedCorpus {
    let documents: Vec<Document> = docs
        .iter()
        .map(|(id, sentences)| {
            Document::new(*id, sentences.iter().map(|s| s.to_string()).collect())
        })
        .collect();
    let total_sentences = documents.iter().map(|d| d.sentences.len()).sum();
    ParsedCorpus { documents, total_sentences }
}

/// Six documents, one query "sent", a fixed score ladder: documents
/// {1,2,3} score {100,80,60} and {4,5,6} score {50,10,0}.
fn six_doc_backend() -> ScriptedBackend {
    let ranked = vec![
        ("1".to_string(), 100.0),
        ("2".to_string(), 80.0),
        ("3".to_string(), 60.0),
        ("4".to_string(), 50.0),
        ("5".to_string(), 10.0),
        ("6".to_string(), 0.0),
    ];
    let mut hits_by_query = HashMap::new();
    hits_by_query.insert("sent".to_string(), ranked);
    ScriptedBackend { hits_by_query, ..ScriptedBackend::default() }
}

fn six_docs() -> ParsedCorpus {
    corpus(&[
        ("1", &["sent"]),
        ("2", &["sent"]),
        ("3", &["sent"]),
        ("4", &["sent 2"]),
        ("5", &["sent 2"]),
        ("6", &["sent 2"]),
    ])
}

fn parse_qrel(content: &str) -> Vec<(String, String, u32)> {
    content
        .lines()
        .map(|line| {
            let fields: Vec<&str> = line.split('\t').collect();
            assert_eq!(fields.len(), 4, "qrel line has 4 fields: {line:?}");
            assert_eq!(fields[1], "0");
            (fields[0].to_string(), fields[2].to_string(), fields[3].parse().expect("grade"))
        })
        .collect()
}

#[test]
fn end_to_end_jenks_two_classes() {
    let backend = six_doc_backend();
    let docs = six_docs();
    let config = EvalConfig { grade_count: 2, ..EvalConfig::default() };

    let artifacts = run_evaluation(&backend, &docs, &docs, &config, Some("test-col".into()))
        .expect("evaluation");

    let qrel = fs::read_to_string(&artifacts.qrel_path).expect("read qrel");
    let rows = parse_qrel(&qrel);
    // Six sentence queries, six judged documents each.
    assert_eq!(rows.len(), 36);
    // Query "1_0" ("sent") retrieves the full score ladder; the zero-scored
    // document lands in the bottom class, everything else above it.
    let ladder: Vec<_> = rows.iter().filter(|r| r.0 == "1_0").collect();
    let grade_of = |doc: &str| ladder.iter().find(|r| r.1 == doc).expect("row").2;
    assert_eq!(grade_of("6"), 0, "zero-scored document in the bottom grade");
    assert_eq!(grade_of("1"), 1, "top-scored document in the top grade");
    let graded: Vec<u32> = (1..=6).map(|d| grade_of(&d.to_string())).collect();
    assert!(graded.contains(&0) && graded.contains(&1), "both grades non-empty");
    // Queries for "sent 2" retrieve nothing and fall back to grade 0.
    assert!(rows.iter().filter(|r| r.0 == "4_0").all(|r| r.2 == 0));

    let res = fs::read_to_string(&artifacts.res_path).expect("read res");
    let res_lines: Vec<&str> = res.lines().collect();
    // Three "sent" queries with six hits each; zero-hit queries are absent.
    assert_eq!(res_lines.len(), 18);
    let block: Vec<&str> = res_lines.iter().filter(|l| l.starts_with("1_0\t")).copied().collect();
    for (rank, line) in block.iter().enumerate() {
        let fields: Vec<&str> = line.split('\t').collect();
        assert_eq!(fields[1], "Q0");
        assert_eq!(fields[2], (rank + 1).to_string(), "descending-score doc order");
        assert_eq!(fields[3], rank.to_string());
        assert_eq!(fields[5], "STANDARD");
    }
    assert!(block[0].contains("100.00000"));
    // Rank restarts at 0 on the next query's block.
    assert!(res_lines[6].starts_with("2_0\tQ0\t1\t0\t"));

    fs::remove_file(&artifacts.qrel_path).ok();
    fs::remove_file(&artifacts.res_path).ok();
}

#[test]
fn qrel_covers_every_query_document_pair() {
    let backend = six_doc_backend();
    let docs = six_docs();
    let queries = vec![
        Query::new("q1", "sent"),
        Query::new("q2", "never matches anything"),
    ];
    let hits: Vec<Hit> = backend
        .search("col", "sent", 100)
        .expect("search")
        .into_iter()
        .map(|(doc_id, score)| Hit::new("q1", doc_id, score))
        .collect();

    let config = EvalConfig { grade_count: 2, ..EvalConfig::default() };
    let mut out = Vec::new();
    write_qrel(&queries, &docs.documents, &hits, &config, &mut out).expect("write qrel");

    let rows = parse_qrel(std::str::from_utf8(&out).expect("utf8"));
    assert_eq!(rows.len(), 12, "num_queries x num_documents");
    // The zero-hit query still covers every document, all at grade 0.
    let q2_rows: Vec<_> = rows.iter().filter(|r| r.0 == "q2").collect();
    assert_eq!(q2_rows.len(), 6);
    assert!(q2_rows.iter().all(|r| r.2 == 0));
    // Document iteration order within each query block.
    let q1_docs: Vec<&str> = rows.iter().filter(|r| r.0 == "q1").map(|r| r.1.as_str()).collect();
    assert_eq!(q1_docs, vec!["1", "2", "3", "4", "5", "6"]);
}

#[test]
fn res_ranks_reset_per_query_block() {
    let hits = vec![
        Hit::new("q1", "a", 3.5),
        Hit::new("q1", "b", 2.25),
        Hit::new("q1", "c", 1.0),
        Hit::new("q2", "b", 9.125),
        Hit::new("q2", "a", 0.5),
    ];
    let mut out = Vec::new();
    write_res(&hits, &mut out).expect("write res");
    let rendered = String::from_utf8(out).expect("utf8");
    let expected = "q1\tQ0\ta\t0\t3.50000\tSTANDARD\n\
q1\tQ0\tb\t1\t2.25000\tSTANDARD\n\
q1\tQ0\tc\t2\t1.00000\tSTANDARD\n\
q2\tQ0\tb\t0\t9.12500\tSTANDARD\n\
q2\tQ0\ta\t1\t0.50000\tSTANDARD\n";
    assert_eq!(rendered, expected);
}

#[test]
fn substring_strategy_is_a_binary_oracle() {
    let backend = six_doc_backend();
    let reference = six_docs();
    let config = EvalConfig {
        relevance_mode: RelevanceMode::Substring,
        ..EvalConfig::default()
    };

    let artifacts =
        run_evaluation(&backend, &reference, &reference, &config, Some("sub-col".into()))
            .expect("evaluation");

    let qrel = fs::read_to_string(&artifacts.qrel_path).expect("read qrel");
    let rows = parse_qrel(&qrel);
    // 6 sentence queries x 6 documents, graded purely by containment.
    assert_eq!(rows.len(), 36);
    assert!(rows.iter().all(|r| r.2 <= 1), "binary grades only");
    // "sent" occurs in every document; "sent 2" only in documents 4-6.
    let sent_query: Vec<_> = rows.iter().filter(|r| r.0 == "1_0").collect();
    assert!(sent_query.iter().all(|r| r.2 == 1));
    let sent2_query: Vec<_> = rows.iter().filter(|r| r.0 == "4_0").collect();
    let graded: Vec<u32> = sent2_query.iter().map(|r| r.2).collect();
    assert_eq!(graded, vec![0, 0, 0, 1, 1, 1]);

    fs::remove_file(&artifacts.qrel_path).ok();
    fs::remove_file(&artifacts.res_path).ok();
}

#[test]
fn unique_terms_mode_derives_queries_from_the_index() {
    let mut backend = six_doc_backend();
    backend.terms = vec!["2".to_string(), "sent".to_string()];
    backend
        .hits_by_query
        .insert("2".to_string(), vec![("4".to_string(), 7.5), ("5".to_string(), 7.5)]);
    let docs = six_docs();
    let config = EvalConfig {
        grade_count: 2,
        query_mode: QueryMode::UniqueTerms,
        ..EvalConfig::default()
    };

    let artifacts = run_evaluation(&backend, &docs, &docs, &config, Some("terms-col".into()))
        .expect("evaluation");

    let qrel = fs::read_to_string(&artifacts.qrel_path).expect("read qrel");
    let rows = parse_qrel(&qrel);
    assert_eq!(rows.len(), 12, "two term queries x six documents");
    let mut query_ids: Vec<&str> = rows.iter().map(|r| r.0.as_str()).collect();
    query_ids.dedup();
    assert_eq!(query_ids, vec!["0", "1"], "synthetic enumeration-order ids");

    fs::remove_file(&artifacts.qrel_path).ok();
    fs::remove_file(&artifacts.res_path).ok();
}

#[test]
fn partial_index_aborts_the_run() {
    let backend = ScriptedBackend {
        indexed_count_override: Some(3),
        ..ScriptedBackend::default()
    };
    let docs = six_docs();
    let orchestrator =
        RetrievalOrchestrator::new(&backend, "broken-col", EvalConfig::default());
    let err = orchestrator.index(&docs.documents).expect_err("must fail");
    assert!(err.to_string().contains("indexed 3 of 6"));
}

#[test]
fn evaluation_runs_against_a_real_index() {
    let index_root = tempfile::TempDir::new().expect("tempdir");
    let backend = mtir_text::TantivyBackend::new(index_root.path()).expect("backend");
    let docs = corpus(&[
        ("d1", &["the cat sat on the mat"]),
        ("d2", &["the cat ran away"]),
        ("d3", &["dogs bark loudly at night"]),
    ]);
    let config = EvalConfig { grade_count: 2, ..EvalConfig::default() };

    let artifacts = run_evaluation(&backend, &docs, &docs, &config, None).expect("evaluation");

    let qrel = fs::read_to_string(&artifacts.qrel_path).expect("read qrel");
    let rows = parse_qrel(&qrel);
    assert_eq!(rows.len(), 9, "three queries x three documents");
    assert!(rows.iter().all(|r| r.2 <= 1));

    let res = fs::read_to_string(&artifacts.res_path).expect("read res");
    assert!(!res.is_empty());
    for line in res.lines() {
        let fields: Vec<&str> = line.split('\t').collect();
        assert_eq!(fields.len(), 6);
        assert!(fields[4].parse::<f64>().expect("score") > 0.0);
    }
    // Each sentence query retrieves its own document first.
    let first_hit = |qid: &str| {
        res.lines()
            .find(|l| l.starts_with(&format!("{qid}\tQ0\t")) && l.contains("\t0\t"))
            .map(|l| l.split('\t').nth(2).expect("doc id").to_string())
    };
    assert_eq!(first_hit("d3_0").as_deref(), Some("d3"));

    fs::remove_file(&artifacts.qrel_path).ok();
    fs::remove_file(&artifacts.res_path).ok();
}

#[test]
fn incompatible_modes_fail_before_any_work() {
    let backend = six_doc_backend();
    let docs = six_docs();
    let config = EvalConfig {
        relevance_mode: RelevanceMode::Substring,
        query_mode: QueryMode::UniqueTerms,
        ..EvalConfig::default()
    };
    assert!(run_evaluation(&backend, &docs, &docs, &config, None).is_err());
}
