//! mtir-pipeline
//!
//! The evaluation pipeline: two-phase index/search orchestration, qrel and
//! res file writers, and the trec_eval subprocess adapter.

pub mod orchestrator;
pub mod qrel;
pub mod res;
pub mod run;
pub mod trec_eval;

pub use orchestrator::RetrievalOrchestrator;
pub use run::{run_evaluation, EvalArtifacts};
pub use trec_eval::TrecEval;
