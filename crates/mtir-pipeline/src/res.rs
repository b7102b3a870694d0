//! Ranked-results (res) file writer.
//!
//! TREC res format, one line per hit:
//! `query_id<TAB>Q0<TAB>doc_id<TAB>rank<TAB>score<TAB>STANDARD`, score with
//! five decimal places. The rank resets to 0 whenever the query id differs
//! from the previous line's, so hits must arrive grouped contiguously per
//! query; the orchestrator guarantees that ordering.

use std::io::Write;

use anyhow::Result;

use mtir_core::types::Hit;

pub fn write_res<W: Write>(hits: &[Hit], out: &mut W) -> Result<()> {
    let mut current_query_id = "";
    let mut rank = 0usize;
    for hit in hits {
        if hit.query_id != current_query_id {
            current_query_id = &hit.query_id;
            rank = 0;
        }
        writeln!(
            out,
            "{}\tQ0\t{}\t{}\t{:.5}\tSTANDARD",
            hit.query_id, hit.doc_id, rank, hit.score
        )?;
        rank += 1;
    }
    Ok(())
}
