//! Adapter around the external `trec_eval` binary
//! (<https://github.com/usnistgov/trec_eval>).

use std::collections::BTreeMap;
use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use tracing::info;

use mtir_core::error::Error;

/// Retrieval-depth cutoff passed to trec_eval (`-M`).
const RETRIEVAL_DEPTH: &str = "-M1000";
/// Number of leading summary lines (runid, num_q, num_ret, num_rel,
/// num_rel_ret) skipped when parsing the metric table.
const HEADER_LINES: usize = 5;
/// Trailing lines (final metric echo + empty line) skipped likewise.
const TRAILER_LINES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Tsv,
    Json,
}

/// Invokes trec_eval over a qrel/res pair and caches the parsed metric
/// table for the lifetime of the adapter.
pub struct TrecEval {
    bin: PathBuf,
    qrel: PathBuf,
    res: PathBuf,
    metrics: Option<BTreeMap<String, f64>>,
}

impl TrecEval {
    /// Resolve the evaluator binary: a bare command name is searched on
    /// PATH the way `Command::new` would run it, anything with a path
    /// component is checked as-is. Fails when nothing resolves, since the
    /// evaluator is an installation precondition, not something this
    /// system provides. Callers run this before any indexing work so a
    /// missing evaluator aborts the run up front.
    pub fn locate(bin: impl AsRef<Path>) -> Result<PathBuf> {
        let bin = bin.as_ref();
        if bin.components().count() > 1 {
            if bin.exists() {
                return Ok(bin.to_path_buf());
            }
        } else if let Some(paths) = env::var_os("PATH") {
            for dir in env::split_paths(&paths) {
                let candidate = dir.join(bin);
                if candidate.is_file() {
                    return Ok(candidate);
                }
            }
        }
        Err(Error::EvaluatorUnavailable(format!(
            "trec_eval binary not found: {}",
            bin.display()
        ))
        .into())
    }

    pub fn new(bin: impl AsRef<Path>, qrel: impl Into<PathBuf>, res: impl Into<PathBuf>) -> Result<Self> {
        let bin = Self::locate(bin)?;
        Ok(Self { bin, qrel: qrel.into(), res: res.into(), metrics: None })
    }

    /// The full standard metric table, name to value. The subprocess runs
    /// at most once per adapter instance.
    pub fn metrics(&mut self) -> Result<&BTreeMap<String, f64>> {
        if self.metrics.is_none() {
            self.metrics = Some(self.invoke()?);
        }
        Ok(self.metrics.as_ref().expect("metrics just populated"))
    }

    fn invoke(&self) -> Result<BTreeMap<String, f64>> {
        info!(bin = %self.bin.display(), "invoking trec_eval");
        let output = Command::new(&self.bin)
            .arg("-m")
            .arg("all_trec")
            .arg(RETRIEVAL_DEPTH)
            .arg(&self.qrel)
            .arg(&self.res)
            .output()
            .with_context(|| format!("failed to run {}", self.bin.display()))?;
        if !output.status.success() {
            anyhow::bail!(
                "trec_eval exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr)
            );
        }
        let stdout = String::from_utf8(output.stdout).context("trec_eval output was not UTF-8")?;
        parse_metric_table(&stdout)
    }

    /// Serialize the metric table, TSV (`name<TAB>value` lines) or JSON.
    pub fn render(&mut self, format: OutputFormat) -> Result<String> {
        let metrics = self.metrics()?;
        match format {
            OutputFormat::Json => Ok(serde_json::to_string(metrics)?),
            OutputFormat::Tsv => Ok(metrics
                .iter()
                .map(|(name, value)| format!("{name}\t{value}"))
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    /// Write the rendered table to a file, or to the given writer (stdout
    /// in the CLI) when no path is supplied.
    pub fn print_metrics<W: Write>(
        &mut self,
        format: OutputFormat,
        output_file: Option<&Path>,
        fallback: &mut W,
    ) -> Result<()> {
        let rendered = self.render(format)?;
        match output_file {
            Some(path) => {
                std::fs::write(path, rendered + "\n")
                    .with_context(|| format!("failed to write {}", path.display()))?;
                info!(path = %path.display(), "evaluation results written");
            }
            None => writeln!(fallback, "{rendered}")?,
        }
        Ok(())
    }
}

/// Parse trec_eval's tab-delimited output, skipping the fixed-size header
/// and trailer, into an ordered name -> value map.
fn parse_metric_table(stdout: &str) -> Result<BTreeMap<String, f64>> {
    let lines: Vec<&str> = stdout.split('\n').collect();
    let end = lines.len().saturating_sub(TRAILER_LINES);
    let mut metrics = BTreeMap::new();
    for line in lines.iter().take(end).skip(HEADER_LINES) {
        let mut fields = line.split('\t');
        let (name, _scope, value) = (fields.next(), fields.next(), fields.next());
        let (Some(name), Some(value)) = (name, value) else {
            anyhow::bail!("malformed trec_eval output line: {line:?}");
        };
        let value: f64 = value
            .trim()
            .parse()
            .with_context(|| format!("non-numeric metric value in line {line:?}"))?;
        metrics.insert(name.trim().to_string(), value);
    }
    Ok(metrics)
}
