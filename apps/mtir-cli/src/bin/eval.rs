use std::env;
use std::io;
use std::path::PathBuf;

use mtir_core::config::{expand_path, Analyzer, Config, EvalConfig, QueryMode, RelevanceMode};
use mtir_core::doc_parser;
use mtir_pipeline::run_evaluation;
use mtir_pipeline::trec_eval::{OutputFormat, TrecEval};
use mtir_text::TantivyBackend;

fn usage(program: &str) -> ! {
    eprintln!("Usage: {program} <ref_file> <mt_file> [options]");
    eprintln!("  <ref_file>               reference translations (.sgm/.sgml or .tsv)");
    eprintln!("  <mt_file>                machine translations, same format");
    eprintln!("  --relevance-mode MODE    jenks | percentile | substring (default: jenks)");
    eprintln!("  --grades N               relevance grades for jenks (default: 5)");
    eprintln!("  --percentile N           cutoff for percentile mode, 0-100 (default: 25)");
    eprintln!("  --query-mode MODE        sentences | unique_terms (default: sentences)");
    eprintln!("  --depth N                results retrieved per query (default: 1000)");
    eprintln!("  --lang CODE              ISO-639-1 code selecting the stemmer");
    eprintln!("  --index-dir PATH         where search indexes are built");
    eprintln!("  --trec-eval PATH         path to the trec_eval binary");
    eprintln!("  --format FMT             tsv | json (default: tsv)");
    eprintln!("  --output FILE            write metrics to FILE instead of stdout");
    std::process::exit(1);
}

struct Args {
    ref_file: PathBuf,
    mt_file: PathBuf,
    eval_config: EvalConfig,
    index_dir: Option<PathBuf>,
    trec_eval_bin: Option<PathBuf>,
    format: OutputFormat,
    output: Option<PathBuf>,
}

fn parse_args() -> Args {
    let argv: Vec<String> = env::args().collect();
    let program = argv.first().map_or("mtir-eval", String::as_str).to_string();
    let args = &argv[1..];

    let mut positional: Vec<PathBuf> = Vec::new();
    let mut eval_config = EvalConfig::default();
    let mut index_dir = None;
    let mut trec_eval_bin = None;
    let mut format = OutputFormat::Tsv;
    let mut output = None;

    let take_value = |args: &[String], i: usize, flag: &str| -> String {
        args.get(i + 1).cloned().unwrap_or_else(|| {
            eprintln!("Error: {flag} requires a value");
            usage(&program);
        })
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--relevance-mode" => {
                eval_config.relevance_mode = match take_value(args, i, "--relevance-mode").as_str()
                {
                    "jenks" => RelevanceMode::Jenks,
                    "percentile" => RelevanceMode::Percentile,
                    "substring" => RelevanceMode::Substring,
                    other => {
                        eprintln!("Error: unknown relevance mode {other:?}");
                        usage(&program);
                    }
                };
                i += 1;
            }
            "--grades" => {
                eval_config.grade_count = parse_number(&take_value(args, i, "--grades"), &program);
                i += 1;
            }
            "--percentile" => {
                eval_config.percentile_threshold =
                    parse_number(&take_value(args, i, "--percentile"), &program);
                i += 1;
            }
            "--query-mode" => {
                eval_config.query_mode = match take_value(args, i, "--query-mode").as_str() {
                    "sentences" => QueryMode::Sentences,
                    "unique_terms" => QueryMode::UniqueTerms,
                    other => {
                        eprintln!("Error: unknown query mode {other:?}");
                        usage(&program);
                    }
                };
                i += 1;
            }
            "--depth" => {
                eval_config.result_depth = parse_number(&take_value(args, i, "--depth"), &program);
                i += 1;
            }
            "--lang" => {
                eval_config.analyzer = Analyzer::for_lang(&take_value(args, i, "--lang"));
                i += 1;
            }
            "--index-dir" => {
                index_dir = Some(expand_path(take_value(args, i, "--index-dir")));
                i += 1;
            }
            "--trec-eval" => {
                trec_eval_bin = Some(expand_path(take_value(args, i, "--trec-eval")));
                i += 1;
            }
            "--format" => {
                format = match take_value(args, i, "--format").as_str() {
                    "tsv" => OutputFormat::Tsv,
                    "json" => OutputFormat::Json,
                    other => {
                        eprintln!("Error: unknown output format {other:?}");
                        usage(&program);
                    }
                };
                i += 1;
            }
            "--output" => {
                output = Some(expand_path(take_value(args, i, "--output")));
                i += 1;
            }
            flag if flag.starts_with('-') => {
                eprintln!("Error: unknown flag {flag}");
                usage(&program);
            }
            path => positional.push(PathBuf::from(path)),
        }
        i += 1;
    }

    if positional.len() != 2 {
        usage(&program);
    }
    let mt_file = positional.pop().unwrap_or_default();
    let ref_file = positional.pop().unwrap_or_default();
    Args { ref_file, mt_file, eval_config, index_dir, trec_eval_bin, format, output }
}

fn parse_number<T: std::str::FromStr>(value: &str, program: &str) -> T {
    value.parse().unwrap_or_else(|_| {
        eprintln!("Error: expected a number, got {value:?}");
        usage(program);
    })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = parse_args();
    args.eval_config.validate()?;
    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {e}");
        e
    })?;

    let index_dir = args.index_dir.unwrap_or_else(|| {
        let dir: String = config
            .get("data.index_dir")
            .unwrap_or_else(|_| "mtir-indexes".to_string());
        expand_path(dir)
    });
    let trec_eval_bin = args.trec_eval_bin.unwrap_or_else(|| {
        let bin: String = config
            .get("trec_eval.bin")
            .unwrap_or_else(|_| "trec_eval".to_string());
        expand_path(bin)
    });
    // Fail before any indexing work when the evaluator is not installed.
    let trec_eval_bin = TrecEval::locate(&trec_eval_bin)?;

    println!("MT evaluation by cross-lingual retrieval");
    println!("========================================");
    println!("Reference file: {}", args.ref_file.display());
    println!("MT file:        {}", args.mt_file.display());
    println!("Index dir:      {}", index_dir.display());

    let reference = doc_parser::parse(&args.ref_file)?;
    reference.log_stats();
    let candidate = doc_parser::parse(&args.mt_file)?;
    candidate.log_stats();

    let backend = TantivyBackend::new(&index_dir)?;
    let artifacts = run_evaluation(&backend, &reference, &candidate, &args.eval_config, None)?;
    println!("qrel file: {}", artifacts.qrel_path.display());
    println!("res file:  {}", artifacts.res_path.display());

    let mut evaluator = TrecEval::new(trec_eval_bin, &artifacts.qrel_path, &artifacts.res_path)?;
    evaluator.print_metrics(args.format, args.output.as_deref(), &mut io::stdout())?;
    Ok(())
}
