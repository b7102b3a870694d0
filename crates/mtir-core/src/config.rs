//! Evaluation configuration and the ambient settings loader.
//!
//! `EvalConfig` is the explicit, eagerly validated form of the run options
//! (relevance mode, grade count, query mode, result depth, analyzer).
//! `Config` merges `config.toml` + `config.<env>.toml` + `MTIR_*` env vars
//! via Figment for settings that live outside a single run (index root,
//! trec_eval binary path).

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Strategy used to turn search results into relevance judgments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelevanceMode {
    /// Jenks natural breaks over normalized scores, `grade_count` grades.
    Jenks,
    /// Single percentile cutoff over normalized scores, two grades.
    Percentile,
    /// Binary oracle: grade 1 when the query text occurs in the document.
    Substring,
}

/// How the query set is derived from the reference corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    /// One query per reference sentence (default).
    Sentences,
    /// One query per distinct term of the indexed reference collection.
    UniqueTerms,
}

/// Text analyzer applied at index and search time. `Standard` lowercases;
/// the language variants add the corresponding snowball stemmer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Analyzer {
    Standard,
    Arabic,
    Danish,
    Dutch,
    English,
    Finnish,
    French,
    German,
    Greek,
    Hungarian,
    Italian,
    Norwegian,
    Portuguese,
    Romanian,
    Russian,
    Spanish,
    Swedish,
    Tamil,
    Turkish,
}

impl Analyzer {
    /// Map an ISO-639-1 language code to an analyzer. Unknown codes fall
    /// back to `Standard`.
    pub fn for_lang(lcode: &str) -> Self {
        match lcode {
            "ar" => Self::Arabic,
            "da" => Self::Danish,
            "nl" => Self::Dutch,
            "en" => Self::English,
            "fi" => Self::Finnish,
            "fr" => Self::French,
            "de" => Self::German,
            "el" => Self::Greek,
            "hu" => Self::Hungarian,
            "it" => Self::Italian,
            "no" => Self::Norwegian,
            "pt" => Self::Portuguese,
            "ro" => Self::Romanian,
            "ru" => Self::Russian,
            "es" => Self::Spanish,
            "sv" => Self::Swedish,
            "ta" => Self::Tamil,
            "tr" => Self::Turkish,
            _ => Self::Standard,
        }
    }

    /// Name under which the analyzer is registered with the search backend.
    pub fn tokenizer_name(self) -> &'static str {
        match self {
            Self::Standard => "mtir_standard",
            Self::Arabic => "mtir_arabic",
            Self::Danish => "mtir_danish",
            Self::Dutch => "mtir_dutch",
            Self::English => "mtir_english",
            Self::Finnish => "mtir_finnish",
            Self::French => "mtir_french",
            Self::German => "mtir_german",
            Self::Greek => "mtir_greek",
            Self::Hungarian => "mtir_hungarian",
            Self::Italian => "mtir_italian",
            Self::Norwegian => "mtir_norwegian",
            Self::Portuguese => "mtir_portuguese",
            Self::Romanian => "mtir_romanian",
            Self::Russian => "mtir_russian",
            Self::Spanish => "mtir_spanish",
            Self::Swedish => "mtir_swedish",
            Self::Tamil => "mtir_tamil",
            Self::Turkish => "mtir_turkish",
        }
    }
}

/// Options for one evaluation run. Validated eagerly, before any indexing
/// or search work starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    pub relevance_mode: RelevanceMode,
    pub grade_count: usize,
    pub percentile_threshold: u32,
    pub query_mode: QueryMode,
    pub result_depth: usize,
    pub analyzer: Analyzer,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            relevance_mode: RelevanceMode::Jenks,
            grade_count: 5,
            percentile_threshold: 25,
            query_mode: QueryMode::Sentences,
            result_depth: 1000,
            analyzer: Analyzer::Standard,
        }
    }
}

impl EvalConfig {
    pub fn validate(&self) -> Result<()> {
        if self.relevance_mode == RelevanceMode::Jenks && self.grade_count < 2 {
            return Err(Error::InvalidConfig(format!(
                "grade_count must be at least 2, got {}",
                self.grade_count
            )));
        }
        if self.relevance_mode == RelevanceMode::Percentile && self.percentile_threshold > 100 {
            return Err(Error::InvalidConfig(format!(
                "percentile_threshold must be between 0 and 100, got {}",
                self.percentile_threshold
            )));
        }
        if self.relevance_mode == RelevanceMode::Substring
            && self.query_mode == QueryMode::UniqueTerms
        {
            return Err(Error::InvalidConfig(
                "query_mode unique_terms is not supported with the substring relevance mode"
                    .to_string(),
            ));
        }
        if self.result_depth == 0 {
            return Err(Error::InvalidConfig(
                "result_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("MTIR_"));

        Ok(Self { figment })
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after
/// expansion. Absolute paths are returned as-is.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() {
        p
    } else {
        base.join(p)
    }
}
