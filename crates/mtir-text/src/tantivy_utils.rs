use mtir_core::config::Analyzer;
use tantivy::schema::{IndexRecordOption, Schema, TextFieldIndexing, TextOptions, STORED, STRING};
use tantivy::tokenizer::{Language, LowerCaser, SimpleTokenizer, Stemmer, TextAnalyzer};
use tantivy::Index;

pub const DOC_ID_FIELD: &str = "doc_id";
pub const DOC_TEXT_FIELD: &str = "doc_text";

/// Two fields: the raw stored document id and the analyzed document text.
pub fn build_schema(analyzer: Analyzer) -> Schema {
    let mut schema_builder = Schema::builder();
    let _doc_id_field = schema_builder.add_text_field(DOC_ID_FIELD, STRING | STORED);
    let text_field_indexing = TextFieldIndexing::default()
        .set_tokenizer(analyzer.tokenizer_name())
        .set_index_option(IndexRecordOption::WithFreqsAndPositions);
    let text_options = TextOptions::default().set_indexing_options(text_field_indexing);
    let _doc_text_field = schema_builder.add_text_field(DOC_TEXT_FIELD, text_options);
    schema_builder.build()
}

/// Register every analyzer with the index. Registration is cheap and the
/// schema's tokenizer name picks the active one, so a freshly opened index
/// needs no analyzer bookkeeping of its own.
pub fn register_analyzers(index: &Index) {
    for analyzer in ALL_ANALYZERS {
        index
            .tokenizers()
            .register(analyzer.tokenizer_name(), build_analyzer(*analyzer));
    }
}

const ALL_ANALYZERS: &[Analyzer] = &[
    Analyzer::Standard,
    Analyzer::Arabic,
    Analyzer::Danish,
    Analyzer::Dutch,
    Analyzer::English,
    Analyzer::Finnish,
    Analyzer::French,
    Analyzer::German,
    Analyzer::Greek,
    Analyzer::Hungarian,
    Analyzer::Italian,
    Analyzer::Norwegian,
    Analyzer::Portuguese,
    Analyzer::Romanian,
    Analyzer::Russian,
    Analyzer::Spanish,
    Analyzer::Swedish,
    Analyzer::Tamil,
    Analyzer::Turkish,
];

fn build_analyzer(analyzer: Analyzer) -> TextAnalyzer {
    let base = TextAnalyzer::builder(SimpleTokenizer::default()).filter(LowerCaser);
    match stemmer_language(analyzer) {
        Some(language) => base.filter(Stemmer::new(language)).build(),
        None => base.build(),
    }
}

fn stemmer_language(analyzer: Analyzer) -> Option<Language> {
    match analyzer {
        Analyzer::Standard => None,
        Analyzer::Arabic => Some(Language::Arabic),
        Analyzer::Danish => Some(Language::Danish),
        Analyzer::Dutch => Some(Language::Dutch),
        Analyzer::English => Some(Language::English),
        Analyzer::Finnish => Some(Language::Finnish),
        Analyzer::French => Some(Language::French),
        Analyzer::German => Some(Language::German),
        Analyzer::Greek => Some(Language::Greek),
        Analyzer::Hungarian => Some(Language::Hungarian),
        Analyzer::Italian => Some(Language::Italian),
        Analyzer::Norwegian => Some(Language::Norwegian),
        Analyzer::Portuguese => Some(Language::Portuguese),
        Analyzer::Romanian => Some(Language::Romanian),
        Analyzer::Russian => Some(Language::Russian),
        Analyzer::Spanish => Some(Language::Spanish),
        Analyzer::Swedish => Some(Language::Swedish),
        Analyzer::Tamil => Some(Language::Tamil),
        Analyzer::Turkish => Some(Language::Turkish),
    }
}
