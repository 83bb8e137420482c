//! Lexer turning a character stream into normalized terms.
//!
//! Rules, applied after skipping whitespace:
//!
//! - a run of decimal digits (Unicode Nd) is one numeric token,
//!   emitted verbatim
//! - a run starting with a letter (Unicode L*), continuing over letters
//!   and decimal digits, is lowercased and stemmed
//! - any other character is a token on its own
//!
//! Stemming uses the Snowball stemmers bundled with tantivy. An
//! unknown language name degrades to lowercasing only; tokenizing
//! never fails.

use tantivy::tokenizer::{Language, RawTokenizer, Stemmer, TextAnalyzer, TokenStream};
use unicode_general_category::{get_general_category, GeneralCategory};

/// Stemmer for the configured language
///
/// Cheap to clone; each worker keeps its own copy because tantivy
/// analyzers need `&mut` access to produce a token stream.
#[derive(Clone)]
pub struct TermNormalizer {
    language: Option<Language>,
    analyzer: Option<TextAnalyzer>,
}

impl std::fmt::Debug for TermNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TermNormalizer")
            .field("language", &self.language)
            .finish()
    }
}

impl TermNormalizer {
    /// Create a normalizer for a language name such as "english"
    ///
    /// Unsupported names fall back to lowercasing only.
    pub fn new(language: &str) -> Self {
        let resolved = parse_language(language);
        if resolved.is_none() {
            tracing::warn!(
                "No stemmer for language '{}', terms will only be lowercased",
                language
            );
        }
        Self::with_language(resolved)
    }

    /// Create a normalizer that only lowercases
    pub fn unstemmed() -> Self {
        Self::with_language(None)
    }

    fn with_language(language: Option<Language>) -> Self {
        let analyzer = language.map(|lang| {
            TextAnalyzer::builder(RawTokenizer::default())
                .filter(Stemmer::new(lang))
                .build()
        });
        Self { language, analyzer }
    }

    /// Whether a stemmer is active
    pub fn is_stemming(&self) -> bool {
        self.analyzer.is_some()
    }

    /// Reduce an already lowercased word to its root
    pub fn stem(&mut self, word: String) -> String {
        let Some(analyzer) = self.analyzer.as_mut() else {
            return word;
        };
        let mut stream = analyzer.token_stream(&word);
        let stemmed = if stream.advance() {
            Some(stream.token().text.clone())
        } else {
            None
        };
        drop(stream);

        match stemmed {
            Some(root) if !root.is_empty() => root,
            _ => word,
        }
    }
}

impl Default for TermNormalizer {
    fn default() -> Self {
        Self::with_language(Some(Language::English))
    }
}

/// Resolve a language name, case-insensitively
pub fn parse_language(name: &str) -> Option<Language> {
    let language = match name.trim().to_lowercase().as_str() {
        "arabic" => Language::Arabic,
        "danish" => Language::Danish,
        "dutch" => Language::Dutch,
        "english" => Language::English,
        "finnish" => Language::Finnish,
        "french" => Language::French,
        "german" => Language::German,
        "greek" => Language::Greek,
        "hungarian" => Language::Hungarian,
        "italian" => Language::Italian,
        "norwegian" => Language::Norwegian,
        "portuguese" => Language::Portuguese,
        "romanian" => Language::Romanian,
        "russian" => Language::Russian,
        "spanish" => Language::Spanish,
        "swedish" => Language::Swedish,
        "tamil" => Language::Tamil,
        "turkish" => Language::Turkish,
        _ => return None,
    };
    Some(language)
}

/// Single-pass lazy tokenizer over a slice of characters
pub struct Tokenizer<'a> {
    data: &'a [char],
    normalizer: TermNormalizer,
}

impl<'a> Tokenizer<'a> {
    /// Tokenize `data` with the given normalizer
    pub fn new(data: &'a [char], normalizer: TermNormalizer) -> Self {
        Self { data, normalizer }
    }

    fn skip_whitespace(&mut self) {
        let n = self.data.iter().take_while(|c| c.is_whitespace()).count();
        self.data = &self.data[n..];
    }

    /// Split off the longest prefix whose characters satisfy `keep`
    fn take_while(&mut self, keep: impl Fn(char) -> bool) -> &'a [char] {
        let n = self.data.iter().take_while(|c| keep(**c)).count();
        let (token, rest) = self.data.split_at(n);
        self.data = rest;
        token
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.skip_whitespace();
        let first = *self.data.first()?;

        if is_decimal_digit(first) {
            let digits = self.take_while(is_decimal_digit);
            return Some(digits.iter().collect());
        }

        if is_letter(first) {
            let word = self.take_while(|c| is_letter(c) || is_decimal_digit(c));
            let lowered = word.iter().collect::<String>().to_lowercase();
            return Some(self.normalizer.stem(lowered));
        }

        self.data = &self.data[1..];
        Some(first.to_string())
    }
}

/// Unicode decimal digit (category Nd); superscripts, fractions and
/// Roman numerals are not digits
fn is_decimal_digit(c: char) -> bool {
    get_general_category(c) == GeneralCategory::DecimalNumber
}

/// Unicode letter (categories Lu, Ll, Lt, Lm, Lo)
fn is_letter(c: char) -> bool {
    matches!(
        get_general_category(c),
        GeneralCategory::UppercaseLetter
            | GeneralCategory::LowercaseLetter
            | GeneralCategory::TitlecaseLetter
            | GeneralCategory::ModifierLetter
            | GeneralCategory::OtherLetter
    )
}

/// Tokenize a whole character slice into a term list
pub fn tokenize_chars(data: &[char], normalizer: &TermNormalizer) -> Vec<String> {
    Tokenizer::new(data, normalizer.clone()).collect()
}

/// Tokenize a string (query text)
pub fn tokenize_str(text: &str, normalizer: &TermNormalizer) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    tokenize_chars(&chars, normalizer)
}
