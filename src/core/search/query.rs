//! Query preparation.
//!
//! Queries are free text: they go through the same tokenizer as
//! documents, so there is no syntax to get wrong. The only guard is a
//! length cap. Overlong queries are cut at a character boundary
//! instead of being rejected, so every query yields a ranked list.

use std::borrow::Cow;

use crate::core::indexer::tokenizer::{tokenize_str, TermNormalizer};

/// Cut `query` to at most `max_chars` characters
///
/// # Examples
///
/// ```
/// use quarry::core::search::truncate_query;
///
/// assert_eq!(truncate_query("short", 10), "short");
/// assert_eq!(truncate_query("héllo wörld", 5), "héllo");
/// ```
pub fn truncate_query(query: &str, max_chars: usize) -> Cow<'_, str> {
    match query.char_indices().nth(max_chars) {
        Some((cut, _)) => {
            tracing::warn!(
                "Query longer than {} characters, truncating",
                max_chars
            );
            Cow::Owned(query[..cut].to_string())
        }
        None => Cow::Borrowed(query),
    }
}

/// Truncate and tokenize a query
///
/// Duplicate terms are kept; each occurrence contributes to the score.
pub fn query_terms(query: &str, max_chars: usize, normalizer: &TermNormalizer) -> Vec<String> {
    tokenize_str(&truncate_query(query, max_chars), normalizer)
}
