//! Document indexing module.
//!
//! Turns a directory tree into index-model entries. Key pieces:
//!
//! - File system walking with pattern matching
//! - Extension-based text extraction (plain text, XML, HTML, PDF)
//! - Tokenization with optional Snowball stemming
//! - The concurrent pipeline that ties them together and batches
//!   results to the persistence gateway

pub mod decoder;
pub mod pipeline;
pub mod tokenizer;
pub mod walker;

pub use decoder::{Decoder, DecoderRegistry, DocumentFormat};
pub use pipeline::{BatchBuffer, CancellationToken, IndexingPipeline};
pub use tokenizer::{tokenize_chars, tokenize_str, TermNormalizer, Tokenizer};
pub use walker::FileWalker;
