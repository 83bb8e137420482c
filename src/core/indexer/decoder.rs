//! Text extraction by file extension.
//!
//! Each supported format implements [`Decoder`]; the
//! [`DecoderRegistry`] maps extensions onto the closed set of
//! formats. Decoders are pure: they read the file and return its
//! characters, or a [`QuarryError::DecodeError`].

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::core::error::{QuarryError, Result};

/// Extracts the text of one file
pub trait Decoder: Send + Sync {
    /// Read `path` and return its text as characters
    fn decode(&self, path: &Path) -> Result<Vec<char>>;
}

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    PlainText,
    Xml,
    Html,
    Pdf,
}

impl DocumentFormat {
    /// Pick a format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "txt" | "md" => Some(Self::PlainText),
            "xml" | "xhtml" => Some(Self::Xml),
            "html" | "htm" => Some(Self::Html),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    /// Pick a format for a path
    pub fn for_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

impl Decoder for DocumentFormat {
    fn decode(&self, path: &Path) -> Result<Vec<char>> {
        match self {
            Self::PlainText => PlainTextDecoder.decode(path),
            Self::Xml => MarkupDecoder::xml().decode(path),
            Self::Html => MarkupDecoder::html().decode(path),
            Self::Pdf => PdfDecoder.decode(path),
        }
    }
}

/// Extension-based decoder dispatch
#[derive(Debug, Clone, Default)]
pub struct DecoderRegistry;

impl DecoderRegistry {
    /// Create a registry for all supported formats
    pub fn new() -> Self {
        Self
    }

    /// Decoder responsible for `path`, if any
    pub fn get_for_file(&self, path: &Path) -> Option<DocumentFormat> {
        DocumentFormat::for_path(path)
    }

    /// Whether some decoder handles `path`
    pub fn supports(&self, path: &Path) -> bool {
        self.get_for_file(path).is_some()
    }
}

/// UTF-8 text; invalid sequences become U+FFFD
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextDecoder;

impl Decoder for PlainTextDecoder {
    fn decode(&self, path: &Path) -> Result<Vec<char>> {
        let bytes =
            fs::read(path).map_err(|e| QuarryError::decode(path, format!("read failed: {e}")))?;
        Ok(String::from_utf8_lossy(&bytes).chars().collect())
    }
}

/// Character data of XML or HTML documents
#[derive(Debug, Clone, Copy)]
pub struct MarkupDecoder {
    /// Tolerate unbalanced tags and unknown entities
    lenient: bool,
}

impl MarkupDecoder {
    /// Strict XML
    pub fn xml() -> Self {
        Self { lenient: false }
    }

    /// HTML, which is rarely well-formed XML
    pub fn html() -> Self {
        Self { lenient: true }
    }

    /// Extract text nodes from markup held in memory
    pub fn extract(&self, markup: &str) -> std::result::Result<String, String> {
        let mut reader = Reader::from_str(markup);
        reader.trim_text(true);
        reader.check_end_names(!self.lenient);

        let mut out = String::with_capacity(markup.len() / 2);
        // Depth inside <script>/<style>, whose content is not prose
        let mut skip_depth = 0usize;

        loop {
            match reader.read_event() {
                Ok(Event::Start(tag)) => {
                    if self.lenient && is_non_prose(tag.name().as_ref()) {
                        skip_depth += 1;
                    }
                }
                Ok(Event::End(tag)) => {
                    if self.lenient && is_non_prose(tag.name().as_ref()) {
                        skip_depth = skip_depth.saturating_sub(1);
                    }
                }
                Ok(Event::Text(text)) => {
                    if skip_depth > 0 {
                        continue;
                    }
                    let content = match text.unescape() {
                        Ok(content) => content,
                        Err(_) if self.lenient => {
                            Cow::Owned(String::from_utf8_lossy(&text).into_owned())
                        }
                        Err(e) => return Err(e.to_string()),
                    };
                    push_separated(&mut out, &content);
                }
                Ok(Event::CData(data)) => {
                    if skip_depth == 0 {
                        push_separated(&mut out, &String::from_utf8_lossy(&data));
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(format!("at byte {}: {e}", reader.buffer_position())),
            }
        }

        Ok(out)
    }
}

impl Decoder for MarkupDecoder {
    fn decode(&self, path: &Path) -> Result<Vec<char>> {
        let bytes =
            fs::read(path).map_err(|e| QuarryError::decode(path, format!("read failed: {e}")))?;
        let markup = String::from_utf8_lossy(&bytes);
        let text = self
            .extract(&markup)
            .map_err(|e| QuarryError::decode(path, e))?;
        Ok(text.chars().collect())
    }
}

fn is_non_prose(name: &[u8]) -> bool {
    name.eq_ignore_ascii_case(b"script") || name.eq_ignore_ascii_case(b"style")
}

/// Append a text node, keeping adjacent nodes from gluing together
fn push_separated(out: &mut String, text: &str) {
    if text.trim().is_empty() {
        return;
    }
    if !out.is_empty() {
        out.push(' ');
    }
    out.push_str(text);
}

/// PDF text via pdf-extract
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfDecoder;

impl Decoder for PdfDecoder {
    fn decode(&self, path: &Path) -> Result<Vec<char>> {
        let bytes =
            fs::read(path).map_err(|e| QuarryError::decode(path, format!("read failed: {e}")))?;
        // pdf-extract panics on some malformed files
        let extracted = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(&bytes))
            .map_err(|_| QuarryError::decode(path, "PDF extraction panicked"))?;
        let text = extracted
            .map_err(|e| QuarryError::decode(path, format!("PDF extraction failed: {e}")))?;
        Ok(text.chars().collect())
    }
}
