//! Structured error types for the pagination engine.
//!
//! Only the edges of the crate can fail: parsing input documents or
//! configuration, reading/writing files, and applying a transaction whose
//! steps don't address the current tree. The reflow loop itself never
//! returns an error; it degrades and tries again on the next pass.

use thiserror::Error;

use crate::model::BlockPos;

/// The unified error type returned by the public entry points.
#[derive(Debug, Error)]
pub enum Error {
    /// JSON input failed to parse as a valid document.
    #[error("Failed to parse document: {}{}", .source, format_hint(.hint))]
    Parse {
        source: serde_json::Error,
        hint: String,
    },

    /// JSON input failed to parse as a layout configuration.
    #[error("Failed to parse layout config: {}{}", .source, format_hint(.hint))]
    Config {
        source: serde_json::Error,
        hint: String,
    },

    /// Reading or writing a file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A transaction could not be applied to the document.
    #[error(transparent)]
    Transform(#[from] TransformError),
}

fn format_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl Error {
    /// A layout configuration that didn't parse.
    pub fn config(e: serde_json::Error) -> Self {
        let hint = parse_hint(
            &e,
            "The JSON is valid but doesn't match the layout config schema. Check field names (camelCase) and value types.",
        );
        Error::Config { source: e, hint }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        let hint = parse_hint(
            &e,
            "The JSON is valid but doesn't match the document schema. Expected `pages` (or legacy `blocks`) with typed blocks.",
        );
        Error::Parse { source: e, hint }
    }
}

fn parse_hint(e: &serde_json::Error, schema: &str) -> String {
    match e.classify() {
        serde_json::error::Category::Syntax => {
            "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
        }
        serde_json::error::Category::Data => schema.to_string(),
        serde_json::error::Category::Eof => "Unexpected end of input. Is the JSON truncated?".to_string(),
        serde_json::error::Category::Io => String::new(),
    }
}

/// A step of a transaction that doesn't fit the tree it was applied to.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    #[error("page {page} out of range (document has {count} pages)")]
    PageOutOfRange { page: usize, count: usize },

    #[error("block range {start}..{end} out of range on page {page} ({count} blocks)")]
    BlockRangeOutOfRange {
        page: usize,
        start: usize,
        end: usize,
        count: usize,
    },

    #[error("cannot split {kind} at {pos:?} (offset {offset})")]
    InvalidSplit {
        pos: BlockPos,
        offset: usize,
        kind: &'static str,
    },

    #[error("attribute {attr} does not apply to {kind} at {pos:?}")]
    AttrMismatch {
        pos: BlockPos,
        attr: &'static str,
        kind: &'static str,
    },

    #[error("transaction would leave the document without pages")]
    NoPagesLeft,
}
