//! # Parse Error Taxonomy
//!
//! Statement-level errors produced while scanning a region document.
//! Every error is tied to the 1-based line it came from and carries the
//! original statement text, so callers can present failures however they
//! like without re-parsing.

use std::fmt;

use thiserror::Error;

/// Classification of a statement-level parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A bare leading token that is not a known coordinate system.
    InvalidCoord,
    /// An unrecognized shape keyword.
    InvalidType,
    /// Arity or unit mismatch, or a malformed numeric/sexagesimal token.
    InvalidParam,
    /// A malformed property assignment on a region statement.
    InvalidProp,
    /// A malformed property assignment on the `global` header line.
    /// The only fatal kind: it aborts the rest of the document.
    InvalidGlobalProp,
    /// A recognized shape keyword this parser does not support.
    NotImplemented,
}

impl ParseErrorKind {
    fn describe(self) -> &'static str {
        match self {
            ParseErrorKind::InvalidCoord => "region coordinate system undefined",
            ParseErrorKind::InvalidType => "region type undefined",
            ParseErrorKind::InvalidParam => "invalid region parameters",
            ParseErrorKind::InvalidProp => "invalid region properties",
            ParseErrorKind::InvalidGlobalProp => "invalid global properties",
            ParseErrorKind::NotImplemented => "region type not implemented",
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// A failed statement, kept as data in the outcome list next to the
/// statements that did parse.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("[{kind}] line {line}: {message}: `{raw}`")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    /// 1-based line number of the offending statement.
    pub line: usize,
    /// The statement text as it appeared in the input.
    pub raw: String,
}

impl ParseError {
    pub fn new(
        kind: ParseErrorKind,
        message: impl Into<String>,
        line: usize,
        raw: &str,
    ) -> Self {
        ParseError {
            kind,
            message: message.into(),
            line,
            raw: raw.trim().to_string(),
        }
    }

    /// Fatal errors halt the document scan; everything else is recorded
    /// and the scan moves on to the next statement.
    pub fn is_fatal(&self) -> bool {
        self.kind == ParseErrorKind::InvalidGlobalProp
    }
}
