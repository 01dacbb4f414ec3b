//! Error types for YADIL decoding and encoding.

use crate::value::TypeTag;
use std::fmt;
use thiserror::Error;

/// Result type for YADIL operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A position in the source text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    /// Zero-based byte offset.
    pub offset: usize,
    /// One-based line number.
    pub line: usize,
    /// One-based column, counted in characters.
    pub column: usize,
}

impl Location {
    /// The location of the first character of a source.
    pub const START: Location = Location {
        offset: 0,
        line: 1,
        column: 1,
    };
}

impl Default for Location {
    fn default() -> Self {
        Location::START
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The kind of failure, without position information.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorKind {
    /// A quoted string was not closed before end of input.
    #[error("Unterminated string")]
    UnterminatedString,

    /// A comment was not closed before end of input.
    #[error("Unterminated comment")]
    UnterminatedComment,

    /// A backslash escape that is not valid in a quoted string.
    #[error("Invalid escape \"\\{0}\"")]
    InvalidEscape(char),

    /// A malformed number.
    #[error("Invalid numeric literal \"{0}\"")]
    InvalidNumericLiteral(String),

    /// A Bytes element containing non-hex characters.
    #[error("Invalid hex byte \"{0}\"")]
    InvalidHexByte(String),

    /// More input was required.
    #[error("Unexpected end of input")]
    UnexpectedEndOfInput,

    /// Input bytes are not valid UTF-8.
    #[error("Invalid UTF-8")]
    InvalidUtf8,

    /// The underlying reader failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// A token that the grammar does not allow here.
    #[error("Expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },

    /// The version header names a major version this decoder does not support.
    #[error("Unsupported version {major}.{minor}")]
    UnsupportedVersion { major: u64, minor: u64 },

    /// A map body was not closed with `end` before end of input.
    #[error("Unterminated map")]
    UnterminatedMap,

    /// The literal does not agree with the declared type tag.
    #[error("Type mismatch: {declared} binding cannot hold {found}")]
    TypeMismatch { declared: TypeTag, found: String },

    /// A name occurs twice in one scope.
    #[error("Duplicate binding \"{0}\"")]
    DuplicateBinding(String),

    /// Lists and maps are nested deeper than the configured limit.
    #[error("Nesting deeper than {0} levels")]
    NestingTooDeep(usize),

    /// A numeric literal is out of range for its type.
    #[error("Integer overflow for {0}")]
    IntegerOverflow(TypeTag),

    /// The value tree cannot be written in a form that decodes back to itself.
    #[error("Cannot encode {0}")]
    Unencodable(String),
}

/// Error type for YADIL operations.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    pub kind: ErrorKind,
    pub location: Option<Location>,
    pub filename: Option<String>,
}

impl Error {
    /// Create an error without position information.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            location: None,
            filename: None,
        }
    }

    /// Create an error at a source location.
    pub fn at(kind: ErrorKind, location: Location) -> Self {
        Self {
            kind,
            location: Some(location),
            filename: None,
        }
    }

    /// Attach the name of the source for error messages.
    pub fn with_filename(mut self, filename: Option<&str>) -> Self {
        if let Some(name) = filename {
            self.filename = Some(name.to_string());
        }
        self
    }

    /// The error kind.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Format a location suffix for error messages.
    fn loc_suffix(&self) -> String {
        match (&self.location, &self.filename) {
            (Some(loc), Some(name)) => format!(" at {} of <{}>", loc, name),
            (Some(loc), None) => format!(" at {}", loc),
            (None, Some(name)) => format!(" in <{}>", name),
            (None, None) => String::new(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind, self.loc_suffix())
    }
}

impl std::error::Error for Error {}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::new(kind)
    }
}
