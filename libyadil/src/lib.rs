//! YADIL decoder and encoder.
//!
//! YADIL is a compact, whitespace-insensitive text format for typed data.
//! Every binding declares its type up front (`uint@port=8080;`), and the
//! declared type is what tells the decoder where a name ends, so maps can be
//! written without any separator between name and value:
//!
//! ```text
//! Y.1.0;
//! map@server:str@host"localhost";uint@port 8080;bool@tls f;end;
//! ```
//!
//! # Decoding Pipeline
//!
//! The decoder operates in three phases, each pulling from the previous one:
//!
//! 1. **Scanner**: Reads characters from a string or any `Read`, decoding
//!    UTF-8 and tracking line and column.
//!
//! 2. **Lexer**: Produces tokens on demand. The parser says what it expects
//!    next, which is how type-directed name termination works.
//!
//! 3. **Parser**: Recursive descent that checks each literal against its
//!    declared type and builds the [`Document`].
//!
//! [`encode`] writes a document back out in a chosen [`Style`]; decoding the
//! result gives back an equal document.

mod encode;
mod error;
mod lexer;
mod options;
mod parser;
mod scanner;
mod value;

pub use encode::{encode, Spelling, Style};
pub use error::{Error, ErrorKind, Location, Result};
pub use options::{DecodeOptions, DEFAULT_MAX_DEPTH};
pub use value::{Binding, Document, Map, TypeTag, Value, Version};

use scanner::{ReaderSource, StrSource};
use std::io::Read;
use tracing::debug;

/// Decode a YADIL document from a string.
///
/// # Example
///
/// ```
/// use libyadil::{decode, Value};
///
/// let doc = decode("map@m:str@key\"value\";uint@key2 42;end;").unwrap();
/// let m = doc.get("m").and_then(Value::as_map).unwrap();
/// assert_eq!(m.get("key2"), Some(&Value::UInt(42)));
/// ```
pub fn decode(input: &str) -> Result<Document> {
    decode_with_options(input, &DecodeOptions::default())
}

/// Decode a YADIL document from a string with a filename for error messages.
pub fn decode_with_filename(input: &str, filename: Option<&str>) -> Result<Document> {
    let mut options = DecodeOptions::default();
    options.filename = filename.map(str::to_string);
    decode_with_options(input, &options)
}

/// Decode a YADIL document from a string under the given options.
pub fn decode_with_options(input: &str, options: &DecodeOptions) -> Result<Document> {
    debug!("Decoding {} bytes from {:?}", input.len(), options.filename);
    parser::parse_document(StrSource::new(input), options)
        .map_err(|e| e.with_filename(options.filename.as_deref()))
}

/// Decode a YADIL document from raw bytes, which must be UTF-8.
pub fn decode_bytes(input: &[u8], options: &DecodeOptions) -> Result<Document> {
    match std::str::from_utf8(input) {
        Ok(text) => decode_with_options(text, options),
        Err(e) => {
            let prefix = std::str::from_utf8(&input[..e.valid_up_to()]).unwrap_or_default();
            Err(Error::at(ErrorKind::InvalidUtf8, location_after(prefix))
                .with_filename(options.filename.as_deref()))
        }
    }
}

/// Decode a YADIL document from a reader, decoding UTF-8 incrementally.
///
/// The input is never held in memory as a whole; only the lookahead the
/// lexer asks for is buffered.
pub fn decode_reader<R: Read>(reader: R, options: &DecodeOptions) -> Result<Document> {
    debug!("Decoding stream from {:?}", options.filename);
    parser::parse_document(ReaderSource::new(reader), options)
        .map_err(|e| e.with_filename(options.filename.as_deref()))
}

/// Location of the character following `text`.
fn location_after(text: &str) -> Location {
    let mut loc = Location::START;
    for c in text.chars() {
        loc.offset += c.len_utf8();
        if c == '\n' {
            loc.line += 1;
            loc.column = 1;
        } else {
            loc.column += 1;
        }
    }
    loc
}
