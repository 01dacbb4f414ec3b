//! Encode YADIL documents to text.
//!
//! The encoder walks the value tree and writes the canonical text form for a
//! given [`Style`]. It shares one piece of logic with the lexer: the
//! bare-value predicate, which decides which name characters must be escaped
//! so that decoding recovers the name exactly.

use crate::error::{Error, ErrorKind, Result};
use crate::lexer::{bare_ends_name, is_whitespace, value_starts};
use crate::value::{Document, Map, TypeTag, Value};
use std::collections::VecDeque;
use tracing::debug;

/// Which spelling to use for keywords.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Spelling {
    /// `uint`, `true`, `end`
    Long,
    /// `u`, `t`, `e`
    #[default]
    Short,
}

/// Output style for [`encode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    /// Type tags and the map terminator.
    pub tags: Spelling,
    /// Boolean literals.
    pub bools: Spelling,
    /// Newline after the version header and after each top-level binding.
    pub line_breaks: bool,
    /// Write NaN and infinities as `nan`, `inf`, `-inf` instead of failing.
    pub non_finite_floats: bool,
}

impl Default for Style {
    fn default() -> Self {
        Self::compact()
    }
}

impl Style {
    /// Short keywords on a single line.
    pub const fn compact() -> Self {
        Self {
            tags: Spelling::Short,
            bools: Spelling::Short,
            line_breaks: false,
            non_finite_floats: true,
        }
    }

    /// Long keywords, one top-level binding per line.
    pub const fn verbose() -> Self {
        Self {
            tags: Spelling::Long,
            bools: Spelling::Long,
            line_breaks: true,
            non_finite_floats: true,
        }
    }

    #[must_use]
    pub fn with_tags(mut self, tags: Spelling) -> Self {
        self.tags = tags;
        self
    }

    #[must_use]
    pub fn with_bools(mut self, bools: Spelling) -> Self {
        self.bools = bools;
        self
    }

    #[must_use]
    pub fn with_line_breaks(mut self, line_breaks: bool) -> Self {
        self.line_breaks = line_breaks;
        self
    }

    #[must_use]
    pub fn with_non_finite_floats(mut self, allow: bool) -> Self {
        self.non_finite_floats = allow;
        self
    }

    fn tag(&self, tag: TypeTag) -> &'static str {
        match self.tags {
            Spelling::Long => tag.long_name(),
            Spelling::Short => tag.short_name(),
        }
    }

    fn end(&self) -> &'static str {
        match self.tags {
            Spelling::Long => "end",
            Spelling::Short => "e",
        }
    }

    fn bool(&self, b: bool) -> &'static str {
        match (self.bools, b) {
            (Spelling::Long, true) => "true",
            (Spelling::Long, false) => "false",
            (Spelling::Short, true) => "t",
            (Spelling::Short, false) => "f",
        }
    }
}

/// Encode a document.
///
/// Output is deterministic for a given document and style. Documents that
/// no text could reproduce (an empty name, a list element outside the
/// inferred element types, or a non-finite float when the style forbids
/// them) fail with [`ErrorKind::Unencodable`].
pub fn encode(doc: &Document, style: &Style) -> Result<String> {
    debug!("Encoding {} bindings with {:?}", doc.len(), style);
    let mut out = format!("Y.{}.{};", doc.version.major, doc.version.minor);
    if style.line_breaks {
        out.push('\n');
    }
    for (name, value) in doc.iter() {
        encode_binding(&mut out, name, value, false, style)?;
        if style.line_breaks {
            out.push('\n');
        }
    }
    debug!("Encoded {} bytes", out.len());
    Ok(out)
}

fn unencodable(reason: &str) -> Error {
    Error::new(ErrorKind::Unencodable(reason.to_string()))
}

// =============================================================================
// Bindings and names
// =============================================================================

fn encode_binding(
    out: &mut String,
    name: &str,
    value: &Value,
    in_map: bool,
    style: &Style,
) -> Result<()> {
    let tag = value.tag();
    let scalar = encode_scalar(value, style)?;
    let assign = match (in_map, &scalar) {
        (false, _) => "=",
        (true, Some(_)) => " ",
        (true, None) => "",
    };
    let lookahead = name_lookahead(value, assign, scalar.as_deref());

    out.push_str(style.tag(tag));
    out.push('@');
    out.push_str(&encode_name(name, tag, in_map, &lookahead)?);
    out.push_str(assign);
    match scalar {
        Some(text) => out.push_str(&text),
        None => write_value(out, value, style)?,
    }
    out.push(';');
    Ok(())
}

/// The text after a name that the bare-value predicate can reach: the whole
/// literal and `;` for numbers and booleans, the opening character otherwise.
fn name_lookahead(value: &Value, assign: &str, scalar: Option<&str>) -> String {
    match scalar {
        Some(text) => format!("{}{};", assign, text),
        None => {
            let open = match value {
                Value::Str(_) => '"',
                Value::Map(_) => ':',
                _ => '[',
            };
            format!("{}{}", assign, open)
        }
    }
}

/// Escape a binding name given the text that follows it.
///
/// The name is built back to front so that the bare-value predicate can be
/// asked, at each character, exactly what the lexer will see there.
fn encode_name(name: &str, tag: TypeTag, in_map: bool, tail: &str) -> Result<String> {
    if name.is_empty() {
        return Err(unencodable("an empty binding name"));
    }
    let bare = bare_ends_name(tag, in_map);
    let chars: Vec<char> = name.chars().collect();
    let solid = |c: &char| !is_whitespace(*c);
    let first = chars.iter().position(solid).unwrap_or(chars.len());
    let last = chars.iter().rposition(solid).unwrap_or(0);

    let mut encoded: VecDeque<char> = tail.chars().collect();
    let tail_len = encoded.len();
    for (i, &c) in chars.iter().enumerate().rev() {
        encoded.push_front(c);
        let edge = is_whitespace(c) && (i < first || i > last);
        // Checked as if non-finite keywords were enabled.
        if c == '=' || c == '\\' || edge || (bare && value_starts(&mut encoded, tag, true)?) {
            encoded.push_front('\\');
        }
    }
    let len = encoded.len() - tail_len;
    Ok(encoded.into_iter().take(len).collect())
}

// =============================================================================
// Values
// =============================================================================

/// Text of a number or boolean; `None` for strings, lists, bytes and maps.
fn encode_scalar(value: &Value, style: &Style) -> Result<Option<String>> {
    Ok(Some(match value {
        Value::UInt(n) => n.to_string(),
        Value::SInt(n) => n.to_string(),
        Value::Float(f) => encode_float(*f, style)?,
        Value::Bool(b) => style.bool(*b).to_string(),
        Value::Str(_) | Value::List(_) | Value::Bytes(_) | Value::Map(_) => return Ok(None),
    }))
}

fn write_value(out: &mut String, value: &Value, style: &Style) -> Result<()> {
    match value {
        Value::Str(s) => out.push_str(&encode_string(s)),
        Value::List(items) => write_list(out, items, style)?,
        Value::Bytes(bytes) => out.push_str(&encode_bytes(bytes)),
        Value::Map(map) => write_map(out, map, style)?,
        scalar => {
            if let Some(text) = encode_scalar(scalar, style)? {
                out.push_str(&text);
            }
        }
    }
    Ok(())
}

fn encode_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 2);
    result.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            result.push('\\');
        }
        result.push(c);
    }
    result.push('"');
    result
}

fn encode_float(f: f64, style: &Style) -> Result<String> {
    if !f.is_finite() {
        if !style.non_finite_floats {
            return Err(unencodable("a non-finite float"));
        }
        return Ok(if f.is_nan() {
            "nan"
        } else if f > 0.0 {
            "inf"
        } else {
            "-inf"
        }
        .to_string());
    }
    // Debug formatting is the shortest form that reads back to the same bits
    // and always has a `.` or an exponent.
    Ok(format!("{:?}", f))
}

fn write_list(out: &mut String, items: &[Value], style: &Style) -> Result<()> {
    out.push('[');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        match item {
            // Inference reads `-0` as a sint.
            Value::SInt(0) => out.push_str("-0"),
            Value::SInt(n) if *n > 0 => return Err(unencodable("a positive sint in a list")),
            Value::Map(_) => return Err(unencodable("a map in a list")),
            Value::Bytes(_) => return Err(unencodable("bytes in a list")),
            other => write_value(out, other, style)?,
        }
    }
    out.push(']');
    Ok(())
}

fn encode_bytes(bytes: &[u8]) -> String {
    let hex: Vec<String> = bytes.iter().map(|b| format!("{:02X}", b)).collect();
    format!("[{}]", hex.join(","))
}

fn write_map(out: &mut String, map: &Map, style: &Style) -> Result<()> {
    out.push(':');
    for (name, value) in map {
        encode_binding(out, name, value, true, style)?;
    }
    out.push_str(style.end());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode;
    use crate::value::Version;

    fn doc(bindings: Vec<(&str, Value)>) -> Document {
        let mut doc = Document::new();
        for (name, value) in bindings {
            doc.insert(name, value).unwrap();
        }
        doc
    }

    fn map(bindings: Vec<(&str, Value)>) -> Value {
        Value::Map(bindings.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    #[test]
    fn test_encode_compact() {
        let d = doc(vec![
            ("s", "hi".into()),
            ("n", Value::UInt(7)),
            ("i", Value::SInt(-3)),
            ("ok", true.into()),
        ]);
        assert_eq!(
            encode(&d, &Style::compact()).unwrap(),
            "Y.1.0;s@s=\"hi\";u@n=7;i@i=-3;b@ok=t;"
        );
    }

    #[test]
    fn test_encode_verbose() {
        let d = doc(vec![("ok", false.into()), ("m", map(vec![("a", Value::UInt(1))]))]);
        assert_eq!(
            encode(&d, &Style::verbose()).unwrap(),
            "Y.1.0;\nbool@ok=false;\nmap@m=:uint@a 1;end;\n"
        );
    }

    #[test]
    fn test_encode_version() {
        let d = Document::with_version(Version::new(1, 3));
        assert_eq!(encode(&d, &Style::compact()).unwrap(), "Y.1.3;");
    }

    #[test]
    fn test_encode_map_separators() {
        let d = doc(vec![(
            "m",
            map(vec![
                ("key", "value".into()),
                ("key2", Value::UInt(42)),
                ("l", Value::List(vec![])),
                ("inner", map(vec![])),
            ]),
        )]);
        assert_eq!(
            encode(&d, &Style::compact()).unwrap(),
            "Y.1.0;m@m=:s@key\"value\";u@key2 42;l@l[];m@inner:e;e;"
        );
    }

    #[test]
    fn test_encode_string_escapes() {
        assert_eq!(encode_string("a\"b\\c\nd"), "\"a\\\"b\\\\c\nd\"");
    }

    #[test]
    fn test_encode_floats() {
        let style = Style::compact();
        assert_eq!(encode_float(1.0, &style).unwrap(), "1.0");
        assert_eq!(encode_float(-0.0, &style).unwrap(), "-0.0");
        assert_eq!(encode_float(0.1, &style).unwrap(), "0.1");
        assert_eq!(encode_float(1e100, &style).unwrap(), "1e100");
        assert_eq!(encode_float(f64::NEG_INFINITY, &style).unwrap(), "-inf");
        let strict = style.with_non_finite_floats(false);
        assert!(matches!(
            encode_float(f64::NAN, &strict).unwrap_err().kind,
            ErrorKind::Unencodable(_)
        ));
    }

    #[test]
    fn test_encode_bytes() {
        assert_eq!(encode_bytes(&[0x1A, 0x2F, 3]), "[1A,2F,03]");
        assert_eq!(encode_bytes(&[]), "[]");
    }

    #[test]
    fn test_encode_name_escapes() {
        assert_eq!(encode_name("a=b", TypeTag::Str, false, "=\"\";").unwrap(), "a\\=b");
        assert_eq!(encode_name("a\\b", TypeTag::Str, false, "=\"\";").unwrap(), "a\\\\b");
        assert_eq!(encode_name(" a b ", TypeTag::Str, false, "=\"\";").unwrap(), "\\ a b\\ ");
        // Inside a map, a quote would end a str name.
        assert_eq!(encode_name("a\"b", TypeTag::Str, true, "\"\";").unwrap(), "a\\\"b");
        // Outside a map it would not.
        assert_eq!(encode_name("a\"b", TypeTag::Str, false, "=\"\";").unwrap(), "a\"b");
        // A map's colon ends the name everywhere.
        assert_eq!(encode_name("a:b", TypeTag::Map, false, "=:e;").unwrap(), "a\\:b");
        // Digits followed by `;` would read as the value.
        assert_eq!(encode_name("x1;", TypeTag::UInt, true, " 5;").unwrap(), "x\\1;");
    }

    #[test]
    fn test_unencodable() {
        let reject = |value: Value| {
            let d = doc(vec![("x", value)]);
            matches!(
                encode(&d, &Style::compact()).unwrap_err().kind,
                ErrorKind::Unencodable(_)
            )
        };
        assert!(reject(Value::List(vec![Value::SInt(1)])));
        assert!(reject(Value::List(vec![Value::List(vec![Value::SInt(i64::MAX)])])));
        assert!(reject(Value::List(vec![map(vec![])])));
        assert!(reject(Value::List(vec![Value::Bytes(vec![1])])));

        let mut d = Document::new();
        d.bindings.insert(String::new(), Value::UInt(1));
        assert!(encode(&d, &Style::compact()).is_err());
    }

    #[test]
    fn test_sint_zero_in_list() {
        let d = doc(vec![("l", Value::List(vec![Value::SInt(0), Value::UInt(0)]))]);
        let text = encode(&d, &Style::compact()).unwrap();
        assert_eq!(text, "Y.1.0;l@l=[-0,0];");
        assert_eq!(decode(&text).unwrap(), d);
    }

    #[test]
    fn test_name_lookahead_is_bounded() {
        let long = "x".repeat(10_000);
        let nested = map(vec![("s", long.as_str().into())]);
        assert_eq!(name_lookahead(&nested, "", None), ":");
        assert_eq!(name_lookahead(&long.as_str().into(), "=", None), "=\"");
        assert_eq!(name_lookahead(&Value::Bytes(vec![0; 64]), "", None), "[");
        let n = Value::UInt(42);
        let text = encode_scalar(&n, &Style::compact()).unwrap();
        assert_eq!(name_lookahead(&n, " ", text.as_deref()), " 42;");
    }

    #[test]
    fn test_deeply_nested_maps_round_trip() {
        let mut value = Value::Str("y".repeat(1_000));
        for i in 0..100 {
            value = map(vec![(format!("level {}", i).as_str(), value), ("n", Value::UInt(i))]);
        }
        let d = doc(vec![("root", value)]);
        for style in [Style::compact(), Style::verbose()] {
            let text = encode(&d, &style).unwrap();
            assert_eq!(decode(&text).unwrap(), d);
        }
    }

    #[test]
    fn test_awkward_names_round_trip() {
        let names = [
            "Hello, world!\"\"''",
            "=",
            "\\",
            " ",
            "tab\tinside",
            "1;",
            "t;",
            "#not a comment#",
            "[x]",
            ":colon:",
            "-2 ;",
            "inf;",
        ];
        for name in names {
            let inner = map(vec![
                (name, Value::UInt(1)),
                ("s", "v".into()),
            ]);
            let mut d = Document::new();
            d.insert(name, inner.clone()).unwrap();
            d.insert(format!("{}!", name), Value::Float(2.5)).unwrap();
            d.insert(format!("b{}", name), map(vec![(name, true.into()), ("f", Value::Float(1.0))]))
                .unwrap();
            for style in [Style::compact(), Style::verbose()] {
                let text = encode(&d, &style).unwrap();
                assert_eq!(decode(&text).unwrap(), d, "{:?} via {}", name, text);
            }
        }
    }
}
