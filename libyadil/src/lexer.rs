//! Phase 2: Lexer
//!
//! The lexer turns scanned characters into tokens on demand. It never
//! buffers the token stream; the parser pulls one token at a time and tells
//! the lexer what it expects next:
//! - `next_statement`: a type tag, `end`, the version header, or end of input
//! - `next_value`: a literal or punctuation
//! - `next_hex`: an element of a Bytes literal
//! - `scan_name`: a binding name, terminated according to the declared type
//!
//! Whitespace and `#...#` comments are skipped between tokens.

use crate::error::{Error, ErrorKind, Location, Result};
use crate::scanner::{Lookahead, Scanner, Source};
use crate::value::TypeTag;
use num_bigint::BigInt;
use tracing::trace;

/// A lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `Y.major.minor`
    Version { major: u64, minor: u64 },
    /// `str`, `s`, `uint`, `u`, ...
    TypeTag(TypeTag),
    /// `@`
    At,
    /// Binding name with escapes resolved.
    Name(String),
    /// `=`
    Assign,
    /// `:`
    Colon,
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// Quoted string with escapes resolved.
    String(String),
    /// `-?[0-9]+`. `negative` records the `-`, which `value` loses for `-0`.
    Integer { value: BigInt, negative: bool },
    /// Number with a fraction or exponent, or a non-finite keyword.
    Float(f64),
    /// One or two hex digits inside a Bytes literal.
    HexByte(u8),
    /// `true`, `false`, `t`, `f`
    Bool(bool),
    /// `end` or `e`
    End,
    /// End of input, or a NUL character at statement level.
    Eof,
    /// Text that starts no token.
    Unknown(String),
}

impl Token {
    /// Human-readable description for diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Token::Version { .. } => "version header".to_string(),
            Token::TypeTag(tag) => format!("type tag \"{}\"", tag),
            Token::At => "\"@\"".to_string(),
            Token::Name(name) => format!("name {:?}", name),
            Token::Assign => "\"=\"".to_string(),
            Token::Colon => "\":\"".to_string(),
            Token::Semicolon => "\";\"".to_string(),
            Token::Comma => "\",\"".to_string(),
            Token::LBracket => "\"[\"".to_string(),
            Token::RBracket => "\"]\"".to_string(),
            Token::HexByte(_) => "hex byte".to_string(),
            Token::End => "\"end\"".to_string(),
            Token::Eof => "end of input".to_string(),
            Token::Unknown(text) => format!("{:?}", text),
            _ => self.value_kind().unwrap_or("value").to_string(),
        }
    }

    /// The kind of value this token starts, if it starts one.
    pub fn value_kind(&self) -> Option<&'static str> {
        match self {
            Token::String(_) => Some("string"),
            Token::Integer { negative: true, .. } => Some("negative integer"),
            Token::Integer { .. } => Some("integer"),
            Token::Float(_) => Some("float"),
            Token::Bool(_) => Some("boolean"),
            Token::LBracket => Some("list"),
            Token::Colon => Some("map"),
            _ => None,
        }
    }
}

/// A token with the location of its first character.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub location: Location,
}

/// How a binding name was terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignForm {
    /// `name=value`
    Explicit,
    /// `name value`, only inside map bodies.
    Bare,
}

#[inline]
pub(crate) fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// Characters that continue a malformed number.
#[inline]
fn is_number_tail(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '.' || c == '_'
}

fn punctuation(c: char) -> Option<Token> {
    match c {
        '@' => Some(Token::At),
        '=' => Some(Token::Assign),
        ':' => Some(Token::Colon),
        ';' => Some(Token::Semicolon),
        ',' => Some(Token::Comma),
        '[' => Some(Token::LBracket),
        ']' => Some(Token::RBracket),
        _ => None,
    }
}

/// Pull-based lexer over a scanner.
pub struct Lexer<S: Source> {
    scanner: Scanner<S>,
    /// Whether `nan`, `inf` and `-inf` are float literals.
    non_finite_floats: bool,
}

impl<S: Source> Lexer<S> {
    pub fn new(scanner: Scanner<S>, non_finite_floats: bool) -> Self {
        Self {
            scanner,
            non_finite_floats,
        }
    }

    /// Location of the next unconsumed character.
    pub fn location(&self) -> Location {
        self.scanner.location()
    }

    /// Get the next token where a binding, `end`, or the version header may start.
    pub fn next_statement(&mut self) -> Result<Spanned> {
        self.skip_trivia()?;
        let loc = self.location();
        let token = match self.scanner.peek(0)? {
            None | Some('\0') => Token::Eof,
            Some('Y') if self.scanner.peek(1)? == Some('.') => self.lex_version()?,
            Some(c) if c.is_ascii_alphabetic() => {
                let word = self.read_while(|c| c.is_ascii_alphabetic())?;
                match word.as_str() {
                    "end" | "e" => Token::End,
                    _ => match TypeTag::from_keyword(&word) {
                        Some(tag) => Token::TypeTag(tag),
                        None => Token::Unknown(word),
                    },
                }
            }
            Some(c) => self.lex_punctuation(c)?,
        };
        Ok(self.spanned(token, loc))
    }

    /// Get the next token in a value position.
    pub fn next_value(&mut self) -> Result<Spanned> {
        self.skip_trivia()?;
        let loc = self.location();
        let token = match self.scanner.peek(0)? {
            None => Token::Eof,
            Some('"') => self.lex_string(loc)?,
            Some(c) if c == '-' || c.is_ascii_digit() => self.lex_number(loc)?,
            Some(c) if c.is_ascii_alphabetic() => {
                let word = self.read_while(|c| c.is_ascii_alphabetic())?;
                match word.as_str() {
                    "true" | "t" => Token::Bool(true),
                    "false" | "f" => Token::Bool(false),
                    "nan" | "inf" if !self.non_finite_floats => {
                        return Err(Error::at(ErrorKind::InvalidNumericLiteral(word), loc));
                    }
                    "nan" => Token::Float(f64::NAN),
                    "inf" => Token::Float(f64::INFINITY),
                    _ => Token::Unknown(word),
                }
            }
            Some(c) => self.lex_punctuation(c)?,
        };
        Ok(self.spanned(token, loc))
    }

    /// Get the next token inside the brackets of a Bytes literal.
    pub fn next_hex(&mut self) -> Result<Spanned> {
        self.skip_trivia()?;
        let loc = self.location();
        let token = match self.scanner.peek(0)? {
            None => Token::Eof,
            Some(c) if c.is_ascii_alphanumeric() => {
                let run = self.read_while(|c| c.is_ascii_alphanumeric())?;
                if !run.chars().all(|c| c.is_ascii_hexdigit()) {
                    return Err(Error::at(ErrorKind::InvalidHexByte(run), loc));
                }
                if run.len() > 2 {
                    return Err(Error::at(ErrorKind::IntegerOverflow(TypeTag::Bytes), loc));
                }
                let byte = u8::from_str_radix(&run, 16)
                    .map_err(|_| Error::at(ErrorKind::InvalidHexByte(run.clone()), loc))?;
                Token::HexByte(byte)
            }
            Some(c) => self.lex_punctuation(c)?,
        };
        Ok(self.spanned(token, loc))
    }

    /// Scan a binding name, starting right after `@`.
    ///
    /// The name ends at an unescaped `=`. When `bare_allowed` is set (the
    /// parser is directly inside a map body) it also ends, without consuming
    /// anything, where a value literal of type `tag` starts; see
    /// [`value_starts`]. A map's `:` ends the name in every scope. `\c`
    /// always stands for a literal `c`. Unescaped whitespace at either end of
    /// the name is not part of it.
    pub fn scan_name(&mut self, tag: TypeTag, bare_allowed: bool) -> Result<(Spanned, AssignForm)> {
        let bare_allowed = bare_ends_name(tag, bare_allowed);
        while matches!(self.scanner.peek(0)?, Some(c) if is_whitespace(c)) {
            self.scanner.advance()?;
        }
        let loc = self.location();
        let mut name = String::new();
        let mut pending = String::new();

        let form = loop {
            if bare_allowed && value_starts(&mut self.scanner, tag, self.non_finite_floats)? {
                break AssignForm::Bare;
            }
            let here = self.location();
            match self.scanner.advance()? {
                None => return Err(Error::at(ErrorKind::UnexpectedEndOfInput, here)),
                Some('=') => break AssignForm::Explicit,
                Some('\\') => {
                    let c = self.scanner.expect_char()?;
                    name.push_str(&pending);
                    pending.clear();
                    name.push(c);
                }
                Some(c) if is_whitespace(c) => pending.push(c),
                Some(c) => {
                    name.push_str(&pending);
                    pending.clear();
                    name.push(c);
                }
            }
        };

        if name.is_empty() {
            let found = match form {
                AssignForm::Explicit => "\"=\"",
                AssignForm::Bare => "value",
            };
            return Err(Error::at(
                ErrorKind::UnexpectedToken {
                    expected: "name".to_string(),
                    found: found.to_string(),
                },
                loc,
            ));
        }
        trace!("Name {:?} at {} ({:?} form)", name, loc, form);
        Ok((
            Spanned {
                token: Token::Name(name),
                location: loc,
            },
            form,
        ))
    }

    fn spanned(&self, token: Token, location: Location) -> Spanned {
        trace!("Token {:?} at {}", token, location);
        Spanned { token, location }
    }

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            match self.scanner.peek(0)? {
                Some(c) if is_whitespace(c) => {
                    self.scanner.advance()?;
                }
                Some('#') => self.skip_comment()?,
                _ => return Ok(()),
            }
        }
    }

    /// Skip a `#...#` comment; a backslash escapes the next character.
    fn skip_comment(&mut self) -> Result<()> {
        let start = self.location();
        let unterminated = || Error::at(ErrorKind::UnterminatedComment, start);
        self.scanner.advance()?;
        loop {
            match self.scanner.advance()?.ok_or_else(unterminated)? {
                '#' => return Ok(()),
                '\\' => {
                    self.scanner.advance()?.ok_or_else(unterminated)?;
                }
                _ => {}
            }
        }
    }

    fn read_while(&mut self, pred: impl Fn(char) -> bool) -> Result<String> {
        let mut out = String::new();
        while let Some(c) = self.scanner.peek(0)? {
            if !pred(c) {
                break;
            }
            out.push(c);
            self.scanner.advance()?;
        }
        Ok(out)
    }

    fn lex_punctuation(&mut self, c: char) -> Result<Token> {
        self.scanner.advance()?;
        Ok(punctuation(c).unwrap_or_else(|| Token::Unknown(c.to_string())))
    }

    /// Lex `Y.major[.minor]`.
    fn lex_version(&mut self) -> Result<Token> {
        let loc = self.location();
        self.scanner.advance()?;
        self.scanner.advance()?;
        let major_text = self.read_while(|c| c.is_ascii_digit())?;
        let mut text = format!("Y.{}", major_text);
        let mut minor_text = String::new();
        if self.scanner.at('.')?
            && matches!(self.scanner.peek(1)?, Some(c) if c.is_ascii_digit())
        {
            self.scanner.advance()?;
            minor_text = self.read_while(|c| c.is_ascii_digit())?;
            text.push('.');
            text.push_str(&minor_text);
        }
        let invalid = || Error::at(ErrorKind::InvalidNumericLiteral(text.clone()), loc);
        let major = major_text.parse::<u64>().map_err(|_| invalid())?;
        let minor = if minor_text.is_empty() {
            0
        } else {
            minor_text.parse::<u64>().map_err(|_| invalid())?
        };
        Ok(Token::Version { major, minor })
    }

    /// Lex a double-quoted string. Only `\"` and `\\` are escapes.
    fn lex_string(&mut self, start: Location) -> Result<Token> {
        let unterminated = || Error::at(ErrorKind::UnterminatedString, start);
        self.scanner.advance()?;
        let mut out = String::new();
        loop {
            let here = self.location();
            match self.scanner.advance()?.ok_or_else(unterminated)? {
                '"' => return Ok(Token::String(out)),
                '\\' => match self.scanner.advance()?.ok_or_else(unterminated)? {
                    c @ ('"' | '\\') => out.push(c),
                    c => return Err(Error::at(ErrorKind::InvalidEscape(c), here)),
                },
                c => out.push(c),
            }
        }
    }

    /// Lex an integer or float literal, or `-inf`.
    fn lex_number(&mut self, start: Location) -> Result<Token> {
        let mut text = String::new();
        if self.scanner.at('-')? {
            self.scanner.advance()?;
            text.push('-');
            if matches!(self.scanner.peek(0)?, Some(c) if c.is_ascii_alphabetic()) {
                text.push_str(&self.read_while(|c| c.is_ascii_alphabetic())?);
                if self.non_finite_floats && text == "-inf" {
                    return Ok(Token::Float(f64::NEG_INFINITY));
                }
                return Err(self.invalid_number(text, start));
            }
        }

        let digits = self.read_while(|c| c.is_ascii_digit())?;
        if digits.is_empty() {
            return Err(self.invalid_number(text, start));
        }
        text.push_str(&digits);

        let mut is_float = false;
        if self.scanner.at('.')? {
            self.scanner.advance()?;
            text.push('.');
            let fraction = self.read_while(|c| c.is_ascii_digit())?;
            if fraction.is_empty() {
                return Err(self.invalid_number(text, start));
            }
            text.push_str(&fraction);
            is_float = true;
        }
        if let Some(e @ ('e' | 'E')) = self.scanner.peek(0)? {
            self.scanner.advance()?;
            text.push(e);
            if let Some(sign @ ('+' | '-')) = self.scanner.peek(0)? {
                self.scanner.advance()?;
                text.push(sign);
            }
            let exponent = self.read_while(|c| c.is_ascii_digit())?;
            if exponent.is_empty() {
                return Err(self.invalid_number(text, start));
            }
            text.push_str(&exponent);
            is_float = true;
        }

        if matches!(self.scanner.peek(0)?, Some(c) if is_number_tail(c)) {
            return Err(self.invalid_number(text, start));
        }

        if is_float {
            match text.parse::<f64>() {
                Ok(f) if f.is_finite() => Ok(Token::Float(f)),
                _ => Err(Error::at(ErrorKind::InvalidNumericLiteral(text), start)),
            }
        } else {
            let negative = text.starts_with('-');
            text.parse::<BigInt>()
                .map(|value| Token::Integer { value, negative })
                .map_err(|_| Error::at(ErrorKind::InvalidNumericLiteral(text), start))
        }
    }

    /// Consume the rest of a malformed number and report it whole.
    fn invalid_number(&mut self, mut text: String, start: Location) -> Error {
        match self.read_while(is_number_tail) {
            Ok(rest) => {
                text.push_str(&rest);
                Error::at(ErrorKind::InvalidNumericLiteral(text), start)
            }
            Err(e) => e,
        }
    }
}

// ============================================================================
// Bare-value lookahead
// ============================================================================

/// Whether a name of type `tag` may end where its value starts.
pub(crate) fn bare_ends_name(tag: TypeTag, in_map: bool) -> bool {
    in_map || tag == TypeTag::Map
}

/// Decide whether a value literal of type `tag` starts at lookahead position 0.
///
/// `"`, `[` and `:` are decisive on their own. Numbers and booleans must be a
/// complete literal followed by optional trivia and `;`, so that a digit or a
/// `t` inside a name does not end it.
pub(crate) fn value_starts<L: Lookahead>(la: &mut L, tag: TypeTag, non_finite: bool) -> Result<bool> {
    match tag {
        TypeTag::Str => Ok(la.peek_char(0)? == Some('"')),
        TypeTag::List | TypeTag::Bytes => Ok(la.peek_char(0)? == Some('[')),
        TypeTag::Map => Ok(la.peek_char(0)? == Some(':')),
        TypeTag::UInt => {
            let end = digits_from(la, 0)?;
            Ok(end > 0 && ends_statement(la, end)?)
        }
        TypeTag::SInt => {
            let start = usize::from(la.peek_char(0)? == Some('-'));
            let end = digits_from(la, start)?;
            Ok(end > start && ends_statement(la, end)?)
        }
        TypeTag::Float => match float_literal_end(la, non_finite)? {
            Some(end) => ends_statement(la, end),
            None => Ok(false),
        },
        TypeTag::Bool => {
            let (word, end) = word_at(la, 0)?;
            Ok(matches!(word.as_str(), "true" | "false" | "t" | "f") && ends_statement(la, end)?)
        }
    }
}

fn digits_from<L: Lookahead>(la: &mut L, mut k: usize) -> Result<usize> {
    while matches!(la.peek_char(k)?, Some(c) if c.is_ascii_digit()) {
        k += 1;
    }
    Ok(k)
}

fn word_at<L: Lookahead>(la: &mut L, mut k: usize) -> Result<(String, usize)> {
    let mut word = String::new();
    while let Some(c) = la.peek_char(k)? {
        if !c.is_ascii_alphabetic() {
            break;
        }
        word.push(c);
        k += 1;
    }
    Ok((word, k))
}

/// End position of a float or integer literal starting at 0.
fn float_literal_end<L: Lookahead>(la: &mut L, non_finite: bool) -> Result<Option<usize>> {
    let negative = la.peek_char(0)? == Some('-');
    let start = usize::from(negative);
    if non_finite {
        let (word, end) = word_at(la, start)?;
        if word == "inf" || (word == "nan" && !negative) {
            return Ok(Some(end));
        }
    }
    let mut end = digits_from(la, start)?;
    if end == start {
        return Ok(None);
    }
    if la.peek_char(end)? == Some('.') {
        let after = digits_from(la, end + 1)?;
        if after == end + 1 {
            return Ok(None);
        }
        end = after;
    }
    if matches!(la.peek_char(end)?, Some('e' | 'E')) {
        let mut exp = end + 1;
        if matches!(la.peek_char(exp)?, Some('+' | '-')) {
            exp += 1;
        }
        let after = digits_from(la, exp)?;
        if after == exp {
            return Ok(None);
        }
        end = after;
    }
    Ok(Some(end))
}

/// Whether position `k` is followed by optional trivia and `;`.
fn ends_statement<L: Lookahead>(la: &mut L, mut k: usize) -> Result<bool> {
    loop {
        match la.peek_char(k)? {
            Some(c) if is_whitespace(c) => k += 1,
            Some('#') => {
                k += 1;
                loop {
                    match la.peek_char(k)? {
                        None => return Ok(false),
                        Some('#') => break,
                        Some('\\') => k += 2,
                        Some(_) => k += 1,
                    }
                }
                k += 1;
            }
            Some(';') => return Ok(true),
            _ => return Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::StrSource;
    use std::collections::VecDeque;

    fn lexer(text: &str) -> Lexer<StrSource<'_>> {
        Lexer::new(Scanner::new(StrSource::new(text)), true)
    }

    fn values(text: &str) -> Vec<Token> {
        let mut lx = lexer(text);
        let mut out = Vec::new();
        loop {
            let t = lx.next_value().unwrap().token;
            if t == Token::Eof {
                return out;
            }
            out.push(t);
        }
    }

    fn int(n: i64) -> Token {
        Token::Integer {
            value: n.into(),
            negative: n < 0,
        }
    }

    fn starts(text: &str, tag: TypeTag) -> bool {
        let mut la: VecDeque<char> = text.chars().collect();
        value_starts(&mut la, tag, true).unwrap()
    }

    #[test]
    fn test_statement_keywords() {
        let mut lx = lexer("Y.1.2; str uint x e end bogus");
        assert_eq!(
            lx.next_statement().unwrap().token,
            Token::Version { major: 1, minor: 2 }
        );
        assert_eq!(lx.next_statement().unwrap().token, Token::Semicolon);
        assert_eq!(lx.next_statement().unwrap().token, Token::TypeTag(TypeTag::Str));
        assert_eq!(lx.next_statement().unwrap().token, Token::TypeTag(TypeTag::UInt));
        assert_eq!(lx.next_statement().unwrap().token, Token::TypeTag(TypeTag::Bytes));
        assert_eq!(lx.next_statement().unwrap().token, Token::End);
        assert_eq!(lx.next_statement().unwrap().token, Token::End);
        assert_eq!(
            lx.next_statement().unwrap().token,
            Token::Unknown("bogus".into())
        );
        assert_eq!(lx.next_statement().unwrap().token, Token::Eof);
    }

    #[test]
    fn test_version_without_minor() {
        let mut lx = lexer("Y.3;");
        assert_eq!(
            lx.next_statement().unwrap().token,
            Token::Version { major: 3, minor: 0 }
        );
    }

    #[test]
    fn test_nul_ends_statements() {
        let mut lx = lexer("\0s@a=\"x\";");
        assert_eq!(lx.next_statement().unwrap().token, Token::Eof);
    }

    #[test]
    fn test_value_literals() {
        assert_eq!(
            values(r#""a\"b\\c" 42 -7 1.5 2e3 -0.25E-2 t false [ ] , ;"#),
            vec![
                Token::String("a\"b\\c".into()),
                int(42),
                int(-7),
                Token::Float(1.5),
                Token::Float(2000.0),
                Token::Float(-0.0025),
                Token::Bool(true),
                Token::Bool(false),
                Token::LBracket,
                Token::RBracket,
                Token::Comma,
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn test_negative_zero_keeps_its_sign() {
        assert_eq!(
            values("-0 0"),
            vec![
                Token::Integer {
                    value: 0.into(),
                    negative: true
                },
                int(0),
            ]
        );
        assert_eq!(values("-0")[0].value_kind(), Some("negative integer"));
    }

    #[test]
    fn test_non_finite_keywords() {
        let toks = values("nan inf -inf");
        assert!(matches!(toks[0], Token::Float(f) if f.is_nan()));
        assert_eq!(toks[1], Token::Float(f64::INFINITY));
        assert_eq!(toks[2], Token::Float(f64::NEG_INFINITY));

        let mut lx = Lexer::new(Scanner::new(StrSource::new("nan")), false);
        assert_eq!(
            lx.next_value().unwrap_err().kind,
            ErrorKind::InvalidNumericLiteral("nan".into())
        );
    }

    #[test]
    fn test_comments_are_trivia() {
        assert_eq!(
            values("#one# 1 #two \\# still two# 2"),
            vec![int(1), int(2)]
        );
    }

    #[test]
    fn test_unterminated_comment() {
        let err = lexer("  # never closed").next_value().unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnterminatedComment);
        assert_eq!(err.location.map(|l| l.column), Some(3));
    }

    #[test]
    fn test_string_errors() {
        let err = lexer("\"abc").next_value().unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnterminatedString);
        let err = lexer("\"a\\nb\"").next_value().unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidEscape('n'));
        assert_eq!(err.location.map(|l| l.column), Some(3));
    }

    #[test]
    fn test_invalid_numbers() {
        for (text, literal) in [
            ("1.2.3", "1.2.3"),
            ("12ab", "12ab"),
            ("1.", "1."),
            ("1e", "1e"),
            ("-", "-"),
            ("-x", "-x"),
            ("1e999", "1e999"),
        ] {
            let err = lexer(text).next_value().unwrap_err();
            assert_eq!(
                err.kind,
                ErrorKind::InvalidNumericLiteral(literal.into()),
                "{}",
                text
            );
        }
    }

    #[test]
    fn test_hex_bytes() {
        let mut lx = lexer("1A, 2f ,3 ]");
        assert_eq!(lx.next_hex().unwrap().token, Token::HexByte(0x1A));
        assert_eq!(lx.next_hex().unwrap().token, Token::Comma);
        assert_eq!(lx.next_hex().unwrap().token, Token::HexByte(0x2F));
        assert_eq!(lx.next_hex().unwrap().token, Token::Comma);
        assert_eq!(lx.next_hex().unwrap().token, Token::HexByte(3));
        assert_eq!(lx.next_hex().unwrap().token, Token::RBracket);

        assert_eq!(
            lexer("1G").next_hex().unwrap_err().kind,
            ErrorKind::InvalidHexByte("1G".into())
        );
        assert_eq!(
            lexer("1FF").next_hex().unwrap_err().kind,
            ErrorKind::IntegerOverflow(TypeTag::Bytes)
        );
    }

    #[test]
    fn test_explicit_name() {
        let mut lx = lexer("Hello, world!\"\"''=\"hi!\"");
        let (name, form) = lx.scan_name(TypeTag::Str, false).unwrap();
        assert_eq!(name.token, Token::Name("Hello, world!\"\"''".into()));
        assert_eq!(form, AssignForm::Explicit);
        assert_eq!(lx.next_value().unwrap().token, Token::String("hi!".into()));
    }

    #[test]
    fn test_escaped_equals_in_name() {
        let mut lx = lexer(" a\\=b\\\\ =1");
        let (name, _) = lx.scan_name(TypeTag::UInt, false).unwrap();
        assert_eq!(name.token, Token::Name("a=b\\".into()));
    }

    #[test]
    fn test_bare_name_termination() {
        let mut lx = lexer("key2 42;");
        let (name, form) = lx.scan_name(TypeTag::UInt, true).unwrap();
        assert_eq!(name.token, Token::Name("key2".into()));
        assert_eq!(form, AssignForm::Bare);
        assert_eq!(lx.next_value().unwrap().token, int(42));

        let mut lx = lexer("key\"value\";");
        let (name, _) = lx.scan_name(TypeTag::Str, true).unwrap();
        assert_eq!(name.token, Token::Name("key".into()));

        let mut lx = lexer("flat t;");
        let (name, _) = lx.scan_name(TypeTag::Bool, true).unwrap();
        assert_eq!(name.token, Token::Name("flat".into()));
    }

    #[test]
    fn test_map_colon_ends_name_at_top_level() {
        let mut lx = lexer("m:u@a 1;e;");
        let (name, form) = lx.scan_name(TypeTag::Map, false).unwrap();
        assert_eq!(name.token, Token::Name("m".into()));
        assert_eq!(form, AssignForm::Bare);

        // Other tags still need `=` outside a map.
        let mut lx = lexer("key\"v\"=\"x\"");
        let (name, _) = lx.scan_name(TypeTag::Str, false).unwrap();
        assert_eq!(name.token, Token::Name("key\"v\"".into()));
    }

    #[test]
    fn test_name_without_terminator() {
        let err = lexer("abc").scan_name(TypeTag::Str, false).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedEndOfInput);
    }

    #[test]
    fn test_empty_name() {
        let err = lexer("=1").scan_name(TypeTag::UInt, false).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnexpectedToken { .. }));
    }

    #[test]
    fn test_value_starts() {
        assert!(starts("\"x\";", TypeTag::Str));
        assert!(starts("[1];", TypeTag::List));
        assert!(starts(":u@a 1;e;", TypeTag::Map));
        assert!(starts("42;", TypeTag::UInt));
        assert!(starts("42 #why# ;", TypeTag::UInt));
        assert!(!starts("2 42;", TypeTag::UInt));
        assert!(!starts("-1;", TypeTag::UInt));
        assert!(starts("-1;", TypeTag::SInt));
        assert!(starts("1.5e3;", TypeTag::Float));
        assert!(starts("7;", TypeTag::Float));
        assert!(starts("-inf;", TypeTag::Float));
        assert!(!starts("-nan;", TypeTag::Float));
        assert!(!starts("1.;", TypeTag::Float));
        assert!(starts("true;", TypeTag::Bool));
        assert!(!starts("tru;", TypeTag::Bool));
        assert!(!starts("t2;", TypeTag::Bool));
    }
}
