//! Phase 3: Parser
//!
//! The parser pulls tokens from the lexer and builds the document. It owns
//! the grammar and the semantic checks:
//! - Version header and supported major versions
//! - Agreement between the declared type tag and the literal
//! - Element typing inside lists (inferred from literal shape)
//! - Map scopes, where the lexer may end names without `=`
//! - Unique names per scope
//! - A bound on how deeply lists and maps nest
//!
//! The first error aborts the parse; the partially built tree is dropped.

use crate::error::{Error, ErrorKind, Location, Result};
use crate::lexer::{Lexer, Spanned, Token};
use crate::options::DecodeOptions;
use crate::scanner::{Scanner, Source};
use crate::value::{Binding, Document, Map, TypeTag, Value, Version};
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use tracing::{debug, trace};

/// Parse a complete document from a character source.
pub fn parse_document<S: Source>(source: S, options: &DecodeOptions) -> Result<Document> {
    let lexer = Lexer::new(Scanner::new(source), options.non_finite_floats);
    let doc = Parser {
        lexer,
        options,
        depth: 0,
    }
    .document()?;
    debug!(version = %doc.version, bindings = doc.len(), "decoded document");
    Ok(doc)
}

struct Parser<'o, S: Source> {
    lexer: Lexer<S>,
    options: &'o DecodeOptions,
    /// Lists and maps currently open.
    depth: usize,
}

impl<S: Source> Parser<'_, S> {
    // ========================================================================
    // Document
    // ========================================================================

    fn document(mut self) -> Result<Document> {
        let mut next = self.lexer.next_statement()?;

        let version = match next.token {
            Token::Version { major, minor } => {
                if !self.options.supports_major(major) {
                    return Err(Error::at(
                        ErrorKind::UnsupportedVersion { major, minor },
                        next.location,
                    ));
                }
                expect_semicolon(self.lexer.next_statement()?)?;
                next = self.lexer.next_statement()?;
                Version::new(major, minor)
            }
            _ if self.options.require_version => return Err(unexpected("version header", &next)),
            _ => Version::CURRENT,
        };

        let mut bindings = Map::new();
        loop {
            match next.token {
                Token::Eof => break,
                Token::TypeTag(tag) => {
                    let (binding, location) = self.binding(tag, false)?;
                    insert_unique(&mut bindings, binding, location)?;
                }
                _ => return Err(unexpected("type tag", &next)),
            }
            next = self.lexer.next_statement()?;
        }

        Ok(Document { version, bindings })
    }

    /// Parse the rest of a binding after its type tag.
    ///
    /// Returns the binding and the location of its name.
    fn binding(&mut self, tag: TypeTag, in_map: bool) -> Result<(Binding, Location)> {
        let at = self.lexer.next_statement()?;
        if at.token != Token::At {
            return Err(unexpected("\"@\"", &at));
        }

        let (name, form) = self.lexer.scan_name(tag, in_map)?;
        let location = name.location;
        let name = match name.token {
            Token::Name(name) => name,
            other => return Err(unexpected_token("name", &other, location)),
        };
        trace!("Binding {}@{:?} ({:?} form)", tag, name, form);

        let value = self.value(tag)?;
        expect_semicolon(self.lexer.next_value()?)?;
        Ok((Binding { name, value }, location))
    }

    // ========================================================================
    // Values
    // ========================================================================

    /// Parse a value that must agree with the declared tag.
    fn value(&mut self, tag: TypeTag) -> Result<Value> {
        let Spanned { token, location } = self.lexer.next_value()?;
        match (tag, token) {
            (TypeTag::Str, Token::String(s)) => Ok(Value::Str(s)),
            (TypeTag::UInt, Token::Integer { value, negative }) => {
                to_uint(&value, negative, location).map(Value::UInt)
            }
            (TypeTag::SInt, Token::Integer { value, .. }) => {
                to_sint(&value, location).map(Value::SInt)
            }
            (TypeTag::Float, Token::Float(f)) => Ok(Value::Float(f)),
            (TypeTag::Float, Token::Integer { value, negative }) => value
                .to_f64()
                .filter(|f| f.is_finite())
                .map(|f| Value::Float(if negative { -f.abs() } else { f }))
                .ok_or_else(|| Error::at(ErrorKind::IntegerOverflow(TypeTag::Float), location)),
            (TypeTag::Bool, Token::Bool(b)) => Ok(Value::Bool(b)),
            (TypeTag::List, Token::LBracket) => self.nested(location, Self::list).map(Value::List),
            (TypeTag::Bytes, Token::LBracket) => self.bytes().map(Value::Bytes),
            (TypeTag::Map, Token::Colon) => self
                .nested(location, |p| p.map_body(location))
                .map(Value::Map),
            (declared, token) => Err(match token.value_kind() {
                Some(found) => Error::at(
                    ErrorKind::TypeMismatch {
                        declared,
                        found: found.to_string(),
                    },
                    location,
                ),
                None => unexpected_token(&format!("{} value", declared), &token, location),
            }),
        }
    }

    /// Run `parse` one nesting level deeper. `open` locates the `[` or `:`.
    fn nested<T>(
        &mut self,
        open: Location,
        parse: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        if self.depth >= self.options.max_depth {
            return Err(Error::at(
                ErrorKind::NestingTooDeep(self.options.max_depth),
                open,
            ));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Parse list elements after `[`, inferring each element's type.
    fn list(&mut self) -> Result<Vec<Value>> {
        let mut items = Vec::new();
        let mut next = self.lexer.next_value()?;
        if next.token == Token::RBracket {
            return Ok(items);
        }
        loop {
            items.push(self.element(next)?);
            let sep = self.lexer.next_value()?;
            match sep.token {
                Token::Comma => next = self.lexer.next_value()?,
                Token::RBracket => return Ok(items),
                _ => return Err(unexpected("\",\" or \"]\"", &sep)),
            }
        }
    }

    /// Infer a list element from its literal shape.
    fn element(&mut self, next: Spanned) -> Result<Value> {
        let Spanned { token, location } = next;
        match token {
            Token::String(s) => Ok(Value::Str(s)),
            Token::Float(f) => Ok(Value::Float(f)),
            Token::Integer {
                value,
                negative: true,
            } => to_sint(&value, location).map(Value::SInt),
            Token::Integer { value, .. } => to_uint(&value, false, location).map(Value::UInt),
            Token::Bool(b) => Ok(Value::Bool(b)),
            Token::LBracket => self.nested(location, Self::list).map(Value::List),
            other => Err(unexpected_token("list element", &other, location)),
        }
    }

    /// Parse hex bytes after `[`.
    fn bytes(&mut self) -> Result<Vec<u8>> {
        let mut octets = Vec::new();
        let mut next = self.lexer.next_hex()?;
        if next.token == Token::RBracket {
            return Ok(octets);
        }
        loop {
            match next.token {
                Token::HexByte(b) => octets.push(b),
                _ => return Err(unexpected("hex byte", &next)),
            }
            let sep = self.lexer.next_hex()?;
            match sep.token {
                Token::Comma => next = self.lexer.next_hex()?,
                Token::RBracket => return Ok(octets),
                _ => return Err(unexpected("\",\" or \"]\"", &sep)),
            }
        }
    }

    /// Parse bindings after `:` up to `end`. `open` is the location of the `:`.
    fn map_body(&mut self, open: Location) -> Result<Map> {
        let mut map = Map::new();
        loop {
            let next = self.lexer.next_statement()?;
            match next.token {
                Token::End => return Ok(map),
                Token::TypeTag(tag) => {
                    let (binding, location) = self.binding(tag, true)?;
                    insert_unique(&mut map, binding, location)?;
                }
                Token::Eof => return Err(Error::at(ErrorKind::UnterminatedMap, open)),
                _ => return Err(unexpected("type tag or \"end\"", &next)),
            }
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn expect_semicolon(next: Spanned) -> Result<()> {
    match next.token {
        Token::Semicolon => Ok(()),
        _ => Err(unexpected("\";\"", &next)),
    }
}

fn insert_unique(scope: &mut Map, binding: Binding, location: Location) -> Result<()> {
    if scope.contains_key(&binding.name) {
        return Err(Error::at(
            ErrorKind::DuplicateBinding(binding.name),
            location,
        ));
    }
    scope.insert(binding.name, binding.value);
    Ok(())
}

/// A literal written with `-` never fits, even `-0`.
fn to_uint(n: &BigInt, negative: bool, location: Location) -> Result<u64> {
    if negative {
        return Err(Error::at(
            ErrorKind::TypeMismatch {
                declared: TypeTag::UInt,
                found: "negative integer".to_string(),
            },
            location,
        ));
    }
    n.to_u64()
        .ok_or_else(|| Error::at(ErrorKind::IntegerOverflow(TypeTag::UInt), location))
}

fn to_sint(n: &BigInt, location: Location) -> Result<i64> {
    n.to_i64()
        .ok_or_else(|| Error::at(ErrorKind::IntegerOverflow(TypeTag::SInt), location))
}

fn unexpected(expected: &str, found: &Spanned) -> Error {
    unexpected_token(expected, &found.token, found.location)
}

fn unexpected_token(expected: &str, found: &Token, location: Location) -> Error {
    let kind = match found {
        Token::Eof => ErrorKind::UnexpectedEndOfInput,
        other => ErrorKind::UnexpectedToken {
            expected: expected.to_string(),
            found: other.describe(),
        },
    };
    Error::at(kind, location)
}
