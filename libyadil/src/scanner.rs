//! Phase 1: Scanner
//!
//! The scanner is a character cursor over a pull-based [`Source`]. It:
//! - Decodes UTF-8 (sources do this lazily, so input is never materialized)
//! - Tracks byte offset, line and column for error reporting
//! - Offers arbitrary lookahead with `peek(k)`, buffering only what was peeked
//!
//! It knows nothing about comments or tokens.

use crate::error::{Error, ErrorKind, Location, Result};
use std::collections::VecDeque;
use std::io::{BufReader, Bytes, Read};
use std::str::Chars;

/// A pull interface yielding one character at a time.
pub trait Source {
    /// Return the next character, or `None` at end of input.
    fn next_char(&mut self) -> Result<Option<char>>;
}

/// Source over text already in memory.
pub struct StrSource<'a> {
    chars: Chars<'a>,
}

impl<'a> StrSource<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { chars: text.chars() }
    }
}

impl Source for StrSource<'_> {
    #[inline]
    fn next_char(&mut self) -> Result<Option<char>> {
        Ok(self.chars.next())
    }
}

/// Source decoding UTF-8 incrementally from a reader.
pub struct ReaderSource<R: Read> {
    bytes: Bytes<BufReader<R>>,
    /// Byte offset of the next undecoded byte.
    offset: usize,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            bytes: BufReader::new(reader).bytes(),
            offset: 0,
        }
    }

    fn next_byte(&mut self) -> Result<Option<u8>> {
        match self.bytes.next() {
            None => Ok(None),
            Some(Ok(b)) => {
                self.offset += 1;
                Ok(Some(b))
            }
            Some(Err(e)) => Err(Error::at(
                ErrorKind::Io(e.to_string()),
                Location {
                    offset: self.offset,
                    ..Location::START
                },
            )),
        }
    }

    fn invalid_at(&self, offset: usize) -> Error {
        Error::at(
            ErrorKind::InvalidUtf8,
            Location {
                offset,
                ..Location::START
            },
        )
    }
}

/// Number of bytes in the UTF-8 sequence introduced by `lead`, if it is a lead byte.
fn utf8_width(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7F => Some(1),
        0xC2..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
    }
}

impl<R: Read> Source for ReaderSource<R> {
    fn next_char(&mut self) -> Result<Option<char>> {
        let start = self.offset;
        let lead = match self.next_byte()? {
            Some(b) => b,
            None => return Ok(None),
        };
        let width = utf8_width(lead).ok_or_else(|| self.invalid_at(start))?;
        if width == 1 {
            return Ok(Some(lead as char));
        }
        let mut buf = [lead, 0, 0, 0];
        for slot in buf.iter_mut().take(width).skip(1) {
            *slot = self.next_byte()?.ok_or_else(|| self.invalid_at(start))?;
        }
        std::str::from_utf8(&buf[..width])
            .ok()
            .and_then(|s| s.chars().next())
            .map(Some)
            .ok_or_else(|| self.invalid_at(start))
    }
}

/// Random-access lookahead over characters that have not been consumed yet.
pub trait Lookahead {
    /// The character `k` positions ahead, without consuming anything.
    fn peek_char(&mut self, k: usize) -> Result<Option<char>>;
}

impl Lookahead for VecDeque<char> {
    #[inline]
    fn peek_char(&mut self, k: usize) -> Result<Option<char>> {
        Ok(self.get(k).copied())
    }
}

/// Character cursor with position tracking.
pub struct Scanner<S: Source> {
    source: S,
    /// Characters pulled from the source but not yet consumed.
    buffer: VecDeque<char>,
    location: Location,
}

impl<S: Source> Scanner<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            buffer: VecDeque::new(),
            location: Location::START,
        }
    }

    /// Location of the next unconsumed character.
    #[inline]
    pub fn location(&self) -> Location {
        self.location
    }

    /// Peek at the character `k` positions ahead without consuming.
    pub fn peek(&mut self, k: usize) -> Result<Option<char>> {
        while self.buffer.len() <= k {
            match self.pull()? {
                Some(c) => self.buffer.push_back(c),
                None => return Ok(None),
            }
        }
        Ok(self.buffer.get(k).copied())
    }

    /// Consume one character and return it.
    pub fn advance(&mut self) -> Result<Option<char>> {
        let c = match self.buffer.pop_front() {
            Some(c) => c,
            None => match self.pull()? {
                Some(c) => c,
                None => return Ok(None),
            },
        };
        self.location.offset += c.len_utf8();
        if c == '\n' {
            self.location.line += 1;
            self.location.column = 1;
        } else {
            self.location.column += 1;
        }
        Ok(Some(c))
    }

    /// Consume one character, failing at end of input.
    pub fn expect_char(&mut self) -> Result<char> {
        let loc = self.location;
        self.advance()?
            .ok_or_else(|| Error::at(ErrorKind::UnexpectedEndOfInput, loc))
    }

    /// Check whether the next character is `c`.
    #[inline]
    pub fn at(&mut self, c: char) -> Result<bool> {
        Ok(self.peek(0)? == Some(c))
    }

    /// Pull from the source, annotating source errors with the current position.
    fn pull(&mut self) -> Result<Option<char>> {
        // Sources only know byte offsets, so line and column come from here.
        let (mut line, mut column) = (self.location.line, self.location.column);
        for &c in &self.buffer {
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        self.source.next_char().map_err(|mut e| {
            if let Some(l) = e.location.as_mut() {
                l.line = line;
                l.column = column;
            }
            e
        })
    }
}

impl<S: Source> Lookahead for Scanner<S> {
    #[inline]
    fn peek_char(&mut self, k: usize) -> Result<Option<char>> {
        self.peek(k)
    }
}
