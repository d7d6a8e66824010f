//! Position-aware editing of JSON-with-comments text.
//!
//! Manifest files are JSONC: a JSON body that may carry `//` and `/* */`
//! comments. Rewrites must only touch the value being replaced, so this
//! module locates the exact byte span of a value at an object path and
//! splices replacement text over it. Actual value parsing is left to
//! `serde_json`; comments are blanked in place first so every parse error
//! still points at a real offset in the original text.

use serde_json::Value;
use std::ops::Range;

#[derive(Debug, thiserror::Error)]
pub enum JsoncError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("unexpected character {found:?} at byte {at}")]
    Unexpected { found: char, at: usize },
    #[error("no value at path {0}")]
    PathNotFound(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Parses JSONC into a `serde_json::Value`, tolerating comments.
pub fn parse(text: &str) -> Result<Value, JsoncError> {
    Ok(serde_json::from_str(&blank_comments(text))?)
}

/// Byte range of the value at `path`, where each segment names an object
/// member. An empty path addresses the top-level value.
pub fn value_span(text: &str, path: &[&str]) -> Result<Range<usize>, JsoncError> {
    let mut scanner = Scanner::new(text);
    scanner.locate(path).map_err(|e| match e {
        JsoncError::PathNotFound(_) => JsoncError::PathNotFound(path.join(".")),
        other => other,
    })
}

/// Returns a copy of `text` with the value at `path` replaced by
/// `replacement`, byte for byte. Everything outside the value's span is
/// preserved exactly; the caller is responsible for indenting the
/// replacement to fit its context.
pub fn replace_value(text: &str, path: &[&str], replacement: &str) -> Result<String, JsoncError> {
    let span = value_span(text, path)?;
    let mut out = String::with_capacity(text.len() + replacement.len());
    out.push_str(&text[..span.start]);
    out.push_str(replacement);
    out.push_str(&text[span.end..]);
    Ok(out)
}

/// Replaces comment bytes with spaces (newlines kept) so offsets and line
/// numbers still line up with the original text.
fn blank_comments(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = bytes.to_vec();
    let mut pos = 0;
    while pos < bytes.len() {
        match bytes[pos] {
            b'"' => {
                pos += 1;
                while pos < bytes.len() {
                    match bytes[pos] {
                        b'\\' => pos += 2,
                        b'"' => {
                            pos += 1;
                            break;
                        }
                        _ => pos += 1,
                    }
                }
            }
            b'/' if bytes.get(pos + 1) == Some(&b'/') => {
                while pos < bytes.len() && bytes[pos] != b'\n' {
                    out[pos] = b' ';
                    pos += 1;
                }
            }
            b'/' if bytes.get(pos + 1) == Some(&b'*') => {
                let mut end = pos + 2;
                while end < bytes.len() {
                    if bytes[end] == b'*' && bytes.get(end + 1) == Some(&b'/') {
                        end += 2;
                        break;
                    }
                    end += 1;
                }
                for i in pos..end.min(bytes.len()) {
                    if out[i] != b'\n' && out[i] != b'\r' {
                        out[i] = b' ';
                    }
                }
                pos = end;
            }
            _ => pos += 1,
        }
    }
    // Comments are ASCII-blanked only, so the buffer stays valid UTF-8.
    String::from_utf8_lossy(&out).into_owned()
}

struct Scanner<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Scanner {
            text,
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn unexpected(&self) -> JsoncError {
        match self.text.get(self.pos..).and_then(|rest| rest.chars().next()) {
            Some(found) => JsoncError::Unexpected {
                found,
                at: self.pos,
            },
            None => JsoncError::UnexpectedEof,
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(b) if b.is_ascii_whitespace() => self.bump(),
                Some(b'/') => match self.bytes.get(self.pos + 1) {
                    Some(b'/') => {
                        while let Some(b) = self.peek() {
                            if b == b'\n' {
                                break;
                            }
                            self.bump();
                        }
                    }
                    Some(b'*') => {
                        self.pos += 2;
                        while self.pos < self.bytes.len() {
                            if self.bytes[self.pos] == b'*'
                                && self.bytes.get(self.pos + 1) == Some(&b'/')
                            {
                                self.pos += 2;
                                break;
                            }
                            self.bump();
                        }
                    }
                    _ => break,
                },
                _ => break,
            }
        }
    }

    fn expect(&mut self, expected: u8) -> Result<(), JsoncError> {
        if self.peek() == Some(expected) {
            self.bump();
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn skip_string(&mut self) -> Result<(), JsoncError> {
        self.expect(b'"')?;
        while let Some(b) = self.peek() {
            self.bump();
            match b {
                b'\\' => {
                    if self.peek().is_none() {
                        return Err(JsoncError::UnexpectedEof);
                    }
                    self.bump();
                }
                b'"' => return Ok(()),
                _ => {}
            }
        }
        Err(JsoncError::UnexpectedEof)
    }

    /// Decodes the string literal at the cursor. The raw slice, quotes
    /// included, is itself valid JSON, so serde_json does the unescaping.
    fn parse_string(&mut self) -> Result<String, JsoncError> {
        let start = self.pos;
        self.skip_string()?;
        Ok(serde_json::from_str(&self.text[start..self.pos])?)
    }

    fn skip_value(&mut self) -> Result<(), JsoncError> {
        self.skip_trivia();
        match self.peek().ok_or(JsoncError::UnexpectedEof)? {
            b'{' => self.skip_delimited(b'{', b'}'),
            b'[' => self.skip_delimited(b'[', b']'),
            b'"' => self.skip_string(),
            _ => {
                let start = self.pos;
                while let Some(b) = self.peek() {
                    if matches!(b, b',' | b'}' | b']' | b'/') || b.is_ascii_whitespace() {
                        break;
                    }
                    self.bump();
                }
                if self.pos == start {
                    Err(self.unexpected())
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Skips a bracketed value. JSON brackets nest properly, so counting
    /// one bracket kind is enough as long as strings and comments are
    /// stepped over rather than inspected.
    fn skip_delimited(&mut self, open: u8, close: u8) -> Result<(), JsoncError> {
        self.expect(open)?;
        let mut depth = 1usize;
        while depth > 0 {
            match self.peek().ok_or(JsoncError::UnexpectedEof)? {
                b'"' => self.skip_string()?,
                b'/' => {
                    let before = self.pos;
                    self.skip_trivia();
                    if self.pos == before {
                        self.bump();
                    }
                }
                b if b == open => {
                    depth += 1;
                    self.bump();
                }
                b if b == close => {
                    depth -= 1;
                    self.bump();
                }
                _ => self.bump(),
            }
        }
        Ok(())
    }

    fn locate(&mut self, path: &[&str]) -> Result<Range<usize>, JsoncError> {
        self.skip_trivia();
        if path.is_empty() {
            let start = self.pos;
            self.skip_value()?;
            return Ok(start..self.pos);
        }
        self.expect(b'{')?;
        loop {
            self.skip_trivia();
            match self.peek().ok_or(JsoncError::UnexpectedEof)? {
                b'}' => return Err(JsoncError::PathNotFound(path.join("."))),
                b'"' => {
                    let key = self.parse_string()?;
                    self.skip_trivia();
                    self.expect(b':')?;
                    if key == path[0] {
                        return self.locate(&path[1..]);
                    }
                    self.skip_value()?;
                    self.skip_trivia();
                    if self.peek() == Some(b',') {
                        self.bump();
                    }
                }
                _ => return Err(self.unexpected()),
            }
        }
    }
}
