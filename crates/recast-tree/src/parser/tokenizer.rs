// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Tokenizer for the supported source subset.
//!
//! Each token carries the exact trivia (whitespace and comments) that
//! precedes it, so the concatenation of every token's prefix and text
//! reproduces the input.

use memchr::memmem;

use super::ParseError;

/// Token classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokKind {
    /// Identifier or keyword; also `@Name` annotations.
    Ident,
    Number,
    Str,
    Char,
    Punct,
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokKind,
    pub prefix: &'a str,
    pub text: &'a str,
    /// Byte offset of `text` in the source.
    pub offset: usize,
}

impl Token<'_> {
    pub fn is(&self, text: &str) -> bool {
        self.kind != TokKind::Str && self.kind != TokKind::Char && self.text == text
    }
}

/// Punctuation, longest first.
const PUNCTS: &[&str] = &[
    "==", "!=", "<=", ">=", "&&", "||", "(", ")", "{", "}", "[", "]", ";", ",", ".", "<", ">",
    "=", "+", "-", "*", "/", "%", "!", "?", "&", "|", "^", "~", ":",
];

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c == b'$'
}

fn is_ident_continue(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c == b'$'
}

/// Split source text into tokens. The final token is always [`TokKind::Eof`]
/// and carries any trailing trivia.
pub fn tokenize(source: &str) -> Result<Vec<Token<'_>>, ParseError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    loop {
        let trivia_start = pos;
        pos = skip_trivia(source, pos)?;
        let prefix = &source[trivia_start..pos];

        if pos >= bytes.len() {
            tokens.push(Token {
                kind: TokKind::Eof,
                prefix,
                text: "",
                offset: pos,
            });
            return Ok(tokens);
        }

        let start = pos;
        let c = bytes[pos];
        let annotation = c == b'@' && bytes.get(pos + 1).is_some_and(|b| is_ident_start(*b));
        let kind = if is_ident_start(c) || annotation {
            pos += 1;
            while pos < bytes.len() && is_ident_continue(bytes[pos]) {
                pos += 1;
            }
            TokKind::Ident
        } else if c.is_ascii_digit() {
            while pos < bytes.len()
                && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_' || bytes[pos] == b'.')
            {
                pos += 1;
            }
            TokKind::Number
        } else if c == b'"' || c == b'\'' {
            pos = skip_quoted(source, pos, c)?;
            if c == b'"' {
                TokKind::Str
            } else {
                TokKind::Char
            }
        } else if let Some(punct) = PUNCTS.iter().find(|p| source[pos..].starts_with(**p)) {
            pos += punct.len();
            TokKind::Punct
        } else {
            let ch = source[pos..].chars().next().unwrap_or('\0');
            return Err(ParseError::InvalidChar { ch, offset: pos });
        };

        tokens.push(Token {
            kind,
            prefix,
            text: &source[start..pos],
            offset: start,
        });
    }
}

/// Advance past whitespace and comments.
fn skip_trivia(source: &str, mut pos: usize) -> Result<usize, ParseError> {
    let bytes = source.as_bytes();
    loop {
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if source[pos..].starts_with("//") {
            pos = match memchr::memchr(b'\n', &bytes[pos..]) {
                Some(end) => pos + end,
                None => bytes.len(),
            };
        } else if source[pos..].starts_with("/*") {
            match memmem::find(&bytes[pos + 2..], b"*/") {
                Some(end) => pos += 2 + end + 2,
                None => {
                    return Err(ParseError::Unterminated {
                        what: "comment",
                        offset: pos,
                    })
                }
            }
        } else {
            return Ok(pos);
        }
    }
}

/// Advance past a quoted literal starting at `pos`, honoring backslash escapes.
fn skip_quoted(source: &str, pos: usize, quote: u8) -> Result<usize, ParseError> {
    let bytes = source.as_bytes();
    let mut i = pos + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' => break,
            b if b == quote => return Ok(i + 1),
            _ => i += 1,
        }
    }
    Err(ParseError::Unterminated {
        what: if quote == b'"' { "string" } else { "character literal" },
        offset: pos,
    })
}
