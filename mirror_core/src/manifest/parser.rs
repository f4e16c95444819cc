//! Grammar for checksum manifests.
//!
//! ```text
//! line    := hash SPACE [ASTERISK] path lineEnd
//! hash    := WORD
//! path    := (WORD | SPACE)+        -- must not end on SPACE
//! lineEnd := CR LF | LF | EOF
//! ```

use super::ChecksumItem;
use super::lexer::{Lexer, Token, TokenKind};
use crate::error::{Error, Result};

/// Token source with a single token of push-back.
struct Cursor<'a> {
    lexer: Lexer<'a>,
    current: Token,
    has_pushback: bool,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            lexer: Lexer::new(input),
            current: Token {
                kind: TokenKind::Eof,
                literal: String::new(),
            },
            has_pushback: false,
        }
    }

    /// Return the pushed-back token if there is one, otherwise lex the next token.
    fn scan(&mut self) -> Token {
        if self.has_pushback {
            self.has_pushback = false;
        } else {
            self.current = self.lexer.scan();
        }
        self.current.clone()
    }

    /// Push the last scanned token back. Only one level is supported.
    fn unscan(&mut self) {
        self.has_pushback = true;
    }

    /// Literal of the last scanned token.
    fn literal(&self) -> &str {
        &self.current.literal
    }
}

/// Parses manifest text into [`ChecksumItem`]s.
pub struct Parser<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            cursor: Cursor::new(input),
        }
    }

    /// Parse every line until end of input.
    ///
    /// The first grammar violation aborts the whole parse; no items are returned on error.
    pub fn parse(mut self) -> Result<Vec<ChecksumItem>> {
        let mut items = Vec::new();
        loop {
            let hash = {
                let token = self.cursor.scan();
                match token.kind {
                    TokenKind::Eof => break,
                    TokenKind::Word => token.literal,
                    _ => return Err(Error::syntax("hash", token.literal)),
                }
            };

            let (binary_mode, path) = self.parse_after_hash()?;
            items.push(ChecksumItem {
                hash,
                binary_mode,
                path,
            });

            if self.parse_line_end()? {
                break;
            }
        }
        Ok(items)
    }

    /// Separator, optional binary marker and path.
    fn parse_after_hash(&mut self) -> Result<(bool, String)> {
        let token = self.cursor.scan();
        if token.kind != TokenKind::Space {
            return Err(Error::syntax("whitespace", token.literal));
        }

        let token = self.cursor.scan();
        let binary_mode = match token.kind {
            TokenKind::Asterisk => true,
            TokenKind::Word | TokenKind::Space => {
                self.cursor.unscan();
                false
            }
            _ => return Err(Error::syntax("whitespace", token.literal)),
        };

        let token = self.cursor.scan();
        if token.kind == TokenKind::Space {
            return Err(Error::syntax("path", token.literal));
        }
        self.cursor.unscan();

        let mut path = String::new();
        let mut parts = 0usize;
        let mut last_kind = None;
        loop {
            let token = self.cursor.scan();
            match token.kind {
                TokenKind::Word | TokenKind::Space => {
                    path.push_str(&token.literal);
                    parts += 1;
                    last_kind = Some(token.kind);
                }
                TokenKind::Cr | TokenKind::Lf | TokenKind::Eof => {
                    self.cursor.unscan();
                    break;
                }
                _ => return Err(Error::syntax("path", token.literal)),
            }
        }

        if parts == 0 {
            return Err(Error::syntax("path", self.cursor.literal()));
        }
        if last_kind == Some(TokenKind::Space) {
            return Err(Error::syntax("path", " "));
        }

        Ok((binary_mode, path))
    }

    /// Consume the line terminator. Returns `true` when input is exhausted.
    fn parse_line_end(&mut self) -> Result<bool> {
        let token = self.cursor.scan();
        match token.kind {
            TokenKind::Cr => {
                let next = self.cursor.scan();
                if next.kind == TokenKind::Lf {
                    Ok(false)
                } else {
                    Err(Error::syntax("endline", next.literal))
                }
            }
            TokenKind::Lf => Ok(false),
            TokenKind::Eof => Ok(true),
            _ => Err(Error::syntax("endline", token.literal)),
        }
    }
}
