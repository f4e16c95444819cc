//! Tokenizer for checksum manifest text.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

/// Literal reported for end of input.
///
/// NUL is never a valid manifest character; an actual NUL in the input lexes as
/// [`TokenKind::Invalid`].
pub const EOF_LITERAL: &str = "\0";

/// Token classes produced by the [`Lexer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A run of characters that are not `*`, CR, LF, space or tab.
    Word,
    /// A run of spaces and tabs.
    Space,
    /// `\r`
    Cr,
    /// `\n`
    Lf,
    /// End of input.
    Eof,
    /// `*`, always on its own.
    Asterisk,
    /// Anything else (currently only NUL).
    Invalid,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Word => "WORD",
            TokenKind::Space => "SPACE",
            TokenKind::Cr => "CR",
            TokenKind::Lf => "LF",
            TokenKind::Eof => "EOF",
            TokenKind::Asterisk => "ASTERISK",
            TokenKind::Invalid => "INVALID",
        };
        f.write_str(name)
    }
}

/// A token and the exact text it was lexed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
}

impl Token {
    fn new(kind: TokenKind, literal: impl Into<String>) -> Self {
        Self {
            kind,
            literal: literal.into(),
        }
    }
}

fn is_whitespace(ch: char) -> bool {
    ch == ' ' || ch == '\t'
}

fn is_word(ch: char) -> bool {
    !matches!(ch, '*' | '\r' | '\n' | '\0') && !is_whitespace(ch)
}

/// Splits manifest text into [`Token`]s.
///
/// Once the input is exhausted every further call to [`Lexer::scan`] returns EOF.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
        }
    }

    /// Return the next token.
    pub fn scan(&mut self) -> Token {
        let Some(ch) = self.chars.next() else {
            return Token::new(TokenKind::Eof, EOF_LITERAL);
        };

        if is_whitespace(ch) {
            return self.scan_run(ch, TokenKind::Space, is_whitespace);
        }
        if is_word(ch) {
            return self.scan_run(ch, TokenKind::Word, is_word);
        }

        match ch {
            '*' => Token::new(TokenKind::Asterisk, "*"),
            '\r' => Token::new(TokenKind::Cr, "\r"),
            '\n' => Token::new(TokenKind::Lf, "\n"),
            other => Token::new(TokenKind::Invalid, other.to_string()),
        }
    }

    /// Consume the greedy run of characters accepted by `accept`, starting with `first`.
    fn scan_run(&mut self, first: char, kind: TokenKind, accept: fn(char) -> bool) -> Token {
        let mut literal = String::from(first);
        while let Some(&ch) = self.chars.peek() {
            if !accept(ch) {
                break;
            }
            literal.push(ch);
            self.chars.next();
        }
        Token::new(kind, literal)
    }
}
