//! Lexical analysis: source text in, [`Token`]s out.
//!
//! Whitespace and comments produce nothing; the stream always ends with a
//! single `EOF` token, after which the iterator is fused.
//!
//! # Entry points
//!
//! - `Scanner::new(src: &str) -> Scanner<'_>`
//!   Create a new lexer over the input text.
//!
//! - `impl Iterator for Scanner<'a>`
//!   Yields `Result<Token, LoxError>` on each `.next()`.  Errors never stop the
//!   scan: the next call carries on after the offending character.
//!
//! - `Scanner::with_base(src, base)`
//!   Same, with every offset shifted by `base`.
//!
//! - `Scanner::scan_all(reporter)`
//!   Drain the iterator, forwarding every error to the [`Reporter`].
//!
//! # Token Recognition
//!
//! - Two‑character operators (`!=`, `==`, `=>`, `<=`, `>=`, `**`) are tried
//!   before their single‑character prefix.
//! - `/` is either division or the start of a `//` comment.
//! - String literals may span lines; hitting EOF first is an error whose span
//!   covers the whole unterminated run.
//! - Numbers take a fractional part only when a digit follows the `.`, so
//!   `123.` scans as `123` then `.`.
//! - Identifiers and keywords share one path; keywords are told apart by a
//!   perfect‑hash lookup.
//!
//! Comment skipping uses `memchr` to jump straight to the next newline.

use crate::diagnostic::Reporter;
use crate::error::{LoxError, LoxExit, Result, Span};
use crate::token::{Token, TokenType};
use log::{debug, info};
use memchr::memchr;
use phf::phf_map;
use std::iter::FusedIterator;

// Reserved words, looked up by exact bytes.

static KEYWORDS: phf::Map<&'static [u8], TokenType> = phf_map! {
    b"and"    => TokenType::AND,
    b"class"  => TokenType::CLASS,
    b"else"   => TokenType::ELSE,
    b"false"  => TokenType::FALSE,
    b"fun"    => TokenType::FUN,
    b"for"    => TokenType::FOR,
    b"if"     => TokenType::IF,
    b"nil"    => TokenType::NIL,
    b"or"     => TokenType::OR,
    b"print"  => TokenType::PRINT,
    b"return" => TokenType::RETURN,
    b"super"  => TokenType::SUPER,
    b"switch" => TokenType::SWITCH,
    b"this"   => TokenType::THIS,
    b"true"   => TokenType::TRUE,
    b"var"    => TokenType::VAR,
    b"while"  => TokenType::WHILE,
};

/// Streaming lexer over a borrowed source string.
pub struct Scanner<'a> {
    src: &'a str,
    bytes: &'a [u8],
    /// First byte of the lexeme being scanned.
    start: usize,
    /// Next byte to examine.
    curr: usize,
    pending: Option<TokenType>,
    finished: bool,
    /// Added to every offset handed out, for sources that follow others.
    base: usize,
}

impl<'a> Scanner<'a> {
    #[inline]
    pub fn new(src: &'a str) -> Self {
        info!("Scanner created over {} bytes", src.len());

        Self {
            src,
            bytes: src.as_bytes(),
            start: 0,
            curr: 0,
            pending: None,
            finished: false,
            base: 0,
        }
    }

    /// A lexer whose token offsets and error spans start at `base`
    /// instead of 0.
    pub fn with_base(src: &'a str, base: usize) -> Self {
        Self {
            base,
            ..Self::new(src)
        }
    }

    /// Scan the whole input, reporting lexical errors as they are found.
    ///
    /// Lexical errors are not fatal, so the token list is always complete;
    /// the caller decides whether to continue via [`Reporter::checkpoint`].
    pub fn scan_all(self, reporter: &mut Reporter) -> std::result::Result<Vec<Token>, LoxExit> {
        let mut tokens: Vec<Token> = Vec::new();

        for item in self {
            match item {
                Ok(token) => tokens.push(token),
                Err(e) => reporter.report(e)?,
            }
        }

        info!("Scanned {} tokens", tokens.len());

        Ok(tokens)
    }

    // ───────────────────────────── primitive helpers ────────────────────────

    #[inline(always)]
    const fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.curr >= self.len()
    }

    /// Advance one byte and return it.  Callers guard with [`is_at_end`].
    #[inline(always)]
    fn advance(&mut self) -> u8 {
        let b = self.bytes[self.curr];
        self.curr += 1;
        b
    }

    /// Peek at the current byte without consuming it.  Returns `0` past EOF.
    #[inline(always)]
    fn peek(&self) -> u8 {
        if self.is_at_end() {
            0
        } else {
            self.bytes[self.curr]
        }
    }

    /// Peek one byte beyond [`peek`].  Safe at EOF.
    #[inline(always)]
    fn peek_next(&self) -> u8 {
        if self.curr + 1 >= self.len() {
            0
        } else {
            self.bytes[self.curr + 1]
        }
    }

    /// The (possibly multi‑byte) character starting at `at`.
    #[inline]
    fn char_at(&self, at: usize) -> Option<char> {
        self.src.get(at..).and_then(|rest| rest.chars().next())
    }

    #[inline(always)]
    fn match_byte(&mut self, expected: u8) -> bool {
        if !self.is_at_end() && self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    /// `long` if the next byte is `second` (consuming it), `short` otherwise.
    #[inline]
    fn either(&mut self, second: u8, long: TokenType, short: TokenType) -> TokenType {
        if self.match_byte(second) {
            long
        } else {
            short
        }
    }

    // ───────────────────────────── lexemes ───────────────────────────────────

    /// Consume one lexeme. Leaves `pending` empty for whitespace and comments.
    fn scan_token(&mut self) -> Result<()> {
        let b = self.advance();

        match b {
            // ── punctuation ──────────────────────────────────────────────
            b'(' => self.pending = Some(TokenType::LEFT_PAREN),
            b')' => self.pending = Some(TokenType::RIGHT_PAREN),
            b'{' => self.pending = Some(TokenType::LEFT_BRACE),
            b'}' => self.pending = Some(TokenType::RIGHT_BRACE),
            b',' => self.pending = Some(TokenType::COMMA),
            b'.' => self.pending = Some(TokenType::DOT),
            b'-' => self.pending = Some(TokenType::MINUS),
            b'+' => self.pending = Some(TokenType::PLUS),
            b';' => self.pending = Some(TokenType::SEMICOLON),
            b':' => self.pending = Some(TokenType::COLON),
            b'?' => self.pending = Some(TokenType::QUESTION),

            // ── one or two characters ────────────────────────────────────
            b'*' => self.pending = Some(self.either(b'*', TokenType::STAR_STAR, TokenType::STAR)),
            b'!' => self.pending = Some(self.either(b'=', TokenType::BANG_EQUAL, TokenType::BANG)),
            b'<' => self.pending = Some(self.either(b'=', TokenType::LESS_EQUAL, TokenType::LESS)),
            b'>' => {
                self.pending = Some(self.either(b'=', TokenType::GREATER_EQUAL, TokenType::GREATER))
            }
            b'=' => {
                let tt = if self.match_byte(b'>') {
                    TokenType::EQUAL_GREATER
                } else {
                    self.either(b'=', TokenType::EQUAL_EQUAL, TokenType::EQUAL)
                };

                self.pending = Some(tt);
            }

            // ── whitespace ───────────────────────────────────────────────
            b' ' | b'\r' | b'\t' | b'\n' => {
                return Ok(());
            }

            // ── `//` comment or division ─────────────────────────────────
            b'/' => {
                if self.match_byte(b'/') {
                    if let Some(pos) = memchr(b'\n', &self.bytes[self.curr..]) {
                        self.curr += pos;
                    } else {
                        self.curr = self.len();
                    }

                    return Ok(());
                }

                self.pending = Some(TokenType::SLASH);
            }

            b'"' => {
                return self.parse_string();
            }

            b'0'..=b'9' => {
                self.parse_number();
            }

            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                self.parse_identifier();
            }

            // ── non‑ASCII: decode the whole character first ──────────────
            0x80..=0xFF => {
                let ch: char = self.char_at(self.start).unwrap_or(char::REPLACEMENT_CHARACTER);
                self.curr = self.start + ch.len_utf8();

                if ch.is_alphabetic() {
                    self.parse_identifier();
                } else if ch.is_whitespace() {
                    return Ok(());
                } else {
                    return Err(self.unexpected(ch));
                }
            }

            _ => {
                return Err(self.unexpected(b as char));
            }
        }

        Ok(())
    }

    fn unexpected(&self, ch: char) -> LoxError {
        LoxError::lex(
            Span::new(self.base + self.start, ch.len_utf8()),
            format!("Unexpected character '{}'.", ch),
        )
    }

    /// Entered just after the opening quote; newlines are allowed inside.
    fn parse_string(&mut self) -> Result<()> {
        match memchr(b'"', &self.bytes[self.curr..]) {
            Some(pos) => self.curr += pos,
            None => self.curr = self.len(),
        }

        if self.is_at_end() {
            return Err(LoxError::lex(
                Span::new(self.base + self.start, self.curr - self.start),
                "Unterminated string.",
            ));
        }

        self.advance();

        let contents: &str = &self.src[self.start + 1..self.curr - 1];
        self.pending = Some(TokenType::STRING(contents.to_owned()));

        Ok(())
    }

    fn parse_number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.advance();

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let s: &str = &self.src[self.start..self.curr];
        // Digits with at most one interior '.', always a valid f64.
        self.pending = Some(TokenType::NUMBER(s.parse::<f64>().unwrap_or(0.0)));
    }

    /// Letters, digits and `_`, Unicode alphanumerics included.
    fn parse_identifier(&mut self) {
        loop {
            let c: u8 = self.peek();

            if c.is_ascii_alphanumeric() || c == b'_' {
                self.advance();
            } else if c >= 0x80 {
                match self.char_at(self.curr) {
                    Some(ch) if ch.is_alphanumeric() => self.curr += ch.len_utf8(),
                    _ => break,
                }
            } else {
                break;
            }
        }

        let word: &[u8] = &self.bytes[self.start..self.curr];
        self.pending = Some(KEYWORDS.get(word).cloned().unwrap_or(TokenType::IDENTIFIER));
    }
}

// ───────────────────────────── iteration ─────────────────────────────────────

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            if self.is_at_end() {
                self.finished = true;
                return Some(Ok(Token::new(TokenType::EOF, "", self.base + self.len())));
            }

            self.start = self.curr;
            self.pending = None;

            if let Err(e) = self.scan_token() {
                return Some(Err(e));
            }

            let Some(tt) = self.pending.take() else {
                continue;
            };

            debug!("Scanned token ({:?}) ending at {}", tt, self.curr);
            return Some(Ok(Token::new(tt, &self.src[self.start..self.curr], self.base + self.curr)));
        }

        None
    }
}

impl<'a> FusedIterator for Scanner<'a> {}
