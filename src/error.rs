//! Centralised error hierarchy for the **Lox interpreter**.
//!
//! All subsystems (scanner, parser, resolver, runtime) convert their internal
//! failure modes into one of the variants defined here.  Every Lox-level
//! variant carries a [`Span`] into the source so the [`Reporter`] can underline
//! the offending text.
//!
//! The module **does not** print diagnostics itself; rendering lives in
//! [`crate::diagnostic`].
//!
//! [`Reporter`]: crate::diagnostic::Reporter

use std::io;

use log::info;
use serde::Serialize;
use thiserror::Error;

use crate::token::Token;

/// Byte range of the source text an error points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    /// Byte offset of the first marked character.
    pub start: usize,

    /// Length of the marker, in bytes.  Never zero.
    pub len: usize,
}

impl Span {
    pub fn new(start: usize, len: usize) -> Self {
        Self {
            start,
            len: len.max(1),
        }
    }

    /// Span covering a token's lexeme.  Tokens store the offset of the *end*
    /// of their lexeme, so the start is recovered from the lexeme length.
    pub fn of_token(token: &Token) -> Self {
        let len = token.lexeme.len();

        Self::new(token.offset.saturating_sub(len), len)
    }
}

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoxError {
    /// Lexical (scanner) error.  Never fatal: scanning carries on.
    #[error("{message}")]
    Lex { message: String, span: Span },

    /// Syntactic (parser) error.  Fatal only for errors the parser cannot
    /// recover from meaningfully.
    #[error("{message}")]
    Parse {
        message: String,
        span: Span,
        fatal: bool,
    },

    /// Static‑analysis failure found by the resolver.
    #[error("{message}")]
    Resolve { message: String, span: Span },

    /// Runtime evaluation error.
    #[error("{message}")]
    Runtime { message: String, span: Span },

    /// Wrapper around `std::io::Error` (transparent).  Raised when program
    /// output cannot be written.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl LoxError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(span: Span, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: span={:?}, msg={}", span, message);

        LoxError::Lex { message, span }
    }

    /// Helper constructor for the **parser**.
    pub fn parse<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Parse error: at={}, msg={}", token.lexeme, message);

        LoxError::Parse {
            message,
            span: Span::of_token(token),
            fatal: false,
        }
    }

    /// A parse error that halts the run as soon as it is reported.
    pub fn fatal_parse<S: Into<String>>(token: &Token, msg: S) -> Self {
        match Self::parse(token, msg) {
            LoxError::Parse { message, span, .. } => LoxError::Parse {
                message,
                span,
                fatal: true,
            },
            other => other,
        }
    }

    /// Helper constructor for the **resolver**.
    pub fn resolve<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Resolve error: at={}, msg={}", token.lexeme, message);

        LoxError::Resolve {
            message,
            span: Span::of_token(token),
        }
    }

    /// Helper constructor for the **interpreter**.
    pub fn runtime<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Runtime error: at={}, msg={}", token.lexeme, message);

        LoxError::Runtime {
            message,
            span: Span::of_token(token),
        }
    }

    /// Whether reporting this error must stop the current run immediately.
    pub fn is_fatal(&self) -> bool {
        match self {
            LoxError::Lex { .. } => false,
            LoxError::Parse { fatal, .. } => *fatal,
            LoxError::Resolve { .. } | LoxError::Runtime { .. } | LoxError::Io(_) => true,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            LoxError::Lex { span, .. }
            | LoxError::Parse { span, .. }
            | LoxError::Resolve { span, .. }
            | LoxError::Runtime { span, .. } => Some(*span),
            LoxError::Io(_) => None,
        }
    }

    /// Name printed in front of the message.
    pub fn kind_name(&self) -> &'static str {
        match self {
            LoxError::Lex { .. } => "LexicalError",
            LoxError::Parse { .. } => "SyntaxError",
            LoxError::Resolve { .. } => "ResolutionError",
            LoxError::Runtime { .. } => "RuntimeError",
            LoxError::Io(_) => "IoError",
        }
    }

    pub fn is_runtime(&self) -> bool {
        matches!(self, LoxError::Runtime { .. } | LoxError::Io(_))
    }
}

/// Exit status for a run that failed on static (scan/parse/resolve) errors.
pub const EXIT_STATIC_ERROR: i32 = 65;

/// Exit status for a run that failed at runtime.
pub const EXIT_RUNTIME_ERROR: i32 = 70;

/// The "exit with error" signal.  Returned by the [`Reporter`] when a run must
/// stop; the REPL catches it and moves on to the next line.
///
/// [`Reporter`]: crate::diagnostic::Reporter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("run halted after {errors} error(s)")]
pub struct LoxExit {
    /// Number of errors reported during the run.
    pub errors: usize,

    /// Process exit status a batch runner should use.
    pub status: i32,
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, LoxError>;
