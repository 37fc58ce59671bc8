//! Run‑time switches for one interpreter session.
//!
//! The binary fills a [`Config`] from its command line; library callers build
//! one directly (usually from [`Config::default`]).

use serde::Serialize;

use crate::diagnostic::ReportStyle;

/// Lox calls nested deeper than this fail with a runtime error.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1000;

/// Encoding used for the token and AST dumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum DumpFormat {
    /// Tokens one per line, AST as S‑expressions.
    #[default]
    Text,

    /// One JSON document per dump (`serde_json`).
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    pub dump_tokens: bool,
    pub dump_ast: bool,
    pub stop_after_parse: bool,
    pub stop_after_resolve: bool,

    /// One‑line diagnostics instead of the source excerpt with carets.
    pub reduced_errors: bool,

    /// Print a native backtrace when the interpreter itself crashes.
    pub backtrace: bool,

    pub dump_format: DumpFormat,
    pub max_call_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dump_tokens: false,
            dump_ast: false,
            stop_after_parse: false,
            stop_after_resolve: false,
            reduced_errors: false,
            backtrace: false,
            dump_format: DumpFormat::Text,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

impl Config {
    pub fn report_style(&self) -> ReportStyle {
        if self.reduced_errors {
            ReportStyle::Reduced
        } else {
            ReportStyle::Full
        }
    }
}
