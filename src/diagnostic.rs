//! Error reporting collaborator.
//!
//! Every stage hands its [`LoxError`]s to a [`Reporter`], which renders them
//! against the current source text and decides whether the run has to stop.

use std::io::Write;

use log::{debug, info};
use memchr::{memchr, memchr_iter, memrchr};

use crate::error::{LoxError, LoxExit, Span, EXIT_RUNTIME_ERROR, EXIT_STATIC_ERROR};

const LINE_NUMBER_SEPARATOR: &str = " | ";
const ERROR_MARKER: char = '^';

/// How much context a diagnostic shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportStyle {
    /// Offending line, caret underline and message.
    #[default]
    Full,

    /// One line: `[line N] Kind at 'lexeme': message`.
    Reduced,
}

/// Where a byte offset lands in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location<'s> {
    /// 1‑indexed line number.
    pub line: usize,

    /// Character column of the span start within `text`.
    pub column: usize,

    /// Text of the whole line, without its newline.
    pub text: &'s str,
}

/// Find the line containing `offset`.  Offsets past the end land on the last line.
pub fn locate(source: &str, offset: usize) -> Location<'_> {
    let bytes = source.as_bytes();
    let offset = offset.min(bytes.len());

    let line = memchr_iter(b'\n', &bytes[..offset]).count() + 1;
    let line_start = memrchr(b'\n', &bytes[..offset]).map_or(0, |p| p + 1);
    let line_end = memchr(b'\n', &bytes[offset..]).map_or(bytes.len(), |p| offset + p);

    let text = source.get(line_start..line_end).unwrap_or("");
    let column = source
        .get(line_start..offset)
        .map_or(offset - line_start, |prefix| prefix.chars().count());

    Location { line, column, text }
}

/// One run's source text and the session offset its first byte lives at.
struct SourceText {
    base: usize,
    text: String,
}

/// Collects and renders errors for one run at a time.
///
/// Earlier sources stay available, so an error raised by code from a previous
/// run is still shown against the text it came from.
pub struct Reporter {
    sources: Vec<SourceText>,
    style: ReportStyle,
    sink: Box<dyn Write>,
    errors: usize,
    runtime_failure: bool,
}

impl Reporter {
    pub fn with_sink(style: ReportStyle, sink: Box<dyn Write>) -> Self {
        Self {
            sources: Vec::new(),
            style,
            sink,
            errors: 0,
            runtime_failure: false,
        }
    }

    /// Start a new run over `source` alone, forgetting earlier sources.
    /// Spans are offsets into `source`.
    pub fn set_source(&mut self, source: &str) {
        self.sources.clear();
        self.add_source(source);
    }

    /// Start a new run over `source`, keeping earlier sources for rendering.
    /// Returns the session offset of `source`'s first byte; spans of this run
    /// must be shifted by it (see [`Scanner::with_base`]).
    ///
    /// [`Scanner::with_base`]: crate::scanner::Scanner::with_base
    pub fn add_source(&mut self, source: &str) -> usize {
        // One byte of gap keeps an end-of-input offset inside its own run.
        let base = self
            .sources
            .last()
            .map_or(0, |last| last.base + last.text.len() + 1);

        self.sources.push(SourceText {
            base,
            text: source.to_owned(),
        });
        self.errors = 0;
        self.runtime_failure = false;

        base
    }

    /// The run text containing session offset `at`, and `at` relative to it.
    fn source_at(&self, at: usize) -> (&str, usize) {
        self.sources
            .iter()
            .rev()
            .find(|source| source.base <= at)
            .map_or(("", 0), |source| (source.text.as_str(), at - source.base))
    }

    pub fn had_error(&self) -> bool {
        self.errors > 0
    }

    pub fn error_count(&self) -> usize {
        self.errors
    }

    /// Render `error` and record it.  Returns the exit signal iff the error is fatal.
    pub fn report(&mut self, error: LoxError) -> Result<(), LoxExit> {
        debug!("Reporting {}: {}", error.kind_name(), error);

        self.errors += 1;
        self.runtime_failure |= error.is_runtime();

        let rendered = self.render(&error);
        if let Err(e) = self.sink.write_all(rendered.as_bytes()) {
            info!("Failed to write diagnostic: {}", e);
        }

        if error.is_fatal() {
            return Err(self.exit());
        }

        Ok(())
    }

    /// Exit if any error has been reported since the last [`set_source`].
    ///
    /// [`set_source`]: Reporter::set_source
    pub fn checkpoint(&self) -> Result<(), LoxExit> {
        if self.had_error() {
            return Err(self.exit());
        }

        Ok(())
    }

    fn exit(&self) -> LoxExit {
        LoxExit {
            errors: self.errors,
            status: if self.runtime_failure {
                EXIT_RUNTIME_ERROR
            } else {
                EXIT_STATIC_ERROR
            },
        }
    }

    /// Format a diagnostic without recording it.
    pub fn render(&self, error: &LoxError) -> String {
        let Some(span) = error.span() else {
            return format!("{}: {}\n", error.kind_name(), error);
        };

        match self.style {
            ReportStyle::Full => self.render_full(error, span),
            ReportStyle::Reduced => self.render_reduced(error, span),
        }
    }

    fn render_full(&self, error: &LoxError, span: Span) -> String {
        let (source, start) = self.source_at(span.start);
        let loc = locate(source, start);
        let marker_len = source
            .get(start..start + span.len)
            .map_or(1, |s| s.chars().count().max(1));

        let gutter = loc.line.to_string().len() + LINE_NUMBER_SEPARATOR.len();
        let spacer = " ".repeat(gutter + loc.column);
        let marker: String = std::iter::repeat(ERROR_MARKER).take(marker_len).collect();

        format!(
            "\n\t{}{}{}\n\t{}{}\n{}: Line {}: {}\n",
            loc.line,
            LINE_NUMBER_SEPARATOR,
            loc.text,
            spacer,
            marker,
            error.kind_name(),
            loc.line,
            error
        )
    }

    fn render_reduced(&self, error: &LoxError, span: Span) -> String {
        let (source, start) = self.source_at(span.start);
        let loc = locate(source, start);

        let at = match source.get(start..start + span.len) {
            Some(lexeme) if !lexeme.is_empty() => format!("'{}'", lexeme),
            _ => "end".to_string(),
        };

        format!(
            "[line {}] {} at {}: {}\n",
            loc.line,
            error.kind_name(),
            at,
            error
        )
    }
}
