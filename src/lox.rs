//! The session driver: runs source text through scan → parse → resolve →
//! interpret, checking the [`Reporter`] between stages.
//!
//! A [`Lox`] value is one session.  Globals, slot bindings, the node id
//! counter and every run's source text persist across [`Lox::run`] calls,
//! which is what the REPL relies on.

use std::io::{self, Write};

use log::{debug, info};

use crate::ast::{NodeId, Stmt};
use crate::ast_printer::Ast;
use crate::config::{Config, DumpFormat};
use crate::diagnostic::Reporter;
use crate::error::{LoxError, LoxExit};
use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::Scanner;
use crate::token::Token;

pub struct Lox {
    config: Config,
    reporter: Reporter,
    interpreter: Interpreter,
    next_node: u32,
}

impl Lox {
    /// A session printing to stdout and reporting to stderr.
    pub fn new(config: Config) -> Self {
        Self::with_io(config, Box::new(io::stdout()), Box::new(io::stderr()))
    }

    /// A session with program output (and dumps) going to `out`, diagnostics
    /// to `err`.
    pub fn with_io(config: Config, out: Box<dyn Write>, err: Box<dyn Write>) -> Self {
        info!("Starting session: {:?}", config);

        let reporter = Reporter::with_sink(config.report_style(), err);
        let interpreter = Interpreter::new(&config, out);

        Self {
            config,
            reporter,
            interpreter,
            next_node: 0,
        }
    }

    /// Run one source text.  `Err` carries the exit status when the run was
    /// stopped by errors; they have already been reported.
    pub fn run(&mut self, source: &str) -> Result<(), LoxExit> {
        let source = source.replace("\r\n", "\n");
        debug!("Running source:\n{}", source);

        let base = self.reporter.add_source(&source);

        let tokens: Vec<Token> = Scanner::with_base(&source, base).scan_all(&mut self.reporter)?;
        if self.config.dump_tokens {
            self.dump_tokens(&tokens)?;
        }
        self.reporter.checkpoint()?;

        let first_node = self.next_node;
        let mut parser = Parser::new(tokens).starting_at(first_node);
        let parsed = parser.parse(&mut self.reporter);
        self.next_node = parser.next_id();

        let statements: Vec<Stmt> = parsed?;
        if self.config.dump_ast {
            self.dump_ast(&statements)?;
        }
        self.reporter.checkpoint()?;

        if self.config.stop_after_parse {
            info!("Stopping after parse");
            return Ok(());
        }

        let bindings = self.interpreter.bindings_mut();
        let resolved = Resolver::new(bindings).resolve(&statements);
        if let Err(e) = resolved {
            bindings.forget_from(NodeId(first_node));
            debug!("Resolution failed; {} binding(s) kept", bindings.len());
            self.reporter.report(e)?;
        }
        self.reporter.checkpoint()?;

        if self.config.stop_after_resolve {
            info!("Stopping after resolve");
            return Ok(());
        }

        if let Err(e) = self.interpreter.interpret(&statements) {
            self.reporter.report(e)?;
        }
        self.reporter.checkpoint()
    }

    /// Forget local frames left behind by an abandoned run.  Globals stay.
    pub fn reset_scopes(&mut self) {
        self.interpreter.reset_scopes();
    }

    fn dump_tokens(&mut self, tokens: &[Token]) -> Result<(), LoxExit> {
        let text: String = match self.config.dump_format {
            DumpFormat::Text => tokens.iter().map(|t| format!("{}\n", t)).collect(),
            DumpFormat::Json => match serde_json::to_string_pretty(tokens) {
                Ok(json) => json + "\n",
                Err(e) => return self.reporter.report(LoxError::Io(e.into())),
            },
        };

        self.write_dump(&text)
    }

    fn dump_ast(&mut self, statements: &[Stmt]) -> Result<(), LoxExit> {
        let text: String = match self.config.dump_format {
            DumpFormat::Text => {
                let printer = Ast;
                statements
                    .iter()
                    .map(|s| format!("{}\n", printer.print_stmt(s)))
                    .collect()
            }
            DumpFormat::Json => match serde_json::to_string_pretty(statements) {
                Ok(json) => json + "\n",
                Err(e) => return self.reporter.report(LoxError::Io(e.into())),
            },
        };

        self.write_dump(&text)
    }

    fn write_dump(&mut self, text: &str) -> Result<(), LoxExit> {
        let out = self.interpreter.output();

        if let Err(e) = out.write_all(text.as_bytes()).and_then(|_| out.flush()) {
            return self.reporter.report(LoxError::Io(e));
        }

        Ok(())
    }
}
