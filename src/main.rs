use std::backtrace::Backtrace;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::ValueEnum;
use env_logger::Builder;
use log::{debug, info};

use loxwalk::config::{Config, DumpFormat};
use loxwalk::error::{LoxExit, EXIT_RUNTIME_ERROR};
use loxwalk::Lox;

const PROMPT: &str = ">>> ";

#[derive(ClapParser, Debug)]
#[command(version, about = "Tree-walking Lox interpreter", long_about = None)]
pub struct Cli {
    /// Script to run.  Without it (and without -c) an interactive prompt starts
    filename: Option<PathBuf>,

    /// Run SOURCE instead of a file
    #[arg(short = 'c', value_name = "SOURCE", conflicts_with = "filename")]
    command: Option<String>,

    /// Debugging aid, may be repeated
    #[arg(long = "dbg", value_enum, value_name = "OPTION")]
    dbg: Vec<DebugOption>,

    /// Encoding of the token and AST dumps
    #[arg(long, value_enum, default_value_t = DumpFormatArg::Text)]
    dump_format: DumpFormatArg,

    /// Enable logging to app.log
    #[arg(long)]
    log: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum DebugOption {
    /// Print every token before parsing
    DumpTokens,
    /// Print the syntax tree before resolving
    DumpAst,
    StopAfterParse,
    StopAfterResolve,
    /// One-line diagnostics
    ReducedErrors,
    /// Native backtrace on internal errors
    Backtrace,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum DumpFormatArg {
    Text,
    Json,
}

impl Cli {
    fn config(&self) -> Config {
        let has = |option: DebugOption| self.dbg.contains(&option);

        Config {
            dump_tokens: has(DebugOption::DumpTokens),
            dump_ast: has(DebugOption::DumpAst),
            stop_after_parse: has(DebugOption::StopAfterParse),
            stop_after_resolve: has(DebugOption::StopAfterResolve),
            reduced_errors: has(DebugOption::ReducedErrors),
            backtrace: has(DebugOption::Backtrace),
            dump_format: match self.dump_format {
                DumpFormatArg::Text => DumpFormat::Text,
                DumpFormatArg::Json => DumpFormat::Json,
            },
            ..Config::default()
        }
    }
}

/// Reads the contents of a file as UTF-8 text
fn read_file(filename: &Path) -> Result<String> {
    info!("Reading file: {:?}", filename);
    let file = File::open(filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = String::new();

    let bytes = reader
        .read_to_string(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    Ok(buf)
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    Builder::new()
        .format(|buf, record| {
            let module = record.module_path().unwrap_or("<unnamed>");
            let module = module.strip_prefix("loxwalk::").unwrap_or(module);
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug)
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

/// Internal faults are reported apart from Lox errors.
fn install_panic_hook(backtrace: bool) {
    panic::set_hook(Box::new(move |info| {
        eprintln!("loxwalk crashed due to an internal error: {}", info);

        if backtrace {
            eprintln!("{}", Backtrace::force_capture());
        } else {
            eprintln!("(run with --dbg backtrace for a native backtrace)");
        }
    }));
}

enum Outcome {
    Completed,
    Failed(LoxExit),
    Crashed,
}

fn run_guarded(lox: &mut Lox, source: &str) -> Outcome {
    match panic::catch_unwind(AssertUnwindSafe(|| lox.run(source))) {
        Ok(Ok(())) => Outcome::Completed,
        Ok(Err(exit)) => Outcome::Failed(exit),
        Err(_) => Outcome::Crashed,
    }
}

fn repl(lox: &mut Lox) -> Result<()> {
    info!("Starting REPL");

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut line = String::new();

    loop {
        print!("{}", PROMPT);
        io::stdout().flush().context("Failed to flush stdout")?;

        line.clear();
        let read = input
            .read_line(&mut line)
            .context("Failed to read from stdin")?;

        if read == 0 {
            println!();
            info!("REPL reached end of input");
            return Ok(());
        }

        match run_guarded(lox, &line) {
            Outcome::Completed => {}
            Outcome::Failed(exit) => debug!("Line failed: {}", exit),
            Outcome::Crashed => lox.reset_scopes(),
        }
    }
}

fn main() -> Result<ExitCode> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger()?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    let config = args.config();
    install_panic_hook(config.backtrace);

    let mut lox = Lox::new(config);

    let source = match (&args.command, &args.filename) {
        (Some(source), _) => source.clone(),
        (None, Some(filename)) => read_file(filename)?,
        (None, None) => {
            repl(&mut lox)?;
            return Ok(ExitCode::SUCCESS);
        }
    };

    let code = match run_guarded(&mut lox, &source) {
        Outcome::Completed => ExitCode::SUCCESS,
        Outcome::Failed(exit) => {
            debug!("Run failed: {}", exit);
            ExitCode::from(exit.status as u8)
        }
        Outcome::Crashed => ExitCode::from(EXIT_RUNTIME_ERROR as u8),
    };

    Ok(code)
}
