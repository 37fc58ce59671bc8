#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use loxwalk::{Config, Lox, LoxExit};

/// In-memory sink that stays readable after being boxed into a session.
#[derive(Clone, Default)]
pub struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl SharedBuf {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub struct Session {
    pub lox: Lox,
    pub out: SharedBuf,
    pub err: SharedBuf,
}

impl Session {
    /// A session with one-line diagnostics.
    pub fn new() -> Self {
        Self::with_config(Config {
            reduced_errors: true,
            ..Config::default()
        })
    }

    pub fn with_config(config: Config) -> Self {
        let out = SharedBuf::default();
        let err = SharedBuf::default();
        let lox = Lox::with_io(config, Box::new(out.clone()), Box::new(err.clone()));

        Self { lox, out, err }
    }

    pub fn run(&mut self, source: &str) -> Result<(), LoxExit> {
        self.lox.run(source)
    }

    pub fn stdout(&self) -> String {
        self.out.contents()
    }

    pub fn stderr(&self) -> String {
        self.err.contents()
    }
}

/// Run `source` in a fresh session: (stdout, stderr, outcome).
pub fn run(source: &str) -> (String, String, Result<(), LoxExit>) {
    let mut session = Session::new();
    let outcome = session.run(source);

    (session.stdout(), session.stderr(), outcome)
}

/// stdout of a run that must succeed.
pub fn output_of(source: &str) -> String {
    let (out, err, outcome) = run(source);
    assert!(outcome.is_ok(), "run failed: {}", err);
    out
}
