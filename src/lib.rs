pub mod ast;
pub mod ast_printer;
pub mod config;
pub mod diagnostic;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod lox;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod stack;
pub mod token;
pub mod value;

pub use crate::config::Config;
pub use crate::error::{LoxError, LoxExit};
pub use crate::lox::Lox;
