//! A single-pass compiler from Jack classes to stack VM code.
pub mod cli;
pub mod compiler;
pub mod driver;
pub mod emitter;
pub mod error;
pub mod instruction;
pub mod lexer;
pub mod symbol_table;
pub mod token;
pub mod token_stream;
pub mod xml;

pub use compiler::compile;
pub use error::{Error, ErrorKind};
