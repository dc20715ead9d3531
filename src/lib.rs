pub mod ast;
pub mod buffer;
pub mod config;
pub mod context;
pub mod environment;
pub mod error;
pub mod executor;
pub mod expander;
pub mod io;
pub mod parser;
pub mod prompt;
pub mod repl;
pub mod signals;
pub mod tokenizer;
