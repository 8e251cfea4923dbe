//! Front end for a small Kotlin-flavoured statement language.
//!
//! ```text
//! source text → lexer::Lexer → parser::Parser → ast::Program
//! ```
//!
//! Each call owns its own lexer and parser; only the static keyword,
//! symbol and operator tables are shared.

pub mod ast;
pub mod batch;
pub mod cli;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod report;

use ast::Program;
use error::{LexError, SyntaxError};

pub use lexer::tokenize;
pub use parser::parse;

/// Outcome of running both stages over one input.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub program: Result<Program, SyntaxError>,
    pub lex_errors: Vec<LexError>,
}

impl Analysis {
    /// Lexical diagnostics alone do not fail an analysis.
    pub fn is_success(&self) -> bool {
        self.program.is_ok()
    }
}

/// Lexes and parses `source`. The rest of the input is still scanned after
/// a syntax error so every lexical diagnostic is collected.
pub fn analyze(source: &str) -> Analysis {
    let mut lexer = tokenize(source);
    let program = parse(&mut lexer);
    lexer.by_ref().for_each(drop);
    Analysis {
        program,
        lex_errors: lexer.into_errors(),
    }
}
