use std::io::{self, Write};

use crate::{analyze, tokenize};

/// Optional extra output alongside the success/failure line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Settings {
    pub tokens: bool,
    pub ast: bool,
}

/// Analyzes `source` and writes diagnostics and the verdict to `out`.
/// Returns whether the parse succeeded.
pub fn report<W: Write>(out: &mut W, source: &str, settings: &Settings) -> io::Result<bool> {
    if settings.tokens {
        for token in tokenize(source) {
            writeln!(out, "{:>4}  {}", token.line, token)?;
        }
    }

    let analysis = analyze(source);
    for error in &analysis.lex_errors {
        writeln!(out, "{}", error)?;
    }

    match &analysis.program {
        Ok(program) => {
            writeln!(out, "Parse succeeded")?;
            if settings.ast {
                writeln!(out, "{:#?}", program)?;
            }
        }
        Err(error) => writeln!(out, "Parse failed: {}", error)?,
    }

    Ok(analysis.is_success())
}
