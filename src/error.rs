use thiserror::Error;

use crate::lexer::{Token, TokenKind};

/// Lexical diagnostics. None of these stop the scan.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("Illegal character '{ch}' at line {line}")]
    IllegalCharacter { ch: char, line: usize },
    #[error("Unterminated string literal at line {line}")]
    UnterminatedString { line: usize },
    #[error("Integer literal '{lexeme}' out of range at line {line}")]
    IntegerOutOfRange { lexeme: String, line: usize },
}

/// The first token the grammar could not accept. Parsing stops here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyntaxError {
    #[error("Syntax error at token {kind}, value '{value}' on line {line}")]
    UnexpectedToken {
        kind: TokenKind,
        value: String,
        line: usize,
    },
    #[error("Syntax error: unexpected end of input")]
    UnexpectedEof,
    #[error("Syntax error: nesting deeper than {limit} levels on line {line}")]
    NestingTooDeep { limit: usize, line: usize },
}

impl SyntaxError {
    pub fn unexpected(token: &Token) -> Self {
        SyntaxError::UnexpectedToken {
            kind: token.kind,
            value: token.value(),
            line: token.line,
        }
    }
}
