use std::fmt;

use tracing::debug;

use crate::error::LexError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    Identifier,
    Int,
    Float,
    String,

    // Keywords
    Val,
    Var,
    If,
    Else,
    Println,

    // Operators
    Assign,    // =
    Plus,      // +
    Minus,     // -
    Times,     // *
    Divide,    // /
    EqEq,      // ==
    Greater,   // >
    Less,      // <

    // Delimiters
    LeftParen,  // (
    RightParen, // )
    SemiColon,  // ;
    LeftBrace,  // {
    RightBrace, // }
}

impl TokenKind {
    /// Source spelling of keywords and symbols.
    pub fn spelling(self) -> Option<&'static str> {
        KEYWORDS
            .iter()
            .chain(SYMBOLS.iter())
            .find(|(_, kind)| *kind == self)
            .map(|(text, _)| *text)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Identifier => "IDENT",
            TokenKind::Int => "INT",
            TokenKind::Float => "FLOAT",
            TokenKind::String => "STRING",
            TokenKind::Val => "VAL",
            TokenKind::Var => "VAR",
            TokenKind::If => "IF",
            TokenKind::Else => "ELSE",
            TokenKind::Println => "PRINTLN",
            TokenKind::Assign => "EQ",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Times => "TIMES",
            TokenKind::Divide => "DIVIDE",
            TokenKind::EqEq => "EQEQ",
            TokenKind::Greater => "GT",
            TokenKind::Less => "LT",
            TokenKind::LeftParen => "LPAREN",
            TokenKind::RightParen => "RPAREN",
            TokenKind::SemiColon => "SEMICOLON",
            TokenKind::LeftBrace => "LBRACE",
            TokenKind::RightBrace => "RBRACE",
        };
        f.write_str(name)
    }
}

/// Reserved words. Only consulted after a full identifier has been read,
/// so `valid` stays one identifier.
const KEYWORDS: &[(&str, TokenKind)] = &[
    ("val", TokenKind::Val),
    ("var", TokenKind::Var),
    ("if", TokenKind::If),
    ("else", TokenKind::Else),
    ("println", TokenKind::Println),
];

/// Symbols in priority order: longer spellings first.
const SYMBOLS: &[(&str, TokenKind)] = &[
    ("==", TokenKind::EqEq),
    ("=", TokenKind::Assign),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Times),
    ("/", TokenKind::Divide),
    ("(", TokenKind::LeftParen),
    (")", TokenKind::RightParen),
    (";", TokenKind::SemiColon),
    ("{", TokenKind::LeftBrace),
    ("}", TokenKind::RightBrace),
    (">", TokenKind::Greater),
    ("<", TokenKind::Less),
];

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(i) => write!(f, "{}", i),
            Literal::Float(fl) => write!(f, "{:?}", fl),
            Literal::Text(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: Option<Literal>,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize) -> Self {
        Token {
            kind,
            literal: None,
            line,
        }
    }

    pub fn with_literal(kind: TokenKind, literal: Literal, line: usize) -> Self {
        Token {
            kind,
            literal: Some(literal),
            line,
        }
    }

    /// The lexeme as shown in diagnostics.
    pub fn value(&self) -> String {
        match (&self.literal, self.kind) {
            (Some(Literal::Text(s)), TokenKind::String) => format!("\"{}\"", s),
            (Some(literal), _) => literal.to_string(),
            (None, kind) => kind.spelling().unwrap_or_default().to_string(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Identifier | TokenKind::Int | TokenKind::Float | TokenKind::String => {
                write!(f, "{}({})", self.kind, self.value())
            }
            _ => write!(f, "{}", self.kind),
        }
    }
}

fn is_numeric(c: char) -> bool {
    c.is_ascii_digit()
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_alphanumeric(c: char) -> bool {
    is_identifier_start(c) || is_numeric(c)
}

/// Single-pass scanner over one source text. Tokens are produced lazily
/// through `Iterator`; diagnostics accumulate in `errors`.
#[derive(Debug)]
pub struct Lexer {
    input: Vec<char>,
    cur: usize,
    next_cur: usize,
    ch: char,
    line: usize,
    errors: Vec<LexError>,
}

pub fn tokenize(source: &str) -> Lexer {
    Lexer::new(source)
}

impl Lexer {
    pub fn new(input: &str) -> Lexer {
        let mut lexer = Lexer {
            input: input.chars().collect(),
            cur: 0,
            next_cur: 0,
            ch: '\0',
            line: 1,
            errors: Vec::new(),
        };
        lexer.read();
        lexer
    }

    pub fn errors(&self) -> &[LexError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<LexError> {
        self.errors
    }

    fn read(&mut self) {
        if self.next_cur >= self.input.len() {
            self.ch = '\0';
        } else {
            self.ch = self.input[self.next_cur];
        }
        self.cur = self.next_cur;
        self.next_cur += 1;
    }

    fn peek(&self) -> char {
        self.input.get(self.next_cur).copied().unwrap_or('\0')
    }

    fn is_at_end(&self) -> bool {
        self.cur >= self.input.len()
    }

    fn starts_with(&self, pattern: &str) -> bool {
        let mut rest = self.input[self.cur..].iter();
        pattern.chars().all(|c| rest.next() == Some(&c))
    }

    fn slice(&self, start: usize) -> String {
        self.input[start..self.cur].iter().collect()
    }

    fn report(&mut self, error: LexError) {
        debug!(%error, "lexical error");
        self.errors.push(error);
    }

    /// Whitespace, newlines and `//` comments.
    fn skip_trivia(&mut self) {
        while !self.is_at_end() {
            match self.ch {
                ' ' | '\t' => self.read(),
                '\n' => {
                    self.line += 1;
                    self.read();
                }
                '/' if self.peek() == '/' => {
                    while !self.is_at_end() && self.ch != '\n' {
                        self.read();
                    }
                }
                _ => break,
            }
        }
    }

    fn read_string(&mut self) -> Option<Token> {
        let line = self.line;
        // Consume the opening double quote.
        self.read();
        let start = self.cur;
        while !self.is_at_end() && self.ch != '"' && self.ch != '\n' {
            self.read();
        }

        if self.ch == '"' {
            let text = self.slice(start);
            self.read();
            Some(Token::with_literal(TokenKind::String, Literal::Text(text), line))
        } else {
            // The rest of the line has already been consumed.
            self.report(LexError::UnterminatedString { line });
            None
        }
    }

    fn read_number(&mut self) -> Option<Token> {
        let start = self.cur;
        while is_numeric(self.ch) {
            self.read();
        }

        // A '.' only belongs to the number when digits follow it.
        if self.ch == '.' && is_numeric(self.peek()) {
            self.read();
            while is_numeric(self.ch) {
                self.read();
            }
            let line = self.line;
            return self
                .slice(start)
                .parse::<f64>()
                .ok()
                .map(|value| Token::with_literal(TokenKind::Float, Literal::Float(value), line));
        }

        let lexeme = self.slice(start);
        match lexeme.parse::<i64>() {
            Ok(value) => Some(Token::with_literal(TokenKind::Int, Literal::Int(value), self.line)),
            Err(_) => {
                let line = self.line;
                self.report(LexError::IntegerOutOfRange { lexeme, line });
                None
            }
        }
    }

    fn read_identifier(&mut self) -> Token {
        let start = self.cur;
        while is_alphanumeric(self.ch) {
            self.read();
        }
        let literal = self.slice(start);
        match KEYWORDS.iter().find(|(word, _)| *word == literal) {
            Some((_, kind)) => Token::new(*kind, self.line),
            None => Token::with_literal(TokenKind::Identifier, Literal::Text(literal), self.line),
        }
    }

    fn read_symbol(&mut self) -> Option<Token> {
        let (text, kind) = SYMBOLS.iter().find(|(text, _)| self.starts_with(text))?;
        for _ in 0..text.len() {
            self.read();
        }
        Some(Token::new(*kind, self.line))
    }

    /// Scans one lexeme. `None` means it was skipped with a diagnostic.
    fn scan(&mut self) -> Option<Token> {
        match self.ch {
            '"' => self.read_string(),
            c if is_numeric(c) => self.read_number(),
            c if is_identifier_start(c) => Some(self.read_identifier()),
            _ => {
                if let Some(token) = self.read_symbol() {
                    return Some(token);
                }
                let (ch, line) = (self.ch, self.line);
                self.report(LexError::IllegalCharacter { ch, line });
                self.read();
                None
            }
        }
    }
}

impl Iterator for Lexer {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            self.skip_trivia();
            if self.is_at_end() {
                return None;
            }
            if let Some(token) = self.scan() {
                return Some(token);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).map(|t| t.kind).collect()
    }

    #[test]
    fn test_var_decl_tokens() {
        let tokens: Vec<Token> = tokenize("val x = 10;").collect();
        assert_eq!(
            tokens,
            vec![
                Token::new(TokenKind::Val, 1),
                Token::with_literal(TokenKind::Identifier, Literal::Text("x".into()), 1),
                Token::new(TokenKind::Assign, 1),
                Token::with_literal(TokenKind::Int, Literal::Int(10), 1),
                Token::new(TokenKind::SemiColon, 1),
            ]
        );
    }

    #[test]
    fn test_keyword_prefix_is_identifier() {
        let tokens: Vec<Token> = tokenize("valid = 5").collect();
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].literal, Some(Literal::Text("valid".into())));
        assert_eq!(tokens.len(), 3);

        assert_eq!(
            kinds("var variable iffy if elsewhere else println printlnx"),
            vec![
                TokenKind::Var,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::If,
                TokenKind::Identifier,
                TokenKind::Else,
                TokenKind::Println,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        let tokens: Vec<Token> = tokenize("10 10.5").collect();
        assert_eq!(tokens[0].literal, Some(Literal::Int(10)));
        assert_eq!(tokens[1].literal, Some(Literal::Float(10.5)));
    }

    #[test]
    fn test_incomplete_decimals() {
        let mut lexer = tokenize("10.");
        let tokens: Vec<Token> = lexer.by_ref().collect();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Int);
        assert_eq!(lexer.errors(), &[LexError::IllegalCharacter { ch: '.', line: 1 }]);

        let mut lexer = tokenize(".5");
        let tokens: Vec<Token> = lexer.by_ref().collect();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].literal, Some(Literal::Int(5)));
        assert_eq!(lexer.errors().len(), 1);
    }

    #[test]
    fn test_integer_out_of_range() {
        let mut lexer = tokenize("x = 99999999999999999999");
        let kinds: Vec<TokenKind> = lexer.by_ref().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TokenKind::Identifier, TokenKind::Assign]);
        assert!(matches!(
            lexer.errors(),
            [LexError::IntegerOutOfRange { line: 1, .. }]
        ));
    }

    #[test]
    fn test_symbols_longest_match() {
        assert_eq!(
            kinds("== = === < > + - * / ( ) { } ;"),
            vec![
                TokenKind::EqEq,
                TokenKind::Assign,
                TokenKind::EqEq,
                TokenKind::Assign,
                TokenKind::Less,
                TokenKind::Greater,
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Times,
                TokenKind::Divide,
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::LeftBrace,
                TokenKind::RightBrace,
                TokenKind::SemiColon,
            ]
        );
    }

    #[test]
    fn test_strings() {
        let tokens: Vec<Token> = tokenize(r#"println("Hello, world!")"#).collect();
        assert_eq!(tokens[2].kind, TokenKind::String);
        assert_eq!(tokens[2].literal, Some(Literal::Text("Hello, world!".into())));
        assert_eq!(tokens[2].value(), "\"Hello, world!\"");
    }

    #[test]
    fn test_unterminated_string() {
        let mut lexer = tokenize("println(\"oops\nx");
        let tokens: Vec<Token> = lexer.by_ref().collect();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[2].kind, TokenKind::Identifier);
        assert_eq!(tokens[2].line, 2);
        assert_eq!(lexer.errors(), &[LexError::UnterminatedString { line: 1 }]);
    }

    #[test]
    fn test_comments_and_lines() {
        let source = "val a = 1 // trailing comment\n\n// full line\nvar b = a / 2";
        let tokens: Vec<Token> = tokenize(source).collect();
        assert_eq!(tokens.len(), 10);
        assert!(tokens[..4].iter().all(|t| t.line == 1));
        assert!(tokens[4..].iter().all(|t| t.line == 4));
        assert_eq!(tokens[8].kind, TokenKind::Divide);
    }

    #[test]
    fn test_illegal_character_recovery() {
        let mut lexer = tokenize("x = 5 @ 3");
        let kinds: Vec<TokenKind> = lexer.by_ref().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![TokenKind::Identifier, TokenKind::Assign, TokenKind::Int, TokenKind::Int]
        );
        let errors = lexer.into_errors();
        assert_eq!(errors, vec![LexError::IllegalCharacter { ch: '@', line: 1 }]);
        assert_eq!(errors[0].to_string(), "Illegal character '@' at line 1");
    }

    #[test]
    fn test_carriage_return_is_illegal() {
        let mut lexer = tokenize("x\r\ny");
        assert_eq!(lexer.by_ref().count(), 2);
        assert_eq!(lexer.errors(), &[LexError::IllegalCharacter { ch: '\r', line: 1 }]);
    }

    #[test]
    fn test_token_display() {
        let tokens: Vec<String> = tokenize("val x = 1.5").map(|t| t.to_string()).collect();
        assert_eq!(tokens, vec!["VAL", "IDENT(x)", "EQ", "FLOAT(1.5)"]);
    }
}
