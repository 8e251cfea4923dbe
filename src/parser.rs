use std::iter::Peekable;

use tracing::{debug, trace};

use crate::ast::*;
use crate::error::SyntaxError;
use crate::lexer::{Literal, Token, TokenKind};

#[derive(Debug, PartialEq, Eq, Clone, Copy, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    Sum,     // + -
    Product, // * /
    Prefix,  // unary -
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Assoc {
    Left,
    Right,
}

/// Binary operators, lowest precedence first.
const INFIX_OPERATORS: &[(TokenKind, BinaryOperator, Precedence, Assoc)] = &[
    (TokenKind::Plus, BinaryOperator::Plus, Precedence::Sum, Assoc::Left),
    (TokenKind::Minus, BinaryOperator::Minus, Precedence::Sum, Assoc::Left),
    (TokenKind::Times, BinaryOperator::Times, Precedence::Product, Assoc::Left),
    (TokenKind::Divide, BinaryOperator::Divide, Precedence::Product, Assoc::Left),
];

const PREFIX_OPERATORS: &[(TokenKind, Precedence, Assoc)] =
    &[(TokenKind::Minus, Precedence::Prefix, Assoc::Right)];

fn infix_operator(kind: TokenKind) -> Option<(BinaryOperator, Precedence, Assoc)> {
    INFIX_OPERATORS
        .iter()
        .find(|(k, ..)| *k == kind)
        .map(|(_, op, prec, assoc)| (*op, *prec, *assoc))
}

fn prefix_operator(kind: TokenKind) -> Option<(Precedence, Assoc)> {
    PREFIX_OPERATORS
        .iter()
        .find(|(k, ..)| *k == kind)
        .map(|(_, prec, assoc)| (*prec, *assoc))
}

/// Left and right binding power. The side that binds tighter decides
/// associativity: `a - b - c` groups left, a right-associative operator
/// would group the other way.
fn binding_power(precedence: Precedence, assoc: Assoc) -> (u8, u8) {
    let base = precedence as u8 * 2;
    match assoc {
        Assoc::Left => (base, base + 1),
        Assoc::Right => (base + 1, base),
    }
}

fn comparison(kind: TokenKind) -> Option<Comparison> {
    match kind {
        TokenKind::Greater => Some(Comparison::GreaterThan),
        TokenKind::Less => Some(Comparison::LessThan),
        TokenKind::EqEq => Some(Comparison::Equal),
        _ => None,
    }
}

/// Combined depth of parentheses and blocks the parser will descend into.
pub const MAX_NESTING: usize = 200;

pub type ParseResult<T> = Result<T, SyntaxError>;

/// Parses a whole token stream into a `Program`.
pub fn parse<I>(tokens: I) -> ParseResult<Program>
where
    I: IntoIterator<Item = Token>,
{
    Parser::new(tokens.into_iter()).parse_program()
}

/// Recursive descent over the statement grammar, with a binding-power
/// loop for arithmetic. Stops at the first token it cannot accept.
pub struct Parser<I: Iterator<Item = Token>> {
    tokens: Peekable<I>,
    depth: usize,
}

impl<I: Iterator<Item = Token>> Parser<I> {
    pub fn new(tokens: I) -> Self {
        Parser {
            tokens: tokens.peekable(),
            depth: 0,
        }
    }

    pub fn parse_program(mut self) -> ParseResult<Program> {
        let statements = self.parse_statement_list()?;
        match self.tokens.next() {
            None => {
                trace!(statements = statements.len(), "reduced program");
                Ok(Program { statements })
            }
            token => Err(self.unexpected(token)),
        }
    }

    fn peek_kind(&mut self) -> Option<TokenKind> {
        self.tokens.peek().map(|token| token.kind)
    }

    fn peek_token_is(&mut self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    fn unexpected(&self, token: Option<Token>) -> SyntaxError {
        let error = match token {
            Some(token) => SyntaxError::unexpected(&token),
            None => SyntaxError::UnexpectedEof,
        };
        debug!(%error, "parse abandoned");
        error
    }

    fn next_token(&mut self) -> ParseResult<Token> {
        match self.tokens.next() {
            Some(token) => Ok(token),
            None => Err(self.unexpected(None)),
        }
    }

    fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        let token = self.next_token()?;
        if token.kind == kind {
            Ok(token)
        } else {
            Err(self.unexpected(Some(token)))
        }
    }

    fn enter(&mut self, line: usize) -> ParseResult<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            let error = SyntaxError::NestingTooDeep {
                limit: MAX_NESTING,
                line,
            };
            debug!(%error, "parse abandoned");
            return Err(error);
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn expect_identifier(&mut self) -> ParseResult<Identifier> {
        let token = self.expect(TokenKind::Identifier)?;
        match token.literal {
            Some(Literal::Text(name)) => Ok(name),
            _ => Err(self.unexpected(Some(token))),
        }
    }

    fn at_statement_start(&mut self) -> bool {
        matches!(
            self.peek_kind(),
            Some(
                TokenKind::Val
                    | TokenKind::Var
                    | TokenKind::Identifier
                    | TokenKind::Println
                    | TokenKind::If
            )
        )
    }

    /// One or more statements separated by `;`, with an optional trailing `;`.
    fn parse_statement_list(&mut self) -> ParseResult<Vec<Statement>> {
        let mut statements = vec![self.parse_statement()?];
        while self.peek_token_is(TokenKind::SemiColon) {
            self.tokens.next();
            if !self.at_statement_start() {
                break;
            }
            statements.push(self.parse_statement()?);
        }
        Ok(statements)
    }

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        match self.peek_kind() {
            Some(TokenKind::Val | TokenKind::Var) => self.parse_var_decl(),
            Some(TokenKind::Identifier) => self.parse_assignment(),
            Some(TokenKind::Println) => self.parse_println(),
            Some(TokenKind::If) => self.parse_if(),
            _ => {
                let token = self.tokens.next();
                Err(self.unexpected(token))
            }
        }
    }

    fn parse_var_decl(&mut self) -> ParseResult<Statement> {
        let keyword = self.next_token()?;
        let mutable = keyword.kind == TokenKind::Var;
        let name = self.expect_identifier()?;
        self.expect(TokenKind::Assign)?;
        let value = self.parse_expression()?;
        trace!(line = keyword.line, %name, mutable, "reduced var_decl");
        Ok(Statement::VarDecl {
            mutable,
            name,
            value,
        })
    }

    fn parse_assignment(&mut self) -> ParseResult<Statement> {
        let name = self.expect_identifier()?;
        self.expect(TokenKind::Assign)?;
        let value = self.parse_expression()?;
        trace!(%name, "reduced assignment");
        Ok(Statement::Assignment { name, value })
    }

    fn parse_println(&mut self) -> ParseResult<Statement> {
        self.expect(TokenKind::Println)?;
        self.expect(TokenKind::LeftParen)?;
        let argument = if self.peek_token_is(TokenKind::String) {
            let token = self.next_token()?;
            match token.literal {
                Some(Literal::Text(text)) => PrintArg::Text(text),
                _ => return Err(self.unexpected(Some(token))),
            }
        } else {
            PrintArg::Expression(self.parse_expression()?)
        };
        self.expect(TokenKind::RightParen)?;
        trace!("reduced println_stmt");
        Ok(Statement::Println(argument))
    }

    fn parse_if(&mut self) -> ParseResult<Statement> {
        self.expect(TokenKind::If)?;
        self.expect(TokenKind::LeftParen)?;
        let condition = self.parse_condition()?;
        self.expect(TokenKind::RightParen)?;
        let then_body = self.parse_block()?;

        if !self.peek_token_is(TokenKind::Else) {
            trace!("reduced if_stmt");
            return Ok(Statement::If {
                condition,
                body: then_body,
            });
        }

        self.tokens.next();
        let else_body = self.parse_block()?;
        trace!("reduced if_else_stmt");
        Ok(Statement::IfElse {
            condition,
            then_body,
            else_body,
        })
    }

    fn parse_block(&mut self) -> ParseResult<Vec<Statement>> {
        let brace = self.expect(TokenKind::LeftBrace)?;
        self.enter(brace.line)?;
        let statements = self.parse_statement_list()?;
        self.expect(TokenKind::RightBrace)?;
        self.leave();
        Ok(statements)
    }

    fn parse_condition(&mut self) -> ParseResult<Condition> {
        let left = self.parse_expression()?;
        let token = self.next_token()?;
        let operator = match comparison(token.kind) {
            Some(operator) => operator,
            None => return Err(self.unexpected(Some(token))),
        };
        let right = self.parse_expression()?;
        trace!(%operator, "reduced condition");
        Ok(Condition {
            operator,
            left,
            right,
        })
    }

    fn parse_expression(&mut self) -> ParseResult<Expression> {
        let (min_bp, _) = binding_power(Precedence::Lowest, Assoc::Left);
        self.parse_binding(min_bp)
    }

    fn parse_binding(&mut self, min_bp: u8) -> ParseResult<Expression> {
        let mut left = self.parse_prefix()?;

        while let Some((operator, precedence, assoc)) = self.peek_kind().and_then(infix_operator) {
            let (left_bp, right_bp) = binding_power(precedence, assoc);
            if left_bp < min_bp {
                break;
            }
            self.tokens.next();
            let right = self.parse_binding(right_bp)?;
            left = Expression::binary(operator, left, right);
        }

        Ok(left)
    }

    /// Runs of prefix operators are counted in a loop and applied once the
    /// operand is known, so `- - - x` costs no extra recursion.
    fn parse_prefix(&mut self) -> ParseResult<Expression> {
        let mut negations = 0usize;
        let mut operand_bp = None;
        while let Some((precedence, assoc)) = self.peek_kind().and_then(prefix_operator) {
            self.tokens.next();
            negations += 1;
            operand_bp = Some(binding_power(precedence, assoc).1);
        }

        let mut expression = match operand_bp {
            Some(right_bp) => self.parse_binding(right_bp)?,
            None => self.parse_atom()?,
        };
        for _ in 0..negations {
            expression = Expression::negate(expression);
        }
        Ok(expression)
    }

    fn parse_atom(&mut self) -> ParseResult<Expression> {
        let token = self.next_token()?;
        match (token.kind, &token.literal) {
            (TokenKind::Identifier, Some(Literal::Text(name))) => {
                Ok(Expression::Identifier(name.clone()))
            }
            (TokenKind::Int, Some(Literal::Int(value))) => Ok(Expression::Int(*value)),
            (TokenKind::Float, Some(Literal::Float(value))) => Ok(Expression::Float(*value)),
            (TokenKind::LeftParen, _) => {
                self.enter(token.line)?;
                let expression = self.parse_expression()?;
                self.expect(TokenKind::RightParen)?;
                self.leave();
                Ok(expression)
            }
            _ => Err(self.unexpected(Some(token))),
        }
    }
}
