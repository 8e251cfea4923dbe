use std::fmt;
use std::mem;

pub type Identifier = String;

/// Root of a parse. Statements appear in source order.
#[derive(PartialEq, Debug, Clone)]
pub struct Program {
    pub statements: Vec<Statement>,
}

#[derive(PartialEq, Debug, Clone)]
pub enum Statement {
    /// `val`/`var` declaration; `mutable` is true for `var`.
    VarDecl {
        mutable: bool,
        name: Identifier,
        value: Expression,
    },
    Assignment {
        name: Identifier,
        value: Expression,
    },
    Println(PrintArg),
    If {
        condition: Condition,
        body: Vec<Statement>,
    },
    IfElse {
        condition: Condition,
        then_body: Vec<Statement>,
        else_body: Vec<Statement>,
    },
}

/// `println` takes either a string literal or an arbitrary expression.
#[derive(PartialEq, Debug, Clone)]
pub enum PrintArg {
    Text(String),
    Expression(Expression),
}

#[derive(PartialEq, Debug, Clone)]
pub struct Condition {
    pub operator: Comparison,
    pub left: Expression,
    pub right: Expression,
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum Comparison {
    GreaterThan,
    LessThan,
    Equal,
}

#[derive(PartialEq, Debug, Clone)]
pub enum Expression {
    Identifier(Identifier),
    Int(i64),
    Float(f64),
    UnaryMinus(Box<Expression>),
    Binary(BinaryOperator, Box<Expression>, Box<Expression>),
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum BinaryOperator {
    Plus,
    Minus,
    Times,
    Divide,
}

impl Expression {
    pub fn binary(operator: BinaryOperator, left: Expression, right: Expression) -> Self {
        Expression::Binary(operator, Box::new(left), Box::new(right))
    }

    pub fn negate(operand: Expression) -> Self {
        Expression::UnaryMinus(Box::new(operand))
    }
}

// Long operator chains are torn down with an explicit stack instead of
// recursive drops.
impl Drop for Expression {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        detach_children(self, &mut pending);
        while let Some(mut expression) = pending.pop() {
            detach_children(&mut expression, &mut pending);
        }
    }
}

fn detach_children(expression: &mut Expression, pending: &mut Vec<Expression>) {
    match expression {
        Expression::UnaryMinus(operand) => {
            pending.push(mem::replace(&mut **operand, Expression::Int(0)));
        }
        Expression::Binary(_, left, right) => {
            pending.push(mem::replace(&mut **left, Expression::Int(0)));
            pending.push(mem::replace(&mut **right, Expression::Int(0)));
        }
        _ => {}
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Times => "*",
            BinaryOperator::Divide => "/",
        };
        f.write_str(symbol)
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Comparison::GreaterThan => ">",
            Comparison::LessThan => "<",
            Comparison::Equal => "==",
        };
        f.write_str(symbol)
    }
}

// Fully parenthesized so the tree shape is visible.
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(name) => write!(f, "{}", name),
            Expression::Int(i) => write!(f, "{}", i),
            Expression::Float(fl) => write!(f, "{:?}", fl),
            Expression::UnaryMinus(operand) => write!(f, "(-{})", operand),
            Expression::Binary(op, left, right) => write!(f, "({} {} {})", left, op, right),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.operator, self.right)
    }
}
