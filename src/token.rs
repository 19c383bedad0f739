//! Semantic tokens and the static tables behind them.
//!
//! A `Token` is what the classifier produces from a raw lexeme and what a
//! postfix `Program` is made of. Operators, unary operators and functions are
//! closed enums carrying their own arity, so the evaluator can dispatch on
//! them without any lookup.
//!
//! The reserved word, function and constant tables are plain static data.

use std::f64::consts::PI;
use std::fmt;

/// Value pushed by comparison and logical operators for "true".
pub const TRUE: f64 = 1.0;
/// Value pushed by comparison and logical operators for "false".
pub const FALSE: f64 = 0.0;

/// Named constants usable inside expressions.
pub const CONSTANTS: &[(&str, f64)] = &[("pi", PI)];

/// Tie-breaking rule for operators of equal precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

/// The two families of binary operators. They are ranked by separate
/// precedence tables in the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    Math,
    Logical,
}

/// Binary infix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl BinaryOperator {
    const ALL: [BinaryOperator; 13] = [
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Div,
        Self::Pow,
        Self::And,
        Self::Or,
        Self::Eq,
        Self::Ne,
        Self::Lt,
        Self::Gt,
        Self::Le,
        Self::Ge,
    ];

    /// Looks up an operator by its source text.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Pow => "^",
            Self::And => "&&",
            Self::Or => "||",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
        }
    }

    pub fn kind(self) -> OperatorKind {
        match self {
            Self::Add | Self::Sub | Self::Mul | Self::Div | Self::Pow => OperatorKind::Math,
            _ => OperatorKind::Logical,
        }
    }

    /// Applies the operator. Comparison and logical operators yield `TRUE` or
    /// `FALSE`; any non-zero operand counts as true for `&&` and `||`.
    #[inline]
    pub fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            Self::Add => left + right,
            Self::Sub => left - right,
            Self::Mul => left * right,
            Self::Div => left / right,
            Self::Pow => left.powf(right),
            Self::And => boolean(left != FALSE && right != FALSE),
            Self::Or => boolean(left != FALSE || right != FALSE),
            Self::Eq => boolean(left == right),
            Self::Ne => boolean(left != right),
            Self::Lt => boolean(left < right),
            Self::Gt => boolean(left > right),
            Self::Le => boolean(left <= right),
            Self::Ge => boolean(left >= right),
        }
    }
}

/// Prefix sign operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Plus,
    Minus,
}

impl UnaryOperator {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(Self::Plus),
            "-" => Some(Self::Minus),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Plus => "+",
            Self::Minus => "-",
        }
    }

    #[inline]
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Self::Plus => value,
            Self::Minus => -value,
        }
    }
}

/// Built-in functions. Each has a fixed arity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Atan2,
    Exp,
    Log,
    Abs,
    Mod,
    If,
}

impl Function {
    pub const ALL: [Function; 12] = [
        Self::Sin,
        Self::Cos,
        Self::Tan,
        Self::Asin,
        Self::Acos,
        Self::Atan,
        Self::Atan2,
        Self::Exp,
        Self::Log,
        Self::Abs,
        Self::Mod,
        Self::If,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|function| function.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Asin => "asin",
            Self::Acos => "acos",
            Self::Atan => "atan",
            Self::Atan2 => "atan2",
            Self::Exp => "exp",
            Self::Log => "log",
            Self::Abs => "abs",
            Self::Mod => "mod",
            Self::If => "if",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Self::Atan2 | Self::Mod => 2,
            Self::If => 3,
            _ => 1,
        }
    }
}

/// Returns true if `word` names a built-in function or constant.
pub fn is_reserved(word: &str) -> bool {
    Function::from_name(word).is_some() || constant(word).is_some()
}

/// Looks up a named constant.
pub fn constant(name: &str) -> Option<f64> {
    CONSTANTS
        .iter()
        .find(|(constant, _)| *constant == name)
        .map(|(_, value)| *value)
}

#[inline]
fn boolean(condition: bool) -> f64 {
    if condition {
        TRUE
    } else {
        FALSE
    }
}

/// A classified token. Postfix programs are sequences of these, always ending
/// with `End`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token {
    /// A numeric literal
    Number(f64),
    /// A reference to the n-th declared variable
    Variable(usize),
    /// A named constant, already resolved to its value
    Constant(f64),
    /// A binary operator
    Binary(BinaryOperator),
    /// A prefix sign
    Unary(UnaryOperator),
    /// A built-in function call
    Function(Function),
    LeftBracket,
    RightBracket,
    Comma,
    End,
}

/// Coarse token categories. Two consecutive tokens may not share a class
/// unless it is a bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Number,
    Variable,
    Constant,
    Function,
    Math,
    Logical,
    Unary,
    LeftBracket,
    RightBracket,
    Comma,
    End,
}

impl Token {
    /// Number of values the token consumes from the evaluation stack.
    pub fn arity(&self) -> usize {
        match self {
            Token::Binary(_) => 2,
            Token::Unary(_) => 1,
            Token::Function(function) => function.arity(),
            _ => 0,
        }
    }

    pub fn class(&self) -> TokenClass {
        match self {
            Token::Number(_) => TokenClass::Number,
            Token::Variable(_) => TokenClass::Variable,
            Token::Constant(_) => TokenClass::Constant,
            Token::Function(_) => TokenClass::Function,
            Token::Binary(op) => match op.kind() {
                OperatorKind::Math => TokenClass::Math,
                OperatorKind::Logical => TokenClass::Logical,
            },
            Token::Unary(_) => TokenClass::Unary,
            Token::LeftBracket => TokenClass::LeftBracket,
            Token::RightBracket => TokenClass::RightBracket,
            Token::Comma => TokenClass::Comma,
            Token::End => TokenClass::End,
        }
    }

    pub fn is_bracket(&self) -> bool {
        matches!(self, Token::LeftBracket | Token::RightBracket)
    }
}

/// Renders tokens the way they are written, except variables which show
/// their position (`$0`) and unary signs which are marked with `u`.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(value) => write!(f, "{value}"),
            Token::Variable(index) => write!(f, "${index}"),
            Token::Constant(value) => {
                match CONSTANTS.iter().find(|(_, constant)| constant == value) {
                    Some((name, _)) => write!(f, "{name}"),
                    None => write!(f, "{value}"),
                }
            }
            Token::Binary(op) => write!(f, "{}", op.symbol()),
            Token::Unary(op) => write!(f, "u{}", op.symbol()),
            Token::Function(function) => write!(f, "{}", function.name()),
            Token::LeftBracket => write!(f, "("),
            Token::RightBracket => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::End => write!(f, "end"),
        }
    }
}
