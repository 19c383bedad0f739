//! Error types for the eqnibbler crate.
//!
//! Two error families cover the life of an equation:
//!
//! - `CompileError`: everything that can go wrong while declaring variables,
//!   tokenizing, classifying or parsing an expression. Nothing is stored when
//!   one of these is returned.
//! - `EvalError`: per-call failures while evaluating a compiled program. They
//!   never corrupt the equation, which stays usable for the next call.

use thiserror::Error;

/// Errors that can occur while turning expression text into a postfix program.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    /// A punctuation run or character that is not part of the grammar
    #[error("Unknown token: '{0}'")]
    UnknownToken(String),
    /// A word that is neither a function, a constant nor a declared variable
    #[error("Undeclared identifier: '{0}'")]
    UndeclaredIdentifier(String),
    /// A declared variable that shadows a built-in function or constant
    #[error("Reserved word cannot be used as a variable: '{0}'")]
    ReservedWordAsVariable(String),
    /// The same variable name was declared twice
    #[error("Variable declared more than once: '{0}'")]
    DuplicateVariable(String),
    /// A declared variable name the tokenizer could never produce as a word
    #[error("Invalid variable name: '{0}'")]
    InvalidVariableName(String),
    /// Two tokens of the same kind in a row, e.g. two binary operators
    #[error("Token '{current}' cannot follow '{previous}'")]
    AdjacentTokenConflict { previous: String, current: String },
    /// A closing bracket without an opening one, or an opening bracket left open
    #[error("Unbalanced parentheses")]
    UnbalancedParentheses,
    /// The program would not reduce to exactly one value, e.g. a trailing operator
    #[error("Unbalanced expression: operators and operands do not match up")]
    UnbalancedExpression,
    /// Numeric text that does not parse as a floating point number
    #[error("Malformed number: '{0}'")]
    MalformedNumber(String),
    /// Nothing but whitespace was supplied
    #[error("Empty expression")]
    EmptyExpression,
}

/// Errors that can occur when evaluating a compiled equation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// The equation only declares variables and holds no program yet
    #[error("Equation has not been compiled")]
    NotCompiled,
    /// The value vector does not have one entry per declared variable
    #[error("Invalid number of values: expected {expected}, got {got}")]
    VariableCountMismatch { expected: usize, got: usize },
    /// A variable reference points outside the supplied value vector
    #[error("Variable index {index} is out of range for {len} values")]
    VariableBindingOutOfRange { index: usize, len: usize },
    /// `mod` was called with an operand that is not an exact integer
    #[error("mod() requires integer operands, got {left} and {right}")]
    NonIntegerModuloOperand { left: f64, right: f64 },
    /// No equation was registered under this identifier
    #[error("Invalid equation id: {0}")]
    InvalidEquationId(usize),
    /// The output buffer does not have one slot per input row
    #[error("Invalid output length: expected {expected}, got {got}")]
    OutputLengthMismatch { expected: usize, got: usize },
}
