//! Compiled postfix programs.
//!
//! A `Program` is only ever built from parser output and is checked once on
//! construction: replaying its stack effects must never underflow, no bracket
//! or comma may survive, and exactly one value must remain when `End` is
//! reached. The evaluator relies on this and sizes its stack from
//! `max_depth`.

use std::fmt;

use itertools::Itertools;

use crate::errors::CompileError;
use crate::token::Token;

/// A validated postfix token sequence ending with `Token::End`.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    tokens: Vec<Token>,
    max_depth: usize,
}

impl Program {
    /// Validates `tokens` and wraps them.
    ///
    /// # Errors
    /// * `CompileError::UnbalancedParentheses` if a bracket or comma is left in
    ///   the sequence
    /// * `CompileError::UnbalancedExpression` if an operator or function lacks
    ///   operands, if more than one value is left over, or if the sequence does
    ///   not end with exactly one `End`
    pub(crate) fn new(tokens: Vec<Token>) -> Result<Self, CompileError> {
        let mut depth = 0usize;
        let mut max_depth = 0usize;

        let (last, body) = tokens
            .split_last()
            .ok_or(CompileError::UnbalancedExpression)?;
        if *last != Token::End {
            return Err(CompileError::UnbalancedExpression);
        }

        for token in body {
            match token {
                Token::LeftBracket | Token::RightBracket | Token::Comma => {
                    return Err(CompileError::UnbalancedParentheses)
                }
                Token::End => return Err(CompileError::UnbalancedExpression),
                _ => {}
            }
            depth = depth
                .checked_sub(token.arity())
                .ok_or(CompileError::UnbalancedExpression)?
                + 1;
            max_depth = max_depth.max(depth);
        }

        if depth != 1 {
            return Err(CompileError::UnbalancedExpression);
        }

        Ok(Self { tokens, max_depth })
    }

    /// The postfix tokens, including the trailing `End`.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Number of tokens, including `End`.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Provided alongside `len`; a validated program is never empty.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Largest number of values simultaneously on the evaluation stack.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Renders the program with variable references replaced by `names`.
    pub fn render(&self, names: &[String]) -> String {
        self.tokens
            .iter()
            .map(|token| match token {
                Token::Variable(index) => names
                    .get(*index)
                    .cloned()
                    .unwrap_or_else(|| token.to_string()),
                _ => token.to_string(),
            })
            .join(" ")
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tokens.iter().join(" "))
    }
}
