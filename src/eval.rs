//! Stack machine evaluating postfix programs.
//!
//! Operands are pushed; operators and functions pop their arguments (the
//! rightmost argument first) and push one result. Evaluation stops at `End`
//! and returns the single remaining value.
//!
//! Programs are validated when they are built, so a stack that underflows
//! or does not hold exactly one value at `End` is a bug in this crate and
//! panics rather than surfacing as an `EvalError`.

use std::fmt;

use itertools::Itertools;

use crate::errors::EvalError;
use crate::program::Program;
use crate::token::{Function, Token, FALSE};

/// Evaluates `program` with `values[i]` bound to the i-th declared variable.
///
/// # Errors
/// * `EvalError::VariableBindingOutOfRange` if the program references a
///   variable beyond the end of `values`
/// * `EvalError::NonIntegerModuloOperand` if `mod` is applied to a value with
///   a fractional part
pub fn eval(program: &Program, values: &[f64]) -> Result<f64, EvalError> {
    let mut stack = Stack::with_capacity(program.max_depth());

    for token in program.tokens() {
        match *token {
            Token::Number(value) | Token::Constant(value) => stack.push(value),
            Token::Variable(index) => {
                let value = values
                    .get(index)
                    .copied()
                    .ok_or(EvalError::VariableBindingOutOfRange {
                        index,
                        len: values.len(),
                    })?;
                stack.push(value);
            }
            Token::Unary(op) => {
                let value = stack.pop();
                stack.push(op.apply(value));
            }
            Token::Binary(op) => {
                let right = stack.pop();
                let left = stack.pop();
                stack.push(op.apply(left, right));
            }
            Token::Function(function) => {
                let result = call(function, &mut stack)?;
                stack.push(result);
            }
            // Always the last token of a validated program
            Token::End => {}
            Token::LeftBracket | Token::RightBracket | Token::Comma => {
                unreachable!("separator {token} in a validated program")
            }
        }
        debug!("eval: {:<6} | stack: {}", token.to_string(), stack);
    }

    Ok(stack.finish())
}

fn call(function: Function, stack: &mut Stack) -> Result<f64, EvalError> {
    let result = match function {
        Function::Sin => stack.pop().sin(),
        Function::Cos => stack.pop().cos(),
        Function::Tan => stack.pop().tan(),
        Function::Asin => stack.pop().asin(),
        Function::Acos => stack.pop().acos(),
        Function::Atan => stack.pop().atan(),
        Function::Exp => stack.pop().exp(),
        Function::Log => stack.pop().ln(),
        Function::Abs => stack.pop().abs(),
        Function::Atan2 => {
            let x = stack.pop();
            let y = stack.pop();
            y.atan2(x)
        }
        Function::Mod => {
            let right = stack.pop();
            let left = stack.pop();
            if left.fract() != 0.0 || right.fract() != 0.0 {
                return Err(EvalError::NonIntegerModuloOperand { left, right });
            }
            left % right
        }
        Function::If => {
            let otherwise = stack.pop();
            let then = stack.pop();
            let condition = stack.pop();
            if condition != FALSE {
                then
            } else {
                otherwise
            }
        }
    };
    Ok(result)
}

/// Value stack with the invariants of a validated program baked in.
struct Stack(Vec<f64>);

impl Stack {
    fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    #[inline]
    fn push(&mut self, value: f64) {
        self.0.push(value);
    }

    #[inline]
    fn pop(&mut self) -> f64 {
        match self.0.pop() {
            Some(value) => value,
            None => panic!("evaluation stack underflow"),
        }
    }

    fn finish(self) -> f64 {
        match self.0.as_slice() {
            [value] => *value,
            values => panic!(
                "evaluation finished with {} values on the stack",
                values.len()
            ),
        }
    }
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join(" "))
    }
}
