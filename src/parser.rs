//! Shunting-yard parser producing postfix programs.
//!
//! Operands go straight to the output. Operators wait on a stack until an
//! operator of lower precedence (or a closing bracket, comma or the end of
//! input) flushes them. Functions wait on the stack until their closing
//! bracket, so a call is lowered to its arguments followed by the function.
//! Every open bracket counts its arguments; a comma is only accepted inside a
//! call, and the count must match the function's arity when the call closes.
//!
//! Precedence is looked up in one of three tables depending on the incoming
//! token:
//!
//! | symbol              | math    | unary   | logical |
//! |---------------------|---------|---------|---------|
//! | `^`                 | 5 right | 5 right |         |
//! | `*` `/`             | 3 left  | 3 left  |         |
//! | `+` `-`             | 2 left  | 4 right |         |
//! | `==` `!=` `<` `>` `<=` `>=` |  |        | 9 left  |
//! | `&&`                |         |         | 3 left  |
//! | `\|\|`              |         |         | 2 left  |
//!
//! Stacked entries are ranked with the incoming token's table. A math or
//! unary operator may pop math and unary entries; a logical operator may only
//! pop math entries, and since math symbols have no rank in the logical table
//! it never pops anything. Expressions that mix comparisons with arithmetic
//! therefore group to the right unless bracketed: `3 + 1 > 2` is
//! `3 + (1 > 2)`.

use itertools::Itertools;

use crate::errors::CompileError;
use crate::program::Program;
use crate::token::{Associativity, Function, OperatorKind, Token};

/// Precedence table selected by the incoming operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Table {
    Math,
    Unary,
    Logical,
}

/// Rank of `token` in `table`, or `None` if the table does not list it.
fn precedence(token: &Token, table: Table) -> Option<(u8, Associativity)> {
    use Associativity::{Left, Right};

    let symbol = match token {
        Token::Binary(op) => op.symbol(),
        Token::Unary(op) => op.symbol(),
        _ => return None,
    };

    match (table, symbol) {
        (Table::Math | Table::Unary, "^") => Some((5, Right)),
        (Table::Math | Table::Unary, "*" | "/") => Some((3, Left)),
        (Table::Unary, "+" | "-") => Some((4, Right)),
        (Table::Math, "+" | "-") => Some((2, Left)),
        (Table::Logical, "==" | "!=" | "<" | ">" | "<=" | ">=") => Some((9, Left)),
        (Table::Logical, "&&") => Some((3, Left)),
        (Table::Logical, "||") => Some((2, Left)),
        _ => None,
    }
}

/// Whether a stacked entry takes part in the precedence walk for `table`.
fn poppable(entry: &Token, table: Table) -> bool {
    match table {
        Table::Math | Table::Unary => match entry {
            Token::Unary(_) => true,
            Token::Binary(op) => op.kind() == OperatorKind::Math,
            _ => false,
        },
        Table::Logical => {
            matches!(entry, Token::Binary(op) if op.kind() == OperatorKind::Math)
        }
    }
}

/// Converts a classified token sequence, terminated by `End`, into a postfix
/// program.
///
/// # Errors
/// * `CompileError::UnbalancedParentheses` for a `)` without a matching `(`,
///   or a `(` still open at the end of input
/// * `CompileError::UnbalancedExpression` for a comma outside a function
///   call, a call with the wrong number of arguments, or output that would
///   not reduce to exactly one value
pub fn parse(tokens: Vec<Token>) -> Result<Program, CompileError> {
    let mut yard = ShuntingYard::with_capacity(tokens.len());

    for token in tokens {
        match token {
            Token::Number(_) | Token::Variable(_) | Token::Constant(_) => yard.output.push(token),
            Token::Function(_) => yard.stack.push(token),
            Token::LeftBracket => yard.open_bracket(),
            Token::Binary(op) => {
                let table = match op.kind() {
                    OperatorKind::Math => Table::Math,
                    OperatorKind::Logical => Table::Logical,
                };
                yard.push_operator(token, table);
            }
            Token::Unary(_) => yard.push_operator(token, Table::Unary),
            Token::RightBracket => yard.close_bracket()?,
            Token::Comma => yard.next_argument()?,
            Token::End => return yard.finish(),
        }
        yard.trace(&token);
    }

    // The classifier always appends `End`; a sequence without it cannot be
    // a complete program.
    Err(CompileError::UnbalancedExpression)
}

struct ShuntingYard {
    output: Vec<Token>,
    /// Operator stack, top at the end
    stack: Vec<Token>,
    /// One entry per `(` on the operator stack
    groups: Vec<Group>,
}

/// An open bracket and the function call it belongs to, if any.
struct Group {
    function: Option<Function>,
    arguments: usize,
}

impl ShuntingYard {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            output: Vec::with_capacity(capacity),
            stack: Vec::new(),
            groups: Vec::new(),
        }
    }

    fn open_bracket(&mut self) {
        let function = match self.stack.last() {
            Some(Token::Function(function)) => Some(*function),
            _ => None,
        };
        self.groups.push(Group {
            function,
            arguments: 1,
        });
        self.stack.push(Token::LeftBracket);
    }

    /// Handles `,`: only legal directly inside a function call's brackets.
    fn next_argument(&mut self) -> Result<(), CompileError> {
        self.flush_argument();
        match self.groups.last_mut() {
            Some(Group {
                function: Some(_),
                arguments,
            }) => {
                *arguments += 1;
                Ok(())
            }
            _ => Err(CompileError::UnbalancedExpression),
        }
    }

    fn push_operator(&mut self, token: Token, table: Table) {
        let Some((rank, assoc)) = precedence(&token, table) else {
            unreachable!("operator {token} has no rank in its own table");
        };

        while let Some(top) = self.stack.last() {
            if !poppable(top, table) {
                break;
            }
            let stacked = precedence(top, table).map_or(0, |(rank, _)| rank);
            let pops = match assoc {
                Associativity::Left => rank <= stacked,
                Associativity::Right => rank < stacked,
            };
            if !pops {
                break;
            }
            self.pop_to_output();
        }

        self.stack.push(token);
    }

    /// Handles `)`: flushes the group, drops its `(` and emits the function
    /// owning the group, if any, after checking its argument count.
    fn close_bracket(&mut self) -> Result<(), CompileError> {
        self.flush_argument();
        match self.stack.pop() {
            Some(Token::LeftBracket) => {}
            _ => return Err(CompileError::UnbalancedParentheses),
        }
        if let Some(Group {
            function: Some(function),
            arguments,
        }) = self.groups.pop()
        {
            if arguments != function.arity() {
                return Err(CompileError::UnbalancedExpression);
            }
        }
        if let Some(Token::Function(_)) = self.stack.last() {
            self.pop_to_output();
        }
        Ok(())
    }

    /// Flushes everything down to the enclosing `(` and leaves the bracket
    /// in place.
    fn flush_argument(&mut self) {
        while let Some(top) = self.stack.last() {
            if *top == Token::LeftBracket {
                break;
            }
            self.pop_to_output();
        }
    }

    fn finish(mut self) -> Result<Program, CompileError> {
        while let Some(token) = self.stack.pop() {
            if token.is_bracket() {
                return Err(CompileError::UnbalancedParentheses);
            }
            self.output.push(token);
        }
        self.output.push(Token::End);
        self.trace(&Token::End);

        Program::new(self.output)
    }

    fn pop_to_output(&mut self) {
        if let Some(token) = self.stack.pop() {
            self.output.push(token);
        }
    }

    fn trace(&self, token: &Token) {
        debug!(
            "parser: {:<6} | stack: {:<20} | output: {}",
            token.to_string(),
            self.stack.iter().rev().join(" "),
            self.output.iter().join(" ")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::lexer::tokenize;
    use crate::token::{BinaryOperator, UnaryOperator};

    fn compile(expression: &str, variables: &[&str]) -> Result<Program, CompileError> {
        let variables: Vec<String> = variables.iter().map(|s| s.to_string()).collect();
        parse(classify(&tokenize(expression)?, &variables)?)
    }

    fn postfix(expression: &str, variables: &[&str]) -> String {
        compile(expression, variables).unwrap().to_string()
    }

    #[test]
    fn test_precedence() {
        assert_eq!(postfix("2 + 3 * 4", &[]), "2 3 4 * + end");
        assert_eq!(postfix("(2 + 3) * 4", &[]), "2 3 + 4 * end");
        assert_eq!(postfix("8 / 4 / 2", &[]), "8 4 / 2 / end");
        assert_eq!(postfix("8 - 4 + 2", &[]), "8 4 - 2 + end");
    }

    #[test]
    fn test_power_is_right_associative() {
        assert_eq!(postfix("2 ^ 3 ^ 2", &[]), "2 3 2 ^ ^ end");
    }

    #[test]
    fn test_unary_minus() {
        assert_eq!(postfix("-3.2^3", &[]), "3.2 3 ^ u- end");
        assert_eq!(postfix("-x + 1", &["x"]), "$0 u- 1 + end");
        assert_eq!(postfix("2 * -x", &["x"]), "2 $0 u- * end");
    }

    #[test]
    fn test_function_calls() {
        assert_eq!(postfix("sin(pi/2)", &[]), "pi 2 / sin end");
        assert_eq!(postfix("atan2(y, x + 1)", &["x", "y"]), "$1 $0 1 + atan2 end");
        assert_eq!(
            postfix("if(x > 0, 10, 20)", &["x"]),
            "$0 0 > 10 20 if end"
        );
        assert_eq!(postfix("abs(sin(x))", &["x"]), "$0 sin abs end");
    }

    #[test]
    fn test_program_tokens() {
        let program = compile("-sin(x)*1e2 + (+5e+1)", &["x"]).unwrap();
        assert_eq!(
            program.tokens(),
            &[
                Token::Variable(0),
                Token::Function(Function::Sin),
                Token::Number(100.0),
                Token::Binary(BinaryOperator::Mul),
                Token::Unary(UnaryOperator::Minus),
                Token::Number(50.0),
                Token::Unary(UnaryOperator::Plus),
                Token::Binary(BinaryOperator::Add),
                Token::End,
            ]
        );
    }

    #[test]
    fn test_logical_operators_never_pop() {
        assert_eq!(postfix("x > 1 + 2", &["x"]), "$0 1 2 + > end");
        assert_eq!(postfix("3 + 1 > 2", &[]), "3 1 2 > + end");
        assert_eq!(postfix("a < 1 || b", &["a", "b"]), "$0 1 $1 || < end");
    }

    #[test]
    fn test_unbalanced_parentheses() {
        assert_eq!(
            compile("sin(x", &["x"]),
            Err(CompileError::UnbalancedParentheses)
        );
        assert_eq!(
            compile("(1 + 2", &[]),
            Err(CompileError::UnbalancedParentheses)
        );
        assert_eq!(
            compile("1 + 2)", &[]),
            Err(CompileError::UnbalancedParentheses)
        );
    }

    #[test]
    fn test_unbalanced_expression() {
        assert_eq!(compile("x +", &["x"]), Err(CompileError::UnbalancedExpression));
        assert_eq!(compile("2 x", &["x"]), Err(CompileError::UnbalancedExpression));
        assert_eq!(compile("1, 2", &[]), Err(CompileError::UnbalancedExpression));
        assert_eq!(
            compile("sin(1, 2)", &[]),
            Err(CompileError::UnbalancedExpression)
        );
        assert_eq!(
            compile("atan2(1)", &[]),
            Err(CompileError::UnbalancedExpression)
        );
    }

    #[test]
    fn test_argument_counts() {
        // A short call must not borrow a value from outside its brackets
        for expression in ["3, if(1, 2)", "x, atan2(1)", "(x, mod(2))", "x + mod(2)"] {
            assert_eq!(
                compile(expression, &["x"]),
                Err(CompileError::UnbalancedExpression),
                "{expression}"
            );
        }
        assert_eq!(
            compile("if(x, 1, 2, 3)", &["x"]),
            Err(CompileError::UnbalancedExpression)
        );
        assert_eq!(
            compile("sin((x, 1))", &["x"]),
            Err(CompileError::UnbalancedExpression)
        );
        assert_eq!(
            postfix("if(x, mod(x, 2), atan2((x), 1))", &["x"]),
            "$0 $0 2 mod $0 1 atan2 if end"
        );
    }

    #[test]
    fn test_unary_after_power_pops_the_power() {
        // The unary rank (4) is below `^` (5), so the power is flushed before
        // its right operand exists.
        assert_eq!(compile("2^-3", &[]), Err(CompileError::UnbalancedExpression));
        assert_eq!(postfix("2^(-3)", &[]), "2 3 u- ^ end");
    }

    #[test]
    fn test_missing_end() {
        assert_eq!(
            parse(vec![Token::Number(1.0)]),
            Err(CompileError::UnbalancedExpression)
        );
    }
}
