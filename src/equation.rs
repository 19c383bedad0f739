//! Compiled equations.
//!
//! This module provides the core `Equation` type: an ordered list of declared
//! variables plus the postfix program compiled from an expression over them.
//! Compilation happens once; the program is then evaluated as often as needed
//! with different value vectors.
//!
//! # Example
//!
//! ```
//! use eqnibbler::Equation;
//!
//! let eq = Equation::new("2*x + y^2", &["x", "y"]).unwrap();
//! assert_eq!(eq.eval(&[1.0, 2.0]).unwrap(), 6.0);
//! assert_eq!(eq.eval(&[0.5, 3.0]).unwrap(), 10.0);
//! ```
//!
//! # Variable Handling
//!
//! Variables are bound by position: the i-th entry of the value vector is the
//! value of the i-th declared variable. Names must be identifiers
//! (`[A-Za-z_][A-Za-z0-9_]*`), unique, and must not shadow a built-in function
//! or constant.

use colored::Colorize;
use itertools::Itertools;
use rayon::prelude::*;

use crate::backends::matrix::Matrix;
use crate::backends::vector::Vector;
use crate::classify::classify;
use crate::errors::{CompileError, EvalError};
use crate::eval;
use crate::lexer::tokenize;
use crate::parser::parse;
use crate::program::Program;
use crate::token::is_reserved;

/// A set of declared variables, optionally with an expression compiled
/// against them.
///
/// An `Equation` is immutable. `declare` produces one without a program,
/// which can serve as a template for any number of `compile` calls; `new`
/// does both steps at once.
#[derive(Clone)]
pub struct Equation {
    variables: Vec<String>,
    compiled: Option<Compiled>,
}

#[derive(Clone)]
struct Compiled {
    expression: String,
    program: Program,
}

impl std::fmt::Debug for Equation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{{")?;
        writeln!(f, "    {}: {}", "Expression".cyan(), self.expression())?;
        writeln!(f, "    {}: {:?}", "Variables".cyan(), self.variables)?;
        match &self.compiled {
            Some(compiled) => {
                writeln!(
                    f,
                    "    {}: {}",
                    "Program".cyan(),
                    compiled.program.render(&self.variables)
                )?;
                writeln!(
                    f,
                    "    {}: {}",
                    "Stack Depth".cyan(),
                    compiled.program.max_depth()
                )?;
            }
            None => writeln!(f, "    {}: {}", "Program".cyan(), "not compiled".yellow())?,
        }
        write!(f, "}}")
    }
}

impl std::fmt::Display for Equation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}: {})",
            self.expression(),
            "vars".cyan(),
            self.variables.iter().join(", ")
        )
    }
}

impl Equation {
    /// Declares `variables` and compiles `expression` against them.
    ///
    /// # Arguments
    /// * `expression` - The expression text (e.g. "2*x + y^2")
    /// * `variables` - Variable names, in the order values will be supplied
    ///
    /// # Example
    /// ```
    /// # use eqnibbler::Equation;
    /// let eq = Equation::new("if(x > 0, x, -x)", &["x"]).unwrap();
    /// assert_eq!(eq.eval(&[-4.0]).unwrap(), 4.0);
    /// ```
    ///
    /// # Errors
    /// Returns the first `CompileError` hit while validating the variables or
    /// compiling the expression.
    pub fn new<S: AsRef<str>>(expression: &str, variables: &[S]) -> Result<Self, CompileError> {
        Self::declare(variables)?.compile(expression)
    }

    /// Validates and stores variable names without compiling anything.
    ///
    /// # Example
    /// ```
    /// # use eqnibbler::Equation;
    /// let template = Equation::declare(&["x", "y"]).unwrap();
    /// let sum = template.compile("x + y").unwrap();
    /// let product = template.compile("x * y").unwrap();
    /// assert_eq!(sum.eval(&[2.0, 3.0]).unwrap(), 5.0);
    /// assert_eq!(product.eval(&[2.0, 3.0]).unwrap(), 6.0);
    /// assert!(!template.is_compiled());
    /// ```
    ///
    /// # Errors
    /// * `CompileError::InvalidVariableName` for names that are not identifiers
    /// * `CompileError::ReservedWordAsVariable` for function or constant names
    /// * `CompileError::DuplicateVariable` for names declared twice
    pub fn declare<S: AsRef<str>>(variables: &[S]) -> Result<Self, CompileError> {
        let variables: Vec<String> = variables.iter().map(|v| v.as_ref().to_string()).collect();
        validate_variables(&variables)?;
        Ok(Self {
            variables,
            compiled: None,
        })
    }

    /// Compiles `expression` against this equation's variables and returns
    /// the result as a new equation.
    ///
    /// # Errors
    /// Any `CompileError` raised while tokenizing, classifying or parsing.
    pub fn compile(&self, expression: &str) -> Result<Self, CompileError> {
        let raw = tokenize(expression)?;
        let tokens = classify(&raw, &self.variables)?;
        let program = parse(tokens)?;

        debug!(
            "compiled '{}' -> {}",
            expression,
            program.render(&self.variables)
        );

        Ok(Self {
            variables: self.variables.clone(),
            compiled: Some(Compiled {
                expression: expression.to_string(),
                program,
            }),
        })
    }

    /// Evaluates the equation for the given input values.
    ///
    /// # Example
    /// ```
    /// # use eqnibbler::Equation;
    /// let eq = Equation::new("atan2(y, x)", &["x", "y"]).unwrap();
    /// let angle = eq.eval(&vec![1.0, 1.0]).unwrap();
    /// assert!((angle - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
    /// ```
    ///
    /// # Errors
    /// * `EvalError::NotCompiled` if no expression has been compiled
    /// * `EvalError::VariableCountMismatch` if `values` does not hold exactly
    ///   one entry per declared variable
    /// * `EvalError::NonIntegerModuloOperand` from `mod`
    pub fn eval<V: Vector>(&self, values: &V) -> Result<f64, EvalError> {
        self.eval_slice(values.as_slice())
    }

    /// Same as `eval`, for values already held in a slice.
    pub fn eval_slice(&self, values: &[f64]) -> Result<f64, EvalError> {
        let program = self.compiled_program()?;
        self.eval_program(program, values)
    }

    /// Evaluates the equation once per row of `inputs`.
    ///
    /// # Example
    /// ```
    /// # use eqnibbler::Equation;
    /// let eq = Equation::new("x * y", &["x", "y"]).unwrap();
    /// let results = eq.eval_rows(&vec![[1.0, 2.0], [3.0, 4.0]]).unwrap();
    /// assert_eq!(results, vec![2.0, 12.0]);
    /// ```
    ///
    /// # Errors
    /// Same as `eval`; the column count must match the number of variables.
    pub fn eval_rows<M: Matrix>(&self, inputs: &M) -> Result<Vec<f64>, EvalError> {
        let (rows, _) = inputs.dims();
        let mut results = <Vec<f64> as Vector>::zeros(rows);
        self.eval_rows_into(inputs, &mut results)?;
        Ok(results)
    }

    /// Evaluates the equation once per row of `inputs`, writing the results
    /// into `results`.
    ///
    /// # Errors
    /// * `EvalError::OutputLengthMismatch` if `results` does not have one slot
    ///   per row
    /// * any error `eval` can return
    pub fn eval_rows_into<M: Matrix, V: Vector>(
        &self,
        inputs: &M,
        results: &mut V,
    ) -> Result<(), EvalError> {
        let program = self.compiled_program()?;
        let (rows, cols) = inputs.dims();
        if cols != self.variables.len() {
            return Err(EvalError::VariableCountMismatch {
                expected: self.variables.len(),
                got: cols,
            });
        }
        if results.len() != rows {
            return Err(EvalError::OutputLengthMismatch {
                expected: rows,
                got: results.len(),
            });
        }

        let mut row = vec![0.0; cols];
        for (index, slot) in results.as_mut_slice().iter_mut().enumerate() {
            inputs.row_into(index, &mut row);
            *slot = eval::eval(program, &row)?;
        }
        Ok(())
    }

    /// Evaluates the equation for many value vectors across the rayon thread
    /// pool. Results keep the order of `input_sets`.
    ///
    /// # Example
    /// ```
    /// # use eqnibbler::Equation;
    /// let eq = Equation::new("x^2", &["x"]).unwrap();
    /// let inputs: Vec<Vec<f64>> = (0..100).map(|i| vec![i as f64]).collect();
    /// let results = eq.eval_parallel(&inputs).unwrap();
    /// assert_eq!(results[9], 81.0);
    /// ```
    ///
    /// # Errors
    /// The first error encountered for any input set.
    pub fn eval_parallel(&self, input_sets: &[Vec<f64>]) -> Result<Vec<f64>, EvalError> {
        let program = self.compiled_program()?;

        let num_threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(8);
        let chunk_size = (input_sets.len() / (num_threads * 4)).max(1);

        input_sets
            .par_chunks(chunk_size)
            .flat_map_iter(|chunk| {
                chunk
                    .iter()
                    .map(|values| self.eval_program(program, values))
            })
            .collect()
    }

    /// The compiled expression text, or an empty string for a bare
    /// declaration.
    pub fn expression(&self) -> &str {
        self.compiled
            .as_ref()
            .map_or("", |compiled| compiled.expression.as_str())
    }

    /// Declared variable names in binding order.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn program(&self) -> Option<&Program> {
        self.compiled.as_ref().map(|compiled| &compiled.program)
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled.is_some()
    }

    fn compiled_program(&self) -> Result<&Program, EvalError> {
        self.program().ok_or(EvalError::NotCompiled)
    }

    fn eval_program(&self, program: &Program, values: &[f64]) -> Result<f64, EvalError> {
        self.validate_input_length(values)?;
        eval::eval(program, values)
    }

    fn validate_input_length(&self, values: &[f64]) -> Result<(), EvalError> {
        if values.len() != self.variables.len() {
            return Err(EvalError::VariableCountMismatch {
                expected: self.variables.len(),
                got: values.len(),
            });
        }
        Ok(())
    }
}

fn validate_variables(variables: &[String]) -> Result<(), CompileError> {
    for name in variables {
        let mut chars = name.chars();
        let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(CompileError::InvalidVariableName(name.clone()));
        }
        if is_reserved(name) {
            return Err(CompileError::ReservedWordAsVariable(name.clone()));
        }
    }

    if let Some(duplicate) = variables.iter().duplicates().next() {
        return Err(CompileError::DuplicateVariable(duplicate.clone()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn eval(expression: &str, variables: &[&str], values: &[f64]) -> f64 {
        Equation::new(expression, variables)
            .unwrap()
            .eval(&values.to_vec())
            .unwrap()
    }

    #[test]
    fn test_operator_precedence() {
        assert_eq!(eval("2 + 3 * 4", &[], &[]), 14.0);
        assert_eq!(eval("(2 + 3) * 4", &[], &[]), 20.0);
        assert_eq!(eval("2 ^ 3 ^ 2", &[], &[]), 512.0);
    }

    #[test]
    fn test_unary_binds_after_power() {
        assert!((eval("-3.2^3", &[], &[]) + 32.768).abs() < 1e-12);
    }

    #[test]
    fn test_functions_and_constants() {
        assert!((eval("sin(pi/2)", &[], &[]) - 1.0).abs() < 1e-12);
        assert!((eval("atan2(1,1)", &[], &[]) - PI / 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_if_evaluates_both_branches() {
        assert_eq!(eval("if(1 > 0, 10, 20)", &[], &[]), 10.0);
        // The unselected branch still runs, so its errors surface
        let eq = Equation::new("if(1 > 0, 10, mod(x, 2))", &["x"]).unwrap();
        assert_eq!(
            eq.eval(&[0.5]),
            Err(EvalError::NonIntegerModuloOperand {
                left: 0.5,
                right: 2.0
            })
        );
    }

    #[test]
    fn test_integer_modulo() {
        assert_eq!(eval("mod(7,3)", &[], &[]), 1.0);
        let eq = Equation::new("mod(7.5,3)", &[] as &[&str]).unwrap();
        assert_eq!(
            eq.eval(&Vec::<f64>::new()),
            Err(EvalError::NonIntegerModuloOperand {
                left: 7.5,
                right: 3.0
            })
        );
    }

    #[test]
    fn test_compile_errors() {
        assert_eq!(
            Equation::new("x +", &["x"]).unwrap_err(),
            CompileError::UnbalancedExpression
        );
        assert_eq!(
            Equation::new("sin(x", &["x"]).unwrap_err(),
            CompileError::UnbalancedParentheses
        );
        assert_eq!(
            Equation::new("y", &["x"]).unwrap_err(),
            CompileError::UndeclaredIdentifier("y".to_string())
        );
        assert_eq!(
            Equation::new("   ", &["x"]).unwrap_err(),
            CompileError::EmptyExpression
        );
    }

    #[test]
    fn test_variable_count_mismatch() {
        let eq = Equation::new("x", &["x"]).unwrap();
        assert_eq!(
            eq.eval(&Vec::<f64>::new()),
            Err(EvalError::VariableCountMismatch {
                expected: 1,
                got: 0
            })
        );
        // The equation is still usable afterwards
        assert_eq!(eq.eval(&[3.0]).unwrap(), 3.0);
    }

    #[test]
    fn test_deterministic_and_round_trip() {
        let a = Equation::new("exp(x) * sin(y) / (1 + x^2)", &["x", "y"]).unwrap();
        let b = Equation::new("exp(x) * sin(y) / (1 + x^2)", &["x", "y"]).unwrap();
        let values = [0.3, 1.7];
        let first = a.eval(&values).unwrap();
        for _ in 0..10 {
            assert_eq!(a.eval(&values).unwrap().to_bits(), first.to_bits());
        }
        assert_eq!(b.eval(&values).unwrap().to_bits(), first.to_bits());
        assert_eq!(a.program(), b.program());
    }

    #[test]
    fn test_variable_declaration() {
        assert_eq!(
            Equation::declare(&["x", "sin"]).unwrap_err(),
            CompileError::ReservedWordAsVariable("sin".to_string())
        );
        assert_eq!(
            Equation::declare(&["pi"]).unwrap_err(),
            CompileError::ReservedWordAsVariable("pi".to_string())
        );
        assert_eq!(
            Equation::declare(&["if"]).unwrap_err(),
            CompileError::ReservedWordAsVariable("if".to_string())
        );
        assert_eq!(
            Equation::declare(&["x", "y", "x"]).unwrap_err(),
            CompileError::DuplicateVariable("x".to_string())
        );
        for name in ["", "1x", "x-y", "x y", "é"] {
            assert_eq!(
                Equation::declare(&[name]).unwrap_err(),
                CompileError::InvalidVariableName(name.to_string())
            );
        }
        assert!(Equation::declare(&["_k", "k_m", "x2"]).is_ok());
    }

    #[test]
    fn test_reserved_word_rejected_before_parsing() {
        // The expression is malformed too, but the declaration fails first
        assert_eq!(
            Equation::new("((", &["log"]).unwrap_err(),
            CompileError::ReservedWordAsVariable("log".to_string())
        );
    }

    #[test]
    fn test_not_compiled() {
        let template = Equation::declare(&["x"]).unwrap();
        assert!(!template.is_compiled());
        assert_eq!(template.expression(), "");
        assert!(template.program().is_none());
        assert_eq!(template.eval(&[1.0]), Err(EvalError::NotCompiled));
        assert_eq!(
            template.eval_rows(&vec![[1.0]]),
            Err(EvalError::NotCompiled)
        );
        assert_eq!(
            template.eval_parallel(&[vec![1.0]]),
            Err(EvalError::NotCompiled)
        );
    }

    #[test]
    fn test_compile_keeps_template() {
        let template = Equation::declare(&["x"]).unwrap();
        let eq = template.compile("x + 1").unwrap();
        assert!(template.compile("x +").is_err());
        assert!(!template.is_compiled());
        assert_eq!(eq.expression(), "x + 1");
        assert_eq!(eq.variables(), &["x".to_string()]);
        assert_eq!(eq.eval(&[1.0]).unwrap(), 2.0);
    }

    #[test]
    fn test_whitespace_and_identifiers() {
        assert_eq!(eval("k_m * -x", &["x", "k_m"], &[2.0, 3.0]), -6.0);
        assert_eq!(eval("x2-x1", &["x1", "x2"], &[1.0, 4.0]), 3.0);
        assert_eq!(eval("1.5d3 + 2.5e-1", &[], &[]), 1500.25);
    }

    #[test]
    fn test_eval_rows() {
        let eq = Equation::new("x - y", &["x", "y"]).unwrap();
        let rows = vec![[3.0, 1.0], [10.0, 4.0], [0.0, 0.5]];
        assert_eq!(eq.eval_rows(&rows).unwrap(), vec![2.0, 6.0, -0.5]);

        let mut out = [0.0; 3];
        eq.eval_rows_into(&rows, &mut out).unwrap();
        assert_eq!(out, [2.0, 6.0, -0.5]);

        let mut short = [0.0; 2];
        assert_eq!(
            eq.eval_rows_into(&rows, &mut short),
            Err(EvalError::OutputLengthMismatch {
                expected: 3,
                got: 2
            })
        );

        let narrow = vec![[1.0]];
        assert_eq!(
            eq.eval_rows(&narrow),
            Err(EvalError::VariableCountMismatch {
                expected: 2,
                got: 1
            })
        );
    }

    #[test]
    fn test_eval_parallel() {
        let eq = Equation::new("x * y + 1", &["x", "y"]).unwrap();
        let inputs: Vec<Vec<f64>> = (0..1000).map(|i| vec![i as f64, 2.0]).collect();
        let results = eq.eval_parallel(&inputs).unwrap();
        assert_eq!(results.len(), 1000);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(*result, i as f64 * 2.0 + 1.0);
        }

        let mut bad = inputs.clone();
        bad[500] = vec![1.0];
        assert_eq!(
            eq.eval_parallel(&bad),
            Err(EvalError::VariableCountMismatch {
                expected: 2,
                got: 1
            })
        );
        assert_eq!(eq.eval_parallel(&[]).unwrap(), Vec::<f64>::new());
    }

    #[cfg(feature = "ndarray")]
    #[test]
    fn test_ndarray_inputs() {
        use ndarray::{array, Array1};

        let eq = Equation::new("x + y", &["x", "y"]).unwrap();
        assert_eq!(eq.eval(&Array1::from(vec![1.0, 2.0])).unwrap(), 3.0);

        let rows = array![[1.0, 2.0], [3.0, 4.0]];
        let mut out = <Array1<f64> as Vector>::zeros(2);
        eq.eval_rows_into(&rows, &mut out).unwrap();
        assert_eq!(out, array![3.0, 7.0]);
    }

    #[cfg(feature = "nalgebra")]
    #[test]
    fn test_nalgebra_inputs() {
        use nalgebra::{DMatrix, DVector};

        let eq = Equation::new("x / y", &["x", "y"]).unwrap();
        assert_eq!(eq.eval(&DVector::from_vec(vec![6.0, 3.0])).unwrap(), 2.0);

        let rows = DMatrix::from_row_slice(2, 2, &[6.0, 3.0, 1.0, 4.0]);
        assert_eq!(eq.eval_rows(&rows).unwrap(), vec![2.0, 0.25]);
    }

    #[test]
    fn test_debug_and_display() {
        colored::control::set_override(false);
        let eq = Equation::new("x * 2", &["x"]).unwrap();
        assert_eq!(eq.to_string(), "x * 2 (vars: x)");
        let debug = format!("{eq:?}");
        assert!(debug.contains("Program: x 2 * end"));
        assert!(debug.contains("Stack Depth: 2"));
    }

    #[test]
    fn test_equation_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Equation>();
    }
}
