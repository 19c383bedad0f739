//! Append-only storage for compiled equations.
//!
//! The registry hands out an `EquationId` for every equation that compiles
//! and never removes or reorders entries, so an id stays valid for the
//! registry's lifetime. Registration takes `&mut self` and evaluation `&self`:
//! once registration is over the registry can be shared across threads.
//!
//! # Example
//!
//! ```
//! use eqnibbler::Registry;
//!
//! let mut registry = Registry::new();
//! let area = registry.register("pi * r^2", &["r"]).unwrap();
//! let hyp = registry.register("(a^2 + b^2)^0.5", &["a", "b"]).unwrap();
//!
//! assert_eq!(registry.evaluate(hyp, &[3.0, 4.0]).unwrap(), 5.0);
//! assert!((registry.evaluate(area, &[1.0]).unwrap() - std::f64::consts::PI).abs() < 1e-12);
//! ```

use std::fmt;

use crate::equation::Equation;
use crate::errors::{CompileError, EvalError};

/// Identifier of a registered equation: its 0-based insertion index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EquationId(usize);

impl EquationId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for EquationId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl From<EquationId> for usize {
    fn from(id: EquationId) -> Self {
        id.0
    }
}

impl fmt::Display for EquationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Owns compiled equations and addresses them by `EquationId`.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    equations: Vec<Equation>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles `expression` over `variables` and stores it.
    ///
    /// Nothing is stored when compilation fails, so ids stay dense.
    ///
    /// # Errors
    /// Any `CompileError` from `Equation::new`.
    pub fn register<S: AsRef<str>>(
        &mut self,
        expression: &str,
        variables: &[S],
    ) -> Result<EquationId, CompileError> {
        let equation = Equation::new(expression, variables)?;
        Ok(self.insert(equation))
    }

    /// Stores an already compiled equation.
    ///
    /// # Errors
    /// `EvalError::NotCompiled` for a bare declaration, which could never be
    /// evaluated.
    pub fn push(&mut self, equation: Equation) -> Result<EquationId, EvalError> {
        if !equation.is_compiled() {
            return Err(EvalError::NotCompiled);
        }
        Ok(self.insert(equation))
    }

    fn insert(&mut self, equation: Equation) -> EquationId {
        let id = EquationId(self.equations.len());
        debug!("registered {} as {}", equation.expression(), id);
        self.equations.push(equation);
        id
    }

    /// Evaluates the equation registered under `id`.
    ///
    /// # Errors
    /// * `EvalError::InvalidEquationId` if `id` was never returned by this
    ///   registry
    /// * any error `Equation::eval` can return
    pub fn evaluate(&self, id: EquationId, values: &[f64]) -> Result<f64, EvalError> {
        self.get(id)?.eval_slice(values)
    }

    /// Evaluates every registered equation against the same values, in
    /// registration order.
    ///
    /// # Errors
    /// The first error hit; every equation must declare `values.len()`
    /// variables.
    pub fn evaluate_all(&self, values: &[f64]) -> Result<Vec<f64>, EvalError> {
        self.equations
            .iter()
            .map(|equation| equation.eval_slice(values))
            .collect()
    }

    /// # Errors
    /// `EvalError::InvalidEquationId` if `id` is out of range.
    pub fn get(&self, id: EquationId) -> Result<&Equation, EvalError> {
        self.equations
            .get(id.0)
            .ok_or(EvalError::InvalidEquationId(id.0))
    }

    pub fn len(&self) -> usize {
        self.equations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.equations.is_empty()
    }

    /// Iterates over `(id, equation)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (EquationId, &Equation)> {
        self.equations
            .iter()
            .enumerate()
            .map(|(index, equation)| (EquationId(index), equation))
    }
}
