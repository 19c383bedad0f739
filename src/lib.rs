//! Compile arithmetic and logical expressions once, evaluate them many times.
//!
//! An expression is tokenized, classified against a fixed list of variable
//! names and turned into a postfix program by a shunting-yard parser. The
//! program is then run on a small stack machine with a different value vector
//! on every call, which is far cheaper than parsing the text again.
//!
//! # Features
//!
//! - Binary operators `+ - * / ^ && || == != < > <= >=` and unary `+ -`
//! - Functions `sin cos tan asin acos atan atan2 exp log abs mod if` and the
//!   constant `pi`
//! - Positional variable binding from `Vec<f64>`, arrays, or (behind the
//!   `ndarray` / `nalgebra` features) those crates' vector and matrix types
//! - Batch evaluation over matrix rows or in parallel with rayon
//! - A registry handing out stable ids, for binding layers
//!
//! # Example
//!
//! ```rust
//! use eqnibbler::Equation;
//!
//! // Compile once
//! let eq = Equation::new("if(x > 0, sin(x), -x) * k", &["x", "k"]).unwrap();
//!
//! // Evaluate often
//! assert_eq!(eq.eval(&[-2.0, 3.0]).unwrap(), 6.0);
//! assert!((eq.eval(&[std::f64::consts::FRAC_PI_2, 1.0]).unwrap() - 1.0).abs() < 1e-12);
//! ```
//!
//! Comparison and logical operators are ranked apart from arithmetic ones and
//! never flush an arithmetic operator from the parser's stack, so
//! `3 + 1 > 2` reads as `3 + (1 > 2)`. Bracket mixed expressions.

/// Prints to stderr when the `debug` feature is enabled.
macro_rules! debug {
    ($($args:tt)*) => {
        if cfg!(feature = "debug") {
            eprintln!($($args)*);
        }
    };
}

pub use equation::Equation;
pub use errors::{CompileError, EvalError};
pub use program::Program;
pub use registry::{EquationId, Registry};

pub mod prelude {
    pub use crate::backends::matrix::Matrix;
    pub use crate::backends::vector::Vector;
    pub use crate::equation::Equation;
    pub use crate::errors::{CompileError, EvalError};
    pub use crate::program::Program;
    pub use crate::registry::{EquationId, Registry};
}

/// Container types that can supply variable values
pub mod backends {
    pub mod matrix;
    pub mod vector;
}
/// Semantic token classification
pub mod classify;
/// High-level equation handling
pub mod equation;
/// Error types for the various failure modes
pub mod errors;
/// Postfix stack machine
pub mod eval;
/// Character-level tokenizer
pub mod lexer;
/// Shunting-yard parser
pub mod parser;
/// Validated postfix programs
pub mod program;
/// Append-only equation storage
pub mod registry;
/// Tokens, operators, functions and constants
pub mod token;
