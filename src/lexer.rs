//! Tokenizer: splits expression text into raw lexemes.
//!
//! Every character is classified as a digit, a letter or punctuation, and
//! consecutive characters of the same class are accumulated into one lexeme.
//! A handful of context rules refine the class of a character before that
//! comparison happens:
//!
//! 1. a digit after a letter continues a word (`atan2`)
//! 2. `.` always belongs to a number
//! 3. `e` or `d` right after a number character is an exponent marker
//! 4. a sign right after such a marker stays in the number (`1e-5`)
//! 5. `(`, `)` and `,` are separators and always stand alone
//! 6. a sign that cannot be a binary operator is a unary operator
//!
//! Whitespace only ends the current lexeme.

use std::iter;

use crate::errors::CompileError;

/// Lexical category of a raw lexeme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lexeme {
    Number,
    Word,
    Operator,
    UnaryOperator,
    Separator,
}

/// A lexeme together with its source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawToken {
    pub kind: Lexeme,
    pub text: String,
}

impl RawToken {
    fn new(kind: Lexeme, text: String) -> Self {
        Self { kind, text }
    }
}

/// Splits `expression` into raw lexemes.
///
/// # Errors
/// * `CompileError::EmptyExpression` if the text holds nothing but whitespace
/// * `CompileError::UnknownToken` for characters outside printable ASCII
pub fn tokenize(expression: &str) -> Result<Vec<RawToken>, CompileError> {
    if expression.trim().is_empty() {
        return Err(CompileError::EmptyExpression);
    }

    let mut tokens = Vec::new();
    let mut buffer = String::new();
    let mut current: Option<Lexeme> = None;
    let mut previous_char: Option<char> = None;
    // Last non-whitespace character and its class, used for sign disambiguation
    let mut significant: Option<(char, Lexeme)> = None;

    // The trailing space flushes the final lexeme
    for c in expression.chars().chain(iter::once(' ')) {
        let mut class = classify_char(c)?;

        if class == Some(Lexeme::Number) && current == Some(Lexeme::Word) {
            class = Some(Lexeme::Word);
        }
        if c == '.' {
            class = Some(Lexeme::Number);
        }
        if matches!(c, 'e' | 'd') && current == Some(Lexeme::Number) {
            class = Some(Lexeme::Number);
        }
        if matches!(c, '+' | '-')
            && matches!(previous_char, Some('e' | 'd'))
            && current == Some(Lexeme::Number)
        {
            class = Some(Lexeme::Number);
        }
        if matches!(c, '(' | ')' | ',') {
            class = Some(Lexeme::Separator);
        }
        if matches!(c, '+' | '-') && class == Some(Lexeme::Operator) && !follows_operand(significant)
        {
            class = Some(Lexeme::UnaryOperator);
        }

        if class != current || current == Some(Lexeme::Separator) {
            if let Some(kind) = current {
                tokens.push(RawToken::new(kind, std::mem::take(&mut buffer)));
            }
            buffer.clear();
        }

        if let Some(kind) = class {
            buffer.push(c);
            significant = Some((c, kind));
        }
        current = class;
        previous_char = Some(c);
    }

    debug!(
        "lexer: {:?}",
        tokens.iter().map(|t| t.text.as_str()).collect::<Vec<_>>()
    );

    Ok(tokens)
}

/// Base class of a single character; `None` for whitespace.
fn classify_char(c: char) -> Result<Option<Lexeme>, CompileError> {
    if c.is_ascii_digit() {
        Ok(Some(Lexeme::Number))
    } else if c.is_ascii_alphabetic() || c == '_' {
        Ok(Some(Lexeme::Word))
    } else if c.is_ascii_punctuation() {
        Ok(Some(Lexeme::Operator))
    } else if c.is_whitespace() {
        Ok(None)
    } else {
        Err(CompileError::UnknownToken(c.to_string()))
    }
}

/// A sign is a binary operator only when it follows something that produces
/// a value: a number, a word, or a closing bracket.
fn follows_operand(significant: Option<(char, Lexeme)>) -> bool {
    matches!(
        significant,
        Some((_, Lexeme::Number | Lexeme::Word)) | Some((')', _))
    )
}
