//! Classifier: turns raw lexemes into semantic tokens.
//!
//! Words are resolved in a fixed order: built-in functions, then constants,
//! then the equation's declared variables. Variables are recorded by their
//! position in the declaration, so evaluation never needs a name lookup.
//!
//! The classifier also rejects two consecutive tokens of the same class
//! (except brackets) and appends the `End` sentinel.

use crate::errors::CompileError;
use crate::lexer::{Lexeme, RawToken};
use crate::token::{constant, BinaryOperator, Function, Token, UnaryOperator};

/// Classifies `raw` against the declared `variables`.
///
/// # Errors
/// * `CompileError::EmptyExpression` when there is nothing to classify
/// * `CompileError::UnknownToken` for operators or separators outside the grammar
/// * `CompileError::MalformedNumber` for numeric text that does not parse
/// * `CompileError::UndeclaredIdentifier` for unresolvable words
/// * `CompileError::AdjacentTokenConflict` for illegal same-class neighbours
pub fn classify(raw: &[RawToken], variables: &[String]) -> Result<Vec<Token>, CompileError> {
    if raw.is_empty() {
        return Err(CompileError::EmptyExpression);
    }

    let mut tokens = Vec::with_capacity(raw.len() + 1);
    let mut previous: Option<(Token, &str)> = None;

    for lexeme in raw {
        let token = classify_lexeme(lexeme, variables)?;

        if let Some((last, text)) = previous {
            if last.class() == token.class() && !token.is_bracket() {
                return Err(CompileError::AdjacentTokenConflict {
                    previous: text.to_string(),
                    current: lexeme.text.clone(),
                });
            }
        }

        previous = Some((token, lexeme.text.as_str()));
        tokens.push(token);
    }

    tokens.push(Token::End);
    Ok(tokens)
}

fn classify_lexeme(lexeme: &RawToken, variables: &[String]) -> Result<Token, CompileError> {
    let text = lexeme.text.as_str();
    let unknown = || CompileError::UnknownToken(text.to_string());

    match lexeme.kind {
        Lexeme::Operator => BinaryOperator::from_symbol(text)
            .map(Token::Binary)
            .ok_or_else(unknown),
        Lexeme::UnaryOperator => UnaryOperator::from_symbol(text)
            .map(Token::Unary)
            .ok_or_else(unknown),
        Lexeme::Number => parse_number(text).map(Token::Number),
        Lexeme::Word => classify_word(text, variables),
        Lexeme::Separator => match text {
            "(" => Ok(Token::LeftBracket),
            ")" => Ok(Token::RightBracket),
            "," => Ok(Token::Comma),
            _ => Err(unknown()),
        },
    }
}

fn classify_word(word: &str, variables: &[String]) -> Result<Token, CompileError> {
    if let Some(function) = Function::from_name(word) {
        return Ok(Token::Function(function));
    }
    if let Some(value) = constant(word) {
        return Ok(Token::Constant(value));
    }
    variables
        .iter()
        .position(|variable| variable == word)
        .map(Token::Variable)
        .ok_or_else(|| CompileError::UndeclaredIdentifier(word.to_string()))
}

/// Parses a numeric lexeme; `d` is accepted as an exponent marker.
fn parse_number(text: &str) -> Result<f64, CompileError> {
    text.replace('d', "e")
        .parse::<f64>()
        .map_err(|_| CompileError::MalformedNumber(text.to_string()))
}
