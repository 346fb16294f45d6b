use chumsky::error::SimpleReason;
use thiserror::Error;

use crate::prelude::*;

/// Malformed source text.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
#[error("{message} at position {position}")]
pub struct ParseError {
    pub message: String,
    /// Character offset where the problem starts.
    pub position: usize,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            position: span.start,
            span,
        }
    }

    /// Keeps the first of the errors chumsky reported.
    pub fn first(errors: Vec<ParseError>) -> Self {
        errors
            .into_iter()
            .next()
            .unwrap_or_else(|| Self::new("Unparsable input", 0..0))
    }
}

impl From<SyntaxError> for ParseError {
    fn from(e: SyntaxError) -> Self {
        let found = e.found().map(String::as_str).unwrap_or("end of the input");
        let message = match e.reason() {
            SimpleReason::Unexpected => {
                let mut expected = e
                    .expected()
                    .map(|t| t.as_ref().map(String::as_str).unwrap_or("end of the input"))
                    .collect::<Vec<_>>();
                expected.sort_unstable();
                expected.dedup();
                let expected = if expected.is_empty() {
                    match e.label() {
                        Some(label) => label.to_string(),
                        None => "something else".to_string(),
                    }
                } else {
                    expected.join(", ")
                };
                format!("Unexpected {found}, expected {expected}")
            }
            SimpleReason::Unclosed { delimiter, .. } => {
                format!("Unclosed delimiter {delimiter}, found {found}")
            }
            SimpleReason::Custom(msg) => msg.clone(),
        };
        Self::new(message, e.span())
    }
}

/// A strategy used up its step budget without reaching its stopping form.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
#[error("{strategy} reduction did not terminate within {steps_taken} steps")]
pub struct DivergenceError {
    pub strategy: &'static str,
    pub steps_taken: usize,
}

/// A reduced term is not the Church encoding that was asked for.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
#[error("Expected a term of the form {expected_form}")]
pub struct ShapeError {
    pub expected_form: &'static str,
}

#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Divergence(#[from] DivergenceError),
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
