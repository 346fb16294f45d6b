//! An untyped λ-calculus engine: parsing, capture-avoiding substitution, a
//! family of reduction strategies, and Church decoding.

pub mod church;
pub mod environment;
pub mod error;
pub mod expression;
pub mod parser;
pub mod prelude;
mod printer;
pub mod reducer;
pub mod term;

pub use error::{DivergenceError, Error, ParseError, ShapeError};
pub use expression::Expression;
