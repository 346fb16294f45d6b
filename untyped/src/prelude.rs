use std::rc::Rc;

/// Name of a variable or of an abstraction's parameter.
pub type Identifier = Rc<String>;

/// Character offsets into the source text.
pub type Span = std::ops::Range<usize>;

#[derive(derive_more::AsRef, Clone, PartialEq, Eq, derive_more::Display, Debug)]
#[display(bound = "T: std::fmt::Display")]
#[display(fmt = "{value}")]
pub struct Spanned<T> {
    pub span: Span,
    #[as_ref]
    pub value: T,
}
impl<T> Spanned<T> {
    pub fn forget_span(self) -> T {
        self.value
    }
    pub fn value(&self) -> &T {
        &self.value
    }
}

/// What chumsky reports while lexing or parsing, with the offending token
/// already rendered to text.
pub type SyntaxError<I = String> = chumsky::error::Simple<I, Span>;
