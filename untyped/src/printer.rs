use std::fmt;

use crate::term::Term;

fn parenthesized(term: &Term, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("(")?;
    fmt::Display::fmt(term, f)?;
    f.write_str(")")
}

/// Canonical concrete syntax. The alternate form (`{:#}`) writes `λ` as the
/// binder instead of `\`.
impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Variable(x) => f.write_str(x),
            Term::Abstraction(param, body) => {
                f.write_str(if f.alternate() { "λ" } else { "\\" })?;
                f.write_str(param)?;
                f.write_str(".")?;
                fmt::Display::fmt(body.as_ref(), f)
            }
            Term::Application(lhs, rhs) => {
                if lhs.is_abstraction() {
                    parenthesized(lhs, f)?;
                } else {
                    fmt::Display::fmt(lhs.as_ref(), f)?;
                }
                f.write_str(" ")?;
                match rhs.as_ref() {
                    Term::Variable(_) => fmt::Display::fmt(rhs.as_ref(), f),
                    _ => parenthesized(rhs, f),
                }
            }
        }
    }
}

impl Term {
    pub fn to_source(&self) -> String {
        self.to_string()
    }
}
