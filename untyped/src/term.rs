use std::{collections::BTreeSet, rc::Rc};

use crate::prelude::*;

pub type TermRef = Rc<Term>;

#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Term {
    /// `x`
    Variable(Identifier),
    /// `\x. t`
    Abstraction(Identifier, TermRef),
    /// `t t`
    Application(TermRef, TermRef),
}

macro_rules! var {
    ($x:ident) => {
        $crate::term::Term::Variable($crate::prelude::Identifier::new(
            stringify!($x).to_string(),
        ))
    };
}
macro_rules! abs {
    ($x:ident, $body:expr) => {
        $crate::term::Term::Abstraction(
            $crate::prelude::Identifier::new(stringify!($x).to_string()),
            ::std::rc::Rc::new($body),
        )
    };
}
macro_rules! app {
    ($lhs:expr, $rhs:expr) => {
        $crate::term::Term::Application(::std::rc::Rc::new($lhs), ::std::rc::Rc::new($rhs))
    };
    ($lhs:expr, $rhs:expr, $($rest:expr),+) => {
        $crate::term::app!($crate::term::app!($lhs, $rhs), $($rest),+)
    };
}
pub(crate) use {abs, app, var};

impl Term {
    pub fn abstraction(param: Identifier, body: impl Into<TermRef>) -> Self {
        Term::Abstraction(param, body.into())
    }

    pub fn application(lhs: impl Into<TermRef>, rhs: impl Into<TermRef>) -> Self {
        Term::Application(lhs.into(), rhs.into())
    }

    pub fn is_abstraction(&self) -> bool {
        matches!(self, Term::Abstraction(_, _))
    }

    /// The redex `(\x. body) arg` contracted, if `self` is one.
    pub fn contract(&self) -> Option<Term> {
        match self {
            Term::Application(lhs, arg) => match lhs.as_ref() {
                Term::Abstraction(param, body) => Some(body.substitute(param, arg)),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn free_variables(&self) -> BTreeSet<Identifier> {
        fn rec<'a>(term: &'a Term, bound: &mut Vec<&'a Identifier>, out: &mut BTreeSet<Identifier>) {
            match term {
                Term::Variable(x) => {
                    if !bound.contains(&x) {
                        out.insert(x.clone());
                    }
                }
                Term::Abstraction(param, body) => {
                    bound.push(param);
                    rec(body, bound, out);
                    bound.pop();
                }
                Term::Application(lhs, rhs) => {
                    rec(lhs, bound, out);
                    rec(rhs, bound, out);
                }
            }
        }
        let mut out = BTreeSet::new();
        rec(self, &mut vec![], &mut out);
        out
    }

    pub fn occurs_free(&self, name: &str) -> bool {
        match self {
            Term::Variable(x) => x.as_str() == name,
            Term::Abstraction(param, body) => param.as_str() != name && body.occurs_free(name),
            Term::Application(lhs, rhs) => lhs.occurs_free(name) || rhs.occurs_free(name),
        }
    }

    /// `self[name := replacement]`, renaming binders that would capture a free
    /// variable of `replacement`.
    pub fn substitute(&self, name: &Identifier, replacement: &Term) -> Term {
        match self {
            Term::Variable(x) if x == name => replacement.clone(),
            Term::Variable(_) => self.clone(),
            Term::Application(lhs, rhs) => Term::Application(
                lhs.substitute(name, replacement).into(),
                rhs.substitute(name, replacement).into(),
            ),
            Term::Abstraction(param, _) if param == name => self.clone(),
            Term::Abstraction(param, body)
                if replacement.occurs_free(param) && body.occurs_free(name) =>
            {
                let mut avoid = body.free_variables();
                avoid.extend(replacement.free_variables());
                let fresh = fresh_name(param, &avoid);
                let body = body.substitute(param, &Term::Variable(fresh.clone()));
                Term::Abstraction(fresh, body.substitute(name, replacement).into())
            }
            Term::Abstraction(param, body) => {
                Term::Abstraction(param.clone(), body.substitute(name, replacement).into())
            }
        }
    }

    pub fn alpha_eq(&self, other: &Term) -> bool {
        anonymize(self) == anonymize(other)
    }
}

/// `base` with its numeric suffix replaced by the smallest one not in `avoid`.
pub fn fresh_name(base: &str, avoid: &BTreeSet<Identifier>) -> Identifier {
    let stem = base.trim_end_matches(|c: char| c.is_ascii_digit());
    let mut suffix = 1usize;
    loop {
        let candidate = format!("{stem}{suffix}");
        if !avoid.contains(&candidate) {
            return Identifier::new(candidate);
        }
        suffix += 1;
    }
}

/// Bound variables as de Bruijn indices, free ones by name.
#[derive(PartialEq, Eq, Debug)]
enum Nameless<'a> {
    Bound(usize),
    Free(&'a str),
    Abstraction(Box<Nameless<'a>>),
    Application(Box<Nameless<'a>>, Box<Nameless<'a>>),
}

fn anonymize(term: &Term) -> Nameless<'_> {
    fn rec<'a>(table: &mut Vec<&'a str>, term: &'a Term) -> Nameless<'a> {
        match term {
            Term::Variable(x) => table
                .iter()
                .rev()
                .position(|bound| *bound == x.as_str())
                .map(Nameless::Bound)
                .unwrap_or(Nameless::Free(x)),
            Term::Abstraction(param, body) => {
                table.push(param);
                let body = rec(table, body);
                table.pop();
                Nameless::Abstraction(body.into())
            }
            Term::Application(lhs, rhs) => {
                let lhs = rec(table, lhs);
                let rhs = rec(table, rhs);
                Nameless::Application(lhs.into(), rhs.into())
            }
        }
    }
    rec(&mut vec![], term)
}
