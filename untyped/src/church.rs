//! Church encodings of natural numbers and booleans.
//!
//! The decoders are pure pattern matches: they expect a term that has already
//! been brought to normal form.

use crate::{
    error::ShapeError,
    term::{abs, app, var, Term},
};

pub const NUMERAL_FORM: &str = r"\f.\x.f (f ... (f x))";
pub const BOOLEAN_FORM: &str = r"\t.\f.t or \t.\f.f";

/// `\f.\x. f^n x`
pub fn numeral(n: u64) -> Term {
    let mut body = var!(x);
    for _ in 0..n {
        body = app!(var!(f), body);
    }
    abs!(f, abs!(x, body))
}

pub fn boolean(p: bool) -> Term {
    if p {
        abs!(t, abs!(f, var!(t)))
    } else {
        abs!(t, abs!(f, var!(f)))
    }
}

pub fn decode_numeral(term: &Term) -> Result<u64, ShapeError> {
    let shape = ShapeError {
        expected_form: NUMERAL_FORM,
    };
    let (f, x, mut body) = match term {
        Term::Abstraction(f, body) => match body.as_ref() {
            Term::Abstraction(x, body) => (f, x, body.as_ref()),
            _ => return Err(shape),
        },
        _ => return Err(shape),
    };
    let mut n = 0;
    loop {
        match body {
            Term::Variable(v) if v == x => return Ok(n),
            // `f` is shadowed when both binders share a name
            Term::Application(g, arg) if f != x && matches!(g.as_ref(), Term::Variable(g) if g == f) => {
                n += 1;
                body = arg.as_ref();
            }
            _ => return Err(shape),
        }
    }
}

pub fn decode_boolean(term: &Term) -> Result<bool, ShapeError> {
    if let Term::Abstraction(t, body) = term {
        if let Term::Abstraction(f, body) = body.as_ref() {
            if let Term::Variable(v) = body.as_ref() {
                // `\a.\a.a` is false: the inner binder wins
                if v == f {
                    return Ok(false);
                }
                if v == t {
                    return Ok(true);
                }
            }
        }
    }
    Err(ShapeError {
        expected_form: BOOLEAN_FORM,
    })
}

/// `\n.\f.\x.f (n f x)`
pub fn succ() -> Term {
    abs!(n, abs!(f, abs!(x, app!(var!(f), app!(var!(n), var!(f), var!(x))))))
}

/// `\m.\n.\f.\x.m f (n f x)`
pub fn add() -> Term {
    abs!(
        m,
        abs!(
            n,
            abs!(
                f,
                abs!(x, app!(var!(m), var!(f), app!(var!(n), var!(f), var!(x))))
            )
        )
    )
}

/// `\m.\n.\f.m (n f)`
pub fn mul() -> Term {
    abs!(m, abs!(n, abs!(f, app!(var!(m), app!(var!(n), var!(f))))))
}

/// `\p.\a.\b.p b a`
pub fn not() -> Term {
    abs!(p, abs!(a, abs!(b, app!(var!(p), var!(b), var!(a)))))
}

/// `\p.\q.p q p`
pub fn and() -> Term {
    abs!(p, abs!(q, app!(var!(p), var!(q), var!(p))))
}

/// `\p.\q.p p q`
pub fn or() -> Term {
    abs!(p, abs!(q, app!(var!(p), var!(p), var!(q))))
}

/// `\p.\q.p (not q) q`
pub fn xor() -> Term {
    abs!(p, abs!(q, app!(var!(p), app!(not(), var!(q)), var!(q))))
}
