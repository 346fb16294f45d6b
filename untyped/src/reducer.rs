//! Beta-reduction strategies.
//!
//! Every strategy is a small-step relation: [`Strategy::step`] contracts the
//! next redex in the strategy's search order, or returns `None` once the term
//! is in the strategy's stopping form. [`Reducer`] drives any of them under a
//! step budget.

use tracing::{debug, trace, warn};

use crate::{
    error::DivergenceError,
    term::{Term, TermRef},
};

pub const DEFAULT_STEP_BUDGET: usize = 10_000;

/// Deepest term the reducer keeps rewriting. Strategies and substitution
/// recurse along the term, so this bounds their stack use.
pub const MAX_TERM_DEPTH: usize = 1_000;

/// Largest term, in nodes, the reducer keeps rewriting. Bounds the cost of a
/// single step.
pub const MAX_TERM_SIZE: usize = 10_000;

pub trait Strategy {
    fn name(&self) -> &'static str;

    /// One rewrite, or `None` if `term` is already in this strategy's
    /// stopping form.
    fn step(&self, term: &Term) -> Option<Term>;
}

fn step_lhs(step: impl Fn(&Term) -> Option<Term>, lhs: &Term, rhs: &TermRef) -> Option<Term> {
    step(lhs).map(|lhs| Term::Application(lhs.into(), rhs.clone()))
}

fn step_rhs(step: impl Fn(&Term) -> Option<Term>, lhs: &TermRef, rhs: &Term) -> Option<Term> {
    step(rhs).map(|rhs| Term::Application(lhs.clone(), rhs.into()))
}

fn step_body(step: impl Fn(&Term) -> Option<Term>, term: &Term) -> Option<Term> {
    match term {
        Term::Abstraction(param, body) => {
            step(body).map(|body| Term::Abstraction(param.clone(), body.into()))
        }
        _ => None,
    }
}

/// Leftmost-innermost, never under an abstraction: the operator, then the
/// argument, then the redex once neither side has a step left. Stops at weak
/// normal form.
#[derive(Clone, Copy, Default, Debug)]
pub struct CallByValue;

impl Strategy for CallByValue {
    fn name(&self) -> &'static str {
        "call-by-value"
    }

    fn step(&self, term: &Term) -> Option<Term> {
        match term {
            Term::Application(lhs, rhs) => step_lhs(|t| self.step(t), lhs, rhs)
                .or_else(|| step_rhs(|t| self.step(t), lhs, rhs))
                .or_else(|| term.contract()),
            _ => None,
        }
    }
}

/// Leftmost-outermost with unevaluated arguments, never under an
/// abstraction. Stops at weak head normal form.
#[derive(Clone, Copy, Default, Debug)]
pub struct CallByName;

impl Strategy for CallByName {
    fn name(&self) -> &'static str {
        "call-by-name"
    }

    fn step(&self, term: &Term) -> Option<Term> {
        match term {
            Term::Application(lhs, rhs) => term
                .contract()
                .or_else(|| step_lhs(|t| self.step(t), lhs, rhs)),
            _ => None,
        }
    }
}

/// Leftmost-outermost. With `deep` the search also enters abstraction bodies
/// and stops at normal form; without it, at weak normal form.
#[derive(Clone, Copy, Default, Debug)]
pub struct NormalOrder {
    pub deep: bool,
}

impl Strategy for NormalOrder {
    fn name(&self) -> &'static str {
        if self.deep {
            "normal order (deep)"
        } else {
            "normal order"
        }
    }

    fn step(&self, term: &Term) -> Option<Term> {
        match term {
            Term::Variable(_) => None,
            Term::Abstraction(_, _) => self
                .deep
                .then(|| step_body(|t| self.step(t), term))
                .flatten(),
            Term::Application(lhs, rhs) => term
                .contract()
                .or_else(|| step_lhs(|t| self.step(t), lhs, rhs))
                .or_else(|| step_rhs(|t| self.step(t), lhs, rhs)),
        }
    }
}

/// Innermost-leftmost: the operator, then the argument, then the redex
/// itself. `deep` as for [`NormalOrder`].
#[derive(Clone, Copy, Default, Debug)]
pub struct ApplicativeOrder {
    pub deep: bool,
}

impl Strategy for ApplicativeOrder {
    fn name(&self) -> &'static str {
        if self.deep {
            "applicative order (deep)"
        } else {
            "applicative order"
        }
    }

    fn step(&self, term: &Term) -> Option<Term> {
        match term {
            Term::Variable(_) => None,
            Term::Abstraction(_, _) => self
                .deep
                .then(|| step_body(|t| self.step(t), term))
                .flatten(),
            Term::Application(lhs, rhs) => step_lhs(|t| self.step(t), lhs, rhs)
                .or_else(|| step_rhs(|t| self.step(t), lhs, rhs))
                .or_else(|| term.contract()),
        }
    }
}

/// Reduces the head redex only, going under the leading abstractions. Stops
/// at head normal form `\x1...xn. y M1 ... Mk`; with `deep` it then carries
/// on into `M1 ... Mk` from left to right.
#[derive(Clone, Copy, Default, Debug)]
pub struct HeadSpine {
    pub deep: bool,
}

impl HeadSpine {
    /// Arguments are left alone until the whole head is normal.
    fn head_step(&self, term: &Term) -> Option<Term> {
        match term {
            Term::Variable(_) => None,
            Term::Abstraction(_, _) => step_body(|t| self.head_step(t), term),
            Term::Application(lhs, rhs) => term
                .contract()
                .or_else(|| step_lhs(|t| self.head_step(t), lhs, rhs)),
        }
    }

    /// Leftmost argument of the spine that still has a step.
    fn argument_step(&self, term: &Term) -> Option<Term> {
        match term {
            Term::Variable(_) => None,
            Term::Abstraction(_, _) => step_body(|t| self.argument_step(t), term),
            Term::Application(lhs, rhs) => step_lhs(|t| self.argument_step(t), lhs, rhs)
                .or_else(|| step_rhs(|t| self.step(t), lhs, rhs)),
        }
    }
}

impl Strategy for HeadSpine {
    fn name(&self) -> &'static str {
        if self.deep {
            "head spine (deep)"
        } else {
            "head spine"
        }
    }

    fn step(&self, term: &Term) -> Option<Term> {
        self.head_step(term)
            .or_else(|| self.deep.then(|| self.argument_step(term)).flatten())
    }
}

/// Successive results of a strategy, starting after the first step.
pub struct Steps<'s, S: ?Sized> {
    strategy: &'s S,
    term: Option<Term>,
}

impl<'s, S: Strategy + ?Sized> Iterator for Steps<'s, S> {
    type Item = Term;

    fn next(&mut self) -> Option<Term> {
        let next = self.strategy.step(self.term.as_ref()?);
        // shallow: children are shared
        self.term = next.clone();
        next
    }
}

pub fn steps<S: Strategy + ?Sized>(strategy: &S, term: Term) -> Steps<'_, S> {
    Steps {
        strategy,
        term: Some(term),
    }
}

/// Whether `term` stays within [`MAX_TERM_DEPTH`] and [`MAX_TERM_SIZE`].
/// Walks with an explicit stack, so an oversized term is rejected safely.
fn within_limits(term: &Term) -> bool {
    let mut pending = vec![(term, 1)];
    let mut size = 0;
    while let Some((term, depth)) = pending.pop() {
        size += 1;
        if depth > MAX_TERM_DEPTH || size > MAX_TERM_SIZE {
            return false;
        }
        match term {
            Term::Variable(_) => {}
            Term::Abstraction(_, body) => pending.push((body.as_ref(), depth + 1)),
            Term::Application(lhs, rhs) => {
                pending.push((lhs.as_ref(), depth + 1));
                pending.push((rhs.as_ref(), depth + 1));
            }
        }
    }
    true
}

/// Runs a strategy for at most `budget` rewrites, giving up early on a term
/// that outgrows [`MAX_TERM_DEPTH`] or [`MAX_TERM_SIZE`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Reducer {
    budget: usize,
}

impl Default for Reducer {
    fn default() -> Self {
        Self::new(DEFAULT_STEP_BUDGET)
    }
}

impl Reducer {
    pub fn new(budget: usize) -> Self {
        Self { budget }
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn reduce<S: Strategy + ?Sized>(
        &self,
        strategy: &S,
        term: &Term,
    ) -> Result<Term, DivergenceError> {
        let mut last = term.clone();
        self.run(strategy, term, |next| last = next)?;
        Ok(last)
    }

    /// Every intermediate term, ending with the stopping form.
    pub fn trace<S: Strategy + ?Sized>(
        &self,
        strategy: &S,
        term: &Term,
    ) -> Result<Vec<Term>, DivergenceError> {
        let mut terms = vec![];
        self.run(strategy, term, |next| terms.push(next))?;
        Ok(terms)
    }

    fn run<S: Strategy + ?Sized>(
        &self,
        strategy: &S,
        term: &Term,
        mut on_step: impl FnMut(Term),
    ) -> Result<(), DivergenceError> {
        let diverged = |steps_taken| DivergenceError {
            strategy: strategy.name(),
            steps_taken,
        };
        let mut taken = 0;
        for next in steps(strategy, term.clone()) {
            if taken == self.budget {
                warn!(
                    strategy = strategy.name(),
                    budget = self.budget,
                    "step budget exhausted"
                );
                return Err(diverged(taken));
            }
            taken += 1;
            if !within_limits(&next) {
                warn!(
                    strategy = strategy.name(),
                    step = taken,
                    max_depth = MAX_TERM_DEPTH,
                    max_size = MAX_TERM_SIZE,
                    "term outgrew the reduction limits"
                );
                return Err(diverged(taken));
            }
            trace!(strategy = strategy.name(), step = taken, term = %next);
            on_step(next);
        }
        debug!(strategy = strategy.name(), steps = taken, "reached stopping form");
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        parser::parse,
        term::{abs, app, var},
    };

    fn reduce(strategy: &impl Strategy, source: &str) -> Result<String, DivergenceError> {
        let term = parse(source).unwrap();
        Reducer::default()
            .reduce(strategy, &term)
            .map(|t| t.to_source())
    }

    fn omega() -> Term {
        let w = abs!(x, app!(var!(x), var!(x)));
        app!(w.clone(), w)
    }

    #[test]
    fn test_call_by_value() {
        let s = CallByValue;
        assert_eq!(reduce(&s, r"(\x.x) a").unwrap(), "a");
        assert_eq!(reduce(&s, r"(\x.\y.x y) a b").unwrap(), "a b");
        // not under abstractions
        assert_eq!(reduce(&s, r"\y.(\x.x) y").unwrap(), r"\y.(\x.x) y");
        // the argument is reduced first
        assert_eq!(
            CallByValue.step(&parse(r"(\x.f) ((\y.y) z)").unwrap()),
            Some(parse(r"(\x.f) z").unwrap())
        );
        // an argument with no step left is reduced enough
        assert_eq!(reduce(&s, r"(\x.a) (y z)").unwrap(), "a");
        assert_eq!(reduce(&s, r"(\x.x) (y ((\z.z) w))").unwrap(), "y w");
        // a diverging argument diverges even if it is discarded
        assert!(reduce(&s, r"(\x.a) ((\x.x x) (\x.x x))").is_err());
    }

    #[test]
    fn test_call_by_name() {
        let s = CallByName;
        assert_eq!(reduce(&s, r"(\x.x) a").unwrap(), "a");
        assert_eq!(reduce(&s, r"(\x.a) ((\x.x x) (\x.x x))").unwrap(), "a");
        // arguments and bodies are left alone
        assert_eq!(reduce(&s, r"f ((\x.x) a)").unwrap(), r"f ((\x.x) a)");
        assert_eq!(reduce(&s, r"\y.(\x.x) y").unwrap(), r"\y.(\x.x) y");
        assert_eq!(
            reduce(&s, r"(\x.\y.x) ((\z.z) a)").unwrap(),
            r"\y.(\z.z) a"
        );
    }

    #[test]
    fn test_normal_order() {
        let deep = NormalOrder { deep: true };
        let shallow = NormalOrder { deep: false };
        assert_eq!(reduce(&deep, r"(\x.a) ((\x.x x) (\x.x x))").unwrap(), "a");
        assert_eq!(reduce(&deep, r"\y.(\x.x) y").unwrap(), r"\y.y");
        assert_eq!(reduce(&shallow, r"\y.(\x.x) y").unwrap(), r"\y.(\x.x) y");
        assert_eq!(reduce(&deep, r"f ((\x.x) a)").unwrap(), "f a");
        assert_eq!(reduce(&shallow, r"f ((\x.x) a)").unwrap(), "f a");
        assert_eq!(
            reduce(&shallow, r"f (\y.(\x.x) y)").unwrap(),
            r"f (\y.(\x.x) y)"
        );
        assert_eq!(reduce(&deep, r"(\x.(\y.x y) b) a").unwrap(), "a b");
    }

    #[test]
    fn test_applicative_order() {
        let deep = ApplicativeOrder { deep: true };
        let shallow = ApplicativeOrder { deep: false };
        assert_eq!(reduce(&deep, r"(\x.\y.x y) b a").unwrap(), "b a");
        assert_eq!(reduce(&deep, r"\y.(\x.x) y").unwrap(), r"\y.y");
        assert_eq!(reduce(&shallow, r"\y.(\x.x) y").unwrap(), r"\y.(\x.x) y");
        assert_eq!(reduce(&shallow, r"(\x.a) (y z)").unwrap(), "a");
        assert!(reduce(&deep, r"(\x.a) ((\x.x x) (\x.x x))").is_err());
        assert_eq!(
            reduce(&deep, r"\y.(\x.\y.x) y").unwrap(),
            r"\y.\y1.y"
        );
    }

    #[test]
    fn test_head_spine() {
        let deep = HeadSpine { deep: true };
        let shallow = HeadSpine { deep: false };
        assert_eq!(reduce(&shallow, r"\y.(\x.x) y").unwrap(), r"\y.y");
        assert_eq!(
            reduce(&shallow, r"\y.y ((\x.x) a)").unwrap(),
            r"\y.y ((\x.x) a)"
        );
        assert_eq!(reduce(&deep, r"\y.y ((\x.x) a)").unwrap(), r"\y.y a");
        assert_eq!(
            reduce(&shallow, r"(\x.x ((\z.z) b) (\w.(\v.v) w)) f").unwrap(),
            r"f ((\z.z) b) (\w.(\v.v) w)"
        );
        assert_eq!(
            reduce(&deep, r"(\x.x ((\z.z) b) (\w.(\v.v) w)) f").unwrap(),
            r"f b (\w.w)"
        );
        assert_eq!(reduce(&shallow, r"(\x.a) ((\x.x x) (\x.x x))").unwrap(), "a");
    }

    #[test]
    fn test_divergence() {
        let strategies: Vec<Box<dyn Strategy>> = vec![
            Box::new(CallByValue),
            Box::new(CallByName),
            Box::new(NormalOrder { deep: false }),
            Box::new(NormalOrder { deep: true }),
            Box::new(ApplicativeOrder { deep: false }),
            Box::new(ApplicativeOrder { deep: true }),
            Box::new(HeadSpine { deep: false }),
            Box::new(HeadSpine { deep: true }),
        ];
        let reducer = Reducer::new(64);
        for strategy in &strategies {
            assert_eq!(
                reducer.reduce(strategy.as_ref(), &omega()),
                Err(DivergenceError {
                    strategy: strategy.name(),
                    steps_taken: 64
                })
            );
        }
    }

    #[test]
    fn test_growing_divergence() {
        // f (f (f ...)) grows one level per step
        let result = std::thread::spawn(|| {
            let term = parse(r"(\x.f (x x)) (\x.f (x x))").unwrap();
            Reducer::default()
                .reduce(&NormalOrder { deep: true }, &term)
                .map(|t| t.to_source())
        })
        .join()
        .unwrap();
        match result {
            Err(DivergenceError {
                strategy,
                steps_taken,
            }) => {
                assert_eq!(strategy, "normal order (deep)");
                assert!(steps_taken < DEFAULT_STEP_BUDGET, "{steps_taken}");
            }
            Ok(term) => panic!("reduced to {term}"),
        }
    }

    #[test]
    fn test_within_limits() {
        let mut deep = var!(x);
        for _ in 0..MAX_TERM_DEPTH {
            deep = abs!(x, deep);
        }
        assert!(!within_limits(&deep));
        assert!(within_limits(&omega()));
        // balanced, so only the size is out of bounds
        let mut wide = var!(x);
        for _ in 0..14 {
            wide = app!(wide.clone(), wide);
        }
        assert!(!within_limits(&wide));
    }

    #[test]
    fn test_budget() {
        let term = parse(r"(\x.x) ((\x.x) a)").unwrap();
        let strategy = NormalOrder { deep: true };
        assert!(Reducer::new(1).reduce(&strategy, &term).is_err());
        assert_eq!(Reducer::new(2).reduce(&strategy, &term), Ok(var!(a)));
        // a zero budget still accepts terms that need no step
        assert_eq!(Reducer::new(0).reduce(&strategy, &var!(a)), Ok(var!(a)));
    }

    #[test]
    fn test_trace() {
        let term = parse(r"(\x.x) ((\y.y) a)").unwrap();
        let trace = Reducer::default()
            .trace(&ApplicativeOrder { deep: true }, &term)
            .unwrap();
        assert_eq!(
            trace.iter().map(Term::to_source).collect::<Vec<_>>(),
            vec![r"(\x.x) a", "a"]
        );
        assert!(Reducer::default()
            .trace(&CallByName, &var!(a))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_strategies_agree() {
        for source in [
            r"(\x.\y.x y) b a",
            r"(\f.\x.f (f x)) (\y.y) z",
            r"(\m.\n.\f.\x.m f (n f x)) (\f.\x.f x) (\f.\x.f (f x))",
            r"(\x.x) ((\y.y) a)",
        ] {
            let term = parse(source).unwrap();
            let reducer = Reducer::default();
            let normal = reducer.reduce(&NormalOrder { deep: true }, &term).unwrap();
            for strategy in [
                &ApplicativeOrder { deep: true } as &dyn Strategy,
                &HeadSpine { deep: true },
            ] {
                let other = reducer.reduce(strategy, &term).unwrap();
                assert!(normal.alpha_eq(&other), "{source}: {normal} vs {other}");
            }
        }
        let term = parse(r"(\x.\y.x y) b a").unwrap();
        let reducer = Reducer::default();
        let expected = parse("b a").unwrap();
        assert_eq!(reducer.reduce(&CallByValue, &term), Ok(expected.clone()));
        assert_eq!(reducer.reduce(&CallByName, &term), Ok(expected));

        let term = parse(r"(\x.a) (y z)").unwrap();
        let normal = reducer.reduce(&NormalOrder { deep: true }, &term).unwrap();
        for strategy in [&CallByValue as &dyn Strategy, &CallByName] {
            assert!(reducer.reduce(strategy, &term).unwrap().alpha_eq(&normal));
        }
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let reducer = Reducer::default();
        let strategy = NormalOrder { deep: true };
        for source in [r"\x.x", r"\f.\x.f (f x)", r"x (\y.y z)", "a b c"] {
            let term = parse(source).unwrap();
            assert_eq!(reducer.trace(&strategy, &term), Ok(vec![]));
            assert!(reducer.reduce(&strategy, &term).unwrap().alpha_eq(&term));
        }
    }
}
