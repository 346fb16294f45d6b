use std::{collections::BTreeSet, fmt, str::FromStr};

use crate::{
    church,
    environment::Environment,
    error::{DivergenceError, ParseError, Result},
    parser,
    prelude::*,
    reducer::{ApplicativeOrder, CallByName, CallByValue, HeadSpine, NormalOrder, Reducer, Strategy},
    term::Term,
};

/// A parsed λ-expression.
///
/// Every operation leaves `self` untouched and hands back a new value.
///
/// ```
/// use untyped_lambda::Expression;
///
/// let expression = Expression::new(r"(\x.\y.x y) b a").unwrap();
/// assert_eq!(expression.normal(true).unwrap().to_source(), "b a");
/// assert_eq!(Expression::new(r"\f.\x.f (f x)").unwrap().to_number(), Ok(2));
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Expression {
    term: Term,
}

impl Expression {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        parser::parse(source).map(Self::from)
    }

    pub fn term(&self) -> &Term {
        &self.term
    }

    pub fn to_source(&self) -> String {
        self.term.to_source()
    }

    pub fn free_variables(&self) -> BTreeSet<Identifier> {
        self.term.free_variables()
    }

    pub fn alpha_eq(&self, other: &Expression) -> bool {
        self.term.alpha_eq(&other.term)
    }

    /// `self arg`, unreduced.
    pub fn apply(&self, arg: &Expression) -> Self {
        Term::application(self.term.clone(), arg.term.clone()).into()
    }

    pub fn resolve(&self, environment: &Environment) -> Self {
        environment.resolve(&self.term).into()
    }

    pub fn reduce_with<S: Strategy + ?Sized>(
        &self,
        strategy: &S,
        reducer: &Reducer,
    ) -> Result<Self, DivergenceError> {
        reducer.reduce(strategy, &self.term).map(Self::from)
    }

    fn reduce<S: Strategy>(&self, strategy: S) -> Result<Self, DivergenceError> {
        self.reduce_with(&strategy, &Reducer::default())
    }

    pub fn call_by_value(&self) -> Result<Self, DivergenceError> {
        self.reduce(CallByValue)
    }

    pub fn call_by_name(&self) -> Result<Self, DivergenceError> {
        self.reduce(CallByName)
    }

    pub fn normal(&self, deep: bool) -> Result<Self, DivergenceError> {
        self.reduce(NormalOrder { deep })
    }

    pub fn applicative(&self, deep: bool) -> Result<Self, DivergenceError> {
        self.reduce(ApplicativeOrder { deep })
    }

    pub fn head_spine(&self, deep: bool) -> Result<Self, DivergenceError> {
        self.reduce(HeadSpine { deep })
    }

    pub fn to_number(&self) -> Result<u64> {
        self.to_number_with(&Reducer::default())
    }

    pub fn to_number_with(&self, reducer: &Reducer) -> Result<u64> {
        let normal = self.reduce_with(&NormalOrder { deep: true }, reducer)?;
        Ok(church::decode_numeral(&normal.term)?)
    }

    pub fn to_bool(&self) -> Result<bool> {
        self.to_bool_with(&Reducer::default())
    }

    pub fn to_bool_with(&self, reducer: &Reducer) -> Result<bool> {
        let normal = self.reduce_with(&NormalOrder { deep: true }, reducer)?;
        Ok(church::decode_boolean(&normal.term)?)
    }
}

impl From<Term> for Expression {
    fn from(term: Term) -> Self {
        Self { term }
    }
}

impl From<u64> for Expression {
    fn from(n: u64) -> Self {
        church::numeral(n).into()
    }
}

impl From<bool> for Expression {
    fn from(p: bool) -> Self {
        church::boolean(p).into()
    }
}

impl FromStr for Expression {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, ParseError> {
        Self::new(s)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.term, f)
    }
}

fn binary(combinator: Term, lhs: Expression, rhs: Expression) -> Expression {
    Term::application(Term::application(combinator, lhs.term), rhs.term).into()
}

macro_rules! church_operator {
    ($trait:ident, $method:ident, $combinator:path) => {
        impl std::ops::$trait for Expression {
            type Output = Expression;

            fn $method(self, rhs: Expression) -> Expression {
                binary($combinator(), self, rhs)
            }
        }
    };
}

church_operator!(Add, add, church::add);
church_operator!(Mul, mul, church::mul);
church_operator!(BitAnd, bitand, church::and);
church_operator!(BitOr, bitor, church::or);
church_operator!(BitXor, bitxor, church::xor);

impl std::ops::Not for Expression {
    type Output = Expression;

    fn not(self) -> Expression {
        Term::application(church::not(), self.term).into()
    }
}
