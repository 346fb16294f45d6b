use std::rc::Rc;

use rpds::HashTrieMap;

use crate::{
    prelude::*,
    term::{fresh_name, Term},
};

/// Named terms that free variables can be resolved against.
#[derive(Default, Clone, Debug)]
pub struct Environment {
    definitions: HashTrieMap<Identifier, Rc<Term>>,
}

impl Environment {
    /// Stores `term`, resolved against the definitions made so far, under
    /// `name`. Redefining a name shadows the old definition for later uses
    /// only: earlier definitions keep what they resolved to.
    pub fn define(&mut self, name: Identifier, term: &Term) -> Rc<Term> {
        let term = Rc::new(self.resolve(term));
        self.definitions = self.definitions.insert(name, term.clone());
        term
    }

    pub fn lookup(&self, name: &str) -> Option<&Rc<Term>> {
        self.definitions.get(&Identifier::new(name.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Definitions ordered by name.
    pub fn definitions(&self) -> Vec<(&Identifier, &Rc<Term>)> {
        let mut definitions = self.definitions.iter().collect::<Vec<_>>();
        definitions.sort_by(|(lhs, _), (rhs, _)| lhs.cmp(rhs));
        definitions
    }

    /// Substitutes the definition of every defined free variable at once, so
    /// one definition's free variables are never replaced by another's.
    pub fn resolve(&self, term: &Term) -> Term {
        let free = term.free_variables();
        let defined = free
            .iter()
            .filter_map(|name| Some((name, self.definitions.get(name)?)))
            .collect::<Vec<_>>();

        let mut avoid = free.clone();
        for (_, definition) in &defined {
            avoid.extend(definition.free_variables());
        }
        let mut term = term.clone();
        let mut placeholders = Vec::with_capacity(defined.len());
        for (name, _) in &defined {
            let placeholder = fresh_name(name, &avoid);
            avoid.insert(placeholder.clone());
            term = term.substitute(name, &Term::Variable(placeholder.clone()));
            placeholders.push(placeholder);
        }
        for ((_, definition), placeholder) in defined.into_iter().zip(placeholders) {
            term = term.substitute(&placeholder, definition);
        }
        term
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        parser::parse,
        term::{abs, app, var},
    };

    fn name(s: &str) -> Identifier {
        Identifier::new(s.into())
    }

    #[test]
    fn test_resolve() {
        let mut env = Environment::default();
        assert!(env.is_empty());
        env.define(name("i"), &parse(r"\x.x").unwrap());
        env.define(name("k"), &parse(r"\x.\y.x").unwrap());

        assert_eq!(env.resolve(&var!(i)), abs!(x, var!(x)));
        assert_eq!(env.resolve(&var!(q)), var!(q));
        assert_eq!(
            env.resolve(&app!(var!(k), var!(i), var!(q))),
            parse(r"(\x.\y.x) (\x.x) q").unwrap()
        );
        // bound occurrences are not definitions
        assert_eq!(env.resolve(&abs!(i, var!(i))), abs!(i, var!(i)));
    }

    #[test]
    fn test_resolve_avoids_capture() {
        let mut env = Environment::default();
        env.define(name("c"), &var!(y));
        let resolved = env.resolve(&parse(r"\y.c y").unwrap());
        assert!(resolved.alpha_eq(&parse(r"\z.y z").unwrap()), "{resolved}");
    }

    #[test]
    fn test_resolve_is_simultaneous() {
        let mut env = Environment::default();
        env.define(name("a"), &var!(b));
        env.define(name("b"), &var!(k));
        assert_eq!(env.resolve(&app!(var!(a), var!(b))), app!(var!(b), var!(k)));
    }

    #[test]
    fn test_define_resolves_eagerly() {
        let mut env = Environment::default();
        env.define(name("i"), &parse(r"\x.x").unwrap());
        env.define(name("ii"), &parse("i i").unwrap());
        env.define(name("i"), &var!(a));
        assert_eq!(
            env.lookup("ii").map(|t| t.as_ref().clone()),
            Some(parse(r"(\x.x) (\x.x)").unwrap())
        );
        assert_eq!(env.lookup("i").map(|t| t.as_ref().clone()), Some(var!(a)));
        assert_eq!(
            env.definitions()
                .into_iter()
                .map(|(name, _)| name.as_str())
                .collect::<Vec<_>>(),
            vec!["i", "ii"]
        );
    }
}
