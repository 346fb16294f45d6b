use chumsky::prelude::*;

use crate::{error::ParseError, prelude::*, term::Term};

pub trait SimpleParser<I: Clone + std::hash::Hash, O>:
    Parser<I, O, Error = SyntaxError<I>> + Clone
{
    #[allow(clippy::type_complexity)]
    fn spanned(self) -> chumsky::combinator::MapWithSpan<Self, fn(O, Span) -> Spanned<O>, O>
    where
        Self: Sized,
        I: std::cmp::Eq,
    {
        self.map_with_span(|value, span| Spanned { span, value })
    }
}
impl<I: Clone + std::hash::Hash, O, T> SimpleParser<I, O> for T where
    T: Parser<I, O, Error = SyntaxError<I>> + Clone
{
}

#[derive(PartialEq, Eq, Hash, Clone, derive_more::Display, Debug)]
pub enum Token {
    #[display(fmt = "(")]
    LParen,
    #[display(fmt = ")")]
    RParen,
    #[display(fmt = "\\")]
    Lambda,
    #[display(fmt = ".")]
    Dot,
    #[display(fmt = "=")]
    Equal,
    #[display(fmt = ";")]
    Semicolon,
    #[display(fmt = "{_0}")]
    Ident(Identifier),
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() && c != 'λ'
}

fn is_identifier_continue(c: char) -> bool {
    (c.is_alphanumeric() || c == '_') && c != 'λ'
}

pub fn lexer() -> impl SimpleParser<char, Vec<Spanned<Token>>> {
    let identifier = filter(|c: &char| is_identifier_start(*c))
        .map(Some)
        .chain::<char, Vec<_>, _>(filter(|c: &char| is_identifier_continue(*c)).repeated())
        .collect::<String>()
        .map(Identifier::new)
        .labelled("identifier");
    let token = choice((
        just('(').to(Token::LParen),
        just(')').to(Token::RParen),
        just('\\').to(Token::Lambda),
        just('λ').to(Token::Lambda),
        just('.').to(Token::Dot),
        just('=').to(Token::Equal),
        just(';').to(Token::Semicolon),
        identifier.map(Token::Ident),
    ));
    token.spanned().padded().repeated().then_ignore(end())
}

fn term_parser() -> impl SimpleParser<Token, Term> {
    recursive(|term: Recursive<_, Term, _>| {
        let ident = select! { Token::Ident(ident) => ident }.labelled("identifier");

        let atom = choice((
            ident.clone().map(Term::Variable),
            term.clone()
                .delimited_by(just(Token::LParen), just(Token::RParen)),
        ))
        .labelled("atom");

        // atom atom ...
        let application = atom
            .clone()
            .then(atom.repeated())
            .foldl(|lhs, rhs| Term::application(lhs, rhs))
            .labelled("application");

        // \ident. term
        let abstraction = just(Token::Lambda)
            .ignore_then(ident)
            .then_ignore(just(Token::Dot))
            .then(term)
            .map(|(param, body)| Term::abstraction(param, body))
            .labelled("abstraction");

        choice((abstraction, application))
    })
    .labelled("term")
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Command {
    Term(Term),
    Definition(Identifier, Term),
}

fn command_parser() -> impl SimpleParser<Token, Command> {
    let ident = select! { Token::Ident(ident) => ident };
    let definition = ident
        .then_ignore(just(Token::Equal))
        .then(term_parser())
        .map(|(name, term)| Command::Definition(name, term));
    choice((definition, term_parser().map(Command::Term)))
}

fn commands_parser() -> impl SimpleParser<Token, Vec<Command>> {
    command_parser()
        .separated_by(just(Token::Semicolon))
        .allow_trailing()
}

fn parse_full<T>(s: &str, parser: impl SimpleParser<Token, T>) -> Result<T, Vec<ParseError>> {
    let len = s.chars().count();
    let eoi = Span {
        start: len,
        end: len + 1,
    };
    let tokens = lexer().parse(s).map_err(|es| {
        es.into_iter()
            .map(|e| ParseError::from(e.map(|e| e.to_string())))
            .collect::<Vec<_>>()
    })?;
    parser
        .then_ignore(end())
        .parse(chumsky::Stream::from_iter(
            eoi,
            tokens
                .into_iter()
                .map(|Spanned { span, value }| (value, span)),
        ))
        .map_err(|es| {
            es.into_iter()
                .map(|e| ParseError::from(e.map(|e| e.to_string())))
                .collect::<Vec<_>>()
        })
}

/// Every error chumsky recovered, for callers that report all of them.
pub fn parse_term(s: &str) -> Result<Term, Vec<ParseError>> {
    parse_full(s, term_parser())
}

pub fn parse(s: &str) -> Result<Term, ParseError> {
    parse_term(s).map_err(ParseError::first)
}

pub fn parse_commands(s: &str) -> Result<Vec<Command>, Vec<ParseError>> {
    parse_full(s, commands_parser())
}
