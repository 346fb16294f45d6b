use anyhow::Result;
use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use chumsky::Parser;
use rustyline::{error::ReadlineError, Editor};
use untyped_lambda::{
    environment::Environment,
    parser::{self, Command},
    reducer::{
        ApplicativeOrder, CallByName, CallByValue, HeadSpine, NormalOrder, Reducer, Strategy,
    },
    Error, Expression, ParseError,
};

const HISTORY: &str = "/tmp/untyped-lambda.history";

fn build_report(e: &ParseError) -> Report {
    Report::build(ReportKind::Error, (), e.position)
        .with_message(&e.message)
        .with_label(
            Label::new(e.span.clone())
                .with_message(format!("{}", e.message.as_str().fg(Color::Red)))
                .with_color(Color::Red),
        )
        .finish()
}

enum Failure {
    Syntax(Vec<ParseError>),
    Evaluation(Error),
}

type CommandResult<'a, T = ()> = std::result::Result<T, (&'a str, Failure)>;

fn evaluation_failure(input: &str, e: impl Into<Error>) -> (&str, Failure) {
    (input, Failure::Evaluation(e.into()))
}

#[derive(Default)]
pub struct Session {
    environment: Environment,
    reducer: Reducer,
}

impl Session {
    /// Parses `input` and substitutes the session's definitions into it.
    fn expression<'i>(&self, input: &'i str) -> CommandResult<'i, Expression> {
        let expression = parser::parse_term(input)
            .map(Expression::from)
            .map_err(|es| (input, Failure::Syntax(es)))?;
        Ok(expression.resolve(&self.environment))
    }

    fn tokenize(input: &str) -> CommandResult {
        let tokens = parser::lexer()
            .parse(input)
            .map_err(|es| {
                (
                    input,
                    Failure::Syntax(
                        es.into_iter()
                            .map(|e| ParseError::from(e.map(|c| c.to_string())))
                            .collect(),
                    ),
                )
            })?
            .into_iter()
            .map(|token| token.forget_span().to_string())
            .collect::<Vec<_>>();
        println!("{}", tokens.join(" "));
        Ok(())
    }

    fn parse(input: &str) -> CommandResult {
        let term = parser::parse_term(input).map_err(|es| (input, Failure::Syntax(es)))?;
        println!("{term}");
        Ok(())
    }

    fn reduce<'i>(&self, strategy: &dyn Strategy, input: &'i str) -> CommandResult<'i> {
        let reduced = self
            .expression(input)?
            .reduce_with(strategy, &self.reducer)
            .map_err(|e| evaluation_failure(input, e))?;
        println!("{reduced}");
        Ok(())
    }

    fn trace<'i>(&self, input: &'i str) -> CommandResult<'i> {
        let expression = self.expression(input)?;
        let steps = self
            .reducer
            .trace(&NormalOrder { deep: true }, expression.term())
            .map_err(|e| evaluation_failure(input, e))?;
        println!("   {expression}");
        for term in steps {
            println!("-> {term}");
        }
        Ok(())
    }

    fn number<'i>(&self, input: &'i str) -> CommandResult<'i> {
        let n = self
            .expression(input)?
            .to_number_with(&self.reducer)
            .map_err(|e| evaluation_failure(input, e))?;
        println!("{n}");
        Ok(())
    }

    fn boolean<'i>(&self, input: &'i str) -> CommandResult<'i> {
        let p = self
            .expression(input)?
            .to_bool_with(&self.reducer)
            .map_err(|e| evaluation_failure(input, e))?;
        println!("{p}");
        Ok(())
    }

    fn free_variables(input: &str) -> CommandResult {
        let term = parser::parse_term(input).map_err(|es| (input, Failure::Syntax(es)))?;
        let free = term.free_variables();
        let names = free
            .iter()
            .map(|name| name.as_str())
            .collect::<Vec<_>>();
        println!("{{{}}}", names.join(", "));
        Ok(())
    }

    fn budget(&mut self, input: &str) {
        let input = input.trim();
        if input.is_empty() {
            println!("{}", self.reducer.budget());
            return;
        }
        match input.parse::<usize>() {
            Ok(budget) => {
                self.reducer = Reducer::new(budget);
                println!("step budget = {budget}");
            }
            Err(e) => eprintln!("Invalid step budget {input}: {e}"),
        }
    }

    fn show_definitions(&self) {
        for (name, term) in self.environment.definitions() {
            println!("{name} = {term}");
        }
    }

    fn evaluate<'i>(&mut self, input: &'i str) -> CommandResult<'i> {
        let commands = parser::parse_commands(input).map_err(|es| (input, Failure::Syntax(es)))?;
        for command in commands {
            match command {
                Command::Term(term) => {
                    let normal = Expression::from(term)
                        .resolve(&self.environment)
                        .reduce_with(&NormalOrder { deep: true }, &self.reducer)
                        .map_err(|e| evaluation_failure(input, e))?;
                    println!("{normal}");
                }
                Command::Definition(name, term) => {
                    let term = self.environment.define(name.clone(), &term);
                    println!("{name} = {term}");
                }
            }
        }
        Ok(())
    }

    fn show_help() {
        println!(
            "{}",
            r#"
term                -- same as :evaluate term
name = term         -- define name; later terms see it
:tokenize   term    -- show tokenized term
:parse      term    -- show parsed term
:cbv        term    -- call-by-value
:cbn        term    -- call-by-name
:no[!]      term    -- normal order (! to reduce under abstractions)
:ao[!]      term    -- applicative order (! to reduce under abstractions)
:hs[!]      term    -- head spine (! to go on into the arguments)
:trace      term    -- show every normal order step
:num        term    -- decode a Church numeral
:bool       term    -- decode a Church boolean
:fv         term    -- show free variables
:budget     [n]     -- show or set the step budget
:defs               -- show definitions
:evaluate   term    -- show the normal form
:help               -- show this message
        "#
            .trim()
        );
    }

    fn handle_repl_input<'i>(&mut self, input: &'i str) -> CommandResult<'i> {
        let (cmd, input) = if let Some(stripped) = input.strip_prefix(':') {
            stripped
                .trim_start()
                .split_once(' ')
                .unwrap_or((stripped.trim(), ""))
        } else {
            ("", input)
        };
        match cmd {
            "to" | "tokenize" => Self::tokenize(input)?,
            "p" | "parse" => Self::parse(input)?,
            "cbv" => self.reduce(&CallByValue, input)?,
            "cbn" => self.reduce(&CallByName, input)?,
            "no" => self.reduce(&NormalOrder { deep: false }, input)?,
            "no!" => self.reduce(&NormalOrder { deep: true }, input)?,
            "ao" => self.reduce(&ApplicativeOrder { deep: false }, input)?,
            "ao!" => self.reduce(&ApplicativeOrder { deep: true }, input)?,
            "hs" => self.reduce(&HeadSpine { deep: false }, input)?,
            "hs!" => self.reduce(&HeadSpine { deep: true }, input)?,
            "tr" | "trace" => self.trace(input)?,
            "n" | "num" => self.number(input)?,
            "b" | "bool" => self.boolean(input)?,
            "fv" => Self::free_variables(input)?,
            "budget" => self.budget(input),
            "d" | "defs" => self.show_definitions(),
            "" | "e" | "eval" | "evaluate" => self.evaluate(input)?,
            "h" | "help" => Self::show_help(),
            _ => {
                eprintln!("Unknown command {cmd}");
                Self::show_help();
            }
        }
        Ok(())
    }

    fn respond(&mut self, input: &str) -> Result<()> {
        if input.trim().is_empty() {
            return Ok(());
        }
        match self.handle_repl_input(input) {
            Ok(()) => {}
            Err((input, Failure::Syntax(es))) => {
                for e in es {
                    build_report(&e).eprint(Source::from(input))?;
                }
            }
            Err((_, Failure::Evaluation(e))) => eprintln!("Error: {e}"),
        }
        Ok(())
    }
}

/// Reads lines until EOF or interrupt. A line ending in `\` continues on the
/// next one.
pub fn run(mut session: Session) -> Result<()> {
    let mut editor = Editor::<()>::new();
    editor.load_history(HISTORY).ok();
    let mut pending: Option<String> = None;
    loop {
        match editor.readline(">> ") {
            Ok(mut line) if line.ends_with('\\') => {
                line.pop();
                line.push('\n');
                pending.get_or_insert_with(String::new).push_str(&line);
            }
            Ok(line) => {
                let input = match pending.take() {
                    Some(mut input) => {
                        input.push_str(&line);
                        input
                    }
                    None => line,
                };
                editor.add_history_entry(input.as_str());
                session.respond(&input)?;
                editor.save_history(HISTORY)?;
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                println!("Bye!");
                break Ok(());
            }
            Err(e) => break Err(e.into()),
        }
    }
}
