use anyhow::Result;
use tracing_subscriber::EnvFilter;

mod repl;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    println!("Hi, this is an untyped λ-calculus REPL. :h to show help");
    println!();
    repl::run(repl::Session::default())
}
