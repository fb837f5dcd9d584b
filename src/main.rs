//! Dslkit - run the reference DSLs from the command line.
//!
//! # Usage
//!
//! ```bash
//! dslkit eval calc "2 * (3 + 4)"
//! dslkit eval query "from orders select name" --context orders.json
//! dslkit tokens greeting "fromANA"
//! dslkit grammar signal
//! ```
//!
//! Set `RUST_LOG=dslkit_core=trace` to watch lexeme selection and
//! production attempts.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use dslkit_core::{
    demos,
    diagnostics::{dump_lexemes, Diagnostic},
    error::{DslError, Result},
    Context, Grammar, Value,
};

/// Runtime DSL toolkit
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse input with a reference DSL and print the output as JSON
    Eval {
        /// Reference DSL name (greeting, signal, calc, query)
        demo: String,
        /// Text to parse
        input: String,
        /// JSON object whose keys become context bindings
        #[arg(short, long, value_name = "FILE")]
        context: Option<PathBuf>,
    },
    /// Print the lexemes of the input without parsing
    Tokens {
        /// Reference DSL name
        demo: String,
        /// Text to tokenize
        input: String,
    },
    /// Print the grammar of a reference DSL
    Grammar {
        /// Reference DSL name
        demo: String,
    },
}

fn load_demo(name: &str) -> Result<Grammar> {
    demos::by_name(name).unwrap_or_else(|| {
        Err(DslError::configuration(format!(
            "unknown DSL '{}' (available: {})",
            name,
            demos::DEMO_NAMES.join(", ")
        )))
    })
}

fn load_context(path: &Path) -> Result<Context> {
    let content = std::fs::read_to_string(path).map_err(|e| DslError::FileRead {
        path: path.display().to_string(),
        source: e,
    })?;
    let json: serde_json::Value = serde_json::from_str(&content)?;
    match Value::from(json) {
        Value::Record(fields) => Ok(fields.into_iter().collect()),
        other => Err(DslError::configuration(format!(
            "context file must hold a JSON object, found {}",
            other.type_name()
        ))),
    }
}

fn run(command: &Command) -> Result<String> {
    match command {
        Command::Eval {
            demo,
            input,
            context,
        } => {
            let grammar = load_demo(demo)?;
            let context = match context {
                Some(path) => load_context(path)?,
                None => Context::new(),
            };
            let result = grammar.parse_with_context(input, &context)?;
            Ok(serde_json::to_string_pretty(result.output())?)
        }
        Command::Tokens { demo, input } => {
            let grammar = load_demo(demo)?;
            Ok(dump_lexemes(&grammar.debug_tokens(input)?))
        }
        Command::Grammar { demo } => Ok(load_demo(demo)?.to_string()),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(&args.command) {
        Ok(output) => {
            println!("{}", output.trim_end());
            ExitCode::SUCCESS
        }
        Err(err) => {
            let source = match &args.command {
                Command::Eval { input, .. } | Command::Tokens { input, .. } => input.as_str(),
                Command::Grammar { .. } => "",
            };
            eprintln!("{}", Diagnostic::from_error(&err, source));
            ExitCode::FAILURE
        }
    }
}
