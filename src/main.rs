use std::{error::Error, fs, path::PathBuf, process::ExitCode, sync::Once};

use calctree::Calculator;
use clap::Parser;

/// calctree evaluates expressions with tuples, lambdas, node pointers and
/// memory cells.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Reads expressions from a file, one per line, instead of the command
    /// line.
    #[arg(short, long, conflicts_with = "expression")]
    file: Option<PathBuf>,

    /// Prints the lexemes of each expression after number reassembly.
    #[arg(long)]
    tokens: bool,

    /// Prints the parenthesized tree of each expression.
    #[arg(long)]
    tree: bool,

    /// Prints the inferred type of each expression.
    #[arg(long = "type")]
    show_type: bool,

    expression: Option<String>,
}

static TRACING_INIT: Once = Once::new();

fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry().with(fmt::layer().with_target(true).with_level(true))
                                          .with(EnvFilter::from_default_env())
                                          .init();
        }
    });
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    let script = match (&args.file, &args.expression) {
        (Some(path), _) => match fs::read_to_string(path) {
            Ok(script) => script,
            Err(_) => {
                eprintln!("Failed to read the input file '{}'. Perhaps this file does not exist?",
                          path.display());
                return ExitCode::FAILURE;
            },
        },
        (None, Some(expression)) => expression.clone(),
        (None, None) => {
            eprintln!("Nothing to evaluate: pass an expression or --file <FILE>.");
            return ExitCode::FAILURE;
        },
    };

    let mut calc = match Calculator::new() {
        Ok(calc) => calc,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        },
    };

    let mut status = ExitCode::SUCCESS;
    for line in script.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        calc.free_all();
        if let Err(e) = run_line(&mut calc, line, &args) {
            report(e.as_ref());
            status = ExitCode::FAILURE;
        }
    }
    status
}

fn run_line(calc: &mut Calculator, line: &str, args: &Args) -> Result<(), Box<dyn Error>> {
    if args.tokens {
        println!("tokens: {}", calc.tokens(line)?.join(" "));
    }
    let root = calc.parse(line)?;
    if args.tree {
        println!("tree:   {}", calc.tree_text(root));
    }
    let ty = calc.infer(root)?;
    if args.show_type {
        println!("type:   {ty}");
    }
    let value = calc.evaluate(root)?;
    println!("{}", calc.render(&value));
    Ok(())
}

/// Prints `error` followed by every error it wraps.
fn report(error: &dyn Error) {
    eprintln!("{error}");
    let mut source = error.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }
}
