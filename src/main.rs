use std::{env, fs::read_to_string, path::PathBuf, process::ExitCode, time::Instant};

use flang_parser::{
    config::{Dialect, ParseOptions},
    lexer::lexer::tokenize,
    node_types_json, parse_with_options, render_diagnostic,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const USAGE: &str =
    "Usage: flang-parse <file> [--sexp | --json | --tokens] [--dialect canonical|extended]\n       flang-parse --node-types";

enum Output {
    Summary,
    Sexp,
    Json,
    Tokens,
}

struct Args {
    file: PathBuf,
    output: Output,
    options: ParseOptions,
}

/// Logs go to stderr, and only when `RUST_LOG` asks for them.
fn init_tracing() {
    if env::var_os("RUST_LOG").is_none() {
        return;
    }

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut file = None;
    let mut output = Output::Summary;
    let mut options = ParseOptions::from_env();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--sexp" => output = Output::Sexp,
            "--json" => output = Output::Json,
            "--tokens" => output = Output::Tokens,
            "--dialect" => {
                let value = iter.next().ok_or("--dialect needs a value")?;
                options.dialect = value.parse::<Dialect>()?;
            }
            flag if flag.starts_with("--") => return Err(format!("unknown flag `{}`", flag)),
            path if file.is_none() => file = Some(PathBuf::from(path)),
            extra => return Err(format!("unexpected argument `{}`", extra)),
        }
    }

    Ok(Args {
        file: file.ok_or("no input file given")?,
        output,
        options,
    })
}

fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();

    if args.iter().any(|arg| arg == "--node-types") {
        return match node_types_json() {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(error) => {
                eprintln!("Failed to serialise node types: {}", error);
                ExitCode::FAILURE
            }
        };
    }

    let args = match parse_args(&args) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}\n{}", message, USAGE);
            return ExitCode::from(2);
        }
    };

    let file_name = args.file.to_string_lossy().to_string();
    let source = match read_to_string(&args.file) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("Failed to read {}: {}", file_name, error);
            return ExitCode::FAILURE;
        }
    };

    if let Output::Tokens = args.output {
        for token in tokenize(&source) {
            token.debug();
        }
        return ExitCode::SUCCESS;
    }

    let start = Instant::now();
    let tree = match parse_with_options(&source, args.options) {
        Ok(tree) => tree,
        Err(error) => {
            eprint!("{}", render_diagnostic(&error, &source, &file_name));
            return ExitCode::FAILURE;
        }
    };
    let elapsed = start.elapsed();

    match args.output {
        Output::Sexp => println!("{}", tree.to_sexp()),
        Output::Json => match tree.to_json() {
            Ok(json) => println!("{}", json),
            Err(error) => {
                eprintln!("Failed to serialise tree: {}", error);
                return ExitCode::FAILURE;
            }
        },
        Output::Summary | Output::Tokens => {
            println!(
                "Parsed {} ({} dialect, {} items) in {:?}",
                file_name,
                tree.options().dialect,
                tree.items().len(),
                elapsed
            );
        }
    }

    let errors = tree.errors();
    for error in &errors {
        eprint!("{}", render_diagnostic(error, &source, &file_name));
    }

    if errors.is_empty() {
        ExitCode::SUCCESS
    } else {
        eprintln!("{} syntax error(s)", errors.len());
        ExitCode::FAILURE
    }
}
