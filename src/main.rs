use std::fs;
use std::path::Path;
use std::path::PathBuf;

use clap::ArgAction;
use clap::Parser;
use clap::Subcommand;
use env_logger::Env;
use log::LevelFilter;
use miette::IntoDiagnostic;
use miette::WrapErr;
use miette::miette;
use pratt_calc::Calculator;
use pratt_calc::Lexer;
use pratt_calc::Options;
use pratt_calc::Token;
use pratt_calc::check;
use pratt_calc::eval::DEFAULT_MAX_DEPTH;
use pratt_calc::repl;

#[derive(Parser, Debug)]
#[command(version, about = "Evaluate arithmetic expressions with + - * / ^ and brackets")]
struct Args {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Nested sub-expressions allowed before evaluation is abandoned
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH, global = true)]
    max_depth: usize,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Evaluate a single expression
    Eval {
        #[arg(allow_hyphen_values = true)]
        expression: String,
    },
    /// Print the tokens of an expression
    Tokenize {
        #[arg(allow_hyphen_values = true)]
        expression: String,
    },
    /// Start the interactive prompt (default)
    Repl,
    /// Compare a file of expressions against a file of expected results
    Check { tests: PathBuf, expected: PathBuf },
}

fn init_logging(verbose: u8) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("warn"));
    match verbose {
        0 => {}
        1 => {
            builder.filter_level(LevelFilter::Info);
        }
        2 => {
            builder.filter_level(LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(LevelFilter::Trace);
        }
    }
    builder.init();
}

fn read(path: &Path) -> miette::Result<String> {
    fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("reading `{}` failed", path.display()))
}

fn main() -> miette::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let calculator = Calculator::with_options(Options {
        max_depth: args.max_depth,
    });

    match args.command.unwrap_or(Commands::Repl) {
        Commands::Eval { expression } => {
            let evaluation = calculator.evaluate(&expression)?;
            println!("{evaluation}");
        }
        Commands::Tokenize { expression } => {
            for token in Lexer::new(&expression) {
                let token = match token {
                    Ok(token) => token,
                    Err(e) => {
                        eprintln!("{:?}", miette::Report::new(e));
                        std::process::exit(65);
                    }
                };
                println!("{token}");
            }
            println!("{}", Token::end_of_input(&expression));
        }
        Commands::Repl => repl::run(&calculator)?,
        Commands::Check { tests, expected } => {
            let tests = read(&tests)?;
            let expected = read(&expected)?;

            let report = check::run_batch(&calculator, &tests, &expected)?;
            for case in &report.cases {
                println!("{case}");
            }
            println!("\n{report}");

            if !report.all_passed() {
                return Err(miette!(
                    "{} of {} tests failed",
                    report.total() - report.passed(),
                    report.total()
                ));
            }
        }
    }
    Ok(())
}
