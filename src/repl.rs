use std::io::{Write, stdout};

use log::info;
use miette::{IntoDiagnostic, WrapErr};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::Calculator;

const PROMPT: &str = "> ";

pub const BANNER: &str = "\
Calculator
==================================================

Supports [()], [0-9], [.], [+-*/], and [^]
Type 'exit' to terminate the program.
Type 'help' to call for the help manual.
Type 'clear' to clear the screen.
";

pub const HELP: &str = "\
Help Manual:

Calculator
==================================================
Supports [()], [0-9], [.], [+-*/], and [^]
  - numbers need a digit before any '.', e.g. 0.5 rather than .5
  - '^' is evaluated right to left: 2^3^2 is 2^(3^2)
  - a leading '-' negates what follows, but binds looser than '^'
Type 'exit' to terminate the program.
Type 'help' to call for the help manual.
Type 'clear' to clear the screen.
==================================================
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Exit,
    Help,
    Clear,
    Blank,
    Evaluate(&'a str),
}

pub fn parse_command(line: &str) -> Command<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Command::Blank;
    }
    match line.to_lowercase().as_str() {
        "exit" | "quit" => Command::Exit,
        "help" => Command::Help,
        "clear" => Command::Clear,
        _ => Command::Evaluate(line),
    }
}

/// Reads lines until `exit` or end of input, evaluating each one on its own.
pub fn run(calculator: &Calculator) -> miette::Result<()> {
    let mut editor = DefaultEditor::new()
        .into_diagnostic()
        .wrap_err("failed to initialise line editor")?;

    println!("{BANNER}");
    info!("repl started with {:?}", calculator.options());

    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                let _ = editor.add_history_entry(line.as_str());

                match parse_command(&line) {
                    Command::Exit => break,
                    Command::Help => println!("{HELP}"),
                    Command::Clear => {
                        print!("\x1B[2J\x1B[1;1H");
                        stdout().flush().into_diagnostic()?;
                    }
                    Command::Blank => continue,
                    Command::Evaluate(expression) => match calculator.evaluate(expression) {
                        Ok(evaluation) => println!("{evaluation}\n"),
                        Err(e) => eprintln!("{:?}", miette::Report::new(e)),
                    },
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e).into_diagnostic().wrap_err("failed to read input"),
        }
    }

    println!("Goodbye!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_are_case_insensitive_and_trimmed() {
        assert_eq!(parse_command("exit"), Command::Exit);
        assert_eq!(parse_command("  EXIT "), Command::Exit);
        assert_eq!(parse_command("quit"), Command::Exit);
        assert_eq!(parse_command("Help"), Command::Help);
        assert_eq!(parse_command("clear"), Command::Clear);
    }

    #[test]
    fn blank_lines_are_skipped() {
        assert_eq!(parse_command(""), Command::Blank);
        assert_eq!(parse_command("   "), Command::Blank);
    }

    #[test]
    fn anything_else_is_an_expression() {
        assert_eq!(parse_command(" 1 + 2 "), Command::Evaluate("1 + 2"));
        assert_eq!(parse_command("exit now"), Command::Evaluate("exit now"));
    }
}
