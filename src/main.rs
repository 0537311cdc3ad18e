//! The `monkey` command-line entry point: run a script file, or drop into an interactive REPL.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as ClapParser;
use log::{error, info, warn};

use monkey::environment::Environment;
use monkey::error::HostError;
use monkey::eval::eval_program;
use monkey::lexer::Lexer;
use monkey::parser::Parser;

const PROMPT: &str = ">> ";

#[derive(ClapParser, Debug)]
#[command(author, version, about = "A tree-walking interpreter for Monkey")]
struct Cli {
    /// Script to run. Omit to start the interactive REPL.
    file: Option<PathBuf>,
}

fn main() -> ExitCode {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()
        .unwrap();

    let cli = Cli::parse();

    let result = match &cli.file {
        Some(path) => run_file(path),
        None => run_repl(),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

/// Runs a single file against a fresh environment. Returns `Ok(false)` (not an `Err`) when the
/// script itself produced parser or evaluation errors, so `main` can map that to a process exit
/// code without treating it as a host failure.
fn run_file(path: &PathBuf) -> Result<bool, HostError> {
    info!("running {}", path.display());

    let source = fs::read_to_string(path).map_err(|source| HostError::ReadSource {
        path: path.clone(),
        source,
    })?;

    let mut parser = Parser::new(Lexer::new(&source));
    let program = parser.parse_program();

    if !parser.errors().is_empty() {
        warn!("{} parser error(s) in {}", parser.errors().len(), path.display());
        for message in parser.errors() {
            eprintln!("\t{message}");
        }
        return Ok(false);
    }

    let env = Environment::new();
    let result = eval_program(&program, &env);
    let is_error = result.is_error();

    println!("{}", result.inspect());

    Ok(!is_error)
}

/// A persistent-environment read-eval-print loop. Exits cleanly (`Ok(true)`) on EOF.
fn run_repl() -> Result<bool, HostError> {
    info!("starting REPL");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let env = Environment::new();

    loop {
        write!(stdout, "{PROMPT}").map_err(HostError::Stdout)?;
        stdout.flush().map_err(HostError::Stdout)?;

        let mut line = String::new();
        let bytes_read = stdin
            .lock()
            .read_line(&mut line)
            .map_err(HostError::Stdin)?;

        if bytes_read == 0 {
            writeln!(stdout).ok();
            info!("REPL exiting on EOF");
            return Ok(true);
        }

        let mut parser = Parser::new(Lexer::new(&line));
        let program = parser.parse_program();

        if !parser.errors().is_empty() {
            writeln!(stdout, "parse errors:").ok();
            for message in parser.errors() {
                writeln!(stdout, "\t{message}").ok();
            }
            continue;
        }

        let result = eval_program(&program, &env);
        writeln!(stdout, "{}", result.inspect()).ok();
    }
}
