mod repl_complete;

use std::{cell::RefCell, fs::read_to_string, path::PathBuf, rc::Rc};

use clap::Parser;
use colored::Colorize;
use tinyscheme::{
    Interpreter,
    error::Error,
    logger::{LogLevel, log_debug, log_error, log_warning, set_log_level},
    registry,
};
use repl_complete::ReplCompleter;
use rustyline::Editor;

/// A small Scheme-like Lisp interpreter.
#[derive(Parser, Debug)]
#[command(name = "tinyscheme", version, about)]
struct Cli {
    /// Preload and run every top-level form in this file before starting
    /// the interactive prompt.
    #[arg(long, value_name = "PATH")]
    source: Option<PathBuf>,

    /// Override the LOG_LEVEL environment variable for this session.
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    if let Some(level) = &cli.log_level {
        match level.parse::<LogLevel>() {
            Ok(level) => set_log_level(level),
            Err(message) => {
                log_warning(format!("falling back to the current log level: {message}"));
                eprintln!("{}", message.red());
            }
        }
    }

    let mut interpreter = Interpreter::new();

    if let Some(path) = &cli.source {
        match read_to_string(path) {
            Ok(contents) => {
                log_debug(format!("preloading {}", path.display()));
                if let Err(err) = interpreter.run_all(&contents) {
                    print_error(&err);
                    std::process::exit(1);
                }
            }
            Err(err) => {
                eprintln!("{}", format!("could not read {}: {err}", path.display()).red());
                std::process::exit(1);
            }
        }
    }

    run_repl(&mut interpreter);
}

fn run_repl(interpreter: &mut Interpreter) {
    println!("tinyscheme REPL. Press Ctrl+D or type 'exit' to quit.");

    let candidates = Rc::new(RefCell::new(Vec::new()));
    let completer = ReplCompleter {
        candidates: candidates.clone(),
    };
    let mut editor: Editor<ReplCompleter, rustyline::history::DefaultHistory> =
        Editor::new().expect("failed to initialize line editor");
    editor.set_helper(Some(completer));

    loop {
        // Refreshed each iteration so newly `define`d names are completable
        // alongside the built-in registry's.
        let mut names: Vec<String> = registry::names().map(str::to_string).collect();
        names.extend(interpreter.bound_names());
        *candidates.borrow_mut() = names;

        match editor.readline(">> ") {
            Ok(line) => {
                let _ = editor.add_history_entry(line.as_str());
                let trimmed = line.trim();
                if trimmed == "exit" {
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }
                log_debug(format!("evaluating: {trimmed}"));
                match interpreter.run(trimmed) {
                    Ok(result) => println!("= {result}"),
                    Err(err) => {
                        print_error(&err);
                    }
                }
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(rustyline::error::ReadlineError::Interrupted) => break,
            Err(err) => {
                eprintln!("{}", format!("Some internal error occurred! Exiting...\n{err}").red());
                std::process::exit(1);
            }
        }
    }
}

fn print_error(err: &Error) {
    log_error(err.to_string());
    eprintln!("{}", err.category_line().red());
}
