pub mod ast;
pub mod class;
pub mod environment;
pub mod error;
pub mod expr;
pub mod function;
pub mod interpreter;
pub mod object;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod stmt;
pub mod token;

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::thread;

use error::Diagnostics;
use interpreter::Interpreter;
use parser::Parser;
use resolver::Resolver;
use scanner::Scanner;

/// Stack size the driver runs a script or prompt session on, well
/// beyond the default OS thread stack. The interpreter's own
/// `MAX_CALL_DEPTH` guard (see `interpreter.rs`) turns runaway Lox
/// recursion into a reported runtime error long before this is
/// exhausted; this is the "enlarge the stack" half of that guard,
/// giving legitimately deep (but finite) recursion room to run to
/// completion instead of aborting the process.
const STACK_SIZE: usize = 16 * 1024 * 1024;

/// Which pipeline stage, if any, reported an error for a run — drives
/// the process exit code policy (0 / 65 / 70).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    StaticError,
    RuntimeError,
}

/// One interpreter plus the diagnostics sink it reports through across
/// however many times `run` is called: once for a script, once per
/// line for a REPL.
pub struct Rocks<W: Write> {
    interpreter: Interpreter<W>,
    diagnostics: Diagnostics,
}

impl<W: Write> Rocks<W> {
    pub fn new(output: W) -> Self {
        Rocks { interpreter: Interpreter::new(output), diagnostics: Diagnostics::new() }
    }

    pub fn had_error(&self) -> bool {
        self.diagnostics.had_error()
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.error_count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.warning_count()
    }

    /// Runs `source` through scan -> parse -> resolve -> interpret,
    /// stopping at the first stage that reports an error. Resets the
    /// diagnostics counters at the start of every call, so a REPL can
    /// call this once per line without earlier lines' error counts
    /// leaking into later ones.
    pub fn run(&mut self, source: &str) -> Outcome {
        self.run_internal(source, false)
    }

    fn run_internal(&mut self, source: &str, quiet: bool) -> Outcome {
        self.diagnostics.reset();
        self.diagnostics.set_quiet(quiet);

        let tokens = Scanner::new(source).scan_tokens(&self.diagnostics);
        if self.diagnostics.had_error() {
            return Outcome::StaticError;
        }

        let mut parser = Parser::new(tokens, &self.diagnostics);
        let statements = parser.parse();
        if self.diagnostics.had_error() {
            return Outcome::StaticError;
        }

        let mut resolver = Resolver::new(&self.diagnostics);
        resolver.resolve(&statements);
        if self.diagnostics.had_error() {
            return Outcome::StaticError;
        }

        match self.interpreter.interpret(&statements) {
            Ok(()) => Outcome::Success,
            Err(err) => {
                self.diagnostics.report(&err);
                Outcome::RuntimeError
            }
        }
    }

    /// Runs one REPL line. A line that is a complete, valid statement
    /// (`print x;`, `var y = 1;`) runs exactly like `run`. A line that
    /// fails as a statement is silently re-tried as a bare expression
    /// (`1 + 2`, `someVar`) so the prompt can echo its value the way an
    /// interactive calculator would; this second attempt reports any
    /// error it hits normally, since by then it's the real failure the
    /// user should see.
    pub fn run_prompt_line(&mut self, line: &str) -> Outcome {
        let outcome = self.run_internal(line, true);
        if outcome == Outcome::Success {
            return outcome;
        }

        self.diagnostics.reset();

        let tokens = Scanner::new(line).scan_tokens(&self.diagnostics);
        if self.diagnostics.had_error() {
            return Outcome::StaticError;
        }

        let mut parser = Parser::new(tokens, &self.diagnostics);
        let expr = match parser.parse_expression_only() {
            Ok(expr) => expr,
            Err(err) => {
                self.diagnostics.report(&err);
                return Outcome::StaticError;
            }
        };

        match self.interpreter.evaluate(&expr) {
            Ok(value) => {
                self.interpreter.print_value(&value);
                Outcome::Success
            }
            Err(err) => {
                self.diagnostics.report(&err);
                Outcome::RuntimeError
            }
        }
    }
}

/// Constructs a driver writing interpreted `print` output to `output`.
/// A free function (rather than only `Rocks::new`) so callers can write
/// `rocks::new(&mut buffer)` without naming the generic struct.
pub fn new<W: Write>(output: W) -> Rocks<W> {
    Rocks::new(output)
}

/// Runs a script file to completion and returns the process exit code
/// it implies: 0 on success, 65 on a scan/parse/resolve error, 70 on a
/// runtime error. The run itself happens on a thread with an enlarged
/// stack (`STACK_SIZE`) so deep Lox recursion has room to either finish
/// or hit the interpreter's own call-depth guard and report a runtime
/// error, rather than overrunning the default thread stack.
pub fn run_file(path: &Path) -> io::Result<i32> {
    let source = fs::read_to_string(path)?;

    let handle = thread::Builder::new().stack_size(STACK_SIZE).spawn(move || run_file_on_current_thread(&source))?;
    Ok(handle.join().expect("interpreter thread panicked"))
}

fn run_file_on_current_thread(source: &str) -> i32 {
    let mut rocks = new(io::stdout());
    let outcome = rocks.run(source);

    let (errors, warnings) = (rocks.error_count(), rocks.warning_count());
    if errors > 0 || warnings > 0 {
        eprintln!("{errors} error(s) and {warnings} warning(s) occurred");
    }

    match outcome {
        Outcome::Success => 0,
        Outcome::StaticError => 65,
        Outcome::RuntimeError => 70,
    }
}

/// Runs an interactive prompt with line editing and history persisted
/// to `~/.rocks_history`. A script's errors never end the REPL; only
/// EOF (Ctrl-D) or an interrupt (Ctrl-C) does. Like `run_file`, the
/// whole session runs on a thread with an enlarged stack (`STACK_SIZE`)
/// so a deeply recursive line typed at the prompt is bounded by the
/// same guard instead of the default thread stack.
pub fn run_prompt() -> rustyline::Result<()> {
    let handle = thread::Builder::new().stack_size(STACK_SIZE).spawn(run_prompt_on_current_thread)?;
    handle.join().expect("interpreter thread panicked")
}

fn run_prompt_on_current_thread() -> rustyline::Result<()> {
    let mut editor = rustyline::DefaultEditor::new()?;
    let history_path = home::home_dir().map(|home| home.join(".rocks_history"));

    if let Some(path) = &history_path {
        let _ = editor.load_history(path);
    }

    let mut rocks = new(io::stdout());

    loop {
        match editor.readline("> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                editor.add_history_entry(line.as_str())?;
                rocks.run_prompt_line(&line);
            }
            Err(rustyline::error::ReadlineError::Interrupted) | Err(rustyline::error::ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error: {err}");
                break;
            }
        }
    }

    if let Some(path) = &history_path {
        let _ = editor.save_history(path);
    }

    Ok(())
}
