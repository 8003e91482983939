use std::cell::Cell;

use crate::token::{Token, Type};

/// Something that can be printed as a single diagnostic line and that
/// either counts as an error or as a warning.
pub trait Report {
    fn render(&self) -> String;

    /// Warnings are reported but never flip [`Diagnostics::had_error`].
    fn is_warning(&self) -> bool {
        false
    }
}

/// Accumulates error/warning counts for one run and prints diagnostics to
/// stderr. Threaded by shared reference through the scanner, parser,
/// resolver, and interpreter rather than kept as global `static mut`
/// flags, so a run's error state isn't global process state.
#[derive(Default)]
pub struct Diagnostics {
    errors: Cell<usize>,
    warnings: Cell<usize>,
    /// When set, `report` still counts but never prints. Used by the
    /// REPL's first, silent attempt at a line so that its failure isn't
    /// shown to the user before the bare-expression fallback gets a
    /// chance to succeed quietly in the common case.
    quiet: Cell<bool>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_quiet(&self, quiet: bool) {
        self.quiet.set(quiet);
    }

    /// Whether any error (not warning) has been reported since the last
    /// reset. Resolver/runtime warnings never set this.
    pub fn had_error(&self) -> bool {
        self.errors.get() > 0
    }

    pub fn error_count(&self) -> usize {
        self.errors.get()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.get()
    }

    /// Resets the counters. Used between REPL lines.
    pub fn reset(&self) {
        self.errors.set(0);
        self.warnings.set(0);
        self.quiet.set(false);
    }

    pub fn report(&self, report: &dyn Report) {
        if !self.quiet.get() {
            eprintln!("{}", report.render());
        }
        if report.is_warning() {
            self.warnings.set(self.warnings.get() + 1);
        } else {
            self.errors.set(self.errors.get() + 1);
        }
    }
}

/// A lexical error: unterminated string, unterminated number, unexpected
/// character. The scanner reports these immediately and keeps scanning.
#[derive(Debug)]
pub struct ScanError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl Report for ScanError {
    fn render(&self) -> String {
        format!("[line {}:{}] Error: {}", self.line, self.column, self.message)
    }
}

/// A syntactic error. The parser reports these at the point of failure
/// and resynchronizes (panic mode) rather than aborting.
#[derive(Debug)]
pub struct ParseError {
    pub token: Token,
    pub message: String,
}

impl Report for ParseError {
    fn render(&self) -> String {
        let location = self.token.location;
        if self.token.r#type == Type::EOF {
            format!("[line {}:{}] Error at end: {}", location.line, location.column, self.message)
        } else {
            format!(
                "[line {}:{}] Error at '{}': {}",
                location.line, location.column, self.token.lexeme, self.message
            )
        }
    }
}

/// Whether a resolver diagnostic is a hard semantic error (suppresses
/// execution) or a warning (doesn't).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A static-analysis diagnostic from the resolver: either a semantic
/// error (break outside a loop, `this` outside a class, redeclaration...)
/// or a warning (unused local, unreachable code, uninitialized `var`).
#[derive(Debug)]
pub struct ResolveDiagnostic {
    pub token: Token,
    pub message: String,
    pub severity: Severity,
}

impl ResolveDiagnostic {
    pub fn error(token: Token, message: impl Into<String>) -> Self {
        ResolveDiagnostic { token, message: message.into(), severity: Severity::Error }
    }

    pub fn warning(token: Token, message: impl Into<String>) -> Self {
        ResolveDiagnostic { token, message: message.into(), severity: Severity::Warning }
    }
}

impl Report for ResolveDiagnostic {
    fn render(&self) -> String {
        let location = self.token.location;
        let kind = match self.severity {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
        };
        format!(
            "[line {}:{}] {} at '{}': {}",
            location.line, location.column, kind, self.token.lexeme, self.message
        )
    }

    fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

/// A runtime fault: type error, undefined name, division by zero, arity
/// mismatch, non-callable call target, missing property, and the like.
/// Propagated as a normal `Result` up the interpreter's call stack and
/// unwinds evaluation to the top level the first time one occurs.
#[derive(Debug, Clone)]
pub struct RuntimeError {
    pub token: Token,
    pub message: String,
}

impl RuntimeError {
    pub fn new(token: Token, message: impl Into<String>) -> Self {
        RuntimeError { token, message: message.into() }
    }
}

impl Report for RuntimeError {
    fn render(&self) -> String {
        let location = self.token.location;
        format!(
            "[line {}:{}] Error at '{}': {}",
            location.line, location.column, self.token.lexeme, self.message
        )
    }
}
