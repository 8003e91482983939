use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{Diagnostics, ResolveDiagnostic};
use crate::expr::{Expr, FunctionData};
use crate::stmt::Stmt;
use crate::token::Token;

struct ScopeEntry {
    defined: bool,
    accessed: bool,
    token: Token,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum FunctionKind {
    None,
    Function,
    Method,
    Initializer,
    Getter,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum LoopKind {
    None,
    While,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ClassKind {
    None,
    Class,
    Subclass,
}

/// A static pass between parsing and interpretation that binds every
/// variable/`this`/`super` reference to a lexical depth and writes it
/// directly onto the AST node's `depth` cell, and flags a handful of
/// statically-detectable mistakes (break outside a loop, return outside
/// a function, a getter named `init`, shadowed self-reference in an
/// initializer) that the interpreter would otherwise only catch, or
/// silently mishandle, at runtime.
pub struct Resolver<'a> {
    scopes: Vec<HashMap<String, ScopeEntry>>,
    diagnostics: &'a Diagnostics,
    current_function: FunctionKind,
    current_loop: LoopKind,
    current_class: ClassKind,
}

impl<'a> Resolver<'a> {
    pub fn new(diagnostics: &'a Diagnostics) -> Self {
        Resolver {
            scopes: Vec::new(),
            diagnostics,
            current_function: FunctionKind::None,
            current_loop: LoopKind::None,
            current_class: ClassKind::None,
        }
    }

    pub fn resolve(&mut self, statements: &[Stmt]) {
        self.resolve_stmts(statements);
    }

    fn resolve_stmts(&mut self, statements: &[Stmt]) {
        for (i, stmt) in statements.iter().enumerate() {
            self.resolve_stmt(stmt);
            if let Stmt::Return(data) = stmt {
                if i + 1 < statements.len() {
                    self.diagnostics
                        .report(&ResolveDiagnostic::warning(data.keyword.clone(), "Unreachable code after return."));
                }
            }
        }
    }

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        if let Some(scope) = self.scopes.pop() {
            for entry in scope.into_values() {
                let lexeme = entry.token.lexeme.as_str();
                if !entry.accessed && lexeme != "this" && lexeme != "super" {
                    self.diagnostics.report(&ResolveDiagnostic::warning(
                        entry.token.clone(),
                        format!("Local variable '{lexeme}' is never used."),
                    ));
                }
            }
        }
    }

    fn declare(&mut self, name: &Token) {
        let Some(scope) = self.scopes.last_mut() else { return };
        if scope.contains_key(&name.lexeme) {
            self.diagnostics.report(&ResolveDiagnostic::error(
                name.clone(),
                format!("Already a variable named '{}' in this scope.", name.lexeme),
            ));
        }
        scope.insert(name.lexeme.clone(), ScopeEntry { defined: false, accessed: false, token: name.clone() });
    }

    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            if let Some(entry) = scope.get_mut(&name.lexeme) {
                entry.defined = true;
            }
        }
    }

    fn resolve_local(&mut self, name: &Token, depth: &Cell<Option<usize>>) {
        for (i, scope) in self.scopes.iter_mut().enumerate().rev() {
            if let Some(entry) = scope.get_mut(&name.lexeme) {
                entry.accessed = true;
                depth.set(Some(self.scopes.len() - 1 - i));
                return;
            }
        }
        // Not found in any local scope: treat as global.
    }

    fn resolve_function(&mut self, data: &Rc<FunctionData>, kind: FunctionKind) {
        let enclosing_function = self.current_function;
        let enclosing_loop = self.current_loop;
        self.current_function = kind;
        // A function body starts a fresh loop context: a `break` inside it
        // can only refer to a loop written inside the body itself, never
        // one lexically enclosing the function declaration.
        self.current_loop = LoopKind::None;

        self.begin_scope();
        for param in &data.params {
            self.declare(param);
            self.define(param);
        }
        self.resolve_stmts(&data.body);
        self.end_scope();

        self.current_function = enclosing_function;
        self.current_loop = enclosing_loop;
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(data) => {
                self.begin_scope();
                self.resolve_stmts(&data.statements);
                self.end_scope();
            }
            Stmt::Break(data) => {
                if self.current_loop == LoopKind::None {
                    self.diagnostics
                        .report(&ResolveDiagnostic::error(data.keyword.clone(), "Can't break outside of a loop."));
                }
            }
            Stmt::Class(data) => self.resolve_class(data),
            Stmt::Expression(data) => self.resolve_expr(&data.expression),
            Stmt::Function(data) => {
                self.declare(&data.name);
                self.define(&data.name);
                self.resolve_function(data, FunctionKind::Function);
            }
            Stmt::If(data) => {
                self.resolve_expr(&data.condition);
                self.resolve_stmt(&data.then_branch);
                if let Some(else_branch) = &data.else_branch {
                    self.resolve_stmt(else_branch);
                }
            }
            Stmt::Print(data) => self.resolve_expr(&data.expression),
            Stmt::Return(data) => {
                if self.current_function == FunctionKind::None {
                    self.diagnostics
                        .report(&ResolveDiagnostic::error(data.keyword.clone(), "Can't return from top-level code."));
                }
                if let Some(value) = &data.value {
                    if self.current_function == FunctionKind::Initializer {
                        self.diagnostics.report(&ResolveDiagnostic::error(
                            data.keyword.clone(),
                            "Can't return a value from an initializer.",
                        ));
                    }
                    self.resolve_expr(value);
                }
            }
            Stmt::Var(data) => {
                self.declare(&data.name);
                match &data.initializer {
                    Some(initializer) => {
                        self.resolve_expr(initializer);
                    }
                    None => {
                        self.diagnostics.report(&ResolveDiagnostic::warning(
                            data.name.clone(),
                            format!("Variable '{}' is declared without an initializer; it defaults to nil.", data.name.lexeme),
                        ));
                    }
                }
                self.define(&data.name);
            }
            Stmt::While(data) => {
                let enclosing_loop = self.current_loop;
                self.current_loop = LoopKind::While;
                self.resolve_expr(&data.condition);
                self.resolve_stmt(&data.body);
                self.current_loop = enclosing_loop;
            }
        }
    }

    fn resolve_class(&mut self, data: &Rc<crate::stmt::ClassData>) {
        let enclosing_class = self.current_class;
        self.current_class = ClassKind::Class;

        self.declare(&data.name);
        self.define(&data.name);

        if let Some(superclass) = &data.superclass {
            if let Expr::Variable(superclass_data) = superclass {
                if superclass_data.name.lexeme == data.name.lexeme {
                    self.diagnostics.report(&ResolveDiagnostic::error(
                        superclass_data.name.clone(),
                        "A class can't inherit from itself.",
                    ));
                }
            }
            self.current_class = ClassKind::Subclass;
            self.resolve_expr(superclass);

            self.begin_scope();
            self.scopes
                .last_mut()
                .expect("scope just pushed")
                .insert(
                    "super".to_string(),
                    ScopeEntry { defined: true, accessed: false, token: Token { lexeme: "super".to_string(), ..data.name.clone() } },
                );
        }

        self.begin_scope();
        self.scopes
            .last_mut()
            .expect("scope just pushed")
            .insert(
                "this".to_string(),
                ScopeEntry { defined: true, accessed: false, token: Token { lexeme: "this".to_string(), ..data.name.clone() } },
            );

        for method in &data.methods {
            if method.is_getter && method.name.lexeme == "init" {
                self.diagnostics.report(&ResolveDiagnostic::error(
                    method.name.clone(),
                    "A getter can't be named 'init'.",
                ));
            }

            let kind = if method.name.lexeme == "init" {
                FunctionKind::Initializer
            } else if method.is_getter {
                FunctionKind::Getter
            } else {
                FunctionKind::Method
            };
            self.resolve_function(method, kind);
        }

        self.end_scope();

        if data.superclass.is_some() {
            self.end_scope();
        }

        self.current_class = enclosing_class;
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Assign(data) => {
                self.resolve_expr(&data.value);
                self.resolve_local(&data.name, &data.depth);
            }
            Expr::Binary(data) => {
                self.resolve_expr(&data.left);
                self.resolve_expr(&data.right);
            }
            Expr::Call(data) => {
                self.resolve_expr(&data.callee);
                for argument in &data.arguments {
                    self.resolve_expr(argument);
                }
            }
            Expr::Function(data) => self.resolve_function(data, FunctionKind::Function),
            Expr::Get(data) => self.resolve_expr(&data.object),
            Expr::Grouping(data) => self.resolve_expr(&data.expression),
            Expr::Literal(_) => {}
            Expr::Logical(data) => {
                self.resolve_expr(&data.left);
                self.resolve_expr(&data.right);
            }
            Expr::Set(data) => {
                self.resolve_expr(&data.value);
                self.resolve_expr(&data.object);
            }
            Expr::Super(data) => {
                if self.current_class == ClassKind::None {
                    self.diagnostics
                        .report(&ResolveDiagnostic::error(data.keyword.clone(), "Can't use 'super' outside of a class."));
                } else if self.current_class != ClassKind::Subclass {
                    self.diagnostics.report(&ResolveDiagnostic::error(
                        data.keyword.clone(),
                        "Can't use 'super' in a class with no superclass.",
                    ));
                }
                self.resolve_local(&super_token(&data.keyword), &data.depth);
            }
            Expr::Ternary(data) => {
                self.resolve_expr(&data.condition);
                self.resolve_expr(&data.then_branch);
                self.resolve_expr(&data.else_branch);
            }
            Expr::This(data) => {
                if self.current_class == ClassKind::None {
                    self.diagnostics
                        .report(&ResolveDiagnostic::error(data.keyword.clone(), "Can't use 'this' outside of a class."));
                }
                self.resolve_local(&this_token(&data.keyword), &data.depth);
            }
            Expr::Unary(data) => self.resolve_expr(&data.right),
            Expr::Variable(data) => {
                if let Some(scope) = self.scopes.last() {
                    if let Some(entry) = scope.get(&data.name.lexeme) {
                        if !entry.defined {
                            self.diagnostics.report(&ResolveDiagnostic::error(
                                data.name.clone(),
                                "Can't read local variable in its own initializer.",
                            ));
                        }
                    }
                }
                self.resolve_local(&data.name, &data.depth);
            }
        }
    }
}

/// `this`/`super` are resolved by lexical lookup exactly like any other
/// variable, keyed by the fixed names the resolver bound them under;
/// these build lookup keys from the `this`/`super` keyword tokens.
fn this_token(keyword: &Token) -> Token {
    Token { lexeme: "this".to_string(), ..keyword.clone() }
}

fn super_token(keyword: &Token) -> Token {
    Token { lexeme: "super".to_string(), ..keyword.clone() }
}
