use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

use crate::class::{Class, Instance};
use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::expr::Expr;
use crate::function::{Callable, Function, NativeFunction};
use crate::object::{Number, Object};
use crate::stmt::Stmt;
use crate::token::{Token, Type};

/// What a statement did, propagated up the execution chain instead of
/// unwinding through exceptions. `Break`/`Return` bubble through loop
/// and block boundaries until something that understands them (a
/// `while` loop, a function call) consumes them; a bare top-level
/// `Break`/`Return` making it out of `interpret` would be a resolver
/// bug, not a runtime error, since the resolver already rejects both at
/// the wrong nesting level.
pub enum Flow {
    Normal,
    Break,
    Return(Object),
}

/// Ceiling on nested Lox calls. Caught here and turned into a reported
/// runtime error rather than left to exhaust the host stack; the
/// driver also runs the interpreter on a thread with an enlarged stack
/// (see `lib.rs::STACK_SIZE`) so ordinary deep recursion has headroom
/// well short of this guard.
const MAX_CALL_DEPTH: usize = 255;

/// Walks the resolved AST and executes it. Generic over the output sink
/// so tests can capture `print` output into an in-memory buffer instead
/// of writing to real stdout.
pub struct Interpreter<W: Write> {
    globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    output: W,
    call_depth: usize,
}

impl<W: Write> Interpreter<W> {
    pub fn new(output: W) -> Self {
        let globals = Environment::new();
        globals.borrow_mut().define("clock", Object::NativeFunction(Rc::new(NativeFunction::clock())));
        Interpreter { environment: Rc::clone(&globals), globals, output, call_depth: 0 }
    }

    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        for stmt in statements {
            self.execute(stmt)?;
        }
        Ok(())
    }

    /// Writes a stringified value followed by a newline to the output
    /// sink, exactly like a `print` statement. Used by the REPL's
    /// bare-expression fallback so an echoed value lands on the same
    /// sink as ordinary `print` output (letting tests capture it too).
    pub fn print_value(&mut self, value: &Object) {
        writeln!(self.output, "{value}").expect("failed to write interpreter output");
    }

    /// Reserves one level of call depth against `MAX_CALL_DEPTH`, to be
    /// released with a matching `exit_call` once the call returns.
    /// Every path that invokes a `Callable` goes through this pair —
    /// ordinary call expressions, getter access (`Instance::get`,
    /// `super.getter`), and constructor initializers (`Class::call`) —
    /// so recursion through any of them is bounded by the same guard,
    /// not just the explicit call-expression path.
    pub fn enter_call(&mut self, token: &Token) -> Result<(), RuntimeError> {
        if self.call_depth >= MAX_CALL_DEPTH {
            return Err(RuntimeError::new(token.clone(), "Stack overflow."));
        }
        self.call_depth += 1;
        Ok(())
    }

    pub fn exit_call(&mut self) {
        self.call_depth -= 1;
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<Flow, RuntimeError> {
        match stmt {
            Stmt::Block(data) => {
                let env = Environment::with_enclosing(Rc::clone(&self.environment));
                self.execute_block(&data.statements, env)
            }
            Stmt::Break(_) => Ok(Flow::Break),
            Stmt::Class(data) => self.execute_class(data),
            Stmt::Expression(data) => {
                self.evaluate(&data.expression)?;
                Ok(Flow::Normal)
            }
            Stmt::Function(data) => {
                let function = Function::new(Rc::clone(data), Rc::clone(&self.environment), false);
                self.environment.borrow_mut().define(data.name.lexeme.clone(), Object::Function(Rc::new(function)));
                Ok(Flow::Normal)
            }
            Stmt::If(data) => {
                if self.evaluate(&data.condition)?.is_truthy() {
                    self.execute(&data.then_branch)
                } else if let Some(else_branch) = &data.else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            }
            Stmt::Print(data) => {
                let value = self.evaluate(&data.expression)?;
                writeln!(self.output, "{value}").expect("failed to write interpreter output");
                Ok(Flow::Normal)
            }
            Stmt::Return(data) => {
                let value = match &data.value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Object::Nil,
                };
                Ok(Flow::Return(value))
            }
            Stmt::Var(data) => {
                let value = match &data.initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Object::Nil,
                };
                self.environment.borrow_mut().define(data.name.lexeme.clone(), value);
                Ok(Flow::Normal)
            }
            Stmt::While(data) => {
                while self.evaluate(&data.condition)?.is_truthy() {
                    match self.execute(&data.body)? {
                        Flow::Break => break,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Normal => {}
                    }
                }
                Ok(Flow::Normal)
            }
        }
    }

    fn execute_class(&mut self, data: &Rc<crate::stmt::ClassData>) -> Result<Flow, RuntimeError> {
        let superclass = match &data.superclass {
            Some(expr) => {
                let Expr::Variable(var_data) = expr else {
                    unreachable!("parser only ever emits a Variable expression as a superclass clause")
                };
                match self.evaluate(expr)? {
                    Object::Class(class) => Some(class),
                    _ => return Err(RuntimeError::new(var_data.name.clone(), "Superclass must be a class.")),
                }
            }
            None => None,
        };

        // Defined before its methods are built so a method can refer to
        // its own class name (e.g. to construct sibling instances).
        self.environment.borrow_mut().define(data.name.lexeme.clone(), Object::Nil);

        let methods_env = match &superclass {
            Some(superclass) => {
                let env = Environment::with_enclosing(Rc::clone(&self.environment));
                env.borrow_mut().define("super", Object::Class(Rc::clone(superclass)));
                env
            }
            None => Rc::clone(&self.environment),
        };

        let mut methods = HashMap::new();
        for method in &data.methods {
            let is_initializer = method.name.lexeme == "init";
            let function = Function::new(Rc::clone(method), Rc::clone(&methods_env), is_initializer);
            methods.insert(method.name.lexeme.clone(), Rc::new(function));
        }

        let class = Rc::new(Class::new(data.name.lexeme.clone(), superclass, methods));
        self.environment
            .borrow_mut()
            .assign(&data.name, Object::Class(class))
            .expect("class name was just defined in this environment");

        Ok(Flow::Normal)
    }

    /// Runs `statements` in a fresh child of `environment`, restoring
    /// the interpreter's previous environment before returning along
    /// every exit path (normal completion, break/return, or error).
    pub fn execute_block(&mut self, statements: &[Stmt], environment: Rc<RefCell<Environment>>) -> Result<Flow, RuntimeError> {
        let previous = std::mem::replace(&mut self.environment, environment);

        let mut result = Ok(Flow::Normal);
        for stmt in statements {
            match self.execute(stmt) {
                Ok(Flow::Normal) => continue,
                other => {
                    result = other;
                    break;
                }
            }
        }

        self.environment = previous;
        result
    }

    /// Evaluates a standalone expression outside of statement context.
    /// Used by the REPL's bare-expression fallback (see
    /// [`crate::Rocks::run_prompt_line`]); statement execution never
    /// needs this directly since `evaluate` is already reachable
    /// through `execute`.
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Object, RuntimeError> {
        match expr {
            Expr::Assign(data) => {
                let value = self.evaluate(&data.value)?;
                match data.depth.get() {
                    Some(distance) => Environment::assign_at(&self.environment, distance, &data.name, value.clone()),
                    None => self.globals.borrow_mut().assign(&data.name, value.clone())?,
                }
                Ok(value)
            }
            Expr::Binary(data) => {
                let left = self.evaluate(&data.left)?;
                let right = self.evaluate(&data.right)?;
                self.binary(&data.operator, left, right)
            }
            Expr::Call(data) => self.call(data),
            Expr::Function(data) => {
                Ok(Object::Function(Rc::new(Function::new(Rc::clone(data), Rc::clone(&self.environment), false))))
            }
            Expr::Get(data) => {
                let object = self.evaluate(&data.object)?;
                match object {
                    Object::Instance(instance) => Instance::get(&instance, &data.name, self),
                    _ => Err(RuntimeError::new(data.name.clone(), "Only instances have properties.")),
                }
            }
            Expr::Grouping(data) => self.evaluate(&data.expression),
            Expr::Literal(data) => Ok(data.value.clone()),
            Expr::Logical(data) => {
                let left = self.evaluate(&data.left)?;
                if data.operator.r#type == Type::Or {
                    if left.is_truthy() {
                        return Ok(left);
                    }
                } else if !left.is_truthy() {
                    return Ok(left);
                }
                self.evaluate(&data.right)
            }
            Expr::Set(data) => {
                let object = self.evaluate(&data.object)?;
                let Object::Instance(instance) = object else {
                    return Err(RuntimeError::new(data.name.clone(), "Only instances have fields."));
                };
                let value = self.evaluate(&data.value)?;
                Instance::set(&instance, &data.name, value.clone());
                Ok(value)
            }
            Expr::Super(data) => self.super_get(data),
            Expr::Ternary(data) => {
                if self.evaluate(&data.condition)?.is_truthy() {
                    self.evaluate(&data.then_branch)
                } else {
                    self.evaluate(&data.else_branch)
                }
            }
            Expr::This(data) => {
                let distance = data.depth.get().expect("resolver always binds 'this' to a depth inside a method");
                Ok(Environment::get_at(&self.environment, distance, "this"))
            }
            Expr::Unary(data) => {
                let right = self.evaluate(&data.right)?;
                match data.operator.r#type {
                    Type::Minus => Ok(Object::Number(self.check_number(&data.operator, &right)?.negate())),
                    Type::Bang => Ok(Object::Bool(!right.is_truthy())),
                    _ => unreachable!("parser never emits another operator for a unary expression"),
                }
            }
            Expr::Variable(data) => self.look_up_variable(&data.name, data.depth.get()),
        }
    }

    fn look_up_variable(&self, name: &Token, depth: Option<usize>) -> Result<Object, RuntimeError> {
        match depth {
            Some(distance) => Ok(Environment::get_at(&self.environment, distance, &name.lexeme)),
            None => self.globals.borrow().get(name),
        }
    }

    fn super_get(&mut self, data: &crate::expr::SuperData) -> Result<Object, RuntimeError> {
        let distance = data.depth.get().expect("resolver always binds 'super' to a depth inside a subclass method");
        let superclass = Environment::get_at(&self.environment, distance, "super");
        let Object::Class(superclass) = superclass else {
            unreachable!("'super' is only ever bound to a class value")
        };

        // `this` lives one environment closer than `super`, by
        // construction: the class body binds `super` then `this`.
        let instance = Environment::get_at(&self.environment, distance - 1, "this");

        let method = superclass
            .find_method(&data.method.lexeme)
            .ok_or_else(|| RuntimeError::new(data.method.clone(), format!("Undefined property '{}'.", data.method.lexeme)))?;

        let bound = method.bind(instance);
        if bound.is_getter() {
            self.enter_call(&data.method)?;
            let result = Callable::<W>::call(&bound, self, vec![]);
            self.exit_call();
            result
        } else {
            Ok(Object::Function(Rc::new(bound)))
        }
    }

    fn call(&mut self, data: &crate::expr::CallData) -> Result<Object, RuntimeError> {
        let callee = self.evaluate(&data.callee)?;

        let mut arguments = Vec::with_capacity(data.arguments.len());
        for argument in &data.arguments {
            arguments.push(self.evaluate(argument)?);
        }

        let arity = match &callee {
            Object::Function(f) => Callable::<W>::arity(&**f),
            Object::NativeFunction(f) => Callable::<W>::arity(&**f),
            Object::Class(c) => Callable::<W>::arity(c),
            _ => return Err(RuntimeError::new(data.paren.clone(), "Can only call functions and classes.")),
        };

        if arguments.len() != arity {
            return Err(RuntimeError::new(
                data.paren.clone(),
                format!("Expected {arity} arguments but got {}.", arguments.len()),
            ));
        }

        self.enter_call(&data.paren)?;
        let result = match callee {
            Object::Function(f) => Callable::<W>::call(&*f, self, arguments),
            Object::NativeFunction(f) => Callable::<W>::call(&*f, self, arguments),
            Object::Class(c) => Callable::<W>::call(&c, self, arguments),
            _ => unreachable!("non-callable values were already rejected above"),
        };
        self.exit_call();
        result
    }

    fn check_number(&self, operator: &Token, operand: &Object) -> Result<Number, RuntimeError> {
        match operand {
            Object::Number(n) => Ok(*n),
            _ => Err(RuntimeError::new(operator.clone(), "Operand must be a number.")),
        }
    }

    fn binary(&self, operator: &Token, left: Object, right: Object) -> Result<Object, RuntimeError> {
        match operator.r#type {
            Type::Plus => match (&left, &right) {
                (Object::Number(a), Object::Number(b)) => Ok(Object::Number(a.add(*b))),
                (Object::Str(a), Object::Str(b)) => Ok(Object::string(format!("{a}{b}"))),
                (Object::Str(a), b) => Ok(Object::string(format!("{a}{b}"))),
                (a, Object::Str(b)) => Ok(Object::string(format!("{a}{b}"))),
                _ => Err(RuntimeError::new(operator.clone(), "Operands must be two numbers or at least one string.")),
            },
            Type::Minus => {
                let (a, b) = self.numeric_operands(operator, &left, &right)?;
                Ok(Object::Number(a.sub(b)))
            }
            Type::Star => {
                let (a, b) = self.numeric_operands(operator, &left, &right)?;
                Ok(Object::Number(a.mul(b)))
            }
            Type::Slash => {
                let (a, b) = self.numeric_operands(operator, &left, &right)?;
                if b.is_zero() {
                    return Err(RuntimeError::new(operator.clone(), "Division by zero."));
                }
                Ok(Object::Number(a.div(b)))
            }
            Type::Greater | Type::GreaterEqual | Type::Less | Type::LessEqual => {
                self.compare(operator, &left, &right)
            }
            Type::BangEqual => Ok(Object::Bool(!left.is_equal(&right))),
            Type::EqualEqual => Ok(Object::Bool(left.is_equal(&right))),
            _ => unreachable!("parser never emits another operator for a binary expression"),
        }
    }

    fn numeric_operands(&self, operator: &Token, left: &Object, right: &Object) -> Result<(Number, Number), RuntimeError> {
        match (left, right) {
            (Object::Number(a), Object::Number(b)) => Ok((*a, *b)),
            _ => Err(RuntimeError::new(operator.clone(), "Operands must be numbers.")),
        }
    }

    fn compare(&self, operator: &Token, left: &Object, right: &Object) -> Result<Object, RuntimeError> {
        use std::cmp::Ordering;

        let ordering = match (left, right) {
            (Object::Number(a), Object::Number(b)) => a.partial_cmp(*b),
            (Object::Str(a), Object::Str(b)) => Some(a.as_str().cmp(b.as_str())),
            _ => None,
        };

        let Some(ordering) = ordering else {
            return Err(RuntimeError::new(operator.clone(), "Operands must be two numbers or two strings."));
        };

        let result = match operator.r#type {
            Type::Greater => ordering == Ordering::Greater,
            Type::GreaterEqual => ordering != Ordering::Less,
            Type::Less => ordering == Ordering::Less,
            Type::LessEqual => ordering != Ordering::Greater,
            _ => unreachable!(),
        };
        Ok(Object::Bool(result))
    }
}
