use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::expr::FunctionData;
use crate::interpreter::{Flow, Interpreter};
use crate::object::{Number, Object};

/// Anything that can appear on the left of a call expression. Generic
/// over the interpreter's output sink so native functions, user
/// functions, and classes (as constructors) all dispatch the same way
/// regardless of what `W` the running interpreter was built with.
pub trait Callable<W: Write> {
    fn call(&self, interpreter: &mut Interpreter<W>, arguments: Vec<Object>) -> Result<Object, RuntimeError>;
    fn arity(&self) -> usize;
    fn callable_name(&self) -> &str;
}

/// A user-defined function or method. Getters are represented as a
/// `Function` with zero parameters and `is_getter` set, rather than a
/// separate type, since they're invoked the same way.
pub struct Function {
    pub declaration: Rc<FunctionData>,
    pub closure: Rc<RefCell<Environment>>,
    pub is_initializer: bool,
}

impl Function {
    pub fn new(declaration: Rc<FunctionData>, closure: Rc<RefCell<Environment>>, is_initializer: bool) -> Self {
        Function { declaration, closure, is_initializer }
    }

    pub fn is_getter(&self) -> bool {
        self.declaration.is_getter
    }

    /// Produces a copy of this function whose closure has one extra
    /// frame binding `this` to `instance`. Methods aren't stored bound;
    /// binding happens lazily on each property access, matching the
    /// teacher's instance lookup.
    pub fn bind(&self, instance: Object) -> Function {
        let env = Environment::with_enclosing(Rc::clone(&self.closure));
        env.borrow_mut().define("this", instance);
        Function { declaration: Rc::clone(&self.declaration), closure: env, is_initializer: self.is_initializer }
    }
}

impl<W: Write> Callable<W> for Function {
    fn call(&self, interpreter: &mut Interpreter<W>, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        let env = Environment::with_enclosing(Rc::clone(&self.closure));
        for (param, arg) in self.declaration.params.iter().zip(arguments) {
            env.borrow_mut().define(param.lexeme.clone(), arg);
        }

        let flow = interpreter.execute_block(&self.declaration.body, env)?;

        if self.is_initializer {
            // `init()` always yields the instance, whether it returns
            // explicitly, returns bare `return;`, or falls off the end.
            return Ok(Environment::get_at(&self.closure, 0, "this"));
        }

        match flow {
            Flow::Return(value) => Ok(value),
            _ => Ok(Object::Nil),
        }
    }

    fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    fn callable_name(&self) -> &str {
        &self.declaration.name.lexeme
    }
}

/// A host-implemented function exposed to Lox code, like `clock`.
pub struct NativeFunction {
    pub name: String,
    pub arity: usize,
    implementation: Box<dyn Fn(Vec<Object>) -> Result<Object, RuntimeError>>,
}

impl<W: Write> Callable<W> for NativeFunction {
    fn call(&self, _interpreter: &mut Interpreter<W>, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        (self.implementation)(arguments)
    }

    fn arity(&self) -> usize {
        self.arity
    }

    fn callable_name(&self) -> &str {
        &self.name
    }
}

impl NativeFunction {
    /// Milliseconds since the Unix epoch, as a float. The epoch is
    /// unspecified per the language contract — callers only rely on
    /// this being monotonically non-decreasing within a run, never on
    /// its absolute value.
    pub fn clock() -> NativeFunction {
        NativeFunction {
            name: "clock".to_string(),
            arity: 0,
            implementation: Box::new(|_arguments| {
                let now = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .expect("system clock is before the Unix epoch")
                    .as_millis() as f64;
                Ok(Object::Number(Number::Float(now)))
            }),
        }
    }
}
