use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::function::{Callable, Function};
use crate::interpreter::Interpreter;
use crate::object::Object;
use crate::token::Token;

/// A class object. Methods are looked up by name and, on a cache miss,
/// forwarded to the superclass — `find_method` is the whole inheritance
/// model.
pub struct Class {
    pub name: String,
    pub superclass: Option<Rc<Class>>,
    pub methods: HashMap<String, Rc<Function>>,
}

impl Class {
    pub fn new(name: String, superclass: Option<Rc<Class>>, methods: HashMap<String, Rc<Function>>) -> Self {
        Class { name, superclass, methods }
    }

    pub fn find_method(&self, name: &str) -> Option<Rc<Function>> {
        if let Some(method) = self.methods.get(name) {
            return Some(Rc::clone(method));
        }
        self.superclass.as_ref().and_then(|superclass| superclass.find_method(name))
    }
}

/// Classes are callable: calling one constructs an instance and, if an
/// `init` method exists, runs it. Implemented on `Rc<Class>` rather than
/// `Class` directly so `call` can hand out a shared owner of `self`
/// without the caller needing to have an `Rc` already in hand.
impl<W: Write> Callable<W> for Rc<Class> {
    fn call(&self, interpreter: &mut Interpreter<W>, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        let instance = Rc::new(RefCell::new(Instance::new(Rc::clone(self))));
        if let Some(initializer) = self.find_method("init") {
            let bound = initializer.bind(Object::Instance(Rc::clone(&instance)));
            interpreter.enter_call(&bound.declaration.name)?;
            let result = Callable::<W>::call(&bound, interpreter, arguments);
            interpreter.exit_call();
            result?;
        }
        Ok(Object::Instance(instance))
    }

    fn arity(&self) -> usize {
        self.find_method("init").map_or(0, |initializer| initializer.declaration.params.len())
    }

    fn callable_name(&self) -> &str {
        &self.name
    }
}

/// An instance of a class: a class pointer plus its own field table.
/// Fields shadow methods of the same name, per the language's property
/// resolution order.
pub struct Instance {
    pub class: Rc<Class>,
    fields: HashMap<String, Object>,
}

impl Instance {
    pub fn new(class: Rc<Class>) -> Self {
        Instance { class, fields: HashMap::new() }
    }

    /// Resolves a property access: own fields first, then methods
    /// (bound to this instance), with getters invoked immediately
    /// instead of yielding a callable.
    pub fn get<W: Write>(
        instance: &Rc<RefCell<Instance>>,
        name: &Token,
        interpreter: &mut Interpreter<W>,
    ) -> Result<Object, RuntimeError> {
        if let Some(value) = instance.borrow().fields.get(&name.lexeme) {
            return Ok(value.clone());
        }

        let class = Rc::clone(&instance.borrow().class);
        if let Some(method) = class.find_method(&name.lexeme) {
            let bound = method.bind(Object::Instance(Rc::clone(instance)));
            return if bound.is_getter() {
                interpreter.enter_call(name)?;
                let result = Callable::<W>::call(&bound, interpreter, vec![]);
                interpreter.exit_call();
                result
            } else {
                Ok(Object::Function(Rc::new(bound)))
            };
        }

        Err(RuntimeError::new(name.clone(), format!("Undefined property '{}'.", name.lexeme)))
    }

    pub fn set(instance: &Rc<RefCell<Instance>>, name: &Token, value: Object) {
        instance.borrow_mut().fields.insert(name.lexeme.clone(), value);
    }
}
