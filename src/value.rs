//! Runtime values.
//!
//! Primitives are stored inline and copied; functions, classes and instances
//! are shared through `Rc`.  Instance fields sit behind a `RefCell` so a write
//! through one alias is visible through every other.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::ast::{FunctionDecl, FunctionKind};
use crate::environment::FrameChain;
use crate::resolver::SlotId;

#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    String(String),
    Function(Rc<LoxFunction>),
    Class(Rc<LoxClass>),
    Instance(Rc<LoxInstance>),
}

impl Value {
    /// `nil` and `false` are falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    /// Name used in diagnostics and debug logs.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Function(_) => "function",
            Value::Class(_) => "class",
            Value::Instance(_) => "instance",
        }
    }
}

/// Lox equality: no coercion between types, reference identity for
/// callables and instances, IEEE semantics for numbers (so `NaN != NaN`).
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),

            Value::Bool(b) => write!(f, "{}", b),

            Value::Number(n) => write_number(f, *n),

            Value::String(s) => write!(f, "{}", s),

            Value::Function(function) => write!(f, "{}", function),

            Value::Class(class) => write!(f, "{}", class.name),

            Value::Instance(instance) => write!(f, "{} instance", instance.class.name),
        }
    }
}

fn write_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.is_nan() {
        return write!(f, "nan");
    }

    if n.is_infinite() {
        return write!(f, "{}", if n > 0.0 { "inf" } else { "-inf" });
    }

    if n.fract() == 0.0 && n.abs() < 1e15 {
        // -0 prints as "-0", matching the float formatting of other values
        if n == 0.0 && n.is_sign_negative() {
            return write!(f, "-0");
        }

        let mut buf = itoa::Buffer::new();
        return write!(f, "{}", buf.format(n as i64));
    }

    write!(f, "{}", n)
}

/// A user function or method together with the frames it closes over.
#[derive(Debug)]
pub struct LoxFunction {
    pub declaration: Rc<FunctionDecl>,
    pub closure: FrameChain,

    /// The instance a bound method was taken from.
    pub receiver: Option<Rc<LoxInstance>>,
}

impl LoxFunction {
    pub fn new(declaration: Rc<FunctionDecl>, closure: FrameChain) -> Self {
        Self {
            declaration,
            closure,
            receiver: None,
        }
    }

    pub fn arity(&self) -> usize {
        self.declaration.arity()
    }

    pub fn is_initializer(&self) -> bool {
        self.declaration.kind == FunctionKind::Initializer
    }

    /// A copy of this method whose closure has `this` (at `this_slot`) bound
    /// to `instance`.
    pub fn bind(&self, instance: Rc<LoxInstance>, this_slot: SlotId) -> LoxFunction {
        let closure = self
            .closure
            .extend(this_slot, Value::Instance(Rc::clone(&instance)));

        LoxFunction {
            declaration: Rc::clone(&self.declaration),
            closure,
            receiver: Some(instance),
        }
    }
}

impl fmt::Display for LoxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.declaration.name {
            Some(name) => write!(f, "<fn {}>", name.lexeme),
            None => write!(f, "<fn>"),
        }
    }
}

/// A class: its methods and the default values of its declared fields.
#[derive(Debug)]
pub struct LoxClass {
    pub name: String,

    /// Methods (as `Value::Function`) and field defaults, by member name.
    pub members: HashMap<String, Value>,

    /// Slot the methods read `this` from.
    pub this_slot: Option<SlotId>,
}

impl LoxClass {
    pub fn new(name: String, members: HashMap<String, Value>, this_slot: Option<SlotId>) -> Self {
        Self {
            name,
            members,
            this_slot,
        }
    }

    pub fn initializer(&self) -> Option<&Rc<LoxFunction>> {
        match self.members.get("init") {
            Some(Value::Function(init)) if init.is_initializer() => Some(init),
            _ => None,
        }
    }

    /// Calling the class takes as many arguments as its initializer.
    pub fn arity(&self) -> usize {
        self.initializer().map_or(0, |init| init.arity())
    }
}

pub struct LoxInstance {
    pub class: Rc<LoxClass>,
    pub fields: RefCell<HashMap<String, Value>>,
}

// An instance may hold a method bound to itself; show field names only.
impl fmt::Debug for LoxInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<String> = self.fields.borrow().keys().cloned().collect();
        names.sort();

        f.debug_struct("LoxInstance")
            .field("class", &self.class.name)
            .field("fields", &names)
            .finish()
    }
}

impl LoxInstance {
    pub fn new(class: Rc<LoxClass>) -> Self {
        Self {
            class,
            fields: RefCell::new(HashMap::new()),
        }
    }

    /// Own field first, then the class members.  Methods come back bound to
    /// this instance.  `None` when neither has `name`.
    pub fn get(self: &Rc<Self>, name: &str) -> Option<Value> {
        if let Some(value) = self.fields.borrow().get(name) {
            return Some(value.clone());
        }

        match self.class.members.get(name)? {
            Value::Function(method) => {
                let bound = match self.class.this_slot {
                    Some(slot) => Rc::new(method.bind(Rc::clone(self), slot)),
                    None => Rc::clone(method),
                };

                Some(Value::Function(bound))
            }
            other => Some(other.clone()),
        }
    }

    pub fn set(&self, name: &str, value: Value) {
        self.fields.borrow_mut().insert(name.to_string(), value);
    }
}
