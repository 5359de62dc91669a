use std::cell::RefCell;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

use crate::composer::ds::descriptor::ClassDef;
use crate::composer::ds::method::Method;
use crate::composer::ds::object::ObjectBag;

/// A dynamic member value. Data variants carry their payload directly;
/// `List`, `Object`, `Method` and `Class` are shared handles with identity
/// semantics.
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Rc<RefCell<Vec<Value>>>),
    Object(ObjectBag),
    Method(Method),
    Class(ClassDef),
}
impl Value {
    /// Wraps a vector in a fresh shared list handle.
    pub fn list(values: Vec<Value>) -> Value {
        Value::List(Rc::new(RefCell::new(values)))
    }

    /// Whether this value can sit on either side of an override
    /// collision. Only methods can: a class-valued member is a handle to
    /// construct through, not a body to shadow, so it replaces and is
    /// replaced plainly.
    pub fn is_callable(&self) -> bool {
        match self {
            Value::Method(_) => true,
            _ => false,
        }
    }

    pub fn as_method(&self) -> Option<&Method> {
        match self {
            Value::Method(m) => Some(m),
            _ => None,
        }
    }
}
impl Clone for Value {
    fn clone(&self) -> Self {
        match self {
            Value::Undefined => Value::Undefined,
            Value::Null => Value::Null,
            Value::Bool(d) => Value::Bool(*d),
            Value::Int(d) => Value::Int(*d),
            Value::Float(d) => Value::Float(*d),
            Value::Str(d) => Value::Str(d.to_string()),
            Value::List(d) => Value::List(d.clone()),
            Value::Object(d) => Value::Object(d.clone()),
            Value::Method(d) => Value::Method(d.clone()),
            Value::Class(d) => Value::Class(d.clone()),
        }
    }
}
impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "\"{}\"", s),
            Value::List(l) => write!(f, "list({})", l.borrow().len()),
            Value::Object(_) => write!(f, "object"),
            Value::Method(m) => write!(f, "function({})", m.arity()),
            Value::Class(c) => write!(f, "class {}", c.name()),
        }
    }
}
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "Value::Undefined"),
            Value::Null => write!(f, "Value::Null"),
            Value::Bool(b) => write!(f, "Value::Bool({})", b),
            Value::Int(n) => write!(f, "Value::Int({})", n),
            Value::Float(n) => write!(f, "Value::Float({})", n),
            Value::Str(s) => write!(f, "Value::Str({:?})", s),
            Value::List(l) => write!(f, "Value::List({:?})", l.borrow()),
            Value::Object(_) => write!(f, "Value::Object(...)"),
            Value::Method(m) => write!(f, "Value::Method(arity={})", m.arity()),
            Value::Class(c) => write!(f, "Value::Class({})", c.name()),
        }
    }
}
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            }
            (Value::Object(a), Value::Object(b)) => ObjectBag::same_bag(a, b),
            (Value::Method(a), Value::Method(b)) => Method::same_method(a, b),
            (Value::Class(a), Value::Class(b)) => ClassDef::same_class(a, b),
            _ => false,
        }
    }
}
