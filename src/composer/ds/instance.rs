use std::cell::RefCell;
use std::fmt;
use std::fmt::Formatter;
use std::rc::Rc;

use crate::composer::ds::context::Receiver;
use crate::composer::ds::descriptor::{ClassDef, ClassDescriptor};
use crate::composer::ds::error::ClassError;
use crate::composer::ds::object::MemberTable;
use crate::composer::ds::value::Value;

struct InstanceData {
    fields: RefCell<MemberTable>,
    class: Rc<ClassDescriptor>,
}

/// A runtime object produced by constructing a class. Own fields shadow
/// class members; reads fall back through the whole ancestor chain.
#[derive(Clone)]
pub struct Instance(Rc<InstanceData>);

impl Instance {
    pub(crate) fn new(class: Rc<ClassDescriptor>) -> Self {
        Instance(Rc::new(InstanceData {
            fields: RefCell::new(MemberTable::new()),
            class,
        }))
    }

    /// The class this instance was constructed from.
    pub fn class(&self) -> ClassDef {
        ClassDef(self.0.class.clone())
    }

    /// Own field if set, else the effective class member, else `Undefined`.
    pub fn get(&self, name: &str) -> Value {
        let own = self.0.fields.borrow().get(name).cloned();
        match own {
            Some(v) => v,
            None => self
                .0
                .class
                .effective_member(name)
                .unwrap_or(Value::Undefined),
        }
    }

    /// Writes an own field, shadowing any class member of the same name.
    pub fn set(&self, name: &str, value: Value) {
        self.0
            .fields
            .borrow_mut()
            .insert(name.to_string(), value);
    }

    /// Resolves the effective method and invokes it with this instance as
    /// the receiver. Own fields holding a method shadow class methods.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, ClassError> {
        let own = self.0.fields.borrow().get(name).cloned();
        let method = match own {
            Some(Value::Method(m)) => Some(m),
            Some(_) => None,
            None => self.0.class.effective_method(name),
        };
        match method {
            Some(m) => m.invoke_as(name, Receiver::Instance(self.clone()), args),
            None => Err(ClassError::NotCallable(name.to_string())),
        }
    }

    /// Transitive is-a check: true for the instance's own class and every
    /// ancestor, matched by prototype-bag identity so wrapped foreign
    /// constructors count as the same kind.
    pub fn is_a(&self, class: &ClassDef) -> bool {
        self.0.class.chain_has_proto(class.descriptor().proto())
    }

    pub fn same_instance(a: &Instance, b: &Instance) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Instance(of {})", self.0.class.name())
    }
}
