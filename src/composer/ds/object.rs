use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::composer::ds::context::Receiver;
use crate::composer::ds::error::ClassError;
use crate::composer::ds::value::Value;

/// Flat name-to-value member storage. Insertion order is irrelevant;
/// override precedence is decided by the merge, not by the table.
pub type MemberTable = HashMap<String, Value>;

/// A shared member bag with identity semantics. This is the analogue of a
/// plain object as well as of a class prototype: class descriptors,
/// foreign constructors and mixin targets all carry one of these.
#[derive(Clone)]
pub struct ObjectBag(Rc<RefCell<MemberTable>>);

impl ObjectBag {
    pub fn new() -> Self {
        ObjectBag(Rc::new(RefCell::new(MemberTable::new())))
    }

    pub fn from_table(table: MemberTable) -> Self {
        ObjectBag(Rc::new(RefCell::new(table)))
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.0.borrow().get(name).cloned()
    }

    pub fn set(&self, name: &str, value: Value) {
        self.0.borrow_mut().insert(name.to_string(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.borrow().contains_key(name)
    }

    pub fn keys(&self) -> Vec<String> {
        self.0.borrow().keys().cloned().collect()
    }

    /// Snapshot of all entries; used by the merge so no borrow is held
    /// while the target table is written.
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.0
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Invokes a callable member with this bag as the receiver. Mixed-in
    /// behavior keeps working on plain objects through this.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, ClassError> {
        match self.get(name) {
            Some(Value::Method(m)) => m.invoke_as(name, Receiver::Object(self.clone()), args),
            _ => Err(ClassError::NotCallable(name.to_string())),
        }
    }

    /// Identity comparison. Two bags are the same only if they share the
    /// underlying table.
    pub fn same_bag(a: &ObjectBag, b: &ObjectBag) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }
}
