use std::rc::Rc;

use crate::composer::build::run_init_chain;
use crate::composer::ds::descriptor::{ClassDef, ClassDescriptor, CONSTRUCTOR};
use crate::composer::ds::error::ClassError;
use crate::composer::ds::instance::Instance;
use crate::composer::ds::method::SuperSlot;
use crate::composer::ds::object::ObjectBag;
use crate::composer::ds::value::Value;

/// The `this` of one invocation. Instances are the common case; plain
/// bags receive mixed-in methods and classes receive plugins.
#[derive(Clone)]
pub enum Receiver {
    Instance(Instance),
    Object(ObjectBag),
    Class(ClassDef),
}

impl Receiver {
    pub fn get(&self, name: &str) -> Value {
        match self {
            Receiver::Instance(i) => i.get(name),
            Receiver::Object(o) => o.get(name).unwrap_or(Value::Undefined),
            Receiver::Class(c) => c.member(name).unwrap_or(Value::Undefined),
        }
    }

    pub fn set(&self, name: &str, value: Value) {
        match self {
            Receiver::Instance(i) => i.set(name, value),
            Receiver::Object(o) => o.set(name, value),
            Receiver::Class(c) => c.set_member(name, value),
        }
    }

    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, ClassError> {
        match self {
            Receiver::Instance(i) => i.call(name, args),
            Receiver::Object(o) => o.call(name, args),
            Receiver::Class(c) => match c.member(name) {
                Some(Value::Method(m)) => m.invoke_as(name, self.clone(), args),
                _ => Err(ClassError::NotCallable(name.to_string())),
            },
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Receiver::Instance(i) => Some(i),
            _ => None,
        }
    }
}

/// Progress of one construction frame through its initializer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InitState {
    NotStarted,
    /// The authored initializer is running and the super reference is
    /// bound but has not been invoked.
    SuperPending,
    /// The super reference was invoked; the composer must not run the
    /// ancestor chain a second time.
    SuperSatisfied,
    Done,
}

pub(crate) struct InitFrame {
    pub(crate) state: InitState,
    pub(crate) parent: Option<Rc<ClassDescriptor>>,
}

/// Per-invocation context handed to every native fn. It replaces the
/// transient super binding of a dynamic receiver: the super slot lives in
/// the frame, so it cannot leak across calls and needs no restoration on
/// error paths.
pub struct CallContext {
    method: String,
    receiver: Receiver,
    superior: Option<SuperSlot>,
    init: Option<InitFrame>,
}

impl CallContext {
    pub(crate) fn for_method(
        name: &str,
        receiver: Receiver,
        superior: Option<SuperSlot>,
    ) -> Self {
        CallContext {
            method: name.to_string(),
            receiver,
            superior,
            init: None,
        }
    }

    pub(crate) fn for_init(instance: Instance, parent: Option<Rc<ClassDescriptor>>) -> Self {
        CallContext {
            method: CONSTRUCTOR.to_string(),
            receiver: Receiver::Instance(instance),
            superior: None,
            init: Some(InitFrame {
                state: InitState::NotStarted,
                parent,
            }),
        }
    }

    pub fn receiver(&self) -> &Receiver {
        &self.receiver
    }

    /// Member read on the receiver, `Undefined` when absent.
    pub fn get(&self, name: &str) -> Value {
        self.receiver.get(name)
    }

    /// Member write on the receiver.
    pub fn set(&self, name: &str, value: Value) {
        self.receiver.set(name, value);
    }

    /// Invokes another member of the receiver, resolving it afresh.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, ClassError> {
        self.receiver.call(name, args)
    }

    /// Whether this frame has a super reference to invoke.
    pub fn has_superior(&self) -> bool {
        self.superior.is_some() || self.init.is_some()
    }

    /// Invokes the super reference of this frame.
    ///
    /// Inside an initializer this runs the ancestor chain's own
    /// initializer logic with the given arguments and marks the chain
    /// satisfied, so the composer will not run it again; at the root of
    /// the chain it is a no-op. Inside an overriding method it invokes the
    /// shadowed method with the same receiver.
    pub fn call_super(&mut self, args: &[Value]) -> Result<Value, ClassError> {
        if let Some(frame) = self.init.as_mut() {
            frame.state = InitState::SuperSatisfied;
            let parent = frame.parent.clone();
            let instance = match self.receiver.as_instance() {
                Some(i) => i.clone(),
                None => return Err(ClassError::NoSuperMethod(CONSTRUCTOR.to_string())),
            };
            if let Some(p) = parent {
                run_init_chain(&p, &instance, args)?;
            }
            return Ok(Value::Undefined);
        }
        match self.superior.clone() {
            Some(SuperSlot::Captured(m)) => {
                m.invoke_as(&self.method, self.receiver.clone(), args)
            }
            Some(SuperSlot::Inherited { parent, name }) => match parent.effective_method(&name) {
                Some(m) => m.invoke_as(&name, self.receiver.clone(), args),
                None => Err(ClassError::NoSuperMethod(name)),
            },
            None => Err(ClassError::NoSuperMethod(self.method.clone())),
        }
    }

    pub(crate) fn begin_init(&mut self) {
        if let Some(frame) = self.init.as_mut() {
            frame.state = InitState::SuperPending;
        }
    }

    pub(crate) fn super_satisfied(&self) -> bool {
        match &self.init {
            Some(frame) => frame.state == InitState::SuperSatisfied,
            None => false,
        }
    }

    pub(crate) fn finish_init(&mut self) {
        if let Some(frame) = self.init.as_mut() {
            frame.state = InitState::Done;
        }
    }
}
