use std::fmt;
use std::fmt::Formatter;
use std::rc::Rc;

use crate::composer::ds::context::{CallContext, Receiver};
use crate::composer::ds::descriptor::ClassDescriptor;
use crate::composer::ds::error::ClassError;
use crate::composer::ds::value::Value;

/// Signature of every callable member. The call context is scoped to
/// exactly one invocation and carries the receiver and the super slot, so
/// nothing has to be saved and restored around the call.
pub type NativeFn = dyn Fn(&mut CallContext, &[Value]) -> Result<Value, ClassError>;

/// Where an overriding method finds the member it shadowed. Attached at
/// merge time, exactly one slot per collision.
#[derive(Clone)]
pub enum SuperSlot {
    /// The shadowed method belonged to an earlier source of the same
    /// compose call; it is captured directly.
    Captured(Method),
    /// The shadowed method is inherited; it is resolved by name against
    /// the ancestor chain on every call, so replacing an ancestor method
    /// at runtime is observed by existing subclasses.
    Inherited {
        parent: Rc<ClassDescriptor>,
        name: String,
    },
}

/// A callable member: the native fn plus its declared arity and, when it
/// overrides another callable, the slot through which it reaches the
/// shadowed one. Clones share the underlying fn, and identity follows it.
#[derive(Clone)]
pub struct Method {
    func: Rc<NativeFn>,
    arity: usize,
    superior: Option<Box<SuperSlot>>,
}

impl Method {
    /// Creates a method with the given declared parameter count. Arity is
    /// plain metadata here; it is never enforced against the argument
    /// list, matching how a dynamic receiver treats extra arguments.
    pub fn new<F>(arity: usize, func: F) -> Self
    where
        F: Fn(&mut CallContext, &[Value]) -> Result<Value, ClassError> + 'static,
    {
        Method {
            func: Rc::new(func),
            arity,
            superior: None,
        }
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn has_superior(&self) -> bool {
        self.superior.is_some()
    }

    /// Same callable, same arity, new super slot. Used by the merge when
    /// an override collision is detected.
    pub(crate) fn with_superior(&self, slot: SuperSlot) -> Method {
        Method {
            func: self.func.clone(),
            arity: self.arity,
            superior: Some(Box::new(slot)),
        }
    }

    /// Invokes the method on the given receiver with a fresh call context.
    pub fn invoke(&self, receiver: Receiver, args: &[Value]) -> Result<Value, ClassError> {
        self.invoke_as("<anonymous>", receiver, args)
    }

    /// As `invoke`, but records the member name the method was resolved
    /// under, so super-lookup failures can name it.
    pub fn invoke_as(
        &self,
        name: &str,
        receiver: Receiver,
        args: &[Value],
    ) -> Result<Value, ClassError> {
        let mut ctx = CallContext::for_method(name, receiver, self.superior.as_deref().cloned());
        (self.func)(&mut ctx, args)
    }

    /// Runs the callable inside an already-prepared context. Construction
    /// frames are built by the initializer chain, not by the method.
    pub(crate) fn call_raw(
        &self,
        ctx: &mut CallContext,
        args: &[Value],
    ) -> Result<Value, ClassError> {
        (self.func)(ctx, args)
    }

    /// Identity of the underlying callable, used for plugin idempotency.
    pub(crate) fn id(&self) -> *const () {
        Rc::as_ptr(&self.func) as *const ()
    }

    /// Two methods are the same when they share the underlying fn,
    /// regardless of any super slot attached by a later merge.
    pub fn same_method(a: &Method, b: &Method) -> bool {
        a.id() == b.id()
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Method(arity={}, superior={})",
            self.arity,
            self.superior.is_some()
        )
    }
}
