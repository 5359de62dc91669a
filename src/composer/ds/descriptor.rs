use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::fmt::Formatter;
use std::rc::Rc;

use tracing::debug;

use crate::composer::build::{run_init_chain, Source};
use crate::composer::ds::error::ClassError;
use crate::composer::ds::instance::Instance;
use crate::composer::ds::method::Method;
use crate::composer::ds::object::ObjectBag;
use crate::composer::ds::value::Value;
use crate::composer::naming::NamingMode;
use crate::composer::plugin::PluginToken;

/// The reserved member name. The member stored under it is the
/// initializer: it is never wrapped with a super slot and is only invoked
/// through the construction chain.
pub const CONSTRUCTOR: &str = "constructor";

/// The resolved definition of one class: its own merged member table, a
/// back-reference to the ancestor it was built from, and the metadata the
/// composer resolved for it. Immutable after composition except for the
/// member table itself, which plugins patch in place.
pub struct ClassDescriptor {
    name: String,
    proto: ObjectBag,
    parent: Option<Rc<ClassDescriptor>>,
    /// Set only when this descriptor wraps a foreign constructor; used as
    /// the initializer when the member table carries none.
    foreign_init: Option<Method>,
    arity: usize,
    naming: NamingMode,
    plugins: RefCell<Vec<PluginToken>>,
}

impl ClassDescriptor {
    pub(crate) fn new(
        name: String,
        proto: ObjectBag,
        parent: Option<Rc<ClassDescriptor>>,
        foreign_init: Option<Method>,
        arity: usize,
        naming: NamingMode,
    ) -> Self {
        ClassDescriptor {
            name,
            proto,
            parent,
            foreign_init,
            arity,
            naming,
            plugins: RefCell::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub(crate) fn naming(&self) -> NamingMode {
        self.naming
    }

    pub(crate) fn proto(&self) -> &ObjectBag {
        &self.proto
    }

    pub fn parent(&self) -> Option<Rc<ClassDescriptor>> {
        self.parent.clone()
    }

    /// Member lookup along the chain, most-derived first, first match wins.
    pub fn effective_member(&self, name: &str) -> Option<Value> {
        match self.proto.get(name) {
            Some(v) => Some(v),
            None => match &self.parent {
                Some(p) => p.effective_member(name),
                None => None,
            },
        }
    }

    pub fn effective_method(&self, name: &str) -> Option<Method> {
        match self.effective_member(name) {
            Some(Value::Method(m)) => Some(m),
            _ => None,
        }
    }

    /// The initializer this descriptor itself contributes: its own
    /// `constructor` entry, read per construction so a plugin-installed
    /// replacement is honoured, or the wrapped foreign constructor.
    pub(crate) fn own_initializer(&self) -> Option<Method> {
        match self.proto.get(CONSTRUCTOR) {
            Some(Value::Method(m)) => Some(m),
            _ => self.foreign_init.clone(),
        }
    }

    /// The initializer a class contributes when used as a mixin source:
    /// the nearest explicit one anywhere in its chain.
    pub(crate) fn effective_initializer(&self) -> Option<Method> {
        match self.own_initializer() {
            Some(m) => Some(m),
            None => match &self.parent {
                Some(p) => p.effective_initializer(),
                None => None,
            },
        }
    }

    /// Flattens the whole chain into one member set, most-derived wins.
    pub fn effective_entries(&self) -> Vec<(String, Value)> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut result = Vec::new();
        let mut current: Option<&ClassDescriptor> = Some(self);
        while let Some(desc) = current {
            for (key, value) in desc.proto.entries() {
                if seen.insert(key.clone()) {
                    result.push((key, value));
                }
            }
            current = desc.parent.as_deref();
        }
        result
    }

    /// Whether the given prototype bag appears anywhere in this chain.
    /// This is what keeps instances of a wrapped foreign constructor
    /// recognizable as the foreign kind, and vice versa.
    pub(crate) fn chain_has_proto(&self, proto: &ObjectBag) -> bool {
        if ObjectBag::same_bag(&self.proto, proto) {
            return true;
        }
        match &self.parent {
            Some(p) => p.chain_has_proto(proto),
            None => false,
        }
    }

    pub(crate) fn has_plugin(&self, token: &PluginToken) -> bool {
        self.plugins.borrow().iter().any(|t| t.matches(token))
    }

    pub(crate) fn record_plugin(&self, token: PluginToken) {
        self.plugins.borrow_mut().push(token);
    }
}

/// A composed class value. Cheap to clone; clones share the descriptor and
/// compare as the same class.
#[derive(Clone)]
pub struct ClassDef(pub(crate) Rc<ClassDescriptor>);

impl ClassDef {
    pub fn name(&self) -> &str {
        self.0.name()
    }

    /// Declared parameter count of the class, i.e. of its most-derived
    /// explicit initializer (inherited when this class declares none).
    pub fn arity(&self) -> usize {
        self.0.arity()
    }

    pub fn descriptor(&self) -> &Rc<ClassDescriptor> {
        &self.0
    }

    /// Builds an instance and runs the initializer chain: the most-derived
    /// initializer first, the ancestor chain afterwards unless the
    /// initializer already delegated to it explicitly.
    pub fn construct(&self, args: &[Value]) -> Result<Instance, ClassError> {
        let instance = Instance::new(self.0.clone());
        run_init_chain(&self.0, &instance, args)?;
        Ok(instance)
    }

    /// Builds a subclass with this class as the ancestor. Merge rules are
    /// the same as for compose; the naming policy is inherited.
    pub fn extend(&self, sources: &[Source]) -> Result<ClassDef, ClassError> {
        crate::composer::build::build_class(Some(self.clone()), None, self.0.naming(), sources)
    }

    /// As `extend`, with a class name honoured under the dev naming policy.
    pub fn extend_named(&self, name: &str, sources: &[Source]) -> Result<ClassDef, ClassError> {
        crate::composer::build::build_class(
            Some(self.clone()),
            Some(name),
            self.0.naming(),
            sources,
        )
    }

    /// Effective member lookup along the ancestor chain.
    pub fn member(&self, name: &str) -> Option<Value> {
        self.0.effective_member(name)
    }

    /// Installs or replaces a member on this class in place. This is the
    /// monkey-patching entry point plugins work through; replacing
    /// `constructor` is allowed and observed by later constructions.
    pub fn set_member(&self, name: &str, value: Value) {
        self.0.proto.set(name, value);
    }

    /// Copies the full effective member set onto the target, overwriting
    /// colliding members and invoking no initializer. Chainable.
    pub fn mixin<'a>(&'a self, target: &ObjectBag) -> &'a ClassDef {
        let entries = self.0.effective_entries();
        debug!(
            "mixing {} members of class '{}' into target",
            entries.len(),
            self.name()
        );
        for (key, value) in entries {
            target.set(&key, value);
        }
        self
    }

    pub fn same_class(a: &ClassDef, b: &ClassDef) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }
}

impl fmt::Debug for ClassDef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ClassDef({}, arity={})", self.name(), self.arity())
    }
}
