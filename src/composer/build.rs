use std::rc::Rc;

use tracing::{debug, trace};

use crate::composer::ds::context::CallContext;
use crate::composer::ds::descriptor::{ClassDef, ClassDescriptor, CONSTRUCTOR};
use crate::composer::ds::error::ClassError;
use crate::composer::ds::instance::Instance;
use crate::composer::ds::method::{Method, SuperSlot};
use crate::composer::ds::object::ObjectBag;
use crate::composer::ds::value::Value;
use crate::composer::naming::{resolve_name, NamingMode};

/// A foreign constructor: a callable that was not built by this composer,
/// together with the member bag that plays the role of its prototype.
#[derive(Clone)]
pub struct NativeClass {
    init: Method,
    bag: ObjectBag,
}

impl NativeClass {
    pub fn new(init: Method) -> Self {
        NativeClass {
            init,
            bag: ObjectBag::new(),
        }
    }

    pub fn with_bag(init: Method, bag: ObjectBag) -> Self {
        NativeClass { init, bag }
    }

    pub fn init(&self) -> &Method {
        &self.init
    }

    pub fn bag(&self) -> &ObjectBag {
        &self.bag
    }
}

/// One contribution to a class under composition. A closed set of kinds:
/// anything else entering through [`Source::from_value`] is rejected as an
/// invalid source.
pub enum Source {
    /// A plain capability bag.
    Bag(ObjectBag),
    /// A class built by this composer, flattened in as a mixin. Only
    /// `extend` creates ancestry.
    Class(ClassDef),
    /// A function-like value carrying its own member bag.
    Function(NativeClass),
}

impl Source {
    /// The dynamic boundary of the composer: converts an arbitrary value
    /// into a source, naming the value in the error when it is neither a
    /// member bag nor a callable.
    pub fn from_value(value: &Value) -> Result<Source, ClassError> {
        match value {
            Value::Object(bag) => Ok(Source::Bag(bag.clone())),
            Value::Class(class) => Ok(Source::Class(class.clone())),
            Value::Method(m) => Ok(Source::Function(NativeClass::new(m.clone()))),
            other => Err(ClassError::InvalidSource(other.to_string())),
        }
    }

    fn entries(&self) -> Vec<(String, Value)> {
        match self {
            Source::Bag(bag) => bag.entries(),
            Source::Class(class) => class.descriptor().effective_entries(),
            Source::Function(native) => native.bag.entries(),
        }
    }

    fn initializer(&self) -> Option<Method> {
        match self {
            Source::Bag(bag) => match bag.get(CONSTRUCTOR) {
                Some(Value::Method(m)) => Some(m),
                _ => None,
            },
            Source::Class(class) => class.descriptor().effective_initializer(),
            Source::Function(native) => Some(native.init.clone()),
        }
    }
}

/// The class factory. Carries the naming policy; everything else about a
/// composition is decided per call.
#[derive(Clone, Copy, Default)]
pub struct Composer {
    naming: NamingMode,
}

impl Composer {
    /// A composer that collapses all class names to the anonymous
    /// placeholder.
    pub fn new() -> Self {
        Composer {
            naming: NamingMode::Anonymous,
        }
    }

    /// A composer that honours supplied class names, sanitized.
    pub fn dev() -> Self {
        Composer {
            naming: NamingMode::Dev,
        }
    }

    pub fn with_naming(naming: NamingMode) -> Self {
        Composer { naming }
    }

    pub fn naming(&self) -> NamingMode {
        self.naming
    }

    /// Builds a root class from the given sources, layered in order with
    /// later sources winning.
    pub fn compose(&self, sources: &[Source]) -> Result<ClassDef, ClassError> {
        build_class(None, None, self.naming, sources)
    }

    /// As `compose`, with a class name honoured under the dev policy.
    pub fn compose_named(&self, name: &str, sources: &[Source]) -> Result<ClassDef, ClassError> {
        build_class(None, Some(name), self.naming, sources)
    }

    /// Composes from dynamic values. A leading string value is taken as
    /// the class name; every other value must convert to a source, and the
    /// whole call fails before any class state is built when one does not.
    pub fn compose_values(&self, values: &[Value]) -> Result<ClassDef, ClassError> {
        let (name, rest) = match values.first() {
            Some(Value::Str(s)) => (Some(s.as_str()), &values[1..]),
            _ => (None, values),
        };
        let mut sources = Vec::with_capacity(rest.len());
        for value in rest {
            sources.push(Source::from_value(value)?);
        }
        build_class(None, name, self.naming, &sources)
    }

    /// Wraps a pre-existing foreign constructor as a class. The class
    /// shares the foreign member bag, so instances remain recognizable as
    /// the foreign kind in both directions, and extending the class runs
    /// the foreign callable as the ancestor initializer.
    pub fn wrap(&self, native: &NativeClass) -> ClassDef {
        let name = resolve_name(self.naming, None);
        debug!("wrapped foreign constructor as class '{}'", name);
        ClassDef(Rc::new(ClassDescriptor::new(
            name,
            native.bag.clone(),
            None,
            Some(native.init.clone()),
            native.init.arity(),
            self.naming,
        )))
    }
}

/// What a member name already resolves to at the point a new source layer
/// is applied.
enum Shadowed {
    None,
    /// Defined by an earlier source of this same composition.
    Own(Value),
    /// Inherited from the ancestor chain.
    Inherited(Value, Rc<ClassDescriptor>),
}

/// Merges the sources over the parent chain and produces the descriptor.
/// Shared by `compose` and `extend`.
pub(crate) fn build_class(
    parent: Option<ClassDef>,
    name: Option<&str>,
    naming: NamingMode,
    sources: &[Source],
) -> Result<ClassDef, ClassError> {
    let parent_desc: Option<Rc<ClassDescriptor>> = parent.map(|c| c.descriptor().clone());
    let proto = ObjectBag::new();
    let mut initializer: Option<Method> = None;

    for source in sources {
        for (key, incoming) in source.entries() {
            if key == CONSTRUCTOR {
                // Method initializers are picked by the contest below;
                // anything else stored under the reserved name is data.
                if incoming.as_method().is_none() {
                    proto.set(&key, incoming);
                }
                continue;
            }
            let shadowed = if let Some(v) = proto.get(&key) {
                Shadowed::Own(v)
            } else if let Some(p) = parent_desc.as_ref() {
                match p.effective_member(&key) {
                    Some(v) => Shadowed::Inherited(v, p.clone()),
                    None => Shadowed::None,
                }
            } else {
                Shadowed::None
            };
            // Only a callable colliding with a callable gets a super
            // slot; a data member on either side replaces plainly. A
            // colliding method that already carries a super slot was
            // lifted out of another class; its body keeps reaching that
            // class's ancestry instead.
            let resolved = match shadowed {
                Shadowed::Own(prev) if incoming.is_callable() && prev.is_callable() => {
                    match (incoming.as_method(), prev.as_method()) {
                        (Some(m), Some(old)) if !m.has_superior() => {
                            trace!("capturing shadowed member '{}' from an earlier source", key);
                            Value::Method(m.with_superior(SuperSlot::Captured(old.clone())))
                        }
                        _ => incoming.clone(),
                    }
                }
                Shadowed::Inherited(prev, p) if incoming.is_callable() && prev.is_callable() => {
                    match incoming.as_method() {
                        Some(m) if !m.has_superior() => {
                            trace!("deferring super lookup of member '{}' to the chain", key);
                            Value::Method(m.with_superior(SuperSlot::Inherited {
                                parent: p,
                                name: key.clone(),
                            }))
                        }
                        _ => incoming.clone(),
                    }
                }
                _ => incoming.clone(),
            };
            proto.set(&key, resolved);
        }
        // Single authoritative initializer: the last explicit one across
        // the source list wins; mixin initializers never run on their own.
        if let Some(ctor) = source.initializer() {
            initializer = Some(ctor);
        }
    }

    let arity = match &initializer {
        Some(ctor) => ctor.arity(),
        None => parent_desc.as_ref().map(|p| p.arity()).unwrap_or(0),
    };
    if let Some(ctor) = initializer {
        proto.set(CONSTRUCTOR, Value::Method(ctor));
    }

    let resolved_name = resolve_name(naming, name);
    debug!(
        "composed class '{}' from {} sources (arity {}, parent: {})",
        resolved_name,
        sources.len(),
        arity,
        parent_desc.as_ref().map(|p| p.name()).unwrap_or("none"),
    );
    Ok(ClassDef(Rc::new(ClassDescriptor::new(
        resolved_name,
        proto,
        parent_desc,
        None,
        arity,
        naming,
    ))))
}

/// Runs one descriptor's slice of the initializer chain on a fresh
/// instance: the authored initializer first, then the ancestor chain with
/// the original arguments unless the initializer already delegated to it.
/// A descriptor with no initializer of its own hands straight over to its
/// ancestor, so every ancestor initializer runs exactly once per
/// construction.
pub(crate) fn run_init_chain(
    desc: &Rc<ClassDescriptor>,
    instance: &Instance,
    args: &[Value],
) -> Result<(), ClassError> {
    match desc.own_initializer() {
        None => match desc.parent() {
            None => Ok(()),
            Some(p) => run_init_chain(&p, instance, args),
        },
        Some(ctor) => {
            let mut ctx = CallContext::for_init(instance.clone(), desc.parent());
            ctx.begin_init();
            ctor.call_raw(&mut ctx, args)?;
            if !ctx.super_satisfied() {
                if let Some(p) = desc.parent() {
                    run_init_chain(&p, instance, args)?;
                }
            }
            ctx.finish_init();
            Ok(())
        }
    }
}
