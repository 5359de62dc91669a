use std::rc::Rc;

use tracing::debug;

use crate::composer::ds::context::Receiver;
use crate::composer::ds::descriptor::ClassDef;
use crate::composer::ds::error::ClassError;
use crate::composer::ds::method::Method;
use crate::composer::ds::value::Value;

/// Signature of a plugin body: receives the class it is applied to and an
/// optional configuration value, and patches the class's members in
/// place. Deliberately unconstrained beyond that.
pub type PluginFn = dyn Fn(&ClassDef, Option<Value>) -> Result<(), ClassError>;

/// Identity token of an applied plugin. The token owns the plugin body's
/// allocation, which pins its address for the lifetime of the class: a
/// later plugin can never reuse it and be mistaken for one already
/// applied.
#[derive(Clone)]
pub(crate) enum PluginToken {
    Body(Rc<PluginFn>),
    Value(Method),
}

impl PluginToken {
    pub(crate) fn matches(&self, other: &PluginToken) -> bool {
        match (self, other) {
            (PluginToken::Body(a), PluginToken::Body(b)) => Rc::ptr_eq(a, b),
            (PluginToken::Value(a), PluginToken::Value(b)) => Method::same_method(a, b),
            _ => false,
        }
    }
}

/// A named plugin handle. Clones share the body and count as the same
/// plugin for idempotency purposes.
#[derive(Clone)]
pub struct Plugin {
    name: String,
    func: Rc<PluginFn>,
}

impl Plugin {
    pub fn new<F>(name: &str, func: F) -> Self
    where
        F: Fn(&ClassDef, Option<Value>) -> Result<(), ClassError> + 'static,
    {
        Plugin {
            name: name.to_string(),
            func: Rc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn token(&self) -> PluginToken {
        PluginToken::Body(self.func.clone())
    }
}

impl ClassDef {
    /// Applies the plugin to this class, at most once per plugin identity:
    /// repeat applications of the same plugin are no-ops. The identity is
    /// recorded only after the plugin body succeeds. Chainable.
    pub fn use_plugin<'a>(
        &'a self,
        plugin: &Plugin,
        config: Option<Value>,
    ) -> Result<&'a ClassDef, ClassError> {
        let token = plugin.token();
        if self.descriptor().has_plugin(&token) {
            return Ok(self);
        }
        debug!("applying plugin '{}' to class '{}'", plugin.name(), self.name());
        (plugin.func)(self, config)?;
        self.descriptor().record_plugin(token);
        Ok(self)
    }

    /// Applies a plugin held as a dynamic value. The value must be
    /// callable; it runs with this class as the receiver and the
    /// configuration as its sole argument. Same idempotency rule as
    /// `use_plugin`.
    pub fn use_value<'a>(
        &'a self,
        value: &Value,
        config: Option<Value>,
    ) -> Result<&'a ClassDef, ClassError> {
        match value {
            Value::Method(m) => {
                let token = PluginToken::Value(m.clone());
                if self.descriptor().has_plugin(&token) {
                    return Ok(self);
                }
                debug!("applying value plugin to class '{}'", self.name());
                m.invoke(
                    Receiver::Class(self.clone()),
                    &[config.unwrap_or(Value::Undefined)],
                )?;
                self.descriptor().record_plugin(token);
                Ok(self)
            }
            other => Err(ClassError::InvalidPlugin(other.to_string())),
        }
    }
}
