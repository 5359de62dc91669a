//! # protoclass - Class Composition over a Prototype-Style Object Model
//!
//! A small runtime that emulates classical class inheritance, multiple-mixin
//! composition and super-method delegation on top of an explicit
//! prototype-style object model:
//! - A single factory ([`composer::build::Composer`]) that merges member
//!   sources into constructible class values
//! - Extension chains with automatic ancestor-initializer chaining
//! - Override wrappers that let a shadowing method reach the method it
//!   shadowed through a call-scoped super reference
//! - Runtime mixin injection onto arbitrary member bags
//! - An idempotent plugin mechanism for monkey-patching class members
//!
//! ## Quick Start
//!
//! ### Composing a class
//!
//! ```
//! use protoclass::composer::build::{Composer, Source};
//! use protoclass::composer::ds::method::Method;
//! use protoclass::composer::ds::object::ObjectBag;
//! use protoclass::composer::ds::value::Value;
//!
//! let proto = ObjectBag::new();
//! proto.set("name", Value::Str("Jimmy".to_string()));
//! proto.set(
//!     "get_name",
//!     Value::Method(Method::new(0, |ctx, _args| Ok(ctx.get("name")))),
//! );
//!
//! let animal = Composer::new().compose(&[Source::Bag(proto)]).unwrap();
//! let jimmy = animal.construct(&[]).unwrap();
//!
//! assert_eq!(jimmy.get("name"), Value::Str("Jimmy".to_string()));
//! assert_eq!(
//!     jimmy.call("get_name", &[]).unwrap(),
//!     Value::Str("Jimmy".to_string())
//! );
//! ```
//!
//! ### Extending and delegating to the ancestor
//!
//! ```
//! use protoclass::composer::build::{Composer, Source};
//! use protoclass::composer::ds::method::Method;
//! use protoclass::composer::ds::object::ObjectBag;
//! use protoclass::composer::ds::value::Value;
//!
//! let animal_proto = ObjectBag::new();
//! animal_proto.set(
//!     "constructor",
//!     Value::Method(Method::new(1, |ctx, args| {
//!         if let Some(name) = args.first() {
//!             ctx.set("name", name.clone());
//!         }
//!         Ok(Value::Undefined)
//!     })),
//! );
//! let animal = Composer::new().compose(&[Source::Bag(animal_proto)]).unwrap();
//!
//! let cat_proto = ObjectBag::new();
//! cat_proto.set(
//!     "constructor",
//!     Value::Method(Method::new(0, |ctx, _args| {
//!         ctx.call_super(&[Value::Str("Whiskers".to_string())])?;
//!         Ok(Value::Undefined)
//!     })),
//! );
//! let cat = animal.extend(&[Source::Bag(cat_proto)]).unwrap();
//!
//! let whiskers = cat.construct(&[]).unwrap();
//! assert_eq!(whiskers.get("name"), Value::Str("Whiskers".to_string()));
//! assert!(whiskers.is_a(&cat));
//! assert!(whiskers.is_a(&animal));
//! ```
//!
//! ### Plugins
//!
//! Plugins monkey-patch a class in place, typically by capturing a member
//! and installing a replacement that delegates to the capture. A plugin is
//! applied at most once per class, keyed by its identity:
//!
//! ```
//! use protoclass::composer::build::{Composer, Source};
//! use protoclass::composer::ds::object::ObjectBag;
//! use protoclass::composer::ds::value::Value;
//! use protoclass::composer::plugin::Plugin;
//!
//! let class = Composer::new()
//!     .compose(&[Source::Bag(ObjectBag::new())])
//!     .unwrap();
//!
//! let mark = Plugin::new("mark", |class, _config| {
//!     class.set_member("marked", Value::Bool(true));
//!     Ok(())
//! });
//! class.use_plugin(&mark, None).unwrap();
//! class.use_plugin(&mark, None).unwrap(); // no-op, already applied
//!
//! assert_eq!(class.member("marked"), Some(Value::Bool(true)));
//! ```
//!
//! ## Architecture
//!
//! - **[`composer::ds`]** - Data structures (values, member bags, methods,
//!   class descriptors, instances, call contexts)
//! - **[`composer::build`]** - The composition factory and the
//!   initializer chain
//! - **[`composer::naming`]** - Naming policy and name sanitization
//! - **[`composer::plugin`]** - Plugin application

#[macro_use]
extern crate lazy_static;

pub mod composer;
