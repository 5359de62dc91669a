//! Tests for extension chains: inherited members, the initializer chain,
//! super-method delegation and foreign-constructor wrapping.

extern crate protoclass;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use protoclass::composer::build::{Composer, NativeClass, Source};
use protoclass::composer::ds::descriptor::ClassDef;
use protoclass::composer::ds::error::ClassError;
use protoclass::composer::ds::method::Method;
use protoclass::composer::ds::object::ObjectBag;
use protoclass::composer::ds::value::Value;

/// Helper to build a string value.
fn s(text: &str) -> Value {
    Value::Str(text.to_string())
}

/// Helper to extract a string payload or fail the test.
fn as_str(value: &Value) -> String {
    match value {
        Value::Str(t) => t.clone(),
        other => panic!("expected a string, got {:?}", other),
    }
}

/// Helper building an initializer that counts its runs and records the
/// arguments it was last called with.
fn recording_ctor(
    arity: usize,
    count: &Rc<Cell<u32>>,
    args_seen: &Rc<RefCell<Vec<Value>>>,
) -> Method {
    let count = count.clone();
    let args_seen = args_seen.clone();
    Method::new(arity, move |_ctx, args| {
        count.set(count.get() + 1);
        *args_seen.borrow_mut() = args.to_vec();
        Ok(Value::Undefined)
    })
}

/// Helper composing a root class out of a single bag.
fn class_of(bag: ObjectBag) -> ClassDef {
    Composer::new().compose(&[Source::Bag(bag)]).unwrap()
}

#[test]
fn inherited_members_are_referentially_identical() {
    let base_proto = ObjectBag::new();
    base_proto.set(
        "foo",
        Value::Method(Method::new(0, |_ctx, _args| Ok(Value::Undefined))),
    );
    let base = class_of(base_proto);
    let sub = base.extend(&[Source::Bag(ObjectBag::new())]).unwrap();
    let instance = sub.construct(&[]).unwrap();

    assert_eq!(instance.get("foo"), base.member("foo").unwrap());
}

#[test]
fn every_ancestor_initializer_runs_exactly_once_with_the_original_args() {
    let counts = [
        Rc::new(Cell::new(0)),
        Rc::new(Cell::new(0)),
        Rc::new(Cell::new(0)),
    ];
    let args = [
        Rc::new(RefCell::new(Vec::new())),
        Rc::new(RefCell::new(Vec::new())),
        Rc::new(RefCell::new(Vec::new())),
    ];

    let root_proto = ObjectBag::new();
    root_proto.set(
        "constructor",
        Value::Method(recording_ctor(0, &counts[0], &args[0])),
    );
    let root = class_of(root_proto);

    let mid_proto = ObjectBag::new();
    mid_proto.set(
        "constructor",
        Value::Method(recording_ctor(1, &counts[1], &args[1])),
    );
    let mid = root.extend(&[Source::Bag(mid_proto)]).unwrap();

    let leaf_proto = ObjectBag::new();
    leaf_proto.set(
        "constructor",
        Value::Method(recording_ctor(2, &counts[2], &args[2])),
    );
    let leaf = mid.extend(&[Source::Bag(leaf_proto)]).unwrap();

    leaf.construct(&[s("foo"), s("bar")]).unwrap();

    for count in &counts {
        assert_eq!(count.get(), 1);
    }
    for seen in &args {
        assert_eq!(*seen.borrow(), vec![s("foo"), s("bar")]);
    }
}

#[test]
fn the_ancestor_initializer_runs_when_the_subclass_has_none() {
    let count = Rc::new(Cell::new(0));
    let args = Rc::new(RefCell::new(Vec::new()));

    let base_proto = ObjectBag::new();
    base_proto.set("constructor", Value::Method(recording_ctor(0, &count, &args)));
    let base = class_of(base_proto);
    let sub = base.extend(&[Source::Bag(ObjectBag::new())]).unwrap();

    sub.construct(&[s("foo"), s("bar")]).unwrap();

    assert_eq!(count.get(), 1);
    assert_eq!(*args.borrow(), vec![s("foo"), s("bar")]);
}

#[test]
fn an_explicit_super_call_is_not_doubled() {
    let count = Rc::new(Cell::new(0));
    let args = Rc::new(RefCell::new(Vec::new()));

    let base_proto = ObjectBag::new();
    base_proto.set("constructor", Value::Method(recording_ctor(0, &count, &args)));
    let base = class_of(base_proto);

    let sub_proto = ObjectBag::new();
    sub_proto.set(
        "constructor",
        Value::Method(Method::new(0, |ctx, _args| {
            ctx.call_super(&[s("explicit")])?;
            Ok(Value::Undefined)
        })),
    );
    let sub = base.extend(&[Source::Bag(sub_proto)]).unwrap();

    sub.construct(&[s("original")]).unwrap();

    assert_eq!(count.get(), 1);
    // The ancestor saw the explicitly forwarded arguments, not the
    // construction arguments.
    assert_eq!(*args.borrow(), vec![s("explicit")]);
}

#[test]
fn an_initializer_can_transform_the_arguments_it_forwards() {
    let base_proto = ObjectBag::new();
    base_proto.set(
        "constructor",
        Value::Method(Method::new(1, |ctx, args| {
            ctx.set("foo", args.first().cloned().unwrap_or(Value::Undefined));
            Ok(Value::Undefined)
        })),
    );
    let base = class_of(base_proto);

    let sub_proto = ObjectBag::new();
    sub_proto.set(
        "constructor",
        Value::Method(Method::new(2, |ctx, args| {
            ctx.set("bar", args.get(1).cloned().unwrap_or(Value::Undefined));
            let upper = as_str(&args[0]).to_uppercase();
            ctx.call_super(&[Value::Str(upper)])?;
            Ok(Value::Undefined)
        })),
    );
    let sub = base.extend(&[Source::Bag(sub_proto)]).unwrap();

    let instance = sub.construct(&[s("foo"), s("bar")]).unwrap();
    assert_eq!(instance.get("foo"), s("FOO"));
    assert_eq!(instance.get("bar"), s("bar"));
}

#[test]
fn overriding_methods_reach_the_shadowed_method_through_super() {
    let base_proto = ObjectBag::new();
    base_proto.set(
        "moo",
        Value::Method(Method::new(1, |_ctx, args| {
            Ok(Value::Str(format!("{}Moo", as_str(&args[0]))))
        })),
    );
    let base = class_of(base_proto);

    let sub_proto = ObjectBag::new();
    sub_proto.set(
        "moo",
        Value::Method(Method::new(1, |ctx, args| {
            let from_super = ctx.call_super(args)?;
            Ok(Value::Str(format!("{}Moo", as_str(&from_super))))
        })),
    );
    let sub = base.extend(&[Source::Bag(sub_proto)]).unwrap();

    let instance = sub.construct(&[]).unwrap();
    assert_eq!(
        instance.call("moo", &[s("The cow says: ")]).unwrap(),
        s("The cow says: MooMoo")
    );
}

#[test]
fn methods_lifted_from_a_mixin_class_keep_their_own_ancestry() {
    let super_of_mixin_called = Rc::new(Cell::new(false));
    let super_called = Rc::new(Cell::new(false));

    let flag = super_of_mixin_called.clone();
    let super_mixin_proto = ObjectBag::new();
    super_mixin_proto.set(
        "foo",
        Value::Method(Method::new(0, move |_ctx, _args| {
            flag.set(true);
            Ok(Value::Undefined)
        })),
    );
    let super_mixin = class_of(super_mixin_proto);

    let mixin_proto = ObjectBag::new();
    mixin_proto.set(
        "foo",
        Value::Method(Method::new(0, |ctx, _args| ctx.call_super(&[]))),
    );
    let mixin = super_mixin.extend(&[Source::Bag(mixin_proto)]).unwrap();

    let flag = super_called.clone();
    let super_class_proto = ObjectBag::new();
    super_class_proto.set(
        "foo",
        Value::Method(Method::new(0, move |_ctx, _args| {
            flag.set(true);
            Ok(Value::Undefined)
        })),
    );
    let super_class = class_of(super_class_proto);

    let class = super_class.extend(&[Source::Class(mixin)]).unwrap();
    let instance = class.construct(&[]).unwrap();
    instance.call("foo", &[]).unwrap();

    assert!(super_of_mixin_called.get());
    assert!(!super_called.get());
}

#[test]
fn replacing_an_ancestor_method_is_observed_through_super() {
    let bad_called = Rc::new(Cell::new(false));
    let good_called = Rc::new(Cell::new(false));

    let flag = bad_called.clone();
    let base_proto = ObjectBag::new();
    base_proto.set(
        "test",
        Value::Method(Method::new(0, move |_ctx, _args| {
            flag.set(true);
            Ok(Value::Undefined)
        })),
    );
    let base = class_of(base_proto);

    let sub_proto = ObjectBag::new();
    sub_proto.set(
        "test",
        Value::Method(Method::new(0, |ctx, _args| ctx.call_super(&[]))),
    );
    let sub = base.extend(&[Source::Bag(sub_proto)]).unwrap();
    let instance = sub.construct(&[]).unwrap();

    let flag = good_called.clone();
    base.set_member(
        "test",
        Value::Method(Method::new(0, move |_ctx, _args| {
            flag.set(true);
            Ok(Value::Undefined)
        })),
    );
    instance.call("test", &[]).unwrap();

    assert!(!bad_called.get());
    assert!(good_called.get());
}

#[test]
fn calling_super_at_the_root_of_the_chain_is_a_quiet_noop() {
    let base = class_of(ObjectBag::new());

    let sub_proto = ObjectBag::new();
    sub_proto.set(
        "constructor",
        Value::Method(Method::new(0, |ctx, _args| {
            // The ancestor chain above has no initializer; this must not fail.
            ctx.call_super(&[])?;
            Ok(Value::Undefined)
        })),
    );
    let sub = base.extend(&[Source::Bag(sub_proto)]).unwrap();
    sub.construct(&[]).unwrap();
}

#[test]
fn calling_super_in_a_method_without_a_shadowed_member_fails() {
    let proto = ObjectBag::new();
    proto.set(
        "lonely",
        Value::Method(Method::new(0, |ctx, _args| ctx.call_super(&[]))),
    );
    let class = class_of(proto);
    let instance = class.construct(&[]).unwrap();

    match instance.call("lonely", &[]) {
        Err(ClassError::NoSuperMethod(name)) => assert_eq!(name, "lonely"),
        other => panic!("expected NoSuperMethod, got {:?}", other),
    }
}

#[test]
fn wrapped_foreign_constructors_can_be_extended() {
    let foreign_bag = ObjectBag::new();
    foreign_bag.set(
        "get_foo",
        Value::Method(Method::new(0, |ctx, _args| Ok(ctx.get("foo")))),
    );
    let foreign = NativeClass::with_bag(
        Method::new(0, |ctx, _args| {
            ctx.set("foo", s("foo"));
            Ok(Value::Undefined)
        }),
        foreign_bag,
    );

    let wrapped = Composer::new().wrap(&foreign);
    let sub_proto = ObjectBag::new();
    sub_proto.set("bar", s("bar"));
    sub_proto.set(
        "get_bar",
        Value::Method(Method::new(0, |ctx, _args| Ok(ctx.get("bar")))),
    );
    let class = wrapped.extend(&[Source::Bag(sub_proto)]).unwrap();

    let instance = class.construct(&[]).unwrap();
    assert_eq!(instance.get("foo"), s("foo"));
    assert_eq!(instance.get("bar"), s("bar"));
    assert_eq!(instance.call("get_foo", &[]).unwrap(), s("foo"));
    assert_eq!(instance.call("get_bar", &[]).unwrap(), s("bar"));
}

#[test]
fn instances_are_recognized_across_the_whole_chain() {
    let foreign = NativeClass::new(Method::new(0, |_ctx, _args| Ok(Value::Undefined)));
    let wrapped = Composer::new().wrap(&foreign);
    let mid = wrapped.extend(&[Source::Bag(ObjectBag::new())]).unwrap();
    let leaf = mid.extend(&[Source::Bag(ObjectBag::new())]).unwrap();

    let instance = leaf.construct(&[]).unwrap();
    assert!(instance.is_a(&leaf));
    assert!(instance.is_a(&mid));
    assert!(instance.is_a(&wrapped));

    let unrelated = Composer::new().compose(&[Source::Bag(ObjectBag::new())]).unwrap();
    assert!(!instance.is_a(&unrelated));
}

#[test]
fn instances_report_their_class() {
    let class = class_of(ObjectBag::new());
    let instance = class.construct(&[]).unwrap();
    assert!(ClassDef::same_class(&instance.class(), &class));
}
