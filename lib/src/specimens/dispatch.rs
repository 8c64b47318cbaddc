//! Static and instance invocation, `super` calls, private methods, and instance fields

use super::{body, Specimens};
use crate::jvm::class_graph::InvokeType;
use crate::jvm::model::Method;
use crate::runtime::Value;

pub(super) fn methods<'g>(specimens: &Specimens<'g>) -> Vec<Method<'g>> {
    let object_init = specimens.java.members.lang.object.init;
    let throwable_init = specimens.java.members.lang.throwable.init;
    let spin = specimens.members.spin;
    let near = specimens.members.near;
    let far = specimens.members.far;
    let mut methods = vec![];

    // Spin() { super(); }
    methods.push(Method::with_body(
        spin.init,
        body(move |vm, frame| vm.invoke(InvokeType::Special, object_init, vec![frame.aload(0)?])),
    ));

    // Near(Spin this$0) { this.this$0 = this$0; super(); }
    methods.push(Method::with_body(
        near.init,
        body(move |vm, frame| {
            let this = frame.aload(0)?;
            vm.put_field(&this, near.this_outer, frame.aload(1)?)?;
            vm.invoke(InvokeType::Special, object_init, vec![this])
        }),
    ));

    // Far(Spin this$0) { this.this$0 = this$0; super(this$0); }
    methods.push(Method::with_body(
        far.init,
        body(move |vm, frame| {
            let this = frame.aload(0)?;
            let outer = frame.aload(1)?;
            vm.put_field(&this, far.this_outer, outer.clone())?;
            vm.invoke(InvokeType::Special, near.init, vec![this, outer])
        }),
    ));

    // TestExc(Spin this$0) { this.this$0 = this$0; super(); }
    for exception in [specimens.members.test_exc, specimens.members.test_exc2] {
        methods.push(Method::with_body(
            exception.init,
            body(move |vm, frame| {
                let this = frame.aload(0)?;
                vm.put_field(&this, exception.this_outer, frame.aload(1)?)?;
                vm.invoke(InvokeType::Special, throwable_init, vec![this])
            }),
        ));
    }

    // int addTwo(int i, int j) { return i + j; }
    methods.push(Method::with_body(
        spin.add_two,
        body(|_vm, frame| {
            let sum = frame.iload(1)?.wrapping_add(frame.iload(2)?);
            Ok(Some(Value::Int(sum)))
        }),
    ));

    // static int addTwoStatic(int i, int j) { return i + j; }
    methods.push(Method::with_body(
        spin.add_two_static,
        body(|_vm, frame| {
            let sum = frame.iload(0)?.wrapping_add(frame.iload(1)?);
            Ok(Some(Value::Int(sum)))
        }),
    ));

    // int add12and13() { return addTwo(12, 13); }
    methods.push(Method::with_body(
        spin.add12and13,
        body(move |vm, frame| {
            let arguments = vec![frame.aload(0)?, Value::Int(12), Value::Int(13)];
            vm.invoke(InvokeType::Virtual, spin.add_two, arguments)
        }),
    ));

    // int add12and13Static() { return addTwoStatic(12, 13); }
    methods.push(Method::with_body(
        spin.add12and13_static,
        body(move |vm, _frame| {
            let arguments = vec![Value::Int(12), Value::Int(13)];
            vm.invoke(InvokeType::Static, spin.add_two_static, arguments)
        }),
    ));

    // int getItNear() { return getIt(); }
    //
    // The private `getIt` is bound to `Near` even when `this` is a `Far`
    methods.push(Method::with_body(
        near.get_it_near,
        body(move |vm, frame| vm.invoke(InvokeType::Virtual, near.get_it, vec![frame.aload(0)?])),
    ));

    // private int getIt() { return it; }
    methods.push(Method::with_body(
        near.get_it,
        body(move |vm, frame| Ok(Some(vm.get_field(&frame.aload(0)?, near.it)?))),
    ));

    // int getItFar() { return super.getItNear(); }
    methods.push(Method::with_body(
        far.get_it_far,
        body(move |vm, frame| {
            vm.invoke(InvokeType::Special, near.get_it_near, vec![frame.aload(0)?])
        }),
    ));

    // Spin example() { Spin o = new Spin(); return silly(o); }
    methods.push(Method::with_body(
        spin.example,
        body(move |vm, frame| {
            let o = Value::from(vm.construct(spin.init, vec![])?);
            vm.invoke(InvokeType::Virtual, spin.silly, vec![frame.aload(0)?, o])
        }),
    ));

    // Spin silly(Spin o) { if (o != null) return o; else return o; }
    methods.push(Method::with_body(
        spin.silly,
        body(|_vm, frame| {
            let o = frame.aload(1)?;
            #[allow(clippy::if_same_then_else)]
            let result = if !o.is_null() { o } else { o };
            Ok(Some(result))
        }),
    ));

    // void setIt(int value) { i = value; }
    methods.push(Method::with_body(
        spin.set_it,
        body(move |vm, frame| {
            let value = Value::Int(frame.iload(1)?);
            vm.put_field(&frame.aload(0)?, spin.i, value)?;
            Ok(None)
        }),
    ));

    // int getIt() { return i; }
    methods.push(Method::with_body(
        spin.get_it,
        body(move |vm, frame| Ok(Some(vm.get_field(&frame.aload(0)?, spin.i)?))),
    ));

    log::trace!("Bound {} dispatch specimens", methods.len());
    methods
}
