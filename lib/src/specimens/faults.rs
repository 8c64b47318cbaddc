//! Throwing, catching, nested handlers, and `finally`
//!
//! The literal specimens (`catchTwo`, `nestedCatch`, `tryFinally`) always pass `0`, so only
//! one of their paths ever runs. The `...From` variants take the arguments as parameters and
//! share the same implementation, so that every handler arm can be reached.

use super::{body, void, Specimens};
use crate::jvm::class_graph::{ClassId, InvokeType, MethodId};
use crate::jvm::model::Method;
use crate::runtime::{Fault, ProtectedRegion, Value, Vm};

/// Members the handler bodies need
#[derive(Copy, Clone)]
struct Handlers<'g> {
    test_exc: ClassId<'g>,
    test_exc2: ClassId<'g>,
    cant_be_zero: MethodId<'g>,
    cant_be_zero2: MethodId<'g>,
    handle_exc: MethodId<'g>,
    handle_exc2: MethodId<'g>,
}

impl<'g> Handlers<'g> {
    /// Bind the fault to the handler's parameter and call it
    fn handle(
        &self,
        vm: &Vm<'g>,
        this: &Value<'g>,
        handler: MethodId<'g>,
        fault: Fault<'g>,
    ) -> Result<(), Fault<'g>> {
        let e = Value::from(vm.fault_value(&fault)?);
        void(vm.invoke(InvokeType::Virtual, handler, vec![this.clone(), e]))
    }

    fn cant_be_zero(&self, vm: &Vm<'g>, this: &Value<'g>, i: i32) -> Result<(), Fault<'g>> {
        void(vm.invoke(
            InvokeType::Virtual,
            self.cant_be_zero,
            vec![this.clone(), Value::Int(i)],
        ))
    }

    fn cant_be_zero2(&self, vm: &Vm<'g>, this: &Value<'g>, i: i32) -> Result<(), Fault<'g>> {
        void(vm.invoke(
            InvokeType::Virtual,
            self.cant_be_zero2,
            vec![this.clone(), Value::Int(i)],
        ))
    }

    /// `try { cantBeZero(first); cantBeZero2(second); }`
    /// `catch (TestExc e) { handleExc(e); } catch (TestExc2 e) { handleExc2(e); }`
    fn catch_two(
        &self,
        vm: &Vm<'g>,
        this: &Value<'g>,
        first: i32,
        second: i32,
    ) -> Result<(), Fault<'g>> {
        ProtectedRegion::new()
            .catch(self.test_exc, |e| self.handle(vm, this, self.handle_exc, e))
            .catch(self.test_exc2, |e| self.handle(vm, this, self.handle_exc2, e))
            .run(vm, || {
                self.cant_be_zero(vm, this, first)?;
                self.cant_be_zero2(vm, this, second)
            })
    }

    /// `try { try { cantBeZero(first); cantBeZero2(second); }`
    /// `catch (TestExc e) { handleExc(e); } } catch (TestExc2 e) { handleExc2(e); }`
    fn nested_catch(
        &self,
        vm: &Vm<'g>,
        this: &Value<'g>,
        first: i32,
        second: i32,
    ) -> Result<(), Fault<'g>> {
        ProtectedRegion::new()
            .catch(self.test_exc2, |e| self.handle(vm, this, self.handle_exc2, e))
            .run(vm, || {
                ProtectedRegion::new()
                    .catch(self.test_exc, |e| self.handle(vm, this, self.handle_exc, e))
                    .run(vm, || {
                        self.cant_be_zero(vm, this, first)?;
                        self.cant_be_zero2(vm, this, second)
                    })
            })
    }

    /// `try { cantBeZero(i); } finally { handleExc(null); }`
    fn try_finally(&self, vm: &Vm<'g>, this: &Value<'g>, i: i32) -> Result<(), Fault<'g>> {
        ProtectedRegion::new()
            .finally(|| {
                void(vm.invoke(
                    InvokeType::Virtual,
                    self.handle_exc,
                    vec![this.clone(), Value::NULL],
                ))
            })
            .run(vm, || self.cant_be_zero(vm, this, i))
    }
}

pub(super) fn methods<'g>(specimens: &Specimens<'g>) -> Vec<Method<'g>> {
    let spin = specimens.members.spin;
    let test_exc = specimens.classes.test_exc;
    let test_exc2 = specimens.classes.test_exc2;
    let test_exc_init = specimens.members.test_exc.init;
    let test_exc2_init = specimens.members.test_exc2.init;
    let handlers = Handlers {
        test_exc,
        test_exc2,
        cant_be_zero: spin.cant_be_zero,
        cant_be_zero2: spin.cant_be_zero2,
        handle_exc: spin.handle_exc,
        handle_exc2: spin.handle_exc2,
    };
    let mut methods = vec![];

    // void cantBeZero(int i) throws TestExc { if (i == 0) throw new TestExc(); }
    // void cantBeZero2(int i) throws TestExc2 { if (i == 0) throw new TestExc2(); }
    for (method, init, kind) in [
        (spin.cant_be_zero, test_exc_init, test_exc),
        (spin.cant_be_zero2, test_exc2_init, test_exc2),
    ] {
        methods.push(
            Method::with_body(
                method,
                body(move |vm, frame| {
                    if frame.iload(1)? == 0 {
                        let exception = vm.construct(init, vec![frame.aload(0)?])?;
                        return Err(vm.throw(Value::from(exception)));
                    }
                    Ok(None)
                }),
            )
            .throws([kind]),
        );
    }

    // void handleExc(TestExc e) {}
    // void handleExc2(TestExc2 e) {}
    for handler in [spin.handle_exc, spin.handle_exc2] {
        methods.push(Method::with_body(handler, body(|_vm, _frame| Ok(None))));
    }

    // void catchOne() { try { cantBeZero(0); } catch (TestExc e) { handleExc(e); } }
    methods.push(Method::with_body(
        spin.catch_one,
        body(move |vm, frame| {
            let this = frame.aload(0)?;
            ProtectedRegion::new()
                .catch(test_exc, |e| handlers.handle(vm, &this, handlers.handle_exc, e))
                .run(vm, || handlers.cant_be_zero(vm, &this, 0))?;
            Ok(None)
        }),
    ));

    // void catchTwo() { try { cantBeZero(0); cantBeZero2(0); } catch ... }
    methods.push(Method::with_body(
        spin.catch_two,
        body(move |vm, frame| {
            handlers.catch_two(vm, &frame.aload(0)?, 0, 0)?;
            Ok(None)
        }),
    ));
    methods.push(Method::with_body(
        spin.catch_two_from,
        body(move |vm, frame| {
            handlers.catch_two(vm, &frame.aload(0)?, frame.iload(1)?, frame.iload(2)?)?;
            Ok(None)
        }),
    ));

    // void nestedCatch() { try { try { cantBeZero(0); cantBeZero2(0); } catch ... } catch ... }
    methods.push(Method::with_body(
        spin.nested_catch,
        body(move |vm, frame| {
            handlers.nested_catch(vm, &frame.aload(0)?, 0, 0)?;
            Ok(None)
        }),
    ));
    methods.push(Method::with_body(
        spin.nested_catch_from,
        body(move |vm, frame| {
            handlers.nested_catch(vm, &frame.aload(0)?, frame.iload(1)?, frame.iload(2)?)?;
            Ok(None)
        }),
    ));

    // void tryFinally() throws TestExc { try { cantBeZero(0); } finally { handleExc(null); } }
    methods.push(
        Method::with_body(
            spin.try_finally,
            body(move |vm, frame| {
                handlers.try_finally(vm, &frame.aload(0)?, 0)?;
                Ok(None)
            }),
        )
        .throws([test_exc]),
    );
    methods.push(
        Method::with_body(
            spin.try_finally_from,
            body(move |vm, frame| {
                handlers.try_finally(vm, &frame.aload(0)?, frame.iload(1)?)?;
                Ok(None)
            }),
        )
        .throws([test_exc]),
    );

    methods
}

#[cfg(test)]
mod test {
    use crate::jvm::class_graph::{ClassGraph, ClassGraphArenas};
    use crate::runtime::{self, Fault, Value, Vm};
    use crate::specimens::{Settings, Specimens};

    #[test]
    fn throws_clauses() {
        let arenas = ClassGraphArenas::new();
        let class_graph = ClassGraph::new(&arenas);
        let java = class_graph.insert_java_library_types();
        let spin = Specimens::add_to_graph(&class_graph, &java, &Settings::default()).unwrap();
        let members = spin.members.spin;
        let vm = Vm::link(&java, spin.classes().unwrap(), runtime::Settings::default()).unwrap();

        assert_eq!(vm.exceptions(members.cant_be_zero), &[spin.classes.test_exc]);
        assert_eq!(vm.exceptions(members.cant_be_zero2), &[spin.classes.test_exc2]);
        assert_eq!(vm.exceptions(members.try_finally), &[spin.classes.test_exc]);
        assert!(vm.exceptions(members.catch_one).is_empty());
    }

    #[test]
    fn thrown_exceptions_keep_their_outer_instance() {
        let arenas = ClassGraphArenas::new();
        let class_graph = ClassGraph::new(&arenas);
        let java = class_graph.insert_java_library_types();
        let spin = Specimens::add_to_graph(&class_graph, &java, &Settings::default()).unwrap();
        let vm = Vm::link(&java, spin.classes().unwrap(), runtime::Settings::default()).unwrap();
        let this = Value::from(spin.new_receiver(&vm, spin.classes.spin).unwrap());

        let fault = vm
            .call(spin.members.spin.cant_be_zero, vec![this.clone(), Value::Int(0)])
            .unwrap_err();
        assert_eq!(vm.fault_kind(&fault), spin.classes.test_exc);
        let exception = match fault {
            Fault::Thrown(exception) => Value::from(exception),
            other => panic!("expected a thrown exception, got {:?}", other),
        };
        assert_eq!(
            vm.get_field(&exception, spin.members.test_exc.this_outer).unwrap(),
            this
        );

        assert_eq!(
            vm.call(spin.members.spin.cant_be_zero2, vec![this, Value::Int(7)])
                .unwrap(),
            None
        );
    }
}
