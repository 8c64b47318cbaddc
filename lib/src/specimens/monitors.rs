//! The shared counter and `synchronized` blocks

use super::{body, void, Specimens};
use crate::jvm::class_graph::InvokeType;
use crate::jvm::model::Method;
use crate::jvm::{Error, FieldType, LocalsLayout};
use crate::runtime::Value;

pub(super) fn methods<'g>(specimens: &Specimens<'g>) -> Result<Vec<Method<'g>>, Error> {
    let spin = specimens.members.spin;
    let test_exc = specimens.classes.test_exc;
    let mut methods = vec![];

    // private long index = 0;
    // public long nextIndex() { return index++; }
    methods.push(Method::with_body(
        spin.next_index,
        body(move |vm, frame| {
            let this = frame.aload(0)?;
            Ok(Some(vm.read_and_advance(&this, spin.index)?))
        }),
    ));

    // void onlyMe(TestExc f) { synchronized (f) { handleExc(f); } }
    //
    // The monitor is released through a copy of `f` kept in its own local, so reassigning `f`
    // inside the block would not change which monitor is exited.
    let mut locals = LocalsLayout::for_method(&spin.only_me)?;
    let lock = locals.declare(FieldType::object(test_exc))?;
    methods.push(
        Method::with_body(
            spin.only_me,
            body(move |vm, frame| {
                let f = frame.aload(1)?;
                frame.astore(lock, f.clone())?;
                let this = frame.aload(0)?;
                vm.synchronized(&frame.aload(lock)?, || {
                    void(vm.invoke(InvokeType::Virtual, spin.handle_exc, vec![this, f]))
                })?;
                Ok(None)
            }),
        )
        .with_locals(locals),
    );

    Ok(methods)
}

#[cfg(test)]
mod test {
    use crate::jvm::class_graph::{ClassGraph, ClassGraphArenas};
    use crate::runtime::{self, RuntimeFault, Value, Vm};
    use crate::specimens::{Settings, Specimens};

    #[test]
    fn counter_starts_at_zero() {
        let arenas = ClassGraphArenas::new();
        let class_graph = ClassGraph::new(&arenas);
        let java = class_graph.insert_java_library_types();
        let spin = Specimens::add_to_graph(&class_graph, &java, &Settings::default()).unwrap();
        let vm = Vm::link(&java, spin.classes().unwrap(), runtime::Settings::default()).unwrap();
        let this = Value::from(spin.new_receiver(&vm, spin.classes.spin).unwrap());

        for expected in 0..3 {
            assert_eq!(
                vm.call(spin.members.spin.next_index, vec![this.clone()]).unwrap(),
                Some(Value::Long(expected))
            );
        }
        assert_eq!(
            vm.get_field(&this, spin.members.spin.index).unwrap(),
            Value::Long(3)
        );
    }

    #[test]
    fn lock_on_null_faults() {
        let arenas = ClassGraphArenas::new();
        let class_graph = ClassGraph::new(&arenas);
        let java = class_graph.insert_java_library_types();
        let spin = Specimens::add_to_graph(&class_graph, &java, &Settings::default()).unwrap();
        let vm = Vm::link(&java, spin.classes().unwrap(), runtime::Settings::default()).unwrap();
        let this = Value::from(spin.new_receiver(&vm, spin.classes.spin).unwrap());

        let fault = vm
            .call(spin.members.spin.only_me, vec![this, Value::NULL])
            .unwrap_err();
        assert_eq!(fault.as_runtime(), Some(&RuntimeFault::NullPointer));
        assert_eq!(vm.max_locals(spin.members.spin.only_me), Some(3));
    }
}
