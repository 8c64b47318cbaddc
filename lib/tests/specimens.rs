use spin::jvm::class_graph::{ClassGraph, ClassGraphArenas, MethodId};
use spin::jvm::FieldType;
use spin::runtime::{self, Fault, RuntimeFault, Value, Vm};
use spin::specimens::{Settings, Specimens};
use std::thread;

/// Declare and link the catalogue, then hand it to the test
fn with_vm(record_invocations: bool, test: impl for<'g> FnOnce(&Specimens<'g>, &Vm<'g>)) {
    let arenas = ClassGraphArenas::new();
    let class_graph = ClassGraph::new(&arenas);
    let java = class_graph.insert_java_library_types();
    let spin = Specimens::add_to_graph(&class_graph, &java, &Settings::default()).unwrap();
    let vm = Vm::link(
        &java,
        spin.classes().unwrap(),
        runtime::Settings { record_invocations },
    )
    .unwrap();
    test(&spin, &vm)
}

fn receiver<'g>(spin: &Specimens<'g>, vm: &Vm<'g>) -> Value<'g> {
    Value::from(spin.new_receiver(vm, spin.classes.spin).unwrap())
}

fn int<'g>(vm: &Vm<'g>, method: MethodId<'g>, arguments: Vec<Value<'g>>) -> i32 {
    match vm.call(method, arguments).unwrap() {
        Some(Value::Int(result)) => result,
        other => panic!("{:?} returned {:?}", method, other),
    }
}

#[test]
fn set_then_get() {
    with_vm(false, |spin, vm| {
        let members = &spin.members.spin;
        let this = receiver(spin, vm);
        assert_eq!(int(vm, members.get_it, vec![this.clone()]), 0);
        vm.call(members.set_it, vec![this.clone(), Value::Int(42)])
            .unwrap();
        assert_eq!(int(vm, members.get_it, vec![this]), 42);
    })
}

#[test]
fn counter_reads_then_advances() {
    with_vm(false, |spin, vm| {
        let members = &spin.members.spin;
        let this = receiver(spin, vm);
        let returned: Vec<_> = (0..3)
            .map(|_| vm.call(members.next_index, vec![this.clone()]).unwrap())
            .collect();
        assert_eq!(
            returned,
            vec![
                Some(Value::Long(0)),
                Some(Value::Long(1)),
                Some(Value::Long(2))
            ]
        );
        assert_eq!(vm.get_field(&this, members.index).unwrap(), Value::Long(3));
    })
}

#[test]
fn int_buffer() {
    with_vm(false, |spin, vm| {
        vm.call(spin.members.spin.create_buffer, vec![receiver(spin, vm)])
            .unwrap();

        let buffer = Value::from(vm.new_array(FieldType::int(), 100).unwrap());
        vm.array_store(&buffer, 10, Value::Int(12)).unwrap();
        assert_eq!(vm.array_load(&buffer, 10).unwrap(), Value::Int(12));
        assert_eq!(vm.array_load(&buffer, 11).unwrap(), Value::Int(0));
        assert_eq!(vm.array_length(&buffer).unwrap(), 100);
        for index in [-1, 100] {
            assert_eq!(
                vm.array_load(&buffer, index),
                Err(RuntimeFault::ArrayIndexOutOfBounds { index, length: 100 })
            );
        }
    })
}

#[test]
fn catch_two_only_runs_the_first_arm() {
    with_vm(true, |spin, vm| {
        let members = &spin.members.spin;
        vm.call(members.catch_two, vec![receiver(spin, vm)]).unwrap();
        let journal = vm.journal();
        assert!(journal.contains(&members.handle_exc));
        assert!(!journal.contains(&members.cant_be_zero2));
        assert!(!journal.contains(&members.handle_exc2));

        // With the first call not throwing, the second arm is reachable
        vm.clear_journal();
        let this = receiver(spin, vm);
        vm.call(
            members.catch_two_from,
            vec![this, Value::Int(1), Value::Int(0)],
        )
        .unwrap();
        let journal = vm.journal();
        assert!(!journal.contains(&members.handle_exc));
        assert!(journal.contains(&members.handle_exc2));
    })
}

#[test]
fn catch_one_handles_its_fault() {
    with_vm(true, |spin, vm| {
        let members = &spin.members.spin;
        assert_eq!(vm.call(members.catch_one, vec![receiver(spin, vm)]), Ok(None));
        assert!(vm.journal().contains(&members.handle_exc));
    })
}

#[test]
fn nested_catch_arms() {
    with_vm(true, |spin, vm| {
        let members = &spin.members.spin;
        let run = |first: i32, second: i32| {
            vm.clear_journal();
            let this = receiver(spin, vm);
            vm.call(
                members.nested_catch_from,
                vec![this, Value::Int(first), Value::Int(second)],
            )
            .unwrap();
            let journal = vm.journal();
            (
                journal.contains(&members.handle_exc),
                journal.contains(&members.handle_exc2),
            )
        };

        // Outer arm only
        assert_eq!(run(1, 0), (false, true));

        // Inner arm only
        assert_eq!(run(0, 0), (true, false));
        assert_eq!(run(0, 1), (true, false));

        // Neither
        assert_eq!(run(1, 1), (false, false));

        vm.clear_journal();
        vm.call(members.nested_catch, vec![receiver(spin, vm)])
            .unwrap();
        assert!(vm.journal().contains(&members.handle_exc));
        assert!(!vm.journal().contains(&members.handle_exc2));
    })
}

#[test]
fn try_finally_propagates_after_cleanup() {
    with_vm(true, |spin, vm| {
        let members = &spin.members.spin;
        let fault = vm
            .call(members.try_finally, vec![receiver(spin, vm)])
            .unwrap_err();
        assert_eq!(vm.fault_kind(&fault), spin.classes.test_exc);
        assert!(matches!(fault, Fault::Thrown(_)));

        let journal = vm.journal();
        let thrown_at = journal
            .iter()
            .position(|method| *method == members.cant_be_zero)
            .unwrap();
        let cleanup_at = journal
            .iter()
            .position(|method| *method == members.handle_exc)
            .unwrap();
        assert!(thrown_at < cleanup_at);
        assert_eq!(
            journal.iter().filter(|method| **method == members.handle_exc).count(),
            1
        );

        // Cleanup also runs when nothing throws
        vm.clear_journal();
        let this = receiver(spin, vm);
        assert_eq!(
            vm.call(members.try_finally_from, vec![this, Value::Int(5)]),
            Ok(None)
        );
        assert!(vm.journal().contains(&members.handle_exc));
    })
}

#[test]
fn null_receivers() {
    with_vm(false, |spin, vm| {
        let members = &spin.members.spin;
        for (method, arguments) in [
            (members.add_two, vec![Value::NULL, Value::Int(1), Value::Int(2)]),
            (members.get_it, vec![Value::NULL]),
            (members.next_index, vec![Value::NULL]),
        ] {
            let fault = vm.call(method, arguments).unwrap_err();
            assert_eq!(fault.as_runtime(), Some(&RuntimeFault::NullPointer));
            assert_eq!(
                vm.fault_kind(&fault),
                vm.java().classes.lang.null_pointer_exception
            );
        }
    })
}

#[test]
fn static_and_instance_dispatch_agree() {
    with_vm(false, |spin, vm| {
        let members = &spin.members.spin;
        let this = receiver(spin, vm);
        let instance = int(
            vm,
            members.add_two,
            vec![this.clone(), Value::Int(12), Value::Int(13)],
        );
        let stat = int(
            vm,
            members.add_two_static,
            vec![Value::Int(12), Value::Int(13)],
        );
        assert_eq!(instance, 25);
        assert_eq!(instance, stat);
        assert_eq!(int(vm, members.add12and13, vec![this.clone()]), 25);
        assert_eq!(int(vm, members.add12and13_static, vec![this.clone()]), 25);
        assert_eq!(
            int(
                vm,
                members.add_two,
                vec![this, Value::Int(i32::MAX), Value::Int(1)]
            ),
            i32::MIN
        );
    })
}

#[test]
fn nested_class_resolution() {
    with_vm(true, |spin, vm| {
        let far = Value::from(spin.new_receiver(vm, spin.classes.far).unwrap());
        vm.clear_journal();
        assert_eq!(int(vm, spin.members.far.get_it_far, vec![far.clone()]), 0);
        let journal = vm.journal();
        assert!(journal.contains(&spin.members.near.get_it_near));
        assert!(journal.contains(&spin.members.near.get_it));

        // The inherited method is reachable through the subclass receiver too
        assert_eq!(int(vm, spin.members.near.get_it_near, vec![far]), 0);
    })
}

#[test]
fn example_and_silly() {
    with_vm(false, |spin, vm| {
        let members = &spin.members.spin;
        let this = receiver(spin, vm);
        let example = vm.call(members.example, vec![this.clone()]).unwrap();
        let example = example.unwrap();
        assert!(!example.is_null());
        assert_eq!(vm.describe(&example), vm.describe(&this));

        assert_eq!(
            vm.call(members.silly, vec![this.clone(), Value::NULL]),
            Ok(Some(Value::NULL))
        );
        assert_eq!(
            vm.call(members.silly, vec![this.clone(), this.clone()]),
            Ok(Some(this))
        );
    })
}

#[test]
fn switches() {
    with_vm(false, |spin, vm| {
        let members = &spin.members.spin;
        let this = receiver(spin, vm);
        let near = |key: i32| int(vm, members.choose_near, vec![this.clone(), Value::Int(key)]);
        assert_eq!(
            [-1, 0, 1, 2, 3].map(near),
            [-1, 0, 1, 2, -1]
        );
        let far = |key: i32| int(vm, members.choose_far, vec![this.clone(), Value::Int(key)]);
        assert_eq!(
            [-100, 0, 100, 1, -99, i32::MIN].map(far),
            [-1, 0, 1, -1, -1, -1]
        );

        let near_switch = spin.switch(members.choose_near).unwrap().unwrap();
        assert!(near_switch.is_table());
        assert!(near_switch.to_string().starts_with("tableswitch low = 0, high = 2"));
        let far_switch = spin.switch(members.choose_far).unwrap().unwrap();
        assert!(far_switch.to_string().starts_with("lookupswitch npairs 3"));
        assert!(spin.switch(members.spin).unwrap().is_none());
    })
}

#[test]
fn numerics_through_the_vm() {
    with_vm(false, |spin, vm| {
        let members = &spin.members.spin;
        let this = receiver(spin, vm);
        for method in [
            members.spin,
            members.spin_double,
            members.spin_short,
            members.use_many_numeric,
        ] {
            assert_eq!(vm.call(method, vec![this.clone()]), Ok(None));
        }
        assert_eq!(
            vm.call(
                members.double_locals,
                vec![this.clone(), Value::Double(1.5), Value::Double(2.25)]
            ),
            Ok(Some(Value::Double(3.75)))
        );
        assert_eq!(
            int(
                vm,
                members.align2grain,
                vec![this.clone(), Value::Int(13), Value::Int(8)]
            ),
            16
        );
        assert_eq!(
            int(
                vm,
                members.less_than100,
                vec![this.clone(), Value::Double(f64::NAN)]
            ),
            -1
        );
        assert_eq!(
            int(
                vm,
                members.greater_than100,
                vec![this, Value::Double(100.5)]
            ),
            1
        );
    })
}

#[test]
fn local_layout() {
    with_vm(false, |spin, vm| {
        let members = &spin.members.spin;
        assert_eq!(vm.max_locals(members.use_many_numeric), Some(9));
        assert_eq!(vm.max_locals(members.double_locals), Some(5));
        assert_eq!(vm.max_locals(members.add_two_static), Some(2));
        assert_eq!(vm.max_locals(members.add_two), Some(3));
        assert_eq!(vm.max_locals(members.spin), Some(2));
        assert_eq!(vm.max_locals(members.create_buffer), Some(4));
    })
}

#[test]
fn concurrent_counter_is_unique() {
    with_vm(false, |spin, vm| {
        let members = &spin.members.spin;
        let this = receiver(spin, vm);
        let mut seen: Vec<i64> = thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let this = this.clone();
                    scope.spawn(move || {
                        (0..500)
                            .map(|_| match vm.call(members.next_index, vec![this.clone()]) {
                                Ok(Some(Value::Long(index))) => index,
                                other => panic!("nextIndex returned {:?}", other),
                            })
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|handle| handle.join().unwrap())
                .collect()
        });
        seen.sort_unstable();
        assert_eq!(seen, (0..2000).collect::<Vec<i64>>());
        assert_eq!(
            vm.get_field(&this, members.index).unwrap(),
            Value::Long(2000)
        );
    })
}

#[test]
fn only_me_releases_the_monitor() {
    with_vm(false, |spin, vm| {
        let members = &spin.members.spin;
        let this = receiver(spin, vm);
        let lock = spin.new_receiver(vm, spin.classes.test_exc).unwrap();
        let lock_value = Value::from(lock.clone());

        thread::scope(|scope| {
            for _ in 0..4 {
                let this = this.clone();
                let lock_value = lock_value.clone();
                scope.spawn(move || {
                    for _ in 0..100 {
                        vm.call(members.only_me, vec![this.clone(), lock_value.clone()])
                            .unwrap();
                    }
                });
            }
        });
        assert_eq!(lock.monitor().depth(), 0);

        // Re-entering a monitor this thread already holds
        vm.synchronized(&lock_value, || {
            assert_eq!(lock.monitor().depth(), 1);
            vm.call(members.only_me, vec![this.clone(), lock_value.clone()])?;
            assert_eq!(lock.monitor().depth(), 1);
            Ok(())
        })
        .unwrap();
        assert_eq!(lock.monitor().depth(), 0);
    })
}
