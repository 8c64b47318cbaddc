//! The specimen catalogue
//!
//! Every method of the `Spin` class (and its nested classes) is declared in the class graph with
//! the descriptor, flags, and `throws` clause `javac` would give it, and implemented as a method
//! body for the [`runtime`](crate::runtime). The bodies do what the compiled bytecode does:
//! they go through the same locals, the same invocation instructions, and the same exception
//! tables, just written out as Rust.
//!
//! Loops and arithmetic that don't touch the heap are also exposed as plain functions, so their
//! boundary behaviour can be checked over many inputs.

mod arrays;
mod classes;
mod dispatch;
mod faults;
mod monitors;
mod numeric;
mod settings;
mod switches;

pub use classes::*;
pub use numeric::{
    align2grain, greater_than100, less_than100, next_short, short_inductions, spin_double,
    spin_int, spin_short, use_many_numeric, Induction, ManyNumeric,
};
pub use settings::Settings;
pub use switches::{choose_far_switch, choose_near_switch};

use crate::jvm::class_graph::{ClassGraph, ClassId, JavaLibrary, MethodId};
use crate::jvm::model::{Class, Method};
use crate::jvm::{Error, Name};
use crate::runtime::{Completion, Fault, Frame, MethodBody, ObjectRef, RuntimeFault, Value, Vm};
use std::fmt;
use std::sync::Arc;

/// Declared specimens
#[derive(Copy, Clone)]
pub struct Specimens<'g> {
    pub java: JavaLibrary<'g>,
    pub classes: SpinClasses<'g>,
    pub members: SpinMembers<'g>,
}

/// Behaviour a specimen exercises
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Feature {
    Loops,
    Numerics,
    Dispatch,
    Arrays,
    Switches,
    Counter,
    Faults,
    Monitors,
}

impl Feature {
    pub fn name(&self) -> &'static str {
        match self {
            Feature::Loops => "loops",
            Feature::Numerics => "locals & numerics",
            Feature::Dispatch => "dispatch",
            Feature::Arrays => "arrays",
            Feature::Switches => "switches",
            Feature::Counter => "counter",
            Feature::Faults => "faults",
            Feature::Monitors => "monitors",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl<'g> Specimens<'g> {
    /// Declare the specimen classes and their members
    pub fn add_to_graph(
        class_graph: &ClassGraph<'g>,
        java: &JavaLibrary<'g>,
        settings: &Settings,
    ) -> Result<Specimens<'g>, Error> {
        if class_graph.lookup_class(&settings.host_class_name).is_some() {
            return Err(Error::InvalidName(format!(
                "Class '{}' is already declared",
                settings.host_class_name.as_str()
            )));
        }
        let classes = SpinClasses::add_to_graph(class_graph, java, settings);
        let members = SpinMembers::add_to_graph(class_graph, &classes);
        log::debug!(
            "Declared {} specimen classes under {}",
            classes.all().len(),
            settings.host_class_name.as_str()
        );
        Ok(Specimens {
            java: *java,
            classes,
            members,
        })
    }

    /// Model classes with every method implemented, ready for linking
    pub fn classes(&self) -> Result<Vec<Class<'g>>, Error> {
        let mut methods: Vec<Method<'g>> = vec![];
        methods.extend(dispatch::methods(self));
        methods.extend(numeric::methods(self)?);
        methods.extend(arrays::methods(self)?);
        methods.extend(switches::methods(self)?);
        methods.extend(faults::methods(self));
        methods.extend(monitors::methods(self)?);

        let mut classes: Vec<Class<'g>> = self.classes.all().into_iter().map(Class::new).collect();
        for method in methods {
            let class = classes
                .iter_mut()
                .find(|class| class.id == method.id.class)
                .ok_or_else(|| Error::MissingClass(format!("{:?}", method.id.class)))?;
            class.add_method(method)?;
        }
        Ok(classes)
    }

    /// Every specimen, grouped by the feature it exercises
    pub fn catalogue(&self) -> Vec<(Feature, MethodId<'g>)> {
        let spin = &self.members.spin;
        let mut catalogue = vec![];
        let mut group = |feature: Feature, methods: &[MethodId<'g>]| {
            catalogue.extend(methods.iter().map(|method| (feature, *method)));
        };

        group(Feature::Loops, &[spin.spin, spin.spin_double, spin.spin_short]);
        group(
            Feature::Numerics,
            &[
                spin.double_locals,
                spin.use_many_numeric,
                spin.align2grain,
                spin.less_than100,
                spin.greater_than100,
            ],
        );
        group(
            Feature::Dispatch,
            &[
                spin.add_two,
                spin.add_two_static,
                spin.add12and13,
                spin.add12and13_static,
                self.members.near.get_it_near,
                self.members.near.get_it,
                self.members.far.get_it_far,
                spin.example,
                spin.silly,
                spin.set_it,
                spin.get_it,
            ],
        );
        group(
            Feature::Arrays,
            &[spin.create_buffer, spin.create_thread_array, spin.create3_d_array],
        );
        group(Feature::Switches, &[spin.choose_near, spin.choose_far]);
        group(Feature::Counter, &[spin.next_index]);
        group(
            Feature::Faults,
            &[
                spin.cant_be_zero,
                spin.cant_be_zero2,
                spin.catch_one,
                spin.catch_two,
                spin.nested_catch,
                spin.try_finally,
                spin.handle_exc,
                spin.handle_exc2,
                spin.catch_two_from,
                spin.nested_catch_from,
                spin.try_finally_from,
            ],
        );
        group(Feature::Monitors, &[spin.only_me]);
        catalogue
    }

    /// Find a specimen class by its binary name
    pub fn class_named(&self, name: &str) -> Option<ClassId<'g>> {
        self.classes
            .all()
            .into_iter()
            .find(|class| class.name.as_str() == name)
    }

    /// Allocate and construct a receiver for instance methods of a specimen class
    ///
    /// Nested classes get a fresh enclosing instance.
    pub fn new_receiver(
        &self,
        vm: &Vm<'g>,
        class: ClassId<'g>,
    ) -> Result<ObjectRef<'g>, Fault<'g>> {
        let spin = vm.construct(self.members.spin.init, vec![])?;
        let init = if class == self.classes.spin {
            return Ok(spin);
        } else if class == self.classes.near {
            self.members.near.init
        } else if class == self.classes.far {
            self.members.far.init
        } else if class == self.classes.test_exc {
            self.members.test_exc.init
        } else if class == self.classes.test_exc2 {
            self.members.test_exc2.init
        } else {
            return Err(RuntimeFault::Verify(format!("{:?} is not a specimen class", class)).into());
        };
        vm.construct(init, vec![Value::from(spin)])
    }
}

/// Wrap a closure as a method body
fn body<'g>(
    implementation: impl Fn(&Vm<'g>, &mut Frame<'g>) -> Completion<'g> + Send + Sync + 'g,
) -> MethodBody<'g> {
    Arc::new(implementation)
}

/// Expect an `int` from an operation that produces a value
fn int<'g>(value: Value<'g>) -> Result<i32, RuntimeFault> {
    match value {
        Value::Int(value) => Ok(value),
        other => Err(RuntimeFault::Verify(format!("expected int, got {}", other.kind()))),
    }
}

/// Run an invocation for its side effects only
fn void<'g>(completion: Completion<'g>) -> Result<(), Fault<'g>> {
    completion.map(|_| ())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::class_graph::ClassGraphArenas;
    use crate::jvm::{MethodAccessFlags, RenderDescriptor};
    use crate::runtime;
    use std::collections::HashSet;

    #[test]
    fn declared_like_javac() {
        let arenas = ClassGraphArenas::new();
        let class_graph = ClassGraph::new(&arenas);
        let java = class_graph.insert_java_library_types();
        let spin = Specimens::add_to_graph(&class_graph, &java, &Settings::default()).unwrap();

        let names: Vec<String> = spin
            .classes
            .all()
            .iter()
            .map(|class| class.name.as_str().to_owned())
            .collect();
        assert_eq!(
            names,
            vec!["Spin", "Spin$Near", "Spin$Far", "Spin$TestExc", "Spin$TestExc2"]
        );
        assert_eq!(spin.classes.far.superclass, Some(spin.classes.near));
        assert!(spin.classes.test_exc.is_throwable());

        let members = &spin.members;
        assert_eq!(members.spin.double_locals.descriptor.render(), "(DD)D");
        assert_eq!(members.spin.create3_d_array.descriptor.render(), "()[[[[I");
        assert_eq!(members.spin.silly.descriptor.render(), "(LSpin;)LSpin;");
        assert_eq!(members.spin.only_me.descriptor.render(), "(LSpin$TestExc;)V");
        assert_eq!(members.near.init.descriptor.render(), "(LSpin;)V");
        assert!(members.spin.add_two_static.is_static());
        assert!(members.near.get_it.is_private());
        assert!(members
            .spin
            .next_index
            .access_flags
            .contains(MethodAccessFlags::PUBLIC));
        assert_eq!(members.spin.index.descriptor.render(), "J");

        assert!(Specimens::add_to_graph(&class_graph, &java, &Settings::default()).is_err());
    }

    #[test]
    fn catalogue_covers_every_declared_method() {
        let arenas = ClassGraphArenas::new();
        let class_graph = ClassGraph::new(&arenas);
        let java = class_graph.insert_java_library_types();
        let spin = Specimens::add_to_graph(&class_graph, &java, &Settings::default()).unwrap();

        let catalogued: HashSet<MethodId> =
            spin.catalogue().into_iter().map(|(_, method)| method).collect();
        for class in spin.classes.all() {
            for method in class.methods.read().iter() {
                assert!(
                    catalogued.contains(method) || method.name.as_str() == "<init>",
                    "{:?} is missing from the catalogue",
                    method
                );
            }
        }

        let classes = spin.classes().unwrap();
        let vm = Vm::link(&java, classes, runtime::Settings::default()).unwrap();
        for class in spin.classes.all() {
            let receiver = spin.new_receiver(&vm, class).unwrap();
            assert_eq!(receiver.class_id(), Some(class));
        }
        assert_eq!(spin.class_named("Spin$Far"), Some(spin.classes.far));
        assert_eq!(spin.class_named("Spin$Middle"), None);
    }

    #[test]
    fn renamed_host() {
        let arenas = ClassGraphArenas::new();
        let class_graph = ClassGraph::new(&arenas);
        let java = class_graph.insert_java_library_types();
        let settings = Settings::new("org/example/Spin".to_owned()).unwrap();
        let spin = Specimens::add_to_graph(&class_graph, &java, &settings).unwrap();

        assert_eq!(spin.classes.near.name.as_str(), "org/example/Spin$Near");
        assert_eq!(
            spin.members.spin.silly.descriptor.render(),
            "(Lorg/example/Spin;)Lorg/example/Spin;"
        );
        let vm = Vm::link(&java, spin.classes().unwrap(), runtime::Settings::default()).unwrap();
        assert_eq!(
            vm.call(spin.members.spin.add_two_static, vec![Value::Int(1), Value::Int(2)])
                .unwrap(),
            Some(Value::Int(3))
        );
    }
}
