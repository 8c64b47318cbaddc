use super::Settings;
use crate::jvm::class_graph::{
    ClassData, ClassGraph, ClassId, FieldData, FieldId, JavaLibrary, MethodData, MethodId,
};
use crate::jvm::{
    ArrayType, BaseType, ClassAccessFlags, FieldAccessFlags, FieldType, MethodAccessFlags,
    MethodDescriptor, RefType, UnqualifiedName,
};

/// The host class and the classes nested inside it
#[derive(Copy, Clone)]
pub struct SpinClasses<'g> {
    pub spin: ClassId<'g>,
    pub near: ClassId<'g>,
    pub far: ClassId<'g>,
    pub test_exc: ClassId<'g>,
    pub test_exc2: ClassId<'g>,
}

impl<'g> SpinClasses<'g> {
    pub fn add_to_graph(
        class_graph: &ClassGraph<'g>,
        java: &JavaLibrary<'g>,
        settings: &Settings,
    ) -> SpinClasses<'g> {
        let host = &settings.host_class_name;
        let spin = class_graph.add_class(ClassData::new(
            host.clone(),
            java.classes.lang.object,
            ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER,
        ));
        let inner = |short_name: &UnqualifiedName, superclass: ClassId<'g>| -> ClassId<'g> {
            class_graph.add_class(ClassData::new(
                host.nested(short_name),
                superclass,
                ClassAccessFlags::SUPER,
            ))
        };

        let near = inner(&settings.near_short_class_name, java.classes.lang.object);
        let far = inner(&settings.far_short_class_name, near);
        let test_exc = inner(&settings.exception_short_class_name, java.classes.lang.throwable);
        let test_exc2 = inner(
            &settings.second_exception_short_class_name,
            java.classes.lang.throwable,
        );

        SpinClasses {
            spin,
            near,
            far,
            test_exc,
            test_exc2,
        }
    }

    /// Every class, outer class first
    pub fn all(&self) -> [ClassId<'g>; 5] {
        [self.spin, self.near, self.far, self.test_exc, self.test_exc2]
    }
}

/// Members of the host class and the classes nested inside it
#[derive(Copy, Clone)]
pub struct SpinMembers<'g> {
    pub spin: HostMembers<'g>,
    pub near: NearMembers<'g>,
    pub far: FarMembers<'g>,
    pub test_exc: InnerMembers<'g>,
    pub test_exc2: InnerMembers<'g>,
}

/// Members of the host class
#[derive(Copy, Clone)]
pub struct HostMembers<'g> {
    pub init: MethodId<'g>,

    pub i: FieldId<'g>,
    pub index: FieldId<'g>,

    pub spin: MethodId<'g>,
    pub spin_double: MethodId<'g>,
    pub double_locals: MethodId<'g>,
    pub spin_short: MethodId<'g>,
    pub align2grain: MethodId<'g>,
    pub use_many_numeric: MethodId<'g>,
    pub less_than100: MethodId<'g>,
    pub greater_than100: MethodId<'g>,

    pub add_two: MethodId<'g>,
    pub add_two_static: MethodId<'g>,
    pub add12and13: MethodId<'g>,
    pub add12and13_static: MethodId<'g>,
    pub example: MethodId<'g>,
    pub silly: MethodId<'g>,
    pub set_it: MethodId<'g>,
    pub get_it: MethodId<'g>,

    pub create_buffer: MethodId<'g>,
    pub create_thread_array: MethodId<'g>,
    pub create3_d_array: MethodId<'g>,

    pub choose_near: MethodId<'g>,
    pub choose_far: MethodId<'g>,

    pub next_index: MethodId<'g>,

    pub cant_be_zero: MethodId<'g>,
    pub catch_one: MethodId<'g>,
    pub handle_exc: MethodId<'g>,
    pub cant_be_zero2: MethodId<'g>,
    pub catch_two: MethodId<'g>,
    pub handle_exc2: MethodId<'g>,
    pub nested_catch: MethodId<'g>,
    pub try_finally: MethodId<'g>,
    pub catch_two_from: MethodId<'g>,
    pub nested_catch_from: MethodId<'g>,
    pub try_finally_from: MethodId<'g>,

    pub only_me: MethodId<'g>,
}

/// Members of `Spin$Near`
#[derive(Copy, Clone)]
pub struct NearMembers<'g> {
    pub init: MethodId<'g>,
    pub this_outer: FieldId<'g>,
    pub it: FieldId<'g>,
    pub get_it_near: MethodId<'g>,
    pub get_it: MethodId<'g>,
}

/// Members of `Spin$Far`
#[derive(Copy, Clone)]
pub struct FarMembers<'g> {
    pub init: MethodId<'g>,
    pub this_outer: FieldId<'g>,
    pub get_it_far: MethodId<'g>,
}

/// Members of an inner class with nothing but a constructor (the exception classes)
#[derive(Copy, Clone)]
pub struct InnerMembers<'g> {
    pub init: MethodId<'g>,
    pub this_outer: FieldId<'g>,
}

impl<'g> SpinMembers<'g> {
    pub fn add_to_graph(
        class_graph: &ClassGraph<'g>,
        classes: &SpinClasses<'g>,
    ) -> SpinMembers<'g> {
        SpinMembers {
            spin: HostMembers::add_to_graph(class_graph, classes),
            near: NearMembers::add_to_graph(class_graph, classes),
            far: FarMembers::add_to_graph(class_graph, classes),
            test_exc: InnerMembers::add_to_graph(class_graph, classes, classes.test_exc),
            test_exc2: InnerMembers::add_to_graph(class_graph, classes, classes.test_exc2),
        }
    }
}

/// Declare a method
fn method<'g>(
    class_graph: &ClassGraph<'g>,
    class: ClassId<'g>,
    name: &'static str,
    parameters: Vec<FieldType<ClassId<'g>>>,
    return_type: Option<FieldType<ClassId<'g>>>,
    access_flags: MethodAccessFlags,
) -> MethodId<'g> {
    class_graph.add_method(MethodData {
        class,
        name: UnqualifiedName::from_str_unsafe(name),
        descriptor: MethodDescriptor {
            parameters,
            return_type,
        },
        access_flags,
    })
}

/// Declare a field
fn field<'g>(
    class_graph: &ClassGraph<'g>,
    class: ClassId<'g>,
    name: UnqualifiedName,
    descriptor: FieldType<ClassId<'g>>,
    access_flags: FieldAccessFlags,
) -> FieldId<'g> {
    class_graph.add_field(FieldData {
        class,
        name,
        descriptor,
        access_flags,
    })
}

/// Constructor of an inner class, taking the enclosing instance
fn inner_init<'g>(
    class_graph: &ClassGraph<'g>,
    class: ClassId<'g>,
    outer: ClassId<'g>,
) -> MethodId<'g> {
    class_graph.add_method(MethodData {
        class,
        name: UnqualifiedName::INIT,
        descriptor: MethodDescriptor {
            parameters: vec![FieldType::object(outer)],
            return_type: None,
        },
        access_flags: MethodAccessFlags::empty(),
    })
}

/// `final synthetic` reference to the enclosing instance
fn this_outer<'g>(
    class_graph: &ClassGraph<'g>,
    class: ClassId<'g>,
    outer: ClassId<'g>,
) -> FieldId<'g> {
    field(
        class_graph,
        class,
        UnqualifiedName::THIS_OUTER,
        FieldType::object(outer),
        FieldAccessFlags::FINAL | FieldAccessFlags::SYNTHETIC,
    )
}

impl<'g> HostMembers<'g> {
    pub fn add_to_graph(
        class_graph: &ClassGraph<'g>,
        classes: &SpinClasses<'g>,
    ) -> HostMembers<'g> {
        let spin = classes.spin;
        let m = |name, parameters, return_type, access_flags| {
            method(class_graph, spin, name, parameters, return_type, access_flags)
        };
        let int = FieldType::int;
        let double = FieldType::double;
        let none = MethodAccessFlags::empty;
        let public = MethodAccessFlags::PUBLIC;
        let spin_type = FieldType::object(spin);
        let int_4d_array = FieldType::Ref(RefType::PrimitiveArray(ArrayType {
            additional_dimensions: 3,
            element_type: BaseType::Int,
        }));
        let test_exc = FieldType::object(classes.test_exc);
        let test_exc2 = FieldType::object(classes.test_exc2);

        HostMembers {
            init: method(class_graph, spin, "<init>", vec![], None, public),

            i: field(
                class_graph,
                spin,
                UnqualifiedName::from_str_unsafe("i"),
                int(),
                FieldAccessFlags::empty(),
            ),
            index: field(
                class_graph,
                spin,
                UnqualifiedName::from_str_unsafe("index"),
                FieldType::long(),
                FieldAccessFlags::PRIVATE,
            ),

            spin: m("spin", vec![], None, public),
            spin_double: m("spinDouble", vec![], None, public),
            double_locals: m("doubleLocals", vec![double(), double()], Some(double()), public),
            spin_short: m("spinShort", vec![], None, public),
            align2grain: m("align2grain", vec![int(), int()], Some(int()), none()),
            use_many_numeric: m("useManyNumeric", vec![], None, none()),
            less_than100: m("lessThan100", vec![double()], Some(int()), none()),
            greater_than100: m("greaterThan100", vec![double()], Some(int()), none()),

            add_two: m("addTwo", vec![int(), int()], Some(int()), none()),
            add_two_static: m(
                "addTwoStatic",
                vec![int(), int()],
                Some(int()),
                MethodAccessFlags::STATIC,
            ),
            add12and13: m("add12and13", vec![], Some(int()), none()),
            add12and13_static: m("add12and13Static", vec![], Some(int()), none()),
            example: m("example", vec![], Some(spin_type), none()),
            silly: m("silly", vec![spin_type], Some(spin_type), none()),
            set_it: m("setIt", vec![int()], None, none()),
            get_it: m("getIt", vec![], Some(int()), none()),

            create_buffer: m("createBuffer", vec![], None, none()),
            create_thread_array: m("createThreadArray", vec![], None, none()),
            create3_d_array: m("create3DArray", vec![], Some(int_4d_array), none()),

            choose_near: m("chooseNear", vec![int()], Some(int()), none()),
            choose_far: m("chooseFar", vec![int()], Some(int()), none()),

            next_index: m("nextIndex", vec![], Some(FieldType::long()), public),

            cant_be_zero: m("cantBeZero", vec![int()], None, none()),
            catch_one: m("catchOne", vec![], None, none()),
            handle_exc: m("handleExc", vec![test_exc], None, none()),
            cant_be_zero2: m("cantBeZero2", vec![int()], None, none()),
            catch_two: m("catchTwo", vec![], None, none()),
            handle_exc2: m("handleExc2", vec![test_exc2], None, none()),
            nested_catch: m("nestedCatch", vec![], None, none()),
            try_finally: m("tryFinally", vec![], None, none()),
            catch_two_from: m("catchTwoFrom", vec![int(), int()], None, none()),
            nested_catch_from: m("nestedCatchFrom", vec![int(), int()], None, none()),
            try_finally_from: m("tryFinallyFrom", vec![int()], None, none()),

            only_me: m("onlyMe", vec![test_exc], None, none()),
        }
    }
}

impl<'g> NearMembers<'g> {
    pub fn add_to_graph(
        class_graph: &ClassGraph<'g>,
        classes: &SpinClasses<'g>,
    ) -> NearMembers<'g> {
        let near = classes.near;
        NearMembers {
            init: inner_init(class_graph, near, classes.spin),
            this_outer: this_outer(class_graph, near, classes.spin),
            it: field(
                class_graph,
                near,
                UnqualifiedName::from_str_unsafe("it"),
                FieldType::int(),
                FieldAccessFlags::empty(),
            ),
            get_it_near: method(
                class_graph,
                near,
                "getItNear",
                vec![],
                Some(FieldType::int()),
                MethodAccessFlags::empty(),
            ),
            get_it: method(
                class_graph,
                near,
                "getIt",
                vec![],
                Some(FieldType::int()),
                MethodAccessFlags::PRIVATE,
            ),
        }
    }
}

impl<'g> FarMembers<'g> {
    pub fn add_to_graph(class_graph: &ClassGraph<'g>, classes: &SpinClasses<'g>) -> FarMembers<'g> {
        let far = classes.far;
        FarMembers {
            init: inner_init(class_graph, far, classes.spin),
            this_outer: this_outer(class_graph, far, classes.spin),
            get_it_far: method(
                class_graph,
                far,
                "getItFar",
                vec![],
                Some(FieldType::int()),
                MethodAccessFlags::empty(),
            ),
        }
    }
}

impl<'g> InnerMembers<'g> {
    pub fn add_to_graph(
        class_graph: &ClassGraph<'g>,
        classes: &SpinClasses<'g>,
        class: ClassId<'g>,
    ) -> InnerMembers<'g> {
        InnerMembers {
            init: inner_init(class_graph, class, classes.spin),
            this_outer: this_outer(class_graph, class, classes.spin),
        }
    }
}
