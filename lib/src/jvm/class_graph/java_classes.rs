use super::{BinaryName, ClassAccessFlags, ClassData, ClassGraph, ClassId};
use parking_lot::RwLock;

/// Classes inside `java.*`
#[derive(Copy, Clone)]
pub struct JavaClasses<'g> {
    pub lang: LangClasses<'g>,
}

/// Classes inside `java.lang.*`
#[derive(Copy, Clone)]
pub struct LangClasses<'g> {
    pub object: ClassId<'g>,
    pub thread: ClassId<'g>,
    pub throwable: ClassId<'g>,
    pub error: ClassId<'g>,
    pub linkage_error: ClassId<'g>,
    pub verify_error: ClassId<'g>,
    pub incompatible_class_change_error: ClassId<'g>,
    pub abstract_method_error: ClassId<'g>,
    pub exception: ClassId<'g>,
    pub runtime_exception: ClassId<'g>,
    pub null_pointer_exception: ClassId<'g>,
    pub index_out_of_bounds_exception: ClassId<'g>,
    pub array_index_out_of_bounds_exception: ClassId<'g>,
    pub negative_array_size_exception: ClassId<'g>,
    pub arithmetic_exception: ClassId<'g>,
    pub illegal_monitor_state_exception: ClassId<'g>,
    pub array_store_exception: ClassId<'g>,
}

impl<'g> JavaClasses<'g> {
    pub fn add_to_graph(class_graph: &ClassGraph<'g>) -> JavaClasses<'g> {
        let lang = LangClasses::add_to_graph(class_graph);
        JavaClasses { lang }
    }
}

impl<'g> LangClasses<'g> {
    pub fn add_to_graph(class_graph: &ClassGraph<'g>) -> LangClasses<'g> {
        let object = class_graph.add_class(ClassData {
            name: BinaryName::OBJECT,
            superclass: None,
            access_flags: ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER,
            methods: RwLock::new(vec![]),
            fields: RwLock::new(vec![]),
        });
        let subclass = |name: BinaryName, superclass: ClassId<'g>| -> ClassId<'g> {
            class_graph.add_class(ClassData::new(
                name,
                superclass,
                ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER,
            ))
        };

        let thread = subclass(BinaryName::THREAD, object);
        let throwable = subclass(BinaryName::THROWABLE, object);

        let error = subclass(BinaryName::ERROR, throwable);
        let linkage_error = subclass(BinaryName::LINKAGEERROR, error);
        let verify_error = subclass(BinaryName::VERIFYERROR, linkage_error);
        let incompatible_class_change_error =
            subclass(BinaryName::INCOMPATIBLECLASSCHANGEERROR, linkage_error);
        let abstract_method_error = subclass(
            BinaryName::ABSTRACTMETHODERROR,
            incompatible_class_change_error,
        );

        let exception = subclass(BinaryName::EXCEPTION, throwable);
        let runtime_exception = subclass(BinaryName::RUNTIMEEXCEPTION, exception);
        let null_pointer_exception = subclass(BinaryName::NULLPOINTEREXCEPTION, runtime_exception);
        let index_out_of_bounds_exception =
            subclass(BinaryName::INDEXOUTOFBOUNDSEXCEPTION, runtime_exception);
        let array_index_out_of_bounds_exception = subclass(
            BinaryName::ARRAYINDEXOUTOFBOUNDSEXCEPTION,
            index_out_of_bounds_exception,
        );
        let negative_array_size_exception =
            subclass(BinaryName::NEGATIVEARRAYSIZEEXCEPTION, runtime_exception);
        let arithmetic_exception = subclass(BinaryName::ARITHMETICEXCEPTION, runtime_exception);
        let illegal_monitor_state_exception =
            subclass(BinaryName::ILLEGALMONITORSTATEEXCEPTION, runtime_exception);
        let array_store_exception = subclass(BinaryName::ARRAYSTOREEXCEPTION, runtime_exception);

        LangClasses {
            object,
            thread,
            throwable,
            error,
            linkage_error,
            verify_error,
            incompatible_class_change_error,
            abstract_method_error,
            exception,
            runtime_exception,
            null_pointer_exception,
            index_out_of_bounds_exception,
            array_index_out_of_bounds_exception,
            negative_array_size_exception,
            arithmetic_exception,
            illegal_monitor_state_exception,
            array_store_exception,
        }
    }

    /// Every class in `java.lang.*` known to the graph, superclasses before subclasses
    pub fn all(&self) -> [ClassId<'g>; 17] {
        [
            self.object,
            self.thread,
            self.throwable,
            self.error,
            self.linkage_error,
            self.verify_error,
            self.incompatible_class_change_error,
            self.abstract_method_error,
            self.exception,
            self.runtime_exception,
            self.null_pointer_exception,
            self.index_out_of_bounds_exception,
            self.array_index_out_of_bounds_exception,
            self.negative_array_size_exception,
            self.arithmetic_exception,
            self.illegal_monitor_state_exception,
            self.array_store_exception,
        ]
    }
}
