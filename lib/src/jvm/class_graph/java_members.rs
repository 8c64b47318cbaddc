use super::{
    ClassGraph, ClassId, MethodAccessFlags, MethodData, MethodDescriptor, MethodId,
    UnqualifiedName,
};

use super::java_classes::JavaClasses;

/// The part of the Java standard library the runtime relies on
#[derive(Copy, Clone)]
pub struct JavaLibrary<'g> {
    pub classes: JavaClasses<'g>,
    pub members: JavaMembers<'g>,
}

impl<'g> JavaLibrary<'g> {
    pub fn add_to_graph(class_graph: &ClassGraph<'g>) -> JavaLibrary<'g> {
        let classes = JavaClasses::add_to_graph(class_graph);
        let members = JavaMembers::add_to_graph(class_graph, &classes);
        JavaLibrary { classes, members }
    }
}

/// Members of classes inside `java.*`
#[derive(Copy, Clone)]
pub struct JavaMembers<'g> {
    pub lang: LangMembers<'g>,
}

/// Members of classes inside `java.lang.*`
#[derive(Copy, Clone)]
pub struct LangMembers<'g> {
    pub object: ObjectMembers<'g>,
    pub thread: ThreadMembers<'g>,
    pub throwable: ThrowableMembers<'g>,
}

/// Members of `java.lang.Object`
#[derive(Copy, Clone)]
pub struct ObjectMembers<'g> {
    pub init: MethodId<'g>,
}

/// Members of `java.lang.Thread`
#[derive(Copy, Clone)]
pub struct ThreadMembers<'g> {
    pub init: MethodId<'g>,
}

/// Members of `java.lang.Throwable`
#[derive(Copy, Clone)]
pub struct ThrowableMembers<'g> {
    pub init: MethodId<'g>,
}

impl<'g> JavaMembers<'g> {
    pub fn add_to_graph(
        class_graph: &ClassGraph<'g>,
        java_classes: &JavaClasses<'g>,
    ) -> JavaMembers<'g> {
        JavaMembers {
            lang: LangMembers::add_to_graph(class_graph, java_classes),
        }
    }
}

impl<'g> LangMembers<'g> {
    pub fn add_to_graph(
        class_graph: &ClassGraph<'g>,
        java_classes: &JavaClasses<'g>,
    ) -> LangMembers<'g> {
        let lang = &java_classes.lang;
        LangMembers {
            object: ObjectMembers {
                init: add_nullary_init(class_graph, lang.object),
            },
            thread: ThreadMembers {
                init: add_nullary_init(class_graph, lang.thread),
            },
            throwable: ThrowableMembers {
                init: add_nullary_init(class_graph, lang.throwable),
            },
        }
    }
}

fn add_nullary_init<'g>(class_graph: &ClassGraph<'g>, class: ClassId<'g>) -> MethodId<'g> {
    class_graph.add_method(MethodData {
        class,
        name: UnqualifiedName::INIT,
        descriptor: MethodDescriptor {
            parameters: vec![],
            return_type: None,
        },
        access_flags: MethodAccessFlags::PUBLIC,
    })
}
