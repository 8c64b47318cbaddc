//! Implementations for the slice of `java.lang` the runtime knows about

use super::{Completion, Frame, MethodBody, Vm};
use crate::jvm::class_graph::JavaLibrary;
use crate::jvm::model::{Class, Method};
use crate::jvm::Error;
use std::sync::Arc;

/// Model classes for every `java.lang` class in the library
///
/// The only members with code are the constructors, and those do nothing: none of the library
/// classes have instance state the runtime tracks.
pub fn java_library_classes<'g>(java: &JavaLibrary<'g>) -> Result<Vec<Class<'g>>, Error> {
    let lang = &java.classes.lang;
    let members = &java.members.lang;
    let constructors = [
        members.object.init,
        members.thread.init,
        members.throwable.init,
    ];

    let mut classes = vec![];
    for class in lang.all() {
        let mut model = Class::new(class);
        for init in constructors.iter().filter(|init| init.class == class) {
            model.add_method(Method::with_body(*init, empty_constructor()))?;
        }
        classes.push(model);
    }
    Ok(classes)
}

fn empty_constructor<'g>() -> MethodBody<'g> {
    Arc::new(|_vm: &Vm<'g>, frame: &mut Frame<'g>| -> Completion<'g> {
        log::trace!("Constructed {:?}", frame.this()?);
        Ok(None)
    })
}
