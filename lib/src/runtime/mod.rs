//! Execution of linked classes
//!
//! Classes are declared in a [`ClassGraph`](crate::jvm::class_graph::ClassGraph), paired with
//! their method bodies as [`model::Class`]es, and then linked into a [`Vm`]. Linking lays out
//! instance fields, builds a virtual method table for every class, and checks that every
//! concrete method has an implementation. After that, the `Vm` offers the operations compiled
//! code needs: invocation, allocation, field and array access, throwing, and monitors.
//!
//! Method bodies are ordinary Rust closures. Abrupt completion is a [`Fault`], propagated with
//! `?` and intercepted with a [`ProtectedRegion`].

mod array;
mod fault;
mod frame;
mod heap;
mod library;
mod monitor;
mod region;
mod value;

pub use array::*;
pub use fault::*;
pub use frame::*;
pub use heap::*;
pub use library::*;
pub use monitor::*;
pub use region::*;
pub use value::*;

use crate::jvm::class_graph::{
    Assignable, ClassId, FieldId, InvokeType, JavaLibrary, MethodId,
};
use crate::jvm::model;
use crate::jvm::{
    Error, FieldType, LocalsLayout, MethodAccessFlags, MethodDescriptor, Name, RefType,
    RenderDescriptor, UnqualifiedName,
};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Result of running a method body: the return value (`None` for `void`) or a fault
pub type Completion<'g> = Result<Option<Value<'g>>, Fault<'g>>;

/// Implementation of a method
///
/// The frame has the receiver (for instance methods) and arguments already in their slots.
pub type MethodBody<'g> =
    Arc<dyn Fn(&Vm<'g>, &mut Frame<'g>) -> Completion<'g> + Send + Sync + 'g>;

/// Runtime settings
#[derive(Clone, Debug, Default)]
pub struct Settings {
    /// Record every method actually invoked (after dispatch) in a journal
    pub record_invocations: bool,
}

type VirtualKey<'g> = (UnqualifiedName, MethodDescriptor<ClassId<'g>>);

struct LinkedClass<'g> {
    /// Virtual methods, including inherited ones, by name and descriptor
    vtable: HashMap<VirtualKey<'g>, MethodId<'g>>,

    /// Types of instance fields, superclass fields first
    field_layout: Vec<FieldType<ClassId<'g>>>,
}

struct LinkedMethod<'g> {
    body: Option<MethodBody<'g>>,
    locals: LocalsLayout<'g>,
    exceptions: Vec<ClassId<'g>>,
}

/// Linked set of classes, ready to run
pub struct Vm<'g> {
    java: JavaLibrary<'g>,
    settings: Settings,
    classes: HashMap<ClassId<'g>, LinkedClass<'g>>,
    methods: HashMap<MethodId<'g>, LinkedMethod<'g>>,
    field_offsets: HashMap<FieldId<'g>, usize>,
    journal: Mutex<Vec<MethodId<'g>>>,
}

impl<'g> Vm<'g> {
    /// Link classes (along with the Java library classes)
    pub fn link(
        java: &JavaLibrary<'g>,
        classes: Vec<model::Class<'g>>,
        settings: Settings,
    ) -> Result<Vm<'g>, Error> {
        let mut classes = classes;
        classes.extend(java_library_classes(java)?);

        // Superclasses must be linked before their subclasses
        let known: HashSet<ClassId<'g>> = classes.iter().map(|class| class.id).collect();
        for class in &classes {
            if let Some(superclass) = class.id.superclass {
                if !known.contains(&superclass) {
                    return Err(Error::MissingClass(format!(
                        "{} (superclass of {})",
                        superclass.name.as_str(),
                        class.id.name.as_str()
                    )));
                }
            }
        }
        classes.sort_by_key(|class| class.id.ancestors().count());

        let mut vm = Vm {
            java: *java,
            settings,
            classes: HashMap::new(),
            methods: HashMap::new(),
            field_offsets: HashMap::new(),
            journal: Mutex::new(vec![]),
        };

        for class in classes {
            vm.link_class(class)?;
        }

        Ok(vm)
    }

    fn link_class(&mut self, class: model::Class<'g>) -> Result<(), Error> {
        let id = class.id;
        let (mut vtable, mut field_layout) = match id.superclass {
            Some(superclass) => {
                let linked = self.classes.get(&superclass).ok_or_else(|| {
                    Error::MissingClass(superclass.name.as_str().to_owned())
                })?;
                (linked.vtable.clone(), linked.field_layout.clone())
            }
            None => (HashMap::new(), vec![]),
        };

        for field in id.fields.read().iter() {
            if !field.is_static() {
                self.field_offsets.insert(*field, field_layout.len());
                field_layout.push(field.descriptor);
            }
        }

        for method in id.methods.read().iter() {
            if method.is_virtual() {
                vtable.insert((method.name.clone(), method.descriptor.clone()), *method);
            }
        }

        for method in class.methods {
            if self.methods.contains_key(&method.id) {
                return Err(Error::DuplicateBody(format!("{:?}", method.id)));
            }
            let locals = match method.locals {
                Some(locals) => locals,
                None => LocalsLayout::for_method(&method.id)?,
            };
            self.methods.insert(
                method.id,
                LinkedMethod {
                    body: method.body,
                    locals,
                    exceptions: method.exceptions,
                },
            );
        }

        for method in id.methods.read().iter() {
            let has_body = self
                .methods
                .get(method)
                .map_or(false, |linked| linked.body.is_some());
            if !has_body && !method.is_bodiless() {
                return Err(Error::MissingBody(format!("{:?}", method)));
            }
        }

        log::debug!(
            "Linked {} with {} virtual methods and {} instance fields",
            id.name.as_str(),
            vtable.len(),
            field_layout.len()
        );
        self.classes.insert(
            id,
            LinkedClass {
                vtable,
                field_layout,
            },
        );
        Ok(())
    }

    pub fn java(&self) -> &JavaLibrary<'g> {
        &self.java
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Size of the locals array of a linked method
    pub fn max_locals(&self, method: MethodId<'g>) -> Option<u16> {
        self.methods
            .get(&method)
            .map(|linked| linked.locals.max_locals())
    }

    /// Declared `throws` clause of a linked method
    pub fn exceptions(&self, method: MethodId<'g>) -> &[ClassId<'g>] {
        match self.methods.get(&method) {
            Some(linked) => &linked.exceptions,
            None => &[],
        }
    }

    /// Invoke a method the way the matching `invoke*` instruction would
    ///
    /// For instance methods, the receiver is the first argument.
    pub fn invoke(
        &self,
        invoke_type: InvokeType,
        method: MethodId<'g>,
        arguments: Vec<Value<'g>>,
    ) -> Completion<'g> {
        let target = match invoke_type {
            InvokeType::Static => {
                if !method.is_static() {
                    return Err(RuntimeFault::Verify(format!(
                        "invokestatic of instance method {:?}",
                        method
                    ))
                    .into());
                }
                method
            }
            InvokeType::Special => {
                self.check_receiver(method, &arguments)?;
                self.resolve_special(method)
            }
            InvokeType::Virtual => {
                let receiver = self.check_receiver(method, &arguments)?;
                if method.is_private() {
                    self.resolve_special(method)
                } else {
                    self.resolve_virtual(method, receiver)?
                }
            }
        };

        if self.settings.record_invocations {
            self.journal.lock().push(target);
        }
        self.execute(target, arguments)
    }

    /// Invoke a method with its usual invoke type
    pub fn call(&self, method: MethodId<'g>, arguments: Vec<Value<'g>>) -> Completion<'g> {
        self.invoke(method.infer_invoke_type(), method, arguments)
    }

    /// Non-null receiver of an instance method, whose class declares or inherits the method
    fn check_receiver(
        &self,
        method: MethodId<'g>,
        arguments: &[Value<'g>],
    ) -> Result<ClassId<'g>, RuntimeFault> {
        if method.is_static() {
            return Err(RuntimeFault::Verify(format!(
                "instance invocation of static method {:?}",
                method
            )));
        }
        let receiver = match arguments.first() {
            Some(Value::Reference(Some(receiver))) => receiver,
            Some(Value::Reference(None)) => return Err(RuntimeFault::NullPointer),
            Some(other) => {
                return Err(RuntimeFault::Verify(format!(
                    "receiver of {:?} is {}",
                    method,
                    other.kind()
                )))
            }
            None => {
                return Err(RuntimeFault::Verify(format!(
                    "{:?} invoked without a receiver",
                    method
                )))
            }
        };
        if !receiver
            .class()
            .is_assignable(&RefType::Object(method.class))
        {
            return Err(RuntimeFault::Verify(format!(
                "{:?} is not a receiver for {:?}",
                receiver, method
            )));
        }
        Ok(receiver.class_id().unwrap_or(self.java.classes.lang.object))
    }

    /// Constructors and private methods resolve to themselves, anything else is a `super` call
    /// that resolves to the closest implementation starting at the named class
    fn resolve_special(&self, method: MethodId<'g>) -> MethodId<'g> {
        if method.name == UnqualifiedName::INIT || method.is_private() {
            return method;
        }
        method
            .class
            .ancestors()
            .filter_map(|class| class.declared_method(&method.name, &method.descriptor))
            .find(|candidate| {
                self.methods
                    .get(candidate)
                    .map_or(false, |linked| linked.body.is_some())
            })
            .unwrap_or(method)
    }

    fn resolve_virtual(
        &self,
        method: MethodId<'g>,
        receiver_class: ClassId<'g>,
    ) -> Result<MethodId<'g>, RuntimeFault> {
        let linked = self.classes.get(&receiver_class).ok_or_else(|| {
            RuntimeFault::Verify(format!("{:?} is not linked", receiver_class))
        })?;
        linked
            .vtable
            .get(&(method.name.clone(), method.descriptor.clone()))
            .copied()
            .ok_or_else(|| RuntimeFault::AbstractMethod(format!("{:?}", method)))
    }

    fn execute(&self, method: MethodId<'g>, arguments: Vec<Value<'g>>) -> Completion<'g> {
        log::trace!("Invoking {:?}", method);
        let linked = self
            .methods
            .get(&method)
            .ok_or_else(|| RuntimeFault::AbstractMethod(format!("{:?}", method)))?;
        let body = linked
            .body
            .as_ref()
            .ok_or_else(|| RuntimeFault::AbstractMethod(format!("{:?}", method)))?;
        let mut frame = Frame::new(method, &linked.locals, arguments)?;

        let result = if method.access_flags.contains(MethodAccessFlags::SYNCHRONIZED) {
            let receiver = frame.this()?;
            receiver.monitor().scoped(|| body(self, &mut frame))?
        } else {
            body(self, &mut frame)?
        };

        match (&method.descriptor.return_type, &result) {
            (None, None) => Ok(result),
            (Some(return_type), Some(value)) if value.fits(return_type) => Ok(result),
            _ => Err(RuntimeFault::Verify(format!(
                "{:?} returned {}",
                method,
                result.as_ref().map_or("void", |value| value.kind())
            ))
            .into()),
        }
    }

    /// Allocate an instance with default field values (`new`)
    ///
    /// The instance still needs to be initialized by invoking a constructor.
    pub fn new_instance(&self, class: ClassId<'g>) -> Result<ObjectRef<'g>, RuntimeFault> {
        let linked = self.classes.get(&class).ok_or_else(|| {
            RuntimeFault::Verify(format!("{} is not linked", class.name.as_str()))
        })?;
        Ok(HeapObject::new_instance(class, &linked.field_layout))
    }

    /// Allocate and initialize an instance (`new`, `dup`, `invokespecial <init>`)
    pub fn construct(
        &self,
        constructor: MethodId<'g>,
        arguments: Vec<Value<'g>>,
    ) -> Result<ObjectRef<'g>, Fault<'g>> {
        if constructor.name != UnqualifiedName::INIT {
            let msg = format!("{:?} is not a constructor", constructor);
            return Err(RuntimeFault::Verify(msg).into());
        }
        let object = self.new_instance(constructor.class)?;
        let mut receiver_and_arguments = Vec::with_capacity(arguments.len() + 1);
        receiver_and_arguments.push(Value::from(object.clone()));
        receiver_and_arguments.extend(arguments);
        self.invoke(InvokeType::Special, constructor, receiver_and_arguments)?;
        Ok(object)
    }

    /// Allocate and initialize a `java.lang.Thread`
    pub fn new_thread(&self) -> Result<ObjectRef<'g>, Fault<'g>> {
        self.construct(self.java.members.lang.thread.init, vec![])
    }

    /// Allocate a one dimensional array (`newarray`, `anewarray`)
    pub fn new_array(
        &self,
        component: FieldType<ClassId<'g>>,
        length: i32,
    ) -> Result<ObjectRef<'g>, RuntimeFault> {
        HeapObject::new_array(component, length)
    }

    /// Allocate a multi-dimensional array (`multianewarray`)
    pub fn new_multi_array(
        &self,
        array_type: &RefType<ClassId<'g>>,
        lengths: &[i32],
    ) -> Result<ObjectRef<'g>, RuntimeFault> {
        HeapObject::new_multi_array(array_type, lengths)
    }

    fn deref<'v>(&self, value: &'v Value<'g>) -> Result<&'v ObjectRef<'g>, RuntimeFault> {
        match value {
            Value::Reference(Some(object)) => Ok(object),
            Value::Reference(None) => Err(RuntimeFault::NullPointer),
            other => Err(RuntimeFault::Verify(format!(
                "expected a reference but got {}",
                other.kind()
            ))),
        }
    }

    fn array<'v>(&self, array: &'v Value<'g>) -> Result<&'v Array<'g>, RuntimeFault> {
        self.deref(array)?.as_array()
    }

    pub fn array_load(&self, array: &Value<'g>, index: i32) -> Result<Value<'g>, RuntimeFault> {
        self.array(array)?.load(index)
    }

    pub fn array_store(
        &self,
        array: &Value<'g>,
        index: i32,
        value: Value<'g>,
    ) -> Result<(), RuntimeFault> {
        self.array(array)?.store(index, value)
    }

    pub fn array_length(&self, array: &Value<'g>) -> Result<i32, RuntimeFault> {
        Ok(self.array(array)?.len() as i32)
    }

    fn field_slot<'v>(
        &self,
        object: &'v Value<'g>,
        field: FieldId<'g>,
    ) -> Result<&'v FieldSlot<'g>, RuntimeFault> {
        let object = self.deref(object)?;
        let offset = *self.field_offsets.get(&field).ok_or_else(|| {
            RuntimeFault::Verify(format!("{:?} is not a linked instance field", field))
        })?;
        if !object.class().is_assignable(&RefType::Object(field.class)) {
            return Err(RuntimeFault::Verify(format!(
                "{:?} has no field {:?}",
                object, field
            )));
        }
        object.field(offset)
    }

    /// Read an instance field (`getfield`)
    pub fn get_field(
        &self,
        object: &Value<'g>,
        field: FieldId<'g>,
    ) -> Result<Value<'g>, RuntimeFault> {
        Ok(self.field_slot(object, field)?.load())
    }

    /// Write an instance field (`putfield`)
    pub fn put_field(
        &self,
        object: &Value<'g>,
        field: FieldId<'g>,
        value: Value<'g>,
    ) -> Result<(), RuntimeFault> {
        let stored = value_object(&value);
        if let (Some(stored), FieldType::Ref(field_type)) = (stored, &field.descriptor) {
            if !stored.class().is_assignable(field_type) {
                return Err(RuntimeFault::Verify(format!(
                    "{:?} cannot be stored in {:?}",
                    stored, field
                )));
            }
        }
        self.field_slot(object, field)?.store(value)
    }

    /// Atomically read a counter field and add one to it (`field++` on a shared instance)
    pub fn read_and_advance(
        &self,
        object: &Value<'g>,
        field: FieldId<'g>,
    ) -> Result<Value<'g>, RuntimeFault> {
        self.field_slot(object, field)?.read_and_advance()
    }

    /// Turn a value into a fault (`athrow`)
    pub fn throw(&self, value: Value<'g>) -> Fault<'g> {
        match value {
            Value::Reference(Some(object)) => {
                let throwable = object
                    .class()
                    .is_assignable(&RefType::Object(self.java.classes.lang.throwable));
                if throwable {
                    log::trace!("Throwing {:?}", object);
                    Fault::Thrown(object)
                } else {
                    RuntimeFault::Verify(format!("{:?} is not throwable", object)).into()
                }
            }
            Value::Reference(None) => RuntimeFault::NullPointer.into(),
            other => RuntimeFault::Verify(format!("cannot throw {}", other.kind())).into(),
        }
    }

    /// Origin kind of a fault
    pub fn fault_kind(&self, fault: &Fault<'g>) -> ClassId<'g> {
        fault.kind(&self.java.classes.lang)
    }

    /// Fault as an object, allocating one for runtime faults
    pub fn fault_value(&self, fault: &Fault<'g>) -> Result<ObjectRef<'g>, RuntimeFault> {
        match fault {
            Fault::Thrown(object) => Ok(object.clone()),
            Fault::Runtime(runtime_fault) => {
                self.new_instance(runtime_fault.kind(&self.java.classes.lang))
            }
        }
    }

    /// Acquire the monitor of an object (`monitorenter`)
    pub fn monitor_enter(&self, object: &Value<'g>) -> Result<(), RuntimeFault> {
        self.deref(object)?.monitor().enter();
        Ok(())
    }

    /// Release the monitor of an object (`monitorexit`)
    pub fn monitor_exit(&self, object: &Value<'g>) -> Result<(), RuntimeFault> {
        self.deref(object)?.monitor().exit()
    }

    /// Run a block while holding the monitor of an object (`synchronized (object) { ... }`)
    ///
    /// The monitor is released however the block completes. If the block exits the monitor itself,
    /// the release at the end raises `IllegalMonitorState`, replacing the block's result.
    pub fn synchronized<T>(
        &self,
        object: &Value<'g>,
        block: impl FnOnce() -> Result<T, Fault<'g>>,
    ) -> Result<T, Fault<'g>> {
        let object = self.deref(object)?.clone();
        object.monitor().scoped(|| {
            log::trace!("Entered monitor of {:?}", object);
            block()
        })
    }

    /// Methods invoked so far (only recorded if enabled in the settings)
    pub fn journal(&self) -> Vec<MethodId<'g>> {
        self.journal.lock().clone()
    }

    pub fn clear_journal(&self) {
        self.journal.lock().clear();
    }

    /// Render a value for display, using descriptors for objects
    pub fn describe(&self, value: &Value<'g>) -> String {
        match value {
            Value::Reference(Some(object)) => object.class().render(),
            other => format!("{:?}", other),
        }
    }
}

fn value_object<'v, 'g>(value: &'v Value<'g>) -> Option<&'v ObjectRef<'g>> {
    match value {
        Value::Reference(Some(object)) => Some(object),
        _ => None,
    }
}
