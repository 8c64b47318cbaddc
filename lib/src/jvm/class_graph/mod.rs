use super::{
    BinaryName, ClassAccessFlags, FieldAccessFlags, FieldType, MethodAccessFlags,
    MethodDescriptor, Name, RenderDescriptor, UnqualifiedName,
};
use crate::util::RefId;
use elsa::FrozenMap;
use parking_lot::RwLock;
use std::fmt;
use std::fmt::Debug;
use typed_arena::Arena;

mod assignable;
mod java_classes;
mod java_members;

pub use assignable::*;
pub use java_classes::*;
pub use java_members::*;

pub type ClassId<'g> = RefId<'g, ClassData<'g>>;
pub type MethodId<'g> = RefId<'g, MethodData<'g>>;
pub type FieldId<'g> = RefId<'g, FieldData<'g>>;

pub struct ClassGraphArenas<'g> {
    class_arena: Arena<ClassData<'g>>,
    method_arena: Arena<MethodData<'g>>,
    field_arena: Arena<FieldData<'g>>,
}

impl<'g> ClassGraphArenas<'g> {
    pub fn new() -> Self {
        ClassGraphArenas {
            class_arena: Arena::new(),
            method_arena: Arena::new(),
            field_arena: Arena::new(),
        }
    }
}

impl<'g> Default for ClassGraphArenas<'g> {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks the relationships between classes and the members on those classes
///
/// Every class the runtime can instantiate, and every method it can dispatch to, is first
/// declared here. Once declared, classes and members never move, so they are referred to by
/// identity (see [`ClassId`], [`MethodId`], [`FieldId`]).
pub struct ClassGraph<'g> {
    arenas: &'g ClassGraphArenas<'g>,
    classes: FrozenMap<BinaryName, Box<ClassId<'g>>>,
}

impl<'g> ClassGraph<'g> {
    /// New empty graph
    pub fn new(arenas: &'g ClassGraphArenas<'g>) -> Self {
        ClassGraph {
            arenas,
            classes: FrozenMap::new(),
        }
    }

    /// Find a class by its binary name
    pub fn lookup_class(&self, name: &BinaryName) -> Option<ClassId<'g>> {
        self.classes.get(name).copied()
    }

    /// Add a new class to the class graph
    ///
    /// If a class with the same name was already added, the earlier class stays the one found
    /// by [`Self::lookup_class`].
    pub fn add_class(&self, data: ClassData<'g>) -> ClassId<'g> {
        let data: &'g ClassData<'g> = self.arenas.class_arena.alloc(data);
        let class = RefId(data);
        if self.lookup_class(&data.name).is_some() {
            log::warn!("Class {:?} declared twice", data.name);
        } else {
            self.classes.insert(data.name.clone(), Box::new(class));
        }
        class
    }

    /// Add a field to the class graph and to its class
    pub fn add_field(&self, field: FieldData<'g>) -> FieldId<'g> {
        let data: &'g FieldData<'g> = self.arenas.field_arena.alloc(field);
        data.class.fields.write().push(RefId(data));
        RefId(data)
    }

    /// Add a method to the class graph and to its class
    ///
    /// Adding a method with the same name, descriptor, and staticness as one already on the
    /// class returns the existing method.
    pub fn add_method(&self, method: MethodData<'g>) -> MethodId<'g> {
        let existing = method
            .class
            .methods
            .read()
            .iter()
            .find(|m| {
                m.name == method.name
                    && m.descriptor == method.descriptor
                    && m.is_static() == method.is_static()
            })
            .copied();
        match existing {
            Some(m) => m,
            None => {
                let data: &'g MethodData<'g> = self.arenas.method_arena.alloc(method);
                data.class.methods.write().push(RefId(data));
                RefId(data)
            }
        }
    }

    /// Add standard types to the class graph
    pub fn insert_java_library_types(&self) -> JavaLibrary<'g> {
        JavaLibrary::add_to_graph(self)
    }
}

pub struct ClassData<'g> {
    /// Name of the class
    pub name: BinaryName,

    /// Superclass is only ever missing for `java/lang/Object` itself
    pub superclass: Option<ClassId<'g>>,

    /// Access flags
    pub access_flags: ClassAccessFlags,

    /// Methods declared on the class (not including inherited ones)
    pub methods: RwLock<Vec<MethodId<'g>>>,

    /// Fields declared on the class (not including inherited ones)
    pub fields: RwLock<Vec<FieldId<'g>>>,
}

impl<'g> ClassData<'g> {
    pub fn new(
        name: BinaryName,
        superclass: ClassId<'g>,
        access_flags: ClassAccessFlags,
    ) -> ClassData<'g> {
        ClassData {
            name,
            superclass: Some(superclass),
            access_flags,
            methods: RwLock::new(vec![]),
            fields: RwLock::new(vec![]),
        }
    }

    /// Is this class `java/lang/Throwable` or a subclass of it?
    pub fn is_throwable(&self) -> bool {
        let mut next_class = Some(self);
        while let Some(class) = next_class {
            if class.name == BinaryName::THROWABLE {
                return true;
            }
            next_class = class.superclass.map(|superclass| superclass.0);
        }

        false
    }

    /// Method declared on exactly this class
    pub fn declared_method(
        &self,
        name: &UnqualifiedName,
        descriptor: &MethodDescriptor<ClassId<'g>>,
    ) -> Option<MethodId<'g>> {
        self.methods
            .read()
            .iter()
            .find(|method| &method.name == name && &method.descriptor == descriptor)
            .copied()
    }

    /// All methods declared on exactly this class with the given name
    pub fn declared_methods_named(&self, name: &str) -> Vec<MethodId<'g>> {
        self.methods
            .read()
            .iter()
            .filter(|method| method.name.as_str() == name)
            .copied()
            .collect()
    }
}

impl<'g> RefId<'g, ClassData<'g>> {
    /// This class followed by its superclasses, ending at `java/lang/Object`
    pub fn ancestors(self) -> impl Iterator<Item = ClassId<'g>> {
        std::iter::successors(Some(self), |class| class.superclass)
    }
}

impl<'g> RenderDescriptor for ClassData<'g> {
    fn render_to(&self, write_to: &mut String) {
        self.name.render_to(write_to)
    }
}

impl<'g> Debug for ClassData<'g> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name.as_str())
    }
}

/// How a method gets invoked
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum InvokeType {
    /// No receiver (`invokestatic`)
    Static,

    /// Receiver, but resolved against the named class only (`invokespecial`)
    Special,

    /// Receiver, resolved against the receiver's runtime class (`invokevirtual`)
    Virtual,
}

pub struct MethodData<'g> {
    /// Class
    pub class: ClassId<'g>,

    /// Name of the method
    pub name: UnqualifiedName,

    /// Type of the method
    pub descriptor: MethodDescriptor<ClassId<'g>>,

    /// Access flags
    pub access_flags: MethodAccessFlags,
}

impl<'g> Debug for MethodData<'g> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!(
            "{}.{}:{}",
            self.class.name.as_str(),
            self.name.as_str(),
            self.descriptor.render(),
        ))
    }
}

impl<'g> MethodData<'g> {
    pub fn is_static(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::STATIC)
    }

    pub fn is_private(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::PRIVATE)
    }

    /// Methods which are expected to come without an implementation
    pub fn is_bodiless(&self) -> bool {
        self.access_flags
            .intersects(MethodAccessFlags::ABSTRACT | MethodAccessFlags::NATIVE)
    }

    /// Is this a method that takes part in virtual dispatch?
    ///
    /// Static methods, private methods, and constructors are always resolved directly.
    pub fn is_virtual(&self) -> bool {
        !self.is_static() && !self.is_private() && self.name != UnqualifiedName::INIT
    }

    /// With the exception of `invokespecial` vs. `invokevirtual` for `super` calls, there is
    /// usually only one valid way to invoke a method. This function finds it.
    pub fn infer_invoke_type(&self) -> InvokeType {
        if self.is_static() {
            InvokeType::Static
        } else if self.is_virtual() {
            InvokeType::Virtual
        } else {
            InvokeType::Special
        }
    }
}

pub struct FieldData<'g> {
    /// Class
    ///
    /// Note: this is a pointer back to the class
    pub class: ClassId<'g>,

    /// Name of the field
    pub name: UnqualifiedName,

    /// Type of the field
    pub descriptor: FieldType<ClassId<'g>>,

    /// Access flags
    pub access_flags: FieldAccessFlags,
}

impl<'g> FieldData<'g> {
    pub fn is_static(&self) -> bool {
        self.access_flags.contains(FieldAccessFlags::STATIC)
    }
}

impl<'g> Debug for FieldData<'g> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!(
            "{}.{}:{}",
            self.class.name.as_str(),
            self.name.as_str(),
            self.descriptor.render(),
        ))
    }
}
