use crate::jvm::class_graph::ClassId;
use crate::jvm::model::Method;
use crate::jvm::{Error, Name, RenderDescriptor};

/// Semantic representation of a class
pub struct Class<'g> {
    /// The current class
    pub id: ClassId<'g>,

    /// Methods
    ///
    /// Use [`Self::add_method`] for additional validation (like sanity checking that the method
    /// added really does belong on this class)
    pub methods: Vec<Method<'g>>,
}

impl<'g> Class<'g> {
    /// Create a new class
    pub fn new(id: ClassId<'g>) -> Class<'g> {
        Class {
            id,
            methods: vec![],
        }
    }

    /// Add a method to the class
    ///
    /// The method must be declared on this class in the class graph, and may only be added once.
    pub fn add_method(&mut self, method: Method<'g>) -> Result<(), Error> {
        if method.id.class != self.id {
            return Err(Error::MissingMember(format!(
                "{}.{}:{}",
                self.id.name.as_str(),
                method.id.name.as_str(),
                method.id.descriptor.render()
            )));
        }
        if self.methods.iter().any(|m| m.id == method.id) {
            return Err(Error::DuplicateBody(format!("{:?}", method.id)));
        }
        self.methods.push(method);
        Ok(())
    }

    /// Find the implementation of a method on this class
    pub fn method(&self, name: &str) -> Option<&Method<'g>> {
        self.methods.iter().find(|m| m.id.name.as_str() == name)
    }
}
