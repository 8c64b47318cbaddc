use crate::jvm::class_graph::{ClassId, MethodId};
use crate::jvm::LocalsLayout;
use crate::runtime::MethodBody;
use std::fmt;

/// Semantic representation of a method
pub struct Method<'g> {
    /// The current method
    pub id: MethodId<'g>,

    /// Method implementation
    ///
    /// Only `abstract` and `native` methods may leave this empty.
    pub body: Option<MethodBody<'g>>,

    /// Which exceptions can this method throw?
    ///
    /// Note: this does not need to include `RuntimeException`, `Error`, or subclasses
    pub exceptions: Vec<ClassId<'g>>,

    /// Layout of the locals array, if the body declares locals beyond its parameters
    pub locals: Option<LocalsLayout<'g>>,
}

impl<'g> Method<'g> {
    /// Create a new method
    pub fn new(id: MethodId<'g>) -> Method<'g> {
        Method {
            id,
            body: None,
            exceptions: vec![],
            locals: None,
        }
    }

    /// Create a new method with an implementation
    pub fn with_body(id: MethodId<'g>, body: MethodBody<'g>) -> Method<'g> {
        Method {
            id,
            body: Some(body),
            exceptions: vec![],
            locals: None,
        }
    }

    /// Declare the exceptions in the `throws` clause
    pub fn throws(mut self, exceptions: impl IntoIterator<Item = ClassId<'g>>) -> Method<'g> {
        self.exceptions.extend(exceptions);
        self
    }

    /// Use a locals layout with more than just the parameters
    pub fn with_locals(mut self, locals: LocalsLayout<'g>) -> Method<'g> {
        self.locals = Some(locals);
        self
    }
}

impl<'g> fmt::Debug for Method<'g> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("id", &self.id)
            .field("has_body", &self.body.is_some())
            .field("exceptions", &self.exceptions)
            .field("locals", &self.locals)
            .finish()
    }
}
