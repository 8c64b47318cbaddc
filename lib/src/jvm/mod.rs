//! Describe JVM classes and their members
//!
//! The specimens are declared here exactly as a compiler targeting the JVM would declare them:
//! a [`class_graph::ClassGraph`] records every class, field, and method along with their
//! descriptors and access flags, and [`model::Class`] attaches implementations.
//!
//! ### Simple example
//!
//! Consider the following class:
//!
//! ```java,ignore,no_run
//! public class Point {
//!     public int x;
//!
//!     public int getX() {
//!         return x;
//!     }
//! }
//! ```
//!
//! Declaring the analogous class in the class graph can be done as follows:
//!
//! ```
//! use spin::jvm::class_graph::*;
//! use spin::jvm::*;
//!
//! let class_graph_arenas = ClassGraphArenas::new();
//! let class_graph = ClassGraph::new(&class_graph_arenas);
//! let java = class_graph.insert_java_library_types();
//!
//! let class = class_graph.add_class(ClassData::new(
//!     BinaryName::from_string(String::from("me/alec/Point")).unwrap(),
//!     java.classes.lang.object,
//!     ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER,
//! ));
//! let field_x = class_graph.add_field(FieldData {
//!     class,
//!     name: UnqualifiedName::from_string(String::from("x")).unwrap(),
//!     descriptor: FieldType::int(),
//!     access_flags: FieldAccessFlags::PUBLIC,
//! });
//! let get_x = class_graph.add_method(MethodData {
//!     class,
//!     name: UnqualifiedName::from_string(String::from("getX")).unwrap(),
//!     descriptor: MethodDescriptor {
//!         parameters: vec![],
//!         return_type: Some(FieldType::int()),
//!     },
//!     access_flags: MethodAccessFlags::PUBLIC,
//! });
//!
//! assert_eq!(get_x.descriptor.render(), "()I");
//! assert_eq!(get_x.infer_invoke_type(), InvokeType::Virtual);
//! assert_eq!(class.fields.read().len(), 1);
//! # let _ = field_x;
//! ```

mod access_flags;
pub mod class_graph;
mod descriptors;
mod errors;
mod locals;
pub mod model;
mod names;
mod switch;

pub use access_flags::*;
pub use class_graph::InvokeType;
pub use descriptors::*;
pub use errors::*;
pub use locals::*;
pub use names::*;
pub use switch::*;
