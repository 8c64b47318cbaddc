//! Semantic representations of classes
//!
//! This is the representation handed to the runtime for linking. The class graph says what
//! classes and members exist; the model pairs each method with its implementation.
//!
//!   - __Class__ is represented using [`Class`]
//!   - __Method__ is represented using [`Method`]
//!
//! In all of these cases, the classes have an `id` field to query the class graph representation.

mod class;
mod method;

pub use class::*;
pub use method::*;
