//! Compilation specimens for a JVM-style virtual machine
//!
//! Each specimen is a tiny method that pins down one piece of behaviour a compiler or VM must
//! preserve: numeric widths, local layout, dispatch, arrays, switches, exceptions, monitors.
//! The crate is split in three:
//!
//!   - [`jvm`] describes classes and members the way a compiler targeting the JVM does
//!   - [`runtime`] links those classes and executes method bodies with JVM semantics
//!   - [`specimens`] is the catalogue itself
//!
//! ```
//! use spin::jvm::class_graph::{ClassGraph, ClassGraphArenas};
//! use spin::runtime::{self, Value, Vm};
//! use spin::specimens::{self, Specimens};
//!
//! # fn run() -> Result<(), spin::jvm::Error> {
//! let arenas = ClassGraphArenas::new();
//! let class_graph = ClassGraph::new(&arenas);
//! let java = class_graph.insert_java_library_types();
//! let spin = Specimens::add_to_graph(&class_graph, &java, &specimens::Settings::default())?;
//! let vm = Vm::link(&java, spin.classes()?, runtime::Settings::default())?;
//!
//! let result = vm.call(spin.members.spin.add_two_static, vec![Value::Int(12), Value::Int(13)]);
//! assert_eq!(result.ok().flatten(), Some(Value::Int(25)));
//! # Ok(())
//! # }
//! # run().unwrap();
//! ```

pub mod jvm;
pub mod runtime;
pub mod specimens;
mod util;
