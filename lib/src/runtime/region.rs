//! Protected regions: `try`, `catch`, and `finally`
//!
//! A region runs a body and then, if the body faulted, the first handler arm whose kind the fault
//! is an instance of. Arms are tried in the order they were declared. Whatever happens, the
//! cleanup clause (if any) runs exactly once afterwards:
//!
//! ```text
//!   Running ─┬─ ok ──────────────────────────────────────┐
//!            └─ fault ─┬─ arm matches ─┬─ arm ok ────────┤ (Handled)
//!                      │               └─ arm faults ────┤ (Propagating)
//!                      └─ no arm matches ────────────────┤ (Propagating)
//!                                                        ▼
//!                                                     Cleanup ─┬─ ok ─ keep outcome
//!                                                              └─ fault ─ Propagating
//! ```
//!
//! Nesting regions gives the outward search for a handler: an inner region that lets a fault
//! propagate hands it to the outer region's arms.

use super::fault::Fault;
use super::Vm;
use crate::jvm::class_graph::{Assignable, ClassId};
use crate::jvm::Name;

/// How a region activation ended
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum RegionExit {
    /// The body completed without faulting
    Normal,

    /// The body faulted and a handler arm completed without faulting
    Handled,

    /// A fault escapes the region
    Propagating,
}

/// Outcome of running a protected region once
#[derive(Debug)]
pub struct Activation<'g, T> {
    pub exit: RegionExit,
    pub result: Result<T, Fault<'g>>,
}

type HandlerArm<'r, 'g, T> = Box<dyn FnOnce(Fault<'g>) -> Result<T, Fault<'g>> + 'r>;
type Cleanup<'r, 'g> = Box<dyn FnOnce() -> Result<(), Fault<'g>> + 'r>;

/// Handler arms and cleanup for a `try` block
pub struct ProtectedRegion<'r, 'g, T> {
    arms: Vec<(ClassId<'g>, HandlerArm<'r, 'g, T>)>,
    cleanup: Option<Cleanup<'r, 'g>>,
}

impl<'r, 'g, T> ProtectedRegion<'r, 'g, T> {
    pub fn new() -> Self {
        ProtectedRegion {
            arms: vec![],
            cleanup: None,
        }
    }

    /// Add a handler arm for faults of this kind (or any subclass)
    pub fn catch(
        mut self,
        kind: ClassId<'g>,
        arm: impl FnOnce(Fault<'g>) -> Result<T, Fault<'g>> + 'r,
    ) -> Self {
        self.arms.push((kind, Box::new(arm)));
        self
    }

    /// Set the cleanup clause
    pub fn finally(mut self, cleanup: impl FnOnce() -> Result<(), Fault<'g>> + 'r) -> Self {
        self.cleanup = Some(Box::new(cleanup));
        self
    }

    /// Run the body inside the region
    pub fn activate(
        self,
        vm: &Vm<'g>,
        body: impl FnOnce() -> Result<T, Fault<'g>>,
    ) -> Activation<'g, T> {
        log::trace!("Entering region with {} handler arms", self.arms.len());

        let (mut exit, mut result) = match body() {
            Ok(value) => (RegionExit::Normal, Ok(value)),
            Err(fault) => {
                let kind = vm.fault_kind(&fault);
                let arm = self
                    .arms
                    .into_iter()
                    .find(|(arm_kind, _)| kind.is_assignable(arm_kind));
                match arm {
                    Some((arm_kind, arm)) => {
                        log::trace!(
                            "Fault {} handled by arm for {}",
                            kind.name.as_str(),
                            arm_kind.name.as_str()
                        );
                        match arm(fault) {
                            Ok(value) => (RegionExit::Handled, Ok(value)),
                            Err(fault) => (RegionExit::Propagating, Err(fault)),
                        }
                    }
                    None => {
                        log::trace!("Fault {} not handled in region", kind.name.as_str());
                        (RegionExit::Propagating, Err(fault))
                    }
                }
            }
        };

        if let Some(cleanup) = self.cleanup {
            log::trace!("Running cleanup after {:?} exit", exit);
            if let Err(fault) = cleanup() {
                log::trace!("Cleanup fault replaces {:?} exit", exit);
                exit = RegionExit::Propagating;
                result = Err(fault);
            }
        }

        Activation { exit, result }
    }

    /// Run the body inside the region, keeping only the result
    pub fn run(
        self,
        vm: &Vm<'g>,
        body: impl FnOnce() -> Result<T, Fault<'g>>,
    ) -> Result<T, Fault<'g>> {
        self.activate(vm, body).result
    }
}

impl<'r, 'g, T> Default for ProtectedRegion<'r, 'g, T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::class_graph::{ClassGraph, ClassGraphArenas};
    use crate::runtime::{RuntimeFault, Settings};
    use std::cell::Cell;

    #[test]
    fn first_matching_arm_in_declaration_order() {
        let arenas = ClassGraphArenas::new();
        let class_graph = ClassGraph::new(&arenas);
        let java = class_graph.insert_java_library_types();
        let lang = java.classes.lang;
        let vm = Vm::link(&java, vec![], Settings::default()).unwrap();

        let activation = ProtectedRegion::new()
            .catch(lang.runtime_exception, |_| Ok("runtime"))
            .catch(lang.null_pointer_exception, |_| Ok("null pointer"))
            .activate(&vm, || Err(RuntimeFault::NullPointer.into()));
        assert_eq!(activation.exit, RegionExit::Handled);
        assert_eq!(activation.result.unwrap(), "runtime");

        let activation = ProtectedRegion::new()
            .catch(lang.arithmetic_exception, |_| Ok(()))
            .activate(&vm, || Err(RuntimeFault::NullPointer.into()));
        assert_eq!(activation.exit, RegionExit::Propagating);
        assert_eq!(
            activation.result.unwrap_err().as_runtime(),
            Some(&RuntimeFault::NullPointer)
        );

        let activation = ProtectedRegion::new()
            .catch(lang.throwable, |_| Ok(1))
            .activate(&vm, || Ok(2));
        assert_eq!(activation.exit, RegionExit::Normal);
        assert_eq!(activation.result.unwrap(), 2);
    }

    #[test]
    fn cleanup_runs_exactly_once() {
        let arenas = ClassGraphArenas::new();
        let class_graph = ClassGraph::new(&arenas);
        let java = class_graph.insert_java_library_types();
        let lang = java.classes.lang;
        let vm = Vm::link(&java, vec![], Settings::default()).unwrap();

        let outcomes: [(Result<(), RuntimeFault>, bool, RegionExit); 4] = [
            (Ok(()), false, RegionExit::Normal),
            (Err(RuntimeFault::ArrayStore), false, RegionExit::Handled),
            (Err(RuntimeFault::NullPointer), false, RegionExit::Propagating),
            (Err(RuntimeFault::ArrayStore), true, RegionExit::Propagating),
        ];
        for (body_result, arm_faults, expected_exit) in outcomes {
            let cleanups = Cell::new(0);
            let activation = ProtectedRegion::new()
                .catch(lang.array_store_exception, |fault| {
                    if arm_faults {
                        Err(fault)
                    } else {
                        Ok(())
                    }
                })
                .finally(|| {
                    cleanups.set(cleanups.get() + 1);
                    Ok(())
                })
                .activate(&vm, || body_result.map_err(Fault::from));
            assert_eq!(activation.exit, expected_exit);
            assert_eq!(cleanups.get(), 1);
        }
    }

    #[test]
    fn cleanup_fault_supersedes() {
        let arenas = ClassGraphArenas::new();
        let class_graph = ClassGraph::new(&arenas);
        let java = class_graph.insert_java_library_types();
        let vm = Vm::link(&java, vec![], Settings::default()).unwrap();

        let result: Result<(), _> = ProtectedRegion::new()
            .finally(|| Err(RuntimeFault::IllegalMonitorState.into()))
            .run(&vm, || Err(RuntimeFault::ArrayStore.into()));
        assert_eq!(
            result.unwrap_err().as_runtime(),
            Some(&RuntimeFault::IllegalMonitorState)
        );

        let activation = ProtectedRegion::new()
            .finally(|| Err(RuntimeFault::IllegalMonitorState.into()))
            .activate(&vm, || Ok(()));
        assert_eq!(activation.exit, RegionExit::Propagating);
    }

    #[test]
    fn nested_regions_search_outward() {
        let arenas = ClassGraphArenas::new();
        let class_graph = ClassGraph::new(&arenas);
        let java = class_graph.insert_java_library_types();
        let lang = java.classes.lang;
        let vm = Vm::link(&java, vec![], Settings::default()).unwrap();

        let inner_ran = Cell::new(false);
        let outer = ProtectedRegion::new()
            .catch(lang.null_pointer_exception, |_| Ok("outer"))
            .activate(&vm, || {
                ProtectedRegion::new()
                    .catch(lang.arithmetic_exception, |_| {
                        inner_ran.set(true);
                        Ok("inner")
                    })
                    .run(&vm, || Err(RuntimeFault::NullPointer.into()))
            });
        assert_eq!(outer.exit, RegionExit::Handled);
        assert_eq!(outer.result.unwrap(), "outer");
        assert!(!inner_ran.get());
    }
}
