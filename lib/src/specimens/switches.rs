//! Dense and sparse `switch` statements

use super::{body, Specimens};
use crate::jvm::class_graph::MethodId;
use crate::jvm::model::Method;
use crate::jvm::{Error, Switch};
use crate::runtime::Value;

/// `switch (i) { case 0: return 0; case 1: return 1; case 2: return 2; default: return -1; }`
///
/// The targets here are the values each arm returns.
pub fn choose_near_switch() -> Result<Switch<i32>, Error> {
    Switch::lower(vec![(0, 0), (1, 1), (2, 2)], -1)
}

/// `switch (i) { case -100: return -1; case 0: return 0; case 100: return 1; default: return -1; }`
pub fn choose_far_switch() -> Result<Switch<i32>, Error> {
    Switch::lower(vec![(-100, -1), (0, 0), (100, 1)], -1)
}

impl<'g> Specimens<'g> {
    /// Lowered `switch` in the body of a method, if it has one
    pub fn switch(&self, method: MethodId<'g>) -> Result<Option<Switch<i32>>, Error> {
        let spin = &self.members.spin;
        if method == spin.choose_near {
            choose_near_switch().map(Some)
        } else if method == spin.choose_far {
            choose_far_switch().map(Some)
        } else {
            Ok(None)
        }
    }
}

pub(super) fn methods<'g>(specimens: &Specimens<'g>) -> Result<Vec<Method<'g>>, Error> {
    let spin = &specimens.members.spin;
    let mut methods = vec![];

    for method in [spin.choose_near, spin.choose_far] {
        let switch = match specimens.switch(method)? {
            Some(switch) => switch,
            None => continue,
        };
        log::debug!(
            "{:?} lowered to a {}",
            method,
            if switch.is_table() { "tableswitch" } else { "lookupswitch" }
        );
        methods.push(Method::with_body(
            method,
            body(move |_vm, frame| {
                let key = frame.iload(1)?;
                Ok(Some(Value::Int(*switch.select(key))))
            }),
        ));
    }

    Ok(methods)
}
