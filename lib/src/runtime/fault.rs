use super::heap::ObjectRef;
use crate::jvm::class_graph::{ClassId, LangClasses};
use crate::jvm::Name;
use std::fmt;
use std::sync::Arc;

/// Faults raised by the primitive operations of the runtime
///
/// These correspond to the exceptions the JVM itself throws. They stay unmaterialized (no heap
/// object) unless a handler asks for the value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuntimeFault {
    /// Field access, invocation, monitor, or throw on `null`
    NullPointer,

    /// Array load or store outside of `0..length`
    ArrayIndexOutOfBounds { index: i32, length: usize },

    /// Array allocation with a negative length
    NegativeArraySize(i32),

    /// `monitorexit` by a thread that does not own the monitor
    IllegalMonitorState,

    /// Storing a reference into an array of an incompatible component type
    ArrayStore,

    /// Operand of the wrong kind (the bytecode verifier would have rejected this)
    Verify(String),

    /// Invoking a method with no implementation
    AbstractMethod(String),
}

impl RuntimeFault {
    /// Class of the exception the JVM would throw
    pub fn kind<'g>(&self, lang: &LangClasses<'g>) -> ClassId<'g> {
        match self {
            RuntimeFault::NullPointer => lang.null_pointer_exception,
            RuntimeFault::ArrayIndexOutOfBounds { .. } => lang.array_index_out_of_bounds_exception,
            RuntimeFault::NegativeArraySize(_) => lang.negative_array_size_exception,
            RuntimeFault::IllegalMonitorState => lang.illegal_monitor_state_exception,
            RuntimeFault::ArrayStore => lang.array_store_exception,
            RuntimeFault::Verify(_) => lang.verify_error,
            RuntimeFault::AbstractMethod(_) => lang.abstract_method_error,
        }
    }
}

impl fmt::Display for RuntimeFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeFault::NullPointer => f.write_str("null pointer"),
            RuntimeFault::ArrayIndexOutOfBounds { index, length } => {
                write!(f, "index {} out of bounds for length {}", index, length)
            }
            RuntimeFault::NegativeArraySize(length) => write!(f, "negative array size {}", length),
            RuntimeFault::IllegalMonitorState => f.write_str("current thread is not owner"),
            RuntimeFault::ArrayStore => f.write_str("incompatible array element"),
            RuntimeFault::Verify(msg) => write!(f, "verify error: {}", msg),
            RuntimeFault::AbstractMethod(method) => write!(f, "no implementation for {}", method),
        }
    }
}

/// Abrupt completion of a computation
#[derive(Clone)]
pub enum Fault<'g> {
    /// Raised by the runtime
    Runtime(RuntimeFault),

    /// Raised by an explicit `athrow` (the object is always a `Throwable`)
    Thrown(ObjectRef<'g>),
}

impl<'g> From<RuntimeFault> for Fault<'g> {
    fn from(fault: RuntimeFault) -> Fault<'g> {
        Fault::Runtime(fault)
    }
}

impl<'g> Fault<'g> {
    /// Origin kind of the fault
    pub fn kind(&self, lang: &LangClasses<'g>) -> ClassId<'g> {
        match self {
            Fault::Runtime(fault) => fault.kind(lang),
            Fault::Thrown(object) => object.class_id().unwrap_or(lang.throwable),
        }
    }

    pub fn as_runtime(&self) -> Option<&RuntimeFault> {
        match self {
            Fault::Runtime(fault) => Some(fault),
            Fault::Thrown(_) => None,
        }
    }
}

/// Thrown objects are compared by identity
impl<'g> PartialEq for Fault<'g> {
    fn eq(&self, other: &Fault<'g>) -> bool {
        match (self, other) {
            (Fault::Runtime(fault1), Fault::Runtime(fault2)) => fault1 == fault2,
            (Fault::Thrown(object1), Fault::Thrown(object2)) => Arc::ptr_eq(object1, object2),
            _ => false,
        }
    }
}

impl<'g> fmt::Debug for Fault<'g> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::Runtime(fault) => write!(f, "Runtime({:?})", fault),
            Fault::Thrown(object) => write!(f, "Thrown({:?})", object),
        }
    }
}

impl<'g> fmt::Display for Fault<'g> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::Runtime(fault) => fault.fmt(f),
            Fault::Thrown(object) => match object.class_id() {
                Some(class) => write!(f, "thrown {}", class.name.as_str()),
                None => f.write_str("thrown array"),
            },
        }
    }
}
