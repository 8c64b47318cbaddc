use super::fault::RuntimeFault;
use super::heap::ObjectRef;
use super::value::Value;
use crate::jvm::class_graph::MethodId;
use crate::jvm::{LocalsLayout, RenderDescriptor};
use crate::util::Width;

/// Locals array of one method activation
///
/// Slots hold `None` until written, and the second half of a `long` or `double` is always
/// `None` (the verifier's `top`).
pub struct Frame<'g> {
    method: MethodId<'g>,
    locals: Vec<Option<Value<'g>>>,
}

impl<'g> Frame<'g> {
    /// Set up the locals for an invocation, with the receiver and arguments in their slots
    pub fn new(
        method: MethodId<'g>,
        layout: &LocalsLayout<'g>,
        arguments: Vec<Value<'g>>,
    ) -> Result<Frame<'g>, RuntimeFault> {
        let mut frame = Frame {
            method,
            locals: vec![None; layout.max_locals() as usize],
        };

        let expected = layout.parameter_slots().count();
        if arguments.len() != expected {
            return Err(RuntimeFault::Verify(format!(
                "{:?} expects {} arguments but got {}",
                method,
                expected,
                arguments.len()
            )));
        }
        for ((slot, field_type), argument) in layout.parameter_slots().zip(arguments) {
            if !argument.fits(&field_type) {
                return Err(RuntimeFault::Verify(format!(
                    "{:?} expects {} in slot {} but got {}",
                    method,
                    field_type.render(),
                    slot,
                    argument.kind()
                )));
            }
            frame.store(slot, argument)?;
        }

        Ok(frame)
    }

    pub fn method(&self) -> MethodId<'g> {
        self.method
    }

    pub fn max_locals(&self) -> usize {
        self.locals.len()
    }

    fn load(&self, slot: u16) -> Result<&Value<'g>, RuntimeFault> {
        match self.locals.get(slot as usize) {
            Some(Some(value)) => Ok(value),
            Some(None) => Err(self.verify(format!("slot {} is not initialized", slot))),
            None => Err(self.verify(format!("slot {} is out of range", slot))),
        }
    }

    fn store(&mut self, slot: u16, value: Value<'g>) -> Result<(), RuntimeFault> {
        let slot = slot as usize;
        let width = value.width();
        if slot + width > self.locals.len() {
            return Err(self.verify(format!("slot {} is out of range", slot)));
        }

        // Overwriting the second half of a wide value invalidates the whole thing
        if slot > 0 {
            if let Some(Value::Long(_) | Value::Double(_)) = self.locals[slot - 1] {
                self.locals[slot - 1] = None;
            }
        }
        self.locals[slot] = Some(value);
        if width == 2 {
            self.locals[slot + 1] = None;
        }
        Ok(())
    }

    fn verify(&self, msg: String) -> RuntimeFault {
        RuntimeFault::Verify(format!("{:?}: {}", self.method, msg))
    }

    pub fn iload(&self, slot: u16) -> Result<i32, RuntimeFault> {
        match self.load(slot)? {
            Value::Int(value) => Ok(*value),
            other => Err(self.verify(format!("iload of {} in slot {}", other.kind(), slot))),
        }
    }

    pub fn lload(&self, slot: u16) -> Result<i64, RuntimeFault> {
        match self.load(slot)? {
            Value::Long(value) => Ok(*value),
            other => Err(self.verify(format!("lload of {} in slot {}", other.kind(), slot))),
        }
    }

    pub fn dload(&self, slot: u16) -> Result<f64, RuntimeFault> {
        match self.load(slot)? {
            Value::Double(value) => Ok(*value),
            other => Err(self.verify(format!("dload of {} in slot {}", other.kind(), slot))),
        }
    }

    pub fn aload(&self, slot: u16) -> Result<Value<'g>, RuntimeFault> {
        match self.load(slot)? {
            reference @ Value::Reference(_) => Ok(reference.clone()),
            other => Err(self.verify(format!("aload of {} in slot {}", other.kind(), slot))),
        }
    }

    /// Receiver of an instance method (`aload_0`)
    ///
    /// The runtime never invokes an instance method with a `null` receiver, so this is only
    /// `None` if slot 0 was overwritten.
    pub fn this(&self) -> Result<ObjectRef<'g>, RuntimeFault> {
        match self.aload(0)? {
            Value::Reference(Some(object)) => Ok(object),
            _ => Err(RuntimeFault::NullPointer),
        }
    }

    pub fn istore(&mut self, slot: u16, value: i32) -> Result<(), RuntimeFault> {
        self.store(slot, Value::Int(value))
    }

    pub fn lstore(&mut self, slot: u16, value: i64) -> Result<(), RuntimeFault> {
        self.store(slot, Value::Long(value))
    }

    pub fn dstore(&mut self, slot: u16, value: f64) -> Result<(), RuntimeFault> {
        self.store(slot, Value::Double(value))
    }

    pub fn astore(&mut self, slot: u16, value: Value<'g>) -> Result<(), RuntimeFault> {
        match value {
            Value::Reference(_) => self.store(slot, value),
            other => Err(self.verify(format!("astore of {} in slot {}", other.kind(), slot))),
        }
    }

    /// Add a constant to an `int` local, wrapping on overflow
    pub fn iinc(&mut self, slot: u16, increment: i32) -> Result<(), RuntimeFault> {
        let value = self.iload(slot)?;
        self.istore(slot, value.wrapping_add(increment))
    }
}

/// Number of slots the value takes in a locals array
impl<'g> Width for Value<'g> {
    fn width(&self) -> usize {
        match self {
            Value::Long(_) | Value::Double(_) => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::class_graph::{ClassData, ClassGraph, ClassGraphArenas, MethodData};
    use crate::jvm::{
        BinaryName, ClassAccessFlags, FieldType, MethodAccessFlags, MethodDescriptor,
        UnqualifiedName,
    };
    use crate::runtime::HeapObject;

    #[test]
    fn arguments_and_locals() {
        let arenas = ClassGraphArenas::new();
        let class_graph = ClassGraph::new(&arenas);
        let java = class_graph.insert_java_library_types();
        let spin = class_graph.add_class(ClassData::new(
            BinaryName::from_str_unsafe("Spin"),
            java.classes.lang.object,
            ClassAccessFlags::SUPER,
        ));
        let double_locals = class_graph.add_method(MethodData {
            class: spin,
            name: UnqualifiedName::from_str_unsafe("doubleLocals"),
            descriptor: MethodDescriptor {
                parameters: vec![FieldType::double(), FieldType::double()],
                return_type: Some(FieldType::double()),
            },
            access_flags: MethodAccessFlags::PUBLIC,
        });

        let mut layout = LocalsLayout::for_method(&double_locals).unwrap();
        let counter = layout.declare(FieldType::int()).unwrap();
        assert_eq!(counter, 5);

        let receiver = HeapObject::new_instance(spin, &[]);
        let mut frame = Frame::new(
            double_locals,
            &layout,
            vec![Value::from(receiver.clone()), Value::Double(1.5), Value::Double(2.0)],
        )
        .unwrap();
        assert_eq!(frame.max_locals(), 6);
        assert!(std::sync::Arc::ptr_eq(&frame.this().unwrap(), &receiver));
        assert_eq!(frame.dload(1).unwrap(), 1.5);
        assert_eq!(frame.dload(3).unwrap(), 2.0);
        assert!(frame.iload(2).is_err(), "second half of a double");
        assert!(frame.iload(counter).is_err(), "not yet initialized");

        frame.istore(counter, i32::MAX).unwrap();
        frame.iinc(counter, 1).unwrap();
        assert_eq!(frame.iload(counter).unwrap(), i32::MIN);

        // Clobbering the second half of `d2` invalidates it
        frame.istore(4, 7).unwrap();
        assert!(frame.dload(3).is_err());
        assert_eq!(frame.iload(4).unwrap(), 7);

        assert!(frame.lstore(counter, 1).is_err(), "no room for a wide value");
        assert!(frame.astore(1, Value::Int(1)).is_err());
    }

    #[test]
    fn argument_checks() {
        let arenas = ClassGraphArenas::new();
        let class_graph = ClassGraph::new(&arenas);
        let java = class_graph.insert_java_library_types();
        let add_two_static = class_graph.add_method(MethodData {
            class: java.classes.lang.object,
            name: UnqualifiedName::from_str_unsafe("addTwoStatic"),
            descriptor: MethodDescriptor {
                parameters: vec![FieldType::int(), FieldType::int()],
                return_type: Some(FieldType::int()),
            },
            access_flags: MethodAccessFlags::STATIC,
        });
        let layout = LocalsLayout::for_method(&add_two_static).unwrap();

        assert!(Frame::new(add_two_static, &layout, vec![Value::Int(1), Value::Int(2)]).is_ok());
        assert!(matches!(
            Frame::new(add_two_static, &layout, vec![Value::Int(1)]),
            Err(RuntimeFault::Verify(_))
        ));
        assert!(matches!(
            Frame::new(add_two_static, &layout, vec![Value::Int(1), Value::Long(2)]),
            Err(RuntimeFault::Verify(_))
        ));
    }
}
