use super::array::Array;
use super::fault::RuntimeFault;
use super::monitor::Monitor;
use super::value::{narrow_int, Value};
use crate::jvm::class_graph::ClassId;
use crate::jvm::{BaseType, FieldType, Name, RefType, RenderDescriptor};
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicI32, AtomicI64, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

/// Shared handle to an object on the heap
///
/// Objects are freed once they are no longer reachable from any handle.
pub type ObjectRef<'g> = Arc<HeapObject<'g>>;

/// Instance or array
pub struct HeapObject<'g> {
    class: RefType<ClassId<'g>>,
    body: ObjectBody<'g>,
    monitor: Monitor,
}

pub enum ObjectBody<'g> {
    /// Instance fields, in the layout computed when the class was linked
    Instance(Vec<FieldSlot<'g>>),
    Array(Array<'g>),
}

impl<'g> HeapObject<'g> {
    /// Allocate an instance with every field set to the zero of its type
    pub fn new_instance(class: ClassId<'g>, layout: &[FieldType<ClassId<'g>>]) -> ObjectRef<'g> {
        Arc::new(HeapObject {
            class: RefType::Object(class),
            body: ObjectBody::Instance(layout.iter().map(FieldSlot::new).collect()),
            monitor: Monitor::new(),
        })
    }

    /// Allocate a one dimensional array (`newarray`, `anewarray`)
    pub fn new_array(
        component: FieldType<ClassId<'g>>,
        length: i32,
    ) -> Result<ObjectRef<'g>, RuntimeFault> {
        let array = Array::new(component, length)?;
        Ok(Arc::new(HeapObject {
            class: RefType::array(component),
            body: ObjectBody::Array(array),
            monitor: Monitor::new(),
        }))
    }

    /// Allocate the leading dimensions of a multi-dimensional array (`multianewarray`)
    ///
    /// Only as many dimensions as there are lengths are created. When there are fewer lengths
    /// than dimensions, the innermost created arrays are left full of `null`.
    pub fn new_multi_array(
        array_type: &RefType<ClassId<'g>>,
        lengths: &[i32],
    ) -> Result<ObjectRef<'g>, RuntimeFault> {
        if lengths.is_empty() || lengths.len() > array_type.dimensions() {
            return Err(RuntimeFault::Verify(format!(
                "{} lengths for {}",
                lengths.len(),
                array_type.render()
            )));
        }
        if let Some(negative) = lengths.iter().find(|length| **length < 0) {
            return Err(RuntimeFault::NegativeArraySize(*negative));
        }
        HeapObject::new_nested_array(array_type, lengths)
    }

    fn new_nested_array(
        array_type: &RefType<ClassId<'g>>,
        lengths: &[i32],
    ) -> Result<ObjectRef<'g>, RuntimeFault> {
        let component = array_type.component_type().ok_or_else(|| {
            RuntimeFault::Verify(format!("{} is not an array type", array_type.render()))
        })?;
        let outer = HeapObject::new_array(component, lengths[0])?;
        if let (FieldType::Ref(inner_type), [_, inner_lengths @ ..]) = (&component, lengths) {
            if !inner_lengths.is_empty() {
                let array = outer.as_array()?;
                for index in 0..lengths[0] {
                    let inner = HeapObject::new_nested_array(inner_type, inner_lengths)?;
                    array.store(index, Value::from(inner))?;
                }
            }
        }
        Ok(outer)
    }

    /// Runtime type of the object
    pub fn class(&self) -> &RefType<ClassId<'g>> {
        &self.class
    }

    /// Runtime class, if this is not an array
    pub fn class_id(&self) -> Option<ClassId<'g>> {
        match self.class {
            RefType::Object(class) => Some(class),
            _ => None,
        }
    }

    pub fn monitor(&self) -> &Monitor {
        &self.monitor
    }

    /// Instance field slot at a linked offset
    pub fn field(&self, offset: usize) -> Result<&FieldSlot<'g>, RuntimeFault> {
        match &self.body {
            ObjectBody::Instance(fields) => fields.get(offset).ok_or_else(|| {
                RuntimeFault::Verify(format!("{:?} has no field at offset {}", self, offset))
            }),
            ObjectBody::Array(_) => Err(RuntimeFault::Verify(format!(
                "{:?} is an array, not an instance",
                self
            ))),
        }
    }

    pub fn as_array(&self) -> Result<&Array<'g>, RuntimeFault> {
        match &self.body {
            ObjectBody::Array(array) => Ok(array),
            ObjectBody::Instance(_) => Err(RuntimeFault::Verify(format!(
                "{:?} is not an array",
                self
            ))),
        }
    }
}

impl<'g> fmt::Debug for HeapObject<'g> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.class {
            RefType::Object(class) => write!(f, "{}@{:p}", class.name.as_str(), self),
            array_type => write!(f, "{}@{:p}", array_type.render(), self),
        }
    }
}

/// Storage for one instance field
///
/// Each slot is individually atomic, so an instance shared between threads never tears a
/// value. Sub-`int` fields remember their declared type so stores can narrow.
pub enum FieldSlot<'g> {
    Int(BaseType, AtomicI32),
    Long(AtomicI64),
    Float(AtomicU32),
    Double(AtomicU64),
    Reference(RwLock<Option<ObjectRef<'g>>>),
}

impl<'g> FieldSlot<'g> {
    pub fn new(field_type: &FieldType<ClassId<'g>>) -> FieldSlot<'g> {
        match field_type {
            FieldType::Base(BaseType::Long) => FieldSlot::Long(AtomicI64::new(0)),
            FieldType::Base(BaseType::Float) => FieldSlot::Float(AtomicU32::new(0.0f32.to_bits())),
            FieldType::Base(BaseType::Double) => {
                FieldSlot::Double(AtomicU64::new(0.0f64.to_bits()))
            }
            FieldType::Base(base_type) => FieldSlot::Int(*base_type, AtomicI32::new(0)),
            FieldType::Ref(_) => FieldSlot::Reference(RwLock::new(None)),
        }
    }

    /// `getfield`
    pub fn load(&self) -> Value<'g> {
        match self {
            FieldSlot::Int(_, value) => Value::Int(value.load(Ordering::Acquire)),
            FieldSlot::Long(value) => Value::Long(value.load(Ordering::Acquire)),
            FieldSlot::Float(bits) => Value::Float(f32::from_bits(bits.load(Ordering::Acquire))),
            FieldSlot::Double(bits) => {
                Value::Double(f64::from_bits(bits.load(Ordering::Acquire)))
            }
            FieldSlot::Reference(value) => Value::Reference(value.read().clone()),
        }
    }

    /// `putfield`
    pub fn store(&self, value: Value<'g>) -> Result<(), RuntimeFault> {
        match (self, value) {
            (FieldSlot::Int(base_type, slot), Value::Int(value)) => {
                slot.store(narrow_int(*base_type, value), Ordering::Release)
            }
            (FieldSlot::Long(slot), Value::Long(value)) => slot.store(value, Ordering::Release),
            (FieldSlot::Float(slot), Value::Float(value)) => {
                slot.store(value.to_bits(), Ordering::Release)
            }
            (FieldSlot::Double(slot), Value::Double(value)) => {
                slot.store(value.to_bits(), Ordering::Release)
            }
            (FieldSlot::Reference(slot), Value::Reference(value)) => *slot.write() = value,
            (_, value) => {
                return Err(RuntimeFault::Verify(format!(
                    "cannot store {} into {} field",
                    value.kind(),
                    self.load().kind()
                )))
            }
        }
        Ok(())
    }

    /// Return the current value and add one to the stored value, as one indivisible step
    ///
    /// Only `int` and `long` fields can be advanced, and both wrap on overflow.
    pub fn read_and_advance(&self) -> Result<Value<'g>, RuntimeFault> {
        match self {
            FieldSlot::Long(slot) => Ok(Value::Long(slot.fetch_add(1, Ordering::AcqRel))),
            FieldSlot::Int(BaseType::Int, slot) => {
                Ok(Value::Int(slot.fetch_add(1, Ordering::AcqRel)))
            }
            _ => Err(RuntimeFault::Verify(format!(
                "cannot advance a {} field",
                self.load().kind()
            ))),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::class_graph::{ClassGraph, ClassGraphArenas};
    use crate::jvm::ArrayType;

    #[test]
    fn instance_fields() {
        let arenas = ClassGraphArenas::new();
        let class_graph = ClassGraph::new(&arenas);
        let java = class_graph.insert_java_library_types();
        let object = java.classes.lang.object;

        let instance = HeapObject::new_instance(
            object,
            &[
                FieldType::int(),
                FieldType::long(),
                FieldType::short(),
                FieldType::object(object),
                FieldType::double(),
            ],
        );
        assert_eq!(instance.class_id(), Some(object));
        assert_eq!(instance.field(0).unwrap().load(), Value::Int(0));
        assert_eq!(instance.field(1).unwrap().load(), Value::Long(0));
        assert_eq!(instance.field(3).unwrap().load(), Value::NULL);
        assert_eq!(instance.field(4).unwrap().load(), Value::Double(0.0));
        assert!(instance.field(5).is_err());
        assert!(instance.as_array().is_err());

        let short = instance.field(2).unwrap();
        short.store(Value::Int(32768)).unwrap();
        assert_eq!(short.load(), Value::Int(-32768));
        assert!(short.read_and_advance().is_err());
        assert!(short.store(Value::Long(1)).is_err());

        let field = instance.field(3).unwrap();
        field.store(Value::from(instance.clone())).unwrap();
        assert_eq!(field.load(), Value::from(instance.clone()));
        field.store(Value::NULL).unwrap();
    }

    #[test]
    fn counters_wrap() {
        let counter: FieldSlot = FieldSlot::new(&FieldType::long());
        for expected in 0..3 {
            assert_eq!(counter.read_and_advance().unwrap(), Value::Long(expected));
        }
        assert_eq!(counter.load(), Value::Long(3));

        counter.store(Value::Long(i64::MAX)).unwrap();
        assert_eq!(counter.read_and_advance().unwrap(), Value::Long(i64::MAX));
        assert_eq!(counter.load(), Value::Long(i64::MIN));
    }

    #[test]
    fn multi_arrays_with_elided_dimensions() {
        let arenas = ClassGraphArenas::new();
        let class_graph = ClassGraph::new(&arenas);
        class_graph.insert_java_library_types();

        // int[2][3][]
        let array_type: RefType<ClassId> = RefType::PrimitiveArray(ArrayType {
            additional_dimensions: 2,
            element_type: BaseType::Int,
        });
        let grid = HeapObject::new_multi_array(&array_type, &[2, 3]).unwrap();
        assert_eq!(grid.class(), &array_type);
        let outer = grid.as_array().unwrap();
        assert_eq!(outer.len(), 2);
        for i in 0..2 {
            let middle = match outer.load(i).unwrap() {
                Value::Reference(Some(middle)) => middle,
                other => panic!("expected an array, got {:?}", other),
            };
            let middle_array = middle.as_array().unwrap();
            assert_eq!(middle_array.len(), 3);
            for j in 0..3 {
                assert_eq!(middle_array.load(j).unwrap(), Value::NULL);
            }
        }

        assert!(matches!(
            HeapObject::new_multi_array(&array_type, &[2, -1]),
            Err(RuntimeFault::NegativeArraySize(-1))
        ));
        assert!(matches!(
            HeapObject::new_multi_array(&array_type, &[1, 1, 1, 1]),
            Err(RuntimeFault::Verify(_))
        ));
    }
}
