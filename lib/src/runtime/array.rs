use super::fault::RuntimeFault;
use super::heap::ObjectRef;
use super::value::{narrow_int, Value};
use crate::jvm::class_graph::{Assignable, ClassId};
use crate::jvm::{BaseType, FieldType};
use parking_lot::RwLock;

/// Fixed-length sequence of elements of one component type
pub struct Array<'g> {
    component: FieldType<ClassId<'g>>,
    elements: RwLock<ArrayElements<'g>>,
}

/// Element storage, specialized to the component type
///
/// `boolean[]` shares `byte` storage, as it does in the JVM (`baload`/`bastore`).
pub enum ArrayElements<'g> {
    Byte(Vec<i8>),
    Char(Vec<u16>),
    Short(Vec<i16>),
    Int(Vec<i32>),
    Long(Vec<i64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    Reference(Vec<Option<ObjectRef<'g>>>),
}

impl<'g> ArrayElements<'g> {
    fn len(&self) -> usize {
        match self {
            ArrayElements::Byte(elements) => elements.len(),
            ArrayElements::Char(elements) => elements.len(),
            ArrayElements::Short(elements) => elements.len(),
            ArrayElements::Int(elements) => elements.len(),
            ArrayElements::Long(elements) => elements.len(),
            ArrayElements::Float(elements) => elements.len(),
            ArrayElements::Double(elements) => elements.len(),
            ArrayElements::Reference(elements) => elements.len(),
        }
    }
}

impl<'g> Array<'g> {
    /// Allocate an array with every element set to the zero of the component type
    pub fn new(component: FieldType<ClassId<'g>>, length: i32) -> Result<Array<'g>, RuntimeFault> {
        if length < 0 {
            return Err(RuntimeFault::NegativeArraySize(length));
        }
        let length = length as usize;
        let elements = match component {
            FieldType::Base(BaseType::Byte | BaseType::Boolean) => {
                ArrayElements::Byte(vec![0; length])
            }
            FieldType::Base(BaseType::Char) => ArrayElements::Char(vec![0; length]),
            FieldType::Base(BaseType::Short) => ArrayElements::Short(vec![0; length]),
            FieldType::Base(BaseType::Int) => ArrayElements::Int(vec![0; length]),
            FieldType::Base(BaseType::Long) => ArrayElements::Long(vec![0; length]),
            FieldType::Base(BaseType::Float) => ArrayElements::Float(vec![0.0; length]),
            FieldType::Base(BaseType::Double) => ArrayElements::Double(vec![0.0; length]),
            FieldType::Ref(_) => ArrayElements::Reference(vec![None; length]),
        };
        Ok(Array {
            component,
            elements: RwLock::new(elements),
        })
    }

    pub fn component_type(&self) -> FieldType<ClassId<'g>> {
        self.component
    }

    pub fn len(&self) -> usize {
        self.elements.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read an element (`*aload`)
    pub fn load(&self, index: i32) -> Result<Value<'g>, RuntimeFault> {
        let elements = self.elements.read();
        let index = check_index(index, elements.len())?;
        Ok(match &*elements {
            ArrayElements::Byte(elements) => Value::Int(elements[index] as i32),
            ArrayElements::Char(elements) => Value::Int(elements[index] as i32),
            ArrayElements::Short(elements) => Value::Int(elements[index] as i32),
            ArrayElements::Int(elements) => Value::Int(elements[index]),
            ArrayElements::Long(elements) => Value::Long(elements[index]),
            ArrayElements::Float(elements) => Value::Float(elements[index]),
            ArrayElements::Double(elements) => Value::Double(elements[index]),
            ArrayElements::Reference(elements) => Value::Reference(elements[index].clone()),
        })
    }

    /// Write an element (`*astore`)
    ///
    /// Integral values are narrowed to the component type. References must be assignable to
    /// the component type.
    pub fn store(&self, index: i32, value: Value<'g>) -> Result<(), RuntimeFault> {
        let mut elements = self.elements.write();
        let index = check_index(index, elements.len())?;
        match (&mut *elements, value) {
            (ArrayElements::Byte(elements), Value::Int(value)) => {
                let value = match self.component {
                    FieldType::Base(BaseType::Boolean) => narrow_int(BaseType::Boolean, value),
                    _ => value,
                };
                elements[index] = value as i8;
            }
            (ArrayElements::Char(elements), Value::Int(value)) => elements[index] = value as u16,
            (ArrayElements::Short(elements), Value::Int(value)) => elements[index] = value as i16,
            (ArrayElements::Int(elements), Value::Int(value)) => elements[index] = value,
            (ArrayElements::Long(elements), Value::Long(value)) => elements[index] = value,
            (ArrayElements::Float(elements), Value::Float(value)) => elements[index] = value,
            (ArrayElements::Double(elements), Value::Double(value)) => elements[index] = value,
            (ArrayElements::Reference(elements), Value::Reference(value)) => {
                if let (Some(object), FieldType::Ref(component)) = (&value, &self.component) {
                    if !object.class().is_assignable(component) {
                        return Err(RuntimeFault::ArrayStore);
                    }
                }
                elements[index] = value;
            }
            (_, value) => {
                return Err(RuntimeFault::Verify(format!(
                    "cannot store {} into array of {:?}",
                    value.kind(),
                    self.component
                )))
            }
        }
        Ok(())
    }
}

fn check_index(index: i32, length: usize) -> Result<usize, RuntimeFault> {
    if index < 0 || index as usize >= length {
        Err(RuntimeFault::ArrayIndexOutOfBounds { index, length })
    } else {
        Ok(index as usize)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_filled_and_bounds_checked() {
        for length in [0, 1, 100] {
            let array = Array::new(FieldType::int(), length).unwrap();
            assert_eq!(array.len(), length as usize);
            for index in 0..length {
                assert_eq!(array.load(index).unwrap(), Value::Int(0));
            }
            assert_eq!(
                array.load(-1).unwrap_err(),
                RuntimeFault::ArrayIndexOutOfBounds {
                    index: -1,
                    length: length as usize
                }
            );
            assert_eq!(
                array.load(length).unwrap_err(),
                RuntimeFault::ArrayIndexOutOfBounds {
                    index: length,
                    length: length as usize
                }
            );
            assert!(array.store(length, Value::Int(1)).is_err());
        }
    }

    #[test]
    fn zeros_per_component() {
        let doubles = Array::new(FieldType::double(), 2).unwrap();
        assert_eq!(doubles.load(1).unwrap(), Value::Double(0.0));
        let longs = Array::new(FieldType::long(), 2).unwrap();
        assert_eq!(longs.load(0).unwrap(), Value::Long(0));
        let chars = Array::new(FieldType::char(), 1).unwrap();
        assert_eq!(chars.load(0).unwrap(), Value::Int(0));
    }

    #[test]
    fn narrowing_stores() {
        let shorts = Array::new(FieldType::short(), 1).unwrap();
        shorts.store(0, Value::Int(40000)).unwrap();
        assert_eq!(shorts.load(0).unwrap(), Value::Int(40000 - 65536));

        let chars = Array::new(FieldType::char(), 1).unwrap();
        chars.store(0, Value::Int(-1)).unwrap();
        assert_eq!(chars.load(0).unwrap(), Value::Int(65535));

        let booleans = Array::new(FieldType::boolean(), 1).unwrap();
        booleans.store(0, Value::Int(3)).unwrap();
        assert_eq!(booleans.load(0).unwrap(), Value::Int(1));
    }

    #[test]
    fn wrong_kinds_and_lengths() {
        assert_eq!(
            Array::new(FieldType::int(), -5).err(),
            Some(RuntimeFault::NegativeArraySize(-5))
        );
        let ints = Array::new(FieldType::int(), 1).unwrap();
        assert!(matches!(
            ints.store(0, Value::Long(1)),
            Err(RuntimeFault::Verify(_))
        ));
    }
}
