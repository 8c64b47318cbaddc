use super::heap::ObjectRef;
use crate::jvm::{BaseType, FieldType};
use std::fmt;
use std::sync::Arc;

/// Value on the operand stack or in a local variable
///
/// Sub-`int` kinds (`byte`, `char`, `short`, `boolean`) are carried as [`Value::Int`], the same
/// way the JVM does. They are narrowed only when stored into a field or array element.
#[derive(Clone)]
pub enum Value<'g> {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),

    /// Object or array reference (`None` is `null`)
    Reference(Option<ObjectRef<'g>>),
}

impl<'g> Value<'g> {
    pub const NULL: Value<'g> = Value::Reference(None);

    /// Default value for a field or array element of this type
    pub fn zero<C>(field_type: &FieldType<C>) -> Value<'g> {
        match field_type {
            FieldType::Base(BaseType::Long) => Value::Long(0),
            FieldType::Base(BaseType::Float) => Value::Float(0.0),
            FieldType::Base(BaseType::Double) => Value::Double(0.0),
            FieldType::Base(_) => Value::Int(0),
            FieldType::Ref(_) => Value::Reference(None),
        }
    }

    /// Check that the value can be held in a location of this type
    ///
    /// This only checks the stack kind. Reference types are checked separately (where it
    /// matters) since that needs the class hierarchy.
    pub fn fits<C>(&self, field_type: &FieldType<C>) -> bool {
        matches!(
            (self, field_type),
            (
                Value::Int(_),
                FieldType::Base(
                    BaseType::Int
                        | BaseType::Short
                        | BaseType::Byte
                        | BaseType::Char
                        | BaseType::Boolean
                )
            ) | (Value::Long(_), FieldType::Base(BaseType::Long))
                | (Value::Float(_), FieldType::Base(BaseType::Float))
                | (Value::Double(_), FieldType::Base(BaseType::Double))
                | (Value::Reference(_), FieldType::Ref(_))
        )
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Reference(None))
    }

    /// Name of the stack kind, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Reference(_) => "reference",
        }
    }
}

impl<'g> From<ObjectRef<'g>> for Value<'g> {
    fn from(object: ObjectRef<'g>) -> Value<'g> {
        Value::Reference(Some(object))
    }
}

/// References are equal when they point at the same object
impl<'g> PartialEq for Value<'g> {
    fn eq(&self, other: &Value<'g>) -> bool {
        match (self, other) {
            (Value::Int(i1), Value::Int(i2)) => i1 == i2,
            (Value::Long(l1), Value::Long(l2)) => l1 == l2,
            (Value::Float(f1), Value::Float(f2)) => f1 == f2,
            (Value::Double(d1), Value::Double(d2)) => d1 == d2,
            (Value::Reference(None), Value::Reference(None)) => true,
            (Value::Reference(Some(o1)), Value::Reference(Some(o2))) => Arc::ptr_eq(o1, o2),
            _ => false,
        }
    }
}

impl<'g> fmt::Debug for Value<'g> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Long(l) => write!(f, "{}L", l),
            Value::Float(x) => write!(f, "{:?}f", x),
            Value::Double(d) => write!(f, "{:?}", d),
            Value::Reference(None) => f.write_str("null"),
            Value::Reference(Some(object)) => write!(f, "{:?}", object),
        }
    }
}

/// Truncate an `int` to the width of a smaller integral type, as stores into fields and arrays do
pub fn narrow_int(base_type: BaseType, value: i32) -> i32 {
    match base_type {
        BaseType::Byte => value as i8 as i32,
        BaseType::Char => value as u16 as i32,
        BaseType::Short => value as i16 as i32,
        BaseType::Boolean => value & 1,
        _ => value,
    }
}

/// `dcmpl`: compare two doubles, producing `-1` if either is NaN
pub fn dcmpl(value1: f64, value2: f64) -> i32 {
    if value1 > value2 {
        1
    } else if value1 == value2 {
        0
    } else {
        -1
    }
}

/// `dcmpg`: compare two doubles, producing `1` if either is NaN
pub fn dcmpg(value1: f64, value2: f64) -> i32 {
    if value1 < value2 {
        -1
    } else if value1 == value2 {
        0
    } else {
        1
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn zeros() {
        assert_eq!(Value::zero::<()>(&FieldType::int()), Value::Int(0));
        assert_eq!(Value::zero::<()>(&FieldType::short()), Value::Int(0));
        assert_eq!(Value::zero::<()>(&FieldType::long()), Value::Long(0));
        assert_eq!(Value::zero::<()>(&FieldType::double()), Value::Double(0.0));
        assert_eq!(Value::zero::<()>(&FieldType::object(())), Value::NULL);
        assert!(matches!(
            Value::zero::<()>(&FieldType::double()),
            Value::Double(d) if d.is_sign_positive()
        ));
    }

    #[test]
    fn kinds_fit() {
        assert!(Value::Int(1).fits::<()>(&FieldType::char()));
        assert!(Value::Int(1).fits::<()>(&FieldType::boolean()));
        assert!(!Value::Int(1).fits::<()>(&FieldType::long()));
        assert!(!Value::Long(1).fits::<()>(&FieldType::int()));
        assert!(Value::NULL.fits::<()>(&FieldType::object(())));
        assert!(!Value::NULL.fits::<()>(&FieldType::double()));
    }

    #[test]
    fn narrowing() {
        assert_eq!(narrow_int(BaseType::Short, 32768), -32768);
        assert_eq!(narrow_int(BaseType::Byte, 255), -1);
        assert_eq!(narrow_int(BaseType::Char, -1), 65535);
        assert_eq!(narrow_int(BaseType::Boolean, 2), 0);
        assert_eq!(narrow_int(BaseType::Int, i32::MIN), i32::MIN);
    }

    #[test]
    fn nan_comparisons() {
        assert_eq!(dcmpl(1.0, 100.0), -1);
        assert_eq!(dcmpg(1.0, 100.0), -1);
        assert_eq!(dcmpl(100.0, 100.0), 0);
        assert_eq!(dcmpl(101.0, 100.0), 1);
        assert_eq!(dcmpl(f64::NAN, 100.0), -1);
        assert_eq!(dcmpg(f64::NAN, 100.0), 1);
        assert_eq!(dcmpg(0.0, -0.0), 0);
    }
}
