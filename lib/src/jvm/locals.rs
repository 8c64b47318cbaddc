use super::class_graph::{ClassId, MethodData};
use super::{Error, FieldType};
use crate::util::Width;

/// Assignment of local variables to slots in a method's locals array
///
/// The receiver (for instance methods) takes slot 0, parameters follow in order, and any further
/// locals are declared after that. `long` and `double` values take two consecutive slots, and
/// are addressed by the first one.
#[derive(Clone, Debug)]
pub struct LocalsLayout<'g> {
    /// Slot and type of every declared local, in declaration order
    locals: Vec<(u16, FieldType<ClassId<'g>>)>,

    /// Next free slot
    next_slot: usize,

    /// Number of leading locals that are the receiver and parameters
    parameter_count: usize,
}

impl<'g> LocalsLayout<'g> {
    const MAX_SLOTS: usize = u16::MAX as usize;

    /// Empty layout, with no receiver or parameters
    pub fn new() -> LocalsLayout<'g> {
        LocalsLayout {
            locals: vec![],
            next_slot: 0,
            parameter_count: 0,
        }
    }

    /// Layout with the receiver (if any) and parameters of a method
    pub fn for_method(method: &MethodData<'g>) -> Result<LocalsLayout<'g>, Error> {
        let mut layout = LocalsLayout::new();
        if !method.is_static() {
            layout.declare(FieldType::object(method.class))?;
        }
        for parameter in &method.descriptor.parameters {
            layout.declare(*parameter)?;
        }
        layout.parameter_count = layout.locals.len();
        Ok(layout)
    }

    /// Declare a new local, returning its slot
    pub fn declare(&mut self, field_type: FieldType<ClassId<'g>>) -> Result<u16, Error> {
        let slot = self.next_slot;
        let next_slot = slot + field_type.width();
        if next_slot > Self::MAX_SLOTS {
            return Err(Error::MethodCodeMaxLocalsOverflow(next_slot));
        }
        self.locals.push((slot as u16, field_type));
        self.next_slot = next_slot;
        Ok(slot as u16)
    }

    /// Slots of the receiver (if any) and parameters, in order
    pub fn parameter_slots(&self) -> impl Iterator<Item = (u16, FieldType<ClassId<'g>>)> + '_ {
        self.locals[..self.parameter_count].iter().copied()
    }

    /// Size the locals array must have
    pub fn max_locals(&self) -> u16 {
        self.next_slot as u16
    }
}

impl<'g> Default for LocalsLayout<'g> {
    fn default() -> Self {
        Self::new()
    }
}
