mod ref_id;

pub use ref_id::*;

/// Number of local variable (or operand stack) slots a value occupies
pub trait Width {
    fn width(&self) -> usize;
}
