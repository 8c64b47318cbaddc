use std::fmt;

/// Errors while declaring or linking classes
///
/// These are bugs in the class model, as opposed to [`crate::runtime::Fault`] which is raised by
/// running code.
#[derive(Debug)]
pub enum Error {
    /// A method needs more than 65535 local variable slots
    MethodCodeMaxLocalsOverflow(usize),

    /// A name did not pass validation
    InvalidName(String),

    /// A class was referenced but never declared
    MissingClass(String),

    /// A member was referenced on a class that does not declare it
    MissingMember(String),

    /// A method that is neither `abstract` nor `native` was linked without an implementation
    MissingBody(String),

    /// Two implementations were supplied for the same method
    DuplicateBody(String),

    /// The same key appears twice in a `switch`
    DuplicateSwitchKey(i32),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MethodCodeMaxLocalsOverflow(slots) => {
                write!(f, "method needs {} local slots (max 65535)", slots)
            }
            Error::InvalidName(msg) => f.write_str(msg),
            Error::MissingClass(class) => write!(f, "class '{}' is not declared", class),
            Error::MissingMember(member) => write!(f, "member '{}' is not declared", member),
            Error::MissingBody(method) => write!(f, "method '{}' has no body", method),
            Error::DuplicateBody(method) => write!(f, "method '{}' has two bodies", method),
            Error::DuplicateSwitchKey(key) => write!(f, "duplicate switch key {}", key),
        }
    }
}

impl std::error::Error for Error {}
