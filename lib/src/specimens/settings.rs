use crate::jvm::{BinaryName, Error, Name, UnqualifiedName};

/// Names used when declaring the specimens
#[derive(Clone, Debug)]
pub struct Settings {
    /// Host class name, written as `my/pkg/Spin`
    pub host_class_name: BinaryName,

    /// Inner class whose private getter is reached through a public one
    pub near_short_class_name: UnqualifiedName,

    /// Inner class extending the near class, calling up with `super`
    pub far_short_class_name: UnqualifiedName,

    /// Checked exception thrown by `cantBeZero`
    pub exception_short_class_name: UnqualifiedName,

    /// Checked exception thrown by `cantBeZero2`
    pub second_exception_short_class_name: UnqualifiedName,
}

impl Settings {
    pub fn new(host_class_name: String) -> Result<Settings, Error> {
        fn make_name<N: Name>(name: impl Into<String>) -> Result<N, Error> {
            N::from_string(name.into()).map_err(Error::InvalidName)
        }

        Ok(Settings {
            host_class_name: make_name(host_class_name)?,
            near_short_class_name: make_name("Near")?,
            far_short_class_name: make_name("Far")?,
            exception_short_class_name: make_name("TestExc")?,
            second_exception_short_class_name: make_name("TestExc2")?,
        })
    }
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            host_class_name: BinaryName::from_str_unsafe("Spin"),
            near_short_class_name: UnqualifiedName::from_str_unsafe("Near"),
            far_short_class_name: UnqualifiedName::from_str_unsafe("Far"),
            exception_short_class_name: UnqualifiedName::from_str_unsafe("TestExc"),
            second_exception_short_class_name: UnqualifiedName::from_str_unsafe("TestExc2"),
        }
    }
}
