use bitflags::bitflags;

bitflags! {
    /// Access flags on classes
    ///
    /// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.1-200-E.1
    pub struct ClassAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const FINAL = 0x0010;
        const SUPER = 0x0020;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
        const MODULE = 0x8000;
    }
}

bitflags! {
    /// Access flags on methods
    ///
    /// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.6-200-A.1
    pub struct MethodAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SYNCHRONIZED = 0x0020;
        const BRIDGE = 0x0040;
        const VARARGS = 0x0080;
        const NATIVE = 0x0100;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
    }
}

bitflags! {
    /// Access flags on fields
    ///
    /// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.5-200-A.1
    pub struct FieldAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const VOLATILE = 0x0040;
        const TRANSIENT = 0x0080;
        const SYNTHETIC = 0x1000;
        const ENUM = 0x4000;
    }
}

/// Render the set flags as space separated `ACC_*` names, in ascending bit order
pub trait RenderFlags {
    const NAMES: &'static [(u16, &'static str)];

    fn flag_bits(&self) -> u16;

    fn render_names(&self) -> String {
        let bits = self.flag_bits();
        Self::NAMES
            .iter()
            .filter(|(flag, _)| bits & flag != 0)
            .map(|(_, name)| *name)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl RenderFlags for ClassAccessFlags {
    const NAMES: &'static [(u16, &'static str)] = &[
        (0x0001, "ACC_PUBLIC"),
        (0x0010, "ACC_FINAL"),
        (0x0020, "ACC_SUPER"),
        (0x0200, "ACC_INTERFACE"),
        (0x0400, "ACC_ABSTRACT"),
        (0x1000, "ACC_SYNTHETIC"),
        (0x2000, "ACC_ANNOTATION"),
        (0x4000, "ACC_ENUM"),
        (0x8000, "ACC_MODULE"),
    ];

    fn flag_bits(&self) -> u16 {
        self.bits()
    }
}

impl RenderFlags for MethodAccessFlags {
    const NAMES: &'static [(u16, &'static str)] = &[
        (0x0001, "ACC_PUBLIC"),
        (0x0002, "ACC_PRIVATE"),
        (0x0004, "ACC_PROTECTED"),
        (0x0008, "ACC_STATIC"),
        (0x0010, "ACC_FINAL"),
        (0x0020, "ACC_SYNCHRONIZED"),
        (0x0040, "ACC_BRIDGE"),
        (0x0080, "ACC_VARARGS"),
        (0x0100, "ACC_NATIVE"),
        (0x0400, "ACC_ABSTRACT"),
        (0x0800, "ACC_STRICT"),
        (0x1000, "ACC_SYNTHETIC"),
    ];

    fn flag_bits(&self) -> u16 {
        self.bits()
    }
}

impl RenderFlags for FieldAccessFlags {
    const NAMES: &'static [(u16, &'static str)] = &[
        (0x0001, "ACC_PUBLIC"),
        (0x0002, "ACC_PRIVATE"),
        (0x0004, "ACC_PROTECTED"),
        (0x0008, "ACC_STATIC"),
        (0x0010, "ACC_FINAL"),
        (0x0040, "ACC_VOLATILE"),
        (0x0080, "ACC_TRANSIENT"),
        (0x1000, "ACC_SYNTHETIC"),
        (0x4000, "ACC_ENUM"),
    ];

    fn flag_bits(&self) -> u16 {
        self.bits()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn render_method_flags() {
        assert_eq!(MethodAccessFlags::empty().render_names(), "");
        assert_eq!(
            (MethodAccessFlags::STATIC | MethodAccessFlags::PUBLIC).render_names(),
            "ACC_PUBLIC ACC_STATIC"
        );
        assert_eq!(MethodAccessFlags::PRIVATE.render_names(), "ACC_PRIVATE");
    }

    #[test]
    fn render_field_flags() {
        let this_outer = FieldAccessFlags::FINAL | FieldAccessFlags::SYNTHETIC;
        assert_eq!(this_outer.render_names(), "ACC_FINAL ACC_SYNTHETIC");
    }
}
