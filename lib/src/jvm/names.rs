use std::borrow::Cow;
use std::fmt::{Debug, Display, Error as FmtError, Formatter};

/// Names of methods, fields
///
/// See <https://docs.oracle.com/javase/specs/jvms/se16/html/jvms-4.html#jvms-4.2.2>
#[derive(Clone, Hash, Eq, PartialEq)]
pub struct UnqualifiedName(Cow<'static, str>);

/// Names of classes and interfaces
///
/// See <https://docs.oracle.com/javase/specs/jvms/se16/html/jvms-4.html#jvms-4.2.1>
#[derive(Clone, Hash, Eq, PartialEq)]
pub struct BinaryName(Cow<'static, str>);

/// Extracts the raw underlying string name
impl AsRef<str> for UnqualifiedName {
    fn as_ref(&self) -> &str {
        self.0.as_ref()
    }
}

/// Extracts the raw underlying string name
impl AsRef<str> for BinaryName {
    fn as_ref(&self) -> &str {
        self.0.as_ref()
    }
}

pub trait Name: Sized {
    /// Check if a string would be a valid name
    fn check_valid(name: impl AsRef<str>) -> Result<(), String>;

    /// Extact the raw underlying string data:
    fn as_cow(&self) -> &Cow<'static, str>;

    /// Extact the raw underlying string name
    fn as_str(&self) -> &str {
        self.as_cow().as_ref()
    }

    /// Try to construct a name from a string
    fn from_string(name: String) -> Result<Self, String>;
}

impl Name for UnqualifiedName {
    fn check_valid(name: impl AsRef<str>) -> Result<(), String> {
        let name = name.as_ref();
        if name.contains(&['.', ';', '[', '/'][..]) {
            Err(format!(
                "Unqualified name '{}' contains an illegal character",
                name
            ))
        } else if name.is_empty() {
            Err(format!("Unqualified name '{}' is empty", name))
        } else {
            Ok(())
        }
    }

    fn as_cow(&self) -> &Cow<'static, str> {
        &self.0
    }

    fn from_string(name: String) -> Result<Self, String> {
        Self::check_valid(&name)?;
        Ok(UnqualifiedName(Cow::Owned(name)))
    }
}

impl Name for BinaryName {
    fn check_valid(name: impl AsRef<str>) -> Result<(), String> {
        let name = name.as_ref();
        if name.is_empty() {
            Err(format!("Binary name '{}' is empty", name))
        } else {
            name.split('/').map(UnqualifiedName::check_valid).collect()
        }
    }

    fn as_cow(&self) -> &Cow<'static, str> {
        &self.0
    }

    fn from_string(name: String) -> Result<Self, String> {
        Self::check_valid(&name)?;
        Ok(BinaryName(Cow::Owned(name)))
    }
}

impl Debug for UnqualifiedName {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        f.write_str(self.0.as_ref())
    }
}

impl Debug for BinaryName {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        f.write_str(self.0.as_ref())
    }
}

impl Display for UnqualifiedName {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        f.write_str(self.0.as_ref())
    }
}

impl Display for BinaryName {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        f.write_str(self.0.as_ref())
    }
}

impl UnqualifiedName {
    /// Construct a name from a static string without validating it
    ///
    /// Only use this on literals that are known to be valid.
    pub const fn from_str_unsafe(value: &'static str) -> UnqualifiedName {
        UnqualifiedName(Cow::Borrowed(value))
    }

    // Special unqualified names - only these are allowed to have angle brackets in them
    pub const INIT: Self = Self::from_str_unsafe("<init>");
    pub const CLINIT: Self = Self::from_str_unsafe("<clinit>");

    // Name javac gives the reference to the enclosing instance
    pub const THIS_OUTER: Self = Self::from_str_unsafe("this$0");
}

impl BinaryName {
    /// Construct a name from a static string without validating it
    ///
    /// Only use this on literals that are known to be valid.
    pub const fn from_str_unsafe(value: &'static str) -> BinaryName {
        BinaryName(Cow::Borrowed(value))
    }

    /// Name of a member class nested inside this one (eg. `Spin` and `Near` make `Spin$Near`)
    pub fn nested(&self, inner: &UnqualifiedName) -> BinaryName {
        BinaryName(Cow::Owned(format!("{}${}", self.as_str(), inner.as_str())))
    }

    /// Last segment of the name, with any package stripped off
    pub fn simple_name(&self) -> &str {
        match self.as_str().rsplit_once('/') {
            Some((_, simple)) => simple,
            None => self.as_str(),
        }
    }

    // JDK names
    pub const ABSTRACTMETHODERROR: Self = Self::from_str_unsafe("java/lang/AbstractMethodError");
    pub const ARITHMETICEXCEPTION: Self = Self::from_str_unsafe("java/lang/ArithmeticException");
    pub const ARRAYINDEXOUTOFBOUNDSEXCEPTION: Self =
        Self::from_str_unsafe("java/lang/ArrayIndexOutOfBoundsException");
    pub const ARRAYSTOREEXCEPTION: Self = Self::from_str_unsafe("java/lang/ArrayStoreException");
    pub const CLONEABLE: Self = Self::from_str_unsafe("java/lang/Cloneable");
    pub const ERROR: Self = Self::from_str_unsafe("java/lang/Error");
    pub const EXCEPTION: Self = Self::from_str_unsafe("java/lang/Exception");
    pub const ILLEGALMONITORSTATEEXCEPTION: Self =
        Self::from_str_unsafe("java/lang/IllegalMonitorStateException");
    pub const INCOMPATIBLECLASSCHANGEERROR: Self =
        Self::from_str_unsafe("java/lang/IncompatibleClassChangeError");
    pub const INDEXOUTOFBOUNDSEXCEPTION: Self =
        Self::from_str_unsafe("java/lang/IndexOutOfBoundsException");
    pub const LINKAGEERROR: Self = Self::from_str_unsafe("java/lang/LinkageError");
    pub const NEGATIVEARRAYSIZEEXCEPTION: Self =
        Self::from_str_unsafe("java/lang/NegativeArraySizeException");
    pub const NULLPOINTEREXCEPTION: Self = Self::from_str_unsafe("java/lang/NullPointerException");
    pub const OBJECT: Self = Self::from_str_unsafe("java/lang/Object");
    pub const RUNTIMEEXCEPTION: Self = Self::from_str_unsafe("java/lang/RuntimeException");
    pub const SERIALIZABLE: Self = Self::from_str_unsafe("java/io/Serializable");
    pub const THREAD: Self = Self::from_str_unsafe("java/lang/Thread");
    pub const THROWABLE: Self = Self::from_str_unsafe("java/lang/Throwable");
    pub const VERIFYERROR: Self = Self::from_str_unsafe("java/lang/VerifyError");
}
