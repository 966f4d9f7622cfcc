use std::fmt;

/// Class recorded when a test's owner cannot be determined.
pub const UNKNOWN_CLASS: &str = "unknown";

/// Who is running: the display name that goes into every lifecycle message
/// and the owning test class that names the logger.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TestIdentity {
    display_name: String,
    test_class: String,
}

impl TestIdentity {
    /// Identity in the usual `method(class)` form.
    pub fn new(test_class: impl AsRef<str>, method: impl AsRef<str>) -> Self {
        let test_class = test_class.as_ref().to_string();
        let method = method.as_ref();
        Self {
            display_name: format!("{method}({test_class})"),
            test_class,
        }
    }

    /// Identity with a caller-chosen display name.
    pub fn with_display_name(
        test_class: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            test_class: test_class.into(),
        }
    }

    /// Identity whose class is the full type name of `T`.
    pub fn of<T: ?Sized>(method: &str) -> Self {
        Self::new(std::any::type_name::<T>(), method)
    }

    /// Identity from a libtest-style path such as `my_crate::tests::parses_empty`.
    ///
    /// The last segment is the method and everything before it the class. A
    /// path without `::` has class [`UNKNOWN_CLASS`].
    pub fn from_test_path(path: &str) -> Self {
        match path.rsplit_once("::") {
            Some((class, method)) if !class.is_empty() => Self::new(class, method),
            _ => Self::new(UNKNOWN_CLASS, path.trim_start_matches("::")),
        }
    }

    /// Identity from the current thread's name, which libtest sets to the test path.
    pub fn from_thread() -> Self {
        let thread = std::thread::current();
        Self::from_test_path(thread.name().unwrap_or(UNKNOWN_CLASS))
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[must_use]
    pub fn test_class(&self) -> &str {
        &self.test_class
    }
}

impl fmt::Display for TestIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name)
    }
}
