#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::doc_markdown
)]

//! lifecycle_log
//!
//! A test-lifecycle rule: every test run through [`LoggingRule`] gets a
//! "started" record before it runs, an "exception" record if it fails, and a
//! "finished" record afterwards no matter how it ended. Failures are passed
//! back unchanged.
//!
//! ```
//! use lifecycle_log::{CaptureFactory, LoggingRule, MessageTemplates, TestIdentity};
//!
//! let capture = CaptureFactory::new();
//! let rule = LoggingRule::new(capture.clone(), MessageTemplates::embedded()?);
//! let outcome = rule.evaluate(
//!     || Err::<(), _>("boom"),
//!     TestIdentity::new("ExampleTest", "fails"),
//! );
//! assert_eq!(outcome, Err("boom"));
//! assert_eq!(capture.messages().len(), 3);
//! # Ok::<(), lifecycle_log::RuleError>(())
//! ```
//!
//! Inside a test crate the [`logged_test!`] macro does the wiring:
//!
//! ```ignore
//! lifecycle_log::logged_test! {
//!     fn parses_empty_input() {
//!         assert!(parse("").is_empty());
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod identity;
pub mod rule;
pub mod sink;
pub mod templates;
pub mod test_utils;
pub mod toml_helpers;

pub use error::RuleError;
pub use identity::TestIdentity;
pub use rule::{LoggingRule, WrappedTestBody};
pub use sink::{CaptureFactory, LogFactory, LoggerFactory, TestLogger, TracingFactory};
pub use templates::{MessageKey, MessageTemplates};

/// Load the messages (env override or embedded) and install them as the
/// process-wide templates unless some are registered already.
///
/// Load errors are returned.
pub fn init_defaults() -> Result<(), RuleError> {
    MessageTemplates::global().map(|_| ())
}

/// Define a `#[test]` whose body runs through [`LoggingRule::global`].
///
/// The identity is the function name with the enclosing module path as its
/// class. Attributes such as `#[should_panic]` or `#[ignore]` are passed on.
/// A `-> Result<..>` signature is supported and the error is returned as is.
#[macro_export]
macro_rules! logged_test {
    ($(#[$attr:meta])* fn $name:ident() -> $ret:ty $body:block) => {
        $(#[$attr])*
        #[test]
        fn $name() -> $ret {
            let identity = $crate::TestIdentity::new(module_path!(), stringify!($name));
            $crate::LoggingRule::global().evaluate(|| $body, identity)
        }
    };
    ($(#[$attr:meta])* fn $name:ident() $body:block) => {
        $(#[$attr])*
        #[test]
        fn $name() {
            let identity = $crate::TestIdentity::new(module_path!(), stringify!($name));
            $crate::LoggingRule::global().run(|| $body, identity)
        }
    };
}
