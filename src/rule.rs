//! The lifecycle logging rule.
//!
//! [`LoggingRule`] wraps a test body so that three informational records
//! surround it:
//!
//! 1. the start message, before the body runs;
//! 2. the exception message with the failure attached, only when the body
//!    returns `Err` or panics;
//! 3. the finish message, last, on every exit path.
//!
//! The failure itself is handed back untouched: an `Err(e)` comes back as the
//! same `e` and a panic is resumed with its original payload, so the caller
//! sees exactly the outcome it would have seen without the rule.
//!
//! Panics are only observed when the build unwinds. Under `panic = "abort"`
//! the process ends inside the body and neither the exception nor the finish
//! record is written.

use std::any::Any;
use std::convert::Infallible;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::error::RuleError;
use crate::identity::TestIdentity;
use crate::sink::{LogFactory, LoggerFactory, TestLogger};
use crate::templates::{MessageKey, MessageTemplates};

static GLOBAL_RULE: OnceCell<LoggingRule<LogFactory>> = OnceCell::new();

#[derive(Debug, Clone)]
pub struct LoggingRule<F = LogFactory> {
    factory: F,
    templates: Arc<MessageTemplates>,
}

impl<F: LoggerFactory> LoggingRule<F> {
    pub fn new(factory: F, templates: impl Into<Arc<MessageTemplates>>) -> Self {
        Self {
            factory,
            templates: templates.into(),
        }
    }

    /// Same templates, different sink.
    pub fn with_factory<G: LoggerFactory>(self, factory: G) -> LoggingRule<G> {
        LoggingRule {
            factory,
            templates: self.templates,
        }
    }

    #[must_use]
    pub fn templates(&self) -> &MessageTemplates {
        &self.templates
    }

    #[must_use]
    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Wrap `body` without running it. Call [`WrappedTestBody::evaluate`] to run.
    pub fn wrap<B, T, E>(&self, body: B, identity: TestIdentity) -> WrappedTestBody<'_, F, B>
    where
        B: FnOnce() -> Result<T, E>,
        E: fmt::Debug,
    {
        WrappedTestBody {
            rule: self,
            identity,
            body,
        }
    }

    /// Wrap and run a fallible body.
    pub fn evaluate<B, T, E>(&self, body: B, identity: TestIdentity) -> Result<T, E>
    where
        B: FnOnce() -> Result<T, E>,
        E: fmt::Debug,
    {
        self.wrap(body, identity).evaluate()
    }

    /// Wrap and run a body that signals failure only by panicking.
    pub fn run<B, T>(&self, body: B, identity: TestIdentity) -> T
    where
        B: FnOnce() -> T,
    {
        match self.evaluate(|| Ok::<T, Infallible>(body()), identity) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }
}

impl LoggingRule<LogFactory> {
    /// Rule on the `log` facade using the process-wide templates
    /// ([`MessageTemplates::global`]).
    pub fn from_env() -> Result<Self, RuleError> {
        Ok(Self::new(LogFactory, MessageTemplates::global()?.clone()))
    }

    /// Process-wide default rule, built on first use.
    ///
    /// # Panics
    ///
    /// Panics on first use if the messages cannot be loaded. A broken bundle
    /// must stop the run before any test executes.
    pub fn global() -> &'static Self {
        GLOBAL_RULE.get_or_init(|| match Self::from_env() {
            Ok(rule) => rule,
            Err(e) => panic!("lifecycle messages could not be loaded: {e}"),
        })
    }
}

/// A test body bound to its identity, ready to run through the rule.
#[must_use = "a wrapped test body does nothing until evaluated"]
pub struct WrappedTestBody<'r, F, B> {
    rule: &'r LoggingRule<F>,
    identity: TestIdentity,
    body: B,
}

impl<'r, F, B> WrappedTestBody<'r, F, B> {
    #[must_use]
    pub fn identity(&self) -> &TestIdentity {
        &self.identity
    }
}

impl<'r, F, B, T, E> WrappedTestBody<'r, F, B>
where
    F: LoggerFactory,
    B: FnOnce() -> Result<T, E>,
    E: fmt::Debug,
{
    /// Run the body once, logging around it. Returns what the body returned;
    /// a panic in the body is resumed after logging.
    pub fn evaluate(self) -> Result<T, E> {
        let Self {
            rule,
            identity,
            body,
        } = self;
        let logger = rule.factory.logger(identity.test_class());
        let name = identity.display_name();
        let templates = &*rule.templates;

        logger.info(&templates.render(MessageKey::Start, name));
        let _finish = FinishGuard {
            logger: &logger,
            templates,
            display_name: name,
        };
        match panic::catch_unwind(AssertUnwindSafe(body)) {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                logger.info_with_error(&templates.render(MessageKey::Exception, name), &e);
                Err(e)
            }
            Err(payload) => {
                logger.info_with_error(
                    &templates.render(MessageKey::Exception, name),
                    &PanicMessage(&*payload),
                );
                panic::resume_unwind(payload)
            }
        }
    }

    /// The wrapped body as a plain closure.
    pub fn into_fn(self) -> impl FnOnce() -> Result<T, E> + 'r
    where
        F: 'r,
        B: 'r,
        T: 'r,
        E: 'r,
    {
        move || self.evaluate()
    }
}

// Writes the finish record when dropped, including while unwinding.
struct FinishGuard<'a, L: TestLogger> {
    logger: &'a L,
    templates: &'a MessageTemplates,
    display_name: &'a str,
}

impl<L: TestLogger> Drop for FinishGuard<'_, L> {
    fn drop(&mut self) {
        self.logger
            .info(&self.templates.render(MessageKey::Finish, self.display_name));
    }
}

struct PanicMessage<'a>(&'a (dyn Any + Send));

impl fmt::Debug for PanicMessage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(s) = self.0.downcast_ref::<&str>() {
            write!(f, "panic: {s}")
        } else if let Some(s) = self.0.downcast_ref::<String>() {
            write!(f, "panic: {s}")
        } else {
            f.write_str("panic: <non-string payload>")
        }
    }
}
