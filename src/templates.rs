//! Lifecycle message templates.
//!
//! The three messages (start, exception, finish) live in a TOML bundle under a
//! `[logging]` table. The crate embeds a default bundle (`messages.toml`); a
//! different one can be loaded from a string, a path, `define/messages.toml`
//! next to the executable, or the path in `LIFECYCLE_LOG_MESSAGES`.
//!
//! Templates are parsed once when the bundle is loaded, so a bad bundle is
//! rejected before any test runs and rendering itself cannot fail.

use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::config::config;
use crate::error::RuleError;
use crate::toml_helpers::parse_error;

static EMBEDDED: &str = include_str!("messages.toml");

static GLOBAL_TEMPLATES: OnceCell<MessageTemplates> = OnceCell::new();

#[derive(Debug, Deserialize)]
struct MessagesToml {
    logging: LoggingSection,
}

#[derive(Debug, Deserialize)]
struct LoggingSection {
    start: String,
    exception: String,
    finish: String,
}

/// Which lifecycle message a template belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    Start,
    Exception,
    Finish,
}

impl MessageKey {
    /// Key of the template inside the `[logging]` table.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Exception => "exception",
            Self::Finish => "finish",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Name,
}

/// A single parsed template with `{0}` standing for the test's display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse `source` using MessageFormat quoting rules.
    ///
    /// `''` is a literal quote, text between single quotes is copied verbatim,
    /// and `{0}` (surrounding whitespace allowed) is the only accepted argument.
    pub fn parse(key: MessageKey, source: &str) -> Result<Self, RuleError> {
        let key = key.as_str();
        if source.trim().is_empty() {
            return Err(RuleError::EmptyTemplate { key });
        }
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut quoted = false;
        let mut has_name = false;
        let mut chars = source.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                '\'' if chars.peek() == Some(&'\'') => {
                    chars.next();
                    text.push('\'');
                }
                '\'' => quoted = !quoted,
                '{' if !quoted => {
                    let mut arg = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(c) => arg.push(c),
                            None => {
                                return Err(RuleError::Malformed {
                                    key,
                                    reason: "unmatched '{'".into(),
                                })
                            }
                        }
                    }
                    if arg.trim() != "0" {
                        return Err(RuleError::Malformed {
                            key,
                            reason: format!("unsupported argument {{{arg}}}"),
                        });
                    }
                    if !text.is_empty() {
                        segments.push(Segment::Text(std::mem::take(&mut text)));
                    }
                    segments.push(Segment::Name);
                    has_name = true;
                }
                c => text.push(c),
            }
        }
        if !has_name {
            return Err(RuleError::MissingPlaceholder { key });
        }
        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }
        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    #[must_use]
    pub fn render(&self, display_name: &str) -> String {
        let mut out = String::with_capacity(self.source.len() + display_name.len());
        for seg in &self.segments {
            match seg {
                Segment::Text(t) => out.push_str(t),
                Segment::Name => out.push_str(display_name),
            }
        }
        out
    }

    /// The template text as written in the bundle.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// The three lifecycle templates. Immutable once built and safe to share
/// between threads without locking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplates {
    start: Template,
    exception: Template,
    finish: Template,
}

impl MessageTemplates {
    pub fn new(start: &str, exception: &str, finish: &str) -> Result<Self, RuleError> {
        Ok(Self {
            start: Template::parse(MessageKey::Start, start)?,
            exception: Template::parse(MessageKey::Exception, exception)?,
            finish: Template::parse(MessageKey::Finish, finish)?,
        })
    }

    /// The bundle compiled into the crate.
    pub fn embedded() -> Result<Self, RuleError> {
        EMBEDDED.parse()
    }

    /// Load and parse a messages TOML from a filesystem path.
    pub fn from_path(path: &Path) -> Result<Self, RuleError> {
        log::debug!("loading lifecycle messages from {}", path.display());
        let s = fs::read_to_string(path)?;
        s.parse::<Self>()
    }

    /// Find `define/messages.toml` next to the executable and parse it.
    pub fn from_exe_define() -> Result<Self, RuleError> {
        let exe = std::env::current_exe()?;
        if let Some(p) = exe.parent().map(|p| p.join("define").join("messages.toml")) {
            if p.exists() {
                return Self::from_path(&p);
            }
        }
        Err(RuleError::NotFound("define/messages.toml next to exe".into()))
    }

    /// Validate a messages TOML without keeping the result.
    pub fn validate_str(s: &str) -> Result<(), RuleError> {
        s.parse::<Self>().map(|_| ())
    }

    /// Templates from `LIFECYCLE_LOG_MESSAGES` when set, otherwise the embedded bundle.
    pub fn resolve() -> Result<Self, RuleError> {
        match &config().messages_path {
            Some(p) => Self::from_path(p),
            None => {
                log::trace!("using embedded lifecycle messages");
                Self::embedded()
            }
        }
    }

    /// Install these templates as the process-wide set. Fails if already set,
    /// including when [`MessageTemplates::global`] has already resolved them.
    pub fn register_global(self) -> Result<(), RuleError> {
        GLOBAL_TEMPLATES
            .set(self)
            .map_err(|_existing| RuleError::AlreadyRegistered)
    }

    /// The process-wide templates, resolving and installing them on first use
    /// when nothing was registered.
    pub fn global() -> Result<&'static Self, RuleError> {
        GLOBAL_TEMPLATES.get_or_try_init(Self::resolve)
    }

    #[must_use]
    pub fn get(&self, key: MessageKey) -> &Template {
        match key {
            MessageKey::Start => &self.start,
            MessageKey::Exception => &self.exception,
            MessageKey::Finish => &self.finish,
        }
    }

    #[must_use]
    pub fn render(&self, key: MessageKey, display_name: &str) -> String {
        self.get(key).render(display_name)
    }
}

impl FromStr for MessageTemplates {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed: MessagesToml = toml::from_str(s).map_err(|e| parse_error(s, &e))?;
        let l = parsed.logging;
        Self::new(&l.start, &l.exception, &l.finish)
    }
}

/// The process-wide templates, if `register_global` has been called.
pub fn templates() -> Option<&'static MessageTemplates> {
    GLOBAL_TEMPLATES.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Result<Template, RuleError> {
        Template::parse(MessageKey::Start, src)
    }

    #[test]
    fn embedded_bundle_renders_default_lines() {
        let t = MessageTemplates::embedded().expect("embedded bundle");
        assert_eq!(
            t.render(MessageKey::Start, "a(B)"),
            "Starting test case [a(B)]"
        );
        assert_eq!(
            t.render(MessageKey::Exception, "a(B)"),
            "Exception thrown in test case [a(B)]"
        );
        assert_eq!(
            t.render(MessageKey::Finish, "a(B)"),
            "Finished test case [a(B)]"
        );
    }

    #[test]
    fn placeholder_may_repeat_and_carry_spaces() {
        let t = parse("{0} / { 0 }").expect("parse");
        assert_eq!(t.render("x"), "x / x");
    }

    #[test]
    fn quotes_follow_message_format() {
        assert_eq!(parse("it''s {0}").expect("parse").render("t"), "it's t");
        assert_eq!(parse("'{0}' is {0}").expect("parse").render("t"), "{0} is t");
        assert_eq!(parse("'it''s' {0}").expect("parse").render("t"), "it's t");
    }

    #[test]
    fn rejects_bad_templates() {
        assert!(matches!(parse(""), Err(RuleError::EmptyTemplate { key: "start" })));
        assert!(matches!(
            parse("no name here"),
            Err(RuleError::MissingPlaceholder { key: "start" })
        ));
        assert!(matches!(parse("'{0}'"), Err(RuleError::MissingPlaceholder { .. })));
        assert!(matches!(parse("[{0"), Err(RuleError::Malformed { .. })));
        assert!(matches!(parse("[{1}]"), Err(RuleError::Malformed { .. })));
        assert!(matches!(parse("[{0,number}]"), Err(RuleError::Malformed { .. })));
    }

    #[test]
    fn missing_key_reports_position() {
        let src = "[logging]\nstart = \"s {0}\"\nfinish = \"f {0}\"\n";
        match src.parse::<MessageTemplates>() {
            Err(RuleError::Parse { message, .. }) => assert!(message.contains("exception")),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn syntax_error_has_line_and_column() {
        let src = "[logging]\nstart = \"s {0}\nfinish = 1\n";
        match MessageTemplates::validate_str(src) {
            Err(RuleError::Parse { line_col, .. }) => {
                let (line, _) = line_col.expect("position");
                assert_eq!(line, 2);
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn bad_template_in_bundle_is_rejected() {
        let src = "[logging]\nstart = \"s {0}\"\nexception = \"e\"\nfinish = \"f {0}\"\n";
        assert!(matches!(
            MessageTemplates::validate_str(src),
            Err(RuleError::MissingPlaceholder { key: "exception" })
        ));
    }
}
