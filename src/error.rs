use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("messages.toml parse error{}: {message}", position(.line_col))]
    Parse {
        line_col: Option<(usize, usize)>,
        message: String,
    },
    #[error("template `{key}` is empty")]
    EmptyTemplate { key: &'static str },
    #[error("template `{key}` has no {{0}} placeholder")]
    MissingPlaceholder { key: &'static str },
    #[error("template `{key}` is malformed: {reason}")]
    Malformed { key: &'static str, reason: String },
    #[error("already registered")]
    AlreadyRegistered,
    #[error("not found: {0}")]
    NotFound(String),
}

fn position(line_col: &Option<(usize, usize)>) -> String {
    line_col.map_or_else(String::new, |(line, col)| format!(" at {line}:{col}"))
}
