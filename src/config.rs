use once_cell::sync::Lazy;
use std::path::PathBuf;

/// Environment variable naming a messages TOML that replaces the embedded bundle.
pub const MESSAGES_ENV: &str = "LIFECYCLE_LOG_MESSAGES";

#[derive(Debug, Default)]
pub struct Config {
    pub messages_path: Option<PathBuf>,
}

impl Config {
    fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup. Blank values count as unset.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let messages_path = lookup(MESSAGES_ENV)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);
        Self { messages_path }
    }
}

/// Global config loaded once from environment at first access.
pub static GLOBAL_CONFIG: Lazy<Config> = Lazy::new(Config::from_env);

/// Convenience accessor
pub fn config() -> &'static Config {
    &GLOBAL_CONFIG
}
