//! Error types for shoal.

use std::io;

/// Errors produced by the shoal framework.
///
/// User mistakes at the prompt are not errors in this sense: they are
/// reported on the REPL output channel and the loop carries on. These
/// variants cover configuration defects and failures of the surrounding
/// machinery.
#[derive(Debug, thiserror::Error)]
pub enum ShoalError {
    #[error("config error: {0}")]
    Config(String),

    #[error("registry error: {0}")]
    Registry(String),

    #[error("readline error: {0}")]
    Readline(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ShoalError>;
