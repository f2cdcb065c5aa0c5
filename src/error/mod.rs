// bento: Multi-Target Bundle Composer
//
// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!            BentoError (~16 bytes)
//!                  |
//!          +-------+-------+
//!          |       |       |
//!          v       v       v
//!        Config  Compose  Io
//!         Box     Box     Box
//!
//! Sub-errors (unboxed internally):
//!   Config   ReadError, ParseError, MissingKey, InvalidValue,
//!            UnknownBundle, DependencyCycle, ManifestMissing
//!   Compose  MissingInput, UnresolvedPlaceholder, EmptyBundle,
//!            DependencyFailed
//!
//! All variants boxed => BentoError stays pointer-sized on the stack.
//! ```

use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`BentoError`].
pub type BentoResult<T> = std::result::Result<T, BentoError>;

/// Top-level application error type.
///
/// All sub-errors are boxed to keep this enum small on the stack.
#[derive(Debug, Error)]
pub enum BentoError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] Box<ConfigError>),

    /// Bundle composition error.
    #[error("compose error: {0}")]
    Compose(#[from] Box<ComposeError>),

    /// I/O error.
    #[error("io error: {0}")]
    Io(Box<std::io::Error>),
}

// --- From implementations for boxing ---

/// Macro to generate `From` implementations that box the source error.
macro_rules! impl_from_boxed {
    ($($error:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$error> for BentoError {
                fn from(err: $error) -> Self {
                    BentoError::$variant(Box::new(err))
                }
            }
        )+
    };
}

impl_from_boxed! {
    ConfigError => Config,
    ComposeError => Compose,
    std::io::Error => Io,
}

// --- Config Errors ---

/// Configuration-related errors.
///
/// Raised for malformed bundle specs and invalid configuration files,
/// before any output is written.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },

    /// Missing required configuration key.
    #[error("missing required config key '{key}' in section '[{section}]'")]
    MissingKey { section: String, key: String },

    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },

    /// A bundle name was requested that is not configured.
    #[error("bundle '{0}' is not configured")]
    UnknownBundle(String),

    /// Bundle `requires` edges form a cycle.
    #[error("bundle dependency cycle involving: {0}")]
    DependencyCycle(String),

    /// The canonical manifest could not be located for a bundle.
    #[error("bundle '{bundle}' has no canonical manifest at '{path}'")]
    ManifestMissing { bundle: String, path: String },
}

// --- Compose Errors ---

/// Bundle composition errors.
///
/// All are fatal to the affected bundle only; sibling bundles in the same
/// invocation keep composing.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// A referenced module output is unknown or absent on disk.
    #[error("module output missing: {module}")]
    MissingInput { module: String },

    /// A manifest placeholder had no entry in the token table.
    #[error("unresolved placeholder '${{{token}}}' in manifest '{manifest}'")]
    UnresolvedPlaceholder { manifest: String, token: String },

    /// No files survived exclusion filtering for a bundle variant.
    #[error("bundle '{bundle}' ({variant}) is empty after filtering")]
    EmptyBundle { bundle: String, variant: String },

    /// A required bundle failed, so this one was not composed.
    #[error("bundle '{bundle}' skipped because required bundle '{dependency}' failed")]
    DependencyFailed { bundle: String, dependency: String },
}
