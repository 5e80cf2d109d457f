//! Error types produced by the default engine and the configuration loader.

use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for results carrying a [`LeafError`].
pub type LeafResult<T> = Result<T, LeafError>;

/// Failure to convert a raw literal into a typed value.
///
/// Produced by conversion hooks; the engine wraps it into
/// [`LeafError::Default`] together with the field path.
#[derive(Debug, Error)]
#[error("cannot convert `{value}` to {target}")]
pub struct ConvertError {
    value: String,
    target: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ConvertError {
    /// Build a conversion failure from a parse error.
    pub fn parse(
        value: impl Into<String>,
        target: impl ToString,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            value: value.into(),
            target: target.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Build a conversion failure for a value no hook in the chain handled.
    pub fn unhandled(value: impl Into<String>, target: impl ToString) -> Self {
        Self {
            value: value.into(),
            target: target.to_string(),
            source: None,
        }
    }

    /// The offending literal.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Display form of the target the literal was aimed at.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }
}

/// Errors that can occur while applying defaults or loading configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LeafError {
    /// The destination does not serialize to a map of fields.
    #[error("destination must serialize to a map of fields, got {found}")]
    InvalidDestination {
        /// Shape the destination actually serialized to.
        found: &'static str,
    },

    /// A default literal could not be converted for its field.
    #[error("invalid default for field `{field}`: {source}")]
    Default {
        /// Dotted path of the offending field.
        field: String,
        #[source]
        source: ConvertError,
    },

    /// A default-tree key has no matching schema field.
    #[error("default tree key `{key}` has no matching schema field")]
    UnknownKey { key: String },

    /// A sub-binder failed inside a composed binder.
    #[error("binder `{binder}` failed: {source}")]
    Bind {
        /// Name of the failing binder.
        binder: String,
        #[source]
        source: Box<LeafError>,
    },

    /// Error while gathering one of the configuration layers.
    #[error("failed to gather {phase}: {source}")]
    Gathering {
        /// Which loading phase failed.
        phase: &'static str,
        #[source]
        source: figment::Error,
    },

    /// A dotenv file was present but could not be read or parsed.
    #[error("dotenv file error in '{path}': {source}")]
    File {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Final decode into the destination type failed.
    #[error("failed to decode configuration: {0}")]
    Decode(#[from] serde_json::Error),
}

impl LeafError {
    /// Wrap a [`figment::Error`] with the phase it occurred in.
    #[must_use]
    pub fn gathering(phase: &'static str, source: figment::Error) -> Self {
        Self::Gathering { phase, source }
    }

    /// Build a [`LeafError::File`] for a dotenv path.
    pub fn file(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::File {
            path: path.into(),
            source: source.into(),
        }
    }
}
