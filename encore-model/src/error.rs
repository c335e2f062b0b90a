use std::fmt::{self, Display};

/// Errors produced by registry lookups and model constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A symbolic name that is not part of the [`crate::VideoKey`] set.
    UnknownKey(String),
    /// An asset root that could not be parsed as an absolute URL.
    InvalidBaseUrl { base: String, reason: String },
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::UnknownKey(name) => {
                write!(f, "unknown video key: {name}")
            }
            ModelError::InvalidBaseUrl { base, reason } => {
                write!(f, "invalid asset base url {base}: {reason}")
            }
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;
