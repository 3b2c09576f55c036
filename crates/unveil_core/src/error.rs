//! Error types for the Unveil engine

use crate::target::TargetKey;
use thiserror::Error;

/// Errors returned synchronously from registration calls
///
/// Runtime failures (a target disappearing mid-animation) are never surfaced
/// through this type; the engine disposes the affected bindings instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A pin was requested on a target that already has a pin
    #[error("target '{target}' is already pinned by another trigger")]
    ConflictingPin { target: TargetKey },

    /// The resolved scroll window is empty or inverted
    #[error("invalid scroll window: end ({end}) must be greater than start ({start})")]
    InvalidWindow { start: f32, end: f32 },

    /// Geometry lookup failed for a target
    #[error("target '{target}' has no geometry")]
    TargetGone { target: TargetKey },

    /// The same target key was registered twice
    #[error("target '{target}' is already registered")]
    DuplicateRegistration { target: TargetKey },

    /// An id that was never issued or has been disposed
    #[error("unknown target")]
    UnknownTarget,

    /// An id that was never issued or has been disposed
    #[error("unknown trigger")]
    UnknownTrigger,

    /// A trigger was created without any targets
    #[error("trigger has no targets")]
    EmptyGroup,

    /// A timeline definition that cannot be evaluated
    #[error("invalid timeline: {0}")]
    InvalidTimeline(String),

    /// Failed to parse an offset, easing or toggle-action string
    #[error("cannot parse {kind} from '{input}': {reason}")]
    Parse {
        kind: &'static str,
        input: String,
        reason: String,
    },
}

impl Error {
    /// Build a [`Error::Parse`]
    pub fn parse(kind: &'static str, input: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Parse {
            kind,
            input: input.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for Unveil operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = Error::ConflictingPin {
            target: TargetKey::new("#clip"),
        };
        assert_eq!(err.to_string(), "target '#clip' is already pinned by another trigger");

        let err = Error::parse("easing", "power9.out", "power must be 1 to 4");
        assert_eq!(
            err.to_string(),
            "cannot parse easing from 'power9.out': power must be 1 to 4"
        );
    }
}
