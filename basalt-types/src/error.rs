use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the basalt workspace.
///
/// A value of this type is the terminal item of every normalized event
/// sequence; after it nothing else is emitted.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BasaltError {
    /// A join builder or handler failed while classifying or merging an event.
    #[error("{handler} failed: {msg}")]
    Handler {
        /// Name of the builder or handler that failed.
        handler: String,
        /// Human-readable error message.
        msg: String,
    },

    /// The input sequence itself signalled an error.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// An event is missing a field (or carries an unusable one) that a stage needs.
    #[error("malformed event {id}: field `{field}` {reason}")]
    MalformedEvent {
        /// Rendered `_id` of the offending event, or `<unknown>`.
        id: String,
        /// Field name that could not be used.
        field: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The subject is not allowed to view the target's data.
    #[error("{subject} may not view data of {target}")]
    Unauthorized {
        /// Requesting subject.
        subject: String,
        /// Subject whose data was requested.
        target: String,
    },

    /// A resource could not be found.
    #[error("not found: {what}")]
    NotFound {
        /// Description of the missing resource, e.g. "stream for user 42".
        what: String,
    },

    /// A collaborator call exceeded the configured deadline.
    #[error("timed out: {capability}")]
    Timeout {
        /// Label of the call that timed out (e.g. "open", "authorize").
        capability: String,
    },

    /// Writing to the wire failed.
    #[error("io error: {0}")]
    Io(String),

    /// Invalid input argument or configuration.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// Unknown/opaque error.
    #[error("unknown error: {0}")]
    Other(String),
}

impl BasaltError {
    /// Helper: build a `Handler` error tagged with the handler name.
    pub fn handler(handler: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Handler {
            handler: handler.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build an `Upstream` error from any displayable source error.
    pub fn upstream(err: impl std::fmt::Display) -> Self {
        Self::Upstream(err.to_string())
    }

    /// Helper: build a `MalformedEvent` error.
    pub fn malformed(
        id: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedEvent {
            id: id.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Helper: build an `Unauthorized` error for a (subject, target) pair.
    pub fn unauthorized(subject: impl Into<String>, target: impl Into<String>) -> Self {
        Self::Unauthorized {
            subject: subject.into(),
            target: target.into(),
        }
    }

    /// Helper: build a `NotFound` error for a description of the missing resource.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Helper: build a `Timeout` error.
    pub fn timeout(capability: impl Into<String>) -> Self {
        Self::Timeout {
            capability: capability.into(),
        }
    }

    /// HTTP-style status code a transport layer should answer with.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized { .. } => 401,
            Self::InvalidArg(_) => 400,
            Self::NotFound { .. } => 404,
            Self::Timeout { .. } => 504,
            _ => 500,
        }
    }

    /// Returns true if this error was raised while folding the event sequence
    /// rather than while setting it up.
    #[must_use]
    pub const fn is_stream_failure(&self) -> bool {
        matches!(
            self,
            Self::Handler { .. } | Self::Upstream(_) | Self::MalformedEvent { .. }
        )
    }
}

impl From<std::io::Error> for BasaltError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<serde_json::Error> for BasaltError {
    fn from(e: serde_json::Error) -> Self {
        if e.is_io() {
            Self::Io(e.to_string())
        } else {
            Self::InvalidArg(e.to_string())
        }
    }
}
