// Copyright 2025 The Bootmap Authors
// SPDX-License-Identifier: Apache-2.0

//! Error types for bootmap with HTTP-mappable error kinds.

use thiserror::Error;

/// A specialized `Result` type for bootmap operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Kinds of operation failures, each with a fixed HTTP status mapping.
///
/// The transport layer maps these to process exit codes or HTTP responses;
/// the core only classifies. Missing hosts in list/delete requests are *not*
/// errors — they produce empty results instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing required fields in a request.
    InvalidArgument,
    /// Concurrent modification detected. Produced only by optimistic
    /// backends; the in-memory store serializes writers and never emits it.
    Conflict,
    /// A named entity that the operation requires does not exist.
    NotFound,
    /// Internal failure scoped to a single call.
    Internal,
}

impl ErrorKind {
    /// Returns the HTTP status code for this error kind.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::InvalidArgument => 400,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Internal => 500,
        }
    }

    /// Returns the error kind as a string code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "InvalidArgument",
            Self::Conflict => "Conflict",
            Self::NotFound => "NotFound",
            Self::Internal => "Internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors that can occur during bootmap operations.
#[derive(Debug, Error)]
pub enum Error {
    /// An operation error with a specific kind.
    #[error("{kind}: {message}")]
    Op {
        /// The error kind.
        kind: ErrorKind,
        /// A human-readable error message.
        message: String,
        /// The entity that caused the error (host name, tag, etc.).
        resource: Option<String>,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a new operation error.
    #[must_use]
    pub fn op(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Op { kind, message: message.into(), resource: None }
    }

    /// Creates an `InvalidArgument` error.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::op(ErrorKind::InvalidArgument, message)
    }

    /// Creates a `NotFound` error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::op(ErrorKind::NotFound, message)
    }

    /// Creates a `Conflict` error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::op(ErrorKind::Conflict, message)
    }

    /// Attaches the offending resource to an operation error.
    ///
    /// No-op for non-operation variants.
    #[must_use]
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        if let Self::Op { resource: r, .. } = &mut self {
            *r = Some(resource.into());
        }
        self
    }

    /// Returns the error kind, if this is an operation error.
    #[must_use]
    pub const fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Op { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::Op { kind, .. } => kind.http_status(),
            Self::Config(_) => 400,
            Self::Io(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_status_mapping() {
        assert_eq!(ErrorKind::InvalidArgument.http_status(), 400);
        assert_eq!(ErrorKind::NotFound.http_status(), 404);
        assert_eq!(ErrorKind::Conflict.http_status(), 409);
        assert_eq!(ErrorKind::Internal.http_status(), 500);
    }

    #[test]
    fn test_op_error_display() {
        let err = Error::invalid_argument("empty host set").with_resource("hosts");
        assert_eq!(err.to_string(), "InvalidArgument: empty host set");
        assert_eq!(err.kind(), Some(ErrorKind::InvalidArgument));
        assert_eq!(err.http_status(), 400);
    }

    #[test]
    fn test_with_resource_keeps_resource() {
        let err = Error::not_found("no assignment").with_resource("nid42");
        match err {
            Error::Op { resource, .. } => assert_eq!(resource.as_deref(), Some("nid42")),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
