// Copyright 2026 the Weft Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for the render loop.
//!
//! Recoverable conditions surface as [`Error`]; contract violations (stale
//! fiber handles, hook-order drift detected by a type mismatch) panic instead,
//! since they indicate a bug in the caller rather than a runtime condition.

use alloc::borrow::Cow;
use core::fmt;

/// A failure reported by a [`HostBackend`](crate::backend::HostBackend).
///
/// The engine does not interpret the message; it aborts the current pass and
/// propagates the error to the driver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostError {
    message: Cow<'static, str>,
}

impl HostError {
    /// Creates a host error with the given message.
    #[must_use]
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The backend's description of the failure.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "host backend error: {}", self.message)
    }
}

impl core::error::Error for HostError {}

/// Errors surfaced by [`Renderer`](crate::renderer::Renderer) operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// A hook context was requested while no component evaluation is active.
    HookOutsideRender,
    /// An update was dispatched before anything was rendered.
    NoRoot,
    /// The host backend rejected a mutation.
    Host(HostError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HookOutsideRender => {
                write!(f, "hooks are only available during component evaluation")
            }
            Self::NoRoot => write!(f, "no root has been rendered yet"),
            Self::Host(e) => write!(f, "{e}"),
        }
    }
}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Host(e) => Some(e),
            _ => None,
        }
    }
}

impl From<HostError> for Error {
    fn from(e: HostError) -> Self {
        Self::Host(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn display_messages() {
        assert_eq!(
            Error::NoRoot.to_string(),
            "no root has been rendered yet"
        );
        let host = Error::from(HostError::new("container detached"));
        assert_eq!(
            host.to_string(),
            "host backend error: container detached"
        );
    }

    #[test]
    fn host_error_is_source() {
        use core::error::Error as _;
        let e = Error::Host(HostError::new("x"));
        assert!(e.source().is_some());
        assert!(Error::NoRoot.source().is_none());
    }
}
