//! Result envelope for remote calls.

use crate::remote::error::{RemoteError, RemoteResult};
use crate::warnings::Warnings;

/// Outcome of one remote call: a result plus the warnings the remote side
/// attached to it, whether the call succeeded or not.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a reply carries warnings that must be recorded"]
pub struct Reply<T> {
    pub result: RemoteResult<T>,
    pub warnings: Warnings,
}

impl<T> Reply<T> {
    pub fn ok(value: T, warnings: impl Into<Warnings>) -> Self {
        Self {
            result: Ok(value),
            warnings: warnings.into(),
        }
    }

    pub fn err(error: RemoteError, warnings: impl Into<Warnings>) -> Self {
        Self {
            result: Err(error),
            warnings: warnings.into(),
        }
    }

    /// Move the warnings into `sink` and hand back the result.
    pub fn record(self, sink: &mut Warnings) -> RemoteResult<T> {
        sink.append(self.warnings);
        self.result
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reply<U> {
        Reply {
            result: self.result.map(f),
            warnings: self.warnings,
        }
    }

    pub fn map_err(self, f: impl FnOnce(RemoteError) -> RemoteError) -> Reply<T> {
        Reply {
            result: self.result.map_err(f),
            warnings: self.warnings,
        }
    }

    pub fn and_then<U>(self, f: impl FnOnce(T) -> RemoteResult<U>) -> Reply<U> {
        Reply {
            result: self.result.and_then(f),
            warnings: self.warnings,
        }
    }
}
