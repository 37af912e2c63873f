//! Context extension traits that turn a bare `std::error::Error` into a
//! domain `Error` carrying a human-readable trail, without every call
//! site hand-rolling a `map_err`.

use std::fmt;

use codeindex_domain::error::{Error, Result};

/// Attach free-form context to a `Result`'s error, folding it into
/// `Error::Internal` or `Error::Config` depending on the method used.
///
/// This domain only distinguishes `Internal`, `Config`, and the
/// I/O-specific `io_context` below (see `IoErrorContext`) — there are no
/// `Authentication`/`Network`/`Database` variants to fold into.
pub trait ErrorContext<T> {
    /// Fold `context` and the underlying error into `Error::Internal`.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;

    /// Like `context`, but the context value is only built on the error
    /// path (useful when formatting it is itself expensive).
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;

    /// Fold `context` and the underlying error into `Error::Config`.
    fn config_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|err| Error::internal(format!("{context}: {err}")))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|err| Error::internal(format!("{}: {err}", f())))
    }

    fn config_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|err| Error::config(format!("{context}: {err}")))
    }
}

/// Context for I/O operations specifically, kept separate from
/// `ErrorContext` because `Error::Io` carries a real
/// `Option<std::io::Error>` source rather than a type-erased one.
pub trait IoErrorContext<T> {
    /// Fold `context` and the I/O error into `Error::Io`, keeping the
    /// original `std::io::Error` as the source.
    fn io_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;
}

impl<T> IoErrorContext<T> for std::result::Result<T, std::io::Error> {
    fn io_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|err| Error::Io { message: format!("{context}: {err}"), source: Some(err) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_wraps_a_generic_error_as_internal() {
        let result: std::result::Result<(), std::num::ParseIntError> = "x".parse::<u32>().map(|_| ());
        let wrapped = result.context("parsing batch size");
        assert!(matches!(wrapped, Err(Error::Internal { .. })));
    }

    #[test]
    fn io_context_preserves_the_source_and_uses_the_io_variant() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let result: std::result::Result<(), std::io::Error> = Err(io_err);
        let wrapped = result.io_context("reading schema backup");
        match wrapped {
            Err(Error::Io { source: Some(source), .. }) => assert_eq!(source.kind(), std::io::ErrorKind::NotFound),
            other => panic!("expected Error::Io with a source, got {other:?}"),
        }
    }

    #[test]
    fn config_context_uses_the_config_variant() {
        let result: std::result::Result<(), std::num::ParseIntError> = "x".parse::<u32>().map(|_| ());
        assert!(matches!(result.config_context("reading batch_size"), Err(Error::Config { .. })));
    }
}
