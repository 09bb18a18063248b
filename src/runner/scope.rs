//! Scoped ownership of driver handles.
//!
//! A `Scoped` handle is released exactly once: explicitly through `release`,
//! which reports close failures, or on drop, which can only log them. Drop
//! covers early returns and unwinding out of a continuation.

use std::ops::{Deref, DerefMut};

use tracing::{debug, warn};

use crate::db::{Connection, Cursor, Statement};
use crate::error::{DriverError, DriverResult, Result, RunnerError};

/// A driver handle with a close operation.
pub(crate) trait Release {
    const NAME: &'static str;

    fn close_handle(&mut self) -> DriverResult<()>;

    fn close_error(source: DriverError) -> RunnerError;
}

impl Release for dyn Connection {
    const NAME: &'static str = "connection";

    fn close_handle(&mut self) -> DriverResult<()> {
        self.close()
    }

    fn close_error(source: DriverError) -> RunnerError {
        RunnerError::connection("closing connection", source)
    }
}

impl<'c> Release for dyn Statement + 'c {
    const NAME: &'static str = "statement";

    fn close_handle(&mut self) -> DriverResult<()> {
        self.close()
    }

    fn close_error(source: DriverError) -> RunnerError {
        RunnerError::statement("closing statement", source)
    }
}

impl<'s> Release for dyn Cursor + 's {
    const NAME: &'static str = "cursor";

    fn close_handle(&mut self) -> DriverResult<()> {
        self.close()
    }

    fn close_error(source: DriverError) -> RunnerError {
        RunnerError::statement("closing cursor", source)
    }
}

pub(crate) struct Scoped<T: ?Sized + Release> {
    handle: Box<T>,
    released: bool,
}

impl<T: ?Sized + Release> Scoped<T> {
    pub(crate) fn new(handle: Box<T>) -> Self {
        debug!("Acquired {}", T::NAME);
        Self {
            handle,
            released: false,
        }
    }

    /// Closes the handle. Later calls, and the drop, do nothing.
    pub(crate) fn release(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        debug!("Releasing {}", T::NAME);
        self.handle.close_handle().map_err(T::close_error)
    }
}

impl<T: ?Sized + Release> Deref for Scoped<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.handle
    }
}

impl<T: ?Sized + Release> DerefMut for Scoped<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.handle
    }
}

impl<T: ?Sized + Release> Drop for Scoped<T> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!("Failed to release {} during cleanup: {}", T::NAME, e);
        }
    }
}

/// Combines the outcome of a scope with the result of releasing its handle.
///
/// A release failure is returned when the scope itself succeeded. When both
/// failed, the scope's error wins and the release failure is logged.
pub(crate) fn settle<T>(outcome: Result<T>, released: Result<()>) -> Result<T> {
    match (outcome, released) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(release_error)) => {
            warn!("Release failed after an earlier error: {}", release_error);
            Err(e)
        }
    }
}
