//! Deadline and cancellation for aggregate writes

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::repository::{RepositoryError, RepositoryOperation};

/// Why a guarded write stopped before finishing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupted {
    /// The cancellation token fired
    Cancelled,
    /// The deadline passed
    DeadlineExceeded,
}

impl fmt::Display for Interrupted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => write!(f, "cancelled"),
            Self::DeadlineExceeded => write!(f, "deadline exceeded"),
        }
    }
}

impl Interrupted {
    /// Repository error reported to the caller
    pub fn into_error(self, operation: RepositoryOperation) -> RepositoryError {
        match self {
            Self::Cancelled => RepositoryError::cancelled(operation),
            Self::DeadlineExceeded => RepositoryError::timeout(operation, "Write deadline exceeded"),
        }
    }
}

/// Deadline and cancellation token carried by one write request
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use davet_store::aggregate::WriteContext;
/// use tokio_util::sync::CancellationToken;
///
/// let token = CancellationToken::new();
/// let ctx = WriteContext::new()
///     .with_timeout(Duration::from_secs(5))
///     .with_cancellation(token.clone());
///
/// token.cancel();
/// assert!(ctx.interrupted().is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct WriteContext {
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl WriteContext {
    /// Context without a deadline that is never cancelled unless its token is
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Expire `timeout` from now
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Expire at `deadline`
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Stop when `token` is cancelled
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Deadline, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Token observed by guarded writes
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Whether the context is already cancelled or expired
    pub fn interrupted(&self) -> Option<Interrupted> {
        if self.cancel.is_cancelled() {
            Some(Interrupted::Cancelled)
        } else if self.deadline.is_some_and(|deadline| deadline <= Instant::now()) {
            Some(Interrupted::DeadlineExceeded)
        } else {
            None
        }
    }

    /// Run `work` until it finishes, the token fires or the deadline passes
    ///
    /// On interruption `work` is dropped mid-flight.
    pub async fn guard<F: Future>(&self, work: F) -> Result<F::Output, Interrupted> {
        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;

            () = self.cancel.cancelled() => Err(Interrupted::Cancelled),
            () = deadline => Err(Interrupted::DeadlineExceeded),
            output = work => Ok(output),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::RepositoryErrorKind;

    #[tokio::test]
    async fn test_guard_passes_through_output() {
        let ctx = WriteContext::new();
        assert_eq!(ctx.guard(async { 7 }).await, Ok(7));
    }

    #[tokio::test]
    async fn test_guard_stops_on_cancellation() {
        let token = CancellationToken::new();
        let ctx = WriteContext::new().with_cancellation(token.clone());
        token.cancel();
        let result = ctx.guard(std::future::pending::<()>()).await;
        assert_eq!(result, Err(Interrupted::Cancelled));
    }

    #[tokio::test]
    async fn test_guard_stops_at_deadline() {
        let ctx = WriteContext::new().with_timeout(Duration::from_millis(50));
        let result = ctx.guard(tokio::time::sleep(Duration::from_secs(10))).await;
        assert_eq!(result, Err(Interrupted::DeadlineExceeded));
    }

    #[tokio::test]
    async fn test_expired_deadline_is_reported_before_running() {
        let ctx = WriteContext::new().with_deadline(Instant::now() - Duration::from_millis(1));
        assert_eq!(ctx.interrupted(), Some(Interrupted::DeadlineExceeded));
        assert_eq!(WriteContext::new().interrupted(), None);
    }

    #[test]
    fn test_interruption_error_kinds() {
        let op = RepositoryOperation::Transaction;
        assert_eq!(Interrupted::Cancelled.into_error(op).kind, RepositoryErrorKind::Cancelled);
        assert_eq!(
            Interrupted::DeadlineExceeded.into_error(op).kind,
            RepositoryErrorKind::Timeout
        );
    }
}
