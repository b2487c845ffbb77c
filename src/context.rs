use std::future::{pending, Future};
use std::time::Duration;

use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use crate::{FetchError, Result};

/// Cancellation and deadline signals attached to a request.
///
/// The default context never fires. Cancelling the token or passing the
/// deadline aborts the in-flight transport call and any pending retry wait.
///
/// ```no_run
/// use std::time::Duration;
/// use fetch_http::{CancellationToken, FetchClient, RequestContext};
///
/// # async fn run() -> fetch_http::Result<()> {
/// let client = FetchClient::new()?;
/// let token = CancellationToken::new();
/// let ctx = RequestContext::background()
///     .with_cancellation(token.clone())
///     .with_timeout(Duration::from_secs(30));
///
/// let response = client.get_ctx(&ctx, "https://example.com", None).await?;
/// # let _ = response;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    cancel: Option<CancellationToken>,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Sets an absolute deadline, keeping an earlier one if already set.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });
        self
    }

    /// Sets a deadline `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the context error if the context already fired.
    pub fn check(&self) -> Result<()> {
        if self
            .cancel
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
        {
            return Err(FetchError::Cancelled);
        }
        if self
            .deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
        {
            return Err(FetchError::DeadlineExceeded);
        }
        Ok(())
    }

    /// Resolves with the context error once the context fires.
    ///
    /// Never resolves for a background context.
    pub async fn done(&self) -> FetchError {
        let cancelled = async {
            match &self.cancel {
                Some(token) => token.cancelled().await,
                None => pending::<()>().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => sleep_until(deadline).await,
                None => pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            () = cancelled => FetchError::Cancelled,
            () = expired => FetchError::DeadlineExceeded,
        }
    }

    /// Runs `future` unless the context fires first.
    pub(crate) async fn run<F, T>(&self, future: F) -> Result<T>
    where
        F: Future<Output = T>,
    {
        self.check()?;
        tokio::select! {
            biased;
            err = self.done() => Err(err),
            output = future => Ok(output),
        }
    }
}
