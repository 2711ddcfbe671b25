//! Timeout guard around a `Session`.
//!
//! Opening a session and each query run on a short-lived watchdog thread
//! that hands its result back over a crossbeam channel. If the budget
//! elapses first the caller gets `TransportError::Timeout` immediately; a
//! query that overruns leaves the session with the stuck thread and every
//! later call on this guard fails with `SessionLost`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::RecvTimeoutError;
use grantplan_core::errors::TransportError;
use grantplan_core::traits::{QueryResult, Session, SessionFactory};

/// Query label reported when opening the session overruns its budget.
pub const OPEN_SESSION: &str = "<open session>";

/// A session owned by exactly one unit of work, with a per-query budget.
pub struct BoundedSession {
    inner: Option<Box<dyn Session>>,
    timeout: Duration,
}

impl BoundedSession {
    pub fn new(session: Box<dyn Session>, timeout: Duration) -> Self {
        Self {
            inner: Some(session),
            timeout,
        }
    }

    /// Open a fresh session for one unit of work. The connect itself runs
    /// under the same budget as a query.
    pub fn open(
        factory: &Arc<dyn SessionFactory>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let factory = Arc::clone(factory);
        let waited = watched("grantplan-connect", timeout, move || factory.open()).map_err(
            |e| TransportError::ConnectFailed {
                message: format!("could not start connect thread: {e}"),
            },
        )?;

        match waited {
            Ok(session) => Ok(Self::new(session?, timeout)),
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    "opening a session exceeded its budget"
                );
                Err(TransportError::Timeout {
                    query: OPEN_SESSION.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
            Err(RecvTimeoutError::Disconnected) => Err(TransportError::ConnectFailed {
                message: "session factory panicked while connecting".to_string(),
            }),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run one query under the budget.
    pub fn query(&mut self, sql: &str) -> Result<QueryResult, TransportError> {
        let mut session = self.inner.take().ok_or(TransportError::SessionLost)?;
        let timeout = self.timeout;
        let owned_sql = sql.to_string();
        let started = Instant::now();

        let waited = watched("grantplan-query", timeout, move || {
            let result = session.execute(&owned_sql, timeout);
            (session, result)
        })
        .map_err(|e| TransportError::QueryFailed {
            query: sql.to_string(),
            message: format!("could not start query thread: {e}"),
        })?;

        match waited {
            Ok((session, result)) => {
                self.inner = Some(session);
                tracing::trace!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    sql,
                    "query finished"
                );
                result
            }
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    sql,
                    "query exceeded its budget"
                );
                Err(TransportError::Timeout {
                    query: sql.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
            Err(RecvTimeoutError::Disconnected) => Err(TransportError::QueryFailed {
                query: sql.to_string(),
                message: "session panicked while executing the query".to_string(),
            }),
        }
    }

    /// Whether an earlier timeout or panic took the session away.
    pub fn is_lost(&self) -> bool {
        self.inner.is_none()
    }
}

impl std::fmt::Debug for BoundedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedSession")
            .field("timeout", &self.timeout)
            .field("lost", &self.is_lost())
            .finish()
    }
}

/// Run `work` on a named thread and wait at most `timeout` for its result.
fn watched<T, F>(
    name: &str,
    timeout: Duration,
    work: F,
) -> std::io::Result<Result<T, RecvTimeoutError>>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = crossbeam_channel::bounded(1);
    std::thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            // The receiver is gone once the caller has timed out.
            let _ = tx.send(work());
        })?;
    Ok(rx.recv_timeout(timeout))
}
