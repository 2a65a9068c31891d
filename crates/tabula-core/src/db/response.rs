//! Completion objects.
//!
//! Every query-producing or schema-mutating operation returns a
//! [`Completion`]: a single-shot asynchronous result with a side-channel
//! of informational "generated SQL" events. Exactly one terminal event
//! fires per call, and it always fires from a later scheduling point,
//! never inline — callers may attach interest after issuing the call.
//!
//! Operations must therefore be issued from within a tokio runtime.

use crate::{error::Error, value::Value};
use std::{fmt, future::Future, pin::Pin};
use thiserror::Error as ThisError;
use tokio::sync::{mpsc, oneshot};

///
/// ResponseError
///

#[derive(Debug, ThisError)]
pub enum ResponseError {
    #[error("completion dropped without a terminal event")]
    Incomplete,

    #[error("aggregate result is not numeric: {value:?}")]
    NonNumericScalar { value: Value },
}

///
/// SqlSink
///
/// Write side of the informational channel. Drivers report every piece
/// of generated query text here; delivery failures are ignored because
/// the caller may have dropped its interest in diagnostics.
///

#[derive(Clone)]
pub struct SqlSink {
    tx: mpsc::UnboundedSender<String>,
}

impl SqlSink {
    pub fn emit(&self, sql: impl Into<String>) {
        let _ = self.tx.send(sql.into());
    }
}

///
/// SqlEvents
/// Read side of the informational channel.
///

pub struct SqlEvents {
    rx: mpsc::UnboundedReceiver<String>,
}

impl SqlEvents {
    /// Await the next SQL event; `None` once the operation has finished.
    pub async fn next(&mut self) -> Option<String> {
        self.rx.recv().await
    }

    /// Drain every event already delivered.
    pub fn drain(&mut self) -> Vec<String> {
        let mut events = Vec::new();
        while let Ok(sql) = self.rx.try_recv() {
            events.push(sql);
        }
        events
    }
}

///
/// Completion
///
/// The asynchronous notification object: zero or more SQL events, then
/// exactly one terminal success or error. The oneshot channel enforces
/// the single-terminal-event guarantee; a handle dropped without sending
/// (for example a panicking task) surfaces as [`ResponseError::Incomplete`].
///

pub struct Completion<T> {
    result: oneshot::Receiver<Result<T, Error>>,
    sql: Option<SqlEvents>,
}

impl<T> Completion<T> {
    pub(crate) fn channel() -> (CompletionHandle<T>, Self) {
        let (result_tx, result_rx) = oneshot::channel();
        let (sql_tx, sql_rx) = mpsc::unbounded_channel();

        let handle = CompletionHandle {
            result: result_tx,
            sql: sql_tx,
        };
        let completion = Self {
            result: result_rx,
            sql: Some(SqlEvents { rx: sql_rx }),
        };

        (handle, completion)
    }

    /// Detach the SQL event stream for concurrent observation.
    pub fn take_sql_events(&mut self) -> Option<SqlEvents> {
        self.sql.take()
    }

    /// Await the terminal event.
    pub async fn wait(self) -> Result<T, Error> {
        self.result
            .await
            .unwrap_or_else(|_| Err(ResponseError::Incomplete.into()))
    }
}

impl<T: Send + 'static> Completion<T> {
    /// Resolve with an already-known outcome, still asynchronously: the
    /// terminal event fires from a spawned task, never inline.
    pub(crate) fn resolved(outcome: Result<T, Error>) -> Self {
        let (handle, completion) = Self::channel();
        tokio::spawn(async move {
            handle.complete(outcome);
        });
        completion
    }

    /// Run blocking collaborator work off the async runtime and complete
    /// with its outcome. A panic in `work` drops the handle, which the
    /// caller observes as [`ResponseError::Incomplete`].
    pub(crate) fn from_blocking<F>(work: F) -> Self
    where
        F: FnOnce(&SqlSink) -> Result<T, Error> + Send + 'static,
    {
        let (handle, completion) = Self::channel();
        let sink = handle.sink();

        tokio::spawn(async move {
            if let Ok(outcome) = tokio::task::spawn_blocking(move || work(&sink)).await {
                handle.complete(outcome);
            }
        });

        completion
    }
}

impl<T> fmt::Debug for Completion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("sql_events_attached", &self.sql.is_some())
            .finish_non_exhaustive()
    }
}

impl<T: Send + 'static> IntoFuture for Completion<T> {
    type Output = Result<T, Error>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.wait())
    }
}

///
/// CompletionHandle
/// Producer side; consumed by the terminal event.
///

pub(crate) struct CompletionHandle<T> {
    result: oneshot::Sender<Result<T, Error>>,
    sql: mpsc::UnboundedSender<String>,
}

impl<T> CompletionHandle<T> {
    pub(crate) fn sink(&self) -> SqlSink {
        SqlSink {
            tx: self.sql.clone(),
        }
    }

    pub(crate) fn complete(self, outcome: Result<T, Error>) {
        let _ = self.result.send(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolved_completion_fires_success_later_not_inline() {
        let completion = Completion::resolved(Ok(5));
        // Interest attached after issuing the call, before the event.
        assert_eq!(completion.wait().await.expect("terminal success"), 5);
    }

    #[tokio::test]
    async fn sql_events_precede_the_terminal_event() {
        let mut completion = Completion::from_blocking(|sink| {
            sink.emit("SELECT 1");
            sink.emit("SELECT 2");
            Ok(())
        });
        let mut events = completion.take_sql_events().expect("sql stream");

        completion.wait().await.expect("terminal success");
        assert_eq!(events.next().await.as_deref(), Some("SELECT 1"));
        assert_eq!(events.next().await.as_deref(), Some("SELECT 2"));
        assert_eq!(events.next().await, None);
    }

    #[tokio::test]
    async fn panicking_work_surfaces_as_incomplete() {
        let completion: Completion<()> = Completion::from_blocking(|_| panic!("driver bug"));
        let err = completion.wait().await.expect_err("terminal error");
        assert!(matches!(err, Error::Response(ResponseError::Incomplete)));
    }

    #[tokio::test]
    async fn completion_awaits_directly_via_into_future() {
        let value = Completion::resolved(Ok("done")).await.expect("success");
        assert_eq!(value, "done");
    }
}
