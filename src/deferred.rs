//! Deferred values and the streamed payloads that deliver them.
//!
//! A loader returns the data it already has plus a set of named
//! [`Deferred`] values. [`StreamedPayload`] renders that as newline-delimited
//! JSON: the immediate data first, then one line per deferred value in the
//! order they finish. A failing value produces an error line for its key
//! and does not hold back the others.

use std::future::Future;

use axum::{
    body::Body,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use futures::{
    future::BoxFuture,
    stream::{self, FuturesUnordered, StreamExt},
    FutureExt,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio::task::JoinHandle;

use crate::error::{Error, Result};

/// Content type of streamed payloads.
pub const NDJSON: &str = "application/x-ndjson";

/// A value being computed in the background.
///
/// The work starts as soon as the value is created; awaiting
/// [`Deferred::resolve`] only collects the result. Dropping an unresolved
/// value aborts the task, so a client that disconnects mid-stream stops its
/// pending queries.
#[derive(Debug)]
pub struct Deferred<T> {
    handle: JoinHandle<Result<T>>,
}

impl<T: Send + 'static> Deferred<T> {
    /// Start `future` on the runtime.
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        Self {
            handle: tokio::spawn(future),
        }
    }

    /// Wait for the value.
    pub async fn resolve(mut self) -> Result<T> {
        match (&mut self.handle).await {
            Ok(result) => result,
            Err(e) => Err(Error::Internal(format!("deferred task failed: {e}"))),
        }
    }
}

impl<T> Drop for Deferred<T> {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

type Branch = BoxFuture<'static, (&'static str, Result<Value>)>;

/// Immediate data plus named deferred values.
#[derive(Default)]
pub struct StreamedPayload {
    data: Map<String, Value>,
    branches: Vec<Branch>,
}

impl StreamedPayload {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field delivered with the first line.
    pub fn field(mut self, key: &str, value: impl Serialize) -> Result<Self> {
        let value = serde_json::to_value(value)
            .map_err(|e| Error::Internal(format!("failed to serialize {key}: {e}")))?;
        self.data.insert(key.to_string(), value);
        Ok(self)
    }

    /// Add a value delivered on its own line once it resolves.
    #[must_use]
    pub fn deferred<T>(mut self, key: &'static str, value: Deferred<T>) -> Self
    where
        T: Serialize + Send + 'static,
    {
        let branch = async move {
            let result = value.resolve().await.and_then(|v| {
                serde_json::to_value(v)
                    .map_err(|e| Error::Internal(format!("failed to serialize {key}: {e}")))
            });
            (key, result)
        };
        self.branches.push(branch.boxed());
        self
    }

    /// Resolve everything into one JSON document, keyed like the stream.
    ///
    /// Failed values become `{"error": "..."}`.
    pub async fn collect(self) -> Value {
        let mut data = self.data;
        let mut pending: FuturesUnordered<Branch> = self.branches.into_iter().collect();
        while let Some((key, result)) = pending.next().await {
            let value = match result {
                Ok(value) => value,
                Err(e) => json!({ "error": e.to_string() }),
            };
            data.insert(key.to_string(), value);
        }
        Value::Object(data)
    }

    fn into_lines(self) -> impl futures::Stream<Item = Value> + Send {
        let head = json!({ "type": "data", "data": Value::Object(self.data) });
        let pending: FuturesUnordered<Branch> = self.branches.into_iter().collect();

        stream::once(async move { head }).chain(pending.map(|(key, result)| match result {
            Ok(data) => json!({ "type": "chunk", "key": key, "data": data }),
            Err(e) => {
                tracing::warn!(key, error = %e, "deferred value failed");
                json!({ "type": "chunk", "key": key, "error": e.to_string() })
            }
        }))
    }
}

impl IntoResponse for StreamedPayload {
    fn into_response(self) -> Response {
        let body = self.into_lines().map(|line| {
            let mut bytes = serde_json::to_vec(&line)?;
            bytes.push(b'\n');
            Ok::<_, serde_json::Error>(bytes)
        });

        let mut response = Response::new(Body::from_stream(body));
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(NDJSON));
        response
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_deferred_resolves() {
        let value = Deferred::spawn(async { Ok(7) });
        assert_eq!(value.resolve().await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_deferred_starts_before_resolve() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let value = Deferred::spawn(async move {
            tx.send(()).ok();
            Ok(())
        });

        // Completes without anyone awaiting the deferred value.
        rx.await.unwrap();
        value.resolve().await.unwrap();
    }

    #[tokio::test]
    async fn test_dropping_deferred_aborts_task() {
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let value = Deferred::<()>::spawn(async move {
            let _tx = tx;
            futures::future::pending::<()>().await;
            Ok(())
        });

        drop(value);
        // The aborted task drops its sender without sending.
        assert!(rx.await.is_err());
    }

    #[tokio::test]
    async fn test_dropping_stream_aborts_pending_values() {
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let payload = StreamedPayload::new().deferred(
            "never",
            Deferred::<()>::spawn(async move {
                let _tx = tx;
                futures::future::pending::<()>().await;
                Ok(())
            }),
        );

        let mut lines = Box::pin(payload.into_lines());
        assert_eq!(lines.next().await.unwrap()["type"], "data");
        drop(lines);
        assert!(rx.await.is_err());
    }

    #[tokio::test]
    async fn test_deferred_panic_is_internal_error() {
        let value = Deferred::<()>::spawn(async {
            if true {
                panic!("boom");
            }
            Ok(())
        });
        assert!(matches!(value.resolve().await, Err(Error::Internal(_))));
    }

    #[tokio::test]
    async fn test_stream_orders_by_completion() {
        let payload = StreamedPayload::new()
            .field("items", json!({}))
            .unwrap()
            .deferred(
                "slow",
                Deferred::spawn(async {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok(1)
                }),
            )
            .deferred("fast", Deferred::spawn(async { Ok(2) }));

        let lines: Vec<Value> = payload.into_lines().collect().await;
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["type"], "data");
        assert_eq!(lines[1]["key"], "fast");
        assert_eq!(lines[2]["key"], "slow");
        assert_eq!(lines[2]["data"], 1);
    }

    #[tokio::test]
    async fn test_failed_branch_does_not_block_others() {
        let payload = StreamedPayload::new()
            .deferred(
                "broken",
                Deferred::<i32>::spawn(async { Err(Error::Internal("nope".into())) }),
            )
            .deferred("fine", Deferred::spawn(async { Ok("ok") }));

        let doc = payload.collect().await;
        assert_eq!(doc["fine"], "ok");
        assert_eq!(doc["broken"]["error"], "internal error: nope");
    }
}
