//! Bounded FIFO job queue for scan attempts.

use acuity_audit::error::{Result, ScanError};
use acuity_audit::ScanRunner;
use acuity_core::{AuditResult, ScanRequest};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

/// A queued scan request together with its result continuation.
///
/// Consumed exactly once by the dispatcher; discarded after the result
/// has been sent back to the submitter.
struct QueueEntry {
    request: ScanRequest,
    tx: oneshot::Sender<Result<AuditResult>>,
}

/// Mutable queue state: the running-attempt counter and the FIFO backlog.
///
/// Mutated only at well-defined points (enqueue, dispatch, completion),
/// always briefly, under one lock.
struct QueueState {
    running: usize,
    waiting: VecDeque<QueueEntry>,
}

struct Inner<R> {
    runner: R,
    limit: usize,
    state: Mutex<QueueState>,
}

impl<R> Inner<R> {
    fn state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<R: ScanRunner + 'static> Inner<R> {
    /// Admit waiting entries while slots are free.
    ///
    /// Called on every enqueue and on every attempt completion; the
    /// latter is what lets the backlog progress without any timer.
    fn dispatch(self: &Arc<Self>) {
        loop {
            let entry = {
                let mut state = self.state();
                if state.running >= self.limit {
                    break;
                }
                let Some(entry) = state.waiting.pop_front() else {
                    break;
                };
                state.running += 1;
                entry
            };

            tracing::debug!("admitting scan attempt for {}", entry.request.url);

            let inner = Arc::clone(self);
            tokio::spawn(async move {
                // Releases the slot when the task ends for any reason,
                // a panicking runner included.
                let _slot = SlotGuard {
                    inner: Arc::clone(&inner),
                };

                let result = inner.runner.run_scan(&entry.request).await;

                // The submitter may have stopped waiting; the attempt's
                // result is simply discarded then.
                let _ = entry.tx.send(result);
            });
        }
    }
}

/// Holds one admitted slot; gives it back and re-triggers dispatch on
/// drop, so an attempt that unwinds cannot leak its slot.
struct SlotGuard<R: ScanRunner + 'static> {
    inner: Arc<Inner<R>>,
}

impl<R: ScanRunner + 'static> Drop for SlotGuard<R> {
    fn drop(&mut self) {
        self.inner.state().running -= 1;
        self.inner.dispatch();
    }
}

/// Admission-control layer in front of the scan pipeline.
///
/// Admits at most `limit` concurrently running attempts; everything else
/// waits in arrival order. There is no maximum backlog depth and no
/// cancellation of already-admitted entries. Failures pass through to
/// the submitter unchanged; retry policy lives with the caller.
pub struct AuditQueue<R> {
    inner: Arc<Inner<R>>,
}

impl<R> Clone for AuditQueue<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: ScanRunner + 'static> AuditQueue<R> {
    /// Create a queue admitting at most `limit` concurrent attempts.
    #[must_use]
    pub fn new(runner: R, limit: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                runner,
                limit: limit.max(1),
                state: Mutex::new(QueueState {
                    running: 0,
                    waiting: VecDeque::new(),
                }),
            }),
        }
    }

    /// Submit a scan request and wait for its result.
    pub async fn submit(&self, request: ScanRequest) -> Result<AuditResult> {
        let rx = self.enqueue(request);
        rx.await.unwrap_or(Err(ScanError::Interrupted))
    }

    /// Append a request to the backlog and trigger dispatch.
    ///
    /// The entry joins the waiting list synchronously, so the arrival
    /// order of `enqueue` calls is the service order. Must be called
    /// from within a tokio runtime.
    pub fn enqueue(&self, request: ScanRequest) -> oneshot::Receiver<Result<AuditResult>> {
        let (tx, rx) = oneshot::channel();
        {
            let mut state = self.inner.state();
            state.waiting.push_back(QueueEntry { request, tx });
        }
        self.inner.dispatch();
        rx
    }

    /// Number of attempts currently running.
    #[must_use]
    pub fn running(&self) -> usize {
        self.inner.state().running
    }

    /// Number of entries waiting for a slot.
    #[must_use]
    pub fn backlog(&self) -> usize {
        self.inner.state().waiting.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acuity_core::AuditResult;

    struct NoopRunner;

    #[async_trait::async_trait]
    impl ScanRunner for NoopRunner {
        async fn run_scan(&self, request: &ScanRequest) -> Result<AuditResult> {
            Ok(AuditResult::new(request.url.clone(), Vec::new(), 0, 0))
        }
    }

    #[tokio::test]
    async fn test_counters_start_empty() {
        let queue = AuditQueue::new(NoopRunner, 2);
        assert_eq!(queue.running(), 0);
        assert_eq!(queue.backlog(), 0);
    }

    #[tokio::test]
    async fn test_zero_limit_clamped_to_one() {
        // A queue that can never admit anything would deadlock every
        // submitter; the limit floor keeps that misconfiguration safe.
        let queue = AuditQueue::new(NoopRunner, 0);
        let result = queue.submit(ScanRequest::new("https://example.com")).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_submit_returns_runner_result() {
        let queue = AuditQueue::new(NoopRunner, 2);
        let result = queue
            .submit(ScanRequest::new("https://example.com"))
            .await
            .expect("scan result");
        assert_eq!(result.summary.url, "https://example.com");
    }
}
