//! Bounded task executor for child-dependency reads and downloads.
//!
//! Procurer calls are synchronous blocking I/O, so tasks run on the blocking
//! pool, gated by a semaphore sized to the caller's `threads` argument.
//! Task failures are captured as values and surface when the driver joins
//! the pending task; `shutdown` closes the gate so queued tasks fail fast
//! and in-flight ones are left to finish detached.

use javelin_util::errors::{JavelinError, JavelinResult};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// A bounded worker pool. Not reentrant: create one per resolve call and
/// shut it down when the call ends.
pub struct TaskExecutor {
    semaphore: Arc<Semaphore>,
}

/// A submitted task's pending result.
pub struct PendingTask<T> {
    handle: JoinHandle<JavelinResult<T>>,
}

impl TaskExecutor {
    pub fn new(threads: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(threads.max(1))),
        }
    }

    /// Submit a blocking task. Returns immediately; the task starts once a
    /// worker slot frees up.
    pub fn submit<T, F>(&self, task: F) -> PendingTask<T>
    where
        T: Send + 'static,
        F: FnOnce() -> JavelinResult<T> + Send + 'static,
    {
        let semaphore = self.semaphore.clone();
        let handle = tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await.map_err(|_| {
                JavelinError::Interrupted {
                    message: "executor shut down before task started".to_string(),
                }
            })?;
            match tokio::task::spawn_blocking(task).await {
                Ok(result) => result,
                Err(e) => Err(JavelinError::Invariant {
                    message: format!("worker task panicked: {e}"),
                }
                .into()),
            }
        });
        PendingTask { handle }
    }

    /// Stop admitting queued tasks. In-flight tasks are not joined; their
    /// results are discarded by whoever drops the pending handles.
    pub fn shutdown(&self) {
        self.semaphore.close();
    }
}

impl<T> PendingTask<T> {
    /// Await the task's captured result.
    pub async fn join(self) -> JavelinResult<T> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(JavelinError::Invariant {
                message: format!("worker task aborted: {e}"),
            }
            .into()),
        }
    }
}
