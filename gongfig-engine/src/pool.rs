use gongfig_core::SyncError;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

/// Bounded set of in-flight admin API tasks.
///
/// `spawn` waits for a free slot before starting a task; the slot is given
/// back when the task finishes. `drain` is the barrier: it returns once every
/// task spawned so far has finished, or with the first error. Dropping the
/// pool aborts whatever is still running.
pub struct WorkerPool {
    slots: Arc<Semaphore>,
    tasks: JoinSet<Result<(), SyncError>>,
}

impl WorkerPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Arc::new(Semaphore::new(capacity.max(1))),
            tasks: JoinSet::new(),
        }
    }

    pub async fn spawn<F>(&mut self, task: F) -> Result<(), SyncError>
    where
        F: Future<Output = Result<(), SyncError>> + Send + 'static,
    {
        // Surface failures of finished tasks before queueing more work.
        while let Some(done) = self.tasks.try_join_next() {
            flatten(done)?;
        }

        let permit = Arc::clone(&self.slots)
            .acquire_owned()
            .await
            .map_err(|_| SyncError::Internal("worker pool closed".into()))?;

        self.tasks.spawn(async move {
            let _permit = permit;
            task.await
        });
        Ok(())
    }

    pub async fn drain(&mut self) -> Result<(), SyncError> {
        while let Some(done) = self.tasks.join_next().await {
            if let Err(e) = flatten(done) {
                self.tasks.abort_all();
                return Err(e);
            }
        }
        Ok(())
    }
}

fn flatten(done: Result<Result<(), SyncError>, JoinError>) -> Result<(), SyncError> {
    done.map_err(|e| SyncError::Internal(format!("worker task failed: {e}")))?
}
