use tokio::task::JoinHandle;
use std::collections::HashMap;
use crate::error::{Error, Result};
use tracing::{info, error};

/// Tracks the long-running service tasks (HTTP servers, limiter eviction).
///
/// A task that finishes before shutdown is reported by [`check_health`].
/// On shutdown, [`join_all`] waits for graceful exits and reports panics.
///
/// [`check_health`]: TaskSupervisor::check_health
/// [`join_all`]: TaskSupervisor::join_all
pub struct TaskSupervisor {
    tasks: HashMap<String, JoinHandle<()>>,
}

impl TaskSupervisor {
    pub fn new() -> Self {
        TaskSupervisor {
            tasks: HashMap::new(),
        }
    }

    /// Spawn a new background task and register it for monitoring
    pub fn spawn<F>(&mut self, name: impl Into<String>, future: F) -> &mut Self
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        let handle = tokio::spawn(future);

        info!("Spawned task: {}", name);
        self.tasks.insert(name, handle);
        self
    }

    /// Returns an error naming any task that has already terminated.
    pub fn check_health(&mut self) -> Result<()> {
        let finished: Vec<String> = self.tasks.iter()
            .filter(|(_, handle)| handle.is_finished())
            .map(|(name, _)| name.clone())
            .collect();

        if finished.is_empty() {
            return Ok(());
        }

        for name in &finished {
            self.tasks.remove(name);
        }

        let error_msg = format!("Tasks terminated unexpectedly: {:?}", finished);
        error!("{}", error_msg);
        Err(Error::TaskFailure(error_msg))
    }

    pub fn active_task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Waits for every task to finish. Fails if any of them panicked.
    ///
    /// A task leaves the supervisor only once it has finished, so if this future
    /// is dropped early the remaining tasks can still be passed to [`abort_all`].
    ///
    /// [`abort_all`]: TaskSupervisor::abort_all
    pub async fn join_all(&mut self) -> Result<()> {
        let mut failed = Vec::new();
        let names: Vec<String> = self.tasks.keys().cloned().collect();

        for name in names {
            let Some(handle) = self.tasks.get_mut(&name) else {
                continue;
            };
            let outcome = handle.await;
            self.tasks.remove(&name);

            match outcome {
                Ok(()) => info!("Task {} completed", name),
                Err(e) => {
                    error!("Task {} failed: {:?}", name, e);
                    failed.push(name);
                }
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(Error::TaskFailure(format!("Tasks failed: {:?}", failed)))
        }
    }

    /// Aborts every task without waiting for a graceful exit.
    pub fn abort_all(&mut self) {
        info!("Aborting {} tasks", self.tasks.len());

        for (name, handle) in self.tasks.drain() {
            handle.abort();
            info!("Aborted task: {}", name);
        }
    }
}

impl Default for TaskSupervisor {
    fn default() -> Self {
        Self::new()
    }
}
