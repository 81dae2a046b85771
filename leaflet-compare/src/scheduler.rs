//! Deferral of visual follow-ups until after the current task.
//!
//! Several session steps mutate the scene (add or remove a model) and then
//! apply a dependent visual effect (hide, fit to view). The effect must run
//! after the mutation has settled in the viewer, otherwise the user sees a
//! flash or the fit races the scene update. Those effects go through a
//! [`Scheduler`] instead of being called inline.

use tokio::runtime::Handle;

/// A deferred unit of work.
pub type DeferredTask = Box<dyn FnOnce() + Send + 'static>;

/// Runs tasks after the currently executing task has finished.
pub trait Scheduler: Send + Sync {
    /// Queue `task` to run after the current task.
    fn defer(&self, task: DeferredTask);
}

/// Scheduler backed by a Tokio runtime.
///
/// The task is spawned and yields once before running, so it executes after
/// the caller's current poll has returned. Holding the runtime handle keeps
/// that ordering available from threads outside the runtime as well.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }
}

impl Scheduler for TokioScheduler {
    fn defer(&self, task: DeferredTask) {
        self.handle.spawn(async move {
            tokio::task::yield_now().await;
            task();
        });
    }
}
