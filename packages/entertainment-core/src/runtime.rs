//! Scheduler abstraction for off-loading blocking device calls.
//!
//! Relay commands run as async tasks on the event loop. Devices that only
//! offer synchronous handlers are executed through a [`Scheduler`] so that a
//! slow device never stalls the loop.

use std::sync::Arc;

use async_trait::async_trait;

use crate::command::{CommandOutput, MediaCommand};
use crate::device::MediaDevice;
use crate::error::{DeviceError, DeviceResult};

/// A synchronous device call packaged for a worker thread.
pub type BlockingJob = Box<dyn FnOnce() -> DeviceResult<CommandOutput> + Send + 'static>;

/// Runs blocking work away from the event loop.
///
/// # Example
///
/// ```ignore
/// let output = scheduler
///     .run_blocking("turn_on", Box::new(move || device.handle_blocking(&command)))
///     .await?;
/// ```
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Executes `job` on a worker thread and waits for its result.
    ///
    /// `command` is only used to label errors.
    async fn run_blocking(
        &self,
        command: &'static str,
        job: BlockingJob,
    ) -> DeviceResult<CommandOutput>;
}

/// Tokio-based scheduler using the runtime's bounded blocking pool.
#[derive(Clone)]
pub struct TokioScheduler {
    handle: tokio::runtime::Handle,
}

impl TokioScheduler {
    /// Creates a new `TokioScheduler` with the given runtime handle.
    #[must_use]
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Creates a new `TokioScheduler` using the current runtime's handle.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context.
    #[must_use]
    pub fn current() -> Self {
        Self {
            handle: tokio::runtime::Handle::current(),
        }
    }

    /// Convenience for sharing as a trait object.
    pub fn arc(self) -> Arc<dyn Scheduler> {
        Arc::new(self)
    }
}

#[async_trait]
impl Scheduler for TokioScheduler {
    async fn run_blocking(
        &self,
        command: &'static str,
        job: BlockingJob,
    ) -> DeviceResult<CommandOutput> {
        self.handle
            .spawn_blocking(job)
            .await
            .map_err(|e| DeviceError::WorkerPool {
                command,
                message: e.to_string(),
            })?
    }
}

/// Packages `device.handle_blocking(command)` as a [`BlockingJob`].
pub(crate) fn blocking_call(device: Arc<dyn MediaDevice>, command: MediaCommand) -> BlockingJob {
    Box::new(move || device.handle_blocking(&command))
}
