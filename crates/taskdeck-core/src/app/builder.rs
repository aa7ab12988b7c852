//! AutoCompleterBuilder - auto-complete パイプラインの構築
//!
//! # Fail-fast 設計
//! - build() 時に設定を検証し、不正なら BuildError を返す
//! - 検証を通ったら worker を spawn して `AutoCompleter` を返す

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use super::lifecycle::AutoCompleter;
use crate::config::Config;
use crate::ports::TaskStore;

/// BuildError は auto-completer 構築時のエラー
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("worker count must be at least 1")]
    NoWorkers,

    #[error("worker count {requested} exceeds the limit of {max}")]
    TooManyWorkers { requested: usize, max: usize },

    #[error("queue capacity must be at least 1")]
    NoQueueCapacity,

    #[error("queue capacity {requested} exceeds the limit of {max}")]
    QueueCapacityTooLarge { requested: usize, max: usize },

    #[error("enqueue timeout must be greater than zero")]
    ZeroEnqueueTimeout,
}

/// Upper bound on the worker pool size.
pub const MAX_WORKERS: usize = 1024;

/// Largest bounded channel tokio can build.
pub const MAX_QUEUE_CAPACITY: usize = Semaphore::MAX_PERMITS;

/// # 使用例
/// ```ignore
/// let completer = AutoCompleterBuilder::new(store)
///     .workers(4)
///     .delay(Duration::from_secs(300))
///     .build()?;
/// ```
pub struct AutoCompleterBuilder {
    store: Arc<dyn TaskStore>,
    config: Config,
}

impl AutoCompleterBuilder {
    /// Defaults come from [`Config::default`].
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self {
            store,
            config: Config::default(),
        }
    }

    /// Replace every setting at once.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    /// Zero is allowed: tasks complete as soon as a worker picks them up.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.config.auto_complete_delay = delay;
        self
    }

    pub fn enqueue_timeout(mut self, timeout: Duration) -> Self {
        self.config.enqueue_timeout = timeout;
        self
    }

    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.config.shutdown_timeout = timeout;
        self
    }

    /// Validate and start the workers.
    ///
    /// Must be called from inside a Tokio runtime.
    pub fn build(self) -> Result<AutoCompleter, BuildError> {
        let config = self.config;
        if config.workers == 0 {
            return Err(BuildError::NoWorkers);
        }
        if config.workers > MAX_WORKERS {
            return Err(BuildError::TooManyWorkers {
                requested: config.workers,
                max: MAX_WORKERS,
            });
        }
        if config.queue_capacity == 0 {
            return Err(BuildError::NoQueueCapacity);
        }
        if config.queue_capacity > MAX_QUEUE_CAPACITY {
            return Err(BuildError::QueueCapacityTooLarge {
                requested: config.queue_capacity,
                max: MAX_QUEUE_CAPACITY,
            });
        }
        if config.enqueue_timeout.is_zero() {
            return Err(BuildError::ZeroEnqueueTimeout);
        }

        Ok(AutoCompleter::start(
            self.store,
            config.workers,
            config.queue_capacity,
            config.auto_complete_delay,
            config.enqueue_timeout,
            config.shutdown_timeout,
        ))
    }
}
