//! Tokio backend for the synchronous bridge.
//!
//! Every call builds its own Tokio runtime from the [`BridgeConfig`], drives
//! exactly one future on it, and drops the runtime before returning. Tasks
//! spawned by the future never outlive the call.
//!
//! # Example
//!
//! ```rust
//! use testkit_helpers::bridge::tokio::TokioExecutor;
//! use testkit_helpers::bridge::{BridgeConfig, Executor};
//!
//! let config = BridgeConfig::new().multi_thread(2);
//! let value = TokioExecutor::new(&config).block_on(async {
//!     tokio::spawn(async { 21 * 2 }).await.unwrap()
//! });
//! assert_eq!(value, 42);
//! ```

use std::future::Future;

use ::tokio::runtime::{Builder, Runtime};

use super::{BridgeConfig, Executor, Flavor};
use crate::error::Result;

/// Drives a future on a dedicated Tokio runtime.
#[derive(Debug, Clone, Copy)]
pub struct TokioExecutor<'a> {
    config: &'a BridgeConfig,
}

impl<'a> TokioExecutor<'a> {
    /// Create an executor for the given configuration.
    #[must_use]
    pub fn new(config: &'a BridgeConfig) -> Self {
        Self { config }
    }

    /// Build the per-call runtime.
    ///
    /// # Errors
    ///
    /// Returns the builder's I/O error if the runtime cannot be created.
    pub fn build_runtime(&self) -> Result<Runtime> {
        let mut builder = match self.config.flavor {
            Flavor::CurrentThread => Builder::new_current_thread(),
            Flavor::MultiThread => {
                let mut builder = Builder::new_multi_thread();
                if let Some(workers) = self.config.worker_threads {
                    builder.worker_threads(workers.max(1));
                }
                builder
            }
        };
        if self.config.enable_time {
            builder.enable_time();
        }
        if self.config.enable_io {
            builder.enable_io();
        }
        if let Some(name) = &self.config.thread_name {
            builder.thread_name(name.clone());
        }
        Ok(builder.build()?)
    }
}

impl Executor for TokioExecutor<'_> {
    fn try_block_on<F: Future>(&self, future: F) -> Result<F::Output> {
        let runtime = self.build_runtime()?;
        Ok(runtime.block_on(future))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_current_thread_runs_future() {
        let config = BridgeConfig::default();
        let value = TokioExecutor::new(&config).block_on(async { 7 });
        assert_eq!(value, 7);
    }

    #[test]
    fn test_time_driver_enabled_by_default() {
        let config = BridgeConfig::default();
        let value = TokioExecutor::new(&config).block_on(async {
            ::tokio::time::sleep(Duration::from_millis(1)).await;
            "slept"
        });
        assert_eq!(value, "slept");
    }

    #[test]
    fn test_multi_thread_spawn() {
        let config = BridgeConfig::new().multi_thread(2);
        let value = TokioExecutor::new(&config).block_on(async {
            ::tokio::spawn(async { 40 + 2 }).await.unwrap()
        });
        assert_eq!(value, 42);
    }

    #[test]
    fn test_thread_name_applied() {
        let config = BridgeConfig::new().multi_thread(1).thread_name("bridge-test");
        let name = TokioExecutor::new(&config).block_on(async {
            ::tokio::spawn(async { std::thread::current().name().map(str::to_owned) })
                .await
                .unwrap()
        });
        assert_eq!(name.as_deref(), Some("bridge-test"));
    }

    #[test]
    fn test_spawned_tasks_do_not_outlive_call() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let counter = Arc::new(AtomicUsize::new(0));
        let task_counter = Arc::clone(&counter);
        let config = BridgeConfig::default();
        TokioExecutor::new(&config).block_on(async move {
            ::tokio::spawn(async move {
                ::tokio::time::sleep(Duration::from_secs(60)).await;
                task_counter.fetch_add(1, Ordering::SeqCst);
            });
        });

        // The runtime dropped the pending task along with its captures.
        assert_eq!(Arc::strong_count(&counter), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
