//! smol backend for the synchronous bridge.
//!
//! Each call runs its future inside a fresh `LocalExecutor`, so tasks spawned
//! on that executor are dropped together with it when the call returns.
//! smol always drives the future on the calling thread, so a configuration
//! asking for a multi-threaded scheduler, worker threads or a thread name is
//! rejected with [`Error::UnsupportedConfig`] instead of being ignored.

use std::future::Future;

use ::smol::LocalExecutor;

use super::{BridgeConfig, Executor, Flavor};
use crate::error::{Error, Result};

/// Reject configuration the smol backend cannot honor.
///
/// # Errors
///
/// Returns [`Error::UnsupportedConfig`] for the multi-threaded flavor, an
/// explicit worker count or a thread name.
pub fn check_config(config: &BridgeConfig) -> Result<()> {
    if config.flavor == Flavor::MultiThread {
        return Err(Error::unsupported_config(
            "the smol backend runs on the calling thread; use Flavor::CurrentThread",
        ));
    }
    if let Some(workers) = config.worker_threads {
        return Err(Error::unsupported_config(format!(
            "the smol backend has no worker threads (requested {workers})"
        )));
    }
    if let Some(name) = &config.thread_name {
        return Err(Error::unsupported_config(format!(
            "the smol backend cannot name threads (requested {name:?})"
        )));
    }
    if !config.enable_time || !config.enable_io {
        // smol's reactor is global; its drivers cannot be switched off per call.
        tracing::warn!("smol backend ignores disabled time/io drivers");
    }
    Ok(())
}

/// Drives a future on a dedicated smol executor.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmolExecutor;

impl SmolExecutor {
    /// Create a new smol executor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Executor for SmolExecutor {
    fn try_block_on<F: Future>(&self, future: F) -> Result<F::Output> {
        let executor = LocalExecutor::new();
        Ok(::smol::block_on(executor.run(future)))
    }
}
