//! Blocking bridge from synchronous code into async functions.
//!
//! Some tests need to exercise async code from a plain `#[test]` function,
//! where nothing can be awaited. [`synchronize`] turns an async function into
//! a synchronous one: every call builds a fresh runtime, drives the future to
//! completion on it, and tears the runtime down again.
//!
//! # Example
//!
//! ```rust
//! use testkit_helpers::bridge::synchronize;
//!
//! async fn double(x: i32) -> i32 {
//!     x * 2
//! }
//!
//! let double = synchronize(double);
//! assert_eq!(double(21), 42);
//! ```
//!
//! Functions taking several arguments are bridged with a tuple:
//!
//! ```rust
//! use testkit_helpers::bridge::synchronize;
//!
//! let add = synchronize(|(a, b): (i32, i32)| async move { a + b });
//! assert_eq!(add((2, 3)), 5);
//! ```
//!
//! The bridge must not be called from inside an async context that is
//! already driven by a runtime; it is meant for synchronous test code.

use std::future::Future;

use crate::error::Result;

#[cfg(feature = "smol")]
pub mod smol;
#[cfg(feature = "tokio")]
pub mod tokio;

#[cfg(not(any(feature = "tokio", feature = "smol")))]
compile_error!("testkit-helpers needs the `tokio` or `smol` feature for its bridge");

/// Which async runtime drives bridged calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// A freshly built Tokio runtime per call.
    #[cfg(feature = "tokio")]
    Tokio,
    /// A fresh smol `LocalExecutor` per call.
    #[cfg(feature = "smol")]
    Smol,
}

impl Default for Backend {
    fn default() -> Self {
        #[cfg(feature = "tokio")]
        {
            Self::Tokio
        }
        #[cfg(not(feature = "tokio"))]
        {
            Self::Smol
        }
    }
}

/// Scheduler flavor of the per-call runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Flavor {
    /// Everything runs on the calling thread.
    #[default]
    CurrentThread,
    /// A work-stealing pool owned by the call.
    MultiThread,
}

/// Configuration for bridged calls.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Runtime used to drive the future.
    pub backend: Backend,
    /// Scheduler flavor. The smol backend only supports
    /// [`Flavor::CurrentThread`].
    pub flavor: Flavor,
    /// Worker count for [`Flavor::MultiThread`].
    pub worker_threads: Option<usize>,
    /// Name given to runtime worker threads.
    pub thread_name: Option<String>,
    /// Enable the time driver.
    pub enable_time: bool,
    /// Enable the I/O driver.
    pub enable_io: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            flavor: Flavor::default(),
            worker_threads: None,
            thread_name: None,
            enable_time: true,
            enable_io: true,
        }
    }
}

impl BridgeConfig {
    /// Create a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the backend.
    #[must_use]
    pub fn backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Select the scheduler flavor.
    #[must_use]
    pub fn flavor(mut self, flavor: Flavor) -> Self {
        self.flavor = flavor;
        self
    }

    /// Use a multi-threaded scheduler with `workers` threads.
    #[must_use]
    pub fn multi_thread(mut self, workers: usize) -> Self {
        self.flavor = Flavor::MultiThread;
        self.worker_threads = Some(workers.max(1));
        self
    }

    /// Name the runtime's threads.
    #[must_use]
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = Some(name.into());
        self
    }

    /// Build runtimes without the time and I/O drivers.
    #[must_use]
    pub fn without_drivers(mut self) -> Self {
        self.enable_time = false;
        self.enable_io = false;
        self
    }
}

/// Something that can drive a single future to completion.
pub trait Executor {
    /// Drive `future` to completion, reporting runtime setup failures.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Runtime`](crate::Error::Runtime) if the runtime
    /// could not be built. The future's own output is never touched.
    fn try_block_on<F: Future>(&self, future: F) -> Result<F::Output>;

    /// Drive `future` to completion.
    ///
    /// # Panics
    ///
    /// Panics if the runtime cannot be built, or if the future panics.
    fn block_on<F: Future>(&self, future: F) -> F::Output {
        match self.try_block_on(future) {
            Ok(output) => output,
            Err(err) => panic!("synchronous bridge unavailable: {err}"),
        }
    }
}

/// A configured bridge.
///
/// Holds no runtime between calls; each call gets its own.
#[derive(Debug, Clone, Default)]
pub struct Bridge {
    config: BridgeConfig,
}

impl Bridge {
    /// Create a bridge with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bridge with the given configuration.
    #[must_use]
    pub fn with_config(config: BridgeConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }
}

impl Executor for Bridge {
    fn try_block_on<F: Future>(&self, future: F) -> Result<F::Output> {
        tracing::debug!(
            backend = ?self.config.backend,
            flavor = ?self.config.flavor,
            "driving bridged call on a fresh runtime"
        );
        match self.config.backend {
            #[cfg(feature = "tokio")]
            Backend::Tokio => self::tokio::TokioExecutor::new(&self.config).try_block_on(future),
            #[cfg(feature = "smol")]
            Backend::Smol => {
                self::smol::check_config(&self.config)?;
                self::smol::SmolExecutor::new().try_block_on(future)
            }
        }
    }
}

/// Drive a single future to completion on a fresh default runtime.
///
/// # Panics
///
/// Panics if the runtime cannot be built, or if the future panics.
pub fn block_on<F: Future>(future: F) -> F::Output {
    Bridge::new().block_on(future)
}

/// Turn an async function into a blocking one.
///
/// The returned function takes the same argument and returns the future's
/// output. A `Result::Err` produced by `f` comes back unchanged, and a panic
/// inside `f` unwinds into the caller.
pub fn synchronize<F, A, Fut>(f: F) -> impl Fn(A) -> Fut::Output
where
    F: Fn(A) -> Fut,
    Fut: Future,
{
    synchronize_with(BridgeConfig::default(), f)
}

/// [`synchronize`] with an explicit configuration.
pub fn synchronize_with<F, A, Fut>(config: BridgeConfig, f: F) -> impl Fn(A) -> Fut::Output
where
    F: Fn(A) -> Fut,
    Fut: Future,
{
    let bridge = Bridge::with_config(config);
    move |args| bridge.block_on(f(args))
}
