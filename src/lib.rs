//! # testkit-helpers
//!
//! > Small helpers for tests that mix sync code, async code, and mocks
//!
//! **testkit-helpers** provides a blocking bridge for running async functions
//! from synchronous tests, and dynamic mocks whose children do not inherit
//! their parent's interface restriction.
//!
//! ## Quick Start
//!
//! ```rust
//! use testkit_helpers::prelude::*;
//!
//! async fn fetch(x: i32) -> i32 {
//!     if x == 5 { 10 } else { 0 }
//! }
//!
//! assert_eq!(synchronize(fetch)(5), 10);
//!
//! let text = Spec::new("str", ["removesuffix"]);
//! let mock = MockClass::custom(Some(text)).new_mock();
//! assert!(mock.has("removesuffix"));
//! assert!(!mock.has("notastringmethod"));
//! ```
//!
//! ## Features
//!
//! - **Synchronous bridge** - `synchronize`, `block_on`, and `#[synchronize]`
//! - **Unpropagating mocks** - children built from a configurable class
//! - **Class-level specs** - declare once, override per instance
//! - **Sealing** - forbid new children once a mock is configured

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bridge;
pub mod error;
pub mod mock;

/// Prelude for convenient imports
///
/// ```rust
/// use testkit_helpers::prelude::*;
/// ```
pub mod prelude {
    pub use crate::bridge::{block_on, synchronize, Bridge, BridgeConfig, Executor};
    pub use crate::error::{Error, Result};
    pub use crate::mock::{ChildKind, Interface, Mock, MockClass, Spec};
}

// Re-exports
pub use error::{Error, Result};

// Re-export the attribute macro when the macros feature is enabled
#[cfg(feature = "macros")]
pub use testkit_helpers_macros::synchronize;
