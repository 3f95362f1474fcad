//! Dynamic mocks with controllable attribute propagation.
//!
//! This module provides:
//!
//! - [`Mock`] - A dynamic test double that derives child mocks on attribute
//!   access and records calls
//! - [`Spec`] / [`Interface`] - Interface restrictions ("spec sets")
//! - [`MockClass`] - The class of a mock, combining a [`ChildFactory`] and a
//!   [`SpecResolver`]
//!
//! # Stopping spec propagation
//!
//! A plain mock builds children as new instances of its own class, with its
//! own construction arguments. For a spec-restricted mock that means every
//! attribute is restricted to the same interface, which is rarely what the
//! real object looks like. [`Unpropagating`] builds children of a separate,
//! unrestricted class instead:
//!
//! ```rust
//! use testkit_helpers::mock::{Mock, MockClass, Spec};
//!
//! let text = Spec::new("str", ["removesuffix", "upper"]);
//!
//! let plain = Mock::with_spec(text.clone());
//! let child = plain.get("upper").unwrap();
//! assert!(!child.has("notastringmethod"));
//!
//! let unpropagating = MockClass::unpropagating().instance().spec_set(text).build().unwrap();
//! let child = unpropagating.get("upper").unwrap();
//! assert!(child.has("notastringmethod"));
//! ```
//!
//! # Class-level specs
//!
//! [`ClassDefault`] lets a class declare its spec once. An explicit spec
//! given at construction wins:
//!
//! ```rust
//! use testkit_helpers::mock::{MockClass, Spec};
//!
//! let text = Spec::new("str", ["removesuffix"]);
//! let int = Spec::new("int", ["to_bytes"]);
//! let class = MockClass::custom(Some(text));
//!
//! assert!(class.new_mock().has("removesuffix"));
//!
//! let overridden = class.instance().spec_set(int).build().unwrap();
//! assert!(overridden.has("to_bytes"));
//! assert!(!overridden.has("removesuffix"));
//! ```

mod calls;
mod class;
mod object;
mod policy;
mod spec;

pub use calls::CallRecord;
pub use class::{MockClass, MockClassBuilder};
pub use object::{Mock, MockBuilder};
pub use policy::{
    ChildFactory, ChildKind, ChildRequest, ClassDefault, ExplicitOnly, Propagate, SpecResolver,
    Unpropagating,
};
pub use spec::{Interface, Spec, SpecArg};
