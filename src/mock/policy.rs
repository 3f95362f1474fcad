//! Policies that decide how a mock class derives children and resolves its spec.
//!
//! A [`MockClass`] combines two strategies:
//!
//! - a [`ChildFactory`], asked for a new mock whenever an attribute that was
//!   never configured is accessed (or the mock is called without a configured
//!   return value);
//! - a [`SpecResolver`], which picks the one spec a new instance is
//!   restricted to.
//!
//! The default pair ([`Propagate`] + [`ExplicitOnly`]) behaves like a plain
//! mock: children are new instances of the parent's own class, built with the
//! parent's construction arguments. That is harmless for unrestricted mocks,
//! but a spec-restricted parent then hands its restriction down to every
//! attribute, even though attributes of a `str` are rarely `str`s themselves.
//!
//! [`Unpropagating`] stops this by building children of a configured
//! [`ChildKind`] instead, and [`ClassDefault`] lets a class declare its spec
//! once while individual instances can still override it.

use std::fmt::Debug;

use super::class::MockClass;
use super::object::{Mock, MockBuilder};
use super::spec::{Spec, SpecArg};
use crate::error::{Error, Result};

/// A request to derive a child mock from a parent.
#[derive(Debug, Clone)]
pub struct ChildRequest {
    name: Option<String>,
    builder: MockBuilder,
}

impl ChildRequest {
    /// Request for an attribute access (`parent.name`).
    pub(crate) fn attribute(parent: &Mock, name: &str) -> Self {
        Self {
            name: Some(name.to_owned()),
            builder: MockBuilder::child_of(parent, Some(name)),
        }
    }

    /// Request for a call-style access (`parent()`).
    pub(crate) fn call(parent: &Mock) -> Self {
        Self {
            name: None,
            builder: MockBuilder::child_of(parent, None),
        }
    }

    /// Attribute name, or `None` for a call-style access.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Full access path, e.g. `mock.attr` or `mock()`.
    #[must_use]
    pub fn path(&self) -> String {
        self.builder.path()
    }

    /// The construction arguments the child would be built with.
    #[must_use]
    pub fn into_builder(self) -> MockBuilder {
        self.builder
    }
}

/// Derives child mocks for attributes that were never configured.
pub trait ChildFactory: Debug + Send + Sync {
    /// Build the child for `request` on `parent`.
    ///
    /// # Errors
    ///
    /// Implementations fail with [`Error::Sealed`] when `parent` is sealed.
    fn child_mock(&self, parent: &Mock, request: ChildRequest) -> Result<Mock>;
}

fn refuse_if_sealed(parent: &Mock, request: &ChildRequest) -> Result<()> {
    if parent.is_sealed() {
        let path = request.path();
        tracing::warn!(mock = %parent.name(), path = %path, "access on sealed mock");
        return Err(Error::sealed(path));
    }
    Ok(())
}

/// Plain propagation: children share the parent's class and spec argument.
#[derive(Debug, Clone, Copy, Default)]
pub struct Propagate;

impl ChildFactory for Propagate {
    fn child_mock(&self, parent: &Mock, request: ChildRequest) -> Result<Mock> {
        refuse_if_sealed(parent, &request)?;
        request
            .into_builder()
            .class(parent.class().clone())
            .spec_arg(parent.spec_arg().clone())
            .build()
    }
}

/// Which class an [`Unpropagating`] factory builds children from.
#[derive(Debug, Clone)]
pub enum ChildKind {
    /// Always this class.
    ///
    /// Only the first level is affected: if the class propagates, its own
    /// children propagate as usual.
    Class(MockClass),
    /// The parent's own class, applied at every level.
    ///
    /// The child is still built without the parent's spec argument; a class
    /// that declares a default spec re-applies it.
    Inherit,
}

impl Default for ChildKind {
    fn default() -> Self {
        Self::Class(MockClass::magic())
    }
}

/// Children are instances of a configured [`ChildKind`], never restricted to
/// the parent's spec.
///
/// Sealed parents refuse new children with [`Error::Sealed`].
#[derive(Debug, Clone, Default)]
pub struct Unpropagating {
    child_kind: ChildKind,
}

impl Unpropagating {
    /// Build children from the given kind.
    #[must_use]
    pub fn new(child_kind: ChildKind) -> Self {
        Self { child_kind }
    }

    /// The configured child kind.
    #[must_use]
    pub fn child_kind(&self) -> &ChildKind {
        &self.child_kind
    }
}

impl ChildFactory for Unpropagating {
    fn child_mock(&self, parent: &Mock, request: ChildRequest) -> Result<Mock> {
        refuse_if_sealed(parent, &request)?;
        let class = match &self.child_kind {
            ChildKind::Class(class) => class.clone(),
            ChildKind::Inherit => parent.class().clone(),
        };
        request.into_builder().class(class).build()
    }
}

/// Picks the spec a new instance is restricted to.
pub trait SpecResolver: Debug + Send + Sync {
    /// Resolve the spec from the class default and the explicit argument.
    fn resolve(&self, class_default: Option<&Spec>, explicit: SpecArg) -> Option<Spec>;
}

/// Only an explicit argument restricts the mock; class defaults are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplicitOnly;

impl SpecResolver for ExplicitOnly {
    fn resolve(&self, _class_default: Option<&Spec>, explicit: SpecArg) -> Option<Spec> {
        match explicit {
            SpecArg::Restricted(spec) => Some(spec),
            SpecArg::Omitted | SpecArg::Unrestricted => None,
        }
    }
}

/// An explicit argument wins, even an explicit "unrestricted"; otherwise the
/// class default applies.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassDefault;

impl SpecResolver for ClassDefault {
    fn resolve(&self, class_default: Option<&Spec>, explicit: SpecArg) -> Option<Spec> {
        match explicit {
            SpecArg::Omitted => class_default.cloned(),
            SpecArg::Unrestricted => None,
            SpecArg::Restricted(spec) => Some(spec),
        }
    }
}
