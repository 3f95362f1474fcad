//! The `Mock` object.

use std::collections::{BTreeMap, HashSet};
use std::fmt::{self, Debug};
use std::sync::Arc;

use parking_lot::Mutex;

use super::calls::{render, CallLog, CallRecord};
use super::class::MockClass;
use super::policy::ChildRequest;
use super::spec::{Spec, SpecArg};
use crate::error::{Error, Result};

/// A dynamic test double.
///
/// Accessing an attribute that was never configured derives a child mock
/// through the class's [`ChildFactory`](super::ChildFactory) and caches it,
/// so the same attribute always yields the same child. Calling a mock records
/// the call and returns its return-value child.
///
/// `Mock` is a shared handle: clones refer to the same mock.
///
/// # Example
///
/// ```rust
/// use testkit_helpers::mock::{Mock, MockClass, Spec};
///
/// let text = Spec::new("str", ["removesuffix", "upper"]);
/// let mock = Mock::builder()
///     .class(MockClass::unpropagating())
///     .spec_set(text)
///     .build()
///     .unwrap();
///
/// assert!(mock.has("removesuffix"));
/// assert!(!mock.has("notastringmethod"));
///
/// let result = mock.get("removesuffix").unwrap().call("suffix").unwrap();
/// assert!(result.has("notastringmethod"));
///
/// mock.seal();
/// let err = mock.get("upper").unwrap_err();
/// assert_eq!(err.to_string(), "Can't access mock.upper, mock is sealed.");
/// ```
#[derive(Clone)]
pub struct Mock {
    inner: Arc<MockInner>,
}

struct MockInner {
    class: MockClass,
    path: String,
    spec_arg: SpecArg,
    spec: Option<Spec>,
    state: Mutex<MockState>,
    calls: CallLog,
}

#[derive(Default)]
struct MockState {
    sealed: bool,
    children: BTreeMap<String, Mock>,
    return_value: Option<Mock>,
}

impl Mock {
    /// A new unrestricted mock of the standard class.
    #[must_use]
    pub fn new() -> Self {
        MockClass::standard().new_mock()
    }

    /// A standard mock restricted to `spec`.
    #[must_use]
    pub fn with_spec(spec: Spec) -> Self {
        Self::create(MockClass::standard(), "mock".to_owned(), spec.into())
    }

    /// Start building a mock.
    #[must_use]
    pub fn builder() -> MockBuilder {
        MockBuilder::default()
    }

    pub(crate) fn create(class: MockClass, path: String, spec_arg: SpecArg) -> Self {
        let spec = class.resolve_spec(spec_arg.clone());
        Self {
            inner: Arc::new(MockInner {
                class,
                path,
                spec_arg,
                spec,
                state: Mutex::new(MockState::default()),
                calls: CallLog::new(),
            }),
        }
    }

    /// Display name, e.g. `mock`, `mock.attr` or `mock.attr()`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.path
    }

    /// The class this mock is an instance of.
    #[must_use]
    pub fn class(&self) -> &MockClass {
        &self.inner.class
    }

    /// The spec this mock is restricted to, if any.
    #[must_use]
    pub fn spec(&self) -> Option<&Spec> {
        self.inner.spec.as_ref()
    }

    /// The spec argument this mock was constructed with.
    #[must_use]
    pub fn spec_arg(&self) -> &SpecArg {
        &self.inner.spec_arg
    }

    /// Whether the mock is sealed.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.inner.state.lock().sealed
    }

    /// Whether both handles refer to the same mock.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn check_spec(&self, attribute: &str) -> Result<()> {
        match &self.inner.spec {
            Some(spec) if !spec.allows(attribute) => Err(Error::NoAttribute {
                mock: self.name().to_owned(),
                attribute: attribute.to_owned(),
                spec: spec.name().to_owned(),
            }),
            _ => Ok(()),
        }
    }

    /// Access an attribute, deriving and caching a child if needed.
    ///
    /// # Errors
    ///
    /// - [`Error::NoAttribute`] if `attribute` is outside the mock's spec.
    /// - [`Error::Sealed`] if the child would have to be derived from a
    ///   sealed mock.
    pub fn get(&self, attribute: &str) -> Result<Mock> {
        if let Some(child) = self.inner.state.lock().children.get(attribute) {
            return Ok(child.clone());
        }
        self.check_spec(attribute)?;

        let request = ChildRequest::attribute(self, attribute);
        let child = self.class().child_factory().child_mock(self, request)?;
        tracing::debug!(
            parent = %self.name(),
            attribute,
            class = %child.class().name(),
            "derived child mock"
        );

        let mut state = self.inner.state.lock();
        Ok(state
            .children
            .entry(attribute.to_owned())
            .or_insert(child)
            .clone())
    }

    /// Whether `attribute` can be accessed.
    ///
    /// Like [`get`](Self::get), this derives and caches the child on success.
    #[must_use]
    pub fn has(&self, attribute: &str) -> bool {
        self.get(attribute).is_ok()
    }

    /// Configure an attribute explicitly.
    ///
    /// Allowed on sealed mocks.
    ///
    /// Children are held by strong references, so setting a mock as its own
    /// attribute (or as the attribute of one of its descendants) creates a
    /// reference cycle that is never freed. Break it with
    /// [`remove`](Self::remove) before dropping the handles.
    ///
    /// # Errors
    ///
    /// [`Error::NoAttribute`] if `attribute` is outside the mock's spec.
    pub fn set(&self, attribute: &str, value: Mock) -> Result<()> {
        self.check_spec(attribute)?;
        self.inner
            .state
            .lock()
            .children
            .insert(attribute.to_owned(), value);
        Ok(())
    }

    /// Forget a configured or derived attribute, returning it.
    ///
    /// The next access derives a fresh child, or fails if the mock is sealed.
    pub fn remove(&self, attribute: &str) -> Option<Mock> {
        self.inner.state.lock().children.remove(attribute)
    }

    /// Names of attributes that are configured or were already derived.
    #[must_use]
    pub fn attributes(&self) -> Vec<String> {
        self.inner.state.lock().children.keys().cloned().collect()
    }

    /// The return-value child, deriving it if needed.
    ///
    /// # Errors
    ///
    /// [`Error::Sealed`] if no return value is configured and the mock is
    /// sealed.
    pub fn return_value(&self) -> Result<Mock> {
        if let Some(value) = &self.inner.state.lock().return_value {
            return Ok(value.clone());
        }

        let request = ChildRequest::call(self);
        let child = self.class().child_factory().child_mock(self, request)?;
        tracing::debug!(parent = %self.name(), "derived return value mock");

        let mut state = self.inner.state.lock();
        Ok(state.return_value.get_or_insert(child).clone())
    }

    /// Configure the value returned by calls.
    pub fn set_return_value(&self, value: Mock) {
        self.inner.state.lock().return_value = Some(value);
    }

    /// Call the mock, recording `args`.
    ///
    /// The call is recorded even if deriving the return value fails.
    ///
    /// # Errors
    ///
    /// See [`return_value`](Self::return_value).
    pub fn call<A: Debug>(&self, args: A) -> Result<Mock> {
        self.inner.calls.track(self.name(), render(&args));
        self.return_value()
    }

    /// All recorded calls.
    #[must_use]
    pub fn calls(&self) -> Vec<CallRecord> {
        self.inner.calls.calls()
    }

    /// Number of recorded calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.inner.calls.call_count()
    }

    /// Whether the mock was called at least once.
    #[must_use]
    pub fn was_called(&self) -> bool {
        self.call_count() > 0
    }

    /// Whether any recorded call used `args`.
    #[must_use]
    pub fn was_called_with<A: Debug + ?Sized>(&self, args: &A) -> bool {
        self.inner.calls.any_matches(&render(args))
    }

    /// The most recent call.
    #[must_use]
    pub fn last_call(&self) -> Option<CallRecord> {
        self.inner.calls.last_call()
    }

    /// Check that the mock was called at least once.
    ///
    /// # Errors
    ///
    /// [`Error::AssertionFailed`] if the mock was never called.
    pub fn assert_called(&self) -> Result<()> {
        if self.was_called() {
            Ok(())
        } else {
            Err(Error::assertion_failed(format!(
                "expected '{}' to have been called",
                self.name()
            )))
        }
    }

    /// Check that the mock was called exactly once.
    ///
    /// # Errors
    ///
    /// [`Error::AssertionFailed`] unless the mock was called exactly once.
    pub fn assert_called_once(&self) -> Result<()> {
        match self.call_count() {
            1 => Ok(()),
            n => Err(Error::assertion_failed(format!(
                "expected '{}' to have been called once, called {n} times",
                self.name()
            ))),
        }
    }

    /// Check that the mock was never called.
    ///
    /// # Errors
    ///
    /// [`Error::AssertionFailed`] if the mock was called.
    pub fn assert_not_called(&self) -> Result<()> {
        match self.call_count() {
            0 => Ok(()),
            n => Err(Error::assertion_failed(format!(
                "expected '{}' to not have been called, called {n} times",
                self.name()
            ))),
        }
    }

    /// Check that the most recent call used `args`.
    ///
    /// # Errors
    ///
    /// [`Error::AssertionFailed`] if there was no call, or the last call
    /// used different arguments.
    pub fn assert_called_with<A: Debug + ?Sized>(&self, args: &A) -> Result<()> {
        let expected = render(args);
        match self.last_call() {
            Some(call) if call.args == expected => Ok(()),
            Some(call) => Err(Error::assertion_failed(format!(
                "expected call to '{}' with {expected}, last call was with {}",
                self.name(),
                call.args
            ))),
            None => Err(Error::assertion_failed(format!(
                "expected call to '{}' with {expected}, not called",
                self.name()
            ))),
        }
    }

    /// Seal the mock and every mock reachable from it.
    ///
    /// Sealed mocks keep returning children that already exist, but refuse to
    /// derive new ones. Sealing cannot be undone.
    pub fn seal(&self) {
        self.walk(&mut |mock: &Mock| {
            mock.inner.state.lock().sealed = true;
        });
        tracing::debug!(mock = %self.name(), "sealed");
    }

    /// Clear recorded calls on the mock and every mock reachable from it.
    ///
    /// Configuration, derived children, and the sealed state are kept.
    pub fn reset_mock(&self) {
        self.walk(&mut |mock: &Mock| mock.inner.calls.reset());
    }

    /// Visit this mock and its descendants once each.
    fn walk(&self, visit: &mut dyn FnMut(&Mock)) {
        let mut seen = HashSet::new();
        let mut stack = vec![self.clone()];
        while let Some(mock) = stack.pop() {
            if !seen.insert(Arc::as_ptr(&mock.inner)) {
                continue;
            }
            visit(&mock);
            let state = mock.inner.state.lock();
            stack.extend(state.children.values().cloned());
            stack.extend(state.return_value.iter().cloned());
        }
    }
}

impl Default for Mock {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Mock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mock")
            .field("name", &self.inner.path)
            .field("class", &self.inner.class.name())
            .field("spec", &self.inner.spec.as_ref().map(Spec::name))
            .field("sealed", &self.is_sealed())
            .field("calls", &self.inner.calls)
            .finish()
    }
}

/// Construction arguments for a [`Mock`].
#[derive(Debug, Clone, Default)]
pub struct MockBuilder {
    class: Option<MockClass>,
    parent_path: Option<String>,
    name: Option<String>,
    spec_arg: SpecArg,
    return_value: Option<Mock>,
    attributes: Vec<(String, Mock)>,
}

impl MockBuilder {
    pub(crate) fn child_of(parent: &Mock, name: Option<&str>) -> Self {
        Self {
            parent_path: Some(parent.name().to_owned()),
            name: name.map(str::to_owned),
            ..Self::default()
        }
    }

    /// Class of the new mock; the standard class if unset.
    #[must_use]
    pub fn class(mut self, class: MockClass) -> Self {
        self.class = Some(class);
        self
    }

    /// Name of the new mock.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Restrict the new mock to `spec`, overriding any class default.
    #[must_use]
    pub fn spec_set(self, spec: Spec) -> Self {
        self.spec_arg(SpecArg::Restricted(spec))
    }

    /// Explicitly leave the new mock unrestricted, overriding any class default.
    #[must_use]
    pub fn unrestricted(self) -> Self {
        self.spec_arg(SpecArg::Unrestricted)
    }

    /// Set the spec argument directly.
    #[must_use]
    pub fn spec_arg(mut self, spec_arg: SpecArg) -> Self {
        self.spec_arg = spec_arg;
        self
    }

    /// Preconfigure the return value.
    #[must_use]
    pub fn return_value(mut self, value: Mock) -> Self {
        self.return_value = Some(value);
        self
    }

    /// Preconfigure an attribute.
    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>, value: Mock) -> Self {
        self.attributes.push((name.into(), value));
        self
    }

    /// Display name the built mock will have.
    #[must_use]
    pub fn path(&self) -> String {
        match (&self.parent_path, &self.name) {
            (Some(parent), Some(name)) => format!("{parent}.{name}"),
            (Some(parent), None) => format!("{parent}()"),
            (None, Some(name)) => name.clone(),
            (None, None) => "mock".to_owned(),
        }
    }

    /// Build the mock.
    ///
    /// # Errors
    ///
    /// [`Error::NoAttribute`] if a preconfigured attribute is outside the
    /// resolved spec.
    pub fn build(self) -> Result<Mock> {
        let path = self.path();
        let class = self.class.unwrap_or_default();
        let mock = Mock::create(class, path, self.spec_arg);
        for (name, value) in self.attributes {
            mock.set(&name, value)?;
        }
        if let Some(value) = self.return_value {
            mock.set_return_value(value);
        }
        Ok(mock)
    }
}
