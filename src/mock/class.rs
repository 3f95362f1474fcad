//! Mock classes: the "type" of a mock and its class-level configuration.

use std::fmt;
use std::sync::Arc;

use super::object::{Mock, MockBuilder};
use super::policy::{
    ChildFactory, ChildKind, ClassDefault, ExplicitOnly, Propagate, SpecResolver, Unpropagating,
};
use super::spec::{Spec, SpecArg};

/// The class of a mock.
///
/// Every [`Mock`] belongs to a class, which decides how the mock derives
/// children ([`ChildFactory`]) and which spec a new instance ends up with
/// ([`SpecResolver`], optionally using a class-level default spec).
///
/// Cloning is cheap; clones share the same configuration.
///
/// # Example
///
/// ```rust
/// use testkit_helpers::mock::{MockClass, Spec};
///
/// let text = Spec::new("str", ["removesuffix", "upper"]);
/// let class = MockClass::custom(Some(text));
///
/// let mock = class.new_mock();
/// assert!(mock.has("removesuffix"));
/// assert!(!mock.has("notastringmethod"));
///
/// // Children are plain, unrestricted mocks.
/// let child = mock.get("removesuffix").unwrap().call(()).unwrap();
/// assert!(child.has("notastringmethod"));
/// ```
#[derive(Clone)]
pub struct MockClass {
    inner: Arc<ClassInner>,
}

struct ClassInner {
    name: String,
    spec_set: Option<Spec>,
    child_factory: Arc<dyn ChildFactory>,
    spec_resolver: Arc<dyn SpecResolver>,
}

impl MockClass {
    /// A plain, propagating mock class with no class-level spec.
    #[must_use]
    pub fn standard() -> Self {
        Self::builder("Mock").build()
    }

    /// A general-purpose, unrestricted, propagating class.
    ///
    /// The default child kind of [`Unpropagating`]; it can stand in for
    /// most objects.
    #[must_use]
    pub fn magic() -> Self {
        Self::builder("MagicMock").build()
    }

    /// A class whose children are unrestricted [`magic`](Self::magic) mocks.
    #[must_use]
    pub fn unpropagating() -> Self {
        Self::builder("UnpropagatingMock")
            .child_factory(Unpropagating::default())
            .build()
    }

    /// An unpropagating class that also declares a default spec.
    ///
    /// Instances are restricted to `spec_set` unless constructed with an
    /// explicit spec argument.
    #[must_use]
    pub fn custom(spec_set: Option<Spec>) -> Self {
        let mut builder = Self::builder("CustomMock")
            .child_factory(Unpropagating::default())
            .spec_resolver(ClassDefault);
        if let Some(spec) = spec_set {
            builder = builder.spec_set(spec);
        }
        builder.build()
    }

    /// Start building a class with the given display name.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> MockClassBuilder {
        MockClassBuilder::new(name)
    }

    /// Class display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Class-level default spec.
    #[must_use]
    pub fn spec_set(&self) -> Option<&Spec> {
        self.inner.spec_set.as_ref()
    }

    /// The child factory of this class.
    #[must_use]
    pub fn child_factory(&self) -> &dyn ChildFactory {
        self.inner.child_factory.as_ref()
    }

    /// Resolve the spec for a new instance.
    #[must_use]
    pub fn resolve_spec(&self, explicit: SpecArg) -> Option<Spec> {
        let resolved = self
            .inner
            .spec_resolver
            .resolve(self.inner.spec_set.as_ref(), explicit);
        tracing::trace!(
            class = %self.inner.name,
            spec = resolved.as_ref().map(Spec::name),
            "resolved spec"
        );
        resolved
    }

    /// Construction arguments for an instance of this class.
    #[must_use]
    pub fn instance(&self) -> MockBuilder {
        Mock::builder().class(self.clone())
    }

    /// A new root instance with no explicit arguments.
    #[must_use]
    pub fn new_mock(&self) -> Mock {
        Mock::create(self.clone(), "mock".to_owned(), SpecArg::Omitted)
    }

    /// Whether both handles refer to the same class.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for MockClass {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for MockClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockClass")
            .field("name", &self.inner.name)
            .field("spec_set", &self.inner.spec_set.as_ref().map(Spec::name))
            .field("child_factory", &self.inner.child_factory)
            .field("spec_resolver", &self.inner.spec_resolver)
            .finish()
    }
}

/// Builder for [`MockClass`].
///
/// Defaults to [`Propagate`] children and [`ExplicitOnly`] spec resolution.
#[derive(Debug)]
pub struct MockClassBuilder {
    name: String,
    spec_set: Option<Spec>,
    child_factory: Arc<dyn ChildFactory>,
    spec_resolver: Arc<dyn SpecResolver>,
}

impl MockClassBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            spec_set: None,
            child_factory: Arc::new(Propagate),
            spec_resolver: Arc::new(ExplicitOnly),
        }
    }

    /// Declare a class-level default spec.
    ///
    /// Only takes effect with a resolver that honors defaults, such as
    /// [`ClassDefault`].
    #[must_use]
    pub fn spec_set(mut self, spec: Spec) -> Self {
        self.spec_set = Some(spec);
        self
    }

    /// Set the child factory.
    #[must_use]
    pub fn child_factory(mut self, factory: impl ChildFactory + 'static) -> Self {
        self.child_factory = Arc::new(factory);
        self
    }

    /// Build children from `kind` without propagating the parent's spec.
    #[must_use]
    pub fn unpropagating(self, kind: ChildKind) -> Self {
        self.child_factory(Unpropagating::new(kind))
    }

    /// Set the spec resolver.
    #[must_use]
    pub fn spec_resolver(mut self, resolver: impl SpecResolver + 'static) -> Self {
        self.spec_resolver = Arc::new(resolver);
        self
    }

    /// Finish the class.
    #[must_use]
    pub fn build(self) -> MockClass {
        MockClass {
            inner: Arc::new(ClassInner {
                name: self.name,
                spec_set: self.spec_set,
                child_factory: self.child_factory,
                spec_resolver: self.spec_resolver,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text() -> Spec {
        Spec::new("str", ["removesuffix", "upper"])
    }

    #[test]
    fn test_standard_class() {
        let class = MockClass::standard();
        assert_eq!(class.name(), "Mock");
        assert!(class.spec_set().is_none());
        assert_eq!(class.resolve_spec(SpecArg::Omitted), None);
    }

    #[test]
    fn test_magic_class() {
        let class = MockClass::magic();
        assert_eq!(class.name(), "MagicMock");
        assert!(class.spec_set().is_none());

        let child = class.new_mock().get("anything").unwrap();
        assert_eq!(child.class().name(), "MagicMock");
        assert!(child.spec().is_none());
    }

    #[test]
    fn test_custom_class_resolves_default() {
        let class = MockClass::custom(Some(text()));
        assert_eq!(class.spec_set(), Some(&text()));
        assert_eq!(class.resolve_spec(SpecArg::Omitted), Some(text()));
        assert_eq!(class.resolve_spec(SpecArg::Unrestricted), None);
    }

    #[test]
    fn test_custom_class_without_default_is_unrestricted() {
        let mock = MockClass::custom(None).new_mock();
        assert!(mock.spec().is_none());
        assert!(mock.has("anything"));
    }

    #[test]
    fn test_default_ignored_by_explicit_only() {
        let class = MockClass::builder("Loose").spec_set(text()).build();
        assert_eq!(class.resolve_spec(SpecArg::Omitted), None);
    }

    #[test]
    fn test_builder_unpropagating_shortcut() {
        let class = MockClass::builder("Shallow")
            .unpropagating(ChildKind::Class(MockClass::unpropagating()))
            .build();
        let child = class.new_mock().get("x").unwrap();
        assert_eq!(child.class().name(), "UnpropagatingMock");
    }

    #[test]
    fn test_class_clone_shares_config() {
        let class = MockClass::unpropagating();
        let clone = class.clone();
        assert!(class.ptr_eq(&clone));
        assert!(!class.ptr_eq(&MockClass::unpropagating()));
    }

    #[test]
    fn test_class_debug() {
        let debug = format!("{:?}", MockClass::custom(Some(text())));
        assert!(debug.contains("CustomMock"));
        assert!(debug.contains("str"));
    }
}
