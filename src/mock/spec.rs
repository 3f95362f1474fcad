//! Interface restrictions ("spec sets") for mocks.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// A type whose public surface a mock can be restricted to.
///
/// # Example
///
/// ```rust
/// use testkit_helpers::mock::{Interface, Spec};
///
/// struct Greeter;
///
/// impl Interface for Greeter {
///     const NAME: &'static str = "Greeter";
///     const MEMBERS: &'static [&'static str] = &["greet", "farewell"];
/// }
///
/// let spec = Spec::of::<Greeter>();
/// assert!(spec.allows("greet"));
/// assert!(!spec.allows("shout"));
/// ```
pub trait Interface {
    /// Name shown in diagnostics.
    const NAME: &'static str;
    /// Attribute and method names the interface exposes.
    const MEMBERS: &'static [&'static str];
}

/// The set of attribute names a mock may expose.
///
/// Cloning is cheap; clones share the member set.
#[derive(Clone, PartialEq, Eq)]
pub struct Spec {
    name: Arc<str>,
    members: Arc<BTreeSet<String>>,
}

impl Spec {
    /// Create a spec from an interface name and its members.
    pub fn new<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name: String = name.into();
        Self {
            name: name.into(),
            members: Arc::new(members.into_iter().map(Into::into).collect()),
        }
    }

    /// Create a spec mirroring an [`Interface`] implementor.
    #[must_use]
    pub fn of<T: Interface + ?Sized>() -> Self {
        Self::new(T::NAME, T::MEMBERS.iter().copied())
    }

    /// Interface name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether `attribute` is part of the interface.
    #[must_use]
    pub fn allows(&self, attribute: &str) -> bool {
        self.members.contains(attribute)
    }

    /// Iterate over the member names in sorted order.
    pub fn members(&self) -> impl Iterator<Item = &str> + '_ {
        self.members.iter().map(String::as_str)
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the interface exposes nothing at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl fmt::Debug for Spec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spec")
            .field("name", &self.name)
            .field("members", &self.members.len())
            .finish()
    }
}

impl fmt::Display for Spec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// The interface-restriction argument given when constructing a mock.
///
/// Distinguishes "not given" from "explicitly unrestricted", so a class-level
/// default can be overridden with no restriction at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SpecArg {
    /// No restriction argument was supplied.
    #[default]
    Omitted,
    /// Explicitly unrestricted.
    Unrestricted,
    /// Explicitly restricted to the given spec.
    Restricted(Spec),
}

impl SpecArg {
    /// Whether the argument was supplied at all.
    #[must_use]
    pub fn is_explicit(&self) -> bool {
        !matches!(self, Self::Omitted)
    }
}

impl From<Spec> for SpecArg {
    fn from(spec: Spec) -> Self {
        Self::Restricted(spec)
    }
}

impl From<Option<Spec>> for SpecArg {
    fn from(spec: Option<Spec>) -> Self {
        spec.map_or(Self::Unrestricted, Self::Restricted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Text;

    impl Interface for Text {
        const NAME: &'static str = "str";
        const MEMBERS: &'static [&'static str] = &["removesuffix", "upper", "upper"];
    }

    #[test]
    fn test_spec_of_interface() {
        let spec = Spec::of::<Text>();
        assert_eq!(spec.name(), "str");
        assert!(spec.allows("removesuffix"));
        assert!(!spec.allows("to_bytes"));
        assert_eq!(spec.len(), 2);
    }

    #[test]
    fn test_spec_members_sorted() {
        let spec = Spec::new("thing", ["b", "a", "c"]);
        assert_eq!(spec.members().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_spec_allows_nothing() {
        let spec = Spec::new("empty", Vec::<String>::new());
        assert!(spec.is_empty());
        assert!(!spec.allows("anything"));
    }

    #[test]
    fn test_spec_arg_conversions() {
        let spec = Spec::of::<Text>();
        assert_eq!(SpecArg::from(spec.clone()), SpecArg::Restricted(spec));
        assert_eq!(SpecArg::from(None), SpecArg::Unrestricted);
        assert!(!SpecArg::default().is_explicit());
        assert!(SpecArg::Unrestricted.is_explicit());
    }

    #[test]
    fn test_spec_display() {
        assert_eq!(Spec::of::<Text>().to_string(), "str");
    }
}
