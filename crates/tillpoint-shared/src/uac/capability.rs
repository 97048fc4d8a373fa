use std::{
    collections::BTreeSet,
    fmt::{Debug, Display},
};

/// Marker token meaning "all capabilities granted"
pub const WILDCARD: &str = "*";

/// Groups of tokens that are treated as the same grant. Kept for queries from
/// screens that predate the renames.
const ALIAS_GROUPS: &[&[&str]] = &[&["session.manage", "sessions.manage"]];

/// A capability token normalized to lower case with `.` separators
///
/// Queries arrive from the screens as free-form strings using either `:` or
/// `.` between segments and in any case, so everything is normalized at the
/// boundary and comparisons stay simple.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Capability(String);

impl Capability {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_ascii_lowercase().replace(':', "."))
    }

    pub fn is_wildcard(&self) -> bool {
        self.0 == WILDCARD
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The effective set of capabilities granted to a user
///
/// Always recomputed whole when the user or branch context changes, never
/// patched in place.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    /// Builds the set from a server-declared list, used verbatim
    ///
    /// An empty list means zero capabilities, it does NOT fall back to the
    /// role table.
    pub fn from_declared<I, S>(declared: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            declared
                .into_iter()
                .map(|raw| Capability::new(raw.as_ref()))
                .collect(),
        )
    }

    pub fn wildcard() -> Self {
        Self::from_declared([WILDCARD])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has_wildcard(&self) -> bool {
        self.0.iter().any(Capability::is_wildcard)
    }

    /// Answers whether the queried token is granted
    ///
    /// The query is normalized and expanded through the alias table before
    /// membership is tested.
    #[tracing::instrument(ret, skip(self))]
    pub fn grants(&self, token: &str) -> bool {
        if self.has_wildcard() {
            return true;
        }
        let query = Capability::new(token);
        if self.0.contains(&query) {
            return true;
        }
        ALIAS_GROUPS
            .iter()
            .filter(|group| group.iter().any(|alias| *alias == query.as_str()))
            .flat_map(|group| group.iter())
            .any(|alias| self.0.contains(&Capability::new(alias)))
    }

    /// True iff at least one of the queried tokens is granted
    pub fn grants_any<'a, I>(&self, tokens: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        if self.has_wildcard() {
            return true;
        }
        tokens.into_iter().any(|token| self.grants(token))
    }
}

impl Debug for CapabilitySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.0.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::already_normal("orders.view", "orders.view")]
    #[case::colon_separator("orders:view", "orders.view")]
    #[case::mixed_case("Orders:View", "orders.view")]
    #[case::surrounding_space(" pos.access ", "pos.access")]
    fn capability_normalization(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(Capability::new(raw).as_str(), expected);
    }

    #[rstest]
    #[case::exact("orders.view", true)]
    #[case::colon_query("orders:view", true)]
    #[case::case_insensitive("ORDERS.VIEW", true)]
    #[case::not_granted("inventory.manage", false)]
    fn membership_queries(#[case] query: &str, #[case] expected: bool) {
        // Arrange
        let set = CapabilitySet::from_declared(["orders.view", "pos.access"]);

        // Act / Assert
        assert_eq!(set.grants(query), expected);
    }

    #[rstest]
    #[case::singular_granted_plural_queried("session.manage", "sessions:manage")]
    #[case::plural_granted_singular_queried("sessions.manage", "session.manage")]
    #[case::plural_granted_plural_queried("sessions.manage", "sessions.manage")]
    fn session_manage_aliases_are_mutual(#[case] granted: &str, #[case] queried: &str) {
        let set = CapabilitySet::from_declared([granted]);
        assert!(set.grants(queried));
    }

    #[test]
    fn wildcard_grants_everything() {
        let set = CapabilitySet::wildcard();
        assert!(set.grants("anything.random"));
        assert!(set.grants_any(["nope", "also.nope"]));
    }

    #[test]
    fn empty_set_grants_nothing() {
        let set = CapabilitySet::default();
        assert!(set.is_empty());
        assert!(!set.grants("orders.view"));
        assert!(!set.grants(WILDCARD));
        assert!(!set.grants_any(["orders.view", "pos.access"]));
    }

    #[test]
    fn grants_any_needs_only_one_match() {
        let set = CapabilitySet::from_declared(["pos.access"]);
        assert!(set.grants_any(["inventory.manage", "pos:access"]));
        assert!(!set.grants_any(["inventory.manage", "orders.view"]));
    }
}
