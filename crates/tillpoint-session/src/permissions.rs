//! Effective-capability resolution for the logged in user
//!
//! Derived state only: the resolver is rebuilt whole whenever the user or the
//! branch context changes and thrown away when either goes away. It is never
//! persisted and never patched in place.

use tillpoint_shared::uac::{role_capabilities, CapabilitySet, UserInfo};
use tracing::debug;

/// Answers "can the current user perform capability X"
#[derive(Debug, Clone, Default)]
pub struct PermissionResolver {
    capabilities: CapabilitySet,
}

impl PermissionResolver {
    /// Computes the effective set for the current identity
    ///
    /// The set is non-empty only when both a user and a branch context are
    /// established. A server-declared list (even an empty one) is used
    /// verbatim; the role fallback table applies only when the user record
    /// carries no list at all.
    pub fn for_user(user: Option<&UserInfo>) -> Self {
        let capabilities = match user {
            Some(user) if user.branch_id.is_some() => match &user.capabilities {
                Some(declared) => CapabilitySet::from_declared(declared),
                None => role_capabilities(&user.role),
            },
            _ => CapabilitySet::default(),
        };
        debug!(?capabilities, "recomputed effective capabilities");
        Self { capabilities }
    }

    /// Conservative false when no user/branch context is established
    pub fn has_permission(&self, token: &str) -> bool {
        self.capabilities.grants(token)
    }

    /// True iff at least one of the queried tokens is granted
    pub fn has_any_permission<'a, I>(&self, tokens: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.capabilities.grants_any(tokens)
    }

    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }
}
