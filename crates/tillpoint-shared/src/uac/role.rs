use std::{ops::Deref, str::FromStr as _};

use serde::{Deserialize, Serialize};

use crate::errors::ConversionError;

use super::CapabilitySet;

/// Role name as the server reports it, eg "Cashier" or "store keeper"
///
/// Matching against the fallback table is case-insensitive, the original
/// casing is preserved for display.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RoleName(String);

impl RoleName {
    pub const MAX_LENGTH: usize = 30;
}

impl TryFrom<String> for RoleName {
    type Error = ConversionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err(ConversionError::Empty);
        }
        if value.len() > Self::MAX_LENGTH {
            return Err(ConversionError::MaxExceeded {
                max: Self::MAX_LENGTH,
                actual: value.len(),
            });
        }
        Ok(Self(value))
    }
}

impl TryFrom<&str> for RoleName {
    type Error = ConversionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.to_string().try_into()
    }
}

impl From<RoleName> for String {
    fn from(value: RoleName) -> Self {
        value.0
    }
}

impl Deref for RoleName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0[..]
    }
}

/// Roles the fallback table knows about, any other role resolves to no
/// capabilities
#[derive(Debug, PartialEq, Eq, strum::EnumString)]
#[strum(ascii_case_insensitive)]
enum KnownRole {
    Admin,
    Manager,
    Waiter,
    Bartender,
    #[strum(serialize = "store keeper")]
    StoreKeeper,
    Cashier,
    Worker,
}

/// Static role to capability fallback table
///
/// Only consulted when the user record carries no declared capability list at
/// all (a declared empty list means zero capabilities).
pub fn role_capabilities(role: &RoleName) -> CapabilitySet {
    let Ok(known) = KnownRole::from_str(role) else {
        return CapabilitySet::default();
    };
    match known {
        KnownRole::Admin => CapabilitySet::wildcard(),
        KnownRole::Manager => CapabilitySet::from_declared([
            "dashboard.view",
            "pos.access",
            "inventory.view",
            "orders.view",
            "customers.manage",
            "sessions.manage",
        ]),
        KnownRole::Waiter | KnownRole::Bartender => {
            CapabilitySet::from_declared(["pos.access", "orders.view", "customers.manage"])
        }
        KnownRole::StoreKeeper => {
            CapabilitySet::from_declared(["inventory.manage", "inventory.view"])
        }
        KnownRole::Cashier => CapabilitySet::from_declared([
            "pos.access",
            "orders.view",
            "cashier.view",
            "sessions.manage",
        ]),
        KnownRole::Worker => {
            CapabilitySet::from_declared(["pos.access", "orders.view", "sessions.manage"])
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::empty("", ConversionError::Empty)]
    #[case::too_long("r".repeat(31), ConversionError::MaxExceeded{max:30, actual:31})]
    fn illegal_role_names(#[case] name: String, #[case] expect: ConversionError) {
        // Act
        let actual: Result<RoleName, ConversionError> = name.try_into();

        // Assert
        assert_eq!(actual.unwrap_err(), expect);
    }

    #[rstest]
    #[case::admin_gets_wildcard("admin", "anything.random", true)]
    #[case::admin_case_insensitive("ADMIN", "menu.manage", true)]
    #[case::manager_dashboard("manager", "dashboard.view", true)]
    #[case::manager_no_inventory_manage("manager", "inventory.manage", false)]
    #[case::waiter_pos("waiter", "pos.access", true)]
    #[case::bartender_same_as_waiter("bartender", "customers.manage", true)]
    #[case::store_keeper_inventory("store keeper", "inventory.manage", true)]
    #[case::store_keeper_no_pos("store keeper", "pos.access", false)]
    #[case::cashier_drawer("cashier", "cashier.view", true)]
    #[case::worker_sessions("Worker", "sessions.manage", true)]
    #[case::unknown_role_gets_nothing("dishwasher", "pos.access", false)]
    fn fallback_table(#[case] role: &str, #[case] capability: &str, #[case] expected: bool) {
        // Arrange
        let role: RoleName = role.try_into().unwrap();

        // Act
        let caps = role_capabilities(&role);

        // Assert
        assert_eq!(caps.grants(capability), expected);
    }

    #[test]
    fn unknown_role_is_empty_not_wildcard() {
        let role: RoleName = "regional director".try_into().unwrap();
        assert!(role_capabilities(&role).is_empty());
    }
}
