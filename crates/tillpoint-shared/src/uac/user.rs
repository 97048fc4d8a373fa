use std::fmt::Display;

use crate::{branch::BranchId, errors::ConversionError};

use super::RoleName;

/// Represents a username and is constrained to not be an empty string
#[derive(
    Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
pub struct Username(String);

impl Username {
    pub const MAX_LENGTH: usize = 16;
}

impl TryFrom<String> for Username {
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

impl TryFrom<&str> for Username {
    type Error = ConversionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.to_string().try_into()
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stores the user info that is returned on login
///
/// `capabilities` is the server-declared list; `None` means the server
/// declared nothing and the role fallback table applies, while `Some(vec![])`
/// means the server explicitly granted zero capabilities.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub username: Username,
    pub role: RoleName,
    pub branch_id: Option<BranchId>,
    pub capabilities: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::empty("", ConversionError::Empty)]
    #[case::too_long("a".repeat(17), ConversionError::MaxExceeded{max:16, actual:17})]
    fn illegal_username(#[case] name: String, #[case] expect: ConversionError) {
        // Act
        let actual: Result<Username, ConversionError> = name.try_into();

        // Assert
        assert_eq!(actual.unwrap_err(), expect);
    }
}
