//! Identity of the business location the user is working in
//!
//! The branch scopes both data queries and permission resolution. The session
//! core only carries the identifier; branch metadata lives server side.

#[derive(
    Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct BranchId(u32);

impl From<u32> for BranchId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl TryFrom<i64> for BranchId {
    type Error = anyhow::Error;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match u32::try_from(value) {
            Ok(x) => Ok(Self(x)),
            Err(_) => anyhow::bail!("branch ids must fit in a u32. Value: {value}"),
        }
    }
}

impl From<BranchId> for u32 {
    fn from(value: BranchId) -> Self {
        value.0
    }
}

impl std::fmt::Display for BranchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
