//! Shared items related to user account control

mod capability;
mod role;
mod user;

pub use capability::{Capability, CapabilitySet, WILDCARD};
pub use role::{role_capabilities, RoleName};
pub use user::{UserInfo, Username};
