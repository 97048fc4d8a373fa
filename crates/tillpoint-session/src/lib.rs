//! Session and permission tracking core for the tillpoint POS client
//!
//! Owns the single source of truth for "is the caller currently
//! authenticated" and answers capability queries for the current user. The
//! screens, routing and HTTP plumbing live elsewhere and only consume what
//! this crate exposes.
//! NB: The assumption is made that the async runtime has already been started
//! before any functions from this library are called

#![warn(unused_crate_dependencies)]

mod permissions;
mod storage;
mod store;

pub use permissions::PermissionResolver;
pub use storage::{FileStorage, InMemoryStorage, SessionStorage};
pub use store::{ExpiryCallback, ExpiryReason, SessionRecord, SessionStore};
