//! Code shared between the session core and the client screens

#![warn(unused_crate_dependencies)]

pub mod branch;
pub mod const_config;
pub mod errors;
mod macros;
pub mod random;
pub mod telemetry;
pub mod token;
pub mod uac;

pub use random::{random_string, random_string_def_len};
