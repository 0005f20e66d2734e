//! CLI command implementations

pub mod access;
pub mod policy;
pub mod profile;
pub mod proposal;
pub mod receipt;
