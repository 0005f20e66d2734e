//! a2p Scope - hierarchical scope and agent pattern matching
//!
//! Pure predicates with no error cases: a pattern that matches nothing just
//! yields an empty allowed set.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod filter;
pub mod matcher;

pub use filter::{filter, ScopeSet, ScopeSplit};
pub use matcher::{glob_matches, is_within, matches, matches_any};
