//! a2p Consent - consent receipts
//!
//! A receipt is issued whenever a decision grants at least one scope and is
//! the durable proof of that grant. Receipts are never deleted; revoking one
//! only stamps `revokedAt`.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod error;
pub mod ledger;
pub mod receipt;

pub use error::{ConsentError, ConsentResult};
pub use ledger::{active_receipts, record_receipt, revoke_receipt};
pub use receipt::{is_valid, issue, revoke, IssueRequest};
