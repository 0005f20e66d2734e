//! Receipts held on a profile snapshot.
//!
//! Receipts are only ever appended; revocation marks one in place.

use a2p_types::{ConsentReceipt, Did, Profile, ReceiptId};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{ConsentError, ConsentResult};
use crate::receipt::{is_valid, revoke};

/// Append a freshly issued receipt to the snapshot.
pub fn record_receipt(
    profile: &Profile,
    receipt: ConsentReceipt,
    now: DateTime<Utc>,
) -> ConsentResult<Profile> {
    if profile.receipt(&receipt.receipt_id).is_some() {
        return Err(ConsentError::DuplicateReceipt(receipt.receipt_id));
    }
    let mut next = profile.clone();
    next.consent_receipts.push(receipt);
    Ok(next.touched(now))
}

/// Revoke a stored receipt, returning the new snapshot and the revoked copy.
pub fn revoke_receipt(
    profile: &Profile,
    id: &ReceiptId,
    reason: Option<String>,
    now: DateTime<Utc>,
) -> ConsentResult<(Profile, ConsentReceipt)> {
    let mut next = profile.clone();
    let slot = next
        .consent_receipts
        .iter_mut()
        .find(|r| &r.receipt_id == id)
        .ok_or_else(|| ConsentError::ReceiptNotFound(id.clone()))?;

    let revoked = revoke(slot, reason, now)?;
    *slot = revoked.clone();

    debug!(receipt = %id, agent = %revoked.agent_did, "consent receipt revoked");
    Ok((next.touched(now), revoked))
}

/// Receipts still valid at `now`, optionally for one agent only.
pub fn active_receipts<'a>(
    profile: &'a Profile,
    agent: Option<&Did>,
    now: DateTime<Utc>,
) -> Vec<&'a ConsentReceipt> {
    profile
        .consent_receipts
        .iter()
        .filter(|r| agent.map_or(true, |a| &r.agent_did == a))
        .filter(|r| is_valid(r, now))
        .collect()
}
