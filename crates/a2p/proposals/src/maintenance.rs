use a2p_types::{Profile, ProposalId, ProposalResolution, ResolutionAction};
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::lifecycle::resolve;

#[derive(Clone, Debug, PartialEq)]
pub struct Sweep {
    pub profile: Profile,
    pub expired: Vec<ProposalId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Cleanup {
    pub profile: Profile,
    pub removed: usize,
}

/// Expire pending proposals whose `expiresAt` has passed.
///
/// Running it again at the same instant changes nothing.
pub fn sweep_expired(profile: &Profile, now: DateTime<Utc>) -> Sweep {
    let mut next = profile.clone();
    let mut expired = Vec::new();

    for proposal in next
        .proposals
        .iter_mut()
        .filter(|p| p.is_pending() && p.expires_at < now)
    {
        resolve(
            proposal,
            ProposalResolution {
                resolved_at: now,
                action: ResolutionAction::Expired,
                edited_content: None,
                edited_category: None,
                created_memory_id: None,
                reason: None,
            },
        );
        expired.push(proposal.id.clone());
    }

    if expired.is_empty() {
        return Sweep { profile: next, expired };
    }
    debug!(count = expired.len(), "expired stale proposals");
    Sweep {
        profile: next.touched(now),
        expired,
    }
}

/// Drop terminal proposals resolved more than `keep_days` ago.
///
/// A window reaching past the start of the calendar keeps everything.
pub fn cleanup_resolved(profile: &Profile, keep_days: i64, now: DateTime<Utc>) -> Cleanup {
    let Some(cutoff) = Duration::try_days(keep_days).and_then(|keep| now.checked_sub_signed(keep))
    else {
        return Cleanup {
            profile: profile.clone(),
            removed: 0,
        };
    };
    let mut next = profile.clone();
    let before = next.proposals.len();

    next.proposals.retain(|p| {
        p.is_pending() || p.resolved_at().map_or(true, |resolved| resolved >= cutoff)
    });

    let removed = before - next.proposals.len();
    if removed == 0 {
        return Cleanup { profile: next, removed };
    }
    debug!(removed, keep_days, "removed old resolved proposals");
    Cleanup {
        profile: next.touched(now),
        removed,
    }
}
