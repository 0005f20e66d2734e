//! Policy edits on a profile snapshot.
//!
//! Each operation returns a new snapshot and leaves `version` alone; the
//! store advances it on save.

use std::collections::BTreeSet;

use a2p_types::{ConsentPolicy, PermissionLevel, PolicyId, Profile, SubProfile};
use chrono::{DateTime, Utc};

use crate::builder::validate;
use crate::error::{PolicyError, PolicyResult};

/// Validate and append a new policy. Ids must be unique per profile.
pub fn add_policy(
    profile: &Profile,
    policy: ConsentPolicy,
    now: DateTime<Utc>,
) -> PolicyResult<Profile> {
    validate(&policy)?;
    if profile.policy(&policy.id).is_some() {
        return Err(PolicyError::DuplicatePolicy(policy.id));
    }
    let mut next = profile.clone();
    next.access_policies.push(policy);
    Ok(next.touched(now))
}

/// Apply `edit` to a copy of the policy. The id cannot be changed.
pub fn update_policy<F>(
    profile: &Profile,
    id: &PolicyId,
    edit: F,
    now: DateTime<Utc>,
) -> PolicyResult<Profile>
where
    F: FnOnce(&mut ConsentPolicy),
{
    let mut next = profile.clone();
    let policy = next
        .access_policies
        .iter_mut()
        .find(|p| &p.id == id)
        .ok_or_else(|| PolicyError::PolicyNotFound(id.clone()))?;

    edit(policy);
    policy.id = id.clone();
    policy.updated = now;
    validate(policy)?;
    Ok(next.touched(now))
}

/// Remove a policy, handing back the removed rule.
pub fn remove_policy(
    profile: &Profile,
    id: &PolicyId,
    now: DateTime<Utc>,
) -> PolicyResult<(Profile, ConsentPolicy)> {
    let mut next = profile.clone();
    let index = next
        .access_policies
        .iter()
        .position(|p| &p.id == id)
        .ok_or_else(|| PolicyError::PolicyNotFound(id.clone()))?;
    let removed = next.access_policies.remove(index);
    Ok((next.touched(now), removed))
}

/// Turn a policy on or off without removing it.
pub fn set_policy_enabled(
    profile: &Profile,
    id: &PolicyId,
    enabled: bool,
    now: DateTime<Utc>,
) -> PolicyResult<Profile> {
    update_policy(profile, id, |p| p.enabled = enabled, now)
}

/// Union of the policies' permissions, ordered by rank. For display only.
pub fn merge_permissions<'a, I>(policies: I) -> Vec<PermissionLevel>
where
    I: IntoIterator<Item = &'a ConsentPolicy>,
{
    policies
        .into_iter()
        .flat_map(|p| p.permissions.iter().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Register a named slice of the profile that policies can point at.
pub fn add_sub_profile(
    profile: &Profile,
    sub_profile: SubProfile,
    now: DateTime<Utc>,
) -> PolicyResult<Profile> {
    if sub_profile.id.trim().is_empty() {
        return Err(PolicyError::InvalidSubProfile("sub-profile id is empty".into()));
    }
    if profile.sub_profile(&sub_profile.id).is_some() {
        return Err(PolicyError::DuplicateSubProfile(sub_profile.id));
    }
    Ok(profile.clone().with_sub_profile(sub_profile).touched(now))
}
