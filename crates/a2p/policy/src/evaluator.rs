use a2p_scope::{filter, glob_matches, ScopeSplit};
use a2p_types::{ConsentPolicy, Did, PermissionLevel, PolicyId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::conditions::{conditions_hold, RequesterMetadata};

/// Outcome of an access request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessDecision {
    pub granted: bool,
    pub agent_did: Did,
    pub allowed_scopes: Vec<String>,
    pub denied_scopes: Vec<String>,
    pub permissions: Vec<PermissionLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_policy: Option<ConsentPolicy>,
}

impl AccessDecision {
    /// No policy covers the agent: everything requested is denied.
    pub fn denied<S: AsRef<str>>(agent: &Did, requested: &[S]) -> Self {
        let split = ScopeSplit::deny_all(requested);
        Self {
            granted: false,
            agent_did: agent.clone(),
            allowed_scopes: split.allowed,
            denied_scopes: split.denied,
            permissions: Vec::new(),
            matched_policy: None,
        }
    }

    /// A one-off grant made by the user directly, outside policy matching.
    pub fn explicit_grant(
        agent: &Did,
        scopes: Vec<String>,
        permissions: Vec<PermissionLevel>,
    ) -> Self {
        Self {
            granted: !scopes.is_empty(),
            agent_did: agent.clone(),
            allowed_scopes: scopes,
            denied_scopes: Vec::new(),
            permissions,
            matched_policy: None,
        }
    }

    pub fn policy_id(&self) -> Option<&PolicyId> {
        self.matched_policy.as_ref().map(|p| &p.id)
    }
}

/// Whether `policy` governs `agent` given what is known about the requester.
///
/// Does not look at `enabled` or `expiry`; see [`ConsentPolicy::is_active`].
pub fn policy_matches(
    policy: &ConsentPolicy,
    agent: &Did,
    metadata: Option<&RequesterMetadata>,
) -> bool {
    if !glob_matches(agent.as_str(), &policy.agent_pattern) {
        return false;
    }
    if let Some(dids) = &policy.agent_dids {
        if !dids.contains(agent) {
            return false;
        }
    }
    if let (Some(operators), Some(operator)) = (
        &policy.operator_dids,
        metadata.and_then(|m| m.operator_did.as_ref()),
    ) {
        if !operators.contains(operator) {
            return false;
        }
    }
    conditions_hold(policy.conditions.as_ref(), metadata)
}

/// Active policies that match `agent`, in evaluation order.
pub fn matching_policies<'a>(
    policies: &'a [ConsentPolicy],
    agent: &Did,
    metadata: Option<&RequesterMetadata>,
    now: DateTime<Utc>,
) -> Vec<&'a ConsentPolicy> {
    let mut active: Vec<&ConsentPolicy> = policies.iter().filter(|p| p.is_active(now)).collect();
    // Stable: equal priorities keep their stored order.
    active.sort_by_key(|p| p.priority);
    active
        .into_iter()
        .filter(|p| policy_matches(p, agent, metadata))
        .collect()
}

/// Decide which of `requested` the agent may access.
///
/// The lowest-priority active matching policy governs alone. Never fails.
pub fn evaluate<S: AsRef<str>>(
    policies: &[ConsentPolicy],
    agent: &Did,
    requested: &[S],
    metadata: Option<&RequesterMetadata>,
    now: DateTime<Utc>,
) -> AccessDecision {
    let Some(policy) = matching_policies(policies, agent, metadata, now)
        .into_iter()
        .next()
    else {
        debug!(agent = %agent, requested = requested.len(), "no policy matched");
        return AccessDecision::denied(agent, requested);
    };

    let split = filter(requested, &policy.allow, &policy.deny);
    let granted = !split.allowed.is_empty();

    debug!(
        agent = %agent,
        policy = %policy.id,
        allowed = split.allowed.len(),
        denied = split.denied.len(),
        granted,
        "policy evaluated"
    );

    AccessDecision {
        granted,
        agent_did: agent.clone(),
        allowed_scopes: split.allowed,
        denied_scopes: split.denied,
        permissions: policy.permissions.clone(),
        matched_policy: Some(policy.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::PolicyBuilder;
    use a2p_types::PolicyConditions;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn policy(id: &str, pattern: &str, priority: i32) -> ConsentPolicy {
        PolicyBuilder::new(pattern)
            .id(id)
            .allow(["a2p:*"])
            .priority(priority)
            .build(now())
            .unwrap()
    }

    fn scopes(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn work_agent_gets_professional_but_not_health() {
        let work = PolicyBuilder::new("did:a2p:agent:local:work-*")
            .id("p1")
            .allow(["a2p:professional.*", "a2p:preferences.communication"])
            .deny(["a2p:health.*"])
            .permissions([PermissionLevel::ReadScoped, PermissionLevel::Propose])
            .priority(10)
            .build(now())
            .unwrap();
        let catch_all = PolicyBuilder::new("*")
            .id("p2")
            .allow(["a2p:preferences.*"])
            .permissions([PermissionLevel::ReadPublic])
            .priority(100)
            .build(now())
            .unwrap();

        let decision = evaluate(
            &[catch_all, work],
            &Did::new("did:a2p:agent:local:work-slack"),
            &["a2p:professional", "a2p:health"],
            None,
            now(),
        );

        assert!(decision.granted);
        assert_eq!(decision.allowed_scopes, scopes(&["a2p:professional"]));
        assert_eq!(decision.denied_scopes, scopes(&["a2p:health"]));
        assert_eq!(
            decision.permissions,
            vec![PermissionLevel::ReadScoped, PermissionLevel::Propose]
        );
        assert_eq!(decision.policy_id().map(|id| id.as_str()), Some("p1"));
    }

    #[test]
    fn verified_operator_condition_blocks_without_metadata() {
        let strict = PolicyBuilder::new("*")
            .id("strict")
            .allow(["a2p:preferences.*"])
            .conditions(PolicyConditions {
                require_verified_operator: Some(true),
                ..PolicyConditions::default()
            })
            .build(now())
            .unwrap();

        let agent = Did::new("did:a2p:agent:x");
        let decision = evaluate(&[strict.clone()], &agent, &["a2p:preferences"], None, now());
        assert!(!decision.granted);
        assert!(decision.allowed_scopes.is_empty());
        assert_eq!(decision.denied_scopes, scopes(&["a2p:preferences"]));
        assert!(decision.permissions.is_empty());
        assert!(decision.matched_policy.is_none());

        let verified = RequesterMetadata::new().with_operator(Did::new("did:op"), true);
        let decision = evaluate(&[strict], &agent, &["a2p:preferences"], Some(&verified), now());
        assert!(decision.granted);
    }

    #[test]
    fn disabled_and_expired_policies_are_skipped() {
        let mut disabled = policy("disabled", "*", 1);
        disabled.enabled = false;
        let mut expired = policy("expired", "*", 2);
        expired.expiry = Some(now());
        let live = policy("live", "*", 3);

        let decision = evaluate(
            &[disabled, expired, live],
            &Did::new("agent"),
            &["a2p:x"],
            None,
            now(),
        );
        assert_eq!(decision.policy_id().map(|id| id.as_str()), Some("live"));
    }

    #[test]
    fn future_expiry_still_active() {
        let mut p = policy("p", "*", 1);
        p.expiry = Some(now() + Duration::seconds(1));
        let decision = evaluate(&[p], &Did::new("agent"), &["a2p:x"], None, now());
        assert!(decision.granted);
    }

    #[test]
    fn winner_takes_all_even_when_it_allows_nothing() {
        let narrow = PolicyBuilder::new("*")
            .id("narrow")
            .allow(["a2p:identity.name"])
            .priority(1)
            .build(now())
            .unwrap();
        let broad = policy("broad", "*", 2);

        let decision = evaluate(
            &[broad, narrow],
            &Did::new("agent"),
            &["a2p:health"],
            None,
            now(),
        );
        assert!(!decision.granted);
        assert_eq!(decision.policy_id().map(|id| id.as_str()), Some("narrow"));
        assert_eq!(decision.denied_scopes, scopes(&["a2p:health"]));
    }

    #[test]
    fn equal_priority_keeps_stored_order() {
        let first = policy("first", "*", 5);
        let second = policy("second", "*", 5);
        let decision = evaluate(&[first, second], &Did::new("a"), &["a2p:x"], None, now());
        assert_eq!(decision.policy_id().map(|id| id.as_str()), Some("first"));
    }

    #[test]
    fn agent_did_list_restricts_pattern() {
        let mut p = policy("p", "*", 1);
        p.agent_dids = Some(vec![Did::new("did:a")]);
        assert!(policy_matches(&p, &Did::new("did:a"), None));
        assert!(!policy_matches(&p, &Did::new("did:b"), None));

        p.agent_dids = Some(Vec::new());
        assert!(!policy_matches(&p, &Did::new("did:a"), None));
    }

    #[test]
    fn operator_list_checked_only_when_operator_known() {
        let mut p = policy("p", "*", 1);
        p.operator_dids = Some(vec![Did::new("did:op:good")]);
        let agent = Did::new("did:a");

        assert!(policy_matches(&p, &agent, None));
        let good = RequesterMetadata::new().with_operator(Did::new("did:op:good"), false);
        let bad = RequesterMetadata::new().with_operator(Did::new("did:op:bad"), false);
        assert!(policy_matches(&p, &agent, Some(&good)));
        assert!(!policy_matches(&p, &agent, Some(&bad)));
    }

    #[test]
    fn explicit_grant_without_scopes_is_not_granted() {
        let agent = Did::new("did:a");
        let grant = AccessDecision::explicit_grant(&agent, Vec::new(), vec![PermissionLevel::ReadPublic]);
        assert!(!grant.granted);
        let grant = AccessDecision::explicit_grant(
            &agent,
            scopes(&["a2p:preferences"]),
            vec![PermissionLevel::ReadPublic],
        );
        assert!(grant.granted);
        assert!(grant.matched_policy.is_none());
    }

    #[test]
    fn decision_serializes_camel_case() {
        let decision = AccessDecision::denied(&Did::new("did:a"), &["a2p:x"]);
        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(json["agentDid"], "did:a");
        assert_eq!(json["deniedScopes"][0], "a2p:x");
        assert!(json.get("matchedPolicy").is_none());
    }

    proptest! {
        #[test]
        fn stored_order_is_irrelevant_for_distinct_priorities(
            priorities in proptest::collection::hash_set(-50i32..50, 1..6),
            rotation in 0usize..6,
        ) {
            let mut policies: Vec<ConsentPolicy> = priorities
                .iter()
                .map(|p| policy(&format!("p{p}"), "*", *p))
                .collect();
            let expected = priorities.iter().min().copied();
            let len = policies.len();
            policies.rotate_left(rotation % len);

            let decision = evaluate(&policies, &Did::new("agent"), &["a2p:x"], None, now());
            let winner = decision.matched_policy.map(|p| p.priority);
            prop_assert_eq!(winner, expected);
        }

        #[test]
        fn decision_partitions_request(
            requested in proptest::collection::vec("a2p:(health|professional|preferences)(\\.[a-z]{1,4})?", 0..6),
        ) {
            let p = PolicyBuilder::new("*")
                .id("p")
                .allow(["a2p:professional.*", "a2p:preferences.*"])
                .deny(["a2p:health.*"])
                .build(now())
                .unwrap();
            let decision = evaluate(&[p], &Did::new("agent"), &requested, None, now());
            prop_assert_eq!(
                decision.allowed_scopes.len() + decision.denied_scopes.len(),
                requested.len()
            );
            for scope in &decision.allowed_scopes {
                prop_assert!(!scope.starts_with("a2p:health"));
            }
            prop_assert_eq!(decision.granted, !decision.allowed_scopes.is_empty());
        }
    }
}
