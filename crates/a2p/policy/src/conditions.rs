use a2p_types::{Did, PolicyConditions};
use serde::{Deserialize, Serialize};

/// What the transport layer knows about the calling agent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequesterMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_did: Option<Did>,
    #[serde(default)]
    pub operator_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_score: Option<f64>,
    #[serde(default)]
    pub audited: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,
}

impl RequesterMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_operator(mut self, operator: Did, verified: bool) -> Self {
        self.operator_did = Some(operator);
        self.operator_verified = verified;
        self
    }

    pub fn with_trust_score(mut self, score: f64) -> Self {
        self.trust_score = Some(score);
        self
    }

    pub fn with_audit(mut self, audited: bool) -> Self {
        self.audited = audited;
        self
    }

    pub fn with_jurisdiction(mut self, jurisdiction: impl Into<String>) -> Self {
        self.jurisdiction = Some(jurisdiction.into());
        self
    }
}

/// One requirement a policy places on the requester.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConditionKind<'a> {
    VerifiedOperator,
    MinTrustScore(f64),
    AuditRequired,
    JurisdictionBlocked(&'a [String]),
    JurisdictionAllowed(&'a [String]),
}

impl ConditionKind<'_> {
    /// Missing metadata satisfies nothing except a block list.
    pub fn holds(&self, metadata: Option<&RequesterMetadata>) -> bool {
        match *self {
            ConditionKind::VerifiedOperator => metadata.is_some_and(|m| m.operator_verified),
            ConditionKind::MinTrustScore(min) => metadata
                .and_then(|m| m.trust_score)
                .is_some_and(|score| score >= min),
            ConditionKind::AuditRequired => metadata.is_some_and(|m| m.audited),
            ConditionKind::JurisdictionBlocked(blocked) => {
                match metadata.and_then(|m| m.jurisdiction.as_deref()) {
                    Some(jurisdiction) => !contains_jurisdiction(blocked, jurisdiction),
                    None => true,
                }
            }
            ConditionKind::JurisdictionAllowed(allowed) => metadata
                .and_then(|m| m.jurisdiction.as_deref())
                .is_some_and(|jurisdiction| contains_jurisdiction(allowed, jurisdiction)),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ConditionKind::VerifiedOperator => "verified operator".to_string(),
            ConditionKind::MinTrustScore(min) => format!("trust score >= {min}"),
            ConditionKind::AuditRequired => "audited agent".to_string(),
            ConditionKind::JurisdictionBlocked(list) => {
                format!("jurisdiction not in [{}]", list.join(", "))
            }
            ConditionKind::JurisdictionAllowed(list) => {
                format!("jurisdiction in [{}]", list.join(", "))
            }
        }
    }
}

fn contains_jurisdiction(list: &[String], jurisdiction: &str) -> bool {
    list.iter().any(|j| j.eq_ignore_ascii_case(jurisdiction))
}

/// Flatten a policy's conditions into the closed set of kinds.
///
/// A `false` flag and an empty list impose nothing.
pub fn condition_kinds(conditions: &PolicyConditions) -> Vec<ConditionKind<'_>> {
    let mut kinds = Vec::new();
    if conditions.require_verified_operator == Some(true) {
        kinds.push(ConditionKind::VerifiedOperator);
    }
    if let Some(min) = conditions.min_trust_score {
        kinds.push(ConditionKind::MinTrustScore(min));
    }
    if conditions.require_audit == Some(true) {
        kinds.push(ConditionKind::AuditRequired);
    }
    if !conditions.blocked_jurisdictions.is_empty() {
        kinds.push(ConditionKind::JurisdictionBlocked(
            &conditions.blocked_jurisdictions,
        ));
    }
    if !conditions.allowed_jurisdictions.is_empty() {
        kinds.push(ConditionKind::JurisdictionAllowed(
            &conditions.allowed_jurisdictions,
        ));
    }
    kinds
}

/// Whether every condition holds for the given metadata.
pub fn conditions_hold(
    conditions: Option<&PolicyConditions>,
    metadata: Option<&RequesterMetadata>,
) -> bool {
    conditions.map_or(true, |c| {
        condition_kinds(c).iter().all(|kind| kind.holds(metadata))
    })
}
