use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{Did, PolicyId};
use crate::permission::PermissionLevel;

/// A user-authored access rule.
///
/// Policies are owned by the profile's controller. The evaluation path only
/// ever reads them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentPolicy {
    pub id: PolicyId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Glob over agent Dids, `*` matching any run of characters.
    pub agent_pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_dids: Option<Vec<Did>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_dids: Option<Vec<Did>>,
    #[serde(default)]
    pub allow: Vec<String>,
    #[serde(default)]
    pub deny: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<PermissionLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<PolicyConditions>,
    /// Lower values are evaluated first.
    pub priority: i32,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_profile: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl ConsentPolicy {
    /// Enabled and not past its expiry.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.enabled && self.expiry.map_or(true, |expiry| expiry >= now)
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }
}

/// Requirements on the requesting agent's metadata.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyConditions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_verified_operator: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_trust_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_audit: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_jurisdictions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocked_jurisdictions: Vec<String>,
}

impl PolicyConditions {
    pub fn is_empty(&self) -> bool {
        *self == PolicyConditions::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn policy(enabled: bool, expiry: Option<DateTime<Utc>>) -> ConsentPolicy {
        let now = Utc::now();
        ConsentPolicy {
            id: PolicyId::new("p"),
            name: None,
            agent_pattern: "*".into(),
            agent_dids: None,
            operator_dids: None,
            allow: vec![],
            deny: vec![],
            permissions: vec![],
            conditions: None,
            priority: 100,
            enabled,
            expiry,
            sub_profile: None,
            created: now,
            updated: now,
        }
    }

    #[test]
    fn activity_respects_enabled_and_expiry() {
        let now = Utc::now();
        assert!(policy(true, None).is_active(now));
        assert!(!policy(false, None).is_active(now));
        assert!(!policy(true, Some(now - Duration::seconds(1))).is_active(now));
        assert!(policy(true, Some(now + Duration::hours(1))).is_active(now));
        assert!(policy(true, Some(now)).is_active(now));
    }

    #[test]
    fn conditions_deserialize_from_protocol_json() {
        let json = r#"{"requireVerifiedOperator":true,"minTrustScore":0.8}"#;
        let conditions: PolicyConditions = serde_json::from_str(json).unwrap();
        assert_eq!(conditions.require_verified_operator, Some(true));
        assert_eq!(conditions.min_trust_score, Some(0.8));
        assert!(conditions.allowed_jurisdictions.is_empty());
        assert!(!conditions.is_empty());
    }
}
