use a2p_policy::AccessDecision;
use a2p_types::{ConsentMethod, ConsentReceipt, Did, LegalBasis, ReceiptId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConsentError, ConsentResult};

/// Context the caller supplies alongside a decision when issuing a receipt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRequest {
    pub user_did: Did,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_did: Option<Did>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_basis: Option<LegalBasis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_profile: Option<String>,
}

impl IssueRequest {
    pub fn new(user_did: Did) -> Self {
        Self {
            user_did,
            operator_did: None,
            purpose: None,
            legal_basis: None,
            expires_at: None,
            sub_profile: None,
        }
    }

    pub fn with_operator(mut self, operator: Did) -> Self {
        self.operator_did = Some(operator);
        self
    }

    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    pub fn with_legal_basis(mut self, basis: LegalBasis) -> Self {
        self.legal_basis = Some(basis);
        self
    }

    pub fn expiring_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }
}

/// Record that `decision` granted access.
///
/// A decision that allowed no scope has nothing to prove and is refused.
pub fn issue(
    decision: &AccessDecision,
    request: IssueRequest,
    now: DateTime<Utc>,
) -> ConsentResult<ConsentReceipt> {
    if decision.allowed_scopes.is_empty() {
        return Err(ConsentError::NothingGranted(decision.agent_did.clone()));
    }

    let policy = decision.matched_policy.as_ref();
    let consent_method = if policy.is_some() {
        ConsentMethod::PolicyMatch
    } else {
        ConsentMethod::ExplicitGrant
    };

    let receipt = ConsentReceipt {
        receipt_id: ReceiptId::generate(),
        user_did: request.user_did,
        agent_did: decision.agent_did.clone(),
        operator_did: request.operator_did,
        policy_id: policy.map(|p| p.id.clone()),
        granted_scopes: decision.allowed_scopes.clone(),
        denied_scopes: decision.denied_scopes.clone(),
        permissions: decision.permissions.clone(),
        sub_profile: request
            .sub_profile
            .or_else(|| policy.and_then(|p| p.sub_profile.clone())),
        granted_at: now,
        expires_at: request.expires_at,
        consent_method,
        purpose: request.purpose,
        legal_basis: request.legal_basis.unwrap_or_default(),
        revoked_at: None,
        revoked_reason: None,
    };

    debug!(
        receipt = %receipt.receipt_id,
        agent = %receipt.agent_did,
        scopes = receipt.granted_scopes.len(),
        "consent receipt issued"
    );
    Ok(receipt)
}

/// Not revoked, and `expiresAt` (if any) is not in the past.
pub fn is_valid(receipt: &ConsentReceipt, now: DateTime<Utc>) -> bool {
    !receipt.is_revoked() && receipt.expires_at.map_or(true, |expires| expires >= now)
}

/// Mark a receipt revoked at `now`. A second revoke is refused.
pub fn revoke(
    receipt: &ConsentReceipt,
    reason: Option<String>,
    now: DateTime<Utc>,
) -> ConsentResult<ConsentReceipt> {
    if receipt.is_revoked() {
        return Err(ConsentError::AlreadyRevoked(receipt.receipt_id.clone()));
    }
    let mut revoked = receipt.clone();
    revoked.revoked_at = Some(now);
    revoked.revoked_reason = reason;
    Ok(revoked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use a2p_policy::{PermissionLevel, PolicyBuilder};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 10, 10, 0, 0).unwrap()
    }

    fn agent() -> Did {
        Did::new("did:a2p:agent:local:work-slack")
    }

    fn policy_decision() -> AccessDecision {
        let policy = PolicyBuilder::new("*")
            .id("p1")
            .allow(["a2p:professional.*"])
            .sub_profile("work")
            .build(now())
            .unwrap();
        a2p_policy::evaluate(
            &[policy],
            &agent(),
            &["a2p:professional", "a2p:health"],
            None,
            now(),
        )
    }

    #[test]
    fn issue_from_policy_match() {
        let receipt = issue(
            &policy_decision(),
            IssueRequest::new(Did::new("did:a2p:user:alice")).with_purpose("scheduling"),
            now(),
        )
        .unwrap();

        assert_eq!(receipt.consent_method, ConsentMethod::PolicyMatch);
        assert_eq!(receipt.policy_id.as_ref().map(|id| id.as_str()), Some("p1"));
        assert_eq!(receipt.granted_scopes, vec!["a2p:professional"]);
        assert_eq!(receipt.denied_scopes, vec!["a2p:health"]);
        assert_eq!(receipt.sub_profile.as_deref(), Some("work"));
        assert_eq!(receipt.legal_basis, LegalBasis::Consent);
        assert_eq!(receipt.granted_at, now());
        assert!(receipt.receipt_id.as_str().starts_with("rcpt_"));
        assert!(is_valid(&receipt, now()));
    }

    #[test]
    fn explicit_grant_method_without_policy() {
        let decision = AccessDecision::explicit_grant(
            &agent(),
            vec!["a2p:preferences".into()],
            vec![PermissionLevel::ReadPublic],
        );
        let receipt = issue(
            &decision,
            IssueRequest::new(Did::new("did:a2p:user:alice"))
                .with_legal_basis(LegalBasis::Contract),
            now(),
        )
        .unwrap();
        assert_eq!(receipt.consent_method, ConsentMethod::ExplicitGrant);
        assert!(receipt.policy_id.is_none());
        assert_eq!(receipt.legal_basis, LegalBasis::Contract);
    }

    #[test]
    fn nothing_granted_is_refused() {
        let decision = AccessDecision::denied(&agent(), &["a2p:health"]);
        let err = issue(&decision, IssueRequest::new(Did::new("did:u")), now()).unwrap_err();
        assert!(matches!(err, ConsentError::NothingGranted(_)));
    }

    #[test]
    fn valid_until_expiry_instant() {
        let receipt = issue(
            &policy_decision(),
            IssueRequest::new(Did::new("did:u")).expiring_at(now() + Duration::hours(1)),
            now(),
        )
        .unwrap();
        assert!(is_valid(&receipt, now() + Duration::minutes(59)));
        assert!(is_valid(&receipt, now() + Duration::hours(1)));
        assert!(!is_valid(
            &receipt,
            now() + Duration::hours(1) + Duration::milliseconds(1)
        ));
    }

    #[test]
    fn expiring_now_is_still_valid_now() {
        let receipt = issue(
            &policy_decision(),
            IssueRequest::new(Did::new("did:u")).expiring_at(now()),
            now(),
        )
        .unwrap();
        assert!(is_valid(&receipt, now()));
        assert!(!is_valid(&receipt, now() + Duration::seconds(1)));
    }

    #[test]
    fn revoked_receipt_is_invalid_despite_future_expiry() {
        let receipt = issue(
            &policy_decision(),
            IssueRequest::new(Did::new("did:u")).expiring_at(now() + Duration::days(30)),
            now(),
        )
        .unwrap();
        assert!(is_valid(&receipt, now()));

        let revoked = revoke(&receipt, None, now()).unwrap();
        assert!(!is_valid(&revoked, now()));
        assert!(matches!(
            revoke(&revoked, None, now()),
            Err(ConsentError::AlreadyRevoked(_))
        ));
    }

    #[test]
    fn revoke_once_only() {
        let receipt = issue(&policy_decision(), IssueRequest::new(Did::new("did:u")), now()).unwrap();
        let later = now() + Duration::days(1);
        let revoked = revoke(&receipt, Some("changed my mind".into()), later).unwrap();

        assert!(receipt.revoked_at.is_none());
        assert_eq!(revoked.revoked_at, Some(later));
        assert_eq!(revoked.revoked_reason.as_deref(), Some("changed my mind"));
        assert!(!is_valid(&revoked, later));

        let err = revoke(&revoked, None, later).unwrap_err();
        assert!(matches!(err, ConsentError::AlreadyRevoked(id) if id == receipt.receipt_id));
    }

    #[test]
    fn receipt_json_uses_protocol_spelling() {
        let receipt = issue(&policy_decision(), IssueRequest::new(Did::new("did:u")), now()).unwrap();
        let json = serde_json::to_value(&receipt).unwrap();
        assert_eq!(json["consentMethod"], "policy_match");
        assert_eq!(json["legalBasis"], "consent");
        assert!(json.get("revokedAt").is_none());
    }
}
