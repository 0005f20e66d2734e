use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{Did, PolicyId, ReceiptId};
use crate::permission::PermissionLevel;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentMethod {
    PolicyMatch,
    ExplicitGrant,
}

/// Lawful basis recorded on a receipt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegalBasis {
    #[default]
    Consent,
    Contract,
    LegalObligation,
    VitalInterests,
    PublicTask,
    LegitimateInterests,
}

/// Proof that a specific grant occurred.
///
/// Immutable apart from the single revoke transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentReceipt {
    pub receipt_id: ReceiptId,
    pub user_did: Did,
    pub agent_did: Did,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_did: Option<Did>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<PolicyId>,
    pub granted_scopes: Vec<String>,
    #[serde(default)]
    pub denied_scopes: Vec<String>,
    pub permissions: Vec<PermissionLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_profile: Option<String>,
    pub granted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub consent_method: ConsentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default)]
    pub legal_basis: LegalBasis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_reason: Option<String>,
}

impl ConsentReceipt {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }
}
