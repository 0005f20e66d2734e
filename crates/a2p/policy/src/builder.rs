use a2p_types::{ConsentPolicy, Did, PermissionLevel, PolicyConditions, PolicyId};
use chrono::{DateTime, Utc};

use crate::error::{PolicyError, PolicyResult};

/// Priority given to policies that do not set one.
pub const DEFAULT_PRIORITY: i32 = 100;

/// Fluent construction of a [`ConsentPolicy`].
#[derive(Clone, Debug)]
pub struct PolicyBuilder {
    id: Option<PolicyId>,
    name: Option<String>,
    agent_pattern: String,
    agent_dids: Option<Vec<Did>>,
    operator_dids: Option<Vec<Did>>,
    allow: Vec<String>,
    deny: Vec<String>,
    permissions: Vec<PermissionLevel>,
    conditions: Option<PolicyConditions>,
    priority: i32,
    enabled: bool,
    expiry: Option<DateTime<Utc>>,
    sub_profile: Option<String>,
}

impl PolicyBuilder {
    pub fn new(agent_pattern: impl Into<String>) -> Self {
        Self {
            id: None,
            name: None,
            agent_pattern: agent_pattern.into(),
            agent_dids: None,
            operator_dids: None,
            allow: Vec::new(),
            deny: Vec::new(),
            permissions: vec![PermissionLevel::ReadScoped],
            conditions: None,
            priority: DEFAULT_PRIORITY,
            enabled: true,
            expiry: None,
            sub_profile: None,
        }
    }

    pub fn id(mut self, id: impl Into<PolicyId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn agent_dids<I, D>(mut self, dids: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<Did>,
    {
        self.agent_dids = Some(dids.into_iter().map(Into::into).collect());
        self
    }

    pub fn operator_dids<I, D>(mut self, dids: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<Did>,
    {
        self.operator_dids = Some(dids.into_iter().map(Into::into).collect());
        self
    }

    pub fn allow<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow.extend(scopes.into_iter().map(Into::into));
        self
    }

    pub fn deny<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deny.extend(scopes.into_iter().map(Into::into));
        self
    }

    /// Replaces the default `read_scoped`.
    pub fn permissions<I>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = PermissionLevel>,
    {
        self.permissions = permissions.into_iter().collect();
        self
    }

    pub fn conditions(mut self, conditions: PolicyConditions) -> Self {
        self.conditions = (!conditions.is_empty()).then_some(conditions);
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn expiry(mut self, expiry: DateTime<Utc>) -> Self {
        self.expiry = Some(expiry);
        self
    }

    pub fn sub_profile(mut self, sub_profile: impl Into<String>) -> Self {
        self.sub_profile = Some(sub_profile.into());
        self
    }

    pub fn build(self, now: DateTime<Utc>) -> PolicyResult<ConsentPolicy> {
        let policy = ConsentPolicy {
            id: self.id.unwrap_or_else(PolicyId::generate),
            name: self.name,
            agent_pattern: self.agent_pattern,
            agent_dids: self.agent_dids,
            operator_dids: self.operator_dids,
            allow: self.allow,
            deny: self.deny,
            permissions: self.permissions,
            conditions: self.conditions,
            priority: self.priority,
            enabled: self.enabled,
            expiry: self.expiry,
            sub_profile: self.sub_profile,
            created: now,
            updated: now,
        };
        validate(&policy)?;
        Ok(policy)
    }
}

/// Structural checks applied whenever a policy is authored.
pub fn validate(policy: &ConsentPolicy) -> PolicyResult<()> {
    if policy.id.as_str().trim().is_empty() {
        return Err(PolicyError::InvalidPolicy("policy id is empty".into()));
    }
    if policy.agent_pattern.trim().is_empty() {
        return Err(PolicyError::InvalidPolicy(format!(
            "policy {} has an empty agent pattern",
            policy.id
        )));
    }
    if let Some(scope) = policy
        .allow
        .iter()
        .chain(&policy.deny)
        .find(|s| s.trim().is_empty())
    {
        return Err(PolicyError::InvalidPolicy(format!(
            "policy {} has an empty scope pattern {scope:?}",
            policy.id
        )));
    }
    if let Some(min) = policy.conditions.as_ref().and_then(|c| c.min_trust_score) {
        if !(0.0..=1.0).contains(&min) {
            return Err(PolicyError::InvalidPolicy(format!(
                "policy {} has minimum trust score {min} outside [0, 1]",
                policy.id
            )));
        }
    }
    Ok(())
}

/// Baseline policies for a fresh profile.
///
/// Anything may read explicitly public preferences; the trusted-assistant
/// template ships disabled until the user turns it on.
pub fn default_policies(now: DateTime<Utc>) -> Vec<ConsentPolicy> {
    let public = ConsentPolicy {
        id: PolicyId::new("policy_default_public"),
        name: Some("Public preferences".into()),
        agent_pattern: "*".into(),
        agent_dids: None,
        operator_dids: None,
        allow: vec!["a2p:preferences.public.*".into(), "a2p:identity.name".into()],
        deny: vec![
            "a2p:health.*".into(),
            "a2p:financial.*".into(),
            "a2p:relationships.*".into(),
        ],
        permissions: vec![PermissionLevel::ReadPublic],
        conditions: None,
        priority: 1000,
        enabled: true,
        expiry: None,
        sub_profile: None,
        created: now,
        updated: now,
    };

    let trusted = ConsentPolicy {
        id: PolicyId::new("policy_default_trusted"),
        name: Some("Trusted assistants".into()),
        agent_pattern: "*".into(),
        agent_dids: None,
        operator_dids: None,
        allow: vec![
            "a2p:preferences.*".into(),
            "a2p:professional.*".into(),
            "a2p:interests.*".into(),
            "a2p:context.*".into(),
        ],
        deny: vec!["a2p:health.*".into(), "a2p:financial.*".into()],
        permissions: vec![PermissionLevel::ReadScoped, PermissionLevel::Propose],
        conditions: Some(PolicyConditions {
            require_verified_operator: Some(true),
            min_trust_score: Some(0.8),
            ..PolicyConditions::default()
        }),
        priority: 500,
        enabled: false,
        expiry: None,
        sub_profile: None,
        created: now,
        updated: now,
    };

    vec![trusted, public]
}
