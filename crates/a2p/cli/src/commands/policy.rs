//! Policy commands

use std::path::PathBuf;

use a2p_policy::PolicyBuilder;
use a2p_types::{ConsentPolicy, Did, PermissionLevel, PolicyConditions, PolicyId};
use anyhow::Context;
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::output::{self, OutputFormat};
use crate::Service;

#[derive(Subcommand)]
pub enum PolicyCommands {
    /// Add a policy from flags or a JSON file
    Add {
        /// User DID
        user: Did,

        #[command(flatten)]
        args: PolicyArgs,
    },

    /// Remove a policy
    Remove {
        /// User DID
        user: Did,

        /// Policy ID
        policy_id: PolicyId,
    },

    /// Enable a policy
    Enable {
        user: Did,
        policy_id: PolicyId,
    },

    /// Disable a policy
    Disable {
        user: Did,
        policy_id: PolicyId,
    },

    /// List a profile's policies in evaluation order
    List {
        /// User DID
        user: Did,
    },
}

#[derive(Args)]
pub struct PolicyArgs {
    /// Read a complete policy from this JSON file
    #[arg(long, conflicts_with_all = ["agent_pattern", "allow", "deny"])]
    file: Option<PathBuf>,

    /// Glob over agent DIDs
    #[arg(short, long, default_value = "*")]
    agent_pattern: String,

    /// Policy ID (generated when omitted)
    #[arg(long)]
    id: Option<PolicyId>,

    #[arg(long)]
    name: Option<String>,

    /// Allowed scope pattern (repeatable)
    #[arg(long)]
    allow: Vec<String>,

    /// Denied scope pattern (repeatable)
    #[arg(long)]
    deny: Vec<String>,

    /// Granted permission level (repeatable)
    #[arg(short, long = "permission")]
    permissions: Vec<PermissionLevel>,

    /// Lower values are evaluated first
    #[arg(long)]
    priority: Option<i32>,

    /// Require a verified operator
    #[arg(long)]
    require_verified_operator: bool,

    /// Minimum requester trust score (0.0 - 1.0)
    #[arg(long)]
    min_trust_score: Option<f64>,

    /// Require an audited requester
    #[arg(long)]
    require_audit: bool,

    /// Blocked jurisdiction (repeatable)
    #[arg(long = "block-jurisdiction")]
    blocked_jurisdictions: Vec<String>,

    /// Create the policy disabled
    #[arg(long)]
    disabled: bool,
}

impl PolicyArgs {
    fn into_policy(self) -> anyhow::Result<ConsentPolicy> {
        if let Some(path) = self.file {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            return serde_json::from_str(&contents)
                .with_context(|| format!("parsing policy in {}", path.display()));
        }

        let conditions = PolicyConditions {
            require_verified_operator: self.require_verified_operator.then_some(true),
            min_trust_score: self.min_trust_score,
            require_audit: self.require_audit.then_some(true),
            allowed_jurisdictions: Vec::new(),
            blocked_jurisdictions: self.blocked_jurisdictions,
        };

        let mut builder = PolicyBuilder::new(self.agent_pattern)
            .allow(self.allow)
            .deny(self.deny)
            .enabled(!self.disabled);
        if let Some(id) = self.id {
            builder = builder.id(id);
        }
        if let Some(name) = self.name {
            builder = builder.name(name);
        }
        if !self.permissions.is_empty() {
            builder = builder.permissions(self.permissions);
        }
        if let Some(priority) = self.priority {
            builder = builder.priority(priority);
        }
        if !conditions.is_empty() {
            builder = builder.conditions(conditions);
        }
        Ok(builder.build(chrono::Utc::now())?)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PolicyRow<'a> {
    id: &'a PolicyId,
    name: &'a str,
    agent_pattern: &'a str,
    priority: i32,
    enabled: bool,
    allow: &'a [String],
    deny: &'a [String],
    permissions: &'a [PermissionLevel],
}

impl<'a> From<&'a ConsentPolicy> for PolicyRow<'a> {
    fn from(policy: &'a ConsentPolicy) -> Self {
        Self {
            id: &policy.id,
            name: policy.display_name(),
            agent_pattern: &policy.agent_pattern,
            priority: policy.priority,
            enabled: policy.enabled,
            allow: &policy.allow,
            deny: &policy.deny,
            permissions: &policy.permissions,
        }
    }
}

pub async fn execute(
    command: PolicyCommands,
    service: &Service,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match command {
        PolicyCommands::Add { user, args } => {
            let policy = args.into_policy()?;
            let id = policy.id.clone();
            let profile = service.add_policy(&user, policy).await?;
            match profile.policy(&id) {
                Some(policy) => output::print(policy, format),
                None => anyhow::bail!("policy {id} missing after save"),
            }
        }
        PolicyCommands::Remove { user, policy_id } => {
            let removed = service.remove_policy(&user, &policy_id).await?;
            output::print(&removed, format)
        }
        PolicyCommands::Enable { user, policy_id } => {
            toggle(service, &user, &policy_id, true, format).await
        }
        PolicyCommands::Disable { user, policy_id } => {
            toggle(service, &user, &policy_id, false, format).await
        }
        PolicyCommands::List { user } => {
            let profile = service.profile(&user).await?;
            let mut policies: Vec<_> = profile.access_policies.iter().collect();
            policies.sort_by_key(|p| p.priority);
            let rows: Vec<PolicyRow<'_>> = policies.into_iter().map(PolicyRow::from).collect();
            output::print(&rows, format)
        }
    }
}

async fn toggle(
    service: &Service,
    user: &Did,
    id: &PolicyId,
    enabled: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let profile = service.set_policy_enabled(user, id, enabled).await?;
    match profile.policy(id) {
        Some(policy) => output::print(&PolicyRow::from(policy), format),
        None => anyhow::bail!("policy {id} missing after save"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: PolicyArgs,
    }

    fn parse(argv: &[&str]) -> PolicyArgs {
        let mut full = vec!["a2p"];
        full.extend_from_slice(argv);
        Harness::try_parse_from(full).unwrap().args
    }

    #[test]
    fn flags_build_a_policy() {
        let policy = parse(&[
            "-a",
            "did:a2p:agent:local:work-*",
            "--id",
            "p1",
            "--allow",
            "a2p:professional.*",
            "--deny",
            "a2p:health.*",
            "-p",
            "propose",
            "--priority",
            "10",
            "--min-trust-score",
            "0.7",
        ])
        .into_policy()
        .unwrap();

        assert_eq!(policy.id, PolicyId::new("p1"));
        assert_eq!(policy.priority, 10);
        assert_eq!(policy.permissions, vec![PermissionLevel::Propose]);
        assert!(policy.enabled);
        let conditions = policy.conditions.unwrap();
        assert_eq!(conditions.min_trust_score, Some(0.7));
        assert_eq!(conditions.require_verified_operator, None);
    }

    #[test]
    fn no_condition_flags_leave_conditions_unset() {
        let policy = parse(&["--allow", "a2p:identity.name", "--disabled"])
            .into_policy()
            .unwrap();
        assert!(policy.conditions.is_none());
        assert!(!policy.enabled);
        assert_eq!(policy.agent_pattern, "*");
        assert_eq!(policy.permissions, vec![PermissionLevel::ReadScoped]);
    }

    #[test]
    fn out_of_range_trust_score_is_rejected() {
        assert!(parse(&["--min-trust-score", "1.5"]).into_policy().is_err());
    }

    #[test]
    fn policy_file_is_read_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.json");
        let now = chrono::Utc::now();
        let written = PolicyBuilder::new("*")
            .id("from-file")
            .allow(["a2p:preferences.*"])
            .build(now)
            .unwrap();
        std::fs::write(&path, serde_json::to_string(&written).unwrap()).unwrap();

        let read = parse(&["--file", path.to_str().unwrap()]).into_policy().unwrap();
        assert_eq!(read, written);
    }
}
