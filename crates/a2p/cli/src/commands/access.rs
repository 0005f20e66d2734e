//! Access evaluation

use a2p_policy::RequesterMetadata;
use a2p_service::AccessRequest;
use a2p_types::{Did, LegalBasis};
use clap::{Args, ValueEnum};

use crate::output::{self, OutputFormat};
use crate::Service;

#[derive(Args)]
pub struct AccessArgs {
    /// User DID
    user: Did,

    /// Requesting agent DID
    #[arg(short, long)]
    agent: Did,

    /// Requested scope (repeatable)
    #[arg(short, long = "scope", required = true)]
    scopes: Vec<String>,

    /// Operator DID behind the agent
    #[arg(long)]
    operator: Option<Did>,

    /// The operator's identity has been verified
    #[arg(long, requires = "operator")]
    verified: bool,

    /// Requester trust score (0.0 - 1.0)
    #[arg(long)]
    trust_score: Option<f64>,

    /// The requester has been audited
    #[arg(long)]
    audited: bool,

    /// Requester jurisdiction code
    #[arg(long)]
    jurisdiction: Option<String>,

    /// Purpose recorded on the receipt
    #[arg(long)]
    purpose: Option<String>,

    /// Legal basis recorded on the receipt
    #[arg(long, value_enum)]
    legal_basis: Option<LegalBasisArg>,
}

#[derive(Clone, Copy, ValueEnum)]
enum LegalBasisArg {
    Consent,
    Contract,
    LegalObligation,
    VitalInterests,
    PublicTask,
    LegitimateInterests,
}

impl From<LegalBasisArg> for LegalBasis {
    fn from(arg: LegalBasisArg) -> Self {
        match arg {
            LegalBasisArg::Consent => LegalBasis::Consent,
            LegalBasisArg::Contract => LegalBasis::Contract,
            LegalBasisArg::LegalObligation => LegalBasis::LegalObligation,
            LegalBasisArg::VitalInterests => LegalBasis::VitalInterests,
            LegalBasisArg::PublicTask => LegalBasis::PublicTask,
            LegalBasisArg::LegitimateInterests => LegalBasis::LegitimateInterests,
        }
    }
}

impl AccessArgs {
    /// Metadata is only attached when at least one requester fact was given.
    pub(crate) fn metadata(&self) -> Option<RequesterMetadata> {
        let mut metadata = RequesterMetadata::new().with_audit(self.audited);
        if let Some(operator) = &self.operator {
            metadata = metadata.with_operator(operator.clone(), self.verified);
        }
        if let Some(score) = self.trust_score {
            metadata = metadata.with_trust_score(score);
        }
        if let Some(jurisdiction) = &self.jurisdiction {
            metadata = metadata.with_jurisdiction(jurisdiction.clone());
        }
        (metadata != RequesterMetadata::default()).then_some(metadata)
    }
}

pub async fn execute(args: AccessArgs, service: &Service, format: OutputFormat) -> anyhow::Result<()> {
    let mut request = AccessRequest::new(args.agent.clone(), args.scopes.clone());
    if let Some(metadata) = args.metadata() {
        request = request.with_metadata(metadata);
    }
    if let Some(purpose) = &args.purpose {
        request = request.with_purpose(purpose.clone());
    }
    request.legal_basis = args.legal_basis.map(LegalBasis::from);

    let outcome = service.evaluate_access(&args.user, request).await?;
    output::print(&outcome, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: AccessArgs,
    }

    fn parse(argv: &[&str]) -> AccessArgs {
        let mut full = vec!["a2p"];
        full.extend_from_slice(argv);
        Harness::try_parse_from(full).unwrap().args
    }

    #[test]
    fn no_requester_flags_means_no_metadata() {
        let args = parse(&["did:a2p:user:alice", "-a", "did:a2p:agent:x", "-s", "a2p:identity.name"]);
        assert!(args.metadata().is_none());
        assert_eq!(args.scopes, vec!["a2p:identity.name".to_string()]);
    }

    #[test]
    fn requester_flags_build_metadata() {
        let args = parse(&[
            "did:a2p:user:alice",
            "--agent",
            "did:a2p:agent:x",
            "--scope",
            "a2p:preferences.*",
            "--operator",
            "did:a2p:org:acme",
            "--verified",
            "--trust-score",
            "0.9",
        ]);
        let metadata = args.metadata().unwrap();
        assert_eq!(metadata.operator_did, Some(Did::new("did:a2p:org:acme")));
        assert!(metadata.operator_verified);
        assert_eq!(metadata.trust_score, Some(0.9));
    }

    #[test]
    fn scope_is_required() {
        assert!(Harness::try_parse_from(["a2p", "did:a2p:user:alice", "-a", "did:a2p:agent:x"]).is_err());
    }
}
