use serde::{Deserialize, Serialize};
use std::fmt;

/// Decentralized identifier naming a user, agent or operator.
///
/// The core treats it as an opaque string; proving control of a Did is the
/// transport layer's job.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Did(pub String);

impl Did {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Did {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Did {
    fn from(value: String) -> Self {
        Self(value)
    }
}

macro_rules! generated_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Fresh random identifier carrying the type prefix.
            pub fn generate() -> Self {
                Self(format!(concat!($prefix, "_{}"), uuid::Uuid::new_v4().simple()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

generated_id!(
    /// Identifier of a consent policy within one profile.
    PolicyId,
    "policy"
);
generated_id!(
    /// Identifier of a memory proposal.
    ProposalId,
    "prop"
);
generated_id!(
    /// Identifier of a consent receipt.
    ReceiptId,
    "rcpt"
);
generated_id!(
    /// Identifier of a memory entry in a profile.
    MemoryId,
    "mem"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_carry_prefix_and_are_unique() {
        let a = ProposalId::generate();
        let b = ProposalId::generate();
        assert!(a.as_str().starts_with("prop_"));
        assert_ne!(a, b);
        assert!(ReceiptId::generate().as_str().starts_with("rcpt_"));
        assert!(MemoryId::generate().as_str().starts_with("mem_"));
    }

    #[test]
    fn did_serializes_as_plain_string() {
        let did = Did::new("did:a2p:user:alice");
        let json = serde_json::to_string(&did).unwrap();
        assert_eq!(json, "\"did:a2p:user:alice\"");
    }
}
