use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Capability rank attached to a granted policy.
///
/// Variants are declared in rank order; the derived `Ord` is the protocol's
/// total order and must not be rearranged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionLevel {
    /// Sentinel for "no access".
    None,
    ReadPublic,
    ReadScoped,
    ReadFull,
    Propose,
    Write,
}

impl PermissionLevel {
    pub const ALL: [PermissionLevel; 6] = [
        PermissionLevel::None,
        PermissionLevel::ReadPublic,
        PermissionLevel::ReadScoped,
        PermissionLevel::ReadFull,
        PermissionLevel::Propose,
        PermissionLevel::Write,
    ];

    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn satisfies(self, required: PermissionLevel) -> bool {
        self.rank() >= required.rank()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionLevel::None => "none",
            PermissionLevel::ReadPublic => "read_public",
            PermissionLevel::ReadScoped => "read_scoped",
            PermissionLevel::ReadFull => "read_full",
            PermissionLevel::Propose => "propose",
            PermissionLevel::Write => "write",
        }
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown permission level spelling.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown permission level: {0}")]
pub struct ParsePermissionError(pub String);

impl FromStr for PermissionLevel {
    type Err = ParsePermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PermissionLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| ParsePermissionError(s.to_string()))
    }
}

/// True when any held level ranks at or above `required`.
pub fn has_permission(held: &[PermissionLevel], required: PermissionLevel) -> bool {
    held.iter().any(|level| level.satisfies(required))
}

/// Highest held level, or [`PermissionLevel::None`] when nothing is held.
pub fn effective_level(held: &[PermissionLevel]) -> PermissionLevel {
    held.iter().copied().max().unwrap_or(PermissionLevel::None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_follow_declared_order() {
        let ranks: Vec<u8> = PermissionLevel::ALL.iter().map(|l| l.rank()).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3, 4, 5]);
        assert!(PermissionLevel::Write > PermissionLevel::Propose);
    }

    #[test]
    fn has_permission_uses_rank_not_membership() {
        let held = [PermissionLevel::Propose];
        assert!(has_permission(&held, PermissionLevel::ReadScoped));
        assert!(has_permission(&held, PermissionLevel::Propose));
        assert!(!has_permission(&held, PermissionLevel::Write));
        assert!(!has_permission(&[], PermissionLevel::ReadPublic));
    }

    #[test]
    fn effective_level_defaults_to_none() {
        assert_eq!(effective_level(&[]), PermissionLevel::None);
        assert_eq!(
            effective_level(&[PermissionLevel::ReadScoped, PermissionLevel::ReadPublic]),
            PermissionLevel::ReadScoped
        );
    }

    #[test]
    fn wire_spelling_is_snake_case() {
        let json = serde_json::to_string(&PermissionLevel::ReadScoped).unwrap();
        assert_eq!(json, "\"read_scoped\"");
        assert_eq!(
            "read_full".parse::<PermissionLevel>(),
            Ok(PermissionLevel::ReadFull)
        );
        assert!("admin".parse::<PermissionLevel>().is_err());
    }
}
