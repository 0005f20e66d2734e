use serde::{Deserialize, Serialize};

use crate::matcher::matches_any;

/// Requested scopes split into what may and may not be served.
///
/// Both sides keep the order the scopes were requested in; together they
/// hold every requested scope exactly once per occurrence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeSplit {
    pub allowed: Vec<String>,
    pub denied: Vec<String>,
}

impl ScopeSplit {
    /// Everything denied, as for a request no policy covers.
    pub fn deny_all<S: AsRef<str>>(requested: &[S]) -> Self {
        Self {
            allowed: Vec::new(),
            denied: requested.iter().map(|s| s.as_ref().to_string()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty() && self.denied.is_empty()
    }
}

/// Split `requested` against allow and deny patterns. Deny wins.
pub fn filter<R, A, D>(requested: &[R], allow: &[A], deny: &[D]) -> ScopeSplit
where
    R: AsRef<str>,
    A: AsRef<str>,
    D: AsRef<str>,
{
    let mut split = ScopeSplit::default();
    for scope in requested {
        let scope = scope.as_ref();
        if permits(scope, allow, deny) {
            split.allowed.push(scope.to_string());
        } else {
            split.denied.push(scope.to_string());
        }
    }
    split
}

fn permits<A: AsRef<str>, D: AsRef<str>>(scope: &str, allow: &[A], deny: &[D]) -> bool {
    matches_any(scope, allow) && !matches_any(scope, deny)
}

/// An allow/deny pattern pair held together for repeated checks.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeSet {
    pub allow: Vec<String>,
    pub deny: Vec<String>,
}

impl ScopeSet {
    pub fn new(allow: Vec<String>, deny: Vec<String>) -> Self {
        Self { allow, deny }
    }

    pub fn permits(&self, scope: &str) -> bool {
        permits(scope, &self.allow, &self.deny)
    }

    /// Partition `requested` against this set.
    pub fn split<S: AsRef<str>>(&self, requested: &[S]) -> ScopeSplit {
        filter(requested, &self.allow, &self.deny)
    }
}
