use regex::Regex;
use std::{fmt, str::FromStr, sync::LazyLock};

#[allow(clippy::expect_used)]
static CVE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^CVE-\d{4}-\d{4,}$").expect("valid regex"));

/// A validated CVE identifier, e.g. `CVE-2024-1234`.
///
/// Parsing is strict: the literal `CVE` prefix, a four digit year and a
/// sequence number of at least four digits, all upper case. Callers accepting
/// user input are expected to upper-case the candidate before parsing.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CveId(String);

impl CveId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CveId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if CVE_ID.is_match(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(IdError::InvalidCveId(s.to_string()))
        }
    }
}

impl fmt::Display for CveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CveId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IdError {
    #[error("malformed CVE identifier: {0}")]
    InvalidCveId(String),
}
