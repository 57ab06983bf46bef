use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The CVSS v3 qualitative severity tier.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Severity {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl From<f64> for Severity {
    fn from(score: f64) -> Self {
        if score <= 0.0 {
            Self::None
        } else if score < 4.0 {
            Self::Low
        } else if score < 7.0 {
            Self::Medium
        } else if score < 9.0 {
            Self::High
        } else {
            Self::Critical
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, Severity::None)]
    #[case(0.1, Severity::Low)]
    #[case(3.9, Severity::Low)]
    #[case(4.0, Severity::Medium)]
    #[case(6.9, Severity::Medium)]
    #[case(7.0, Severity::High)]
    #[case(8.9, Severity::High)]
    #[case(9.0, Severity::Critical)]
    #[case(10.0, Severity::Critical)]
    fn tier_from_score(#[case] score: f64, #[case] expected: Severity) {
        assert_eq!(Severity::from(score), expected);
    }

    #[rstest]
    #[case("CRITICAL", Severity::Critical)]
    #[case("High", Severity::High)]
    #[case("medium", Severity::Medium)]
    fn tier_from_str_is_case_insensitive(#[case] tier: &str, #[case] expected: Severity) {
        assert_eq!(tier.parse::<Severity>().unwrap(), expected);
    }

    #[test]
    fn unknown_tier_is_an_error() {
        assert!("SEVERE".parse::<Severity>().is_err());
    }

    #[test]
    fn renders_lowercase() {
        assert_eq!(Severity::Critical.to_string(), "critical");
    }
}
