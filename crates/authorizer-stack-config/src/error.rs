//! Error types for configuration resolution

use crate::DeployableUnit;
use std::time::Duration;
use thiserror::Error;

/// Why a single field was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Reason {
    #[error("is required")]
    Required,

    #[error("could not parse '{input}': {detail}")]
    Unparseable { input: String, detail: String },

    #[error("'{value}' is not a semantic version (expected MAJOR.MINOR.PATCH[-PRE][+BUILD])")]
    NotSemver { value: String },

    #[error("'{value}' must be one of: {allowed}")]
    NotOneOf { value: String, allowed: &'static str },

    #[error("'{value}' is outside the allowed range [{min:?}, {max:?}]")]
    OutOfRange {
        value: String,
        min: Duration,
        max: Duration,
    },

    #[error("'{value}' is not an absolute http(s) URL: {detail}")]
    MalformedUrl { value: String, detail: String },

    #[error("is required because the {unit} package is fetched from the artifact bucket")]
    RequiredForRemoteSource { unit: DeployableUnit },

    #[error("'{value}' is not a valid bucket name: {detail}")]
    InvalidBucketName { value: String, detail: String },
}

impl Reason {
    /// Stable short code for programmatic handling
    pub fn code(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Unparseable { .. } => "unparseable",
            Self::NotSemver { .. } => "semver",
            Self::NotOneOf { .. } => "oneof",
            Self::OutOfRange { .. } => "range",
            Self::MalformedUrl { .. } => "url",
            Self::RequiredForRemoteSource { .. } => "required_for_remote",
            Self::InvalidBucketName { .. } => "bucket_name",
        }
    }
}

/// One rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} {reason}")]
pub struct Violation {
    pub field: &'static str,
    pub reason: Reason,
}

impl Violation {
    pub fn new(field: &'static str, reason: Reason) -> Self {
        Self { field, reason }
    }
}

/// Every violation found while resolving stack props. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid stack props: {}", join_violations(.violations))]
pub struct ConfigError {
    violations: Vec<Violation>,
}

impl ConfigError {
    pub(crate) fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn first(&self) -> Option<&Violation> {
        self.violations.first()
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.violations.iter().map(|v| v.field)
    }

    /// Whether `field` is among the rejected fields
    pub fn names(&self, field: &str) -> bool {
        self.fields().any(|f| f == field)
    }

    pub fn reason_for(&self, field: &str) -> Option<&Reason> {
        self.violations
            .iter()
            .find(|v| v.field == field)
            .map(|v| &v.reason)
    }
}

impl From<Violation> for ConfigError {
    fn from(violation: Violation) -> Self {
        Self::new(vec![violation])
    }
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_lists_every_field() {
        let err = ConfigError::new(vec![
            Violation::new("clientID", Reason::Required),
            Violation::new(
                "loggingLevel",
                Reason::NotOneOf {
                    value: "loud".into(),
                    allowed: "debug info warn error",
                },
            ),
        ]);

        let message = err.to_string();
        assert!(message.starts_with("invalid stack props: "));
        assert!(message.contains("clientID is required"));
        assert!(message.contains("loggingLevel 'loud' must be one of: debug info warn error"));
        assert!(err.names("clientID"));
        assert!(!err.names("issuerURL"));
        assert_eq!(err.first().map(|v| v.field), Some("clientID"));
    }

    #[test]
    fn test_reason_codes() {
        assert_eq!(Reason::Required.code(), "required");
        let unparseable = Reason::Unparseable {
            input: "soon".into(),
            detail: "missing unit".into(),
        };
        assert_eq!(unparseable.code(), "unparseable");
        assert_eq!(
            Reason::RequiredForRemoteSource {
                unit: DeployableUnit::Sync
            }
            .to_string(),
            "is required because the sync package is fetched from the artifact bucket"
        );
    }
}
