//! Error types for topology planning

use authorizer_stack_config::DeployableUnit;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// The planning step a [`PlanError`] originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubDecision {
    Packaging,
    Trigger,
    /// Consistency checks on the assembled resource graph
    Graph,
}

impl SubDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Packaging => "packaging",
            Self::Trigger => "trigger",
            Self::Graph => "graph",
        }
    }
}

impl fmt::Display for SubDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while assembling a resource plan.
///
/// None of these are reachable for a configuration produced by
/// `authorizer_stack_config::resolve`; they guard against hand-built ones.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    /// A remote package source without a release version
    #[error(
        "[packaging] the {unit} package is fetched from the artifact bucket \
         but no version is set"
    )]
    MissingVersion { unit: DeployableUnit },

    /// The reload interval leaves no room for a single send in the delay chain
    #[error(
        "[trigger] reload interval {interval:?} is shorter than one second; \
         the delay chain would be empty"
    )]
    EmptyDelayChain { interval: Duration },

    #[error("[graph] logical id '{id}' is declared more than once")]
    DuplicateId { id: String },

    #[error("[graph] '{from}' references '{to}', which is not declared before it")]
    DanglingReference { from: String, to: String },

    #[error("[graph] expected exactly one schedule rule, found {count}")]
    ScheduleCount { count: usize },
}

impl PlanError {
    pub fn sub_decision(&self) -> SubDecision {
        match self {
            Self::MissingVersion { .. } => SubDecision::Packaging,
            Self::EmptyDelayChain { .. } => SubDecision::Trigger,
            Self::DuplicateId { .. }
            | Self::DanglingReference { .. }
            | Self::ScheduleCount { .. } => SubDecision::Graph,
        }
    }
}
