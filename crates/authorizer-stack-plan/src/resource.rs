// Resource descriptors
//
// A plan is a list of these in dependency order. References between resources
// are always by `LogicalId`, never by value.

use crate::environment::Environment;
use crate::permissions::PolicyStatement;
use crate::strategy::PackagingStrategy;
use authorizer_stack_config::DeployableUnit;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LogicalId(String);

impl LogicalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for LogicalId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// What happens to a resource when the stack is deleted. Nothing in this
/// stack holds data worth keeping, so everything goes with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalPolicy {
    Destroy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadLetterTarget {
    pub queue: LogicalId,
    pub max_receive_count: u32,
}

/// One step of the delay chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DelayedSend {
    pub name: String,
    pub queue: LogicalId,
    pub delay_secs: u64,
    pub message_body: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResourceKind {
    /// New network dedicated to the stack
    Network,
    /// Existing network referenced by id
    #[serde(rename_all = "camelCase")]
    NetworkLookup { vpc_id: String },
    #[serde(rename_all = "camelCase")]
    FileSystem {
        network: LogicalId,
        removal_policy: RemovalPolicy,
    },
    #[serde(rename_all = "camelCase")]
    AccessPoint {
        file_system: LogicalId,
        path: &'static str,
        owner_uid: u32,
        owner_gid: u32,
        permissions: &'static str,
        removal_policy: RemovalPolicy,
    },
    CodePackage {
        unit: DeployableUnit,
        source: PackagingStrategy,
    },
    #[serde(rename_all = "camelCase")]
    Function {
        unit: DeployableUnit,
        code: LogicalId,
        network: LogicalId,
        access_point: LogicalId,
        mount_path: &'static str,
        runtime: &'static str,
        handler: &'static str,
        memory_mib: u32,
        timeout_secs: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        reserved_concurrency: Option<u32>,
        environment: Environment,
    },
    /// Inline policy attached to a function's execution role
    #[serde(rename_all = "camelCase")]
    Policy {
        role_of: LogicalId,
        statements: Vec<PolicyStatement>,
    },
    #[serde(rename_all = "camelCase")]
    Queue {
        #[serde(skip_serializing_if = "Option::is_none")]
        retention_secs: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        visibility_timeout_secs: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        dead_letter: Option<DeadLetterTarget>,
        removal_policy: RemovalPolicy,
    },
    #[serde(rename_all = "camelCase")]
    EventSource {
        queue: LogicalId,
        function: LogicalId,
        batch_size: u32,
    },
    #[serde(rename_all = "camelCase")]
    StateMachine {
        steps: Vec<DelayedSend>,
        removal_policy: RemovalPolicy,
    },
    #[serde(rename_all = "camelCase")]
    ScheduleRule {
        rate_minutes: u64,
        target: LogicalId,
        removal_policy: RemovalPolicy,
    },
}

impl ResourceKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::NetworkLookup { .. } => "network_lookup",
            Self::FileSystem { .. } => "file_system",
            Self::AccessPoint { .. } => "access_point",
            Self::CodePackage { .. } => "code_package",
            Self::Function { .. } => "function",
            Self::Policy { .. } => "policy",
            Self::Queue { .. } => "queue",
            Self::EventSource { .. } => "event_source",
            Self::StateMachine { .. } => "state_machine",
            Self::ScheduleRule { .. } => "schedule_rule",
        }
    }

    /// Logical ids this resource points at, in declaration order.
    pub fn references(&self) -> Vec<LogicalId> {
        match self {
            Self::Network | Self::NetworkLookup { .. } | Self::CodePackage { .. } => Vec::new(),
            Self::FileSystem { network, .. } => vec![network.clone()],
            Self::AccessPoint { file_system, .. } => vec![file_system.clone()],
            Self::Function {
                code,
                network,
                access_point,
                environment,
                ..
            } => {
                let mut refs = vec![code.clone(), network.clone(), access_point.clone()];
                refs.extend(environment.references().cloned());
                refs
            }
            Self::Policy { role_of, .. } => vec![role_of.clone()],
            Self::Queue { dead_letter, .. } => dead_letter
                .iter()
                .map(|target| target.queue.clone())
                .collect(),
            Self::EventSource {
                queue, function, ..
            } => vec![queue.clone(), function.clone()],
            Self::StateMachine { steps, .. } => {
                let mut refs: Vec<LogicalId> = steps.iter().map(|s| s.queue.clone()).collect();
                refs.dedup();
                refs
            }
            Self::ScheduleRule { target, .. } => vec![target.clone()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: LogicalId,
    #[serde(flatten)]
    pub kind: ResourceKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<LogicalId>,
}

impl Resource {
    pub fn new(id: impl Into<String>, kind: ResourceKind) -> Self {
        let depends_on = kind.references();
        Self {
            id: LogicalId::new(id),
            kind,
            depends_on,
        }
    }
}
