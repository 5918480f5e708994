use crate::error::PlanError;
use crate::planner::ids;
use crate::resource::{DelayedSend, LogicalId, Resource, ResourceKind};
use crate::strategy::Strategies;
use authorizer_stack_config::{DeployableUnit, TargetEnvironment};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

/// The resource graph for one deployment, in dependency order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePlan {
    stack_name: String,
    environment: TargetEnvironment,
    strategies: Strategies,
    resources: Vec<Resource>,
}

impl ResourcePlan {
    pub(crate) fn new(
        stack_name: String,
        environment: TargetEnvironment,
        strategies: Strategies,
        resources: Vec<Resource>,
    ) -> Self {
        Self {
            stack_name,
            environment,
            strategies,
            resources,
        }
    }

    pub fn stack_name(&self) -> &str {
        &self.stack_name
    }

    pub fn environment(&self) -> &TargetEnvironment {
        &self.environment
    }

    pub fn strategies(&self) -> &Strategies {
        &self.strategies
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn get(&self, id: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id == id)
    }

    /// Resources whose kind has the given type name (e.g. `"queue"`).
    pub fn of_type<'a>(&'a self, type_name: &'a str) -> impl Iterator<Item = &'a Resource> + 'a {
        self.resources
            .iter()
            .filter(move |r| r.kind.type_name() == type_name)
    }

    pub fn function(&self, unit: DeployableUnit) -> Option<&Resource> {
        self.resources.iter().find(|r| {
            matches!(&r.kind, ResourceKind::Function { unit: u, .. } if *u == unit)
        })
    }

    /// Steps of the delay chain; empty for the direct trigger.
    pub fn delay_chain(&self) -> &[DelayedSend] {
        self.resources
            .iter()
            .find_map(|r| match &r.kind {
                ResourceKind::StateMachine { steps, .. } => Some(steps.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    /// Every (action, resource) pair granted to the sync function.
    pub fn permission_grants(&self) -> BTreeSet<(&'static str, &'static str)> {
        self.resources
            .iter()
            .filter_map(|r| match &r.kind {
                ResourceKind::Policy { statements, .. } => Some(statements),
                _ => None,
            })
            .flatten()
            .flat_map(|statement| statement.grants().collect::<Vec<_>>())
            .collect()
    }

    /// Check graph consistency: unique ids, references only to resources
    /// declared earlier, exactly one schedule rule.
    pub fn verify(&self) -> Result<(), PlanError> {
        let mut declared: HashSet<&LogicalId> = HashSet::with_capacity(self.resources.len());

        for resource in &self.resources {
            for dependency in &resource.depends_on {
                if !declared.contains(dependency) {
                    return Err(PlanError::DanglingReference {
                        from: resource.id.to_string(),
                        to: dependency.to_string(),
                    });
                }
            }
            if !declared.insert(&resource.id) {
                return Err(PlanError::DuplicateId {
                    id: resource.id.to_string(),
                });
            }
        }

        let count = self.of_type("schedule_rule").count();
        if count != 1 {
            return Err(PlanError::ScheduleCount { count });
        }

        Ok(())
    }

    /// JSON handed to the renderer. Secrets are replaced by redaction markers.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// The id of the resource the schedule rule fires.
    pub fn schedule_target(&self) -> Option<&LogicalId> {
        self.resources.iter().find_map(|r| match &r.kind {
            ResourceKind::ScheduleRule { target, .. } => Some(target),
            _ => None,
        })
    }

    /// Whether the stack creates its own network rather than looking one up.
    pub fn creates_network(&self) -> bool {
        self.get(ids::NETWORK)
            .is_some_and(|r| matches!(r.kind, ResourceKind::Network))
    }
}
