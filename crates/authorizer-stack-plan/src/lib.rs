// authorizer-stack-plan - Topology planner for the authorizer stack
//
// Derives a `ResourcePlan` from a resolved `DeploymentConfiguration`:
// - picks one variant per sub-decision (packaging, trigger, binding, network)
// - lays out the resource graph for those choices in dependency order
// - checks the graph before handing it out
//
// Planning is pure. Rendering the plan into real infrastructure is left to an
// external tool that consumes the JSON produced by `ResourcePlan::to_json_pretty`.

use authorizer_stack_config::DeploymentConfiguration;
use tracing::info;

mod environment;
mod error;
mod permissions;
mod plan;
mod planner;
mod resource;
mod strategy;

pub use environment::{
    EnvValue, Environment, CONFIG_MOUNT_PATH, FUNCTION_MEMORY_MIB, MAX_HEAP_MIB,
};
pub use error::{PlanError, SubDecision};
pub use permissions::{
    auto_bind_statements, baseline_statements, statements_for, PolicyStatement,
};
pub use plan::ResourcePlan;
pub use planner::{
    ids, CONFIG_ACCESS_POINT_PATH, FUNCTION_RUNTIME, SYNC_RESERVED_CONCURRENCY,
};
pub use resource::{
    DeadLetterTarget, DelayedSend, LogicalId, RemovalPolicy, Resource, ResourceKind,
};
pub use strategy::{
    BindingStrategy, NetworkStrategy, PackagingStrategy, Strategies, TriggerStrategy,
    REGION_TOKEN, SCHEDULE_PERIOD,
};

/// Plan the resources for `config`.
///
/// Either every sub-decision resolves and the resulting graph is consistent,
/// or nothing is returned.
pub fn plan(config: &DeploymentConfiguration) -> Result<ResourcePlan, PlanError> {
    let strategies = Strategies::select(config)?;
    let resources = planner::build_resources(config, &strategies);

    let plan = ResourcePlan::new(
        config.stack_name.clone(),
        config.environment.clone(),
        strategies,
        resources,
    );
    plan.verify()?;

    info!(
        stack_name = %plan.stack_name(),
        region = plan.environment().region.as_deref().unwrap_or(REGION_TOKEN),
        resources = plan.resources().len(),
        sends_per_minute = plan.strategies().trigger.sends_per_period(),
        auto_bind = plan.strategies().binding.is_auto(),
        "resource plan ready"
    );
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use authorizer_stack_config::{SecretString, StackProps};

    fn props() -> StackProps {
        StackProps {
            client_id: Some("a".to_string()),
            client_secret: Some(SecretString::from("b")),
            issuer_url: Some("https://issuer".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_fan_out_graph_order() {
        let plan = plan(&props().resolve().unwrap()).unwrap();
        let ids: Vec<&str> = plan.resources().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "VPC",
                "AuthorizerConfigurationFileSystem",
                "AuthorizerEFSAccessPoint",
                "AuthorizerCode",
                "AuthorizerLambda",
                "SyncEFSAccessPoint",
                "SyncCode",
                "SyncLambda",
                "SyncLambdaPolicy",
                "DeadLetterQueue",
                "SQSQueue",
                "SyncLambdaSqsEventSource",
                "SyncLooper",
                "RunStepFunction",
            ]
        );
    }

    #[test]
    fn test_direct_graph_has_no_queue() {
        let mut props = props();
        props.reload_interval = Some("1m".to_string());
        props.vpc_id = Some("vpc-0abc".to_string());
        props.region = Some("eu-central-1".to_string());

        let plan = plan(&props.resolve().unwrap()).unwrap();
        assert_eq!(plan.environment().region.as_deref(), Some("eu-central-1"));
        assert_eq!(plan.strategies().trigger, TriggerStrategy::Direct);
        assert_eq!(plan.of_type("queue").count(), 0);
        assert_eq!(plan.of_type("state_machine").count(), 0);
        assert_eq!(plan.schedule_target().map(LogicalId::as_str), Some("SyncLambda"));
        assert!(!plan.creates_network());
        assert_eq!(plan.of_type("network_lookup").count(), 1);
    }

    #[test]
    fn test_sync_function_is_serialized() {
        let plan = plan(&props().resolve().unwrap()).unwrap();
        let Some(Resource {
            kind: ResourceKind::Function {
                reserved_concurrency,
                ..
            },
            ..
        }) = plan.function(authorizer_stack_config::DeployableUnit::Sync)
        else {
            panic!("sync function missing");
        };
        assert_eq!(*reserved_concurrency, Some(1));

        let ResourceKind::EventSource { batch_size, .. } =
            &plan.get(ids::SYNC_EVENT_SOURCE).unwrap().kind
        else {
            panic!("event source missing");
        };
        assert_eq!(*batch_size, 1);
    }
}
