// Resource graph construction
//
// Resources are pushed in dependency order: network, shared storage, the
// authorizer, the sync function and its policy, then the trigger chain.

use crate::environment::{
    authorizer_environment, sync_environment, Environment, CONFIG_MOUNT_PATH,
    FUNCTION_MEMORY_MIB,
};
use crate::permissions::statements_for;
use crate::resource::{
    DeadLetterTarget, DelayedSend, LogicalId, RemovalPolicy, Resource, ResourceKind,
};
use crate::strategy::{NetworkStrategy, Strategies, TriggerStrategy, SCHEDULE_PERIOD};
use authorizer_stack_config::{DeployableUnit, DeploymentConfiguration};
use tracing::debug;

pub const CONFIG_ACCESS_POINT_PATH: &str = "/ceauthconfig";
pub const POSIX_OWNER_ID: u32 = 1001;
pub const CONFIG_ACL_PERMISSIONS: &str = "750";
pub const FUNCTION_RUNTIME: &str = "provided.al2023";
pub const FUNCTION_HANDLER: &str = "bootstrap";
pub const FUNCTION_TIMEOUT_SECS: u64 = 10;
pub const SYNC_RESERVED_CONCURRENCY: u32 = 1;
pub const DEAD_LETTER_RETENTION_SECS: u64 = 60;
pub const TRIGGER_QUEUE_VISIBILITY_SECS: u64 = 30;
pub const TRIGGER_MESSAGE_BODY: &str = "Sync";

/// Logical ids of the resources a plan may contain.
pub mod ids {
    pub const NETWORK: &str = "VPC";
    pub const FILE_SYSTEM: &str = "AuthorizerConfigurationFileSystem";
    pub const AUTHORIZER_ACCESS_POINT: &str = "AuthorizerEFSAccessPoint";
    pub const AUTHORIZER_CODE: &str = "AuthorizerCode";
    pub const AUTHORIZER_FUNCTION: &str = "AuthorizerLambda";
    pub const SYNC_ACCESS_POINT: &str = "SyncEFSAccessPoint";
    pub const SYNC_CODE: &str = "SyncCode";
    pub const SYNC_FUNCTION: &str = "SyncLambda";
    pub const SYNC_POLICY: &str = "SyncLambdaPolicy";
    pub const DEAD_LETTER_QUEUE: &str = "DeadLetterQueue";
    pub const TRIGGER_QUEUE: &str = "SQSQueue";
    pub const SYNC_EVENT_SOURCE: &str = "SyncLambdaSqsEventSource";
    pub const SYNC_LOOPER: &str = "SyncLooper";
    pub const RUN_STEP_FUNCTION: &str = "RunStepFunction";
    pub const RUN_SYNC_LAMBDA: &str = "RunSyncLambda";
}

pub(crate) fn build_resources(
    config: &DeploymentConfiguration,
    strategies: &Strategies,
) -> Vec<Resource> {
    let mut resources = Vec::new();

    push_network(&mut resources, &strategies.network);
    resources.push(Resource::new(
        ids::FILE_SYSTEM,
        ResourceKind::FileSystem {
            network: LogicalId::new(ids::NETWORK),
            removal_policy: RemovalPolicy::Destroy,
        },
    ));

    let authorizer = LogicalId::new(ids::AUTHORIZER_FUNCTION);
    push_unit(
        &mut resources,
        strategies,
        DeployableUnit::Authorizer,
        UnitIds {
            access_point: ids::AUTHORIZER_ACCESS_POINT,
            code: ids::AUTHORIZER_CODE,
            function: ids::AUTHORIZER_FUNCTION,
        },
        authorizer_environment(config),
        None,
    );
    push_unit(
        &mut resources,
        strategies,
        DeployableUnit::Sync,
        UnitIds {
            access_point: ids::SYNC_ACCESS_POINT,
            code: ids::SYNC_CODE,
            function: ids::SYNC_FUNCTION,
        },
        sync_environment(config, &authorizer),
        Some(SYNC_RESERVED_CONCURRENCY),
    );

    resources.push(Resource::new(
        ids::SYNC_POLICY,
        ResourceKind::Policy {
            role_of: LogicalId::new(ids::SYNC_FUNCTION),
            statements: statements_for(strategies.binding),
        },
    ));

    push_trigger(&mut resources, &strategies.trigger);

    debug!(count = resources.len(), "resource graph assembled");
    resources
}

fn push_network(resources: &mut Vec<Resource>, network: &NetworkStrategy) {
    let kind = match network {
        NetworkStrategy::Existing { vpc_id } => ResourceKind::NetworkLookup {
            vpc_id: vpc_id.clone(),
        },
        NetworkStrategy::Isolated => ResourceKind::Network,
    };
    resources.push(Resource::new(ids::NETWORK, kind));
}

struct UnitIds {
    access_point: &'static str,
    code: &'static str,
    function: &'static str,
}

fn push_unit(
    resources: &mut Vec<Resource>,
    strategies: &Strategies,
    unit: DeployableUnit,
    unit_ids: UnitIds,
    environment: Environment,
    reserved_concurrency: Option<u32>,
) {
    resources.push(Resource::new(
        unit_ids.access_point,
        ResourceKind::AccessPoint {
            file_system: LogicalId::new(ids::FILE_SYSTEM),
            path: CONFIG_ACCESS_POINT_PATH,
            owner_uid: POSIX_OWNER_ID,
            owner_gid: POSIX_OWNER_ID,
            permissions: CONFIG_ACL_PERMISSIONS,
            removal_policy: RemovalPolicy::Destroy,
        },
    ));
    resources.push(Resource::new(
        unit_ids.code,
        ResourceKind::CodePackage {
            unit,
            source: strategies.packaging(unit).clone(),
        },
    ));
    resources.push(Resource::new(
        unit_ids.function,
        ResourceKind::Function {
            unit,
            code: LogicalId::new(unit_ids.code),
            network: LogicalId::new(ids::NETWORK),
            access_point: LogicalId::new(unit_ids.access_point),
            mount_path: CONFIG_MOUNT_PATH,
            runtime: FUNCTION_RUNTIME,
            handler: FUNCTION_HANDLER,
            memory_mib: FUNCTION_MEMORY_MIB,
            timeout_secs: FUNCTION_TIMEOUT_SECS,
            reserved_concurrency,
            environment,
        },
    ));
}

fn push_trigger(resources: &mut Vec<Resource>, trigger: &TriggerStrategy) {
    let rate_minutes = SCHEDULE_PERIOD.as_secs() / 60;

    let offsets_secs = match trigger {
        TriggerStrategy::Direct => {
            resources.push(Resource::new(
                ids::RUN_SYNC_LAMBDA,
                ResourceKind::ScheduleRule {
                    rate_minutes,
                    target: LogicalId::new(ids::SYNC_FUNCTION),
                    removal_policy: RemovalPolicy::Destroy,
                },
            ));
            return;
        }
        TriggerStrategy::FanOut { offsets_secs, .. } => offsets_secs,
    };

    let queue = LogicalId::new(ids::TRIGGER_QUEUE);
    resources.push(Resource::new(
        ids::DEAD_LETTER_QUEUE,
        ResourceKind::Queue {
            retention_secs: Some(DEAD_LETTER_RETENTION_SECS),
            visibility_timeout_secs: None,
            dead_letter: None,
            removal_policy: RemovalPolicy::Destroy,
        },
    ));
    resources.push(Resource::new(
        ids::TRIGGER_QUEUE,
        ResourceKind::Queue {
            retention_secs: None,
            visibility_timeout_secs: Some(TRIGGER_QUEUE_VISIBILITY_SECS),
            dead_letter: Some(DeadLetterTarget {
                queue: LogicalId::new(ids::DEAD_LETTER_QUEUE),
                max_receive_count: 1,
            }),
            removal_policy: RemovalPolicy::Destroy,
        },
    ));
    // One message at a time, so the sync function never runs concurrently
    resources.push(Resource::new(
        ids::SYNC_EVENT_SOURCE,
        ResourceKind::EventSource {
            queue: queue.clone(),
            function: LogicalId::new(ids::SYNC_FUNCTION),
            batch_size: 1,
        },
    ));

    let steps = offsets_secs
        .iter()
        .map(|&delay_secs| DelayedSend {
            name: format!("Send Delayed SQS Trigger Message - {} seconds", delay_secs),
            queue: queue.clone(),
            delay_secs,
            message_body: TRIGGER_MESSAGE_BODY,
        })
        .collect();
    resources.push(Resource::new(
        ids::SYNC_LOOPER,
        ResourceKind::StateMachine {
            steps,
            removal_policy: RemovalPolicy::Destroy,
        },
    ));
    resources.push(Resource::new(
        ids::RUN_STEP_FUNCTION,
        ResourceKind::ScheduleRule {
            rate_minutes,
            target: LogicalId::new(ids::SYNC_LOOPER),
            removal_policy: RemovalPolicy::Destroy,
        },
    ));
}
