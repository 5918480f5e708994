//! Property-based tests for strategy selection and graph consistency.

use authorizer_stack_config::{SecretString, StackProps};
use authorizer_stack_plan::{plan, BindingStrategy, TriggerStrategy};
use proptest::prelude::*;

fn semver_strategy() -> impl Strategy<Value = String> {
    (0u32..20, 0u32..20, 0u32..20).prop_map(|(major, minor, patch)| {
        format!("{}.{}.{}", major, minor, patch)
    })
}

/// Valid props with every optional field varied; the reload interval is
/// supplied by the caller.
fn props_strategy(
    reload_interval: impl Strategy<Value = String>,
) -> impl Strategy<Value = StackProps> {
    (
        reload_interval,
        any::<bool>(),
        proptest::option::of("vpc-[0-9a-f]{8}"),
        proptest::option::of("[a-z]{1,8}\\.zip"),
        proptest::option::of("[a-z]{1,8}\\.zip"),
        proptest::option::of(semver_strategy()),
        proptest::option::of(prop_oneof![Just("us-east-1"), Just("eu-west-1")]),
        "[A-Za-z0-9]{8,16}",
    )
        .prop_map(
            |(reload, manual, vpc, authorizer_zip, sync_zip, version, region, secret)| StackProps {
                client_id: Some("client".to_string()),
                client_secret: Some(SecretString::from(format!("s3cr3t-{}", secret))),
                issuer_url: Some("https://issuer.example.com/tenant/server".to_string()),
                reload_interval: Some(reload),
                manually_create_authorizer: Some(manual),
                vpc_id: vpc,
                authorizer_zip,
                sync_zip,
                version,
                region: region.map(str::to_string),
                ..Default::default()
            },
        )
}

fn sub_minute() -> impl Strategy<Value = String> {
    (1_000u64..60_000).prop_map(|ms| format!("{}ms", ms))
}

fn full_minute() -> impl Strategy<Value = String> {
    prop_oneof![Just("60s".to_string()), Just("1m".to_string()), Just("60000ms".to_string())]
}

proptest! {
    #[test]
    fn full_minute_interval_uses_direct_trigger(props in props_strategy(full_minute())) {
        let plan = plan(&props.resolve().unwrap()).unwrap();

        prop_assert_eq!(&plan.strategies().trigger, &TriggerStrategy::Direct);
        prop_assert_eq!(plan.of_type("queue").count(), 0);
        prop_assert_eq!(plan.of_type("state_machine").count(), 0);
        prop_assert_eq!(plan.of_type("event_source").count(), 0);
        prop_assert!(plan.delay_chain().is_empty());
    }

    #[test]
    fn sub_minute_interval_chains_floor_sends(props in props_strategy(sub_minute())) {
        let config = props.resolve().unwrap();
        let interval_secs = config.reload_interval.as_secs();
        let plan = plan(&config).unwrap();

        let chain = plan.delay_chain();
        prop_assert_eq!(chain.len() as u64, 60 / interval_secs);
        for (i, step) in chain.iter().enumerate() {
            prop_assert_eq!(step.delay_secs, i as u64 * interval_secs);
            prop_assert!(step.delay_secs < 60);
        }
        prop_assert!(chain.windows(2).all(|pair| pair[0].delay_secs < pair[1].delay_secs));
        prop_assert_eq!(plan.of_type("queue").count(), 2);
    }

    #[test]
    fn manual_binding_grants_strict_subset(props in props_strategy(sub_minute())) {
        let mut manual = props.clone();
        manual.manually_create_authorizer = Some(true);
        let mut auto = props;
        auto.manually_create_authorizer = Some(false);

        let manual_plan = plan(&manual.resolve().unwrap()).unwrap();
        let auto_plan = plan(&auto.resolve().unwrap()).unwrap();
        prop_assert_eq!(manual_plan.strategies().binding, BindingStrategy::Manual);

        let manual_grants = manual_plan.permission_grants();
        let auto_grants = auto_plan.permission_grants();
        prop_assert!(manual_grants.is_subset(&auto_grants));
        prop_assert!(manual_grants.len() < auto_grants.len());
        let binding_actions = ["lambda:AddPermission", "apigateway:PATCH", "apigateway:POST"];
        for (action, _) in &manual_grants {
            prop_assert!(!binding_actions.contains(action));
        }
    }

    #[test]
    fn plan_is_consistent_and_never_leaks_the_secret(props in props_strategy(sub_minute())) {
        let secret = props.client_secret.as_ref().unwrap().expose_secret().to_string();
        let plan = plan(&props.resolve().unwrap()).unwrap();

        prop_assert!(plan.verify().is_ok());
        prop_assert_eq!(plan.of_type("schedule_rule").count(), 1);

        let json = plan.to_json_pretty().unwrap();
        prop_assert!(!json.contains(&secret));
        let debug = format!("{:?}", plan);
        prop_assert!(!debug.contains(&secret));
    }

    #[test]
    fn network_follows_vpc_id(props in props_strategy(sub_minute())) {
        let has_vpc = props.vpc_id.is_some();
        let plan = plan(&props.resolve().unwrap()).unwrap();

        prop_assert_eq!(plan.creates_network(), !has_vpc);
        prop_assert_eq!(plan.of_type("network_lookup").count(), usize::from(has_vpc));
    }
}
