//! Property-based tests for configuration resolution.

use authorizer_stack_config::{resolve, SecretString, StackProps, MAX_RELOAD_INTERVAL};
use proptest::prelude::*;
use std::time::Duration;

fn duration_text() -> impl Strategy<Value = String> {
    prop_oneof![
        (1u64..=60).prop_map(|s| format!("{}s", s)),
        (1_000u64..=60_000).prop_map(|ms| format!("{}ms", ms)),
        (1u64..=59).prop_map(|s| format!("0m{}s", s)),
        Just("1m".to_string()),
    ]
}

fn valid_props() -> impl Strategy<Value = StackProps> {
    (
        duration_text(),
        proptest::option::of(prop_oneof![Just("debug"), Just("info"), Just("warn"), Just("error")]),
        proptest::option::of("[a-z]{1,8}\\.zip"),
        proptest::option::of("[a-z]{1,8}\\.zip"),
        proptest::option::of((0u32..10, 0u32..10, 0u32..10)),
        proptest::option::of("vpc-[0-9a-f]{8}"),
        any::<(bool, bool, bool, bool)>(),
        proptest::option::of("[a-z][a-z0-9-]{2,20}[a-z0-9]"),
    )
        .prop_map(
            |(reload, level, authorizer_zip, sync_zip, version, vpc, flags, bucket)| StackProps {
                client_id: Some("client".to_string()),
                client_secret: Some(SecretString::from("secret")),
                issuer_url: Some("https://issuer.example.com".to_string()),
                reload_interval: Some(reload),
                logging_level: level.map(str::to_string),
                authorizer_zip,
                sync_zip,
                version: version.map(|(a, b, c)| format!("{}.{}.{}", a, b, c)),
                vpc_id: vpc,
                manually_create_authorizer: Some(flags.0),
                analytics_enabled: Some(flags.1),
                inject_context: Some(flags.2),
                http_client_insecure_skip_verify: Some(flags.3),
                s3_bucket_name: bucket,
                ..Default::default()
            },
        )
}

proptest! {
    #[test]
    fn resolution_is_idempotent(props in valid_props()) {
        let first = resolve(&props).unwrap();
        let second = resolve(&StackProps::from(&first)).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn reload_interval_stays_in_range(props in valid_props()) {
        let config = resolve(&props).unwrap();
        prop_assert!(config.reload_interval >= Duration::from_secs(1));
        prop_assert!(config.reload_interval <= MAX_RELOAD_INTERVAL);
    }

    #[test]
    fn out_of_range_interval_is_rejected(secs in 61u64..10_000) {
        let props = StackProps {
            client_id: Some("client".to_string()),
            client_secret: Some(SecretString::from("secret")),
            issuer_url: Some("https://issuer.example.com".to_string()),
            reload_interval: Some(format!("{}s", secs)),
            ..Default::default()
        };
        let err = resolve(&props).unwrap_err();
        prop_assert_eq!(err.fields().collect::<Vec<_>>(), vec!["reloadInterval"]);
        prop_assert_eq!(err.violations()[0].reason.code(), "range");
    }

    #[test]
    fn remote_packages_always_have_a_version(props in valid_props()) {
        let config = resolve(&props).unwrap();
        let any_remote = config.authorizer_package.is_remote() || config.sync_package.is_remote();
        prop_assert_eq!(config.version.is_some(), any_remote || props.version.is_some());
    }
}
