// Configuration resolution
//
// Turns merged `StackProps` into a `DeploymentConfiguration`: applies defaults,
// validates every field and reports all violations at once. Pure: no
// environment, file or network access happens here.

use crate::error::{ConfigError, Violation};
use crate::validation::{
    non_empty, validate_bucket_name, validate_client_secret, validate_issuer_url,
    validate_logging_level, validate_reload_interval, validate_required, validate_version,
    warn_on_risky_settings,
};
use crate::{
    fields, Credentials, DeployableUnit, DeploymentConfiguration, HttpClientSettings,
    ObjectPrefixes, PackageSource, StackProps, TargetEnvironment, DEFAULT_S3_AUTHORIZER_PREFIX,
    DEFAULT_S3_BUCKET_NAME, DEFAULT_S3_SYNC_PREFIX, DEFAULT_STACK_NAME,
};
use std::path::PathBuf;
use tracing::debug;

pub fn resolve(raw: &StackProps) -> Result<DeploymentConfiguration, ConfigError> {
    let mut violations = Vec::new();

    let client_id = collect(
        &mut violations,
        validate_required(fields::CLIENT_ID, raw.client_id.as_deref()),
    );
    let client_secret = collect(
        &mut violations,
        validate_client_secret(raw.client_secret.as_ref()),
    );
    let issuer_url = collect(
        &mut violations,
        validate_issuer_url(raw.issuer_url.as_deref()),
    );
    let logging_level = collect(
        &mut violations,
        validate_logging_level(raw.logging_level.as_deref()),
    );
    let reload_interval = collect(
        &mut violations,
        validate_reload_interval(raw.reload_interval.as_deref()),
    );

    let authorizer_zip = non_empty(raw.authorizer_zip.as_deref());
    let sync_zip = non_empty(raw.sync_zip.as_deref());
    let local_zip = |unit: DeployableUnit| match unit {
        DeployableUnit::Authorizer => authorizer_zip,
        DeployableUnit::Sync => sync_zip,
    };
    let remote_unit = DeployableUnit::ALL
        .into_iter()
        .find(|unit| local_zip(*unit).is_none());
    let version = collect(
        &mut violations,
        validate_version(raw.version.as_deref(), remote_unit),
    );

    // The bucket is only read when some unit is fetched from it.
    let bucket_input = non_empty(raw.s3_bucket_name.as_deref()).unwrap_or(DEFAULT_S3_BUCKET_NAME);
    let bucket_name = match remote_unit {
        Some(_) => collect(
            &mut violations,
            validate_bucket_name(bucket_input, non_empty(raw.region.as_deref())),
        ),
        None => Some(bucket_input.to_string()),
    };

    let (
        Some(client_id),
        Some(client_secret),
        Some(issuer_url),
        Some(logging_level),
        Some(reload_interval),
        Some(bucket_name),
        Some(version),
    ) = (
        client_id,
        client_secret,
        issuer_url,
        logging_level,
        reload_interval,
        bucket_name,
        version,
    )
    else {
        debug!(count = violations.len(), "stack props rejected");
        return Err(ConfigError::new(violations));
    };

    let object_prefixes = ObjectPrefixes {
        authorizer: non_empty(raw.s3_authorizer_prefix.as_deref())
            .unwrap_or(DEFAULT_S3_AUTHORIZER_PREFIX)
            .to_string(),
        sync: non_empty(raw.s3_sync_prefix.as_deref())
            .unwrap_or(DEFAULT_S3_SYNC_PREFIX)
            .to_string(),
    };

    let package_source = |zip: Option<&str>, unit: DeployableUnit| match zip {
        Some(path) => PackageSource::Local {
            path: PathBuf::from(path),
        },
        None => PackageSource::Remote {
            bucket_name: bucket_name.clone(),
            object_prefix: object_prefixes.for_unit(unit).to_string(),
            version: version.clone().unwrap_or_default(),
        },
    };
    let authorizer_package = package_source(authorizer_zip, DeployableUnit::Authorizer);
    let sync_package = package_source(sync_zip, DeployableUnit::Sync);

    let insecure_skip_verify = raw.http_client_insecure_skip_verify.unwrap_or(false);
    warn_on_risky_settings(insecure_skip_verify);

    let config = DeploymentConfiguration {
        stack_name: non_empty(raw.stack_name.as_deref())
            .unwrap_or(DEFAULT_STACK_NAME)
            .to_string(),
        environment: TargetEnvironment {
            account: non_empty(raw.account.as_deref()).map(str::to_string),
            region: non_empty(raw.region.as_deref()).map(str::to_string),
        },
        authorizer_package,
        sync_package,
        manually_bind_authorizer: raw.manually_create_authorizer.unwrap_or(false),
        credentials: Credentials {
            client_id,
            client_secret,
            issuer_url,
        },
        vpc_id: non_empty(raw.vpc_id.as_deref()).map(str::to_string),
        version,
        logging_level,
        reload_interval,
        analytics_enabled: raw.analytics_enabled.unwrap_or(false),
        inject_context: raw.inject_context.unwrap_or(false),
        enforcement_allow_unknown: raw.enforcement_allow_unknown.unwrap_or(false),
        http_client: HttpClientSettings {
            root_ca: non_empty(raw.http_client_root_ca.as_deref()).map(str::to_string),
            insecure_skip_verify,
        },
        bucket_name,
        object_prefixes,
    };

    debug!(
        stack_name = %config.stack_name,
        reload_interval_secs = config.reload_interval.as_secs(),
        manually_bind_authorizer = config.manually_bind_authorizer,
        "stack props resolved"
    );

    Ok(config)
}

fn collect<T>(violations: &mut Vec<Violation>, result: Result<T, Violation>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(violation) => {
            violations.push(violation);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LoggingLevel, Reason, SecretString, FALLBACK_RELEASE_VERSION};
    use std::time::Duration;

    fn minimal() -> StackProps {
        StackProps {
            client_id: Some("a".to_string()),
            client_secret: Some(SecretString::from("b")),
            issuer_url: Some("https://issuer".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_applied() {
        let config = resolve(&minimal()).unwrap();

        assert_eq!(config.stack_name, DEFAULT_STACK_NAME);
        assert_eq!(config.logging_level, LoggingLevel::Info);
        assert_eq!(config.reload_interval, Duration::from_secs(10));
        assert_eq!(config.bucket_name, DEFAULT_S3_BUCKET_NAME);
        assert_eq!(config.object_prefixes, ObjectPrefixes::default());
        assert!(!config.manually_bind_authorizer);
        assert!(!config.analytics_enabled);
        assert!(!config.http_client.insecure_skip_verify);
        assert_eq!(config.vpc_id, None);
        assert_eq!(config.version.as_deref(), Some(FALLBACK_RELEASE_VERSION));
        assert_eq!(
            config.sync_package,
            PackageSource::Remote {
                bucket_name: DEFAULT_S3_BUCKET_NAME.to_string(),
                object_prefix: DEFAULT_S3_SYNC_PREFIX.to_string(),
                version: FALLBACK_RELEASE_VERSION.to_string(),
            }
        );
    }

    #[test]
    fn test_each_credential_reported_independently() {
        let mut props = minimal();
        props.client_id = None;
        let err = resolve(&props).unwrap_err();
        assert_eq!(err.fields().collect::<Vec<_>>(), vec!["clientID"]);

        let mut props = minimal();
        props.client_secret = Some(SecretString::from(""));
        let err = resolve(&props).unwrap_err();
        assert_eq!(err.fields().collect::<Vec<_>>(), vec!["clientSecret"]);

        let mut props = minimal();
        props.issuer_url = Some("not a url".to_string());
        let err = resolve(&props).unwrap_err();
        assert_eq!(err.fields().collect::<Vec<_>>(), vec!["issuerURL"]);
    }

    #[test]
    fn test_all_violations_reported() {
        let props = StackProps {
            logging_level: Some("verbose".to_string()),
            reload_interval: Some("2m".to_string()),
            version: Some("one".to_string()),
            ..Default::default()
        };
        let err = resolve(&props).unwrap_err();
        let fields: Vec<_> = err.fields().collect();
        assert_eq!(
            fields,
            vec![
                "clientID",
                "clientSecret",
                "issuerURL",
                "loggingLevel",
                "reloadInterval",
                "version"
            ]
        );
    }

    #[test]
    fn test_secret_not_in_error_message() {
        let mut props = minimal();
        props.client_secret = Some(SecretString::from("top-secret-value"));
        props.reload_interval = Some("forever".to_string());
        let err = resolve(&props).unwrap_err();
        assert!(!err.to_string().contains("top-secret-value"));
        assert!(!format!("{:?}", err).contains("top-secret-value"));
    }

    #[test]
    fn test_local_packages_need_no_version() {
        let mut props = minimal();
        props.authorizer_zip = Some("dist/authorizer.zip".to_string());
        props.sync_zip = Some("dist/sync.zip".to_string());
        props.version = Some(String::new());

        let config = resolve(&props).unwrap();
        assert_eq!(config.version, None);
        assert_eq!(
            config.authorizer_package,
            PackageSource::Local {
                path: PathBuf::from("dist/authorizer.zip")
            }
        );
        assert!(!config.sync_package.is_remote());
    }

    #[test]
    fn test_remote_package_with_empty_version_fails() {
        let mut props = minimal();
        props.authorizer_zip = Some("dist/authorizer.zip".to_string());
        props.version = Some(String::new());

        let err = resolve(&props).unwrap_err();
        assert_eq!(
            err.reason_for("version"),
            Some(&Reason::RequiredForRemoteSource {
                unit: DeployableUnit::Sync
            })
        );
    }

    #[test]
    fn test_remote_package_uses_version_and_prefix() {
        let mut props = minimal();
        props.version = Some("1.2.3".to_string());
        props.s3_bucket_name = Some("my-artifacts".to_string());
        props.s3_authorizer_prefix = Some("custom-authorizer-".to_string());

        let config = resolve(&props).unwrap();
        assert_eq!(
            config.authorizer_package,
            PackageSource::Remote {
                bucket_name: "my-artifacts".to_string(),
                object_prefix: "custom-authorizer-".to_string(),
                version: "1.2.3".to_string(),
            }
        );
    }

    #[test]
    fn test_regional_bucket_name_length_checked() {
        let mut props = minimal();
        props.s3_bucket_name = Some("a".repeat(60));
        props.region = Some("ap-southeast-2".to_string());

        let err = resolve(&props).unwrap_err();
        assert_eq!(err.fields().collect::<Vec<_>>(), vec!["s3BucketName"]);

        props.s3_bucket_name = Some("a".repeat(48));
        assert!(resolve(&props).is_ok());
    }

    #[test]
    fn test_bucket_name_ignored_when_nothing_is_fetched() {
        let mut props = minimal();
        props.authorizer_zip = Some("dist/authorizer.zip".to_string());
        props.sync_zip = Some("dist/sync.zip".to_string());
        props.s3_bucket_name = Some("a".repeat(70));

        assert!(resolve(&props).is_ok());

        props.sync_zip = None;
        let err = resolve(&props).unwrap_err();
        assert_eq!(err.fields().collect::<Vec<_>>(), vec!["s3BucketName"]);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let mut props = minimal();
        props.sync_zip = Some("sync.zip".to_string());
        props.vpc_id = Some("vpc-0abc".to_string());
        props.reload_interval = Some("1.5s".to_string());
        props.http_client_root_ca = Some("/etc/ssl/ca.pem".to_string());
        props.region = Some("eu-west-1".to_string());

        let first = resolve(&props).unwrap();
        let second = resolve(&StackProps::from(&first)).unwrap();
        assert_eq!(first, second);
    }
}
