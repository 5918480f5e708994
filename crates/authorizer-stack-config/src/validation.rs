// Field validation
//
// One function per input field. Each returns the normalized value or the
// violation describing why the field was rejected; `resolve` collects them.

use crate::duration::{parse_duration, DurationError};
use crate::error::{Reason, Violation};
use crate::{
    fields, DeployableUnit, LoggingLevel, SecretString, DEFAULT_LOGGING_LEVEL,
    DEFAULT_RELOAD_INTERVAL, FALLBACK_RELEASE_VERSION, MAX_RELOAD_INTERVAL, MIN_RELOAD_INTERVAL,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;
use tracing::warn;
use url::Url;

// semver.org 2.0 grammar
static SEMVER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)",
        r"(?:-((?:0|[1-9][0-9]*|[0-9]*[a-zA-Z-][0-9a-zA-Z-]*)",
        r"(?:\.(?:0|[1-9][0-9]*|[0-9]*[a-zA-Z-][0-9a-zA-Z-]*))*))?",
        r"(?:\+([0-9a-zA-Z-]+(?:\.[0-9a-zA-Z-]+)*))?$",
    ))
    .expect("semver pattern compiles")
});

/// Treat empty strings the same as unset values.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

pub(crate) fn validate_required(
    field: &'static str,
    value: Option<&str>,
) -> Result<String, Violation> {
    non_empty(value)
        .map(str::to_string)
        .ok_or_else(|| Violation::new(field, Reason::Required))
}

pub(crate) fn validate_client_secret(
    value: Option<&SecretString>,
) -> Result<SecretString, Violation> {
    value
        .filter(|secret| !secret.is_empty())
        .cloned()
        .ok_or_else(|| Violation::new(fields::CLIENT_SECRET, Reason::Required))
}

pub(crate) fn validate_issuer_url(value: Option<&str>) -> Result<String, Violation> {
    let raw = validate_required(fields::ISSUER_URL, value)?;
    let malformed = |detail: String| {
        Violation::new(
            fields::ISSUER_URL,
            Reason::MalformedUrl {
                value: raw.clone(),
                detail,
            },
        )
    };

    let parsed = Url::parse(&raw).map_err(|e| malformed(e.to_string()))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(malformed(format!("unsupported scheme '{}'", parsed.scheme())));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(malformed("missing host".to_string()));
    }

    Ok(raw)
}

pub(crate) fn validate_logging_level(value: Option<&str>) -> Result<LoggingLevel, Violation> {
    match non_empty(value) {
        None => Ok(DEFAULT_LOGGING_LEVEL),
        Some(level) => level.parse::<LoggingLevel>().map_err(|_| {
            Violation::new(
                fields::LOGGING_LEVEL,
                Reason::NotOneOf {
                    value: level.to_string(),
                    allowed: LoggingLevel::VARIANTS,
                },
            )
        }),
    }
}

pub(crate) fn validate_reload_interval(value: Option<&str>) -> Result<Duration, Violation> {
    let Some(text) = non_empty(value) else {
        return Ok(DEFAULT_RELOAD_INTERVAL);
    };

    let out_of_range = || {
        Violation::new(
            fields::RELOAD_INTERVAL,
            Reason::OutOfRange {
                value: text.to_string(),
                min: MIN_RELOAD_INTERVAL,
                max: MAX_RELOAD_INTERVAL,
            },
        )
    };

    let interval = match parse_duration(text) {
        Ok(interval) => interval,
        Err(DurationError::Negative) => return Err(out_of_range()),
        Err(e) => {
            return Err(Violation::new(
                fields::RELOAD_INTERVAL,
                Reason::Unparseable {
                    input: text.to_string(),
                    detail: e.to_string(),
                },
            ))
        }
    };

    // zero means "unset", same as leaving the field out
    if interval.is_zero() {
        return Ok(DEFAULT_RELOAD_INTERVAL);
    }

    if !(MIN_RELOAD_INTERVAL..=MAX_RELOAD_INTERVAL).contains(&interval) {
        return Err(out_of_range());
    }

    let seconds = interval.as_secs();
    if interval < MAX_RELOAD_INTERVAL && (60 % seconds != 0 || interval.subsec_nanos() != 0) {
        warn!(
            reload_interval_secs = seconds,
            "reloadInterval does not divide a minute evenly; \
             the last sync of each minute is followed by a longer gap"
        );
    }

    Ok(interval)
}

/// Resolve `version` given the first unit (if any) that is fetched remotely.
///
/// Unset falls back to [`FALLBACK_RELEASE_VERSION`]; an explicitly empty value is
/// only acceptable when nothing needs to be fetched.
pub(crate) fn validate_version(
    value: Option<&str>,
    remote_unit: Option<DeployableUnit>,
) -> Result<Option<String>, Violation> {
    match (value, remote_unit) {
        (Some(""), Some(unit)) => Err(Violation::new(
            fields::VERSION,
            Reason::RequiredForRemoteSource { unit },
        )),
        (Some(""), None) => Ok(None),
        (Some(version), _) => {
            if SEMVER.is_match(version) {
                Ok(Some(version.to_string()))
            } else {
                Err(Violation::new(
                    fields::VERSION,
                    Reason::NotSemver {
                        value: version.to_string(),
                    },
                ))
            }
        }
        (None, Some(unit)) => {
            warn!(
                unit = %unit,
                version = FALLBACK_RELEASE_VERSION,
                "version is not set; fetching the release matching this tool's version"
            );
            Ok(Some(FALLBACK_RELEASE_VERSION.to_string()))
        }
        (None, None) => Ok(None),
    }
}

/// Upper bound on the length of an AWS region code ("ap-southeast-2"). Used
/// for the regional bucket name when the region is only known at deploy time.
const LONGEST_REGION_LEN: usize = 14;

const MAX_BUCKET_NAME_LEN: usize = 63;

/// Validate the base name of the artifact bucket. The bucket that is actually
/// read is `<name>-<region>`, so the S3 length limit applies to that.
pub(crate) fn validate_bucket_name(input: &str, region: Option<&str>) -> Result<String, Violation> {
    let invalid = |detail: String| {
        Violation::new(
            fields::S3_BUCKET_NAME,
            Reason::InvalidBucketName {
                value: input.to_string(),
                detail,
            },
        )
    };

    if input.len() < 3 {
        return Err(invalid("must be at least 3 characters".to_string()));
    }
    let regional_len = input.len() + 1 + region.map_or(LONGEST_REGION_LEN, str::len);
    if regional_len > MAX_BUCKET_NAME_LEN {
        return Err(invalid(format!(
            "'{}-{}' would be {} characters, S3 allows at most {}",
            input,
            region.unwrap_or("<region>"),
            regional_len,
            MAX_BUCKET_NAME_LEN
        )));
    }
    if !input
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
    {
        return Err(invalid(
            "must contain only lowercase letters, numbers, dots, and hyphens".to_string(),
        ));
    }
    if input.starts_with(['-', '.']) || input.ends_with(['-', '.']) {
        return Err(invalid("cannot start or end with a hyphen or dot".to_string()));
    }
    Ok(input.to_string())
}

pub(crate) fn warn_on_risky_settings(insecure_skip_verify: bool) {
    if insecure_skip_verify {
        warn!(
            "httpClientInsecureSkipVerify is enabled; \
             TLS certificates of the issuer will not be verified"
        );
    }
}
