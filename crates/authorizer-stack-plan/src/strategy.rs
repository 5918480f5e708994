// Strategy selection
//
// Each sub-decision of the planner is made once, up front, and recorded as a
// tagged variant. The graph builder only ever matches on these values.

use crate::error::PlanError;
use authorizer_stack_config::{DeployableUnit, DeploymentConfiguration, PackageSource};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Period of the scheduler primitive; it cannot fire more often than this.
pub const SCHEDULE_PERIOD: Duration = Duration::from_secs(60);

/// Placeholder resolved by the renderer when the region is not known yet.
pub const REGION_TOKEN: &str = "${AWS::Region}";

/// Where a unit's code comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PackagingStrategy {
    /// Zip on the deploying machine, uploaded as an asset by the renderer
    LocalAsset { path: PathBuf },
    /// Released zip in the regional artifact bucket
    Bucket { bucket: String, key: String },
}

impl PackagingStrategy {
    pub fn select(
        unit: DeployableUnit,
        source: &PackageSource,
        region: Option<&str>,
    ) -> Result<Self, PlanError> {
        match source {
            PackageSource::Local { path } => Ok(Self::LocalAsset { path: path.clone() }),
            PackageSource::Remote {
                bucket_name,
                object_prefix,
                version,
            } => {
                if version.is_empty() {
                    return Err(PlanError::MissingVersion { unit });
                }
                Ok(Self::Bucket {
                    bucket: format!("{}-{}", bucket_name, region.unwrap_or(REGION_TOKEN)),
                    key: format!("{}{}.zip", object_prefix, version),
                })
            }
        }
    }
}

/// How the sync unit is invoked periodically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TriggerStrategy {
    /// The schedule invokes the sync function once per period
    Direct,
    /// Each period starts a chain of delayed queue messages
    #[serde(rename_all = "camelCase")]
    FanOut {
        interval_secs: u64,
        offsets_secs: Vec<u64>,
    },
}

impl TriggerStrategy {
    pub fn select(reload_interval: Duration) -> Result<Self, PlanError> {
        if reload_interval >= SCHEDULE_PERIOD {
            return Ok(Self::Direct);
        }

        // Whole seconds only; a fractional part is dropped, as is any
        // remainder of the period that the interval does not divide.
        let interval_secs = reload_interval.as_secs();
        if interval_secs == 0 {
            return Err(PlanError::EmptyDelayChain {
                interval: reload_interval,
            });
        }
        let count = SCHEDULE_PERIOD.as_secs() / interval_secs;
        let offsets_secs = (0..count).map(|i| i * interval_secs).collect();

        Ok(Self::FanOut {
            interval_secs,
            offsets_secs,
        })
    }

    /// Number of sync invocations started per schedule period.
    pub fn sends_per_period(&self) -> usize {
        match self {
            Self::Direct => 1,
            Self::FanOut { offsets_secs, .. } => offsets_secs.len(),
        }
    }

    pub fn is_fan_out(&self) -> bool {
        matches!(self, Self::FanOut { .. })
    }
}

/// Whether the sync unit binds the authorizer to API Gateway itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingStrategy {
    AutoBind,
    Manual,
}

impl BindingStrategy {
    pub fn select(manually_bind_authorizer: bool) -> Self {
        if manually_bind_authorizer {
            Self::Manual
        } else {
            Self::AutoBind
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, Self::AutoBind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NetworkStrategy {
    /// Look up a network that already exists
    #[serde(rename_all = "camelCase")]
    Existing { vpc_id: String },
    /// Provision a network dedicated to this stack
    Isolated,
}

impl NetworkStrategy {
    pub fn select(vpc_id: Option<&str>) -> Self {
        match vpc_id {
            Some(vpc_id) => Self::Existing {
                vpc_id: vpc_id.to_string(),
            },
            None => Self::Isolated,
        }
    }
}

/// Every sub-decision for one configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Strategies {
    pub authorizer_packaging: PackagingStrategy,
    pub sync_packaging: PackagingStrategy,
    pub trigger: TriggerStrategy,
    pub binding: BindingStrategy,
    pub network: NetworkStrategy,
}

impl Strategies {
    pub fn select(config: &DeploymentConfiguration) -> Result<Self, PlanError> {
        let region = config.environment.region.as_deref();
        Ok(Self {
            authorizer_packaging: PackagingStrategy::select(
                DeployableUnit::Authorizer,
                &config.authorizer_package,
                region,
            )?,
            sync_packaging: PackagingStrategy::select(
                DeployableUnit::Sync,
                &config.sync_package,
                region,
            )?,
            trigger: TriggerStrategy::select(config.reload_interval)?,
            binding: BindingStrategy::select(config.manually_bind_authorizer),
            network: NetworkStrategy::select(config.vpc_id.as_deref()),
        })
    }

    pub fn packaging(&self, unit: DeployableUnit) -> &PackagingStrategy {
        match unit {
            DeployableUnit::Authorizer => &self.authorizer_packaging,
            DeployableUnit::Sync => &self.sync_packaging,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(version: &str) -> PackageSource {
        PackageSource::Remote {
            bucket_name: "artifacts".to_string(),
            object_prefix: "authorizer-".to_string(),
            version: version.to_string(),
        }
    }

    #[test]
    fn test_fan_out_offsets() {
        let trigger = TriggerStrategy::select(Duration::from_secs(10)).unwrap();
        assert_eq!(
            trigger,
            TriggerStrategy::FanOut {
                interval_secs: 10,
                offsets_secs: vec![0, 10, 20, 30, 40, 50],
            }
        );
        assert_eq!(trigger.sends_per_period(), 6);
    }

    #[test]
    fn test_fan_out_uses_floor_division() {
        let TriggerStrategy::FanOut { offsets_secs, .. } =
            TriggerStrategy::select(Duration::from_secs(7)).unwrap()
        else {
            panic!("expected fan-out");
        };
        assert_eq!(offsets_secs, vec![0, 7, 14, 21, 28, 35, 42, 49, 56]);

        // 1.5s is treated as 1s
        let trigger = TriggerStrategy::select(Duration::from_millis(1500)).unwrap();
        assert_eq!(trigger.sends_per_period(), 60);
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(
            TriggerStrategy::select(Duration::from_secs(1))
                .unwrap()
                .sends_per_period(),
            60
        );
        assert_eq!(
            TriggerStrategy::select(Duration::from_secs(60)).unwrap(),
            TriggerStrategy::Direct
        );
        assert!(TriggerStrategy::select(Duration::from_secs(59))
            .unwrap()
            .is_fan_out());
        assert_eq!(
            TriggerStrategy::select(Duration::from_millis(999)).unwrap_err(),
            PlanError::EmptyDelayChain {
                interval: Duration::from_millis(999)
            }
        );
    }

    #[test]
    fn test_packaging_keys() {
        let strategy = PackagingStrategy::select(
            DeployableUnit::Authorizer,
            &remote("1.2.3"),
            Some("eu-west-1"),
        )
        .unwrap();
        assert_eq!(
            strategy,
            PackagingStrategy::Bucket {
                bucket: "artifacts-eu-west-1".to_string(),
                key: "authorizer-1.2.3.zip".to_string(),
            }
        );

        let strategy =
            PackagingStrategy::select(DeployableUnit::Authorizer, &remote("1.2.3"), None).unwrap();
        let PackagingStrategy::Bucket { bucket, .. } = strategy else {
            panic!("expected bucket");
        };
        assert_eq!(bucket, "artifacts-${AWS::Region}");
    }

    #[test]
    fn test_remote_without_version_fails() {
        let err = PackagingStrategy::select(DeployableUnit::Sync, &remote(""), None).unwrap_err();
        assert_eq!(
            err,
            PlanError::MissingVersion {
                unit: DeployableUnit::Sync
            }
        );
    }

    #[test]
    fn test_binding_and_network() {
        assert_eq!(BindingStrategy::select(false), BindingStrategy::AutoBind);
        assert_eq!(BindingStrategy::select(true), BindingStrategy::Manual);
        assert_eq!(NetworkStrategy::select(None), NetworkStrategy::Isolated);
        assert_eq!(
            NetworkStrategy::select(Some("vpc-1")),
            NetworkStrategy::Existing {
                vpc_id: "vpc-1".to_string()
            }
        );
    }
}
