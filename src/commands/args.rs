use authorizer_stack_config::StackProps;
use clap::Args;

/// Stack props given on the command line. These override file and environment.
///
/// The client secret has no flag; it comes from ACP_CLIENT_SECRET or a prompt.
#[derive(Args, Debug, Default, Clone)]
pub struct StackArgs {
    /// Client ID used by both units to authenticate with the issuer
    #[arg(long, value_name = "ID")]
    pub client_id: Option<String>,

    /// Issuer URL of the authorization server
    #[arg(long, value_name = "URL")]
    pub issuer_url: Option<String>,

    /// How often the sync unit runs, e.g. 10s or 1m (1s to 1m)
    #[arg(long, value_name = "DURATION")]
    pub reload_interval: Option<String>,

    /// Logging level of the deployed units: debug, info, warn, error
    #[arg(long, value_name = "LEVEL")]
    pub logging_level: Option<String>,

    /// Release of the units to fetch from the artifact bucket
    #[arg(long = "release-version", value_name = "SEMVER")]
    pub version: Option<String>,

    /// Local zip with the authorizer unit
    #[arg(long, value_name = "PATH")]
    pub authorizer_zip: Option<String>,

    /// Local zip with the sync unit
    #[arg(long, value_name = "PATH")]
    pub sync_zip: Option<String>,

    /// Existing VPC to deploy into (default: a new one)
    #[arg(long, value_name = "ID")]
    pub vpc_id: Option<String>,

    /// Artifact bucket name (the region is appended)
    #[arg(long, value_name = "NAME")]
    pub s3_bucket_name: Option<String>,

    /// Object name prefix of authorizer releases in the artifact bucket
    #[arg(long, value_name = "PREFIX")]
    pub s3_authorizer_prefix: Option<String>,

    /// Object name prefix of sync releases in the artifact bucket
    #[arg(long, value_name = "PREFIX")]
    pub s3_sync_prefix: Option<String>,

    #[arg(long, value_name = "NAME")]
    pub stack_name: Option<String>,

    /// Target account (default: CDK_DEPLOY_ACCOUNT, CDK_DEFAULT_ACCOUNT)
    #[arg(long, value_name = "ID")]
    pub account: Option<String>,

    /// Target region (default: CDK_DEPLOY_REGION, CDK_DEFAULT_REGION)
    #[arg(long, value_name = "REGION")]
    pub region: Option<String>,

    /// Do not let the sync unit bind the authorizer to API Gateway
    #[arg(long, overrides_with = "no_manually_create_authorizer")]
    pub manually_create_authorizer: bool,

    /// Let the sync unit bind the authorizer, even if the config file says otherwise
    #[arg(long, overrides_with = "manually_create_authorizer")]
    pub no_manually_create_authorizer: bool,

    #[arg(long, overrides_with = "no_analytics_enabled")]
    pub analytics_enabled: bool,

    #[arg(long, overrides_with = "analytics_enabled")]
    pub no_analytics_enabled: bool,

    #[arg(long, overrides_with = "no_inject_context")]
    pub inject_context: bool,

    #[arg(long, overrides_with = "inject_context")]
    pub no_inject_context: bool,

    #[arg(long, overrides_with = "no_enforcement_allow_unknown")]
    pub enforcement_allow_unknown: bool,

    #[arg(long, overrides_with = "enforcement_allow_unknown")]
    pub no_enforcement_allow_unknown: bool,

    /// Root CA the units trust when calling the issuer
    #[arg(long, value_name = "PEM")]
    pub http_client_root_ca: Option<String>,

    /// Skip TLS verification when the units call the issuer
    #[arg(long, overrides_with = "no_http_client_insecure_skip_verify")]
    pub http_client_insecure_skip_verify: bool,

    #[arg(long, overrides_with = "http_client_insecure_skip_verify")]
    pub no_http_client_insecure_skip_verify: bool,
}

/// `--flag` sets true, `--no-flag` sets false, neither leaves the lower layers alone.
fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}

impl StackArgs {
    /// Flags as a props layer. Boolean switches only count when given.
    pub fn to_props(&self) -> StackProps {
        StackProps {
            client_id: self.client_id.clone(),
            issuer_url: self.issuer_url.clone(),
            reload_interval: self.reload_interval.clone(),
            logging_level: self.logging_level.clone(),
            version: self.version.clone(),
            authorizer_zip: self.authorizer_zip.clone(),
            sync_zip: self.sync_zip.clone(),
            vpc_id: self.vpc_id.clone(),
            s3_bucket_name: self.s3_bucket_name.clone(),
            s3_authorizer_prefix: self.s3_authorizer_prefix.clone(),
            s3_sync_prefix: self.s3_sync_prefix.clone(),
            stack_name: self.stack_name.clone(),
            account: self.account.clone(),
            region: self.region.clone(),
            manually_create_authorizer: switch(
                self.manually_create_authorizer,
                self.no_manually_create_authorizer,
            ),
            analytics_enabled: switch(self.analytics_enabled, self.no_analytics_enabled),
            inject_context: switch(self.inject_context, self.no_inject_context),
            enforcement_allow_unknown: switch(
                self.enforcement_allow_unknown,
                self.no_enforcement_allow_unknown,
            ),
            http_client_root_ca: self.http_client_root_ca.clone(),
            http_client_insecure_skip_verify: switch(
                self.http_client_insecure_skip_verify,
                self.no_http_client_insecure_skip_verify,
            ),
            ..Default::default()
        }
    }
}
