//! Layered server configuration.
//!
//! Sources, later ones winning:
//! 1. built-in defaults
//! 2. a TOML file (`--config`, default `agentcore-demo.toml` when present)
//! 3. `AGENTCORE_DEMO__*` environment variables (`__` separates nesting)

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use agentcore_demo_core::PollPolicy;
use agentcore_demo_vendor::VendorConfig;
use serde::{Deserialize, Serialize};

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "agentcore-demo.toml";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "AGENTCORE_DEMO";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub aws: AwsConfig,
    pub runtime: RuntimeConfig,
    pub memory: MemoryConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Sessions untouched for this long are swept.
    pub session_idle_secs: u64,
    pub sweep_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".into(),
            session_idle_secs: 6 * 60 * 60,
            sweep_interval_secs: 5 * 60,
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub const fn session_idle(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }

    #[must_use]
    pub const fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsConfig {
    pub region: String,
    pub account_id: Option<String>,
    pub control_endpoint: Option<String>,
    pub data_endpoint: Option<String>,
    pub artifact_endpoint: Option<String>,
    pub bearer_token: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: "us-west-2".into(),
            account_id: None,
            control_endpoint: None,
            data_endpoint: None,
            artifact_endpoint: None,
            bearer_token: None,
            request_timeout_secs: 60,
        }
    }
}

impl AwsConfig {
    /// Vendor client settings; unset endpoints fall back to the region's public ones.
    #[must_use]
    pub fn vendor_config(&self) -> VendorConfig {
        let mut config = VendorConfig::for_region(&self.region)
            .bearer_token(self.bearer_token.clone())
            .request_timeout(Duration::from_secs(self.request_timeout_secs));
        if let Some(url) = &self.control_endpoint {
            config = config.control_endpoint(url);
        }
        if let Some(url) = &self.data_endpoint {
            config = config.data_endpoint(url);
        }
        if let Some(url) = &self.artifact_endpoint {
            config = config.artifact_endpoint(url);
        }
        config
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub deployment_package_path: PathBuf,
    pub s3_bucket: Option<String>,
    pub execution_role_arn: Option<String>,
    pub container_repository: Option<String>,
    pub container_image_tag: String,
    pub container_role_arn: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            deployment_package_path: PathBuf::from(
                "deployment_packages/strands_agent/deployment_package.zip",
            ),
            s3_bucket: None,
            execution_role_arn: None,
            container_repository: None,
            container_image_tag: "latest".into(),
            container_role_arn: None,
        }
    }
}

impl RuntimeConfig {
    /// Configured bucket, or the conventional per-account one.
    #[must_use]
    pub fn bucket(&self, aws: &AwsConfig) -> Option<String> {
        self.s3_bucket.clone().or_else(|| {
            aws.account_id
                .as_ref()
                .map(|account| format!("bedrock-agentcore-code-{account}-{}", aws.region))
        })
    }

    /// Configured execution role, or the conventional SDK runtime role.
    #[must_use]
    pub fn role_arn(&self, aws: &AwsConfig) -> Option<String> {
        self.execution_role_arn.clone().or_else(|| {
            aws.account_id.as_ref().map(|account| {
                format!(
                    "arn:aws:iam::{account}:role/AmazonBedrockAgentCoreSDKRuntime-{}",
                    aws.region
                )
            })
        })
    }

    /// `{account}.dkr.ecr.{region}.amazonaws.com/{repository}:{tag}`.
    #[must_use]
    pub fn container_image_uri(&self, aws: &AwsConfig) -> Option<String> {
        let account = aws.account_id.as_ref()?;
        let repository = self.container_repository.as_ref()?;
        Some(format!(
            "{account}.dkr.ecr.{}.amazonaws.com/{repository}:{}",
            aws.region, self.container_image_tag
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Existing memories attached by `/api/memory/initialize` when the
    /// request names none.
    pub stm_memory_id: Option<String>,
    pub ltm_memory_id: Option<String>,
    pub create_poll_attempts: u32,
    pub create_poll_interval_ms: u64,
    pub search_poll_attempts: u32,
    pub search_poll_interval_ms: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            stm_memory_id: None,
            ltm_memory_id: None,
            create_poll_attempts: 60,
            create_poll_interval_ms: 5_000,
            search_poll_attempts: 4,
            search_poll_interval_ms: 5_000,
        }
    }
}

impl MemoryConfig {
    /// Wait for a new memory to become active.
    #[must_use]
    pub const fn create_policy(&self) -> PollPolicy {
        PollPolicy::new(
            self.create_poll_attempts,
            Duration::from_millis(self.create_poll_interval_ms),
        )
    }

    /// Wait for long-term extraction to surface records.
    #[must_use]
    pub const fn search_policy(&self) -> PollPolicy {
        PollPolicy::new(
            self.search_poll_attempts,
            Duration::from_millis(self.search_poll_interval_ms),
        )
    }
}

/// Values the UI substitutes into displayed SDK snippets.
///
/// Unset values are rendered as `YOUR_*` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicConfig {
    pub region: String,
    pub account_id: String,
    pub s3_bucket: String,
    pub execution_role_arn: String,
    pub container_repository: String,
    pub container_image_tag: String,
    pub container_role_arn: String,
    pub container_image_uri: String,
}

impl AppConfig {
    #[must_use]
    pub fn public_view(&self) -> PublicConfig {
        let or = |value: Option<String>, placeholder: &str| {
            value.unwrap_or_else(|| placeholder.to_string())
        };
        PublicConfig {
            region: self.aws.region.clone(),
            account_id: or(self.aws.account_id.clone(), "YOUR_ACCOUNT_ID"),
            s3_bucket: or(self.runtime.bucket(&self.aws), "YOUR_S3_BUCKET"),
            execution_role_arn: or(self.runtime.role_arn(&self.aws), "YOUR_EXECUTION_ROLE_ARN"),
            container_repository: or(self.runtime.container_repository.clone(), "YOUR_REPOSITORY"),
            container_image_tag: self.runtime.container_image_tag.clone(),
            container_role_arn: or(self.runtime.container_role_arn.clone(), "YOUR_CONTAINER_ROLE_ARN"),
            container_image_uri: or(
                self.runtime.container_image_uri(&self.aws),
                "YOUR_ECR_IMAGE_URI",
            ),
        }
    }
}

/// Load configuration from file and environment.
///
/// # Errors
/// Returns error if a source cannot be parsed into [`AppConfig`].
pub fn load_config(config_path: Option<&Path>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    match config_path {
        Some(path) => {
            builder = builder.add_source(config::File::from(path.to_path_buf()).required(true));
        }
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            builder = builder.add_source(config::File::from(PathBuf::from(DEFAULT_CONFIG_FILE)));
        }
        None => {}
    }

    builder = builder.add_source(
        config::Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true),
    );

    builder.build()?.try_deserialize()
}
