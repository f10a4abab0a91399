//! Configuration module
//!
//! Settings are read from the process environment (after loading an optional
//! `.env` file). Each concern has its own struct; `Config` bundles them.

use std::env;
use std::time::Duration;

use crate::naming::{NameGenerator, ShardPrefix};
use crate::storage_types::{MetadataBackend, StorageBackend};

// Common constants
const SERVER_PORT: u16 = 8080;
const MAX_FILE_SIZE_MB: usize = 50;
const HTTP_CONCURRENCY_LIMIT: usize = 10_000;
const DEFAULT_BUCKET: &str = "test";
const DEFAULT_REGION: &str = "us-east-1";
const DGRAPH_URL: &str = "http://localhost:8080";
const METADATA_TIMEOUT_SECS: u64 = 30;
const OBJECT_NAME_LENGTH: usize = 12;
const MIN_OBJECT_NAME_LENGTH: usize = 11;
const MAX_OBJECT_NAME_LENGTH: usize = 64;
const SHARD_PREFIX_LENGTH: usize = 7;
const SHARD_PREFIX_TAG: char = 'x';
const NOTIFY_PROBE_TIMEOUT_MS: u64 = 1000;
const NOTIFY_TIMEOUT_MS: u64 = 5000;

/// Process-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub environment: String,
    pub max_file_size_bytes: usize,
    /// In-flight requests the server accepts before queueing.
    pub http_concurrency_limit: usize,
}

/// Object store settings
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Bucket new uploads are written to.
    pub bucket: String,
    pub s3_region: String,
    /// Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub s3_endpoint: Option<String>,
    pub local_storage_path: Option<String>,
}

/// Metadata store settings
#[derive(Clone, Debug)]
pub struct MetadataConfig {
    pub backend: MetadataBackend,
    pub dgraph_url: String,
    pub timeout: Duration,
}

/// Object key generation settings
#[derive(Clone, Debug)]
pub struct NamingConfig {
    pub object_name_length: usize,
    /// Digits in the shard prefix; 0 disables sharding.
    pub shard_prefix_length: usize,
    pub shard_prefix_tag: char,
}

impl NamingConfig {
    pub fn name_generator(&self) -> NameGenerator {
        NameGenerator::new(
            self.object_name_length,
            Some(ShardPrefix {
                tag: self.shard_prefix_tag,
                digits: self.shard_prefix_length,
            }),
        )
    }
}

/// Downstream processor settings. Absent when no processor is configured.
#[derive(Clone, Debug)]
pub struct NotifyConfig {
    pub url: String,
    pub probe_timeout: Duration,
    pub timeout: Duration,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub storage: StorageConfig,
    pub metadata: MetadataConfig,
    pub naming: NamingConfig,
    pub notify: Option<NotifyConfig>,
}

impl Config {
    /// Load `.env` (if present) and read configuration from the environment.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let server_port = parse_or(var("SERVER_PORT"), "SERVER_PORT", SERVER_PORT)?;
        let max_file_size_mb = parse_or(var("MAX_FILE_SIZE_MB"), "MAX_FILE_SIZE_MB", MAX_FILE_SIZE_MB)?;
        let max_file_size_bytes = max_file_size_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| anyhow::anyhow!("MAX_FILE_SIZE_MB is too large: {}", max_file_size_mb))?;
        let http_concurrency_limit = parse_or(
            var("HTTP_CONCURRENCY_LIMIT"),
            "HTTP_CONCURRENCY_LIMIT",
            HTTP_CONCURRENCY_LIMIT,
        )?;

        let storage_backend = match var("STORAGE_BACKEND") {
            Some(value) => value.parse::<StorageBackend>()?,
            None => StorageBackend::S3,
        };
        let storage = StorageConfig {
            backend: storage_backend,
            bucket: var("STORAGE_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            s3_region: var("S3_REGION")
                .or_else(|| var("AWS_REGION"))
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            s3_endpoint: var("S3_ENDPOINT"),
            local_storage_path: var("LOCAL_STORAGE_PATH"),
        };

        let metadata_backend = match var("METADATA_BACKEND") {
            Some(value) => value.parse::<MetadataBackend>()?,
            None => MetadataBackend::Dgraph,
        };
        let metadata = MetadataConfig {
            backend: metadata_backend,
            dgraph_url: var("DGRAPH_URL").unwrap_or_else(|| DGRAPH_URL.to_string()),
            timeout: Duration::from_secs(parse_or(
                var("METADATA_TIMEOUT_SECS"),
                "METADATA_TIMEOUT_SECS",
                METADATA_TIMEOUT_SECS,
            )?),
        };

        let shard_prefix_tag = match var("SHARD_PREFIX_TAG") {
            Some(value) => {
                let mut chars = value.trim().chars();
                match (chars.next(), chars.next()) {
                    (Some(tag), None) => tag,
                    _ => {
                        return Err(anyhow::anyhow!(
                            "SHARD_PREFIX_TAG must be a single character, got '{}'",
                            value
                        ))
                    }
                }
            }
            None => SHARD_PREFIX_TAG,
        };
        let naming = NamingConfig {
            object_name_length: parse_or(
                var("OBJECT_NAME_LENGTH"),
                "OBJECT_NAME_LENGTH",
                OBJECT_NAME_LENGTH,
            )?,
            shard_prefix_length: parse_or(
                var("SHARD_PREFIX_LENGTH"),
                "SHARD_PREFIX_LENGTH",
                SHARD_PREFIX_LENGTH,
            )?,
            shard_prefix_tag,
        };

        let notify = match var("NOTIFY_URL") {
            Some(url) => Some(NotifyConfig {
                url,
                probe_timeout: Duration::from_millis(parse_or(
                    var("NOTIFY_PROBE_TIMEOUT_MS"),
                    "NOTIFY_PROBE_TIMEOUT_MS",
                    NOTIFY_PROBE_TIMEOUT_MS,
                )?),
                timeout: Duration::from_millis(parse_or(
                    var("NOTIFY_TIMEOUT_MS"),
                    "NOTIFY_TIMEOUT_MS",
                    NOTIFY_TIMEOUT_MS,
                )?),
            }),
            None => None,
        };

        Ok(Config {
            base: BaseConfig {
                server_port,
                environment,
                max_file_size_bytes,
                http_concurrency_limit,
            },
            storage,
            metadata,
            naming,
            notify,
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.base.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.http_concurrency_limit == 0 {
            return Err(anyhow::anyhow!("HTTP_CONCURRENCY_LIMIT must be at least 1"));
        }

        if self.storage.bucket.contains('/') {
            return Err(anyhow::anyhow!(
                "STORAGE_BUCKET must not contain '/', got '{}'",
                self.storage.bucket
            ));
        }

        if self.storage.backend == StorageBackend::Local && self.storage.local_storage_path.is_none()
        {
            return Err(anyhow::anyhow!(
                "STORAGE_BACKEND=local requires LOCAL_STORAGE_PATH to be set"
            ));
        }

        if !(MIN_OBJECT_NAME_LENGTH..=MAX_OBJECT_NAME_LENGTH).contains(&self.naming.object_name_length)
        {
            return Err(anyhow::anyhow!(
                "OBJECT_NAME_LENGTH must be between {} and {}",
                MIN_OBJECT_NAME_LENGTH,
                MAX_OBJECT_NAME_LENGTH
            ));
        }

        if !self.naming.shard_prefix_tag.is_ascii_alphabetic() {
            return Err(anyhow::anyhow!(
                "SHARD_PREFIX_TAG must be an ASCII letter"
            ));
        }

        if self.metadata.backend == MetadataBackend::Dgraph
            && !(self.metadata.dgraph_url.starts_with("http://")
                || self.metadata.dgraph_url.starts_with("https://"))
        {
            return Err(anyhow::anyhow!("DGRAPH_URL must be an http(s) URL"));
        }

        if let Some(ref notify) = self.notify {
            if !(notify.url.starts_with("http://") || notify.url.starts_with("https://")) {
                return Err(anyhow::anyhow!("NOTIFY_URL must be an http(s) URL"));
            }
            if notify.probe_timeout.is_zero() || notify.timeout.is_zero() {
                return Err(anyhow::anyhow!(
                    "NOTIFY_PROBE_TIMEOUT_MS and NOTIFY_TIMEOUT_MS must be greater than zero"
                ));
            }
        }

        Ok(())
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T, anyhow::Error>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: '{}' ({})", key, raw, e)),
        None => Ok(default),
    }
}
