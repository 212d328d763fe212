//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `ARTIFY_*` environment variables.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::fmt::Display;
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::debug;

use crate::constants::{
    DEFAULT_EMBEDDING_DIM, DEFAULT_IMAGE_SIZE, DEFAULT_MAX_IMAGE_BYTES, DEFAULT_REFERENCE_IMAGES,
    MULTIPART_OVERHEAD_BYTES,
};
use crate::embedding::{EmbeddingError, ExtractorConfig};
use crate::reference::{ReferenceSource, sources_from_dir};
use crate::scoring::ScoringConfig;
use crate::store::DEFAULT_UPLOAD_URL;

/// Default allowed CORS origin (the frontend dev server).
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `ARTIFY_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8000`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Root for local artifacts and records. Default: `./.data`.
    pub storage_path: PathBuf,

    /// CLIP weights (`model.safetensors` or its directory).
    pub model_path: Option<PathBuf>,

    /// Refuse to start in fallback mode. Default: `false`.
    pub require_model: bool,

    /// Explicit reference images. `None` uses the built-in defaults that exist on disk.
    pub reference_images: Option<Vec<PathBuf>>,

    /// Directory whose images are added to the reference set.
    pub reference_dir: Option<PathBuf>,

    pub embedding_dim: usize,
    pub image_size: usize,

    /// Upload size limit in bytes. Default: `5_000_000`.
    pub max_image_bytes: usize,

    /// L2-normalize real-mode embeddings. Default: `false`.
    pub normalize_embeddings: bool,

    pub scoring: ScoringConfig,

    /// Hex key for report signing. Without it `/infer` fails with `SigningUnconfigured`.
    pub signer_key: Option<String>,

    /// web3.storage API token. Missing or `your_…` placeholders select the local store.
    pub web3storage_token: Option<String>,

    pub upload_url: String,

    /// JSON-lines record file. Default: `{storage_path}/records.jsonl`.
    pub records_path: Option<PathBuf>,

    /// Allowed CORS origins; `*` allows any.
    pub cors_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            storage_path: PathBuf::from("./.data"),
            model_path: None,
            require_model: false,
            reference_images: None,
            reference_dir: None,
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            image_size: DEFAULT_IMAGE_SIZE,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            normalize_embeddings: false,
            scoring: ScoringConfig::default(),
            signer_key: None,
            web3storage_token: None,
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            records_path: None,
            cors_origins: vec![DEFAULT_CORS_ORIGIN.to_string()],
        }
    }
}

impl Config {
    pub const ENV_PORT: &'static str = "ARTIFY_PORT";
    const ENV_BIND_ADDR: &'static str = "ARTIFY_BIND_ADDR";
    const ENV_STORAGE_PATH: &'static str = "ARTIFY_STORAGE_PATH";
    const ENV_MODEL_PATH: &'static str = "ARTIFY_MODEL_PATH";
    const ENV_REQUIRE_MODEL: &'static str = "ARTIFY_REQUIRE_MODEL";
    const ENV_REFERENCE_IMAGES: &'static str = "ARTIFY_REFERENCE_IMAGES";
    const ENV_REFERENCE_DIR: &'static str = "ARTIFY_REFERENCE_DIR";
    const ENV_EMBEDDING_DIM: &'static str = "ARTIFY_EMBEDDING_DIM";
    const ENV_IMAGE_SIZE: &'static str = "ARTIFY_IMAGE_SIZE";
    const ENV_MAX_IMAGE_BYTES: &'static str = "ARTIFY_MAX_IMAGE_BYTES";
    const ENV_NORMALIZE: &'static str = "ARTIFY_NORMALIZE_EMBEDDINGS";
    const ENV_THRESHOLD: &'static str = "ARTIFY_THRESHOLD";
    const ENV_TOP_K: &'static str = "ARTIFY_TOP_K";
    const ENV_PREVIEW_LEN: &'static str = "ARTIFY_EMBEDDING_PREVIEW_LEN";
    const ENV_FALLBACK_MIN: &'static str = "ARTIFY_FALLBACK_SCORE_MIN";
    const ENV_FALLBACK_MAX: &'static str = "ARTIFY_FALLBACK_SCORE_MAX";
    const ENV_SIGNER_KEY: &'static str = "ARTIFY_SIGNER_KEY";
    const ENV_WEB3STORAGE_TOKEN: &'static str = "ARTIFY_WEB3STORAGE_TOKEN";
    const ENV_UPLOAD_URL: &'static str = "ARTIFY_UPLOAD_URL";
    const ENV_RECORDS_PATH: &'static str = "ARTIFY_RECORDS_PATH";
    const ENV_CORS_ORIGINS: &'static str = "ARTIFY_CORS_ORIGINS";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let scoring = ScoringConfig {
            threshold: Self::parse_from_env(Self::ENV_THRESHOLD, defaults.scoring.threshold)?,
            top_k: Self::parse_from_env(Self::ENV_TOP_K, defaults.scoring.top_k)?,
            embedding_preview_len: Self::parse_from_env(
                Self::ENV_PREVIEW_LEN,
                defaults.scoring.embedding_preview_len,
            )?,
            fallback_score_min: Self::parse_from_env(
                Self::ENV_FALLBACK_MIN,
                defaults.scoring.fallback_score_min,
            )?,
            fallback_score_max: Self::parse_from_env(
                Self::ENV_FALLBACK_MAX,
                defaults.scoring.fallback_score_max,
            )?,
        };

        Ok(Self {
            port: Self::parse_port_from_env(defaults.port)?,
            bind_addr: Self::parse_bind_addr_from_env(defaults.bind_addr)?,
            storage_path: Self::parse_path_from_env(Self::ENV_STORAGE_PATH, defaults.storage_path),
            model_path: Self::parse_optional_path_from_env(Self::ENV_MODEL_PATH),
            require_model: Self::parse_bool_from_env(
                Self::ENV_REQUIRE_MODEL,
                defaults.require_model,
            )?,
            reference_images: Self::parse_list_from_env(Self::ENV_REFERENCE_IMAGES)
                .map(|items| items.into_iter().map(PathBuf::from).collect()),
            reference_dir: Self::parse_optional_path_from_env(Self::ENV_REFERENCE_DIR),
            embedding_dim: Self::parse_from_env(Self::ENV_EMBEDDING_DIM, defaults.embedding_dim)?,
            image_size: Self::parse_from_env(Self::ENV_IMAGE_SIZE, defaults.image_size)?,
            max_image_bytes: Self::parse_from_env(
                Self::ENV_MAX_IMAGE_BYTES,
                defaults.max_image_bytes,
            )?,
            normalize_embeddings: Self::parse_bool_from_env(
                Self::ENV_NORMALIZE,
                defaults.normalize_embeddings,
            )?,
            scoring,
            signer_key: Self::parse_optional_string_from_env(Self::ENV_SIGNER_KEY),
            web3storage_token: Self::parse_optional_string_from_env(Self::ENV_WEB3STORAGE_TOKEN),
            upload_url: Self::parse_string_from_env(Self::ENV_UPLOAD_URL, defaults.upload_url),
            records_path: Self::parse_optional_path_from_env(Self::ENV_RECORDS_PATH),
            cors_origins: Self::parse_list_from_env(Self::ENV_CORS_ORIGINS)
                .unwrap_or(defaults.cors_origins),
        })
    }

    /// Validates paths and basic invariants (does not create directories).
    ///
    /// A configured but missing model is not an error; the extractor falls back
    /// unless `require_model` is set.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_path.exists() && !self.storage_path.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.storage_path.clone(),
            });
        }

        if self.require_model && self.model_path.is_none() {
            return Err(ConfigError::MissingEnvVar {
                name: Self::ENV_MODEL_PATH,
            });
        }

        if let Some(ref images) = self.reference_images {
            for path in images {
                if !path.exists() {
                    return Err(ConfigError::PathNotFound { path: path.clone() });
                }
                if !path.is_file() {
                    return Err(ConfigError::NotAFile { path: path.clone() });
                }
            }
        }

        if let Some(ref dir) = self.reference_dir {
            if !dir.exists() {
                return Err(ConfigError::PathNotFound { path: dir.clone() });
            }
            if !dir.is_dir() {
                return Err(ConfigError::NotADirectory { path: dir.clone() });
            }
        }

        if self.max_image_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_MAX_IMAGE_BYTES,
                value: "0".to_string(),
                reason: "must be non-zero".to_string(),
            });
        }

        self.scoring.validate()?;
        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            model_path: self.model_path.clone(),
            embedding_dim: self.embedding_dim,
            image_size: self.image_size,
            max_image_bytes: self.max_image_bytes,
            normalize: self.normalize_embeddings,
            require_model: self.require_model,
        }
    }

    /// Reference sources in load order: explicit (or default) images, then `reference_dir`.
    pub fn reference_sources(&self) -> Result<Vec<ReferenceSource>, EmbeddingError> {
        let mut sources: Vec<ReferenceSource> = match self.reference_images {
            Some(ref images) => images.iter().cloned().map(ReferenceSource::Path).collect(),
            None => DEFAULT_REFERENCE_IMAGES
                .iter()
                .map(PathBuf::from)
                .filter(|path| {
                    let present = path.is_file();
                    if !present {
                        debug!(path = %path.display(), "Default reference image not found, skipping");
                    }
                    present
                })
                .map(ReferenceSource::Path)
                .collect(),
        };

        if let Some(ref dir) = self.reference_dir {
            sources.extend(sources_from_dir(dir)?);
        }

        Ok(sources)
    }

    /// Root directory of the local content store.
    pub fn content_root(&self) -> PathBuf {
        self.storage_path.join("content")
    }

    pub fn records_path(&self) -> PathBuf {
        self.records_path
            .clone()
            .unwrap_or_else(|| self.storage_path.join("records.jsonl"))
    }

    /// Request body limit: the image limit plus multipart framing headroom.
    pub fn body_limit(&self) -> usize {
        self.max_image_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        Self::parse_optional_string_from_env(var_name).map(PathBuf::from)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        Self::parse_optional_string_from_env(var_name).unwrap_or(default)
    }

    /// Comma-separated list; `None` when unset or blank.
    fn parse_list_from_env(var_name: &str) -> Option<Vec<String>> {
        let items: Vec<String> = Self::parse_optional_string_from_env(var_name)?
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect();
        (!items.is_empty()).then_some(items)
    }

    fn parse_from_env<T>(var_name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match Self::parse_optional_string_from_env(var_name) {
            Some(value) => value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
                name: var_name,
                reason: e.to_string(),
                value,
            }),
            None => Ok(default),
        }
    }

    fn parse_bool_from_env(var_name: &'static str, default: bool) -> Result<bool, ConfigError> {
        let Some(value) = Self::parse_optional_string_from_env(var_name) else {
            return Ok(default);
        };
        match value.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue {
                name: var_name,
                value,
                reason: "expected true/false".to_string(),
            }),
        }
    }
}
