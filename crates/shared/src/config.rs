//! Application configuration management.

use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Storage configuration.
    #[serde(default)]
    pub storage: StorageSettings,
    /// Cross-origin policy (remote backend only).
    #[serde(default)]
    pub cors: CorsConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Which storage backend this process runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Files are written to a local directory and served back statically.
    #[default]
    Local,
    /// Files are forwarded to Cloudinary and proxied back.
    Remote,
}

impl StorageBackend {
    /// Name used in logs and the health endpoint.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Selected backend.
    #[serde(default)]
    pub backend: StorageBackend,
    /// Root directory for the local backend.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    /// Public origin used to build local links.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Request body limit for uploads, in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            upload_dir: default_upload_dir(),
            public_base_url: default_public_base_url(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("./uploads")
}

fn default_public_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_max_upload_bytes() -> usize {
    32 * 1024 * 1024 // 32 MiB
}

/// Cross-origin policy.
///
/// Only the origin list is configurable; methods, headers and max age are fixed.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    /// Origins allowed to call the API with credentials.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    /// Methods permitted on cross-origin requests.
    pub const ALLOWED_METHODS: [&'static str; 3] = ["GET", "POST", "OPTIONS"];
    /// Request headers permitted on cross-origin requests.
    pub const ALLOWED_HEADERS: [&'static str; 3] = ["origin", "content-type", "accept"];
    /// Response headers exposed to cross-origin callers.
    pub const EXPOSED_HEADERS: [&'static str; 1] = ["content-length"];
    /// Preflight cache lifetime: 12 hours.
    pub const MAX_AGE_SECS: u64 = 12 * 60 * 60;
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://localhost:3000".to_string(),
    ]
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("PIXDROP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

/// Cloudinary account credentials and endpoints.
#[derive(Clone, Deserialize)]
pub struct CloudinaryConfig {
    /// Account cloud name.
    pub cloud_name: String,
    /// API key.
    pub api_key: String,
    /// API secret used to sign uploads.
    pub api_secret: String,
    /// Upload API base URL.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Public delivery base URL.
    #[serde(default = "default_delivery_base_url")]
    pub delivery_base_url: String,
}

fn default_api_base_url() -> String {
    "https://api.cloudinary.com/v1_1".to_string()
}

fn default_delivery_base_url() -> String {
    "https://res.cloudinary.com".to_string()
}

impl std::fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[redacted]")
            .field("api_base_url", &self.api_base_url)
            .field("delivery_base_url", &self.delivery_base_url)
            .finish()
    }
}

impl CloudinaryConfig {
    /// Loads credentials from `CLOUDINARY_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any credential is missing or empty.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("CLOUDINARY").prefix_separator("_"))
            .build()?;

        let cloudinary: Self = config.try_deserialize()?;
        cloudinary.validate()?;
        Ok(cloudinary)
    }

    /// Rejects blank credentials.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first blank credential.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        for (name, value) in [
            ("CLOUDINARY_CLOUD_NAME", &self.cloud_name),
            ("CLOUDINARY_API_KEY", &self.api_key),
            ("CLOUDINARY_API_SECRET", &self.api_secret),
        ] {
            if value.trim().is_empty() {
                return Err(config::ConfigError::Message(format!("{name} must not be empty")));
            }
        }
        Ok(())
    }
}
