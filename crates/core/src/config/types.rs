use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Filesystem roots
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathsConfig {
    /// Mounted processor data directory
    #[serde(default = "default_data_root")]
    pub data_root: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
        }
    }
}

fn default_data_root() -> PathBuf {
    PathBuf::from("/mnt/data")
}

/// Artifact naming conventions
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtifactsConfig {
    /// Prefix of synthesized registry placeholders
    #[serde(default = "default_registry_prefix")]
    pub registry_prefix: String,
    /// Prefix processing logs carry before the dataset name
    #[serde(default = "default_log_prefix")]
    pub log_prefix: String,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            registry_prefix: default_registry_prefix(),
            log_prefix: default_log_prefix(),
        }
    }
}

fn default_registry_prefix() -> String {
    "ghrsst_master_".to_string()
}

fn default_log_prefix() -> String {
    "ghrsst_".to_string()
}

/// External report generator scripts
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneratorConfig {
    /// Script used for MODIS Aqua and Terra
    pub modis_script: PathBuf,
    /// Script used for every other dataset
    pub generic_script: PathBuf,
    /// Working directory for script runs (default: the MODIS script's directory)
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    /// Day marker passed as the last argument
    #[serde(default = "default_today_marker")]
    pub today_marker: String,
}

fn default_today_marker() -> String {
    "today".to_string()
}

/// Notification transport configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotifierConfig {
    #[serde(default)]
    pub backend: NotifierBackend,
    /// Topic name attached to every published message
    #[serde(default = "default_topic")]
    pub topic: String,
    /// Webhook-specific configuration (required when backend = "webhook")
    #[serde(default)]
    pub webhook: Option<WebhookConfig>,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            backend: NotifierBackend::default(),
            topic: default_topic(),
            webhook: None,
        }
    }
}

fn default_topic() -> String {
    "reporter".to_string()
}

/// Available notification transports
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotifierBackend {
    #[default]
    Log,
    Webhook,
}

/// Webhook topic endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebhookConfig {
    /// Endpoint receiving JSON messages
    pub url: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_timeout() -> u32 {
    30
}

/// Archive storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackendKind,
    /// Key prefix archives are stored under
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// Request server-side encryption for uploads
    #[serde(default = "default_true")]
    pub server_side_encryption: bool,
    /// Local object store (required when backend = "local")
    #[serde(default)]
    pub local: Option<LocalStorageConfig>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackendKind::default(),
            key_prefix: default_key_prefix(),
            server_side_encryption: true,
            local: None,
        }
    }
}

fn default_key_prefix() -> String {
    "archive/reporter".to_string()
}

fn default_true() -> bool {
    true
}

/// Available archive storage backends
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackendKind {
    #[default]
    Local,
}

/// Directory-backed object store
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocalStorageConfig {
    pub root: PathBuf,
}

/// Log output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
    /// Filter directive used when RUST_LOG is unset
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            filter: default_filter(),
        }
    }
}

fn default_filter() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_config() {
        let toml = r#"
[generator]
modis_script = "/opt/reporter/print_modis_daily_report.csh"
generic_script = "/opt/reporter/print_generic_daily_report.csh"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.paths.data_root, PathBuf::from("/mnt/data"));
        assert_eq!(config.artifacts.registry_prefix, "ghrsst_master_");
        assert_eq!(config.generator.today_marker, "today");
        assert_eq!(config.notifier.backend, NotifierBackend::Log);
        assert_eq!(config.notifier.topic, "reporter");
        assert_eq!(config.storage.key_prefix, "archive/reporter");
        assert!(config.storage.server_side_encryption);
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_deserialize_missing_generator_fails() {
        let toml = r#"
[paths]
data_root = "/data"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[paths]
data_root = "/srv/data"

[artifacts]
log_prefix = ""

[generator]
modis_script = "/opt/modis.csh"
generic_script = "/opt/generic.csh"
working_dir = "/opt"
today_marker = "yesterday"

[notifier]
backend = "webhook"
topic = "ops-reporter"

[notifier.webhook]
url = "http://localhost:9000/topics/ops"

[storage]
backend = "local"
key_prefix = "archive/daily"
server_side_encryption = false

[storage.local]
root = "/srv/archive"

[logging]
format = "json"
filter = "debug"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.paths.data_root, PathBuf::from("/srv/data"));
        assert_eq!(config.artifacts.log_prefix, "");
        assert_eq!(config.generator.working_dir, Some(PathBuf::from("/opt")));
        assert_eq!(config.notifier.backend, NotifierBackend::Webhook);

        let webhook = config.notifier.webhook.as_ref().unwrap();
        assert_eq!(webhook.url, "http://localhost:9000/topics/ops");
        assert_eq!(webhook.timeout_secs, 30); // default

        let local = config.storage.local.as_ref().unwrap();
        assert_eq!(local.root, PathBuf::from("/srv/archive"));
        assert!(!config.storage.server_side_encryption);
        assert_eq!(config.logging.format, LogFormat::Json);
    }
}
