use super::{
    types::{Config, NotifierBackend, StorageBackendKind},
    ConfigError,
};

/// Validate configuration
/// Currently validates:
/// - Generator scripts are set
/// - Webhook backend has a URL
/// - Local storage backend has a root
/// - Storage key prefix has no leading or trailing slash
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.generator.modis_script.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "generator.modis_script cannot be empty".to_string(),
        ));
    }
    if config.generator.generic_script.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "generator.generic_script cannot be empty".to_string(),
        ));
    }

    if config.notifier.backend == NotifierBackend::Webhook {
        match &config.notifier.webhook {
            Some(webhook) if !webhook.url.is_empty() => {}
            _ => {
                return Err(ConfigError::ValidationError(
                    "notifier.webhook.url is required for the webhook backend".to_string(),
                ))
            }
        }
    }

    match config.storage.backend {
        StorageBackendKind::Local => {
            if config.storage.local.is_none() {
                return Err(ConfigError::ValidationError(
                    "storage.local.root is required for the local backend".to_string(),
                ));
            }
        }
    }

    let prefix = &config.storage.key_prefix;
    if prefix.is_empty() || prefix.starts_with('/') || prefix.ends_with('/') {
        return Err(ConfigError::ValidationError(format!(
            "storage.key_prefix must be non-empty without leading or trailing '/': {:?}",
            prefix
        )));
    }

    Ok(())
}
