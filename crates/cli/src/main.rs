use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use reporter_core::config::LoggingConfig;
use reporter_core::{
    load_config, validate_config, ArchiveStore, Config, LocalObjectStore, LogFormat, LogNotifier,
    Notifier, NotifierBackend, ReportRun, StorageBackendKind, WebhookNotifier, EXIT_FAILURE,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    match run().await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            // Logging may not be set up yet if the config failed to load.
            let _ = tracing_subscriber::fmt().try_init();
            error!("Fatal error: {:#}", e);
            std::process::exit(EXIT_FAILURE);
        }
    }
}

async fn run() -> Result<i32> {
    // Determine config path
    let config_path = std::env::var("REPORTER_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("reporter.toml"));

    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    init_logging(&config.logging)?;
    info!("reporter {} starting", VERSION);
    info!("Configuration loaded from {:?}", config_path);
    info!("Data root: {:?}", config.paths.data_root);

    let notifier = create_notifier(&config)?;
    info!("Using notifier: {}", notifier.name());

    let store = create_store(&config)?;
    info!("Using archive store: {}", store.name());

    let run = ReportRun::from_config(&config, notifier, store);
    info!("Run id: {}", run.run_id());
    Ok(run.execute().await)
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let registry = tracing_subscriber::registry().with(filter);
    match logging.format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .context("Failed to initialize logging")?,
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .context("Failed to initialize logging")?,
    }
    Ok(())
}

fn create_notifier(config: &Config) -> Result<Arc<dyn Notifier>> {
    let topic = config.notifier.topic.clone();
    let notifier: Arc<dyn Notifier> = match config.notifier.backend {
        NotifierBackend::Log => Arc::new(LogNotifier::new(topic)),
        NotifierBackend::Webhook => {
            let webhook = config
                .notifier
                .webhook
                .clone()
                .context("Webhook backend selected but no webhook config provided")?;
            info!("Publishing to webhook at {}", webhook.url);
            Arc::new(
                WebhookNotifier::new(webhook, topic).context("Failed to create webhook notifier")?,
            )
        }
    };
    Ok(notifier)
}

fn create_store(config: &Config) -> Result<Arc<dyn ArchiveStore>> {
    let store: Arc<dyn ArchiveStore> = match config.storage.backend {
        StorageBackendKind::Local => {
            let local = config
                .storage
                .local
                .as_ref()
                .context("Local storage backend selected but no storage.local config provided")?;
            info!("Archiving to local object store at {:?}", local.root);
            Arc::new(LocalObjectStore::new(local.root.clone()))
        }
    };
    Ok(store)
}
