//! Service wiring: builds adapters, the engine, and the gateway from config.

use secrecy::ExposeSecret;
use std::sync::Arc;
use thiserror::Error;

use crate::adapters::sheets::{
    GoogleSheetsConfig, GoogleSheetsStore, InMemoryTabularStore, ServiceAccountKey,
};
use crate::adapters::storage::JsonFileFallbackLog;
use crate::application::{ConversationEngine, GatewayOptions, PersistenceGateway};
use crate::config::{AppConfig, ConversationConfig, SheetsConfig, SheetsProvider};
use crate::domain::checkin::QuestionCatalog;
use crate::domain::foundation::ValidationError;
use crate::ports::{FallbackLog, TabularStore, TabularStoreError};

/// Start-up failures that stop the service.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Invalid question catalog: {0}")]
    Catalog(#[from] ValidationError),
}

/// Long-lived services shared by the front ends.
pub struct Services {
    pub engine: Arc<ConversationEngine>,
    pub gateway: Arc<PersistenceGateway>,
}

/// Builds the engine and gateway described by `config`.
///
/// Only an unusable question catalog is fatal. Problems with the remote
/// store degrade the gateway instead.
pub async fn build_services(config: &AppConfig) -> Result<Services, BootstrapError> {
    let catalog = load_catalog(&config.conversation)?;
    let engine = Arc::new(ConversationEngine::new(
        catalog,
        config.conversation.answer_policy(),
    ));

    let fallback: Arc<dyn FallbackLog> =
        Arc::new(JsonFileFallbackLog::new(config.storage.fallback_path.clone()));
    tracing::info!(path = %config.storage.fallback_path.display(), "Fallback log ready");

    let options = GatewayOptions {
        remote_timeout: config.sheets.timeout(),
        always_write_local_backup: config.storage.always_write_local_backup,
    };
    let gateway = Arc::new(
        PersistenceGateway::connect(build_tabular_store(&config.sheets), fallback, options).await,
    );

    Ok(Services { engine, gateway })
}

/// Built-in questions, or the YAML catalog named in config.
pub fn load_catalog(config: &ConversationConfig) -> Result<QuestionCatalog, ValidationError> {
    match &config.questions_file {
        Some(path) => {
            let catalog = QuestionCatalog::from_yaml_file(path)?;
            tracing::info!(path = %path.display(), "Loaded question catalog");
            Ok(catalog)
        }
        None => Ok(QuestionCatalog::builtin()),
    }
}

/// Re-reads the configured catalog into `engine`. On error the engine keeps
/// its current questions.
pub async fn reload_catalog(
    engine: &ConversationEngine,
    config: &ConversationConfig,
) -> Result<(), ValidationError> {
    let catalog = load_catalog(config)?;
    engine.replace_catalog(catalog).await;
    Ok(())
}

/// Creates the configured remote store adapter.
pub fn build_tabular_store(
    config: &SheetsConfig,
) -> Result<Arc<dyn TabularStore>, TabularStoreError> {
    match config.provider {
        SheetsProvider::Disabled => Err(TabularStoreError::NotConfigured(
            "remote store disabled".to_string(),
        )),
        SheetsProvider::Memory => Ok(Arc::new(InMemoryTabularStore::new())),
        SheetsProvider::Google => {
            let spreadsheet_id = config.spreadsheet_id().ok_or_else(|| {
                TabularStoreError::NotConfigured("no spreadsheet id configured".to_string())
            })?;
            let credentials = load_credentials(config)?;
            let store_config = GoogleSheetsConfig::new(spreadsheet_id, credentials)
                .with_base_url(config.api_base_url.clone())
                .with_timeout(config.timeout());
            Ok(Arc::new(GoogleSheetsStore::new(store_config)?))
        }
    }
}

fn load_credentials(config: &SheetsConfig) -> Result<ServiceAccountKey, TabularStoreError> {
    if let Some(json) = &config.credentials_json {
        return ServiceAccountKey::from_json(json.expose_secret());
    }
    if let Some(path) = &config.credentials_file {
        return ServiceAccountKey::from_file(path);
    }
    Err(TabularStoreError::NotConfigured(
        "no service account credentials configured".to_string(),
    ))
}
