use crate::messaging::MessageSink;
use crate::storage::{KeyValueStore, Namespace, StorageError};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Bump whenever the consent text or data usage changes; stored grants made
/// under an older version stop being valid.
pub const CONSENT_VERSION: &str = "1.0";

const CONSENT_KEY: &str = "consent/external_api";
/// Everything the external fact-check integration ever persists lives under
/// this prefix, so revocation can purge it wholesale.
pub const FACTCHECK_PREFIX: &str = "factcheck/";

const EXPIRY_DAYS: i64 = 365;

#[derive(Error, Debug)]
pub enum ConsentError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("consent serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("stored consent record is corrupt: {0}")]
    Corrupt(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConsentData {
    pub external_api_enabled: bool,
    pub consent_timestamp: DateTime<Utc>,
    pub consent_version: String,
    pub data_retention_days: u32,
    pub allow_domain_sharing: bool,
    pub allow_caching: bool,
}

impl ConsentData {
    pub fn granted() -> Self {
        Self {
            external_api_enabled: true,
            consent_timestamp: Utc::now(),
            consent_version: CONSENT_VERSION.to_string(),
            data_retention_days: 30,
            allow_domain_sharing: true,
            allow_caching: true,
        }
    }
}

/// Versioned-consent lifecycle over the key-value store. The API client never
/// sees the record, only the boolean from [`ConsentGate::has_valid_consent`].
pub struct ConsentGate {
    store: Arc<dyn KeyValueStore>,
    sink: Arc<dyn MessageSink>,
}

impl ConsentGate {
    pub fn new(store: Arc<dyn KeyValueStore>, sink: Arc<dyn MessageSink>) -> Self {
        Self { store, sink }
    }

    pub async fn get_consent(&self) -> Result<Option<ConsentData>, ConsentError> {
        match self.store.get(Namespace::Sync, CONSENT_KEY).await? {
            Some(value) => {
                let data = serde_json::from_value(value)
                    .map_err(|e| ConsentError::Corrupt(e.to_string()))?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    /// True only for an enabled grant under the current version that has not
    /// aged past the one-year expiry window.
    pub async fn has_valid_consent(&self) -> Result<bool, ConsentError> {
        let Some(data) = self.get_consent().await? else {
            return Ok(false);
        };
        if !data.external_api_enabled {
            return Ok(false);
        }
        if data.consent_version != CONSENT_VERSION {
            info!(
                stored = %data.consent_version,
                current = CONSENT_VERSION,
                "consent version outdated, re-prompt required"
            );
            return Ok(false);
        }
        let expires_at = data.consent_timestamp + Duration::days(EXPIRY_DAYS);
        Ok(Utc::now() < expires_at)
    }

    #[instrument(skip(self))]
    pub async fn request_consent(&self, data: ConsentData) -> Result<(), ConsentError> {
        self.store
            .set(Namespace::Sync, CONSENT_KEY, serde_json::to_value(&data)?)
            .await?;
        info!(version = %data.consent_version, "consent recorded");
        Ok(())
    }

    /// Preference change; the grant timestamp is refreshed so the expiry
    /// window restarts.
    pub async fn update_consent(
        &self,
        update: impl FnOnce(&mut ConsentData),
    ) -> Result<ConsentData, ConsentError> {
        let mut data = self.get_consent().await?.unwrap_or_else(ConsentData::granted);
        update(&mut data);
        data.consent_timestamp = Utc::now();
        data.consent_version = CONSENT_VERSION.to_string();
        self.store
            .set(Namespace::Sync, CONSENT_KEY, serde_json::to_value(&data)?)
            .await?;
        Ok(data)
    }

    /// Revocation removes the grant and everything gathered under it.
    #[instrument(skip(self))]
    pub async fn revoke_consent(&self) -> Result<(), ConsentError> {
        self.store.remove(Namespace::Sync, CONSENT_KEY).await?;
        self.purge_factcheck_data().await?;
        info!("consent revoked and cached external data purged");
        Ok(())
    }

    /// GDPR erasure: the consent record plus every key under the external
    /// cache prefix, not just the record itself.
    #[instrument(skip(self))]
    pub async fn delete_all_user_data(&self) -> Result<(), ConsentError> {
        self.store.remove(Namespace::Sync, CONSENT_KEY).await?;
        self.purge_factcheck_data().await?;
        Ok(())
    }

    /// GDPR access: JSON document of the consent record and every cached
    /// external-API entry.
    pub async fn export_user_data(&self) -> Result<serde_json::Value, ConsentError> {
        let consent = self
            .get_consent()
            .await?
            .map(|d| serde_json::to_value(&d))
            .transpose()?;

        let mut cached = serde_json::Map::new();
        for key in self
            .store
            .keys_with_prefix(Namespace::Local, FACTCHECK_PREFIX)
            .await?
        {
            if let Some(value) = self.store.get(Namespace::Local, &key).await? {
                cached.insert(key, value);
            }
        }

        Ok(json!({
            "exported_at": Utc::now(),
            "consent": consent,
            "cached_entries": cached,
        }))
    }

    async fn purge_factcheck_data(&self) -> Result<(), ConsentError> {
        let keys = self
            .store
            .keys_with_prefix(Namespace::Local, FACTCHECK_PREFIX)
            .await?;
        let purged = keys.len();
        for key in keys {
            self.store.remove(Namespace::Local, &key).await?;
        }

        // Other contexts hold in-memory caches keyed off this data.
        if let Err(e) = self
            .sink
            .send(json!({"type": "clear_factcheck_cache", "purged": purged}))
            .await
        {
            warn!(error = %e, "cache-clear broadcast failed");
        }
        Ok(())
    }
}
