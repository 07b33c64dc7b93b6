use async_trait::async_trait;
use azure_core::credentials::TokenCredential;
use azure_security_keyvault_secrets::SecretClient;
use config::{
    AsyncSource as ConfigAsyncSource, ConfigError, Map as ConfigMap, Value as ConfigValue, ValueKind as ConfigValueKind,
};
use core::fmt;
use futures::TryStreamExt;
use std::sync::Arc;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
#[error("Azure keyvault error: {0}")]
pub struct AzureKeyvaultConfigError(#[source] azure_core::Error);

impl From<AzureKeyvaultConfigError> for ConfigError {
    fn from(err: AzureKeyvaultConfigError) -> Self {
        log::error!("{err:?}");
        ConfigError::Foreign(Box::new(err))
    }
}

/// Map a secret name to a configuration path. Keyvault allows only alphanumerics and dashes in the name,
/// thus `webapp-azureAdB2C-clientId` is read as `webapp.azureAdB2C.clientId`.
pub fn secret_name_to_config_key(name: &str) -> String {
    name.replace('-', ".")
}

/// Secrets are kept as strings, numbers and flags are converted by the config deserializer on demand.
pub fn secret_value_to_config_value(value: String) -> ConfigValueKind {
    ConfigValueKind::String(value)
}

/// Configuration layer reading all the enabled secrets of an Azure Keyvault.
#[derive(Clone)]
pub struct AzureKeyvaultConfigSource {
    keyvault_url: String,
    client: Arc<SecretClient>,
}

impl fmt::Debug for AzureKeyvaultConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureKeyvaultConfigSource")
            .field("keyvault_url", &self.keyvault_url)
            .finish()
    }
}

impl AzureKeyvaultConfigSource {
    pub fn new(
        azure_credentials: Arc<dyn TokenCredential>,
        keyvault_url: &str,
    ) -> Result<AzureKeyvaultConfigSource, ConfigError> {
        let client = SecretClient::new(keyvault_url, azure_credentials, None).map_err(AzureKeyvaultConfigError)?;
        Ok(Self {
            keyvault_url: keyvault_url.to_owned(),
            client: Arc::new(client),
        })
    }
}

#[async_trait]
impl ConfigAsyncSource for AzureKeyvaultConfigSource {
    async fn collect(&self) -> Result<ConfigMap<String, ConfigValue>, ConfigError> {
        let mut config = ConfigMap::new();

        log::info!("Loading secrets from {} ...", self.keyvault_url);
        let origin = self.keyvault_url.clone();
        let mut stream = self
            .client
            .list_secret_properties(None)
            .map_err(AzureKeyvaultConfigError)?
            .into_stream();

        while let Some(properties) = stream.try_next().await.map_err(AzureKeyvaultConfigError)? {
            let Some(name) = properties.id.as_deref().and_then(|id| id.split('/').next_back()) else {
                continue;
            };

            log::debug!("Reading secret {name:?}");
            let secret = self
                .client
                .get_secret(name, None)
                .await
                .map_err(AzureKeyvaultConfigError)?
                .into_body()
                .await
                .map_err(AzureKeyvaultConfigError)?;

            match (secret.attributes, secret.value) {
                (Some(attributes), Some(value)) if attributes.enabled.unwrap_or(false) => {
                    let key = secret_name_to_config_key(name);
                    config.insert(key, ConfigValue::new(Some(&origin), secret_value_to_config_value(value)));
                }
                _ => log::info!("Skipping disabled secret {name:?}"),
            }
        }

        Ok(config)
    }
}
