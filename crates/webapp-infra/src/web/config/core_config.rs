use crate::{azure::AzureKeyvaultConfigSource, web::Environment};
use azure_core::credentials::TokenCredential;
use azure_identity::{AzureCliCredential, ClientSecretCredential};
use config::{builder::AsyncState, Config, ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::{
    env,
    path::{Path, PathBuf},
    sync::Arc,
};

pub const DEFAULT_VERSION_CONFIG_FILE: &str = "server_version.json";

/// Partial configuration required for early setup.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CoreConfig {
    pub stage: String,
    pub version: String,
    pub before_layers: Vec<String>,
    pub after_layers: Vec<String>,
    pub root_file: String,
}

/// A source in the ordered chain of configuration layers, later layers override the earlier ones.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigLayer<'a> {
    /// The root configuration file
    Base,
    /// Environment variables, see [Environment]
    Environment,
    /// `file://path`, a mandatory configuration file
    File(&'a str),
    /// `file?://path`, an optional configuration file
    OptionalFile(&'a str),
    /// `azk://host`, secrets of an Azure Keyvault
    AzureKeyvault(&'a str),
}

impl<'a> ConfigLayer<'a> {
    pub fn parse(layer: &'a str) -> Result<Self, ConfigError> {
        if layer == "environment" {
            return Ok(ConfigLayer::Environment);
        }

        let invalid = |cause: &str| ConfigError::FileParse {
            uri: Some(layer.to_owned()),
            cause: cause.to_string().into(),
        };

        let (schema, location) = layer.split_once("://").ok_or_else(|| invalid("Invalid config layer"))?;
        if location.is_empty() {
            return Err(invalid("Missing layer location"));
        }
        match schema {
            "file" => Ok(ConfigLayer::File(location)),
            "file?" => Ok(ConfigLayer::OptionalFile(location)),
            "azk" => Ok(ConfigLayer::AzureKeyvault(location)),
            schema => Err(invalid(&format!("Unsupported schema, {schema}"))),
        }
    }
}

fn create_azure_credentials(layer: &str) -> Result<Arc<dyn TokenCredential>, ConfigError> {
    let to_config_error = |err: azure_core::Error| ConfigError::FileParse {
        uri: Some(layer.to_owned()),
        cause: err.into(),
    };

    if let (Ok(tenant_id), Ok(client_id), Ok(client_secret)) = (
        env::var("AZURE_TENANT_ID"),
        env::var("AZURE_CLIENT_ID"),
        env::var("AZURE_CLIENT_SECRET"),
    ) {
        log::info!("Getting azure credentials through environment...");
        let credentials: Arc<dyn TokenCredential> =
            ClientSecretCredential::new(&tenant_id, client_id, client_secret.into(), None).map_err(to_config_error)?;
        Ok(credentials)
    } else {
        log::info!("Getting azure credentials through azure cli...");
        let credentials: Arc<dyn TokenCredential> = AzureCliCredential::new(None).map_err(to_config_error)?;
        Ok(credentials)
    }
}

impl CoreConfig {
    pub fn new(stage: &str, config_file: Option<PathBuf>) -> Result<Self, ConfigError> {
        log::info!("Loading configuration for {}", stage);

        let root_file = config_file.unwrap_or_else(|| PathBuf::from(format!("server_config.{stage}.json")));
        let mut builder = Config::builder().add_source(File::from(root_file.as_path()));

        let version_path = Path::new(DEFAULT_VERSION_CONFIG_FILE);
        if version_path.exists() {
            builder = builder.add_source(File::from(version_path));
        } else {
            log::warn!("No version file found at {}", version_path.display());
            builder = builder.set_override("version", "custom")?;
        }

        builder = builder
            .set_override("stage", stage)?
            .set_override("rootFile", root_file.to_string_lossy().into_owned())?;

        let cfg: CoreConfig = builder.build()?.try_deserialize()?;

        log::debug!("pre-init configuration: {:#?}", cfg);
        Ok(cfg)
    }

    /// The layers in the order of application.
    pub fn layers(&self) -> Result<Vec<ConfigLayer<'_>>, ConfigError> {
        let mut layers = Vec::with_capacity(self.before_layers.len() + self.after_layers.len() + 1);
        for layer in &self.before_layers {
            layers.push(ConfigLayer::parse(layer)?);
        }
        layers.push(ConfigLayer::Base);
        for layer in &self.after_layers {
            layers.push(ConfigLayer::parse(layer)?);
        }
        Ok(layers)
    }

    pub fn create_config_builder(&self) -> Result<ConfigBuilder<AsyncState>, ConfigError> {
        log::debug!("Setting up configuration builder...");
        let mut builder = ConfigBuilder::<AsyncState>::default();

        let mut credentials: Option<Arc<dyn TokenCredential>> = None;
        for layer in self.layers()? {
            log::debug!("Adding layer: {:?}", layer);
            match layer {
                ConfigLayer::Base => {
                    builder = builder.add_source(File::from(Path::new(&self.root_file)));
                }
                ConfigLayer::Environment => {
                    builder = builder.add_source(Environment::new());
                }
                ConfigLayer::File(path) => {
                    builder = builder.add_source(File::from(Path::new(path)));
                }
                ConfigLayer::OptionalFile(path) => {
                    if Path::new(path).exists() {
                        log::info!("Adding optional config file {}...", path);
                        builder = builder.add_source(File::from(Path::new(path)));
                    } else {
                        log::info!("Skipping missing optional config file {}", path);
                    }
                }
                ConfigLayer::AzureKeyvault(host) => {
                    let azure_credentials = match credentials.clone() {
                        Some(azure_credentials) => azure_credentials,
                        None => {
                            let azure_credentials = create_azure_credentials(host)?;
                            credentials = Some(azure_credentials.clone());
                            azure_credentials
                        }
                    };
                    let keyvault_url = format!("https://{host}");
                    let keyvault = AzureKeyvaultConfigSource::new(azure_credentials, &keyvault_url)?;
                    builder = builder.add_async_source(keyvault);
                }
            }
        }

        // these properties cannot be altered wrt the core config
        builder = builder
            .set_override("stage", self.stage.clone())?
            .set_override("version", self.version.clone())?
            .set_override("rootFile", self.root_file.clone())?;

        Ok(builder)
    }
}
