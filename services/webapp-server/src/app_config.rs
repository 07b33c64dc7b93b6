use serde::{Deserialize, Serialize};
use webapp_infra::web::FeatureConfig;
use webapp_shared::AzureAdB2C;

/// The application configuration
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(rename = "azureAdB2C")]
    pub azure_ad_b2c: AzureAdB2C,
}

impl FeatureConfig for AppConfig {
    const NAME: &'static str = "webapp";
}
