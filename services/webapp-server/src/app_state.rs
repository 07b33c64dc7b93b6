use crate::app_config::AppConfig;
use std::sync::Arc;
use webapp_infra::web::WebAppConfig;
use webapp_shared::AzureAdB2C;

struct Inner {
    azure_ad_b2c: AzureAdB2C,
}

/// Read-only snapshot of the configuration shared by the request handlers.
#[derive(Clone)]
pub struct AppState(Arc<Inner>);

impl AppState {
    pub fn new(config: &WebAppConfig<AppConfig>) -> Self {
        Self::from_azure_ad_b2c(config.feature.azure_ad_b2c.clone())
    }

    pub fn from_azure_ad_b2c(azure_ad_b2c: AzureAdB2C) -> Self {
        Self(Arc::new(Inner { azure_ad_b2c }))
    }

    pub fn azure_ad_b2c(&self) -> &AzureAdB2C {
        &self.0.azure_ad_b2c
    }
}
