use crate::{app_config::AppConfig, app_state::AppState, controllers::ConfigController};
use anyhow::Error as AnyError;
use utoipa_axum::router::OpenApiRouter;
use webapp_infra::web::{WebAppConfig, WebApplication};

pub struct Application;

impl WebApplication for Application {
    type AppConfig = AppConfig;
    type AppState = AppState;

    async fn create_state(&self, config: &WebAppConfig<Self::AppConfig>) -> Result<Self::AppState, AnyError> {
        log::info!("Serving the B2C configuration of {}", config.feature.azure_ad_b2c.domain);
        Ok(AppState::new(config))
    }

    async fn create_routes(
        &self,
        _config: &WebAppConfig<Self::AppConfig>,
    ) -> Result<OpenApiRouter<Self::AppState>, AnyError> {
        Ok(ConfigController::new().into_router())
    }
}
