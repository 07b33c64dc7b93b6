mod api;

use crate::app_state::AppState;
use utoipa_axum::{router::OpenApiRouter, routes};

/// Read-only endpoints of the identity provider settings. Both routes serve the same record.
pub struct ConfigController();

impl ConfigController {
    pub fn new() -> Self {
        Self()
    }

    pub fn into_router(self) -> OpenApiRouter<AppState> {
        OpenApiRouter::new()
            .routes(routes!(api::get_config))
            .routes(routes!(api::get_azure_b2c_config))
    }
}
