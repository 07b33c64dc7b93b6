use crate::app_state::AppState;
use axum::{extract::State, Json};
use webapp_shared::AzureAdB2C;

fn snapshot(state: &AppState) -> Json<AzureAdB2C> {
    Json(state.azure_ad_b2c().clone())
}

#[utoipa::path(
    get,
    path = "/config",
    tag = "config",
    description = "Get the identity provider configuration of the application.",
    responses(
        (status = OK, body = AzureAdB2C)
    )
)]
pub async fn get_config(State(state): State<AppState>) -> Json<AzureAdB2C> {
    snapshot(&state)
}

#[utoipa::path(
    get,
    path = "/azureb2cconfig",
    tag = "config",
    description = "Get the identity provider configuration of the application.",
    responses(
        (status = OK, body = AzureAdB2C)
    )
)]
pub async fn get_azure_b2c_config(State(state): State<AppState>) -> Json<AzureAdB2C> {
    snapshot(&state)
}
