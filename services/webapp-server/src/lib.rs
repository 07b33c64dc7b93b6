mod app_config;
mod app_state;
mod application;
mod controllers;

pub use self::{app_config::AppConfig, app_state::AppState, application::Application, controllers::ConfigController};
