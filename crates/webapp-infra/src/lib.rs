pub mod azure;
pub mod telemetry;
pub mod web;
