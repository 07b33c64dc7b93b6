mod config;
pub use self::config::*;
mod service_config;
pub use self::service_config::*;
mod web_config;
pub use self::web_config::*;
mod problem_detail;
pub use self::problem_detail::*;
mod web_app;
pub use self::web_app::*;

pub mod controllers;
pub mod middlewares;
