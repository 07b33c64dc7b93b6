mod get_config;
pub use self::get_config::*;
