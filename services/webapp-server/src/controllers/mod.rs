mod config;
pub use self::config::ConfigController;
