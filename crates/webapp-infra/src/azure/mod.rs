mod azure_keyvault_config;
pub use self::azure_keyvault_config::*;
