mod core_config;
pub use self::core_config::*;
mod environment_config;
pub use self::environment_config::*;
