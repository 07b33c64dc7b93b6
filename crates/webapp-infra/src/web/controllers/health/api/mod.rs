mod ready;
pub use self::ready::*;
mod version;
pub use self::version::*;
