mod azure_ad_b2c;
pub use self::azure_ad_b2c::*;
