use axum::http::{
    header::{HeaderName, InvalidHeaderValue},
    HeaderValue,
};
use tower_http::set_header::SetResponseHeaderLayer;

pub const POWERED_BY_HEADER: HeaderName = HeaderName::from_static("x-powered-by");

/// Tag every response with the service name and version, ex: `x-powered-by: webapp@1.0.2`
#[derive(Clone, Debug)]
pub struct PoweredBy {
    version: HeaderValue,
}

impl PoweredBy {
    pub fn new<S>(version: S) -> Result<Self, InvalidHeaderValue>
    where
        S: TryInto<HeaderValue, Error = InvalidHeaderValue>,
    {
        Ok(Self { version: version.try_into()? })
    }

    pub fn from_service_info<S1: AsRef<str>, S2: AsRef<str>>(
        service: S1,
        version: S2,
    ) -> Result<Self, InvalidHeaderValue> {
        Self::new(format!("{}@{}", service.as_ref(), version.as_ref()).as_str())
    }

    pub fn into_layer(self) -> SetResponseHeaderLayer<HeaderValue> {
        SetResponseHeaderLayer::appending(POWERED_BY_HEADER, self.version)
    }
}
