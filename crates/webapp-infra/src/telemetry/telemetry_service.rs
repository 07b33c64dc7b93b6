use tracing::Subscriber;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, registry, registry::LookupSpan, Layer};

use super::{ConsoleFormat, TelemetryBuildError, TelemetryConfig};

pub const DEFAULT_FILTER: &str = "info";

/// Telemetry service.
///
/// The tracing crate is used as the frontend with a console backend. For convenience, the
/// log::trace,debug,info,warn,error! macros are channelled to the tracing layer by the `LogTracer`
/// installed in the pre-init phase of the web application.
#[derive(Debug, Clone)]
pub struct TelemetryService {
    service_name: &'static str,
    filter: String,
}

impl TelemetryService {
    pub fn new(service_name: &'static str, config: &TelemetryConfig) -> Result<Self, TelemetryBuildError> {
        let filter = config.default_level.as_deref().unwrap_or(DEFAULT_FILTER).to_string();
        let env_filter = EnvFilter::builder().parse(&filter)?;

        let console_layer = if config.enable_console_log {
            log::debug!("Registering console log tracing layer ({:?})...", config.format);
            Some(Self::console_layer(config.format))
        } else {
            log::warn!("Service is configured for silent mode");
            None
        };

        // SubscriberInitExt::init would install a second LogTracer, the one from the pre-init phase is kept.
        let pipeline = registry().with(env_filter).with(console_layer);
        tracing::dispatcher::set_global_default(pipeline.into())?;

        Ok(Self { service_name, filter })
    }

    fn console_layer<S>(format: ConsoleFormat) -> Box<dyn Layer<S> + Send + Sync + 'static>
    where
        S: Subscriber + for<'a> LookupSpan<'a> + Send + Sync + 'static,
    {
        match format {
            ConsoleFormat::Compact => fmt::layer().compact().boxed(),
            ConsoleFormat::Pretty => fmt::layer().pretty().boxed(),
            ConsoleFormat::Json => fmt::layer().json().boxed(),
        }
    }

    pub fn service_name(&self) -> &'static str {
        self.service_name
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }
}
