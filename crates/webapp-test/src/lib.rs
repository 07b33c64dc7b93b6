pub use webapp_test_macros::test;
use std::sync::Once;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

static INIT: Once = Once::new();

fn init_tracing_with_env_like() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt = fmt::layer()
        .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
        .with_target(false)
        .with_test_writer()
        .pretty();

    // log records are forwarded through the tracing-log bridge installed by try_init
    if tracing_subscriber::registry().with(fmt).with(filter).try_init().is_err() {
        log::warn!("A global subscriber is already installed");
    }
}

/// Test setup executed before each test.
pub fn setup_test() {
    INIT.call_once(|| {
        init_tracing_with_env_like();
        color_backtrace::install();
    });
}
