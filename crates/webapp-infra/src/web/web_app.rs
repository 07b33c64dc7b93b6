use crate::{
    telemetry::TelemetryService,
    web::{
        controllers::HealthController, middlewares::PoweredBy, route_not_found, FeatureConfig, ProblemConfig,
        WebAppConfig,
    },
};
use anyhow::{anyhow, Error as AnyError};
use axum::{
    http::{header, Method},
    routing::Router,
};
use axum_server::Handle;
use regex::bytes::Regex;
use serde::de::DeserializeOwned;
use std::{env, fmt::Debug, fs, future::Future, net::SocketAddr, process, time::Duration as StdDuration};
use tokio::{net::TcpListener, runtime::Runtime, signal};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{instrument, level_filters::LevelFilter, Level};
use tracing_log::LogTracer;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::{Config as SwaggerConfig, SwaggerUi};

#[derive(OpenApi)]
#[openapi(paths(), components(), tags())]
struct ApiDoc;

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {err}");
            return;
        }
        log::warn!("Received ctrl-c, shutting down the server...")
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
                log::warn!("Received SIGTERM, shutting down the server...")
            }
            Err(err) => {
                log::error!("Failed to install signal handler: {err}");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

async fn graceful_shutdown(handle: Handle) {
    shutdown_signal().await;
    handle.graceful_shutdown(Some(StdDuration::from_secs(10)));
}

/// A web service hosted by [run_web_app].
///
/// The application routes are served from the root, the common routes (health, swagger) are
/// nested under `/{feature_name}`.
pub trait WebApplication {
    type AppConfig: FeatureConfig + DeserializeOwned + Debug + Send + Sync + 'static;
    type AppState: Clone + Send + Sync + 'static;

    fn feature_name(&self) -> &'static str {
        Self::AppConfig::NAME
    }

    fn create_state(
        &self,
        config: &WebAppConfig<Self::AppConfig>,
    ) -> impl Future<Output = Result<Self::AppState, AnyError>> + Send;

    fn create_routes(
        &self,
        config: &WebAppConfig<Self::AppConfig>,
    ) -> impl Future<Output = Result<OpenApiRouter<Self::AppState>, AnyError>> + Send;
}

async fn prepare_web_app<A: WebApplication>(
    app: &A,
) -> Result<(WebAppConfig<A::AppConfig>, TelemetryService), AnyError> {
    let args: Vec<String> = env::args().collect();
    let stage = args.get(1).ok_or(anyhow!("Missing config stage parameter"))?.clone();

    // initialize a pre-init logger
    LogTracer::init()?;
    let _pre_init_log_guard = {
        let env_filter = EnvFilter::builder()
            .with_default_directive(LevelFilter::INFO.into())
            .from_env_lossy();
        let pre_init_log = tracing_subscriber::fmt().with_env_filter(env_filter).compact().finish();
        tracing::dispatcher::set_default(&pre_init_log.into())
    };

    let config = WebAppConfig::<A::AppConfig>::load(&stage, None).await?;
    let telemetry_service = TelemetryService::new(app.feature_name(), &config.telemetry)?;
    log::info!("pre-init completed");

    Ok((config, telemetry_service))
}

fn create_cors_layer(allowed_origins: &[String]) -> Result<CorsLayer, AnyError> {
    let allowed_origins = allowed_origins
        .iter()
        .map(|r| Regex::new(r))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| anyhow!("Cors config error: {err}"))?;
    let allowed_origins = AllowOrigin::predicate(move |origin, _| {
        let origin = origin.as_bytes();
        allowed_origins.iter().any(|r| r.is_match(origin))
    });

    Ok(CorsLayer::default()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true))
}

/// Create the complete router of the application with the common routes and middlewares.
#[instrument(skip(config, app))]
pub async fn build_router<A: WebApplication>(
    app: &A,
    config: &WebAppConfig<A::AppConfig>,
) -> Result<Router<()>, AnyError> {
    log::trace!("Creating services...");
    let feature_name = app.feature_name();

    let cors_layer = create_cors_layer(&config.service.allowed_origins)?;
    let powered_by_layer = PoweredBy::from_service_info(feature_name, &config.core.version)?.into_layer();
    let log_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));
    let problem_detail_layer = ProblemConfig::new(config.service.full_problem_response).into_layer();

    let mut doc = ApiDoc::openapi();

    log::info!("Creating application state...");
    let mut router = OpenApiRouter::new();
    let app_state = app.create_state(config).await?;

    log::info!("Creating common routes...");
    let health_controller = HealthController::new(feature_name, config).into_routes();
    router = router.nest(&format!("/{feature_name}"), health_controller);

    log::info!("Creating application routes...");
    let app_controller = app.create_routes(config).await?;
    router = router.merge(app_controller);

    let (router, router_api) = router.split_for_parts();
    doc.merge(router_api);

    log::info!("Creating swagger-ui...");
    let swagger = SwaggerUi::new(format!("/{feature_name}/doc/swagger-ui"))
        .url(format!("/{feature_name}/doc/openapi.json"), doc)
        .config(
            SwaggerConfig::default()
                .with_credentials(true)
                .show_common_extensions(true),
        );

    Ok(router
        .merge(swagger)
        .fallback(route_not_found)
        .layer(problem_detail_layer)
        .layer(powered_by_layer)
        .layer(cors_layer)
        .layer(log_layer)
        .with_state(app_state))
}

async fn start_web_app<A: WebApplication>(app: A) -> Result<(), AnyError> {
    let (config, telemetry_service) = prepare_web_app(&app).await?;
    log::info!(
        "Telemetry of {} is installed with filter [{}]",
        telemetry_service.service_name(),
        telemetry_service.filter()
    );
    let router = build_router(&app, &config).await?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.service.port));

    if let Some(tls_config) = &config.service.tls {
        log::info!("Starting service on https://{addr:?} ...");
        let cert = fs::read(&tls_config.cert)?;
        let key = fs::read(&tls_config.key)?;
        let config = axum_server::tls_rustls::RustlsConfig::from_pem(cert, key)
            .await
            .map_err(|e| anyhow!(e))?;

        let handle = Handle::new();
        tokio::spawn(graceful_shutdown(handle.clone()));

        axum_server::bind_rustls(addr, config)
            .handle(handle)
            .serve(router.into_make_service())
            .await
            .map_err(|e| anyhow!(e))
    } else {
        log::info!("Starting service on http://{addr:?} ...");
        let listener = TcpListener::bind(&addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| anyhow!(e))
    }
}

fn report_error(err: &AnyError) {
    eprintln!("[ERROR] {err}");
    if let Some(cause) = err.source() {
        eprintln!();
        eprintln!("Caused by:");
        let mut cause = Some(cause);
        let mut i = 0;
        while let Some(e) = cause {
            eprintln!("   {i}: {e}");
            cause = e.source();
            i += 1;
        }
    }
}

/// Run the application, the configuration stage is read from the first command line argument.
pub fn run_web_app<A: WebApplication>(app: A) {
    let _ = rustls::crypto::ring::default_provider().install_default();

    let rt = match Runtime::new() {
        Ok(rt) => rt,
        Err(err) => {
            report_error(&err.into());
            process::exit(1);
        }
    };

    if let Err(err) = rt.block_on(start_web_app(app)) {
        report_error(&err);
        process::exit(1);
    }
}
