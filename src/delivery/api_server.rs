use actix_cors::Cors;
use actix_web::dev::ServiceResponse;
use actix_web::http::header;
use actix_web::middleware::{ErrorHandlerResponse, ErrorHandlers, Logger};
use actix_web::{web, App, HttpResponse, HttpServer};
use log::{error, info};
use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::output::geolocation_port::GeolocationPort;
use crate::application::ports::output::ledger_port::LedgerPort;
use crate::application::ports::output::notification_port::Notifier;
use crate::application::use_cases::ledger_operations::LedgerOperations;
use crate::application::use_cases::visit_tracking::VisitTracker;
use crate::config::application_settings::Settings;
use crate::core::platform::manager::message_formatter::MessageFormatter;
use crate::error::{ErrorBody, StartupError, INTERNAL_SERVER_ERROR_MESSAGE};
use crate::infrastructure::adapters::notifications::telegram_notification_adapter::TelegramNotificationAdapter;
use crate::infrastructure::adapters::output::ip_api_geolocation_adapter::IpApiGeolocationAdapter;
use crate::infrastructure::adapters::output::mirror_node_ledger_adapter::MirrorNodeLedgerAdapter;

pub const NOT_FOUND_MESSAGE: &str = "Not found";

/// Everything request handlers share; built once, read-only afterwards
pub struct AppState {
    pub ledger_operations: LedgerOperations,
    pub visit_tracker: VisitTracker,
}

impl AppState {
    pub fn new(
        ledger: Arc<dyn LedgerPort>,
        geolocation: Arc<dyn GeolocationPort>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            ledger_operations: LedgerOperations::new(ledger, notifier.clone()),
            visit_tracker: VisitTracker::new(geolocation, notifier),
        }
    }
}

/// Wire the real adapters from settings
pub fn build_state(settings: &Settings) -> Result<AppState, StartupError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.request_timeout_seconds))
        .build()?;

    let formatter = Arc::new(MessageFormatter::new(settings.hedera_network)?);
    let notifier = TelegramNotificationAdapter::new(settings.telegram_adapter_config(), client.clone(), formatter);
    let ledger = MirrorNodeLedgerAdapter::new(settings.hedera_network, settings.mirror_node_url(), client.clone());
    let geolocation = IpApiGeolocationAdapter::new(&settings.geolocation_api_url, client);

    info!(
        "Using {} mirror node at {}, Telegram {}",
        settings.hedera_network,
        ledger.base_url(),
        if notifier.is_configured() { "enabled" } else { "disabled" }
    );

    Ok(AppState::new(Arc::new(ledger), Arc::new(geolocation), Arc::new(notifier)))
}

/// Rewrite 5xx responses that did not come from our handlers into the JSON error body
pub fn internal_error_handler<B>(res: ServiceResponse<B>) -> actix_web::Result<ErrorHandlerResponse<B>> {
    let is_json = res
        .response()
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map_or(false, |content_type| content_type.starts_with("application/json"));

    if is_json {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    }

    error!(
        "Unhandled error on {} {}: {}",
        res.request().method(),
        res.request().path(),
        res.status()
    );

    let status = res.status();
    let (req, _) = res.into_parts();
    let res = HttpResponse::build(status).json(ErrorBody::new(INTERNAL_SERVER_ERROR_MESSAGE));
    Ok(ErrorHandlerResponse::Response(ServiceResponse::new(req, res).map_into_right_body()))
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorBody::new(NOT_FOUND_MESSAGE))
}

/// API routes plus the JSON 404 fallback
pub fn configure_app(cfg: &mut web::ServiceConfig) {
    crate::delivery::router::configure(cfg);
    cfg.default_service(web::to(not_found));
}

pub async fn run_server(settings: Settings) -> Result<(), StartupError> {
    let state = web::Data::new(build_state(&settings)?);
    let address = format!("{}:{}", settings.server.host, settings.server.port);

    info!("Server listening on http://{}", address);

    HttpServer::new(move || {
        App::new()
            .wrap(ErrorHandlers::new().default_handler_server(internal_error_handler))
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(configure_app)
    })
    .bind(address)?
    .run()
    .await?;

    Ok(())
}
