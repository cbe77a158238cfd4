// src/delivery/router.rs
use actix_web::error::JsonPayloadError;
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::application::use_cases::ledger_operations::{
    AccountBalance, AllowanceRequest, TransactionReceipt, TransferRequest,
};
use crate::application::use_cases::visit_tracking::{
    VisitOutcome, VisitRequest, LOCATION_UNKNOWN_MESSAGE, VISIT_TRACKED_MESSAGE,
};
use crate::delivery::api_server::AppState;
use crate::error::{ApiError, ErrorBody};

/// Used when neither proxy headers nor the socket reveal the caller
pub const FALLBACK_CLIENT_IP: &str = "127.0.0.1";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub success: bool,
    pub message: String,
    pub transaction_id: String,
}

impl From<TransactionReceipt> for TransactionResponse {
    fn from(receipt: TransactionReceipt) -> Self {
        Self {
            success: true,
            message: receipt.message,
            transaction_id: receipt.transaction_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VisitResponse {
    pub success: bool,
    pub message: String,
    pub location: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub success: bool,
    pub account_id: String,
    pub balance: String,
    pub balance_in_hbar: f64,
}

impl From<AccountBalance> for BalanceResponse {
    fn from(balance: AccountBalance) -> Self {
        Self {
            success: true,
            account_id: balance.account_id,
            balance: balance.balance,
            balance_in_hbar: balance.balance_in_hbar,
        }
    }
}

/// Caller address: first `X-Forwarded-For` hop, then `X-Real-IP`, then the socket peer
pub fn client_ip(req: &HttpRequest) -> String {
    let forwarded = header_text(req, "x-forwarded-for").and_then(|value| value.split(',').next());

    [forwarded, header_text(req, "x-real-ip")]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|ip| !ip.is_empty())
        .map(str::to_string)
        .or_else(|| req.peer_addr().map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| FALLBACK_CLIENT_IP.to_string())
}

fn header_text<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|value| value.to_str().ok())
}

async fn approve_allowance(
    state: web::Data<AppState>,
    body: web::Json<AllowanceRequest>,
) -> Result<HttpResponse, ApiError> {
    let receipt = state.ledger_operations.approve_allowance(&body).await?;
    Ok(HttpResponse::Ok().json(TransactionResponse::from(receipt)))
}

async fn transfer(
    state: web::Data<AppState>,
    body: web::Json<TransferRequest>,
) -> Result<HttpResponse, ApiError> {
    let receipt = state.ledger_operations.transfer(&body).await?;
    Ok(HttpResponse::Ok().json(TransactionResponse::from(receipt)))
}

async fn track_visit(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let visit = VisitRequest {
        ip: client_ip(&req),
        user_agent: header_text(&req, header::USER_AGENT.as_str()).map(str::to_string),
    };

    match state.visit_tracker.track(&visit).await? {
        VisitOutcome::Tracked { location } => Ok(HttpResponse::Ok().json(VisitResponse {
            success: true,
            message: VISIT_TRACKED_MESSAGE.to_string(),
            location,
        })),
        VisitOutcome::Unlocated => Ok(HttpResponse::Ok().json(ErrorBody::new(LOCATION_UNKNOWN_MESSAGE))),
    }
}

/// Lookup failures are reported in the body with a 200
async fn account_balance(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    match state.ledger_operations.account_balance(&path).await {
        Ok(balance) => HttpResponse::Ok().json(BalanceResponse::from(balance)),
        Err(e) => HttpResponse::Ok().json(ErrorBody::new(e.to_string())),
    }
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Validation(format!("Invalid JSON body: {}", err)).into()
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .service(
            web::scope("/api")
                .route("/allowance", web::post().to(approve_allowance))
                .route("/transfer", web::post().to(transfer))
                .route("/track-visit", web::post().to(track_visit))
                .route("/balance/{account_id}", web::get().to(account_balance)),
        );
}
