//! Simple REST API server example for the security-token platform.
//!
//! Run with: `cargo run --example server`
//!
//! ## Endpoints
//!
//! - `POST /operations` - Execute an operation (release, sto_release, issue, transfer, repay)
//! - `GET /tokens/{spc}` - List tokens released by an issuer
//! - `GET /offerings/{spc}/{symbol}` - List offering aggregates for a symbol
//! - `GET /holders/{spc}/{symbol}` - List active token holders for a symbol
//!
//! ## Example Usage
//!
//! ```bash
//! # Release a token (caller is the platform owner)
//! curl -X POST http://localhost:3000/operations \
//!   -H "Content-Type: application/json" \
//!   -d '{"op": "release", "caller": "0x0000000000000000000000000000000000000001",
//!        "symbol": "DEMO", "spc_address": "0x000000000000000000000000000000000000000a"}'
//!
//! # Open an offering at rate 2
//! curl -X POST http://localhost:3000/operations \
//!   -H "Content-Type: application/json" \
//!   -d '{"op": "sto_release", "caller": "0x0000000000000000000000000000000000000001",
//!        "symbol": "DEMO", "spc_address": "0x000000000000000000000000000000000000000a", "rate": "2"}'
//!
//! # List holders
//! curl http://localhost:3000/holders/0x000000000000000000000000000000000000000a/DEMO
//! ```

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use sto_ledger_rs::{
    Address, SecurityTokenSummary, StError, StIssueParams, StPlatform, StReleaseParams,
    StRepaymentParams, StTransferParams, StoReleaseParams, StoValue, TokenHolder, TrexGateway,
};
use tokio::net::TcpListener;

// === Request/Response DTOs ===

/// Request body for executing operations.
///
/// Uses a tagged enum for clean JSON representation:
/// ```json
/// {"op": "issue", "caller": "0x...", "symbol": "DEMO", ...}
/// ```
///
/// Timestamps default to zero (gates open) and KYC expiry to the far
/// future when omitted, so quick demos don't need a calendar.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum OperationRequest {
    Release {
        caller: Address,
        symbol: String,
        spc_address: Address,
    },
    StoRelease {
        caller: Address,
        symbol: String,
        spc_address: Address,
        rate: Decimal,
    },
    Issue {
        caller: Address,
        symbol: String,
        spc_address: Address,
        investor: Address,
        amount: Decimal,
        #[serde(default)]
        add_permission_list: Option<bool>,
        #[serde(default)]
        sto_address: Option<Address>,
        #[serde(default)]
        can_receive_after: u64,
        #[serde(default)]
        can_send_after: u64,
        #[serde(default)]
        kyc_expiry: Option<u64>,
        #[serde(default)]
        can_buy_from_sto: Option<bool>,
    },
    Transfer {
        caller: Address,
        symbol: String,
        spc_address: Address,
        from: Address,
        to: Address,
        amount: Decimal,
        #[serde(default)]
        add_permission_list: Option<bool>,
        #[serde(default)]
        can_receive_after: u64,
        #[serde(default)]
        can_send_after: u64,
        #[serde(default)]
        kyc_expiry: Option<u64>,
        #[serde(default)]
        can_buy_from_sto: Option<bool>,
    },
    Repay {
        caller: Address,
        symbol: String,
        spc_address: Address,
        from: Address,
        amount: Decimal,
    },
}

/// Response body for errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

// === Application State ===

/// Shared application state containing the platform.
#[derive(Clone)]
pub struct AppState {
    pub platform: Arc<StPlatform>,
}

// === Error Handling ===

/// Wrapper for converting `StError` into HTTP responses.
pub struct AppError(StError);

impl From<StError> for AppError {
    fn from(err: StError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            StError::InvalidExecutor(_) => (StatusCode::FORBIDDEN, "INVALID_EXECUTOR"),
            StError::InvalidSender(_) => (StatusCode::NOT_FOUND, "INVALID_SENDER"),
            StError::InvalidTrexGatewayAddress(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "INVALID_TREX_GATEWAY")
            }
            StError::SecurityTokenOfferingNotCreated => {
                (StatusCode::NOT_FOUND, "STO_NOT_CREATED")
            }
            StError::TokenAlreadyDeployed => (StatusCode::CONFLICT, "TOKEN_ALREADY_DEPLOYED"),
            StError::AlreadyInitialized => (StatusCode::CONFLICT, "ALREADY_INITIALIZED"),
            StError::InvalidAmount => (StatusCode::BAD_REQUEST, "INVALID_AMOUNT"),
            StError::InvalidAddress { .. } => (StatusCode::BAD_REQUEST, "INVALID_ADDRESS"),
            StError::InvestorKycExpired => (StatusCode::UNPROCESSABLE_ENTITY, "KYC_EXPIRED"),
            StError::InvestorStillUnableToSend => {
                (StatusCode::UNPROCESSABLE_ENTITY, "UNABLE_TO_SEND")
            }
            StError::InvestorStillUnableToReceive => {
                (StatusCode::UNPROCESSABLE_ENTITY, "UNABLE_TO_RECEIVE")
            }
            StError::PurchaseUnauthorizedInvestor => {
                (StatusCode::UNPROCESSABLE_ENTITY, "PURCHASE_UNAUTHORIZED")
            }
            StError::InsufficientBalance => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INSUFFICIENT_BALANCE")
            }
            StError::CannotBurnMoreThanBalance => {
                (StatusCode::UNPROCESSABLE_ENTITY, "EXCESSIVE_BURN")
            }
            StError::TransferNotPossible => {
                (StatusCode::UNPROCESSABLE_ENTITY, "TRANSFER_NOT_POSSIBLE")
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}

// === Handlers ===

/// POST /operations - Execute a business operation.
async fn execute_operation(
    State(state): State<AppState>,
    Json(request): Json<OperationRequest>,
) -> Result<StatusCode, AppError> {
    let platform = &state.platform;

    match request {
        OperationRequest::Release {
            caller,
            symbol,
            spc_address,
        } => {
            platform.release(caller, StReleaseParams { symbol, spc_address })?;
        }
        OperationRequest::StoRelease {
            caller,
            symbol,
            spc_address,
            rate,
        } => {
            platform.sto_release(
                caller,
                StoReleaseParams {
                    symbol,
                    spc_address,
                    rate,
                },
            )?;
        }
        OperationRequest::Issue {
            caller,
            symbol,
            spc_address,
            investor,
            amount,
            add_permission_list,
            sto_address,
            can_receive_after,
            can_send_after,
            kyc_expiry,
            can_buy_from_sto,
        } => {
            // Default to the current offering when none is given.
            let sto_address = match sto_address {
                Some(address) => address,
                None => platform
                    .get_offerings(&symbol, spc_address)
                    .last()
                    .map(|value| value.contract_address)
                    .unwrap_or(Address::ZERO),
            };
            platform.issue(
                caller,
                StIssueParams {
                    symbol,
                    spc_address,
                    add_permission_list: add_permission_list.unwrap_or(true),
                    sto_address,
                    investor,
                    amount,
                    can_receive_after,
                    can_send_after,
                    kyc_expiry: kyc_expiry.unwrap_or(u64::MAX),
                    can_buy_from_sto: can_buy_from_sto.unwrap_or(true),
                },
            )?;
        }
        OperationRequest::Transfer {
            caller,
            symbol,
            spc_address,
            from,
            to,
            amount,
            add_permission_list,
            can_receive_after,
            can_send_after,
            kyc_expiry,
            can_buy_from_sto,
        } => {
            platform.transfer(
                caller,
                StTransferParams {
                    symbol,
                    spc_address,
                    add_permission_list: add_permission_list.unwrap_or(true),
                    from,
                    to,
                    amount,
                    can_receive_after,
                    can_send_after,
                    kyc_expiry: kyc_expiry.unwrap_or(u64::MAX),
                    can_buy_from_sto: can_buy_from_sto.unwrap_or(false),
                },
            )?;
        }
        OperationRequest::Repay {
            caller,
            symbol,
            spc_address,
            from,
            amount,
        } => {
            platform.repay(
                caller,
                StRepaymentParams {
                    symbol,
                    spc_address,
                    from,
                    amount,
                },
            )?;
        }
    }

    Ok(StatusCode::CREATED)
}

/// GET /tokens/{spc} - List tokens released by an issuer.
async fn list_tokens(
    State(state): State<AppState>,
    Path(spc): Path<Address>,
) -> Json<Vec<SecurityTokenSummary>> {
    Json(state.platform.get_security_tokens(spc))
}

/// GET /offerings/{spc}/{symbol} - List offering aggregates.
async fn list_offerings(
    State(state): State<AppState>,
    Path((spc, symbol)): Path<(Address, String)>,
) -> Json<Vec<StoValue>> {
    Json(state.platform.get_offerings(&symbol, spc))
}

/// GET /holders/{spc}/{symbol} - List active token holders.
async fn list_holders(
    State(state): State<AppState>,
    Path((spc, symbol)): Path<(Address, String)>,
) -> Json<Vec<TokenHolder>> {
    Json(state.platform.get_token_holders(&symbol, spc))
}

// === Router ===

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/operations", post(execute_operation))
        .route("/tokens/{spc}", get(list_tokens))
        .route("/offerings/{spc}/{symbol}", get(list_offerings))
        .route("/holders/{spc}/{symbol}", get(list_holders))
        .with_state(state)
}

// === Main ===

#[tokio::main]
async fn main() {
    // The demo operator owns the platform; use its address as `caller`
    // for privileged operations.
    let owner = Address::from_low_u64(1);
    let platform = StPlatform::new(owner);
    platform.initialize().expect("fresh platform");
    platform
        .set_trex_gateway(owner, Arc::new(TrexGateway::new(Address::from_low_u64(0x6a7e))))
        .expect("gateway binding");

    let state = AppState {
        platform: Arc::new(platform),
    };

    let app = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:3000").await.unwrap();
    println!("Security-token platform API running on http://127.0.0.1:3000");
    println!("Platform owner address: {owner}");
    println!();
    println!("Endpoints:");
    println!("  POST /operations               - Execute an operation");
    println!("  GET  /tokens/:spc              - List an issuer's tokens");
    println!("  GET  /offerings/:spc/:symbol   - List offering aggregates");
    println!("  GET  /holders/:spc/:symbol     - List active token holders");

    axum::serve(listener, app).await.unwrap();
}
