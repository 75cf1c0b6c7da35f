//! RPC method handlers
//!
//! One axum handler owns `POST /rpc`; it parses the envelope, dispatches
//! the typed call and maps every `TransferError` to the `{code, message}`
//! error object the contract promises. Raw card numbers never appear in
//! responses or logs; the filter view masks the receiver here.

use axum::{Json, extract::State, http::StatusCode};
use chrono::NaiveDate;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

use crate::card::{ValidationError, mask_card_number};
use crate::transfer::{CreateTransfer, TransferError, TransferState, TransferSummary};

use super::cache::load_card_cached;
use super::envelope::{
    INVALID_PARAMS, INVALID_REQUEST, JSONRPC_VERSION, METHOD_NOT_FOUND, PARSE_ERROR, ParseFailure,
    RpcCall, RpcRequest, RpcResponse,
};
use super::state::AppState;

/// POST /rpc
///
/// The body is read as text so even an unparseable payload still gets a
/// proper JSON-RPC error envelope back.
pub async fn rpc_endpoint(State(state): State<Arc<AppState>>, body: String) -> Json<RpcResponse> {
    let request: RpcRequest = match serde_json::from_str(&body) {
        Ok(r) => r,
        Err(e) => {
            return Json(RpcResponse::error(
                Value::Null,
                PARSE_ERROR,
                format!("Parse error: {}", e),
            ));
        }
    };

    if request.jsonrpc != JSONRPC_VERSION {
        return Json(RpcResponse::error(
            request.id,
            INVALID_REQUEST,
            "jsonrpc must be \"2.0\"",
        ));
    }

    let id = request.id;
    let method = request.method;
    let call = match RpcCall::parse(&method, request.params) {
        Ok(call) => call,
        Err(ParseFailure::UnknownMethod(m)) => {
            return Json(RpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", m),
            ));
        }
        Err(ParseFailure::BadParams(msg)) => {
            return Json(RpcResponse::error(
                id,
                INVALID_PARAMS,
                format!("Invalid params: {}", msg),
            ));
        }
    };

    match dispatch(&state, call).await {
        Ok(result) => Json(RpcResponse::result(id, result)),
        Err(e) => {
            debug!(method = %method, code = e.code(), "RPC call failed");
            Json(RpcResponse::error(id, e.rpc_code(), e.public_message()))
        }
    }
}

async fn dispatch(state: &AppState, call: RpcCall) -> Result<Value, TransferError> {
    match call {
        RpcCall::CardInfo(p) => {
            let info = load_card_cached(state.registry.clone(), p.card_number, p.expire).await?;
            to_value(&info)
        }

        RpcCall::TransferCreate(p) => {
            let transfer = state
                .engine
                .create(CreateTransfer {
                    ext_id: p.ext_id,
                    sender_card_number: p.sender_card_number,
                    sender_card_expiry: p.sender_card_expiry,
                    sender_phone: p.sender_phone,
                    receiver_card_number: p.receiver_card_number,
                    receiver_phone: p.receiver_phone,
                    sending_amount: p.sending_amount,
                    currency: p.currency,
                })
                .await?;
            Ok(json!({ "ext_id": transfer.ext_id, "state": transfer.state.as_str() }))
        }

        RpcCall::ConfirmTransfer(p) => {
            let transfer = state.engine.confirm(&p.ext_id, &p.otp).await?;
            Ok(json!({ "ext_id": transfer.ext_id, "state": transfer.state.as_str() }))
        }

        RpcCall::TransferCancel(p) => {
            let transfer = state.engine.cancel(&p.ext_id).await?;
            Ok(json!({ "ext_id": transfer.ext_id, "state": transfer.state.as_str() }))
        }

        RpcCall::TransferState(p) => {
            let transfer_state = state.engine.state(&p.ext_id).await?;
            Ok(json!({ "message": transfer_state.as_str() }))
        }

        RpcCall::TransferFilter(p) => {
            let start = parse_date("start_date", p.start_date.as_deref())?;
            let end = parse_date("end_date", p.end_date.as_deref())?;
            let status = parse_status(p.status.as_deref())?;
            let rows = state
                .engine
                .filter(&p.card_number, start, end, status)
                .await?;
            Ok(Value::Array(rows.iter().map(summary_to_json).collect()))
        }
    }
}

/// Filter row as the caller sees it: masked receiver, string amount,
/// minute-precision timestamp.
fn summary_to_json(summary: &TransferSummary) -> Value {
    json!({
        "ext_id": summary.ext_id,
        "amount": summary.amount.to_string(),
        "currency": summary.currency,
        "receiver": mask_card_number(&summary.receiver_card_number),
        "state": summary.state.as_str(),
        "created_at": summary.created_at.format("%Y-%m-%d %H:%M").to_string(),
    })
}

fn parse_date(
    field: &'static str,
    raw: Option<&str>,
) -> Result<Option<NaiveDate>, TransferError> {
    match raw {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                ValidationError::InvalidFormat {
                    field,
                    value: s.to_string(),
                    expected: "YYYY-MM-DD",
                }
                .into()
            }),
    }
}

fn parse_status(raw: Option<&str>) -> Result<Option<TransferState>, TransferError> {
    match raw {
        None => Ok(None),
        Some(s) => TransferState::parse(s.trim())
            .map(Some)
            .ok_or_else(|| {
                ValidationError::InvalidFormat {
                    field: "status",
                    value: s.to_string(),
                    expected: "created|confirmed|cancelled",
                }
                .into()
            }),
    }
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value, TransferError> {
    serde_json::to_value(value).map_err(|e| TransferError::Internal(e.to_string()))
}

/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    match state.db.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "timestamp_ms": now_ms })),
        ),
        Err(e) => {
            tracing::error!("[HEALTH] PostgreSQL ping failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_json_masks_receiver_and_formats_time() {
        let summary = TransferSummary {
            ext_id: "T1".to_string(),
            amount: "100.50".parse().unwrap(),
            currency: "860".to_string(),
            receiver_card_number: "8600987654321098".to_string(),
            state: TransferState::Created,
            created_at: "2026-08-25T13:07:45Z".parse().unwrap(),
        };
        let v = summary_to_json(&summary);
        assert_eq!(v["receiver"], "8600****1098");
        assert_eq!(v["amount"], "100.50");
        assert_eq!(v["created_at"], "2026-08-25 13:07");
        assert_eq!(v["state"], "created");
    }

    #[test]
    fn date_param_parsing() {
        assert_eq!(parse_date("start_date", None).unwrap(), None);
        assert_eq!(
            parse_date("start_date", Some("2026-08-25")).unwrap(),
            Some(NaiveDate::from_ymd_opt(2026, 8, 25).unwrap())
        );
        assert!(parse_date("start_date", Some("25/08/2026")).is_err());
        assert!(parse_date("end_date", Some("yesterday")).is_err());
    }

    #[test]
    fn status_param_parsing() {
        assert_eq!(parse_status(None).unwrap(), None);
        assert_eq!(
            parse_status(Some("confirmed")).unwrap(),
            Some(TransferState::Confirmed)
        );
        assert!(parse_status(Some("pending")).is_err());
    }
}
