//! JSON-RPC 2.0 envelope and typed method calls
//!
//! Every method has a fixed params struct; the envelope is parsed into an
//! `RpcCall` variant up front, so handlers never inspect raw JSON shapes.

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

pub const JSONRPC_VERSION: &str = "2.0";

// JSON-RPC 2.0 envelope error codes
pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;

/// Incoming request envelope
#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub id: Value,
}

/// Outgoing response envelope. Exactly one of `result`/`error` is present.
#[derive(Debug, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
    pub id: Value,
}

#[derive(Debug, Serialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

impl RpcResponse {
    pub fn result(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
            id,
        }
    }
}

// ============================================================================
// Method params
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CardInfoParams {
    pub card_number: String,
    pub expire: String,
}

#[derive(Debug, Deserialize)]
pub struct TransferCreateParams {
    pub ext_id: String,
    pub sender_card_number: String,
    pub sender_card_expiry: String,
    pub sender_phone: String,
    pub receiver_card_number: String,
    pub receiver_phone: String,
    #[serde(deserialize_with = "amount_from_number_or_string")]
    pub sending_amount: Decimal,
    pub currency: String,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmTransferParams {
    pub ext_id: String,
    pub otp: String,
}

#[derive(Debug, Deserialize)]
pub struct TransferCancelParams {
    pub ext_id: String,
}

#[derive(Debug, Deserialize)]
pub struct TransferStateParams {
    pub ext_id: String,
}

#[derive(Debug, Deserialize)]
pub struct TransferFilterParams {
    pub card_number: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Amounts arrive as JSON numbers or strings; both go through exact decimal
/// parsing, never through f64.
pub fn amount_from_number_or_string<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(serde_json::Number),
        Text(String),
    }

    let text = match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => n.to_string(),
        NumberOrString::Text(s) => s.trim().to_string(),
    };

    Decimal::from_str(&text)
        .map_err(|_| serde::de::Error::custom(format!("invalid decimal amount: {}", text)))
}

// ============================================================================
// Typed dispatch
// ============================================================================

/// One variant per RPC method
#[derive(Debug)]
pub enum RpcCall {
    CardInfo(CardInfoParams),
    TransferCreate(TransferCreateParams),
    ConfirmTransfer(ConfirmTransferParams),
    TransferCancel(TransferCancelParams),
    TransferState(TransferStateParams),
    TransferFilter(TransferFilterParams),
}

/// Why an envelope did not parse into a call
#[derive(Debug)]
pub enum ParseFailure {
    UnknownMethod(String),
    BadParams(String),
}

impl RpcCall {
    pub fn parse(method: &str, params: Value) -> Result<Self, ParseFailure> {
        fn typed<T: DeserializeOwned>(params: Value) -> Result<T, ParseFailure> {
            serde_json::from_value(params).map_err(|e| ParseFailure::BadParams(e.to_string()))
        }

        match method {
            "card.info" => Ok(RpcCall::CardInfo(typed(params)?)),
            "transfer_create" => Ok(RpcCall::TransferCreate(typed(params)?)),
            "confirm_transfer" => Ok(RpcCall::ConfirmTransfer(typed(params)?)),
            "transfer_cancel" => Ok(RpcCall::TransferCancel(typed(params)?)),
            "transfer_state" => Ok(RpcCall::TransferState(typed(params)?)),
            "transfer_filter" => Ok(RpcCall::TransferFilter(typed(params)?)),
            other => Err(ParseFailure::UnknownMethod(other.to_string())),
        }
    }
}
