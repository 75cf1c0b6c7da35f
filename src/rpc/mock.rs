//! Mock card seeding route
//!
//! [SECURITY] Compiled only with the `mock-api` feature; production builds
//! use `--no-default-features`. Lets local and CI environments register
//! card rows without a real issuing pipeline.

use axum::{Json, extract::State, http::StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;

use crate::card::{Card, CardInfo, CardNumber, CardStatus, ExpiryDate};

use super::envelope::{RpcError, amount_from_number_or_string};
use super::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MockCardRequest {
    pub card_number: String,
    pub expire: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(deserialize_with = "amount_from_number_or_string")]
    pub balance: Decimal,
}

fn default_status() -> String {
    "active".to_string()
}

/// POST /internal/mock/card
///
/// Upserts a card row and returns its masked view.
pub async fn mock_upsert_card(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MockCardRequest>,
) -> Result<Json<CardInfo>, (StatusCode, Json<RpcError>)> {
    let number = CardNumber::new(&req.card_number).map_err(bad_request)?;
    let expiry = ExpiryDate::parse(&req.expire).map_err(bad_request)?;
    let status = CardStatus::parse(&req.status).ok_or_else(|| {
        bad_request(format!(
            "invalid status '{}', expected active|inactive|expired",
            req.status
        ))
    })?;
    if req.balance < Decimal::ZERO {
        return Err(bad_request("balance must not be negative"));
    }

    let card = Card {
        card_number: number.as_str().to_string(),
        expire: expiry.to_string(),
        phone: req.phone,
        status,
        balance: req.balance,
        version: 0,
    };

    state.registry.upsert(&card).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(RpcError {
                code: 500,
                message: e.public_message(),
            }),
        )
    })?;

    tracing::info!(card = %card.masked_number(), "Mock card upserted");
    Ok(Json(card.info()))
}

fn bad_request(message: impl ToString) -> (StatusCode, Json<RpcError>) {
    (
        StatusCode::BAD_REQUEST,
        Json(RpcError {
            code: 400,
            message: message.to_string(),
        }),
    )
}
