//! HTTP surface for the intake relay.

use crate::error::IntakeError;
use crate::intake::extract::submission_from_multipart;
use crate::intake::MAX_FILE_BYTES;
use crate::mailer::{Mailer, SendReceipt};
use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::Method;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

/// Whole-body ceiling: five full slots plus text-field overhead.
const MAX_REQUEST_BYTES: usize = 6 * MAX_FILE_BYTES;

/// Resolved outbound delivery: the provider client plus addressing.
pub struct Outbound<M> {
    pub mailer: M,
    pub from_address: String,
    pub to_address: String,
}

/// Shared request state. `outbound` is `None` when the environment is
/// missing any of the delivery trio; every submission then fails with the
/// configuration error and no provider call is made.
pub struct IntakeState<M> {
    pub outbound: Option<Arc<Outbound<M>>>,
}

impl<M> Clone for IntakeState<M> {
    fn clone(&self) -> Self {
        Self {
            outbound: self.outbound.clone(),
        }
    }
}

/// Router builder exposing the liveness probe and the intake endpoint.
/// Any origin may call the service (browser form frontends).
pub fn intake_router<M>(state: IntakeState<M>) -> Router
where
    M: Mailer + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(healthcheck))
        .route("/apply", post(apply_handler::<M>))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .layer(cors)
        .with_state(state)
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

pub(crate) async fn apply_handler<M>(
    State(state): State<IntakeState<M>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response
where
    M: Mailer + 'static,
{
    match relay_submission(&state, multipart).await {
        Ok(receipt) => {
            info!(message_id = %receipt.message_id, "application relayed");
            Json(json!({ "ok": true })).into_response()
        }
        Err(err) => {
            error!(error = %err, "application relay failed");
            err.into_response()
        }
    }
}

async fn relay_submission<M>(
    state: &IntakeState<M>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<SendReceipt, IntakeError>
where
    M: Mailer,
{
    let outbound = state
        .outbound
        .as_ref()
        .ok_or(IntakeError::MissingDeliveryConfig)?;

    let mut multipart = multipart?;
    let submission = submission_from_multipart(&mut multipart).await?;
    info!(
        fields = ?submission.fields.present_names(),
        files = ?submission.uploads.present_slots(),
        "application received"
    );

    let email = submission.to_email(&outbound.from_address, &outbound.to_address);
    info!(
        attachments = email.attachments.as_ref().map_or(0, Vec::len),
        "submission composed"
    );

    let receipt = outbound.mailer.send(&email).await?;
    Ok(receipt)
}
