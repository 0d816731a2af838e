//! # Request Handlers
//!
//! Axum handlers for the create-charge and status proxies.
//! Request bodies and gateway answers are passed through verbatim; failures
//! are re-shaped into the `{ error, details? }` envelope with the upstream
//! status preserved.

use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use pix_core::GatewayError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, instrument};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Query for the status proxy
#[derive(Debug, Deserialize)]
pub struct CheckPaymentQuery {
    #[serde(default)]
    pub external_id: Option<String>,
}

/// Error envelope shared by both proxies
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorEnvelope {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

pub type ApiResult<T> = Result<T, (StatusCode, Json<ErrorEnvelope>)>;

fn gateway_error_to_response(err: GatewayError) -> (StatusCode, Json<ErrorEnvelope>) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut envelope = ErrorEnvelope::new(err.user_message());
    if let Some(details) = err.details() {
        envelope = envelope.with_details(details.clone());
    }

    (status, Json(envelope))
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "pix-checkout",
        "version": env!("CARGO_PKG_VERSION"),
        "gateway_configured": state.has_gateway(),
    }))
}

/// Create-charge proxy: `POST /api/create-pix`
///
/// Any well-formed JSON body is forwarded unchanged; the gateway owns
/// payload validation.
#[instrument(skip(state, payload))]
pub async fn create_pix(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let gateway = state.gateway().map_err(|e| {
        error!("Refusing to create charge: {}", e);
        gateway_error_to_response(e)
    })?;

    let Json(payload) = payload.map_err(|rejection| {
        gateway_error_to_response(GatewayError::Validation(rejection.body_text()))
    })?;

    info!(
        "Creating PIX charge via {}: external_id={}, amount={}",
        gateway.provider_name(),
        payload["external_id"],
        payload["amount"]
    );

    let charge = gateway.create_charge(&payload).await.map_err(|e| {
        error!("Failed to create PIX charge: {}", e);
        gateway_error_to_response(e)
    })?;

    Ok(Json(charge.into_body()))
}

/// Status proxy: `GET /api/check-payment?external_id=<id>`
#[instrument(skip(state, query))]
pub async fn check_payment(
    State(state): State<AppState>,
    Query(query): Query<CheckPaymentQuery>,
) -> ApiResult<Json<Value>> {
    let gateway = state.gateway().map_err(gateway_error_to_response)?;

    let external_id = query
        .external_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| {
            gateway_error_to_response(GatewayError::Validation(
                "external_id is required".to_string(),
            ))
        })?;

    let charge = gateway.charge_status(&external_id).await.map_err(|e| {
        if e.is_not_found() {
            debug!("Charge {} not visible upstream yet", external_id);
        } else {
            error!(
                "Failed to check payment {} via {}: {}",
                external_id,
                gateway.provider_name(),
                e
            );
        }
        gateway_error_to_response(e)
    })?;

    debug!("Charge {} status={}", external_id, charge.status);

    Ok(Json(charge.into_body()))
}

/// List checkout plans
pub async fn list_plans(State(state): State<AppState>) -> impl IntoResponse {
    let plans: Vec<_> = state.plans.active_plans().collect();
    Json(serde_json::json!({
        "plans": plans,
        "count": plans.len()
    }))
}

/// Get a single checkout plan
pub async fn get_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let plan = state.plans.get(&plan_id).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorEnvelope::new(format!("Plan not found: {}", plan_id))),
        )
    })?;

    Ok(Json(plan.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_omits_missing_details() {
        let body = serde_json::to_value(ErrorEnvelope::new("boom")).unwrap();
        assert_eq!(body, json!({"error": "boom"}));
    }

    #[test]
    fn test_auth_error_conversion() {
        let (status, Json(envelope)) = gateway_error_to_response(GatewayError::Auth {
            details: json!({"message": "forbidden"}),
        });

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(envelope.error.contains("Authentication"));
        assert_eq!(envelope.details, Some(json!({"message": "forbidden"})));
    }

    #[test]
    fn test_upstream_status_passthrough() {
        let (status, _) = gateway_error_to_response(GatewayError::Upstream {
            status: 422,
            details: Value::Null,
        });
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, Json(envelope)) =
            gateway_error_to_response(GatewayError::Transport("connection reset".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(envelope.details.is_none());
    }
}
