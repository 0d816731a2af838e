//! # Routes
//!
//! Axum router configuration for the PIX proxies.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - POST /api/create-pix - Create-charge proxy
/// - GET  /api/check-payment?external_id= - Status proxy
/// - GET  /api/plans - List checkout plans
/// - GET  /api/plans/{plan_id} - Get a checkout plan
/// - GET  /health - Health check
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/create-pix", post(handlers::create_pix))
        .route("/check-payment", get(handlers::check_payment))
        .route("/plans", get(handlers::list_plans))
        .route("/plans/{plan_id}", get(handlers::get_plan));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppConfig;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use pix_buckpay::{BuckpayConfig, BuckpayGateway};
    use pix_core::{BoxedGateway, ChargeResult, GatewayResult, PixGateway, PlanCatalog};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn charge_body(external_id: &str) -> Value {
        json!({
            "external_id": external_id,
            "payment_method": "pix",
            "amount": 3987,
            "buyer": { "name": "Cliente", "email": "cliente@email.com", "document": "00000000000" }
        })
    }

    fn server_with(gateway: Option<BoxedGateway>) -> TestServer {
        let state = AppState::from_parts(gateway, PlanCatalog::builtin(), AppConfig::default());
        TestServer::new(create_router(state)).unwrap()
    }

    fn buckpay_for(upstream: &MockServer) -> BoxedGateway {
        let config = BuckpayConfig::new("test-key").with_api_base_url(upstream.uri());
        Arc::new(BuckpayGateway::new(config).unwrap())
    }

    /// Counts calls so tests can prove nothing was forwarded
    #[derive(Default)]
    struct CountingGateway {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PixGateway for CountingGateway {
        async fn create_charge(&self, _payload: &Value) -> GatewayResult<ChargeResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ChargeResult::from_body(json!({"status": "pending"})))
        }

        async fn charge_status(&self, _external_id: &str) -> GatewayResult<ChargeResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ChargeResult::from_body(json!({"status": "pending"})))
        }

        fn provider_name(&self) -> &'static str {
            "counting"
        }
    }

    #[tokio::test]
    async fn test_health() {
        let server = server_with(None);

        let response = server.get("/health").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["gateway_configured"], false);
    }

    #[tokio::test]
    async fn test_missing_credential_on_both_proxies() {
        let server = server_with(None);

        let create = server
            .post("/api/create-pix")
            .json(&charge_body("pix-1"))
            .await;
        create.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = create.json();
        assert!(body["error"].as_str().unwrap().contains("BUCKPAY_API_KEY"));

        let status = server
            .get("/api/check-payment")
            .add_query_param("external_id", "pix-1")
            .await;
        status.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = status.json();
        assert!(body["error"].as_str().unwrap().contains("BUCKPAY_API_KEY"));
    }

    #[tokio::test]
    async fn test_missing_external_id_never_reaches_gateway() {
        let gateway = Arc::new(CountingGateway::default());
        let server = server_with(Some(gateway.clone() as BoxedGateway));

        let response = server.get("/api/check-payment").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "external_id is required");

        let blank = server
            .get("/api/check-payment")
            .add_query_param("external_id", "")
            .await;
        blank.assert_status(StatusCode::BAD_REQUEST);

        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_malformed_payload_is_validation_error() {
        let gateway = Arc::new(CountingGateway::default());
        let server = server_with(Some(gateway.clone() as BoxedGateway));

        let response = server
            .post("/api/create-pix")
            .text("{\"amount\": ")
            .content_type("application/json")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_create_pix_forwards_body_unchanged() {
        let upstream = MockServer::start().await;
        let sent = json!({
            "external_id": "pix-1",
            "payment_method": "boleto",
            "amount": "39.87",
            "buyer": { "name": "C", "email": "c@e.com", "phone": "5511999999999" },
            "product": { "id": "p1", "name": "Plano 1", "quantity": 1 },
            "utm_source": "newsletter"
        });

        Mock::given(method("POST"))
            .and(path("/v1/transactions"))
            .and(body_json(sent.clone()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "pending"})))
            .expect(1)
            .mount(&upstream)
            .await;

        let server = server_with(Some(buckpay_for(&upstream)));
        let response = server.post("/api/create-pix").json(&sent).await;
        response.assert_status_ok();

        let received = upstream.received_requests().await.unwrap();
        let forwarded: Value = serde_json::from_slice(&received[0].body).unwrap();
        assert_eq!(forwarded, sent);
    }

    #[tokio::test]
    async fn test_create_pix_passes_gateway_body_through() {
        let upstream = MockServer::start().await;
        let gateway_body = json!({
            "data": {
                "id": "tx_123",
                "status": "pending",
                "pix": { "code": "00020126580014br.gov.bcb.pix0136", "qrcode_base64": "iVBORw0KGgo=" }
            }
        });

        Mock::given(method("POST"))
            .and(path("/v1/transactions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(gateway_body.clone()))
            .expect(1)
            .mount(&upstream)
            .await;

        let server = server_with(Some(buckpay_for(&upstream)));
        let response = server
            .post("/api/create-pix")
            .json(&charge_body("pix-3987"))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body, gateway_body);
    }

    #[tokio::test]
    async fn test_create_pix_forbidden_passthrough() {
        let upstream = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/transactions"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "invalid key"})))
            .mount(&upstream)
            .await;

        let server = server_with(Some(buckpay_for(&upstream)));
        let response = server
            .post("/api/create-pix")
            .json(&charge_body("pix-403"))
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
        let body: Value = response.json();
        assert!(body["error"].as_str().unwrap().contains("Authentication"));
        assert_eq!(body["details"]["message"], "invalid key");
    }

    #[tokio::test]
    async fn test_create_pix_other_upstream_status_preserved() {
        let upstream = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/transactions"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({"message": "amount too low"})))
            .mount(&upstream)
            .await;

        let server = server_with(Some(buckpay_for(&upstream)));
        let response = server
            .post("/api/create-pix")
            .json(&charge_body("pix-422"))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(body["error"], "Unexpected error, please try again.");
        assert_eq!(body["details"]["message"], "amount too low");
    }

    #[tokio::test]
    async fn test_check_payment_statuses() {
        let upstream = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/transactions/external_id/pix-paid"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"status": "paid"}})))
            .mount(&upstream)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/transactions/external_id/pix-new"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "not found"})))
            .mount(&upstream)
            .await;

        let server = server_with(Some(buckpay_for(&upstream)));

        let paid = server
            .get("/api/check-payment")
            .add_query_param("external_id", "pix-paid")
            .await;
        paid.assert_status_ok();
        let body: Value = paid.json();
        assert_eq!(body["data"]["status"], "paid");

        let missing = server
            .get("/api/check-payment")
            .add_query_param("external_id", "pix-new")
            .await;
        missing.assert_status(StatusCode::NOT_FOUND);
        let body: Value = missing.json();
        assert_eq!(body["details"]["message"], "not found");
    }

    #[tokio::test]
    async fn test_plans() {
        let server = server_with(None);

        let list: Value = server.get("/api/plans").await.json();
        assert_eq!(list["count"], 3);

        let plan: Value = server.get("/api/plans/plano4").await.json();
        assert_eq!(plan["amount"], 2789);

        server
            .get("/api/plans/unknown")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        use axum::body::Body;
        use axum::http::Request;
        use tower::ServiceExt;

        let state = AppState::from_parts(None, PlanCatalog::builtin(), AppConfig::default());
        let response = create_router(state)
            .oneshot(Request::builder().uri("/api/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
