//! JSON intake API.
//!
//! - `POST /api/quote`      create a quote from a form draft
//! - `GET  /api/quotes`     list stored quotes in insertion order
//! - `GET  /api/quote/{id}` fetch one quote
//! - `GET  /api/health`     liveness probe

use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header::CONTENT_TYPE, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::error;
use uuid::Uuid;

use ozunlu_core::domain::quote::{QuoteRecord, QuoteRequest};
use ozunlu_core::errors::{ApplicationError, DomainError, InterfaceError, INTERNAL_ERROR_MESSAGE};
use ozunlu_core::form::IntakeEnvelope;

use crate::health::health;
use crate::intake::QuoteIntake;

pub const CREATED_MESSAGE: &str = "Your quote request has been received.";

#[derive(Clone)]
pub struct ApiState {
    intake: Arc<QuoteIntake>,
}

#[derive(Debug)]
pub struct ApiError(InterfaceError);

impl From<InterfaceError> for ApiError {
    fn from(value: InterfaceError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
            InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(IntakeEnvelope::<()>::failure(self.0.user_message()))).into_response()
    }
}

pub fn routes(intake: Arc<QuoteIntake>) -> Router {
    Router::new()
        .route("/api/quote", post(create_quote))
        .route("/api/quotes", get(list_quotes))
        .route("/api/quote/{id}", get(get_quote))
        .route("/api/health", get(health))
        .with_state(ApiState { intake })
}

/// Full application: routes plus panic recovery, request tracing and a
/// single-origin CORS policy that allows credentials.
pub fn app(intake: Arc<QuoteIntake>, allowed_origin: &str) -> anyhow::Result<Router> {
    let origin = HeaderValue::from_str(allowed_origin)?;
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list([origin]))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    Ok(routes(intake)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(cors))
}

async fn create_quote(
    State(state): State<ApiState>,
    payload: Result<Json<QuoteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<IntakeEnvelope<QuoteRecord>>), ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let Json(request) = payload.map_err(|rejection| {
        ApplicationError::from(DomainError::MalformedPayload(rejection.body_text()))
            .into_interface(correlation_id.clone())
    })?;

    let record = state
        .intake
        .create(request, &correlation_id)
        .await
        .map_err(|error| error.into_interface(correlation_id.clone()))?;
    Ok((StatusCode::CREATED, Json(IntakeEnvelope::ok_with_message(CREATED_MESSAGE, record))))
}

async fn list_quotes(
    State(state): State<ApiState>,
) -> Result<Json<IntakeEnvelope<Vec<QuoteRecord>>>, ApiError> {
    let quotes = state
        .intake
        .list()
        .await
        .map_err(|error| error.into_interface(Uuid::new_v4().to_string()))?;
    Ok(Json(IntakeEnvelope::ok(quotes)))
}

async fn get_quote(
    Path(id): Path<String>,
    State(state): State<ApiState>,
) -> Result<Json<IntakeEnvelope<QuoteRecord>>, ApiError> {
    let quote =
        state.intake.get(&id).await.map_err(|error| error.into_interface(Uuid::new_v4().to_string()))?;
    Ok(Json(IntakeEnvelope::ok(quote)))
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let correlation_id = Uuid::new_v4().to_string();
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("non-string panic payload");
    error!(
        event_name = "system.http.panic",
        correlation_id = %correlation_id,
        quote_id = "unknown",
        detail,
        "request handler panicked"
    );
    ApiError(InterfaceError::Internal { message: INTERNAL_ERROR_MESSAGE.to_string(), correlation_id })
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use ozunlu_core::domain::product::{PaymentMethod, ProductType};
    use ozunlu_core::domain::quote::{QuoteId, QuoteRecord, QuoteRequest};
    use ozunlu_core::errors::{INTERNAL_ERROR_MESSAGE, NOT_FOUND_MESSAGE, REQUIRED_FIELDS_MESSAGE};
    use ozunlu_core::form::{
        classify_response, FormField, FormSession, FormState, QuoteIntakeClient, SubmitError,
        SubmitOutcome,
    };
    use ozunlu_db::{InMemoryQuoteRepository, QuoteRepository, RepositoryError};

    use super::{app, CREATED_MESSAGE};
    use crate::intake::QuoteIntake;

    const ORIGIN: &str = "http://localhost:3000";

    fn test_app() -> Router {
        let intake = QuoteIntake::new(Arc::new(InMemoryQuoteRepository::default()));
        app(Arc::new(intake), ORIGIN).expect("valid origin")
    }

    fn damper_payload() -> Value {
        json!({
            "type": "damper",
            "brand": "Mercedes",
            "model": "4140",
            "cargoType": "Hafriyat",
            "thickness": "8mm / 6mm",
            "volumeM3": "18",
            "companyName": "Acme",
            "contactPhone": "0555",
            "email": "a@b.com",
            "contactPerson": "Jane"
        })
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.expect("body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, body)
    }

    fn post_json(body: &Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/quote")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).expect("request")
    }

    #[tokio::test]
    async fn create_returns_201_with_the_stored_record() {
        let app = test_app();
        let (status, body) = send(&app, post_json(&damper_payload())).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["message"], json!(CREATED_MESSAGE));
        assert_eq!(body["data"]["type"], json!("damper"));
        assert_eq!(body["data"]["cargoType"], json!("Hafriyat"));
        assert_eq!(body["data"]["paymentMethod"], json!("unspecified"));
        assert_eq!(body["data"]["quantity"], json!("1"));
        assert!(body["data"]["id"].is_i64());
        assert!(body["data"]["createdAt"].as_str().is_some_and(|value| value.ends_with('Z')));
    }

    #[tokio::test]
    async fn created_quote_reads_back_unchanged() {
        let app = test_app();
        let (_, created) = send(&app, post_json(&damper_payload())).await;
        let id = created["data"]["id"].as_i64().expect("numeric id");

        for _ in 0..2 {
            let (status, fetched) = send(&app, get(&format!("/api/quote/{id}"))).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(fetched["success"], json!(true));
            assert_eq!(fetched["data"], created["data"]);
        }
    }

    #[tokio::test]
    async fn dorse_quotes_null_out_chassis_details() {
        let app = test_app();
        let mut payload = damper_payload();
        payload["type"] = json!("dorse");

        let (status, body) = send(&app, post_json(&payload)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["brand"], Value::Null);
        assert_eq!(body["data"]["model"], Value::Null);
        assert_eq!(body["data"]["cargoType"], Value::Null);
    }

    #[tokio::test]
    async fn missing_company_name_is_a_400_envelope() {
        let app = test_app();
        let mut payload = damper_payload();
        payload.as_object_mut().expect("object").remove("companyName");

        let (status, body) = send(&app, post_json(&payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "success": false, "message": REQUIRED_FIELDS_MESSAGE }));

        let (_, listed) = send(&app, get("/api/quotes")).await;
        assert_eq!(listed["data"], json!([]));
    }

    #[tokio::test]
    async fn unknown_type_and_malformed_json_are_400_envelopes() {
        let app = test_app();
        let mut payload = damper_payload();
        payload["type"] = json!("tanker");
        let (status, body) = send(&app, post_json(&payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));

        let malformed = Request::builder()
            .method(Method::POST)
            .uri("/api/quote")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .expect("request");
        let (status, body) = send(&app, malformed).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn wrongly_typed_fields_are_400_envelopes() {
        let app = test_app();
        let mut payload = damper_payload();
        payload["volumeM3"] = json!(30);

        let (status, body) = send(&app, post_json(&payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));
        assert!(body["message"].as_str().is_some_and(|message| !message.is_empty()));

        let (_, listed) = send(&app, get("/api/quotes")).await;
        assert_eq!(listed["data"], json!([]));
    }

    #[tokio::test]
    async fn successive_creates_get_distinct_ids_and_list_in_order() {
        let app = test_app();
        let (_, first) = send(&app, post_json(&damper_payload())).await;
        let mut second_payload = damper_payload();
        second_payload["companyName"] = json!("Beta");
        let (_, second) = send(&app, post_json(&second_payload)).await;

        assert_ne!(first["data"]["id"], second["data"]["id"]);

        let (status, listed) = send(&app, get("/api/quotes")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed["success"], json!(true));
        assert_eq!(listed["data"], json!([first["data"], second["data"]]));
    }

    #[tokio::test]
    async fn unknown_quote_ids_are_404_envelopes() {
        let app = test_app();
        for uri in ["/api/quote/1760000000000", "/api/quote/not-a-number"] {
            let (status, body) = send(&app, get(uri)).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body, json!({ "success": false, "message": NOT_FOUND_MESSAGE }));
        }
    }

    #[tokio::test]
    async fn health_is_always_ok_with_fresh_timestamps() {
        let app = test_app();
        let (status, first) = send(&app, get("/api/health")).await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let (_, second) = send(&app, get("/api/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["status"], json!("ok"));
        assert_eq!(second["status"], json!("ok"));
        assert_ne!(first["timestamp"], second["timestamp"]);
    }

    #[tokio::test]
    async fn cors_allows_only_the_configured_origin_with_credentials() {
        let app = test_app();
        let preflight = |origin: &str| {
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/quote")
                .header(header::ORIGIN, origin)
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .expect("request")
        };

        let allowed = app.clone().oneshot(preflight(ORIGIN)).await.expect("response");
        let headers = allowed.headers();
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).and_then(|v| v.to_str().ok()),
            Some(ORIGIN)
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).and_then(|v| v.to_str().ok()),
            Some("true")
        );

        let denied = app.clone().oneshot(preflight("http://evil.example")).await.expect("response");
        assert!(denied.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    struct FailingRepository;

    #[async_trait]
    impl QuoteRepository for FailingRepository {
        async fn insert(&self, _record: QuoteRecord) -> Result<(), RepositoryError> {
            Err(RepositoryError::Decode("disk unavailable".to_string()))
        }

        async fn list(&self) -> Result<Vec<QuoteRecord>, RepositoryError> {
            panic!("list blew up");
        }

        async fn find_by_id(&self, _id: QuoteId) -> Result<Option<QuoteRecord>, RepositoryError> {
            Ok(None)
        }

        async fn latest_id(&self) -> Result<Option<QuoteId>, RepositoryError> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn storage_failures_and_panics_become_500_envelopes() {
        let intake = QuoteIntake::new(Arc::new(FailingRepository));
        let app = app(Arc::new(intake), ORIGIN).expect("valid origin");

        let (status, body) = send(&app, post_json(&damper_payload())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "success": false, "message": INTERNAL_ERROR_MESSAGE }));

        let (status, body) = send(&app, get("/api/quotes")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "success": false, "message": INTERNAL_ERROR_MESSAGE }));

        let (status, _) = send(&app, get("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
    }

    /// Drives the router in-process the way the HTTP client would.
    struct RouterClient {
        app: Router,
    }

    #[async_trait]
    impl QuoteIntakeClient for RouterClient {
        async fn create_quote(&self, request: &QuoteRequest) -> Result<QuoteRecord, SubmitError> {
            let body = serde_json::to_vec(request)
                .map_err(|error| SubmitError::Connectivity(error.to_string()))?;
            let request = Request::builder()
                .method(Method::POST)
                .uri("/api/quote")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .map_err(|error| SubmitError::Connectivity(error.to_string()))?;
            let response = self
                .app
                .clone()
                .oneshot(request)
                .await
                .map_err(|error| SubmitError::Connectivity(error.to_string()))?;
            let status = response.status().as_u16();
            let bytes = to_bytes(response.into_body(), 1024 * 1024)
                .await
                .map_err(|error| SubmitError::Connectivity(error.to_string()))?;
            classify_response(status, &bytes)
        }
    }

    #[tokio::test]
    async fn dorse_form_submission_end_to_end() {
        let client = RouterClient { app: test_app() };
        let mut session = FormSession::new();
        session.select_type(ProductType::Dorse).expect("select");

        session.set_field(FormField::VolumeM3, "30").expect("volume");
        session.set_field(FormField::Thickness, "5mm / 4mm").expect("thickness");
        session.set_field(FormField::PaymentMethod, PaymentMethod::Upfront.as_str()).expect("pay");
        assert!(!session.is_submittable());
        session.set_field(FormField::CompanyName, "Acme").expect("company");
        session.set_field(FormField::ContactPhone, "0555").expect("phone");
        session.set_field(FormField::Email, "a@b.com").expect("email");
        session.set_field(FormField::ContactPerson, "Jane").expect("person");
        assert!(session.is_submittable());

        let outcome = session.submit(&client).await;
        let SubmitOutcome::Submitted(record) = outcome else {
            panic!("expected a created quote, got {outcome:?}");
        };
        assert_eq!(record.product_type, ProductType::Dorse);
        assert_eq!(record.brand, None);
        assert_eq!(record.payment_method, "pesin");
        assert_eq!(session.state(), FormState::Submitted);
        assert_eq!(session.submitted_record(), Some(&record));

        assert_eq!(session.submit(&client).await, SubmitOutcome::Skipped);
        session.reset().expect("reset");
        assert_eq!(session.state(), FormState::Unselected);
    }

    #[tokio::test]
    async fn rejected_submission_returns_the_form_to_editing_with_the_message() {
        let client = RouterClient { app: test_app() };
        let mut session = FormSession::new();
        session.select_type(ProductType::Dorse).expect("select");
        session.set_field(FormField::VolumeM3, "30").expect("volume");
        session.set_field(FormField::Thickness, "5mm / 4mm").expect("thickness");
        session.set_field(FormField::PaymentMethod, "vadeli").expect("pay");
        session.set_field(FormField::CompanyName, "Acme").expect("company");
        session.set_field(FormField::ContactPhone, "0555").expect("phone");
        session.set_field(FormField::Email, "a@b.com").expect("email");
        session.set_field(FormField::ContactPerson, "Jane").expect("person");

        let mut request = session.begin_submit().expect("submittable");
        request.company_name = Some("   ".to_string());
        let result = client.create_quote(&request).await;
        let state = session.finish_submit(result);

        assert_eq!(state, FormState::EnteringContact);
        assert_eq!(
            session.last_error(),
            Some(&SubmitError::Rejected {
                status: 400,
                message: REQUIRED_FIELDS_MESSAGE.to_string()
            })
        );
        assert!(session.is_submittable());
    }
}
