use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::workflows::application::{application_router, CardType};
use crate::workflows::registry::RegistryError;

fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(payload) => builder
            .header(axum::http::header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request builds"),
        None => builder.body(Body::empty()).expect("request builds"),
    }
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn create_route_starts_a_session() {
    let (service, _) = build_service();
    let router = application_router(service.clone());

    let response = router
        .oneshot(request(
            Method::POST,
            "/api/v1/wizards",
            Some(json!({ "card_type": "carers" })),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["handle"], json!(1));
    assert_eq!(body["card_type"], json!("carers"));
    assert_eq!(body["current_step"], json!(1));
    assert_eq!(body["total_steps"], json!(5));
    assert_eq!(service.active_sessions(), 1);
}

#[tokio::test]
async fn unknown_handles_are_not_found() {
    let (service, _) = build_service();
    let response = application_router(service)
        .oneshot(request(Method::GET, "/api/v1/wizards/77", None))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_fields_are_bad_requests() {
    let (service, _) = build_service();
    let (handle, _) = service.start(CardType::Disability).expect("session started");

    let response = application_router(service)
        .oneshot(request(
            Method::PUT,
            &format!("/api/v1/wizards/{handle}/fields"),
            Some(json!({ "favouriteColour": "green" })),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn incomplete_step_lists_missing_fields() {
    let (service, _) = build_service();
    let (handle, _) = service.start(CardType::Disability).expect("session started");
    let router = application_router(service);

    let response = router
        .clone()
        .oneshot(request(
            Method::PUT,
            &format!("/api/v1/wizards/{handle}/fields"),
            Some(json!({
                "firstName": "Amina",
                "lastName": "Al Mansoori",
                "dateOfBirth": "1990-04-12",
                "gender": "Female",
                "nationality": "Emirati"
            })),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(request(
            Method::POST,
            &format!("/api/v1/wizards/{handle}/next"),
            None,
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["step"], json!(1));
    assert_eq!(body["missing"], json!(["Emirates ID"]));
}

#[tokio::test]
async fn invalid_base64_is_rejected() {
    let (service, _) = build_service();
    let (handle, _) = service.start(CardType::Disability).expect("session started");

    let response = application_router(service)
        .oneshot(request(
            Method::POST,
            &format!("/api/v1/wizards/{handle}/documents"),
            Some(json!({ "file_name": "report.pdf", "data_base64": "not base64!!" })),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn documents_attach_and_detach_on_the_category_step() {
    let (service, _) = build_service();
    let (handle, _) = service.start(CardType::Disability).expect("session started");
    service
        .update_fields(
            handle,
            personal_details()
                .into_iter()
                .map(|(field, value)| (field.key(), value)),
        )
        .expect("personal fields");
    service.next(handle).expect("personal step complete");
    let router = application_router(service);

    let response = router
        .clone()
        .oneshot(request(
            Method::POST,
            &format!("/api/v1/wizards/{handle}/documents"),
            Some(json!({ "file_name": "report.pdf", "data_base64": "JVBERi0xLjQ=" })),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["documents"][0]["content_type"], json!("application/pdf"));
    assert_eq!(body["documents"][0]["size"], json!(8));

    let response = router
        .clone()
        .oneshot(request(
            Method::DELETE,
            &format!("/api/v1/wizards/{handle}/documents/3"),
            None,
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = router
        .oneshot(request(
            Method::DELETE,
            &format!("/api/v1/wizards/{handle}/documents/0"),
            None,
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["documents"], json!([]));
}

#[tokio::test]
async fn submit_without_open_gate_conflicts() {
    let (service, registry) = build_service();
    let handle = session_at_review(&service, CardType::CustomerSupport, &[]);

    let response = application_router(service)
        .oneshot(request(
            Method::POST,
            &format!("/api/v1/wizards/{handle}/submit"),
            None,
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(registry.create_count(), 0);
}

#[tokio::test]
async fn confirmation_then_submit_returns_the_tracking_id() {
    let (service, _) = build_service();
    let handle = session_at_review(&service, CardType::Disability, &["report.pdf"]);
    let router = application_router(service);

    let response = router
        .clone()
        .oneshot(request(
            Method::POST,
            &format!("/api/v1/wizards/{handle}/confirmation"),
            None,
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let summary = json_body(response).await;
    assert_eq!(summary["sections"][0]["label"], json!("Personal Information"));

    let response = router
        .oneshot(request(
            Method::POST,
            &format!("/api/v1/wizards/{handle}/submit"),
            None,
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["application_id"], json!(41));
    assert_eq!(body["uploads"][0]["status"], json!("uploaded"));
}

#[tokio::test]
async fn registry_failure_is_a_bad_gateway_with_a_generic_message() {
    let (service, registry) = build_service();
    let handle = session_at_review(&service, CardType::Disability, &["report.pdf"]);
    service.open_confirmation(handle).expect("gate opens");
    registry.fail_creates_with(RegistryError::Rejected {
        status: 500,
        message: "stack trace from the database".to_string(),
    });

    let response = application_router(service.clone())
        .oneshot(request(
            Method::POST,
            &format!("/api/v1/wizards/{handle}/submit"),
            None,
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(response).await;
    assert_eq!(
        body["error"],
        json!("Failed to submit application. Please try again.")
    );
    assert_eq!(body["retry"], json!(true));
    assert_eq!(service.view(handle).expect("session kept").stage, "confirming");
}

#[tokio::test]
async fn unreadable_registry_reply_tells_the_client_not_to_resubmit() {
    let (service, registry) = build_service();
    let handle = session_at_review(&service, CardType::CustomerSupport, &[]);
    service.open_confirmation(handle).expect("gate opens");
    registry.garble_create_replies();

    let response = application_router(service.clone())
        .oneshot(request(
            Method::POST,
            &format!("/api/v1/wizards/{handle}/submit"),
            None,
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(response).await;
    assert_eq!(body["retry"], json!(false));
    assert_eq!(service.view(handle).expect("session kept").stage, "unconfirmed");

    let response = application_router(service)
        .oneshot(request(
            Method::POST,
            &format!("/api/v1/wizards/{handle}/submit"),
            None,
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(registry.create_count(), 1);
}

#[tokio::test]
async fn abandon_route_drops_the_session() {
    let (service, _) = build_service();
    let (handle, _) = service.start(CardType::Carers).expect("session started");

    let response = application_router(service.clone())
        .oneshot(request(
            Method::DELETE,
            &format!("/api/v1/wizards/{handle}"),
            None,
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(service.active_sessions(), 0);
}
