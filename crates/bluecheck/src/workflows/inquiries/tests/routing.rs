use super::common::*;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, Request, StatusCode};
use axum::response::IntoResponse;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::workflows::inquiries::domain::{InquiryStatus, InquirySubmission};
use crate::workflows::inquiries::repository::InquiryRepository;
use crate::workflows::inquiries::router::{
    fetch_handler, list_handler, status_handler, submit_handler, ListParams,
};
use crate::workflows::inquiries::store::InMemoryInquiryStore;
use crate::workflows::inquiries::{
    inquiry_router, AdminGuard, InquiryService, InquiryServiceConfig,
};

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("serialize body")))
        .expect("request builds")
}

fn submission_json() -> Value {
    serde_json::to_value(submission()).expect("serialize submission")
}

#[tokio::test]
async fn submit_handler_returns_created_inquiry() {
    let (service, _, _) = build_service();

    let response = submit_handler::<InMemoryInquiryStore, MemoryNotifier>(
        State(Arc::new(service)),
        Ok(axum::Json(submission_json())),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("status"), Some(&json!("new")));
    assert_eq!(payload.get("inspection_type"), Some(&json!("pre-purchase")));
    assert_eq!(payload.get("preferred_date"), Some(&json!("2025-11-15")));
    assert!(payload.get("id").and_then(Value::as_str).is_some());
    assert!(payload.get("created_at").is_some());
}

#[tokio::test]
async fn submit_handler_returns_field_errors() {
    let (service, repository, _) = build_service();

    let response = submit_handler::<InMemoryInquiryStore, MemoryNotifier>(
        State(Arc::new(service)),
        Ok(axum::Json(
            serde_json::to_value(InquirySubmission {
                email: Some("bob".to_string()),
                phone: Some("call me".to_string()),
                ..InquirySubmission::default()
            })
            .expect("serialize"),
        )),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload.get("errors"),
        Some(&json!({
            "name": "name required",
            "email": "invalid email",
            "phone": "invalid phone",
            "property_address": "address required",
        }))
    );
    assert!(repository.is_empty().expect("readable"));
}

#[tokio::test]
async fn submit_handler_returns_internal_error_on_repository_failure() {
    let service = Arc::new(InquiryService::new(
        Arc::new(UnavailableRepository),
        Arc::new(MemoryNotifier::default()),
        InquiryServiceConfig::default(),
    ));

    let response = submit_handler::<UnavailableRepository, MemoryNotifier>(
        State(service),
        Ok(axum::Json(submission_json())),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn list_handler_rejects_unknown_status_filter() {
    let (service, _, _) = build_service();

    let response = list_handler::<InMemoryInquiryStore, MemoryNotifier>(
        State(Arc::new(service)),
        Query(ListParams {
            status: Some("archived".to_string()),
            limit: None,
        }),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload.get("allowed"),
        Some(&json!(["new", "contacted", "scheduled", "completed", "cancelled"]))
    );
}

#[tokio::test]
async fn list_handler_treats_all_as_no_filter() {
    let (service, _, _) = build_service();
    let service = Arc::new(service);
    service.submit(submission()).expect("submitted");

    let response = list_handler::<InMemoryInquiryStore, MemoryNotifier>(
        State(service),
        Query(ListParams {
            status: Some("all".to_string()),
            limit: None,
        }),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn fetch_handler_returns_not_found_for_unknown_id() {
    let (service, _, _) = build_service();

    let response = fetch_handler::<InMemoryInquiryStore, MemoryNotifier>(
        State(Arc::new(service)),
        Path("missing".to_string()),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("inquiry_id"), Some(&json!("missing")));
}

#[tokio::test]
async fn status_handler_rejects_bogus_status() {
    let (service, repository, _) = build_service();
    let service = Arc::new(service);
    let inquiry = service.submit(submission()).expect("submitted");

    let response = status_handler::<InMemoryInquiryStore, MemoryNotifier>(
        State(service),
        Path(inquiry.id.0.clone()),
        Ok(axum::Json(json!({ "status": "bogus" }))),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let stored = repository
        .fetch(&inquiry.id)
        .expect("fetch")
        .expect("present");
    assert_eq!(stored.status, InquiryStatus::New);
}

#[tokio::test]
async fn routes_cover_the_dashboard_flow() {
    let (service, _, notifier) = build_service();
    let router = router_with_service(service, AdminGuard::open());

    let created = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/contact/inquiry",
            serde_json::to_value(submission()).expect("serialize"),
        ))
        .await
        .expect("route executes");
    assert_eq!(created.status(), StatusCode::CREATED);
    let created = read_json_body(created).await;
    let id = created
        .get("id")
        .and_then(Value::as_str)
        .expect("id present")
        .to_string();

    let patched = router
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/api/contact/inquiry/{id}/status"),
            json!({ "status": "contacted" }),
        ))
        .await
        .expect("route executes");
    assert_eq!(patched.status(), StatusCode::OK);
    assert_eq!(
        read_json_body(patched).await.get("status"),
        Some(&json!("contacted"))
    );

    let listed = router
        .clone()
        .oneshot(
            Request::get("/api/contact/inquiries?status=contacted")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(listed.status(), StatusCode::OK);
    let listed = read_json_body(listed).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    let stats = router
        .oneshot(
            Request::get("/api/contact/stats")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(stats.status(), StatusCode::OK);
    let stats = read_json_body(stats).await;
    assert_eq!(stats.get("total_inquiries"), Some(&json!(1)));
    assert_eq!(stats.pointer("/status_breakdown/contacted"), Some(&json!(1)));

    assert_eq!(notifier.events().len(), 2);
}

#[tokio::test]
async fn guarded_routes_require_bearer_token() {
    let (service, _, _) = build_service();
    let router = router_with_service(service, AdminGuard::with_token("letmein"));

    let anonymous = router
        .clone()
        .oneshot(
            Request::get("/api/contact/stats")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
    assert!(anonymous.headers().contains_key(header::WWW_AUTHENTICATE));

    let wrong = router
        .clone()
        .oneshot(
            Request::get("/api/contact/stats")
                .header(header::AUTHORIZATION, "Bearer nope")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let authorized = router
        .clone()
        .oneshot(
            Request::get("/api/contact/stats")
                .header(header::AUTHORIZATION, "Bearer letmein")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(authorized.status(), StatusCode::OK);

    let public_submit = router
        .oneshot(json_request(
            "POST",
            "/api/contact/inquiry",
            serde_json::to_value(submission()).expect("serialize"),
        ))
        .await
        .expect("route executes");
    assert_eq!(public_submit.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn wrongly_typed_fields_are_reported_per_field() {
    let (service, repository, _) = build_service();
    let router = router_with_service(service, AdminGuard::open());

    let mut payload = submission_json();
    payload["phone"] = json!(412345678);
    payload["preferred_date"] = json!(["2025-11-15"]);
    payload["name"] = json!("");

    let response = router
        .oneshot(json_request("POST", "/api/contact/inquiry", payload))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok()),
        Some("application/json")
    );
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("error"), Some(&json!("validation failed")));
    assert_eq!(
        payload.get("errors"),
        Some(&json!({
            "name": "name required",
            "phone": "phone must be text",
            "preferred_date": "preferred_date must be text",
        }))
    );
    assert!(repository.is_empty().expect("readable"));
}

#[tokio::test]
async fn unreadable_bodies_use_the_json_error_shape() {
    let (service, _, _) = build_service();
    let router = router_with_service(service, AdminGuard::open());

    let response = router
        .oneshot(
            Request::post("/api/contact/inquiry")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{ not json"))
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("error"), Some(&json!("validation failed")));
    assert!(payload.pointer("/errors/body").and_then(Value::as_str).is_some());
}

#[tokio::test]
async fn status_patch_reports_non_text_status_as_field_error() {
    let (service, repository, _) = build_service();
    let service = Arc::new(service);
    let inquiry = service.submit(submission()).expect("submitted");
    let router = inquiry_router(service, AdminGuard::open());

    for (body, message) in [
        (json!({ "status": 5 }), "status must be text"),
        (json!({}), "status required"),
    ] {
        let response = router
            .clone()
            .oneshot(json_request(
                "PATCH",
                &format!("/api/contact/inquiry/{}/status", inquiry.id),
                body,
            ))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let payload = read_json_body(response).await;
        assert_eq!(payload.pointer("/errors/status"), Some(&json!(message)));
    }

    let stored = repository
        .fetch(&inquiry.id)
        .expect("fetch")
        .expect("present");
    assert_eq!(stored.status, InquiryStatus::New);
}
