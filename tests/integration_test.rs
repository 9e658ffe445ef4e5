//! Integration tests for the Status Service request chain
//!
//! These drive the full router in-process with `tower::ServiceExt::oneshot`;
//! no network or external services are needed.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    routing::get,
    Router,
};
use serde_json::Value;
use status_service::{
    api::{apply_middleware, build_router, AppState, AVAILABLE_ENDPOINTS},
    config::{Config, Environment},
    error::ServiceError,
};
use tower::ServiceExt;

/// Helper to create a test configuration with a small quota
fn create_test_config(max_requests: u32) -> Config {
    let mut config = Config::default();
    config.rate_limit.max_requests = max_requests;
    config
}

fn get_from(path: &str, ip: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .header("x-forwarded-for", ip)
        .body(Body::empty())
        .unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> Response {
    router.clone().oneshot(request).await.unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Router with extra routes that fail on purpose
fn faulty_router(state: AppState) -> Router {
    let routes = Router::new()
        .route(
            "/fail",
            get(|| async { Err::<&'static str, _>(ServiceError::internal("database on fire")) }),
        )
        .route(
            "/panic",
            get(|| async {
                if true {
                    panic!("handler exploded");
                }
                "unreachable"
            }),
        )
        .route("/ok", get(|| async { "fine" }));

    apply_middleware(routes, state)
}

#[tokio::test]
async fn test_all_endpoints_respond() {
    let router = build_router(AppState::new(create_test_config(100)));

    for path in ["/", "/health", "/metrics", "/dashboard", "/api/demo"] {
        let response = send(&router, get_from(path, "10.0.0.1")).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {} failed", path);
        assert_eq!(
            response.headers()["content-type"],
            "application/json",
            "GET {} should return JSON",
            path
        );
    }
}

#[tokio::test]
async fn test_health_payload() {
    let router = build_router(AppState::new(create_test_config(100)));
    let body = json_body(send(&router, get_from("/health", "10.0.0.1")).await).await;

    assert_eq!(body["status"], "OK");
    assert_eq!(body["environment"], "development");
    assert!(body["uptime"].is_number());
    assert!(body.get("memory").is_some());
    assert!(body.get("cpu").is_some());
    assert!(body["platform"].is_string());
    assert!(body["runtimeVersion"].is_string());
}

#[tokio::test]
async fn test_quota_allows_max_then_rejects() {
    let router = build_router(AppState::new(create_test_config(3)));

    for i in 1..=3 {
        let response = send(&router, get_from("/", "198.51.100.1")).await;
        assert_eq!(response.status(), StatusCode::OK, "request {} should pass", i);
        assert_eq!(response.headers()["x-ratelimit-limit"], "3");
        assert_eq!(
            response.headers()["x-ratelimit-remaining"],
            (3 - i).to_string().as_str()
        );
    }

    let response = send(&router, get_from("/", "198.51.100.1")).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key("retry-after"));

    let body = json_body(response).await;
    assert!(body["error"].is_string());
    assert!(body["resetTime"].is_string());
    assert!(body["retryAfterSecs"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn test_rejected_requests_are_not_counted() {
    let state = AppState::new(create_test_config(2));
    let router = build_router(state.clone());

    for _ in 0..5 {
        send(&router, get_from("/", "198.51.100.2")).await;
    }

    let snapshot = state.counters.snapshot();
    assert_eq!(snapshot.total_requests, 2);
    assert_eq!(snapshot.rate_limited, 3);
}

#[tokio::test]
async fn test_clients_have_independent_quotas() {
    let router = build_router(AppState::new(create_test_config(1)));

    assert_eq!(send(&router, get_from("/", "192.0.2.1")).await.status(), StatusCode::OK);
    assert_eq!(
        send(&router, get_from("/", "192.0.2.1")).await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );

    assert_eq!(send(&router, get_from("/", "192.0.2.2")).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_concurrent_requests_counted_exactly() {
    let state = AppState::new(create_test_config(1000));
    let router = build_router(state.clone());

    let requests = (0..200).map(|i| {
        let router = router.clone();
        let ip = format!("10.1.{}.{}", i % 7, i % 13);
        tokio::spawn(async move { router.oneshot(get_from("/api/demo", &ip)).await.unwrap() })
    });
    let responses = futures::future::join_all(requests).await;

    for response in responses {
        assert_eq!(response.unwrap().status(), StatusCode::OK);
    }
    assert_eq!(state.counters.total_requests(), 200);
}

#[tokio::test]
async fn test_metrics_reflect_counters() {
    let state = AppState::new(create_test_config(100));
    let router = build_router(state.clone());

    for _ in 0..4 {
        send(&router, get_from("/api/demo", "10.0.0.3")).await;
    }

    let body = json_body(send(&router, get_from("/metrics", "10.0.0.3")).await).await;

    // The metrics request itself is the fifth counted request.
    assert_eq!(body["application"]["total_requests"], 5);
    assert_eq!(body["application"]["errors"], 0);
    assert_eq!(body["application"]["tracked_clients"], 1);
    assert_eq!(body["infrastructure"]["region"], "US-East");
    assert!(body["system"]["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn test_metrics_during_concurrent_load() {
    let state = AppState::new(create_test_config(10_000));
    let router = build_router(state.clone());

    let load = (0..100).map(|i| {
        let router = router.clone();
        tokio::spawn(async move {
            router
                .oneshot(get_from("/api/demo", &format!("10.2.0.{}", i)))
                .await
                .unwrap()
        })
    });
    let load = tokio::spawn(futures::future::join_all(load));

    let mut last_seen = 0;
    for _ in 0..20 {
        let body = json_body(send(&router, get_from("/metrics", "10.9.9.9")).await).await;
        let seen = body["application"]["total_requests"].as_u64().unwrap();
        assert!(seen >= last_seen, "total went backwards: {} < {}", seen, last_seen);
        assert!(seen <= 120);
        last_seen = seen;
    }
    load.await.unwrap();

    assert_eq!(state.counters.total_requests(), 120);
}

#[tokio::test]
async fn test_unmatched_route_returns_fixed_list() {
    let router = build_router(AppState::new(create_test_config(100)));

    for path in ["/nope", "/api/unknown", "/health/extra"] {
        let response = send(&router, get_from(path, "10.0.0.4")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = json_body(response).await;
        assert_eq!(body["error"], "Endpoint not found");
        let listed: Vec<&str> = body["availableEndpoints"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(listed, AVAILABLE_ENDPOINTS);
    }

    let post = Request::builder()
        .method("POST")
        .uri("/nope")
        .header("x-forwarded-for", "10.0.0.4")
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&router, post).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_handler_error_becomes_uniform_500() {
    let state = AppState::new(create_test_config(100));
    let router = faulty_router(state.clone());

    send(&router, get_from("/ok", "10.0.0.5")).await;
    send(&router, get_from("/ok", "10.0.0.5")).await;

    let response = send(&router, get_from("/fail", "10.0.0.5")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = json_body(response).await;
    assert_eq!(body["error"], "Internal server error");
    assert_eq!(body["requestId"], 3);
    assert!(body["timestamp"].is_string());
    assert_eq!(state.counters.total_errors(), 1);
}

#[tokio::test]
async fn test_handler_panic_is_isolated() {
    let state = AppState::new(create_test_config(100));
    let router = faulty_router(state.clone());

    let response = send(&router, get_from("/panic", "10.0.0.6")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["requestId"], 1);
    assert_eq!(state.counters.total_errors(), 1);

    // The service keeps answering after a panic.
    let response = send(&router, get_from("/ok", "10.0.0.6")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(state.counters.total_errors(), 1);
}

#[tokio::test]
async fn test_security_headers_on_every_response() {
    let router = faulty_router(AppState::new(create_test_config(1)));

    let ok = send(&router, get_from("/ok", "10.0.0.7")).await;
    let limited = send(&router, get_from("/ok", "10.0.0.7")).await;
    let missing = send(&router, get_from("/missing", "10.0.0.8")).await;
    let failed = send(&router, get_from("/fail", "10.0.0.9")).await;

    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
    for response in [ok, limited, missing, failed] {
        for (name, value) in status_service::middleware::SECURITY_HEADERS {
            assert_eq!(response.headers()[*name], *value, "missing {}", name);
        }
    }
}

#[tokio::test]
async fn test_request_id_header() {
    let router = build_router(AppState::new(create_test_config(100)));

    let first = send(&router, get_from("/", "10.0.0.10")).await;
    let second = send(&router, get_from("/", "10.0.0.10")).await;

    assert_eq!(first.headers()["x-request-id"], "1");
    assert_eq!(second.headers()["x-request-id"], "2");
}

#[tokio::test]
async fn test_cors_allow_list_per_environment() {
    let router = build_router(AppState::new(create_test_config(100)));

    let allowed = Request::builder()
        .uri("/")
        .header("x-forwarded-for", "10.0.0.11")
        .header("origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = send(&router, allowed).await;
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://localhost:3000"
    );
    assert_eq!(response.headers()["access-control-allow-credentials"], "true");

    let foreign = Request::builder()
        .uri("/")
        .header("x-forwarded-for", "10.0.0.11")
        .header("origin", "https://evil.example")
        .body(Body::empty())
        .unwrap();
    let response = send(&router, foreign).await;
    assert!(!response.headers().contains_key("access-control-allow-origin"));

    let mut config = create_test_config(100);
    config.environment = Environment::Production;
    let production = build_router(AppState::new(config));
    let dev_origin = Request::builder()
        .uri("/")
        .header("x-forwarded-for", "10.0.0.12")
        .header("origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = send(&production, dev_origin).await;
    assert!(!response.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_dashboard_and_root_payloads() {
    let router = build_router(AppState::new(create_test_config(100)));

    let root = json_body(send(&router, get_from("/", "10.0.0.13")).await).await;
    assert_eq!(root["environment"], "development");
    assert_eq!(root["technologies"]["language"], "Rust + Axum");
    assert!(root["uptime"].as_str().unwrap().ends_with("seconds"));

    let dashboard = json_body(send(&router, get_from("/dashboard", "10.0.0.13")).await).await;
    assert_eq!(dashboard["summary"]["total_requests"], 2);
    assert_eq!(dashboard["configuration"]["rate_limiting"], "100 req/15min");
    assert_eq!(dashboard["available_endpoints"].as_array().unwrap().len(), 5);
}
