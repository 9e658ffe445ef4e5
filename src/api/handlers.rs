//! API request handlers

use axum::{
    extract::State,
    http::{Method, StatusCode, Uri},
    response::IntoResponse,
    Json,
};
use rand::Rng;
use serde::Serialize;
use std::sync::Arc;

use crate::{
    config::Config,
    middleware::{RateLimitConfig, RateLimiter},
    observability::{HealthReporter, HealthSnapshot, RequestCounters},
};

/// Endpoints advertised by the 404 response
pub const AVAILABLE_ENDPOINTS: [&str; 5] = [
    "GET /",
    "GET /health",
    "GET /metrics",
    "GET /dashboard",
    "GET /api/demo",
];

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub counters: Arc<RequestCounters>,
    pub rate_limiter: Arc<RateLimiter>,
    pub health: Arc<HealthReporter>,
}

impl AppState {
    /// Build fresh state from configuration
    pub fn new(config: Config) -> Self {
        let rate_limiter = RateLimiter::new(RateLimitConfig::from(&config.rate_limit));
        let health = HealthReporter::new(config.environment.as_str());

        Self {
            config: Arc::new(config),
            counters: Arc::new(RequestCounters::new()),
            rate_limiter: Arc::new(rate_limiter),
            health: Arc::new(health),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Technologies {
    pub development: String,
    pub hosting: String,
    pub monitoring: String,
    pub language: &'static str,
}

/// Project overview returned by `GET /`
#[derive(Debug, Serialize)]
pub struct ProjectInfo {
    pub project: String,
    pub author: String,
    pub organization: String,
    pub course: String,
    pub technologies: Technologies,
    pub features: [&'static str; 5],
    pub status: &'static str,
    pub timestamp: String,
    pub uptime: String,
    pub version: &'static str,
    pub environment: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SystemSection {
    pub uptime_seconds: u64,
    pub memory_usage_mb: Option<u64>,
    pub memory_virtual_mb: Option<u64>,
    pub platform: &'static str,
    pub arch: &'static str,
    pub service_version: &'static str,
    pub pid: u32,
}

#[derive(Debug, Serialize)]
pub struct ApplicationSection {
    pub total_requests: u64,
    pub errors: u64,
    pub rate_limited: u64,
    /// Clients with a live rate limit window
    pub tracked_clients: usize,
    pub avg_response_time_ms: f64,
    pub started_at: String,
}

#[derive(Debug, Serialize)]
pub struct InfrastructureSection {
    pub provider: String,
    pub region: String,
    pub ssl_enabled: bool,
    pub auto_scaling: bool,
    pub load_balancer: bool,
}

#[derive(Debug, Serialize)]
pub struct MonitoringSection {
    pub uptime_monitoring: String,
    pub alerts_configured: bool,
    pub realtime_metrics: bool,
}

/// Metrics snapshot returned by `GET /metrics`
#[derive(Debug, Serialize)]
pub struct MetricsReport {
    pub system: SystemSection,
    pub application: ApplicationSection,
    pub infrastructure: InfrastructureSection,
    pub monitoring: MonitoringSection,
}

#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub status: &'static str,
    pub uptime: String,
    pub total_requests: u64,
    pub last_updated: String,
}

#[derive(Debug, Serialize)]
pub struct KeyMetrics {
    pub availability: String,
    pub response_time: String,
    pub memory_used: String,
    pub errors: u64,
}

#[derive(Debug, Serialize)]
pub struct FeatureFlags {
    pub rate_limiting: String,
    pub cors_enabled: bool,
    pub security_headers: bool,
    pub structured_logs: bool,
    pub keep_alive: bool,
}

/// Summary returned by `GET /dashboard`
#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub title: &'static str,
    pub summary: DashboardSummary,
    pub key_metrics: KeyMetrics,
    pub configuration: FeatureFlags,
    pub available_endpoints: [&'static str; 5],
}

#[derive(Debug, Serialize)]
pub struct SampleData {
    pub active_users: u32,
    pub daily_transactions: u32,
    pub performance: &'static str,
}

/// Payload returned by `GET /api/demo`
#[derive(Debug, Serialize)]
pub struct DemoResponse {
    pub message: &'static str,
    pub sample_data: SampleData,
    pub timestamp: String,
}

/// 404 body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotFoundBody {
    pub error: &'static str,
    pub available_endpoints: [&'static str; 5],
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// "3h 25m" style uptime
fn format_hours_minutes(secs: u64) -> String {
    format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
}

/// Project information
pub async fn root(State(state): State<AppState>) -> Json<ProjectInfo> {
    let project = &state.config.project;
    let deployment = &state.config.deployment;

    Json(ProjectInfo {
        project: project.name.clone(),
        author: project.author.clone(),
        organization: project.organization.clone(),
        course: project.course.clone(),
        technologies: Technologies {
            development: project.development_environment.clone(),
            hosting: deployment.provider.clone(),
            monitoring: deployment.uptime_monitor.clone(),
            language: "Rust + Axum",
        },
        features: [
            "Automatic scaling",
            "24/7 monitoring",
            "Security headers",
            "REST API",
            "Real-time metrics",
        ],
        status: "Running",
        timestamp: now_rfc3339(),
        uptime: format!("{} seconds", state.health.uptime().as_secs()),
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.as_str(),
    })
}

/// Health check for uptime monitors
pub async fn health(State(state): State<AppState>) -> Json<HealthSnapshot> {
    Json(state.health.snapshot())
}

/// Detailed metrics
pub async fn metrics(State(state): State<AppState>) -> Json<MetricsReport> {
    let counters = state.counters.snapshot();
    let health = state.health.snapshot();
    let deployment = &state.config.deployment;

    Json(MetricsReport {
        system: SystemSection {
            uptime_seconds: state.health.uptime().as_secs(),
            memory_usage_mb: health.memory.rss_mb(),
            memory_virtual_mb: health.memory.virtual_mb(),
            platform: health.platform,
            arch: health.arch,
            service_version: health.service_version,
            pid: health.pid,
        },
        application: ApplicationSection {
            total_requests: counters.total_requests,
            errors: counters.total_errors,
            rate_limited: counters.rate_limited,
            tracked_clients: state.rate_limiter.stats().tracked_clients,
            avg_response_time_ms: counters.avg_response_time_ms,
            started_at: state.health.started_at().to_rfc3339(),
        },
        infrastructure: InfrastructureSection {
            provider: deployment.provider.clone(),
            region: deployment.region.clone(),
            ssl_enabled: deployment.ssl_enabled,
            auto_scaling: deployment.auto_scaling,
            load_balancer: deployment.load_balancer,
        },
        monitoring: MonitoringSection {
            uptime_monitoring: deployment.uptime_monitor.clone(),
            alerts_configured: true,
            realtime_metrics: true,
        },
    })
}

/// Dashboard overview
pub async fn dashboard(State(state): State<AppState>) -> Json<Dashboard> {
    let counters = state.counters.snapshot();
    let memory = crate::observability::health::memory_usage();
    let memory_used = memory
        .rss_mb()
        .map(|mb| format!("{}MB", mb))
        .unwrap_or_else(|| "unavailable".to_string());

    Json(Dashboard {
        title: "Project Dashboard",
        summary: DashboardSummary {
            status: "Operational",
            uptime: format_hours_minutes(state.health.uptime().as_secs()),
            total_requests: counters.total_requests,
            last_updated: now_rfc3339(),
        },
        key_metrics: KeyMetrics {
            availability: format!("{:.1}%", counters.availability_percent()),
            response_time: format!("{:.1}ms", counters.avg_response_time_ms),
            memory_used,
            errors: counters.total_errors,
        },
        configuration: FeatureFlags {
            rate_limiting: state.config.rate_limit.describe(),
            cors_enabled: true,
            security_headers: true,
            structured_logs: state.config.logging.format == "json",
            keep_alive: state.config.keep_alive_active(),
        },
        available_endpoints: AVAILABLE_ENDPOINTS,
    })
}

/// Demo endpoint with randomized figures
pub async fn demo() -> Json<DemoResponse> {
    let mut rng = rand::thread_rng();

    Json(DemoResponse {
        message: "Demo endpoint is working!",
        sample_data: SampleData {
            active_users: rng.gen_range(50..150),
            daily_transactions: rng.gen_range(500..1500),
            performance: "Optimal",
        },
        timestamp: now_rfc3339(),
    })
}

/// Fallback for unmatched routes
pub async fn not_found(method: Method, uri: Uri) -> impl IntoResponse {
    tracing::debug!(method = %method, path = %uri.path(), "No route matched");

    (
        StatusCode::NOT_FOUND,
        Json(NotFoundBody {
            error: "Endpoint not found",
            available_endpoints: AVAILABLE_ENDPOINTS,
        }),
    )
}
