// api.rs - HTTP Entry Point
// Purpose: Expose the scanner as a small JSON API
// Routes:
//  - GET|POST /api/scan  run one scan (query string merged with JSON body)
//  - GET /api, GET /     readiness check
//  - OPTIONS on any route returns 200 with the CORS headers

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use colored::*;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::{ScanConfig, ScanParams};
use crate::discord_notifier::Branding;
use crate::probe::DEFAULT_BASE_URL;
use crate::report::ScanReport;
use crate::scanner::run_scan;

#[derive(Debug, Clone)]
pub struct ApiState {
    pub base_url: String,
    pub branding: Branding,
}

impl Default for ApiState {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            branding: Branding::default(),
        }
    }
}

/// Merge query parameters with a JSON request body; body keys win.
///
/// Bodies that are not a JSON object are ignored.
pub fn merge_params(query: HashMap<String, String>, body: &[u8]) -> Map<String, Value> {
    let mut merged: Map<String, Value> = query
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect();

    if !body.is_empty() {
        if let Ok(Value::Object(fields)) = serde_json::from_slice::<Value>(body) {
            merged.extend(fields);
        }
    }

    merged
}

fn json_response(status: StatusCode, body: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        body,
    )
        .into_response()
}

fn error_response(error: &anyhow::Error) -> Response {
    let body = json!({
        "success": false,
        "error": format!("{:#}", error),
        "message": "Internal server error"
    });
    json_response(StatusCode::INTERNAL_SERVER_ERROR, body.to_string())
}

async fn run_from_params(state: &ApiState, merged: &Map<String, Value>) -> anyhow::Result<String> {
    let params = ScanParams::from_json_map(merged)?;
    let config = ScanConfig::from_params(&params)?
        .with_base_url(&state.base_url)
        .with_branding(state.branding.clone());

    let aggregate = run_scan(config.clone()).await?;
    ScanReport::new(aggregate, &config).to_json_pretty()
}

async fn scan(
    State(state): State<Arc<ApiState>>,
    method: Method,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    let body: &[u8] = if method == Method::POST { &body } else { &[] };
    let merged = merge_params(query, body);

    match run_from_params(&state, &merged).await {
        Ok(report) => json_response(StatusCode::OK, report),
        Err(e) => {
            eprintln!("{}", format!("[!] Scan request failed: {:#}", e).red());
            error_response(&e)
        }
    }
}

async fn health(method: Method) -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "GoFile Scanner API is working!",
        "status": "ready",
        "method": method.as_str(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub fn create_router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/scan", get(scan).post(scan).options(preflight))
        .route("/api", get(health).post(health).options(preflight))
        .route("/", get(health).options(preflight))
        .with_state(Arc::new(state))
        .layer(cors)
}

/// Serve the API on an already bound listener until Ctrl+C / SIGTERM
pub async fn serve(listener: tokio::net::TcpListener, state: ApiState) -> anyhow::Result<()> {
    let app = create_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub async fn start_api_server(state: ApiState, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!("{}", format!("🚀 Scanner API listening on http://{}", addr).green().bold());
    println!("{}", format!("   Scan endpoint: http://{}/api/scan", addr).cyan());

    serve(listener, state).await?;

    println!("{}", "✅ Scanner API shut down gracefully".green());
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            println!("\n{}", "⚠️ Received Ctrl+C signal, shutting down gracefully...".yellow());
        },
        _ = terminate => {
            println!("\n{}", "⚠️ Received SIGTERM signal, shutting down gracefully...".yellow());
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_body_overrides_query() {
        let merged = merge_params(
            query(&[("count", "10"), ("threads", "3")]),
            br#"{"count": 20, "patterns": "true"}"#,
        );
        assert_eq!(merged["count"], json!(20));
        assert_eq!(merged["threads"], json!("3"));
        assert_eq!(merged["patterns"], json!("true"));
    }

    #[test]
    fn test_malformed_or_non_object_body_ignored() {
        let merged = merge_params(query(&[("count", "4")]), b"{not json");
        assert_eq!(merged.len(), 1);
        let merged = merge_params(query(&[]), b"[1, 2, 3]");
        assert!(merged.is_empty());
    }

    #[test]
    fn test_error_response_is_500() {
        let response = error_response(&anyhow::anyhow!("invalid integer for 'count'"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
