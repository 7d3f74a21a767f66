//! # Health Check Handler

use axum::Json;
use serde_json::{json, Value};

/// GET /health
///
/// Always 200 while the process is serving requests:
/// ```json
/// { "status": "healthy", "service": "passkey-ceremony", "version": "0.1.0" }
/// ```
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
