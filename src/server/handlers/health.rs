use axum::extract::Json;
use chrono::Utc;
use serde_json::{json, Value};

pub async fn check() -> Json<Value> {
    Json(json!({
        "status": "up",
        "service": "ridepool",
        "timestamp": Utc::now(),
    }))
}
