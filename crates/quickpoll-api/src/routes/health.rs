use axum::Json;
use quickpoll_core::observability;
use serde_json::{json, Value};

pub async fn health() -> Json<Value> {
    let metrics = observability::metrics_snapshot();
    Json(json!({
        "success": true,
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "counters": {
            "polls_created": metrics.polls_created,
            "votes_registered": metrics.votes_registered,
            "votes_rejected": metrics.votes_rejected,
            "views_registered": metrics.views_registered,
            "view_increment_failures": metrics.view_increment_failures,
        },
    }))
}
