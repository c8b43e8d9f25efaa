pub mod error;
pub mod routes;

use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use quickpoll_core::AppState;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn build_router() -> Router<AppState> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health))
        .route("/polls/create", post(routes::polls::create_poll))
        .route("/polls/list", get(routes::polls::list_polls))
        .route("/polls/view", get(routes::polls::view_poll))
        .route("/polls/register-vote", post(routes::polls::register_vote))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
