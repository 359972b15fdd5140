pub mod artists;
pub mod error;
pub mod home;
pub mod shows;
pub mod venues;

use axum::{
    http::header::{ACCEPT, CONTENT_TYPE},
    routing::{get, post},
    Router,
};
use sea_orm::DbConn;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

pub use error::Error;

#[derive(Clone)]
pub struct AppState {
    pub db: DbConn,
    pub recent_limit: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub search_term: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Created {
    pub id: i32,
}

pub fn router(state: AppState, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(AllowOrigin::mirror_request())
        .allow_headers([ACCEPT, CONTENT_TYPE]);
    let tracing = TraceLayer::new_for_http();
    // elapsed requests are answered with 408
    let timeout = TimeoutLayer::new(request_timeout);
    Router::new()
        .route("/", get(home::home))
        .route("/venues", get(venues::venues))
        .route("/venues/search", post(venues::search))
        .route("/venues/create", post(venues::create))
        .route("/venues/:id", get(venues::venue).delete(venues::delete))
        .route("/venues/:id/edit", get(venues::edit).post(venues::update))
        .route("/artists", get(artists::artists))
        .route("/artists/search", post(artists::search))
        .route("/artists/create", post(artists::create))
        .route(
            "/artists/:id",
            get(artists::artist).delete(artists::delete),
        )
        .route(
            "/artists/:id/edit",
            get(artists::edit).post(artists::update),
        )
        .route("/shows", get(shows::shows))
        .route("/shows/create", post(shows::create))
        .layer(timeout)
        .layer(cors)
        .layer(tracing)
        .with_state(state)
}
