mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{delete, get, post},
    Router,
};

use crate::api::{DynAPI, API};
use crate::server::handlers::{health, pricing, rides};

pub async fn serve<T: API + Send + Sync + 'static>(api: T) {
    let api = Arc::new(api) as DynAPI;

    let app = Router::new()
        .route("/rides", post(rides::request))
        .route("/rides/:id", get(rides::find))
        .route("/rides/passengers/:id", delete(rides::cancel))
        .route("/pricing/surge", get(pricing::surge))
        .route("/health", get(health::check))
        .layer(Extension(api));

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));

    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .unwrap();
}
