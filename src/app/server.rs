use crate::app::handlers;
use crate::app::middleware::track_requests;
use crate::app::state::AppState;
use crate::utils::error::Result;
use axum::routing::{get, post, put};
use axum::{middleware, Router};
use std::future::Future;
use tokio::net::TcpListener;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/calculator/health", get(handlers::health))
        .route(
            "/calculator/independent/calculate",
            post(handlers::independent_calculate),
        )
        .route("/calculator/stack/size", get(handlers::stack_size))
        .route(
            "/calculator/stack/arguments",
            put(handlers::add_to_stack).delete(handlers::delete_from_stack),
        )
        .route("/calculator/stack/operate", get(handlers::stack_operate))
        .route("/calculator/history", get(handlers::history))
        .route(
            "/logs/level",
            get(handlers::get_log_level).put(handlers::set_log_level),
        )
        .layer(middleware::from_fn_with_state(state.clone(), track_requests))
        .with_state(state)
}

/// Serves on an already bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(address) = listener.local_addr() {
        tracing::info!("🚀 Listening on {}", address);
    }
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
