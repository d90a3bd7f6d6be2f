use crate::app::state::AppState;
use crate::utils::logger::REQUEST_LOGGER;
use axum::extract::{Request, State};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::Response;
use std::time::Instant;

/// Number assigned to the current request by [`track_requests`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestNumber(pub u64);

pub async fn track_requests(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let request_number = state.next_request_number();
    let started = Instant::now();
    let path = request.uri().path().to_string();
    let method = request.method().clone();

    tracing::info!(
        target: REQUEST_LOGGER,
        request_number,
        "Incoming request | #{} | resource: {} | HTTP Verb {}",
        request_number,
        path,
        method
    );

    request.extensions_mut().insert(RequestNumber(request_number));
    let response = next.run(request).await;

    // PUT /logs/level 在套用新等級後自行記錄耗時
    if !(path == "/logs/level" && method == Method::PUT) {
        tracing::debug!(
            target: REQUEST_LOGGER,
            request_number,
            "request #{} duration: {}ms",
            request_number,
            started.elapsed().as_millis()
        );
    }

    response
}
