use crate::app::middleware::RequestNumber;
use crate::app::state::AppState;
use crate::core::{CalcError, Flavor, NewOperation};
use crate::domain::model::PersistenceMethod;
use crate::utils::logger::{INDEPENDENT_LOGGER, REQUEST_LOGGER, STACK_LOGGER};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Debug, Deserialize)]
pub struct IndependentCalcInput {
    pub arguments: Vec<i64>,
    pub operation: String,
}

#[derive(Debug, Deserialize)]
pub struct StackInput {
    pub arguments: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct OperateParams {
    pub operation: String,
}

#[derive(Debug, Deserialize)]
pub struct RemoveParams {
    pub count: i64,
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub flavor: Option<String>,
    #[serde(rename = "persistenceMethod")]
    pub persistence_method: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoggerNameParams {
    #[serde(rename = "logger-name")]
    pub logger_name: String,
}

#[derive(Debug, Deserialize)]
pub struct SetLevelParams {
    #[serde(rename = "logger-name")]
    pub logger_name: String,
    #[serde(rename = "logger-level")]
    pub logger_level: String,
}

fn success<T: Serialize>(value: T) -> Response {
    (StatusCode::OK, Json(serde_json::json!({ "result": value }))).into_response()
}

fn conflict(err: &CalcError) -> Response {
    (
        StatusCode::CONFLICT,
        Json(serde_json::json!({ "errorMessage": err.to_string() })),
    )
        .into_response()
}

fn join_arguments(arguments: &[i64], separator: &str) -> String {
    arguments
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Empty query values count as absent.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

pub async fn health() -> Json<&'static str> {
    Json("OK")
}

pub async fn independent_calculate(
    State(state): State<AppState>,
    Extension(RequestNumber(request_number)): Extension<RequestNumber>,
    Json(input): Json<IndependentCalcInput>,
) -> Response {
    let outcome = state
        .calculator()
        .calculate_independent(&input.arguments, &input.operation);

    match outcome {
        Ok(result) => {
            tracing::info!(
                target: INDEPENDENT_LOGGER,
                request_number,
                "Performing operation {}. Result is {}",
                input.operation,
                result
            );
            tracing::debug!(
                target: INDEPENDENT_LOGGER,
                request_number,
                "Performing operation: {}({}) = {}",
                input.operation,
                join_arguments(&input.arguments, ","),
                result
            );

            state
                .archive
                .record(NewOperation {
                    flavor: Flavor::Independent,
                    operation: input.operation,
                    result,
                    arguments: input.arguments,
                })
                .await;
            success(result)
        }
        Err(e) => {
            tracing::error!(
                target: INDEPENDENT_LOGGER,
                request_number,
                "Server encountered an error ! message: {}",
                e
            );
            conflict(&e)
        }
    }
}

pub async fn stack_size(
    State(state): State<AppState>,
    Extension(RequestNumber(request_number)): Extension<RequestNumber>,
) -> Response {
    let (size, content) = {
        let calculator = state.calculator();
        (calculator.stack_size(), calculator.stack_top_first())
    };

    tracing::info!(target: STACK_LOGGER, request_number, "Stack size is {}", size);
    tracing::debug!(
        target: STACK_LOGGER,
        request_number,
        "Stack content (first == top): [{}]",
        join_arguments(&content, ", ")
    );
    success(size)
}

pub async fn add_to_stack(
    State(state): State<AppState>,
    Extension(RequestNumber(request_number)): Extension<RequestNumber>,
    Json(input): Json<StackInput>,
) -> Response {
    let size = state.calculator().push_arguments(&input.arguments);
    let added = input.arguments.len();

    tracing::info!(
        target: STACK_LOGGER,
        request_number,
        "Adding total of {} argument(s) to the stack | Stack size: {}",
        added,
        size
    );
    tracing::debug!(
        target: STACK_LOGGER,
        request_number,
        "Adding arguments: {} | Stack size before {} | stack size after {}",
        join_arguments(&input.arguments, ","),
        size - added,
        size
    );
    success(size)
}

pub async fn stack_operate(
    State(state): State<AppState>,
    Extension(RequestNumber(request_number)): Extension<RequestNumber>,
    Query(params): Query<OperateParams>,
) -> Response {
    let (outcome, size) = {
        let mut calculator = state.calculator();
        let outcome = calculator.calculate_from_stack(&params.operation);
        (outcome, calculator.stack_size())
    };

    match outcome {
        Ok(outcome) => {
            tracing::info!(
                target: STACK_LOGGER,
                request_number,
                "Performing operation {}. Result is {} | stack size: {}",
                params.operation,
                outcome.result,
                size
            );
            tracing::debug!(
                target: STACK_LOGGER,
                request_number,
                "Performing operation: {}({}) = {}",
                params.operation,
                join_arguments(&outcome.arguments, ","),
                outcome.result
            );

            state
                .archive
                .record(NewOperation {
                    flavor: Flavor::Stack,
                    operation: params.operation,
                    result: outcome.result,
                    arguments: outcome.arguments,
                })
                .await;
            success(outcome.result)
        }
        Err(e) => {
            tracing::error!(
                target: STACK_LOGGER,
                request_number,
                "Server encountered an error ! message: {}",
                e
            );
            conflict(&e)
        }
    }
}

pub async fn delete_from_stack(
    State(state): State<AppState>,
    Extension(RequestNumber(request_number)): Extension<RequestNumber>,
    Query(params): Query<RemoveParams>,
) -> Response {
    let outcome = state.calculator().remove_arguments(params.count);

    let size_or_error = match &outcome {
        Ok(size) => size.to_string(),
        Err(e) => e.to_string(),
    };
    tracing::info!(
        target: STACK_LOGGER,
        request_number,
        "Removing total {} argument(s) from the stack | Stack size: {}",
        params.count,
        size_or_error
    );

    match outcome {
        Ok(size) => success(size),
        Err(e) => conflict(&e),
    }
}

pub async fn history(
    State(state): State<AppState>,
    Extension(RequestNumber(request_number)): Extension<RequestNumber>,
    Query(params): Query<HistoryParams>,
) -> Response {
    let flavor = non_empty(params.flavor).map(|f| f.to_uppercase());

    if let Some(method) = non_empty(params.persistence_method) {
        let method = match method.parse::<PersistenceMethod>() {
            Ok(method) => method,
            Err(e) => {
                tracing::warn!("{}", e);
                return success(Vec::<()>::new());
            }
        };
        let filter = match flavor.as_deref().map(str::parse::<Flavor>) {
            None => None,
            Some(Ok(flavor)) => Some(flavor),
            // 未知的 flavor 在資料庫中不會有任何符合的紀錄
            Some(Err(_)) => return success(Vec::<()>::new()),
        };
        return success(state.archive.history(method, filter).await);
    }

    let flavor = flavor.and_then(|f| f.parse::<Flavor>().ok());
    let (entries, stack_count, independent_count) = {
        let calculator = state.calculator();
        (
            calculator.history(flavor),
            calculator.history_len(Flavor::Stack),
            calculator.history_len(Flavor::Independent),
        )
    };

    if flavor != Some(Flavor::Independent) {
        tracing::info!(
            target: STACK_LOGGER,
            request_number,
            "History: So far total {} stack actions",
            stack_count
        );
    }
    if flavor != Some(Flavor::Stack) {
        tracing::info!(
            target: INDEPENDENT_LOGGER,
            request_number,
            "History: So far total {} independent actions",
            independent_count
        );
    }

    success(entries)
}

pub async fn get_log_level(
    State(state): State<AppState>,
    Query(params): Query<LoggerNameParams>,
) -> Response {
    match state.log_levels.get(&params.logger_name) {
        Some(level) => Json(level.name()).into_response(),
        None => (StatusCode::BAD_REQUEST, Json("Logger not found")).into_response(),
    }
}

pub async fn set_log_level(
    State(state): State<AppState>,
    Extension(RequestNumber(request_number)): Extension<RequestNumber>,
    Query(params): Query<SetLevelParams>,
) -> Response {
    let started = Instant::now();

    if state
        .log_levels
        .set(&params.logger_name, &params.logger_level)
        .is_none()
    {
        return (StatusCode::BAD_REQUEST, Json("Invalid logger name or level")).into_response();
    }

    tracing::debug!(
        target: REQUEST_LOGGER,
        request_number,
        "request #{} duration: {}ms",
        request_number,
        started.elapsed().as_millis()
    );

    Json(params.logger_level.to_uppercase()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_arguments() {
        assert_eq!(join_arguments(&[1, -2, 3], ","), "1,-2,3");
        assert_eq!(join_arguments(&[3, 2], ", "), "3, 2");
        assert_eq!(join_arguments(&[], ","), "");
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(Some("STACK".to_string())), Some("STACK".to_string()));
        assert_eq!(non_empty(None), None);
    }
}
