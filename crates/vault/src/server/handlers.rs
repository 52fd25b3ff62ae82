//! Axum request handlers for all service endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use common::{
    protocol::{ErrorResponse, HealthResponse},
    RecordDto, ServiceError,
};
use serde::Deserialize;
use tracing::{error, warn};

use super::state::AppState;

/// Query string accepted by the read endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ReadQuery {
    /// Return stored ciphertext verbatim instead of decrypted DTOs.
    #[serde(default)]
    pub encrypted: bool,
}

/// [`ServiceError`] rendered as an HTTP error response.
///
/// Only validation messages reach the caller; every other kind is logged with
/// its detail and answered with a generic message.
#[derive(Debug)]
pub struct ApiError(ServiceError);

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status =
            StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = if err.is_client_facing() {
            err.to_string()
        } else {
            error!(code = err.code(), error = %err, "request failed");
            match &err {
                ServiceError::Storage(_) => "storage is temporarily unavailable".to_owned(),
                ServiceError::Decoding(_) | ServiceError::Cryptographic(_) => {
                    "stored record could not be decrypted".to_owned()
                }
                _ => "internal error".to_owned(),
            }
        };

        (status, Json(ErrorResponse::new(err.code(), message))).into_response()
    }
}

type ApiResult = Result<Response, ApiError>;

fn reject(detail: String) -> ApiError {
    warn!(detail = %detail, "request rejected");
    ApiError(ServiceError::Validation(detail))
}

fn record_not_found(id: i64) -> Response {
    let err = ErrorResponse::new("not_found", format!("record {id} does not exist"));
    (StatusCode::NOT_FOUND, Json(err)).into_response()
}

/// `GET /records`: list every record.
///
/// Plaintext DTOs by default; `?encrypted=true` returns the stored records
/// with their ciphertext untouched.
pub async fn list_records(
    State(state): State<AppState>,
    query: Result<Query<ReadQuery>, QueryRejection>,
) -> ApiResult {
    let Query(query) = query.map_err(|r| reject(r.body_text()))?;
    if query.encrypted {
        let stored = state.records.get_all_raw().await?;
        return Ok(Json(stored).into_response());
    }
    let records = state.records.get_all().await?;
    Ok(Json(records).into_response())
}

/// `GET /records/{id}`: fetch one record, `404` if the id is unknown.
pub async fn get_record(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<ReadQuery>, QueryRejection>,
) -> ApiResult {
    let Path(id) = path.map_err(|r| reject(r.body_text()))?;
    let Query(query) = query.map_err(|r| reject(r.body_text()))?;

    if query.encrypted {
        return Ok(match state.records.get_raw_by_id(id).await? {
            Some(stored) => Json(stored).into_response(),
            None => record_not_found(id),
        });
    }
    Ok(match state.records.get_by_id(id).await? {
        Some(record) => Json(record).into_response(),
        None => record_not_found(id),
    })
}

/// `POST /records`: encrypt and store a record.
///
/// Returns `201 Created` with a `Location` header and the plaintext DTO
/// carrying the assigned id.
pub async fn create_record(
    State(state): State<AppState>,
    body: Result<Json<RecordDto>, JsonRejection>,
) -> ApiResult {
    let Json(dto) = body.map_err(|r| reject(r.body_text()))?;
    let created = state.records.create(&dto).await?;
    let location = format!("/records/{}", created.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(created)).into_response())
}

/// `PUT /records/{id}`: re-encrypt a record with new values.
///
/// `204 No Content` on success, `404` if the id is unknown.
pub async fn update_record(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<RecordDto>, JsonRejection>,
) -> ApiResult {
    let Path(id) = path.map_err(|r| reject(r.body_text()))?;
    let Json(dto) = body.map_err(|r| reject(r.body_text()))?;
    Ok(match state.records.update(id, &dto).await? {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => record_not_found(id),
    })
}

/// `DELETE /records/{id}`: `204 No Content` on success, `404` if unknown.
pub async fn delete_record(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult {
    let Path(id) = path.map_err(|r| reject(r.body_text()))?;
    Ok(if state.records.delete(id).await? {
        StatusCode::NO_CONTENT.into_response()
    } else {
        record_not_found(id)
    })
}

/// `GET /health`: liveness and readiness check.
///
/// Returns `200 OK` when storage answers a count query, `503` otherwise.
pub async fn health(State(state): State<AppState>) -> Response {
    let (status_code, body) = match state.records.count().await {
        Ok(records_stored) => (
            StatusCode::OK,
            HealthResponse {
                status: "ok".into(),
                storage_ready: true,
                records_stored,
            },
        ),
        Err(e) => {
            warn!(error = %e, "storage readiness probe failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                HealthResponse {
                    status: "degraded".into(),
                    storage_ready: false,
                    records_stored: 0,
                },
            )
        }
    };
    (status_code, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{routing::get, Router};
    use axum_test::TestServer;
    use serde_json::{json, Value};

    use super::*;
    use crate::crypto::{AesCbcCipher, FieldCipher};
    use crate::service::RecordService;
    use crate::storage::{MockRecordRepository, StorageError};

    fn test_router(state: AppState) -> Router {
        Router::new()
            .route("/records", get(list_records).post(create_record))
            .route(
                "/records/:id",
                get(get_record).put(update_record).delete(delete_record),
            )
            .route("/health", get(health))
            .with_state(state)
    }

    fn server() -> TestServer {
        TestServer::new(test_router(AppState::for_tests())).unwrap()
    }

    fn sample_body() -> Value {
        json!({
            "userDocument": "12345678901",
            "creditCardToken": "1234567890123456",
            "value": 1000
        })
    }

    fn test_cipher() -> AesCbcCipher {
        AesCbcCipher::from_text("0123456789abcdef0123456789abcdef", "abcdef9876543210").unwrap()
    }

    #[tokio::test]
    async fn create_returns_201_with_location_and_plaintext() {
        let server = server();
        let resp = server.post("/records").json(&sample_body()).await;
        assert_eq!(resp.status_code(), StatusCode::CREATED);
        assert_eq!(resp.header("location"), "/records/1");

        let dto: RecordDto = resp.json();
        assert_eq!(dto.id, 1);
        assert_eq!(dto.user_document, "12345678901");
        assert_eq!(dto.credit_card_token, "1234567890123456");
        assert_eq!(dto.value, 1000);
    }

    #[tokio::test]
    async fn get_returns_plaintext_and_encrypted_mode_returns_ciphertext() {
        let server = server();
        server.post("/records").json(&sample_body()).await;

        let plain: RecordDto = server.get("/records/1").await.json();
        assert_eq!(plain.user_document, "12345678901");

        let raw: Value = server
            .get("/records/1")
            .add_query_param("encrypted", "true")
            .await
            .json();
        let cipher = test_cipher();
        assert_eq!(raw["userDocument"], cipher.encrypt("12345678901"));
        assert_eq!(raw["creditCardToken"], cipher.encrypt("1234567890123456"));
        assert_eq!(raw["value"], 1000);
    }

    #[tokio::test]
    async fn list_in_both_modes() {
        let server = server();
        assert_eq!(server.get("/records").await.json::<Vec<RecordDto>>(), vec![]);

        server.post("/records").json(&sample_body()).await;
        let plain: Vec<RecordDto> = server.get("/records").await.json();
        assert_eq!(plain.len(), 1);
        assert_eq!(plain[0].credit_card_token, "1234567890123456");

        let raw: Vec<Value> = server
            .get("/records")
            .add_query_param("encrypted", "true")
            .await
            .json();
        assert_eq!(raw.len(), 1);
        assert_ne!(raw[0]["creditCardToken"], "1234567890123456");
    }

    #[tokio::test]
    async fn update_returns_204_then_reads_new_values() {
        let server = server();
        server.post("/records").json(&sample_body()).await;

        let resp = server
            .put("/records/1")
            .json(&json!({
                "userDocument": "10987654321",
                "creditCardToken": "6543210987654321",
                "value": 2000
            }))
            .await;
        assert_eq!(resp.status_code(), StatusCode::NO_CONTENT);

        let dto: RecordDto = server.get("/records/1").await.json();
        assert_eq!(dto.user_document, "10987654321");
        assert_eq!(dto.value, 2000);
    }

    #[tokio::test]
    async fn delete_returns_204_then_404() {
        let server = server();
        server.post("/records").json(&sample_body()).await;

        assert_eq!(server.delete("/records/1").await.status_code(), StatusCode::NO_CONTENT);
        assert_eq!(server.delete("/records/1").await.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(server.get("/records/1").await.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_ids_are_404_in_every_verb() {
        let server = server();
        assert_eq!(server.get("/records/9").await.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            server
                .get("/records/9")
                .add_query_param("encrypted", "true")
                .await
                .status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            server.put("/records/9").json(&sample_body()).await.status_code(),
            StatusCode::NOT_FOUND
        );
        let resp = server.delete("/records/9").await;
        assert_eq!(resp.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(resp.json::<ErrorResponse>().code, "not_found");
    }

    #[tokio::test]
    async fn missing_or_malformed_body_is_validation_error() {
        let server = server();

        let resp = server.post("/records").await;
        assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(resp.json::<ErrorResponse>().code, "validation_error");

        let resp = server.post("/records").json(&json!({"value": 1})).await;
        assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);

        let resp = server.put("/records/1").text("not json").await;
        assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn non_numeric_id_is_validation_error() {
        let resp = server().get("/records/abc").await;
        assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(resp.json::<ErrorResponse>().code, "validation_error");
    }

    #[tokio::test]
    async fn oversized_field_is_400() {
        let resp = server()
            .post("/records")
            .json(&json!({
                "userDocument": "x".repeat(400),
                "creditCardToken": "c",
                "value": 1
            }))
            .await;
        assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);
        assert!(resp.json::<ErrorResponse>().message.contains("userDocument"));
    }

    #[tokio::test]
    async fn corrupted_storage_is_500_without_detail() {
        let mut mock = MockRecordRepository::new();
        mock.expect_get_by_id().returning(|id| {
            Ok(Some(crate::record::ProtectedRecord::new("%%%", "%%%", 1).with_id(id)))
        });
        let state = AppState::new(RecordService::new(Arc::new(mock), Arc::new(test_cipher())));
        let server = TestServer::new(test_router(state)).unwrap();

        let resp = server.get("/records/1").await;
        assert_eq!(resp.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorResponse = resp.json();
        assert_eq!(body.code, "decoding_error");
        assert!(!body.message.contains("%%%"));
    }

    #[tokio::test]
    async fn health_ok_with_storage() {
        let server = server();
        server.post("/records").json(&sample_body()).await;
        let resp = server.get("/health").await;
        assert_eq!(resp.status_code(), StatusCode::OK);
        let body: HealthResponse = resp.json();
        assert_eq!(body.status, "ok");
        assert!(body.storage_ready);
        assert_eq!(body.records_stored, 1);
    }

    #[tokio::test]
    async fn health_returns_503_when_storage_fails() {
        let mut mock = MockRecordRepository::new();
        mock.expect_count()
            .returning(|| Err(StorageError::Backend("locked".into())));
        let state = AppState::new(RecordService::new(Arc::new(mock), Arc::new(test_cipher())));
        let app = Router::new().route("/health", get(health)).with_state(state);

        let resp = TestServer::new(app).unwrap().get("/health").await;
        assert_eq!(resp.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(resp.json::<HealthResponse>().status, "degraded");
    }
}
