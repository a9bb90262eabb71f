//! 통합 API 에러 응답 타입.
//!
//! 모든 엔드포인트에서 일관된 응답 봉투(envelope)를 제공합니다.
//!
//! # 전송 계약
//!
//! 질의-응답 래퍼 프로토콜 계약에 따라 전송 계층은 항상 HTTP 200을
//! 보고하고, 인가 실패는 페이로드의 에러 상세에 내장된 `statusCode`
//! (401/403 등)로 신호합니다.
//!
//! ```json
//! { "errors": [{ "statusCode": 401, "code": "UNAUTHENTICATED", "message": "..." }] }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use contentry_core::{ContentryError, StoreError};

/// 에러 상세.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    /// 내장된 HTTP 스타일 상태 코드 (400/401/403/500)
    pub status_code: u16,
    /// 기계 판독용 에러 코드 (예: "UNAUTHENTICATED", "FORBIDDEN")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
}

impl ApiErrorResponse {
    /// 새 에러 상세 생성.
    pub fn new(status_code: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status_code,
            code: code.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}

impl From<ContentryError> for ApiErrorResponse {
    fn from(err: ContentryError) -> Self {
        // 내부 장애는 상세를 로그로만 남기고 일반화된 메시지로 표면화한다.
        // 자격증명/인가 판정처럼 보이면 안 된다.
        let message = if err.is_security_decision() || matches!(err, ContentryError::NotFound(_)) {
            err.to_string()
        } else {
            error!(detail = %err, "internal fault surfaced as generic server error");
            "내부 서버 에러가 발생했습니다".to_string()
        };

        Self::new(err.status_code(), err.code(), message)
    }
}

impl From<StoreError> for ApiErrorResponse {
    fn from(err: StoreError) -> Self {
        ContentryError::from(err).into()
    }
}

/// 응답 봉투.
///
/// 성공이면 `data`, 실패면 `errors`만 직렬화됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// 성공 페이로드
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// 에러 목록
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ApiErrorResponse>>,
}

impl<T> ApiResponse<T> {
    /// 성공 봉투.
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            data: Some(data),
            errors: None,
        })
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()> {
            data: None,
            errors: Some(vec![self]),
        };
        // 전송은 성공, 실패는 페이로드에 내장
        (StatusCode::OK, Json(body)).into_response()
    }
}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiErrorResponse>;
