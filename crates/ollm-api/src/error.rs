//! 통합 API 에러 응답 타입.
//!
//! 모든 API 엔드포인트에서 일관된 에러 형식을 제공합니다.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::AuthError;

/// 통합 API 에러 응답.
///
/// # 예시
///
/// ```json
/// {
///   "code": "INVALID_CREDENTIALS",
///   "message": "이메일 또는 비밀번호가 올바르지 않습니다",
///   "timestamp": 1738300800
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "INVALID_INPUT", "ALREADY_EXISTS", "INTERNAL_ERROR")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 에러 발생 타임스탬프 (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ApiErrorResponse {
    /// 기본 에러 생성 (타임스탬프 포함).
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }

    /// 상태 코드와 함께 응답으로 변환.
    pub fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiErrorResponse>)>;

/// 내부 에러 응답 생성.
///
/// 원인은 로그에만 남기고 클라이언트에는 일반 메시지만 반환합니다.
pub fn internal_error(err: impl std::fmt::Display) -> (StatusCode, Json<ApiErrorResponse>) {
    tracing::error!(error = %err, "Internal server error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiErrorResponse::new("INTERNAL_ERROR", "내부 서버 에러")),
    )
}

impl AuthError {
    /// HTTP 상태 코드와 에러 코드.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AuthError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            AuthError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AuthError::AlreadyExists(_) => (StatusCode::CONFLICT, "ALREADY_EXISTS"),
            AuthError::Password(_)
            | AuthError::Token(_)
            | AuthError::Store(_)
            | AuthError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = match &self {
            AuthError::InvalidInput(_) | AuthError::InvalidCredentials | AuthError::Unauthorized => {
                self.to_string()
            }
            AuthError::AlreadyExists(_) => "이미 존재하는 사용자입니다".to_string(),
            other => {
                tracing::error!(error = %other, "Authentication failed with internal error");
                "내부 서버 에러".to_string()
            }
        };

        ApiErrorResponse::new(code, message).into_response_with(status)
    }
}
