//! Axum용 JWT 인증 미들웨어.
//!
//! 요청마다 Authorization 헤더를 해석해 [`RequestIdentity`]를 만들고,
//! 라우트에 지정된 최소 역할과 비교해 통과 여부를 결정합니다.
//! 통과한 요청의 Claims는 request extensions에 저장되어 [`JwtAuth`] 추출기로 꺼낼 수 있습니다.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use ollm_core::Role;
use tracing::warn;

use super::{authorize, AccessDenied, Claims, JwtError, TokenCodec};
use crate::error::ApiErrorResponse;
use crate::metrics::record_access_denied;

/// 토큰 거부 사유.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    /// Bearer 형식이 아닌 Authorization 헤더
    MalformedHeader,
    /// 만료된 토큰
    Expired,
    /// 서명 불일치, 형식 오류, 잘못된 토큰 종류
    Invalid,
}

/// 요청자 신원.
///
/// 토큰이 없는 경우와 토큰이 거부된 경우를 구분합니다.
#[derive(Debug, Clone)]
pub enum RequestIdentity {
    Anonymous,
    Rejected(TokenRejection),
    Authenticated(Claims),
}

impl RequestIdentity {
    /// 요청 헤더에서 신원 해석.
    ///
    /// Access Token만 인정합니다.
    pub fn from_headers(headers: &HeaderMap, codec: &TokenCodec) -> Self {
        let Some(header) = headers.get(AUTHORIZATION) else {
            return RequestIdentity::Anonymous;
        };

        let Some(token) = header.to_str().ok().and_then(bearer_token) else {
            return RequestIdentity::Rejected(TokenRejection::MalformedHeader);
        };

        match codec.verify_access(token) {
            Ok(claims) => RequestIdentity::Authenticated(claims),
            Err(JwtError::TokenExpired) => RequestIdentity::Rejected(TokenRejection::Expired),
            Err(_) => RequestIdentity::Rejected(TokenRejection::Invalid),
        }
    }

    /// 인증된 경우 역할.
    pub fn role(&self) -> Option<Role> {
        match self {
            RequestIdentity::Authenticated(claims) => Some(claims.role),
            _ => None,
        }
    }
}

/// `Bearer <token>`에서 토큰 추출. 스킴은 대소문자를 구분하지 않습니다.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim_start().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// JWT 인증 에러.
#[derive(Debug, thiserror::Error)]
pub enum JwtAuthError {
    #[error("인증 토큰이 필요합니다")]
    MissingToken,
    #[error("잘못된 Authorization 헤더 형식")]
    InvalidAuthHeader,
    #[error("토큰이 만료되었습니다")]
    TokenExpired,
    #[error("유효하지 않은 토큰")]
    InvalidToken,
    #[error("권한이 부족합니다")]
    InsufficientRole,
}

impl JwtAuthError {
    /// 응답 에러 코드.
    pub fn code(&self) -> &'static str {
        match self {
            JwtAuthError::MissingToken => "MISSING_TOKEN",
            JwtAuthError::InvalidAuthHeader => "INVALID_AUTH_HEADER",
            JwtAuthError::TokenExpired => "TOKEN_EXPIRED",
            JwtAuthError::InvalidToken => "INVALID_TOKEN",
            JwtAuthError::InsufficientRole => "INSUFFICIENT_ROLE",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            JwtAuthError::InsufficientRole => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for JwtAuthError {
    fn into_response(self) -> Response {
        ApiErrorResponse::new(self.code(), self.to_string()).into_response_with(self.status())
    }
}

/// 역할 검사 미들웨어 상태.
#[derive(Clone)]
pub struct RoleGate {
    codec: Arc<TokenCodec>,
    required: Role,
}

/// 특정 역할 이상의 권한을 요구하는 미들웨어 상태 생성.
///
/// # 사용 예시
///
/// ```rust,ignore
/// Router::new()
///     .route("/", get(list_users))
///     .route_layer(middleware::from_fn_with_state(
///         require_role(codec, Role::Admin),
///         role_gate,
///     ))
/// ```
pub fn require_role(codec: Arc<TokenCodec>, required: Role) -> RoleGate {
    RoleGate { codec, required }
}

impl RoleGate {
    /// 신원이 요구 역할을 충족하는지 확인.
    pub fn check(&self, identity: &RequestIdentity) -> Result<(), JwtAuthError> {
        match authorize(self.required, identity.role()) {
            Ok(()) => Ok(()),
            Err(AccessDenied::Unauthenticated) => Err(match identity {
                RequestIdentity::Rejected(TokenRejection::MalformedHeader) => {
                    JwtAuthError::InvalidAuthHeader
                }
                RequestIdentity::Rejected(TokenRejection::Expired) => JwtAuthError::TokenExpired,
                RequestIdentity::Rejected(TokenRejection::Invalid) => JwtAuthError::InvalidToken,
                _ => JwtAuthError::MissingToken,
            }),
            Err(AccessDenied::InsufficientRole { required, actual }) => {
                warn!(%required, %actual, "Access denied: insufficient role");
                Err(JwtAuthError::InsufficientRole)
            }
        }
    }
}

/// 역할 검사 미들웨어.
///
/// `Public` 라우트에서도 유효한 토큰이 있으면 Claims를 전달합니다.
pub async fn role_gate(State(gate): State<RoleGate>, mut request: Request, next: Next) -> Response {
    let identity = RequestIdentity::from_headers(request.headers(), &gate.codec);

    if let Err(rejection) = gate.check(&identity) {
        record_access_denied(rejection.code());
        return rejection.into_response();
    }

    if let RequestIdentity::Authenticated(claims) = identity {
        request.extensions_mut().insert(claims);
    }

    next.run(request).await
}

/// JWT 인증 추출기.
///
/// [`role_gate`]를 통과한 요청에서 인증된 사용자 정보를 추출합니다.
///
/// # 사용 예시
///
/// ```rust,ignore
/// async fn protected_handler(
///     JwtAuth(claims): JwtAuth,
/// ) -> impl IntoResponse {
///     format!("Authenticated user: {}", claims.email)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct JwtAuth(pub Claims);

impl<S> FromRequestParts<S> for JwtAuth
where
    S: Send + Sync,
{
    type Rejection = JwtAuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(JwtAuth)
            .ok_or(JwtAuthError::MissingToken)
    }
}

/// 선택적 JWT 인증 추출기.
///
/// 공개 라우트에서 인증 여부에 따라 다르게 동작할 때 사용합니다.
#[derive(Debug, Clone)]
pub struct OptionalJwtAuth(pub Option<Claims>);

impl<S> FromRequestParts<S> for OptionalJwtAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalJwtAuth(parts.extensions.get::<Claims>().cloned()))
    }
}
