//! 인증 endpoint.
//!
//! 회원가입, 로그인, 토큰 갱신, 로그아웃을 처리합니다.
//! Refresh Token은 HttpOnly 쿠키로만 주고받습니다.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use ollm_core::Role;
use serde::{Deserialize, Serialize};

use crate::auth::cookie::{expired_refresh_cookie, read_cookie, refresh_cookie, to_header_value, REFRESH_TOKEN_COOKIE};
use crate::auth::{require_role, role_gate, AuthError, OptionalJwtAuth, TokenCodec, TokenGrant};
use crate::state::AppState;

/// 회원가입 요청.
#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
}

/// 회원가입 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct SignUpResponse {
    pub id: i64,
    pub email: String,
    pub role: Role,
}

/// 로그인 요청.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// 로그인/토큰 갱신 응답.
///
/// Refresh Token은 본문에 포함되지 않습니다.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub id: i64,
    pub email: String,
    pub role: Role,
    pub access_token: String,
    pub token_type: String,
    /// Access Token 만료 시간 (초)
    pub expires_in: i64,
}

/// 로그아웃 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub message: String,
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AuthError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| {
            tracing::debug!(error = %e, "Rejected request body");
            AuthError::InvalidInput("invalid request body")
        })
}

/// 토큰 발급 응답 생성 (Access Token 본문 + Refresh Token 쿠키).
fn token_response(state: &AppState, grant: TokenGrant) -> Result<Response, AuthError> {
    let cookie = refresh_cookie(
        &state.cookie,
        &grant.tokens.refresh_token,
        grant.tokens.refresh_expires_in,
    );
    let cookie = to_header_value(cookie)
        .ok_or_else(|| AuthError::Internal("refresh cookie is not a valid header value".to_string()))?;

    let body = LoginResponse {
        id: grant.user.id,
        email: grant.user.email,
        role: grant.user.role,
        access_token: grant.tokens.access_token,
        token_type: grant.tokens.token_type,
        expires_in: grant.tokens.expires_in,
    };

    Ok(([(SET_COOKIE, cookie)], Json(body)).into_response())
}

/// 회원가입.
///
/// POST /auth/signup
pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SignUpRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let request = json_body(payload)?;
    let user = state.auth.sign_up(&request.email, &request.password).await?;

    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            id: user.id,
            email: user.email,
            role: user.role,
        }),
    ))
}

/// 로그인.
///
/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, AuthError> {
    let request = json_body(payload)?;
    let grant = state.auth.login(&request.email, &request.password).await?;
    token_response(&state, grant)
}

/// 토큰 갱신.
///
/// POST /auth/refresh
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, AuthError> {
    let token = read_cookie(&headers, REFRESH_TOKEN_COOKIE).ok_or(AuthError::Unauthorized)?;
    let grant = state.auth.refresh_token(&token).await?;
    token_response(&state, grant)
}

/// 로그아웃.
///
/// POST /auth/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    OptionalJwtAuth(claims): OptionalJwtAuth,
) -> Result<Response, AuthError> {
    state.auth.logout(claims.map(|c| c.user_id));

    let cookie = to_header_value(expired_refresh_cookie(&state.cookie))
        .ok_or_else(|| AuthError::Internal("logout cookie is not a valid header value".to_string()))?;

    Ok((
        [(SET_COOKIE, cookie)],
        Json(LogoutResponse {
            message: "로그아웃되었습니다".to_string(),
        }),
    )
        .into_response())
}

/// 인증 라우터 생성.
///
/// 모든 라우트는 공개이며, 로그아웃은 유효한 Access Token이 있으면 사용자 ID를 기록합니다.
pub fn auth_router(codec: Arc<TokenCodec>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/signup", post(sign_up))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route_layer(middleware::from_fn_with_state(
            require_role(codec, Role::Public),
            role_gate,
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiErrorResponse;
    use crate::state::create_test_state;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    fn app() -> Router {
        let state = Arc::new(create_test_state());
        Router::new()
            .nest("/auth", auth_router(state.codec.clone()))
            .with_state(state)
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn error_code(response: Response) -> String {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice::<ApiErrorResponse>(&body).unwrap().code
    }

    #[tokio::test]
    async fn test_signup_returns_created() {
        let response = app()
            .oneshot(post_json("/auth/signup", r#"{"email":"a@x.com","password":"Passw0rd!"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let created: SignUpResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(created.email, "a@x.com");
        assert_eq!(created.role, Role::User);
        assert!(!String::from_utf8_lossy(&body).contains("password"));
    }

    #[tokio::test]
    async fn test_signup_malformed_body() {
        let response = app()
            .oneshot(post_json("/auth/signup", r#"{"email":"a@x.com"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_code(response).await, "INVALID_INPUT");

        let response = app()
            .oneshot(post_json("/auth/signup", r#"{"email":"","password":"x"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_sets_refresh_cookie() {
        let app = app();
        app.clone()
            .oneshot(post_json("/auth/signup", r#"{"email":"a@x.com","password":"Passw0rd!"}"#))
            .await
            .unwrap();

        let response = app
            .oneshot(post_json("/auth/login", r#"{"email":"a@x.com","password":"Passw0rd!"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap().to_string();
        assert!(cookie.starts_with("refresh_token="));
        assert!(cookie.contains("HttpOnly"));

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let login: LoginResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(login.token_type, "Bearer");
        assert_eq!(login.expires_in, 15 * 60);
        assert!(!String::from_utf8_lossy(&body).contains("refresh_token"));
    }

    #[tokio::test]
    async fn test_refresh_without_cookie() {
        let response = app()
            .oneshot(Request::builder().method("POST").uri("/auth/refresh").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(response).await, "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_logout_expires_cookie() {
        let response = app()
            .oneshot(Request::builder().method("POST").uri("/auth/logout").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.contains("Max-Age=0"));
    }
}
