//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/auth` - 회원가입, 로그인, 토큰 갱신, 로그아웃 (공개)
//! - `/users/me` - 내 정보 (User 이상)
//! - `/users` - 사용자 목록 (Admin)

pub mod auth;
pub mod health;
pub mod users;

pub use auth::{auth_router, LoginRequest, LoginResponse, LogoutResponse, SignUpRequest, SignUpResponse};
pub use health::{health_router, HealthResponse};
pub use users::users_router;

use axum::Router;
use std::sync::Arc;

use crate::auth::TokenCodec;
use crate::state::AppState;

/// 전체 API 라우터 생성.
///
/// 역할 검사 미들웨어가 토큰을 검증할 수 있도록 코덱을 받습니다.
pub fn create_api_router(codec: Arc<TokenCodec>) -> Router<Arc<AppState>> {
    Router::new()
        .nest("/health", health_router())
        .nest("/auth", auth_router(codec.clone()))
        .nest("/users", users_router(codec))
}
