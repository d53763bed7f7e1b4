//! OLLM 인증 API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Argon2id 비밀번호 해싱
//! - RS256 JWT Access/Refresh Token
//! - 역할 순위 기반 라우트 접근 제어
//! - 회원가입/로그인/토큰 갱신/로그아웃 REST API
//! - Prometheus 메트릭
//!
//! # 모듈 구성
//!
//! - [`auth`]: 비밀번호, 토큰, 역할 검사, 인증 흐름
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`repository`]: 사용자 저장소 구현
//! - [`server`]: 라우터 조합과 전역 미들웨어
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`middleware`]: HTTP 미들웨어

pub mod auth;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod repository;
pub mod routes;
pub mod server;
pub mod state;

pub use auth::{hash_password, verify_password, AuthService, Claims, JwtAuth, TokenCodec, TokenKeys};
pub use error::{ApiErrorResponse, ApiResult};
pub use metrics::setup_metrics_recorder;
pub use server::create_router;
pub use state::AppState;
