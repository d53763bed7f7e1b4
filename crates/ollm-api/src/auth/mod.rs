//! 인증 및 권한 부여.
//!
//! RS256 JWT 기반 인증과 역할 순위 기반 접근 제어를 제공합니다.
//!
//! # 구성 요소
//!
//! - [`hash_password`] / [`verify_password`]: Argon2id 비밀번호 해싱
//! - [`TokenCodec`]: Access/Refresh Token 발급 및 검증
//! - [`authorize`]: 요구 역할과 요청자 역할 비교
//! - [`role_gate`]: 라우트별 역할 검사 미들웨어
//! - [`AuthService`]: 회원가입, 로그인, 토큰 갱신, 로그아웃
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! // role_gate를 통과한 라우트에서 JwtAuth 추출기 사용
//! async fn protected_handler(
//!     JwtAuth(claims): JwtAuth,
//! ) -> impl IntoResponse {
//!     format!("Hello, {}!", claims.email)
//! }
//! ```

pub mod cookie;
mod jwt;
mod middleware;
mod password;
mod roles;
mod service;

#[cfg(test)]
pub(crate) mod testing;

pub use jwt::{Claims, JwtError, TokenCodec, TokenKeys, TokenKind, TokenPair};
pub use middleware::{
    require_role, role_gate, JwtAuth, JwtAuthError, OptionalJwtAuth, RequestIdentity, RoleGate,
    TokenRejection,
};
pub use password::{hash_password, verify_password, HashParams, PasswordError};
pub use roles::{authorize, AccessDenied};
pub use service::{AuthError, AuthService, AuthSettings, SettingsError, TokenGrant};
