//! 인증 흐름.
//!
//! 회원가입, 로그인, 토큰 갱신, 로그아웃을 담당합니다.
//! Argon2id 연산은 비동기 런타임을 막지 않도록 블로킹 스레드에서 실행됩니다.

use std::sync::Arc;

use chrono::Duration;
use ollm_core::{JwtConfig, NewUser, PasswordConfig, StoreError, User, UserStore};
use tracing::{debug, error, info, warn};

use super::{hash_password, verify_password, HashParams, JwtError, PasswordError, TokenCodec, TokenPair};
use crate::metrics::{record_auth_event, AuthEvent};

/// 인증 에러.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// 입력 값 누락 또는 형식 오류
    #[error("잘못된 입력: {0}")]
    InvalidInput(&'static str),
    /// 이메일 또는 비밀번호 불일치
    #[error("이메일 또는 비밀번호가 올바르지 않습니다")]
    InvalidCredentials,
    /// 이미 가입된 이메일
    #[error("이미 존재하는 사용자입니다: {0}")]
    AlreadyExists(String),
    /// Refresh Token 누락/무효 또는 사용자 없음
    #[error("인증되지 않은 요청입니다")]
    Unauthorized,
    #[error("비밀번호 처리 실패: {0}")]
    Password(#[from] PasswordError),
    #[error("토큰 처리 실패: {0}")]
    Token(#[from] JwtError),
    #[error("저장소 에러: {0}")]
    Store(StoreError),
    #[error("내부 에러: {0}")]
    Internal(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AlreadyExists(email) => AuthError::AlreadyExists(email),
            other => AuthError::Store(other),
        }
    }
}

/// Access Token 유효 기간 상한 (분, 하루)
pub const MAX_ACCESS_TTL_MIN: i64 = 24 * 60;
/// Refresh Token 유효 기간 상한 (일)
pub const MAX_REFRESH_TTL_DAY: i64 = 365;

/// 인증 설정 에러.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("jwt.access_expiration_min은 1 이상 1440 이하여야 합니다: {0}")]
    AccessTtl(i64),
    #[error("jwt.refresh_expiration_day는 1 이상 365 이하여야 합니다: {0}")]
    RefreshTtl(i64),
    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// 인증 동작 설정.
#[derive(Debug, Clone, Copy)]
pub struct AuthSettings {
    /// Access Token 유효 기간
    pub access_ttl: Duration,
    /// Refresh Token 유효 기간
    pub refresh_ttl: Duration,
    /// 새 해시에 사용할 Argon2id 파라미터
    pub hash_params: HashParams,
}

impl AuthSettings {
    /// 설정 파일 값으로 생성.
    ///
    /// 토큰 유효 기간이나 해시 파라미터가 유효하지 않으면 시작 시점에 실패합니다.
    pub fn from_config(jwt: &JwtConfig, password: &PasswordConfig) -> Result<Self, SettingsError> {
        if !(1..=MAX_ACCESS_TTL_MIN).contains(&jwt.access_expiration_min) {
            return Err(SettingsError::AccessTtl(jwt.access_expiration_min));
        }
        if !(1..=MAX_REFRESH_TTL_DAY).contains(&jwt.refresh_expiration_day) {
            return Err(SettingsError::RefreshTtl(jwt.refresh_expiration_day));
        }

        let hash_params = HashParams::from(*password);
        hash_params.validate()?;

        Ok(Self {
            access_ttl: Duration::minutes(jwt.access_expiration_min),
            refresh_ttl: Duration::days(jwt.refresh_expiration_day),
            hash_params,
        })
    }
}

/// 로그인/갱신 결과.
#[derive(Debug, Clone)]
pub struct TokenGrant {
    /// 토큰이 발급된 사용자
    pub user: User,
    /// 발급된 토큰 쌍
    pub tokens: TokenPair,
}

/// 인증 서비스.
pub struct AuthService {
    users: Arc<dyn UserStore>,
    codec: Arc<TokenCodec>,
    settings: AuthSettings,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, codec: Arc<TokenCodec>, settings: AuthSettings) -> Self {
        Self {
            users,
            codec,
            settings,
        }
    }

    /// 회원가입.
    ///
    /// 비밀번호를 해싱한 뒤 기본 역할(User)로 계정을 저장합니다.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            record_auth_event(AuthEvent::SignUp, "invalid_input");
            return Err(AuthError::InvalidInput("email and password are required"));
        }

        let params = self.settings.hash_params;
        let password = password.to_owned();
        let password_hash =
            run_blocking(move || hash_password(&password, Some(&params))).await??;

        match self.users.save(NewUser::new(email, password_hash)).await {
            Ok(user) => {
                record_auth_event(AuthEvent::SignUp, "success");
                info!(user_id = user.id, "User signed up");
                Ok(user)
            }
            Err(StoreError::AlreadyExists(email)) => {
                record_auth_event(AuthEvent::SignUp, "conflict");
                warn!("Sign up rejected: email already registered");
                debug!(email = %email, "Conflicting sign up email");
                Err(AuthError::AlreadyExists(email))
            }
            Err(e) => {
                record_auth_event(AuthEvent::SignUp, "error");
                Err(e.into())
            }
        }
    }

    /// 로그인.
    ///
    /// 사용자 없음, 비밀번호 불일치, 저장된 해시 손상은 모두
    /// [`AuthError::InvalidCredentials`]로 보고됩니다.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenGrant, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            record_auth_event(AuthEvent::Login, "invalid_input");
            return Err(AuthError::InvalidInput("email and password are required"));
        }

        let Some(user) = self.users.find_by_email(email).await? else {
            record_auth_event(AuthEvent::Login, "invalid_credentials");
            warn!("Login failed: unknown email");
            debug!(email = %email, "Unknown login email");
            return Err(AuthError::InvalidCredentials);
        };

        let password = password.to_owned();
        let stored_hash = user.password_hash.clone();
        let verified = run_blocking(move || verify_password(&password, &stored_hash)).await?;

        match verified {
            Ok(true) => {}
            Ok(false) => {
                record_auth_event(AuthEvent::Login, "invalid_credentials");
                warn!(user_id = user.id, "Login failed: password mismatch");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => {
                record_auth_event(AuthEvent::Login, "invalid_credentials");
                error!(user_id = user.id, error = %e, "Stored password hash is unusable");
                return Err(AuthError::InvalidCredentials);
            }
        }

        let tokens = self.issue_tokens(&user)?;
        record_auth_event(AuthEvent::Login, "success");
        info!(user_id = user.id, role = %user.role, "User logged in");

        Ok(TokenGrant { user, tokens })
    }

    /// Refresh Token으로 새 토큰 쌍 발급.
    ///
    /// 역할은 토큰이 아닌 저장소에서 다시 읽어 반영합니다.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenGrant, AuthError> {
        let claims = match self.codec.verify_refresh(refresh_token) {
            Ok(claims) => claims,
            Err(e) => {
                record_auth_event(AuthEvent::Refresh, "invalid_token");
                warn!(error = %e, "Refresh rejected");
                return Err(AuthError::Unauthorized);
            }
        };

        let Some(user) = self.users.find_by_id(claims.user_id).await? else {
            record_auth_event(AuthEvent::Refresh, "unknown_user");
            warn!(user_id = claims.user_id, "Refresh rejected: user no longer exists");
            return Err(AuthError::Unauthorized);
        };

        let tokens = self.issue_tokens(&user)?;
        record_auth_event(AuthEvent::Refresh, "success");
        info!(user_id = user.id, role = %user.role, "Tokens refreshed");

        Ok(TokenGrant { user, tokens })
    }

    /// 로그아웃.
    ///
    /// 서버 측 상태는 없으며 호출자는 Refresh Token 쿠키를 만료시키기만 하면 됩니다.
    pub fn logout(&self, user_id: Option<i64>) {
        match user_id {
            Some(user_id) => info!(user_id, "User logged out"),
            None => info!("Anonymous logout"),
        }
    }

    fn issue_tokens(&self, user: &User) -> Result<TokenPair, AuthError> {
        Ok(self.codec.issue_pair(
            user.id,
            &user.email,
            user.role,
            self.settings.access_ttl,
            self.settings.refresh_ttl,
        )?)
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T, AuthError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AuthError::Internal(format!("blocking task failed: {e}")))
}
