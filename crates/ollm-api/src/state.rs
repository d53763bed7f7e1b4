//! 애플리케이션 상태.
//!
//! 모든 핸들러가 공유하는 서비스와 설정.

use std::sync::Arc;

use ollm_core::{CookieConfig, UserStore};

use crate::auth::{AuthService, AuthSettings, TokenCodec};

/// 공유 애플리케이션 상태.
pub struct AppState {
    /// 인증 서비스
    pub auth: AuthService,
    /// 토큰 검증기 (역할 검사 미들웨어와 공유)
    pub codec: Arc<TokenCodec>,
    /// 사용자 저장소
    pub users: Arc<dyn UserStore>,
    /// Refresh Token 쿠키 속성
    pub cookie: CookieConfig,
    /// API 버전
    pub version: String,
    /// 서버 시작 시각
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserStore>,
        codec: Arc<TokenCodec>,
        settings: AuthSettings,
        cookie: CookieConfig,
    ) -> Self {
        Self {
            auth: AuthService::new(users.clone(), codec.clone(), settings),
            codec,
            users,
            cookie,
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: chrono::Utc::now(),
        }
    }

    /// 서버 업타임 (초).
    pub fn uptime_secs(&self) -> i64 {
        (chrono::Utc::now() - self.started_at).num_seconds()
    }
}

/// 테스트용 AppState 생성.
///
/// 인메모리 저장소와 테스트 키를 사용합니다.
#[cfg(test)]
pub fn create_test_state() -> AppState {
    use crate::auth::testing::{test_codec, FAST_HASH};
    use crate::repository::InMemoryUserStore;

    let settings = AuthSettings {
        access_ttl: chrono::Duration::minutes(15),
        refresh_ttl: chrono::Duration::days(7),
        hash_params: FAST_HASH,
    };
    AppState::new(
        Arc::new(InMemoryUserStore::new()),
        Arc::new(test_codec()),
        settings,
        CookieConfig::default(),
    )
}
