//! 설정 관리.
//!
//! 기본값 → `config/default.toml` → `config/{APP_ENV}.toml` → 환경 변수(`OLLM__` 접두사)
//! 순서로 설정을 병합합니다. 키 자료는 [`SecretString`]으로 보관됩니다.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// 환경 변수 접두사.
pub const ENV_PREFIX: &str = "OLLM";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// 서버 설정
    pub server: ServerConfig,
    /// 데이터베이스 설정
    pub database: DatabaseConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
    /// JWT 설정
    pub jwt: JwtConfig,
    /// 비밀번호 해싱 파라미터
    pub password: PasswordConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// CORS 허용 origin 목록 (비어 있으면 모든 origin 허용, 자격 증명 불허)
    #[serde(default)]
    pub cors_allow_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_allow_origins: Vec::new(),
        }
    }
}

/// 데이터베이스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// 연결 URL (없으면 인메모리 저장소 사용)
    #[serde(default)]
    pub url: Option<String>,
    /// 최대 연결 수
    pub max_connections: u32,
    /// 연결 타임아웃 (초)
    pub connection_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            connection_timeout_secs: 10,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// JWT 설정.
///
/// 키는 base64로 인코딩된 PEM 문자열입니다.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// RSA 개인 키 (base64 PEM)
    pub private_key_base64: SecretString,
    /// RSA 공개 키 (base64 PEM)
    pub public_key_base64: SecretString,
    /// Access Token 만료 시간 (분)
    pub access_expiration_min: i64,
    /// Refresh Token 만료 시간 (일)
    pub refresh_expiration_day: i64,
    /// Refresh Token 쿠키 속성
    pub cookie: CookieConfig,
}

/// Refresh Token 쿠키 속성.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CookieConfig {
    pub secure: bool,
    pub http_only: bool,
    /// `strict`, `lax`, `none` (알 수 없는 값은 lax)
    pub same_site: String,
    /// 비어 있으면 Domain 속성을 생략
    #[serde(default)]
    pub domain: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            secure: true,
            http_only: true,
            same_site: "lax".to_string(),
            domain: String::new(),
        }
    }
}

impl CookieConfig {
    /// SameSite 모드 파싱.
    pub fn same_site(&self) -> SameSite {
        match self.same_site.to_lowercase().as_str() {
            "strict" => SameSite::Strict,
            "none" => SameSite::None,
            _ => SameSite::Lax,
        }
    }
}

/// 쿠키 SameSite 모드.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl std::fmt::Display for SameSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        };
        f.write_str(s)
    }
}

/// Argon2id 파라미터 설정.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct PasswordConfig {
    /// 반복 횟수
    pub time_cost: u32,
    /// 메모리 비용 (KB)
    pub memory_kb: u32,
    /// 병렬도
    pub parallelism: u32,
    /// 출력 길이 (바이트)
    pub output_len: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            time_cost: 3,
            memory_kb: 64 * 1024,
            parallelism: 4,
            output_len: 32,
        }
    }
}

impl AppConfig {
    /// 기본값이 설정된 빌더.
    ///
    /// JWT 키에는 기본값이 없으므로 설정되지 않으면 로드가 실패합니다.
    fn builder_with_defaults(
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("database.max_connections", 10)?
            .set_default("database.connection_timeout_secs", 10)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .set_default("jwt.access_expiration_min", 15)?
            .set_default("jwt.refresh_expiration_day", 7)?
            .set_default("jwt.cookie.secure", true)?
            .set_default("jwt.cookie.http_only", true)?
            .set_default("jwt.cookie.same_site", "lax")?
            .set_default("jwt.cookie.domain", "")?
            .set_default("password.time_cost", 3)?
            .set_default("password.memory_kb", 64 * 1024)?
            .set_default("password.parallelism", 4)?
            .set_default("password.output_len", 32)
    }

    /// 설정 디렉토리와 환경 변수에서 설정을 로드합니다.
    ///
    /// # Arguments
    ///
    /// * `dir` - 설정 파일 디렉토리 (예: "config")
    /// * `env` - 실행 환경 이름 (예: "dev", "prod")
    pub fn load(dir: &str, env: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = Self::builder_with_defaults()?
            .add_source(config::File::with_name(&format!("{dir}/default")).required(false));

        if let Some(env) = env {
            builder = builder
                .add_source(config::File::with_name(&format!("{dir}/{env}")).required(false));
        }

        builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_allow_origins")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// `APP_ENV` 환경 변수를 사용해 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        let env = std::env::var("APP_ENV").ok();
        Self::load("config", env.as_deref())
    }

    /// TOML 문자열에서 설정을 로드합니다 (환경 변수 무시).
    pub fn from_toml_str(toml: &str) -> Result<Self, config::ConfigError> {
        Self::builder_with_defaults()?
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    const MINIMAL: &str = r#"
        [jwt]
        private_key_base64 = "cHJpdmF0ZQ=="
        public_key_base64 = "cHVibGlj"
    "#;

    #[test]
    fn test_defaults_applied() {
        let config = AppConfig::from_toml_str(MINIMAL).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.jwt.access_expiration_min, 15);
        assert_eq!(config.jwt.refresh_expiration_day, 7);
        assert!(config.jwt.cookie.http_only);
        assert_eq!(config.jwt.cookie.same_site(), SameSite::Lax);
        assert_eq!(config.password.time_cost, 3);
        assert_eq!(config.password.memory_kb, 65536);
        assert_eq!(config.password.parallelism, 4);
        assert_eq!(config.password.output_len, 32);
        assert!(config.database.url.is_none());
        assert_eq!(config.jwt.private_key_base64.expose_secret(), "cHJpdmF0ZQ==");
    }

    #[test]
    fn test_missing_keys_fail() {
        assert!(AppConfig::from_toml_str("").is_err());
    }

    #[test]
    fn test_overrides() {
        let toml = format!(
            "{MINIMAL}\n[jwt.cookie]\nsame_site = \"Strict\"\nsecure = false\ndomain = \"example.com\"\n[server]\nport = 9000\n"
        );
        let config = AppConfig::from_toml_str(&toml).unwrap();

        assert_eq!(config.server.port, 9000);
        assert!(config.server.cors_allow_origins.is_empty());
        assert_eq!(config.jwt.cookie.same_site(), SameSite::Strict);
        assert!(!config.jwt.cookie.secure);
        assert_eq!(config.jwt.cookie.domain, "example.com");
    }

    #[test]
    fn test_unknown_same_site_falls_back_to_lax() {
        let cookie = CookieConfig {
            same_site: "sideways".to_string(),
            ..Default::default()
        };
        assert_eq!(cookie.same_site(), SameSite::Lax);
        assert_eq!(SameSite::None.to_string(), "None");
    }

    #[test]
    fn test_secret_not_in_debug_output() {
        let config = AppConfig::from_toml_str(MINIMAL).unwrap();
        let debug = format!("{:?}", config.jwt);
        assert!(!debug.contains("cHJpdmF0ZQ=="));
    }
}
