//! JWT 토큰 처리.
//!
//! RS256 서명 기반 Access Token 및 Refresh Token 발급/검증 로직.
//! 두 토큰은 같은 키 쌍으로 서명되며 `type` 클레임으로만 구분됩니다.

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use ollm_core::Role;
use serde::{Deserialize, Serialize};

/// 토큰 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Access => f.write_str("access"),
            TokenKind::Refresh => f.write_str("refresh"),
        }
    }
}

/// JWT 페이로드.
///
/// Access/Refresh Token 모두 같은 구조를 사용합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// 사용자 ID
    pub user_id: i64,
    /// 사용자 이메일
    pub email: String,
    /// 발급 시점의 사용자 역할
    pub role: Role,
    /// 토큰 종류
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// Issued At - 토큰 발급 시간 (Unix timestamp)
    pub iat: i64,
    /// Expiration - 토큰 만료 시간 (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// 새로운 Claims 생성.
    ///
    /// # Arguments
    ///
    /// * `user_id` - 사용자 ID
    /// * `email` - 사용자 이메일
    /// * `role` - 사용자 역할
    /// * `kind` - 토큰 종류
    /// * `ttl` - 유효 기간
    /// * `now` - 발급 시각
    ///
    /// 만료 시각이 표현 범위를 벗어나면 [`JwtError::ExpiryOutOfRange`]를 반환합니다.
    pub fn new(
        user_id: i64,
        email: impl Into<String>,
        role: Role,
        kind: TokenKind,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<Self, JwtError> {
        let expires_at = expiry(now, ttl)?;
        Ok(Self {
            user_id,
            email: email.into(),
            role,
            kind,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        })
    }

    /// 만료 시각.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }
}

fn expiry(now: DateTime<Utc>, ttl: Duration) -> Result<DateTime<Utc>, JwtError> {
    now.checked_add_signed(ttl).ok_or(JwtError::ExpiryOutOfRange)
}

/// Access Token + Refresh Token 페어.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    /// Access Token
    pub access_token: String,
    /// Refresh Token
    pub refresh_token: String,
    /// Access Token 만료 시간 (초)
    pub expires_in: i64,
    /// Refresh Token 만료 시간 (초)
    pub refresh_expires_in: i64,
    /// Refresh Token 만료 시각
    pub refresh_expires_at: DateTime<Utc>,
    /// 토큰 타입 (항상 "Bearer")
    pub token_type: String,
}

/// JWT 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("RSA 키 파싱 실패: {0}")]
    KeyParsing(String),
    #[error("토큰 인코딩 실패: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),
    #[error("토큰 만료 시각이 표현 범위를 벗어났습니다")]
    ExpiryOutOfRange,
    #[error("토큰이 만료되었습니다")]
    TokenExpired,
    #[error("유효하지 않은 토큰")]
    InvalidToken,
}

/// RS256 서명/검증 키 쌍.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    /// PEM 바이트에서 키 로드.
    pub fn from_pem(private_pem: &[u8], public_pem: &[u8]) -> Result<Self, JwtError> {
        let encoding = EncodingKey::from_rsa_pem(private_pem)
            .map_err(|e| JwtError::KeyParsing(format!("private key: {e}")))?;
        let decoding = DecodingKey::from_rsa_pem(public_pem)
            .map_err(|e| JwtError::KeyParsing(format!("public key: {e}")))?;
        Ok(Self { encoding, decoding })
    }

    /// base64로 인코딩된 PEM 문자열에서 키 로드.
    ///
    /// 환경 변수로 키를 전달할 때 사용하는 형식입니다.
    pub fn from_base64_pem(private_b64: &str, public_b64: &str) -> Result<Self, JwtError> {
        let private_pem = STANDARD
            .decode(private_b64.trim())
            .map_err(|e| JwtError::KeyParsing(format!("private key base64: {e}")))?;
        let public_pem = STANDARD
            .decode(public_b64.trim())
            .map_err(|e| JwtError::KeyParsing(format!("public key base64: {e}")))?;
        Self::from_pem(&private_pem, &public_pem)
    }
}

/// 토큰 발급기 겸 검증기.
///
/// 검증 시 허용 오차(leeway)는 0이며 RS256 이외의 알고리즘은 거부합니다.
#[derive(Clone)]
pub struct TokenCodec {
    keys: TokenKeys,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(keys: TokenKeys) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        Self { keys, validation }
    }

    /// 토큰 발급 (현재 시각 기준).
    pub fn issue(
        &self,
        user_id: i64,
        email: &str,
        role: Role,
        kind: TokenKind,
        ttl: Duration,
    ) -> Result<String, JwtError> {
        self.issue_at(user_id, email, role, kind, ttl, Utc::now())
    }

    /// 지정한 시각 기준으로 토큰 발급.
    ///
    /// 같은 입력과 시각에 대해 항상 같은 토큰을 반환합니다.
    pub fn issue_at(
        &self,
        user_id: i64,
        email: &str,
        role: Role,
        kind: TokenKind,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        let claims = Claims::new(user_id, email, role, kind, ttl, now)?;
        self.sign(&claims)
    }

    /// Claims 서명.
    pub fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::RS256), claims, &self.keys.encoding).map_err(JwtError::from)
    }

    /// 토큰 서명과 만료를 검증하고 Claims 반환.
    ///
    /// 토큰 종류는 확인하지 않습니다. 만료 이외의 모든 결함은
    /// [`JwtError::InvalidToken`]으로 보고됩니다.
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(token, &self.keys.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                _ => JwtError::InvalidToken,
            })
    }

    /// Access Token 검증.
    pub fn verify_access(&self, token: &str) -> Result<Claims, JwtError> {
        self.verify_kind(token, TokenKind::Access)
    }

    /// Refresh Token 검증.
    pub fn verify_refresh(&self, token: &str) -> Result<Claims, JwtError> {
        self.verify_kind(token, TokenKind::Refresh)
    }

    fn verify_kind(&self, token: &str, expected: TokenKind) -> Result<Claims, JwtError> {
        let claims = self.verify(token)?;
        if claims.kind != expected {
            return Err(JwtError::InvalidToken);
        }
        Ok(claims)
    }

    /// Access Token + Refresh Token 쌍 생성.
    ///
    /// 두 토큰은 같은 시각으로 발급됩니다.
    pub fn issue_pair(
        &self,
        user_id: i64,
        email: &str,
        role: Role,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Result<TokenPair, JwtError> {
        let now = Utc::now();
        let refresh_expires_at = expiry(now, refresh_ttl)?;
        let access_token = self.issue_at(user_id, email, role, TokenKind::Access, access_ttl, now)?;
        let refresh_token =
            self.issue_at(user_id, email, role, TokenKind::Refresh, refresh_ttl, now)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: access_ttl.num_seconds(),
            refresh_expires_in: refresh_ttl.num_seconds(),
            refresh_expires_at,
            token_type: "Bearer".to_string(),
        })
    }
}
