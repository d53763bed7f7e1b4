//! 사용자 계정 및 저장소 인터페이스.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Role;
use crate::error::StoreResult;

/// 저장된 사용자 계정.
///
/// 비밀번호 해시는 직렬화되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// 사용자 ID
    pub id: i64,
    /// 이메일 (고유)
    pub email: String,
    /// Argon2id 해시 문자열
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// 사용자 역할
    pub role: Role,
    /// 생성 시각
    pub created_at: DateTime<Utc>,
}

/// 저장 전 사용자 계정.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

impl NewUser {
    /// 기본 역할(User)로 새 계정 생성.
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password_hash: password_hash.into(),
            role: Role::default(),
        }
    }

    /// 역할 지정.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}

/// 사용자 저장소.
///
/// 구현체는 이메일 고유 제약 위반을
/// [`StoreError::AlreadyExists`](crate::StoreError::AlreadyExists)로 변환해야 합니다.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 이메일로 사용자 조회.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// ID로 사용자 조회.
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>>;

    /// 새 사용자 저장.
    async fn save(&self, user: NewUser) -> StoreResult<User>;

    /// 전체 사용자 목록 (ID 오름차순).
    async fn find_all(&self) -> StoreResult<Vec<User>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: 7,
            email: "a@x.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: Role::User,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["role"], "User");
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn test_new_user_defaults_to_user_role() {
        let user = NewUser::new("a@x.com", "hash");
        assert_eq!(user.role, Role::User);

        let admin = NewUser::new("b@x.com", "hash").with_role(Role::Admin);
        assert_eq!(admin.role, Role::Admin);
    }
}
