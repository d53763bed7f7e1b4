//! Users Repository
//!
//! 사용자 계정 관련 PostgreSQL 연산을 담당합니다.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ollm_core::{NewUser, Role, StoreError, StoreResult, User, UserStore};
use sqlx::{FromRow, PgPool};

/// users 테이블 레코드
#[derive(Debug, Clone, FromRow)]
struct UserRecord {
    id: i64,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRecord> for User {
    type Error = StoreError;

    fn try_from(record: UserRecord) -> Result<Self, Self::Error> {
        let role = Role::parse(&record.role).ok_or_else(|| {
            StoreError::Database(format!("unknown role '{}' for user {}", record.role, record.id))
        })?;

        Ok(User {
            id: record.id,
            email: record.email,
            password_hash: record.password_hash,
            role,
            created_at: record.created_at,
        })
    }
}

/// PostgreSQL 사용자 저장소.
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 스키마 마이그레이션 실행.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

/// 이메일 고유 제약 위반(23505)은 AlreadyExists로 변환.
fn map_db_error(err: sqlx::Error, email: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::AlreadyExists(email.to_string());
        }
    }
    StoreError::Database(err.to_string())
}

#[async_trait]
impl UserStore for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, password_hash, role, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        record.map(User::try_from).transpose()
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, password_hash, role, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        record.map(User::try_from).transpose()
    }

    async fn save(&self, user: NewUser) -> StoreResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (email, password_hash, role)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, role, created_at
            "#,
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, &user.email))?;

        User::try_from(record)
    }

    async fn find_all(&self) -> StoreResult<Vec<User>> {
        let records = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, password_hash, role, created_at FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        records.into_iter().map(User::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(role: &str) -> UserRecord {
        UserRecord {
            id: 3,
            email: "a@x.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
            role: role.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_record_to_user() {
        let user = User::try_from(record("Manager")).unwrap();
        assert_eq!(user.id, 3);
        assert_eq!(user.role, Role::Manager);
    }

    #[test]
    fn test_unknown_role_is_database_error() {
        assert!(matches!(
            User::try_from(record("Root")),
            Err(StoreError::Database(_))
        ));
    }

    #[test]
    fn test_non_database_error_mapping() {
        let err = map_db_error(sqlx::Error::RowNotFound, "a@x.com");
        assert!(matches!(err, StoreError::Database(_)));
    }
}
