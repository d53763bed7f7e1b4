//! 인메모리 사용자 저장소.
//!
//! 데이터베이스 없이 실행할 때와 테스트에서 사용합니다.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use ollm_core::{NewUser, Role, StoreError, StoreResult, User, UserStore};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Inner {
    users: BTreeMap<i64, User>,
    next_id: i64,
}

/// 인메모리 사용자 저장소.
///
/// 이메일 중복 검사와 삽입은 하나의 쓰기 잠금 안에서 수행됩니다.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<Inner>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 사용자 역할 변경. 사용자가 없으면 `false`.
    pub async fn set_role(&self, id: i64, role: Role) -> bool {
        let mut inner = self.inner.write().await;
        match inner.users.get_mut(&id) {
            Some(user) => {
                user.role = role;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn save(&self, user: NewUser) -> StoreResult<User> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::AlreadyExists(user.email));
        }

        inner.next_id += 1;
        let saved = User {
            id: inner.next_id,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: Utc::now(),
        };
        inner.users.insert(saved.id, saved.clone());
        Ok(saved)
    }

    async fn find_all(&self) -> StoreResult<Vec<User>> {
        Ok(self.inner.read().await.users.values().cloned().collect())
    }
}
