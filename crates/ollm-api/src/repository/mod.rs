//! Repository pattern for database operations.
//!
//! [`UserStore`](ollm_core::UserStore) 구현체를 제공합니다.
//! `DATABASE_URL`이 설정되면 PostgreSQL, 아니면 인메모리 저장소를 사용합니다.

mod memory;
mod users;

pub use memory::InMemoryUserStore;
pub use users::PgUserRepository;
