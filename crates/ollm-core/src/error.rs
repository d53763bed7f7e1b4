//! 저장소 계층 에러 타입.
//!
//! 저장소 구현(PostgreSQL, 인메모리)이 공통으로 반환하는 에러를 정의합니다.

use thiserror::Error;

/// 사용자 저장소 에러.
#[derive(Debug, Error)]
pub enum StoreError {
    /// 고유 제약 조건 위반 (이메일 중복)
    #[error("이미 존재합니다: {0}")]
    AlreadyExists(String),

    /// 데이터베이스 에러
    #[error("데이터베이스 에러: {0}")]
    Database(String),
}

/// 저장소 작업을 위한 Result 타입.
pub type StoreResult<T> = Result<T, StoreError>;
