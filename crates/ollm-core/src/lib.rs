//! # OLLM Core
//!
//! OLLM 백엔드 전반에서 사용되는 핵심 도메인 타입을 제공합니다:
//! - 사용자 역할 및 역할 순위
//! - 사용자 계정과 저장소 인터페이스 ([`UserStore`])
//! - 저장소 에러 분류
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
