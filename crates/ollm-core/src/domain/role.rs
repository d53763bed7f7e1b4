//! 사용자 역할.
//!
//! 역할은 닫힌 집합이며 순위(rank)에 따라 전순서를 가집니다:
//! `Public < User < Manager < Admin`.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// 사용자 역할.
///
/// 높은 역할은 같거나 낮은 역할이 요구되는 모든 곳에 접근할 수 있습니다.
/// `Public`은 토큰이 필요 없는 라우트를 표시하기 위한 역할입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Role {
    /// 공개 - 인증 불필요
    Public,
    /// 일반 사용자
    #[default]
    User,
    /// 매니저 - 게임/매치 관리
    Manager,
    /// 관리자 - 모든 권한 보유
    Admin,
}

impl Role {
    /// 모든 역할 (순위 오름차순).
    pub const ALL: [Role; 4] = [Role::Public, Role::User, Role::Manager, Role::Admin];

    /// 역할의 순위 반환 (높을수록 더 많은 권한).
    pub fn rank(&self) -> u8 {
        match self {
            Role::Public => 0,
            Role::User => 1,
            Role::Manager => 2,
            Role::Admin => 3,
        }
    }

    /// 이 역할이 `required` 이상인지 확인.
    pub fn satisfies(&self, required: Role) -> bool {
        self.rank() >= required.rank()
    }

    /// 문자열에서 역할 파싱 (대소문자 무시).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "public" => Some(Role::Public),
            "user" => Some(Role::User),
            "manager" => Some(Role::Manager),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    /// 저장 및 직렬화에 사용되는 이름.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Public => "Public",
            Role::User => "User",
            Role::Manager => "Manager",
            Role::Admin => "Admin",
        }
    }
}

impl PartialOrd for Role {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Role {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_role_order() {
        assert!(Role::Public < Role::User);
        assert!(Role::User < Role::Manager);
        assert!(Role::Manager < Role::Admin);
        assert_eq!(Role::ALL.iter().max(), Some(&Role::Admin));
    }

    #[test]
    fn test_role_satisfies() {
        assert!(Role::Admin.satisfies(Role::User));
        assert!(Role::Manager.satisfies(Role::Manager));
        assert!(!Role::Manager.satisfies(Role::Admin));
        assert!(Role::Public.satisfies(Role::Public));
        assert!(!Role::Public.satisfies(Role::User));
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("MANAGER"), Some(Role::Manager));
        assert_eq!(Role::parse("User"), Some(Role::User));
        assert_eq!(Role::parse("public"), Some(Role::Public));
        assert_eq!(Role::parse("superuser"), None);
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&Role::Manager).unwrap();
        assert_eq!(json, "\"Manager\"");

        let parsed: Role = serde_json::from_str("\"Admin\"").unwrap();
        assert_eq!(parsed, Role::Admin);

        assert!(serde_json::from_str::<Role>("\"Root\"").is_err());
    }

    #[test]
    fn test_default_role_is_user() {
        assert_eq!(Role::default(), Role::User);
    }

    proptest! {
        #[test]
        fn prop_satisfies_is_monotonic(
            held in prop::sample::select(Role::ALL.to_vec()),
            required in prop::sample::select(Role::ALL.to_vec()),
        ) {
            prop_assert_eq!(held.satisfies(required), held >= required);
            if held.satisfies(required) {
                for higher in Role::ALL.iter().filter(|r| **r >= held) {
                    prop_assert!(higher.satisfies(required));
                }
            }
        }
    }
}
