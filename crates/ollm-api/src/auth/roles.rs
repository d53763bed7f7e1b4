//! 역할 기반 접근 제어.
//!
//! 라우트가 요구하는 최소 역할과 요청자의 역할을 비교합니다.

use ollm_core::Role;

/// 접근 거부 사유.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AccessDenied {
    #[error("인증이 필요합니다")]
    Unauthenticated,
    #[error("권한이 부족합니다 (필요: {required}, 현재: {actual})")]
    InsufficientRole { required: Role, actual: Role },
}

/// 요구 역할에 대한 접근 허용 여부 결정.
///
/// * `required` - 라우트가 요구하는 최소 역할
/// * `present` - 인증된 요청자의 역할 (인증되지 않았으면 `None`)
///
/// `Public` 라우트는 인증 여부와 관계없이 항상 허용됩니다.
pub fn authorize(required: Role, present: Option<Role>) -> Result<(), AccessDenied> {
    if required == Role::Public {
        return Ok(());
    }

    match present {
        None => Err(AccessDenied::Unauthenticated),
        Some(actual) if actual.satisfies(required) => Ok(()),
        Some(actual) => Err(AccessDenied::InsufficientRole { required, actual }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_public_always_allowed() {
        assert!(authorize(Role::Public, None).is_ok());
        for role in Role::ALL {
            assert!(authorize(Role::Public, Some(role)).is_ok());
        }
    }

    #[test]
    fn test_missing_identity_denied() {
        assert_eq!(authorize(Role::User, None), Err(AccessDenied::Unauthenticated));
        assert_eq!(authorize(Role::Admin, None), Err(AccessDenied::Unauthenticated));
    }

    #[test]
    fn test_role_hierarchy() {
        // Admin은 모든 역할 접근 가능
        assert!(authorize(Role::Admin, Some(Role::Admin)).is_ok());
        assert!(authorize(Role::Manager, Some(Role::Admin)).is_ok());
        assert!(authorize(Role::User, Some(Role::Admin)).is_ok());

        // Manager는 Admin 접근 불가
        assert_eq!(
            authorize(Role::Admin, Some(Role::Manager)),
            Err(AccessDenied::InsufficientRole {
                required: Role::Admin,
                actual: Role::Manager
            })
        );
        assert!(authorize(Role::User, Some(Role::Manager)).is_ok());

        // User는 User만
        assert!(authorize(Role::Manager, Some(Role::User)).is_err());
        assert!(authorize(Role::User, Some(Role::User)).is_ok());
    }

    proptest! {
        #[test]
        fn prop_authorize_matches_rank(
            required in prop::sample::select(Role::ALL.to_vec()),
            actual in prop::sample::select(Role::ALL.to_vec()),
        ) {
            let allowed = authorize(required, Some(actual)).is_ok();
            prop_assert_eq!(allowed, required == Role::Public || actual.rank() >= required.rank());
        }
    }
}
