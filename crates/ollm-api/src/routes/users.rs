//! 사용자 endpoint.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::get,
    Json, Router,
};
use ollm_core::{Role, User};

use crate::auth::{require_role, role_gate, JwtAuth, TokenCodec};
use crate::error::{internal_error, ApiErrorResponse, ApiResult};
use crate::state::AppState;

/// 내 정보 조회.
///
/// GET /users/me
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    JwtAuth(claims): JwtAuth,
) -> ApiResult<Json<User>> {
    let user = state
        .users
        .find_by_id(claims.user_id)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ApiErrorResponse::new("NOT_FOUND", "사용자를 찾을 수 없습니다")),
            )
        })?;

    Ok(Json(user))
}

/// 전체 사용자 목록 (Admin 전용).
///
/// GET /users
pub async fn list_users(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<User>>> {
    let users = state.users.find_all().await.map_err(internal_error)?;
    Ok(Json(users))
}

/// 사용자 라우터 생성.
pub fn users_router(codec: Arc<TokenCodec>) -> Router<Arc<AppState>> {
    let me = Router::new()
        .route("/me", get(get_me))
        .route_layer(middleware::from_fn_with_state(
            require_role(codec.clone(), Role::User),
            role_gate,
        ));

    let admin = Router::new()
        .route("/", get(list_users))
        .route_layer(middleware::from_fn_with_state(
            require_role(codec, Role::Admin),
            role_gate,
        ));

    me.merge(admin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenKind;
    use crate::state::create_test_state;
    use axum::{body::Body, http::Request};
    use chrono::Duration;
    use ollm_core::NewUser;
    use tower::ServiceExt;

    fn get_with_token(uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_me_and_admin_listing() {
        let state = Arc::new(create_test_state());
        let user = state.users.save(NewUser::new("a@x.com", "hash")).await.unwrap();
        let admin = state
            .users
            .save(NewUser::new("root@x.com", "hash").with_role(Role::Admin))
            .await
            .unwrap();

        let app = Router::new()
            .nest("/users", users_router(state.codec.clone()))
            .with_state(state.clone());

        let user_token = state
            .codec
            .issue(user.id, &user.email, user.role, TokenKind::Access, Duration::minutes(5))
            .unwrap();
        let admin_token = state
            .codec
            .issue(admin.id, &admin.email, admin.role, TokenKind::Access, Duration::minutes(5))
            .unwrap();

        let response = app.clone().oneshot(get_with_token("/users/me", &user_token)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let me: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(me["email"], "a@x.com");
        assert!(me.get("password_hash").is_none());

        let response = app.clone().oneshot(get_with_token("/users", &user_token)).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app.oneshot(get_with_token("/users", &admin_token)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let users: Vec<serde_json::Value> = serde_json::from_slice(&body).unwrap();
        assert_eq!(users.len(), 2);
    }

    #[tokio::test]
    async fn test_me_for_deleted_user() {
        let state = Arc::new(create_test_state());
        let app = Router::new()
            .nest("/users", users_router(state.codec.clone()))
            .with_state(state.clone());

        let token = state
            .codec
            .issue(404, "ghost@x.com", Role::User, TokenKind::Access, Duration::minutes(5))
            .unwrap();
        let response = app.oneshot(get_with_token("/users/me", &token)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
