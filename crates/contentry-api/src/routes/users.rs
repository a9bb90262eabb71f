//! 사용자 관리 endpoint.
//!
//! 사용자 CRUD와 역할 할당/제거를 위한 API를 제공합니다.
//!
//! # 엔드포인트
//!
//! - `POST /api/v1/users` - 사용자 등록 (공개)
//! - `GET /api/v1/users` - 전체 사용자 조회 (admin)
//! - `GET /api/v1/users/me` - 현재 호출자 조회 (인증만)
//! - `PUT /api/v1/users/{id}` - 사용자 수정 (admin)
//! - `DELETE /api/v1/users/{id}` - 사용자 삭제 (admin)
//! - `POST /api/v1/users/{id}/roles` - 역할 할당 (admin)
//! - `DELETE /api/v1/users/{id}/roles` - 역할 제거 (admin)
//!
//! 요구 역할은 핸들러별 상수로 선언되고 접근 게이트가 매 요청 평가합니다.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use contentry_core::{ContentryError, Identity, NewUser, UserUpdate, ADMIN};

use crate::auth::{bearer_token, CurrentUser};
use crate::error::{ApiErrorResponse, ApiResponse, ApiResult};
use crate::state::AppState;

/// 관리자 전용 작업의 요구 역할 선언.
const ADMIN_ONLY: &[&str] = &[ADMIN];

// ==================== 응답 타입 ====================

/// 사용자 응답.
///
/// 비밀번호 해시는 타입 차원에서 존재하지 않습니다.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// 사용자 ID
    pub id: i64,
    /// 이름
    pub first_name: String,
    /// 성
    pub surname: String,
    /// 이메일
    pub email: String,
    /// 보유 역할 이름
    pub roles: Vec<String>,
}

impl From<Identity> for UserResponse {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id,
            roles: identity.roles.iter().map(|r| r.name.clone()).collect(),
            first_name: identity.first_name,
            surname: identity.surname,
            email: identity.email,
        }
    }
}

/// 역할 할당/제거 요청.
#[derive(Debug, Deserialize)]
pub struct RolesRequest {
    /// 역할 이름 목록
    pub roles: Vec<String>,
}

// ==================== 핸들러 ====================

/// 사용자 등록 (공개).
///
/// POST /api/v1/users
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewUser>,
) -> ApiResult<UserResponse> {
    let identity = state.store.create(payload).await?;
    Ok(ApiResponse::ok(identity.into()))
}

/// 전체 사용자 조회 (admin 전용).
///
/// GET /api/v1/users
pub async fn all_users(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Vec<UserResponse>> {
    state
        .gate
        .authorize(bearer_token(&headers), ADMIN_ONLY)
        .await?;

    let users = state.store.find_all().await?;
    if users.is_empty() {
        return Err(ContentryError::NotFound("등록된 사용자가 없습니다".to_string()).into());
    }
    Ok(ApiResponse::ok(
        users.into_iter().map(UserResponse::from).collect(),
    ))
}

/// 현재 호출자 조회 (인증만 요구).
///
/// GET /api/v1/users/me
pub async fn current_user(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
) -> ApiResult<UserResponse> {
    let user = state
        .store
        .find_by_id(caller.id)
        .await?
        .ok_or_else(|| ApiErrorResponse::from(ContentryError::Unauthenticated))?;
    Ok(ApiResponse::ok(user.into()))
}

/// 사용자 수정 (admin 전용).
///
/// PUT /api/v1/users/{id}
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(payload): Json<UserUpdate>,
) -> ApiResult<UserResponse> {
    state
        .gate
        .authorize(bearer_token(&headers), ADMIN_ONLY)
        .await?;

    let updated = state.store.update(id, payload).await?;
    Ok(ApiResponse::ok(updated.into()))
}

/// 사용자 삭제 (admin 전용).
///
/// DELETE /api/v1/users/{id}
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> ApiResult<bool> {
    state
        .gate
        .authorize(bearer_token(&headers), ADMIN_ONLY)
        .await?;

    let deleted = state.store.delete(id).await?;
    Ok(ApiResponse::ok(deleted))
}

/// 역할 할당 (admin 전용).
///
/// POST /api/v1/users/{id}/roles
pub async fn assign_roles(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(payload): Json<RolesRequest>,
) -> ApiResult<UserResponse> {
    state
        .gate
        .authorize(bearer_token(&headers), ADMIN_ONLY)
        .await?;

    let names: Vec<&str> = payload.roles.iter().map(String::as_str).collect();
    let identity = state.store.assign_roles(id, &names).await?;
    Ok(ApiResponse::ok(identity.into()))
}

/// 역할 제거 (admin 전용).
///
/// DELETE /api/v1/users/{id}/roles
pub async fn remove_roles(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(payload): Json<RolesRequest>,
) -> ApiResult<UserResponse> {
    state
        .gate
        .authorize(bearer_token(&headers), ADMIN_ONLY)
        .await?;

    let names: Vec<&str> = payload.roles.iter().map(String::as_str).collect();
    let identity = state.store.remove_roles(id, &names).await?;
    Ok(ApiResponse::ok(identity.into()))
}

/// 사용자 라우터 생성.
pub fn users_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_user).get(all_users))
        .route("/me", get(current_user))
        .route("/{id}", put(update_user).delete(delete_user))
        .route("/{id}/roles", post(assign_roles).delete(remove_roles))
}
