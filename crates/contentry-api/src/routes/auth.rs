//! 인증 endpoint.
//!
//! 로그인(토큰 발급)을 위한 API를 제공합니다.
//!
//! # 엔드포인트
//!
//! - `POST /api/v1/auth/login` - 자격증명 검증 후 Access Token 발급

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::auth::LoginResponse;
use crate::error::{ApiResponse, ApiResult};
use crate::state::AppState;

/// 로그인 요청.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// 이메일
    pub email: String,
    /// 평문 비밀번호
    pub password: String,
}

/// 로그인 핸들러.
///
/// 실패 시 미등록 이메일과 틀린 비밀번호를 구분하지 않는 단일
/// `INVALID_CREDENTIALS` 에러를 반환합니다 (열거 공격 방어).
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let response = state.auth.login(&payload.email, &payload.password).await?;
    info!("login succeeded");
    Ok(ApiResponse::ok(response))
}

/// 인증 라우터 생성.
pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new().route("/login", post(login))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use contentry_core::NewUser;

    use crate::routes::create_api_router;
    use crate::state::create_test_state;

    async fn response_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn login_request(email: &str, password: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/auth/login")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::to_vec(&json!({ "email": email, "password": password })).unwrap(),
            ))
            .unwrap()
    }

    #[tokio::test]
    async fn test_login_returns_token_and_expiry() {
        let state = create_test_state();
        state
            .store
            .create(NewUser {
                first_name: "Carl".to_string(),
                surname: "Johnson".to_string(),
                email: "carl.johnson@contentry.org".to_string(),
                password: "carljohnson".to_string(),
            })
            .await
            .unwrap();

        let app = create_api_router().with_state(state);
        let response = app
            .oneshot(login_request("carl.johnson@contentry.org", "carljohnson"))
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        let body = response_body(response).await;
        assert!(body["data"]["accessToken"].as_str().unwrap().len() > 20);
        assert_eq!(body["data"]["expiresIn"], 3600);
        assert!(body.get("errors").is_none());
    }

    #[tokio::test]
    async fn test_login_failures_have_identical_shape() {
        let state = create_test_state();
        state
            .store
            .create(NewUser {
                first_name: "Carl".to_string(),
                surname: "Johnson".to_string(),
                email: "carl.johnson@contentry.org".to_string(),
                password: "carljohnson".to_string(),
            })
            .await
            .unwrap();

        let app = create_api_router().with_state(state);

        let unknown = app
            .clone()
            .oneshot(login_request("nobody@contentry.org", "whatever1"))
            .await
            .unwrap();
        let wrong = app
            .oneshot(login_request("carl.johnson@contentry.org", "wrong-password"))
            .await
            .unwrap();

        // 전송은 둘 다 200, 페이로드는 완전히 동일한 에러 형태
        assert_eq!(unknown.status(), 200);
        assert_eq!(wrong.status(), 200);

        let unknown_body = response_body(unknown).await;
        let wrong_body = response_body(wrong).await;
        assert_eq!(unknown_body, wrong_body);
        assert_eq!(unknown_body["errors"][0]["statusCode"], 400);
        assert_eq!(unknown_body["errors"][0]["code"], "INVALID_CREDENTIALS");
    }
}
