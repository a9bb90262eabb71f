//! Access Gate.
//!
//! 게이트가 걸린 모든 작업에 대해 평가되는 2단계 결정 파이프라인입니다.
//! 첫 실패에서 단락(short-circuit)합니다:
//!
//! 1. **인증**: 베어러 토큰을 해석해 살아 있는 신원을 얻는다.
//!    토큰 부재는 무효 토큰과 동일하게 취급한다. 실패 → `Unauthenticated`.
//! 2. **인가**: 작업이 요구 역할을 선언한 경우에만 멤버십을 검사한다.
//!    불일치 → `Forbidden`. 선언이 없으면 인증만으로 충분하다.
//!
//! 요구 역할은 리플렉션 기반 등록이 아니라 라우트 계층의 명시적 상수로
//! 선언됩니다. 요청 간 결정 캐시는 없습니다. 매 요청이 독립적으로
//! 재평가됩니다.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts, HeaderMap};

use contentry_core::{ContentryError, ContentryResult, Identity, RoleRegistry};

use super::service::AuthService;
use crate::error::ApiErrorResponse;
use crate::state::AppState;

/// 요청 헤더에서 베어러 토큰 추출.
///
/// `Authorization: Bearer <token>` 형식이 아니면 None.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// 접근 게이트.
///
/// 게이트가 걸린 작업의 유일한 결정 지점입니다.
pub struct AccessGate {
    auth: Arc<AuthService>,
    registry: RoleRegistry,
}

impl AccessGate {
    /// 새 게이트 생성.
    pub fn new(auth: Arc<AuthService>, registry: RoleRegistry) -> Self {
        Self { auth, registry }
    }

    /// 게이트 결정 함수.
    ///
    /// 성공 시 해석된 신원을 반환하며, 호출자는 이를 요청 컨텍스트의
    /// "현재 호출자"로 사용합니다.
    ///
    /// # Errors
    ///
    /// - [`ContentryError::Unauthenticated`] - 토큰 부재/무효/만료/삭제된 계정
    /// - [`ContentryError::RoleLookup`] - 선언된 요구 역할이 레지스트리에 없음
    ///   (운영자 설정 오류, 조용히 무시하지 않음)
    /// - [`ContentryError::Forbidden`] - 유효한 신원이지만 요구 역할 미보유
    pub async fn authorize(
        &self,
        token: Option<&str>,
        required: &[&str],
    ) -> ContentryResult<Identity> {
        // 1단계: 인증
        let identity = match token {
            Some(raw) => self.auth.resolve(raw).await?,
            None => None,
        };
        let Some(identity) = identity else {
            return Err(ContentryError::Unauthenticated);
        };

        // 2단계: 인가 (요구 역할이 선언된 경우에만)
        if !required.is_empty() {
            let required_roles = self
                .registry
                .find_by_name(required)
                .ok_or_else(|| ContentryError::RoleLookup(required.join(", ")))?;

            if !self.registry.identity_has_any_of(&identity, &required_roles) {
                return Err(ContentryError::Forbidden);
            }
        }

        Ok(identity)
    }
}

/// 현재 호출자 추출기.
///
/// 역할 요구 없이 인증만 거치는 핸들러에서 사용합니다.
/// 역할이 필요한 핸들러는 [`AccessGate::authorize`]를 직접 호출합니다.
///
/// # 사용 예시
///
/// ```rust,ignore
/// async fn me_handler(CurrentUser(identity): CurrentUser) -> impl IntoResponse {
///     format!("current caller: {}", identity.email)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiErrorResponse;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers);
        let identity = state.gate.authorize(token, &[]).await?;
        Ok(CurrentUser(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contentry_core::{Argon2Hasher, MemoryUserStore, NewUser, PasswordHasher, UserStore, ADMIN};

    const TEST_SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";

    struct Fixture {
        store: Arc<MemoryUserStore>,
        auth: Arc<AuthService>,
        gate: AccessGate,
    }

    async fn fixture() -> Fixture {
        let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::new());
        let store = Arc::new(MemoryUserStore::new(Arc::clone(&hasher)));

        // carl: 일반 사용자, john: 관리자
        store
            .create(NewUser {
                first_name: "Carl".to_string(),
                surname: "Johnson".to_string(),
                email: "carl.johnson@contentry.org".to_string(),
                password: "carljohnson".to_string(),
            })
            .await
            .unwrap();
        let john = store
            .create(NewUser {
                first_name: "John".to_string(),
                surname: "Wick".to_string(),
                email: "john.wick@contentry.org".to_string(),
                password: "johnwick1".to_string(),
            })
            .await
            .unwrap();
        store.assign_roles(john.id, &[ADMIN]).await.unwrap();

        let auth = Arc::new(
            AuthService::new(
                Arc::clone(&store) as Arc<dyn UserStore>,
                hasher,
                TEST_SECRET,
                3600,
            )
            .unwrap(),
        );
        let gate = AccessGate::new(Arc::clone(&auth), RoleRegistry::builtin());

        Fixture { store, auth, gate }
    }

    async fn token_for(auth: &AuthService, email: &str, password: &str) -> String {
        auth.login(email, password).await.unwrap().access_token
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthenticated() {
        let f = fixture().await;
        let err = f.gate.authorize(None, &[ADMIN]).await.unwrap_err();
        assert!(matches!(err, ContentryError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_invalid_token_is_unauthenticated() {
        let f = fixture().await;
        let err = f
            .gate
            .authorize(Some("garbage.token.value"), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ContentryError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_role_mismatch_is_forbidden() {
        let f = fixture().await;
        let token = token_for(&f.auth, "carl.johnson@contentry.org", "carljohnson").await;

        let err = f
            .gate
            .authorize(Some(&token), &[ADMIN])
            .await
            .unwrap_err();
        assert!(matches!(err, ContentryError::Forbidden));
    }

    #[tokio::test]
    async fn test_role_match_is_allowed() {
        let f = fixture().await;
        let token = token_for(&f.auth, "john.wick@contentry.org", "johnwick1").await;

        let identity = f.gate.authorize(Some(&token), &[ADMIN]).await.unwrap();
        assert_eq!(identity.email, "john.wick@contentry.org");
    }

    #[tokio::test]
    async fn test_no_declaration_requires_only_authentication() {
        let f = fixture().await;
        let token = token_for(&f.auth, "carl.johnson@contentry.org", "carljohnson").await;

        let identity = f.gate.authorize(Some(&token), &[]).await.unwrap();
        assert_eq!(identity.first_name, "Carl");
    }

    #[tokio::test]
    async fn test_unknown_required_role_is_lookup_failure() {
        let f = fixture().await;
        let token = token_for(&f.auth, "john.wick@contentry.org", "johnwick1").await;

        // 존재하지 않는 역할 선언은 설정 오류로 표면화
        let err = f
            .gate
            .authorize(Some(&token), &["superuser"])
            .await
            .unwrap_err();
        assert!(matches!(err, ContentryError::RoleLookup(_)));
    }

    #[tokio::test]
    async fn test_role_change_after_issuance_is_honored() {
        let f = fixture().await;
        let token = token_for(&f.auth, "carl.johnson@contentry.org", "carljohnson").await;

        // 발급 시점에는 admin 아님
        assert!(matches!(
            f.gate.authorize(Some(&token), &[ADMIN]).await,
            Err(ContentryError::Forbidden)
        ));

        // 토큰 수명 중 역할 승격 → 같은 토큰으로 즉시 허용
        let carl = f
            .store
            .find_by_email("carl.johnson@contentry.org")
            .await
            .unwrap()
            .unwrap();
        f.store.assign_roles(carl.id, &[ADMIN]).await.unwrap();
        assert!(f.gate.authorize(Some(&token), &[ADMIN]).await.is_ok());

        // 강등도 즉시 반영 (결정 캐시 없음)
        f.store.remove_roles(carl.id, &[ADMIN]).await.unwrap();
        assert!(matches!(
            f.gate.authorize(Some(&token), &[ADMIN]).await,
            Err(ContentryError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn test_deleted_account_token_is_unauthenticated() {
        let f = fixture().await;
        let token = token_for(&f.auth, "carl.johnson@contentry.org", "carljohnson").await;

        let carl = f
            .store
            .find_by_email("carl.johnson@contentry.org")
            .await
            .unwrap()
            .unwrap();
        f.store.delete(carl.id).await.unwrap();

        let err = f.gate.authorize(Some(&token), &[]).await.unwrap_err();
        assert!(matches!(err, ContentryError::Unauthenticated));
    }

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_none());

        headers.insert(AUTHORIZATION, "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));

        headers.insert(AUTHORIZATION, "Basic dXNlcjpwYXNz".parse().unwrap());
        assert!(bearer_token(&headers).is_none());
    }
}
