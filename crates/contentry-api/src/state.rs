//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 Arc로 래핑되어 여러 요청 간에 안전하게 공유됩니다.
//! 요청 간 공유되는 유일한 가변 자원은 저장소이며, 충돌하는 쓰기의
//! 직렬화는 저장소가 담당합니다.

use std::sync::Arc;

use contentry_core::UserStore;

use crate::auth::{AccessGate, AuthService};

/// 애플리케이션 공유 상태.
///
/// Axum의 State extractor를 통해 핸들러에 주입됩니다.
pub struct AppState {
    /// 사용자 저장소 - 신원 조회/CRUD/역할 부여
    pub store: Arc<dyn UserStore>,

    /// 인증 서비스 - 자격증명 검증, 토큰 발급/검증
    pub auth: Arc<AuthService>,

    /// 접근 게이트 - 게이트가 걸린 작업의 결정 지점
    pub gate: Arc<AccessGate>,
}

impl AppState {
    /// 새 애플리케이션 상태 생성.
    pub fn new(store: Arc<dyn UserStore>, auth: Arc<AuthService>, gate: Arc<AccessGate>) -> Self {
        Self { store, auth, gate }
    }
}

/// 테스트용 JWT 비밀 키.
#[cfg(any(test, feature = "test-utils"))]
pub const TEST_JWT_SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";

/// 인메모리 저장소 기반 테스트 상태 생성.
///
/// 라우트 계층 테스트에서 사용합니다. 시딩은 `state.store`를 통해 합니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> Arc<AppState> {
    use contentry_core::{Argon2Hasher, MemoryUserStore, PasswordHasher, RoleRegistry};

    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::new());
    let store: Arc<dyn UserStore> = Arc::new(MemoryUserStore::new(Arc::clone(&hasher)));
    let auth = Arc::new(
        AuthService::new(Arc::clone(&store), hasher, TEST_JWT_SECRET, 3600)
            .expect("test auth service"),
    );
    let gate = Arc::new(AccessGate::new(Arc::clone(&auth), RoleRegistry::builtin()));

    Arc::new(AppState::new(store, auth, gate))
}
