//! 사용자 계정 관리 및 인증 API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 API (질의-응답 봉투 형식)
//! - JWT 인증 및 역할 기반 접근 제어
//! - Postgres 기반 사용자 저장소
//! - 헬스 체크 엔드포인트
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: API 엔드포인트
//! - [`auth`]: 자격증명 검증, 토큰 발급/검증, 접근 게이트
//! - [`repository`]: UserStore의 Postgres 구현
//! - [`error`]: 통합 응답 봉투 및 에러 타입

pub mod auth;
pub mod error;
pub mod repository;
pub mod routes;
pub mod state;

pub use auth::{AccessGate, AuthService, Claims, CurrentUser, LoginResponse};
pub use error::{ApiErrorResponse, ApiResponse, ApiResult};
pub use repository::PgUserStore;
pub use routes::create_api_router;
pub use state::AppState;

#[cfg(any(test, feature = "test-utils"))]
pub use state::create_test_state;
