//! 인증 및 권한 부여.
//!
//! JWT 기반 인증과 역할 기반 접근 제어(RBAC)를 제공합니다.
//!
//! # 구성 요소
//!
//! - [`Claims`]: JWT 페이로드 (Claim Set)
//! - [`AuthService`]: 자격증명 검증 + 토큰 발급/검증
//! - [`AccessGate`]: 인증→인가 2단계 결정 파이프라인
//! - [`CurrentUser`]: 인증만 요구하는 핸들러용 추출기
//!
//! # 데이터 흐름
//!
//! 로그인 요청 → 자격증명 검증(해셔 경유) → 토큰 발급 → 호출자.
//! 이후 요청은 토큰을 싣고 → 게이트 → 토큰 검증(신원 재조회) →
//! 역할 검사(선언된 경우) → 허용 또는 거부.

mod gate;
mod jwt;
mod service;

pub use gate::{bearer_token, AccessGate, CurrentUser};
pub use jwt::{create_token, decode_token, Claims, JwtError};
pub use service::{AuthService, LoginResponse};
