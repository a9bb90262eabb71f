//! # Contentry Core
//!
//! 사용자 계정 관리 백엔드의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 시스템 전반에서 사용되는 기본 타입을 제공합니다:
//! - 사용자(Identity) 및 역할(Role) 도메인 모델
//! - 에러 타입 분류 체계
//! - 비밀번호 해싱 (argon2id)
//! - 역할 레지스트리 및 멤버십 검사
//! - UserStore 계약 (영속성 계층 추상화)
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod error;
pub mod identity;
pub mod logging;
pub mod password;
pub mod role;
pub mod store;

pub use config::*;
pub use error::{ContentryError, ContentryResult};
pub use identity::{CredentialedIdentity, Identity, NewUser, UserUpdate};
pub use logging::*;
pub use password::{Argon2Hasher, PasswordError, PasswordHasher};
pub use role::{Role, RoleRegistry, ADMIN, USER};
pub use store::{StoreError, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use store::MemoryUserStore;
