//! 역할 기반 접근 제어 (RBAC).
//!
//! 역할(Role) 모델과 고정 역할 레지스트리를 정의합니다.
//! 역할 이름이 비교 키이며 대소문자를 구분합니다.

use serde::{Deserialize, Serialize};

use crate::identity::Identity;

/// 일반 사용자 역할 이름.
pub const USER: &str = "user";

/// 관리자 역할 이름.
pub const ADMIN: &str = "admin";

/// 역할.
///
/// 사용자에게 부여되는 이름 있는 권한 단위입니다.
/// 이름이 고유 식별자이며, 레지스트리의 고정 목록에서만 나옵니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Role {
    /// 역할 이름 (비교 키, 대소문자 구분)
    pub name: String,
}

impl Role {
    /// 새 역할 생성.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// 역할 레지스트리.
///
/// 시스템에 존재하는 고정 역할 목록과 이름 조회/멤버십 검사를 제공합니다.
#[derive(Debug, Clone)]
pub struct RoleRegistry {
    roles: Vec<Role>,
}

impl Default for RoleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RoleRegistry {
    /// 기본 역할 집합(user, admin)으로 레지스트리 생성.
    pub fn builtin() -> Self {
        Self {
            roles: vec![Role::new(USER), Role::new(ADMIN)],
        }
    }

    /// 임의의 역할 집합으로 레지스트리 생성 (테스트용).
    pub fn with_roles(roles: Vec<Role>) -> Self {
        Self { roles }
    }

    /// 등록된 모든 역할.
    pub fn all(&self) -> &[Role] {
        &self.roles
    }

    /// 이름으로 역할 조회.
    ///
    /// 요청한 이름 중 하나라도 레지스트리에 없으면 `None`을 반환합니다.
    /// 부분 일치 성공은 지원하지 않습니다. 요청 전체를 무효로 취급해야
    /// 존재하지 않는 역할 선언이 조용히 무시되는 일을 막을 수 있습니다.
    /// 반환 순서는 요청한 이름의 선언 순서를 따릅니다.
    pub fn find_by_name<S: AsRef<str>>(&self, names: &[S]) -> Option<Vec<Role>> {
        let mut found = Vec::with_capacity(names.len());
        for name in names {
            let role = self.roles.iter().find(|r| r.name == name.as_ref())?;
            found.push(role.clone());
        }
        Some(found)
    }

    /// 신원이 요구 역할 중 하나 이상을 보유하는지 확인합니다 (OR 의미론).
    pub fn identity_has_any_of(&self, identity: &Identity, required: &[Role]) -> bool {
        identity
            .roles
            .iter()
            .any(|held| required.iter().any(|r| r.name == held.name))
    }
}
