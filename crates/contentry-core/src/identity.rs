//! 사용자 신원(Identity) 도메인 모델.
//!
//! 인증 주체와 그 변형(자격증명 포함본, 생성/수정 입력)을 정의합니다.
//! 비밀번호 해시는 [`CredentialedIdentity`]에만 존재하며, 자격증명 검증기
//! 외부로는 절대 나가지 않습니다.

use serde::{Deserialize, Serialize};

use crate::role::Role;

/// 인증된 주체.
///
/// UserStore가 소유하는 사용자 레코드의 읽기 투영입니다.
/// 역할 목록을 포함하지만 비밀번호 해시는 포함하지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// 사용자 ID
    pub id: i64,
    /// 이름
    pub first_name: String,
    /// 성
    pub surname: String,
    /// 이메일 (고유)
    pub email: String,
    /// 보유 역할
    pub roles: Vec<Role>,
}

impl Identity {
    /// 보유 역할 이름 목록.
    pub fn role_names(&self) -> Vec<&str> {
        self.roles.iter().map(|r| r.name.as_str()).collect()
    }

    /// 특정 이름의 역할을 보유하는지 확인.
    pub fn has_role(&self, name: &str) -> bool {
        self.roles.iter().any(|r| r.name == name)
    }
}

/// 자격증명이 포함된 신원.
///
/// 자격증명 검증기가 명시적으로 요청할 때만 구체화됩니다
/// (`UserStore::find_with_credentials`). 일반 조회 경로에서는
/// 생성되지 않습니다.
#[derive(Debug, Clone)]
pub struct CredentialedIdentity {
    /// 신원 (해시 제외 필드)
    pub identity: Identity,
    /// 저장된 비밀번호 해시 (PHC 형식)
    pub password_hash: String,
}

/// 사용자 생성 입력.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    /// 이름
    pub first_name: String,
    /// 성
    pub surname: String,
    /// 이메일
    pub email: String,
    /// 평문 비밀번호 (저장 전 해싱됨)
    pub password: String,
}

/// 사용자 수정 입력.
///
/// None인 필드는 변경하지 않습니다. 비밀번호와 역할은 이 경로로
/// 변경할 수 없습니다 (역할은 별도의 할당/제거 작업으로만 변경).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    /// 이름
    pub first_name: Option<String>,
    /// 성
    pub surname: Option<String>,
    /// 이메일
    pub email: Option<String>,
}
