//! 인증/인가 시스템의 에러 타입.
//!
//! 이 모듈은 시스템 전반에서 사용되는 에러 분류 체계를 정의합니다.
//! 보안 경계를 이루는 네 가지 에러(잘못된 자격증명, 미인증, 권한 부족,
//! 역할 조회 실패)는 내부 장애와 명확히 구분됩니다. 내부 장애가
//! 자격증명/인가 판정처럼 보이면 안 됩니다.

use thiserror::Error;

/// 핵심 에러.
#[derive(Debug, Error)]
pub enum ContentryError {
    /// 잘못된 자격증명 (존재하지 않는 이메일과 틀린 비밀번호를 구분하지 않음)
    #[error("잘못된 자격증명입니다")]
    InvalidCredentials,

    /// 미인증 (토큰 누락/변조/만료/삭제된 계정 참조를 하나로 통합)
    #[error("인증되지 않은 요청입니다")]
    Unauthenticated,

    /// 권한 부족 (유효한 신원이지만 필요한 역할 없음)
    #[error("접근 권한이 없습니다")]
    Forbidden,

    /// 역할 조회 실패 (존재하지 않는 역할 이름 - 운영자/설정 오류)
    #[error("역할을 찾을 수 없습니다: {0}")]
    RoleLookup(String),

    /// 대상 없음
    #[error("찾을 수 없음: {0}")]
    NotFound(String),

    /// 저장소 에러 (DB 장애 등 예기치 않은 내부 장애)
    #[error("저장소 에러: {0}")]
    Store(String),

    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 내부 에러 (해싱 실패 등)
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 핵심 작업을 위한 Result 타입.
pub type ContentryResult<T> = Result<T, ContentryError>;

impl ContentryError {
    /// 응답에 내장되는 HTTP 스타일 상태 코드.
    ///
    /// 전송 계층은 항상 200을 반환하고, 이 코드는 에러 상세에 포함됩니다.
    pub fn status_code(&self) -> u16 {
        match self {
            ContentryError::InvalidCredentials => 400,
            ContentryError::Unauthenticated => 401,
            ContentryError::Forbidden => 403,
            ContentryError::RoleLookup(_) => 400,
            ContentryError::NotFound(_) => 400,
            ContentryError::Store(_) | ContentryError::Config(_) | ContentryError::Internal(_) => {
                500
            }
        }
    }

    /// 기계 판독용 에러 코드.
    pub fn code(&self) -> &'static str {
        match self {
            ContentryError::InvalidCredentials => "INVALID_CREDENTIALS",
            ContentryError::Unauthenticated => "UNAUTHENTICATED",
            ContentryError::Forbidden => "FORBIDDEN",
            ContentryError::RoleLookup(_) => "ROLE_LOOKUP_FAILED",
            ContentryError::NotFound(_) => "NOT_FOUND",
            ContentryError::Store(_) | ContentryError::Config(_) | ContentryError::Internal(_) => {
                "INTERNAL_ERROR"
            }
        }
    }

    /// 보안 경계에 속하는 판정 에러인지 확인합니다.
    ///
    /// 내부 장애(Store/Config/Internal)는 판정 에러가 아니며,
    /// 호출자에게 자격증명/인가 결정으로 보여서는 안 됩니다.
    pub fn is_security_decision(&self) -> bool {
        matches!(
            self,
            ContentryError::InvalidCredentials
                | ContentryError::Unauthenticated
                | ContentryError::Forbidden
                | ContentryError::RoleLookup(_)
        )
    }
}

impl From<crate::store::StoreError> for ContentryError {
    fn from(err: crate::store::StoreError) -> Self {
        match err {
            crate::store::StoreError::NotFound(what) => ContentryError::NotFound(what),
            crate::store::StoreError::RoleNotFound(name) => ContentryError::RoleLookup(name),
            other => ContentryError::Store(other.to_string()),
        }
    }
}

impl From<crate::password::PasswordError> for ContentryError {
    fn from(err: crate::password::PasswordError) -> Self {
        ContentryError::Internal(err.to_string())
    }
}
