//! JWT 토큰 처리.
//!
//! Access Token 생성/검증 로직.
//!
//! 토큰은 서명되고 시간 제한이 있는 자체 완결형 구조이며, 서버 측 세션
//! 저장소는 없습니다. 유효성은 서명과 만료로만 결정됩니다.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};

use contentry_core::Identity;

/// JWT Access Token 페이로드 (Claim Set).
///
/// 최소 신원 필드만 포함합니다: id, 표시 이름, 이메일.
/// 비밀번호 해시와 역할은 절대 포함하지 않습니다. 역할은 토큰 검증 시점에
/// 저장소에서 다시 읽으므로, 발급 이후의 역할 변경이 즉시 반영됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// 사용자 ID
    pub id: i64,
    /// 이름
    #[serde(rename = "firstName")]
    pub first_name: String,
    /// 성
    pub surname: String,
    /// 이메일
    pub email: String,
    /// Issued At - 토큰 발급 시간 (Unix timestamp)
    pub iat: i64,
    /// Expiration - 토큰 만료 시간 (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// 신원에서 새 Claims 생성.
    ///
    /// # Arguments
    ///
    /// * `identity` - 인증된 신원
    /// * `expires_in_secs` - 만료 시간 (초)
    pub fn new(identity: &Identity, expires_in_secs: u64) -> Self {
        let now = Utc::now();
        Self {
            id: identity.id,
            first_name: identity.first_name.clone(),
            surname: identity.surname.clone(),
            email: identity.email.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(expires_in_secs as i64)).timestamp(),
        }
    }

    /// 토큰이 만료되었는지 확인.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// JWT 토큰 에러.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("토큰 인코딩 실패: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),
    #[error("토큰 디코딩 실패")]
    DecodingError,
    #[error("토큰이 만료되었습니다")]
    TokenExpired,
    #[error("잘못된 토큰 형식")]
    InvalidToken,
}

/// Access Token 생성.
///
/// # Arguments
///
/// * `claims` - JWT 페이로드
/// * `secret` - 대칭 서명 비밀 키
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(JwtError::from)
}

/// JWT 토큰 디코딩 및 검증.
///
/// 서명과 만료를 모두 검증합니다. 호출자(토큰 검증기)는 모든 실패 종류를
/// "미인증" 하나로 통합하므로 변형별 구분은 로깅 용도입니다.
pub fn decode_token(token: &str, secret: &str) -> Result<TokenData<Claims>, JwtError> {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    // sub/aud 클레임은 사용하지 않음
    validation.required_spec_claims.clear();
    validation.required_spec_claims.insert("exp".to_string());

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
        jsonwebtoken::errors::ErrorKind::InvalidToken => JwtError::InvalidToken,
        _ => JwtError::DecodingError,
    })
}
