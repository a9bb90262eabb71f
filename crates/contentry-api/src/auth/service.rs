//! 인증 서비스.
//!
//! 자격증명 검증과 토큰 발급/검증을 담당합니다.
//!
//! # 열거 공격 방어
//!
//! 로그인 실패는 "존재하지 않는 이메일"과 "틀린 비밀번호"를 구분하지
//! 않습니다. 에러 형태뿐 아니라 타이밍도 동일하게 유지합니다:
//! 이메일이 없어도 더미 해시에 대해 정확히 한 번의 argon2 비교를
//! 수행합니다.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use contentry_core::{
    ContentryError, ContentryResult, CredentialedIdentity, Identity, PasswordHasher, UserStore,
};

use super::jwt::{create_token, decode_token, Claims};

/// 로그인 응답.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// 서명된 Access Token
    pub access_token: String,
    /// 만료 시간 (초)
    pub expires_in: u64,
}

/// 인증 서비스.
///
/// 해셔와 저장소는 주입되는 협력자입니다. 요청 간 공유되는 가변 상태는
/// 없으며, 토큰/신원/역할 캐시도 두지 않습니다.
pub struct AuthService {
    store: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHasher>,
    secret: String,
    token_expiry_secs: u64,
    /// 미등록 이메일 로그인 시 비교 대상이 되는 더미 해시.
    /// 사용자 존재 여부에 따른 타이밍 차이를 없앤다.
    dummy_hash: String,
}

impl AuthService {
    /// 새 인증 서비스 생성.
    ///
    /// 생성 시점에 더미 해시를 한 번 계산합니다 (서버 시작 시 1회 비용).
    pub fn new(
        store: Arc<dyn UserStore>,
        hasher: Arc<dyn PasswordHasher>,
        secret: impl Into<String>,
        token_expiry_secs: u64,
    ) -> ContentryResult<Self> {
        let dummy_hash = hasher.hash("contentry-dummy-credential")?;
        Ok(Self {
            store,
            hasher,
            secret: secret.into(),
            token_expiry_secs,
            dummy_hash,
        })
    }

    /// 토큰 만료 시간 (초).
    pub fn token_expiry_secs(&self) -> u64 {
        self.token_expiry_secs
    }

    /// 이메일과 비밀번호로 신원 조회 (자격증명 검증기).
    ///
    /// 미등록 이메일과 비밀번호 불일치를 호출자에게 구분해 주지 않습니다.
    /// 호출당 정확히 한 번의 해시 비교를 수행합니다.
    pub async fn find_by_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> ContentryResult<Option<CredentialedIdentity>> {
        let found = self.store.find_with_credentials(email).await?;

        let hash = match &found {
            Some(credentialed) => credentialed.password_hash.clone(),
            None => self.dummy_hash.clone(),
        };

        // argon2 비교는 CPU 집약적이므로 비동기 디스패치 경로 밖에서 실행
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_string();
        let matched = tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| ContentryError::Internal(format!("해시 비교 작업 실패: {}", e)))?;

        Ok(found.filter(|_| matched))
    }

    /// 로그인: 자격증명 검증 후 토큰 발급.
    ///
    /// 영속적인 부작용은 없습니다 (세션 저장 없음, 마지막 로그인 시각
    /// 기록 없음).
    pub async fn login(&self, email: &str, password: &str) -> ContentryResult<LoginResponse> {
        let Some(credentialed) = self.find_by_email_and_password(email, password).await? else {
            return Err(ContentryError::InvalidCredentials);
        };

        let claims = Claims::new(&credentialed.identity, self.token_expiry_secs);
        let access_token = create_token(&claims, &self.secret)
            .map_err(|e| ContentryError::Internal(e.to_string()))?;

        debug!(user_id = credentialed.identity.id, "access token issued");

        Ok(LoginResponse {
            access_token,
            expires_in: self.token_expiry_secs,
        })
    }

    /// 토큰 검증기: 원시 토큰을 현재 신원으로 해석합니다.
    ///
    /// 서명/만료/형식 오류는 모두 `Ok(None)`으로 통합됩니다 (검증 내부를
    /// 노출하지 않음). 저장소 장애만 에러로 전파됩니다.
    ///
    /// 토큰은 권한의 캐시가 아니라 현재 신원을 조회하는 능력입니다.
    /// 클레임의 이메일로 살아 있는 신원을 다시 읽으므로, 발급 이후의
    /// 역할 변경과 계정 삭제가 즉시 반영됩니다.
    pub async fn resolve(&self, raw_token: &str) -> ContentryResult<Option<Identity>> {
        let Ok(data) = decode_token(raw_token, &self.secret) else {
            return Ok(None);
        };

        let identity = self.store.find_by_email(&data.claims.email).await?;
        Ok(identity)
    }
}
