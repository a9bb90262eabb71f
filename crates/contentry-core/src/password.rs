//! 비밀번호 해싱.
//!
//! Argon2 기반 비밀번호 해싱 및 검증.
//!
//! 해셔는 전역 유틸리티가 아니라 명시적으로 주입되는 협력자입니다.
//! 테스트에서 전역 상태 변경 없이 대체할 수 있도록 trait으로 추상화합니다.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordVerifier, SaltString},
    Argon2, PasswordHasher as _,
};

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("비밀번호 해싱 실패")]
    HashingFailed,
}

/// 비밀번호 해셔 계약.
///
/// 구현은 호출마다 새 솔트를 생성해야 하며(같은 평문이라도 해시가 달라짐),
/// 검증은 불일치 위치와 상관관계가 있는 타이밍 정보를 노출하면 안 됩니다.
pub trait PasswordHasher: Send + Sync {
    /// 평문을 일방향 해시 문자열로 변환합니다.
    fn hash(&self, password: &str) -> Result<String, PasswordError>;

    /// 평문이 저장된 해시와 일치하는지 확인합니다.
    ///
    /// 형식이 잘못된 해시 문자열은 에러가 아니라 `false`로 처리합니다.
    /// 호출자가 "검증 실패"와 "해시 손상"을 구분할 필요가 없도록 하기
    /// 위한 계약입니다.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Argon2id 기반 기본 해셔.
#[derive(Debug, Default, Clone)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    /// 새 해셔 생성.
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2Hasher {
    /// 비밀번호 해싱.
    ///
    /// Argon2id 알고리즘을 사용하며 솔트는 호출마다 자동 생성됩니다.
    /// PHC 형식 문자열(솔트 포함)을 반환합니다.
    fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|_| PasswordError::HashingFailed)?;

        Ok(hash.to_string())
    }

    /// 비밀번호 검증.
    ///
    /// 내장 솔트로 평문을 해싱했을 때 저장된 값과 일치하면 true.
    /// 비교는 argon2 구현의 상수 시간 비교를 사용합니다.
    fn verify(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            return false;
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_password() {
        let hasher = Argon2Hasher::new();
        let password = "carljohnson";
        let hash = hasher.hash(password).unwrap();

        // 해시 형식 확인 (argon2id)
        assert!(hash.starts_with("$argon2id$"));

        assert!(hasher.verify(password, &hash));
        assert!(!hasher.verify("wrong-password", &hash));
    }

    #[test]
    fn test_same_password_different_hashes() {
        let hasher = Argon2Hasher::new();
        let hash1 = hasher.hash("johnwick1").unwrap();
        let hash2 = hasher.hash("johnwick1").unwrap();

        // 같은 비밀번호라도 솔트가 다르므로 해시가 다름
        assert_ne!(hash1, hash2);

        // 하지만 둘 다 검증 가능
        assert!(hasher.verify("johnwick1", &hash1));
        assert!(hasher.verify("johnwick1", &hash2));
    }

    #[test]
    fn test_cross_password_verify_fails() {
        let hasher = Argon2Hasher::new();
        let hash = hasher.hash("password-one1").unwrap();
        assert!(!hasher.verify("password-two2", &hash));
    }

    #[test]
    fn test_malformed_hash_returns_false() {
        let hasher = Argon2Hasher::new();
        // 손상된 해시는 예외가 아니라 false
        assert!(!hasher.verify("password", "not-a-valid-hash"));
        assert!(!hasher.verify("password", ""));
    }

    #[test]
    fn test_unicode_password() {
        let hasher = Argon2Hasher::new();
        let password = "한글패스워드123";
        let hash = hasher.hash(password).unwrap();
        assert!(hasher.verify(password, &hash));
    }
}
