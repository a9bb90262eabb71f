//! UserStore 계약.
//!
//! 영속성 계층 추상화. 인증 코어는 이 trait을 통해서만 사용자 레코드에
//! 접근합니다. 운영 구현은 contentry-api의 Postgres 저장소이고, 테스트는
//! [`MemoryUserStore`]를 사용합니다.
//!
//! 동시 쓰기 직렬화는 저장소의 책임입니다. 코어는 락을 구현하지 않습니다.

use async_trait::async_trait;
use thiserror::Error;

use crate::identity::{CredentialedIdentity, Identity, NewUser, UserUpdate};

/// 저장소 에러.
#[derive(Debug, Error)]
pub enum StoreError {
    /// 데이터베이스 에러
    #[error("데이터베이스 에러: {0}")]
    Database(String),

    /// 중복 충돌 (이메일 고유 제약 등)
    #[error("충돌: {0}")]
    Conflict(String),

    /// 대상 없음
    #[error("찾을 수 없음: {0}")]
    NotFound(String),

    /// 역할 이름 없음 (할당/제거 요청의 역할이 존재하지 않음)
    #[error("역할을 찾을 수 없음: {0}")]
    RoleNotFound(String),

    /// 해싱 실패
    #[error("해싱 실패: {0}")]
    Hashing(String),
}

/// 사용자 저장소 계약.
///
/// 조회 결과는 항상 역할이 포함된 투영입니다. 비밀번호 해시는
/// [`find_with_credentials`](UserStore::find_with_credentials)로만
/// 구체화됩니다. 원본 설계의 `findByEmail(withPass)` 이중 형태 반환은
/// 의도적으로 두 개의 명명된 작업으로 분리했습니다.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 이메일로 신원 조회 (해시 제외).
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError>;

    /// 이메일로 자격증명 포함 신원 조회.
    ///
    /// 자격증명 검증기 전용입니다.
    async fn find_with_credentials(
        &self,
        email: &str,
    ) -> Result<Option<CredentialedIdentity>, StoreError>;

    /// ID로 신원 조회.
    async fn find_by_id(&self, id: i64) -> Result<Option<Identity>, StoreError>;

    /// 전체 사용자 조회.
    async fn find_all(&self) -> Result<Vec<Identity>, StoreError>;

    /// 사용자 생성.
    ///
    /// 비밀번호는 저장 전에 해싱되며, 기본 역할(`user`)이 부여됩니다.
    async fn create(&self, user: NewUser) -> Result<Identity, StoreError>;

    /// 사용자 수정 (None 필드는 무시).
    async fn update(&self, id: i64, data: UserUpdate) -> Result<Identity, StoreError>;

    /// 사용자 삭제. 존재하지 않으면 false.
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;

    /// 역할 할당.
    ///
    /// 요청한 이름 중 하나라도 존재하지 않으면 전체가 실패합니다.
    async fn assign_roles(&self, id: i64, names: &[&str]) -> Result<Identity, StoreError>;

    /// 역할 제거. 보유하지 않은 역할 이름은 무시됩니다.
    async fn remove_roles(&self, id: i64, names: &[&str]) -> Result<Identity, StoreError>;
}

#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryUserStore;

#[cfg(any(test, feature = "test-utils"))]
mod memory {
    use std::collections::BTreeMap;
    use std::sync::{Arc, RwLock};

    use super::*;
    use crate::password::PasswordHasher;
    use crate::role::{Role, RoleRegistry, USER};

    struct StoredUser {
        identity: Identity,
        password_hash: String,
    }

    struct Inner {
        users: BTreeMap<i64, StoredUser>,
        next_id: i64,
    }

    /// 테스트용 인메모리 사용자 저장소.
    ///
    /// 운영 Postgres 저장소와 동일한 계약을 따릅니다.
    /// 쓰기 직렬화는 내부 RwLock이 담당합니다.
    pub struct MemoryUserStore {
        hasher: Arc<dyn PasswordHasher>,
        registry: RoleRegistry,
        inner: RwLock<Inner>,
    }

    impl MemoryUserStore {
        /// 새 인메모리 저장소 생성.
        pub fn new(hasher: Arc<dyn PasswordHasher>) -> Self {
            Self {
                hasher,
                registry: RoleRegistry::builtin(),
                inner: RwLock::new(Inner {
                    users: BTreeMap::new(),
                    next_id: 1,
                }),
            }
        }

        fn lock_read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
            self.inner.read().unwrap_or_else(|e| e.into_inner())
        }

        fn lock_write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
            self.inner.write().unwrap_or_else(|e| e.into_inner())
        }
    }

    #[async_trait]
    impl UserStore for MemoryUserStore {
        async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError> {
            let inner = self.lock_read();
            Ok(inner
                .users
                .values()
                .find(|u| u.identity.email == email)
                .map(|u| u.identity.clone()))
        }

        async fn find_with_credentials(
            &self,
            email: &str,
        ) -> Result<Option<CredentialedIdentity>, StoreError> {
            let inner = self.lock_read();
            Ok(inner
                .users
                .values()
                .find(|u| u.identity.email == email)
                .map(|u| CredentialedIdentity {
                    identity: u.identity.clone(),
                    password_hash: u.password_hash.clone(),
                }))
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<Identity>, StoreError> {
            let inner = self.lock_read();
            Ok(inner.users.get(&id).map(|u| u.identity.clone()))
        }

        async fn find_all(&self) -> Result<Vec<Identity>, StoreError> {
            let inner = self.lock_read();
            Ok(inner.users.values().map(|u| u.identity.clone()).collect())
        }

        async fn create(&self, user: NewUser) -> Result<Identity, StoreError> {
            let password_hash = self
                .hasher
                .hash(&user.password)
                .map_err(|e| StoreError::Hashing(e.to_string()))?;

            let mut inner = self.lock_write();
            if inner
                .users
                .values()
                .any(|u| u.identity.email == user.email)
            {
                return Err(StoreError::Conflict(format!(
                    "이미 등록된 이메일: {}",
                    user.email
                )));
            }

            let id = inner.next_id;
            inner.next_id += 1;

            let identity = Identity {
                id,
                first_name: user.first_name,
                surname: user.surname,
                email: user.email,
                roles: vec![Role::new(USER)],
            };
            inner.users.insert(
                id,
                StoredUser {
                    identity: identity.clone(),
                    password_hash,
                },
            );
            Ok(identity)
        }

        async fn update(&self, id: i64, data: UserUpdate) -> Result<Identity, StoreError> {
            let mut inner = self.lock_write();
            let user = inner
                .users
                .get_mut(&id)
                .ok_or_else(|| StoreError::NotFound(format!("사용자 {}", id)))?;

            if let Some(first_name) = data.first_name {
                user.identity.first_name = first_name;
            }
            if let Some(surname) = data.surname {
                user.identity.surname = surname;
            }
            if let Some(email) = data.email {
                user.identity.email = email;
            }
            Ok(user.identity.clone())
        }

        async fn delete(&self, id: i64) -> Result<bool, StoreError> {
            let mut inner = self.lock_write();
            Ok(inner.users.remove(&id).is_some())
        }

        async fn assign_roles(&self, id: i64, names: &[&str]) -> Result<Identity, StoreError> {
            let roles = self
                .registry
                .find_by_name(names)
                .ok_or_else(|| StoreError::RoleNotFound(names.join(", ")))?;

            let mut inner = self.lock_write();
            let user = inner
                .users
                .get_mut(&id)
                .ok_or_else(|| StoreError::NotFound(format!("사용자 {}", id)))?;

            for role in roles {
                if !user.identity.roles.contains(&role) {
                    user.identity.roles.push(role);
                }
            }
            Ok(user.identity.clone())
        }

        async fn remove_roles(&self, id: i64, names: &[&str]) -> Result<Identity, StoreError> {
            let mut inner = self.lock_write();
            let user = inner
                .users
                .get_mut(&id)
                .ok_or_else(|| StoreError::NotFound(format!("사용자 {}", id)))?;

            user.identity
                .roles
                .retain(|held| !names.contains(&held.name.as_str()));
            Ok(user.identity.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::password::{Argon2Hasher, PasswordHasher};
    use crate::role::{ADMIN, USER};

    fn new_store() -> MemoryUserStore {
        MemoryUserStore::new(Arc::new(Argon2Hasher::new()))
    }

    fn carl() -> NewUser {
        NewUser {
            first_name: "Carl".to_string(),
            surname: "Johnson".to_string(),
            email: "carl.johnson@contentry.org".to_string(),
            password: "carljohnson".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_default_role_and_hashes_password() {
        let store = new_store();
        let identity = store.create(carl()).await.unwrap();

        assert_eq!(identity.role_names(), vec![USER]);

        let creds = store
            .find_with_credentials("carl.johnson@contentry.org")
            .await
            .unwrap()
            .unwrap();
        assert_ne!(creds.password_hash, "carljohnson");
        assert!(Argon2Hasher::new().verify("carljohnson", &creds.password_hash));
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_email() {
        let store = new_store();
        store.create(carl()).await.unwrap();

        let err = store.create(carl()).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_find_by_email_excludes_hash() {
        let store = new_store();
        store.create(carl()).await.unwrap();

        let identity = store
            .find_by_email("carl.johnson@contentry.org")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(identity.first_name, "Carl");
        // Identity 타입에는 해시 필드 자체가 없음
    }

    #[tokio::test]
    async fn test_update_partial_fields() {
        let store = new_store();
        let created = store.create(carl()).await.unwrap();

        let updated = store
            .update(
                created.id,
                UserUpdate {
                    surname: Some("Vercetti".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.first_name, "Carl");
        assert_eq!(updated.surname, "Vercetti");
    }

    #[tokio::test]
    async fn test_concurrent_partial_updates_both_land() {
        let store = Arc::new(new_store());
        let created = store.create(carl()).await.unwrap();

        // 서로 다른 필드를 동시에 수정해도 어느 쪽도 유실되지 않아야 한다
        let first = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .update(
                        created.id,
                        UserUpdate {
                            first_name: Some("CJ".to_string()),
                            ..Default::default()
                        },
                    )
                    .await
            })
        };
        let second = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .update(
                        created.id,
                        UserUpdate {
                            surname: Some("Vercetti".to_string()),
                            ..Default::default()
                        },
                    )
                    .await
            })
        };
        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();

        let identity = store.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(identity.first_name, "CJ");
        assert_eq!(identity.surname, "Vercetti");
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let store = new_store();
        let err = store.update(42, UserUpdate::default()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = new_store();
        let created = store.create(carl()).await.unwrap();

        assert!(store.delete(created.id).await.unwrap());
        assert!(!store.delete(created.id).await.unwrap());
        assert!(store.find_by_id(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_assign_and_remove_roles() {
        let store = new_store();
        let created = store.create(carl()).await.unwrap();

        let identity = store.assign_roles(created.id, &[ADMIN]).await.unwrap();
        assert!(identity.has_role(ADMIN));
        assert!(identity.has_role(USER));

        // 중복 할당은 누적되지 않음
        let identity = store.assign_roles(created.id, &[ADMIN]).await.unwrap();
        assert_eq!(identity.roles.len(), 2);

        let identity = store.remove_roles(created.id, &[ADMIN]).await.unwrap();
        assert!(!identity.has_role(ADMIN));
        assert!(identity.has_role(USER));
    }

    #[tokio::test]
    async fn test_assign_unknown_role_fails_whole_request() {
        let store = new_store();
        let created = store.create(carl()).await.unwrap();

        let err = store
            .assign_roles(created.id, &[ADMIN, "ghost"])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::RoleNotFound(_)));

        // 부분 적용 없음
        let identity = store.find_by_id(created.id).await.unwrap().unwrap();
        assert!(!identity.has_role(ADMIN));
    }
}
