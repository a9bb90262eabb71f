//! Postgres 기반 사용자 저장소.
//!
//! `users`, `roles`, `users_roles` 테이블 위에서 [`UserStore`] 계약을
//! 구현합니다. 신원↔역할 다대다 관계는 명시적 조인 테이블이며, 모든
//! 읽기는 역할이 포함된 투영으로 반환됩니다.
//!
//! 충돌하는 쓰기의 직렬화는 데이터베이스 트랜잭션에 위임합니다.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use contentry_core::{
    CredentialedIdentity, Identity, NewUser, PasswordHasher, Role, StoreError, UserStore,
    UserUpdate, USER,
};

/// 사용자 + 역할 조인 결과 한 행.
#[derive(sqlx::FromRow)]
struct UserRoleRow {
    id: i64,
    first_name: String,
    surname: String,
    email: String,
    role_name: Option<String>,
}

/// 자격증명 포함 사용자 행.
#[derive(sqlx::FromRow)]
struct CredentialedRow {
    id: i64,
    first_name: String,
    surname: String,
    email: String,
    password: String,
}

const SELECT_WITH_ROLES: &str = r#"
    SELECT u.id, u.first_name, u.surname, u.email, r.name AS role_name
    FROM users u
    LEFT JOIN users_roles ur ON ur.user_id = u.id
    LEFT JOIN roles r ON r.id = ur.role_id
"#;

fn db_err(e: sqlx::Error) -> StoreError {
    if let Some(db) = e.as_database_error() {
        if db.is_unique_violation() {
            return StoreError::Conflict(db.to_string());
        }
    }
    StoreError::Database(e.to_string())
}

/// 조인 행들을 Identity 목록으로 접습니다 (u.id 정렬 전제).
fn fold_rows(rows: Vec<UserRoleRow>) -> Vec<Identity> {
    let mut identities: Vec<Identity> = Vec::new();
    for row in rows {
        match identities.last_mut() {
            Some(last) if last.id == row.id => {
                if let Some(name) = row.role_name {
                    last.roles.push(Role::new(name));
                }
            }
            _ => {
                let roles = row.role_name.map(Role::new).into_iter().collect();
                identities.push(Identity {
                    id: row.id,
                    first_name: row.first_name,
                    surname: row.surname,
                    email: row.email,
                    roles,
                });
            }
        }
    }
    identities
}

/// Postgres 사용자 저장소.
pub struct PgUserStore {
    pool: PgPool,
    hasher: Arc<dyn PasswordHasher>,
}

impl PgUserStore {
    /// 새 저장소 생성.
    pub fn new(pool: PgPool, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { pool, hasher }
    }

    async fn find_one(&self, where_clause: &str, email: Option<&str>, id: Option<i64>)
        -> Result<Option<Identity>, StoreError>
    {
        let query = format!("{} WHERE {} ORDER BY u.id, r.id", SELECT_WITH_ROLES, where_clause);
        let mut q = sqlx::query_as::<_, UserRoleRow>(&query);
        if let Some(email) = email {
            q = q.bind(email.to_string());
        }
        if let Some(id) = id {
            q = q.bind(id);
        }
        let rows = q.fetch_all(&self.pool).await.map_err(db_err)?;
        Ok(fold_rows(rows).into_iter().next())
    }

    async fn roles_for(&self, user_id: i64) -> Result<Vec<Role>, StoreError> {
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT r.name FROM roles r
            JOIN users_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = $1
            ORDER BY r.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(names.into_iter().map(Role::new).collect())
    }

    /// 이름으로 역할 ID 조회. 하나라도 없으면 전체 실패.
    async fn role_ids(
        tx: &mut Transaction<'_, Postgres>,
        names: &[&str],
    ) -> Result<Vec<i64>, StoreError> {
        let requested: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        let found: Vec<(i64, String)> =
            sqlx::query_as("SELECT id, name FROM roles WHERE name = ANY($1)")
                .bind(&requested)
                .fetch_all(&mut **tx)
                .await
                .map_err(db_err)?;

        if found.len() != requested.len() {
            let missing: Vec<&str> = names
                .iter()
                .filter(|n| !found.iter().any(|(_, name)| name == **n))
                .copied()
                .collect();
            return Err(StoreError::RoleNotFound(missing.join(", ")));
        }
        Ok(found.into_iter().map(|(id, _)| id).collect())
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError> {
        self.find_one("u.email = $1", Some(email), None).await
    }

    async fn find_with_credentials(
        &self,
        email: &str,
    ) -> Result<Option<CredentialedIdentity>, StoreError> {
        let row: Option<CredentialedRow> = sqlx::query_as(
            "SELECT id, first_name, surname, email, password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let roles = self.roles_for(row.id).await?;
        Ok(Some(CredentialedIdentity {
            identity: Identity {
                id: row.id,
                first_name: row.first_name,
                surname: row.surname,
                email: row.email,
                roles,
            },
            password_hash: row.password,
        }))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Identity>, StoreError> {
        self.find_one("u.id = $1", None, Some(id)).await
    }

    async fn find_all(&self) -> Result<Vec<Identity>, StoreError> {
        let query = format!("{} ORDER BY u.id, r.id", SELECT_WITH_ROLES);
        let rows = sqlx::query_as::<_, UserRoleRow>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(fold_rows(rows))
    }

    async fn create(&self, user: NewUser) -> Result<Identity, StoreError> {
        // argon2 해싱은 블로킹 스레드에서
        let hasher = Arc::clone(&self.hasher);
        let plaintext = user.password.clone();
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| StoreError::Hashing(e.to_string()))?
            .map_err(|e| StoreError::Hashing(e.to_string()))?;

        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (first_name, surname, email, password)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&user.first_name)
        .bind(&user.surname)
        .bind(&user.email)
        .bind(&password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err)?;

        // 기본 역할 부여
        let role_ids = Self::role_ids(&mut tx, &[USER]).await?;
        for role_id in &role_ids {
            sqlx::query("INSERT INTO users_roles (user_id, role_id) VALUES ($1, $2)")
                .bind(id)
                .bind(role_id)
                .execute(&mut *tx)
                .await
                .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;

        Ok(Identity {
            id,
            first_name: user.first_name,
            surname: user.surname,
            email: user.email,
            roles: vec![Role::new(USER)],
        })
    }

    async fn update(&self, id: i64, data: UserUpdate) -> Result<Identity, StoreError> {
        // 읽기-병합-쓰기를 한 트랜잭션으로 묶고 행 잠금으로 직렬화한다
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let existing: Option<(String, String, String)> = sqlx::query_as(
            "SELECT first_name, surname, email FROM users WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?;

        let Some((existing_first, existing_surname, existing_email)) = existing else {
            return Err(StoreError::NotFound(format!("사용자 {}", id)));
        };

        let first_name = data.first_name.unwrap_or(existing_first);
        let surname = data.surname.unwrap_or(existing_surname);
        let email = data.email.unwrap_or(existing_email);

        sqlx::query("UPDATE users SET first_name = $2, surname = $3, email = $4 WHERE id = $1")
            .bind(id)
            .bind(&first_name)
            .bind(&surname)
            .bind(&email)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;

        let roles = self.roles_for(id).await?;
        Ok(Identity {
            id,
            first_name,
            surname,
            email,
            roles,
        })
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query("DELETE FROM users_roles WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn assign_roles(&self, id: i64, names: &[&str]) -> Result<Identity, StoreError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let role_ids = Self::role_ids(&mut tx, names).await?;
        for role_id in &role_ids {
            sqlx::query(
                r#"
                INSERT INTO users_roles (user_id, role_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(id)
            .bind(role_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("사용자 {}", id)))
    }

    async fn remove_roles(&self, id: i64, names: &[&str]) -> Result<Identity, StoreError> {
        let requested: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        sqlx::query(
            r#"
            DELETE FROM users_roles ur
            USING roles r
            WHERE ur.role_id = r.id AND ur.user_id = $1 AND r.name = ANY($2)
            "#,
        )
        .bind(id)
        .bind(&requested)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("사용자 {}", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_rows_groups_roles_per_user() {
        let rows = vec![
            UserRoleRow {
                id: 1,
                first_name: "Carl".into(),
                surname: "Johnson".into(),
                email: "carl.johnson@contentry.org".into(),
                role_name: Some("user".into()),
            },
            UserRoleRow {
                id: 1,
                first_name: "Carl".into(),
                surname: "Johnson".into(),
                email: "carl.johnson@contentry.org".into(),
                role_name: Some("admin".into()),
            },
            UserRoleRow {
                id: 2,
                first_name: "John".into(),
                surname: "Wick".into(),
                email: "john.wick@contentry.org".into(),
                role_name: None,
            },
        ];

        let identities = fold_rows(rows);
        assert_eq!(identities.len(), 2);
        assert_eq!(identities[0].role_names(), vec!["user", "admin"]);
        assert!(identities[1].roles.is_empty());
    }
}
