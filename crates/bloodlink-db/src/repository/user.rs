//! SurrealDB implementation of [`UserRepository`].

use bloodlink_core::error::{BloodlinkError, BloodlinkResult};
use bloodlink_core::models::blood_group::BloodGroup;
use bloodlink_core::models::user::{CreateUser, User, UserRole};
use bloodlink_core::repository::UserRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, decode, decode_uuid};
use crate::error::DbError;

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRow {
    record_id: String,
    username: String,
    email: String,
    phone: String,
    password_hash: String,
    role: String,
    blood_group: Option<String>,
    age: Option<u32>,
    email_verified: bool,
    phone_verified: bool,
    registration_date: DateTime<Utc>,
}

impl UserRow {
    fn try_into_user(self) -> Result<User, DbError> {
        let role = UserRole::parse(&self.role)
            .ok_or_else(|| DbError::Decode(format!("role: unknown role {}", self.role)))?;
        let blood_group = self
            .blood_group
            .as_deref()
            .map(|g| decode::<BloodGroup>(g, "blood_group"))
            .transpose()?;
        Ok(User {
            id: decode_uuid(&self.record_id)?,
            username: self.username,
            email: self.email,
            phone: self.phone,
            password_hash: self.password_hash,
            role,
            blood_group,
            age: self.age,
            email_verified: self.email_verified,
            phone_verified: self.phone_verified,
            registration_date: self.registration_date,
        })
    }
}

/// Minimal projection used to detect whether an UPDATE matched.
#[derive(Debug, SurrealValue)]
struct UsernameRow {
    #[allow(dead_code)]
    username: String,
}

const SELECT_USER: &str = "SELECT meta::id(id) AS record_id, * FROM user";

/// SurrealDB implementation of the User repository.
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> Clone for SurrealUserRepository<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn find_one(&self, column: &'static str, value: &str) -> BloodlinkResult<User> {
        let mut result = self
            .db
            .query(format!("{SELECT_USER} WHERE {column} = $value LIMIT 1"))
            .bind(("value", value.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: format!("{column}={value}"),
        })?;

        Ok(row.try_into_user()?)
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> BloodlinkResult<User> {
        match self.find_one("username", &input.username).await {
            Ok(_) => {
                return Err(BloodlinkError::AlreadyExists {
                    entity: format!("user {}", input.username),
                });
            }
            Err(BloodlinkError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 username = $username, email = $email, phone = $phone, \
                 password_hash = $password_hash, role = $role, \
                 blood_group = $blood_group, age = $age, \
                 email_verified = $email_verified, \
                 phone_verified = $phone_verified; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('user', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("username", input.username))
            .bind(("email", input.email))
            .bind(("phone", input.phone))
            .bind(("password_hash", input.password_hash))
            .bind(("role", input.role.as_str().to_string()))
            .bind((
                "blood_group",
                input.blood_group.map(|g| g.as_str().to_string()),
            ))
            .bind(("age", input.age))
            .bind(("email_verified", input.email_verified))
            .bind(("phone_verified", input.phone_verified))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        // Statement 0 is the CREATE, statement 1 re-reads with the id.
        let rows: Vec<UserRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.try_into_user()?)
    }

    async fn get_by_username(&self, username: &str) -> BloodlinkResult<User> {
        self.find_one("username", username).await
    }

    async fn get_by_email(&self, email: &str) -> BloodlinkResult<User> {
        self.find_one("email", email).await
    }

    async fn list_by_role(&self, role: UserRole) -> BloodlinkResult<Vec<User>> {
        let mut result = self
            .db
            .query(format!(
                "{SELECT_USER} WHERE role = $role ORDER BY registration_date ASC"
            ))
            .bind(("role", role.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let users = rows
            .into_iter()
            .map(UserRow::try_into_user)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(users)
    }

    async fn update_password(&self, username: &str, password_hash: String) -> BloodlinkResult<()> {
        let mut result = self
            .db
            .query(
                "UPDATE user SET password_hash = $password_hash \
                 WHERE username = $username",
            )
            .bind(("username", username.to_string()))
            .bind(("password_hash", password_hash))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UsernameRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "user".into(),
                id: format!("username={username}"),
            }
            .into());
        }
        Ok(())
    }

    async fn count(&self) -> BloodlinkResult<u64> {
        let mut result = self
            .db
            .query("SELECT count() AS total FROM user GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}
