use serde::Serialize;
use sqlx::{FromRow, PgPool};

/// Full user row, including the password hash. Never serialized.
#[derive(Debug, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

/// The user fields safe to return to clients.
#[derive(Debug, Serialize, FromRow)]
pub struct PublicUser {
    pub id: i64,
    pub email: String,
    pub role: String,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self { id: user.id, email: user.email.clone(), role: user.role.clone() }
    }
}

pub async fn insert_user(
    pool: &PgPool,
    email: &str,
    password_hash: &str,
    role: &str,
) -> Result<PublicUser, sqlx::Error> {
    sqlx::query_as::<_, PublicUser>(
        "INSERT INTO users (email, password_hash, role) VALUES ($1, $2, $3) \
         RETURNING id, email, role",
    )
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, email, password_hash, role FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}
