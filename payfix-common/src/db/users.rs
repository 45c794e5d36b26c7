//! Operator accounts

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::auth::{generate_salt, hash_password};
use crate::time::{now, to_millis};
use crate::{Error, Result};

/// Stored operator account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub username: String,
    pub password_hash: String,
    pub password_salt: String,
}

/// Create an operator account with a freshly salted password hash
///
/// Duplicate usernames are rejected with `Error::Conflict`.
pub async fn create_user(
    pool: &SqlitePool,
    name: &str,
    username: &str,
    password: &str,
) -> Result<User> {
    let salt = generate_salt();
    let user = User {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        username: username.to_string(),
        password_hash: hash_password(password, &salt),
        password_salt: salt,
    };

    let result = sqlx::query(
        r#"
        INSERT INTO users (id, name, username, password_hash, password_salt, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.id)
    .bind(&user.name)
    .bind(&user.username)
    .bind(&user.password_hash)
    .bind(&user.password_salt)
    .bind(to_millis(now()))
    .execute(pool)
    .await;

    match result {
        Ok(_) => Ok(user),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(Error::Conflict(
            format!("Username already registered: {}", username),
        )),
        Err(e) => Err(e.into()),
    }
}

/// Look up an operator account by username
pub async fn find_user_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    let record = sqlx::query_as::<_, (String, String, String, String, String)>(
        "SELECT id, name, username, password_hash, password_salt FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(record.map(|r| User {
        id: r.0,
        name: r.1,
        username: r.2,
        password_hash: r.3,
        password_salt: r.4,
    }))
}
