use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use tripnote_types::User;

use super::rows::{datetime_at, now_timestamp, uuid_at};
use crate::db::DbPool;

const USER_COLUMNS: &str =
    "id, username, display_name, is_active, is_verified, created_at";

/// A user row together with its password hash, for login checks only
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub user: User,
    pub password_hash: String,
}

pub struct UserRepository {
    pool: DbPool,
}

pub(crate) fn map_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: uuid_at(row, 0)?,
        username: row.get(1)?,
        display_name: row.get(2)?,
        is_active: row.get::<_, i64>(3)? == 1,
        is_verified: row.get::<_, i64>(4)? == 1,
        created_at: datetime_at(row, 5)?,
    })
}

/// Insert an empty profile for the user unless one exists.
///
/// `display_name` seeds the new row only; an existing profile is untouched.
pub fn ensure_profile_on(
    conn: &Connection,
    user_id: &Uuid,
    display_name: Option<&str>,
) -> rusqlite::Result<bool> {
    let now = now_timestamp();
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO profiles (user_id, display_name, created_at, updated_at)
         VALUES (?, ?, ?, ?)",
        (user_id.to_string(), display_name, &now, &now),
    )?;
    Ok(inserted == 1)
}

impl UserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a user and its profile in one transaction
    pub fn create(&self, username: &str, password_hash: &str, display_name: &str) -> Result<User> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        let id = Uuid::new_v4();
        let now = now_timestamp();
        tx.execute(
            "INSERT INTO users (id, username, password_hash, display_name, is_active, is_verified, created_at, updated_at)
             VALUES (?, ?, ?, ?, 1, 0, ?, ?)",
            (id.to_string(), username, password_hash, display_name, &now, &now),
        )
        .context("Failed to create user")?;
        ensure_profile_on(&tx, &id, Some(display_name)).context("Failed to create profile")?;

        let user = tx
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"),
                [id.to_string()],
                map_user,
            )
            .context("Failed to read back new user")?;
        tx.commit().context("Failed to commit new user")?;
        Ok(user)
    }

    /// Get user by ID
    pub fn get_by_id(&self, user_id: &Uuid) -> Result<Option<User>> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"),
                [user_id.to_string()],
                map_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Get user by username
    pub fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?"),
                [username],
                map_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Get user plus password hash by username
    pub fn get_credentials(&self, username: &str) -> Result<Option<StoredUser>> {
        let conn = self.pool.get()?;
        let stored = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS}, password_hash FROM users WHERE username = ?"),
                [username],
                |row| {
                    Ok(StoredUser {
                        user: map_user(row)?,
                        password_hash: row.get(6)?,
                    })
                },
            )
            .optional()?;
        Ok(stored)
    }

    pub fn get_password_hash(&self, user_id: &Uuid) -> Result<Option<String>> {
        let conn = self.pool.get()?;
        let hash = conn
            .query_row(
                "SELECT password_hash FROM users WHERE id = ?",
                [user_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(hash)
    }

    /// Replace the stored password hash
    pub fn set_password(&self, user_id: &Uuid, password_hash: &str) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?",
            (password_hash, now_timestamp(), user_id.to_string()),
        )
        .context("Failed to update password")?;
        Ok(())
    }

    pub fn deactivate(&self, user_id: &Uuid) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "UPDATE users SET is_active = 0, updated_at = ? WHERE id = ?",
            (now_timestamp(), user_id.to_string()),
        )
        .context("Failed to deactivate user")?;
        Ok(())
    }

    /// Make sure the user has a profile row, creating an empty one if missing.
    /// Returns true when a row was created.
    pub fn ensure_profile(&self, user_id: &Uuid) -> Result<bool> {
        let conn = self.pool.get()?;
        let display_name: Option<String> = conn
            .query_row(
                "SELECT display_name FROM users WHERE id = ?",
                [user_id.to_string()],
                |row| row.get(0),
            )
            .optional()?
            .flatten();
        let created = ensure_profile_on(&conn, user_id, display_name.as_deref())
            .context("Failed to ensure profile")?;
        Ok(created)
    }

    /// Count of non-deleted posts authored by the user
    pub fn post_count(&self, user_id: &Uuid) -> Result<usize> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM posts WHERE author_id = ? AND is_deleted = 0",
            [user_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
