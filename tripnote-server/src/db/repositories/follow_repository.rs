use anyhow::{Context, Result};
use rusqlite::TransactionBehavior;
use uuid::Uuid;

use tripnote_types::UserSummary;

use super::rows::{now_timestamp, uuid_at};
use crate::db::DbPool;

pub struct FollowRepository {
    pool: DbPool,
}

impl FollowRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Flip the follow edge and return whether it now exists.
    /// Returns None when the followed user does not exist.
    pub fn toggle_follow(&self, follower_id: &Uuid, followed_id: &Uuid) -> Result<Option<bool>> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let target_exists: i64 = tx.query_row(
            "SELECT COUNT(*) FROM users WHERE id = ?",
            [followed_id.to_string()],
            |row| row.get(0),
        )?;
        if target_exists == 0 {
            return Ok(None);
        }

        let removed = tx
            .execute(
                "DELETE FROM follows WHERE follower_id = ? AND followed_id = ?",
                (follower_id.to_string(), followed_id.to_string()),
            )
            .context("Failed to unfollow user")?;
        if removed == 0 {
            tx.execute(
                "INSERT INTO follows (follower_id, followed_id, created_at) VALUES (?, ?, ?)",
                (follower_id.to_string(), followed_id.to_string(), now_timestamp()),
            )
            .context("Failed to follow user")?;
        }

        tx.commit()?;
        Ok(Some(removed == 0))
    }

    /// Ids of users this user follows
    pub fn following_ids(&self, user_id: &Uuid) -> Result<Vec<Uuid>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT followed_id FROM follows WHERE follower_id = ? ORDER BY created_at DESC",
        )?;
        let ids = stmt
            .query_map([user_id.to_string()], |row| uuid_at(row, 0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    /// Users following this user
    pub fn followers(&self, user_id: &Uuid) -> Result<Vec<UserSummary>> {
        self.summaries(
            "SELECT u.id, u.username, u.display_name, pr.avatar_url, pr.bio
             FROM follows f
             JOIN users u ON u.id = f.follower_id
             LEFT JOIN profiles pr ON pr.user_id = u.id
             WHERE f.followed_id = ?
             ORDER BY f.created_at DESC",
            user_id,
        )
    }

    /// Users this user follows
    pub fn following(&self, user_id: &Uuid) -> Result<Vec<UserSummary>> {
        self.summaries(
            "SELECT u.id, u.username, u.display_name, pr.avatar_url, pr.bio
             FROM follows f
             JOIN users u ON u.id = f.followed_id
             LEFT JOIN profiles pr ON pr.user_id = u.id
             WHERE f.follower_id = ?
             ORDER BY f.created_at DESC",
            user_id,
        )
    }

    fn summaries(&self, sql: &str, user_id: &Uuid) -> Result<Vec<UserSummary>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(sql)?;
        let users = stmt
            .query_map([user_id.to_string()], map_summary)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }
}

/// Map `u.id, u.username, u.display_name, pr.avatar_url, pr.bio`
pub(crate) fn map_summary(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserSummary> {
    Ok(UserSummary {
        user_id: uuid_at(row, 0)?,
        username: row.get(1)?,
        display_name: row.get(2)?,
        avatar_url: row.get(3)?,
        bio: row.get(4)?,
    })
}
