use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior};
use uuid::Uuid;

use tripnote_types::{Comment, Like, Mimic};

use super::post_repository::{is_visible, load_comments, load_visible_post};
use super::rows::{datetime_at, now_timestamp, uuid_at};
use crate::db::DbPool;

/// Result of bookmarking a post
#[derive(Debug)]
pub enum MimicOutcome {
    Created(Mimic),
    AlreadyMimicked,
    PostNotFound,
}

/// Likes, mimics and comments
pub struct EngagementRepository {
    pool: DbPool,
}

fn load_mimic(conn: &Connection, user_id: &Uuid, post_id: &Uuid) -> rusqlite::Result<Option<Mimic>> {
    conn.query_row(
        "SELECT id, user_id, post_id, notes, created_at FROM mimics WHERE user_id = ? AND post_id = ?",
        (user_id.to_string(), post_id.to_string()),
        |row| {
            Ok(Mimic {
                id: row.get(0)?,
                user_id: uuid_at(row, 1)?,
                post_id: uuid_at(row, 2)?,
                notes: row.get(3)?,
                created_at: datetime_at(row, 4)?,
                post: None,
            })
        },
    )
    .optional()
}

impl EngagementRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Flip the like for (user, post) and return whether it is now liked.
    ///
    /// Runs as one IMMEDIATE transaction: delete the pair, insert it only if
    /// nothing was deleted. Returns None when the post is missing or hidden.
    pub fn toggle_like(&self, user_id: &Uuid, post_id: &Uuid) -> Result<Option<bool>> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if !is_visible(&tx, post_id)? {
            return Ok(None);
        }

        let removed = tx
            .execute(
                "DELETE FROM likes WHERE user_id = ? AND post_id = ?",
                (user_id.to_string(), post_id.to_string()),
            )
            .context("Failed to remove like")?;
        if removed == 0 {
            tx.execute(
                "INSERT INTO likes (user_id, post_id, created_at) VALUES (?, ?, ?)",
                (user_id.to_string(), post_id.to_string(), now_timestamp()),
            )
            .context("Failed to add like")?;
        }

        tx.commit()?;
        Ok(Some(removed == 0))
    }

    /// Every like on a post, including posts that have since been hidden
    pub fn likes_for_post(&self, post_id: &Uuid) -> Result<Vec<Like>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT user_id, post_id, created_at FROM likes WHERE post_id = ? ORDER BY created_at",
        )?;
        let likes = stmt
            .query_map([post_id.to_string()], |row| {
                Ok(Like {
                    user_id: uuid_at(row, 0)?,
                    post_id: uuid_at(row, 1)?,
                    created_at: datetime_at(row, 2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(likes)
    }

    /// Bookmark a post; the unique (user, post) pair guards duplicates
    pub fn add_mimic(&self, user_id: &Uuid, post_id: &Uuid, note: Option<&str>) -> Result<MimicOutcome> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if !is_visible(&tx, post_id)? {
            return Ok(MimicOutcome::PostNotFound);
        }

        let inserted = tx
            .execute(
                "INSERT INTO mimics (user_id, post_id, notes, created_at) VALUES (?, ?, ?, ?)
                 ON CONFLICT (user_id, post_id) DO NOTHING",
                (user_id.to_string(), post_id.to_string(), note, now_timestamp()),
            )
            .context("Failed to add mimic")?;
        if inserted == 0 {
            return Ok(MimicOutcome::AlreadyMimicked);
        }

        let mimic = load_mimic(&tx, user_id, post_id)?.context("Mimic missing after insert")?;
        tx.commit()?;
        Ok(MimicOutcome::Created(mimic))
    }

    /// Remove a bookmark. Returns false when there was none.
    pub fn remove_mimic(&self, user_id: &Uuid, post_id: &Uuid) -> Result<bool> {
        let conn = self.pool.get()?;
        let removed = conn
            .execute(
                "DELETE FROM mimics WHERE user_id = ? AND post_id = ?",
                (user_id.to_string(), post_id.to_string()),
            )
            .context("Failed to remove mimic")?;
        Ok(removed > 0)
    }

    /// The user's bookmarks, newest first, each with its post while visible
    pub fn list_mimics(&self, user_id: &Uuid) -> Result<Vec<Mimic>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, post_id, notes, created_at FROM mimics
             WHERE user_id = ?
             ORDER BY created_at DESC, id DESC",
        )?;
        let mut mimics = stmt
            .query_map([user_id.to_string()], |row| {
                Ok(Mimic {
                    id: row.get(0)?,
                    user_id: uuid_at(row, 1)?,
                    post_id: uuid_at(row, 2)?,
                    notes: row.get(3)?,
                    created_at: datetime_at(row, 4)?,
                    post: None,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);

        for mimic in &mut mimics {
            mimic.post = load_visible_post(&conn, &mimic.post_id)?.map(Box::new);
        }
        Ok(mimics)
    }

    /// Append a comment. Returns None when the post is missing or hidden.
    pub fn add_comment(&self, user_id: &Uuid, post_id: &Uuid, content: &str) -> Result<Option<Comment>> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        if !is_visible(&tx, post_id)? {
            return Ok(None);
        }

        tx.execute(
            "INSERT INTO comments (post_id, user_id, content, created_at) VALUES (?, ?, ?, ?)",
            (post_id.to_string(), user_id.to_string(), content, now_timestamp()),
        )
        .context("Failed to add comment")?;
        let id = tx.last_insert_rowid();

        let comment = tx
            .query_row(
                "SELECT c.id, c.post_id, c.user_id, u.username, c.content, c.created_at
                 FROM comments c JOIN users u ON u.id = c.user_id
                 WHERE c.id = ?",
                [id],
                |row| {
                    Ok(Comment {
                        id: row.get(0)?,
                        post_id: uuid_at(row, 1)?,
                        user_id: uuid_at(row, 2)?,
                        username: row.get(3)?,
                        content: row.get(4)?,
                        created_at: datetime_at(row, 5)?,
                    })
                },
            )
            .context("Failed to read back comment")?;
        tx.commit()?;
        Ok(Some(comment))
    }

    /// Every comment on a post, including posts that have since been hidden
    pub fn comments_for_post(&self, post_id: &Uuid) -> Result<Vec<Comment>> {
        let conn = self.pool.get()?;
        Ok(load_comments(&conn, post_id)?)
    }
}
