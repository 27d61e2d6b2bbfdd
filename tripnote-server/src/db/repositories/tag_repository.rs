use anyhow::Result;
use rusqlite::Connection;

use tripnote_types::TagCount;

use crate::db::DbPool;

pub struct TagRepository {
    pool: DbPool,
}

/// Find a tag by exact (case-sensitive) name, creating it on first use
pub(crate) fn find_or_create_tag(conn: &Connection, name: &str) -> rusqlite::Result<i64> {
    conn.execute("INSERT OR IGNORE INTO tags (name) VALUES (?)", [name])?;
    conn.query_row("SELECT id FROM tags WHERE name = ?", [name], |row| row.get(0))
}

impl TagRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Most used tags first, counting only visible posts
    pub fn popular(&self, limit: u32) -> Result<Vec<TagCount>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT t.id, t.name, COUNT(p.id) AS post_count
             FROM tags t
             LEFT JOIN post_tags pt ON pt.tag_id = t.id
             LEFT JOIN posts p ON p.id = pt.post_id AND p.is_deleted = 0
             GROUP BY t.id, t.name
             ORDER BY post_count DESC, t.name ASC
             LIMIT ?",
        )?;

        let tags = stmt
            .query_map([i64::from(limit)], |row| {
                Ok(TagCount {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    post_count: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tags)
    }
}
