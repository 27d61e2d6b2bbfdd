use anyhow::Result;
use uuid::Uuid;

use tripnote_types::{LocationRecommendation, UserSummary};

use super::follow_repository::map_summary;
use crate::db::DbPool;

pub struct RecommendationRepository {
    pool: DbPool,
}

impl RecommendationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Random users the viewer does not follow yet, excluding the viewer
    pub fn users(&self, viewer_id: &Uuid, limit: u32) -> Result<Vec<UserSummary>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT u.id, u.username, u.display_name, pr.avatar_url, pr.bio
             FROM users u
             LEFT JOIN profiles pr ON pr.user_id = u.id
             WHERE u.id != ?1
               AND u.is_active = 1
               AND u.id NOT IN (SELECT followed_id FROM follows WHERE follower_id = ?1)
             ORDER BY RANDOM()
             LIMIT ?2",
        )?;
        let users = stmt
            .query_map((viewer_id.to_string(), i64::from(limit)), map_summary)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// Route point locations appearing on the most visible posts
    pub fn locations(&self, limit: u32) -> Result<Vec<LocationRecommendation>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT rp.location_name,
                    COUNT(DISTINCT p.id) AS post_count,
                    MIN(pi.image_url) AS thumbnail
             FROM route_points rp
             JOIN posts p ON p.id = rp.post_id AND p.is_deleted = 0
             LEFT JOIN post_images pi ON pi.post_id = p.id
             WHERE rp.location_name IS NOT NULL AND rp.location_name != ''
             GROUP BY rp.location_name
             ORDER BY post_count DESC, rp.location_name ASC
             LIMIT ?",
        )?;
        let locations = stmt
            .query_map([i64::from(limit)], |row| {
                Ok(LocationRecommendation {
                    location_name: row.get(0)?,
                    post_count: row.get(1)?,
                    thumbnail: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(locations)
    }
}
