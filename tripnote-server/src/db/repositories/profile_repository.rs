use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use tripnote_types::{AgeGroup, Profile, ProfileView, UpdateProfileRequest};

use super::rows::{datetime_at, now_timestamp, uuid_at};
use super::user_repository::ensure_profile_on;
use crate::db::DbPool;

pub struct ProfileRepository {
    pool: DbPool,
}

fn map_profile(row: &Row<'_>) -> rusqlite::Result<Profile> {
    let age_group: Option<String> = row.get(5)?;
    Ok(Profile {
        user_id: uuid_at(row, 0)?,
        display_name: row.get(1)?,
        bio: row.get(2)?,
        avatar_url: row.get(3)?,
        banner_url: row.get(4)?,
        age_group: age_group.as_deref().and_then(AgeGroup::parse),
        updated_at: datetime_at(row, 6)?,
    })
}

pub(crate) fn load_profile(conn: &Connection, user_id: &Uuid) -> rusqlite::Result<Option<Profile>> {
    conn.query_row(
        "SELECT user_id, display_name, bio, avatar_url, banner_url, age_group, updated_at
         FROM profiles WHERE user_id = ?",
        [user_id.to_string()],
        map_profile,
    )
    .optional()
}

/// Only fields that are present and non-blank overwrite stored values
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl ProfileRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn get(&self, user_id: &Uuid) -> Result<Option<Profile>> {
        let conn = self.pool.get()?;
        Ok(load_profile(&conn, user_id)?)
    }

    /// Public profile page for a username, None when the user does not exist
    pub fn get_view(&self, username: &str) -> Result<Option<ProfileView>> {
        let conn = self.pool.get()?;
        let found = conn
            .query_row(
                "SELECT u.id, u.username, pr.display_name, pr.bio, pr.avatar_url, pr.banner_url, pr.age_group,
                        (SELECT COUNT(*) FROM follows WHERE followed_id = u.id),
                        (SELECT COUNT(*) FROM follows WHERE follower_id = u.id)
                 FROM users u
                 LEFT JOIN profiles pr ON pr.user_id = u.id
                 WHERE u.username = ?",
                [username],
                |row| {
                    let username: String = row.get(1)?;
                    let display_name: Option<String> = row.get(2)?;
                    let age_group: Option<String> = row.get(6)?;
                    Ok(ProfileView {
                        user_id: uuid_at(row, 0)?,
                        display_name: display_name
                            .filter(|name| !name.is_empty())
                            .unwrap_or_else(|| username.clone()),
                        username,
                        bio: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                        avatar_url: row.get(4)?,
                        banner_url: row.get(5)?,
                        age_group: age_group.as_deref().and_then(AgeGroup::parse),
                        follower_count: row.get::<_, i64>(7)? as usize,
                        following_count: row.get::<_, i64>(8)? as usize,
                    })
                },
            )
            .optional()?;
        Ok(found)
    }

    /// Apply a partial update, creating the profile first if needed.
    ///
    /// `age_group` must already be validated by the caller.
    pub fn update(&self, user_id: &Uuid, changes: &UpdateProfileRequest) -> Result<Profile> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        ensure_profile_on(&tx, user_id, None).context("Failed to ensure profile")?;
        tx.execute(
            "UPDATE profiles SET
                display_name = COALESCE(?, display_name),
                bio = COALESCE(?, bio),
                avatar_url = COALESCE(?, avatar_url),
                banner_url = COALESCE(?, banner_url),
                age_group = COALESCE(?, age_group),
                updated_at = ?
             WHERE user_id = ?",
            (
                non_empty(&changes.display_name),
                non_empty(&changes.bio),
                non_empty(&changes.avatar_url),
                non_empty(&changes.banner_url),
                non_empty(&changes.age_group),
                now_timestamp(),
                user_id.to_string(),
            ),
        )
        .context("Failed to update profile")?;

        let profile = load_profile(&tx, user_id)?
            .context("Profile missing after update")?;
        tx.commit()?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::UserRepository;
    use crate::db::Database;

    fn setup() -> (Database, ProfileRepository, UserRepository) {
        let db = Database::in_memory().expect("Failed to create database");
        db.initialize().expect("Failed to initialize schema");
        let profiles = ProfileRepository::new(db.pool.clone());
        let users = UserRepository::new(db.pool.clone());
        (db, profiles, users)
    }

    #[test]
    fn test_view_defaults_display_name_and_bio() {
        let (db, profiles, users) = setup();
        let user = users.create("hana", "hash", "").unwrap();
        {
            let conn = db.connection().unwrap();
            conn.execute("DELETE FROM profiles", []).unwrap();
        }

        let view = profiles.get_view("hana").unwrap().unwrap();
        assert_eq!(view.user_id, user.id);
        assert_eq!(view.display_name, "hana");
        assert_eq!(view.bio, "");
        assert_eq!(view.follower_count, 0);
        assert!(profiles.get_view("ghost").unwrap().is_none());
    }

    #[test]
    fn test_update_keeps_fields_not_provided() {
        let (_db, profiles, users) = setup();
        let user = users.create("hana", "hash", "Hana").unwrap();

        profiles
            .update(
                &user.id,
                &UpdateProfileRequest {
                    bio: Some("Slow travel".to_string()),
                    age_group: Some("30s".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        let updated = profiles
            .update(
                &user.id,
                &UpdateProfileRequest {
                    bio: Some("  ".to_string()),
                    avatar_url: Some("/uploads/me.png".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.display_name.as_deref(), Some("Hana"));
        assert_eq!(updated.bio.as_deref(), Some("Slow travel"));
        assert_eq!(updated.avatar_url.as_deref(), Some("/uploads/me.png"));
        assert_eq!(updated.age_group, Some(AgeGroup::Thirties));
    }

    #[test]
    fn test_update_creates_missing_profile() {
        let (db, profiles, users) = setup();
        let user = users.create("hana", "hash", "Hana").unwrap();
        {
            let conn = db.connection().unwrap();
            conn.execute("DELETE FROM profiles", []).unwrap();
        }

        let profile = profiles
            .update(
                &user.id,
                &UpdateProfileRequest {
                    display_name: Some("H".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(profile.display_name.as_deref(), Some("H"));
    }
}
