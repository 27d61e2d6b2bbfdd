use anyhow::{Context, Result};
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

use tripnote_types::{
    Author, Comment, CreatePostRequest, Like, Post, PostImage, RoutePoint, Tag, TransportMode,
    TripData,
};

use super::profile_repository::load_profile;
use super::rows::{datetime_at, now_timestamp, opt_datetime_at, timestamp, uuid_at};
use super::tag_repository::find_or_create_tag;
use crate::db::DbPool;
use crate::feed::FeedQuery;

/// Column list shared by every post listing; see `map_post_row`
pub const POST_COLUMNS: &str = "p.id, p.author_id, u.username, u.display_name, p.content, \
     p.location_name, p.latitude, p.longitude, p.start_location, p.end_location, \
     p.transport_mode, p.route_summary, p.route_distance, p.route_duration, p.created_at";

/// Ownership and visibility of a post, for authorization checks
#[derive(Debug, Clone, Copy)]
pub struct PostMeta {
    pub author_id: Uuid,
    pub is_deleted: bool,
}

pub struct PostRepository {
    pool: DbPool,
}

/// Map a row selected with `POST_COLUMNS`; children are filled by `hydrate`
fn map_post_row(row: &Row<'_>) -> rusqlite::Result<Post> {
    let author_id = uuid_at(row, 1)?;
    Ok(Post {
        id: uuid_at(row, 0)?,
        author_id,
        author: Author {
            id: author_id,
            username: row.get(2)?,
            display_name: row.get(3)?,
            profile: None,
        },
        content: row.get(4)?,
        location_name: row.get(5)?,
        latitude: row.get(6)?,
        longitude: row.get(7)?,
        start_location: row.get(8)?,
        end_location: row.get(9)?,
        transport_mode: row.get(10)?,
        route_summary: row.get(11)?,
        route_distance: row.get(12)?,
        route_duration: row.get(13)?,
        created_at: datetime_at(row, 14)?,
        images: Vec::new(),
        route_points: Vec::new(),
        trip_data: None,
        tags: Vec::new(),
        likes: Vec::new(),
        comments: None,
    })
}

fn load_images(conn: &Connection, post_id: &Uuid) -> rusqlite::Result<Vec<PostImage>> {
    let mut stmt = conn.prepare(
        "SELECT id, post_id, image_url, sort_order, description
         FROM post_images WHERE post_id = ?
         ORDER BY sort_order ASC, id ASC",
    )?;
    let images = stmt
        .query_map([post_id.to_string()], |row| {
            Ok(PostImage {
                id: row.get(0)?,
                post_id: uuid_at(row, 1)?,
                image_url: row.get(2)?,
                sort_order: row.get(3)?,
                description: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(images)
}

fn load_route_points(conn: &Connection, post_id: &Uuid) -> rusqlite::Result<Vec<RoutePoint>> {
    let mut stmt = conn.prepare(
        "SELECT id, post_id, order_index, lat, lon, location_name, description, arrival_time, transport_to_next
         FROM route_points WHERE post_id = ?
         ORDER BY order_index ASC",
    )?;
    let points = stmt
        .query_map([post_id.to_string()], |row| {
            let transport: String = row.get(8)?;
            Ok(RoutePoint {
                id: row.get(0)?,
                post_id: uuid_at(row, 1)?,
                order_index: row.get(2)?,
                lat: row.get(3)?,
                lon: row.get(4)?,
                location_name: row.get(5)?,
                description: row.get(6)?,
                arrival_time: opt_datetime_at(row, 7)?,
                transport_to_next: TransportMode::parse(&transport).unwrap_or_default(),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(points)
}

fn decode_list(raw: Option<String>) -> Vec<String> {
    raw.and_then(|text| serde_json::from_str(&text).ok())
        .unwrap_or_default()
}

fn load_trip_data(conn: &Connection, post_id: &Uuid) -> rusqlite::Result<Option<TripData>> {
    conn.query_row(
        "SELECT id, post_id, total_budget, budget_food, budget_accommodation, budget_transport,
                accommodation_names, transport_methods
         FROM trip_data WHERE post_id = ?",
        [post_id.to_string()],
        |row| {
            Ok(TripData {
                id: row.get(0)?,
                post_id: uuid_at(row, 1)?,
                total_budget: row.get(2)?,
                budget_food: row.get(3)?,
                budget_accommodation: row.get(4)?,
                budget_transport: row.get(5)?,
                accommodation_names: decode_list(row.get(6)?),
                transport_methods: decode_list(row.get(7)?),
            })
        },
    )
    .optional()
}

fn load_tags(conn: &Connection, post_id: &Uuid) -> rusqlite::Result<Vec<Tag>> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.name FROM tags t
         JOIN post_tags pt ON pt.tag_id = t.id
         WHERE pt.post_id = ?
         ORDER BY t.id",
    )?;
    let tags = stmt
        .query_map([post_id.to_string()], |row| {
            Ok(Tag {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tags)
}

fn load_likes(conn: &Connection, post_id: &Uuid) -> rusqlite::Result<Vec<Like>> {
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

pub(crate) fn load_comments(conn: &Connection, post_id: &Uuid) -> rusqlite::Result<Vec<Comment>> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.post_id, c.user_id, u.username, c.content, c.created_at
         FROM comments c
         JOIN users u ON u.id = c.user_id
         WHERE c.post_id = ?
         ORDER BY c.created_at ASC, c.id ASC",
    )?;
    let comments = stmt
        .query_map([post_id.to_string()], |row| {
            Ok(Comment {
                id: row.get(0)?,
                post_id: uuid_at(row, 1)?,
                user_id: uuid_at(row, 2)?,
                username: row.get(3)?,
                content: row.get(4)?,
                created_at: datetime_at(row, 5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(comments)
}

/// Attach author profile and every child collection to a bare post
fn hydrate(conn: &Connection, mut post: Post) -> rusqlite::Result<Post> {
    post.author.profile = load_profile(conn, &post.author_id)?;
    post.images = load_images(conn, &post.id)?;
    post.route_points = load_route_points(conn, &post.id)?;
    post.trip_data = load_trip_data(conn, &post.id)?;
    post.tags = load_tags(conn, &post.id)?;
    post.likes = load_likes(conn, &post.id)?;
    Ok(post)
}

/// Load a visible post with its children, or None when missing or soft-deleted
pub(crate) fn load_visible_post(conn: &Connection, post_id: &Uuid) -> rusqlite::Result<Option<Post>> {
    let post = conn
        .query_row(
            &format!(
                "SELECT {POST_COLUMNS} FROM posts p
                 JOIN users u ON u.id = p.author_id
                 WHERE p.id = ? AND p.is_deleted = 0"
            ),
            [post_id.to_string()],
            map_post_row,
        )
        .optional()?;
    post.map(|p| hydrate(conn, p)).transpose()
}

/// True when the post exists and has not been soft-deleted
pub(crate) fn is_visible(conn: &Connection, post_id: &Uuid) -> rusqlite::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM posts WHERE id = ? AND is_deleted = 0",
        [post_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

impl PostRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a post and all of its children atomically.
    ///
    /// Any failing insert drops the transaction, which rolls everything back.
    /// The returned post is re-read after commit.
    pub fn create_with_children(
        &self,
        author_id: &Uuid,
        content: &str,
        req: &CreatePostRequest,
    ) -> Result<Post> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        let post_id = Uuid::new_v4();
        let post_key = post_id.to_string();

        tx.execute(
            "INSERT INTO posts (id, author_id, content, location_name, latitude, longitude,
                                start_location, end_location, transport_mode, route_summary,
                                route_distance, route_duration, is_deleted, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?)",
            (
                &post_key,
                author_id.to_string(),
                content,
                &req.location_name,
                req.latitude,
                req.longitude,
                &req.start_location,
                &req.end_location,
                &req.transport_mode,
                &req.route_summary,
                &req.route_distance,
                &req.route_duration,
                now_timestamp(),
            ),
        )
        .context("Failed to create post")?;

        for (index, image) in req.images.iter().enumerate() {
            let sort_order = image.sort_order.unwrap_or(index as i32);
            tx.execute(
                "INSERT INTO post_images (post_id, image_url, sort_order, description)
                 VALUES (?, ?, ?, ?)",
                (&post_key, &image.url, sort_order, &image.description),
            )
            .context("Failed to insert post image")?;
        }

        for (index, point) in req.route_points.iter().enumerate() {
            let transport = point.transport_to_next.unwrap_or_default();
            tx.execute(
                "INSERT INTO route_points (post_id, order_index, lat, lon, location_name,
                                           description, arrival_time, transport_to_next)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                (
                    &post_key,
                    index as i64,
                    point.lat,
                    point.lon,
                    &point.name,
                    &point.description,
                    point.arrival_time.map(timestamp),
                    transport.as_str(),
                ),
            )
            .context("Failed to insert route point")?;
        }

        if let Some(trip) = &req.trip_data {
            let accommodation = serde_json::to_string(trip.accommodation_names.as_slice())?;
            let transport = serde_json::to_string(trip.transport_methods.as_slice())?;
            tx.execute(
                "INSERT INTO trip_data (post_id, total_budget, budget_food, budget_accommodation,
                                        budget_transport, accommodation_names, transport_methods)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
                (
                    &post_key,
                    trip.total_budget,
                    trip.budget_food,
                    trip.budget_accommodation,
                    trip.budget_transport,
                    accommodation,
                    transport,
                ),
            )
            .context("Failed to insert trip data")?;
        }

        for name in &req.tags {
            let tag_id = find_or_create_tag(&tx, name).context("Failed to find or create tag")?;
            tx.execute(
                "INSERT OR IGNORE INTO post_tags (post_id, tag_id) VALUES (?, ?)",
                (&post_key, tag_id),
            )
            .context("Failed to link tag")?;
        }

        tx.commit().context("Failed to commit post")?;
        tracing::debug!(post_id = %post_id, "created post aggregate");

        load_visible_post(&conn, &post_id)?.context("Created post could not be re-read")
    }

    /// Single post with comments, None when missing or soft-deleted
    pub fn get_visible(&self, post_id: &Uuid) -> Result<Option<Post>> {
        let conn = self.pool.get()?;
        let Some(mut post) = load_visible_post(&conn, post_id)? else {
            return Ok(None);
        };
        post.comments = Some(load_comments(&conn, post_id)?);
        Ok(Some(post))
    }

    /// Run a composed feed query and hydrate every post it returns
    pub fn list_feed(&self, query: &FeedQuery) -> Result<Vec<Post>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&query.sql).context("Failed to prepare feed query")?;
        let posts = stmt
            .query_map(params_from_iter(query.params.iter()), map_post_row)?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);

        posts
            .into_iter()
            .map(|post| hydrate(&conn, post).map_err(Into::into))
            .collect()
    }

    /// Non-deleted posts by one author, newest first
    pub fn list_by_author(&self, author_id: &Uuid) -> Result<Vec<Post>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {POST_COLUMNS} FROM posts p
             JOIN users u ON u.id = p.author_id
             WHERE p.author_id = ? AND p.is_deleted = 0
             ORDER BY p.created_at DESC, p.rowid DESC"
        ))?;
        let posts = stmt
            .query_map([author_id.to_string()], map_post_row)?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);

        posts
            .into_iter()
            .map(|post| hydrate(&conn, post).map_err(Into::into))
            .collect()
    }

    pub fn get_meta(&self, post_id: &Uuid) -> Result<Option<PostMeta>> {
        let conn = self.pool.get()?;
        let meta = conn
            .query_row(
                "SELECT author_id, is_deleted FROM posts WHERE id = ?",
                [post_id.to_string()],
                |row| {
                    Ok(PostMeta {
                        author_id: uuid_at(row, 0)?,
                        is_deleted: row.get::<_, i64>(1)? == 1,
                    })
                },
            )
            .optional()?;
        Ok(meta)
    }

    /// Hide a post from every listing. Returns false if it was already hidden.
    pub fn soft_delete(&self, post_id: &Uuid) -> Result<bool> {
        let conn = self.pool.get()?;
        let changed = conn
            .execute(
                "UPDATE posts SET is_deleted = 1 WHERE id = ? AND is_deleted = 0",
                [post_id.to_string()],
            )
            .context("Failed to soft delete post")?;
        Ok(changed == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::UserRepository;
    use crate::db::Database;
    use crate::feed::{compose, FeedFilter};
    use serde_json::json;

    fn setup() -> (Database, PostRepository, Uuid) {
        let db = Database::in_memory().expect("Failed to create database");
        db.initialize().expect("Failed to initialize schema");
        let user = UserRepository::new(db.pool.clone())
            .create("hana", "hash", "Hana")
            .unwrap();
        (db.clone(), PostRepository::new(db.pool.clone()), user.id)
    }

    fn request(value: serde_json::Value) -> CreatePostRequest {
        serde_json::from_value(value).unwrap()
    }

    fn count(db: &Database, table: &str) -> i64 {
        let conn = db.connection().unwrap();
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_create_with_children_orders_and_normalizes() {
        let (_db, repo, author) = setup();
        let req = request(json!({
            "content": "Kyoto loop",
            "images": [
                {"url": "/uploads/c.jpg", "sortOrder": 9},
                {"url": "/uploads/a.jpg"},
                {"url": "/uploads/b.jpg", "caption": "gate"}
            ],
            "routePoints": [
                {"lat": 34.96, "lng": 135.77, "name": "Fushimi Inari", "transportToNext": "train"},
                {"lat": 35.01, "lon": 135.67, "name": "Arashiyama"}
            ],
            "tripData": {"totalBudget": 40000, "accommodationNames": "Ryokan, ,Hostel", "transportMethods": 7},
            "tags": ["Kyoto"]
        }));

        let post = repo.create_with_children(&author, "Kyoto loop", &req).unwrap();

        let urls: Vec<_> = post.images.iter().map(|i| i.image_url.as_str()).collect();
        assert_eq!(urls, ["/uploads/a.jpg", "/uploads/b.jpg", "/uploads/c.jpg"]);
        assert_eq!(post.images[1].description.as_deref(), Some("gate"));

        assert_eq!(post.route_points.len(), 2);
        assert_eq!(post.route_points[0].order_index, 0);
        assert_eq!(post.route_points[0].transport_to_next, TransportMode::Train);
        assert_eq!(post.route_points[1].order_index, 1);
        assert_eq!(post.route_points[1].transport_to_next, TransportMode::Walk);

        let trip = post.trip_data.unwrap();
        assert_eq!(trip.accommodation_names, ["Ryokan", "Hostel"]);
        assert_eq!(trip.transport_methods, ["7"]);
        assert_eq!(trip.total_budget, Some(40000));

        assert_eq!(post.tags.len(), 1);
        assert_eq!(post.author.username, "hana");
        assert!(post.author.profile.is_some());
        assert!(post.comments.is_none());
    }

    #[test]
    fn test_failed_child_insert_rolls_back_everything() {
        let (db, repo, author) = setup();
        let req = request(json!({
            "content": "broken",
            "images": [{"url": "/uploads/a.jpg"}],
            "tripData": {"totalBudget": 1},
            "tags": ["Rollback"],
            "routePoints": [
                {"lat": 10.0, "lon": 10.0},
                {"lat": 95.0, "lon": 10.0}
            ]
        }));

        assert!(repo.create_with_children(&author, "broken", &req).is_err());

        for table in ["posts", "post_images", "route_points", "trip_data", "tags", "post_tags"] {
            assert_eq!(count(&db, table), 0, "{table} should be empty after rollback");
        }
    }

    #[test]
    fn test_case_sensitive_tags_and_reuse() {
        let (db, repo, author) = setup();
        repo.create_with_children(&author, "one", &request(json!({"tags": ["Kyoto", "kyoto", "Kyoto"]})))
            .unwrap();
        repo.create_with_children(&author, "two", &request(json!({"tags": ["Kyoto"]})))
            .unwrap();

        assert_eq!(count(&db, "tags"), 2);
        let kyoto_links: i64 = {
            let conn = db.connection().unwrap();
            conn.query_row(
                "SELECT COUNT(*) FROM post_tags pt JOIN tags t ON t.id = pt.tag_id WHERE t.name = 'Kyoto'",
                [],
                |row| row.get(0),
            )
            .unwrap()
        };
        assert_eq!(kyoto_links, 2);
        assert_eq!(count(&db, "post_tags"), 3);
    }

    #[test]
    fn test_soft_delete_hides_post() {
        let (_db, repo, author) = setup();
        let post = repo
            .create_with_children(&author, "gone soon", &CreatePostRequest::default())
            .unwrap();

        assert!(repo.soft_delete(&post.id).unwrap());
        assert!(!repo.soft_delete(&post.id).unwrap());
        assert!(repo.get_visible(&post.id).unwrap().is_none());
        assert!(repo.get_meta(&post.id).unwrap().unwrap().is_deleted);

        let feed = compose(&FeedFilter::default(), None).unwrap();
        assert!(repo.list_feed(&feed).unwrap().is_empty());
    }

    #[test]
    fn test_feed_ties_break_by_insertion_order() {
        let (db, repo, author) = setup();
        let first = repo.create_with_children(&author, "first", &CreatePostRequest::default()).unwrap();
        let second = repo.create_with_children(&author, "second", &CreatePostRequest::default()).unwrap();
        {
            let conn = db.connection().unwrap();
            conn.execute("UPDATE posts SET created_at = '2024-01-01T00:00:00.000000Z'", [])
                .unwrap();
        }

        let feed = compose(&FeedFilter::default(), None).unwrap();
        let ids: Vec<_> = repo.list_feed(&feed).unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, [second.id, first.id]);
    }

    #[test]
    fn test_feed_search_is_case_insensitive_and_literal() {
        let (_db, repo, author) = setup();
        repo.create_with_children(&author, "Hiking in KYOTO", &CreatePostRequest::default())
            .unwrap();
        repo.create_with_children(
            &author,
            "Beach day",
            &request(json!({"locationName": "Okinawa 100% sun"})),
        )
        .unwrap();

        let search = |term: &str| {
            let filter = FeedFilter {
                search: Some(term.to_string()),
                ..FeedFilter::default()
            };
            repo.list_feed(&compose(&filter, None).unwrap()).unwrap()
        };

        assert_eq!(search("kyoto").len(), 1);
        assert_eq!(search("okinawa").len(), 1);
        assert_eq!(search("100%").len(), 1);
        assert_eq!(search("0%s").len(), 0);
    }

    #[test]
    fn test_feed_search_folds_non_ascii_case() {
        let (_db, repo, author) = setup();
        repo.create_with_children(&author, "Café in ÉTRETAT", &CreatePostRequest::default())
            .unwrap();
        repo.create_with_children(
            &author,
            "Morning walk",
            &request(json!({"locationName": "Ｋｙｏｔｏ Station"})),
        )
        .unwrap();

        let search = |term: &str| {
            let filter = FeedFilter {
                search: Some(term.to_string()),
                ..FeedFilter::default()
            };
            repo.list_feed(&compose(&filter, None).unwrap()).unwrap()
        };

        assert_eq!(search("étretat").len(), 1);
        assert_eq!(search("CAFÉ").len(), 1);
        assert_eq!(search("ｋｙｏｔｏ").len(), 1);
    }
}
