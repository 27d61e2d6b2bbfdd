use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{AgeGroup, TransportMode};
use crate::string_list::StringList;

// Custom serde module for DateTime to ensure RFC3339 string format
mod datetime_format {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = date.to_rfc3339_opts(SecondsFormat::Millis, true);
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<DateTime<Utc>>().map_err(serde::de::Error::custom)
    }
}

/// Public view of an account. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: Uuid,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub banner_url: Option<String>,
    pub age_group: Option<AgeGroup>,
    #[serde(with = "datetime_format")]
    pub updated_at: DateTime<Utc>,
}

/// Post author as embedded in feed entries
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub profile: Option<Profile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostImage {
    pub id: i64,
    pub post_id: Uuid,
    pub image_url: String,
    pub sort_order: i32,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePoint {
    pub id: i64,
    pub post_id: Uuid,
    pub order_index: i32,
    pub lat: f64,
    pub lon: f64,
    pub location_name: Option<String>,
    pub description: Option<String>,
    pub arrival_time: Option<DateTime<Utc>>,
    pub transport_to_next: TransportMode,
}

/// Budget and logistics attached 1:1 to a post
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripData {
    pub id: i64,
    pub post_id: Uuid,
    pub total_budget: Option<i64>,
    pub budget_food: Option<i64>,
    pub budget_accommodation: Option<i64>,
    pub budget_transport: Option<i64>,
    pub accommodation_names: Vec<String>,
    pub transport_methods: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub user_id: Uuid,
    pub post_id: Uuid,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub content: String,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
}

/// A bookmarked ("I want to copy this trip") post
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mimic {
    pub id: i64,
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub notes: Option<String>,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
    /// Filled in when listing; absent once the post is soft-deleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Box<Post>>,
}

/// A fully expanded post as returned by the feed and detail endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub author: Author,
    pub content: String,
    pub location_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub start_location: Option<String>,
    pub end_location: Option<String>,
    pub transport_mode: Option<String>,
    pub route_summary: Option<String>,
    pub route_distance: Option<String>,
    pub route_duration: Option<String>,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
    pub images: Vec<PostImage>,
    pub route_points: Vec<RoutePoint>,
    pub trip_data: Option<TripData>,
    pub tags: Vec<Tag>,
    pub likes: Vec<Like>,
    /// Only loaded for the single-post view
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<Comment>>,
}

/// Combined user + profile view served at /api/profiles/:username
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub user_id: Uuid,
    pub username: String,
    pub display_name: String,
    pub bio: String,
    pub avatar_url: Option<String>,
    pub banner_url: Option<String>,
    pub age_group: Option<AgeGroup>,
    pub follower_count: usize,
    pub following_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub user_id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetail {
    pub user: User,
    pub profile: Option<Profile>,
    pub post_count: usize,
    pub followers: Vec<UserSummary>,
    pub following: Vec<UserSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecommendation {
    pub location_name: String,
    pub post_count: i64,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagCount {
    pub id: i64,
    pub name: String,
    pub post_count: i64,
}

/// Simplified place entry derived from a Yahoo local search feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceSuggestion {
    pub name: String,
    pub address: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

// Request/Response types for API
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub id: Uuid,
    pub username: String,
    pub access_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInput {
    pub url: String,
    #[serde(default, alias = "caption")]
    pub description: Option<String>,
    #[serde(default)]
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePointInput {
    pub lat: f64,
    #[serde(alias = "lng")]
    pub lon: f64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub arrival_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub transport_to_next: Option<TransportMode>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripDataInput {
    #[serde(default)]
    pub total_budget: Option<i64>,
    #[serde(default)]
    pub budget_food: Option<i64>,
    #[serde(default)]
    pub budget_accommodation: Option<i64>,
    #[serde(default)]
    pub budget_transport: Option<i64>,
    #[serde(default)]
    pub accommodation_names: StringList,
    #[serde(default)]
    pub transport_methods: StringList,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub images: Vec<ImageInput>,
    #[serde(default)]
    pub route_points: Vec<RoutePointInput>,
    #[serde(default)]
    pub trip_data: Option<TripDataInput>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub start_location: Option<String>,
    #[serde(default)]
    pub end_location: Option<String>,
    #[serde(default)]
    pub transport_mode: Option<String>,
    #[serde(default)]
    pub route_summary: Option<String>,
    #[serde(default)]
    pub route_distance: Option<String>,
    #[serde(default)]
    pub route_duration: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MimicRequest {
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub banner_url: Option<String>,
    #[serde(default)]
    pub age_group: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub image_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}
