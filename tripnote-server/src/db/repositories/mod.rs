mod rows;
mod user_repository;
mod profile_repository;
mod post_repository;
mod tag_repository;
mod engagement_repository;
mod follow_repository;
mod recommendation_repository;

pub use rows::{is_unique_violation, now_timestamp};
pub use user_repository::{ensure_profile_on, StoredUser, UserRepository};
pub use profile_repository::ProfileRepository;
pub use post_repository::{PostMeta, PostRepository, POST_COLUMNS};
pub use tag_repository::TagRepository;
pub use engagement_repository::{EngagementRepository, MimicOutcome};
pub use follow_repository::FollowRepository;
pub use recommendation_repository::RecommendationRepository;
