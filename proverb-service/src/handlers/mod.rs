pub mod health;
pub mod proverbs;

pub use health::{health_check, metrics_endpoint, readiness_check};
pub use proverbs::{create_proverb, delete_proverb, list_proverbs, update_proverb};
