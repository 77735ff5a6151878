// Service exports
pub mod cache;
pub mod finder;
pub mod postgres;
pub mod store;
pub mod supabase;

pub use cache::{CacheManager, CacheKey, CacheError, CachedProfileStore};
pub use finder::MatchFinder;
pub use postgres::{PostgresClient, PostgresError};
pub use store::{InMemoryProfileStore, MatchLedger, ProfileStore, StoreError};
pub use supabase::{SupabaseClient, SupabaseError};
