//! Storage crate: persistence for users, registered channels and scheduled posts.
//!
//! ## Modules
//!
//! - [`error`] – Storage error types
//! - [`models`] – UserRecord, ChannelRecord, ScheduledEntry
//! - [`repository`] – UserStore, ChannelRegistry, ScheduleStore traits
//! - [`user_repo`], [`channel_repo`], [`schedule_repo`] – SQLite implementations
//! - [`sqlite_pool`] – SqlitePoolManager

mod channel_repo;
mod error;
mod models;
mod repository;
mod schedule_repo;
mod sqlite_pool;
mod user_repo;

pub use channel_repo::ChannelRepository;
pub use error::StorageError;
pub use models::{ChannelRecord, NewScheduledEntry, ScheduledEntry, UserRecord, UserUpdate};
pub use repository::{ChannelRegistry, ScheduleStore, UserStore};
pub use schedule_repo::ScheduleRepository;
pub use sqlite_pool::SqlitePoolManager;
pub use user_repo::UserRepository;
