//! Persistence models.

mod channel_record;
mod scheduled_entry;
mod user_record;

pub use channel_record::ChannelRecord;
pub use scheduled_entry::{NewScheduledEntry, ScheduledEntry, ScheduledEntryRow};
pub use user_record::{UserRecord, UserUpdate};
