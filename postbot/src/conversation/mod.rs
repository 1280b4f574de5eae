//! Per-user conversation state machine driving post authoring, channel registration and the
//! management views.

mod engine;
mod locks;
pub mod prompts;

pub use engine::ConversationEngine;
pub use locks::UserLocks;
