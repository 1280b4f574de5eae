use thiserror::Error;

use crate::draft::DraftError;

#[derive(Error, Debug)]
pub enum PostbotError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Bot error: {0}")]
    Bot(String),

    #[error("Handler error: {0}")]
    Handler(#[from] HandlerError),

    #[error("Draft error: {0}")]
    Draft(#[from] DraftError),
}

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("State changed concurrently for user {user_id} (expected {expected})")]
    StateConflict { user_id: i64, expected: String },
}

pub type Result<T> = std::result::Result<T, PostbotError>;
