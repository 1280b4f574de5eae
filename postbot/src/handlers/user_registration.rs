//! Creates the user row on first contact and refreshes the stored username.
//!
//! Events without a sender (channel posts, anonymous admins) stop the chain here.

use async_trait::async_trait;
use postbot_core::{Event, Handler, PostbotError, Result};
use std::sync::Arc;
use storage::UserStore;
use tracing::{error, instrument, warn};

pub struct UserRegistrationHandler {
    users: Arc<dyn UserStore>,
}

impl UserRegistrationHandler {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl Handler for UserRegistrationHandler {
    #[instrument(skip(self, event))]
    async fn before(&self, event: &Event) -> Result<bool> {
        let Some(user) = &event.user else {
            warn!(chat_id = event.chat.id, event_id = %event.id, "Event has no sender, ignored");
            return Ok(false);
        };

        self.users
            .get_or_create(user.id, user.username.as_deref())
            .await
            .map_err(|e| {
                error!(error = %e, user_id = user.id, "Failed to register user");
                PostbotError::Database(e.to_string())
            })?;

        Ok(true)
    }
}
