//! Logs each event in before() and the response in after(); always continues.

use async_trait::async_trait;
use postbot_core::{Event, EventKind, Handler, HandlerResponse, Result};
use tracing::{debug, info, instrument};

pub struct LoggingHandler;

#[async_trait]
impl Handler for LoggingHandler {
    #[instrument(skip(self, event))]
    async fn before(&self, event: &Event) -> Result<bool> {
        let user_id = event.user.as_ref().map(|u| u.id);
        let username = event
            .user
            .as_ref()
            .and_then(|u| u.username.as_deref())
            .unwrap_or("unknown");
        match &event.kind {
            EventKind::Text(text) => info!(
                user_id = ?user_id,
                username = %username,
                message_content = %text,
                "Received message"
            ),
            EventKind::Action { action, .. } => info!(
                user_id = ?user_id,
                username = %username,
                action = ?action,
                "Received action"
            ),
            other => info!(
                user_id = ?user_id,
                username = %username,
                kind = other.name(),
                "Received event"
            ),
        }
        Ok(true)
    }

    #[instrument(skip(self, event, response))]
    async fn after(&self, event: &Event, response: &HandlerResponse) -> Result<()> {
        debug!(
            event_id = %event.id,
            response = ?response,
            "Processed event"
        );
        Ok(())
    }
}
