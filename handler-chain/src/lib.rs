//! # Handler chain
//!
//! Runs a sequence of handlers for each inbound event: every handler's `before` in order (any may
//! stop the chain), then `handle` until one returns Stop or Reply, then every `after` in reverse.

use postbot_core::{Event, Handler, HandlerResponse, Result};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Ordered handlers applied to every event.
#[derive(Clone, Default)]
pub struct HandlerChain {
    handlers: Vec<Arc<dyn Handler>>,
}

impl HandlerChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Appends a handler (before/handle run in insertion order, after in reverse).
    pub fn add_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Runs before, handle and after phases. Returns the first Stop or Reply, or Continue.
    #[instrument(skip(self, event), fields(event_id = %event.id, kind = event.kind.name()))]
    pub async fn handle(&self, event: &Event) -> Result<HandlerResponse> {
        let user_id = event.user.as_ref().map(|u| u.id);

        debug!(user_id = ?user_id, chat_id = event.chat.id, "step: handler_chain started");

        for handler in &self.handlers {
            let handler_name = std::any::type_name_of_val(handler.as_ref());
            if !handler.before(event).await? {
                info!(
                    user_id = ?user_id,
                    handler = %handler_name,
                    "step: handler before returned false, chain stopped"
                );
                return Ok(HandlerResponse::Stop);
            }
        }

        let mut final_response = HandlerResponse::Continue;
        for handler in &self.handlers {
            let handler_name = std::any::type_name_of_val(handler.as_ref());
            let response = handler.handle(event).await?;
            debug!(
                handler = %handler_name,
                response = ?response,
                "Handler processed"
            );

            match response {
                HandlerResponse::Stop | HandlerResponse::Reply(_) => {
                    final_response = response;
                    break;
                }
                HandlerResponse::Continue | HandlerResponse::Ignore => continue,
            }
        }

        for handler in self.handlers.iter().rev() {
            handler.after(event, &final_response).await?;
        }

        debug!(
            user_id = ?user_id,
            chat_id = event.chat.id,
            response = ?final_response,
            "step: handler_chain finished"
        );

        Ok(final_response)
    }
}

// Tests live in tests/handler_chain_test.rs
