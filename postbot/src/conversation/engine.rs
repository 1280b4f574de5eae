//! The conversation state machine.
//!
//! Each event is read against the sender's persisted [`ConversationState`]:
//!
//! | state | event | next |
//! |---|---|---|
//! | any | `/start` | IDLE (menu) |
//! | any | cancel | IDLE |
//! | any | select channel | WAITING_CONTENT |
//! | any | add channel | WAITING_FORWARD |
//! | WAITING_CONTENT | text / photo / video | WAITING_BUTTONS |
//! | WAITING_BUTTONS | text | WAITING_BUTTONS (preview shown) |
//! | WAITING_BUTTONS | publish now | IDLE |
//! | WAITING_BUTTONS | schedule | WAITING_SCHEDULE_TIME |
//! | WAITING_SCHEDULE_TIME | valid future time | IDLE |
//! | WAITING_FORWARD | forward from a channel the bot administers | IDLE |
//!
//! Anything else is a no-op. The draft is never cached in memory: every turn reads it from and
//! writes it to the user row, and every write is a compare-and-swap on the state the turn started
//! from.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{FixedOffset, Utc};
use postbot_core::{
    format_local, parse_button_lines, parse_schedule_time, preview_layout, send_draft,
    strip_control_rows, url_layout, Action, ButtonLayout, Command, ConversationState, Draft,
    Event, EventKind, ForwardOrigin, Handler, HandlerError, HandlerResponse, Messenger,
    PostbotError, Result, TimeParseError, UrlButton, User,
};
use storage::{
    ChannelRegistry, NewScheduledEntry, ScheduleStore, StorageError, UserRecord, UserStore,
    UserUpdate,
};
use tracing::{debug, error, info, instrument, warn};

use super::locks::UserLocks;
use super::prompts;

fn storage_error(e: StorageError) -> PostbotError {
    match e {
        StorageError::StateConflict {
            user_id, expected, ..
        } => HandlerError::StateConflict { user_id, expected }.into(),
        other => PostbotError::Database(other.to_string()),
    }
}

/// Drives post authoring for every user. Last handler of the chain.
pub struct ConversationEngine {
    users: Arc<dyn UserStore>,
    channels: Arc<dyn ChannelRegistry>,
    schedules: Arc<dyn ScheduleStore>,
    messenger: Arc<dyn Messenger>,
    offset: FixedOffset,
    locks: UserLocks,
}

/// The user row as read at the start of a turn.
struct Turn {
    user_id: i64,
    chat_id: i64,
    state: ConversationState,
    record: UserRecord,
}

impl ConversationEngine {
    /// `offset` is the zone user-typed schedule times are read in.
    pub fn new(
        users: Arc<dyn UserStore>,
        channels: Arc<dyn ChannelRegistry>,
        schedules: Arc<dyn ScheduleStore>,
        messenger: Arc<dyn Messenger>,
        offset: FixedOffset,
    ) -> Self {
        Self {
            users,
            channels,
            schedules,
            messenger,
            offset,
            locks: UserLocks::new(),
        }
    }

    async fn load_turn(&self, user: &User, chat_id: i64) -> Result<Turn> {
        let record = match self.users.find(user.id).await.map_err(storage_error)? {
            Some(record) => record,
            None => self
                .users
                .get_or_create(user.id, user.username.as_deref())
                .await
                .map_err(storage_error)?,
        };

        let state = match record.state() {
            Ok(state) => state,
            Err(e) => {
                warn!(user_id = user.id, error = %e, "Unreadable state, resetting to IDLE");
                self.users.reset(user.id).await.map_err(storage_error)?;
                ConversationState::Idle
            }
        };

        Ok(Turn {
            user_id: user.id,
            chat_id,
            state,
            record,
        })
    }

    async fn say(&self, chat_id: i64, text: &str) -> Result<()> {
        self.messenger.send_text(chat_id, text, None).await
    }

    async fn say_with(&self, chat_id: i64, text: &str, layout: &ButtonLayout) -> Result<()> {
        let buttons = Some(layout).filter(|l| !l.is_empty());
        self.messenger.send_text(chat_id, text, buttons).await
    }

    /// Compare-and-swap from the state this turn started in.
    async fn advance(&self, turn: &Turn, update: UserUpdate) -> Result<()> {
        debug!(
            user_id = turn.user_id,
            from = %turn.state,
            to = %update.state,
            "State transition"
        );
        self.users
            .transition(turn.user_id, turn.state, &update)
            .await
            .map_err(storage_error)
    }

    /// Back to IDLE with draft and channel cleared.
    async fn finish(&self, turn: &Turn) -> Result<()> {
        self.advance(turn, UserUpdate::idle()).await
    }

    /// Decodes the stored draft. A missing or unreadable draft abandons the flow.
    async fn current_draft(&self, turn: &Turn) -> Result<Option<Draft>> {
        match turn.record.draft() {
            Ok(Some(draft)) => return Ok(Some(draft)),
            Ok(None) => warn!(user_id = turn.user_id, state = %turn.state, "No stored draft"),
            Err(e) => error!(user_id = turn.user_id, error = %e, "Stored draft is unreadable"),
        }
        self.finish(turn).await?;
        self.say(turn.chat_id, prompts::DRAFT_LOST).await?;
        Ok(None)
    }

    // --- commands and menus ---

    async fn start(&self, turn: &Turn) -> Result<()> {
        self.users.reset(turn.user_id).await.map_err(storage_error)?;
        self.say_with(turn.chat_id, prompts::WELCOME, &prompts::main_menu())
            .await
    }

    async fn cancel(&self, turn: &Turn) -> Result<()> {
        self.users.reset(turn.user_id).await.map_err(storage_error)?;
        info!(user_id = turn.user_id, from = %turn.state, "Flow cancelled");
        self.say_with(turn.chat_id, prompts::CANCELLED, &prompts::main_menu())
            .await
    }

    async fn show_channel_picker(&self, turn: &Turn) -> Result<()> {
        let channels = self
            .channels
            .list_by_owner(turn.user_id)
            .await
            .map_err(storage_error)?;
        if channels.is_empty() {
            return self
                .say_with(turn.chat_id, prompts::NO_CHANNELS, &prompts::add_channel_menu())
                .await;
        }
        self.say_with(
            turn.chat_id,
            prompts::CHOOSE_CHANNEL,
            &prompts::channel_picker(&channels),
        )
        .await
    }

    async fn show_channels(&self, turn: &Turn) -> Result<()> {
        let channels = self
            .channels
            .list_by_owner(turn.user_id)
            .await
            .map_err(storage_error)?;
        let (text, layout) = prompts::channels_view(&channels);
        self.say_with(turn.chat_id, &text, &layout).await
    }

    async fn show_schedules(&self, turn: &Turn) -> Result<()> {
        let entries = self
            .schedules
            .list_by_submitter(turn.user_id)
            .await
            .map_err(storage_error)?;
        let (text, layout) = prompts::schedules_view(&entries, &self.offset);
        self.say_with(turn.chat_id, &text, &layout).await
    }

    // --- authoring ---

    async fn select_channel(&self, turn: &Turn, channel_id: i64) -> Result<()> {
        let channel = self
            .channels
            .find_by_id(channel_id)
            .await
            .map_err(storage_error)?
            .filter(|c| c.added_by_id == turn.user_id);
        let Some(channel) = channel else {
            warn!(user_id = turn.user_id, channel_id, "Selected channel not owned by user");
            return self.say(turn.chat_id, prompts::CHANNEL_NOT_FOUND).await;
        };

        self.advance(
            turn,
            UserUpdate::new(
                ConversationState::WaitingContent,
                String::new(),
                Some(channel.id),
            ),
        )
        .await?;
        info!(user_id = turn.user_id, channel_id = channel.id, "Post started");
        self.say(turn.chat_id, prompts::SEND_CONTENT).await
    }

    async fn receive_content(&self, turn: &Turn, draft: Draft) -> Result<()> {
        let encoded = draft.encode()?;
        self.advance(
            turn,
            UserUpdate::new(
                ConversationState::WaitingButtons,
                encoded,
                turn.record.selected_channel_id,
            ),
        )
        .await?;
        info!(user_id = turn.user_id, kind = draft.kind().as_str(), "Draft content received");
        self.say(turn.chat_id, prompts::SEND_BUTTONS).await
    }

    /// Stores the parsed buttons on the draft and shows the preview with its control rows.
    async fn receive_buttons(&self, turn: &Turn, text: &str) -> Result<()> {
        let Some(draft) = self.current_draft(turn).await? else {
            return Ok(());
        };
        let rows = parse_button_lines(text);
        let draft = draft.with_buttons(rows);

        self.advance(
            turn,
            UserUpdate::new(
                ConversationState::WaitingButtons,
                draft.encode()?,
                turn.record.selected_channel_id,
            ),
        )
        .await?;

        debug!(
            user_id = turn.user_id,
            rows = draft.button_rows().len(),
            "Buttons set, sending preview"
        );
        let layout = preview_layout(draft.button_rows());
        send_draft(self.messenger.as_ref(), turn.chat_id, &draft, Some(&layout)).await
    }

    /// Draft ready for publish/schedule: content present and buttons explicitly set.
    /// Buttons come from the layout the user is looking at when available.
    async fn finalized_draft(
        &self,
        turn: &Turn,
        displayed: Option<&ButtonLayout>,
    ) -> Result<Option<Draft>> {
        if turn.state != ConversationState::WaitingButtons {
            self.say(turn.chat_id, prompts::NOTHING_TO_PUBLISH).await?;
            return Ok(None);
        }
        let Some(draft) = self.current_draft(turn).await? else {
            return Ok(None);
        };
        if draft.buttons.is_none() {
            self.say(turn.chat_id, prompts::BUTTONS_FIRST).await?;
            return Ok(None);
        }

        let rows: Vec<Vec<UrlButton>> = match displayed {
            Some(layout) => strip_control_rows(layout),
            None => draft.button_rows().to_vec(),
        };
        Ok(Some(draft.with_buttons(rows)))
    }

    async fn publish_now(&self, turn: &Turn, displayed: Option<&ButtonLayout>) -> Result<()> {
        let Some(draft) = self.finalized_draft(turn, displayed).await? else {
            return Ok(());
        };
        let channel = match turn.record.selected_channel_id {
            Some(id) => self.channels.find_by_id(id).await.map_err(storage_error)?,
            None => None,
        };
        let Some(channel) = channel else {
            self.finish(turn).await?;
            return self.say(turn.chat_id, prompts::SELECTED_CHANNEL_GONE).await;
        };

        let layout = url_layout(draft.button_rows());
        let sent = send_draft(
            self.messenger.as_ref(),
            channel.telegram_id,
            &draft,
            Some(&layout),
        )
        .await;

        self.finish(turn).await?;
        match sent {
            Ok(()) => {
                info!(
                    user_id = turn.user_id,
                    channel_id = channel.telegram_id,
                    "Post published"
                );
                self.say(turn.chat_id, prompts::PUBLISHED).await
            }
            Err(e) => {
                error!(
                    user_id = turn.user_id,
                    channel_id = channel.telegram_id,
                    error = %e,
                    "Immediate publish failed"
                );
                self.say(turn.chat_id, &prompts::publish_failed(&e.to_string()))
                    .await
            }
        }
    }

    async fn request_schedule_time(
        &self,
        turn: &Turn,
        displayed: Option<&ButtonLayout>,
    ) -> Result<()> {
        let Some(draft) = self.finalized_draft(turn, displayed).await? else {
            return Ok(());
        };
        self.advance(
            turn,
            UserUpdate::new(
                ConversationState::WaitingScheduleTime,
                draft.encode()?,
                turn.record.selected_channel_id,
            ),
        )
        .await?;
        self.say(
            turn.chat_id,
            &prompts::ask_schedule_time(&self.offset.to_string()),
        )
        .await
    }

    /// Parses the time; on success stores the entry first and only then leaves the state.
    async fn receive_schedule_time(&self, turn: &Turn, text: &str) -> Result<()> {
        let post_at = match parse_schedule_time(text, &self.offset, Utc::now()) {
            Ok(at) => at,
            Err(TimeParseError::Format(input)) => {
                debug!(user_id = turn.user_id, input = %input, "Unreadable schedule time");
                return self
                    .say(
                        turn.chat_id,
                        &prompts::bad_time_format(&self.offset.to_string()),
                    )
                    .await;
            }
            Err(TimeParseError::NotInFuture { requested }) => {
                debug!(user_id = turn.user_id, %requested, "Schedule time not in future");
                return self.say(turn.chat_id, prompts::TIME_NOT_IN_FUTURE).await;
            }
        };

        let Some(draft) = self.current_draft(turn).await? else {
            return Ok(());
        };
        let channel = match turn.record.selected_channel_id {
            Some(id) => self.channels.find_by_id(id).await.map_err(storage_error)?,
            None => None,
        };
        let Some(channel) = channel else {
            self.finish(turn).await?;
            return self.say(turn.chat_id, prompts::SELECTED_CHANNEL_GONE).await;
        };

        let entry = self
            .schedules
            .create(&NewScheduledEntry {
                channel_id: channel.telegram_id,
                data: draft.encode()?,
                post_at,
                submitted_by: turn.user_id,
            })
            .await
            .map_err(storage_error)?;
        self.finish(turn).await?;

        let local = format_local(post_at, &self.offset);
        info!(
            user_id = turn.user_id,
            entry_id = entry.id,
            channel_id = channel.telegram_id,
            post_at = %post_at,
            "Post scheduled"
        );
        self.say(turn.chat_id, &prompts::scheduled_for(&local, &channel.title))
            .await
    }

    // --- channel registration and management ---

    async fn request_forward(&self, turn: &Turn) -> Result<()> {
        self.advance(
            turn,
            UserUpdate::new(ConversationState::WaitingForward, String::new(), None),
        )
        .await?;
        self.say(turn.chat_id, prompts::FORWARD_FROM_CHANNEL).await
    }

    async fn register_channel(&self, turn: &Turn, origin: &ForwardOrigin) -> Result<()> {
        let (chat_id, title) = match origin {
            ForwardOrigin::Channel { chat_id, title } => (*chat_id, title.as_str()),
            ForwardOrigin::Other { description } => {
                info!(user_id = turn.user_id, origin = %description, "Forward is not from a channel");
                return self.say(turn.chat_id, prompts::NOT_A_CHANNEL).await;
            }
        };

        if self
            .channels
            .find_by_external_id(chat_id)
            .await
            .map_err(storage_error)?
            .is_some()
        {
            self.finish(turn).await?;
            return self.say(turn.chat_id, prompts::ALREADY_REGISTERED).await;
        }

        match self.messenger.is_admin_in(chat_id).await {
            Ok(true) => {}
            Ok(false) => {
                info!(user_id = turn.user_id, channel_id = chat_id, "Bot is not admin of channel");
                return self.say(turn.chat_id, prompts::NOT_ADMIN).await;
            }
            Err(e) => {
                warn!(user_id = turn.user_id, channel_id = chat_id, error = %e, "Admin check failed");
                return self.say(turn.chat_id, prompts::NOT_ADMIN).await;
            }
        }

        match self.channels.create(chat_id, title, turn.user_id).await {
            Ok(channel) => {
                self.finish(turn).await?;
                info!(user_id = turn.user_id, channel_id = chat_id, id = channel.id, "Channel registered");
                self.say(turn.chat_id, &prompts::channel_registered(&channel.title))
                    .await
            }
            Err(StorageError::AlreadyExists(_)) => {
                self.finish(turn).await?;
                self.say(turn.chat_id, prompts::ALREADY_REGISTERED).await
            }
            Err(e) => Err(storage_error(e)),
        }
    }

    async fn remove_channel(&self, turn: &Turn, channel_id: i64) -> Result<()> {
        let removed = self
            .channels
            .remove(channel_id, turn.user_id)
            .await
            .map_err(storage_error)?;
        info!(user_id = turn.user_id, channel_id, removed, "Channel removal");
        let text = if removed {
            prompts::CHANNEL_REMOVED
        } else {
            prompts::CHANNEL_ALREADY_GONE
        };
        self.say(turn.chat_id, text).await
    }

    async fn delete_schedule(&self, turn: &Turn, entry_id: i64) -> Result<()> {
        let deleted = self
            .schedules
            .delete_owned(entry_id, turn.user_id)
            .await
            .map_err(storage_error)?;
        info!(user_id = turn.user_id, entry_id, deleted, "Scheduled post deletion");
        let text = if deleted {
            prompts::SCHEDULE_DELETED
        } else {
            prompts::SCHEDULE_ALREADY_GONE
        };
        self.say(turn.chat_id, text).await
    }

    // --- dispatch ---

    async fn on_command(&self, turn: &Turn, command: Command) -> Result<()> {
        match command {
            Command::Start => self.start(turn).await,
            Command::Cancel => self.cancel(turn).await,
            Command::CreatePost => self.show_channel_picker(turn).await,
            Command::Channels => self.show_channels(turn).await,
            Command::Schedules => self.show_schedules(turn).await,
        }
    }

    async fn on_action(
        &self,
        turn: &Turn,
        callback_id: &str,
        action: Option<Action>,
        displayed: Option<&ButtonLayout>,
    ) -> Result<bool> {
        if let Err(e) = self.messenger.answer_action(callback_id, None).await {
            warn!(user_id = turn.user_id, error = %e, "Failed to acknowledge action");
        }

        let Some(action) = action else {
            debug!(user_id = turn.user_id, "Unknown action token");
            return Ok(false);
        };
        match action {
            Action::CreatePost => self.show_channel_picker(turn).await?,
            Action::ManageChannels => self.show_channels(turn).await?,
            Action::ListSchedules => self.show_schedules(turn).await?,
            Action::AddChannel => self.request_forward(turn).await?,
            Action::SelectChannel(id) => self.select_channel(turn, id).await?,
            Action::RemoveChannel(id) => self.remove_channel(turn, id).await?,
            Action::DeleteSchedule(id) => self.delete_schedule(turn, id).await?,
            Action::PublishNow => self.publish_now(turn, displayed).await?,
            Action::Schedule => self.request_schedule_time(turn, displayed).await?,
            Action::Cancel => self.cancel(turn).await?,
        }
        Ok(true)
    }

    /// Returns whether the event meant anything in the current state.
    async fn dispatch(&self, turn: &Turn, kind: &EventKind) -> Result<bool> {
        use ConversationState::*;

        match (turn.state, kind) {
            (_, EventKind::Command(command)) => self.on_command(turn, *command).await?,
            (
                _,
                EventKind::Action {
                    callback_id,
                    action,
                    displayed,
                },
            ) => {
                return self
                    .on_action(turn, callback_id, *action, displayed.as_ref())
                    .await
            }
            (WaitingContent, EventKind::Text(text)) => {
                self.receive_content(turn, Draft::text(text.clone())).await?
            }
            (WaitingContent, EventKind::Photo { media_ref, caption }) => {
                let caption = caption.clone().unwrap_or_default();
                self.receive_content(turn, Draft::photo(media_ref.clone(), caption))
                    .await?
            }
            (WaitingContent, EventKind::Video { media_ref, caption }) => {
                let caption = caption.clone().unwrap_or_default();
                self.receive_content(turn, Draft::video(media_ref.clone(), caption))
                    .await?
            }
            (WaitingButtons, EventKind::Text(text)) => self.receive_buttons(turn, text).await?,
            (WaitingScheduleTime, EventKind::Text(text)) => {
                self.receive_schedule_time(turn, text).await?
            }
            (WaitingForward, EventKind::Forwarded(origin)) => {
                self.register_channel(turn, origin).await?
            }
            (state, other) => {
                debug!(
                    user_id = turn.user_id,
                    state = %state,
                    kind = other.name(),
                    "Event not expected in this state, ignored"
                );
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl Handler for ConversationEngine {
    #[instrument(skip(self, event), fields(kind = event.kind.name()))]
    async fn handle(&self, event: &Event) -> Result<HandlerResponse> {
        let Some(user) = &event.user else {
            return Ok(HandlerResponse::Ignore);
        };

        let _guard = self.locks.acquire(user.id).await;
        let turn = self.load_turn(user, event.chat.id).await?;

        debug!(user_id = user.id, state = %turn.state, "step: conversation turn");
        match self.dispatch(&turn, &event.kind).await {
            Ok(true) => Ok(HandlerResponse::Stop),
            Ok(false) => Ok(HandlerResponse::Ignore),
            Err(e) => {
                error!(user_id = user.id, state = %turn.state, error = %e, "Conversation turn failed");
                Err(e)
            }
        }
    }
}
