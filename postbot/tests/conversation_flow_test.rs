//! Integration tests for the conversation engine, driven through the production handler chain with
//! a SQLite store in a temp dir and a recording messenger.

mod common;

use chrono::{TimeZone, Utc};
use common::{
    action, action_on, anonymous_text, command, forwarded, photo, text, video, Sent, TestEnv,
    USER_ID,
};
use postbot::conversation::prompts;
use postbot_core::{
    preview_layout, Action, Button, Command, ConversationState, Draft, DraftKind, ForwardOrigin,
    HandlerResponse, UrlButton,
};
use storage::UserUpdate;

const CHANNEL: i64 = -100_123;

/// Walks a user up to the preview: channel selected, text content, buttons parsed.
async fn reach_preview(env: &TestEnv, content: &str, buttons: &str) -> i64 {
    let channel_id = env.add_channel(CHANNEL, "C1", USER_ID).await;
    env.send(action(USER_ID, Action::CreatePost)).await;
    env.send(action(USER_ID, Action::SelectChannel(channel_id))).await;
    env.send(text(USER_ID, content)).await;
    env.send(text(USER_ID, buttons)).await;
    channel_id
}

/// **Test: Full scheduling flow creates exactly one entry with the channel's external id, content, buttons and due time read at +07:00.**
#[tokio::test]
async fn test_schedule_flow_end_to_end() {
    let env = TestEnv::new().await;
    let channel_id = env.add_channel(CHANNEL, "C1", USER_ID).await;

    env.send(action(USER_ID, Action::CreatePost)).await;
    let picker = env.messenger.last_to(USER_ID).unwrap();
    assert_eq!(
        picker.buttons().unwrap()[0],
        vec![Button::action("C1", Action::SelectChannel(channel_id))]
    );

    env.send(action(USER_ID, Action::SelectChannel(channel_id))).await;
    assert_eq!(env.state_of(USER_ID).await, ConversationState::WaitingContent);

    env.send(text(USER_ID, "Hello")).await;
    assert_eq!(env.state_of(USER_ID).await, ConversationState::WaitingButtons);

    env.send(text(USER_ID, "Shop - http://shop.example")).await;
    assert_eq!(env.state_of(USER_ID).await, ConversationState::WaitingButtons);
    let preview = env.messenger.last_to(USER_ID).unwrap();
    let shop = vec![vec![UrlButton::new("Shop", "http://shop.example")]];
    assert_eq!(preview.text(), Some("Hello"));
    assert_eq!(preview.buttons(), Some(&preview_layout(&shop)));

    env.send(action_on(
        USER_ID,
        Action::Schedule,
        preview.buttons().cloned(),
    ))
    .await;
    assert_eq!(
        env.state_of(USER_ID).await,
        ConversationState::WaitingScheduleTime
    );

    env.send(text(USER_ID, "31/12/2099 10:00")).await;
    assert_eq!(env.state_of(USER_ID).await, ConversationState::Idle);

    let entries = env.stores.schedules.list_by_submitter(USER_ID).await.unwrap();
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.channel_id, CHANNEL);
    assert_eq!(entry.submitted_by, USER_ID);
    assert_eq!(entry.post_at, Utc.with_ymd_and_hms(2099, 12, 31, 3, 0, 0).unwrap());
    let draft = Draft::decode(&entry.data).unwrap();
    assert_eq!(draft.kind(), DraftKind::Text);
    assert_eq!(draft.content(), "Hello");
    assert_eq!(draft.button_rows(), shop.as_slice());

    let user = env.stores.users.find(USER_ID).await.unwrap().unwrap();
    assert_eq!(user.draft, "");
    assert_eq!(user.selected_channel_id, None);
}

/// **Test: Unparsable or non-future times create no entry and keep WAITING_SCHEDULE_TIME.**
#[tokio::test]
async fn test_bad_schedule_times_keep_waiting() {
    let env = TestEnv::new().await;
    reach_preview(&env, "Hello", "skip").await;
    env.send(action(USER_ID, Action::Schedule)).await;

    for input in ["tomorrow at ten", "2099-12-31 10:00", "01/01/2000 00:00"] {
        env.send(text(USER_ID, input)).await;
        assert_eq!(
            env.state_of(USER_ID).await,
            ConversationState::WaitingScheduleTime,
            "{input:?}"
        );
    }
    assert_eq!(
        env.messenger.last_to(USER_ID).unwrap().text(),
        Some(prompts::TIME_NOT_IN_FUTURE)
    );
    assert!(env.stores.schedules.list_pending().await.unwrap().is_empty());

    env.send(text(USER_ID, "01/06/2099 08:30")).await;
    assert_eq!(env.state_of(USER_ID).await, ConversationState::Idle);
    assert_eq!(env.stores.schedules.list_pending().await.unwrap().len(), 1);
}

/// **Test: Scheduling strips the two control rows from the displayed layout; without one it falls back to the stored buttons.**
#[tokio::test]
async fn test_schedule_uses_displayed_layout_then_stored_buttons() {
    let env = TestEnv::new().await;
    reach_preview(&env, "Hello", "A - http://a.com\nB - http://b.com").await;

    // The displayed message only carries B (e.g. the user is pressing an older preview).
    let displayed = preview_layout(&[vec![UrlButton::new("B", "http://b.com")]]);
    env.send(action_on(USER_ID, Action::Schedule, Some(displayed)))
        .await;
    env.send(text(USER_ID, "31/12/2099 10:00")).await;

    let entry = &env.stores.schedules.list_pending().await.unwrap()[0];
    let draft = Draft::decode(&entry.data).unwrap();
    assert_eq!(
        draft.button_rows(),
        &[vec![UrlButton::new("B", "http://b.com")]]
    );

    let env = TestEnv::new().await;
    reach_preview(&env, "Hello", "A - http://a.com\nbad-line\nB - http://b.com").await;
    env.send(action(USER_ID, Action::Schedule)).await;
    env.send(text(USER_ID, "31/12/2099 10:00")).await;

    let entry = &env.stores.schedules.list_pending().await.unwrap()[0];
    let draft = Draft::decode(&entry.data).unwrap();
    assert_eq!(
        draft.button_rows(),
        &[
            vec![UrlButton::new("A", "http://a.com")],
            vec![UrlButton::new("B", "http://b.com")],
        ]
    );
}

/// **Test: `skip` gives a preview with only the control rows and an empty, but set, button list.**
#[tokio::test]
async fn test_skip_buttons() {
    let env = TestEnv::new().await;
    reach_preview(&env, "Hello", "SKIP").await;

    let preview = env.messenger.last_to(USER_ID).unwrap();
    assert_eq!(preview.buttons(), Some(&preview_layout(&[])));

    let user = env.stores.users.find(USER_ID).await.unwrap().unwrap();
    let draft = user.draft().unwrap().unwrap();
    assert_eq!(draft.buttons, Some(vec![]));
}

/// **Test: Publish and schedule are refused until buttons were supplied or skipped.**
#[tokio::test]
async fn test_publish_before_buttons_is_refused() {
    let env = TestEnv::new().await;
    let channel_id = env.add_channel(CHANNEL, "C1", USER_ID).await;
    env.send(action(USER_ID, Action::SelectChannel(channel_id))).await;
    env.send(text(USER_ID, "Hello")).await;

    env.send(action(USER_ID, Action::PublishNow)).await;

    assert_eq!(env.state_of(USER_ID).await, ConversationState::WaitingButtons);
    assert_eq!(
        env.messenger.last_to(USER_ID).unwrap().text(),
        Some(prompts::BUTTONS_FIRST)
    );
    assert!(env.messenger.sent_to(CHANNEL).is_empty());
}

/// **Test: Publish now sends the photo with URL buttons only, reports success and returns to IDLE.**
#[tokio::test]
async fn test_publish_now_photo() {
    let env = TestEnv::new().await;
    let channel_id = env.add_channel(CHANNEL, "C1", USER_ID).await;
    env.send(action(USER_ID, Action::SelectChannel(channel_id))).await;
    env.send(photo(USER_ID, "photo-file-id", Some("Caption"))).await;
    env.send(text(USER_ID, "Shop - http://shop.example")).await;

    let preview = env.messenger.last_to(USER_ID).unwrap();
    assert!(matches!(preview, Sent::Photo { .. }));

    env.send(action_on(USER_ID, Action::PublishNow, preview.buttons().cloned()))
        .await;

    let delivered = env.messenger.sent_to(CHANNEL);
    assert_eq!(delivered.len(), 1);
    assert_eq!(
        delivered[0],
        Sent::Photo {
            chat_id: CHANNEL,
            media_ref: "photo-file-id".to_string(),
            caption: "Caption".to_string(),
            buttons: Some(vec![vec![Button::url("Shop", "http://shop.example")]]),
        }
    );
    assert_eq!(
        env.messenger.last_to(USER_ID).unwrap().text(),
        Some(prompts::PUBLISHED)
    );
    assert_eq!(env.state_of(USER_ID).await, ConversationState::Idle);
    assert!(env.stores.schedules.list_pending().await.unwrap().is_empty());
}

/// **Test: A failed immediate publish is reported to the user and still resets to IDLE.**
#[tokio::test]
async fn test_publish_now_failure_is_reported() {
    let env = TestEnv::new().await;
    reach_preview(&env, "Hello", "skip").await;
    env.messenger.fail_for(CHANNEL);

    env.send(action(USER_ID, Action::PublishNow)).await;

    let reply = env.messenger.last_to(USER_ID).unwrap();
    assert!(reply.text().unwrap().starts_with("❌ Publishing failed"));
    assert_eq!(env.state_of(USER_ID).await, ConversationState::Idle);
}

/// **Test: Every action is acknowledged before it is handled.**
#[tokio::test]
async fn test_actions_are_acknowledged() {
    let env = TestEnv::new().await;

    env.send(action(USER_ID, Action::ListSchedules)).await;

    let sent = env.messenger.sent();
    assert!(matches!(sent[0], Sent::Answer { .. }));
    assert_eq!(sent[1].text(), Some(prompts::NO_SCHEDULES));
}

/// **Test: /start resets state, draft and selected channel and shows the main menu.**
#[tokio::test]
async fn test_start_resets_user() {
    let env = TestEnv::new().await;
    reach_preview(&env, "Hello", "skip").await;

    let response = env.send(command(USER_ID, Command::Start)).await;

    assert_eq!(response, HandlerResponse::Stop);
    let user = env.stores.users.find(USER_ID).await.unwrap().unwrap();
    assert_eq!(user.state().unwrap(), ConversationState::Idle);
    assert_eq!(user.draft, "");
    assert_eq!(user.selected_channel_id, None);
    assert_eq!(
        env.messenger.last_to(USER_ID).unwrap().buttons(),
        Some(&prompts::main_menu())
    );
}

/// **Test: Cancel from the preview discards the draft and creates nothing.**
#[tokio::test]
async fn test_cancel_discards_draft() {
    let env = TestEnv::new().await;
    reach_preview(&env, "Hello", "skip").await;

    env.send(action(USER_ID, Action::Cancel)).await;

    let user = env.stores.users.find(USER_ID).await.unwrap().unwrap();
    assert_eq!(user.state().unwrap(), ConversationState::Idle);
    assert_eq!(user.draft, "");
    assert!(env.messenger.sent_to(CHANNEL).is_empty());
    assert!(env.stores.schedules.list_pending().await.unwrap().is_empty());
}

/// **Test: Selecting a channel registered by someone else is refused and leaves the state alone.**
#[tokio::test]
async fn test_select_foreign_channel_refused() {
    let env = TestEnv::new().await;
    let foreign = env.add_channel(CHANNEL, "Theirs", 2002).await;

    env.send(action(USER_ID, Action::SelectChannel(foreign))).await;

    assert_eq!(env.state_of(USER_ID).await, ConversationState::Idle);
    assert_eq!(
        env.messenger.last_to(USER_ID).unwrap().text(),
        Some(prompts::CHANNEL_NOT_FOUND)
    );
}

/// **Test: Forwarding from a non-channel keeps WAITING_FORWARD and registers nothing.**
#[tokio::test]
async fn test_forward_non_channel_stays_waiting() {
    let env = TestEnv::new().await;
    env.send(action(USER_ID, Action::AddChannel)).await;
    assert_eq!(env.state_of(USER_ID).await, ConversationState::WaitingForward);

    env.send(forwarded(
        USER_ID,
        ForwardOrigin::Other {
            description: "user".to_string(),
        },
    ))
    .await;

    assert_eq!(env.state_of(USER_ID).await, ConversationState::WaitingForward);
    assert_eq!(
        env.messenger.last_to(USER_ID).unwrap().text(),
        Some(prompts::NOT_A_CHANNEL)
    );
    assert!(env.stores.channels.list_by_owner(USER_ID).await.unwrap().is_empty());
}

/// **Test: Without admin rights the channel is not registered and the user can forward again.**
#[tokio::test]
async fn test_forward_without_admin_rights() {
    let env = TestEnv::new().await;
    let origin = ForwardOrigin::Channel {
        chat_id: CHANNEL,
        title: "C1".to_string(),
    };
    env.send(action(USER_ID, Action::AddChannel)).await;

    env.send(forwarded(USER_ID, origin.clone())).await;
    assert_eq!(env.state_of(USER_ID).await, ConversationState::WaitingForward);
    assert_eq!(
        env.messenger.last_to(USER_ID).unwrap().text(),
        Some(prompts::NOT_ADMIN)
    );
    assert!(env.stores.channels.find_by_external_id(CHANNEL).await.unwrap().is_none());

    env.messenger.grant_admin(CHANNEL);
    env.send(forwarded(USER_ID, origin)).await;

    assert_eq!(env.state_of(USER_ID).await, ConversationState::Idle);
    let channel = env.stores.channels.find_by_external_id(CHANNEL).await.unwrap().unwrap();
    assert_eq!(channel.title, "C1");
    assert_eq!(channel.added_by_id, USER_ID);
}

/// **Test: Forwarding an already registered channel is a notice and returns to IDLE.**
#[tokio::test]
async fn test_forward_already_registered_channel() {
    let env = TestEnv::new().await;
    env.add_channel(CHANNEL, "C1", 2002).await;
    env.messenger.grant_admin(CHANNEL);
    env.send(action(USER_ID, Action::AddChannel)).await;

    env.send(forwarded(
        USER_ID,
        ForwardOrigin::Channel {
            chat_id: CHANNEL,
            title: "C1".to_string(),
        },
    ))
    .await;

    assert_eq!(env.state_of(USER_ID).await, ConversationState::Idle);
    assert_eq!(
        env.messenger.last_to(USER_ID).unwrap().text(),
        Some(prompts::ALREADY_REGISTERED)
    );
    assert!(env.stores.channels.list_by_owner(USER_ID).await.unwrap().is_empty());
}

/// **Test: Events without a sender stop the chain before the engine and send nothing.**
#[tokio::test]
async fn test_event_without_sender_is_ignored() {
    let env = TestEnv::new().await;

    let response = env.send(anonymous_text("hello")).await;

    assert_eq!(response, HandlerResponse::Stop);
    assert!(env.messenger.sent().is_empty());
}

/// **Test: Input that means nothing in the current state is a no-op; the chain falls through with Continue.**
#[tokio::test]
async fn test_unexpected_input_is_noop() {
    let env = TestEnv::new().await;

    let response = env.send(photo(USER_ID, "file", None)).await;
    assert_eq!(response, HandlerResponse::Continue);

    let response = env.send(text(USER_ID, "Shop - http://shop.example")).await;
    assert_eq!(response, HandlerResponse::Continue);

    assert_eq!(env.state_of(USER_ID).await, ConversationState::Idle);
    assert!(env.messenger.sent().is_empty());
}

/// **Test: Deleting a scheduled post is owner-only and idempotent.**
#[tokio::test]
async fn test_delete_schedule_idempotent() {
    let env = TestEnv::new().await;
    reach_preview(&env, "Hello", "skip").await;
    env.send(action(USER_ID, Action::Schedule)).await;
    env.send(text(USER_ID, "31/12/2099 10:00")).await;
    let entry_id = env.stores.schedules.list_pending().await.unwrap()[0].id;

    env.send(action(2002, Action::DeleteSchedule(entry_id))).await;
    assert_eq!(env.stores.schedules.list_pending().await.unwrap().len(), 1);

    env.send(action(USER_ID, Action::DeleteSchedule(entry_id))).await;
    assert_eq!(
        env.messenger.last_to(USER_ID).unwrap().text(),
        Some(prompts::SCHEDULE_DELETED)
    );
    env.send(action(USER_ID, Action::DeleteSchedule(entry_id))).await;
    assert_eq!(
        env.messenger.last_to(USER_ID).unwrap().text(),
        Some(prompts::SCHEDULE_ALREADY_GONE)
    );
    assert!(env.stores.schedules.list_pending().await.unwrap().is_empty());
}

/// **Test: The schedules view lists pending posts with delete buttons.**
#[tokio::test]
async fn test_schedules_view_lists_entries() {
    let env = TestEnv::new().await;
    reach_preview(&env, "Hello", "skip").await;
    env.send(action(USER_ID, Action::Schedule)).await;
    env.send(text(USER_ID, "31/12/2099 10:00")).await;
    let entry_id = env.stores.schedules.list_pending().await.unwrap()[0].id;

    env.send(command(USER_ID, Command::Schedules)).await;

    let view = env.messenger.last_to(USER_ID).unwrap();
    assert!(view.text().unwrap().contains("31/12/2099 10:00"));
    assert_eq!(
        view.buttons().unwrap()[0][0],
        Button::action(
            format!("🗑 #{} 31/12/2099 10:00", entry_id),
            Action::DeleteSchedule(entry_id)
        )
    );
}

/// **Test: Removing a channel from the management view is owner-only.**
#[tokio::test]
async fn test_remove_channel() {
    let env = TestEnv::new().await;
    let channel_id = env.add_channel(CHANNEL, "C1", USER_ID).await;

    env.send(action(2002, Action::RemoveChannel(channel_id))).await;
    assert!(env.stores.channels.find_by_id(channel_id).await.unwrap().is_some());

    env.send(action(USER_ID, Action::RemoveChannel(channel_id))).await;
    assert!(env.stores.channels.find_by_id(channel_id).await.unwrap().is_none());
    assert_eq!(
        env.messenger.last_to(USER_ID).unwrap().text(),
        Some(prompts::CHANNEL_REMOVED)
    );
}

/// **Test: A video becomes a video draft; the preview and the published post both go out as video with the caption.**
#[tokio::test]
async fn test_video_content_published_as_video() {
    let env = TestEnv::new().await;
    let channel_id = env.add_channel(CHANNEL, "C1", USER_ID).await;
    env.send(action(USER_ID, Action::SelectChannel(channel_id))).await;

    env.send(video(USER_ID, "video-1", Some("Clip"))).await;
    assert_eq!(env.state_of(USER_ID).await, ConversationState::WaitingButtons);
    let user = env.stores.users.find(USER_ID).await.unwrap().unwrap();
    let draft = user.draft().unwrap().unwrap();
    assert_eq!(draft.kind(), DraftKind::Video);
    assert_eq!(draft.content(), "Clip");

    env.send(text(USER_ID, "skip")).await;
    let preview = env.messenger.last_to(USER_ID).unwrap();
    assert!(matches!(
        &preview,
        Sent::Video { media_ref, caption, .. } if media_ref == "video-1" && caption == "Clip"
    ));

    env.send(action_on(USER_ID, Action::PublishNow, preview.buttons().cloned()))
        .await;

    assert_eq!(
        env.messenger.sent_to(CHANNEL),
        vec![Sent::Video {
            chat_id: CHANNEL,
            media_ref: "video-1".to_string(),
            caption: "Clip".to_string(),
            buttons: None,
        }]
    );
    assert_eq!(env.state_of(USER_ID).await, ConversationState::Idle);
}

/// **Test: If the selected channel is removed mid-flow, publishing now resets to IDLE with a notice and sends nothing.**
#[tokio::test]
async fn test_publish_to_removed_channel_resets() {
    let env = TestEnv::new().await;
    let channel_id = reach_preview(&env, "Hello", "skip").await;
    assert!(env.stores.channels.remove(channel_id, USER_ID).await.unwrap());

    env.send(action(USER_ID, Action::PublishNow)).await;

    assert_eq!(env.state_of(USER_ID).await, ConversationState::Idle);
    assert_eq!(
        env.messenger.last_to(USER_ID).unwrap().text(),
        Some(prompts::SELECTED_CHANNEL_GONE)
    );
    assert!(env.messenger.sent_to(CHANNEL).is_empty());
}

/// **Test: If the selected channel is removed before the time is entered, no entry is created and the flow resets.**
#[tokio::test]
async fn test_schedule_to_removed_channel_resets() {
    let env = TestEnv::new().await;
    let channel_id = reach_preview(&env, "Hello", "skip").await;
    env.send(action(USER_ID, Action::Schedule)).await;
    assert!(env.stores.channels.remove(channel_id, USER_ID).await.unwrap());

    env.send(text(USER_ID, "31/12/2099 10:00")).await;

    assert_eq!(env.state_of(USER_ID).await, ConversationState::Idle);
    assert_eq!(
        env.messenger.last_to(USER_ID).unwrap().text(),
        Some(prompts::SELECTED_CHANNEL_GONE)
    );
    assert!(env.stores.schedules.list_pending().await.unwrap().is_empty());
}

/// **Test: An unreadable stored draft ends the flow with a start-again notice.**
#[tokio::test]
async fn test_unreadable_draft_resets_flow() {
    let env = TestEnv::new().await;
    let channel_id = env.add_channel(CHANNEL, "C1", USER_ID).await;
    env.send(action(USER_ID, Action::SelectChannel(channel_id))).await;
    env.send(text(USER_ID, "Hello")).await;
    env.stores
        .users
        .transition(
            USER_ID,
            ConversationState::WaitingButtons,
            &UserUpdate::new(
                ConversationState::WaitingButtons,
                "{\"version\":1,\"kind\":".to_string(),
                Some(channel_id),
            ),
        )
        .await
        .unwrap();

    env.send(text(USER_ID, "skip")).await;

    assert_eq!(env.state_of(USER_ID).await, ConversationState::Idle);
    assert_eq!(
        env.messenger.last_to(USER_ID).unwrap().text(),
        Some(prompts::DRAFT_LOST)
    );
    let user = env.stores.users.find(USER_ID).await.unwrap().unwrap();
    assert_eq!(user.draft, "");
    assert_eq!(user.selected_channel_id, None);
}
