//! Schedule publisher: periodically delivers due scheduled posts.
//!
//! Every sweep takes a snapshot of the entries due at scan start and handles each one on its own:
//! re-read it (skipping entries deleted since the snapshot), decode, send to the channel, notify
//! the submitter, then delete. The entry is deleted whether or
//! not delivery worked, so a failing post is never retried. A crash between send and delete means
//! the post is sent again on the next sweep; it is never lost.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use postbot_core::{send_draft, url_layout, Draft, Messenger, PostbotError, Result};
use storage::{ScheduleStore, ScheduledEntry};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::conversation::prompts;

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub due: usize,
    pub delivered: usize,
    pub failed: usize,
    /// Deleted after the snapshot was taken, so never sent.
    pub skipped: usize,
}

pub struct SchedulePublisher {
    schedules: Arc<dyn ScheduleStore>,
    messenger: Arc<dyn Messenger>,
    period: Duration,
}

impl SchedulePublisher {
    pub fn new(
        schedules: Arc<dyn ScheduleStore>,
        messenger: Arc<dyn Messenger>,
        period: Duration,
    ) -> Self {
        Self {
            schedules,
            messenger,
            period,
        }
    }

    /// One sweep over entries due at `now`. Only listing the due entries can fail the sweep.
    #[instrument(skip(self))]
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<PublishReport> {
        let entries = self
            .schedules
            .due(now)
            .await
            .map_err(|e| PostbotError::Database(e.to_string()))?;

        let mut report = PublishReport {
            due: entries.len(),
            ..PublishReport::default()
        };
        if entries.is_empty() {
            debug!("No scheduled posts due");
            return Ok(report);
        }
        info!(due = report.due, "Publishing due scheduled posts");

        for snapshot in &entries {
            let entry = match self.schedules.find(snapshot.id).await {
                Ok(Some(entry)) => entry,
                Ok(None) => {
                    report.skipped += 1;
                    info!(
                        entry_id = snapshot.id,
                        "Scheduled post was deleted before dispatch, skipping"
                    );
                    continue;
                }
                Err(e) => {
                    // Left in place; the next sweep picks it up again.
                    report.skipped += 1;
                    error!(entry_id = snapshot.id, error = %e, "Failed to re-read scheduled post");
                    continue;
                }
            };

            match self.deliver(&entry).await {
                Ok(()) => {
                    report.delivered += 1;
                    info!(
                        entry_id = entry.id,
                        channel_id = entry.channel_id,
                        "Scheduled post delivered"
                    );
                    self.notify_submitter(&entry).await;
                }
                Err(e) => {
                    report.failed += 1;
                    error!(
                        entry_id = entry.id,
                        channel_id = entry.channel_id,
                        submitted_by = entry.submitted_by,
                        error = %e,
                        "Scheduled post delivery failed, dropping it"
                    );
                }
            }
            self.remove(&entry).await;
        }

        info!(
            due = report.due,
            delivered = report.delivered,
            failed = report.failed,
            skipped = report.skipped,
            "Publish sweep finished"
        );
        Ok(report)
    }

    async fn deliver(&self, entry: &ScheduledEntry) -> Result<()> {
        let draft = Draft::decode(&entry.data)?;
        let layout = url_layout(draft.button_rows());
        send_draft(self.messenger.as_ref(), entry.channel_id, &draft, Some(&layout)).await
    }

    async fn notify_submitter(&self, entry: &ScheduledEntry) {
        let text = prompts::delivered_notice(entry.id, entry.channel_id);
        if let Err(e) = self
            .messenger
            .send_text(entry.submitted_by, &text, None)
            .await
        {
            warn!(
                entry_id = entry.id,
                submitted_by = entry.submitted_by,
                error = %e,
                "Failed to notify submitter"
            );
        }
    }

    async fn remove(&self, entry: &ScheduledEntry) {
        match self.schedules.delete(entry.id).await {
            Ok(true) => debug!(entry_id = entry.id, "Scheduled post removed"),
            Ok(false) => debug!(entry_id = entry.id, "Scheduled post was already removed"),
            Err(e) => error!(
                entry_id = entry.id,
                error = %e,
                "Failed to remove scheduled post; it will be sent again next sweep"
            ),
        }
    }

    /// Sweeps every period until `cancel` fires. The first sweep runs immediately.
    pub async fn run(self: Arc<Self>, cancel: CancellationToken) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(period_secs = self.period.as_secs(), "Schedule publisher started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Schedule publisher stopping");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.run_once(Utc::now()).await {
                        error!(error = %e, "Publish sweep failed");
                    }
                }
            }
        }
    }

    pub fn spawn(self: Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }
}
