//! Inline button layouts attached to outgoing messages.
//!
//! A preview always ends with exactly [`CONTROL_ROWS`] rows: `[publish now, schedule]` then
//! `[cancel]`. [`strip_control_rows`] removes that suffix to recover the user-authored URL buttons
//! from whatever layout is currently displayed; [`preview_layout`] and [`strip_control_rows`] must
//! agree on the suffix size.

use crate::action::Action;
use crate::draft::UrlButton;

/// Number of trailing control rows appended to every preview.
pub const CONTROL_ROWS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Button {
    Url { label: String, url: String },
    /// Button whose press is reported back as callback data.
    Callback { label: String, data: String },
}

impl Button {
    pub fn url(label: impl Into<String>, url: impl Into<String>) -> Self {
        Button::Url {
            label: label.into(),
            url: url.into(),
        }
    }

    pub fn action(label: impl Into<String>, action: Action) -> Self {
        Button::Callback {
            label: label.into(),
            data: action.to_data(),
        }
    }
}

pub type ButtonLayout = Vec<Vec<Button>>;

/// Layout holding only URL buttons, as delivered to the channel.
pub fn url_layout(rows: &[Vec<UrlButton>]) -> ButtonLayout {
    rows.iter()
        .map(|row| {
            row.iter()
                .map(|b| Button::url(b.label.clone(), b.url.clone()))
                .collect()
        })
        .collect()
}

/// URL rows followed by the two control rows.
pub fn preview_layout(rows: &[Vec<UrlButton>]) -> ButtonLayout {
    let mut layout = url_layout(rows);
    layout.push(vec![
        Button::action("✅ Publish now", Action::PublishNow),
        Button::action("⏰ Schedule", Action::Schedule),
    ]);
    layout.push(vec![Button::action("❌ Cancel", Action::Cancel)]);
    layout
}

/// Drops the trailing control rows and keeps the URL buttons of the remaining rows.
///
/// URLs come back as the transport displays them, which may be normalized: over Telegram a typed
/// `http://shop.example` is read back as `http://shop.example/`. Both open the same page.
pub fn strip_control_rows(layout: &[Vec<Button>]) -> Vec<Vec<UrlButton>> {
    let keep = layout.len().saturating_sub(CONTROL_ROWS);
    layout[..keep]
        .iter()
        .map(|row| {
            row.iter()
                .filter_map(|b| match b {
                    Button::Url { label, url } => Some(UrlButton::new(label.clone(), url.clone())),
                    Button::Callback { .. } => None,
                })
                .collect::<Vec<_>>()
        })
        .filter(|row| !row.is_empty())
        .collect()
}
