//! Draft: the in-progress post of one user, persisted between conversation turns.
//!
//! Drafts are stored as a versioned JSON document:
//!
//! ```json
//! {"version":1,"kind":"photo","content":"caption","media_ref":"AgAC...","buttons":[[{"label":"Shop","url":"http://shop.example"}]]}
//! ```
//!
//! `buttons` is absent until the user has supplied or declined button input. An empty string in
//! the user row means "no draft".

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current on-disk schema version of an encoded draft.
pub const DRAFT_SCHEMA_VERSION: u32 = 1;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DraftError {
    #[error("malformed draft: {0}")]
    Malformed(String),

    #[error("unsupported draft version {0}")]
    UnsupportedVersion(u32),
}

/// A single URL button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlButton {
    pub label: String,
    pub url: String,
}

impl UrlButton {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }
}

/// Kind of post, inferred from the message the user sent as content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftKind {
    Text,
    Photo,
    Video,
}

impl DraftKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DraftKind::Text => "text",
            DraftKind::Photo => "photo",
            DraftKind::Video => "video",
        }
    }
}

/// Post body. Media kinds carry the transport's reference to the uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DraftContent {
    Text { content: String },
    Photo { content: String, media_ref: String },
    Video { content: String, media_ref: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub body: DraftContent,
    /// Finalized URL button rows; `None` until the button step has completed.
    pub buttons: Option<Vec<Vec<UrlButton>>>,
}

#[derive(Serialize, Deserialize)]
struct DraftEnvelope {
    version: u32,
    #[serde(flatten)]
    body: DraftContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    buttons: Option<Vec<Vec<UrlButton>>>,
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

impl Draft {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            body: DraftContent::Text {
                content: content.into(),
            },
            buttons: None,
        }
    }

    pub fn photo(media_ref: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            body: DraftContent::Photo {
                content: caption.into(),
                media_ref: media_ref.into(),
            },
            buttons: None,
        }
    }

    pub fn video(media_ref: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            body: DraftContent::Video {
                content: caption.into(),
                media_ref: media_ref.into(),
            },
            buttons: None,
        }
    }

    pub fn kind(&self) -> DraftKind {
        match self.body {
            DraftContent::Text { .. } => DraftKind::Text,
            DraftContent::Photo { .. } => DraftKind::Photo,
            DraftContent::Video { .. } => DraftKind::Video,
        }
    }

    /// Text body for text posts, caption for media posts.
    pub fn content(&self) -> &str {
        match &self.body {
            DraftContent::Text { content }
            | DraftContent::Photo { content, .. }
            | DraftContent::Video { content, .. } => content,
        }
    }

    pub fn media_ref(&self) -> Option<&str> {
        match &self.body {
            DraftContent::Text { .. } => None,
            DraftContent::Photo { media_ref, .. } | DraftContent::Video { media_ref, .. } => {
                Some(media_ref)
            }
        }
    }

    /// Returns the draft with its button layout finalized.
    pub fn with_buttons(mut self, rows: Vec<Vec<UrlButton>>) -> Self {
        self.buttons = Some(rows);
        self
    }

    /// Finalized button rows, empty when none were set.
    pub fn button_rows(&self) -> &[Vec<UrlButton>] {
        self.buttons.as_deref().unwrap_or(&[])
    }

    pub fn encode(&self) -> Result<String, DraftError> {
        let envelope = DraftEnvelope {
            version: DRAFT_SCHEMA_VERSION,
            body: self.body.clone(),
            buttons: self.buttons.clone(),
        };
        serde_json::to_string(&envelope).map_err(|e| DraftError::Malformed(e.to_string()))
    }

    pub fn decode(raw: &str) -> Result<Self, DraftError> {
        let probe: VersionProbe =
            serde_json::from_str(raw).map_err(|e| DraftError::Malformed(e.to_string()))?;
        if probe.version != DRAFT_SCHEMA_VERSION {
            return Err(DraftError::UnsupportedVersion(probe.version));
        }
        let envelope: DraftEnvelope =
            serde_json::from_str(raw).map_err(|e| DraftError::Malformed(e.to_string()))?;
        Ok(Self {
            body: envelope.body,
            buttons: envelope.buttons,
        })
    }

    /// Decodes the stored draft column; an empty column means no draft.
    pub fn decode_stored(raw: &str) -> Result<Option<Self>, DraftError> {
        if raw.trim().is_empty() {
            return Ok(None);
        }
        Self::decode(raw).map(Some)
    }
}
