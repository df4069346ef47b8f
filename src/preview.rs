use regex::Regex;
use std::sync::OnceLock;
use url::Url;

use crate::models::{LinkPreview, LinkPreviewResponse};

pub const DESCRIPTION_LIMIT: usize = 100;

/// `http`/`https` URL whose host has a dot, with `http://` prepended when the
/// scheme is missing.
pub fn normalize_http_url(raw: &str) -> Option<String> {
    static RE_SCHEME: OnceLock<Regex> = OnceLock::new();
    let re_scheme = RE_SCHEME.get_or_init(|| Regex::new(r"(?i)^https?://").unwrap());

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let candidate = if re_scheme.is_match(trimmed) {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };
    let parsed = Url::parse(&candidate).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }
    let host = parsed.host_str()?;
    if !host.contains('.') {
        return None;
    }
    Some(candidate)
}

pub fn truncate_description(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() <= DESCRIPTION_LIMIT {
        return text.to_string();
    }
    let mut out: String = text.chars().take(DESCRIPTION_LIMIT).collect();
    out.push_str("...");
    out
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum PreviewState {
    #[default]
    Hidden,
    Loading,
    Ready(PreviewCard),
    Failed,
}

/// What the preview card shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreviewCard {
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
}

impl PreviewCard {
    pub fn from_preview(preview: LinkPreview, requested_url: &str) -> Self {
        let title = preview
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| requested_url.to_string());
        Self {
            title,
            description: truncate_description(preview.description.as_deref().unwrap_or_default()),
            image_url: preview
                .image_url
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty()),
        }
    }
}

/// What the caller should do after the URL input changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PreviewAction {
    /// Cancel any pending timer; the card is hidden.
    Cancel,
    /// (Re)arm the debounce timer for `url` under `token`.
    Schedule { token: u64, url: String },
}

/// Only the newest token may touch the state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PreviewTracker {
    latest_token: u64,
    suppressed: bool,
    state: PreviewState,
}

impl PreviewTracker {
    pub fn state(&self) -> &PreviewState {
        &self.state
    }

    fn next_token(&mut self) -> u64 {
        self.latest_token = self.latest_token.saturating_add(1);
        self.latest_token
    }

    pub fn on_input(&mut self, value: &str) -> PreviewAction {
        let token = self.next_token();
        if self.suppressed {
            return PreviewAction::Cancel;
        }
        match normalize_http_url(value) {
            Some(url) => PreviewAction::Schedule { token, url },
            None => {
                self.state = PreviewState::Hidden;
                PreviewAction::Cancel
            }
        }
    }

    /// The debounce timer fired. Returns false when the token is stale.
    pub fn begin(&mut self, token: u64) -> bool {
        if token != self.latest_token || self.suppressed {
            return false;
        }
        self.state = PreviewState::Loading;
        true
    }

    /// Applies a response (or a transport failure as `None`). Returns false
    /// when the response was dropped.
    pub fn finish(
        &mut self,
        token: u64,
        requested_url: &str,
        response: Option<LinkPreviewResponse>,
    ) -> bool {
        if token != self.latest_token || self.suppressed {
            return false;
        }
        self.state = match response {
            Some(LinkPreviewResponse::Preview(preview)) => {
                PreviewState::Ready(PreviewCard::from_preview(preview, requested_url))
            }
            Some(LinkPreviewResponse::Error { .. }) | None => PreviewState::Failed,
        };
        true
    }

    /// A manual image takes precedence over any fetched preview.
    pub fn suppress(&mut self) {
        self.suppressed = true;
        self.next_token();
        self.state = PreviewState::Hidden;
    }

    /// The manual image was cleared; re-evaluate the current URL.
    pub fn release(&mut self, current_url: &str) -> PreviewAction {
        self.suppressed = false;
        self.on_input(current_url)
    }

    pub fn reset(&mut self) {
        let token = self.latest_token;
        *self = Self::default();
        // keep tokens monotonic so a timer from the last session can't match
        self.latest_token = token.saturating_add(1);
    }
}
