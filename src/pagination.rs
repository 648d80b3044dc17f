//! Pagination: next-page evaluation per fetched page, the opaque
//! continuation token chapter lists hand back, and a small session machine
//! for callers walking a whole list.
//!
//! Continuation state lives in the token, never on the source instance, so
//! interleaved calls for different books cannot poison each other.

use scraper::Html;
use serde::{Deserialize, Serialize};

use crate::descriptor::{ChaptersDescriptor, NextPageRule};
use crate::extract;
use crate::models::ChaptersPage;
use crate::normalize;

/// Opaque continuation returned by `fetch_chapters` and passed into the
/// next call. Wraps the resolved URL of the next chapter-list page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageToken {
    url: String,
}

impl PageToken {
    pub(crate) fn new(url: String) -> Self {
        Self { url }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Next-page evaluation for one fetched page.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct PageOutcome {
    pub has_next: bool,
    pub continuation: Option<PageToken>,
}

/// Listing rule: the selector matching a node means "more", strengthened to
/// an exact value comparison when a literal is configured.
pub(crate) fn listing_outcome(doc: &Html, rule: Option<&NextPageRule>) -> bool {
    let Some(rule) = rule else {
        return false;
    };
    let root = doc.root_element();
    match rule.value.as_deref() {
        None => extract::selector_matches(root, &rule.selector),
        Some(expected) => match extract::string_value(root, &rule.field()) {
            Ok(value) => normalize::clean_text(&value) == expected,
            Err(_) => false,
        },
    }
}

/// Chapter-list rule. With `supports_next_page_list`, an extracted value
/// that is a well-formed absolute URL becomes the continuation token
/// (normalized onto the base); otherwise a configured sentinel occurring in
/// the value is the "more" signal. The URL test runs on the value as
/// extracted, since most such rules read pager text rather than an href.
/// Without the flag, the listing rule applies.
pub(crate) fn chapters_outcome(
    doc: &Html,
    desc: &ChaptersDescriptor,
    base_url: &str,
) -> PageOutcome {
    let Some(rule) = desc.next_page.as_ref() else {
        return PageOutcome::default();
    };
    if !desc.supports_next_page_list {
        return PageOutcome {
            has_next: listing_outcome(doc, Some(rule)),
            continuation: None,
        };
    }
    let raw = extract::string_value(doc.root_element(), &rule.field()).unwrap_or_default();
    let raw = raw.trim();
    if normalize::is_absolute(raw) {
        let url = normalize::resolve_link(base_url, raw, false);
        return PageOutcome {
            has_next: true,
            continuation: Some(PageToken::new(url)),
        };
    }
    let has_next = match rule.value.as_deref() {
        Some(sentinel) if !sentinel.is_empty() => raw.contains(sentinel),
        _ => false,
    };
    PageOutcome {
        has_next,
        continuation: None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Initial,
    HasMore,
    Exhausted,
}

/// Tracks progress through one book's chapter list across calls.
///
/// ```no_run
/// # async fn walk(source: &webnovel_sources::WebSource, book: &webnovel_sources::Book)
/// # -> Result<(), webnovel_sources::SourceError> {
/// let mut session = webnovel_sources::ChapterSession::new();
/// while session.has_more() {
///     let page = source
///         .fetch_chapters(book, session.page(), session.token())
///         .await?;
///     session.advance(&page);
/// }
/// # Ok(()) }
/// ```
#[derive(Debug, Clone)]
pub struct ChapterSession {
    page: u32,
    state: SessionState,
    token: Option<PageToken>,
}

impl ChapterSession {
    pub fn new() -> Self {
        Self {
            page: 1,
            state: SessionState::Initial,
            token: None,
        }
    }

    /// Page number for the next fetch.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Continuation token for the next fetch, if the last page produced one.
    pub fn token(&self) -> Option<&PageToken> {
        self.token.as_ref()
    }

    /// False once a fetched page reported no further results.
    pub fn has_more(&self) -> bool {
        self.state != SessionState::Exhausted
    }

    pub fn is_started(&self) -> bool {
        self.state != SessionState::Initial
    }

    /// Feed the page just fetched: advances the page number and carries the
    /// continuation forward.
    pub fn advance(&mut self, fetched: &ChaptersPage) {
        self.page += 1;
        self.token = fetched.next_token.clone();
        self.state = if fetched.has_next {
            SessionState::HasMore
        } else {
            SessionState::Exhausted
        };
    }

    /// Restart from the first page.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for ChapterSession {
    fn default() -> Self {
        Self::new()
    }
}
