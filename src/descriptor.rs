//! The declarative source model. A `SourceDescriptor` is pure data: endpoint
//! templates, CSS selector / attribute pairs, JSONPath expressions and a
//! handful of flags. The engine executes any site described this way without
//! site-specific code.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One operation a source can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Latest,
    Popular,
    Search,
    Detail,
    Chapters,
    Content,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Latest => "latest",
            OperationKind::Popular => "popular",
            OperationKind::Search => "search",
            OperationKind::Detail => "detail",
            OperationKind::Chapters => "chapters",
            OperationKind::Content => "content",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP method for an endpoint. A few sites paginate chapter lists over POST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        })
    }
}

/// A CSS selector / attribute pair.
///
/// With both set, the attribute of the first match is read; with only a
/// selector, the matched text; with only an attribute, the scope element's
/// own attribute. A fully unset pair resolves to an empty value without
/// being reported as a miss. In JSON mode the selector doubles as the
/// record key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSelector {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attr: Option<String>,
}

impl FieldSelector {
    /// Select elements and take their text.
    pub fn text(selector: &str) -> Self {
        Self {
            selector: Some(selector.to_string()),
            attr: None,
        }
    }

    /// Select elements and read an attribute off the first match.
    pub fn attr(selector: &str, attr: &str) -> Self {
        Self {
            selector: Some(selector.to_string()),
            attr: Some(attr.to_string()),
        }
    }

    /// Read an attribute off the scope element itself.
    pub fn own_attr(attr: &str) -> Self {
        Self {
            selector: None,
            attr: Some(attr.to_string()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.selector.is_some() || self.attr.is_some()
    }

    /// The record key used when fields come from JSON.
    pub fn key(&self) -> Option<&str> {
        self.selector.as_deref()
    }
}

/// Where listing and chapter rows come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ItemSource {
    /// CSS selector matching one element per row.
    Html { selector: String },
    /// JSONPath to an array of records embedded in the page body.
    Json { path: String },
}

/// Where the fields of a single page (detail, content) come from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PageSource {
    #[default]
    Html,
    /// JSONPath whose first record carries the fields.
    Json { path: String },
}

/// How the "next page" signal is read from a fetched page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextPageRule {
    pub selector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attr: Option<String>,
    /// When set, the matched value must equal (or, for chapter-list
    /// sentinels, contain) this literal for the signal to count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl NextPageRule {
    pub(crate) fn field(&self) -> FieldSelector {
        FieldSelector {
            selector: Some(self.selector.clone()),
            attr: self.attr.clone(),
        }
    }
}

/// Selector set for one paged listing (latest, popular or search).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingDescriptor {
    /// Endpoint template relative to the base URL; `{page}` and `{query}`
    /// are substituted at request time.
    pub endpoint: String,
    #[serde(default)]
    pub method: HttpMethod,
    pub items: ItemSource,
    #[serde(default)]
    pub link: FieldSelector,
    #[serde(default)]
    pub name: FieldSelector,
    #[serde(default)]
    pub cover: FieldSelector,
    /// The site emits root-relative hrefs that need the base URL prepended.
    #[serde(default)]
    pub add_base_url_to_link: bool,
    #[serde(default)]
    pub add_base_url_to_cover: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page: Option<NextPageRule>,
    /// Element whose text must be non-empty before a rendered page counts
    /// as loaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ajax_selector: Option<String>,
}

/// Selector set for a book's detail page. Requests resolve the book's own
/// link, so there is no endpoint template here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailDescriptor {
    #[serde(default)]
    pub page: PageSource,
    #[serde(default)]
    pub name: FieldSelector,
    #[serde(default)]
    pub cover: FieldSelector,
    #[serde(default)]
    pub author: FieldSelector,
    #[serde(default)]
    pub description: FieldSelector,
    #[serde(default)]
    pub genres: FieldSelector,
    #[serde(default)]
    pub add_base_url_to_cover: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ajax_selector: Option<String>,
}

/// Selector set for a book's chapter list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChaptersDescriptor {
    #[serde(default)]
    pub method: HttpMethod,
    pub items: ItemSource,
    #[serde(default)]
    pub link: FieldSelector,
    #[serde(default)]
    pub name: FieldSelector,
    #[serde(default)]
    pub add_base_url_to_link: bool,
    /// The site lists the newest chapter first; the engine reverses so
    /// returned chapters always read in ascending order.
    #[serde(default)]
    pub newest_first: bool,
    /// Page-parameterized endpoint spliced into the book link in place of
    /// `page_suffix`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_suffix: Option<String>,
    /// Fixed path appended to the book link when no paged endpoint applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_suffix: Option<String>,
    /// The chapter list paginates through in-page "next" links rather than
    /// page-number substitution.
    #[serde(default)]
    pub supports_next_page_list: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page: Option<NextPageRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ajax_selector: Option<String>,
}

/// Selector set for a chapter's reader page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentDescriptor {
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default)]
    pub page: PageSource,
    #[serde(default)]
    pub title: FieldSelector,
    #[serde(default)]
    pub paragraphs: FieldSelector,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ajax_selector: Option<String>,
}

/// A complete declarative description of one website.
///
/// Capabilities are derived from which operation descriptors are present;
/// an absent descriptor means the operation is unsupported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub id: i64,
    pub name: String,
    /// Scheme and host with no trailing slash, e.g. `https://example.com`.
    pub base_url: String,
    pub lang: String,
    #[serde(default)]
    pub creator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest: Option<ListingDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popular: Option<ListingDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<ListingDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<DetailDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapters: Option<ChaptersDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ContentDescriptor>,
}

impl SourceDescriptor {
    pub fn supports_latest(&self) -> bool {
        self.latest.is_some()
    }

    pub fn supports_popular(&self) -> bool {
        self.popular.is_some()
    }

    pub fn supports_search(&self) -> bool {
        self.search.is_some()
    }

    /// The listing descriptor behind a listing operation, `None` for
    /// non-listing kinds or unconfigured listings.
    pub fn listing(&self, op: OperationKind) -> Option<&ListingDescriptor> {
        match op {
            OperationKind::Latest => self.latest.as_ref(),
            OperationKind::Popular => self.popular.as_ref(),
            OperationKind::Search => self.search.as_ref(),
            _ => None,
        }
    }
}
