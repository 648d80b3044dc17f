//! The fetch orchestrator. One generic pipeline serves all six operations:
//! build a request from the descriptor, fetch it statically, fail over to
//! the renderer once when the static path cannot produce a usable page,
//! then parse through the extractor/normalizer for the operation's shape.

use std::sync::Arc;

use scraper::Html;
use serde_json::{Map, Value};

use crate::config::EngineConfig;
use crate::descriptor::{ItemSource, OperationKind, PageSource, SourceDescriptor};
use crate::error::SourceError;
use crate::extract::{self, ExtractReport};
use crate::http::{HttpClient, Transport};
use crate::models::{Book, BookPage, BooksPage, Chapter, ChaptersPage, ContentPage, Filter};
use crate::normalize;
use crate::pagination::{self, PageToken};
use crate::render::{ChromeRenderer, Renderer};
use crate::request::{self, PageRequest};

/// Markers of anti-bot interstitials. Their presence in an otherwise
/// successful response fails the static fetch over to the renderer.
const CHALLENGE_MARKERS: &[&str] = &[
    "Just a moment",
    "Checking your browser",
    "cf-browser-verification",
    "challenge-form",
    "cf-chl",
];

pub(crate) fn has_challenge_markers(body: &str) -> bool {
    CHALLENGE_MARKERS.iter().any(|marker| body.contains(marker))
}

fn json_rows(doc: &Html, path: &str, report: &mut ExtractReport) -> Vec<Map<String, Value>> {
    let value = match extract::embedded_json(doc) {
        Ok(value) => value,
        Err(reason) => {
            report.record("items", reason);
            return Vec::new();
        }
    };
    match extract::json_records(&value, path) {
        Ok(rows) => rows,
        Err(reason) => {
            report.record("items", reason);
            Vec::new()
        }
    }
}

/// A configured website, executed entirely from its descriptor.
pub struct WebSource {
    descriptor: SourceDescriptor,
    user_agent: String,
    transport: Arc<dyn Transport>,
    renderer: Arc<dyn Renderer>,
}

impl WebSource {
    /// Production wiring: shared reqwest client plus a lazy headless-Chrome
    /// renderer.
    pub fn new(descriptor: SourceDescriptor, config: &EngineConfig) -> Result<Self, SourceError> {
        let transport = Arc::new(HttpClient::new(&config.http)?);
        let renderer = Arc::new(ChromeRenderer::new(
            config.render.clone(),
            config.user_agent.clone(),
        ));
        Ok(Self::with_parts(
            descriptor,
            config.user_agent.clone(),
            transport,
            renderer,
        ))
    }

    /// Wiring seam for tests and embedders with their own transport or
    /// renderer.
    pub fn with_parts(
        descriptor: SourceDescriptor,
        user_agent: String,
        transport: Arc<dyn Transport>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        Self {
            descriptor,
            user_agent,
            transport,
            renderer,
        }
    }

    pub fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }

    pub fn id(&self) -> i64 {
        self.descriptor.id
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub async fn get_popular(&self, page: u32) -> Result<BooksPage, SourceError> {
        self.browse(OperationKind::Popular, page, "").await
    }

    pub async fn get_latest(&self, page: u32) -> Result<BooksPage, SourceError> {
        self.browse(OperationKind::Latest, page, "").await
    }

    /// Search. An empty `query` falls back to a title filter, when given.
    pub async fn get_search(
        &self,
        page: u32,
        query: &str,
        filters: &[Filter],
    ) -> Result<BooksPage, SourceError> {
        let query = if query.is_empty() {
            filters
                .iter()
                .find_map(|f| match f {
                    Filter::Title(title) => Some(title.as_str()),
                })
                .unwrap_or("")
        } else {
            query
        };
        self.browse(OperationKind::Search, page, query).await
    }

    /// Fetch and parse a book's detail page. The input book's link is
    /// preserved on the result.
    pub async fn get_details(&self, book: &Book) -> Result<BookPage, SourceError> {
        let desc = self
            .descriptor
            .detail
            .as_ref()
            .ok_or_else(|| self.unsupported(OperationKind::Detail))?;
        let request =
            request::detail_request(&self.descriptor.base_url, &self.user_agent, &book.link);
        let doc = self
            .fetch_document(&request, desc.ajax_selector.as_deref())
            .await?;
        let mut report = ExtractReport::default();
        let link = request.url.clone();
        let book = match &desc.page {
            PageSource::Html => normalize::detail_book_from_doc(
                desc,
                &self.descriptor.base_url,
                self.descriptor.id,
                &link,
                &doc,
                &mut report,
            ),
            PageSource::Json { path } => {
                let rows = json_rows(&doc, path, &mut report);
                match rows.first() {
                    Some(record) => normalize::detail_book_from_record(
                        desc,
                        &self.descriptor.base_url,
                        self.descriptor.id,
                        &link,
                        record,
                        &mut report,
                    ),
                    None => Book {
                        link,
                        source_id: self.descriptor.id,
                        ..Book::default()
                    },
                }
            }
        };
        self.log_report(OperationKind::Detail, &report);
        Ok(BookPage { book, report })
    }

    /// Fetch one slice of a book's chapter list. `token` is the
    /// continuation returned by the previous slice, if any; without one the
    /// URL is derived from the descriptor's pagination fallbacks and
    /// `page`.
    pub async fn fetch_chapters(
        &self,
        book: &Book,
        page: u32,
        token: Option<&PageToken>,
    ) -> Result<ChaptersPage, SourceError> {
        let desc = self
            .descriptor
            .chapters
            .as_ref()
            .ok_or_else(|| self.unsupported(OperationKind::Chapters))?;
        let request = request::chapters_request(
            &self.descriptor.base_url,
            &self.user_agent,
            desc,
            &book.link,
            page,
            token,
        );
        let doc = self
            .fetch_document(&request, desc.ajax_selector.as_deref())
            .await?;
        let mut report = ExtractReport::default();
        let chapters: Vec<Chapter> = match &desc.items {
            ItemSource::Html { selector } => {
                let rows = extract::html_rows(&doc, "items", selector, &mut report);
                rows.into_iter()
                    .filter_map(|row| {
                        normalize::chapter_from_element(
                            desc,
                            &self.descriptor.base_url,
                            row,
                            &mut report,
                        )
                    })
                    .collect()
            }
            ItemSource::Json { path } => {
                let rows = json_rows(&doc, path, &mut report);
                rows.iter()
                    .filter_map(|record| {
                        normalize::chapter_from_record(
                            desc,
                            &self.descriptor.base_url,
                            record,
                            &mut report,
                        )
                    })
                    .collect()
            }
        };
        let chapters = normalize::finalize_chapters(chapters, desc.newest_first);
        let outcome = pagination::chapters_outcome(&doc, desc, &self.descriptor.base_url);
        self.log_report(OperationKind::Chapters, &report);
        log::debug!(
            "{}: {} chapters, has_next={}",
            self.descriptor.name,
            chapters.len(),
            outcome.has_next
        );
        Ok(ChaptersPage {
            chapters,
            has_next: outcome.has_next,
            next_token: outcome.continuation,
            report,
        })
    }

    /// Fetch a chapter's body as ordered paragraphs.
    pub async fn get_content(&self, chapter: &Chapter) -> Result<ContentPage, SourceError> {
        let desc = self
            .descriptor
            .content
            .as_ref()
            .ok_or_else(|| self.unsupported(OperationKind::Content))?;
        let request = request::content_request(
            &self.descriptor.base_url,
            &self.user_agent,
            &chapter.link,
            desc.method,
        );
        let doc = self
            .fetch_document(&request, desc.ajax_selector.as_deref())
            .await?;
        let mut report = ExtractReport::default();
        let paragraphs = match &desc.page {
            PageSource::Html => normalize::content_from_doc(desc, &doc, &mut report),
            PageSource::Json { path } => {
                let rows = json_rows(&doc, path, &mut report);
                rows.first()
                    .map(|record| normalize::content_from_record(desc, record, &mut report))
                    .unwrap_or_default()
            }
        };
        self.log_report(OperationKind::Content, &report);
        Ok(ContentPage { paragraphs, report })
    }

    /// Shared listing path behind latest/popular/search.
    async fn browse(
        &self,
        op: OperationKind,
        page: u32,
        query: &str,
    ) -> Result<BooksPage, SourceError> {
        let desc = self
            .descriptor
            .listing(op)
            .ok_or_else(|| self.unsupported(op))?;
        let request = request::listing_request(
            &self.descriptor.base_url,
            &self.user_agent,
            desc,
            page,
            query,
        );
        let doc = self
            .fetch_document(&request, desc.ajax_selector.as_deref())
            .await?;
        let mut report = ExtractReport::default();
        let books: Vec<Book> = match &desc.items {
            ItemSource::Html { selector } => {
                let rows = extract::html_rows(&doc, "items", selector, &mut report);
                rows.into_iter()
                    .filter_map(|row| {
                        normalize::listing_book_from_element(
                            desc,
                            &self.descriptor.base_url,
                            self.descriptor.id,
                            row,
                            &mut report,
                        )
                    })
                    .collect()
            }
            ItemSource::Json { path } => {
                let rows = json_rows(&doc, path, &mut report);
                rows.iter()
                    .filter_map(|record| {
                        normalize::listing_book_from_record(
                            desc,
                            &self.descriptor.base_url,
                            self.descriptor.id,
                            record,
                            &mut report,
                        )
                    })
                    .collect()
            }
        };
        let has_next = pagination::listing_outcome(&doc, desc.next_page.as_ref());
        self.log_report(op, &report);
        log::debug!(
            "{}: {op} page {page} parsed {} books, has_next={has_next}",
            self.descriptor.name,
            books.len()
        );
        Ok(BooksPage {
            books,
            has_next,
            report,
        })
    }

    /// Static fetch first. Transport errors, non-2xx statuses and challenge
    /// interstitials all fail over to exactly one render of the same URL;
    /// a render failure is the operation's error.
    async fn fetch_document(
        &self,
        request: &PageRequest,
        ajax_selector: Option<&str>,
    ) -> Result<Html, SourceError> {
        let static_failure = match self.transport.fetch(request).await {
            Ok(page) if page.is_success() && !has_challenge_markers(&page.body) => {
                return Ok(Html::parse_document(&page.body));
            }
            Ok(page) if !page.is_success() => SourceError::HttpStatus {
                status: page.status,
                url: request.url.clone(),
            },
            Ok(_) => SourceError::Challenge {
                url: request.url.clone(),
            },
            Err(e) => e,
        };
        log::warn!(
            "static fetch of {} failed ({static_failure}), falling back to renderer",
            request.url
        );
        let html = self
            .renderer
            .render(&request.url, ajax_selector)
            .await
            .map_err(|e| SourceError::Render {
                url: request.url.clone(),
                source: e,
            })?;
        Ok(Html::parse_document(&html))
    }

    fn unsupported(&self, operation: OperationKind) -> SourceError {
        SourceError::UnsupportedOperation {
            source_name: self.descriptor.name.clone(),
            operation,
        }
    }

    fn log_report(&self, op: OperationKind, report: &ExtractReport) {
        if !report.is_clean() {
            log::debug!(
                "{}: {op} extraction degraded: {:?}",
                self.descriptor.name,
                report.misses()
            );
        }
    }
}
