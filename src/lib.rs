//! Declarative scraping engine for novel-hosting websites.
//!
//! A site is described by a [`SourceDescriptor`]: endpoint templates, CSS
//! selector/attribute pairs, JSONPath expressions and a few flags. The
//! [`WebSource`] engine executes the six catalog operations (latest,
//! popular, search, details, chapters, content) for any site described
//! that way, falling back to a headless browser render when the static
//! fetch is blocked or incomplete.

pub mod catalog;
pub mod config;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod extract;
pub mod http;
pub mod models;
pub mod pagination;
pub mod render;
pub mod request;

mod normalize;

pub use config::{EngineConfig, HttpConfig, RenderConfig};
pub use descriptor::{
    ChaptersDescriptor, ContentDescriptor, DetailDescriptor, FieldSelector, HttpMethod,
    ItemSource, ListingDescriptor, NextPageRule, OperationKind, PageSource, SourceDescriptor,
};
pub use engine::WebSource;
pub use error::SourceError;
pub use extract::{ExtractReport, FieldMiss, MissReason};
pub use http::{FetchedPage, HttpClient, Transport};
pub use models::{Book, BookPage, BooksPage, Chapter, ChaptersPage, ContentPage, Filter};
pub use pagination::{ChapterSession, PageToken};
pub use render::{ChromeRenderer, RenderError, Renderer};
