use thiserror::Error;

use crate::descriptor::OperationKind;
use crate::render::RenderError;

/// Errors surfaced by source operations.
///
/// Extraction problems are deliberately not represented here: a selector that
/// matches nothing degrades to an empty value and is recorded in the page's
/// `ExtractReport` instead of failing the whole operation.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The descriptor carries no configuration for the requested operation.
    #[error("source `{source_name}` does not support {operation}")]
    UnsupportedOperation {
        source_name: String,
        operation: OperationKind,
    },

    /// Transport-level failure: connect, timeout, or body read.
    #[error("network error fetching {url}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-success status from a static fetch. Triggers the rendering
    /// fallback internally; only surfaces when no fallback is possible.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus { status: u16, url: String },

    /// An anti-bot interstitial was detected in the response body.
    #[error("anti-bot challenge page at {url}")]
    Challenge { url: String },

    /// The rendering fallback itself failed; this is the terminal error for
    /// a page that could not be fetched statically either.
    #[error("render fallback failed for {url}")]
    Render {
        url: String,
        #[source]
        source: RenderError,
    },

    /// Building the underlying HTTP client failed.
    #[error("failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),
}
