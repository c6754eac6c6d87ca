//! Typed failures for catalog operations.

use thiserror::Error;

/// Failure modes of a single catalog request.
///
/// A 404 never appears here: both fetch paths treat it as an empty result
/// rather than a failure.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The upstream answered with a non-success status other than 404.
    #[error("upstream returned {status}")]
    Upstream {
        /// Status code reported by the upstream service.
        status: reqwest::StatusCode,
    },
    /// Success status, but the body was not the JSON we expected.
    #[error("upstream returned a non-JSON body")]
    MalformedResponse,
    /// Connection-level failure before a usable response arrived.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}
