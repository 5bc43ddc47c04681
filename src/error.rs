// src/error.rs
//! Failure taxonomy for the curation pipeline. The uniform degradation
//! strategy is "fail one item, continue the batch": only `PublishFailure`
//! represents data loss for work already paid for upstream.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A single feed or page was unreachable or malformed. The source
    /// contributes zero items and the run continues.
    #[error("source '{source_name}' failed: {reason}")]
    SourceFailure { source_name: String, reason: String },

    /// The generative call errored or produced output unusable even after
    /// the salvage parse. The item is dropped; it is not retried.
    #[error("transformation failed for '{title}': {reason}")]
    TransformFailure { title: String, reason: String },

    /// One language's translation or synthesis failed. The affected field
    /// degrades to the source text (or "no audio"); the rest of the bundle
    /// is unaffected.
    #[error("localization failed for '{lang}': {reason}")]
    LocalizationFailure { lang: String, reason: String },

    /// A published file could not be written. The only hard error class.
    #[error("publish failed for '{slug}': {reason}")]
    PublishFailure { slug: String, reason: String },
}
