use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by the page-automation collaborator.
///
/// The control layer never inspects how the collaborator located (or failed
/// to locate) an element; it only needs enough structure to decide whether a
/// failure is a timing race worth retrying or a structural problem that is
/// not going to heal by waiting.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("no element found for selector '{selector}'")]
    ElementNotFound { selector: String },

    #[error("element '{selector}' did not satisfy {condition} within {waited:?}")]
    WaitTimeout {
        selector: String,
        condition: &'static str,
        waited: Duration,
    },

    #[error("element '{selector}' is not of expected type '{expected}'")]
    ElementType {
        selector: String,
        expected: &'static str,
    },

    #[error("attribute '{attribute}' not found on element '{selector}'")]
    AttributeNotFound { selector: String, attribute: String },

    #[error("page backend error: {0}")]
    Backend(String),
}

/// Errors produced by the form-filling control layer.
///
/// The taxonomy matters more than the messages: `is_retryable` is what the
/// retry policies consult, and the orchestrator classifies a failed target by
/// variant, not by string matching.
#[derive(Debug, Error)]
pub enum FillError {
    #[error("page operation failed: {0}")]
    Page(#[from] PageError),

    /// A section/step never reported its active marker within the transition
    /// policy's budget. Fatal to the current target, not retried upstream.
    #[error("section '{section}' did not activate: {source}")]
    SectionNotActivated {
        section: String,
        #[source]
        source: Box<FillError>,
    },

    /// Terminal wrapper produced by the retry engine: the scope label and
    /// attempt count make the failure diagnosable without a stack trace.
    #[error("'{scope}' failed after {attempts} attempt(s): {source}")]
    RetryExhausted {
        scope: String,
        attempts: u32,
        #[source]
        source: Box<FillError>,
    },

    /// The asynchronous suggestion lookup produced no usable result for this
    /// attempt. Retryable as a whole (the query is re-issued) because the
    /// backend can legitimately answer empty-then-populated.
    #[error("no suggestions returned for query '{query}'")]
    NoSuggestions { query: String },

    /// An option/selector the handler depends on is absent in a way that
    /// indicates a handler/target mismatch rather than a timing race.
    #[error("structural mismatch in {place}: {detail}")]
    StructuralMismatch { place: &'static str, detail: String },

    /// The post-submission confirmation marker never appeared. Kept distinct
    /// from pre-submission timing failures: the submission itself may have
    /// been rejected.
    #[error("no confirmation appeared after submitting via '{selector}'")]
    ConfirmationMissing { selector: String },
}

impl FillError {
    /// Whether a failure is a transient UI-timing problem that a retry
    /// policy may absorb. Everything else short-circuits the retry loop.
    pub fn is_retryable(&self) -> bool {
        match self {
            FillError::Page(PageError::WaitTimeout { .. }) => true,
            FillError::NoSuggestions { .. } => true,
            FillError::Page(_) => false,
            FillError::SectionNotActivated { .. } => false,
            FillError::RetryExhausted { .. } => false,
            FillError::StructuralMismatch { .. } => false,
            FillError::ConfirmationMissing { .. } => false,
        }
    }
}
