use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::PageError;

/// The page-automation collaborator, seen from the control layer.
///
/// Everything the handlers do to a rendered form goes through this trait;
/// the crate makes no assumption about how elements are located beyond
/// accepting an opaque selector string. Implementations are expected to be
/// cheap to call repeatedly; the retry and section layers probe liberally.
///
/// All methods take `&self`: a page session is interacted with sequentially
/// (one coroutine at a time), so implementations can keep interior state
/// behind a lock without the trait forcing `&mut` through every caller.
#[async_trait]
pub trait PageDriver: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<(), PageError>;

    async fn current_url(&self) -> Result<String, PageError>;

    /// Replace the element's value wholesale. Pacing-free path; the pacing
    /// engine builds its keystroke model from `clear_value`/`append_text`.
    async fn set_value(&self, selector: &str, value: &str) -> Result<(), PageError>;

    async fn clear_value(&self, selector: &str) -> Result<(), PageError>;

    /// Append text to the element's current value, as typing would.
    async fn append_text(&self, selector: &str, text: &str) -> Result<(), PageError>;

    async fn click(&self, selector: &str) -> Result<(), PageError>;

    async fn hover(&self, selector: &str) -> Result<(), PageError>;

    async fn scroll_into_view(&self, selector: &str) -> Result<(), PageError>;

    async fn set_checked(&self, selector: &str, checked: bool) -> Result<(), PageError>;

    async fn select_option(&self, selector: &str, value: &str) -> Result<(), PageError>;

    /// `Ok(None)` when the element exists but carries no such attribute.
    async fn read_attribute(
        &self,
        selector: &str,
        name: &str,
    ) -> Result<Option<String>, PageError>;

    async fn inner_text(&self, selector: &str) -> Result<String, PageError>;

    /// Text of every element matching the selector, in document order.
    /// Empty vec when nothing matches.
    async fn all_inner_texts(&self, selector: &str) -> Result<Vec<String>, PageError>;

    async fn count_matches(&self, selector: &str) -> Result<usize, PageError>;

    /// Wait for the selector to match (and, if `visible`, be rendered) within
    /// `timeout`. Exceeding the timeout is a normal, classifiable failure
    /// (`PageError::WaitTimeout`), not a crash.
    async fn wait_for(
        &self,
        selector: &str,
        visible: bool,
        timeout: Duration,
    ) -> Result<(), PageError>;

    async fn upload_file(&self, selector: &str, path: &Path) -> Result<(), PageError>;

    /// Inject a value directly into the element, bypassing keystroke
    /// semantics. Used for widgets whose value is not typed (sliders).
    async fn inject_value(&self, selector: &str, value: &str) -> Result<(), PageError>;

    /// Fire a DOM event (e.g. "input", "change") so the form's reactive
    /// logic observes a value that was injected or bulk-inserted.
    async fn dispatch(&self, selector: &str, event: &str) -> Result<(), PageError>;
}
