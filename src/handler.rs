use std::time::Duration;

use async_trait::async_trait;

use crate::driver::PageDriver;
use crate::error::FillError;
use crate::handlers::{AccordionHandler, WizardHandler};
use crate::mapping::PlatformId;
use crate::options::RunContext;
use crate::profile::CandidateProfile;

/// Strategy interface for one target form variant.
///
/// Handlers are selected by ordered first-match lookup over the static
/// registry, a closed set that is extended by adding a variant, not by
/// reflection. `fill_form` and `submit` are the two-phase contract the
/// orchestrator drives; errors from the section controller or retry engine
/// propagate out of them unswallowed.
#[async_trait]
pub trait PlatformHandler: Send + Sync {
    fn platform(&self) -> PlatformId;

    /// Whether this handler applies to the target. Checks the URL pattern
    /// first and falls back to a DOM-structure probe, so selection stays
    /// robust when the identifying URL is unavailable. Never fails: a probe
    /// error just means "not this handler".
    async fn matches(&self, target: &str, page: &dyn PageDriver) -> bool;

    /// Fill every section in the target's structural order. Touches no field
    /// before its section controller reports active.
    async fn fill_form(
        &self,
        page: &dyn PageDriver,
        profile: &CandidateProfile,
        ctx: &RunContext,
    ) -> Result<(), FillError>;

    /// Perform submission and return the confirmation token read verbatim
    /// from the page. Fails with `ConfirmationMissing` when the
    /// post-submission marker never appears.
    async fn submit(&self, page: &dyn PageDriver, ctx: &RunContext) -> Result<String, FillError>;
}

/// The closed handler set, in match-priority order.
pub fn handler_registry() -> Vec<Box<dyn PlatformHandler>> {
    vec![
        Box::new(WizardHandler::new()),
        Box::new(AccordionHandler::new()),
    ]
}

/// First handler whose `matches` accepts the target, if any.
pub async fn select_handler(
    target: &str,
    page: &dyn PageDriver,
) -> Option<Box<dyn PlatformHandler>> {
    for handler in handler_registry() {
        if handler.matches(target, page).await {
            return Some(handler);
        }
    }
    None
}

/// Shared post-submission step: wait for the confirmation marker and read
/// its text. Absence of the marker (or an empty token) is a submission
/// failure, deliberately distinct from pre-submission timing errors.
pub(crate) async fn read_confirmation(
    page: &dyn PageDriver,
    selector: &str,
    timeout: Duration,
) -> Result<String, FillError> {
    if page.wait_for(selector, true, timeout).await.is_err() {
        return Err(FillError::ConfirmationMissing {
            selector: selector.to_string(),
        });
    }
    let token = page.inner_text(selector).await?.trim().to_string();
    if token.is_empty() {
        return Err(FillError::ConfirmationMissing {
            selector: selector.to_string(),
        });
    }
    Ok(token)
}
