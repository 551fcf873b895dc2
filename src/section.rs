use tracing::debug;

use crate::driver::PageDriver;
use crate::error::FillError;
use crate::options::RunContext;
use crate::retry::with_retry;

/// Identifier of one step or disclosure region. Opaque to the retry and
/// pacing layers; only the owning controller knows what it means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionId {
    /// Ordinal wizard step (1-based).
    Step(u8),
    /// Named accordion region.
    Named(&'static str),
}

impl std::fmt::Display for SectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SectionId::Step(n) => write!(f, "step {}", n),
            SectionId::Named(name) => write!(f, "section '{}'", name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionState {
    Unknown,
    Inactive,
    Active,
}

/// State machine guarding one section: "don't touch fields until the
/// container is verifiably interactable".
///
/// Step wizards activate by navigation (a continue control), accordions by
/// disclosure (a header toggle); structurally different, same contract. The
/// controller probes the active marker first, clicks the toggle at most once
/// per attempt when the marker is absent, and waits for the marker under the
/// dedicated section-transition retry policy.
pub struct SectionController {
    id: SectionId,
    /// Selector that matches only while the section is active/open.
    marker: String,
    /// Control that activates the section (continue button, header toggle).
    toggle: String,
    state: SectionState,
}

impl SectionController {
    pub fn step(n: u8, marker: impl Into<String>, toggle: impl Into<String>) -> Self {
        Self::new(SectionId::Step(n), marker, toggle)
    }

    pub fn named(
        name: &'static str,
        marker: impl Into<String>,
        toggle: impl Into<String>,
    ) -> Self {
        Self::new(SectionId::Named(name), marker, toggle)
    }

    fn new(id: SectionId, marker: impl Into<String>, toggle: impl Into<String>) -> Self {
        Self {
            id,
            marker: marker.into(),
            toggle: toggle.into(),
            state: SectionState::Unknown,
        }
    }

    pub fn id(&self) -> &SectionId {
        &self.id
    }

    /// Make the section active, or fail with `SectionNotActivated`.
    ///
    /// Idempotent: once the controller has observed the active marker,
    /// whether from an earlier call or because the page is already there,
    /// no further toggle click is issued.
    pub async fn ensure_active(
        &mut self,
        page: &dyn PageDriver,
        ctx: &RunContext,
    ) -> Result<(), FillError> {
        if self.state == SectionState::Active {
            return Ok(());
        }

        if page.count_matches(&self.marker).await? > 0 {
            debug!(section = %self.id, "section already active, no toggle needed");
            self.state = SectionState::Active;
            return Ok(());
        }
        self.state = SectionState::Inactive;

        let marker = self.marker.as_str();
        let toggle = self.toggle.as_str();
        let pacing = &ctx.pacing;
        let timeout = ctx.options.per_phase_timeout;
        let scope = format!("activate {}", self.id);

        let outcome = with_retry(&scope, &ctx.options.section_policy(), || async move {
            pacing.hover_then_click(page, toggle).await?;
            page.wait_for(marker, true, timeout).await?;
            Ok(())
        })
        .await;

        match outcome {
            Ok(()) => {
                debug!(section = %self.id, "section activated");
                self.state = SectionState::Active;
                Ok(())
            }
            Err(err) => Err(FillError::SectionNotActivated {
                section: self.id.to_string(),
                source: Box::new(err),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_ids_render_for_scope_labels() {
        assert_eq!(SectionId::Step(2).to_string(), "step 2");
        assert_eq!(SectionId::Named("contact").to_string(), "section 'contact'");
    }
}
