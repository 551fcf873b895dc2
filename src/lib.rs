//! Control layer for filling multi-section web application forms.
//!
//! The page interaction itself is delegated to an external automation
//! collaborator behind [`PageDriver`]; this crate supplies what makes that
//! interaction reliable: per-platform [`PlatformHandler`]s selected by
//! first-match registry lookup, a generic retry/backoff combinator, a
//! section/step state machine that gates every field on its container being
//! interactable, and a seeded pacing engine producing deterministic but
//! humanlike timing.

mod driver;
mod error;
mod events;
mod handler;
mod handlers;
mod mapping;
mod options;
mod pacing;
mod profile;
mod retry;
mod section;

pub use driver::PageDriver;
pub use error::{FillError, PageError};
pub use events::{EventSink, MemorySink, TracingSink};
pub use handler::{handler_registry, select_handler, PlatformHandler};
pub use handlers::{normalize_salary, AccordionHandler, WizardHandler};
pub use mapping::{
    map_education, map_experience_level, map_referral_source, map_skill, other_referral_bucket,
    PlatformId, ReferralMapping,
};
pub use options::{ApplicationResult, ArtifactOptions, RunContext, RuntimeOptions};
pub use pacing::{PacingEngine, HYBRID_PREFIX, HYBRID_THRESHOLD};
pub use profile::{CandidateProfile, EducationLevel, ExperienceBand};
pub use retry::{with_retry, RetryPolicy};
pub use section::{SectionController, SectionId};
