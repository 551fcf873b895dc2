//! Static per-platform translation tables from candidate-profile vocabulary
//! to platform option vocabulary.
//!
//! Every lookup is a pure function of `(PlatformId, input)`. Closed domains
//! (education, experience) are total: adding an enum variant without a
//! mapping is a compile error. Open inputs (referral source, skills) degrade
//! instead of erroring: referral falls back to the platform's canonical
//! "other" bucket, unknown skills map to `None` and the caller logs the
//! omission.

use serde::{Deserialize, Serialize};

use crate::profile::{EducationLevel, ExperienceBand};

/// Identifies one target form variant. Exactly two in this system; the
/// handler registry and every mapping table key off it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlatformId {
    /// Multi-page step wizard (ordinal navigation).
    StepWizard,
    /// Single-page accordion (disclosure regions).
    Accordion,
}

impl std::fmt::Display for PlatformId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformId::StepWizard => write!(f, "step-wizard"),
            PlatformId::Accordion => write!(f, "accordion"),
        }
    }
}

/// Result of a referral-source lookup. `is_other` tells the handler to
/// reveal and fill the free-text detail field with the original input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferralMapping {
    pub value: &'static str,
    pub is_other: bool,
}

/// Total over the closed education domain for both platforms.
pub fn map_education(platform: PlatformId, level: EducationLevel) -> &'static str {
    match (platform, level) {
        (PlatformId::StepWizard, EducationLevel::HighSchool) => "high-school",
        (PlatformId::StepWizard, EducationLevel::Associate) => "associate",
        (PlatformId::StepWizard, EducationLevel::Bachelors) => "bachelor",
        (PlatformId::StepWizard, EducationLevel::Masters) => "master",
        (PlatformId::StepWizard, EducationLevel::Doctorate) => "doctorate",
        (PlatformId::Accordion, EducationLevel::HighSchool) => "HS",
        (PlatformId::Accordion, EducationLevel::Associate) => "AA",
        (PlatformId::Accordion, EducationLevel::Bachelors) => "BA",
        (PlatformId::Accordion, EducationLevel::Masters) => "MA",
        (PlatformId::Accordion, EducationLevel::Doctorate) => "PHD",
    }
}

/// Total over the closed experience domain for both platforms.
pub fn map_experience_level(platform: PlatformId, band: ExperienceBand) -> &'static str {
    match (platform, band) {
        (PlatformId::StepWizard, ExperienceBand::UpToOne) => "entry",
        (PlatformId::StepWizard, ExperienceBand::OneToThree) => "junior",
        (PlatformId::StepWizard, ExperienceBand::ThreeToFive) => "mid",
        (PlatformId::StepWizard, ExperienceBand::FiveToTen) => "senior",
        (PlatformId::StepWizard, ExperienceBand::TenPlus) => "principal",
        (PlatformId::Accordion, ExperienceBand::UpToOne) => "lt1",
        (PlatformId::Accordion, ExperienceBand::OneToThree) => "1to3",
        (PlatformId::Accordion, ExperienceBand::ThreeToFive) => "3to5",
        (PlatformId::Accordion, ExperienceBand::FiveToTen) => "5to10",
        (PlatformId::Accordion, ExperienceBand::TenPlus) => "gt10",
    }
}

/// Open free-text input, lowercase-trimmed before lookup. Anything without
/// an entry lands in the platform's canonical "other" bucket.
pub fn map_referral_source(platform: PlatformId, raw: &str) -> ReferralMapping {
    let key = raw.trim().to_lowercase();
    let value = match platform {
        PlatformId::StepWizard => match key.as_str() {
            "linkedin" => Some("linkedin"),
            "indeed" => Some("indeed"),
            "friend" | "referral" | "colleague" => Some("referral"),
            "university" | "career fair" => Some("campus"),
            _ => None,
        },
        PlatformId::Accordion => match key.as_str() {
            "linkedin" => Some("social-linkedin"),
            "indeed" => Some("board-indeed"),
            "friend" | "referral" | "colleague" => Some("employee-referral"),
            "company website" => Some("direct"),
            _ => None,
        },
    };
    match value {
        Some(value) => ReferralMapping {
            value,
            is_other: false,
        },
        None => ReferralMapping {
            value: other_referral_bucket(platform),
            is_other: true,
        },
    }
}

/// The canonical "other" option value per platform.
pub fn other_referral_bucket(platform: PlatformId) -> &'static str {
    match platform {
        PlatformId::StepWizard => "other",
        PlatformId::Accordion => "src-other",
    }
}

/// Alias key: lowercase with every non-alphanumeric character stripped, so
/// "Node.js", "node js" and "NODEJS" collide on purpose.
fn skill_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Open skill token to platform checkbox value. `None` means the platform
/// has no UI equivalent: omit the skill silently, the caller logs it.
pub fn map_skill(platform: PlatformId, raw: &str) -> Option<&'static str> {
    let key = skill_key(raw);
    match platform {
        PlatformId::StepWizard => match key.as_str() {
            "javascript" | "js" => Some("javascript"),
            "typescript" | "ts" => Some("typescript"),
            "python" | "py" => Some("python"),
            "rust" => Some("rust"),
            "sql" => Some("sql"),
            "react" | "reactjs" => Some("react"),
            "node" | "nodejs" => Some("nodejs"),
            _ => None,
        },
        PlatformId::Accordion => match key.as_str() {
            "javascript" | "js" => Some("js"),
            "typescript" | "ts" => Some("ts"),
            "python" | "py" => Some("py"),
            "rust" => Some("rs"),
            "sql" => Some("sql"),
            "go" | "golang" => Some("go"),
            "node" | "nodejs" => Some("node"),
            _ => None,
        },
    }
}
