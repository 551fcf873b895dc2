use async_trait::async_trait;
use tracing::debug;

use crate::driver::PageDriver;
use crate::error::FillError;
use crate::handler::{read_confirmation, PlatformHandler};
use crate::mapping::{
    map_education, map_experience_level, map_referral_source, map_skill, PlatformId,
};
use crate::options::RunContext;
use crate::profile::CandidateProfile;
use crate::retry::with_retry;
use crate::section::SectionController;

const SUBMIT: &str = "#acc-submit";
const CONFIRMATION: &str = "#acc-confirmation-code";

const WORK_AUTH: &str = "#acc-work-auth";
const VISA_CONTAINER: &str = "#acc-visa-wrap";
const VISA_CHECKBOX: &str = "#acc-visa";

const REFERRAL: &str = "#acc-referral";
const REFERRAL_DETAIL: &str = "#acc-referral-detail";

const SALARY_SLIDER: &str = "#acc-salary";

/// Slider value used when the profile's expectation is absent or unparsable.
pub const SALARY_BASELINE: u32 = 60_000;
const SALARY_MIN: u32 = 30_000;
const SALARY_MAX: u32 = 250_000;
const SALARY_STEP: u32 = 5_000;

/// Normalize a requested salary into a value the slider can represent:
/// parse as an integer (baseline on failure), clamp to the slider range,
/// round to the nearest step.
pub fn normalize_salary(raw: &str) -> u32 {
    let parsed = raw
        .trim()
        .parse::<i64>()
        .unwrap_or(i64::from(SALARY_BASELINE));
    let clamped = parsed.clamp(i64::from(SALARY_MIN), i64::from(SALARY_MAX)) as u32;
    let stepped = ((clamped + SALARY_STEP / 2) / SALARY_STEP) * SALARY_STEP;
    stepped.clamp(SALARY_MIN, SALARY_MAX)
}

fn region_marker(name: &str) -> String {
    format!("section[data-region='{}'].open", name)
}

fn region_toggle(name: &str) -> String {
    format!("#acc-toggle-{}", name)
}

/// Handler for the single-page accordion form. Regions are disclosure
/// panels (contact, background, preferences, attachments), opened in order
/// through their section controllers.
pub struct AccordionHandler;

impl AccordionHandler {
    pub fn new() -> Self {
        Self
    }

    fn section(name: &'static str) -> SectionController {
        SectionController::named(name, region_marker(name), region_toggle(name))
    }

    async fn fill_authorization(
        &self,
        page: &dyn PageDriver,
        profile: &CandidateProfile,
        ctx: &RunContext,
    ) -> Result<(), FillError> {
        ctx.pacing.pause(80, 200).await;
        page.set_checked(WORK_AUTH, profile.work_authorized).await?;
        page.dispatch(WORK_AUTH, "change").await?;

        if !profile.work_authorized {
            ctx.sink.emit(&format!(
                "skipped dependent field '{}': work-authorized is false",
                VISA_CHECKBOX
            ));
            return Ok(());
        }

        let timeout = ctx.options.per_phase_timeout;
        let requires_visa = profile.requires_visa;
        with_retry("visa sponsorship", &ctx.options.field_policy(), || {
            async move {
                page.wait_for(VISA_CONTAINER, true, timeout).await?;
                page.set_checked(VISA_CHECKBOX, requires_visa).await?;
                Ok(())
            }
        })
        .await
    }

    async fn fill_referral(
        &self,
        page: &dyn PageDriver,
        profile: &CandidateProfile,
        ctx: &RunContext,
    ) -> Result<(), FillError> {
        let mapped = map_referral_source(PlatformId::Accordion, &profile.referral_source);
        ctx.pacing.pause(80, 200).await;
        page.select_option(REFERRAL, mapped.value).await?;
        page.dispatch(REFERRAL, "change").await?;

        if mapped.is_other {
            page.wait_for(REFERRAL_DETAIL, true, ctx.options.per_phase_timeout)
                .await?;
            ctx.pacing
                .type_into(page, REFERRAL_DETAIL, &profile.referral_source)
                .await?;
            ctx.sink.emit(&format!(
                "referral source '{}' mapped to '{}'; detail filled with original value",
                profile.referral_source, mapped.value
            ));
        }
        Ok(())
    }

    /// Set the compensation slider. The value is injected directly (sliders
    /// are not typed into) and input/change are dispatched so the form's
    /// reactive logic observes it.
    async fn fill_salary(
        &self,
        page: &dyn PageDriver,
        profile: &CandidateProfile,
        ctx: &RunContext,
    ) -> Result<(), FillError> {
        let requested = profile.salary_expectation.as_deref().unwrap_or("");
        let value = normalize_salary(requested);
        debug!(requested, value, "setting salary slider");
        ctx.pacing.scroll_into_view(page, SALARY_SLIDER).await?;
        ctx.pacing.pause(80, 200).await;
        page.inject_value(SALARY_SLIDER, &value.to_string()).await?;
        page.dispatch(SALARY_SLIDER, "input").await?;
        page.dispatch(SALARY_SLIDER, "change").await?;
        Ok(())
    }
}

#[async_trait]
impl PlatformHandler for AccordionHandler {
    fn platform(&self) -> PlatformId {
        PlatformId::Accordion
    }

    async fn matches(&self, target: &str, page: &dyn PageDriver) -> bool {
        if target.contains("accordion") {
            return true;
        }
        let has_form = page.count_matches("form#app-form").await.unwrap_or(0) > 0;
        let has_marker = page
            .count_matches("section[data-region]")
            .await
            .unwrap_or(0)
            > 0;
        has_form && has_marker
    }

    async fn fill_form(
        &self,
        page: &dyn PageDriver,
        profile: &CandidateProfile,
        ctx: &RunContext,
    ) -> Result<(), FillError> {
        let pacing = &ctx.pacing;

        let mut contact = Self::section("contact");
        contact.ensure_active(page, ctx).await?;
        pacing.type_into(page, "#acc-name", &profile.full_name).await?;
        pacing.type_into(page, "#acc-email", &profile.email).await?;
        pacing.type_into(page, "#acc-phone", &profile.phone).await?;
        pacing.type_into(page, "#acc-location", &profile.location).await?;
        if let Some(url) = &profile.linkedin_url {
            pacing.type_into(page, "#acc-linkedin", url).await?;
        }
        if let Some(url) = &profile.portfolio_url {
            pacing.type_into(page, "#acc-portfolio", url).await?;
        }

        let mut background = Self::section("background");
        background.ensure_active(page, ctx).await?;
        let education = map_education(PlatformId::Accordion, profile.education);
        pacing.pause(80, 200).await;
        page.select_option("#acc-education", education).await?;
        pacing.type_into(page, "#acc-school", &profile.school).await?;
        let experience = map_experience_level(PlatformId::Accordion, profile.experience);
        pacing.pause(80, 200).await;
        page.select_option("#acc-experience", experience).await?;
        self.fill_referral(page, profile, ctx).await?;

        let mut preferences = Self::section("preferences");
        preferences.ensure_active(page, ctx).await?;
        self.fill_salary(page, profile, ctx).await?;
        for skill in &profile.skills {
            match map_skill(PlatformId::Accordion, skill) {
                Some(token) => {
                    pacing.pause(60, 160).await;
                    page.set_checked(&format!("#acc-skill-{}", token), true)
                        .await?;
                }
                None => ctx.sink.emit(&format!(
                    "skill '{}' has no accordion equivalent; omitted",
                    skill
                )),
            }
        }
        self.fill_authorization(page, profile, ctx).await?;

        let mut attachments = Self::section("attachments");
        attachments.ensure_active(page, ctx).await?;
        pacing
            .type_into(page, "#acc-cover-letter", &profile.cover_letter)
            .await?;
        page.upload_file("#acc-resume", &ctx.resume_path).await?;

        Ok(())
    }

    async fn submit(&self, page: &dyn PageDriver, ctx: &RunContext) -> Result<String, FillError> {
        ctx.pacing.hover_then_click(page, SUBMIT).await?;
        read_confirmation(page, CONFIRMATION, ctx.options.per_phase_timeout).await
    }
}

impl Default for AccordionHandler {
    fn default() -> Self {
        Self::new()
    }
}
