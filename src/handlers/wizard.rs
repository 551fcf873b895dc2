use async_trait::async_trait;
use tracing::debug;

use crate::driver::PageDriver;
use crate::error::FillError;
use crate::events::EventSink;
use crate::handler::{read_confirmation, PlatformHandler};
use crate::mapping::{
    map_education, map_experience_level, map_referral_source, map_skill, PlatformId,
};
use crate::options::RunContext;
use crate::profile::CandidateProfile;
use crate::retry::with_retry;
use crate::section::SectionController;

const CONTINUE: &str = "#wizard-continue";
const SUBMIT: &str = "#submit-application";
const CONFIRMATION: &str = "#confirmation-token";

const SCHOOL_INPUT: &str = "#school-search";
const SUGGESTIONS_OPEN: &str = "#school-suggestions.open";
const SUGGESTION_ITEMS: &str = "#school-suggestions .suggestion-item";

const WORK_AUTH: &str = "#work-auth";
const VISA_CONTAINER: &str = "#visa-question";
const VISA_CHECKBOX: &str = "#requires-visa";

const REFERRAL: &str = "#referral-source";
const REFERRAL_DETAIL: &str = "#referral-detail";

fn step_marker(n: u8) -> String {
    format!(".wizard-step[data-step='{}'].is-active", n)
}

/// Handler for the four-step wizard form. Steps are navigated in order
/// (contact, background, skills/authorization, review); each one is gated on
/// its section controller before any field is touched.
pub struct WizardHandler;

impl WizardHandler {
    pub fn new() -> Self {
        Self
    }

    /// Drive the asynchronous school lookup: issue the query, wait for the
    /// results container to open, then prefer an exact (case-insensitive)
    /// match and otherwise take the first non-placeholder row. The whole
    /// sequence is retried under the suggestion policy because the backend
    /// can legitimately answer empty before it answers populated; exhausting
    /// that budget with nothing usable is a structural mismatch.
    async fn pick_school(
        &self,
        page: &dyn PageDriver,
        ctx: &RunContext,
        school: &str,
    ) -> Result<(), FillError> {
        let pacing = &ctx.pacing;
        let sink: &dyn EventSink = ctx.sink.as_ref();
        let timeout = ctx.options.per_phase_timeout;

        let outcome = with_retry(
            "school suggestions",
            &ctx.options.suggestion_policy(),
            || async move {
                pacing.type_into(page, SCHOOL_INPUT, school).await?;
                page.wait_for(SUGGESTIONS_OPEN, true, timeout).await?;

                let texts = page.all_inner_texts(SUGGESTION_ITEMS).await?;
                let usable: Vec<(usize, &str)> = texts
                    .iter()
                    .map(|t| t.trim())
                    .enumerate()
                    .filter(|(_, t)| !t.is_empty() && !t.eq_ignore_ascii_case("no results"))
                    .collect();
                if usable.is_empty() {
                    return Err(FillError::NoSuggestions {
                        query: school.to_string(),
                    });
                }

                let exact = usable
                    .iter()
                    .find(|(_, t)| t.eq_ignore_ascii_case(school.trim()))
                    .copied();
                let (index, text) = match exact {
                    Some(hit) => hit,
                    None => {
                        let first = usable[0];
                        sink.emit(&format!(
                            "school '{}': no exact suggestion, falling back to '{}'",
                            school, first.1
                        ));
                        first
                    }
                };
                debug!(school, chosen = text, "selecting school suggestion");
                pacing
                    .hover_then_click(
                        page,
                        &format!(
                            "#school-suggestions .suggestion-item:nth-child({})",
                            index + 1
                        ),
                    )
                    .await?;
                Ok(())
            },
        )
        .await;

        match outcome {
            Ok(()) => Ok(()),
            // Exhausted with nothing but empty result sets: the lookup itself
            // is broken for this target, not merely slow.
            Err(FillError::RetryExhausted { attempts, source, .. })
                if matches!(*source, FillError::NoSuggestions { .. }) =>
            {
                Err(FillError::StructuralMismatch {
                    place: "school suggestions",
                    detail: format!(
                        "no usable suggestions for '{}' after {} attempt(s)",
                        school, attempts
                    ),
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Dependent reveal: the work-authorization checkbox controls whether the
    /// visa question is rendered at all. When the controlling boolean is
    /// false the dependent field is skipped outright and no wait is issued for
    /// its container.
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
        let mapped = map_referral_source(PlatformId::StepWizard, &profile.referral_source);
        ctx.pacing.pause(80, 200).await;
        page.select_option(REFERRAL, mapped.value).await?;
        page.dispatch(REFERRAL, "change").await?;

        if mapped.is_other {
            // "Other" escape hatch: the free-text detail field gets the
            // original, pre-mapping value.
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
}

#[async_trait]
impl PlatformHandler for WizardHandler {
    fn platform(&self) -> PlatformId {
        PlatformId::StepWizard
    }

    async fn matches(&self, target: &str, page: &dyn PageDriver) -> bool {
        if target.contains("wizard") {
            return true;
        }
        let has_form = page
            .count_matches("form.application-form")
            .await
            .unwrap_or(0)
            > 0;
        let has_marker = page.count_matches("#wizard-progress").await.unwrap_or(0) > 0;
        has_form && has_marker
    }

    async fn fill_form(
        &self,
        page: &dyn PageDriver,
        profile: &CandidateProfile,
        ctx: &RunContext,
    ) -> Result<(), FillError> {
        let pacing = &ctx.pacing;

        // Step 1: contact
        let mut step1 = SectionController::step(1, step_marker(1), CONTINUE);
        step1.ensure_active(page, ctx).await?;
        pacing.type_into(page, "#full-name", &profile.full_name).await?;
        pacing.type_into(page, "#email", &profile.email).await?;
        pacing.type_into(page, "#phone", &profile.phone).await?;
        pacing.type_into(page, "#location", &profile.location).await?;
        if let Some(url) = &profile.linkedin_url {
            pacing.type_into(page, "#linkedin-url", url).await?;
        }

        // Step 2: background
        let mut step2 = SectionController::step(2, step_marker(2), CONTINUE);
        step2.ensure_active(page, ctx).await?;
        let education = map_education(PlatformId::StepWizard, profile.education);
        pacing.pause(80, 200).await;
        page.select_option("#education", education).await?;
        self.pick_school(page, ctx, &profile.school).await?;
        let experience = map_experience_level(PlatformId::StepWizard, profile.experience);
        pacing.pause(80, 200).await;
        page.select_option("#experience", experience).await?;

        // Step 3: skills and authorization
        let mut step3 = SectionController::step(3, step_marker(3), CONTINUE);
        step3.ensure_active(page, ctx).await?;
        for skill in &profile.skills {
            match map_skill(PlatformId::StepWizard, skill) {
                Some(token) => {
                    pacing.pause(60, 160).await;
                    page.set_checked(&format!("#skill-{}", token), true).await?;
                }
                None => ctx.sink.emit(&format!(
                    "skill '{}' has no step-wizard equivalent; omitted",
                    skill
                )),
            }
        }
        self.fill_authorization(page, profile, ctx).await?;

        // Step 4: review and extras
        let mut step4 = SectionController::step(4, step_marker(4), CONTINUE);
        step4.ensure_active(page, ctx).await?;
        self.fill_referral(page, profile, ctx).await?;
        pacing
            .type_into(page, "#cover-letter", &profile.cover_letter)
            .await?;
        page.upload_file("#resume-upload", &ctx.resume_path).await?;

        Ok(())
    }

    async fn submit(&self, page: &dyn PageDriver, ctx: &RunContext) -> Result<String, FillError> {
        ctx.pacing.hover_then_click(page, SUBMIT).await?;
        read_confirmation(page, CONFIRMATION, ctx.options.per_phase_timeout).await
    }
}

impl Default for WizardHandler {
    fn default() -> Self {
        Self::new()
    }
}
