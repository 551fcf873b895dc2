use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::error::FillError;
use crate::events::EventSink;
use crate::mapping::PlatformId;
use crate::pacing::PacingEngine;
use crate::retry::RetryPolicy;

/// Where per-target failure artifacts (screenshot, trace) should go, if the
/// orchestrator captures any. The core only threads this through; it never
/// touches the file system itself.
#[derive(Debug, Clone)]
pub struct ArtifactOptions {
    pub enabled: bool,
    pub dir: PathBuf,
}

impl Default for ArtifactOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: PathBuf::from("artifacts"),
        }
    }
}

/// Per-run configuration, constructed once by the orchestrator and passed by
/// reference through the handler context. Never mutated after construction
/// and never read from ambient global state.
#[derive(Debug, Clone)]
pub struct RuntimeOptions {
    pub enable_retries: bool,
    /// Bound for every "wait for a DOM condition" call.
    pub per_phase_timeout: Duration,
    pub artifacts: ArtifactOptions,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            enable_retries: true,
            per_phase_timeout: Duration::from_secs(5),
            artifacts: ArtifactOptions::default(),
        }
    }
}

impl RuntimeOptions {
    fn attempts(&self, when_enabled: u32) -> u32 {
        if self.enable_retries {
            when_enabled
        } else {
            1
        }
    }

    /// Policy for in-section field interactions.
    pub fn field_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.attempts(3), Duration::from_millis(150), 2.0)
            .retry_if(FillError::is_retryable)
    }

    /// Dedicated policy for section/step activation, distinct from the
    /// field policy because activation absorbs animations and navigation.
    pub fn section_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.attempts(4), Duration::from_millis(250), 1.5)
            .retry_if(FillError::is_retryable)
    }

    /// Policy for the asynchronous suggestion lookup, retried as a whole
    /// (query re-issued) because the result set can arrive empty first.
    pub fn suggestion_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.attempts(3), Duration::from_millis(400), 2.0)
            .retry_if(FillError::is_retryable)
    }
}

/// Everything a handler receives from its orchestrator besides the page and
/// the profile. Constructed per target; the pacing engine inside is that
/// target's exclusively-owned generator.
pub struct RunContext {
    pub resume_path: PathBuf,
    pub sink: Arc<dyn EventSink>,
    pub pacing: PacingEngine,
    pub options: RuntimeOptions,
}

impl RunContext {
    pub fn new(
        resume_path: PathBuf,
        sink: Arc<dyn EventSink>,
        pacing: PacingEngine,
        options: RuntimeOptions,
    ) -> Self {
        Self {
            resume_path,
            sink,
            pacing,
            options,
        }
    }
}

/// Terminal per-target outcome handed back to the orchestrator. Created once,
/// never mutated after return.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationResult {
    pub platform: PlatformId,
    pub success: bool,
    /// Confirmation token on success, classified error text on failure.
    pub message: String,
    pub elapsed: Duration,
    pub artifact: Option<PathBuf>,
}

impl ApplicationResult {
    pub fn succeeded(platform: PlatformId, confirmation: String, elapsed: Duration) -> Self {
        Self {
            platform,
            success: true,
            message: confirmation,
            elapsed,
            artifact: None,
        }
    }

    pub fn failed(
        platform: PlatformId,
        error: &FillError,
        elapsed: Duration,
        artifact: Option<PathBuf>,
    ) -> Self {
        Self {
            platform,
            success: false,
            message: error.to_string(),
            elapsed,
            artifact,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e))
    }
}
