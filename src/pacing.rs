use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use rand::Rng;
use tracing::debug;

use crate::driver::PageDriver;
use crate::error::PageError;

/// Inter-keystroke delay bands in milliseconds, keyed by character class.
/// Letters come out faster than digits and symbols, which matches how people
/// type prose versus structured tokens.
const ALPHA_KEY_MS: (u64, u64) = (40, 110);
const DIGIT_KEY_MS: (u64, u64) = (70, 160);
const SYMBOL_KEY_MS: (u64, u64) = (90, 200);

/// Dwell between hovering a control and clicking it.
const CLICK_DWELL_MS: (u64, u64) = (120, 350);

/// Above this many characters, `type_into` switches to the hybrid path:
/// a realistic per-keystroke prefix followed by one bulk insert. Tunable
/// realism/runtime trade-off, not an invariant.
pub const HYBRID_THRESHOLD: usize = 120;

/// Number of characters typed individually on the hybrid path.
pub const HYBRID_PREFIX: usize = 24;

fn keystroke_band(ch: char) -> (u64, u64) {
    if ch.is_ascii_alphabetic() {
        ALPHA_KEY_MS
    } else if ch.is_ascii_digit() {
        DIGIT_KEY_MS
    } else {
        SYMBOL_KEY_MS
    }
}

/// Order-dependent byte-mixing hash (FNV-1a shape) reducing a seed string to
/// the 32-bit generator state.
fn hash_seed(seed: &str) -> u32 {
    let mut h: u32 = 2_166_136_261;
    for byte in seed.bytes() {
        h ^= u32::from(byte);
        h = h.wrapping_mul(16_777_619);
    }
    // xorshift has a fixed point at zero
    if h == 0 {
        0x9E37_79B9
    } else {
        h
    }
}

/// Human-like interaction timing, optionally seeded for reproducible runs.
///
/// A seeded engine is a 32-bit xorshift generator: the same seed and the same
/// sequence of calls produce an identical delay sequence. Unseeded engines
/// fall back to the thread-local uniform source. One engine instance belongs
/// to exactly one run; sharing it across concurrent runs would interleave the
/// delay stream non-deterministically.
pub struct PacingEngine {
    /// `None` means unseeded (non-deterministic).
    state: Option<AtomicU32>,
}

impl PacingEngine {
    pub fn seeded(seed: &str) -> Self {
        Self {
            state: Some(AtomicU32::new(hash_seed(seed))),
        }
    }

    pub fn unseeded() -> Self {
        Self { state: None }
    }

    /// Engine for one target: the base seed (when present) is combined with
    /// the target identifier so each target gets its own generator.
    pub fn for_target(base_seed: Option<&str>, target: &str) -> Self {
        match base_seed {
            Some(base) => Self::seeded(&format!("{}:{}", base, target)),
            None => Self::unseeded(),
        }
    }

    pub fn is_seeded(&self) -> bool {
        self.state.is_some()
    }

    /// Uniform value in [0, 1).
    fn next_unit(&self) -> f64 {
        match &self.state {
            Some(state) => {
                let mut x = state.load(Ordering::Relaxed);
                x ^= x << 13;
                x ^= x >> 17;
                x ^= x << 5;
                state.store(x, Ordering::Relaxed);
                f64::from_bits(((x as u64) << 20) | 0x3FF0_0000_0000_0000) - 1.0
            }
            None => rand::thread_rng().gen_range(0.0..1.0),
        }
    }

    /// Draw a duration (in ms) uniformly from [min, max].
    pub fn sample_ms(&self, min: u64, max: u64) -> u64 {
        if max <= min {
            return min;
        }
        let span = (max - min + 1) as f64;
        min + (self.next_unit() * span) as u64
    }

    /// Suspend for a duration drawn from [min, max] milliseconds.
    pub async fn pause(&self, min_ms: u64, max_ms: u64) {
        let ms = self.sample_ms(min_ms, max_ms);
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    /// Clear the field, then type `text` with per-character pacing.
    ///
    /// Empty input performs no keystrokes (the field is still cleared). Text
    /// longer than `HYBRID_THRESHOLD` characters takes the hybrid path: the
    /// first `HYBRID_PREFIX` characters are typed individually to preserve a
    /// realistic keystroke trace, the remainder is bulk-inserted and followed
    /// by input/change dispatch. Either way the field's final value is
    /// byte-identical to `text`.
    pub async fn type_into(
        &self,
        page: &dyn PageDriver,
        selector: &str,
        text: &str,
    ) -> Result<(), PageError> {
        page.clear_value(selector).await?;
        if text.is_empty() {
            return Ok(());
        }

        let char_count = text.chars().count();
        let (typed, bulk) = if char_count > HYBRID_THRESHOLD {
            let split = text
                .char_indices()
                .nth(HYBRID_PREFIX)
                .map(|(i, _)| i)
                .unwrap_or(text.len());
            text.split_at(split)
        } else {
            (text, "")
        };

        let mut buf = [0u8; 4];
        for ch in typed.chars() {
            page.append_text(selector, ch.encode_utf8(&mut buf)).await?;
            let (min, max) = keystroke_band(ch);
            self.pause(min, max).await;
        }

        if !bulk.is_empty() {
            debug!(
                selector,
                typed = typed.chars().count(),
                bulk = bulk.chars().count(),
                "bulk-inserting long text remainder"
            );
            page.append_text(selector, bulk).await?;
            page.dispatch(selector, "input").await?;
            page.dispatch(selector, "change").await?;
        }
        Ok(())
    }

    /// Scroll the target into view, hover it, dwell, then click.
    /// The sequencing is invariant regardless of seed.
    pub async fn hover_then_click(
        &self,
        page: &dyn PageDriver,
        selector: &str,
    ) -> Result<(), PageError> {
        page.scroll_into_view(selector).await?;
        page.hover(selector).await?;
        self.pause(CLICK_DWELL_MS.0, CLICK_DWELL_MS.1).await;
        page.click(selector).await
    }

    pub async fn scroll_into_view(
        &self,
        page: &dyn PageDriver,
        selector: &str,
    ) -> Result<(), PageError> {
        page.scroll_into_view(selector).await
    }
}
