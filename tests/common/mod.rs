//! In-memory stand-in for the page-automation collaborator.
//!
//! `FakePage` keeps a flat map of selector -> element plus a small rule
//! engine so tests can script the reactive behavior of a real form: a toggle
//! click revealing a section, a checkbox revealing its dependent question, a
//! query populating a suggestion list on the first or a later attempt, a
//! submit click rendering the confirmation marker. Every driver call is
//! recorded chronologically so tests can assert what was (and was not)
//! touched.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use formagent::{PageDriver, PageError};

/// Install the diagnostic subscriber once per test binary so retry and
/// pacing traces show up in failing test output (opt in via
/// `RUST_LOG=formagent=debug`).
fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

#[derive(Debug, Clone, Default)]
pub struct FakeElement {
    pub value: String,
    pub text: String,
    pub visible: bool,
    pub checked: bool,
    pub attrs: HashMap<String, String>,
}

impl FakeElement {
    pub fn visible() -> Self {
        FakeElement {
            visible: true,
            ..FakeElement::default()
        }
    }
}

#[derive(Debug, Clone)]
pub enum Trigger {
    /// A click on the selector.
    Click(String),
    /// A `clear_value` on the selector, i.e. the start of a typed query.
    TypeStart(String),
    /// The selector being checked (set to true).
    Checked(String),
    /// An option selected on the selector; `Some(v)` restricts to one value.
    Selected(String, Option<String>),
}

#[derive(Debug, Clone)]
pub enum Effect {
    /// Make the selector exist and be visible.
    Reveal(String),
    /// Make the selector exist, visible, with the given inner text.
    SetText(String, String),
    /// Populate a multi-match selector with row texts; also registers
    /// `{selector}:nth-child(i)` elements so rows can be clicked.
    SetList(String, Vec<String>),
}

struct Rule {
    trigger: Trigger,
    /// Fire on the n-th occurrence of the trigger (1-based).
    needed: usize,
    seen: usize,
    fired: bool,
    effects: Vec<Effect>,
}

#[derive(Default)]
struct Inner {
    url: String,
    elements: HashMap<String, FakeElement>,
    lists: HashMap<String, Vec<String>>,
    calls: Vec<String>,
    rules: Vec<Rule>,
}

#[derive(Default)]
pub struct FakePage {
    inner: Mutex<Inner>,
}

impl FakePage {
    pub fn new(url: &str) -> Self {
        init_tracing();
        let page = FakePage::default();
        page.inner.lock().unwrap().url = url.to_string();
        page
    }

    pub fn add(&self, selector: &str, element: FakeElement) -> &Self {
        self.inner
            .lock()
            .unwrap()
            .elements
            .insert(selector.to_string(), element);
        self
    }

    pub fn add_visible(&self, selector: &str) -> &Self {
        self.add(selector, FakeElement::visible())
    }

    pub fn rule(&self, trigger: Trigger, effects: Vec<Effect>) -> &Self {
        self.rule_after(trigger, 1, effects)
    }

    pub fn rule_after(&self, trigger: Trigger, needed: usize, effects: Vec<Effect>) -> &Self {
        self.inner.lock().unwrap().rules.push(Rule {
            trigger,
            needed,
            seen: 0,
            fired: false,
            effects,
        });
        self
    }

    // -- assertion helpers -------------------------------------------------

    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn count_calls(&self, needle: &str) -> usize {
        self.calls().iter().filter(|c| c.contains(needle)).count()
    }

    pub fn was_touched(&self, selector: &str) -> bool {
        self.count_calls(selector) > 0
    }

    pub fn value_of(&self, selector: &str) -> String {
        self.inner.lock().unwrap().elements[selector].value.clone()
    }

    pub fn is_checked(&self, selector: &str) -> bool {
        self.inner.lock().unwrap().elements[selector].checked
    }

    // -- internals ---------------------------------------------------------

    fn record(&self, call: String) {
        self.inner.lock().unwrap().calls.push(call);
    }

    fn require(&self, selector: &str) -> Result<(), PageError> {
        if self.inner.lock().unwrap().elements.contains_key(selector) {
            Ok(())
        } else {
            Err(PageError::ElementNotFound {
                selector: selector.to_string(),
            })
        }
    }

    fn fire(&self, observed: &Trigger) {
        let mut inner = self.inner.lock().unwrap();
        let mut due: Vec<Effect> = Vec::new();
        for rule in inner.rules.iter_mut() {
            let hit = match (&rule.trigger, observed) {
                (Trigger::Click(a), Trigger::Click(b)) => a == b,
                (Trigger::TypeStart(a), Trigger::TypeStart(b)) => a == b,
                (Trigger::Checked(a), Trigger::Checked(b)) => a == b,
                (Trigger::Selected(a, want), Trigger::Selected(b, got)) => {
                    a == b && want.as_ref().map_or(true, |w| Some(w) == got.as_ref())
                }
                _ => false,
            };
            if hit && !rule.fired {
                rule.seen += 1;
                if rule.seen >= rule.needed {
                    rule.fired = true;
                    due.extend(rule.effects.iter().cloned());
                }
            }
        }
        for effect in due {
            match effect {
                Effect::Reveal(sel) => {
                    inner.elements.entry(sel).or_default().visible = true;
                }
                Effect::SetText(sel, text) => {
                    let el = inner.elements.entry(sel).or_default();
                    el.visible = true;
                    el.text = text;
                }
                Effect::SetList(sel, rows) => {
                    for (i, row) in rows.iter().enumerate() {
                        let item = format!("{}:nth-child({})", sel, i + 1);
                        let el = inner.elements.entry(item).or_default();
                        el.visible = true;
                        el.text = row.clone();
                    }
                    inner.lists.insert(sel, rows);
                }
            }
        }
    }
}

#[async_trait]
impl PageDriver for FakePage {
    async fn navigate(&self, url: &str) -> Result<(), PageError> {
        self.record(format!("navigate {}", url));
        self.inner.lock().unwrap().url = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> Result<String, PageError> {
        Ok(self.inner.lock().unwrap().url.clone())
    }

    async fn set_value(&self, selector: &str, value: &str) -> Result<(), PageError> {
        self.require(selector)?;
        self.record(format!("set {}", selector));
        self.inner
            .lock()
            .unwrap()
            .elements
            .get_mut(selector)
            .unwrap()
            .value = value.to_string();
        Ok(())
    }

    async fn clear_value(&self, selector: &str) -> Result<(), PageError> {
        self.require(selector)?;
        self.record(format!("clear {}", selector));
        self.inner
            .lock()
            .unwrap()
            .elements
            .get_mut(selector)
            .unwrap()
            .value
            .clear();
        self.fire(&Trigger::TypeStart(selector.to_string()));
        Ok(())
    }

    async fn append_text(&self, selector: &str, text: &str) -> Result<(), PageError> {
        self.require(selector)?;
        self.inner
            .lock()
            .unwrap()
            .elements
            .get_mut(selector)
            .unwrap()
            .value
            .push_str(text);
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<(), PageError> {
        self.require(selector)?;
        self.record(format!("click {}", selector));
        self.fire(&Trigger::Click(selector.to_string()));
        Ok(())
    }

    async fn hover(&self, selector: &str) -> Result<(), PageError> {
        self.require(selector)?;
        self.record(format!("hover {}", selector));
        Ok(())
    }

    async fn scroll_into_view(&self, selector: &str) -> Result<(), PageError> {
        self.require(selector)?;
        self.record(format!("scroll {}", selector));
        Ok(())
    }

    async fn set_checked(&self, selector: &str, checked: bool) -> Result<(), PageError> {
        self.require(selector)?;
        self.record(format!("check {}={}", selector, checked));
        self.inner
            .lock()
            .unwrap()
            .elements
            .get_mut(selector)
            .unwrap()
            .checked = checked;
        if checked {
            self.fire(&Trigger::Checked(selector.to_string()));
        }
        Ok(())
    }

    async fn select_option(&self, selector: &str, value: &str) -> Result<(), PageError> {
        self.require(selector)?;
        self.record(format!("select {}={}", selector, value));
        self.inner
            .lock()
            .unwrap()
            .elements
            .get_mut(selector)
            .unwrap()
            .value = value.to_string();
        self.fire(&Trigger::Selected(
            selector.to_string(),
            Some(value.to_string()),
        ));
        Ok(())
    }

    async fn read_attribute(
        &self,
        selector: &str,
        name: &str,
    ) -> Result<Option<String>, PageError> {
        self.require(selector)?;
        Ok(self.inner.lock().unwrap().elements[selector]
            .attrs
            .get(name)
            .cloned())
    }

    async fn inner_text(&self, selector: &str) -> Result<String, PageError> {
        self.require(selector)?;
        Ok(self.inner.lock().unwrap().elements[selector].text.clone())
    }

    async fn all_inner_texts(&self, selector: &str) -> Result<Vec<String>, PageError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .lists
            .get(selector)
            .cloned()
            .unwrap_or_default())
    }

    async fn count_matches(&self, selector: &str) -> Result<usize, PageError> {
        let inner = self.inner.lock().unwrap();
        if let Some(rows) = inner.lists.get(selector) {
            return Ok(rows.len());
        }
        Ok(inner
            .elements
            .get(selector)
            .map_or(0, |el| usize::from(el.visible)))
    }

    async fn wait_for(
        &self,
        selector: &str,
        visible: bool,
        timeout: Duration,
    ) -> Result<(), PageError> {
        self.record(format!("wait {}", selector));
        let satisfied = {
            let inner = self.inner.lock().unwrap();
            inner
                .elements
                .get(selector)
                .map_or(false, |el| !visible || el.visible)
        };
        if satisfied {
            Ok(())
        } else {
            Err(PageError::WaitTimeout {
                selector: selector.to_string(),
                condition: if visible { "visible" } else { "attached" },
                waited: timeout,
            })
        }
    }

    async fn upload_file(&self, selector: &str, path: &Path) -> Result<(), PageError> {
        self.require(selector)?;
        self.record(format!("upload {}", selector));
        self.inner
            .lock()
            .unwrap()
            .elements
            .get_mut(selector)
            .unwrap()
            .attrs
            .insert("file".to_string(), path.display().to_string());
        Ok(())
    }

    async fn inject_value(&self, selector: &str, value: &str) -> Result<(), PageError> {
        self.require(selector)?;
        self.record(format!("inject {}={}", selector, value));
        self.inner
            .lock()
            .unwrap()
            .elements
            .get_mut(selector)
            .unwrap()
            .value = value.to_string();
        Ok(())
    }

    async fn dispatch(&self, selector: &str, event: &str) -> Result<(), PageError> {
        self.require(selector)?;
        self.record(format!("dispatch {} {}", selector, event));
        Ok(())
    }
}
