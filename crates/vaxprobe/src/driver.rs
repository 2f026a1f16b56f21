//! PageDriver - Abstract Browser Automation Trait
//!
//! Everything below the locator layer is delegated to a [`PageDriver`]: the
//! driver finds elements by role/name, reports their observable state and
//! performs raw clicks and keystrokes. It never waits or retries; waiting is
//! the dispatcher's and verifier's job.
//!
//! # Implementations
//!
//! - `CdpDriver` - Chromium over CDP (requires the `browser` feature)
//! - [`MockDriver`] - In-memory page model for unit testing

use crate::locator::{NameMatch, Role};
use crate::result::{ProbeError, ProbeResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Opaque reference to a live element, valid until the page changes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Driver-assigned identifier
    pub id: String,
    /// Role the element was found by
    pub role: Option<Role>,
    /// Accessible name at query time
    pub name: String,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub fn new(id: impl Into<String>, role: Option<Role>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role,
            name: name.into(),
        }
    }
}

/// Observable state of an element at one instant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementState {
    /// Still in the document
    pub attached: bool,
    /// Rendered and not hidden
    pub visible: bool,
    /// Not disabled
    pub enabled: bool,
    /// Checked (checkboxes and radios)
    pub checked: bool,
    /// Rendered text content
    pub text: String,
    /// Form value, for form controls
    pub value: Option<String>,
}

impl ElementState {
    /// State reported for an element that is gone
    #[must_use]
    pub fn detached() -> Self {
        Self::default()
    }

    /// Visible and enabled
    #[must_use]
    pub const fn is_actionable(&self) -> bool {
        self.attached && self.visible && self.enabled
    }
}

/// Document ready state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadyState {
    /// Document still loading
    Loading,
    /// DOM parsed, sub-resources loading
    Interactive,
    /// Fully loaded
    Complete,
}

impl ReadyState {
    /// Parse `document.readyState`
    #[must_use]
    pub fn from_document(value: &str) -> Self {
        match value {
            "complete" => Self::Complete,
            "interactive" => Self::Interactive,
            _ => Self::Loading,
        }
    }
}

/// One element query, evaluated by the driver in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementQuery {
    /// Role filter
    pub role: Option<Role>,
    /// Accessible-name filter
    pub name: Option<String>,
    /// Name matching mode
    pub name_match: NameMatch,
    /// Text-content filter (case-insensitive substring)
    pub has_text: Option<String>,
    /// Restrict to descendants of this element
    pub within: Option<ElementHandle>,
}

impl ElementQuery {
    /// Query by role
    #[must_use]
    pub fn by_role(role: Option<Role>) -> Self {
        Self {
            role,
            ..Self::default()
        }
    }

    /// Filter by accessible name
    #[must_use]
    pub fn with_name(mut self, name: Option<String>, name_match: NameMatch) -> Self {
        self.name = name;
        self.name_match = name_match;
        self
    }

    /// Filter by text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.has_text = Some(text.into());
        self
    }

    /// Restrict to descendants of `scope`
    #[must_use]
    pub fn within(mut self, scope: Option<ElementHandle>) -> Self {
        self.within = scope;
        self
    }
}

/// Abstract driver trait for browser automation
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to URL
    async fn navigate(&self, url: &str) -> ProbeResult<()>;

    /// Get current URL
    async fn current_url(&self) -> ProbeResult<String>;

    /// All attached elements matching the query, in document order
    async fn query(&self, query: &ElementQuery) -> ProbeResult<Vec<ElementHandle>>;

    /// Current state of an element (detached elements report `attached: false`)
    async fn state(&self, element: &ElementHandle) -> ProbeResult<ElementState>;

    /// Clear a form control
    async fn clear(&self, element: &ElementHandle) -> ProbeResult<()>;

    /// Type text into a form control
    async fn type_text(&self, element: &ElementHandle, text: &str) -> ProbeResult<()>;

    /// Click an element
    async fn click(&self, element: &ElementHandle) -> ProbeResult<()>;

    /// Current document ready state
    async fn ready_state(&self) -> ProbeResult<ReadyState>;
}

// ============================================================================
// MockDriver
// ============================================================================

/// An element in the [`MockDriver`] page model
#[derive(Debug, Clone)]
pub struct MockElement {
    id: String,
    role: Role,
    name: String,
    text: String,
    value: Option<String>,
    parent: Option<String>,
    visible: bool,
    enabled: bool,
    checked: bool,
    accepts_input: bool,
    attach_after: Duration,
    enable_after: Duration,
    attach_at: Option<Instant>,
    enable_at: Option<Instant>,
    text_changes: Vec<(Instant, String)>,
}

impl MockElement {
    /// Create a visible, enabled element
    #[must_use]
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        let value = matches!(role, Role::Textbox | Role::Combobox).then(String::new);
        Self {
            id: id.into(),
            role,
            name: String::new(),
            text: String::new(),
            value,
            parent: None,
            visible: true,
            enabled: true,
            checked: false,
            accepts_input: true,
            attach_after: Duration::ZERO,
            enable_after: Duration::ZERO,
            attach_at: None,
            enable_at: None,
            text_changes: Vec::new(),
        }
    }

    /// Set the accessible name
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the text content
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the form value
    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Nest inside another element
    #[must_use]
    pub fn child_of(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Render hidden
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Render disabled, never becoming enabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Ignore typed input (value never changes)
    #[must_use]
    pub const fn ignores_input(mut self) -> Self {
        self.accepts_input = false;
        self
    }

    /// Attach to the document only after `delay`
    #[must_use]
    pub const fn attach_after(mut self, delay: Duration) -> Self {
        self.attach_after = delay;
        self
    }

    /// Become enabled only after `delay`
    #[must_use]
    pub const fn enable_after(mut self, delay: Duration) -> Self {
        self.enable_after = delay;
        self
    }

    /// Replace the text content after `delay`
    #[must_use]
    pub fn text_after(mut self, delay: Duration, text: impl Into<String>) -> Self {
        self.text_changes.push((Instant::now() + delay, text.into()));
        self
    }

    fn is_attached(&self, now: Instant) -> bool {
        self.attach_at.map_or(true, |at| now >= at)
    }

    fn is_enabled(&self, now: Instant) -> bool {
        self.enabled && self.enable_at.map_or(true, |at| now >= at)
    }

    fn text_at(&self, now: Instant) -> &str {
        self.text_changes
            .iter()
            .filter(|(at, _)| now >= *at)
            .max_by_key(|(at, _)| *at)
            .map_or(self.text.as_str(), |(_, text)| text.as_str())
    }

    fn handle(&self) -> ElementHandle {
        ElementHandle::new(self.id.clone(), Some(self.role), self.name.clone())
    }
}

/// What happens on the page when a [`MockDriver`] element is clicked
#[derive(Debug, Clone)]
pub enum MockEffect {
    /// Start a navigation that completes after `load_for`
    Navigate {
        /// Destination URL
        url: String,
        /// Time spent in the loading state
        load_for: Duration,
    },
    /// Change an element's text after `after`
    SetText {
        /// Target element id
        element: String,
        /// New text
        text: String,
        /// Delay before the text changes
        after: Duration,
    },
    /// Make an element visible
    Show {
        /// Target element id
        element: String,
    },
    /// Hide an element
    Hide {
        /// Target element id
        element: String,
    },
}

#[derive(Debug)]
struct MockState {
    elements: Vec<MockElement>,
    effects: HashMap<String, Vec<MockEffect>>,
    url: String,
    loading_until: Option<Instant>,
    call_history: Vec<String>,
    permissive: bool,
    state_delay: Duration,
}

/// Mock driver for unit testing.
///
/// Holds a flat element list with parent links. Timed behaviour (late
/// attachment, late enabling, delayed text, slow navigation) uses the real
/// clock so the dispatcher and verifier exercise their actual polling loops.
#[derive(Debug)]
pub struct MockDriver {
    state: Mutex<MockState>,
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDriver {
    /// Create an empty page
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                elements: Vec::new(),
                effects: HashMap::new(),
                url: String::from("about:blank"),
                loading_until: None,
                call_history: Vec::new(),
                permissive: false,
                state_delay: Duration::ZERO,
            }),
        }
    }

    /// Create a page that invents any named element it is asked for.
    ///
    /// Registered elements still win; unknown named queries synthesize a
    /// visible, enabled element. Useful for driving whole workflows where
    /// only a few elements matter to the assertion.
    #[must_use]
    pub fn permissive() -> Self {
        let driver = Self::new();
        driver.lock().permissive = true;
        driver
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add an element to the page
    pub fn add(&self, mut element: MockElement) {
        let now = Instant::now();
        element.attach_at = Some(now + element.attach_after);
        element.enable_at = Some(now + element.enable_after);
        self.lock().elements.push(element);
    }

    /// Register an effect for clicks on `element`
    pub fn on_click(&self, element: impl Into<String>, effect: MockEffect) {
        self.lock()
            .effects
            .entry(element.into())
            .or_default()
            .push(effect);
    }

    /// Make every `state` call take `delay` (simulates a hung browser)
    pub fn set_state_delay(&self, delay: Duration) {
        self.lock().state_delay = delay;
    }

    /// Current value of an element, if it exists
    #[must_use]
    pub fn value_of(&self, id: &str) -> Option<String> {
        self.lock()
            .elements
            .iter()
            .find(|e| e.id == id)
            .and_then(|e| e.value.clone())
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.lock().call_history.clone()
    }

    /// Check if a call starting with `prefix` was made
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.lock().call_history.iter().any(|c| c.starts_with(prefix))
    }

    /// Clear the call history
    pub fn clear_history(&self) {
        self.lock().call_history.clear();
    }
}

impl MockState {
    fn find(&self, id: &str) -> Option<&MockElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut MockElement> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    fn is_descendant(&self, element: &MockElement, ancestor: &str) -> bool {
        let mut current = element.parent.as_deref();
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.find(id).and_then(|e| e.parent.as_deref());
        }
        false
    }

    fn matches(&self, element: &MockElement, query: &ElementQuery, now: Instant) -> bool {
        if !element.is_attached(now) {
            return false;
        }
        if query.role.is_some_and(|role| role != element.role) {
            return false;
        }
        if let Some(ref name) = query.name {
            if !query.name_match.matches(&element.name, name) {
                return false;
            }
        }
        if let Some(ref text) = query.has_text {
            if !NameMatch::Contains.matches(element.text_at(now), text) {
                return false;
            }
        }
        if let Some(ref scope) = query.within {
            if !self.is_descendant(element, &scope.id) {
                return false;
            }
        }
        true
    }

    fn synthesize(&mut self, query: &ElementQuery) -> Option<ElementHandle> {
        let role = query.role?;
        let label = query.name.as_ref().or(query.has_text.as_ref())?;
        let parent = query.within.as_ref().map(|h| h.id.clone());
        let id = format!(
            "auto:{}/{role}:{label}",
            parent.as_deref().unwrap_or("page")
        );
        let mut element = MockElement::new(id, role);
        if query.name.is_some() {
            element.name.clone_from(label);
        }
        if query.has_text.is_some() {
            element.text.clone_from(label);
        }
        element.parent = parent;
        let handle = element.handle();
        self.elements.push(element);
        Some(handle)
    }

    fn apply(&mut self, effect: MockEffect, now: Instant) {
        match effect {
            MockEffect::Navigate { url, load_for } => {
                self.url = url;
                self.loading_until = Some(now + load_for);
            }
            MockEffect::SetText {
                element,
                text,
                after,
            } => {
                if let Some(target) = self.find_mut(&element) {
                    target.text_changes.push((now + after, text));
                }
            }
            MockEffect::Show { element } => {
                if let Some(target) = self.find_mut(&element) {
                    target.visible = true;
                }
            }
            MockEffect::Hide { element } => {
                if let Some(target) = self.find_mut(&element) {
                    target.visible = false;
                }
            }
        }
    }

    fn stale(id: &str) -> ProbeError {
        ProbeError::driver(format!("element {id} is no longer attached"))
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn navigate(&self, url: &str) -> ProbeResult<()> {
        let mut state = self.lock();
        state.call_history.push(format!("navigate:{url}"));
        state.url = url.to_string();
        state.loading_until = None;
        Ok(())
    }

    async fn current_url(&self) -> ProbeResult<String> {
        Ok(self.lock().url.clone())
    }

    async fn query(&self, query: &ElementQuery) -> ProbeResult<Vec<ElementHandle>> {
        let now = Instant::now();
        let mut state = self.lock();
        let found: Vec<ElementHandle> = state
            .elements
            .iter()
            .filter(|e| state.matches(e, query, now))
            .map(MockElement::handle)
            .collect();
        if found.is_empty() && state.permissive {
            return Ok(state.synthesize(query).into_iter().collect());
        }
        Ok(found)
    }

    async fn state(&self, element: &ElementHandle) -> ProbeResult<ElementState> {
        let delay = self.lock().state_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let now = Instant::now();
        let state = self.lock();
        let Some(found) = state.find(&element.id).filter(|e| e.is_attached(now)) else {
            return Ok(ElementState::detached());
        };
        Ok(ElementState {
            attached: true,
            visible: found.visible,
            enabled: found.is_enabled(now),
            checked: found.checked,
            text: found.text_at(now).to_string(),
            value: found.value.clone(),
        })
    }

    async fn clear(&self, element: &ElementHandle) -> ProbeResult<()> {
        let mut state = self.lock();
        state.call_history.push(format!("clear:{}", element.id));
        let target = state
            .find_mut(&element.id)
            .ok_or_else(|| MockState::stale(&element.id))?;
        if target.accepts_input {
            target.value = Some(String::new());
        }
        Ok(())
    }

    async fn type_text(&self, element: &ElementHandle, text: &str) -> ProbeResult<()> {
        let mut state = self.lock();
        state
            .call_history
            .push(format!("type:{}:{text}", element.id));
        let target = state
            .find_mut(&element.id)
            .ok_or_else(|| MockState::stale(&element.id))?;
        if target.accepts_input {
            target.value.get_or_insert_with(String::new).push_str(text);
        }
        Ok(())
    }

    async fn click(&self, element: &ElementHandle) -> ProbeResult<()> {
        let now = Instant::now();
        let mut state = self.lock();
        state.call_history.push(format!("click:{}", element.id));
        let target = state
            .find_mut(&element.id)
            .ok_or_else(|| MockState::stale(&element.id))?;
        if matches!(target.role, Role::Checkbox | Role::Radio) {
            target.checked = true;
        }
        let effects = state.effects.get(&element.id).cloned().unwrap_or_default();
        for effect in effects {
            state.apply(effect, now);
        }
        Ok(())
    }

    async fn ready_state(&self) -> ProbeResult<ReadyState> {
        let state = self.lock();
        Ok(match state.loading_until {
            Some(until) if Instant::now() < until => ReadyState::Loading,
            _ => ReadyState::Complete,
        })
    }
}
