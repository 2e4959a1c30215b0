#![forbid(unsafe_code)]

//! Locator/keyboard/assertion surface over the resolvers.
//!
//! A [`Page`] plays the role of the host environment without rendering
//! anything: it builds input snapshots from the registries, runs them through
//! `roving-core`, applies the results with the reference [`Dispatcher`] and
//! records a JSONL trace.
//!
//! ```
//! use roving_core::{FieldRegistry, ZoneEntry, ZoneRegistry, ZoneRole};
//! use roving_harness::Page;
//!
//! let mut zones = ZoneRegistry::new();
//! zones.register(ZoneEntry::new("fruit", ZoneRole::Listbox).with_items(["apple", "banana"]));
//! let mut page = Page::new(zones, FieldRegistry::new());
//!
//! page.click("apple");
//! page.press("ArrowDown").unwrap();
//! page.assert_focused("banana");
//! assert_eq!(page.attr("banana", "tabindex").as_deref(), Some("0"));
//! ```

use roving_core::{
    ClickInput, FieldRegistry, Gesture, GestureRecognizer, GestureSignal, ItemEntry, ItemId,
    KeyCode, KeyCombo, KeyboardInput, Modifiers, MouseInput, PointerInput, PriorFocus,
    ResolveResult, ResolverConfig, ZoneEntry, ZoneId, ZoneRegistry, ZoneState, navigate,
    resolve_click, resolve_keyboard, resolve_mouse,
};

use crate::dispatcher::{AppModel, Dispatcher};
use crate::guard::FocusOrigin;
use crate::trace::Trace;

/// Extra facts about a click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClickOptions {
    pub modifiers: Modifiers,
    /// The target is the current page/route link.
    pub current_page: bool,
    /// A label redirected the click onto the target.
    pub label_redirect: bool,
}

impl ClickOptions {
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub const fn current_page(mut self) -> Self {
        self.current_page = true;
        self
    }

    #[must_use]
    pub const fn label_redirected(mut self) -> Self {
        self.label_redirect = true;
        self
    }
}

/// Results of both phases of one click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickOutcome {
    pub press: ResolveResult,
    /// `None` when the release did not produce a click (outside press).
    pub click: Option<ResolveResult>,
}

#[derive(Debug)]
pub struct Page {
    dispatcher: Dispatcher,
    recognizer: GestureRecognizer,
    trace: Trace,
}

impl Page {
    /// Page over the given registries with default configuration.
    #[must_use]
    pub fn new(zones: ZoneRegistry, fields: FieldRegistry) -> Self {
        Self {
            dispatcher: Dispatcher::new(zones, fields),
            recognizer: GestureRecognizer::default(),
            trace: Trace::new(),
        }
    }

    /// Page using `config` for the global keymap and drag threshold.
    pub fn with_config(
        zones: ZoneRegistry,
        fields: FieldRegistry,
        config: &ResolverConfig,
    ) -> roving_core::Result<Self> {
        let keymap = config.global_keymap()?;
        Ok(Self {
            dispatcher: Dispatcher::new(zones, fields).with_keymap(keymap),
            recognizer: GestureRecognizer::new(config.gesture_config()),
            trace: Trace::new(),
        })
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    #[must_use]
    pub fn app(&self) -> &AppModel {
        self.dispatcher.app()
    }

    // -----------------------------------------------------------------------
    // Keyboard
    // -----------------------------------------------------------------------

    /// Press a key combo such as `"Shift+Tab"`.
    pub fn press(&mut self, combo: &str) -> roving_core::Result<ResolveResult> {
        let input = KeyboardInput::parse(combo)?;
        Ok(self.press_input(input))
    }

    /// Resolve and dispatch a prepared keyboard snapshot.
    pub fn press_input(&mut self, input: KeyboardInput) -> ResolveResult {
        let result = resolve_keyboard(&input, &self.dispatcher.context());
        self.dispatcher.dispatch(&result);
        self.record("key", input.combo.to_string(), &result);
        result
    }

    /// Type characters. Each one is resolved first; characters the editing
    /// field absorbs are inserted at its caret. Returns how many were
    /// inserted.
    pub fn type_text(&mut self, text: &str) -> usize {
        let mut inserted = 0;
        for ch in text.chars() {
            let result = self.press_input(KeyboardInput::new(KeyCombo::plain(KeyCode::Char(ch))));
            let editing = self.dispatcher.store().editing().map(|(_, item)| item.clone());
            if result.commands.is_empty()
                && !result.fallback
                && let Some(item) = editing
            {
                let mut buf = [0u8; 4];
                if self
                    .dispatcher
                    .fields_mut()
                    .insert_at_caret(&item, ch.encode_utf8(&mut buf))
                {
                    inserted += 1;
                }
            }
        }
        inserted
    }

    // -----------------------------------------------------------------------
    // Mouse
    // -----------------------------------------------------------------------

    /// Unmodified click on an item. Unknown ids click outside every zone.
    pub fn click(&mut self, id: &str) -> ClickOutcome {
        self.click_with(id, ClickOptions::default())
    }

    /// Press, release and click on `id`.
    ///
    /// Prior focus is captured before the press is dispatched; the click
    /// phase only runs when the gesture recognizer reports a click.
    pub fn click_with(&mut self, id: &str, options: ClickOptions) -> ClickOutcome {
        let item = ItemId::from(id);
        let Some((zone, entry)) = self.locate(&item) else {
            let input = MouseInput::outside().with_modifiers(options.modifiers);
            let press = resolve_mouse(&input, &self.dispatcher.context());
            self.dispatcher.dispatch(&press);
            self.record("press", id, &press);
            return ClickOutcome { press, click: None };
        };

        let prior = PriorFocus::capture(self.dispatcher.store(), &zone);
        self.recognizer
            .down(&PointerInput::at(0.0, 0.0).over_item(zone.clone(), item.clone()));

        let mut input = MouseInput::on_item(zone.clone(), item.clone())
            .with_modifiers(options.modifiers)
            .expandable(entry.expandable);
        if options.label_redirect {
            input = input.label_redirected();
        }
        let press = resolve_mouse(&input, &self.dispatcher.context());
        self.dispatcher.dispatch(&press);
        self.record("press", id, &press);

        let click = match self.recognizer.up() {
            Gesture::Click {
                zone: Some(zone),
                item: Some(item),
            } => {
                let mut input = ClickInput::on_item(zone, item)
                    .with_prior(prior)
                    .with_modifiers(options.modifiers)
                    .editable(entry.editable)
                    .expandable(entry.expandable);
                if options.current_page {
                    input = input.current_page();
                }
                let result = resolve_click(&input, &self.dispatcher.context());
                self.dispatcher.dispatch(&result);
                self.record("click", id, &result);
                Some(result)
            }
            _ => None,
        };
        ClickOutcome { press, click }
    }

    /// Host focus moved to `id` without a resolved input (e.g. a script).
    pub fn observe_focus(&mut self, id: &str) -> Option<FocusOrigin> {
        let item = ItemId::from(id);
        let (zone, _) = self.locate(&item)?;
        Some(self.dispatcher.observe_focus(&zone, &item))
    }

    // -----------------------------------------------------------------------
    // Pointer gestures
    // -----------------------------------------------------------------------

    /// Raw pointer press over `id` (or over nothing for unknown ids).
    pub fn pointer_down(&mut self, id: &str, x: f64, y: f64, drag_handle: bool) {
        let item = ItemId::from(id);
        let mut input = PointerInput::at(x, y);
        if let Some((zone, _)) = self.locate(&item) {
            input = input.over_item(zone, item);
        }
        if drag_handle {
            input = input.with_drag_handle();
        }
        self.recognizer.down(&input);
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> Option<GestureSignal> {
        self.recognizer.move_to(&PointerInput::at(x, y))
    }

    pub fn pointer_up(&mut self) -> Gesture {
        self.recognizer.up()
    }

    /// Press on a drag handle of `id`, move to `to`, release.
    pub fn drag(&mut self, id: &str, from: (f64, f64), to: (f64, f64)) -> Gesture {
        self.pointer_down(id, from.0, from.1, true);
        self.pointer_move(to.0, to.1);
        self.pointer_up()
    }

    #[must_use]
    pub fn recognizer(&self) -> &GestureRecognizer {
        &self.recognizer
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Item focused in the active zone.
    #[must_use]
    pub fn focused(&self) -> Option<&ItemId> {
        self.dispatcher.store().focused().map(|(_, item)| item)
    }

    #[must_use]
    pub fn active_zone(&self) -> Option<&ZoneId> {
        self.dispatcher.store().active_zone()
    }

    #[must_use]
    pub fn is_selected(&self, id: &str) -> bool {
        self.with_state(id, |state, item| state.is_selected(item))
    }

    #[must_use]
    pub fn is_expanded(&self, id: &str) -> bool {
        self.with_state(id, |state, item| state.is_expanded(item))
    }

    #[must_use]
    pub fn is_editing(&self, id: &str) -> bool {
        self.with_state(id, |state, item| state.is_editing(item))
    }

    #[must_use]
    pub fn is_checked(&self, id: &str) -> bool {
        self.dispatcher.app().checked.contains(id)
    }

    /// Accessibility attribute projected from state.
    ///
    /// Supports `aria-selected`, `aria-expanded` (expandable items only),
    /// `aria-checked` (checkable or checked items only) and `tabindex`
    /// (`"0"` on the zone's roving tab stop, `"-1"` elsewhere).
    #[must_use]
    pub fn attr(&self, id: &str, name: &str) -> Option<String> {
        let item = ItemId::from(id);
        let zone = self.dispatcher.zones().zone_of_item(&item)?;
        let entry = zone.item(&item)?;
        let state = self.dispatcher.store().zone_or_empty(&zone.id);
        match name {
            "aria-selected" => Some(state.is_selected(&item).to_string()),
            "aria-expanded" => entry
                .expandable
                .then(|| state.is_expanded(&item).to_string()),
            "aria-checked" => {
                let checked = self.is_checked(id);
                (entry.role.toggles_on_space() || checked).then(|| checked.to_string())
            }
            "tabindex" => {
                let stop = tab_stop(zone, state);
                Some(if stop.as_ref() == Some(&item) { "0" } else { "-1" }.to_string())
            }
            _ => None,
        }
    }

    /// Panic unless `id` is focused in the active zone.
    #[track_caller]
    pub fn assert_focused(&self, id: &str) {
        let focused = self.focused().map(ItemId::as_str);
        assert_eq!(
            focused,
            Some(id),
            "focus mismatch; trace:\n{}",
            self.trace.to_jsonl()
        );
    }

    // -----------------------------------------------------------------------
    // Trace
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    #[must_use]
    pub fn trace_jsonl(&self) -> String {
        self.trace.to_jsonl()
    }

    #[must_use]
    pub fn trace_digest(&self) -> String {
        self.trace.digest()
    }

    fn record(&mut self, kind: &'static str, input: impl Into<String>, result: &ResolveResult) {
        self.trace
            .record(kind, input, result, self.dispatcher.store().focused());
    }

    fn locate(&self, item: &ItemId) -> Option<(ZoneId, ItemEntry)> {
        let zone = self.dispatcher.zones().zone_of_item(item)?;
        Some((zone.id.clone(), zone.item(item)?.clone()))
    }

    fn with_state(&self, id: &str, f: impl FnOnce(&ZoneState, &ItemId) -> bool) -> bool {
        let item = ItemId::from(id);
        self.dispatcher
            .zones()
            .zone_of_item(&item)
            .is_some_and(|zone| f(self.dispatcher.store().zone_or_empty(&zone.id), &item))
    }
}

/// Item carrying `tabindex="0"`: focus, else sticky focus, else the first
/// navigable item.
fn tab_stop(zone: &ZoneEntry, state: &ZoneState) -> Option<ItemId> {
    state
        .focused_item_id
        .clone()
        .or_else(|| state.last_focused_id.clone())
        .filter(|id| zone.contains(id))
        .or_else(|| navigate::first(zone, state))
}
