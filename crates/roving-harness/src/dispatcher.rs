#![forbid(unsafe_code)]

//! Reference dispatcher: applies resolved command batches to an in-memory
//! focus store, zone registry and application model.
//!
//! Each batch is applied atomically and in emission order inside one
//! re-entrance guard scope. Every command except undo/redo passes through
//! the snapshot history before it runs.

use std::collections::{BTreeMap, BTreeSet};

use roving_core::{
    Command, ExpandAction, FieldRegistry, FocusStore, ItemEntry, ItemId, Keymap, ResolveContext,
    ResolveResult, SelectMode, TabDirection, ZoneId, ZoneRegistry, navigate,
};
use tracing::{debug, debug_span, trace};

use crate::guard::{CauseId, FocusOrigin, ReentryGuard};
use crate::history::SnapshotHistory;

// ---------------------------------------------------------------------------
// Application model
// ---------------------------------------------------------------------------

/// Application data the commands act on, beyond focus state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppModel {
    pub checked: BTreeSet<ItemId>,
    /// Activations in order.
    pub activated: Vec<ItemId>,
    pub dismissed: Vec<ZoneId>,
    pub deleted: Vec<ItemId>,
    pub clipboard: Vec<ItemEntry>,
    /// Last committed value per edited item.
    pub values: BTreeMap<ItemId, String>,
    /// Custom command names in order.
    pub custom: Vec<String>,
}

/// Everything undo restores.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub store: FocusStore,
    pub app: AppModel,
    pub zones: ZoneRegistry,
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Dispatcher {
    zones: ZoneRegistry,
    fields: FieldRegistry,
    store: FocusStore,
    keymap: Keymap,
    app: AppModel,
    guard: ReentryGuard,
    history: SnapshotHistory,
    applied: Vec<&'static str>,
}

impl Dispatcher {
    /// Dispatcher over the given stores with the default global keymap.
    #[must_use]
    pub fn new(zones: ZoneRegistry, fields: FieldRegistry) -> Self {
        Self {
            zones,
            fields,
            store: FocusStore::new(),
            keymap: Keymap::defaults(),
            app: AppModel::default(),
            guard: ReentryGuard::new(),
            history: SnapshotHistory::default(),
            applied: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_keymap(mut self, keymap: Keymap) -> Self {
        self.keymap = keymap;
        self
    }

    #[must_use]
    pub fn with_history(mut self, history: SnapshotHistory) -> Self {
        self.history = history;
        self
    }

    /// Borrowed view for the resolvers.
    #[must_use]
    pub fn context(&self) -> ResolveContext<'_> {
        ResolveContext::new(&self.zones, &self.fields, &self.store, &self.keymap)
    }

    #[must_use]
    pub fn zones(&self) -> &ZoneRegistry {
        &self.zones
    }

    #[must_use]
    pub fn fields(&self) -> &FieldRegistry {
        &self.fields
    }

    /// Caret/value bridge for editing fields.
    pub fn fields_mut(&mut self) -> &mut FieldRegistry {
        &mut self.fields
    }

    #[must_use]
    pub fn store(&self) -> &FocusStore {
        &self.store
    }

    #[must_use]
    pub fn app(&self) -> &AppModel {
        &self.app
    }

    #[must_use]
    pub fn guard(&self) -> &ReentryGuard {
        &self.guard
    }

    #[must_use]
    pub fn history(&self) -> &SnapshotHistory {
        &self.history
    }

    /// Names of every command applied so far.
    #[must_use]
    pub fn applied(&self) -> &[&'static str] {
        &self.applied
    }

    /// Apply a resolver result. Returns the dispatch cause, or `None` when
    /// the result carried no commands.
    pub fn dispatch(&mut self, result: &ResolveResult) -> Option<CauseId> {
        self.dispatch_commands(&result.commands)
    }

    /// Apply a batch of commands atomically, in order.
    pub fn dispatch_commands(&mut self, commands: &[Command]) -> Option<CauseId> {
        if commands.is_empty() {
            return None;
        }
        let cause = self.guard.enter();
        {
            let _span = debug_span!(
                "roving.dispatch",
                cause = cause.0,
                depth = self.guard.depth(),
                commands = commands.len()
            )
            .entered();
            for command in commands {
                self.apply(command, cause);
            }
        }
        self.guard.exit(cause);
        Some(cause)
    }

    /// Host reports that focus moved to `item`.
    ///
    /// Changes observed while a dispatch is running are echoes of that
    /// dispatch and are dropped. External changes of registered items are
    /// dispatched as a focus command.
    pub fn observe_focus(&mut self, zone: &ZoneId, item: &ItemId) -> FocusOrigin {
        let origin = self.guard.classify();
        match origin {
            FocusOrigin::SelfInflicted(cause) => {
                trace!(cause = cause.0, item = item.as_str(), "focus echo suppressed");
            }
            FocusOrigin::External => {
                if self.zones.get(zone).is_some_and(|entry| entry.contains(item)) {
                    self.dispatch_commands(&[Command::Focus {
                        zone: zone.clone(),
                        item: item.clone(),
                    }]);
                }
            }
        }
        origin
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            store: self.store.clone(),
            app: self.app.clone(),
            zones: self.zones.clone(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.store = snapshot.store;
        self.app = snapshot.app;
        self.zones = snapshot.zones;
    }

    fn apply(&mut self, command: &Command, cause: CauseId) {
        debug!(command = command.name(), "apply");
        let prior = self
            .history
            .wants(command, cause)
            .then(|| self.snapshot());
        self.execute(command);
        if let Some(prior) = prior {
            self.history.record(prior, command, cause);
        }
        self.applied.push(command.name());
    }

    fn execute(&mut self, command: &Command) {
        match command {
            Command::Focus { zone, item } => self.focus(zone, item),
            Command::Select { zone, item, mode } => self.select(zone, item, *mode),
            Command::SelectAll { zone } => {
                let Some(entry) = self.zones.get(zone) else {
                    return;
                };
                let all: BTreeSet<ItemId> =
                    navigate::candidates(entry, self.store.zone_or_empty(zone))
                        .into_iter()
                        .map(|item| item.id.clone())
                        .collect();
                self.store.zone_mut(zone).selection = all;
            }
            Command::Deselect { zone } => self.clear_zone(zone),
            Command::Activate { item, .. } => self.app.activated.push(item.clone()),
            Command::Expand { zone, item, action } => {
                let expanded = &mut self.store.zone_mut(zone).expanded_items;
                match action {
                    ExpandAction::Toggle => {
                        if !expanded.remove(item) {
                            expanded.insert(item.clone());
                        }
                    }
                    ExpandAction::Expand => {
                        expanded.insert(item.clone());
                    }
                    ExpandAction::Collapse => {
                        expanded.remove(item);
                    }
                }
            }
            Command::Check { item, .. } => {
                if !self.app.checked.remove(item) {
                    self.app.checked.insert(item.clone());
                }
            }
            Command::StartEdit { zone, item } => {
                let state = self.store.zone_mut(zone);
                if state.focused_item_id.as_ref() == Some(item) {
                    state.editing_item_id = Some(item.clone());
                }
            }
            Command::CommitEdit { zone, item, value } => {
                self.app.values.insert(item.clone(), value.clone());
                self.finish_edit(zone, item);
            }
            Command::CancelEdit { zone, item } => self.finish_edit(zone, item),
            Command::Dismiss { zone } => {
                self.clear_zone(zone);
                if self.store.active_zone() == Some(zone) {
                    self.store.set_active_zone(None);
                }
                self.app.dismissed.push(zone.clone());
            }
            Command::Tab { direction } => self.tab(*direction),
            Command::Delete { zone, items } => {
                self.remove(zone, items);
                self.app.deleted.extend(items.iter().cloned());
            }
            Command::Copy { zone, items } => self.app.clipboard = self.entries(zone, items),
            Command::Cut { zone, items } => {
                self.app.clipboard = self.entries(zone, items);
                self.remove(zone, items);
            }
            Command::Paste { zone, after } => {
                let clipboard = self.app.clipboard.clone();
                if let Some(entry) = self.zones.get_mut(zone) {
                    entry.insert_items(after.as_ref(), clipboard);
                }
            }
            Command::Move { zone, item, delta } => {
                if let Some(entry) = self.zones.get_mut(zone) {
                    entry.move_item(item, *delta);
                }
            }
            Command::Undo => {
                let current = self.snapshot();
                if let Some(snapshot) = self.history.undo(current) {
                    self.restore(snapshot);
                }
            }
            Command::Redo => {
                let current = self.snapshot();
                if let Some(snapshot) = self.history.redo(current) {
                    self.restore(snapshot);
                }
            }
            Command::Custom { name, .. } => self.app.custom.push(name.clone()),
        }
    }

    fn focus(&mut self, zone: &ZoneId, item: &ItemId) {
        if self.store.active_zone() != Some(zone) {
            if let Some(previous) = self.store.active_zone().cloned() {
                self.store.zone_mut(&previous).editing_item_id = None;
            }
            self.store.set_active_zone(Some(zone.clone()));
        }
        let state = self.store.zone_mut(zone);
        if state.editing_item_id.as_ref() != Some(item) {
            state.editing_item_id = None;
        }
        state.focused_item_id = Some(item.clone());
        state.last_focused_id = Some(item.clone());

        // The host fires a focus event for the move we just made.
        self.observe_focus(zone, item);
    }

    fn select(&mut self, zone: &ZoneId, item: &ItemId, mode: SelectMode) {
        let order: Vec<ItemId> = self
            .zones
            .get(zone)
            .map(|entry| entry.items.iter().map(|i| i.id.clone()).collect())
            .unwrap_or_default();
        let state = self.store.zone_mut(zone);
        match mode {
            SelectMode::Replace => {
                state.selection = BTreeSet::from([item.clone()]);
                state.selection_anchor = Some(item.clone());
            }
            SelectMode::Toggle => {
                if !state.selection.remove(item) {
                    state.selection.insert(item.clone());
                }
                state.selection_anchor = Some(item.clone());
            }
            SelectMode::Range => {
                let anchor = state
                    .selection_anchor
                    .clone()
                    .unwrap_or_else(|| item.clone());
                let from = order.iter().position(|id| *id == anchor);
                let to = order.iter().position(|id| id == item);
                state.selection = match (from, to) {
                    (Some(from), Some(to)) => {
                        order[from.min(to)..=from.max(to)].iter().cloned().collect()
                    }
                    _ => BTreeSet::from([item.clone()]),
                };
                state.selection_anchor = Some(anchor);
            }
        }
    }

    fn clear_zone(&mut self, zone: &ZoneId) {
        let state = self.store.zone_mut(zone);
        state.focused_item_id = None;
        state.editing_item_id = None;
        state.selection.clear();
        state.selection_anchor = None;
    }

    fn finish_edit(&mut self, zone: &ZoneId, item: &ItemId) {
        let caret = self.fields.get(item).map(|field| field.caret);
        let state = self.store.zone_mut(zone);
        if state.editing_item_id.as_ref() == Some(item) {
            state.editing_item_id = None;
        }
        if let Some(caret) = caret {
            state.caret_positions.insert(item.clone(), caret);
        }
    }

    fn tab(&mut self, direction: TabDirection) {
        let from = self.store.active_zone().cloned();
        let Some(next) = self.zones.neighbour(from.as_ref(), direction) else {
            return;
        };
        let zone = next.id.clone();
        let state = self.store.zone_or_empty(&zone);
        let target = state
            .last_focused_id
            .clone()
            .filter(|id| next.contains(id))
            .or_else(|| navigate::first(next, state));
        match target {
            Some(item) => self.focus(&zone, &item),
            None => self.store.set_active_zone(Some(zone)),
        }
    }

    fn entries(&self, zone: &ZoneId, items: &[ItemId]) -> Vec<ItemEntry> {
        self.zones
            .get(zone)
            .map(|entry| {
                items
                    .iter()
                    .filter_map(|id| entry.item(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn remove(&mut self, zone: &ZoneId, items: &[ItemId]) {
        if let Some(entry) = self.zones.get_mut(zone) {
            entry.remove_items(items);
        }
        let state = self.store.zone_mut(zone);
        for id in items {
            state.selection.remove(id);
            state.expanded_items.remove(id);
            state.caret_positions.remove(id);
        }
        let gone = |slot: &Option<ItemId>| slot.as_ref().is_some_and(|id| items.contains(id));
        if gone(&state.focused_item_id) {
            state.focused_item_id = None;
            state.editing_item_id = None;
        }
        if gone(&state.last_focused_id) {
            state.last_focused_id = None;
        }
        if gone(&state.selection_anchor) {
            state.selection_anchor = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roving_core::{FieldEntry, FieldType, ItemRole, ZoneEntry, ZoneRole};

    fn fruit() -> Dispatcher {
        let mut zones = ZoneRegistry::new();
        zones.register(
            ZoneEntry::new("fruit", ZoneRole::Listbox)
                .with_items(["apple", "banana", "cherry", "date"]),
        );
        zones.register(ZoneEntry::new("tools", ZoneRole::Toolbar).with_items(["bold", "italic"]));
        Dispatcher::new(zones, FieldRegistry::new())
    }

    fn focus(zone: &str, item: &str) -> Command {
        Command::Focus {
            zone: zone.into(),
            item: item.into(),
        }
    }

    fn select(item: &str, mode: SelectMode) -> Command {
        Command::Select {
            zone: "fruit".into(),
            item: item.into(),
            mode,
        }
    }

    fn focused(d: &Dispatcher) -> Option<(&str, &str)> {
        d.store()
            .focused()
            .map(|(zone, item)| (zone.as_str(), item.as_str()))
    }

    fn selection(d: &Dispatcher, zone: &str) -> Vec<String> {
        d.store()
            .zone_or_empty(&zone.into())
            .selection
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn focus_switches_active_zone_and_records_sticky_focus() {
        let mut d = fruit();
        d.dispatch_commands(&[focus("fruit", "banana")]);
        d.dispatch_commands(&[focus("tools", "bold")]);

        assert_eq!(d.store().active_zone().map(ZoneId::as_str), Some("tools"));
        let fruit = d.store().zone_or_empty(&"fruit".into());
        assert_eq!(fruit.focused_item_id, Some("banana".into()));
        assert_eq!(fruit.last_focused_id, Some("banana".into()));
    }

    #[test]
    fn focus_echo_is_suppressed_once_per_focus() {
        let mut d = fruit();
        d.dispatch_commands(&[focus("fruit", "apple"), focus("fruit", "banana")]);
        assert_eq!(d.guard().echoes_suppressed(), 2);
        assert!(!d.guard().is_dispatching());
        assert_eq!(d.applied(), ["focus", "focus"]);
    }

    #[test]
    fn external_focus_is_dispatched() {
        let mut d = fruit();
        let origin = d.observe_focus(&"fruit".into(), &"cherry".into());
        assert_eq!(origin, FocusOrigin::External);
        assert_eq!(focused(&d), Some(("fruit", "cherry")));

        let origin = d.observe_focus(&"fruit".into(), &"ghost".into());
        assert_eq!(origin, FocusOrigin::External);
        assert_eq!(focused(&d), Some(("fruit", "cherry")));
    }

    #[test]
    fn select_modes() {
        let mut d = fruit();
        d.dispatch_commands(&[select("banana", SelectMode::Replace)]);
        d.dispatch_commands(&[select("date", SelectMode::Range)]);
        assert_eq!(selection(&d, "fruit"), ["banana", "cherry", "date"]);

        d.dispatch_commands(&[select("apple", SelectMode::Range)]);
        assert_eq!(selection(&d, "fruit"), ["apple", "banana"]);

        d.dispatch_commands(&[select("cherry", SelectMode::Toggle)]);
        assert_eq!(selection(&d, "fruit"), ["apple", "banana", "cherry"]);
        d.dispatch_commands(&[select("apple", SelectMode::Toggle)]);
        assert_eq!(selection(&d, "fruit"), ["banana", "cherry"]);
    }

    #[test]
    fn deselect_clears_focus_and_selection() {
        let mut d = fruit();
        d.dispatch_commands(&[focus("fruit", "apple"), select("apple", SelectMode::Replace)]);
        d.dispatch_commands(&[Command::Deselect {
            zone: "fruit".into(),
        }]);
        let state = d.store().zone_or_empty(&"fruit".into());
        assert!(state.focused_item_id.is_none());
        assert!(state.selection.is_empty());
        assert!(state.selection_anchor.is_none());
        assert_eq!(d.store().active_zone().map(ZoneId::as_str), Some("fruit"));
    }

    #[test]
    fn start_edit_requires_focus_and_commit_copies_caret() {
        let mut zones = ZoneRegistry::new();
        zones.register(
            ZoneEntry::new("files", ZoneRole::Listbox)
                .with_item(ItemEntry::new("readme", ItemRole::Option).editable()),
        );
        let mut fields = FieldRegistry::new();
        fields.register(FieldEntry::new("files", "readme", FieldType::Inline).with_value("notes"));
        let mut d = Dispatcher::new(zones, fields);

        let start = Command::StartEdit {
            zone: "files".into(),
            item: "readme".into(),
        };
        d.dispatch_commands(&[start.clone()]);
        assert!(d.store().editing().is_none());

        d.dispatch_commands(&[focus("files", "readme"), start]);
        assert_eq!(d.store().editing().map(|(_, item)| item.as_str()), Some("readme"));

        d.fields_mut().set_caret(&"readme".into(), 2);
        d.dispatch_commands(&[Command::CommitEdit {
            zone: "files".into(),
            item: "readme".into(),
            value: "notes".into(),
        }]);
        assert!(d.store().editing().is_none());
        let state = d.store().zone_or_empty(&"files".into());
        assert_eq!(state.caret_positions.get("readme"), Some(&2));
        assert_eq!(d.app().values.get("readme").map(String::as_str), Some("notes"));
    }

    #[test]
    fn tab_reenters_at_last_focused() {
        let mut d = fruit();
        d.dispatch_commands(&[focus("fruit", "cherry")]);
        d.dispatch_commands(&[Command::Tab {
            direction: TabDirection::Forward,
        }]);
        assert_eq!(focused(&d), Some(("tools", "bold")));

        d.dispatch_commands(&[Command::Tab {
            direction: TabDirection::Forward,
        }]);
        assert_eq!(focused(&d), Some(("fruit", "cherry")));

        d.dispatch_commands(&[Command::Tab {
            direction: TabDirection::Backward,
        }]);
        assert_eq!(focused(&d), Some(("tools", "bold")));
    }

    #[test]
    fn cut_then_paste_moves_items() {
        let mut d = fruit();
        d.dispatch_commands(&[focus("fruit", "apple")]);
        d.dispatch_commands(&[Command::Cut {
            zone: "fruit".into(),
            items: vec!["apple".into()],
        }]);
        assert!(d.store().focused().is_none());
        d.dispatch_commands(&[Command::Paste {
            zone: "fruit".into(),
            after: Some("cherry".into()),
        }]);
        let ids: Vec<&str> = d
            .zones()
            .get(&"fruit".into())
            .unwrap()
            .items
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(ids, ["banana", "cherry", "apple", "date"]);
        assert!(d.app().deleted.is_empty());
    }

    #[test]
    fn expand_actions() {
        let mut d = fruit();
        let expand = |action| Command::Expand {
            zone: "fruit".into(),
            item: "apple".into(),
            action,
        };
        d.dispatch_commands(&[expand(ExpandAction::Toggle)]);
        assert!(d.store().zone_or_empty(&"fruit".into()).is_expanded(&"apple".into()));
        d.dispatch_commands(&[expand(ExpandAction::Expand)]);
        assert!(d.store().zone_or_empty(&"fruit".into()).is_expanded(&"apple".into()));
        d.dispatch_commands(&[expand(ExpandAction::Collapse)]);
        assert!(!d.store().zone_or_empty(&"fruit".into()).is_expanded(&"apple".into()));
    }

    #[test]
    fn dismiss_deactivates_zone() {
        let mut d = fruit();
        d.dispatch_commands(&[focus("fruit", "apple")]);
        d.dispatch_commands(&[Command::Dismiss {
            zone: "fruit".into(),
        }]);
        assert!(d.store().active_zone().is_none());
        assert_eq!(d.app().dismissed, [ZoneId::from("fruit")]);
    }

    #[test]
    fn empty_batch_is_not_a_dispatch() {
        let mut d = fruit();
        assert!(d.dispatch(&ResolveResult::fallback()).is_none());
        assert!(d.applied().is_empty());
    }
}
