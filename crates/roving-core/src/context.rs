#![forbid(unsafe_code)]

//! Borrowed view of the stores a resolver reads.

use crate::field::FieldRegistry;
use crate::id::{ItemId, ZoneId};
use crate::keymap::{Cursor, Keymap};
use crate::registry::{ZoneEntry, ZoneRegistry};
use crate::state::FocusStore;

/// Everything a resolver may consult for one event.
///
/// All stores are explicitly constructed by the caller; several independent
/// contexts can coexist.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub zones: &'a ZoneRegistry,
    pub fields: &'a FieldRegistry,
    pub store: &'a FocusStore,
    pub keymap: &'a Keymap,
}

impl<'a> ResolveContext<'a> {
    #[must_use]
    pub const fn new(
        zones: &'a ZoneRegistry,
        fields: &'a FieldRegistry,
        store: &'a FocusStore,
        keymap: &'a Keymap,
    ) -> Self {
        Self {
            zones,
            fields,
            store,
            keymap,
        }
    }

    /// Registry entry of the active zone. Unregistered active zones read as
    /// no active zone.
    #[must_use]
    pub fn active_zone(&self) -> Option<&'a ZoneEntry> {
        self.store.active_zone().and_then(|id| self.zones.get(id))
    }

    /// Cursor over the active zone.
    #[must_use]
    pub fn cursor(&self) -> Option<Cursor<'a>> {
        let zone = self.active_zone()?;
        Some(Cursor::new(zone, self.store.zone_or_empty(&zone.id)))
    }

    /// Cursor over an arbitrary registered zone.
    #[must_use]
    pub fn cursor_for(&self, zone: &ZoneId) -> Option<Cursor<'a>> {
        let entry = self.zones.get(zone)?;
        Some(Cursor::new(entry, self.store.zone_or_empty(zone)))
    }

    /// Item being edited in the active zone.
    #[must_use]
    pub fn editing(&self) -> Option<&'a ItemId> {
        self.store.editing().map(|(_, item)| item)
    }
}
