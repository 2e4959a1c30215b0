#![forbid(unsafe_code)]

//! Mouse and click resolution.
//!
//! A click arrives in two phases that mirror native press/click timing:
//!
//! - [`resolve_mouse`] handles the press. It focuses and selects the target
//!   and, for expandable items whose role does not expand on click, toggles
//!   expansion right away.
//! - [`resolve_click`] handles the click that follows on the same target and
//!   decides activation. By default only a re-click of the item that was
//!   focused before the sequence began activates, so one unmodified click can
//!   either select a row or open it.

use crate::command::{Command, ResolveLayer, ResolveResult, SelectMode};
use crate::context::ResolveContext;
use crate::event::{ClickInput, Modifiers, MouseInput};
use crate::id::{ItemId, ZoneId};
use crate::item;
use crate::registry::{ItemEntry, OutsideClickBehavior, ZoneEntry};

/// Commands the active zone's outside-click policy emits for a press whose
/// target zone is `target`.
fn outside_click(ctx: &ResolveContext<'_>, target: Option<&ZoneId>) -> Vec<Command> {
    let Some(active) = ctx.active_zone() else {
        return Vec::new();
    };
    if target == Some(&active.id) {
        return Vec::new();
    }
    let zone = active.id.clone();
    match active.config.dismiss.outside_click {
        OutsideClickBehavior::None => Vec::new(),
        OutsideClickBehavior::Deselect => vec![Command::Deselect { zone }],
        OutsideClickBehavior::Close => vec![Command::Dismiss { zone }],
    }
}

/// Registered zone and item a press or click lands on.
fn target<'a>(
    ctx: &ResolveContext<'a>,
    zone: Option<&ZoneId>,
    item: Option<&ItemId>,
) -> Option<(&'a ZoneEntry, &'a ItemEntry)> {
    let zone = ctx.zones.get(zone?)?;
    let item = zone.item(item?)?;
    Some((zone, item))
}

/// Resolve the press phase of a click.
#[must_use]
pub fn resolve_mouse(input: &MouseInput, ctx: &ResolveContext<'_>) -> ResolveResult {
    #[cfg(feature = "tracing")]
    let _span = tracing::debug_span!(
        "roving.mouse",
        zone = input.zone.as_ref().map(ZoneId::as_str),
        item = input.item.as_ref().map(ItemId::as_str),
        modifiers = input.modifiers.bits()
    )
    .entered();

    if !input.button.is_primary() {
        return ResolveResult::fallback();
    }

    let mut commands = outside_click(ctx, input.zone.as_ref());

    let Some((zone, item)) = target(ctx, input.zone.as_ref(), input.item.as_ref()) else {
        return if commands.is_empty() {
            ResolveResult::fallback()
        } else {
            ResolveResult::passive(ResolveLayer::Mouse, commands)
        };
    };

    commands.push(Command::Focus {
        zone: zone.id.clone(),
        item: item.id.clone(),
    });
    if !input.label_redirect {
        commands.push(Command::Select {
            zone: zone.id.clone(),
            item: item.id.clone(),
            mode: SelectMode::from_modifiers(input.modifiers),
        });
    }

    // The host still places the native caret inside the field being edited.
    if ctx.store.zone_or_empty(&zone.id).is_editing(&item.id) {
        return ResolveResult::passive(ResolveLayer::Mouse, commands);
    }

    let role = input.role.unwrap_or(item.role);
    if (input.expandable || item.expandable)
        && !role.expands_on_click()
        && let Some(cursor) = ctx.cursor_for(&zone.id)
    {
        commands.extend(item::activation(&cursor, &item.id, true, false));
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(commands = commands.len(), "press resolved");
    ResolveResult::handled(ResolveLayer::Mouse, commands)
}

fn is_modified(modifiers: Modifiers) -> bool {
    modifiers.intersects(Modifiers::SHIFT | Modifiers::CTRL | Modifiers::SUPER)
}

/// Resolve the click phase: decide whether the target activates.
#[must_use]
pub fn resolve_click(input: &ClickInput, ctx: &ResolveContext<'_>) -> ResolveResult {
    #[cfg(feature = "tracing")]
    let _span = tracing::debug_span!(
        "roving.click",
        zone = input.zone.as_ref().map(ZoneId::as_str),
        item = input.item.as_ref().map(ItemId::as_str),
        current_page = input.current_page
    )
    .entered();

    let Some((zone, item)) = target(ctx, input.zone.as_ref(), input.item.as_ref()) else {
        return ResolveResult::fallback();
    };
    if input.prior.editing.as_ref() == Some(&item.id) {
        return ResolveResult::fallback();
    }

    let expandable = input.expandable || item.expandable;
    let editable = input.editable || item.editable;
    let role = input.role.unwrap_or(item.role);

    // Already toggled on the press.
    if expandable && !role.expands_on_click() && !input.current_page {
        return ResolveResult::fallback();
    }

    let policy = zone.config.activate;
    let activate = if input.current_page {
        true
    } else if input.prior.editing.is_some() && editable {
        true
    } else if is_modified(input.modifiers) || !policy.on_click {
        false
    } else if policy.re_click_only {
        input.prior.focused.as_ref() == Some(&item.id)
    } else {
        true
    };

    #[cfg(feature = "tracing")]
    tracing::debug!(activate, "click resolved");

    if !activate {
        return ResolveResult::fallback();
    }
    match ctx.cursor_for(&zone.id) {
        Some(cursor) => ResolveResult::handled(
            ResolveLayer::Click,
            item::activation(&cursor, &item.id, expandable, editable),
        ),
        None => ResolveResult::fallback(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::ExpandAction;
    use crate::event::{MouseButton, PriorFocus};
    use crate::field::FieldRegistry;
    use crate::keymap::Keymap;
    use crate::registry::{ActivatePolicy, ItemRole, ZoneConfig, ZoneRegistry, ZoneRole};
    use crate::state::FocusStore;

    struct Fixture {
        zones: ZoneRegistry,
        fields: FieldRegistry,
        store: FocusStore,
        keymap: Keymap,
    }

    impl Fixture {
        fn new(zones: impl IntoIterator<Item = ZoneEntry>) -> Self {
            let mut registry = ZoneRegistry::new();
            for zone in zones {
                registry.register(zone);
            }
            Self {
                zones: registry,
                fields: FieldRegistry::new(),
                store: FocusStore::new(),
                keymap: Keymap::defaults(),
            }
        }

        fn ctx(&self) -> ResolveContext<'_> {
            ResolveContext::new(&self.zones, &self.fields, &self.store, &self.keymap)
        }

        fn focus(&mut self, zone: &str, item: &str) {
            let zone = ZoneId::from(zone);
            self.store.zone_mut(&zone).focused_item_id = Some(item.into());
            self.store.set_active_zone(Some(zone));
        }

        fn prior(&self, zone: &str) -> PriorFocus {
            PriorFocus::capture(&self.store, &zone.into())
        }
    }

    fn fruit() -> ZoneEntry {
        ZoneEntry::new("fruit", ZoneRole::Listbox).with_items(["apple", "banana", "cherry"])
    }

    fn names(result: &ResolveResult) -> Vec<&'static str> {
        result.commands.iter().map(Command::name).collect()
    }

    #[test]
    fn press_focuses_then_selects() {
        let fixture = Fixture::new([fruit()]);
        let result = resolve_mouse(&MouseInput::on_item("fruit", "banana"), &fixture.ctx());
        assert_eq!(
            result.commands,
            vec![
                Command::Focus {
                    zone: "fruit".into(),
                    item: "banana".into(),
                },
                Command::Select {
                    zone: "fruit".into(),
                    item: "banana".into(),
                    mode: SelectMode::Replace,
                },
            ]
        );
        assert!(result.prevent_default);
        assert_eq!(result.meta.layer, Some(ResolveLayer::Mouse));
    }

    #[test]
    fn press_select_mode_follows_modifiers() {
        let fixture = Fixture::new([fruit()]);
        for (modifiers, mode) in [
            (Modifiers::SHIFT, SelectMode::Range),
            (Modifiers::CTRL, SelectMode::Toggle),
            (Modifiers::SUPER, SelectMode::Toggle),
            (Modifiers::ALT, SelectMode::Replace),
        ] {
            let input = MouseInput::on_item("fruit", "apple").with_modifiers(modifiers);
            let result = resolve_mouse(&input, &fixture.ctx());
            assert!(
                matches!(&result.commands[1], Command::Select { mode: m, .. } if *m == mode),
                "{modifiers:?}"
            );
        }
    }

    #[test]
    fn label_redirect_skips_select() {
        let fixture = Fixture::new([fruit()]);
        let input = MouseInput::on_item("fruit", "apple").label_redirected();
        assert_eq!(names(&resolve_mouse(&input, &fixture.ctx())), ["focus"]);
    }

    #[test]
    fn secondary_button_falls_back() {
        let fixture = Fixture::new([fruit()]);
        let input = MouseInput::on_item("fruit", "apple").with_button(MouseButton::Right);
        assert!(resolve_mouse(&input, &fixture.ctx()).fallback);
    }

    #[test]
    fn unknown_targets_fall_back() {
        let fixture = Fixture::new([fruit()]);
        let ctx = fixture.ctx();
        assert!(resolve_mouse(&MouseInput::on_item("fruit", "ghost"), &ctx).fallback);
        assert!(resolve_mouse(&MouseInput::on_item("ghost", "apple"), &ctx).fallback);
        assert!(resolve_mouse(&MouseInput::outside(), &ctx).fallback);
        assert!(resolve_click(&ClickInput::on_item("fruit", "ghost"), &ctx).fallback);
    }

    #[test]
    fn expandable_option_toggles_on_press() {
        let zone = ZoneEntry::new("fruit", ZoneRole::Listbox)
            .with_item(ItemEntry::new("citrus", ItemRole::Option).expandable());
        let fixture = Fixture::new([zone]);
        let result = resolve_mouse(&MouseInput::on_item("fruit", "citrus"), &fixture.ctx());
        assert_eq!(names(&result), ["focus", "select", "expand"]);

        // The click phase must not toggle a second time.
        let click = ClickInput::on_item("fruit", "citrus").with_prior(PriorFocus {
            focused: Some("citrus".into()),
            editing: None,
        });
        assert!(resolve_click(&click, &fixture.ctx()).fallback);
    }

    #[test]
    fn tree_item_expands_on_re_click_only() {
        let tree = ZoneEntry::new("outline", ZoneRole::Tree)
            .with_item(ItemEntry::new("root", ItemRole::TreeItem).expandable());
        let mut fixture = Fixture::new([tree]);

        let press = resolve_mouse(&MouseInput::on_item("outline", "root"), &fixture.ctx());
        assert_eq!(names(&press), ["focus", "select"]);

        let first = ClickInput::on_item("outline", "root").with_prior(fixture.prior("outline"));
        assert!(resolve_click(&first, &fixture.ctx()).fallback);

        fixture.focus("outline", "root");
        let again = ClickInput::on_item("outline", "root").with_prior(fixture.prior("outline"));
        assert_eq!(
            resolve_click(&again, &fixture.ctx()).commands,
            vec![Command::Expand {
                zone: "outline".into(),
                item: "root".into(),
                action: ExpandAction::Toggle,
            }]
        );
    }

    #[test]
    fn re_click_activates() {
        let mut fixture = Fixture::new([fruit()]);

        let first = ClickInput::on_item("fruit", "apple").with_prior(fixture.prior("fruit"));
        assert!(resolve_click(&first, &fixture.ctx()).fallback);

        fixture.focus("fruit", "apple");
        let again = ClickInput::on_item("fruit", "apple").with_prior(fixture.prior("fruit"));
        let result = resolve_click(&again, &fixture.ctx());
        assert_eq!(names(&result), ["activate"]);
        assert_eq!(result.meta.layer, Some(ResolveLayer::Click));

        let other = ClickInput::on_item("fruit", "banana").with_prior(fixture.prior("fruit"));
        assert!(resolve_click(&other, &fixture.ctx()).fallback);
    }

    #[test]
    fn modified_re_click_does_not_activate() {
        let mut fixture = Fixture::new([fruit()]);
        fixture.focus("fruit", "apple");
        let click = ClickInput::on_item("fruit", "apple")
            .with_prior(fixture.prior("fruit"))
            .with_modifiers(Modifiers::CTRL);
        assert!(resolve_click(&click, &fixture.ctx()).fallback);
    }

    #[test]
    fn current_page_always_activates() {
        let fixture = Fixture::new([fruit()]);
        let click = ClickInput::on_item("fruit", "cherry").current_page();
        assert_eq!(names(&resolve_click(&click, &fixture.ctx())), ["activate"]);
    }

    #[test]
    fn editing_transfers_to_other_editable() {
        let zone = ZoneEntry::new("fruit", ZoneRole::Listbox)
            .with_item(ItemEntry::new("apple", ItemRole::Option).editable())
            .with_item(ItemEntry::new("banana", ItemRole::Option).editable());
        let fixture = Fixture::new([zone]);
        let prior = PriorFocus {
            focused: Some("apple".into()),
            editing: Some("apple".into()),
        };

        let other = ClickInput::on_item("fruit", "banana").with_prior(prior.clone());
        assert_eq!(
            resolve_click(&other, &fixture.ctx()).commands,
            vec![Command::StartEdit {
                zone: "fruit".into(),
                item: "banana".into(),
            }]
        );

        let same = ClickInput::on_item("fruit", "apple").with_prior(prior);
        assert!(resolve_click(&same, &fixture.ctx()).fallback);
    }

    #[test]
    fn activate_policy_variants() {
        let eager = fruit().with_config(ZoneConfig {
            activate: ActivatePolicy {
                on_click: true,
                re_click_only: false,
            },
            ..ZoneRole::Listbox.default_config()
        });
        let fixture = Fixture::new([eager]);
        let click = ClickInput::on_item("fruit", "apple");
        assert_eq!(names(&resolve_click(&click, &fixture.ctx())), ["activate"]);

        let never = fruit().with_config(ZoneConfig {
            activate: ActivatePolicy {
                on_click: false,
                re_click_only: false,
            },
            ..ZoneRole::Listbox.default_config()
        });
        let mut fixture = Fixture::new([never]);
        fixture.focus("fruit", "apple");
        let click = ClickInput::on_item("fruit", "apple").with_prior(fixture.prior("fruit"));
        assert!(resolve_click(&click, &fixture.ctx()).fallback);
    }

    #[test]
    fn outside_press_closes_menu() {
        let menu = ZoneEntry::new("menu", ZoneRole::Menu).with_items(["cut", "copy"]);
        let mut fixture = Fixture::new([menu, fruit()]);
        fixture.focus("menu", "cut");

        let result = resolve_mouse(&MouseInput::outside(), &fixture.ctx());
        assert_eq!(result.commands, vec![Command::Dismiss { zone: "menu".into() }]);
        assert!(!result.prevent_default);

        let result = resolve_mouse(&MouseInput::on_item("fruit", "apple"), &fixture.ctx());
        assert_eq!(names(&result), ["dismiss", "focus", "select"]);

        let inside = resolve_mouse(&MouseInput::on_item("menu", "copy"), &fixture.ctx());
        assert_eq!(names(&inside), ["focus", "select"]);
    }

    #[test]
    fn press_in_editing_item_keeps_native_caret() {
        let mut fixture = Fixture::new([fruit()]);
        fixture.focus("fruit", "apple");
        fixture.store.zone_mut(&"fruit".into()).editing_item_id = Some("apple".into());

        let result = resolve_mouse(&MouseInput::on_item("fruit", "apple"), &fixture.ctx());
        assert_eq!(names(&result), ["focus", "select"]);
        assert!(!result.fallback);
        assert!(!result.prevent_default);
    }
}
