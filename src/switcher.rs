//! The switcher lifecycle and event dispatch.
//!
//! [`WorkspaceSwitcher`] owns the whole extension state: it loads the
//! settings snapshot, builds the display for the configured mode, inserts
//! it into the panel, and reacts to every [`Event`] until it is disabled.
//! Disable tears the widget down and releases every registered signal, so
//! enable/disable cycles leave no residue in the host.

use crate::config::{ConfigError, SettingUpdate, Settings};
use crate::display::{build_display, Display, DisplayContext};
use crate::event::Event;
use crate::navigation::{activate_checked, navigate};
use crate::signals::Subscriptions;
use crate::style::StyleStore;
use crate::traits::{PanelHost, SettingsStore, WorkspaceProvider};
use log::{debug, info};
use std::cell::RefCell;
use std::rc::Rc;

/// State held only while enabled.
struct Enabled<W, H> {
    ctx: DisplayContext<W, H>,
    display: Box<dyn Display>,
    subs: Subscriptions,
}

enum State<W, H> {
    Uninitialized,
    Enabled(Enabled<W, H>),
}

/// Panel workspace switcher.
///
/// Generic over the workspace provider `W`, the settings store `S` (used
/// for both the extension settings and the preferences store carrying the
/// workspace names), and the panel host `H`.
pub struct WorkspaceSwitcher<W, S, H> {
    provider: Rc<W>,
    settings_store: Rc<S>,
    prefs_store: Rc<S>,
    host: Rc<H>,
    state: State<W, H>,
}

impl<W, S, H> WorkspaceSwitcher<W, S, H>
where
    W: WorkspaceProvider + 'static,
    S: SettingsStore + 'static,
    H: PanelHost + 'static,
{
    pub fn new(provider: Rc<W>, settings_store: Rc<S>, prefs_store: Rc<S>, host: Rc<H>) -> Self {
        Self {
            provider,
            settings_store,
            prefs_store,
            host,
            state: State::Uninitialized,
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self.state, State::Enabled(_))
    }

    /// Load settings, build the display, insert it, register signals.
    ///
    /// A settings store missing a schema key fails the enable and leaves
    /// the switcher fully uninitialized.
    pub fn enable(&mut self) -> Result<(), ConfigError> {
        if self.is_enabled() {
            debug!("enable called while already enabled");
            return Ok(());
        }
        let settings = Settings::load(&*self.settings_store)?;
        let styles = StyleStore::new(&settings);
        let mode = settings.mode;
        let ctx = DisplayContext {
            provider: self.provider.clone(),
            host: self.host.clone(),
            settings: Rc::new(RefCell::new(settings)),
            styles: Rc::new(RefCell::new(styles)),
        };
        let display = build_display(mode, ctx.clone());
        {
            let settings = ctx.settings.borrow();
            self.host
                .insert(display.root(), settings.position, settings.index);
        }

        let mut subs = Subscriptions::new();
        for signal in ["workspace-added", "workspace-removed", "workspace-switched"] {
            subs.connect(self.provider.clone(), signal);
        }
        subs.connect(self.settings_store.clone(), "changed");
        subs.connect(self.prefs_store.clone(), "changed");

        info!("enabled in {} mode", mode);
        self.state = State::Enabled(Enabled { ctx, display, subs });
        Ok(())
    }

    /// Remove the widget, destroy its actors, release every signal.
    pub fn disable(&mut self) {
        let state = std::mem::replace(&mut self.state, State::Uninitialized);
        let State::Enabled(mut enabled) = state else {
            debug!("disable called while not enabled");
            return;
        };
        let position = enabled.ctx.settings.borrow().position;
        self.host.remove(enabled.display.root(), position);
        enabled.display.destroy();
        enabled.subs.release_all();
        info!("disabled");
    }

    /// Dispatch one event. Events arriving while disabled are dropped;
    /// the host can deliver a queued signal after teardown.
    pub fn handle(&mut self, event: Event) -> Result<(), ConfigError> {
        let State::Enabled(enabled) = &mut self.state else {
            debug!("dropping event while disabled: {:?}", event);
            return Ok(());
        };
        match event {
            Event::WorkspaceAdded => enabled.display.on_added(),
            Event::WorkspaceRemoved => enabled.display.on_removed(),
            Event::WorkspaceSwitched => enabled.display.on_switched(),
            Event::NamesChanged => enabled.display.update_names(),
            Event::Scroll(direction) => {
                let (invert, cyclic) = {
                    let settings = enabled.ctx.settings.borrow();
                    (settings.invert_scrolling, settings.cyclic_scrolling)
                };
                let provider = &enabled.ctx.provider;
                let target = navigate(
                    provider.active_index(),
                    provider.count(),
                    direction,
                    invert,
                    cyclic,
                );
                activate_checked(&**provider, target);
            }
            Event::Click { workspace } => enabled.display.on_click(workspace),
            Event::PopupItemActivated(index) => {
                activate_checked(&*enabled.ctx.provider, index);
            }
            Event::PopupStateChanged(open) => enabled.display.on_popup_state(open),
            Event::SettingChanged(key) => {
                Self::apply_setting(enabled, &*self.settings_store, &key)?
            }
        }
        Ok(())
    }

    /// Patch one settings field and run the side effect it requires.
    fn apply_setting(enabled: &mut Enabled<W, H>, store: &S, key: &str) -> Result<(), ConfigError> {
        // The widget may have to be removed from the box it was in before
        // this change took effect.
        let old_position = enabled.ctx.settings.borrow().position;
        let effect = enabled.ctx.settings.borrow_mut().update(store, key)?;
        match effect {
            SettingUpdate::Nothing => {}
            SettingUpdate::Unknown => debug!("ignoring unrecognized settings key {:?}", key),
            SettingUpdate::Reinsert => {
                let (position, index) = {
                    let settings = enabled.ctx.settings.borrow();
                    (settings.position, settings.index)
                };
                let root = enabled.display.root();
                enabled.ctx.host.remove(root, position);
                enabled.ctx.host.insert(root, position, index);
            }
            SettingUpdate::Reposition => {
                let (position, index) = {
                    let settings = enabled.ctx.settings.borrow();
                    (settings.position, settings.index)
                };
                let root = enabled.display.root();
                enabled.ctx.host.remove(root, old_position);
                enabled.ctx.host.insert(root, position, index);
            }
            SettingUpdate::RebuildDisplay => {
                let (mode, position, index) = {
                    let settings = enabled.ctx.settings.borrow();
                    (settings.mode, settings.position, settings.index)
                };
                enabled.ctx.host.remove(enabled.display.root(), old_position);
                enabled.display.destroy();
                enabled.display = build_display(mode, enabled.ctx.clone());
                enabled.ctx.host.insert(enabled.display.root(), position, index);
                info!("rebuilt display in {} mode", mode);
            }
            SettingUpdate::LabelVisibility => {
                let visible = enabled.ctx.settings.borrow().show_icon_text;
                enabled.display.set_label_visible(visible);
            }
            SettingUpdate::RefreshNames => enabled.display.update_names(),
            SettingUpdate::Orientation => {
                let vertical = enabled.ctx.settings.borrow().vertical_display;
                enabled.display.set_vertical(vertical);
            }
            SettingUpdate::Style => {
                let changed = {
                    let settings = enabled.ctx.settings.borrow();
                    enabled.ctx.styles.borrow_mut().refresh(&settings, key)
                };
                if changed {
                    enabled.display.update_style();
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Position;
    use crate::event::ScrollDirection;
    use crate::shell::{SimPanel, SimStore, SimWorkspaces};

    struct Fixture {
        provider: Rc<SimWorkspaces>,
        store: Rc<SimStore>,
        prefs: Rc<SimStore>,
        host: Rc<SimPanel>,
        switcher: WorkspaceSwitcher<SimWorkspaces, SimStore, SimPanel>,
    }

    fn fixture(count: usize) -> Fixture {
        let provider = Rc::new(SimWorkspaces::new(count));
        let store = Rc::new(SimStore::with_schema_defaults());
        let prefs = Rc::new(SimStore::with_prefs_defaults());
        let host = Rc::new(SimPanel::new());
        let switcher = WorkspaceSwitcher::new(
            provider.clone(),
            store.clone(),
            prefs.clone(),
            host.clone(),
        );
        Fixture {
            provider,
            store,
            prefs,
            host,
            switcher,
        }
    }

    /// Feed the events the simulated shell queued back into the switcher,
    /// the way the daemon event loop does.
    fn pump(f: &mut Fixture) {
        for event in f.provider.drain_events() {
            f.switcher.handle(event).unwrap();
        }
    }

    #[test]
    fn enable_inserts_widget_at_configured_position() {
        let mut f = fixture(3);
        f.switcher.enable().unwrap();
        assert!(f.switcher.is_enabled());
        assert_eq!(f.host.inserted(Position::Left).len(), 1);
        assert_eq!(f.host.render(Position::Left), "1");
    }

    #[test]
    fn enable_twice_is_a_no_op() {
        let mut f = fixture(2);
        f.switcher.enable().unwrap();
        let actors = f.host.actor_count();
        f.switcher.enable().unwrap();
        assert_eq!(f.host.actor_count(), actors);
        assert_eq!(f.host.inserted(Position::Left).len(), 1);
    }

    #[test]
    fn enable_fails_cleanly_on_broken_schema() {
        let f = fixture(2);
        let store = Rc::new(SimStore::with_prefs_defaults());
        let mut switcher = WorkspaceSwitcher::new(
            f.provider.clone(),
            store.clone(),
            f.prefs.clone(),
            f.host.clone(),
        );
        assert!(matches!(
            switcher.enable(),
            Err(ConfigError::MissingKey(_))
        ));
        assert!(!switcher.is_enabled());
        assert_eq!(f.host.actor_count(), 0);
        assert_eq!(f.provider.live_signal_count(), 0);
    }

    #[test]
    fn disable_releases_every_signal_and_actor() {
        let mut f = fixture(3);
        f.store.set("mode", serde_json::json!("all"));
        f.switcher.enable().unwrap();
        f.provider.set_active(1);
        pump(&mut f);
        assert!(f.provider.live_signal_count() > 0);
        assert!(f.host.live_handler_count() > 0);

        f.switcher.disable();
        assert_eq!(f.provider.live_signal_count(), 0);
        assert_eq!(f.store.live_signal_count(), 0);
        assert_eq!(f.prefs.live_signal_count(), 0);
        assert_eq!(f.host.live_handler_count(), 0);
        assert_eq!(f.host.actor_count(), 0);
        assert!(f.host.inserted(Position::Left).is_empty());
    }

    #[test]
    fn events_after_disable_are_dropped() {
        let mut f = fixture(2);
        f.switcher.enable().unwrap();
        f.switcher.disable();
        f.switcher.handle(Event::WorkspaceSwitched).unwrap();
        f.switcher
            .handle(Event::Scroll(ScrollDirection::Up))
            .unwrap();
        assert_eq!(f.provider.active_index(), 0);
    }

    #[test]
    fn scroll_cycles_through_workspaces() {
        let mut f = fixture(3);
        f.switcher.enable().unwrap();

        f.switcher
            .handle(Event::Scroll(ScrollDirection::Up))
            .unwrap();
        pump(&mut f);
        assert_eq!(f.provider.active_index(), 1);

        f.provider.set_active(2);
        pump(&mut f);
        f.switcher
            .handle(Event::Scroll(ScrollDirection::Up))
            .unwrap();
        pump(&mut f);
        assert_eq!(f.provider.active_index(), 0, "cyclic wrap at the end");
    }

    #[test]
    fn scroll_clamps_when_cyclic_is_off() {
        let mut f = fixture(3);
        f.store.set("cyclic-scrolling", serde_json::json!(false));
        f.switcher.enable().unwrap();
        f.switcher
            .handle(Event::Scroll(ScrollDirection::Down))
            .unwrap();
        assert_eq!(f.provider.active_index(), 0);
    }

    #[test]
    fn invert_scrolling_flips_direction() {
        let mut f = fixture(3);
        f.switcher.enable().unwrap();
        f.store.set("invert-scrolling", serde_json::json!(true));
        f.switcher
            .handle(Event::SettingChanged("invert-scrolling".into()))
            .unwrap();

        f.switcher
            .handle(Event::Scroll(ScrollDirection::Up))
            .unwrap();
        pump(&mut f);
        assert_eq!(f.provider.active_index(), 2, "inverted up wraps backwards");
    }

    #[test]
    fn mode_change_rebuilds_display() {
        let mut f = fixture(3);
        f.switcher.enable().unwrap();
        assert_eq!(f.host.render(Position::Left), "1");

        f.store.set("mode", serde_json::json!("all"));
        f.switcher
            .handle(Event::SettingChanged("mode".into()))
            .unwrap();
        assert_eq!(f.host.inserted(Position::Left).len(), 1);
        assert_eq!(f.host.render(Position::Left), "1  2  3");

        // The old display left nothing behind.
        f.switcher.disable();
        assert_eq!(f.host.live_handler_count(), 0);
        assert_eq!(f.host.actor_count(), 0);
    }

    #[test]
    fn position_change_moves_widget_between_boxes() {
        let mut f = fixture(2);
        f.switcher.enable().unwrap();
        assert_eq!(f.host.inserted(Position::Left).len(), 1);

        f.store.set("position", serde_json::json!("right"));
        f.switcher
            .handle(Event::SettingChanged("position".into()))
            .unwrap();
        assert!(f.host.inserted(Position::Left).is_empty());
        assert_eq!(f.host.inserted(Position::Right).len(), 1);
    }

    #[test]
    fn style_key_change_restyles_display() {
        let mut f = fixture(2);
        f.store.set("mode", serde_json::json!("all"));
        f.switcher.enable().unwrap();
        f.host.take_style_log();

        f.store
            .set("background-colour-active", serde_json::json!("#ff0000ff"));
        f.switcher
            .handle(Event::SettingChanged("background-colour-active".into()))
            .unwrap();
        let log = f.host.take_style_log();
        assert_eq!(log.len(), 2, "both elements restyled");
        assert!(log
            .iter()
            .any(|(_, style)| style.contains("rgba(255,0,0,1)")));
    }

    #[test]
    fn unknown_setting_key_changes_nothing() {
        let mut f = fixture(2);
        f.switcher.enable().unwrap();
        f.host.take_style_log();
        f.switcher
            .handle(Event::SettingChanged("shiny-new-option".into()))
            .unwrap();
        assert!(f.host.take_style_log().is_empty());
    }

    #[test]
    fn workspace_lifecycle_flows_through_to_the_panel() {
        let mut f = fixture(2);
        f.store.set("mode", serde_json::json!("all"));
        f.switcher.enable().unwrap();

        f.provider.add();
        pump(&mut f);
        assert_eq!(f.host.render(Position::Left), "1  2  3");

        f.provider.set_active(2);
        pump(&mut f);
        f.provider.remove();
        pump(&mut f);
        assert_eq!(f.provider.active_index(), 1);
        assert_eq!(f.host.render(Position::Left), "1  2");
    }

    #[test]
    fn popup_item_activates_workspace() {
        let mut f = fixture(4);
        f.switcher.enable().unwrap();
        f.switcher.handle(Event::PopupItemActivated(3)).unwrap();
        pump(&mut f);
        assert_eq!(f.provider.active_index(), 3);
    }

    #[test]
    fn names_change_rerenders_labels() {
        let mut f = fixture(2);
        f.store.set("mode", serde_json::json!("all"));
        f.store.set("use-names", serde_json::json!(true));
        f.switcher.enable().unwrap();
        f.provider
            .set_names(vec!["web".into(), "chat".into()]);
        f.switcher.handle(Event::NamesChanged).unwrap();
        assert_eq!(f.host.render(Position::Left), "web  chat");
    }
}
