//! In-process simulated shell.
//!
//! Implements the three host traits without any real shell runtime:
//!
//! * [`SimWorkspaces`] — a workspace manager with host-side semantics
//!   (append at the end, clamp the active index on removal) that queues the
//!   events a real shell would deliver after each mutation.
//! * [`SimStore`] — a settings store seeded from schema defaults, optionally
//!   overlaid with values from a JSON file.
//! * [`SimPanel`] — an actor tree that records texts, styles, insertions,
//!   and signal handlers, and can render the panel row as a string.
//!
//! The daemon binary runs the switcher against these; the switcher and
//! display tests use them as recording fixtures.

use crate::config::Position;
use crate::event::Event;
use crate::signals::{SignalEmitter, SignalId};
use crate::traits::{ActorId, PanelHost, SettingsStore, WorkspaceProvider};
use log::{debug, info};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::Path;

//  Workspaces

/// Simulated workspace manager.
///
/// Mutators (`add`, `remove`, `set_active`) change state immediately and
/// queue the corresponding [`Event`]s; the event loop drains the queue with
/// [`drain_events`](SimWorkspaces::drain_events) after every step, which
/// reproduces the host's signal ordering.
pub struct SimWorkspaces {
    count: Cell<usize>,
    active: Cell<usize>,
    names: RefCell<Vec<String>>,
    clock: Cell<u32>,
    pending: RefCell<Vec<Event>>,
    next_signal: Cell<u64>,
    live_signals: RefCell<Vec<SignalId>>,
}

impl SimWorkspaces {
    pub fn new(count: usize) -> Self {
        Self {
            count: Cell::new(count.max(1)),
            active: Cell::new(0),
            names: RefCell::new(Vec::new()),
            clock: Cell::new(0),
            pending: RefCell::new(Vec::new()),
            next_signal: Cell::new(0),
            live_signals: RefCell::new(Vec::new()),
        }
    }

    /// Append a workspace at the highest index.
    pub fn add(&self) {
        self.count.set(self.count.get() + 1);
        self.pending.borrow_mut().push(Event::WorkspaceAdded);
    }

    /// Remove the workspace at the highest index. The shell never drops the
    /// last workspace, and clamps the active index before announcing the
    /// removal is done.
    pub fn remove(&self) {
        let count = self.count.get();
        if count <= 1 {
            debug!("ignoring removal of the last workspace");
            return;
        }
        self.count.set(count - 1);
        let switched = self.active.get() >= count - 1;
        if switched {
            self.active.set(count - 2);
        }
        let mut pending = self.pending.borrow_mut();
        pending.push(Event::WorkspaceRemoved);
        if switched {
            pending.push(Event::WorkspaceSwitched);
        }
    }

    /// Host-side workspace switch.
    pub fn set_active(&self, index: usize) {
        if index >= self.count.get() {
            debug!("ignoring switch to nonexistent workspace {}", index);
            return;
        }
        if self.active.get() != index {
            self.active.set(index);
            self.pending.borrow_mut().push(Event::WorkspaceSwitched);
        }
    }

    /// Replace the user-defined names list.
    pub fn set_names(&self, names: Vec<String>) {
        *self.names.borrow_mut() = names;
    }

    /// Take the queued events, oldest first.
    pub fn drain_events(&self) -> Vec<Event> {
        self.pending.borrow_mut().drain(..).collect()
    }

    /// Number of handlers currently registered and not yet disconnected.
    pub fn live_signal_count(&self) -> usize {
        self.live_signals.borrow().len()
    }
}

impl SignalEmitter for SimWorkspaces {
    fn connect(&self, signal: &str) -> SignalId {
        let id = SignalId(self.next_signal.get());
        self.next_signal.set(id.0 + 1);
        self.live_signals.borrow_mut().push(id);
        debug!("workspaces: connect {:?} -> {:?}", signal, id);
        id
    }

    fn disconnect(&self, id: SignalId) {
        self.live_signals.borrow_mut().retain(|&l| l != id);
    }
}

impl WorkspaceProvider for SimWorkspaces {
    fn count(&self) -> usize {
        self.count.get()
    }

    fn active_index(&self) -> usize {
        self.active.get()
    }

    fn activate(&self, index: usize, _timestamp: u32) {
        self.set_active(index);
    }

    fn workspace_name(&self, index: usize) -> Option<String> {
        self.names
            .borrow()
            .get(index)
            .filter(|name| !name.is_empty())
            .cloned()
    }

    fn current_time(&self) -> u32 {
        let t = self.clock.get() + 1;
        self.clock.set(t);
        t
    }
}

//  Settings store

/// Simulated settings store backed by a JSON value map.
pub struct SimStore {
    values: RefCell<HashMap<String, serde_json::Value>>,
    next_signal: Cell<u64>,
    live_signals: RefCell<Vec<SignalId>>,
}

/// Error from loading a settings overlay file.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[error("{path} must contain a JSON object of key/value pairs")]
    NotAnObject { path: String },
}

impl SimStore {
    fn from_pairs(pairs: &[(&str, serde_json::Value)]) -> Self {
        let store = Self {
            values: RefCell::new(HashMap::new()),
            next_signal: Cell::new(0),
            live_signals: RefCell::new(Vec::new()),
        };
        for (key, value) in pairs {
            store
                .values
                .borrow_mut()
                .insert((*key).to_string(), value.clone());
        }
        store
    }

    /// The extension schema with its compiled-in defaults.
    pub fn with_schema_defaults() -> Self {
        use serde_json::json;
        Self::from_pairs(&[
            ("mode", json!("current")),
            ("position", json!("left")),
            ("index", json!(0)),
            ("click-action", json!("activities")),
            ("cyclic-scrolling", json!(true)),
            ("invert-scrolling", json!(false)),
            ("show-total-num", json!(false)),
            ("use-names", json!(false)),
            ("show-icon-text", json!(true)),
            ("vertical-display", json!(false)),
            ("margin-vertical", json!(0)),
            ("margin-horizontal", json!(1)),
            ("min-height", json!(0)),
            ("min-width", json!(20)),
            ("padding-vertical", json!(0)),
            ("padding-horizontal", json!(8)),
            ("border-radius", json!(0)),
            ("border-size-active", json!(0)),
            ("border-size-inactive", json!(0)),
            ("border-locations", json!(["BOTTOM"])),
            ("background-colour-active", json!("#00000000")),
            ("background-colour-inactive", json!("#00000000")),
            ("border-colour-active", json!("#ffffffff")),
            ("border-colour-inactive", json!("#ffffff80")),
            ("font-colour-use-custom-active", json!(false)),
            ("font-colour-use-custom-inactive", json!(false)),
            ("font-colour-active", json!("#ffffffff")),
            ("font-colour-inactive", json!("#ccccccff")),
            ("font-use-custom-active", json!(false)),
            ("font-use-custom-inactive", json!(false)),
            ("font-active", json!("Sans 10")),
            ("font-inactive", json!("Sans 10")),
        ])
    }

    /// The preferences schema carrying the workspace names list.
    pub fn with_prefs_defaults() -> Self {
        Self::from_pairs(&[("workspace-names", serde_json::json!([]))])
    }

    /// Overlay values from a JSON object file on top of the current
    /// contents. Keys the file does not mention keep their defaults.
    pub fn overlay_file(&self, path: &Path) -> Result<(), StoreError> {
        let display = path.display().to_string();
        let contents = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: display.clone(),
            source,
        })?;
        let parsed: serde_json::Value =
            serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
                path: display.clone(),
                source,
            })?;
        let object = parsed
            .as_object()
            .ok_or(StoreError::NotAnObject { path: display })?;
        let mut values = self.values.borrow_mut();
        for (key, value) in object {
            values.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    /// Write one value. The caller is responsible for forwarding the
    /// matching `changed` event.
    pub fn set(&self, key: &str, value: serde_json::Value) {
        self.values.borrow_mut().insert(key.to_string(), value);
    }

    pub fn live_signal_count(&self) -> usize {
        self.live_signals.borrow().len()
    }
}

impl SignalEmitter for SimStore {
    fn connect(&self, signal: &str) -> SignalId {
        let id = SignalId(self.next_signal.get());
        self.next_signal.set(id.0 + 1);
        self.live_signals.borrow_mut().push(id);
        debug!("store: connect {:?} -> {:?}", signal, id);
        id
    }

    fn disconnect(&self, id: SignalId) {
        self.live_signals.borrow_mut().retain(|&l| l != id);
    }
}

impl SettingsStore for SimStore {
    fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.borrow().get(key)?.as_bool()
    }

    fn get_int(&self, key: &str) -> Option<i32> {
        self.values.borrow().get(key)?.as_i64().map(|n| n as i32)
    }

    fn get_string(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key)?.as_str().map(String::from)
    }

    fn get_strv(&self, key: &str) -> Option<Vec<String>> {
        self.values
            .borrow()
            .get(key)?
            .as_array()?
            .iter()
            .map(|v| v.as_str().map(String::from))
            .collect()
    }
}

//  Panel

#[derive(Debug, Clone, PartialEq, Eq)]
enum ActorKind {
    Box,
    Label,
    Icon(String),
    Button,
}

#[derive(Debug, Clone)]
struct ActorRecord {
    kind: ActorKind,
    text: String,
    style: String,
    visible: bool,
    vertical: bool,
    pseudo_active: bool,
    children: Vec<ActorId>,
}

/// Simulated panel and actor toolkit.
///
/// Every operation is recorded so tests can assert on the resulting actor
/// tree, and [`render`](SimPanel::render) turns one panel box into a
/// human-readable row for the daemon log.
#[derive(Default)]
pub struct SimPanel {
    actors: RefCell<HashMap<ActorId, ActorRecord>>,
    next_actor: Cell<u32>,
    next_signal: Cell<u64>,
    handlers: RefCell<HashMap<SignalId, (ActorId, String)>>,
    boxes: RefCell<HashMap<Position, Vec<ActorId>>>,
    style_log: RefCell<Vec<(ActorId, String)>>,
    overview_toggles: Cell<u32>,
    popup_log: RefCell<Vec<(ActorId, Vec<String>, usize)>>,
}

impl SimPanel {
    pub fn new() -> Self {
        Self::default()
    }

    fn create(&self, kind: ActorKind) -> ActorId {
        let id = ActorId(self.next_actor.get());
        self.next_actor.set(id.0 + 1);
        self.actors.borrow_mut().insert(
            id,
            ActorRecord {
                kind,
                text: String::new(),
                style: String::new(),
                visible: true,
                vertical: false,
                pseudo_active: false,
                children: Vec::new(),
            },
        );
        id
    }

    //  Inspection

    /// Number of live (not yet destroyed) actors.
    pub fn actor_count(&self) -> usize {
        self.actors.borrow().len()
    }

    /// Number of registered-but-not-disconnected actor handlers.
    pub fn live_handler_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    /// Actors currently inserted into the panel box at `position`.
    pub fn inserted(&self, position: Position) -> Vec<ActorId> {
        self.boxes
            .borrow()
            .get(&position)
            .cloned()
            .unwrap_or_default()
    }

    pub fn children(&self, parent: ActorId) -> Vec<ActorId> {
        self.actors
            .borrow()
            .get(&parent)
            .map(|a| a.children.clone())
            .unwrap_or_default()
    }

    pub fn text(&self, actor: ActorId) -> String {
        self.actors
            .borrow()
            .get(&actor)
            .map(|a| a.text.clone())
            .unwrap_or_default()
    }

    pub fn style(&self, actor: ActorId) -> String {
        self.actors
            .borrow()
            .get(&actor)
            .map(|a| a.style.clone())
            .unwrap_or_default()
    }

    pub fn visible(&self, actor: ActorId) -> bool {
        self.actors
            .borrow()
            .get(&actor)
            .map(|a| a.visible)
            .unwrap_or(false)
    }

    pub fn is_vertical(&self, actor: ActorId) -> bool {
        self.actors
            .borrow()
            .get(&actor)
            .map(|a| a.vertical)
            .unwrap_or(false)
    }

    pub fn is_pseudo_active(&self, actor: ActorId) -> bool {
        self.actors
            .borrow()
            .get(&actor)
            .map(|a| a.pseudo_active)
            .unwrap_or(false)
    }

    /// Take the record of `set_style` calls made since the last call.
    pub fn take_style_log(&self) -> Vec<(ActorId, String)> {
        self.style_log.borrow_mut().drain(..).collect()
    }

    pub fn overview_toggle_count(&self) -> u32 {
        self.overview_toggles.get()
    }

    /// Take the record of popup toggles: `(anchor, items, active)`.
    pub fn take_popup_log(&self) -> Vec<(ActorId, Vec<String>, usize)> {
        self.popup_log.borrow_mut().drain(..).collect()
    }

    /// Render the panel box at `position` as a row of visible label texts,
    /// e.g. `"1  [2]  3"` when workspace 2 is popup-highlighted.
    pub fn render(&self, position: Position) -> String {
        let mut parts = Vec::new();
        for root in self.inserted(position) {
            self.collect_texts(root, &mut parts);
        }
        parts.join("  ")
    }

    fn collect_texts(&self, actor: ActorId, out: &mut Vec<String>) {
        let (text, visible, pseudo, children, is_label) = {
            let actors = self.actors.borrow();
            let Some(record) = actors.get(&actor) else {
                return;
            };
            (
                record.text.clone(),
                record.visible,
                record.pseudo_active,
                record.children.clone(),
                record.kind == ActorKind::Label,
            )
        };
        if !visible {
            return;
        }
        if is_label && !text.is_empty() {
            if pseudo {
                out.push(format!("[{}]", text));
            } else {
                out.push(text);
            }
        }
        for child in children {
            self.collect_texts(child, out);
        }
    }

    fn destroy_recursive(&self, actor: ActorId) {
        let children = self.children(actor);
        for child in children {
            self.destroy_recursive(child);
        }
        self.actors.borrow_mut().remove(&actor);
    }
}

impl PanelHost for SimPanel {
    fn create_box(&self) -> ActorId {
        self.create(ActorKind::Box)
    }

    fn create_label(&self) -> ActorId {
        self.create(ActorKind::Label)
    }

    fn create_icon(&self, icon_name: &str) -> ActorId {
        self.create(ActorKind::Icon(icon_name.to_string()))
    }

    fn create_button(&self) -> ActorId {
        self.create(ActorKind::Button)
    }

    fn add_child(&self, parent: ActorId, child: ActorId) {
        if let Some(record) = self.actors.borrow_mut().get_mut(&parent) {
            record.children.push(child);
        }
    }

    fn set_text(&self, actor: ActorId, text: &str) {
        if let Some(record) = self.actors.borrow_mut().get_mut(&actor) {
            record.text = text.to_string();
        }
    }

    fn set_style(&self, actor: ActorId, style: &str) {
        self.style_log
            .borrow_mut()
            .push((actor, style.to_string()));
        if let Some(record) = self.actors.borrow_mut().get_mut(&actor) {
            record.style = style.to_string();
        }
    }

    fn set_visible(&self, actor: ActorId, visible: bool) {
        if let Some(record) = self.actors.borrow_mut().get_mut(&actor) {
            record.visible = visible;
        }
    }

    fn set_vertical(&self, actor: ActorId, vertical: bool) {
        if let Some(record) = self.actors.borrow_mut().get_mut(&actor) {
            record.vertical = vertical;
        }
    }

    fn set_pseudo_active(&self, actor: ActorId, active: bool) {
        if let Some(record) = self.actors.borrow_mut().get_mut(&actor) {
            record.pseudo_active = active;
        }
    }

    fn destroy_actor(&self, actor: ActorId) {
        self.destroy_recursive(actor);
        // Detach the destroyed subtree root from any surviving parent.
        for record in self.actors.borrow_mut().values_mut() {
            record.children.retain(|&c| c != actor);
        }
        for list in self.boxes.borrow_mut().values_mut() {
            list.retain(|&a| a != actor);
        }
    }

    fn insert(&self, actor: ActorId, position: Position, index: i32) {
        let mut boxes = self.boxes.borrow_mut();
        let list = boxes.entry(position).or_default();
        let index = (index.max(0) as usize).min(list.len());
        list.insert(index, actor);
    }

    fn remove(&self, actor: ActorId, position: Position) {
        if let Some(list) = self.boxes.borrow_mut().get_mut(&position) {
            list.retain(|&a| a != actor);
        }
    }

    fn connect_actor(&self, actor: ActorId, signal: &str) -> SignalId {
        let id = SignalId(self.next_signal.get());
        self.next_signal.set(id.0 + 1);
        self.handlers
            .borrow_mut()
            .insert(id, (actor, signal.to_string()));
        id
    }

    fn disconnect_actor(&self, id: SignalId) {
        self.handlers.borrow_mut().remove(&id);
    }

    fn toggle_overview(&self) {
        self.overview_toggles.set(self.overview_toggles.get() + 1);
        info!("overview toggled");
    }

    fn toggle_popup(&self, anchor: ActorId, items: &[String], active: usize) {
        self.popup_log
            .borrow_mut()
            .push((anchor, items.to_vec(), active));
        info!("popup: {:?} (active {})", items, active);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_clamps_active_and_queues_switch() {
        let ws = SimWorkspaces::new(3);
        ws.set_active(2);
        ws.drain_events();

        ws.remove();
        assert_eq!(ws.count(), 2);
        assert_eq!(ws.active_index(), 1);
        assert_eq!(
            ws.drain_events(),
            vec![Event::WorkspaceRemoved, Event::WorkspaceSwitched]
        );
    }

    #[test]
    fn remove_of_interior_active_does_not_switch() {
        let ws = SimWorkspaces::new(3);
        ws.remove();
        assert_eq!(ws.drain_events(), vec![Event::WorkspaceRemoved]);
        assert_eq!(ws.active_index(), 0);
    }

    #[test]
    fn last_workspace_cannot_be_removed() {
        let ws = SimWorkspaces::new(1);
        ws.remove();
        assert_eq!(ws.count(), 1);
        assert!(ws.drain_events().is_empty());
    }

    #[test]
    fn activate_same_index_queues_nothing() {
        let ws = SimWorkspaces::new(2);
        ws.activate(0, 1);
        assert!(ws.drain_events().is_empty());
    }

    #[test]
    fn empty_names_fall_back_to_none() {
        let ws = SimWorkspaces::new(2);
        ws.set_names(vec!["dev".into(), String::new()]);
        assert_eq!(ws.workspace_name(0).as_deref(), Some("dev"));
        assert_eq!(ws.workspace_name(1), None);
        assert_eq!(ws.workspace_name(5), None);
    }

    #[test]
    fn schema_defaults_cover_a_full_snapshot() {
        let store = SimStore::with_schema_defaults();
        crate::config::Settings::load(&store).expect("schema defaults must be loadable");
    }

    #[test]
    fn store_overlay_keeps_unmentioned_defaults() {
        let store = SimStore::with_schema_defaults();
        store.set("mode", serde_json::json!("all"));
        assert_eq!(store.get_string("mode").as_deref(), Some("all"));
        assert_eq!(store.get_int("min-width"), Some(20));
    }

    #[test]
    fn destroying_a_container_destroys_children() {
        let panel = SimPanel::new();
        let container = panel.create_box();
        let label = panel.create_label();
        panel.add_child(container, label);
        assert_eq!(panel.actor_count(), 2);

        panel.destroy_actor(container);
        assert_eq!(panel.actor_count(), 0);
    }

    #[test]
    fn destroyed_child_is_detached_from_its_parent() {
        let panel = SimPanel::new();
        let container = panel.create_box();
        let first = panel.create_label();
        let second = panel.create_label();
        panel.add_child(container, first);
        panel.add_child(container, second);

        panel.destroy_actor(second);
        assert_eq!(panel.children(container), vec![first]);
        assert_eq!(panel.actor_count(), 2);
    }

    #[test]
    fn insert_and_remove_balance() {
        let panel = SimPanel::new();
        let actor = panel.create_button();
        panel.insert(actor, Position::Right, 0);
        assert_eq!(panel.inserted(Position::Right), vec![actor]);
        panel.remove(actor, Position::Right);
        assert!(panel.inserted(Position::Right).is_empty());
    }

    #[test]
    fn render_walks_visible_labels_in_order() {
        let panel = SimPanel::new();
        let container = panel.create_box();
        for (text, visible) in [("1", true), ("2", false), ("3", true)] {
            let label = panel.create_label();
            panel.set_text(label, text);
            panel.set_visible(label, visible);
            panel.add_child(container, label);
        }
        panel.insert(container, Position::Left, 0);
        assert_eq!(panel.render(Position::Left), "1  3");
    }
}
