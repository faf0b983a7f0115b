//! Core traits that decouple wsbar from any specific shell runtime or
//! transport mechanism.
//!
//! Every concrete backend (a real shell binding, the bundled simulated
//! shell, a test harness, …) implements these traits. The
//! [`WorkspaceSwitcher`](crate::switcher::WorkspaceSwitcher) and the
//! display variants only depend on these abstractions.

use crate::config::Position;
use crate::event::ShellCommand;
use crate::signals::{SignalEmitter, SignalId};
use std::sync::mpsc;

/// Opaque handle to a panel actor (label, icon, or container) owned by a
/// [`PanelHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActorId(pub u32);

/// Abstraction over the shell's workspace manager.
///
/// The switcher only observes workspaces, never creates or removes them;
/// the one mutating call is [`activate`](WorkspaceProvider::activate).
/// Workspace signals (`workspace-added`, `workspace-removed`,
/// `workspace-switched`) are registered through [`SignalEmitter`].
pub trait WorkspaceProvider: SignalEmitter {
    /// Number of workspaces. Always at least 1.
    fn count(&self) -> usize;

    /// Index of the active workspace, in `[0, count)`.
    fn active_index(&self) -> usize;

    /// Make the workspace at `index` active.
    ///
    /// `timestamp` is the event time of the user input that caused the
    /// switch, as returned by [`current_time`](WorkspaceProvider::current_time).
    /// Activating the already-active index is an accepted no-op.
    fn activate(&self, index: usize, timestamp: u32);

    /// The user-defined name of the workspace at `index`, or `None` if the
    /// shell has no name for it.
    fn workspace_name(&self, index: usize) -> Option<String>;

    /// The shell's notion of the current event time.
    fn current_time(&self) -> u32;
}

/// Abstraction over a typed key/value settings store with per-key change
/// notification (registered through [`SignalEmitter`] as `"changed"`).
///
/// Getters return `None` for a key the schema does not contain — the
/// caller decides whether that is fatal (it is, at enable time).
pub trait SettingsStore: SignalEmitter {
    fn get_bool(&self, key: &str) -> Option<bool>;
    fn get_int(&self, key: &str) -> Option<i32>;
    fn get_string(&self, key: &str) -> Option<String>;
    fn get_strv(&self, key: &str) -> Option<Vec<String>>;
}

/// Abstraction over the shell panel and its actor toolkit.
///
/// Actors are opaque handles; the host owns the real widgets. The contract
/// the switcher upholds towards the host:
///
/// * every created actor is eventually passed to
///   [`destroy_actor`](PanelHost::destroy_actor);
/// * every [`insert`](PanelHost::insert) is balanced by a
///   [`remove`](PanelHost::remove) with the same position;
/// * every [`connect_actor`](PanelHost::connect_actor) is balanced by a
///   [`disconnect_actor`](PanelHost::disconnect_actor).
pub trait PanelHost {
    /// Create an empty horizontal container.
    fn create_box(&self) -> ActorId;

    /// Create an empty text label.
    fn create_label(&self) -> ActorId;

    /// Create an icon actor for the named themed icon.
    fn create_icon(&self, icon_name: &str) -> ActorId;

    /// Create a clickable button actor.
    fn create_button(&self) -> ActorId;

    /// Append `child` to `parent`'s children.
    fn add_child(&self, parent: ActorId, child: ActorId);

    fn set_text(&self, actor: ActorId, text: &str);
    fn set_style(&self, actor: ActorId, style: &str);
    fn set_visible(&self, actor: ActorId, visible: bool);

    /// Lay out a container's children vertically instead of horizontally.
    fn set_vertical(&self, actor: ActorId, vertical: bool);

    /// Apply or clear the `active` pseudo-class on a button actor.
    fn set_pseudo_active(&self, actor: ActorId, active: bool);

    /// Destroy an actor. Destroying a container destroys its children.
    fn destroy_actor(&self, actor: ActorId);

    /// Insert `actor` into the panel box at `position`, at child `index`.
    fn insert(&self, actor: ActorId, position: Position, index: i32);

    /// Remove `actor` from the panel box at `position`.
    fn remove(&self, actor: ActorId, position: Position);

    /// Register an actor signal handler (`"clicked"`, `"scroll-event"`, …).
    fn connect_actor(&self, actor: ActorId, signal: &str) -> SignalId;

    /// Release an actor signal handler.
    fn disconnect_actor(&self, id: SignalId);

    /// Toggle the shell's activities overview.
    fn toggle_overview(&self);

    /// Toggle the workspace popup anchored to `anchor`, listing `items`
    /// with a dot ornament on `active`.
    fn toggle_popup(&self, anchor: ActorId, items: &[String], active: usize);
}

/// A source of [`ShellCommand`]s.
///
/// Implementations listen on some transport — a Unix socket, an in-memory
/// channel, a test harness — and forward parsed commands into the provided
/// [`mpsc::Sender`].
///
/// # Contract
///
/// * [`run`](EventSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Each received command must be sent through `sink` exactly once.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait EventSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming command into `sink`.
    fn run(&mut self, sink: mpsc::Sender<ShellCommand>) -> Result<(), Self::Error>;
}
