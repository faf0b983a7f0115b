//! Events and commands used throughout wsbar.
//!
//! This module defines the vocabulary that all components share:
//! [`Event`] describes every notification the switcher reacts to, and
//! [`ShellCommand`] is the wire format a harness uses to drive the
//! simulated shell. [`ScrollDirection`] is the supporting input type.
//!
//! The daemon parses lenient direction strings ("up", "Down", "UP") so a
//! shell one-liner like `{"Scroll":"up"}` works without exact casing.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Direction of a pointer scroll over the widget.
///
/// Scroll axes the widget does not handle (horizontal, smooth deltas that
/// resolve to neither axis end) never produce a value of this type, so the
/// navigation arithmetic never sees a zero delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ScrollDirection {
    Up,
    Down,
}

impl ScrollDirection {
    /// The index delta this direction contributes before inversion:
    /// scrolling up moves towards higher indices, down towards lower ones.
    pub fn delta(self) -> i64 {
        match self {
            ScrollDirection::Up => 1,
            ScrollDirection::Down => -1,
        }
    }
}

impl fmt::Display for ScrollDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScrollDirection::Up => write!(f, "up"),
            ScrollDirection::Down => write!(f, "down"),
        }
    }
}

/// Parse a scroll direction string (case-insensitive).
fn parse_scroll_direction(s: &str) -> Option<ScrollDirection> {
    match s.trim().to_lowercase().as_str() {
        "up" => Some(ScrollDirection::Up),
        "down" => Some(ScrollDirection::Down),
        _ => None,
    }
}

impl<'de> Deserialize<'de> for ScrollDirection {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_scroll_direction(&s)
            .ok_or_else(|| DeError::custom(format!("invalid scroll direction: {:?}", s)))
    }
}

/// Every notification the [`WorkspaceSwitcher`](crate::switcher::WorkspaceSwitcher)
/// reacts to.
///
/// Workspace events carry no payload: the switcher re-reads the live count
/// and active index from the [`WorkspaceProvider`](crate::traits::WorkspaceProvider)
/// when it handles them, exactly as a shell signal handler would.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// A workspace was appended at the highest index.
    WorkspaceAdded,

    /// The workspace at the highest index was removed.
    WorkspaceRemoved,

    /// The active workspace changed.
    WorkspaceSwitched,

    /// A value in the settings store changed; the payload is the setting key.
    SettingChanged(String),

    /// The user-defined workspace names list changed.
    NamesChanged,

    /// The pointer scrolled over the widget.
    Scroll(ScrollDirection),

    /// A display element was clicked. In ALL mode `workspace` identifies
    /// the clicked slot; in Current/Icon mode there is only one button and
    /// the field is `None`.
    Click { workspace: Option<usize> },

    /// An entry of the workspace popup was activated.
    PopupItemActivated(usize),

    /// The workspace popup opened (`true`) or closed (`false`).
    PopupStateChanged(bool),
}

/// Commands accepted by the simulated shell over the harness socket.
///
/// Commands mutate host-side state first (workspace count, active index,
/// settings values); the main loop then forwards the matching [`Event`]s to
/// the switcher, reproducing the order a real shell delivers its signals in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShellCommand {
    /// Append a workspace at the highest index.
    AddWorkspace,

    /// Remove the workspace at the highest index (the shell keeps at least
    /// one workspace and clamps the active index).
    RemoveWorkspace,

    /// Activate the workspace at `index`, if it exists.
    SwitchTo(usize),

    /// Scroll over the widget.
    Scroll(ScrollDirection),

    /// Click a display element (see [`Event::Click`]).
    Click { workspace: Option<usize> },

    /// Activate a workspace popup entry.
    PopupItem(usize),

    /// Write one settings value. `"workspace-names"` is routed to the
    /// preferences store; everything else to the extension store.
    Set { key: String, value: serde_json::Value },
}
