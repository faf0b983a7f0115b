//! Settings snapshot.
//!
//! [`Settings`] mirrors every recognized key of the settings store into a
//! plain struct. The snapshot is loaded once at enable time — a key the
//! schema does not contain is a fatal error — and afterwards live-patched
//! one field at a time as `changed` notifications arrive.
//!
//! [`Settings::update`] returns a [`SettingUpdate`] telling the switcher
//! which side effect the patched key requires (rebuild the display, move
//! the widget, recompute styles, …).

use crate::traits::SettingsStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which of the three widget renditions is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// A single label showing the active workspace.
    Current,
    /// One button per workspace, in index order.
    All,
    /// An icon plus a label showing the active workspace.
    Icon,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Current => write!(f, "current"),
            Mode::All => write!(f, "all"),
            Mode::Icon => write!(f, "icon"),
        }
    }
}

impl FromStr for Mode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s.trim().to_lowercase().as_str() {
            "current" => Ok(Mode::Current),
            "all" => Ok(Mode::All),
            "icon" => Ok(Mode::Icon),
            _ => Err(()),
        }
    }
}

/// Panel box the widget is inserted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Left,
    Center,
    Right,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Left => write!(f, "left"),
            Position::Center => write!(f, "center"),
            Position::Right => write!(f, "right"),
        }
    }
}

impl FromStr for Position {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s.trim().to_lowercase().as_str() {
            "left" => Ok(Position::Left),
            "center" => Ok(Position::Center),
            "right" => Ok(Position::Right),
            _ => Err(()),
        }
    }
}

/// What a click on the widget does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClickAction {
    /// Toggle the activities overview (Current/Icon mode) or activate the
    /// clicked workspace (All mode).
    Activities,
    /// Toggle the workspace popup.
    Popup,
    /// Ignore clicks.
    None,
}

impl FromStr for ClickAction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s.trim().to_lowercase().as_str() {
            "activities" => Ok(ClickAction::Activities),
            "popup" => Ok(ClickAction::Popup),
            "none" => Ok(ClickAction::None),
            _ => Err(()),
        }
    }
}

/// One side of a border, as listed in the `border-locations` strv.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BorderSide {
    Top,
    Right,
    Bottom,
    Left,
}

impl FromStr for BorderSide {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s.trim().to_uppercase().as_str() {
            "TOP" => Ok(BorderSide::Top),
            "RIGHT" => Ok(BorderSide::Right),
            "BOTTOM" => Ok(BorderSide::Bottom),
            "LEFT" => Ok(BorderSide::Left),
            _ => Err(()),
        }
    }
}

/// Error from reading or patching the settings snapshot.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The schema does not contain `{0}`, or it has the wrong type.
    #[error("settings key {0:?} is missing or has the wrong type")]
    MissingKey(String),

    /// The stored value is not a member of the key's enumeration.
    #[error("invalid value {value:?} for settings key {key:?}")]
    InvalidValue { key: String, value: String },
}

/// The side effect a patched key requires of the switcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingUpdate {
    /// Snapshot-only change (`click-action`, scrolling policy).
    Nothing,
    /// Re-insert the widget at the new child index.
    Reinsert,
    /// Move the widget to another panel box.
    Reposition,
    /// Tear down and rebuild the display for the new mode.
    RebuildDisplay,
    /// Show or hide the Icon-mode label.
    LabelVisibility,
    /// Refresh label texts (`show-total-num`, `use-names`).
    RefreshNames,
    /// Flip the ALL-mode container orientation.
    Orientation,
    /// Recompute the style group for `key` and restyle the display.
    Style,
    /// Not a key this extension recognizes.
    Unknown,
}

/// Snapshot of every recognized settings key, plus the mirrored active
/// workspace index.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub mode: Mode,
    pub position: Position,
    pub index: i32,
    pub click_action: ClickAction,
    pub cyclic_scrolling: bool,
    pub invert_scrolling: bool,
    pub show_total_num: bool,
    pub use_names: bool,
    pub show_icon_text: bool,
    pub vertical_display: bool,

    /// Mirror of the host's active workspace index. Not a store key; kept
    /// here because label text and styling decisions read it alongside the
    /// display options.
    pub current_workspace: usize,

    //  Style keys
    pub margin_vertical: i32,
    pub margin_horizontal: i32,
    pub min_height: i32,
    pub min_width: i32,
    pub padding_vertical: i32,
    pub padding_horizontal: i32,
    pub border_radius: i32,
    pub border_size_active: i32,
    pub border_size_inactive: i32,
    pub border_locations: Vec<BorderSide>,
    pub background_colour_active: String,
    pub background_colour_inactive: String,
    pub border_colour_active: String,
    pub border_colour_inactive: String,
    pub font_colour_use_custom_active: bool,
    pub font_colour_use_custom_inactive: bool,
    pub font_colour_active: String,
    pub font_colour_inactive: String,
    pub font_use_custom_active: bool,
    pub font_use_custom_inactive: bool,
    pub font_active: String,
    pub font_inactive: String,
}

fn get_bool<S: SettingsStore>(store: &S, key: &str) -> Result<bool, ConfigError> {
    store
        .get_bool(key)
        .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
}

fn get_int<S: SettingsStore>(store: &S, key: &str) -> Result<i32, ConfigError> {
    store
        .get_int(key)
        .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
}

fn get_string<S: SettingsStore>(store: &S, key: &str) -> Result<String, ConfigError> {
    store
        .get_string(key)
        .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
}

fn get_enum<S: SettingsStore, T: FromStr>(store: &S, key: &str) -> Result<T, ConfigError> {
    let raw = get_string(store, key)?;
    raw.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw,
    })
}

fn get_border_locations<S: SettingsStore>(store: &S, key: &str) -> Result<Vec<BorderSide>, ConfigError> {
    let raw = store
        .get_strv(key)
        .ok_or_else(|| ConfigError::MissingKey(key.to_string()))?;
    raw.iter()
        .map(|side| {
            side.parse().map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: side.clone(),
            })
        })
        .collect()
}

impl Settings {
    /// Read every key from `store`. Any missing or malformed key fails the
    /// whole load; partial snapshots are never constructed.
    pub fn load<S: SettingsStore>(store: &S) -> Result<Self, ConfigError> {
        Ok(Settings {
            mode: get_enum(store, "mode")?,
            position: get_enum(store, "position")?,
            index: get_int(store, "index")?,
            click_action: get_enum(store, "click-action")?,
            cyclic_scrolling: get_bool(store, "cyclic-scrolling")?,
            invert_scrolling: get_bool(store, "invert-scrolling")?,
            show_total_num: get_bool(store, "show-total-num")?,
            use_names: get_bool(store, "use-names")?,
            show_icon_text: get_bool(store, "show-icon-text")?,
            vertical_display: get_bool(store, "vertical-display")?,
            current_workspace: 0,
            margin_vertical: get_int(store, "margin-vertical")?,
            margin_horizontal: get_int(store, "margin-horizontal")?,
            min_height: get_int(store, "min-height")?,
            min_width: get_int(store, "min-width")?,
            padding_vertical: get_int(store, "padding-vertical")?,
            padding_horizontal: get_int(store, "padding-horizontal")?,
            border_radius: get_int(store, "border-radius")?,
            border_size_active: get_int(store, "border-size-active")?,
            border_size_inactive: get_int(store, "border-size-inactive")?,
            border_locations: get_border_locations(store, "border-locations")?,
            background_colour_active: get_string(store, "background-colour-active")?,
            background_colour_inactive: get_string(store, "background-colour-inactive")?,
            border_colour_active: get_string(store, "border-colour-active")?,
            border_colour_inactive: get_string(store, "border-colour-inactive")?,
            font_colour_use_custom_active: get_bool(store, "font-colour-use-custom-active")?,
            font_colour_use_custom_inactive: get_bool(store, "font-colour-use-custom-inactive")?,
            font_colour_active: get_string(store, "font-colour-active")?,
            font_colour_inactive: get_string(store, "font-colour-inactive")?,
            font_use_custom_active: get_bool(store, "font-use-custom-active")?,
            font_use_custom_inactive: get_bool(store, "font-use-custom-inactive")?,
            font_active: get_string(store, "font-active")?,
            font_inactive: get_string(store, "font-inactive")?,
        })
    }

    /// Re-read the single field backing `key` and report the side effect
    /// the switcher must run.
    ///
    /// Unknown keys leave the snapshot untouched and report
    /// [`SettingUpdate::Unknown`].
    pub fn update<S: SettingsStore>(
        &mut self,
        store: &S,
        key: &str,
    ) -> Result<SettingUpdate, ConfigError> {
        let effect = match key {
            "mode" => {
                self.mode = get_enum(store, key)?;
                SettingUpdate::RebuildDisplay
            }
            "position" => {
                self.position = get_enum(store, key)?;
                SettingUpdate::Reposition
            }
            "index" => {
                self.index = get_int(store, key)?;
                SettingUpdate::Reinsert
            }
            "click-action" => {
                self.click_action = get_enum(store, key)?;
                SettingUpdate::Nothing
            }
            "cyclic-scrolling" => {
                self.cyclic_scrolling = get_bool(store, key)?;
                SettingUpdate::Nothing
            }
            "invert-scrolling" => {
                self.invert_scrolling = get_bool(store, key)?;
                SettingUpdate::Nothing
            }
            "show-total-num" => {
                self.show_total_num = get_bool(store, key)?;
                SettingUpdate::RefreshNames
            }
            "use-names" => {
                self.use_names = get_bool(store, key)?;
                SettingUpdate::RefreshNames
            }
            "show-icon-text" => {
                self.show_icon_text = get_bool(store, key)?;
                SettingUpdate::LabelVisibility
            }
            "vertical-display" => {
                self.vertical_display = get_bool(store, key)?;
                SettingUpdate::Orientation
            }
            "margin-vertical" => {
                self.margin_vertical = get_int(store, key)?;
                SettingUpdate::Style
            }
            "margin-horizontal" => {
                self.margin_horizontal = get_int(store, key)?;
                SettingUpdate::Style
            }
            "min-height" => {
                self.min_height = get_int(store, key)?;
                SettingUpdate::Style
            }
            "min-width" => {
                self.min_width = get_int(store, key)?;
                SettingUpdate::Style
            }
            "padding-vertical" => {
                self.padding_vertical = get_int(store, key)?;
                SettingUpdate::Style
            }
            "padding-horizontal" => {
                self.padding_horizontal = get_int(store, key)?;
                SettingUpdate::Style
            }
            "border-radius" => {
                self.border_radius = get_int(store, key)?;
                SettingUpdate::Style
            }
            "border-size-active" => {
                self.border_size_active = get_int(store, key)?;
                SettingUpdate::Style
            }
            "border-size-inactive" => {
                self.border_size_inactive = get_int(store, key)?;
                SettingUpdate::Style
            }
            "border-locations" => {
                self.border_locations = get_border_locations(store, key)?;
                SettingUpdate::Style
            }
            "background-colour-active" => {
                self.background_colour_active = get_string(store, key)?;
                SettingUpdate::Style
            }
            "background-colour-inactive" => {
                self.background_colour_inactive = get_string(store, key)?;
                SettingUpdate::Style
            }
            "border-colour-active" => {
                self.border_colour_active = get_string(store, key)?;
                SettingUpdate::Style
            }
            "border-colour-inactive" => {
                self.border_colour_inactive = get_string(store, key)?;
                SettingUpdate::Style
            }
            "font-colour-use-custom-active" => {
                self.font_colour_use_custom_active = get_bool(store, key)?;
                SettingUpdate::Style
            }
            "font-colour-use-custom-inactive" => {
                self.font_colour_use_custom_inactive = get_bool(store, key)?;
                SettingUpdate::Style
            }
            "font-colour-active" => {
                self.font_colour_active = get_string(store, key)?;
                SettingUpdate::Style
            }
            "font-colour-inactive" => {
                self.font_colour_inactive = get_string(store, key)?;
                SettingUpdate::Style
            }
            "font-use-custom-active" => {
                self.font_use_custom_active = get_bool(store, key)?;
                SettingUpdate::Style
            }
            "font-use-custom-inactive" => {
                self.font_use_custom_inactive = get_bool(store, key)?;
                SettingUpdate::Style
            }
            "font-active" => {
                self.font_active = get_string(store, key)?;
                SettingUpdate::Style
            }
            "font-inactive" => {
                self.font_inactive = get_string(store, key)?;
                SettingUpdate::Style
            }
            _ => SettingUpdate::Unknown,
        };
        Ok(effect)
    }
}
