//! Style-string composition.
//!
//! [`StyleStore`] renders the typed style settings into five CSS-like
//! strings the displays hand to the panel host: a base string (margins,
//! minimum sizes, padding), active/inactive decoration strings (background,
//! border) and active/inactive font strings.
//!
//! Recomputation is fine-grained: [`StyleStore::refresh`] maps a settings
//! key to the group(s) it feeds and recomputes only those. It is also
//! idempotent — the same snapshot always yields byte-identical strings.
//!
//! A malformed colour or font descriptor is a cosmetic failure: the
//! previous string for that group stays in place and a warning is logged;
//! the event path is never broken by bad styling input.

use crate::config::{BorderSide, Settings};
use log::warn;
use std::fmt::Write as _;

/// Error from rendering one style group.
#[derive(Debug, thiserror::Error)]
pub enum StyleError {
    /// Colour is not `#RRGGBBAA`.
    #[error("malformed colour {0:?} (expected #RRGGBBAA)")]
    BadColour(String),

    /// Font descriptor could not be parsed.
    #[error("malformed font description {0:?}")]
    BadFont(String),
}

/// Convert a `#RRGGBBAA` hex colour to a `rgba(r,g,b,a)` string.
///
/// Alpha is rendered as a fraction of 255 so fully opaque is `1` and the
/// output is stable for a given input.
pub fn hex_to_rgba(hex: &str) -> Result<String, StyleError> {
    let bad = || StyleError::BadColour(hex.to_string());
    let digits = hex.strip_prefix('#').ok_or_else(bad)?;
    if digits.len() != 8 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(bad());
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16).map_err(|_| bad())
    };
    let r = channel(0..2)?;
    let g = channel(2..4)?;
    let b = channel(4..6)?;
    let a = channel(6..8)?;
    Ok(format!("rgba({},{},{},{})", r, g, b, f64::from(a) / 255.0))
}

/// The subset of a Pango-style font description the styling uses:
/// `"Family [Weight] [Style] SIZE"`, e.g. `"Cantarell Bold Italic 11"`.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub family: String,
    pub size_pt: f64,
    pub weight: &'static str,
    pub style: &'static str,
}

fn weight_keyword(token: &str) -> Option<&'static str> {
    match token.to_lowercase().as_str() {
        "thin" => Some("thin"),
        "ultralight" | "ultra-light" => Some("ultralight"),
        "light" => Some("light"),
        "book" => Some("book"),
        "regular" | "normal" => Some("normal"),
        "medium" => Some("medium"),
        "semibold" | "semi-bold" => Some("semibold"),
        "bold" => Some("bold"),
        "ultrabold" | "ultra-bold" => Some("ultrabold"),
        "heavy" => Some("heavy"),
        "ultraheavy" | "ultra-heavy" => Some("ultraheavy"),
        _ => None,
    }
}

fn style_keyword(token: &str) -> Option<&'static str> {
    match token.to_lowercase().as_str() {
        "italic" => Some("italic"),
        "oblique" => Some("oblique"),
        _ => None,
    }
}

impl FontSpec {
    /// Parse a descriptor. The trailing token must be the point size;
    /// weight and style keywords directly before it are recognized and
    /// everything earlier is the family.
    pub fn parse(desc: &str) -> Result<Self, StyleError> {
        let bad = || StyleError::BadFont(desc.to_string());
        let mut tokens: Vec<&str> = desc.split_whitespace().collect();
        let size_pt: f64 = tokens.pop().ok_or_else(bad)?.parse().map_err(|_| bad())?;
        if !size_pt.is_finite() || size_pt <= 0.0 {
            return Err(bad());
        }

        let mut weight = "normal";
        let mut style = "normal";
        while let Some(&token) = tokens.last() {
            if let Some(w) = weight_keyword(token) {
                weight = w;
            } else if let Some(s) = style_keyword(token) {
                style = s;
            } else {
                break;
            }
            tokens.pop();
        }

        if tokens.is_empty() {
            return Err(bad());
        }
        Ok(FontSpec {
            family: tokens.join(" "),
            size_pt,
            weight,
            style,
        })
    }

    fn to_css(&self) -> String {
        format!(
            "font-size:{}pt;font-family:{};font-weight:{};font-style:{};",
            self.size_pt, self.family, self.weight, self.style
        )
    }
}

/// Which style group a settings key feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Group {
    Base,
    DecorationActive,
    DecorationInactive,
    FontActive,
    FontInactive,
}

/// Groups affected by a settings key. Most keys feed exactly one group;
/// the shared border keys feed both decorations.
fn groups_for_key(key: &str) -> &'static [Group] {
    match key {
        "margin-vertical" | "margin-horizontal" | "min-height" | "min-width"
        | "padding-vertical" | "padding-horizontal" => &[Group::Base],
        "background-colour-active" | "border-colour-active" | "border-size-active" => {
            &[Group::DecorationActive]
        }
        "background-colour-inactive" | "border-colour-inactive" | "border-size-inactive" => {
            &[Group::DecorationInactive]
        }
        "border-radius" | "border-locations" => {
            &[Group::DecorationActive, Group::DecorationInactive]
        }
        "font-colour-use-custom-active" | "font-colour-active" | "font-use-custom-active"
        | "font-active" => &[Group::FontActive],
        "font-colour-use-custom-inactive" | "font-colour-inactive"
        | "font-use-custom-inactive" | "font-inactive" => &[Group::FontInactive],
        _ => &[],
    }
}

/// The five rendered style strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleStore {
    pub base: String,
    pub decoration_active: String,
    pub decoration_inactive: String,
    pub font_active: String,
    pub font_inactive: String,
}

impl StyleStore {
    /// Render every group from `settings`. Groups that fail to render start
    /// out empty (unstyled, not broken).
    pub fn new(settings: &Settings) -> Self {
        let mut store = Self::default();
        for group in [
            Group::Base,
            Group::DecorationActive,
            Group::DecorationInactive,
            Group::FontActive,
            Group::FontInactive,
        ] {
            store.recompute(settings, group);
        }
        store
    }

    /// Recompute the group(s) fed by `key`. Returns `true` if any rendered
    /// string actually changed.
    pub fn refresh(&mut self, settings: &Settings, key: &str) -> bool {
        let mut changed = false;
        for &group in groups_for_key(key) {
            changed |= self.recompute(settings, group);
        }
        changed
    }

    /// Full style for an element in the active state.
    pub fn active_style(&self) -> String {
        format!("{}{}{}", self.base, self.decoration_active, self.font_active)
    }

    /// Full style for an element in the inactive state.
    pub fn inactive_style(&self) -> String {
        format!(
            "{}{}{}",
            self.base, self.decoration_inactive, self.font_inactive
        )
    }

    /// Style for the Icon-mode label: no decoration, active font only.
    pub fn icon_label_style(&self) -> String {
        format!("{}{}", self.base, self.font_active)
    }

    fn recompute(&mut self, settings: &Settings, group: Group) -> bool {
        let result = match group {
            Group::Base => Ok(make_base(settings)),
            Group::DecorationActive => make_decoration(
                settings,
                &settings.background_colour_active,
                &settings.border_colour_active,
                settings.border_size_active,
            ),
            Group::DecorationInactive => make_decoration(
                settings,
                &settings.background_colour_inactive,
                &settings.border_colour_inactive,
                settings.border_size_inactive,
            ),
            Group::FontActive => make_font(
                settings.font_colour_use_custom_active,
                &settings.font_colour_active,
                settings.font_use_custom_active,
                &settings.font_active,
            ),
            Group::FontInactive => make_font(
                settings.font_colour_use_custom_inactive,
                &settings.font_colour_inactive,
                settings.font_use_custom_inactive,
                &settings.font_inactive,
            ),
        };

        let slot = match group {
            Group::Base => &mut self.base,
            Group::DecorationActive => &mut self.decoration_active,
            Group::DecorationInactive => &mut self.decoration_inactive,
            Group::FontActive => &mut self.font_active,
            Group::FontInactive => &mut self.font_inactive,
        };

        match result {
            Ok(rendered) => {
                if *slot == rendered {
                    false
                } else {
                    *slot = rendered;
                    true
                }
            }
            Err(e) => {
                // Keep the previous string; cosmetic failure only.
                warn!("style group {:?} not updated: {}", group, e);
                false
            }
        }
    }
}

fn make_base(settings: &Settings) -> String {
    format!(
        "margin:{}px {}px;min-height:{}px;min-width:{}px;padding:{}px {}px;\
         text-align:center;vertical-align:middle;",
        settings.margin_vertical,
        settings.margin_horizontal,
        settings.min_height,
        settings.min_width,
        settings.padding_vertical,
        settings.padding_horizontal,
    )
}

fn make_decoration(
    settings: &Settings,
    background: &str,
    border_colour: &str,
    border_size: i32,
) -> Result<String, StyleError> {
    let mut s = String::new();
    let _ = write!(s, "background-color:{};", hex_to_rgba(background)?);
    let _ = write!(s, "border-color:{};", hex_to_rgba(border_colour)?);
    let _ = write!(s, "border-radius:{}px;", settings.border_radius);
    for (side, property) in [
        (BorderSide::Top, "border-top-width"),
        (BorderSide::Right, "border-right-width"),
        (BorderSide::Bottom, "border-bottom-width"),
        (BorderSide::Left, "border-left-width"),
    ] {
        let width = if settings.border_locations.contains(&side) {
            border_size
        } else {
            0
        };
        let _ = write!(s, "{}:{}px;", property, width);
    }
    Ok(s)
}

fn make_font(
    use_custom_colour: bool,
    colour: &str,
    use_custom_font: bool,
    font: &str,
) -> Result<String, StyleError> {
    let mut s = String::new();
    if use_custom_colour {
        let _ = write!(s, "color:{};", hex_to_rgba(colour)?);
    }
    if use_custom_font {
        s.push_str(&FontSpec::parse(font)?.to_css());
    }
    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClickAction, Mode, Position};

    fn settings() -> Settings {
        Settings {
            mode: Mode::All,
            position: Position::Left,
            index: 0,
            click_action: ClickAction::Activities,
            cyclic_scrolling: true,
            invert_scrolling: false,
            show_total_num: false,
            use_names: false,
            show_icon_text: true,
            vertical_display: false,
            current_workspace: 0,
            margin_vertical: 0,
            margin_horizontal: 1,
            min_height: 0,
            min_width: 20,
            padding_vertical: 0,
            padding_horizontal: 8,
            border_radius: 4,
            border_size_active: 2,
            border_size_inactive: 1,
            border_locations: vec![BorderSide::Bottom],
            background_colour_active: "#3584e4ff".into(),
            background_colour_inactive: "#00000000".into(),
            border_colour_active: "#ffffffff".into(),
            border_colour_inactive: "#ffffff80".into(),
            font_colour_use_custom_active: true,
            font_colour_use_custom_inactive: false,
            font_colour_active: "#ffffffff".into(),
            font_colour_inactive: "#ccccccff".into(),
            font_use_custom_active: true,
            font_use_custom_inactive: false,
            font_active: "Cantarell Bold 11".into(),
            font_inactive: "Cantarell 11".into(),
        }
    }

    //  Colours

    #[test]
    fn hex_to_rgba_opaque() {
        assert_eq!(hex_to_rgba("#ff8000ff").unwrap(), "rgba(255,128,0,1)");
    }

    #[test]
    fn hex_to_rgba_transparent() {
        assert_eq!(hex_to_rgba("#00000000").unwrap(), "rgba(0,0,0,0)");
    }

    #[test]
    fn hex_to_rgba_rejects_malformed() {
        for bad in ["", "#fff", "ffffffff", "#zzzzzzzz", "#ffffff", "#fffffffff"] {
            assert!(hex_to_rgba(bad).is_err(), "{:?} should be rejected", bad);
        }
    }

    //  Fonts

    #[test]
    fn font_spec_family_and_size() {
        let spec = FontSpec::parse("Sans 10").unwrap();
        assert_eq!(spec.family, "Sans");
        assert_eq!(spec.size_pt, 10.0);
        assert_eq!(spec.weight, "normal");
        assert_eq!(spec.style, "normal");
    }

    #[test]
    fn font_spec_with_weight_and_style() {
        let spec = FontSpec::parse("DejaVu Sans Bold Italic 12.5").unwrap();
        assert_eq!(spec.family, "DejaVu Sans");
        assert_eq!(spec.weight, "bold");
        assert_eq!(spec.style, "italic");
        assert_eq!(spec.size_pt, 12.5);
    }

    #[test]
    fn font_spec_rejects_garbage() {
        for bad in ["", "12", "Bold 12", "Sans"] {
            assert!(FontSpec::parse(bad).is_err(), "{:?} should be rejected", bad);
        }
    }

    //  Store

    #[test]
    fn recomputation_is_idempotent() {
        let settings = settings();
        let first = StyleStore::new(&settings);
        let second = StyleStore::new(&settings);
        assert_eq!(first, second);

        let mut third = first.clone();
        assert!(!third.refresh(&settings, "padding-horizontal"));
        assert_eq!(third, first);
    }

    #[test]
    fn border_widths_follow_locations() {
        let store = StyleStore::new(&settings());
        assert!(store.decoration_active.contains("border-bottom-width:2px;"));
        assert!(store.decoration_active.contains("border-top-width:0px;"));
        assert!(store.decoration_inactive.contains("border-bottom-width:1px;"));
    }

    #[test]
    fn refresh_touches_only_affected_groups() {
        let mut settings = settings();
        let mut store = StyleStore::new(&settings);
        let before = store.clone();

        settings.padding_horizontal = 16;
        assert!(store.refresh(&settings, "padding-horizontal"));
        assert_ne!(store.base, before.base);
        assert_eq!(store.decoration_active, before.decoration_active);
        assert_eq!(store.font_active, before.font_active);
    }

    #[test]
    fn shared_border_key_refreshes_both_decorations() {
        let mut settings = settings();
        let mut store = StyleStore::new(&settings);
        let before = store.clone();

        settings.border_radius = 9;
        assert!(store.refresh(&settings, "border-radius"));
        assert_ne!(store.decoration_active, before.decoration_active);
        assert_ne!(store.decoration_inactive, before.decoration_inactive);
        assert_eq!(store.base, before.base);
    }

    #[test]
    fn malformed_colour_keeps_previous_string() {
        let mut settings = settings();
        let mut store = StyleStore::new(&settings);
        let before = store.decoration_active.clone();

        settings.background_colour_active = "not-a-colour".into();
        assert!(!store.refresh(&settings, "background-colour-active"));
        assert_eq!(store.decoration_active, before);
    }

    #[test]
    fn malformed_font_keeps_previous_string() {
        let mut settings = settings();
        let mut store = StyleStore::new(&settings);
        let before = store.font_active.clone();

        settings.font_active = "???".into();
        assert!(!store.refresh(&settings, "font-active"));
        assert_eq!(store.font_active, before);
    }

    #[test]
    fn unknown_key_changes_nothing() {
        let settings = settings();
        let mut store = StyleStore::new(&settings);
        let before = store.clone();
        assert!(!store.refresh(&settings, "click-action"));
        assert_eq!(store, before);
    }

    #[test]
    fn composed_styles_concatenate_groups() {
        let store = StyleStore::new(&settings());
        let active = store.active_style();
        assert!(active.starts_with(&store.base));
        assert!(active.contains(&store.decoration_active));
        assert!(active.ends_with(&store.font_active));
        assert_eq!(store.icon_label_style(), format!("{}{}", store.base, store.font_active));
    }

    #[test]
    fn font_groups_empty_without_custom_flags() {
        let mut s = settings();
        s.font_colour_use_custom_active = false;
        s.font_use_custom_active = false;
        let store = StyleStore::new(&s);
        assert!(store.font_active.is_empty());
    }
}
