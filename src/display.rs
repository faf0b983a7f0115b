//! Display variants.
//!
//! One [`Display`] implementation per mode: [`CurrentDisplay`] (a single
//! labelled button), [`AllDisplay`] (a row of per-workspace buttons) and
//! [`IconDisplay`] (icon plus label). The variants are independent types
//! behind one trait and share the label-text and styling helpers; the
//! switcher picks one through [`build_display`].
//!
//! Invariants upheld here:
//!
//! * ALL mode owns exactly one element per workspace after any add/remove
//!   settles; new workspaces are appended at the end, removals take from
//!   the end.
//! * A switch restyles exactly the two affected elements.
//! * Every actor signal a display registers is released when the display
//!   is destroyed, so a mode switch cannot strand handlers.

use crate::config::{ClickAction, Mode, Settings};
use crate::navigation::activate_checked;
use crate::signals::Subscriptions;
use crate::style::StyleStore;
use crate::traits::{ActorId, PanelHost, WorkspaceProvider};
use log::debug;
use std::cell::RefCell;
use std::rc::Rc;

/// Shared handles a display needs: the host traits plus the settings and
/// style snapshots the switcher keeps up to date.
pub struct DisplayContext<W, H> {
    pub provider: Rc<W>,
    pub host: Rc<H>,
    pub settings: Rc<RefCell<Settings>>,
    pub styles: Rc<RefCell<StyleStore>>,
}

impl<W, H> Clone for DisplayContext<W, H> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            host: self.host.clone(),
            settings: self.settings.clone(),
            styles: self.styles.clone(),
        }
    }
}

/// One rendered widget variant.
///
/// The switcher drives the lifecycle: workspace events, style refreshes,
/// and finally [`destroy`](Display::destroy) (also on every mode switch).
pub trait Display {
    /// The actor the switcher inserts into / removes from the panel.
    fn root(&self) -> ActorId;

    /// A workspace was appended at the highest index.
    fn on_added(&mut self);

    /// The workspace at the highest index was removed.
    fn on_removed(&mut self);

    /// The active workspace changed.
    fn on_switched(&mut self);

    /// A button was clicked (`workspace` is the slot in ALL mode).
    fn on_click(&mut self, workspace: Option<usize>);

    /// The workspace popup opened or closed.
    fn on_popup_state(&mut self, open: bool);

    /// Re-apply style strings after a style-group recompute.
    fn update_style(&mut self);

    /// Re-render every label text (names/numbering options changed).
    fn update_names(&mut self);

    /// Icon mode only: show or hide the text label.
    fn set_label_visible(&mut self, _visible: bool) {}

    /// ALL mode only: flip the row orientation.
    fn set_vertical(&mut self, _vertical: bool) {}

    /// Destroy all actors and release all actor signal handlers.
    fn destroy(&mut self);
}

/// Build the display for `mode`. The single mode-dispatch point.
pub fn build_display<W, H>(mode: Mode, ctx: DisplayContext<W, H>) -> Box<dyn Display>
where
    W: WorkspaceProvider + 'static,
    H: PanelHost + 'static,
{
    match mode {
        Mode::Current => Box::new(CurrentDisplay::new(ctx)),
        Mode::All => Box::new(AllDisplay::new(ctx)),
        Mode::Icon => Box::new(IconDisplay::new(ctx)),
    }
}

//  Shared helpers

/// Text for the workspace at `index`: the user-defined name when enabled
/// (falling back to the 1-based number), optionally the `n/total` form.
fn label_text<W: WorkspaceProvider>(
    provider: &W,
    settings: &Settings,
    index: usize,
    include_total: bool,
) -> String {
    let number = (index + 1).to_string();
    if settings.use_names {
        if let Some(name) = provider.workspace_name(index) {
            return name;
        }
    }
    if include_total && settings.show_total_num {
        format!("{}/{}", number, provider.count())
    } else {
        number
    }
}

/// Popup entries: one per workspace, named where names exist.
fn popup_items<W: WorkspaceProvider>(provider: &W) -> Vec<String> {
    (0..provider.count())
        .map(|i| {
            provider
                .workspace_name(i)
                .unwrap_or_else(|| (i + 1).to_string())
        })
        .collect()
}

/// Create a button wrapping `child` and track its input handlers in `subs`.
fn make_button<H: PanelHost + 'static>(
    host: &Rc<H>,
    child: ActorId,
    subs: &mut Subscriptions,
) -> ActorId {
    let button = host.create_button();
    host.add_child(button, child);
    for signal in ["clicked", "scroll-event"] {
        let id = host.connect_actor(button, signal);
        let host = host.clone();
        subs.track(move || host.disconnect_actor(id));
    }
    button
}

//  Current mode

/// A single button whose label tracks the active workspace.
pub struct CurrentDisplay<W, H> {
    ctx: DisplayContext<W, H>,
    button: ActorId,
    label: ActorId,
    subs: Subscriptions,
}

impl<W, H> CurrentDisplay<W, H>
where
    W: WorkspaceProvider + 'static,
    H: PanelHost + 'static,
{
    pub fn new(ctx: DisplayContext<W, H>) -> Self {
        ctx.settings.borrow_mut().current_workspace = ctx.provider.active_index();
        let label = ctx.host.create_label();
        let mut subs = Subscriptions::new();
        let button = make_button(&ctx.host, label, &mut subs);
        let mut display = Self {
            ctx,
            button,
            label,
            subs,
        };
        display.update_names();
        display.update_style();
        display
    }

    fn sync_active(&mut self) {
        let active = self.ctx.provider.active_index();
        self.ctx.settings.borrow_mut().current_workspace = active;
    }

    fn refresh_label(&self) {
        let settings = self.ctx.settings.borrow();
        let text = label_text(
            &*self.ctx.provider,
            &settings,
            settings.current_workspace,
            true,
        );
        drop(settings);
        self.ctx.host.set_text(self.label, &text);
    }
}

impl<W, H> Display for CurrentDisplay<W, H>
where
    W: WorkspaceProvider + 'static,
    H: PanelHost + 'static,
{
    fn root(&self) -> ActorId {
        self.button
    }

    fn on_added(&mut self) {
        self.sync_active();
        self.refresh_label();
    }

    fn on_removed(&mut self) {
        self.sync_active();
        self.refresh_label();
    }

    fn on_switched(&mut self) {
        self.sync_active();
        self.refresh_label();
    }

    fn on_click(&mut self, _workspace: Option<usize>) {
        let action = self.ctx.settings.borrow().click_action;
        match action {
            ClickAction::Activities => self.ctx.host.toggle_overview(),
            ClickAction::Popup => {
                let items = popup_items(&*self.ctx.provider);
                let active = self.ctx.settings.borrow().current_workspace;
                self.ctx.host.toggle_popup(self.button, &items, active);
            }
            ClickAction::None => {}
        }
    }

    fn on_popup_state(&mut self, open: bool) {
        self.ctx.host.set_pseudo_active(self.button, open);
    }

    fn update_style(&mut self) {
        let style = self.ctx.styles.borrow().active_style();
        self.ctx.host.set_style(self.label, &style);
    }

    fn update_names(&mut self) {
        self.refresh_label();
    }

    fn destroy(&mut self) {
        self.subs.release_all();
        self.ctx.host.destroy_actor(self.button);
    }
}

//  All mode

struct Element {
    button: ActorId,
    label: ActorId,
    subs: Subscriptions,
}

/// One button per workspace, in index order, active slot highlighted.
pub struct AllDisplay<W, H> {
    ctx: DisplayContext<W, H>,
    container: ActorId,
    elements: Vec<Element>,
}

impl<W, H> AllDisplay<W, H>
where
    W: WorkspaceProvider + 'static,
    H: PanelHost + 'static,
{
    pub fn new(ctx: DisplayContext<W, H>) -> Self {
        ctx.settings.borrow_mut().current_workspace = ctx.provider.active_index();
        let container = ctx.host.create_box();
        ctx.host
            .set_vertical(container, ctx.settings.borrow().vertical_display);
        let mut display = Self {
            ctx,
            container,
            elements: Vec::new(),
        };
        for _ in 0..display.ctx.provider.count() {
            display.push_element();
        }
        display
    }

    /// Append one element at the end and style it for its slot.
    fn push_element(&mut self) {
        let index = self.elements.len();
        let label = self.ctx.host.create_label();
        let text = {
            let settings = self.ctx.settings.borrow();
            label_text(&*self.ctx.provider, &settings, index, false)
        };
        self.ctx.host.set_text(label, &text);
        let mut subs = Subscriptions::new();
        let button = make_button(&self.ctx.host, label, &mut subs);
        self.ctx.host.add_child(self.container, button);
        self.elements.push(Element {
            button,
            label,
            subs,
        });
        self.style_element(index);
    }

    fn style_element(&self, index: usize) {
        let active = self.ctx.settings.borrow().current_workspace == index;
        let style = {
            let styles = self.ctx.styles.borrow();
            if active {
                styles.active_style()
            } else {
                styles.inactive_style()
            }
        };
        self.ctx.host.set_style(self.elements[index].label, &style);
    }

    fn sync_active(&mut self) -> usize {
        let active = self.ctx.provider.active_index();
        self.ctx.settings.borrow_mut().current_workspace = active;
        active
    }
}

impl<W, H> Display for AllDisplay<W, H>
where
    W: WorkspaceProvider + 'static,
    H: PanelHost + 'static,
{
    fn root(&self) -> ActorId {
        self.container
    }

    fn on_added(&mut self) {
        self.sync_active();
        self.push_element();
        self.update_names();
        self.update_style();
    }

    fn on_removed(&mut self) {
        self.sync_active();
        if let Some(element) = self.elements.pop() {
            // Dropping the element releases its signal handlers.
            self.ctx.host.destroy_actor(element.button);
        }
        self.update_names();
        self.update_style();
    }

    fn on_switched(&mut self) {
        let previous = self.ctx.settings.borrow().current_workspace;
        let current = self.sync_active();
        if previous == current {
            return;
        }
        // Delta restyle: only the two affected slots change.
        if previous < self.elements.len() {
            self.style_element(previous);
        }
        if current < self.elements.len() {
            self.style_element(current);
        }
    }

    fn on_click(&mut self, workspace: Option<usize>) {
        let Some(index) = workspace else {
            debug!("click without a workspace slot in all-workspaces mode");
            return;
        };
        let action = self.ctx.settings.borrow().click_action;
        match action {
            ClickAction::Activities => {
                activate_checked(&*self.ctx.provider, index);
            }
            ClickAction::Popup => {
                let items = popup_items(&*self.ctx.provider);
                let active = self.ctx.settings.borrow().current_workspace;
                self.ctx.host.toggle_popup(self.container, &items, active);
            }
            ClickAction::None => {}
        }
    }

    fn on_popup_state(&mut self, open: bool) {
        for element in &self.elements {
            self.ctx.host.set_pseudo_active(element.button, open);
        }
    }

    fn update_style(&mut self) {
        for index in 0..self.elements.len() {
            self.style_element(index);
        }
    }

    fn update_names(&mut self) {
        for index in 0..self.elements.len() {
            let text = {
                let settings = self.ctx.settings.borrow();
                label_text(&*self.ctx.provider, &settings, index, false)
            };
            self.ctx.host.set_text(self.elements[index].label, &text);
        }
    }

    fn set_vertical(&mut self, vertical: bool) {
        self.ctx.host.set_vertical(self.container, vertical);
    }

    fn destroy(&mut self) {
        for mut element in self.elements.drain(..) {
            element.subs.release_all();
        }
        self.ctx.host.destroy_actor(self.container);
    }
}

//  Icon mode

/// A themed icon plus an optional active-workspace label.
pub struct IconDisplay<W, H> {
    ctx: DisplayContext<W, H>,
    button: ActorId,
    label: ActorId,
    subs: Subscriptions,
}

impl<W, H> IconDisplay<W, H>
where
    W: WorkspaceProvider + 'static,
    H: PanelHost + 'static,
{
    pub fn new(ctx: DisplayContext<W, H>) -> Self {
        ctx.settings.borrow_mut().current_workspace = ctx.provider.active_index();
        let container = ctx.host.create_box();
        let icon = ctx.host.create_icon("workspace-symbolic");
        ctx.host.add_child(container, icon);
        let label = ctx.host.create_label();
        ctx.host
            .set_visible(label, ctx.settings.borrow().show_icon_text);
        ctx.host.add_child(container, label);
        let mut subs = Subscriptions::new();
        let button = make_button(&ctx.host, container, &mut subs);
        let mut display = Self {
            ctx,
            button,
            label,
            subs,
        };
        display.update_names();
        display.update_style();
        display
    }

    fn sync_active(&mut self) {
        let active = self.ctx.provider.active_index();
        self.ctx.settings.borrow_mut().current_workspace = active;
    }

    fn refresh_label(&self) {
        let settings = self.ctx.settings.borrow();
        let text = label_text(
            &*self.ctx.provider,
            &settings,
            settings.current_workspace,
            true,
        );
        drop(settings);
        self.ctx.host.set_text(self.label, &text);
    }
}

impl<W, H> Display for IconDisplay<W, H>
where
    W: WorkspaceProvider + 'static,
    H: PanelHost + 'static,
{
    fn root(&self) -> ActorId {
        self.button
    }

    fn on_added(&mut self) {
        self.sync_active();
        self.refresh_label();
    }

    fn on_removed(&mut self) {
        self.sync_active();
        self.refresh_label();
    }

    fn on_switched(&mut self) {
        self.sync_active();
        self.refresh_label();
    }

    fn on_click(&mut self, _workspace: Option<usize>) {
        let action = self.ctx.settings.borrow().click_action;
        match action {
            ClickAction::Activities => self.ctx.host.toggle_overview(),
            ClickAction::Popup => {
                let items = popup_items(&*self.ctx.provider);
                let active = self.ctx.settings.borrow().current_workspace;
                self.ctx.host.toggle_popup(self.button, &items, active);
            }
            ClickAction::None => {}
        }
    }

    fn on_popup_state(&mut self, open: bool) {
        self.ctx.host.set_pseudo_active(self.button, open);
    }

    fn update_style(&mut self) {
        let style = self.ctx.styles.borrow().icon_label_style();
        self.ctx.host.set_style(self.label, &style);
    }

    fn update_names(&mut self) {
        self.refresh_label();
    }

    fn set_label_visible(&mut self, visible: bool) {
        self.ctx.host.set_visible(self.label, visible);
    }

    fn destroy(&mut self) {
        self.subs.release_all();
        self.ctx.host.destroy_actor(self.button);
    }
}
