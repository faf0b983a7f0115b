//! Entry point for the **wsbar** daemon.
//!
//! Runs the [`WorkspaceSwitcher`](wsbar::switcher::WorkspaceSwitcher)
//! against the bundled simulated shell. A Unix-socket
//! [`EventSource`](wsbar::traits::EventSource) accepts JSON shell commands
//! on a background thread; the main thread applies each command to the
//! simulated shell, then forwards the resulting events to the switcher,
//! reproducing the signal order a real shell would deliver.

use log::{debug, error, info};
use std::rc::Rc;
use std::sync::mpsc;
use wsbar::config::Position;
use wsbar::event::{Event, ShellCommand};
use wsbar::ipc::listener::UnixSocketListener;
use wsbar::shell::{SimPanel, SimStore, SimWorkspaces};
use wsbar::switcher::WorkspaceSwitcher;
use wsbar::traits::{EventSource, SettingsStore};

/// Workspaces the simulated shell starts with.
const INITIAL_WORKSPACES: usize = 4;

/// Default socket path for the command listener.
fn default_socket_path() -> String {
    let runtime = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".into());
    format!("{}/wsbar.sock", runtime)
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/wsbar`).
fn config_dir() -> std::path::PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    std::path::PathBuf::from(base).join("wsbar")
}

/// Seed both stores from schema defaults, then overlay
/// `$XDG_CONFIG_HOME/wsbar/settings.json` if it exists. Keys the file does
/// not mention keep their compiled-in defaults.
fn load_stores() -> (SimStore, SimStore) {
    let settings = SimStore::with_schema_defaults();
    let prefs = SimStore::with_prefs_defaults();
    let path = config_dir().join("settings.json");
    match settings.overlay_file(&path) {
        Ok(()) => {
            // The same file carries the preference keys.
            let _ = prefs.overlay_file(&path);
            info!("loaded settings from {}", path.display());
        }
        Err(e) => {
            info!("no settings file ({}), using defaults", e);
        }
    }
    (settings, prefs)
}

fn main() {
    env_logger::init();

    let (settings_store, prefs_store) = load_stores();
    let settings_store = Rc::new(settings_store);
    let prefs_store = Rc::new(prefs_store);

    let workspaces = Rc::new(SimWorkspaces::new(INITIAL_WORKSPACES));
    if let Some(names) = prefs_store.get_strv("workspace-names") {
        workspaces.set_names(names);
    }
    let panel = Rc::new(SimPanel::new());

    let mut switcher = WorkspaceSwitcher::new(
        workspaces.clone(),
        settings_store.clone(),
        prefs_store.clone(),
        panel.clone(),
    );
    if let Err(e) = switcher.enable() {
        error!("failed to enable: {}", e);
        std::process::exit(1);
    }

    let (cmd_tx, cmd_rx) = mpsc::channel::<ShellCommand>();
    spawn_command_source(cmd_tx);

    info!("wsbar running");
    for cmd in cmd_rx {
        if let Err(e) = apply_command(
            cmd,
            &workspaces,
            &settings_store,
            &prefs_store,
            &mut switcher,
        ) {
            error!("command error: {}", e);
        }
        // Deliver the events the shell queued while applying the command.
        for event in workspaces.drain_events() {
            if let Err(e) = switcher.handle(event) {
                error!("event error: {}", e);
            }
        }
        render_panel(&panel);
    }

    info!("command source closed, exiting");
    switcher.disable();
}

/// Apply one shell command: mutate the simulated shell first, then forward
/// the matching event to the switcher.
fn apply_command(
    cmd: ShellCommand,
    workspaces: &SimWorkspaces,
    settings_store: &SimStore,
    prefs_store: &SimStore,
    switcher: &mut WorkspaceSwitcher<SimWorkspaces, SimStore, SimPanel>,
) -> Result<(), wsbar::config::ConfigError> {
    match cmd {
        ShellCommand::AddWorkspace => workspaces.add(),
        ShellCommand::RemoveWorkspace => workspaces.remove(),
        ShellCommand::SwitchTo(index) => workspaces.set_active(index),
        ShellCommand::Scroll(direction) => switcher.handle(Event::Scroll(direction))?,
        ShellCommand::Click { workspace } => switcher.handle(Event::Click { workspace })?,
        ShellCommand::PopupItem(index) => switcher.handle(Event::PopupItemActivated(index))?,
        ShellCommand::Set { key, value } => {
            if key == "workspace-names" {
                prefs_store.set(&key, value.clone());
                let names = value
                    .as_array()
                    .map(|list| {
                        list.iter()
                            .filter_map(|v| v.as_str().map(String::from))
                            .collect()
                    })
                    .unwrap_or_default();
                workspaces.set_names(names);
                switcher.handle(Event::NamesChanged)?;
            } else {
                settings_store.set(&key, value);
                switcher.handle(Event::SettingChanged(key))?;
            }
        }
    }
    Ok(())
}

/// Log the visible panel row(s) after each command.
fn render_panel(panel: &SimPanel) {
    for position in [Position::Left, Position::Center, Position::Right] {
        let row = panel.render(position);
        if !row.is_empty() {
            debug!("panel {}: {}", position, row);
        }
    }
}

fn spawn_command_source(tx: mpsc::Sender<ShellCommand>) {
    let path = default_socket_path();
    std::thread::spawn(move || {
        let mut source = UnixSocketListener::new(&path);
        if let Err(e) = source.run(tx) {
            error!("socket listener error: {}", e);
        }
    });
}
