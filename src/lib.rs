//! **wsbar** — a panel workspace switcher.
//!
//! The switcher renders the shell's workspaces as a panel widget in one of
//! three modes (the active workspace, one button per workspace, or an icon
//! with a label) and lets the user navigate by clicking, scrolling, or
//! through a popup menu.
//!
//! The crate is split along three seams:
//!
//! * [`traits`] defines the host abstractions — a
//!   [`WorkspaceProvider`](traits::WorkspaceProvider), a
//!   [`SettingsStore`](traits::SettingsStore), and a
//!   [`PanelHost`](traits::PanelHost) owning the actor toolkit. The
//!   [`switcher`] and [`display`] layers depend only on these.
//! * [`shell`] implements the traits with an in-process simulated shell
//!   used by the daemon binary and as the recording fixture in tests.
//! * [`ipc`] feeds [`ShellCommand`](event::ShellCommand)s in over a Unix
//!   socket so external tools can drive the shell.
//!
//! Signal registrations are tracked in [`signals::Subscriptions`], so
//! disabling the switcher provably releases everything it connected.

pub mod config;
pub mod display;
pub mod event;
pub mod ipc;
pub mod navigation;
pub mod shell;
pub mod signals;
pub mod style;
pub mod switcher;
pub mod traits;
