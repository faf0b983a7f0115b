//! IPC listener that accepts shell commands over a Unix socket.
//!
//! External tools (scripts, the test harness, a `socat` one-liner) can
//! connect to the socket and drive the simulated shell with
//! newline-delimited JSON commands.

pub mod listener;
