//! D-Bus interface for PTK Panel Daemon.
//!
//! Provides the `org.ptkpanel.Daemon1` interface on the session or system bus.

mod interface;

pub use interface::{run_dbus_server, Daemon1Interface};
