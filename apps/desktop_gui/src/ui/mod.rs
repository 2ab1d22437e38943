//! UI layer for the roster window.

pub mod app;

pub use app::RosterApp;
