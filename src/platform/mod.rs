// TesterMatch - platform/mod.rs
//
// Platform abstraction layer: config directories and file access.
// Must NOT depend on: app.

pub mod config;
pub mod fs;
