// TesterMatch - app/mod.rs
//
// Application layer: source loading, snapshot state, interactive prompt.
// Dependencies: core, platform.

pub mod loader;
pub mod prompt;
pub mod state;
