// TesterMatch - core/mod.rs
//
// Core business logic layer: entity model, relation parsing, indexes,
// query routing, result collapsing, and rendering.
// Must NOT depend on: app or platform.

pub mod collapse;
pub mod export;
pub mod model;
pub mod query;
pub mod relations;
pub mod repository;
