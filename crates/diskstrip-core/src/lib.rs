/// DiskStrip Core: scanning, aggregation, and strip treemap layout.
///
/// This crate contains all business logic with zero frontend dependencies.
///
/// # Modules
///
/// - [`model`]: arena-allocated entry tree, volume tags, size formatting.
/// - [`reparse`]: reparse-point data parsing and same-volume classification.
/// - [`platform`]: the OS probe seam and drive enumeration.
/// - [`scanner`]: the volume-bounded tree builder and background scan handle.
/// - [`layout`]: the alternating-strip treemap engine.
/// - [`error`]: scan, reparse, and per-entry error types.
pub mod error;
pub mod layout;
pub mod model;
pub mod platform;
pub mod reparse;
pub mod scanner;
