//! Core business logic - framework-agnostic scheduling operations.
//!
//! Registries for timing, rooms and teacher availability; the timetable and
//! period store; the interval-overlap conflict detector; bulk/copy
//! operations; and the generation orchestrator.

/// Teacher availability registry
pub mod availability;
/// Bulk period creation and timetable duplication
pub mod bulk;
/// Interval-overlap conflict detection and logging
pub mod conflicts;
/// Timetable generation orchestration
pub mod generation;
/// Room registry with composite-uniqueness enforcement
pub mod rooms;
/// School timing and break schedule registry, time/day validation helpers
pub mod timing;
/// Timetable and period store
pub mod timetable;
