//! Timetable conflict entity - Append-only record of a detected violation.
//!
//! Conflicts are derived data written by the full re-scan
//! (`detect_and_log_conflicts`), never by the pre-check. The `dedup_key`
//! column carries a unique index so re-scanning an unchanged timetable is
//! idempotent: the key is `conflict_type:period_id:sorted conflicting ids`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Timetable conflict database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "timetable_conflicts")]
pub struct Model {
    /// Unique identifier for the conflict record
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Kind of violation: `"teacher_overlap"` or `"room_double_booking"`
    pub conflict_type: String,
    /// Severity: `"info"`, `"warning"`, `"error"` or `"critical"`
    pub severity: String,
    /// Human-readable description of the violation
    pub description: String,
    /// Teacher involved, for teacher overlaps
    pub teacher_id: Option<String>,
    /// Room involved, for room double-bookings
    pub room_id: Option<i64>,
    /// Section of the affected period's timetable, when known
    pub section_id: Option<String>,
    /// The period the violation was detected against
    pub period_id: i64,
    /// JSON array of the overlapping period ids, sorted ascending
    pub conflicting_period_ids: String,
    /// Natural identity of the conflict, unique-indexed for insert-or-skip
    #[sea_orm(unique)]
    pub dedup_key: String,
    /// Whether a human has marked this conflict resolved
    pub is_resolved: bool,
    /// When the conflict was first detected
    pub detected_at: DateTimeUtc,
}

/// Defines relationships between TimetableConflict and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
