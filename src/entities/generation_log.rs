//! Generation log entity - Audit trail of timetable generation invocations.
//!
//! One row per invocation. `status` moves `in_progress -> completed` or
//! `in_progress -> failed`, both terminal. `completed` is reached even when
//! the optimizer was unreachable and generation fell back to empty
//! timetables; the `degraded` flag makes that outcome observable.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Generation log database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "generation_logs")]
pub struct Model {
    /// Unique identifier for the invocation
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Tenant (school) the generation ran for
    pub tenant_id: String,
    /// Academic year the generation targeted
    pub academic_year_id: String,
    /// Generation mode: `"ai_powered"`, `"balanced"`, ...
    pub mode: String,
    /// JSON array of the targeted section ids
    pub target_section_ids: String,
    /// JSON object of caller-supplied constraints, if any
    pub constraints: Option<String>,
    /// `"in_progress"`, `"completed"` or `"failed"`
    pub status: String,
    /// True when the optimizer was unreachable and empty timetables were
    /// created instead
    pub degraded: bool,
    /// When the invocation started
    pub started_at: DateTimeUtc,
    /// When the invocation reached a terminal status
    pub completed_at: Option<DateTimeUtc>,
    /// JSON array of the resulting timetable ids
    pub timetable_ids: Option<String>,
    /// Total conflicts detected across the resulting timetables
    pub conflict_count: i32,
    /// Error message for failed invocations
    pub error_message: Option<String>,
}

/// Defines relationships between GenerationLog and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
