//! Timetable entity - The weekly schedule for one class section.
//!
//! One timetable should be the authoritative schedule for a (section,
//! academic year, term) tuple. The store enforces this only by convention:
//! lookups return the most recently created match, there is no uniqueness
//! constraint.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Timetable database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "timetables")]
pub struct Model {
    /// Unique identifier for the timetable
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Tenant (school) this timetable belongs to
    pub tenant_id: String,
    /// Class section this timetable schedules
    pub section_id: String,
    /// Academic year this timetable applies to
    pub academic_year_id: String,
    /// Term within the year, None when the timetable spans the whole year
    pub term_id: Option<String>,
    /// Human-readable name (e.g. "Grade 7B - Fall")
    pub name: Option<String>,
    /// School timing this timetable was generated against, if any
    pub school_timing_id: Option<i64>,
    /// Whether this timetable is in effect
    pub is_active: bool,
    /// When this timetable was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Timetable and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One timetable has many periods
    #[sea_orm(has_many = "super::timetable_period::Entity")]
    Periods,
}

impl Related<super::timetable_period::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Periods.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
