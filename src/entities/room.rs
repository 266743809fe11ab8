//! Room entity - Physical rooms available for scheduling.
//!
//! Rooms are tenant-scoped and unique by (tenant, room number, building),
//! with an unset building colliding with another unset building. The
//! uniqueness is enforced by the room registry, not the schema.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Room database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rooms")]
pub struct Model {
    /// Unique identifier for the room
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Tenant (school) this room belongs to
    pub tenant_id: String,
    /// Room number or label (e.g. "101", "Lab A")
    pub room_number: String,
    /// Building the room is in, None when the campus has a single building
    pub building: Option<String>,
    /// Kind of room: `"classroom"`, `"lab"`, `"auditorium"`, ...
    pub room_type: String,
    /// Seating capacity, None when unknown
    pub capacity: Option<i32>,
    /// Whether the room has a projector
    pub has_projector: bool,
    /// Whether the room has a smart board
    pub has_smart_board: bool,
    /// Whether the room can currently be scheduled
    pub is_available: bool,
}

/// Defines relationships between Room and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
