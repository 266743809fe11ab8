//! Room registry business logic.
//!
//! Rooms are unique per (tenant, room number, building), with explicit
//! NULL-equals-NULL semantics for the building: two rooms with the same
//! number and no building recorded still collide. The check runs at create
//! time; there is no schema-level constraint.

use crate::{
    entities::{Room, room},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Fields accepted when creating a room.
#[derive(Debug, Clone)]
pub struct NewRoom {
    /// Tenant the room belongs to
    pub tenant_id: String,
    /// Room number or label
    pub room_number: String,
    /// Building, None for single-building campuses
    pub building: Option<String>,
    /// Kind of room
    pub room_type: String,
    /// Seating capacity, when known
    pub capacity: Option<i32>,
    /// Whether the room has a projector
    pub has_projector: bool,
    /// Whether the room has a smart board
    pub has_smart_board: bool,
}

/// Creates a room, failing with [`Error::DuplicateRoom`] when a room with
/// the same (tenant, number, building) triple already exists.
pub async fn create_room(db: &DatabaseConnection, new: NewRoom) -> Result<room::Model> {
    let existing = get_room_by_number(db, &new.tenant_id, &new.room_number, new.building.as_deref())
        .await?;
    if existing.is_some() {
        return Err(Error::DuplicateRoom {
            room_number: new.room_number,
            building: new.building,
        });
    }

    let room_model = room::ActiveModel {
        tenant_id: Set(new.tenant_id),
        room_number: Set(new.room_number),
        building: Set(new.building),
        room_type: Set(new.room_type),
        capacity: Set(new.capacity),
        has_projector: Set(new.has_projector),
        has_smart_board: Set(new.has_smart_board),
        is_available: Set(true),
        ..Default::default()
    };

    room_model.insert(db).await.map_err(Into::into)
}

/// Finds a room by tenant, number and building. A `building` of None only
/// matches rooms with no building recorded.
pub async fn get_room_by_number(
    db: &DatabaseConnection,
    tenant_id: &str,
    room_number: &str,
    building: Option<&str>,
) -> Result<Option<room::Model>> {
    let mut query = Room::find()
        .filter(room::Column::TenantId.eq(tenant_id))
        .filter(room::Column::RoomNumber.eq(room_number));

    query = match building {
        Some(b) => query.filter(room::Column::Building.eq(b)),
        None => query.filter(room::Column::Building.is_null()),
    };

    query.one(db).await.map_err(Into::into)
}

/// Finds a room by its unique ID.
pub async fn get_room_by_id(db: &DatabaseConnection, room_id: i64) -> Result<Option<room::Model>> {
    Room::find_by_id(room_id).one(db).await.map_err(Into::into)
}

/// Lists all rooms for a tenant, ordered by building then room number.
pub async fn list_rooms(db: &DatabaseConnection, tenant_id: &str) -> Result<Vec<room::Model>> {
    Room::find()
        .filter(room::Column::TenantId.eq(tenant_id))
        .order_by_asc(room::Column::Building)
        .order_by_asc(room::Column::RoomNumber)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{create_test_room, setup_test_db};

    #[tokio::test]
    async fn test_create_and_list_rooms() -> Result<()> {
        let db = setup_test_db().await?;

        create_test_room(&db, "tenant-1", "101", Some("Main")).await?;
        create_test_room(&db, "tenant-1", "102", Some("Annex")).await?;
        create_test_room(&db, "tenant-2", "101", Some("Main")).await?;

        let rooms = list_rooms(&db, "tenant-1").await?;
        assert_eq!(rooms.len(), 2);
        // Ordered by building, then number
        assert_eq!(rooms[0].room_number, "102");
        assert_eq!(rooms[1].room_number, "101");

        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_room_rejected() -> Result<()> {
        let db = setup_test_db().await?;

        create_test_room(&db, "tenant-1", "101", Some("Main")).await?;
        let duplicate = create_test_room(&db, "tenant-1", "101", Some("Main")).await;
        assert!(matches!(
            duplicate.unwrap_err(),
            Error::DuplicateRoom { .. }
        ));

        // Same number in a different building is fine
        create_test_room(&db, "tenant-1", "101", Some("Annex")).await?;
        // Same triple under another tenant is fine
        create_test_room(&db, "tenant-2", "101", Some("Main")).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_null_building_collides_with_null() -> Result<()> {
        let db = setup_test_db().await?;

        create_test_room(&db, "tenant-1", "101", None).await?;
        let duplicate = create_test_room(&db, "tenant-1", "101", None).await;
        assert!(matches!(
            duplicate.unwrap_err(),
            Error::DuplicateRoom { building: None, .. }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_room_by_number_building_scoping() -> Result<()> {
        let db = setup_test_db().await?;

        let no_building = create_test_room(&db, "tenant-1", "101", None).await?;
        let main = create_test_room(&db, "tenant-1", "101", Some("Main")).await?;

        let found_none = get_room_by_number(&db, "tenant-1", "101", None).await?;
        assert_eq!(found_none.unwrap().id, no_building.id);

        let found_main = get_room_by_number(&db, "tenant-1", "101", Some("Main")).await?;
        assert_eq!(found_main.unwrap().id, main.id);

        Ok(())
    }
}
